//! Data model for the extracted Signal archive.
//!
//! This module defines the records handed to sigvault by the (out-of-scope)
//! extraction step: contacts keyed by conversation id, and the ordered
//! message list of every conversation. The field names follow the keys of
//! the Signal Desktop database export, so the whole document deserializes
//! directly from the extraction JSON.
//!
//! # Example
//!
//! ```
//! use sigvault::model::ArchiveData;
//!
//! let json = r#"{
//!   "contacts": {"c1": {"name": "Alice", "number": "+111", "is_group": false}},
//!   "conversations": {"c1": [
//!     {"type": "incoming", "body": "hi", "sent_at": 1700000000000,
//!      "timestamp": 1700000000000, "conversationId": "c1"}
//!   ]}
//! }"#;
//! let data: ArchiveData = serde_json::from_str(json)?;
//! assert_eq!(data.conversations["c1"].len(), 1);
//! # Ok::<(), serde_json::Error>(())
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Contacts keyed by conversation id.
///
/// A `BTreeMap` so every pass over the archive visits conversations in a
/// stable, sorted order. Name sanitization and sender resolution both rely
/// on this for reproducible output trees.
pub type Contacts = BTreeMap<String, Contact>;

/// Message lists keyed by conversation id, each in chronological order.
pub type Conversations = BTreeMap<String, Vec<RawMessage>>;

/// The complete extraction document: everything this crate consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveData {
    pub contacts: Contacts,
    pub conversations: Conversations,
}

/// One contact (or group) as read from the source database.
///
/// `name` is rewritten exactly once per run by
/// [`sanitize_names`](crate::names::sanitize_names); every other field is
/// immutable after deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    /// Display name. May be absent; sanitization falls back to `number`.
    #[serde(default)]
    pub name: Option<String>,

    /// Phone-number-like identifier.
    #[serde(default)]
    pub number: Option<String>,

    /// Whether this conversation is a group chat.
    #[serde(default)]
    pub is_group: bool,
}

/// One message as read from the source database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMessage {
    /// Primary timestamp, epoch milliseconds. Used for attachment naming.
    #[serde(default)]
    pub timestamp: Option<i64>,

    /// When the message was sent, epoch milliseconds. Used for the
    /// transcript header date.
    #[serde(default)]
    pub sent_at: Option<i64>,

    /// Message type: `"outgoing"`, `"incoming"`, `"call-history"`, ...
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    /// Body text, absent for pure media or call messages.
    #[serde(default)]
    pub body: Option<String>,

    /// Sender identifier (phone number) for group messages.
    #[serde(default)]
    pub source: Option<String>,

    /// The conversation this message belongs to.
    #[serde(default, rename = "conversationId")]
    pub conversation_id: Option<String>,

    #[serde(default)]
    pub attachments: Vec<Attachment>,

    #[serde(default)]
    pub reactions: Vec<Reaction>,

    #[serde(default)]
    pub quote: Option<Quote>,

    #[serde(default)]
    pub sticker: Option<Sticker>,

    /// Present on `"call-history"` messages.
    #[serde(default, rename = "callHistoryDetails")]
    pub call_details: Option<CallDetails>,
}

impl RawMessage {
    /// Whether this message was sent by the archive owner.
    pub fn is_outgoing(&self) -> bool {
        self.kind.as_deref() == Some("outgoing")
    }

    /// Whether this message is a call event rather than text.
    pub fn is_call(&self) -> bool {
        self.kind.as_deref() == Some("call-history")
    }
}

/// One attachment of a message.
///
/// `target_name` is the destination basename assigned by
/// [`plan_attachments`](crate::attach::plan_attachments); it is the only mutation
/// any stage performs on this record after deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attachment {
    /// Path relative to the attachment store. May contain backslashes.
    #[serde(default)]
    pub path: Option<String>,

    /// Original filename, frequently absent.
    #[serde(default, rename = "fileName")]
    pub file_name: Option<String>,

    /// MIME type, e.g. `image/jpeg`.
    #[serde(default, rename = "contentType")]
    pub content_type: Option<String>,

    /// Destination basename under the conversation's `media/` directory.
    #[serde(skip)]
    pub target_name: Option<String>,
}

/// An emoji reaction to a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reaction {
    /// Conversation id of the reacting contact.
    #[serde(default, rename = "fromId")]
    pub from_id: Option<String>,

    #[serde(default)]
    pub emoji: Option<String>,
}

/// A quoted (replied-to) message fragment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub text: Option<String>,
}

/// A sticker payload; the emoji stands in for the body when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sticker {
    #[serde(default)]
    pub data: Option<StickerData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StickerData {
    #[serde(default)]
    pub emoji: Option<String>,
}

/// Details attached to a call-history message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallDetails {
    #[serde(default, rename = "wasIncoming")]
    pub was_incoming: bool,
}

/// Converts an epoch-milliseconds value to local time.
///
/// Returns `None` for values outside the representable range.
pub fn local_datetime(ms: i64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(ms).single()
}
