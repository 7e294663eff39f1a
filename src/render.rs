//! Transcript rendering.
//!
//! Each message becomes exactly one encoded transcript line:
//!
//! ```text
//! [YYYY-MM-DD HH:MM] Sender: quote-block body attachment-refs reaction-block
//! ```
//!
//! The encoding is both the human-readable output and the re-parseable
//! source of truth for merging and HTML generation, so everything emitted
//! here must survive a round trip through
//! [`TranscriptParser`](crate::transcript::TranscriptParser).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::attach::PLACEHOLDER_FILE_NAME;
use crate::config::ExportConfig;
use crate::error::Result;
use crate::model::{Contacts, Conversations, RawMessage, local_datetime};
use crate::report::Reporter;

/// Fallback header date when a message has no usable sent timestamp.
pub const EPOCH_LABEL: &str = "1970-01-01 00:00";

/// Sender label when resolution fails.
pub const NO_SENDER: &str = "No-Sender";

/// Extensions rendered as inline images in HTML.
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "tif", "tiff"];

/// Spaces in media hrefs become `%20` so the markdown link stays intact.
const HREF_ESCAPE: &AsciiSet = &CONTROLS.add(b' ');

/// Renders one message into its encoded transcript line (no newline).
pub fn render_message(
    msg: &RawMessage,
    is_group: bool,
    contacts: &Contacts,
    config: &ExportConfig,
    reporter: &Reporter,
) -> String {
    let date = header_date(msg, reporter);
    let sender = resolve_sender(msg, is_group, contacts, reporter);

    let mut body = if msg.is_call() {
        let incoming = msg.call_details.as_ref().is_some_and(|d| d.was_incoming);
        if incoming { "Incoming call" } else { "Outgoing call" }.to_string()
    } else {
        msg.body.clone().unwrap_or_default()
    };
    // Backticks would open markdown code sections across messages.
    body = body.replace('`', "");
    // Trailing two spaces mark a soft line break for the HTML stage.
    body.push_str("  ");

    for att in &msg.attachments {
        let Some(name) = att.target_name.as_deref() else {
            continue; // unresolvable attachment, message degrades to text
        };
        let href = utf8_percent_encode(name, HREF_ESCAPE).to_string();
        if is_image(name) {
            body.push('!');
        }
        body.push_str(&format!("[{name}](./media/{href})  "));
    }

    if !msg.reactions.is_empty() {
        let mut parts = Vec::new();
        for r in &msg.reactions {
            let resolved = r
                .from_id
                .as_deref()
                .and_then(|id| contacts.get(id))
                .and_then(|c| c.name.as_deref());
            match (resolved, r.emoji.as_deref()) {
                (Some(name), Some(emoji)) => parts.push(format!("{name}: {emoji}")),
                _ => reporter.detail(format!(
                    "\t\tReaction sender not found in contacts: [{date}] {sender}"
                )),
            }
        }
        body.push_str(&format!("\n(- {} -)", parts.join(", ")));
    }

    if let Some(emoji) = msg
        .sticker
        .as_ref()
        .and_then(|s| s.data.as_ref())
        .and_then(|d| d.emoji.as_deref())
    {
        // A sticker replaces everything assembled so far.
        body = format!("{emoji}  ");
    }

    let quote = if config.include_quote {
        msg.quote
            .as_ref()
            .and_then(|q| q.text.as_deref())
            .map(|text| format!("\n>\n> {text}\n>\n"))
            .unwrap_or_default()
    } else {
        String::new()
    };

    format!("[{date}] {sender}: {quote}{body}")
}

/// Writes every conversation's transcript under `dest/{name}/index.md`.
///
/// Each file is truncated once, then lines are appended in message order.
pub fn write_transcripts(
    dest: &Path,
    conversations: &Conversations,
    contacts: &Contacts,
    config: &ExportConfig,
    reporter: &Reporter,
) -> Result<()> {
    for (key, messages) in conversations {
        let contact = contacts.get(key);
        let name = contact
            .and_then(|c| c.name.as_deref())
            .unwrap_or(PLACEHOLDER_FILE_NAME);
        let is_group = contact.is_some_and(|c| c.is_group);
        reporter.detail(format!("\tDoing markdown for: {name}"));

        let dir = dest.join(name);
        std::fs::create_dir_all(&dir)?;
        let file = File::create(dir.join("index.md"))?;
        let mut out = BufWriter::new(file);

        for msg in messages {
            let line = render_message(msg, is_group, contacts, config, reporter);
            writeln!(out, "{line}")?;
        }
        out.flush()?;
    }
    Ok(())
}

/// Header date from the sent timestamp, epoch label on fallback.
fn header_date(msg: &RawMessage, reporter: &Reporter) -> String {
    msg.sent_at
        .and_then(local_datetime)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| {
            reporter.detail("\t\tNo sent_at; date set to 1970");
            EPOCH_LABEL.to_string()
        })
}

/// Resolves the sender label for one message.
///
/// Outgoing messages are always `Me`. Group messages scan all contacts for
/// a matching number; the first match in sorted key order wins, so two
/// contacts sharing a number resolve deterministically. 1:1 messages
/// resolve via the declared conversation id.
fn resolve_sender(
    msg: &RawMessage,
    is_group: bool,
    contacts: &Contacts,
    reporter: &Reporter,
) -> String {
    if msg.is_outgoing() {
        return "Me".to_string();
    }

    let resolved = if is_group {
        msg.source.as_deref().and_then(|source| {
            contacts
                .values()
                .find(|c| c.number.as_deref() == Some(source))
                .and_then(|c| c.name.as_deref())
        })
    } else {
        msg.conversation_id
            .as_deref()
            .and_then(|id| contacts.get(id))
            .and_then(|c| c.name.as_deref())
    };

    resolved.map(String::from).unwrap_or_else(|| {
        reporter.detail("\t\tNo sender found for message");
        NO_SENDER.to_string()
    })
}

/// Whether a filename's extension marks it as an inline image.
fn is_image(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Attachment, CallDetails, Contact, Quote, RawMessage, Reaction, Sticker, StickerData,
    };
    use std::collections::BTreeMap;

    fn contacts() -> Contacts {
        let mut map: Contacts = BTreeMap::new();
        map.insert(
            "c1".into(),
            Contact {
                name: Some("Alice".into()),
                number: Some("+111".into()),
                is_group: false,
            },
        );
        map.insert(
            "c2".into(),
            Contact {
                name: Some("Bob".into()),
                number: Some("+222".into()),
                is_group: false,
            },
        );
        map
    }

    fn render(msg: &RawMessage, is_group: bool) -> String {
        render_message(
            msg,
            is_group,
            &contacts(),
            &ExportConfig::new(),
            &Reporter::default(),
        )
    }

    fn sent_label(ms: i64) -> String {
        local_datetime(ms)
            .unwrap()
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }

    #[test]
    fn test_outgoing_is_me_with_soft_break() {
        let msg = RawMessage {
            kind: Some("outgoing".into()),
            body: Some("hello".into()),
            sent_at: Some(1_700_000_000_000),
            ..Default::default()
        };
        let line = render(&msg, false);
        assert_eq!(
            line,
            format!("[{}] Me: hello  ", sent_label(1_700_000_000_000))
        );
    }

    #[test]
    fn test_missing_timestamp_falls_back_to_epoch() {
        let msg = RawMessage {
            kind: Some("outgoing".into()),
            body: Some("x".into()),
            ..Default::default()
        };
        assert!(render(&msg, false).starts_with(&format!("[{EPOCH_LABEL}] Me: ")));
    }

    #[test]
    fn test_incoming_sender_via_conversation_id() {
        let msg = RawMessage {
            kind: Some("incoming".into()),
            body: Some("hi".into()),
            sent_at: Some(0),
            conversation_id: Some("c1".into()),
            ..Default::default()
        };
        assert!(render(&msg, false).contains("] Alice: "));
    }

    #[test]
    fn test_group_sender_first_match_by_number() {
        let msg = RawMessage {
            kind: Some("incoming".into()),
            body: Some("hi".into()),
            sent_at: Some(0),
            source: Some("+222".into()),
            ..Default::default()
        };
        assert!(render(&msg, true).contains("] Bob: "));
    }

    #[test]
    fn test_unresolvable_sender_placeholder() {
        let msg = RawMessage {
            kind: Some("incoming".into()),
            body: Some("hi".into()),
            sent_at: Some(0),
            source: Some("+999".into()),
            ..Default::default()
        };
        assert!(render(&msg, true).contains(&format!("] {NO_SENDER}: ")));
    }

    #[test]
    fn test_backticks_stripped() {
        let msg = RawMessage {
            kind: Some("outgoing".into()),
            body: Some("run `ls` now".into()),
            sent_at: Some(0),
            ..Default::default()
        };
        assert!(!render(&msg, false).contains('`'));
    }

    #[test]
    fn test_call_history_body() {
        let msg = RawMessage {
            kind: Some("call-history".into()),
            sent_at: Some(0),
            call_details: Some(CallDetails { was_incoming: true }),
            ..Default::default()
        };
        assert!(render(&msg, false).contains("Incoming call"));

        let msg = RawMessage {
            kind: Some("call-history".into()),
            sent_at: Some(0),
            call_details: Some(CallDetails {
                was_incoming: false,
            }),
            ..Default::default()
        };
        assert!(render(&msg, false).contains("Outgoing call"));
    }

    #[test]
    fn test_image_attachment_gets_bang_prefix() {
        let msg = RawMessage {
            kind: Some("outgoing".into()),
            sent_at: Some(0),
            attachments: vec![Attachment {
                target_name: Some("2024_00_pic.jpg".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let line = render(&msg, false);
        assert!(line.contains("![2024_00_pic.jpg](./media/2024_00_pic.jpg)  "));
    }

    #[test]
    fn test_non_image_attachment_plain_link_with_escaped_spaces() {
        let msg = RawMessage {
            kind: Some("outgoing".into()),
            sent_at: Some(0),
            attachments: vec![Attachment {
                target_name: Some("a b.pdf".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let line = render(&msg, false);
        assert!(line.contains("[a b.pdf](./media/a%20b.pdf)  "));
        assert!(!line.contains("!["));
    }

    #[test]
    fn test_reactions_block() {
        let msg = RawMessage {
            kind: Some("outgoing".into()),
            body: Some("news".into()),
            sent_at: Some(0),
            reactions: vec![
                Reaction {
                    from_id: Some("c1".into()),
                    emoji: Some("👍".into()),
                },
                Reaction {
                    from_id: Some("nobody".into()),
                    emoji: Some("🎉".into()),
                },
                Reaction {
                    from_id: Some("c2".into()),
                    emoji: Some("❤️".into()),
                },
            ],
            ..Default::default()
        };
        let line = render(&msg, false);
        // Unresolvable reactor skipped, the rest joined in order.
        assert!(line.ends_with("\n(- Alice: 👍, Bob: ❤️ -)"));
    }

    #[test]
    fn test_sticker_replaces_body() {
        let msg = RawMessage {
            kind: Some("outgoing".into()),
            body: Some("ignored".into()),
            sent_at: Some(0),
            sticker: Some(Sticker {
                data: Some(StickerData {
                    emoji: Some("🦀".into()),
                }),
            }),
            ..Default::default()
        };
        let line = render(&msg, false);
        assert!(line.ends_with("Me: 🦀  "));
        assert!(!line.contains("ignored"));
    }

    #[test]
    fn test_quote_block_and_toggle() {
        let msg = RawMessage {
            kind: Some("outgoing".into()),
            body: Some("reply".into()),
            sent_at: Some(0),
            quote: Some(Quote {
                text: Some("original".into()),
            }),
            ..Default::default()
        };
        let with_quote = render(&msg, false);
        assert!(with_quote.contains("\n>\n> original\n>\n"));

        let config = ExportConfig::new().with_include_quote(false);
        let without = render_message(&msg, false, &contacts(), &config, &Reporter::default());
        assert!(!without.contains('>'));
    }

    #[test]
    fn test_write_transcripts_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let mut conversations: Conversations = BTreeMap::new();
        conversations.insert(
            "c1".into(),
            vec![RawMessage {
                kind: Some("outgoing".into()),
                body: Some("only line".into()),
                sent_at: Some(0),
                ..Default::default()
            }],
        );

        let config = ExportConfig::new();
        let reporter = Reporter::default();
        write_transcripts(dir.path(), &conversations, &contacts(), &config, &reporter).unwrap();
        write_transcripts(dir.path(), &conversations, &contacts(), &config, &reporter).unwrap();

        let content = std::fs::read_to_string(dir.path().join("Alice/index.md")).unwrap();
        assert_eq!(content.lines().count(), 1, "second run must not append");
        assert!(content.ends_with("  \n"));
    }
}
