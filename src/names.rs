//! Contact name sanitization.
//!
//! Conversation directories are named after contacts, so display names must
//! become unique, filesystem-safe strings first. Emoji are replaced with
//! their Unicode names, everything non-alphanumeric is dropped, and
//! collisions get the smallest free decimal suffix starting at 2.

use std::collections::HashSet;

use crate::model::Contacts;

/// Directory name used when a contact has no usable name at all.
pub const UNNAMED: &str = "unnamed";

/// Rewrites every contact name to a unique, filesystem-safe form.
///
/// The raw name is the display name if present, else the number. Contacts
/// are visited in sorted key order, so suffix assignment is deterministic
/// across runs.
///
/// # Example
///
/// ```
/// use sigvault::model::{Contact, Contacts};
/// use sigvault::names::sanitize_names;
///
/// let mut contacts = Contacts::new();
/// contacts.insert("a".into(), Contact { name: Some("John?!".into()), ..Default::default() });
/// contacts.insert("b".into(), Contact { name: Some("John".into()), ..Default::default() });
/// sanitize_names(&mut contacts);
/// assert_eq!(contacts["a"].name.as_deref(), Some("John"));
/// assert_eq!(contacts["b"].name.as_deref(), Some("John2"));
/// ```
pub fn sanitize_names(contacts: &mut Contacts) {
    let mut claimed: HashSet<String> = HashSet::new();

    for contact in contacts.values_mut() {
        let raw = contact
            .name
            .as_deref()
            .or(contact.number.as_deref())
            .unwrap_or_default();

        let mut base = sanitize(raw);
        if base.is_empty() {
            base = UNNAMED.to_string();
        }
        contact.name = Some(claim_unique(base, &mut claimed));
    }
}

/// Strips a raw name to alphanumeric characters, demojizing first.
fn sanitize(raw: &str) -> String {
    let mut out = String::new();
    let mut buf = [0u8; 4];
    for ch in raw.chars() {
        if let Some(emoji) = emojis::get(ch.encode_utf8(&mut buf)) {
            out.extend(emoji.name().chars().filter(|c| c.is_alphanumeric()));
        } else if ch.is_alphanumeric() {
            out.push(ch);
        }
    }
    out
}

/// Returns `base`, suffixed with the smallest integer >= 2 on collision.
///
/// Terminates because the suffix sequence is unbounded and `claimed` is
/// finite for one run.
fn claim_unique(base: String, claimed: &mut HashSet<String>) -> String {
    if claimed.insert(base.clone()) {
        return base;
    }
    let mut n = 2u64;
    loop {
        let candidate = format!("{base}{n}");
        if claimed.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
