//! The structured view of a captured message.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::attachment::Attachment;

/// A captured message reconstructed from its raw MIME bytes.
///
/// Headers are reachable both through [`ParsedMessage::headers`] and through
/// the named accessors ([`subject`](Self::subject), [`from`](Self::from), ...).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ParsedMessage {
    /// Store filename, when parsed from a stored file.
    pub filename: Option<String>,

    /// Local part of the `Message-ID` header, without the leading `<`.
    pub message_id: Option<String>,

    /// Lower-cased header name → decoded value. The last duplicate wins.
    pub headers: BTreeMap<String, String>,

    /// Parsed `Date:` header.
    pub date: Option<DateTime<Utc>>,

    /// `text/plain` body.
    pub plain_body: Option<String>,

    /// `text/html` body.
    pub html_body: Option<String>,

    /// Attachments keyed by [`Attachment::key`].
    pub attachments: BTreeMap<String, Attachment>,

    /// The original bytes, untouched.
    #[serde(skip)]
    pub raw: Vec<u8>,
}

impl ParsedMessage {
    /// Value of a header by (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn subject(&self) -> Option<&str> {
        self.header("subject")
    }

    pub fn from(&self) -> Option<&str> {
        self.header("from")
    }

    pub fn to(&self) -> Option<&str> {
        self.header("to")
    }

    pub fn cc(&self) -> Option<&str> {
        self.header("cc")
    }

    pub fn reply_to(&self) -> Option<&str> {
        self.header("reply-to")
    }

    /// `true` if the message is dated strictly after `since`.
    ///
    /// A message without a date is never new.
    pub fn is_new(&self, since: DateTime<Utc>) -> bool {
        self.date.is_some_and(|date| date > since)
    }

    /// Size of the raw message in bytes.
    pub fn size(&self) -> u64 {
        self.raw.len() as u64
    }
}
