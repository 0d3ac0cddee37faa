//! Turn raw captured bytes into a [`ParsedMessage`].

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{FileMailerError, Result};
use crate::model::message::ParsedMessage;
use crate::parser::header::{self, decode_bytes, parse_header_block};
use crate::parser::mime::{self, Extracted};

/// `Message-ID` header as written by the capturing mailer; the capture
/// identifier is the leading run of word characters of the local part.
static MESSAGE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^Message-ID: <(?P<message_id>\w+)[^>]*>").expect("valid regex")
});

const SEPARATOR: &[u8] = b"\r\n\r\n";

/// Top-level structure, decided by the `Content-Type` header.
/// A message without one is plain text (RFC 2045 default).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Structure {
    Mixed,
    Alternative,
    Plain,
    Other,
}

impl Structure {
    fn detect(content_type: Option<&str>) -> Self {
        let Some(ct) = content_type.map(str::to_lowercase) else {
            return Self::Plain;
        };
        if ct.contains("multipart/mixed") {
            Self::Mixed
        } else if ct.contains("multipart/alternative") {
            Self::Alternative
        } else if ct.contains("text/plain") {
            Self::Plain
        } else {
            Self::Other
        }
    }
}

/// Parse raw MIME bytes.
///
/// `filename` is the store filename when the bytes come from a stored file.
/// The bytes are kept untouched in [`ParsedMessage::raw`]; the decoded body
/// text drops a leading byte order mark. Fails with
/// [`FileMailerError::MalformedMessage`] when there is no blank line between
/// headers and body.
pub fn parse(raw: &[u8], filename: Option<&str>) -> Result<ParsedMessage> {
    let header_end = find_header_end(raw).ok_or_else(|| {
        FileMailerError::MalformedMessage("no blank line between headers and body".into())
    })?;

    let headers = parse_header_block(&decode_bytes(&raw[..header_end]));
    let body = decode_bytes(&raw[header_end + SEPARATOR.len()..]);

    let date = headers.get("date").and_then(|d| header::parse_date(d));
    let message_id = headers
        .get("message-id")
        .map(|id| message_id_local_part(id));

    let structure = Structure::detect(headers.get("content-type").map(String::as_str));
    let extracted = match structure {
        Structure::Mixed => mime::extract_mixed(&body),
        Structure::Alternative => mime::extract_alternative(&body),
        Structure::Plain => Extracted {
            plain: Some(body),
            ..Extracted::default()
        },
        Structure::Other => Extracted::default(),
    };

    debug!(
        filename = filename.unwrap_or("<memory>"),
        ?structure,
        attachments = extracted.attachments.len(),
        "Parsed message"
    );

    Ok(ParsedMessage {
        filename: filename.map(String::from),
        message_id,
        headers,
        date,
        plain_body: extracted.plain,
        html_body: extracted.html,
        attachments: extracted.attachments,
        raw: raw.to_vec(),
    })
}

/// Identifier used in store filenames, read straight from the raw text.
///
/// Only the header block is searched, so a forwarded message in the body
/// cannot leak its own `Message-ID`.
pub fn extract_message_id(raw: &[u8]) -> Result<String> {
    let head = &raw[..find_header_end(raw).unwrap_or(raw.len())];
    let text = String::from_utf8_lossy(head);
    MESSAGE_ID
        .captures(&text)
        .and_then(|caps| caps.name("message_id"))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| FileMailerError::MalformedMessage("missing Message-ID header".into()))
}

/// Byte offset of the first `CRLF CRLF`.
pub fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(SEPARATOR.len()).position(|w| w == SEPARATOR)
}

/// `<abc123@host>` → `abc123`.
fn message_id_local_part(value: &str) -> String {
    let value = value.trim();
    let local = match value.split_once('@') {
        Some((local, _)) => local,
        None => value.strip_suffix('>').unwrap_or(value),
    };
    local.strip_prefix('<').unwrap_or(local).to_string()
}
