//! MIME body extraction: multipart/mixed (bodies + attachments) and
//! multipart/alternative (plain/HTML) for messages generated with a
//! ten-dash boundary marker.
//!
//! Parts are found by splitting the body on [`BOUNDARY_MARKER`], not by
//! reading the `boundary` parameter. Mail whose generator uses a different
//! boundary shape is not recognized as multipart. Nested multiparts are
//! flattened by the split: the container part has an empty body and is
//! ignored, its children are classified like any other part.

use std::collections::BTreeMap;

use crate::model::attachment::Attachment;
use crate::parser::header::{header_param, parse_header_block, HeaderMap};

/// Fixed marker every delimiter line starts with.
pub const BOUNDARY_MARKER: &str = "----------";

const PLAIN_UTF8: &str = "text/plain; charset=UTF-8";
const HTML_UTF8: &str = "text/html; charset=UTF-8";

/// One boundary-delimited segment of a multipart body.
#[derive(Debug)]
pub struct MimePart<'a> {
    pub headers: HeaderMap,
    pub body: &'a str,
}

impl MimePart<'_> {
    fn content_type(&self) -> &str {
        self.headers.get("content-type").map_or("", String::as_str)
    }

    fn is_attachment(&self) -> bool {
        self.headers
            .get("content-disposition")
            .is_some_and(|d| d.to_lowercase().starts_with("attachment"))
    }

    fn to_attachment(&self) -> Attachment {
        let disposition = self
            .headers
            .get("content-disposition")
            .map_or("", String::as_str);
        Attachment {
            content_type: self.content_type().to_string(),
            transfer_encoding: self
                .headers
                .get("content-transfer-encoding")
                .cloned()
                .unwrap_or_default(),
            filename: header_param(disposition, "filename").unwrap_or_default(),
            data: self.body.to_string(),
        }
    }
}

/// Bodies and attachments extracted from a multipart message.
#[derive(Debug, Default, PartialEq)]
pub struct Extracted {
    pub plain: Option<String>,
    pub html: Option<String>,
    pub attachments: BTreeMap<String, Attachment>,
}

/// Split a multipart body into parts.
///
/// The preamble before the first marker, the closing delimiter and segments
/// without a header/body separator are skipped. Part bodies are kept as they
/// appear, including the line break before the following delimiter line.
pub fn split_parts(body: &str) -> Vec<MimePart<'_>> {
    body.split(BOUNDARY_MARKER)
        .skip(1)
        .filter_map(|segment| {
            // The first line is the rest of the delimiter line
            let (_, rest) = segment.split_once("\r\n")?;
            let (head, part_body) = rest.split_once("\r\n\r\n")?;
            Some(MimePart {
                headers: parse_header_block(head),
                body: part_body,
            })
        })
        .collect()
}

/// `multipart/mixed`: UTF-8 plain/HTML bodies and attachments.
///
/// Only parts declared exactly as `text/plain; charset=UTF-8` or
/// `text/html; charset=UTF-8` become bodies. Attachments are keyed by
/// [`Attachment::key`], so a byte-identical attachment is kept once.
pub fn extract_mixed(body: &str) -> Extracted {
    let mut extracted = Extracted::default();
    for part in split_parts(body) {
        let content_type = part.content_type();
        if content_type.starts_with(PLAIN_UTF8) {
            extracted.plain = Some(part.body.trim().to_string());
        } else if content_type.starts_with(HTML_UTF8) {
            extracted.html = Some(part.body.trim().to_string());
        } else if part.is_attachment() {
            let attachment = part.to_attachment();
            extracted.attachments.insert(attachment.key(), attachment);
        }
    }
    extracted
}

/// `multipart/alternative`: one plain and one HTML body, no attachments.
///
/// Bodies lose only the line break that belongs to the next delimiter.
pub fn extract_alternative(body: &str) -> Extracted {
    let mut extracted = Extracted::default();
    for part in split_parts(body) {
        let content_type = part.content_type();
        let text = part.body.strip_suffix("\r\n").unwrap_or(part.body);
        if content_type.contains("text/html") {
            extracted.html = Some(text.to_string());
        } else if content_type.contains("text/plain") {
            extracted.plain = Some(text.to_string());
        }
    }
    extracted
}
