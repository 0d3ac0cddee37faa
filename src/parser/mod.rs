//! Email parsing: header decoding, MIME part extraction and the
//! raw-bytes → [`ParsedMessage`](crate::model::message::ParsedMessage) entry point.

pub mod header;
pub mod mail;
pub mod mime;

pub use mail::{extract_message_id, parse};
