//! `filemailer` — capture outgoing mail to a directory during development.
//!
//! Instead of being sent, each message is written as a raw file by
//! [`store::MessageStore`]. [`parser::parse`] rebuilds the structured view
//! (headers, plain/HTML bodies, attachments) and [`inspect::Inspector`]
//! lists, expires and deletes the captured messages for a developer tool.

pub mod config;
pub mod error;
pub mod export;
pub mod inspect;
pub mod model;
pub mod parser;
pub mod relative;
pub mod store;
