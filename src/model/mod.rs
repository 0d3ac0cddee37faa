//! Core data model types for captured messages and their attachments.

pub mod attachment;
pub mod message;
