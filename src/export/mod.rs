//! Writing delivered attachments to disk.

pub mod attachment;
