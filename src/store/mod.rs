//! The flat directory of captured messages: writing on capture, listing and
//! reading on inspection.

pub mod reader;
pub mod writer;

pub use reader::StoredFile;
pub use writer::MessageStore;
