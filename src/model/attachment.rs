//! Attachments of captured messages.
//!
//! The payload is kept exactly as it appeared in the MIME part.
//! Transfer decoding happens only when the attachment is delivered.

use base64::Engine;
use sha2::{Digest, Sha256};

use crate::error::{FileMailerError, Result};

/// An attachment of a `multipart/mixed` message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Attachment {
    /// MIME content type as declared by the part (e.g. `"application/pdf"`).
    pub content_type: String,

    /// Content-Transfer-Encoding (`base64`, `quoted-printable`, `7bit`, ...).
    pub transfer_encoding: String,

    /// Filename from the `Content-Disposition` header.
    pub filename: String,

    /// The still-encoded body of the part.
    pub data: String,
}

/// A decoded attachment ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDownload {
    pub content_type: String,
    pub suggested_filename: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Content-derived key: byte-identical attachments share it.
    ///
    /// Hex of the first 16 bytes of SHA-256 over
    /// `content_type ‖ transfer_encoding ‖ filename ‖ data`.
    pub fn key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.content_type.as_bytes());
        hasher.update(self.transfer_encoding.as_bytes());
        hasher.update(self.filename.as_bytes());
        hasher.update(self.data.as_bytes());
        let digest = hasher.finalize();
        digest[..16].iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Apply the transfer decoding and return the raw payload.
    ///
    /// Unknown encodings (`7bit`, `8bit`, `binary`, ...) are served as-is.
    pub fn decode(&self) -> Result<Vec<u8>> {
        match self.transfer_encoding.trim().to_lowercase().as_str() {
            "base64" => {
                let compact: Vec<u8> = self
                    .data
                    .bytes()
                    .filter(|b| !b.is_ascii_whitespace())
                    .collect();
                base64::engine::general_purpose::STANDARD
                    .decode(compact)
                    .map_err(|e| {
                        FileMailerError::MalformedMessage(format!(
                            "attachment '{}' is not valid base64: {e}",
                            self.filename
                        ))
                    })
            }
            "quoted-printable" => quoted_printable::decode(
                self.data.as_bytes(),
                quoted_printable::ParseMode::Robust,
            )
            .map_err(|e| {
                FileMailerError::MalformedMessage(format!(
                    "attachment '{}' is not valid quoted-printable: {e}",
                    self.filename
                ))
            }),
            _ => Ok(self.data.clone().into_bytes()),
        }
    }

    /// Decode into an [`AttachmentDownload`].
    pub fn download(&self) -> Result<AttachmentDownload> {
        Ok(AttachmentDownload {
            content_type: self.content_type.clone(),
            suggested_filename: self.filename.clone(),
            bytes: self.decode()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(filename: &str, encoding: &str, data: &str) -> Attachment {
        Attachment {
            content_type: "text/plain".to_string(),
            transfer_encoding: encoding.to_string(),
            filename: filename.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_key_is_stable_and_content_derived() {
        let a = attachment("a.txt", "base64", "SGVsbG8=");
        let b = attachment("a.txt", "base64", "SGVsbG8=");
        let c = attachment("b.txt", "base64", "SGVsbG8=");
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
        assert_eq!(a.key().len(), 32);
    }

    #[test]
    fn test_decode_base64_with_line_breaks() {
        let a = attachment("a.txt", "base64", "SGVs\r\nbG8g\r\nd29y\r\nbGQ=");
        assert_eq!(a.decode().unwrap(), b"Hello world");
    }

    #[test]
    fn test_decode_quoted_printable() {
        let a = attachment("a.txt", "quoted-printable", "caf=C3=A9");
        assert_eq!(a.decode().unwrap(), "café".as_bytes());
    }

    #[test]
    fn test_decode_identity() {
        let a = attachment("a.txt", "7bit", "plain text");
        assert_eq!(a.decode().unwrap(), b"plain text");
    }

    #[test]
    fn test_decode_invalid_base64() {
        let a = attachment("a.txt", "base64", "!!!");
        assert!(matches!(
            a.decode(),
            Err(FileMailerError::MalformedMessage(_))
        ));
    }
}
