use thiserror::Error;

/// Errors that can occur while decoding a CTF image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The 16-byte file signature did not match; the payload belongs to
    /// a different format, endianness, or was mangled in transfer
    #[error("CTF signature mismatch")]
    BadSignature,

    /// The stream ended in the middle of an element
    #[error("CTF stream truncated: needed {needed} more byte(s) at offset {offset}")]
    UnexpectedEnd { offset: usize, needed: usize },
}
