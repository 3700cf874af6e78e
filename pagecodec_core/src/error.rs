use thiserror::Error;

/// Errors surfaced by PLAIN decoding and by the compression codecs.
///
/// Every variant is fatal for the page being processed: a partially decoded
/// page has no meaning to the column reader, so nothing here is retried.
#[derive(Debug, Error)]
pub enum PageCodecError {
    /// Codec id outside the supported enumeration.
    #[error("invalid compression codec {0}")]
    InvalidCodec(i32),

    /// A streaming compressor stopped accepting input before the whole buffer was written.
    #[error("{codec}: short write, compressor accepted {accepted} of {supplied} bytes")]
    ShortWrite {
        codec: &'static str,
        accepted: usize,
        supplied: usize,
    },

    /// Input is not valid for the claimed codec or value type.
    ///
    /// `what` is the codec name for decompression failures and the value type
    /// name for PLAIN decode failures. `len` is the input length in bytes.
    #[error("malformed {what} buffer ({len} bytes): {reason}")]
    MalformedBuffer {
        what: &'static str,
        len: usize,
        reason: String,
    },

    /// A compressor stream failed while writing, flushing or finishing.
    #[error("{codec} stream error: {source}")]
    Stream {
        codec: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Physical type id with no PLAIN primitive layout in this crate.
    #[error("unsupported physical type {0}")]
    UnsupportedType(i32),
}

impl PageCodecError {
    pub fn malformed(what: &'static str, len: usize, reason: impl Into<String>) -> Self {
        PageCodecError::MalformedBuffer {
            what,
            len,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PageCodecError>;
