use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::{PageCodecError, Result};
use crate::format::{CODEC_GZIP, CODEC_LZ4, CODEC_SNAPPY, CODEC_UNCOMPRESSED, CODEC_ZSTD};

/// Compression algorithms a page may be stored with.
///
/// Closed on purpose: the dispatcher matches on this exhaustively, so adding
/// a variant fails to compile until every compress/uncompress site handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionCodec {
    Uncompressed,
    Snappy,
    Gzip,
    Lz4,
    Zstd,
}

impl CompressionCodec {
    pub const ALL: [CompressionCodec; 5] = [
        CompressionCodec::Uncompressed,
        CompressionCodec::Snappy,
        CompressionCodec::Gzip,
        CompressionCodec::Lz4,
        CompressionCodec::Zstd,
    ];

    /// Numeric id as stored in the file format's page headers.
    pub fn id(self) -> i32 {
        match self {
            CompressionCodec::Uncompressed => CODEC_UNCOMPRESSED,
            CompressionCodec::Snappy => CODEC_SNAPPY,
            CompressionCodec::Gzip => CODEC_GZIP,
            CompressionCodec::Lz4 => CODEC_LZ4,
            CompressionCodec::Zstd => CODEC_ZSTD,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CompressionCodec::Uncompressed => "uncompressed",
            CompressionCodec::Snappy => "snappy",
            CompressionCodec::Gzip => "gzip",
            CompressionCodec::Lz4 => "lz4",
            CompressionCodec::Zstd => "zstd",
        }
    }
}

impl TryFrom<i32> for CompressionCodec {
    type Error = PageCodecError;

    fn try_from(id: i32) -> Result<Self> {
        match id {
            CODEC_UNCOMPRESSED => Ok(CompressionCodec::Uncompressed),
            CODEC_SNAPPY => Ok(CompressionCodec::Snappy),
            CODEC_GZIP => Ok(CompressionCodec::Gzip),
            CODEC_LZ4 => Ok(CompressionCodec::Lz4),
            CODEC_ZSTD => Ok(CompressionCodec::Zstd),
            other => Err(PageCodecError::InvalidCodec(other)),
        }
    }
}

impl fmt::Display for CompressionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompressionCodec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uncompressed" | "none" => Ok(CompressionCodec::Uncompressed),
            "snappy" => Ok(CompressionCodec::Snappy),
            "gzip" | "gz" => Ok(CompressionCodec::Gzip),
            "lz4" => Ok(CompressionCodec::Lz4),
            "zstd" => Ok(CompressionCodec::Zstd),
            other => Err(format!(
                "unknown codec '{}'. Valid options: uncompressed, snappy, gzip, lz4, zstd",
                other
            )),
        }
    }
}

/// One compression algorithm bound to a [`CompressionCodec`] variant.
///
/// Implementations:
/// - Treat the input as read-only and never retain it across calls.
/// - Return `Cow::Borrowed` only when the output is the input itself
///   (the uncompressed codec); everything else hands back a fresh buffer
///   owned by the caller.
/// - Fully finalize any stream before returning; a partially flushed
///   buffer is never a valid result.
pub trait Codec: Send + Sync {
    fn codec(&self) -> CompressionCodec;

    /// Human-readable codec name for errors and CLI display.
    fn name(&self) -> &'static str {
        self.codec().name()
    }

    fn compress<'a>(&self, raw: &'a [u8]) -> Result<Cow<'a, [u8]>>;

    fn decompress<'a>(&self, compressed: &'a [u8]) -> Result<Cow<'a, [u8]>>;
}
