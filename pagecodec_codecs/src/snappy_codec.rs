use std::borrow::Cow;
use std::io;

use pagecodec_core::{Codec, CompressionCodec, PageCodecError, Result};

/// Snappy raw block format (no stream framing, no CRC chunks).
///
/// The block carries its own uncompressed length as a varint preamble, so
/// decompression allocates the output exactly once.
pub struct SnappyCodec;

impl Codec for SnappyCodec {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Snappy
    }

    fn compress<'a>(&self, raw: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let compressed = snap::raw::Encoder::new()
            .compress_vec(raw)
            .map_err(|e| PageCodecError::Stream {
                codec: self.name(),
                source: io::Error::other(e),
            })?;
        Ok(Cow::Owned(compressed))
    }

    fn decompress<'a>(&self, compressed: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let raw = snap::raw::Decoder::new()
            .decompress_vec(compressed)
            .map_err(|e| PageCodecError::malformed(self.name(), compressed.len(), e.to_string()))?;
        Ok(Cow::Owned(raw))
    }
}
