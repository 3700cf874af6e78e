use std::borrow::Cow;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use pagecodec_core::{Codec, CompressionCodec, PageCodecError, Result};

use crate::stream::{drain, flush, write_fully};

/// GZIP (RFC 1952) page codec.
///
/// Compression writes the whole page into a `GzEncoder`, flushes, then
/// finishes the stream so the trailer (CRC32 + ISIZE) is in place before
/// the bytes are handed back. Decompression accepts concatenated members.
pub struct GzipCodec;

impl Codec for GzipCodec {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Gzip
    }

    fn compress<'a>(&self, raw: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let codec = self.name();
        let mut encoder = GzEncoder::new(Vec::with_capacity(raw.len() / 2 + 32), Compression::default());
        write_fully(codec, &mut encoder, raw)?;
        flush(codec, &mut encoder)?;
        let compressed = encoder
            .finish()
            .map_err(|source| PageCodecError::Stream { codec, source })?;
        Ok(Cow::Owned(compressed))
    }

    fn decompress<'a>(&self, compressed: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let raw = drain(self.name(), MultiGzDecoder::new(compressed), compressed.len())?;
        Ok(Cow::Owned(raw))
    }
}
