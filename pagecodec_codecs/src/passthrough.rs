use std::borrow::Cow;

use pagecodec_core::{Codec, CompressionCodec, Result};

/// UNCOMPRESSED: pages are stored verbatim.
///
/// Both directions hand the caller's slice straight back, so the hot path
/// for uncompressed columns never copies the page.
pub struct PassThroughCodec;

impl Codec for PassThroughCodec {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Uncompressed
    }

    fn compress<'a>(&self, raw: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(raw))
    }

    fn decompress<'a>(&self, compressed: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(compressed))
    }
}
