mod gzip_codec;
mod lz4_codec;
mod passthrough;
mod snappy_codec;
mod stream;
mod zstd_codec;

pub use gzip_codec::GzipCodec;
pub use lz4_codec::Lz4Codec;
pub use passthrough::PassThroughCodec;
pub use snappy_codec::SnappyCodec;
pub use zstd_codec::{shared_constructions, ZstdCodec};

use std::borrow::Cow;

use pagecodec_core::{Codec, CompressionCodec, Result};
use tracing::trace;

/// The implementation bound to `codec`.
///
/// Exhaustive on purpose: a new [`CompressionCodec`] variant does not compile
/// until it is wired in here.
pub fn codec_for(codec: CompressionCodec) -> &'static dyn Codec {
    match codec {
        CompressionCodec::Uncompressed => &PassThroughCodec,
        CompressionCodec::Snappy => &SnappyCodec,
        CompressionCodec::Gzip => &GzipCodec,
        CompressionCodec::Lz4 => &Lz4Codec,
        CompressionCodec::Zstd => &ZstdCodec,
    }
}

/// Resolve a codec from the numeric id carried in a page header.
///
/// Unknown ids fail with `InvalidCodec`; there is no fallback to the
/// uncompressed codec.
pub fn codec_by_id(id: i32) -> Result<&'static dyn Codec> {
    Ok(codec_for(CompressionCodec::try_from(id)?))
}

/// Compress `buf` with the codec named by `codec_id`.
pub fn compress(codec_id: i32, buf: &[u8]) -> Result<Cow<'_, [u8]>> {
    compress_with(CompressionCodec::try_from(codec_id)?, buf)
}

/// Decompress `buf` with the codec named by `codec_id`.
pub fn uncompress(codec_id: i32, buf: &[u8]) -> Result<Cow<'_, [u8]>> {
    uncompress_with(CompressionCodec::try_from(codec_id)?, buf)
}

pub fn compress_with(codec: CompressionCodec, buf: &[u8]) -> Result<Cow<'_, [u8]>> {
    let out = codec_for(codec).compress(buf)?;
    trace!(codec = codec.name(), input_len = buf.len(), output_len = out.len(), "compressed page");
    Ok(out)
}

pub fn uncompress_with(codec: CompressionCodec, buf: &[u8]) -> Result<Cow<'_, [u8]>> {
    let out = codec_for(codec).decompress(buf)?;
    trace!(codec = codec.name(), input_len = buf.len(), output_len = out.len(), "uncompressed page");
    Ok(out)
}
