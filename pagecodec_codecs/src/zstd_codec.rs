use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;
use pagecodec_core::format::{DEFAULT_ZSTD_LEVEL, ZSTD_MAX_PREALLOC};
use pagecodec_core::{Codec, CompressionCodec, PageCodecError, Result};
use parking_lot::Mutex;
use tracing::{debug, trace};
use zstd::bulk::{Compressor, Decompressor};

const CODEC_NAME: &str = "zstd";

static SHARED: OnceCell<ZstdShared> = OnceCell::new();
static CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

/// Process-wide zstd contexts, built on first use and never torn down.
///
/// The bulk contexts take `&mut self`, so each one sits behind its own lock:
/// concurrent compressions serialize on the encoder, concurrent
/// decompressions on the decoder, and the two never block each other.
struct ZstdShared {
    encoder: Mutex<Compressor<'static>>,
    decoder: Mutex<Decompressor<'static>>,
}

impl ZstdShared {
    /// Returns the shared contexts, constructing them exactly once.
    ///
    /// Concurrent first callers block until the winner finishes; a failed
    /// construction leaves the cell empty and is retried by the next call.
    fn get() -> Result<&'static ZstdShared> {
        SHARED.get_or_try_init(|| {
            let stream_err = |source: std::io::Error| PageCodecError::Stream {
                codec: CODEC_NAME,
                source,
            };
            let encoder = Compressor::new(DEFAULT_ZSTD_LEVEL).map_err(stream_err)?;
            let decoder = Decompressor::new().map_err(stream_err)?;
            let constructions = CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(level = DEFAULT_ZSTD_LEVEL, constructions, "constructed shared zstd contexts");
            Ok(ZstdShared {
                encoder: Mutex::new(encoder),
                decoder: Mutex::new(decoder),
            })
        })
    }
}

/// Number of times the shared zstd contexts have been constructed in this
/// process: 0 before first use, 1 afterwards.
pub fn shared_constructions() -> usize {
    CONSTRUCTIONS.load(Ordering::SeqCst)
}

/// Zstandard page codec.
///
/// One-shot compression and decompression against the shared contexts, so
/// a page never pays for context allocation. Frames written here always
/// declare their content size; anything else is decoded with the streaming
/// decoder.
pub struct ZstdCodec;

impl Codec for ZstdCodec {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Zstd
    }

    fn compress<'a>(&self, raw: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let shared = ZstdShared::get()?;
        let compressed = shared
            .encoder
            .lock()
            .compress(raw)
            .map_err(|source| PageCodecError::Stream {
                codec: CODEC_NAME,
                source,
            })?;
        Ok(Cow::Owned(compressed))
    }

    fn decompress<'a>(&self, compressed: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let shared = ZstdShared::get()?;

        if let Some(size) = one_shot_capacity(compressed) {
            let mut raw = Vec::new();
            raw.try_reserve_exact(size).map_err(|e| {
                PageCodecError::malformed(
                    CODEC_NAME,
                    compressed.len(),
                    format!("cannot allocate the declared {size} bytes: {e}"),
                )
            })?;
            shared
                .decoder
                .lock()
                .decompress_to_buffer(compressed, &mut raw)
                .map_err(|e| PageCodecError::malformed(CODEC_NAME, compressed.len(), e.to_string()))?;
            return Ok(Cow::Owned(raw));
        }

        trace!(input_len = compressed.len(), "decoding zstd page with the streaming decoder");
        let raw = zstd::stream::decode_all(compressed)
            .map_err(|e| PageCodecError::malformed(CODEC_NAME, compressed.len(), e.to_string()))?;
        Ok(Cow::Owned(raw))
    }
}

/// Output size for a one-shot decode, if `compressed` allows one.
///
/// That requires exactly one complete frame whose header declares a content
/// size no larger than [`ZSTD_MAX_PREALLOC`]. Concatenated frames, frames
/// without a declared size, oversized claims and truncated input all go to
/// the streaming decoder, which only grows its output as data decodes.
fn one_shot_capacity(compressed: &[u8]) -> Option<usize> {
    let frame_len = zstd::zstd_safe::find_frame_compressed_size(compressed).ok()?;
    if frame_len != compressed.len() {
        return None;
    }
    let declared = zstd::zstd_safe::get_frame_content_size(compressed).ok()??;
    if declared > ZSTD_MAX_PREALLOC {
        return None;
    }
    usize::try_from(declared).ok()
}
