//! Numeric ids and layout constants shared with the columnar file format.
//!
//! The ids mirror the format's own enumerations; they are read from page and
//! column-chunk headers by the caller and must never be renumbered here.

// ── Compression codec ids ──────────────────────────────────────────────────

pub const CODEC_UNCOMPRESSED: i32 = 0;
pub const CODEC_SNAPPY: i32 = 1;
pub const CODEC_GZIP: i32 = 2;
pub const CODEC_LZ4: i32 = 5;
pub const CODEC_ZSTD: i32 = 6;

// ── Physical type ids ──────────────────────────────────────────────────────

pub const TYPE_BOOLEAN: i32 = 0;
pub const TYPE_INT32: i32 = 1;
pub const TYPE_INT64: i32 = 2;
pub const TYPE_FLOAT: i32 = 4;
pub const TYPE_DOUBLE: i32 = 5;

// ── Codec tuning ───────────────────────────────────────────────────────────

/// Level used by the shared zstd compressor.
pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

/// Largest declared zstd frame content size that is decoded one-shot into a
/// pre-sized buffer (128 MiB). The size comes from an untrusted header, so
/// larger claims go through the streaming decoder, which grows its output as
/// data actually arrives.
pub const ZSTD_MAX_PREALLOC: u64 = 128 << 20;
