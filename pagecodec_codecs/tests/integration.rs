/// End-to-end dispatcher tests: every codec round-trips, unknown ids fail
/// cleanly, and malformed input is reported rather than half-decoded.
use pagecodec_codecs::{compress, compress_with, uncompress, uncompress_with};
use pagecodec_core::{decode_int32s, encode_int32s, CompressionCodec, PageCodecError};
use proptest::prelude::*;

const MIB: usize = 1024 * 1024;

/// Generate `len` deterministic bytes using a simple LCG.
fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = seed;
    (0..len)
        .map(|_| {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (rng >> 56) as u8
        })
        .collect()
}

// ── tests ──────────────────────────────────────────────────────────────────

#[test]
fn test_empty_buffer_every_codec() {
    for codec in CompressionCodec::ALL {
        let compressed = compress(codec.id(), &[]).unwrap();
        let raw = uncompress(codec.id(), &compressed).unwrap();
        assert!(raw.is_empty(), "{codec}: empty buffer should round-trip to empty");
    }
}

#[test]
fn test_one_mib_repeated_byte_shrinks() {
    let data = vec![0xABu8; MIB];
    for codec in [CompressionCodec::Gzip, CompressionCodec::Lz4, CompressionCodec::Zstd] {
        let compressed = compress_with(codec, &data).unwrap();
        assert!(!compressed.is_empty(), "{codec}: compressed output should not be empty");
        assert!(
            compressed.len() < data.len(),
            "{codec} should compress a constant buffer: compressed={} raw={}",
            compressed.len(),
            data.len()
        );
        let raw = uncompress_with(codec, &compressed).unwrap();
        assert_eq!(raw.len(), MIB);
        assert!(raw.iter().all(|&b| b == 0xAB), "{codec}: round-trip should be byte-exact");
    }
}

#[test]
fn test_incompressible_data_roundtrips() {
    let data = pseudo_random_bytes(256 * 1024 + 17, 0xDEAD_BEEF);
    for codec in CompressionCodec::ALL {
        let compressed = compress_with(codec, &data).unwrap();
        let raw = uncompress_with(codec, &compressed).unwrap();
        assert_eq!(&raw[..], data.as_slice(), "{codec}: round-trip should be byte-exact");
    }
}

#[test]
fn test_invalid_codec_id() {
    match compress(999, b"page") {
        Err(PageCodecError::InvalidCodec(id)) => assert_eq!(id, 999),
        other => panic!("expected InvalidCodec, got {other:?}"),
    }
    match uncompress(999, b"page") {
        Err(PageCodecError::InvalidCodec(id)) => assert_eq!(id, 999),
        other => panic!("expected InvalidCodec, got {other:?}"),
    }
    let err = compress(999, b"page").unwrap_err().to_string();
    assert!(err.contains("999"), "error should name the codec id, got: {err}");
}

#[test]
fn test_reserved_format_codecs_are_invalid() {
    // LZO, BROTLI and LZ4_RAW have ids in the format but no implementation here.
    for id in [3, 4, 7] {
        assert!(matches!(compress(id, b"x"), Err(PageCodecError::InvalidCodec(got)) if got == id));
        assert!(matches!(uncompress(id, b"x"), Err(PageCodecError::InvalidCodec(got)) if got == id));
    }
}

#[test]
fn test_truncated_streams_are_malformed() {
    let data = pseudo_random_bytes(64 * 1024, 7);
    for codec in [
        CompressionCodec::Snappy,
        CompressionCodec::Gzip,
        CompressionCodec::Lz4,
        CompressionCodec::Zstd,
    ] {
        let compressed = compress_with(codec, &data).unwrap();
        let truncated = &compressed[..compressed.len() / 2];
        match uncompress_with(codec, truncated) {
            Err(PageCodecError::MalformedBuffer { what, len, .. }) => {
                assert_eq!(what, codec.name());
                assert_eq!(len, truncated.len());
            }
            other => panic!("{codec}: expected MalformedBuffer, got {other:?}"),
        }
    }
}

#[test]
fn test_lz4_frame_cut_before_end_mark_is_malformed() {
    // EOF on a block boundary: every block is intact, only the end mark is gone.
    let data = pseudo_random_bytes(200 * 1024, 11);
    let compressed = compress_with(CompressionCodec::Lz4, &data).unwrap();
    assert_eq!(&compressed[compressed.len() - 4..], &[0, 0, 0, 0]);
    let cut = &compressed[..compressed.len() - 4];
    match uncompress_with(CompressionCodec::Lz4, cut) {
        Err(PageCodecError::MalformedBuffer { what: "lz4", len, .. }) => assert_eq!(len, cut.len()),
        other => panic!("expected MalformedBuffer, got {other:?}"),
    }
}

#[test]
fn test_zstd_forged_content_size_is_malformed() {
    // Frame header claims 1 GiB of content; the only block is empty.
    let mut forged = vec![0x28, 0xB5, 0x2F, 0xFD, 0xA0];
    forged.extend_from_slice(&(1u32 << 30).to_le_bytes());
    forged.extend_from_slice(&[0x01, 0x00, 0x00]);
    assert!(matches!(
        uncompress_with(CompressionCodec::Zstd, &forged),
        Err(PageCodecError::MalformedBuffer { what: "zstd", len: 12, .. })
    ));
}

#[test]
fn test_plain_page_through_every_codec() {
    let values: Vec<i32> = (-5000..5000).collect();
    let page = encode_int32s(&values);
    for codec in CompressionCodec::ALL {
        let compressed = compress(codec.id(), &page).unwrap();
        let raw = uncompress(codec.id(), &compressed).unwrap();
        assert_eq!(decode_int32s(&raw).unwrap(), values, "{codec}");
    }
}

// ── properties ─────────────────────────────────────────────────────────────

fn any_codec() -> impl Strategy<Value = CompressionCodec> {
    prop::sample::select(CompressionCodec::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_every_codec_roundtrips(codec in any_codec(), buf in prop::collection::vec(any::<u8>(), 0..4096)) {
        let compressed = compress(codec.id(), &buf).unwrap();
        let raw = uncompress(codec.id(), &compressed).unwrap();
        prop_assert_eq!(&raw[..], buf.as_slice());
    }

    #[test]
    fn prop_uncompressed_is_identity(buf in prop::collection::vec(any::<u8>(), 0..1024)) {
        prop_assert_eq!(&compress(0, &buf).unwrap()[..], buf.as_slice());
        prop_assert_eq!(&uncompress(0, &buf).unwrap()[..], buf.as_slice());
    }

    #[test]
    fn prop_unknown_ids_never_produce_output(id in any::<i32>(), buf in prop::collection::vec(any::<u8>(), 0..64)) {
        prop_assume!(CompressionCodec::try_from(id).is_err());
        prop_assert!(matches!(compress(id, &buf), Err(PageCodecError::InvalidCodec(got)) if got == id));
        prop_assert!(matches!(uncompress(id, &buf), Err(PageCodecError::InvalidCodec(got)) if got == id));
    }
}
