use std::borrow::Cow;
use std::io;

use lz4_flex::frame::{FrameDecoder, FrameEncoder};
use pagecodec_core::{Codec, CompressionCodec, PageCodecError, Result};

use crate::stream::{drain, flush, write_fully};

const FRAME_MAGIC: u32 = 0x184D_2204;

const FLG_BLOCK_CHECKSUM: u8 = 0x10;
const FLG_CONTENT_SIZE: u8 = 0x08;
const FLG_CONTENT_CHECKSUM: u8 = 0x04;
const FLG_DICTIONARY_ID: u8 = 0x01;

const BLOCK_UNCOMPRESSED_BIT: u32 = 0x8000_0000;

/// LZ4 frame-format codec.
///
/// Same discipline as gzip: write everything, flush the pending block,
/// finish to emit the end mark, and only then read the output buffer.
pub struct Lz4Codec;

impl Codec for Lz4Codec {
    fn codec(&self) -> CompressionCodec {
        CompressionCodec::Lz4
    }

    fn compress<'a>(&self, raw: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let codec = self.name();
        let mut encoder = FrameEncoder::new(Vec::with_capacity(raw.len() / 2 + 32));
        write_fully(codec, &mut encoder, raw)?;
        flush(codec, &mut encoder)?;
        let compressed = encoder.finish().map_err(|e| PageCodecError::Stream {
            codec,
            source: io::Error::other(e),
        })?;
        Ok(Cow::Owned(compressed))
    }

    fn decompress<'a>(&self, compressed: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        check_frames_terminated(compressed)
            .map_err(|reason| PageCodecError::malformed(self.name(), compressed.len(), reason))?;
        let raw = drain(self.name(), FrameDecoder::new(compressed), compressed.len())?;
        Ok(Cow::Owned(raw))
    }
}

/// Walk the frame layout of `buf` and confirm that every frame reaches its
/// end mark.
///
/// The frame decoder takes EOF at a block boundary as the end of the stream,
/// so a frame cut between blocks would otherwise decode as a shorter page.
fn check_frames_terminated(buf: &[u8]) -> std::result::Result<(), String> {
    let mut pos = 0;
    while pos < buf.len() {
        let frame_start = pos;
        let magic = read_u32(buf, pos).ok_or("truncated frame magic number")?;
        pos += 4;
        if magic != FRAME_MAGIC {
            return Err(format!("unexpected magic number {magic:#010x} at offset {frame_start}"));
        }

        let flg = *buf.get(pos).ok_or("truncated frame descriptor")?;
        // FLG, BD and the header checksum, plus the optional fields.
        let mut descriptor = 3;
        if flg & FLG_CONTENT_SIZE != 0 {
            descriptor += 8;
        }
        if flg & FLG_DICTIONARY_ID != 0 {
            descriptor += 4;
        }
        pos += descriptor;
        if pos > buf.len() {
            return Err("truncated frame descriptor".into());
        }

        let block_trailer = if flg & FLG_BLOCK_CHECKSUM != 0 { 4 } else { 0 };
        loop {
            let block_start = pos;
            let word = read_u32(buf, pos)
                .ok_or_else(|| format!("frame at offset {frame_start} ends without an end mark"))?;
            pos += 4;
            if word == 0 {
                break;
            }
            pos += (word & !BLOCK_UNCOMPRESSED_BIT) as usize + block_trailer;
            if pos > buf.len() {
                return Err(format!("block at offset {block_start} runs past the end"));
            }
        }

        if flg & FLG_CONTENT_CHECKSUM != 0 {
            pos += 4;
            if pos > buf.len() {
                return Err("truncated content checksum".into());
            }
        }
    }
    Ok(())
}

fn read_u32(buf: &[u8], pos: usize) -> Option<u32> {
    let bytes = buf.get(pos..pos.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lz4_flex::frame::{BlockSize, FrameInfo};
    use std::io::Write;

    fn encode_with(info: FrameInfo, raw: &[u8]) -> Vec<u8> {
        let mut encoder = FrameEncoder::with_frame_info(info, Vec::new());
        encoder.write_all(raw).unwrap();
        encoder.finish().unwrap()
    }

    fn page(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    fn assert_malformed(buf: &[u8]) {
        match Lz4Codec.decompress(buf) {
            Err(PageCodecError::MalformedBuffer { what, len, .. }) => {
                assert_eq!(what, "lz4");
                assert_eq!(len, buf.len());
            }
            other => panic!("expected MalformedBuffer, got {other:?}"),
        }
    }

    #[test]
    fn cut_at_block_boundary_is_malformed() {
        let raw = page(200 * 1024);
        let info = FrameInfo::new().block_size(BlockSize::Max64KB);
        let compressed = encode_with(info, &raw);
        assert_eq!(&Lz4Codec.decompress(&compressed).unwrap()[..], raw.as_slice());

        // 7-byte descriptor (no optional fields), then the first block.
        let first_block = read_u32(&compressed, 7).unwrap() & !BLOCK_UNCOMPRESSED_BIT;
        let boundary = 7 + 4 + first_block as usize;
        assert!(boundary < compressed.len() - 4);
        assert_malformed(&compressed[..boundary]);
    }

    #[test]
    fn missing_end_mark_is_malformed() {
        let compressed = encode_with(FrameInfo::new(), &page(1000));
        assert_eq!(&compressed[compressed.len() - 4..], &[0, 0, 0, 0]);
        assert_malformed(&compressed[..compressed.len() - 4]);
    }

    #[test]
    fn optional_frame_fields_are_walked() {
        let raw = page(150 * 1024);
        let info = FrameInfo::new()
            .block_size(BlockSize::Max64KB)
            .block_checksums(true)
            .content_checksum(true)
            .content_size(Some(raw.len() as u64));
        let compressed = encode_with(info, &raw);
        assert_eq!(&Lz4Codec.decompress(&compressed).unwrap()[..], raw.as_slice());
        assert_malformed(&compressed[..compressed.len() - 4]);
    }

    #[test]
    fn concatenated_frames_decode() {
        let mut joined = Lz4Codec.compress(b"first ").unwrap().into_owned();
        joined.extend_from_slice(&Lz4Codec.compress(b"second").unwrap());
        assert_eq!(&Lz4Codec.decompress(&joined).unwrap()[..], b"first second");
    }

    #[test]
    fn skippable_frames_are_rejected() {
        let mut buf = 0x184D_2A50u32.to_le_bytes().to_vec();
        buf.extend_from_slice(&3u32.to_le_bytes());
        buf.extend_from_slice(b"xyz");
        assert_malformed(&buf);
    }

    #[test]
    fn oversized_block_length_is_malformed() {
        let mut compressed = Lz4Codec.compress(&page(100)).unwrap().into_owned();
        compressed[7..11].copy_from_slice(&0x7FFF_FFF0u32.to_le_bytes());
        assert_malformed(&compressed);
    }
}
