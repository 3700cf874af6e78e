//! Write/drain helpers shared by the streaming codecs (gzip, LZ4 frame).

use std::io::{ErrorKind, Read, Write};

use pagecodec_core::{PageCodecError, Result};

/// Push all of `buf` into a compressor stream.
///
/// A single `write` may legitimately accept only part of the input, so this
/// loops; a write that accepts nothing while bytes remain is a short write.
pub(crate) fn write_fully<W: Write>(codec: &'static str, stream: &mut W, buf: &[u8]) -> Result<()> {
    let mut accepted = 0;
    while accepted < buf.len() {
        match stream.write(&buf[accepted..]) {
            Ok(0) => {
                return Err(PageCodecError::ShortWrite {
                    codec,
                    accepted,
                    supplied: buf.len(),
                })
            }
            Ok(n) => accepted += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => return Err(PageCodecError::Stream { codec, source }),
        }
    }
    Ok(())
}

pub(crate) fn flush<W: Write>(codec: &'static str, stream: &mut W) -> Result<()> {
    stream
        .flush()
        .map_err(|source| PageCodecError::Stream { codec, source })
}

/// Read a decompressor to end of stream.
pub(crate) fn drain<R: Read>(codec: &'static str, mut stream: R, compressed_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(compressed_len.saturating_mul(2));
    stream
        .read_to_end(&mut out)
        .map_err(|e| PageCodecError::malformed(codec, compressed_len, e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Accepts `limit` bytes in total, then reports zero-length writes.
    struct Stingy {
        limit: usize,
        taken: usize,
    }

    impl Write for Stingy {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.limit - self.taken).min(3);
            self.taken += n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn partial_writes_are_retried() {
        let mut w = Stingy { limit: 10, taken: 0 };
        write_fully("test", &mut w, &[7u8; 10]).unwrap();
        assert_eq!(w.taken, 10);
    }

    #[test]
    fn zero_length_write_is_short_write() {
        let mut w = Stingy { limit: 4, taken: 0 };
        match write_fully("test", &mut w, &[7u8; 10]) {
            Err(PageCodecError::ShortWrite {
                codec,
                accepted,
                supplied,
            }) => {
                assert_eq!(codec, "test");
                assert_eq!(accepted, 4);
                assert_eq!(supplied, 10);
            }
            other => panic!("expected ShortWrite, got {other:?}"),
        }
    }

    #[test]
    fn drain_maps_read_errors_to_malformed() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::InvalidData, "corrupt"))
            }
        }
        let err = drain("test", Broken, 12).unwrap_err();
        assert!(matches!(err, PageCodecError::MalformedBuffer { what: "test", len: 12, .. }));
    }
}
