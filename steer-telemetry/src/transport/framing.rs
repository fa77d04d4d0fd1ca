//! Length-prefixed frame reader
//!
//! Every bus message travels as a single frame:
//!
//! ```text
//! ┌──────────────────┬──────────────────────────┐
//! │ Length (4 bytes) │ Payload (variable)       │
//! │ Big-endian u32   │ JSON envelope            │
//! └──────────────────┴──────────────────────────┘
//! ```
//!
//! The reader accumulates bytes across reads, so a read timeout in the
//! middle of a frame never loses data.

use crate::types::{Result, TelemetryError};
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use std::io::{ErrorKind, Read, Write};

/// Size of the length prefix
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// Bytes requested from the transport per read
const READ_CHUNK_BYTES: usize = 16 * 1024;

/// Outcome of a single read from the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Bytes were appended to the buffer
    Data(usize),
    /// The read timed out (or was interrupted) without data
    Timeout,
    /// The peer closed the stream
    Eof,
}

/// Splits a byte stream into length-prefixed frames
pub struct FrameReader<R: Read> {
    inner: R,
    buffer: Vec<u8>,
    /// Start of unconsumed bytes in `buffer`
    start: usize,
    chunk: Box<[u8]>,
    max_frame_bytes: usize,
}

impl<R: Read> FrameReader<R> {
    /// Wrap a transport stream
    pub fn new(inner: R, max_frame_bytes: usize) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            start: 0,
            chunk: vec![0u8; READ_CHUNK_BYTES].into_boxed_slice(),
            max_frame_bytes,
        }
    }

    /// Read once from the transport into the internal buffer
    pub fn fill(&mut self) -> Result<Fill> {
        match self.inner.read(&mut self.chunk) {
            Ok(0) => Ok(Fill::Eof),
            Ok(n) => {
                // Compact once per read, not once per frame
                if self.start > 0 {
                    self.buffer.drain(..self.start);
                    self.start = 0;
                }
                self.buffer.extend_from_slice(&self.chunk[..n]);
                Ok(Fill::Data(n))
            }
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Ok(Fill::Timeout)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Pop the next complete frame payload from the buffer, if any
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>> {
        let pending = &self.buffer[self.start..];
        if pending.len() < LENGTH_PREFIX_BYTES {
            return Ok(None);
        }

        let size = BigEndian::read_u32(&pending[..LENGTH_PREFIX_BYTES]) as usize;
        if size > self.max_frame_bytes {
            return Err(TelemetryError::FrameTooLarge {
                size,
                limit: self.max_frame_bytes,
            });
        }

        let end = LENGTH_PREFIX_BYTES + size;
        if pending.len() < end {
            return Ok(None);
        }

        let payload = pending[LENGTH_PREFIX_BYTES..end].to_vec();
        self.start += end;
        Ok(Some(payload))
    }

    /// Number of buffered bytes not yet consumed as frames
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len() - self.start
    }
}

/// Write one length-prefixed frame
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let size = u32::try_from(payload.len()).map_err(|_| TelemetryError::FrameTooLarge {
        size: payload.len(),
        limit: u32::MAX as usize,
    })?;
    writer.write_u32::<BigEndian>(size)?;
    writer.write_all(payload)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that hands out at most `step` bytes per read
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_frames_split_across_reads() {
        let mut data = Vec::new();
        write_frame(&mut data, b"hello").unwrap();
        write_frame(&mut data, b"world!").unwrap();

        let mut reader = FrameReader::new(Trickle { data, pos: 0, step: 3 }, 64);
        let mut frames = Vec::new();
        loop {
            match reader.fill().unwrap() {
                Fill::Eof => break,
                _ => {
                    while let Some(frame) = reader.next_frame().unwrap() {
                        frames.push(frame);
                    }
                }
            }
        }

        assert_eq!(frames, vec![b"hello".to_vec(), b"world!".to_vec()]);
        assert_eq!(reader.pending_bytes(), 0);
    }

    #[test]
    fn test_many_frames_in_one_read() {
        let mut data = Vec::new();
        for i in 0..1000u32 {
            write_frame(&mut data, &i.to_be_bytes()).unwrap();
        }
        write_frame(&mut data, b"abcde").unwrap();

        // First read ends one byte into the last payload
        let step = 1000 * 8 + LENGTH_PREFIX_BYTES + 1;
        let mut reader = FrameReader::new(Trickle { data, pos: 0, step }, 64);
        assert_eq!(reader.fill().unwrap(), Fill::Data(step));

        for i in 0..1000u32 {
            assert_eq!(reader.next_frame().unwrap(), Some(i.to_be_bytes().to_vec()));
        }
        assert!(reader.next_frame().unwrap().is_none());
        assert_eq!(reader.pending_bytes(), LENGTH_PREFIX_BYTES + 1);

        assert_eq!(reader.fill().unwrap(), Fill::Data(4));
        // Consumed frames were dropped before appending
        assert_eq!(reader.buffer.len(), LENGTH_PREFIX_BYTES + 5);
        assert_eq!(reader.next_frame().unwrap(), Some(b"abcde".to_vec()));
        assert_eq!(reader.pending_bytes(), 0);
        assert_eq!(reader.fill().unwrap(), Fill::Eof);
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let mut data = Vec::new();
        write_frame(&mut data, &[0u8; 32]).unwrap();

        let mut reader = FrameReader::new(Cursor::new(data), 16);
        assert_eq!(reader.fill().unwrap(), Fill::Data(36));
        match reader.next_frame() {
            Err(TelemetryError::FrameTooLarge { size, limit }) => {
                assert_eq!(size, 32);
                assert_eq!(limit, 16);
            }
            other => panic!("expected FrameTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_stream_is_eof() {
        let mut reader = FrameReader::new(Cursor::new(Vec::new()), 16);
        assert_eq!(reader.fill().unwrap(), Fill::Eof);
        assert!(reader.next_frame().unwrap().is_none());
    }
}
