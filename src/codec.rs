//! Fixed-layout binary event records.
//!
//! Each record is [`RECORD_SIZE`] bytes, integers big-endian:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 8 | source time |
//! | 8 | 1 | side tag (`'1'` bid, `'2'` ask) |
//! | 9 | 1 | action tag (`Y`/`F`/`A`/`M`/`D`) |
//! | 10 | 8 | order id |
//! | 18 | 4 | price |
//! | 22 | 4 | quantity |
//!
//! Decoding converts to host order; the book never sees wire bytes.

use std::io::{ErrorKind, Read, Write};

use crate::error::{Result, TobError};
use crate::types::BookEvent;

/// Size of one encoded event.
pub const RECORD_SIZE: usize = 26;

/// Read buffer used when decoding from files.
pub const IO_BUFFER_SIZE: usize = 1024 * 1024; // 1 MB

/// Decode one record.
#[inline]
pub fn decode_event(buf: &[u8; RECORD_SIZE]) -> BookEvent {
    let mut u64_bytes = [0u8; 8];
    let mut u32_bytes = [0u8; 4];

    u64_bytes.copy_from_slice(&buf[0..8]);
    let source_time = u64::from_be_bytes(u64_bytes);
    let side_tag = buf[8];
    let action_tag = buf[9];
    u64_bytes.copy_from_slice(&buf[10..18]);
    let order_id = u64::from_be_bytes(u64_bytes);
    u32_bytes.copy_from_slice(&buf[18..22]);
    let price = u32::from_be_bytes(u32_bytes);
    u32_bytes.copy_from_slice(&buf[22..26]);
    let qty = u32::from_be_bytes(u32_bytes);

    BookEvent::from_tags(source_time, side_tag, action_tag, order_id, price, qty)
}

/// Encode one record.
#[inline]
pub fn encode_event(event: &BookEvent) -> [u8; RECORD_SIZE] {
    let mut buf = [0u8; RECORD_SIZE];
    buf[0..8].copy_from_slice(&event.source_time.to_be_bytes());
    buf[8] = event.side_tag;
    buf[9] = event.action_tag;
    buf[10..18].copy_from_slice(&event.order_id.to_be_bytes());
    buf[18..22].copy_from_slice(&event.price.to_be_bytes());
    buf[22..26].copy_from_slice(&event.qty.to_be_bytes());
    buf
}

/// Write one encoded record.
pub fn write_event<W: Write>(writer: &mut W, event: &BookEvent) -> Result<()> {
    writer.write_all(&encode_event(event))?;
    Ok(())
}

/// Write a sequence of encoded records.
pub fn write_events<'a, W: Write>(
    writer: &mut W,
    events: impl IntoIterator<Item = &'a BookEvent>,
) -> Result<u64> {
    let mut written = 0u64;
    for event in events {
        write_event(writer, event)?;
        written += 1;
    }
    Ok(written)
}

/// Statistics for a decoding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Complete records decoded
    pub records_read: u64,

    /// Bytes consumed, including a truncated tail
    pub bytes_read: u64,
}

/// Streaming decoder over any byte source.
///
/// Yields `Ok(event)` per complete record. A clean end of input at a record
/// boundary ends iteration; a partial trailing record yields one
/// [`TobError::TruncatedRecord`] and then ends. I/O errors are yielded once
/// and end iteration as well.
///
/// # Example
///
/// ```
/// use tob_reconstructor::codec::{encode_event, EventDecoder};
/// use tob_reconstructor::{BookEvent, Side};
///
/// let bytes = encode_event(&BookEvent::add(Side::Bid, 1, 100, 50));
/// let events: Vec<_> = EventDecoder::new(&bytes[..]).collect::<Result<_, _>>().unwrap();
/// assert_eq!(events, vec![BookEvent::add(Side::Bid, 1, 100, 50)]);
/// ```
pub struct EventDecoder<R: Read> {
    reader: R,
    stats: DecoderStats,
    finished: bool,
}

impl<R: Read> EventDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            stats: DecoderStats::default(),
            finished: false,
        }
    }

    /// Get current statistics.
    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    /// Fill `buf` as far as the reader allows. Returns bytes read.
    fn fill(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> Iterator for EventDecoder<R> {
    type Item = Result<BookEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut buf = [0u8; RECORD_SIZE];
        let offset = self.stats.bytes_read;
        let len = match self.fill(&mut buf) {
            Ok(len) => len,
            Err(e) => {
                self.finished = true;
                log::error!("Failed to read event record at byte offset {offset}: {e}");
                return Some(Err(e.into()));
            }
        };
        self.stats.bytes_read += len as u64;

        if len == 0 {
            self.finished = true;
            return None;
        }

        if len < RECORD_SIZE {
            self.finished = true;
            log::warn!(
                "Input ends with a partial record: {len} of {RECORD_SIZE} bytes at offset {offset}"
            );
            return Some(Err(TobError::TruncatedRecord {
                offset,
                len,
                expected: RECORD_SIZE,
            }));
        }

        self.stats.records_read += 1;
        Some(Ok(decode_event(&buf)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, Side};

    #[test]
    fn test_decode_known_bytes() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x0102_0304_0506_0708u64.to_be_bytes());
        bytes.push(b'2');
        bytes.push(b'M');
        bytes.extend_from_slice(&99u64.to_be_bytes());
        bytes.extend_from_slice(&1_234u32.to_be_bytes());
        bytes.extend_from_slice(&56u32.to_be_bytes());
        assert_eq!(bytes.len(), RECORD_SIZE);

        let mut decoder = EventDecoder::new(bytes.as_slice());
        let event = decoder.next().unwrap().unwrap();
        assert_eq!(event.source_time, 0x0102_0304_0506_0708);
        assert_eq!(event.side(), Side::Ask);
        assert_eq!(event.action(), Some(Action::Modify));
        assert_eq!(event.order_id, 99);
        assert_eq!(event.price, 1_234);
        assert_eq!(event.qty, 56);
        assert!(decoder.next().is_none());
        assert_eq!(decoder.stats().records_read, 1);
    }

    #[test]
    fn test_encode_is_big_endian() {
        let event = BookEvent::add(Side::Bid, 1, 0x0A0B_0C0D, 2).with_source_time(3);
        let bytes = encode_event(&event);
        assert_eq!(&bytes[0..8], &[0, 0, 0, 0, 0, 0, 0, 3]);
        assert_eq!(bytes[8], b'1');
        assert_eq!(bytes[9], b'A');
        assert_eq!(&bytes[18..22], &[0x0A, 0x0B, 0x0C, 0x0D]);
    }

    #[test]
    fn test_empty_input() {
        let mut decoder = EventDecoder::new(&[][..]);
        assert!(decoder.next().is_none());
        assert_eq!(decoder.stats().bytes_read, 0);
    }

    #[test]
    fn test_truncated_tail() {
        let mut bytes = Vec::new();
        write_events(
            &mut bytes,
            &[
                BookEvent::add(Side::Bid, 1, 100, 5),
                BookEvent::add(Side::Ask, 2, 101, 6),
            ],
        )
        .unwrap();
        bytes.extend_from_slice(&[0u8; 10]);

        let mut decoder = EventDecoder::new(bytes.as_slice());
        assert!(decoder.next().unwrap().is_ok());
        assert!(decoder.next().unwrap().is_ok());
        match decoder.next() {
            Some(Err(TobError::TruncatedRecord {
                offset,
                len,
                expected,
            })) => {
                assert_eq!(offset, 2 * RECORD_SIZE as u64);
                assert_eq!(len, 10);
                assert_eq!(expected, RECORD_SIZE);
            }
            other => panic!("expected truncated record, got {other:?}"),
        }
        assert!(decoder.next().is_none());
        assert_eq!(decoder.stats().records_read, 2);
    }

    /// Reader that hands out one byte per call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    #[test]
    fn test_short_reads_are_reassembled() {
        let event = BookEvent::remove(Side::Ask, 77, 900).with_source_time(5);
        let bytes = encode_event(&event);
        let decoded: Vec<BookEvent> = EventDecoder::new(Trickle(&bytes))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(decoded, vec![event]);
    }

    #[test]
    fn test_unknown_tags_pass_through() {
        let event = BookEvent::from_tags(1, b'x', b'?', 3, 4, 5);
        let decoded = decode_event(&encode_event(&event));
        assert_eq!(decoded, event);
        assert_eq!(decoded.action(), None);
    }
}
