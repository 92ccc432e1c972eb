//! Semicolon-delimited text output.
//!
//! One header line, then one line per event:
//!
//! ```text
//! SourceTime;Side;Action;OrderId;Price;Qty;B0;BQ0;BN0;A0;AQ0;AN0
//! 1;1;A;1;100;50;100;50;1;;;
//! ```
//!
//! The six trailing fields are the best bid (price, quantity, count) and best
//! ask; a side without levels renders three empty fields. Lines are built as
//! bytes so the side and action tags are echoed exactly as they arrived.

use std::io::Write;

use crate::error::Result;
use crate::types::{BestLevel, EventRecord, Side};

/// Header line, without the trailing newline.
pub const HEADER: &str = "SourceTime;Side;Action;OrderId;Price;Qty;B0;BQ0;BN0;A0;AQ0;AN0";

/// Field separator.
pub const DELIMITER: u8 = b';';

/// Append one formatted line (with newline) to `out`.
pub fn push_record(out: &mut Vec<u8>, record: &EventRecord) {
    let event = &record.event;

    // Writing into a Vec cannot fail
    let _ = write!(out, "{}", event.source_time);
    out.push(DELIMITER);
    if event.side() != Side::None {
        out.push(event.side_tag);
    }
    out.push(DELIMITER);
    out.push(event.action_tag);
    out.push(DELIMITER);
    let _ = write!(out, "{};{};{};", event.order_id, event.price, event.qty);

    push_level(out, record.top.bid);
    out.push(DELIMITER);
    push_level(out, record.top.ask);
    out.push(b'\n');
}

fn push_level(out: &mut Vec<u8>, level: Option<BestLevel>) {
    match level {
        Some(level) => {
            let _ = write!(
                out,
                "{};{};{}",
                level.price, level.quantity, level.order_count
            );
        }
        None => out.extend_from_slice(&[DELIMITER, DELIMITER]),
    }
}

/// Format one record as a line (with newline).
pub fn format_record(record: &EventRecord) -> Vec<u8> {
    let mut line = Vec::with_capacity(96);
    push_record(&mut line, record);
    line
}

/// Streams records to any writer, header first.
pub struct CsvWriter<W: Write> {
    writer: W,
    line: Vec<u8>,
    records_written: u64,
}

impl<W: Write> CsvWriter<W> {
    /// Wrap `writer` and emit the header line.
    pub fn new(mut writer: W) -> Result<Self> {
        writer.write_all(HEADER.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(Self {
            writer,
            line: Vec::with_capacity(128),
            records_written: 0,
        })
    }

    /// Write one record.
    #[inline]
    pub fn write_record(&mut self, record: &EventRecord) -> Result<()> {
        self.line.clear();
        push_record(&mut self.line, record);
        self.writer.write_all(&self.line)?;
        self.records_written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Flush and return the inner writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BookEvent, TopOfBook};

    fn record(event: BookEvent, bid: Option<BestLevel>, ask: Option<BestLevel>) -> EventRecord {
        EventRecord {
            event,
            top: TopOfBook { bid, ask },
        }
    }

    fn line_of(record: &EventRecord) -> String {
        String::from_utf8(format_record(record)).unwrap()
    }

    #[test]
    fn test_both_sides_present() {
        let line = line_of(&record(
            BookEvent::add(Side::Ask, 4, 190, 20).with_source_time(1000),
            Some(BestLevel::new(105, 30, 1)),
            Some(BestLevel::new(190, 20, 1)),
        ));
        assert_eq!(line, "1000;2;A;4;190;20;105;30;1;190;20;1\n");
    }

    #[test]
    fn test_empty_sides_render_empty_fields() {
        let line = line_of(&record(
            BookEvent::clear().with_source_time(5),
            None,
            None,
        ));
        assert_eq!(line, "5;;Y;0;0;0;;;;;;\n");
        assert_eq!(line.matches(';').count(), 11);
    }

    #[test]
    fn test_one_sided() {
        let line = line_of(&record(
            BookEvent::add(Side::Bid, 1, 100, 50).with_source_time(1),
            Some(BestLevel::new(100, 50, 1)),
            None,
        ));
        assert_eq!(line, "1;1;A;1;100;50;100;50;1;;;\n");

        let line = line_of(&record(
            BookEvent::add(Side::Ask, 1, 100, 50).with_source_time(1),
            None,
            Some(BestLevel::new(100, 50, 1)),
        ));
        assert_eq!(line, "1;2;A;1;100;50;;;;100;50;1\n");
    }

    #[test]
    fn test_raw_tags_are_echoed() {
        let line = line_of(&record(
            BookEvent::from_tags(9, b'7', b'F', 0, 0, 0),
            None,
            None,
        ));
        assert!(line.starts_with("9;;F;"));
    }

    #[test]
    fn test_non_ascii_action_tag_written_as_single_byte() {
        let bytes = format_record(&record(
            BookEvent::from_tags(1, b'1', 0xC8, 2, 3, 4),
            None,
            None,
        ));
        assert_eq!(&bytes[..4], b"1;1;");
        assert_eq!(bytes[4], 0xC8);
        assert_eq!(bytes[5], DELIMITER);
        assert_eq!(&bytes[6..], b"2;3;4;;;;;;\n");
    }

    #[test]
    fn test_writer_passes_raw_tag_bytes_through() {
        let mut writer = CsvWriter::new(Vec::new()).unwrap();
        writer
            .write_record(&record(BookEvent::from_tags(7, b'2', 0xFF, 1, 1, 1), None, None))
            .unwrap();
        let bytes = writer.finish().unwrap();
        let data = &bytes[HEADER.len() + 1..];
        assert_eq!(data, b"7;2;\xFF;1;1;1;;;;;;\n");
    }

    #[test]
    fn test_writer_emits_header_first() {
        let mut writer = CsvWriter::new(Vec::new()).unwrap();
        writer
            .write_record(&record(BookEvent::clear(), None, None))
            .unwrap();
        assert_eq!(writer.records_written(), 1);

        let bytes = writer.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(lines.next(), Some("0;;Y;0;0;0;;;;;;"));
        assert_eq!(lines.next(), None);
    }
}
