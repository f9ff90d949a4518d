//! Fixed-width records and the line assembler used by every builder.

use crate::error::{CnabError, Result};
use crate::format;
use std::fmt;

/// Width of every line in the file.
pub const LINE_WIDTH: usize = 240;

/// Batch number written in file-header records.
pub const FILE_HEADER_BATCH: &str = "0000";

/// Batch number written in the file trailer.
pub const FILE_TRAILER_BATCH: &str = "9999";

/// Detail segment letter, written at position 14 of detail records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    A,
    B,
    C,
    D,
    J,
    J52,
    J52Pix,
    N,
    O,
    P,
    Q,
    R,
    W,
}

impl Segment {
    /// Letter written in the segment column. J-52 variants share `J`.
    pub fn letter(&self) -> char {
        match self {
            Segment::A => 'A',
            Segment::B => 'B',
            Segment::C => 'C',
            Segment::D => 'D',
            Segment::J | Segment::J52 | Segment::J52Pix => 'J',
            Segment::N => 'N',
            Segment::O => 'O',
            Segment::P => 'P',
            Segment::Q => 'Q',
            Segment::R => 'R',
            Segment::W => 'W',
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::J52 => f.write_str("J-52"),
            Segment::J52Pix => f.write_str("J-52-PIX"),
            other => write!(f, "{}", other.letter()),
        }
    }
}

/// Kind of a record, following the record-type digit at position 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    FileHeader,
    BatchHeader,
    Detail(Segment),
    BatchTrailer,
    FileTrailer,
}

impl RecordKind {
    /// Record-type digit.
    pub fn code(&self) -> char {
        match self {
            RecordKind::FileHeader => '0',
            RecordKind::BatchHeader => '1',
            RecordKind::Detail(_) => '3',
            RecordKind::BatchTrailer => '5',
            RecordKind::FileTrailer => '9',
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::FileHeader => f.write_str("file header"),
            RecordKind::BatchHeader => f.write_str("batch header"),
            RecordKind::Detail(segment) => write!(f, "segment {}", segment),
            RecordKind::BatchTrailer => f.write_str("batch trailer"),
            RecordKind::FileTrailer => f.write_str("file trailer"),
        }
    }
}

/// One 240-character line, tagged with its kind. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    kind: RecordKind,
    line: String,
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.line
    }

    /// Segment of a detail record.
    pub fn segment(&self) -> Option<Segment> {
        match self.kind {
            RecordKind::Detail(segment) => Some(segment),
            _ => None,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

/// Fields shared by every detail record: bank, batch and sequence number.
#[derive(Debug, Clone, Copy)]
pub struct DetailKey<'a> {
    pub bank_code: &'a str,
    pub batch: u32,
    pub sequence: u32,
}

/// Accumulates formatted fields in column order.
pub(crate) struct Line {
    kind: RecordKind,
    buf: String,
}

impl Line {
    /// Starts a record with bank code, batch code and record-type digit.
    pub fn start(kind: RecordKind, bank_code: &str, batch: &str) -> Self {
        let mut buf = String::with_capacity(LINE_WIDTH);
        buf.push_str(&format::numeric(bank_code, 3));
        buf.push_str(&format::numeric(batch, 4));
        buf.push(kind.code());
        Line { kind, buf }
    }

    /// Starts a detail record up to and including the segment letter.
    pub fn detail(segment: Segment, key: &DetailKey<'_>) -> Self {
        let kind = RecordKind::Detail(segment);
        let mut line = Line::start(kind, key.bank_code, &key.batch.to_string());
        line.buf.push_str(&format::number(u64::from(key.sequence), 5));
        line.buf.push(segment.letter());
        line
    }

    pub fn push(&mut self, field: impl AsRef<str>) -> &mut Self {
        self.buf.push_str(field.as_ref());
        self
    }

    /// Appends `width` spaces.
    pub fn blank(&mut self, width: usize) -> &mut Self {
        self.push(format::blanks(width))
    }

    /// Appends `width` zeros.
    pub fn zero(&mut self, width: usize) -> &mut Self {
        self.push(format::zeros(width))
    }

    /// Checks the width and seals the record.
    pub fn finish(self) -> Result<Record> {
        let length = self.buf.chars().count();
        if length != LINE_WIDTH || self.buf.len() != LINE_WIDTH {
            return Err(CnabError::MalformedRecord {
                record: self.kind.to_string(),
                length,
            });
        }
        Ok(Record {
            kind: self.kind,
            line: self.buf,
        })
    }
}
