//! Decoding of the controller's packed event records.
//!
//! One interrupt delivers a buffer of fixed-stride sub-records. Byte 0 of
//! each record packs the key ID, the event kind and the press state; the
//! following byte(s) carry a touch strength whose width depends on the wire
//! format the controller reports at probe time.

use core::fmt;

const ID_MASK: u8 = 0x0F;
const KIND_GRIP_BIT: u8 = 0x40;
const PRESSED_BIT: u8 = 0x80;

/// Wire formats the controller advertises in its information registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFormat {
    /// 8-bit strength in byte 1.
    Format4,
    /// 16-bit big-endian strength in bytes 1-2.
    Format9,
}

impl EventFormat {
    /// Parses the raw format code. Unrecognized codes are a configuration
    /// error and are rejected at resolution time, never during decoding.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            4 => Some(EventFormat::Format4),
            9 => Some(EventFormat::Format9),
            _ => None,
        }
    }

    /// Width of the strength field in bytes.
    pub fn strength_width(self) -> usize {
        match self {
            EventFormat::Format4 => 1,
            EventFormat::Format9 => 2,
        }
    }

    /// Smallest record stride that carries a complete event.
    pub fn min_record_size(self) -> u8 {
        1 + self.strength_width() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Key,
    Grip,
}

/// One decoded event record. Lives only for the duration of a decode pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    /// 1-based key or grip channel ID.
    pub id: u8,
    pub kind: EventKind,
    pub pressed: bool,
    pub strength: u16,
}

/// Per-record decode failure. The batch continues with the next record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The record's ID falls outside `1..=key_count`.
    IdOutOfRange(u8),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::IdOutOfRange(id) => write!(f, "key ID {id} out of range"),
        }
    }
}

/// Lazy, single-pass decoder over one interrupt buffer.
///
/// Yields one item per whole stride in buffer order. A trailing partial
/// stride stops iteration; [`EventPackets::consumed`] tells how many bytes
/// were actually processed.
pub struct EventPackets<'a> {
    buf: &'a [u8],
    format: EventFormat,
    record_size: usize,
    key_count: u8,
    offset: usize,
}

impl<'a> EventPackets<'a> {
    pub fn new(buf: &'a [u8], format: EventFormat, record_size: u8, key_count: u8) -> Self {
        let record_size = record_size as usize;
        if record_size < format.min_record_size() as usize {
            log::error!("record size {record_size} too small for {format:?}");
        } else if buf.len() % record_size != 0 {
            log::warn!(
                "event buffer leaves {} trailing byte(s)",
                buf.len() % record_size
            );
        }
        Self {
            buf,
            format,
            record_size,
            key_count,
            offset: 0,
        }
    }

    /// Whole-record bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.offset
    }
}

impl Iterator for EventPackets<'_> {
    type Item = Result<EventRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.record_size < self.format.min_record_size() as usize {
            return None;
        }
        let record = self.buf.get(self.offset..self.offset + self.record_size)?;
        self.offset += self.record_size;

        let head = record[0];
        let id = head & ID_MASK;
        if id == 0 || id > self.key_count {
            return Some(Err(DecodeError::IdOutOfRange(id)));
        }

        let kind = if head & KIND_GRIP_BIT != 0 {
            EventKind::Grip
        } else {
            EventKind::Key
        };
        let strength = match self.format {
            EventFormat::Format4 => record[1] as u16,
            EventFormat::Format9 => u16::from_be_bytes([record[1], record[2]]),
        };

        Some(Ok(EventRecord {
            id,
            kind,
            pressed: head & PRESSED_BIT != 0,
            strength,
        }))
    }
}
