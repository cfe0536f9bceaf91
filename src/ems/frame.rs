//! # EMS Telegram Model and Framing
//!
//! This module provides the decode and encode paths for EMS bus telegrams.
//!
//! A structured telegram is `[src] [dest] [type] [offset] [data...] [crc]`.
//! The EMS 2.0 ("plus") variant signals itself with a third byte of 0xF0 or
//! above and carries a 16-bit type ID; 0xFF puts the type at bytes 4..5,
//! while 0xF9/0xF7 insert an extra byte that can shift the type position.
//!
//! Single-byte sequences are bus control signals (poll or write ack/nack)
//! and are not parsed here; the protocol engine handles them before framing.

use std::time::Instant;

use crate::constants::EMS_MAX_TELEGRAM_LENGTH;
use crate::error::EmsError;

/// A received telegram with its framing fields resolved.
#[derive(Debug, Clone)]
pub struct RxTelegram {
    /// Complete raw telegram including the trailing CRC
    pub raw: Vec<u8>,
    /// Arrival time, used for bus liveness tracking
    pub timestamp: Instant,
    /// Source device address, high bit stripped
    pub src: u8,
    /// Destination device address, high bit stripped (0x00 = broadcast)
    pub dest: u8,
    /// Logical type ID; 8-bit for legacy telegrams, 16-bit for EMS-plus
    pub type_id: u16,
    /// Payload offset from the header (partial-update position)
    pub offset: u8,
    /// True for the EMS 2.0 framing variant
    pub emsplus: bool,
    /// Index of the first payload byte within `raw`
    data_start: usize,
    /// Number of payload bytes (zero for content-less EMS-plus broadcasts)
    data_len: usize,
}

impl RxTelegram {
    /// Parses a raw byte sequence into a structured telegram.
    ///
    /// `raw` must be the complete telegram including the CRC byte. Sequences
    /// shorter than five bytes are noise and rejected; the CRC itself is
    /// *not* checked here (the engine validates it so the error counter
    /// lives in one place).
    pub fn parse(raw: &[u8], timestamp: Instant) -> Result<Self, EmsError> {
        if raw.len() < 5 {
            return Err(EmsError::TelegramTooShort(raw.len()));
        }

        let src = raw[0] & 0x7F;
        let dest = raw[1] & 0x7F;
        let offset = raw[3];
        let len = raw.len();

        let (emsplus, type_id, data_start, data_len) = if raw[2] >= 0xF0 {
            if raw[2] == 0xFF {
                // Type at bytes 4..5, payload from byte 6. Anything shorter
                // than the 7-byte header+CRC minimum has no complete type ID.
                if len < 7 {
                    return Err(EmsError::TelegramTooShort(len));
                }
                let type_id = u16::from_be_bytes([raw[4], raw[5]]);
                let data_len = len.saturating_sub(7);
                (true, type_id, 6, data_len)
            } else {
                // 0xF9/0xF7 carry an extra byte which shifts the type
                // position by one unless it is 0xFF.
                let shift = usize::from(raw[4] != 0xFF);
                if len < 7 + shift {
                    return Err(EmsError::TelegramTooShort(len));
                }
                let type_id = u16::from_be_bytes([raw[5 + shift], raw[6 + shift]]);
                let data_len = len.saturating_sub(9 + shift);
                (true, type_id, 6 + shift, data_len)
            }
        } else {
            (false, u16::from(raw[2]), 4, len - 5)
        };

        Ok(RxTelegram {
            raw: raw.to_vec(),
            timestamp,
            src,
            dest,
            type_id,
            offset,
            emsplus,
            data_start,
            data_len,
        })
    }

    /// The payload bytes (empty for content-less broadcasts).
    pub fn data(&self) -> &[u8] {
        &self.raw[self.data_start..self.data_start + self.data_len]
    }

    /// Payload length in bytes.
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    /// Unsigned byte at payload index `i`, `None` when out of range.
    pub fn u8_at(&self, i: usize) -> Option<u8> {
        self.data().get(i).copied()
    }

    /// Big-endian 16-bit value at payload index `i`.
    pub fn u16_at(&self, i: usize) -> Option<u16> {
        let d = self.data();
        Some(u16::from_be_bytes([*d.get(i)?, *d.get(i + 1)?]))
    }

    /// Signed big-endian 16-bit value at payload index `i`.
    pub fn i16_at(&self, i: usize) -> Option<i16> {
        self.u16_at(i).map(|v| v as i16)
    }

    /// Big-endian 24-bit value at payload index `i`.
    pub fn u24_at(&self, i: usize) -> Option<u32> {
        let d = self.data();
        Some(
            (u32::from(*d.get(i)?) << 16)
                + (u32::from(*d.get(i + 1)?) << 8)
                + u32::from(*d.get(i + 2)?),
        )
    }

    /// Single bit `bit` of the byte at payload index `i`.
    pub fn bit_at(&self, i: usize, bit: u8) -> Option<bool> {
        self.data().get(i).map(|b| (b >> bit) & 0x01 == 0x01)
    }
}

/// What an outbound telegram asks the destination to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxAction {
    /// Request `data_value` bytes of the given type
    Read,
    /// Write `data_value` (or a multi-byte body) at the given offset
    Write,
    /// Read back a single byte to confirm the last write took effect
    Validate,
    /// Transmit a prebuilt buffer verbatim, fire-and-forget
    Raw,
}

/// An outbound telegram awaiting transmission.
#[derive(Debug, Clone)]
pub struct TxTelegram {
    pub action: TxAction,
    /// Destination device address (EMS_ID_NONE entries are dropped unsent)
    pub dest: u8,
    /// Logical type ID; values above 0xFF select the EMS-plus header shape
    pub type_id: u16,
    /// Payload offset (0 = full read/write)
    pub offset: u8,
    /// Read: number of bytes requested. Write: the value to set.
    pub data_value: u8,
    /// Raw frame for `Raw`, or a multi-byte write body replacing
    /// `data_value` for long writes
    pub payload: Vec<u8>,
    /// Type to read back after a successful write, if confirmation is wanted
    pub type_to_validate: Option<u16>,
    /// Offset of the byte the validate step compares
    pub comparison_offset: u8,
    /// Value the validate step expects to read back
    pub comparison_value: u8,
    /// Read issued after a successful validate to refresh canonical state
    pub post_validate_read_type: Option<u16>,
    /// Flag an external publish once the matching response arrives
    pub force_refresh: bool,
    /// Enqueue time
    pub timestamp: Instant,
}

impl TxTelegram {
    /// A blank telegram; builders fill in what they need.
    pub fn new(action: TxAction, dest: u8, type_id: u16) -> Self {
        TxTelegram {
            action,
            dest,
            type_id,
            offset: 0,
            data_value: 0,
            payload: Vec::new(),
            type_to_validate: None,
            comparison_offset: 0,
            comparison_value: 0,
            post_validate_read_type: None,
            force_refresh: false,
            timestamp: Instant::now(),
        }
    }

    /// Builds the on-wire bytes for this telegram, CRC included.
    ///
    /// `our_id` is this station's bus address and `id_mask` the session
    /// addressing mask (0x80 on reversed/Junkers buses). Reads and
    /// validates set bit 7 of the destination byte; writes do not.
    pub fn encode(&self, our_id: u8, id_mask: u8) -> Vec<u8> {
        if self.action == TxAction::Raw {
            let mut out = self.payload.clone();
            let crc = super::crc::calculate(&out);
            out.push(crc);
            return out;
        }

        let mut out = Vec::with_capacity(EMS_MAX_TELEGRAM_LENGTH);
        out.push(our_id ^ id_mask);
        if self.action == TxAction::Write {
            out.push(self.dest ^ id_mask);
        } else {
            out.push(self.dest ^ 0x80 ^ id_mask);
        }

        if self.type_id > 0xFF {
            // EMS 2.0: fixed 0xFF marker, then offset, data byte and the
            // 16-bit type.
            out.push(0xFF);
            out.push(self.offset);
            out.push(self.data_value);
            out.push((self.type_id >> 8) as u8);
            out.push((self.type_id & 0xFF) as u8);
        } else {
            out.push(self.type_id as u8);
            out.push(self.offset);
            if self.payload.is_empty() {
                out.push(self.data_value);
            } else {
                out.extend_from_slice(&self.payload);
            }
        }

        let crc = super::crc::calculate(&out);
        out.push(crc);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[u8]) -> RxTelegram {
        RxTelegram::parse(raw, Instant::now()).unwrap()
    }

    #[test]
    fn parses_legacy_telegram() {
        // Boiler -> broadcast, UBAMonitorFast, offset 0, 3 data bytes.
        let t = parse(&[0x08, 0x00, 0x18, 0x00, 0x2E, 0x01, 0x1D, 0x7C]);
        assert!(!t.emsplus);
        assert_eq!(t.src, 0x08);
        assert_eq!(t.dest, 0x00);
        assert_eq!(t.type_id, 0x18);
        assert_eq!(t.offset, 0);
        assert_eq!(t.data(), &[0x2E, 0x01, 0x1D]);
    }

    #[test]
    fn strips_read_bit_from_destination() {
        let t = parse(&[0x0B, 0x88, 0x02, 0x00, 0x20, 0x00]);
        assert_eq!(t.dest, 0x08);
    }

    #[test]
    fn parses_emsplus_ff_telegram() {
        // Thermostat -> broadcast, type 0x01A5, 2 data bytes.
        let t = parse(&[0x10, 0x00, 0xFF, 0x00, 0x01, 0xA5, 0x00, 0xD7, 0x00]);
        assert!(t.emsplus);
        assert_eq!(t.type_id, 0x01A5);
        assert_eq!(t.data(), &[0x00, 0xD7]);
    }

    #[test]
    fn emsplus_broadcast_without_data() {
        let t = parse(&[0x10, 0x00, 0xFF, 0x06, 0x01, 0xA5, 0x22]);
        assert_eq!(t.data_len(), 0);
        assert!(t.data().is_empty());
    }

    #[test]
    fn parses_f9_variant_with_shift() {
        // byte4 != 0xFF shifts the type position by one.
        let raw = [0x10, 0x0B, 0xF9, 0x00, 0x11, 0x00, 0x01, 0xA5, 0x42, 0x99, 0x00];
        let t = parse(&raw);
        assert!(t.emsplus);
        assert_eq!(t.type_id, 0x01A5);
        assert_eq!(t.data_len(), raw.len() - 10);
    }

    #[test]
    fn parses_f9_variant_without_shift() {
        let raw = [0x10, 0x0B, 0xF9, 0x00, 0xFF, 0x01, 0xA5, 0x42, 0x43, 0x00];
        let t = parse(&raw);
        assert_eq!(t.type_id, 0x01A5);
        assert_eq!(t.data_len(), 1);
    }

    #[test]
    fn rejects_noise() {
        assert!(RxTelegram::parse(&[0x08, 0x00, 0x18, 0x00], Instant::now()).is_err());
    }

    #[test]
    fn accessors_skip_out_of_range() {
        let t = parse(&[0x08, 0x00, 0x18, 0x00, 0x2E, 0x01, 0x1D, 0x7C]);
        assert_eq!(t.u8_at(0), Some(0x2E));
        assert_eq!(t.u16_at(1), Some(0x011D));
        assert_eq!(t.u8_at(3), None);
        assert_eq!(t.u16_at(2), None);
        assert_eq!(t.u24_at(1), None);
        assert_eq!(t.bit_at(2, 0), Some(true));
        assert_eq!(t.bit_at(3, 0), None);
    }

    #[test]
    fn encodes_legacy_read() {
        let mut tx = TxTelegram::new(TxAction::Read, 0x08, 0x18);
        tx.data_value = 0x20;
        let bytes = tx.encode(0x0B, 0x00);
        assert_eq!(bytes.len(), 6);
        assert_eq!(&bytes[..5], &[0x0B, 0x88, 0x18, 0x00, 0x20]);
        assert!(super::super::crc::verify(&bytes));
    }

    #[test]
    fn encodes_legacy_write_without_read_bit() {
        let mut tx = TxTelegram::new(TxAction::Write, 0x17, 0xA8);
        tx.offset = 28;
        tx.data_value = 42;
        let bytes = tx.encode(0x0B, 0x00);
        assert_eq!(&bytes[..5], &[0x0B, 0x17, 0xA8, 28, 42]);
    }

    #[test]
    fn encodes_emsplus_read() {
        let mut tx = TxTelegram::new(TxAction::Read, 0x10, 0x01A5);
        tx.data_value = 0x20;
        let bytes = tx.encode(0x0B, 0x00);
        assert_eq!(&bytes[..7], &[0x0B, 0x90, 0xFF, 0x00, 0x20, 0x01, 0xA5]);
        assert!(super::super::crc::verify(&bytes));
    }

    #[test]
    fn applies_id_mask() {
        let mut tx = TxTelegram::new(TxAction::Read, 0x08, 0x02);
        tx.data_value = 0x20;
        let bytes = tx.encode(0x0B, 0x80);
        assert_eq!(bytes[0], 0x8B);
        assert_eq!(bytes[1], 0x08); // 0x08 ^ 0x80 ^ 0x80
    }

    #[test]
    fn framing_round_trip_legacy() {
        let mut tx = TxTelegram::new(TxAction::Read, 0x08, 0x33);
        tx.data_value = 0x20;
        let rx = parse(&tx.encode(0x0B, 0x00));
        assert_eq!(rx.src, 0x0B);
        assert_eq!(rx.dest, 0x08);
        assert_eq!(rx.type_id, 0x33);
        assert_eq!(rx.offset, 0);
        assert!(!rx.emsplus);
    }

    #[test]
    fn encodes_emsplus_write() {
        // Requests carry the data byte before the 16-bit type, unlike
        // responses where the type follows the 0xFF marker directly.
        let mut tx = TxTelegram::new(TxAction::Write, 0x10, 0x01B7);
        tx.offset = 0x0A;
        tx.data_value = 0x02;
        let bytes = tx.encode(0x0B, 0x00);
        assert_eq!(&bytes[..7], &[0x0B, 0x10, 0xFF, 0x0A, 0x02, 0x01, 0xB7]);
        assert!(super::super::crc::verify(&bytes));
    }
}
