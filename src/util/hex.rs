//! # Hex Encoding/Decoding Utilities
//!
//! Enhanced hex helpers built on the `hex` crate, used for parsing raw
//! telegram strings (the `send_raw` command surface) and for formatting
//! telegrams in log output.
//!
//! Raw telegram strings are byte pairs separated by spaces or commas, e.g.
//! `"0B 88 02 00 20"`.

use crate::error::EmsError;

/// Decode a hex string to bytes.
///
/// Accepts both uppercase and lowercase hex characters. Whitespace and
/// commas (the separators used in raw telegram strings) are stripped.
pub fn decode_hex(hex_str: &str) -> Result<Vec<u8>, EmsError> {
    let cleaned: String = hex_str
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    if cleaned.is_empty() || cleaned.len() % 2 != 0 {
        return Err(EmsError::InvalidHexString);
    }

    hex::decode(&cleaned).map_err(|_| EmsError::InvalidHexString)
}

/// Format bytes as "0B 88 02 00" with spaces between bytes, for logs.
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_accepts_spaced_pairs() {
        let bytes = decode_hex("0B 88 02 00 20").unwrap();
        assert_eq!(bytes, vec![0x0B, 0x88, 0x02, 0x00, 0x20]);
    }

    #[test]
    fn decode_rejects_odd_length() {
        assert!(decode_hex("0B 8").is_err());
        assert!(decode_hex("").is_err());
    }

    #[test]
    fn format_round_trips() {
        let bytes = [0x0B, 0x88, 0x02];
        assert_eq!(format_hex_compact(&bytes), "0B 88 02");
        assert_eq!(decode_hex(&format_hex_compact(&bytes)).unwrap(), bytes);
    }
}
