//! Unit tests for the EMS CRC, an 8-bit table-driven checksum covering
//! every telegram byte except the CRC itself.

use ems_rs::ems::crc::{calculate, verify};

/// Tests that a captured boiler broadcast checksums correctly.
#[test]
fn test_crc_of_boiler_broadcast() {
    let body = [0x08, 0x00, 0x18, 0x00, 0x2E, 0x01, 0x1D, 0x64];
    assert_eq!(calculate(&body), 0x7C);
}

/// Tests that a read request header checksums correctly.
#[test]
fn test_crc_of_read_request() {
    assert_eq!(calculate(&[0x0B, 0x88, 0x02, 0x00, 0x20]), 0xBC);
    assert_eq!(calculate(&[0x0B, 0x88, 0x18, 0x00, 0x20]), 0xD4);
}

/// Tests that a thermostat write request checksums correctly.
#[test]
fn test_crc_of_write_request() {
    assert_eq!(calculate(&[0x0B, 0x17, 0xA8, 0x17, 0x02]), 0xB6);
}

/// Tests the empty-input edge case.
#[test]
fn test_crc_of_empty_input() {
    assert_eq!(calculate(&[]), 0x00);
}

/// Tests that verify accepts a telegram with a trailing valid CRC.
#[test]
fn test_verify_accepts_valid_telegram() {
    assert!(verify(&[0x08, 0x00, 0x18, 0x00, 0x2E, 0x01, 0x1D, 0x64, 0x7C]));
}

/// Tests that verify rejects a telegram whose CRC byte is wrong.
#[test]
fn test_verify_rejects_corrupt_telegram() {
    assert!(!verify(&[0x08, 0x00, 0x18, 0x00, 0x2E, 0x01, 0x1D, 0x64, 0x7D]));
}

/// Tests that flipping any single payload bit breaks verification.
#[test]
fn test_verify_detects_single_bit_flips() {
    let mut telegram = vec![0x08, 0x00, 0x18, 0x00, 0x2E, 0x01, 0x1D, 0x64, 0x7C];
    for byte in 0..telegram.len() - 1 {
        for bit in 0..8 {
            telegram[byte] ^= 1 << bit;
            assert!(!verify(&telegram), "flip in byte {} bit {} undetected", byte, bit);
            telegram[byte] ^= 1 << bit;
        }
    }
}
