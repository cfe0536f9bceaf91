//! # Utility Modules
//!
//! Common helpers used throughout the ems-rs crate, currently hex
//! encoding/decoding for raw telegram input and log formatting.

pub mod hex;

pub use hex::{decode_hex, format_hex_compact};
