//! # ems-rs - A Rust Crate for EMS (Energy Management System) Bus Communication
//!
//! The ems-rs crate provides a Rust-based implementation of the EMS bus
//! protocol used by Buderus, Nefit, Sieger, Junkers and Worcester heating
//! equipment to connect boilers, thermostats, solar modules and heat pumps
//! over a half-duplex two-wire serial bus.
//!
//! ## Features
//!
//! - Parse and validate EMS and EMS-plus telegrams, including the Junkers
//!   reversed addressing variant
//! - Poll-driven transmit scheduler with read retries and write
//!   validation read-backs
//! - Decode broadcast and solicited telegrams from boilers (UBA monitor
//!   records), thermostats (RC10 to RC35, Easy, RC300), solar modules
//!   (SM10, SM100, ISM1) and heat pumps
//! - Auto-discover devices on the bus through their Version records
//! - High-level commands for thermostat setpoints and modes, warm water
//!   temperature and comfort modes, and boiler flow temperature
//! - Support for logging and error handling
//!
//! ## Usage
//!
//! To use the ems-rs crate in your Rust project, add the following to your
//! Cargo.toml file:
//!
//! ```toml
//! [dependencies]
//! ems-rs = "1.0.0"
//! ```
//!
//! The engine is transport-agnostic: implement [`Transport`] over your
//! serial layer, feed received bus frames into [`EmsBus::receive_telegram`]
//! and the engine answers polls, schedules queued commands and keeps the
//! device records up to date.
//!
//! ```rust
//! use ems_rs::{EmsBus, MockTransport};
//!
//! let mut bus = EmsBus::new(MockTransport::new());
//! bus.discover_devices().unwrap();
//! // feed frames from the UART:
//! bus.receive_telegram(&[0x08, 0x00, 0x18, 0x00, 0x2E, 0x01, 0x1D, 0x64, 0x7C]);
//! ```

pub mod commands;
pub mod constants;
pub mod decode;
pub mod devices;
pub mod ems;
pub mod error;
pub mod logging;
pub mod util;

pub use crate::error::EmsError;
pub use crate::logging::{init_logger, log_info};

// Core bus types
pub use commands::{TempKind, WwComfort};
pub use ems::{EmsBus, MockTransport, RxTelegram, TransmitStatus, Transport, TxAction, TxState, TxTelegram};

// Device records
pub use devices::{
    Boiler, DetectedDevice, DeviceState, HeatPump, SolarModule, Thermostat, ThermostatModel,
};
