//! The ems module contains the core EMS bus protocol implementation:
//! CRC calculation, telegram framing, the transport abstraction and the
//! poll-driven protocol engine.

pub mod crc;
pub mod frame;
pub mod protocol;
pub mod transport;
pub mod transport_mock;

pub use frame::{RxTelegram, TxAction, TxTelegram};
pub use protocol::{EmsBus, TxState};
pub use transport::{TransmitStatus, Transport};
pub use transport_mock::MockTransport;
