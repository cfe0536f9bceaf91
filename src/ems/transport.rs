//! # Bus Transmit Seam
//!
//! The protocol engine is transport-agnostic: received bytes are pushed in
//! by the caller, and outbound frames leave through the [`Transport`] trait.
//! A production implementation wraps a half-duplex serial port driver; the
//! test suite uses the in-memory mock from `transport_mock`.

/// Outcome of handing a frame to the line driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitStatus {
    /// Frame fully clocked out, bus released
    Ok,
    /// Another station drove the line mid-frame (collision)
    BreakDetected,
    /// The line driver did not complete within its slot time
    WatchdogTimeout,
}

impl TransmitStatus {
    pub fn is_ok(self) -> bool {
        self == TransmitStatus::Ok
    }
}

/// Sink for outbound EMS frames.
///
/// Implementations must transmit the whole buffer as one bus frame,
/// including the trailing break the EMS line discipline requires, and
/// report how the attempt ended. They must not retry internally; retry
/// policy belongs to the engine.
pub trait Transport {
    fn transmit(&mut self, frame: &[u8]) -> TransmitStatus;
}
