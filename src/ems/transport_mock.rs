//! Mock bus transport for testing
//!
//! This module provides an in-memory transport that records every frame
//! the engine transmits, so tests can assert on the exact wire bytes
//! without requiring actual hardware. Transmit failures can be scripted
//! to exercise the retry paths.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::transport::{TransmitStatus, Transport};

/// Transport that captures outbound frames in memory.
///
/// Clones share the same buffers, so a test can keep a handle while the
/// engine owns another.
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Every frame handed to `transmit`, in order
    frames: Arc<Mutex<Vec<Vec<u8>>>>,
    /// Scripted results consumed one per transmit; empty means `Ok`
    results: Arc<Mutex<VecDeque<TransmitStatus>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All frames transmitted so far.
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.frames.lock().unwrap().clone()
    }

    /// The most recently transmitted frame, if any.
    pub fn last_frame(&self) -> Option<Vec<u8>> {
        self.frames.lock().unwrap().last().cloned()
    }

    /// Number of transmit calls seen.
    pub fn sent_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    /// Script the result of the next transmit call.
    pub fn push_result(&self, status: TransmitStatus) {
        self.results.lock().unwrap().push_back(status);
    }

    /// Drop all recorded frames and scripted results.
    pub fn clear(&self) {
        self.frames.lock().unwrap().clear();
        self.results.lock().unwrap().clear();
    }
}

impl Transport for MockTransport {
    fn transmit(&mut self, frame: &[u8]) -> TransmitStatus {
        self.frames.lock().unwrap().push(frame.to_vec());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(TransmitStatus::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_frames_in_order() {
        let mock = MockTransport::new();
        let mut handle = mock.clone();
        handle.transmit(&[0x0B]);
        handle.transmit(&[0x8B]);

        assert_eq!(mock.sent_count(), 2);
        assert_eq!(mock.sent_frames(), vec![vec![0x0B], vec![0x8B]]);
        assert_eq!(mock.last_frame(), Some(vec![0x8B]));
    }

    #[test]
    fn test_scripted_failures_are_consumed_once() {
        let mock = MockTransport::new();
        mock.push_result(TransmitStatus::BreakDetected);

        let mut handle = mock.clone();
        assert_eq!(handle.transmit(&[0x01]), TransmitStatus::BreakDetected);
        assert_eq!(handle.transmit(&[0x01]), TransmitStatus::Ok);
    }

    #[test]
    fn test_clear_drops_frames_and_results() {
        let mock = MockTransport::new();
        mock.push_result(TransmitStatus::WatchdogTimeout);
        mock.clone().transmit(&[0x01]);
        mock.clear();

        assert_eq!(mock.sent_count(), 0);
        assert_eq!(mock.clone().transmit(&[0x02]), TransmitStatus::Ok);
    }
}
