//! # EMS Bus Protocol Engine
//!
//! Single-threaded, callback-driven engine for the EMS heating bus. The
//! caller's UART layer pushes complete bus frames in via
//! [`EmsBus::receive_telegram`]; outbound frames leave through the
//! [`Transport`] the bus was built with. There is no internal thread or
//! timer: all transmit opportunities come from poll tokens the bus master
//! hands us, so everything is driven from the receive path.
//!
//! ## Transmit state machine
//!
//! The engine starts in `ReverseDetectPending` until the first CRC-valid
//! telegram reveals the bus flavor (Buderus or Junkers addressing, the
//! "ID mask"). From `Idle`, the head of the Tx queue is sent when our poll
//! token arrives, moving to `WaitingForResponse`. The next bus event
//! (matching response, write ack, or any other telegram) releases it back
//! to `Idle`. Only one telegram is ever in flight.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::constants::*;
use crate::decode;
use crate::devices::{tables, DetectedDevice, DeviceState};
use crate::logging::{log_debug, log_error, log_info, log_warn};
use crate::util::format_hex_compact;

use super::crc;
use super::frame::{RxTelegram, TxAction, TxTelegram};
use super::transport::Transport;

/// Transmit side of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    /// Waiting for the first valid telegram to learn the bus addressing
    ReverseDetectPending,
    /// Free to transmit on the next poll token
    Idle,
    /// A read/write/validate is on the wire, awaiting the reply
    WaitingForResponse,
}

/// Counters and liveness flags, owned by the engine.
#[derive(Debug, Clone)]
pub(crate) struct SysStatus {
    pub rx_pkgs: u32,
    pub tx_pkgs: u32,
    pub crc_errors: u32,
    pub id_mask: u8,
    pub tx_state: TxState,
    pub tx_capable: bool,
    pub tx_disabled: bool,
    pub poll_enabled: bool,
    pub bus_connected: bool,
    pub last_rx: Option<Instant>,
    pub last_poll: Option<Instant>,
    pub poll_interval: Option<Duration>,
    pub tx_retry_count: u8,
    pub refreshed: bool,
}

impl Default for SysStatus {
    fn default() -> Self {
        SysStatus {
            rx_pkgs: 0,
            tx_pkgs: 0,
            crc_errors: 0,
            id_mask: 0x00,
            tx_state: TxState::ReverseDetectPending,
            tx_capable: false,
            tx_disabled: false,
            poll_enabled: true,
            bus_connected: false,
            last_rx: None,
            last_poll: None,
            poll_interval: None,
            tx_retry_count: 0,
            refreshed: false,
        }
    }
}

/// The EMS bus engine. Owns the device records, detected-devices list and
/// the Tx queue.
pub struct EmsBus<T: Transport> {
    pub(crate) transport: T,
    pub(crate) status: SysStatus,
    pub(crate) tx_queue: VecDeque<TxTelegram>,
    pub(crate) devices: DeviceState,
    pub(crate) detected: Vec<DetectedDevice>,
}

impl<T: Transport> EmsBus<T> {
    pub fn new(transport: T) -> Self {
        EmsBus {
            transport,
            status: SysStatus::default(),
            tx_queue: VecDeque::with_capacity(EMS_TX_QUEUE_CAPACITY),
            devices: DeviceState::default(),
            detected: Vec::new(),
        }
    }

    /// Feeds one complete bus frame into the engine. `frame` is everything
    /// between two breaks, CRC included for structured telegrams.
    pub fn receive_telegram(&mut self, frame: &[u8]) {
        // until we know the bus addressing flavor, only a CRC-valid
        // telegram is accepted and everything else is ignored
        if self.status.tx_state == TxState::ReverseDetectPending {
            if frame.len() >= 5 && crc::verify(frame) {
                self.status.tx_state = TxState::Idle;
                self.status.id_mask = frame[0] & 0x80;
                log_info(&format!(
                    "Bus detected, addressing mask 0x{:02X}",
                    self.status.id_mask
                ));
            } else {
                return;
            }
        }

        // single bytes are bus control signals, not telegrams
        if frame.len() == 1 {
            self.handle_control_byte(frame[0]);
            return;
        }

        // noise, too short to carry a header and CRC
        if frame.len() <= 4 {
            return;
        }

        if !crc::verify(frame) {
            self.status.crc_errors += 1;
            log_debug(&format!("Corrupt telegram: {}", format_hex_compact(frame)));
            return;
        }

        let now = Instant::now();
        let rx = match RxTelegram::parse(frame, now) {
            Ok(rx) => rx,
            Err(e) => {
                log_debug(&format!("Unparseable telegram: {}", e));
                return;
            }
        };

        // any valid telegram proves the bus is alive
        self.status.last_rx = Some(now);
        self.status.bus_connected = true;

        self.process_type(rx);
    }

    /// Poll tokens and write acks arrive as bare single bytes.
    fn handle_control_byte(&mut self, value: u8) {
        if (value ^ 0x80 ^ self.status.id_mask) == EMS_ID_ME {
            // the master polled us: this is our transmit slot
            self.status.tx_capable = true;
            let now = Instant::now();
            if let Some(last) = self.status.last_poll {
                self.status.poll_interval = Some(now.duration_since(last));
            }
            self.status.last_poll = Some(now);

            if !self.tx_queue.is_empty() && self.status.tx_state == TxState::Idle {
                self.send_telegram();
            } else if self.status.poll_enabled {
                self.send_poll_ack();
            }
        } else if self.status.tx_state == TxState::WaitingForResponse {
            if value == EMS_TX_SUCCESS {
                self.status.tx_pkgs += 1;
                // free the bus, then queue the read-back check
                self.send_poll_ack();
                self.create_validate();
            } else if value == EMS_TX_ERROR {
                log_warn("Write command failed from host");
                self.send_poll_ack();
                self.remove_tx_head();
            }
        }
    }

    /// Releases the bus after we consumed a telegram addressed to us.
    fn send_poll_ack(&mut self) {
        let ack = [EMS_ID_ME ^ self.status.id_mask];
        self.transport.transmit(&ack);
    }

    /// Transmits the head of the Tx queue. Called from our poll slot.
    fn send_telegram(&mut self) {
        let Some(head) = self.tx_queue.front() else {
            return;
        };

        if self.status.tx_disabled {
            self.tx_queue.pop_front();
            log_info("In listen mode. All Tx is disabled.");
            return;
        }

        if head.dest == EMS_ID_NONE {
            self.tx_queue.pop_front();
            return;
        }

        if head.action == TxAction::Raw {
            // fire and forget
            let bytes = head.encode(EMS_ID_ME, self.status.id_mask);
            log_debug(&format!("Sending raw: {}", format_hex_compact(&bytes)));
            let status = self.transport.transmit(&bytes);
            if !status.is_ok() {
                log_error(&format!("Error sending raw telegram: {:?}", status));
            }
            self.tx_queue.pop_front();
            return;
        }

        let bytes = head.encode(EMS_ID_ME, self.status.id_mask);
        log_debug(&format!(
            "Sending {:?} of type 0x{:02X} to 0x{:02X}: {}",
            head.action,
            head.type_id,
            head.dest,
            format_hex_compact(&bytes)
        ));

        let status = self.transport.transmit(&bytes);
        if status.is_ok() {
            self.status.tx_state = TxState::WaitingForResponse;
        } else {
            // stay in Idle so the entry gets another chance on the next
            // poll, but bound the attempts like a failed read
            self.status.tx_state = TxState::Idle;
            log_error(&format!("Error sending telegram: {:?}", status));
            self.status.tx_retry_count += 1;
            if self.status.tx_retry_count > EMS_TX_RETRY_LIMIT {
                log_warn("Send failed repeatedly. Giving up, removing from queue");
                self.remove_tx_head();
            }
        }
    }

    /// Turns the write at the head of the queue into a validate request
    /// after the master acked it.
    fn create_validate(&mut self) {
        self.status.tx_state = TxState::Idle;

        let Some(head) = self.tx_queue.front() else {
            return;
        };

        // only a write with a declared validate type gets a read-back
        if head.action != TxAction::Write || head.type_to_validate.is_none() {
            self.tx_queue.pop_front();
            return;
        }

        let mut validate = head.clone();
        validate.action = TxAction::Validate;
        validate.offset = validate.comparison_offset;
        validate.data_value = 1; // fetch a single byte
        validate.payload.clear();

        self.tx_queue.pop_front();
        self.tx_queue.push_front(validate);
    }

    /// Drops the in-flight entry and releases the Tx lock.
    fn remove_tx_head(&mut self) {
        self.tx_queue.pop_front();
        self.status.tx_state = TxState::Idle;
    }

    /// Reconciles a validated telegram against the in-flight Tx entry,
    /// then decodes it.
    fn process_type(&mut self, rx: RxTelegram) {
        // an echo of ourselves from the master, nothing to do
        if rx.src == EMS_ID_ME {
            log_debug("Ignoring echo of our own telegram");
            return;
        }

        // nothing of ours on the wire: plain broadcast traffic
        if self.status.tx_state != TxState::WaitingForResponse {
            self.dispatch_telegram(&rx);
            return;
        }

        // release the Tx lock
        self.status.tx_state = TxState::Idle;

        // responses to a read/validate are addressed to us; anything else
        // means our request went unanswered
        if rx.dest != EMS_ID_ME {
            self.remove_tx_head();
            self.dispatch_telegram(&rx);
            return;
        }

        let Some(head) = self.tx_queue.front().cloned() else {
            self.dispatch_telegram(&rx);
            return;
        };

        match head.action {
            TxAction::Read => {
                if rx.src == (head.dest & 0x7F) && rx.type_id == head.type_id {
                    // the read we asked for
                    self.remove_tx_head();
                    self.status.rx_pkgs += 1;
                    self.status.refreshed = head.force_refresh;
                } else if rx.data_len() == 0 {
                    // empty reply: the device does not know this type
                    self.remove_tx_head();
                } else {
                    self.status.tx_retry_count += 1;
                    if self.status.tx_retry_count >= EMS_TX_RETRY_LIMIT {
                        log_warn("Read failed. Giving up, removing from queue");
                        self.remove_tx_head();
                    } else {
                        log_info(&format!(
                            "Read failed. Retrying attempt {}/{}...",
                            self.status.tx_retry_count, EMS_TX_RETRY_LIMIT
                        ));
                    }
                }
                self.dispatch_telegram(&rx);
            }
            TxAction::Write => {
                // writes are acked with a single byte, never a telegram
                log_error("Write response arrived as a telegram, should not happen");
            }
            TxAction::Validate => {
                if rx.u8_at(0) == Some(head.comparison_value) {
                    // the write took effect
                    self.remove_tx_head();
                    log_info(&format!("Write to 0x{:02X} was successful", head.dest));
                    if let Some(read_type) = head.post_validate_read_type {
                        let _ = self.enqueue_read(read_type, head.dest, true);
                    }
                } else {
                    log_info(&format!(
                        "Last write failed. Compared set value 0x{:02X} with received value {:?}",
                        head.comparison_value,
                        rx.u8_at(0)
                    ));
                    self.status.tx_retry_count += 1;
                    if self.status.tx_retry_count > EMS_TX_RETRY_LIMIT {
                        log_warn("Write failed. Giving up, removing from queue");
                        self.remove_tx_head();
                    } else {
                        // turn the validate back into a write and try again
                        if let Some(mut retry) = self.tx_queue.pop_front() {
                            retry.action = TxAction::Write;
                            retry.data_value = retry.comparison_value;
                            retry.offset = retry.comparison_offset;
                            self.tx_queue.push_front(retry);
                        }
                    }
                }
            }
            TxAction::Raw => {
                // raw telegrams are popped right after sending
            }
        }

        // we consumed a telegram addressed to us, release the bus
        self.send_poll_ack();
    }

    /// Runs the decoders over a telegram and resets the Tx lock.
    fn dispatch_telegram(&mut self, rx: &RxTelegram) {
        let applicable = rx.dest == EMS_ID_NONE || rx.dest == EMS_ID_ME;

        if rx.type_id == EMS_TYPE_VERSION {
            // device discovery needs the detected list and the Tx queue,
            // so the engine decodes Version itself
            if applicable && rx.offset == 0 {
                self.process_version(rx);
            }
        } else if decode::dispatch(rx, &mut self.devices) {
            self.status.refreshed = true;
        }

        self.status.tx_state = TxState::Idle;
    }

    /// Decodes a Version telegram (type 0x02): identify the device by its
    /// product ID and bind it to the matching record.
    fn process_version(&mut self, rx: &RxTelegram) {
        // too short to interpret
        if rx.data_len() < 3 {
            return;
        }

        let product_id = match rx.u8_at(0) {
            Some(v) => v,
            None => return,
        };
        let version = format!(
            "{:02}.{:02}",
            rx.u8_at(1).unwrap_or(0),
            rx.u8_at(2).unwrap_or(0)
        );

        // boilers answer on the fixed boiler address only
        if rx.src == EMS_ID_BOILER {
            if let Some(bt) = tables::find_boiler(product_id) {
                log_info(&format!(
                    "Boiler found: {} (DeviceID:0x{:02X} ProductID:{} Version:{})",
                    bt.model, EMS_ID_BOILER, product_id, version
                ));
                self.add_device(product_id, EMS_ID_BOILER, &version, bt.model);

                // bind the first boiler seen
                let boiler = &mut self.devices.boiler;
                if boiler.device_id.is_none() || boiler.product_id.is_none() {
                    boiler.device_id = Some(EMS_ID_BOILER);
                    boiler.product_id = Some(product_id);
                    boiler.version = version;

                    // Junkers Heatronic 3 polls with reversed addressing
                    if product_id == EMS_PRODUCTID_HEATRONIC {
                        self.status.id_mask = 0x80;
                    }

                    let _ = self.request_boiler_values();
                }
                return;
            }
        }

        if let Some(tt) = tables::find_thermostat(product_id) {
            log_info(&format!(
                "Thermostat found: {} (DeviceID:0x{:02X} ProductID:{} Version:{})",
                tt.model_string, tt.device_id, product_id, version
            ));
            self.add_device(product_id, tt.device_id, &version, tt.model_string);

            // first thermostat wins; later Version broadcasts from other
            // thermostats are only recorded in the detected list
            let thermostat = &mut self.devices.thermostat;
            if thermostat.product_id.is_none() {
                thermostat.model = tt.model;
                thermostat.device_id = Some(tt.device_id);
                thermostat.write_supported = tt.write_supported;
                thermostat.product_id = Some(product_id);
                thermostat.version = version;

                let _ = self.request_thermostat_values();
            }
            return;
        }

        if let Some(st) = tables::find_solar_module(product_id) {
            log_info(&format!(
                "Solar Module found: {} (DeviceID:0x{:02X} ProductID:{} Version:{})",
                st.model, st.device_id, product_id, version
            ));
            self.add_device(product_id, st.device_id, &version, st.model);

            let sm = &mut self.devices.solar_module;
            sm.device_id = Some(st.device_id);
            sm.product_id = Some(product_id);
            sm.version = version;

            let _ = self.request_solar_module_values();
            return;
        }

        if let Some(ht) = tables::find_heat_pump(product_id) {
            log_info(&format!(
                "Heat Pump found: {} (DeviceID:0x{:02X} ProductID:{} Version:{})",
                ht.model, ht.device_id, product_id, version
            ));
            self.add_device(product_id, ht.device_id, &version, ht.model);

            let hp = &mut self.devices.heat_pump;
            hp.device_id = Some(ht.device_id);
            hp.product_id = Some(product_id);
            hp.version = version;
            return;
        }

        if let Some(ot) = tables::find_other(product_id) {
            log_info(&format!(
                "Device found: {} (DeviceID:0x{:02X} ProductID:{} Version:{})",
                ot.model, ot.device_id, product_id, version
            ));
            self.add_device(product_id, ot.device_id, &version, ot.model);
        } else {
            log_info(&format!(
                "Unrecognized device found (DeviceID:0x{:02X} ProductID:{} Version:{})",
                rx.src, product_id, version
            ));
            self.add_device(product_id, rx.src, &version, "unknown?");
        }
    }

    /// Records a device in the detected list, skipping duplicates.
    fn add_device(&mut self, product_id: u8, device_id: u8, version: &str, model: &str) {
        let duplicate = self
            .detected
            .iter()
            .any(|d| d.product_id == product_id && d.device_id == device_id);
        if !duplicate {
            self.detected.push(DetectedDevice {
                product_id,
                device_id,
                version: version.to_string(),
                model: model.to_string(),
            });
        }
    }

    /// Queues a read request. No-op for a missing type or destination;
    /// dropped with a log when Tx is disabled.
    pub(crate) fn enqueue_read(
        &mut self,
        type_id: u16,
        dest: u8,
        force_refresh: bool,
    ) -> Result<(), crate::error::EmsError> {
        if type_id == u16::from(EMS_ID_NONE) || dest == EMS_ID_NONE {
            return Ok(());
        }
        if self.status.tx_disabled {
            log_info("In listen mode. All Tx is disabled.");
            return Ok(());
        }

        match decode::find_type(type_id) {
            Some(def) => log_info(&format!(
                "Requesting type {}(0x{:02X}) from dest 0x{:02X}",
                def.name, type_id, dest
            )),
            None => log_info(&format!(
                "Requesting type (0x{:02X}) from dest 0x{:02X}",
                type_id, dest
            )),
        }

        let mut tx = TxTelegram::new(TxAction::Read, dest, type_id);
        tx.data_value = EMS_MAX_TELEGRAM_LENGTH as u8; // number of bytes wanted back
        tx.force_refresh = force_refresh;
        self.enqueue(tx)
    }

    /// Appends a telegram to the Tx queue, rejecting when full.
    pub(crate) fn enqueue(&mut self, tx: TxTelegram) -> Result<(), crate::error::EmsError> {
        if self.tx_queue.len() >= EMS_TX_QUEUE_CAPACITY {
            log_warn(&format!(
                "Tx queue full ({} entries), dropping telegram",
                self.tx_queue.len()
            ));
            return Err(crate::error::EmsError::TxQueueFull(EMS_TX_QUEUE_CAPACITY));
        }
        self.status.tx_retry_count = 0;
        self.tx_queue.push_back(tx);
        Ok(())
    }

    // ------------------------------------------------------------------
    // status accessors
    // ------------------------------------------------------------------

    /// True while telegrams keep arriving within the bus timeout.
    pub fn bus_connected(&mut self) -> bool {
        if let Some(last) = self.status.last_rx {
            if last.elapsed() > EMS_BUS_TIMEOUT {
                self.status.bus_connected = false;
            }
        }
        self.status.bus_connected
    }

    /// True while the master keeps polling us within the poll timeout.
    pub fn tx_capable(&mut self) -> bool {
        match self.status.poll_interval {
            None => self.status.tx_capable = false,
            Some(interval) if interval > EMS_POLL_TIMEOUT => self.status.tx_capable = false,
            _ => {}
        }
        self.status.tx_capable
    }

    /// Interval between the last two polls addressed to us.
    pub fn poll_interval(&self) -> Option<Duration> {
        self.status.poll_interval
    }

    pub fn rx_pkgs(&self) -> u32 {
        self.status.rx_pkgs
    }

    pub fn tx_pkgs(&self) -> u32 {
        self.status.tx_pkgs
    }

    pub fn crc_errors(&self) -> u32 {
        self.status.crc_errors
    }

    /// Session addressing mask, 0x00 for Buderus or 0x80 for Junkers.
    pub fn id_mask(&self) -> u8 {
        self.status.id_mask
    }

    pub fn tx_state(&self) -> TxState {
        self.status.tx_state
    }

    pub fn tx_queue_len(&self) -> usize {
        self.tx_queue.len()
    }

    /// The decoded device records.
    pub fn devices(&self) -> &DeviceState {
        &self.devices
    }

    /// Devices seen through Version telegrams.
    pub fn detected_devices(&self) -> &[DetectedDevice] {
        &self.detected
    }

    /// Consumer-facing publish flag, set when fresh data arrived.
    pub fn refreshed(&self) -> bool {
        self.status.refreshed
    }

    pub fn clear_refreshed(&mut self) {
        self.status.refreshed = false;
    }

    /// Enables or disables answering idle polls with an ack byte.
    pub fn set_poll_enabled(&mut self, enabled: bool) {
        self.status.poll_enabled = enabled;
    }

    /// Listen-only mode: queued telegrams are dropped instead of sent.
    pub fn set_tx_disabled(&mut self, disabled: bool) {
        self.status.tx_disabled = disabled;
    }

    /// Forces the bus addressing instead of auto-detecting it. Mode 3 is
    /// the Junkers HT3 wiring, everything else resets to auto-detect.
    pub fn set_tx_mode(&mut self, mode: u8) {
        if mode == 3 {
            self.status.id_mask = 0x80;
            if self.status.tx_state == TxState::ReverseDetectPending {
                self.status.tx_state = TxState::Idle;
            }
        } else {
            self.status.id_mask = 0x00;
            self.status.tx_state = TxState::ReverseDetectPending;
        }
    }

    /// Selects the heating circuit for RC35 family commands.
    pub fn set_thermostat_hc(&mut self, hc: u8) -> Result<(), crate::error::EmsError> {
        if hc == 1 || hc == 2 {
            self.devices.thermostat.hc = hc;
            Ok(())
        } else {
            Err(crate::error::EmsError::InvalidParameter(format!(
                "heating circuit must be 1 or 2, got {}",
                hc
            )))
        }
    }
}
