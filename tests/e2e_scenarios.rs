//! End-to-end bus session scenarios, each driving the engine purely
//! through received frames and observing the transmitted ones.

use ems_rs::constants::{EMS_ID_BOILER, EMS_TYPE_UBA_MONITOR_FAST};
use ems_rs::ems::crc;
use ems_rs::{EmsBus, MockTransport, TempKind, ThermostatModel, TxState};

fn telegram(body: &[u8]) -> Vec<u8> {
    let mut raw = body.to_vec();
    raw.push(crc::calculate(&raw));
    raw
}

fn detected_bus() -> (EmsBus<MockTransport>, MockTransport) {
    let mock = MockTransport::new();
    let mut bus = EmsBus::new(mock.clone());
    bus.receive_telegram(&telegram(&[0x08, 0x09, 0x18, 0x00, 0x2E]));
    mock.clear();
    (bus, mock)
}

/// Tests that an idle station answers the master's poll with exactly one
/// ack byte.
#[test]
fn test_scenario_idle_poll() {
    let (mut bus, mock) = detected_bus();
    bus.receive_telegram(&[0x8B]);
    assert_eq!(mock.sent_frames(), vec![vec![0x0B]]);
    assert_eq!(bus.tx_state(), TxState::Idle);
}

/// Tests that a broadcast monitor telegram updates the boiler record
/// and marks the bus connected, with nothing transmitted back.
#[test]
fn test_scenario_broadcast_monitor() {
    let (mut bus, mock) = detected_bus();
    let raw = [
        0x08, 0x00, 0x18, 0x00, 0x30, 0x01, 0x33, 0x4B, 0x00, 0x00, 0x00, 0x00, 0x2D, 0x00, 0x00,
        0x00, 0x00, 0x01, 0x2A, 0x00, 0x70, 0x0C, 0x30, 0x41, 0x00, 0xD3, 0x00, 0x00, 0x00, 0xFF,
    ];
    bus.receive_telegram(&raw);

    assert!(bus.bus_connected());
    assert_eq!(bus.devices().boiler.sel_flow_temp, Some(48));
    assert_eq!(bus.devices().boiler.cur_flow_temp, Some(307));
    assert_eq!(mock.sent_count(), 0);
}

/// Tests that a corrupted telegram is counted and otherwise ignored.
#[test]
fn test_scenario_corrupted_telegram() {
    let (mut bus, mock) = detected_bus();
    let mut raw = telegram(&[0x08, 0x00, 0x18, 0x00, 0x30, 0x01, 0x33]);
    let last = raw.len() - 1;
    raw[last] ^= 0xFF;
    bus.receive_telegram(&raw);

    assert_eq!(bus.crc_errors(), 1);
    assert_eq!(bus.rx_pkgs(), 0);
    assert!(bus.devices().boiler.sel_flow_temp.is_none());
    assert_eq!(mock.sent_count(), 0);
}

/// Tests that a queued read waits for the poll slot and then claims the
/// bus until the response arrives.
#[test]
fn test_scenario_solicited_read() {
    let (mut bus, mock) = detected_bus();
    bus.request_read(EMS_TYPE_UBA_MONITOR_FAST, EMS_ID_BOILER).unwrap();
    assert_eq!(mock.sent_count(), 0); // nothing until we are polled

    bus.receive_telegram(&[0x8B]);
    assert_eq!(
        mock.last_frame().unwrap(),
        vec![0x0B, 0x88, 0x18, 0x00, 0x20, 0xD4]
    );
    assert_eq!(bus.tx_state(), TxState::WaitingForResponse);

    mock.clear();
    bus.receive_telegram(&telegram(&[0x08, 0x0B, 0x18, 0x00, 0x30, 0x01, 0x33]));
    assert_eq!(bus.rx_pkgs(), 1);
    assert_eq!(bus.devices().boiler.sel_flow_temp, Some(0x30));
    assert_eq!(mock.sent_frames(), vec![vec![0x0B]]); // bus released
}

/// Tests a full session: reverse detection, device discovery, automatic
/// value refresh and a validated thermostat write.
#[test]
fn test_scenario_full_session() {
    let mock = MockTransport::new();
    let mut bus = EmsBus::new(mock.clone());

    // 1. first broadcast reveals a Buderus bus
    bus.receive_telegram(&telegram(&[0x08, 0x00, 0x18, 0x00, 0x2E]));
    assert_eq!(bus.id_mask(), 0x00);

    // 2. boiler and thermostat announce themselves
    bus.receive_telegram(&telegram(&[0x08, 0x0B, 0x02, 0x00, 123, 2, 6]));
    bus.receive_telegram(&telegram(&[0x10, 0x0B, 0x02, 0x00, 86, 1, 20]));
    assert_eq!(bus.detected_devices().len(), 2);
    assert_eq!(bus.devices().thermostat.model, ThermostatModel::Rc35);
    // 5 boiler reads + RC35 status/set/time
    assert_eq!(bus.tx_queue_len(), 8);

    // 3. polls drain the refresh reads; answer the first one properly
    bus.receive_telegram(&[0x8B]);
    bus.receive_telegram(&telegram(&[0x08, 0x0B, 0x18, 0x00, 0x30, 0x01, 0x33]));
    assert_eq!(bus.rx_pkgs(), 1);
    while bus.tx_queue_len() > 0 {
        bus.receive_telegram(&[0x8B]);
        // silence: an unrelated broadcast drops the pending entry
        bus.receive_telegram(&telegram(&[0x10, 0x00, 0xA3, 0x00, 0x00]));
    }

    // 4. day-mode broadcast so the auto setpoint targets the day temp
    bus.receive_telegram(&telegram(&[
        0x10, 0x00, 0x3E, 0x00, 0x00, 0x03, 0x2A, 0x01, 0x29,
    ]));
    assert_eq!(bus.devices().thermostat.day_mode, Some(true));

    // 5. a validated write cycle
    bus.set_thermostat_temp(22.0, TempKind::Auto).unwrap();
    mock.clear();

    bus.receive_telegram(&[0x8B]);
    let frame = mock.last_frame().unwrap();
    assert_eq!(&frame[..5], &[0x0B, 0x10, 0x3D, 0x02, 44]);

    bus.receive_telegram(&[0x01]); // master acks the write
    bus.receive_telegram(&[0x8B]); // validate goes out
    let frame = mock.last_frame().unwrap();
    assert_eq!(&frame[..5], &[0x0B, 0x90, 0x3D, 0x02, 0x01]);

    // thermostat confirms the new value: post-validate status read queued
    bus.receive_telegram(&telegram(&[0x10, 0x0B, 0x3D, 0x02, 44]));
    assert_eq!(bus.tx_queue_len(), 1);

    bus.receive_telegram(&[0x8B]);
    bus.receive_telegram(&telegram(&[
        0x10, 0x0B, 0x3E, 0x00, 0x00, 0x03, 0x2C, 0x01, 0x30,
    ]));
    assert!(bus.refreshed());
    assert_eq!(bus.devices().thermostat.setpoint_room_temp, Some(0x2C));

    assert_eq!(bus.crc_errors(), 0);
    assert_eq!(bus.tx_state(), TxState::Idle);
}
