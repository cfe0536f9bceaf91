//! Decoders for the solar module telegram families (SM10, SM100, ISM1).
//!
//! The SM100 and ISM1 speak EMS-plus and routinely send partial updates,
//! so most handlers branch on the telegram offset.

use crate::devices::DeviceState;
use crate::ems::frame::RxTelegram;

/// SM10Monitor - type 0x97.
pub fn sm10_monitor(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let sm = &mut state.solar_module;
    sm.collector_temp = rx.i16_at(2).or(sm.collector_temp);
    sm.bottom_temp = rx.i16_at(5).or(sm.bottom_temp);
    sm.pump_modulation = rx.u8_at(4).or(sm.pump_modulation);
    sm.pump = rx.bit_at(7, 1).or(sm.pump);
    true
}

/// SM100Monitor - type 0x0262 - collector and bottom temperatures.
pub fn sm100_monitor(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    // partial updates at other offsets carry nothing we track
    if rx.offset != 0 {
        return false;
    }

    let sm = &mut state.solar_module;
    sm.collector_temp = rx.i16_at(0).or(sm.collector_temp);
    if rx.data_len() > 2 {
        sm.bottom_temp = rx.i16_at(2).or(sm.bottom_temp);
    }
    true
}

/// SM100Status - type 0x0264 - pump modulation, full or single-byte form.
pub fn sm100_status(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let sm = &mut state.solar_module;
    if rx.offset == 0 {
        sm.pump_modulation = rx.u8_at(9).or(sm.pump_modulation);
    } else if rx.offset == 0x09 {
        sm.pump_modulation = rx.u8_at(0).or(sm.pump_modulation);
    }
    true
}

/// SM100Status2 - type 0x026A - pump on/off, full or single-byte form.
pub fn sm100_status2(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let sm = &mut state.solar_module;
    if rx.offset == 0 {
        sm.pump = rx.bit_at(10, 2).or(sm.pump);
    } else if rx.offset == 0x0A {
        sm.pump = rx.bit_at(0, 2).or(sm.pump);
    }
    true
}

/// SM100Energy - type 0x028E - energy production readings.
pub fn sm100_energy(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let sm = &mut state.solar_module;
    sm.energy_last_hour = rx.u16_at(2).or(sm.energy_last_hour);
    sm.energy_today = rx.u16_at(6).or(sm.energy_today);
    sm.energy_total = rx.u16_at(10).or(sm.energy_total);
    true
}

/// ISM1StatusMessage - type 0x0003 - Junkers solar module readings.
pub fn ism1_status(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let sm = &mut state.solar_module;

    if rx.offset == 0 {
        sm.collector_temp = rx.i16_at(4).or(sm.collector_temp);
        sm.bottom_temp = rx.i16_at(6).or(sm.bottom_temp);
        sm.energy_last_hour = rx.u16_at(2).or(sm.energy_last_hour);
        sm.pump = rx.bit_at(8, 0).or(sm.pump);
        sm.pump_work_min = rx.u24_at(10).or(sm.pump_work_min);
    } else if rx.offset == 4 {
        sm.collector_temp = rx.i16_at(0).or(sm.collector_temp);
    }
    false
}

/// ISM1Set - type 0x0001 - maximum solar boiler temperature setting.
pub fn ism1_set(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    if rx.offset == 6 {
        state.solar_module.setpoint_max_bottom_temp =
            rx.u8_at(0).or(state.solar_module.setpoint_max_bottom_temp);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn emsplus(type_id: u16, offset: u8, payload: &[u8]) -> RxTelegram {
        let mut raw = vec![0x30, 0x00, 0xFF, offset, (type_id >> 8) as u8, type_id as u8];
        raw.extend_from_slice(payload);
        raw.push(0x00);
        RxTelegram::parse(&raw, Instant::now()).unwrap()
    }

    #[test]
    fn decodes_sm10_monitor() {
        let raw = [0x30, 0x00, 0x97, 0x00, 0, 0, 0x01, 0xF4, 80, 0x00, 0xC8, 0x02, 0x00];
        let telegram = RxTelegram::parse(&raw, Instant::now()).unwrap();
        let mut state = DeviceState::default();
        assert!(sm10_monitor(&telegram, &mut state));

        let sm = &state.solar_module;
        assert_eq!(sm.collector_temp, Some(500)); // 50.0 C
        assert_eq!(sm.bottom_temp, Some(200)); // 20.0 C
        assert_eq!(sm.pump_modulation, Some(80));
        assert_eq!(sm.pump, Some(true));
    }

    #[test]
    fn sm100_monitor_partial_offset_ignored() {
        let telegram = emsplus(0x0262, 0x18, &[0x80, 0x00]);
        let mut state = DeviceState::default();
        assert!(!sm100_monitor(&telegram, &mut state));
        assert!(state.solar_module.collector_temp.is_none());
    }

    #[test]
    fn sm100_monitor_collector_only() {
        let telegram = emsplus(0x0262, 0x00, &[0x01, 0xAC]);
        let mut state = DeviceState::default();
        state.solar_module.bottom_temp = Some(123);
        sm100_monitor(&telegram, &mut state);
        assert_eq!(state.solar_module.collector_temp, Some(428));
        // short telegram leaves the bottom temp untouched
        assert_eq!(state.solar_module.bottom_temp, Some(123));
    }

    #[test]
    fn sm100_status_single_byte_form() {
        let telegram = emsplus(0x0264, 0x09, &[0x1E]);
        let mut state = DeviceState::default();
        sm100_status(&telegram, &mut state);
        assert_eq!(state.solar_module.pump_modulation, Some(30));
    }

    #[test]
    fn sm100_status2_pump_bit() {
        let telegram = emsplus(0x026A, 0x0A, &[0x04]);
        let mut state = DeviceState::default();
        sm100_status2(&telegram, &mut state);
        assert_eq!(state.solar_module.pump, Some(true));

        let telegram = emsplus(0x026A, 0x0A, &[0x03]);
        sm100_status2(&telegram, &mut state);
        assert_eq!(state.solar_module.pump, Some(false));
    }

    #[test]
    fn decodes_sm100_energy() {
        let payload = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x06, 0xC5, 0x00, 0x00, 0x76, 0x35];
        let telegram = emsplus(0x028E, 0x00, &payload);
        let mut state = DeviceState::default();
        sm100_energy(&telegram, &mut state);
        assert_eq!(state.solar_module.energy_last_hour, Some(0));
        assert_eq!(state.solar_module.energy_today, Some(0x06C5));
        assert_eq!(state.solar_module.energy_total, Some(0x7635));
    }

    #[test]
    fn decodes_ism1_status_full_and_partial() {
        let payload = [
            0x32, 0x00, 0x00, 0x00, 0x00, 0x13, 0x00, 0xD6, 0x01, 0x00, 0x00, 0xFB, 0xD0,
        ];
        let telegram = emsplus(0x0003, 0x00, &payload);
        let mut state = DeviceState::default();
        ism1_status(&telegram, &mut state);
        let sm = &state.solar_module;
        assert_eq!(sm.collector_temp, Some(0x0013));
        assert_eq!(sm.bottom_temp, Some(0x00D6));
        assert_eq!(sm.pump, Some(true));
        assert_eq!(sm.pump_work_min, Some(0x00FBD0));

        let telegram = emsplus(0x0003, 0x04, &[0x02, 0xE5]);
        ism1_status(&telegram, &mut state);
        assert_eq!(state.solar_module.collector_temp, Some(0x02E5));
    }
}
