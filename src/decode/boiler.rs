//! Decoders for the boiler (UBA master) telegram family.
//!
//! Fields beyond the end of a short payload keep their previous value, so
//! a truncated broadcast never wipes out state we already have.

use crate::constants::{EMS_BOILER_SELFLOWTEMP_HEATING, EMS_OFFSET_UBA_PARAMETER_WW_COMFORT};
use crate::devices::DeviceState;
use crate::ems::frame::RxTelegram;
use crate::logging::log_debug;

/// UBAParameterWW - type 0x33 - warm water settings.
pub fn parameter_ww(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let b = &mut state.boiler;
    b.ww_activated = rx.u8_at(1).map(|v| v == 0xFF).or(b.ww_activated);
    b.ww_sel_temp = rx.u8_at(2).or(b.ww_sel_temp);
    b.ww_circ_pump = rx.u8_at(6).map(|v| v == 0xFF).or(b.ww_circ_pump);
    b.ww_desired_temp = rx.u8_at(8).or(b.ww_desired_temp);
    b.ww_comfort = rx
        .u8_at(EMS_OFFSET_UBA_PARAMETER_WW_COMFORT as usize)
        .or(b.ww_comfort);
    true
}

/// UBATotalUptimeMessage - type 0x14 - total operating minutes.
pub fn total_uptime(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    state.boiler.uba_uptime = rx.u24_at(0).or(state.boiler.uba_uptime);
    true
}

/// UBAParametersMessage - type 0x16 - boiler unit settings.
pub fn parameters(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let b = &mut state.boiler;
    b.heating_temp = rx.u8_at(1).or(b.heating_temp);
    b.pump_mod_max = rx.u8_at(9).or(b.pump_mod_max);
    b.pump_mod_min = rx.u8_at(10).or(b.pump_mod_min);
    false
}

/// UBAMonitorWWMessage - type 0x34 - warm water monitor.
pub fn monitor_ww(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let b = &mut state.boiler;
    b.ww_cur_temp = rx.u16_at(1).or(b.ww_cur_temp);
    b.ww_starts = rx.u24_at(13).or(b.ww_starts);
    b.ww_work_min = rx.u24_at(10).or(b.ww_work_min);
    b.ww_one_time = rx.bit_at(5, 1).or(b.ww_one_time);
    b.ww_cur_flow = rx.u8_at(9).or(b.ww_cur_flow);
    false
}

/// UBAMonitorFast - type 0x18 - central heating monitor part 1 (25 bytes),
/// broadcast every 10 seconds.
pub fn monitor_fast(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let b = &mut state.boiler;
    b.sel_flow_temp = rx.u8_at(0).or(b.sel_flow_temp);
    b.cur_flow_temp = rx.u16_at(1).or(b.cur_flow_temp);
    b.ret_temp = rx.u16_at(13).or(b.ret_temp);

    b.burn_gas = rx.bit_at(7, 0).or(b.burn_gas);
    b.fan_work = rx.bit_at(7, 2).or(b.fan_work);
    b.ign_work = rx.bit_at(7, 3).or(b.ign_work);
    b.heat_pump = rx.bit_at(7, 5).or(b.heat_pump);
    b.ww_heat = rx.bit_at(7, 6).or(b.ww_heat);
    b.ww_circ = rx.bit_at(7, 7).or(b.ww_circ);

    b.sel_burn_pow = rx.u8_at(3).or(b.sel_burn_pow);
    b.cur_burn_pow = rx.u8_at(4).or(b.cur_burn_pow);
    b.flame_curr = rx.i16_at(15).or(b.flame_curr);

    // service code letters as shown on the boiler display
    if let (Some(c1), Some(c2)) = (rx.u8_at(18), rx.u8_at(19)) {
        b.service_code_char = Some([c1, c2]);
    }
    b.service_code = rx.u16_at(20).or(b.service_code);

    // 0xFF when there is no pressure sensor fitted
    b.sys_press = rx.u8_at(17).or(b.sys_press);

    check_active(state);
    false
}

/// UBAMonitorSlow - type 0x19 - central heating monitor part 2 (27 bytes),
/// broadcast every 60 seconds.
pub fn monitor_slow(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let b = &mut state.boiler;
    b.ext_temp = rx.i16_at(0).or(b.ext_temp);
    b.boil_temp = rx.u16_at(2).or(b.boil_temp);
    b.pump_mod = rx.u8_at(9).or(b.pump_mod);
    b.burn_starts = rx.u24_at(10).or(b.burn_starts);
    b.burn_work_min = rx.u24_at(13).or(b.burn_work_min);
    b.heat_work_min = rx.u24_at(19).or(b.heat_work_min);
    false
}

/// UBASetPoints - type 0x1A - flow temperature the thermostat commanded.
pub fn set_points(rx: &RxTelegram, _state: &mut DeviceState) -> bool {
    if let Some(setpoint) = rx.u8_at(0) {
        log_debug(&format!("Boiler flow temperature is {} C", setpoint));
    }
    false
}

/// Derives the tap water and heating activity flags after a fast monitor.
///
/// Heating demand is inferred from the selected flow temperature since the
/// burner alone cannot tell heating apart from warm water production.
fn check_active(state: &mut DeviceState) {
    let b = &mut state.boiler;

    if let (Some(flow), Some(gas)) = (b.ww_cur_flow, b.burn_gas) {
        b.tapwater_active = Some(flow != 0 && gas);
    }

    if let (Some(sel), Some(gas)) = (b.sel_flow_temp, b.burn_gas) {
        b.heating_active = Some(sel >= EMS_BOILER_SELFLOWTEMP_HEATING && gas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn rx(raw: &[u8]) -> RxTelegram {
        RxTelegram::parse(raw, Instant::now()).unwrap()
    }

    fn monitor_fast_payload() -> Vec<u8> {
        // 25 byte UBAMonitorFast payload: sel flow 48C, cur flow 30.7C,
        // burner on at 75%, flame 11.2uA, pressure 1.9 bar, code "0A"
        let mut data = vec![0u8; 25];
        data[0] = 48; // selected flow temp
        data[1] = 0x01; // current flow temp high
        data[2] = 0x33; // current flow temp low (307 = 30.7 C)
        data[3] = 100; // burner max power
        data[4] = 75; // burner current power
        data[7] = 0b0010_1101; // gas + fan + ignition + pump
        data[13] = 0x01; // return temp high
        data[14] = 0x18; // return temp low
        data[15] = 0x00;
        data[16] = 0x70; // flame current 11.2 uA
        data[17] = 19; // pressure * 10
        data[18] = b'0';
        data[19] = b'A';
        data[20] = 0x00;
        data[21] = 0xD3; // service code 211
        data
    }

    fn telegram_with_payload(type_id: u8, payload: &[u8]) -> RxTelegram {
        let mut raw = vec![0x08, 0x00, type_id, 0x00];
        raw.extend_from_slice(payload);
        raw.push(0x00); // CRC is not checked at this layer
        rx(&raw)
    }

    #[test]
    fn decodes_monitor_fast() {
        let telegram = telegram_with_payload(0x18, &monitor_fast_payload());
        let mut state = DeviceState::default();
        assert!(!monitor_fast(&telegram, &mut state));

        let b = &state.boiler;
        assert_eq!(b.sel_flow_temp, Some(48));
        assert_eq!(b.cur_flow_temp, Some(307));
        assert_eq!(b.ret_temp, Some(280));
        assert_eq!(b.burn_gas, Some(true));
        assert_eq!(b.fan_work, Some(true));
        assert_eq!(b.ign_work, Some(true));
        assert_eq!(b.heat_pump, Some(true));
        assert_eq!(b.ww_heat, Some(false));
        assert_eq!(b.sel_burn_pow, Some(100));
        assert_eq!(b.cur_burn_pow, Some(75));
        assert_eq!(b.flame_curr, Some(112));
        assert_eq!(b.sys_press, Some(19));
        assert_eq!(b.service_code_char, Some([b'0', b'A']));
        assert_eq!(b.service_code, Some(211));
    }

    #[test]
    fn short_monitor_fast_keeps_unseen_fields_unset() {
        let telegram = telegram_with_payload(0x18, &[48, 0x01, 0x33]);
        let mut state = DeviceState::default();
        monitor_fast(&telegram, &mut state);

        assert_eq!(state.boiler.sel_flow_temp, Some(48));
        assert_eq!(state.boiler.cur_flow_temp, Some(307));
        assert!(state.boiler.burn_gas.is_none());
        assert!(state.boiler.service_code.is_none());
    }

    #[test]
    fn derives_heating_active_from_flow_setpoint() {
        let mut payload = monitor_fast_payload();
        payload[0] = 75; // above the heating threshold
        let telegram = telegram_with_payload(0x18, &payload);
        let mut state = DeviceState::default();
        monitor_fast(&telegram, &mut state);
        assert_eq!(state.boiler.heating_active, Some(true));

        // gas off clears it again
        payload[7] = 0;
        let telegram = telegram_with_payload(0x18, &payload);
        monitor_fast(&telegram, &mut state);
        assert_eq!(state.boiler.heating_active, Some(false));
    }

    #[test]
    fn derives_tapwater_active_from_flow_sensor() {
        let mut state = DeviceState::default();

        // warm water flow seen first via the WW monitor
        let mut ww = vec![0u8; 16];
        ww[9] = 35; // current flow l/min * 10
        let telegram = telegram_with_payload(0x34, &ww);
        monitor_ww(&telegram, &mut state);
        assert_eq!(state.boiler.ww_cur_flow, Some(35));
        assert!(state.boiler.tapwater_active.is_none());

        // the next fast monitor with the burner on flags tap water activity
        let telegram = telegram_with_payload(0x18, &monitor_fast_payload());
        monitor_fast(&telegram, &mut state);
        assert_eq!(state.boiler.tapwater_active, Some(true));
    }

    #[test]
    fn decodes_parameter_ww() {
        let payload = [0x00, 0xFF, 60, 0x00, 0x00, 0x00, 0xFF, 0x00, 70, 0xD8];
        let telegram = telegram_with_payload(0x33, &payload);
        let mut state = DeviceState::default();
        assert!(parameter_ww(&telegram, &mut state));

        let b = &state.boiler;
        assert_eq!(b.ww_activated, Some(true));
        assert_eq!(b.ww_sel_temp, Some(60));
        assert_eq!(b.ww_circ_pump, Some(true));
        assert_eq!(b.ww_desired_temp, Some(70));
        assert_eq!(b.ww_comfort, Some(0xD8));
    }

    #[test]
    fn decodes_monitor_slow() {
        let mut payload = vec![0u8; 25];
        payload[0] = 0x00;
        payload[1] = 0x3C; // outside temp 6.0 C
        payload[2] = 0x02;
        payload[3] = 0x1A; // boiler temp 53.8 C
        payload[9] = 64; // pump modulation
        payload[10] = 0x00;
        payload[11] = 0x30;
        payload[12] = 0x39; // 12345 burner starts
        let telegram = telegram_with_payload(0x19, &payload);
        let mut state = DeviceState::default();
        monitor_slow(&telegram, &mut state);

        assert_eq!(state.boiler.ext_temp, Some(60));
        assert_eq!(state.boiler.boil_temp, Some(538));
        assert_eq!(state.boiler.pump_mod, Some(64));
        assert_eq!(state.boiler.burn_starts, Some(12345));
    }

    #[test]
    fn decodes_total_uptime() {
        let telegram = telegram_with_payload(0x14, &[0x01, 0x00, 0x00]);
        let mut state = DeviceState::default();
        assert!(total_uptime(&telegram, &mut state));
        assert_eq!(state.boiler.uba_uptime, Some(65536));
    }
}
