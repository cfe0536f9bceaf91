//! Decoders for the thermostat telegram families.
//!
//! Room temperatures are kept raw; the scale differs per model (* 2 for
//! setpoints on most RC models, * 10 for current temperature, * 100 on
//! the Nefit Easy).

use crate::constants::*;
use crate::devices::{DeviceState, ThermostatModel, ThermostatTime};
use crate::ems::frame::RxTelegram;

/// RC10StatusMessage - type 0xB1 - room temperatures, broadcast every
/// 60 seconds.
pub fn rc10_status(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let t = &mut state.thermostat;
    t.setpoint_room_temp = rx
        .u8_at(EMS_OFFSET_RC10_STATUS_SETPOINT)
        .map(i16::from)
        .or(t.setpoint_room_temp);
    t.curr_room_temp = rx.i16_at(EMS_OFFSET_RC10_STATUS_CURR).or(t.curr_room_temp);
    true
}

/// RC20StatusMessage - type 0x91.
pub fn rc20_status(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let t = &mut state.thermostat;
    t.setpoint_room_temp = rx
        .u8_at(EMS_OFFSET_RC20_STATUS_SETPOINT)
        .map(i16::from)
        .or(t.setpoint_room_temp);
    t.curr_room_temp = rx.i16_at(EMS_OFFSET_RC20_STATUS_CURR).or(t.curr_room_temp);
    true
}

/// RC30StatusMessage - type 0x41.
pub fn rc30_status(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let t = &mut state.thermostat;
    t.setpoint_room_temp = rx
        .u8_at(EMS_OFFSET_RC30_STATUS_SETPOINT)
        .map(i16::from)
        .or(t.setpoint_room_temp);
    t.curr_room_temp = rx.i16_at(EMS_OFFSET_RC30_STATUS_CURR).or(t.curr_room_temp);
    true
}

/// RC35StatusMessage - types 0x3E (HC1) and 0x48 (HC2).
pub fn rc35_status(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let t = &mut state.thermostat;
    t.setpoint_room_temp = rx
        .u8_at(EMS_OFFSET_RC35_STATUS_SETPOINT)
        .map(i16::from)
        .or(t.setpoint_room_temp);

    // 0x7D in the high byte means the room sensor is unavailable
    match rx.u8_at(EMS_OFFSET_RC35_STATUS_CURR) {
        Some(0x7D) => t.curr_room_temp = None,
        Some(_) => t.curr_room_temp = rx.i16_at(EMS_OFFSET_RC35_STATUS_CURR),
        None => {}
    }

    t.day_mode = rx.bit_at(EMS_OFFSET_RC35_STATUS_MODE_DAY, 1).or(t.day_mode);
    t.circuitcalctemp = rx
        .u8_at(EMS_OFFSET_RC35_SET_CIRCUITCALCTEMP)
        .or(t.circuitcalctemp);
    true
}

/// EasyStatusMessage - type 0x0A - Nefit Easy/TC100, values are * 100.
pub fn easy_status(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let t = &mut state.thermostat;
    t.curr_room_temp = rx.i16_at(EMS_OFFSET_EASY_STATUS_CURR).or(t.curr_room_temp);
    t.setpoint_room_temp = rx
        .i16_at(EMS_OFFSET_EASY_STATUS_SETPOINT)
        .or(t.setpoint_room_temp);
    true
}

/// RCPLUSStatusMessage - type 0x01A5 - RC300/RC310/RC1010.
///
/// These thermostats send both full telegrams and single-byte partial
/// updates, so the decode depends on the offset.
pub fn rcplus_status(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let t = &mut state.thermostat;

    if rx.offset == 0 {
        t.curr_room_temp = rx.i16_at(EMS_OFFSET_RCPLUS_STATUS_CURR).or(t.curr_room_temp);
        t.setpoint_room_temp = rx
            .u8_at(EMS_OFFSET_RCPLUS_STATUS_SETPOINT)
            .map(i16::from)
            .or(t.setpoint_room_temp);
        t.day_mode = rx.bit_at(EMS_OFFSET_RCPLUS_MODE_DAY, 1).or(t.day_mode);
        t.mode = rx
            .bit_at(EMS_OFFSET_RCPLUS_STATUS_MODE, 0)
            .map(u8::from)
            .or(t.mode);
    } else if rx.offset as usize == EMS_OFFSET_RCPLUS_STATUS_MODE {
        // single byte update of the auto/manual mode
        t.mode = rx.bit_at(0, 0).map(u8::from).or(t.mode);
    }
    false
}

/// JunkersStatusMessage - type 0x006F - FR10/FW100, values are * 10.
pub fn junkers_status(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    if rx.offset != 0 {
        return false;
    }
    let t = &mut state.thermostat;
    t.curr_room_temp = rx.i16_at(EMS_OFFSET_JUNKERS_STATUS_CURR).or(t.curr_room_temp);
    t.setpoint_room_temp = rx
        .i16_at(EMS_OFFSET_JUNKERS_STATUS_SETPOINT)
        .or(t.setpoint_room_temp);
    false
}

/// RC20Set - type 0xA8 - working mode, only seen after an explicit read.
pub fn rc20_set(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    state.thermostat.mode = rx
        .u8_at(EMS_OFFSET_RC20_SET_MODE as usize)
        .or(state.thermostat.mode);
    false
}

/// RC30Set - type 0xA7.
pub fn rc30_set(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    state.thermostat.mode = rx
        .u8_at(EMS_OFFSET_RC30_SET_MODE as usize)
        .or(state.thermostat.mode);
    false
}

/// RC35Set - types 0x3D (HC1) and 0x47 (HC2) - working mode and the
/// day/night/holiday temperatures.
pub fn rc35_set(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    let t = &mut state.thermostat;
    t.mode = rx.u8_at(EMS_OFFSET_RC35_SET_MODE as usize).or(t.mode);
    t.daytemp = rx.u8_at(EMS_OFFSET_RC35_SET_TEMP_DAY as usize).or(t.daytemp);
    t.nighttemp = rx.u8_at(EMS_OFFSET_RC35_SET_TEMP_NIGHT as usize).or(t.nighttemp);
    t.holidaytemp = rx
        .u8_at(EMS_OFFSET_RC35_SET_TEMP_HOLIDAY as usize)
        .or(t.holidaytemp);
    t.heatingtype = rx.u8_at(EMS_OFFSET_RC35_SET_HEATINGTYPE).or(t.heatingtype);
    true
}

/// RCTime - type 0x06 - date and time, common to most thermostats.
pub fn rc_time(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    // the Easy keeps its own clock elsewhere
    if state.thermostat.model == ThermostatModel::Easy {
        return false;
    }

    if let (Some(year), Some(month), Some(hour), Some(day), Some(minute), Some(second)) = (
        rx.u8_at(0),
        rx.u8_at(1),
        rx.u8_at(2),
        rx.u8_at(3),
        rx.u8_at(4),
        rx.u8_at(5),
    ) {
        state.thermostat.time = Some(ThermostatTime {
            hour,
            minute,
            second,
            day,
            month,
            year,
        });
    }
    false
}
