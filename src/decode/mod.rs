//! # Telegram Type Registry and Dispatch
//!
//! Maps telegram type IDs to the decoders that fold their payload into the
//! device records. The registry is fixed at startup; entries without a
//! handler are known types we name in logs but do not decode yet.
//!
//! Dispatch rules: only broadcasts and telegrams addressed to us are
//! decoded, telegrams without payload are skipped, and legacy (EMS 1.0)
//! telegrams are only decoded when they start at offset 0 so partial
//! updates cannot corrupt a record. EMS-plus decoders handle offsets
//! themselves since those devices routinely send partial updates.

pub mod boiler;
pub mod heatpump;
pub mod solar;
pub mod thermostat;

use once_cell::sync::Lazy;

use crate::constants::*;
use crate::devices::DeviceState;
use crate::ems::frame::RxTelegram;
use crate::logging::log_debug;

/// Decoder callback. Returns true when the update should be flagged to
/// external consumers (publish trigger).
pub type TypeHandler = fn(&RxTelegram, &mut DeviceState) -> bool;

/// One recognized telegram type.
pub struct TypeDefinition {
    pub type_id: u16,
    pub name: &'static str,
    pub handler: Option<TypeHandler>,
}

macro_rules! ems_type {
    ($id:expr, $name:expr) => {
        TypeDefinition { type_id: $id, name: $name, handler: None }
    };
    ($id:expr, $name:expr, $handler:path) => {
        TypeDefinition { type_id: $id, name: $name, handler: Some($handler) }
    };
}

/// All telegram types we recognize. Version telegrams are listed for
/// completeness but handled by the engine itself, since device discovery
/// needs access to the detected-devices list and the Tx queue.
pub static TYPE_REGISTRY: Lazy<Vec<TypeDefinition>> = Lazy::new(|| {
    vec![
        // common
        ems_type!(EMS_TYPE_VERSION, "Version"),
        // boiler
        ems_type!(EMS_TYPE_UBA_MONITOR_FAST, "UBAMonitorFast", boiler::monitor_fast),
        ems_type!(EMS_TYPE_UBA_MONITOR_SLOW, "UBAMonitorSlow", boiler::monitor_slow),
        ems_type!(EMS_TYPE_UBA_MONITOR_WW, "UBAMonitorWWMessage", boiler::monitor_ww),
        ems_type!(EMS_TYPE_UBA_PARAMETER_WW, "UBAParameterWW", boiler::parameter_ww),
        ems_type!(EMS_TYPE_UBA_TOTAL_UPTIME, "UBATotalUptimeMessage", boiler::total_uptime),
        ems_type!(EMS_TYPE_UBA_MAINTENANCE_SETTINGS, "UBAMaintenanceSettingsMessage"),
        ems_type!(EMS_TYPE_UBA_PARAMETERS, "UBAParametersMessage", boiler::parameters),
        ems_type!(EMS_TYPE_UBA_SET_POINTS, "UBASetPoints", boiler::set_points),
        ems_type!(EMS_TYPE_UBA_FUNCTION_TEST, "UBAFunctionTest"),
        // thermostats
        ems_type!(EMS_TYPE_RC_TIME, "RCTime", thermostat::rc_time),
        ems_type!(EMS_TYPE_RC_OUTDOOR_TEMP, "RCOutdoorTempMessage"),
        ems_type!(EMS_TYPE_RC10_STATUS, "RC10StatusMessage", thermostat::rc10_status),
        ems_type!(EMS_TYPE_RC10_SET, "RC10Set"),
        ems_type!(EMS_TYPE_RC20_STATUS, "RC20StatusMessage", thermostat::rc20_status),
        ems_type!(EMS_TYPE_RC20_SET, "RC20Set", thermostat::rc20_set),
        ems_type!(EMS_TYPE_RC30_STATUS, "RC30StatusMessage", thermostat::rc30_status),
        ems_type!(EMS_TYPE_RC30_SET, "RC30Set", thermostat::rc30_set),
        ems_type!(EMS_TYPE_RC35_STATUS_HC1, "RC35StatusMessage_HC1", thermostat::rc35_status),
        ems_type!(EMS_TYPE_RC35_SET_HC1, "RC35Set_HC1", thermostat::rc35_set),
        ems_type!(EMS_TYPE_RC35_STATUS_HC2, "RC35StatusMessage_HC2", thermostat::rc35_status),
        ems_type!(EMS_TYPE_RC35_SET_HC2, "RC35Set_HC2", thermostat::rc35_set),
        ems_type!(EMS_TYPE_EASY_STATUS, "EasyStatusMessage", thermostat::easy_status),
        ems_type!(EMS_TYPE_RCPLUS_STATUS, "RCPLUSStatusMessage", thermostat::rcplus_status),
        ems_type!(EMS_TYPE_RCPLUS_STATUS_MODE, "RCPLUSStatusMode"),
        ems_type!(EMS_TYPE_RCPLUS_STATUS_HEATING, "RCPLUSStatusHeating"),
        ems_type!(EMS_TYPE_RCPLUS_SET, "RCPLUSSet"),
        ems_type!(EMS_TYPE_JUNKERS_STATUS, "JunkersStatusMessage", thermostat::junkers_status),
        // solar modules
        ems_type!(EMS_TYPE_SM10_MONITOR, "SM10Monitor", solar::sm10_monitor),
        ems_type!(EMS_TYPE_SM100_MONITOR, "SM100Monitor", solar::sm100_monitor),
        ems_type!(EMS_TYPE_SM100_STATUS, "SM100Status", solar::sm100_status),
        ems_type!(EMS_TYPE_SM100_STATUS2, "SM100Status2", solar::sm100_status2),
        ems_type!(EMS_TYPE_SM100_ENERGY, "SM100Energy", solar::sm100_energy),
        ems_type!(EMS_TYPE_ISM1_STATUS, "ISM1StatusMessage", solar::ism1_status),
        ems_type!(EMS_TYPE_ISM1_SET, "ISM1Set", solar::ism1_set),
        // heat pumps
        ems_type!(EMS_TYPE_HP_MONITOR1, "HPMonitor1", heatpump::monitor1),
        ems_type!(EMS_TYPE_HP_MONITOR2, "HPMonitor2", heatpump::monitor2),
    ]
});

/// Looks up a type definition by ID.
pub fn find_type(type_id: u16) -> Option<&'static TypeDefinition> {
    TYPE_REGISTRY.iter().find(|t| t.type_id == type_id)
}

/// Decodes a validated telegram into the device records.
///
/// Returns true when a decoder asked for an external refresh.
pub fn dispatch(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    // telegrams without data carry nothing to decode
    if rx.data_len() == 0 {
        return false;
    }

    // broadcasts and telegrams to us only
    if rx.dest != EMS_ID_NONE && rx.dest != EMS_ID_ME {
        return false;
    }

    let Some(def) = find_type(rx.type_id) else {
        return false;
    };
    let Some(handler) = def.handler else {
        return false;
    };

    log_debug(&format!("<--- {}(0x{:02X})", def.name, rx.type_id));

    // partial legacy telegrams would decode fields at the wrong positions
    if rx.emsplus || rx.offset == 0 {
        handler(rx, state)
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn rx(raw: &[u8]) -> RxTelegram {
        RxTelegram::parse(raw, Instant::now()).unwrap()
    }

    #[test]
    fn registry_has_no_duplicate_types() {
        for (i, a) in TYPE_REGISTRY.iter().enumerate() {
            for b in &TYPE_REGISTRY[i + 1..] {
                assert!(
                    a.type_id != b.type_id || a.name != b.name,
                    "duplicate entry for type 0x{:02X}",
                    a.type_id
                );
            }
        }
    }

    #[test]
    fn skips_telegram_to_other_device() {
        // boiler -> thermostat (0x17), UBAMonitorFast
        let telegram = rx(&[0x08, 0x17, 0x18, 0x00, 0x2E, 0x01, 0x1D, 0x00]);
        let mut state = DeviceState::default();
        dispatch(&telegram, &mut state);
        assert!(state.boiler.sel_flow_temp.is_none());
    }

    #[test]
    fn skips_partial_legacy_telegram() {
        // offset 5 on a legacy telegram must not be decoded as offset 0
        let telegram = rx(&[0x08, 0x00, 0x18, 0x05, 0x2E, 0x01, 0x1D, 0x00]);
        let mut state = DeviceState::default();
        dispatch(&telegram, &mut state);
        assert!(state.boiler.sel_flow_temp.is_none());
    }

    #[test]
    fn decodes_broadcast_monitor() {
        let telegram = rx(&[0x08, 0x00, 0x18, 0x00, 0x2E, 0x01, 0x1D, 0x00]);
        let mut state = DeviceState::default();
        dispatch(&telegram, &mut state);
        assert_eq!(state.boiler.sel_flow_temp, Some(0x2E));
        assert_eq!(state.boiler.cur_flow_temp, Some(0x011D));
    }
}
