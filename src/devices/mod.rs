//! # Device State Records
//!
//! One record per device role on the bus (boiler, thermostat, solar module,
//! heat pump). Values hold the raw on-wire representation; scaling to
//! engineering units is left to the presentation layer. A field is `None`
//! until a telegram carrying it has been decoded, so consumers can tell
//! "never seen" apart from a legitimate zero.

pub mod tables;

/// Thermostat families with distinct command sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermostatModel {
    /// RC10 / Nefit Moduline 100
    Rc10,
    /// RC20 / Nefit Moduline 300
    Rc20,
    /// RC20F (remote version)
    Rc20F,
    /// RC30 / Nefit Moduline 400
    Rc30,
    /// RC35 and the ES73 variant, with two heating circuits
    Rc35,
    /// TC100 / Nefit Easy, read-only
    Easy,
    /// RC300/RC310/RC1010 on the EMS-plus telegram set
    RcPlus,
    /// Junkers FR10/FW100
    Junkers,
    Unknown,
}

impl std::fmt::Display for ThermostatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ThermostatModel::Rc10 => "RC10",
            ThermostatModel::Rc20 => "RC20",
            ThermostatModel::Rc20F => "RC20F",
            ThermostatModel::Rc30 => "RC30",
            ThermostatModel::Rc35 => "RC35",
            ThermostatModel::Easy => "Easy",
            ThermostatModel::RcPlus => "RC300",
            ThermostatModel::Junkers => "Junkers",
            ThermostatModel::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// An entry in the detected-devices list built from Version broadcasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedDevice {
    pub product_id: u8,
    pub device_id: u8,
    pub version: String,
    pub model: String,
}

/// Boiler (UBA) state, filled from the UBAMonitor* telegram family.
#[derive(Debug, Clone, Default)]
pub struct Boiler {
    pub device_id: Option<u8>,
    pub product_id: Option<u8>,
    pub version: String,

    // UBAParameterWW
    pub ww_activated: Option<bool>,
    pub ww_sel_temp: Option<u8>,
    pub ww_circ_pump: Option<bool>,
    pub ww_desired_temp: Option<u8>,
    pub ww_comfort: Option<u8>,

    // UBAMonitorFast
    pub sel_flow_temp: Option<u8>,
    /// Raw value is degrees * 10
    pub cur_flow_temp: Option<u16>,
    pub ret_temp: Option<u16>,
    pub burn_gas: Option<bool>,
    pub fan_work: Option<bool>,
    pub ign_work: Option<bool>,
    pub heat_pump: Option<bool>,
    pub ww_heat: Option<bool>,
    pub ww_circ: Option<bool>,
    pub sel_burn_pow: Option<u8>,
    pub cur_burn_pow: Option<u8>,
    /// Flame current in micro amps, raw value is uA * 10
    pub flame_curr: Option<i16>,
    /// System pressure, raw value is bar * 10, 0xFF when no sensor
    pub sys_press: Option<u8>,
    /// Two character service code as shown on the boiler display
    pub service_code_char: Option<[u8; 2]>,
    pub service_code: Option<u16>,

    // UBAMonitorSlow
    /// Outside temperature, 0x8000 when no sensor
    pub ext_temp: Option<i16>,
    pub boil_temp: Option<u16>,
    pub pump_mod: Option<u8>,
    pub burn_starts: Option<u32>,
    pub burn_work_min: Option<u32>,
    pub heat_work_min: Option<u32>,

    // UBAMonitorWWMessage
    pub ww_cur_temp: Option<u16>,
    pub ww_starts: Option<u32>,
    pub ww_work_min: Option<u32>,
    pub ww_one_time: Option<bool>,
    pub ww_cur_flow: Option<u8>,

    // UBATotalUptimeMessage
    pub uba_uptime: Option<u32>,

    // UBAParametersMessage
    pub heating_temp: Option<u8>,
    pub pump_mod_max: Option<u8>,
    pub pump_mod_min: Option<u8>,

    // derived, see the active-state check after UBAMonitorFast
    pub tapwater_active: Option<bool>,
    pub heating_active: Option<bool>,
}

/// Wall clock as reported by the thermostat (RCTime telegram).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThermostatTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub day: u8,
    pub month: u8,
    pub year: u8,
}

/// Thermostat state.
#[derive(Debug, Clone)]
pub struct Thermostat {
    pub device_id: Option<u8>,
    pub product_id: Option<u8>,
    pub model: ThermostatModel,
    pub version: String,
    pub write_supported: bool,
    /// Selected heating circuit, 1 or 2 (RC35 family only)
    pub hc: u8,

    /// Raw value scale depends on the model (* 2, * 10 or * 100)
    pub setpoint_room_temp: Option<i16>,
    pub curr_room_temp: Option<i16>,
    pub mode: Option<u8>,
    pub day_mode: Option<bool>,
    pub time: Option<ThermostatTime>,

    // RC35 working mode telegram, values are * 2
    pub daytemp: Option<u8>,
    pub nighttemp: Option<u8>,
    pub holidaytemp: Option<u8>,
    /// 3 = floor heating
    pub heatingtype: Option<u8>,
    pub circuitcalctemp: Option<u8>,
}

impl Default for Thermostat {
    fn default() -> Self {
        Thermostat {
            device_id: None,
            product_id: None,
            model: ThermostatModel::Unknown,
            version: String::new(),
            write_supported: false,
            hc: 1,
            setpoint_room_temp: None,
            curr_room_temp: None,
            mode: None,
            day_mode: None,
            time: None,
            daytemp: None,
            nighttemp: None,
            holidaytemp: None,
            heatingtype: None,
            circuitcalctemp: None,
        }
    }
}

/// Solar module state (SM10/SM100/ISM1).
#[derive(Debug, Clone, Default)]
pub struct SolarModule {
    pub device_id: Option<u8>,
    pub product_id: Option<u8>,
    pub version: String,

    /// Raw value is degrees * 10
    pub collector_temp: Option<i16>,
    pub bottom_temp: Option<i16>,
    pub pump_modulation: Option<u8>,
    pub pump: Option<bool>,
    /// Raw value is Wh * 10
    pub energy_last_hour: Option<u16>,
    pub energy_today: Option<u16>,
    /// Raw value is kWh * 10
    pub energy_total: Option<u16>,
    pub pump_work_min: Option<u32>,
    pub setpoint_max_bottom_temp: Option<u8>,
}

/// Heat pump module state.
#[derive(Debug, Clone, Default)]
pub struct HeatPump {
    pub device_id: Option<u8>,
    pub product_id: Option<u8>,
    pub version: String,

    pub modulation: Option<u8>,
    pub speed: Option<u8>,
}

/// The full set of device records the engine maintains.
#[derive(Debug, Clone, Default)]
pub struct DeviceState {
    pub boiler: Boiler,
    pub thermostat: Thermostat,
    pub solar_module: SolarModule,
    pub heat_pump: HeatPump,
}

impl DeviceState {
    pub fn boiler_bound(&self) -> bool {
        self.boiler.device_id.is_some()
    }

    pub fn thermostat_bound(&self) -> bool {
        self.thermostat.device_id.is_some()
    }

    pub fn solar_module_bound(&self) -> bool {
        self.solar_module.device_id.is_some()
    }

    pub fn heat_pump_bound(&self) -> bool {
        self.heat_pump.device_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unbound() {
        let state = DeviceState::default();
        assert!(!state.boiler_bound());
        assert!(!state.thermostat_bound());
        assert_eq!(state.thermostat.hc, 1);
        assert_eq!(state.thermostat.model, ThermostatModel::Unknown);
        assert!(state.boiler.cur_flow_temp.is_none());
    }
}
