//! High-level bus commands: read requests, thermostat and boiler writes,
//! device discovery. Everything here only queues telegrams; the actual
//! transmit happens from the engine's poll slot.

use crate::constants::*;
use crate::devices::{tables, ThermostatModel};
use crate::ems::frame::{TxAction, TxTelegram};
use crate::ems::protocol::EmsBus;
use crate::ems::transport::Transport;
use crate::error::EmsError;
use crate::logging::log_info;
use crate::util::decode_hex;

/// Which RC35 setpoint a temperature write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TempKind {
    /// Follow the thermostat's current day/night mode
    #[default]
    Auto,
    Night,
    Day,
    Holiday,
}

/// Warm water comfort modes of the UBA parameter record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WwComfort {
    Hot,
    Eco,
    Intelligent,
}

impl<T: Transport> EmsBus<T> {
    /// Queues a read of `type_id` from device `dest`.
    pub fn request_read(&mut self, type_id: u16, dest: u8) -> Result<(), EmsError> {
        self.enqueue_read(type_id, dest, false)
    }

    /// Queues a raw telegram from a hex string like `"0B 88 02 00 20"`.
    /// The CRC is appended at send time.
    pub fn send_raw(&mut self, telegram: &str) -> Result<(), EmsError> {
        let bytes = decode_hex(telegram)?;
        if bytes.is_empty() {
            return Err(EmsError::InvalidParameter("empty raw telegram".into()));
        }

        let dest = bytes.get(1).copied().unwrap_or(EMS_ID_NONE);
        let mut tx = TxTelegram::new(TxAction::Raw, dest, 0);
        tx.payload = bytes;
        self.enqueue(tx)
    }

    /// Sets the thermostat room temperature setpoint in degrees C.
    pub fn set_thermostat_temp(&mut self, temperature: f32, kind: TempKind) -> Result<(), EmsError> {
        let thermostat = &self.devices.thermostat;
        let Some(device_id) = thermostat.device_id else {
            return Err(EmsError::DeviceNotBound("thermostat"));
        };
        if !thermostat.write_supported {
            return Err(EmsError::WriteNotSupported);
        }

        let model = thermostat.model;
        let hc = thermostat.hc;
        let day_mode = thermostat.day_mode;

        log_info(&format!("Setting new thermostat temperature to {} C", temperature));

        let mut tx = TxTelegram::new(TxAction::Write, device_id, 0);
        tx.data_value = (temperature * 2.0) as u8; // half-degree steps

        match model {
            ThermostatModel::Rc10 => {
                tx.type_id = EMS_TYPE_RC10_SET;
                tx.offset = EMS_OFFSET_RC10_SET_TEMP;
                tx.post_validate_read_type = Some(EMS_TYPE_RC10_STATUS);
            }
            ThermostatModel::Rc20 | ThermostatModel::Rc20F => {
                tx.type_id = EMS_TYPE_RC20_SET;
                tx.offset = EMS_OFFSET_RC20_SET_TEMP;
                tx.post_validate_read_type = Some(EMS_TYPE_RC20_STATUS);
            }
            ThermostatModel::Rc30 => {
                tx.type_id = EMS_TYPE_RC30_SET;
                tx.offset = EMS_OFFSET_RC30_SET_TEMP;
                tx.post_validate_read_type = Some(EMS_TYPE_RC30_STATUS);
            }
            ThermostatModel::Rc35 => {
                tx.offset = match kind {
                    TempKind::Night => EMS_OFFSET_RC35_SET_TEMP_NIGHT,
                    TempKind::Day => EMS_OFFSET_RC35_SET_TEMP_DAY,
                    TempKind::Holiday => EMS_OFFSET_RC35_SET_TEMP_HOLIDAY,
                    // follow whichever setpoint is active right now
                    TempKind::Auto => match day_mode {
                        Some(true) => EMS_OFFSET_RC35_SET_TEMP_DAY,
                        _ => EMS_OFFSET_RC35_SET_TEMP_NIGHT,
                    },
                };
                if hc == 2 {
                    tx.type_id = EMS_TYPE_RC35_SET_HC2;
                    tx.post_validate_read_type = Some(EMS_TYPE_RC35_STATUS_HC2);
                } else {
                    tx.type_id = EMS_TYPE_RC35_SET_HC1;
                    tx.post_validate_read_type = Some(EMS_TYPE_RC35_STATUS_HC1);
                }
            }
            _ => return Err(EmsError::WriteNotSupported),
        }

        tx.type_to_validate = Some(tx.type_id);
        tx.comparison_offset = tx.offset;
        tx.comparison_value = tx.data_value;
        self.enqueue(tx)
    }

    /// Sets the thermostat working mode (0=night, 1=day, 2=auto).
    pub fn set_thermostat_mode(&mut self, mode: u8) -> Result<(), EmsError> {
        let thermostat = &self.devices.thermostat;
        let Some(device_id) = thermostat.device_id else {
            return Err(EmsError::DeviceNotBound("thermostat"));
        };
        if !thermostat.write_supported {
            return Err(EmsError::WriteNotSupported);
        }

        let model = thermostat.model;
        let hc = thermostat.hc;

        log_info(&format!("Setting thermostat mode to {}", mode));

        let mut tx = TxTelegram::new(TxAction::Write, device_id, 0);
        tx.data_value = mode;

        match model {
            ThermostatModel::Rc20 | ThermostatModel::Rc20F => {
                tx.type_id = EMS_TYPE_RC20_SET;
                tx.offset = EMS_OFFSET_RC20_SET_MODE;
            }
            ThermostatModel::Rc30 => {
                tx.type_id = EMS_TYPE_RC30_SET;
                tx.offset = EMS_OFFSET_RC30_SET_MODE;
            }
            ThermostatModel::Rc35 => {
                tx.type_id = if hc == 2 {
                    EMS_TYPE_RC35_SET_HC2
                } else {
                    EMS_TYPE_RC35_SET_HC1
                };
                tx.offset = EMS_OFFSET_RC35_SET_MODE;
            }
            _ => return Err(EmsError::WriteNotSupported),
        }

        // read the set record back to pick up the new mode
        tx.type_to_validate = Some(tx.type_id);
        tx.comparison_offset = tx.offset;
        tx.comparison_value = tx.data_value;
        tx.post_validate_read_type = Some(tx.type_id);
        self.enqueue(tx)
    }

    /// Sets the warm water temperature, valid range 30 to 60 C.
    pub fn set_warm_water_temp(&mut self, temperature: u8) -> Result<(), EmsError> {
        if !(30..=EMS_BOILER_TAPWATER_TEMPERATURE_MAX).contains(&temperature) {
            return Err(EmsError::InvalidParameter(format!(
                "warm water temperature {} C out of range 30-{}",
                temperature, EMS_BOILER_TAPWATER_TEMPERATURE_MAX
            )));
        }

        log_info(&format!("Setting boiler warm water temperature to {} C", temperature));

        let dest = self.devices.boiler.device_id.unwrap_or(EMS_ID_BOILER);
        let mut tx = TxTelegram::new(TxAction::Write, dest, EMS_TYPE_UBA_PARAMETER_WW);
        tx.offset = EMS_OFFSET_UBA_PARAMETER_WW_TEMP;
        tx.data_value = temperature;
        tx.type_to_validate = Some(EMS_TYPE_UBA_PARAMETER_WW);
        tx.comparison_offset = EMS_OFFSET_UBA_PARAMETER_WW_TEMP;
        tx.comparison_value = temperature;
        tx.post_validate_read_type = Some(EMS_TYPE_UBA_PARAMETER_WW);
        self.enqueue(tx)
    }

    /// Sets the boiler flow temperature setpoint.
    pub fn set_flow_temp(&mut self, temperature: u8) -> Result<(), EmsError> {
        log_info(&format!("Setting boiler flow temperature to {} C", temperature));

        let dest = self.devices.boiler.device_id.unwrap_or(EMS_ID_BOILER);
        let mut tx = TxTelegram::new(TxAction::Write, dest, EMS_TYPE_UBA_SET_POINTS);
        tx.offset = EMS_OFFSET_UBA_SET_POINTS_FLOWTEMP;
        tx.data_value = temperature;
        tx.type_to_validate = Some(EMS_TYPE_UBA_SET_POINTS);
        tx.comparison_offset = EMS_OFFSET_UBA_SET_POINTS_FLOWTEMP;
        tx.comparison_value = temperature;
        tx.post_validate_read_type = Some(EMS_TYPE_UBA_SET_POINTS);
        self.enqueue(tx)
    }

    /// Switches the warm water comfort mode. Not validated, the boiler
    /// broadcasts the new state on its own.
    pub fn set_warm_water_mode_comfort(&mut self, comfort: WwComfort) -> Result<(), EmsError> {
        let value = match comfort {
            WwComfort::Hot => EMS_VALUE_WW_COMFORT_HOT,
            WwComfort::Eco => EMS_VALUE_WW_COMFORT_ECO,
            WwComfort::Intelligent => EMS_VALUE_WW_COMFORT_INTELLIGENT,
        };
        log_info(&format!("Setting boiler warm water comfort mode to {:?}", comfort));

        let dest = self.devices.boiler.device_id.unwrap_or(EMS_ID_BOILER);
        let mut tx = TxTelegram::new(TxAction::Write, dest, EMS_TYPE_UBA_PARAMETER_WW);
        tx.offset = EMS_OFFSET_UBA_PARAMETER_WW_COMFORT;
        tx.data_value = value;
        self.enqueue(tx)
    }

    /// Switches warm water production on or off. Not validated.
    pub fn set_warm_water_activated(&mut self, activated: bool) -> Result<(), EmsError> {
        log_info(&format!(
            "Setting boiler warm water {}",
            if activated { "on" } else { "off" }
        ));

        let dest = self.devices.boiler.device_id.unwrap_or(EMS_ID_BOILER);
        let mut tx = TxTelegram::new(TxAction::Write, dest, EMS_TYPE_UBA_PARAMETER_WW);
        tx.offset = EMS_OFFSET_UBA_PARAMETER_WW_ACTIVATED;
        tx.data_value = if activated { 0xFF } else { 0x00 };
        self.enqueue(tx)
    }

    /// Forces the tap water valve through the boiler's function test
    /// record (0x1D). The boiler may show a flashing 'T' while active.
    pub fn set_warm_tap_water_activated(&mut self, activated: bool) -> Result<(), EmsError> {
        log_info(&format!(
            "Setting boiler warm tap water {}",
            if activated { "on" } else { "off" }
        ));

        let dest = self.devices.boiler.device_id.unwrap_or(EMS_ID_BOILER);
        let mut tx = TxTelegram::new(TxAction::Write, dest, EMS_TYPE_UBA_FUNCTION_TEST);
        tx.offset = 0;
        tx.type_to_validate = Some(EMS_TYPE_UBA_FUNCTION_TEST);
        tx.comparison_offset = 0;
        // first byte reads 1 while the boiler is in test mode
        tx.comparison_value = if activated { 0 } else { 1 };
        tx.post_validate_read_type = Some(EMS_TYPE_UBA_FUNCTION_TEST);
        tx.force_refresh = true;

        if !activated {
            // test mode on: burner 0%, pump 100%, 3-way valve hot water
            // only. Zero-fill the rest of the record to be sure.
            let mut data = vec![0u8; 17];
            data[0] = 0x5A;
            data[3] = 0x64;
            data[4] = 0xFF;
            tx.payload = data;
        } else {
            // back to normal operating mode
            tx.payload = vec![0x00];
        }

        self.enqueue(tx)
    }

    /// Queues the periodic boiler reads instead of waiting for the
    /// broadcast cycle.
    pub fn request_boiler_values(&mut self) -> Result<(), EmsError> {
        let dest = self.devices.boiler.device_id.unwrap_or(EMS_ID_BOILER);
        self.enqueue_read(EMS_TYPE_UBA_MONITOR_FAST, dest, false)?;
        self.enqueue_read(EMS_TYPE_UBA_MONITOR_SLOW, dest, false)?;
        self.enqueue_read(EMS_TYPE_UBA_PARAMETER_WW, dest, false)?;
        self.enqueue_read(EMS_TYPE_UBA_PARAMETERS, dest, false)?;
        self.enqueue_read(EMS_TYPE_UBA_TOTAL_UPTIME, dest, false)
    }

    /// Queues the status and set-record reads for the bound thermostat.
    pub fn request_thermostat_values(&mut self) -> Result<(), EmsError> {
        let thermostat = &self.devices.thermostat;
        let Some(dest) = thermostat.device_id else {
            return Err(EmsError::DeviceNotBound("thermostat"));
        };
        let model = thermostat.model;
        let hc = thermostat.hc;

        match model {
            ThermostatModel::Rc20 | ThermostatModel::Rc20F => {
                self.enqueue_read(EMS_TYPE_RC20_STATUS, dest, false)?;
                self.enqueue_read(EMS_TYPE_RC20_SET, dest, false)?;
            }
            ThermostatModel::Rc30 => {
                self.enqueue_read(EMS_TYPE_RC30_STATUS, dest, false)?;
                self.enqueue_read(EMS_TYPE_RC30_SET, dest, false)?;
            }
            ThermostatModel::Easy => {
                self.enqueue_read(EMS_TYPE_EASY_STATUS, dest, false)?;
            }
            ThermostatModel::Rc35 => {
                if hc == 2 {
                    self.enqueue_read(EMS_TYPE_RC35_STATUS_HC2, dest, false)?;
                    self.enqueue_read(EMS_TYPE_RC35_SET_HC2, dest, false)?;
                } else {
                    self.enqueue_read(EMS_TYPE_RC35_STATUS_HC1, dest, false)?;
                    self.enqueue_read(EMS_TYPE_RC35_SET_HC1, dest, false)?;
                }
            }
            ThermostatModel::RcPlus => {
                self.enqueue_read(EMS_TYPE_RCPLUS_STATUS, dest, false)?;
            }
            _ => {}
        }

        self.enqueue_read(EMS_TYPE_RC_TIME, dest, false)
    }

    /// Queues the solar module monitor read matching the bound model.
    pub fn request_solar_module_values(&mut self) -> Result<(), EmsError> {
        match self.devices.solar_module.product_id {
            Some(tables::EMS_PRODUCTID_SM10) => {
                self.enqueue_read(EMS_TYPE_SM10_MONITOR, EMS_ID_SM, false)
            }
            Some(tables::EMS_PRODUCTID_SM100) => {
                self.enqueue_read(EMS_TYPE_SM100_MONITOR, EMS_ID_SM, false)
            }
            _ => Ok(()),
        }
    }

    /// Probes the well-known device addresses for their Version record.
    pub fn discover_devices(&mut self) -> Result<(), EmsError> {
        log_info("Starting auto discover of EMS devices...");

        self.enqueue_read(EMS_TYPE_VERSION, EMS_ID_BOILER, false)?;
        self.detect_junkers()?;

        self.enqueue_read(EMS_TYPE_VERSION, EMS_ID_SM, false)?;
        self.enqueue_read(EMS_TYPE_VERSION, EMS_ID_HP, false)?;

        match self.devices.thermostat.device_id {
            // model already known, just fetch version and product id
            Some(dest) => self.enqueue_read(EMS_TYPE_VERSION, dest, false),
            None => self.scan_devices(),
        }
    }

    /// Asks every known device address for its Version record.
    pub fn scan_devices(&mut self) -> Result<(), EmsError> {
        log_info("Started scan on EMS bus for known devices");

        let mut device_ids: Vec<u8> = vec![EMS_ID_BOILER];
        device_ids.extend(tables::THERMOSTAT_TYPES.iter().map(|t| t.device_id));
        device_ids.extend(tables::SOLAR_MODULE_TYPES.iter().map(|t| t.device_id));
        device_ids.extend(tables::OTHER_TYPES.iter().map(|t| t.device_id));

        device_ids.sort_unstable();
        device_ids.dedup();
        device_ids.retain(|&id| id != EMS_ID_NONE);

        for device_id in device_ids {
            self.enqueue_read(EMS_TYPE_VERSION, device_id, false)?;
        }

        self.detect_junkers()
    }

    /// Junkers boilers only answer a Version request with reversed
    /// addressing, so probe with a raw telegram.
    fn detect_junkers(&mut self) -> Result<(), EmsError> {
        let probe = format!(
            "{:02X} {:02X} {:02X} 00 {:02X}",
            EMS_ID_ME | 0x80,
            EMS_ID_BOILER | 0x80,
            EMS_TYPE_VERSION,
            EMS_MAX_TELEGRAM_LENGTH
        );
        self.send_raw(&probe)
    }

    /// Forgets all devices seen so far.
    pub fn clear_device_list(&mut self) {
        self.detected.clear();
    }

    /// Experimental UBA master handshake sequence.
    pub fn send_startup_telegrams(&mut self) -> Result<(), EmsError> {
        log_info("Sending startup sequence...");
        let dest = self.devices.boiler.device_id.unwrap_or(EMS_ID_BOILER);

        // leave function test mode, then read type 0x01
        self.send_raw(&format!("{:02X} {:02X} 1D 00 00", EMS_ID_ME, dest))?;
        self.send_raw(&format!("{:02X} {:02X} 01 00 1B", EMS_ID_ME, dest | 0x80))
    }

    /// Human readable description of the bound boiler.
    pub fn boiler_description(&self) -> String {
        let boiler = &self.devices.boiler;
        let Some(product_id) = boiler.product_id else {
            return "<not enabled>".to_string();
        };
        let name = match tables::find_boiler(product_id) {
            Some(bt) => bt.model.to_string(),
            None => format!("DeviceID: 0x{:02X}", boiler.device_id.unwrap_or(EMS_ID_NONE)),
        };
        format!("{} (ProductID:{} Version:{})", name, product_id, boiler.version)
    }

    /// Human readable description of the bound thermostat.
    pub fn thermostat_description(&self) -> String {
        let thermostat = &self.devices.thermostat;
        let Some(product_id) = thermostat.product_id else {
            return "<not enabled>".to_string();
        };
        let name = match tables::find_thermostat(product_id) {
            Some(tt) => tt.model_string.to_string(),
            None => format!(
                "DeviceID: 0x{:02X}",
                thermostat.device_id.unwrap_or(EMS_ID_NONE)
            ),
        };
        format!("{} (ProductID:{} Version:{})", name, product_id, thermostat.version)
    }

    /// Human readable description of the bound solar module.
    pub fn solar_module_description(&self) -> String {
        let sm = &self.devices.solar_module;
        let Some(product_id) = sm.product_id else {
            return "<not enabled>".to_string();
        };
        let name = match tables::find_solar_module(product_id) {
            Some(st) => st.model.to_string(),
            None => format!("DeviceID: 0x{:02X}", sm.device_id.unwrap_or(EMS_ID_NONE)),
        };
        format!("{} (ProductID:{} Version:{})", name, product_id, sm.version)
    }

    /// Human readable description of the bound heat pump.
    pub fn heat_pump_description(&self) -> String {
        let hp = &self.devices.heat_pump;
        let Some(product_id) = hp.product_id else {
            return "<not enabled>".to_string();
        };
        let name = match tables::find_heat_pump(product_id) {
            Some(ht) => ht.model.to_string(),
            None => format!("DeviceID: 0x{:02X}", hp.device_id.unwrap_or(EMS_ID_NONE)),
        };
        format!("{} (ProductID:{} Version:{})", name, product_id, hp.version)
    }
}
