//! Known EMS device models, keyed by product ID.
//!
//! Version telegrams (type 0x02) carry a product ID in their first byte;
//! these tables map it to a model name and, for thermostats, the command
//! set and write capability. Lookup order matters: boilers are only
//! matched when the telegram came from the boiler address, then
//! thermostats, solar modules, heat pumps and finally the catch-all list.

use super::ThermostatModel;

/// A known boiler model. Boilers always answer on the fixed boiler address.
pub struct BoilerType {
    pub product_id: u8,
    pub model: &'static str,
}

/// A known thermostat model with its bus address and command set.
pub struct ThermostatType {
    pub model: ThermostatModel,
    pub device_id: u8,
    pub product_id: u8,
    pub model_string: &'static str,
    pub write_supported: bool,
}

/// A known solar module, heat pump or auxiliary device.
pub struct DeviceType {
    pub device_id: u8,
    pub product_id: u8,
    pub model: &'static str,
}

pub const BOILER_TYPES: &[BoilerType] = &[
    BoilerType { product_id: 72, model: "MC10 Module" },
    BoilerType { product_id: 123, model: "Buderus GBx72/Nefit Trendline/Junkers Cerapur" },
    BoilerType { product_id: 115, model: "Nefit Topline Compact/Buderus GB162" },
    BoilerType { product_id: 203, model: "Buderus Logamax U122/Junkers Cerapur" },
    BoilerType { product_id: 208, model: "Buderus Logamax plus/GB192" },
    BoilerType { product_id: 64, model: "Sieger BK15/Nefit Smartline/Buderus GB152" },
    BoilerType { product_id: 95, model: "Bosch Condens 2500/Junkers Heatronic 3" },
    BoilerType { product_id: 122, model: "Nefit Proline" },
    BoilerType { product_id: 172, model: "Nefit Enviline" },
];

pub const THERMOSTAT_TYPES: &[ThermostatType] = &[
    ThermostatType {
        model: ThermostatModel::Rc10,
        device_id: 0x17,
        product_id: 79,
        model_string: "RC10/Nefit Moduline 100",
        write_supported: true,
    },
    ThermostatType {
        model: ThermostatModel::Rc20,
        device_id: 0x17,
        product_id: 77,
        model_string: "RC20/Nefit Moduline 300",
        write_supported: true,
    },
    ThermostatType {
        model: ThermostatModel::Rc20F,
        device_id: 0x18,
        product_id: 93,
        model_string: "RC20F",
        write_supported: true,
    },
    ThermostatType {
        model: ThermostatModel::Rc30,
        device_id: 0x10,
        product_id: 78,
        model_string: "RC30/Nefit Moduline 400",
        write_supported: true,
    },
    ThermostatType {
        model: ThermostatModel::Rc35,
        device_id: 0x10,
        product_id: 86,
        model_string: "RC35",
        write_supported: true,
    },
    ThermostatType {
        model: ThermostatModel::Rc35,
        device_id: 0x10,
        product_id: 76,
        model_string: "ES73",
        write_supported: true,
    },
    ThermostatType {
        model: ThermostatModel::Easy,
        device_id: 0x18,
        product_id: 202,
        model_string: "TC100/Nefit Easy",
        write_supported: false,
    },
    ThermostatType {
        model: ThermostatModel::RcPlus,
        device_id: 0x10,
        product_id: 158,
        model_string: "RC300/RC310",
        write_supported: false,
    },
    ThermostatType {
        model: ThermostatModel::RcPlus,
        device_id: 0x18,
        product_id: 165,
        model_string: "RC1010",
        write_supported: false,
    },
    ThermostatType {
        model: ThermostatModel::Junkers,
        device_id: 0x10,
        product_id: 111,
        model_string: "Junkers FR10",
        write_supported: false,
    },
    ThermostatType {
        model: ThermostatModel::Junkers,
        device_id: 0x10,
        product_id: 105,
        model_string: "Junkers FW100",
        write_supported: false,
    },
];

pub const EMS_PRODUCTID_SM10: u8 = 73;
pub const EMS_PRODUCTID_SM100: u8 = 163;

pub const SOLAR_MODULE_TYPES: &[DeviceType] = &[
    DeviceType { device_id: 0x30, product_id: EMS_PRODUCTID_SM10, model: "SM10 Solar Module" },
    DeviceType { device_id: 0x30, product_id: EMS_PRODUCTID_SM100, model: "SM100 Solar Module" },
    DeviceType { device_id: 0x30, product_id: 101, model: "Junkers ISM1 Solar Module" },
];

pub const HEAT_PUMP_TYPES: &[DeviceType] =
    &[DeviceType { device_id: 0x38, product_id: 252, model: "HeatPump Module" }];

pub const OTHER_TYPES: &[DeviceType] = &[
    DeviceType { device_id: 0x09, product_id: 68, model: "BC10/RFM20 Receiver" },
    DeviceType { device_id: 0x09, product_id: 190, model: "BC10 Base Controller" },
    DeviceType { device_id: 0x09, product_id: 114, model: "BC10 Base Controller" },
    DeviceType { device_id: 0x09, product_id: 125, model: "BC25 Base Controller" },
    DeviceType { device_id: 0x11, product_id: 71, model: "WM10 Switch Module" },
    DeviceType { device_id: 0x21, product_id: 69, model: "MM10 Mixer Module" },
    DeviceType { device_id: 0x20, product_id: 160, model: "MM100 Mixing Module" },
    DeviceType { device_id: 0x02, product_id: 171, model: "EMS-OT OpenTherm converter" },
    DeviceType { device_id: 0x48, product_id: 189, model: "Wireless Gateway" },
];

/// Looks up a boiler by product ID.
pub fn find_boiler(product_id: u8) -> Option<&'static BoilerType> {
    BOILER_TYPES.iter().find(|b| b.product_id == product_id)
}

/// Looks up a thermostat by product ID.
pub fn find_thermostat(product_id: u8) -> Option<&'static ThermostatType> {
    THERMOSTAT_TYPES.iter().find(|t| t.product_id == product_id)
}

/// Looks up a solar module by product ID.
pub fn find_solar_module(product_id: u8) -> Option<&'static DeviceType> {
    SOLAR_MODULE_TYPES.iter().find(|d| d.product_id == product_id)
}

/// Looks up a heat pump by product ID.
pub fn find_heat_pump(product_id: u8) -> Option<&'static DeviceType> {
    HEAT_PUMP_TYPES.iter().find(|d| d.product_id == product_id)
}

/// Looks up any other known device by product ID.
pub fn find_other(product_id: u8) -> Option<&'static DeviceType> {
    OTHER_TYPES.iter().find(|d| d.product_id == product_id)
}
