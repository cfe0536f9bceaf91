//! EMS Protocol Constants
//!
//! This module defines constants used in the EMS bus protocol implementation:
//! fixed device addresses, telegram type IDs, payload offsets and the
//! protocol timing/retry limits.

use std::time::Duration;

// ----------------------------------------------------------------------------
// Bus addresses
// ----------------------------------------------------------------------------

/// Sentinel for "no device" / broadcast destination
pub const EMS_ID_NONE: u8 = 0x00;

/// Our own address on the bus (the service key / gateway slot)
pub const EMS_ID_ME: u8 = 0x0B;

/// The boiler (UBA master) is always at this address
pub const EMS_ID_BOILER: u8 = 0x08;

/// Solar module address (SM10/SM100/ISM1)
pub const EMS_ID_SM: u8 = 0x30;

/// Heat pump module address
pub const EMS_ID_HP: u8 = 0x38;

/// RF gateway address
pub const EMS_ID_GATEWAY: u8 = 0x48;

// ----------------------------------------------------------------------------
// Framing and timing
// ----------------------------------------------------------------------------

/// Shortest structured telegram: 4 header bytes, one data byte, CRC
pub const EMS_MIN_TELEGRAM_LENGTH: usize = 6;

/// Longest telegram we will request or build
pub const EMS_MAX_TELEGRAM_LENGTH: usize = 32;

/// Single-byte reply from the master after a successful write
pub const EMS_TX_SUCCESS: u8 = 0x01;

/// Single-byte reply from the master after a failed write
pub const EMS_TX_ERROR: u8 = 0x04;

/// Retries allowed per read or write/validate cycle before giving up
pub const EMS_TX_RETRY_LIMIT: u8 = 2;

/// Fixed capacity of the Tx queue
pub const EMS_TX_QUEUE_CAPACITY: usize = 50;

/// No valid Rx within this window means the bus is offline
pub const EMS_BUS_TIMEOUT: Duration = Duration::from_secs(15);

/// A poll interval above this window means we cannot transmit
pub const EMS_POLL_TIMEOUT: Duration = Duration::from_secs(5);

// ----------------------------------------------------------------------------
// Telegram type IDs - boiler (UBA master)
// ----------------------------------------------------------------------------

/// Firmware version / product id query, common to every EMS device
pub const EMS_TYPE_VERSION: u16 = 0x02;

pub const EMS_TYPE_UBA_MONITOR_FAST: u16 = 0x18;
pub const EMS_TYPE_UBA_MONITOR_SLOW: u16 = 0x19;
pub const EMS_TYPE_UBA_MONITOR_WW: u16 = 0x34;
pub const EMS_TYPE_UBA_PARAMETER_WW: u16 = 0x33;
pub const EMS_TYPE_UBA_TOTAL_UPTIME: u16 = 0x14;
pub const EMS_TYPE_UBA_MAINTENANCE_SETTINGS: u16 = 0x15;
pub const EMS_TYPE_UBA_PARAMETERS: u16 = 0x16;
pub const EMS_TYPE_UBA_SET_POINTS: u16 = 0x1A;
pub const EMS_TYPE_UBA_FUNCTION_TEST: u16 = 0x1D;

// ----------------------------------------------------------------------------
// Telegram type IDs - thermostats
// ----------------------------------------------------------------------------

/// Date and time broadcast, common to most thermostats
pub const EMS_TYPE_RC_TIME: u16 = 0x06;
pub const EMS_TYPE_RC_OUTDOOR_TEMP: u16 = 0xA3;

pub const EMS_TYPE_RC10_SET: u16 = 0xB0;
pub const EMS_TYPE_RC10_STATUS: u16 = 0xB1;
pub const EMS_TYPE_RC20_SET: u16 = 0xA8;
pub const EMS_TYPE_RC20_STATUS: u16 = 0x91;
pub const EMS_TYPE_RC30_SET: u16 = 0xA7;
pub const EMS_TYPE_RC30_STATUS: u16 = 0x41;
pub const EMS_TYPE_RC35_SET_HC1: u16 = 0x3D;
pub const EMS_TYPE_RC35_STATUS_HC1: u16 = 0x3E;
pub const EMS_TYPE_RC35_SET_HC2: u16 = 0x47;
pub const EMS_TYPE_RC35_STATUS_HC2: u16 = 0x48;
pub const EMS_TYPE_EASY_STATUS: u16 = 0x0A;

// EMS-plus (16-bit) thermostat types
pub const EMS_TYPE_RCPLUS_STATUS: u16 = 0x01A5;
pub const EMS_TYPE_RCPLUS_STATUS_MODE: u16 = 0x01AF;
pub const EMS_TYPE_RCPLUS_STATUS_HEATING: u16 = 0x01B9;
pub const EMS_TYPE_RCPLUS_SET: u16 = 0x01B7;
pub const EMS_TYPE_JUNKERS_STATUS: u16 = 0x006F;

// ----------------------------------------------------------------------------
// Telegram type IDs - solar modules and heat pumps
// ----------------------------------------------------------------------------

pub const EMS_TYPE_SM10_MONITOR: u16 = 0x97;
pub const EMS_TYPE_SM100_MONITOR: u16 = 0x0262;
pub const EMS_TYPE_SM100_STATUS: u16 = 0x0264;
pub const EMS_TYPE_SM100_STATUS2: u16 = 0x026A;
pub const EMS_TYPE_SM100_ENERGY: u16 = 0x028E;
pub const EMS_TYPE_ISM1_STATUS: u16 = 0x0003;
pub const EMS_TYPE_ISM1_SET: u16 = 0x0001;

pub const EMS_TYPE_HP_MONITOR1: u16 = 0xE3;
pub const EMS_TYPE_HP_MONITOR2: u16 = 0xE5;

// ----------------------------------------------------------------------------
// Payload offsets (byte positions within the telegram data block)
// ----------------------------------------------------------------------------

pub const EMS_OFFSET_UBA_PARAMETER_WW_ACTIVATED: u8 = 1;
pub const EMS_OFFSET_UBA_PARAMETER_WW_TEMP: u8 = 2;
pub const EMS_OFFSET_UBA_PARAMETER_WW_COMFORT: u8 = 9;
pub const EMS_OFFSET_UBA_SET_POINTS_FLOWTEMP: u8 = 0;

pub const EMS_OFFSET_RC10_STATUS_SETPOINT: usize = 1;
pub const EMS_OFFSET_RC10_STATUS_CURR: usize = 2;
pub const EMS_OFFSET_RC10_SET_TEMP: u8 = 4;

pub const EMS_OFFSET_RC20_STATUS_SETPOINT: usize = 1;
pub const EMS_OFFSET_RC20_STATUS_CURR: usize = 2;
pub const EMS_OFFSET_RC20_SET_MODE: u8 = 23;
pub const EMS_OFFSET_RC20_SET_TEMP: u8 = 28;

pub const EMS_OFFSET_RC30_STATUS_SETPOINT: usize = 1;
pub const EMS_OFFSET_RC30_STATUS_CURR: usize = 2;
pub const EMS_OFFSET_RC30_SET_MODE: u8 = 23;
pub const EMS_OFFSET_RC30_SET_TEMP: u8 = 28;

pub const EMS_OFFSET_RC35_STATUS_SETPOINT: usize = 2;
pub const EMS_OFFSET_RC35_STATUS_CURR: usize = 3;
pub const EMS_OFFSET_RC35_STATUS_MODE_DAY: usize = 1;
pub const EMS_OFFSET_RC35_SET_TEMP_NIGHT: u8 = 1;
pub const EMS_OFFSET_RC35_SET_TEMP_DAY: u8 = 2;
pub const EMS_OFFSET_RC35_SET_TEMP_HOLIDAY: u8 = 3;
pub const EMS_OFFSET_RC35_SET_MODE: u8 = 7;
pub const EMS_OFFSET_RC35_SET_HEATINGTYPE: usize = 0;
pub const EMS_OFFSET_RC35_SET_CIRCUITCALCTEMP: usize = 14;

pub const EMS_OFFSET_EASY_STATUS_CURR: usize = 8;
pub const EMS_OFFSET_EASY_STATUS_SETPOINT: usize = 10;

pub const EMS_OFFSET_RCPLUS_STATUS_CURR: usize = 0;
pub const EMS_OFFSET_RCPLUS_STATUS_SETPOINT: usize = 3;
pub const EMS_OFFSET_RCPLUS_STATUS_MODE: usize = 10;
pub const EMS_OFFSET_RCPLUS_MODE_DAY: usize = 8;

pub const EMS_OFFSET_JUNKERS_STATUS_SETPOINT: usize = 2;
pub const EMS_OFFSET_JUNKERS_STATUS_CURR: usize = 4;

// ----------------------------------------------------------------------------
// Well-known data values
// ----------------------------------------------------------------------------

/// Warm water comfort mode bytes written to UBAParameterWW offset 9
pub const EMS_VALUE_WW_COMFORT_HOT: u8 = 0x00;
pub const EMS_VALUE_WW_COMFORT_ECO: u8 = 0xD8;
pub const EMS_VALUE_WW_COMFORT_INTELLIGENT: u8 = 0xEC;

/// Selected flow temperature at or above this is treated as heating demand
pub const EMS_BOILER_SELFLOWTEMP_HEATING: u8 = 70;

/// Highest warm water temperature we will write to the boiler
pub const EMS_BOILER_TAPWATER_TEMPERATURE_MAX: u8 = 60;

/// Junkers Heatronic 3 boilers poll with reversed addressing
pub const EMS_PRODUCTID_HEATRONIC: u8 = 95;
