//! Decoders for the heat pump monitor telegrams.

use crate::devices::DeviceState;
use crate::ems::frame::RxTelegram;

/// HPMonitor1 - type 0xE3 - compressor modulation.
pub fn monitor1(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    state.heat_pump.modulation = rx.u8_at(14).or(state.heat_pump.modulation);
    true
}

/// HPMonitor2 - type 0xE5 - pump speed.
pub fn monitor2(rx: &RxTelegram, state: &mut DeviceState) -> bool {
    state.heat_pump.speed = rx.u8_at(25).or(state.heat_pump.speed);
    true
}
