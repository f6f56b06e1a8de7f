//! ESP32-C3 SuperMini hardware abstraction layer for the matrix thermostat.
//!
//! This module provides hardware implementations for an ESP32-C3 SuperMini
//! reading a DHT22, switching a heater relay and multiplexing an 8x8 LED
//! matrix through two cascaded 74HC595 shift registers.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32-C3 SuperMini (RISC-V 160MHz, 4MB Flash)
//! - **Sensor**: DHT22 / AM2302 single-wire temperature and humidity
//! - **Heater**: Relay or MOSFET module, HIGH = heating
//! - **Display**: 8x8 LED matrix behind 2x 74HC595 (rows, then column select)
//! - **Buttons**: Two momentary push buttons to 3.3V
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for GPIO assignments matching the SuperMini layout.

mod buttons;
mod clock;
mod heater;
mod matrix;
mod sensor;

pub use buttons::Esp32Buttons;
pub use clock::Esp32Clock;
pub use heater::Esp32Heater;
pub use matrix::{esp32_matrix, Esp32Matrix};
pub use sensor::Esp32Dht22;

#[cfg(feature = "scan-interrupt")]
mod scan_timer;
#[cfg(feature = "scan-interrupt")]
pub use scan_timer::Esp32ScanTimer;

/// Pin assignments for SuperMini ESP32-C3.
///
/// These constants match the wiring used by `esp32_main`:
/// - Shift register chain on GPIO2-4
/// - DHT22 data on GPIO5
/// - Buttons on GPIO6, 7
/// - Heater relay on GPIO10
pub mod pins {
    // =========================================================================
    // Shift Registers (74HC595 x2)
    // =========================================================================

    /// Serial data (DS on the first 74HC595)
    pub const SR_DATA: i32 = 2;

    /// Shift clock (SHCP on both registers)
    pub const SR_CLOCK: i32 = 3;

    /// Storage/latch clock (STCP on both registers)
    pub const SR_LATCH: i32 = 4;

    // =========================================================================
    // Sensor (DHT22)
    // =========================================================================

    /// Single-wire data line, needs a 10k pull-up
    pub const DHT_DATA: i32 = 5;

    // =========================================================================
    // Buttons
    // =========================================================================

    /// Setpoint up (active high, internal pull-down)
    pub const BTN_UP: i32 = 6;

    /// Setpoint down (active high, internal pull-down)
    pub const BTN_DOWN: i32 = 7;

    // =========================================================================
    // Heater
    // =========================================================================

    /// Relay driver input, HIGH = heating
    pub const HEATER: i32 = 10;
}
