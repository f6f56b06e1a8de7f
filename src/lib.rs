//! # matrix-thermostat
//!
//! A threshold thermostat that samples a temperature sensor, switches a
//! heater against a button-adjustable setpoint, and shows a two-digit
//! readout on an 8x8 LED matrix driven through two shift registers.
//!
//! ## Features
//!
//! - **Hardware abstraction**: Traits for the sensor, heater, buttons and matrix output
//! - **Flicker-free multiplexing**: Column-at-a-time scan with blanking between columns
//! - **Tear-free updates**: Double-buffered frames published inside a critical section
//! - **Two scan strategies**: Cooperative polling or a timer interrupt / dedicated thread
//! - **Debounced controls**: Setpoint shown for a few seconds after each press
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware abstractions
//! - `font`, `compose` - Digit glyphs and number-to-bitmap composition
//! - `frame` - Frame buffer, double buffering and the shared frame
//! - `scanner`, `shift` - Multiplexing engine and the shift-register driver
//! - `controls`, `acquisition`, `actuator` - Setpoint, sampling and heater policy
//! - `thermostat` - Main loop that ties everything together
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use matrix_thermostat::{
//!     compose, MatrixWiring, PollingScan, Scanner, SharedFrame, Thermostat, ThermostatConfig,
//!     hal::{MockButtons, MockHeater, MockMatrix, MockSensor},
//! };
//!
//! let config = ThermostatConfig::default();
//! let frame = SharedFrame::new();
//! let scan = PollingScan::new(
//!     Scanner::new(MockMatrix::new(), MatrixWiring::default()),
//!     config.timing.scan_period_ms,
//! );
//! let mut sensor = MockSensor::new();
//! sensor.set_temperature(19.5);
//!
//! let mut thermostat = Thermostat::new(
//!     &config, sensor, MockHeater::new(), MockButtons::new(), scan, &frame,
//! );
//! thermostat.begin().unwrap();
//!
//! // Update in your main loop
//! for now in 0..100 {
//!     thermostat.poll(now).unwrap();
//! }
//!
//! assert!(thermostat.heater().on);
//! assert_eq!(frame.live(), compose(19));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Sensor scheduling and last-known-good readings.
pub mod acquisition;
/// Heater on/off policy.
pub mod actuator;
/// Number-to-bitmap composition.
pub mod compose;
/// Setpoint buttons, debouncing and display mode.
pub mod controls;
/// 3-column digit font.
pub mod font;
/// Frame buffer, double buffering and the critical-section shared frame.
pub mod frame;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Column multiplexing engine and scan drivers.
pub mod scanner;
/// Bit-banged driver for cascaded shift registers.
pub mod shift;
/// Main thermostat loop that coordinates inputs, sensor, heater and display.
pub mod thermostat;
/// Core traits for hardware abstraction.
pub mod traits;

/// Shared configuration system for desktop and ESP32.
pub mod config;

// Re-exports for convenience
pub use acquisition::{Acquisition, Sample, INVALID_TEMPERATURE};
pub use actuator::should_heat;
pub use compose::{compose, saturate, MAX_DISPLAY, MIN_DISPLAY};
pub use controls::{Debouncer, DisplayMode, SetpointController};
pub use frame::{DoubleBuffer, Frame, SharedFrame, COLUMNS, ROWS};
pub use scanner::{ExternalScan, MatrixWiring, Polarity, PollingScan, ScanDriver, Scanner};
#[cfg(feature = "std")]
pub use scanner::ScanThread;
pub use shift::{ByteOrder, ShiftRegisterMatrix};
pub use thermostat::{Error, Thermostat, ThermostatState};
pub use traits::{
    Button, ButtonPanel, Clock, HeaterOutput, MatrixOutput, SensorError, TemperatureSensor,
};

// Config re-exports
pub use config::{ConfigError, DeviceConfig, MatrixConfig, ThermostatConfig, TimingConfig};
