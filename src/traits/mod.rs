//! Trait definitions for hardware abstraction.
//!
//! This module defines the core abstractions that allow the thermostat to
//! run on an ESP32 or on the desktop mocks without changes.
//!
//! # Hardware Abstraction
//!
//! The key hardware traits are:
//!
//! - [`TemperatureSensor`]: Slow sensor with an optional humidity channel
//! - [`HeaterOutput`]: On/off heating element driver
//! - [`ButtonPanel`]: Increase/decrease push buttons
//! - [`MatrixOutput`]: Row and column bytes latched onto the LED matrix
//! - [`Clock`]: Time source for `no_std` environments

pub mod hardware;

pub use hardware::*;
