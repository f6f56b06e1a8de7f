//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `dht`: DHT22 frame decoding shared by the ESP32 sensor driver
//! - `esp32`: ESP32-C3 with a DHT22, relay and 74HC595 matrix (requires `esp32` feature)

pub mod dht;
pub mod mock;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;

#[cfg(feature = "esp32")]
pub use esp32::*;
