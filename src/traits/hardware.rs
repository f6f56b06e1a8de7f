//! Hardware abstraction traits for the sensor, heater, buttons and LED matrix.
//!
//! This module defines the hardware interfaces that let the thermostat run
//! on an ESP32 or against the desktop mocks without changes to the control
//! logic.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`TemperatureSensor`] | Slow temperature/humidity sensor (DHT22 class) |
//! | [`HeaterOutput`] | Single on/off actuator |
//! | [`ButtonPanel`] | Raw levels of the increase/decrease buttons |
//! | [`MatrixOutput`] | Latched row/column bytes for the LED matrix |
//! | [`Clock`] | Time source for `no_std` environments |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For ESP32 hardware, use the
//! implementations from `hal::esp32` (requires `esp32` feature).
//!
//! # Example
//!
//! ```rust
//! use matrix_thermostat::traits::{HeaterOutput, TemperatureSensor};
//! use matrix_thermostat::hal::{MockHeater, MockSensor};
//!
//! let mut sensor = MockSensor::new();
//! sensor.queue_temperature(21.5);
//! assert_eq!(sensor.read_temperature(), Ok(21.5));
//!
//! let mut heater = MockHeater::new();
//! heater.set_on(true).unwrap();
//! assert!(heater.is_on());
//! ```

/// Errors reported by a [`TemperatureSensor`].
///
/// None of these are fatal. The acquisition scheduler keeps the last good
/// reading and tries again one full sampling interval later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SensorError {
    /// The sensor did not answer within its protocol timing.
    Timeout,
    /// The transferred frame failed its checksum.
    Checksum,
    /// The sensor answered with NaN or a physically impossible value.
    InvalidReading,
    /// The underlying pin or bus reported an error.
    Bus,
}

impl SensorError {
    /// Returns the error as a short lowercase string for log output.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SensorError::Timeout => "timeout",
            SensorError::Checksum => "checksum",
            SensorError::InvalidReading => "invalid reading",
            SensorError::Bus => "bus error",
        }
    }
}

/// Temperature and humidity sensor.
///
/// The physical sensor is slow: callers must not query it faster than its
/// conversion rate. The acquisition scheduler enforces that.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use matrix_thermostat::traits::{SensorError, TemperatureSensor};
///
/// struct MySensor { /* hardware handles */ }
///
/// impl TemperatureSensor for MySensor {
///     fn read_temperature(&mut self) -> Result<f32, SensorError> {
///         // Trigger a conversion and decode the frame...
///         Ok(21.5)
///     }
/// }
/// ```
pub trait TemperatureSensor {
    /// Prepares the sensor. Called once at startup.
    fn begin(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    /// Reads the temperature in degrees Celsius.
    fn read_temperature(&mut self) -> Result<f32, SensorError>;

    /// Reads the relative humidity in percent.
    ///
    /// Sensors without a humidity channel keep the default, which reports
    /// [`SensorError::InvalidReading`].
    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        Err(SensorError::InvalidReading)
    }
}

/// Heater actuator: a single digital output, HIGH = engaged.
pub trait HeaterOutput {
    /// Error type for output operations.
    type Error;

    /// Switch the heater on or off.
    fn set_on(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Returns true if the heater was last switched on.
    fn is_on(&self) -> bool;
}

/// One of the two momentary setpoint buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Button {
    /// Raises the setpoint by one degree.
    Increase,
    /// Lowers the setpoint by one degree.
    Decrease,
}

impl Button {
    /// Both buttons in polling order.
    pub const ALL: [Button; 2] = [Button::Increase, Button::Decrease];

    /// Setpoint change applied for one accepted press.
    #[inline]
    pub const fn step(&self) -> i32 {
        match self {
            Button::Increase => 1,
            Button::Decrease => -1,
        }
    }

    /// Index into per-button state arrays.
    #[inline]
    pub const fn index(&self) -> usize {
        match self {
            Button::Increase => 0,
            Button::Decrease => 1,
        }
    }
}

/// Raw button levels.
///
/// Implementations return the electrical level without any debouncing;
/// HIGH (`true`) means pressed. Debouncing is done by
/// [`crate::controls::Debouncer`].
pub trait ButtonPanel {
    /// Returns the raw level of `button`, `true` = pressed.
    fn is_high(&mut self, button: Button) -> bool;
}

/// Output stage of the LED matrix.
///
/// Both bytes must reach the physical outputs together: implementations
/// load them into the register chain and only then commit them with a
/// single latch pulse, so no partial state is ever visible.
pub trait MatrixOutput {
    /// Error type for output operations.
    type Error;

    /// Load `rows` and `columns` (already in wire polarity) and latch them.
    fn write(&mut self, rows: u8, columns: u8) -> Result<(), Self::Error>;
}

impl<T: MatrixOutput + ?Sized> MatrixOutput for &mut T {
    type Error = T::Error;

    fn write(&mut self, rows: u8, columns: u8) -> Result<(), Self::Error> {
        (**self).write(rows, columns)
    }
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for every timing decision
/// (sampling interval, debounce window, display timeout, scan period).
///
/// # Example
///
/// ```rust
/// use matrix_thermostat::traits::Clock;
/// use matrix_thermostat::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}
