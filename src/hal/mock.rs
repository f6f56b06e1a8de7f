//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for every hardware trait, enabling
//! development and testing on desktop without a board.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockSensor`] | [`TemperatureSensor`] | Queued readings and failures |
//! | [`MockHeater`] | [`HeaterOutput`] | Tracks on/off switching |
//! | [`MockButtons`] | [`ButtonPanel`] | Directly settable button levels |
//! | [`MockMatrix`] | [`MatrixOutput`] | Records every row/column write |
//! | [`MockPin`] | [`OutputPin`] | Level history for bit-bang drivers |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//!
//! # Example
//!
//! ```rust
//! use matrix_thermostat::hal::{MockHeater, MockSensor};
//! use matrix_thermostat::actuator::should_heat;
//! use matrix_thermostat::traits::{HeaterOutput, TemperatureSensor};
//!
//! let mut sensor = MockSensor::new();
//! let mut heater = MockHeater::new();
//! sensor.queue_temperature(18.0);
//!
//! let t = sensor.read_temperature().unwrap();
//! heater.set_on(should_heat(t, 25)).unwrap();
//! assert!(heater.is_on());
//! assert_eq!(heater.switch_count, 1);
//! ```
//!
//! [`TemperatureSensor`]: crate::traits::TemperatureSensor
//! [`HeaterOutput`]: crate::traits::HeaterOutput
//! [`ButtonPanel`]: crate::traits::ButtonPanel
//! [`MatrixOutput`]: crate::traits::MatrixOutput
//! [`Clock`]: crate::traits::Clock
//! [`OutputPin`]: embedded_hal::digital::OutputPin

extern crate alloc;
use alloc::collections::VecDeque;
use alloc::vec::Vec;

use core::sync::atomic::{AtomicU32, Ordering};

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

use crate::frame::{Frame, COLUMNS};
use crate::scanner::MatrixWiring;
use crate::traits::{
    Button, ButtonPanel, Clock, HeaterOutput, MatrixOutput, SensorError, TemperatureSensor,
};

// ============================================================================
// Sensor and Heater Mocks
// ============================================================================

/// Mock temperature/humidity sensor.
///
/// Queued results come out in FIFO order. Once the queue is empty the last
/// result keeps repeating, like a sensor sitting in a steady room. Before
/// anything is queued every read times out.
///
/// # Example
///
/// ```rust
/// use matrix_thermostat::hal::MockSensor;
/// use matrix_thermostat::traits::{SensorError, TemperatureSensor};
///
/// let mut sensor = MockSensor::new();
/// assert_eq!(sensor.read_temperature(), Err(SensorError::Timeout));
///
/// sensor.queue_temperature(20.0);
/// sensor.queue_error(SensorError::Checksum);
/// assert_eq!(sensor.read_temperature(), Ok(20.0));
/// assert_eq!(sensor.read_temperature(), Err(SensorError::Checksum));
/// assert_eq!(sensor.read_temperature(), Err(SensorError::Checksum));
/// assert_eq!(sensor.reads, 4);
/// ```
#[derive(Debug)]
pub struct MockSensor {
    /// Pending temperature results.
    pub queue: VecDeque<Result<f32, SensorError>>,
    /// Humidity returned by `read_humidity`; `None` reports an invalid reading.
    pub humidity: Option<f32>,
    /// Number of temperature reads performed.
    pub reads: usize,
    /// Whether `begin` was called.
    pub started: bool,
    current: Result<f32, SensorError>,
}

impl MockSensor {
    /// Creates a sensor with nothing queued.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            humidity: None,
            reads: 0,
            started: false,
            current: Err(SensorError::Timeout),
        }
    }

    /// Queues a successful reading.
    pub fn queue_temperature(&mut self, celsius: f32) {
        self.queue.push_back(Ok(celsius));
    }

    /// Queues a failed reading.
    pub fn queue_error(&mut self, error: SensorError) {
        self.queue.push_back(Err(error));
    }

    /// Drops anything queued and repeats `celsius` from now on.
    pub fn set_temperature(&mut self, celsius: f32) {
        self.queue.clear();
        self.current = Ok(celsius);
    }
}

impl Default for MockSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl TemperatureSensor for MockSensor {
    fn begin(&mut self) -> Result<(), SensorError> {
        self.started = true;
        Ok(())
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.reads += 1;
        if let Some(next) = self.queue.pop_front() {
            self.current = next;
        }
        self.current
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.humidity.ok_or(SensorError::InvalidReading)
    }
}

/// Mock heater relay.
///
/// # Example
///
/// ```rust
/// use matrix_thermostat::hal::MockHeater;
/// use matrix_thermostat::traits::HeaterOutput;
///
/// let mut heater = MockHeater::new();
/// heater.set_on(true).unwrap();
/// heater.set_on(true).unwrap();
/// heater.set_on(false).unwrap();
///
/// assert!(!heater.is_on());
/// assert_eq!(heater.call_count, 3);
/// assert_eq!(heater.switch_count, 2);
/// ```
#[derive(Debug, Default)]
pub struct MockHeater {
    /// Current output state.
    pub on: bool,
    /// Number of times `set_on` was called.
    pub call_count: usize,
    /// Number of actual on/off transitions.
    pub switch_count: usize,
    /// When set, `set_on` fails and leaves the state alone.
    pub fail: bool,
}

impl MockHeater {
    /// Creates a heater that is off.
    pub fn new() -> Self {
        Self::default()
    }
}

impl HeaterOutput for MockHeater {
    type Error = ();

    fn set_on(&mut self, on: bool) -> Result<(), ()> {
        self.call_count += 1;
        if self.fail {
            return Err(());
        }
        if self.on != on {
            self.switch_count += 1;
        }
        self.on = on;
        Ok(())
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

// ============================================================================
// Input Mocks
// ============================================================================

/// Mock pair of push buttons.
///
/// # Example
///
/// ```rust
/// use matrix_thermostat::hal::MockButtons;
/// use matrix_thermostat::traits::{Button, ButtonPanel};
///
/// let mut buttons = MockButtons::new();
/// buttons.set(Button::Decrease, true);
/// assert!(buttons.is_high(Button::Decrease));
/// assert!(!buttons.is_high(Button::Increase));
/// ```
#[derive(Debug, Default)]
pub struct MockButtons {
    levels: [bool; 2],
    /// Number of level reads performed.
    pub reads: usize,
}

impl MockButtons {
    /// Creates a panel with both buttons released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the raw level of `button`.
    pub fn set(&mut self, button: Button, high: bool) {
        self.levels[button.index()] = high;
    }
}

impl ButtonPanel for MockButtons {
    fn is_high(&mut self, button: Button) -> bool {
        self.reads += 1;
        self.levels[button.index()]
    }
}

// ============================================================================
// Display Mocks
// ============================================================================

/// Mock LED matrix that records every latched row/column pair.
///
/// # Example
///
/// ```rust
/// use matrix_thermostat::hal::MockMatrix;
/// use matrix_thermostat::traits::MatrixOutput;
///
/// let mut matrix = MockMatrix::new();
/// matrix.write(0x0F, 0x01).unwrap();
/// assert_eq!(matrix.writes, vec![(0x0F, 0x01)]);
///
/// matrix.fail_next = true;
/// assert!(matrix.write(0x00, 0x00).is_err());
/// assert_eq!(matrix.writes.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockMatrix {
    /// Every successful write, oldest first.
    pub writes: Vec<(u8, u8)>,
    /// When set, the next write fails and clears the flag.
    pub fail_next: bool,
}

impl MockMatrix {
    /// Creates a matrix with no writes recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the image a viewer would have seen.
    ///
    /// Replays the writes, decoding each one with `wiring`. A write that
    /// selects exactly one column sets that column's rows; writes selecting
    /// no column (blanking) or several are ignored.
    pub fn reconstruct(&self, wiring: MatrixWiring) -> Frame {
        let mut frame = Frame::blank();
        for &(rows, columns) in &self.writes {
            let selected = wiring.column.apply(columns);
            if selected.count_ones() != 1 {
                continue;
            }
            let column = selected.trailing_zeros() as usize;
            if column < COLUMNS {
                frame.set_column(column, wiring.row.apply(rows));
            }
        }
        frame
    }
}

impl MatrixOutput for MockMatrix {
    type Error = ();

    fn write(&mut self, rows: u8, columns: u8) -> Result<(), ()> {
        if self.fail_next {
            self.fail_next = false;
            return Err(());
        }
        self.writes.push((rows, columns));
        Ok(())
    }
}

// ============================================================================
// GPIO Mocks
// ============================================================================

/// Global write counter shared by all [`MockPin`]s, so the order of
/// writes across different pins can be compared.
static SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Error returned by a [`MockPin`] that was told to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockPinError;

impl embedded_hal::digital::Error for MockPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Mock push-pull output pin with a full level history.
///
/// Each write is stamped with a process-wide sequence number, which lets
/// tests check that one pin changed before another.
///
/// # Example
///
/// ```rust
/// use embedded_hal::digital::OutputPin;
/// use matrix_thermostat::hal::MockPin;
///
/// let mut pin = MockPin::new();
/// pin.set_high().unwrap();
/// pin.set_low().unwrap();
/// pin.set_high().unwrap();
///
/// assert!(pin.is_set_high());
/// assert_eq!(pin.rising_edges(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MockPin {
    /// Every write as (sequence number, level), oldest first.
    pub history: Vec<(u32, bool)>,
    level: bool,
    remaining: Option<usize>,
}

impl MockPin {
    /// Creates a pin that starts low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `writes` more writes succeed, then fails every write after.
    pub fn fail_after(&mut self, writes: usize) {
        self.remaining = Some(writes);
    }

    /// Current level.
    pub fn is_set_high(&self) -> bool {
        self.level
    }

    /// Number of low-to-high transitions.
    pub fn rising_edges(&self) -> usize {
        self.rises().count()
    }

    /// Sequence number of the first rising edge.
    pub fn first_rise_seq(&self) -> Option<u32> {
        self.rises().next()
    }

    /// Sequence number of the last rising edge.
    pub fn last_rise_seq(&self) -> Option<u32> {
        self.rises().last()
    }

    /// Level of this pin at each rising edge of `clock`.
    ///
    /// This is what a shift register wired to the two pins would capture.
    pub fn sampled_bits(&self, clock: &MockPin) -> Vec<bool> {
        clock
            .rises()
            .map(|edge| {
                self.history
                    .iter()
                    .take_while(|(seq, _)| *seq < edge)
                    .last()
                    .map(|(_, level)| *level)
                    .unwrap_or(false)
            })
            .collect()
    }

    fn rises(&self) -> impl Iterator<Item = u32> + '_ {
        let mut previous = false;
        self.history.iter().filter_map(move |&(seq, level)| {
            let rising = level && !previous;
            previous = level;
            rising.then_some(seq)
        })
    }

    fn drive(&mut self, level: bool) -> Result<(), MockPinError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Err(MockPinError);
            }
            *remaining -= 1;
        }
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        self.history.push((seq, level));
        self.level = level;
        Ok(())
    }
}

impl ErrorType for MockPin {
    type Error = MockPinError;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true)
    }
}

// ============================================================================
// Time Mocks
// ============================================================================

/// Mock clock for testing time-dependent behavior.
///
/// Provides manual control over time for deterministic testing of
/// debouncing, display timeouts and sampling intervals.
///
/// # Example
///
/// ```rust
/// use matrix_thermostat::hal::MockClock;
/// use matrix_thermostat::traits::Clock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(1000);
/// assert_eq!(clock.now_ms(), 1000);
///
/// clock.set(5000);
/// assert_eq!(clock.now_ms(), 5000);
/// ```
#[derive(Debug)]
pub struct MockClock {
    current_ms: u64,
}

impl MockClock {
    /// Creates a new mock clock starting at time 0.
    pub fn new() -> Self {
        Self { current_ms: 0 }
    }

    /// Sets the current time in milliseconds.
    pub fn set(&mut self, ms: u64) {
        self.current_ms = ms;
    }

    /// Advances the clock by the given duration.
    pub fn advance(&mut self, ms: u64) {
        self.current_ms += ms;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms
    }
}

// ============================================================================
// Tests
// ============================================================================
