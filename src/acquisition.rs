//! Sensor polling at a fixed minimum interval.
//!
//! The sensor is slow and must not be queried faster than its conversion
//! rate. [`Acquisition::poll`] reads it at most once per sampling interval
//! and keeps the last good temperature. A failed read leaves that value
//! untouched; only the sample timestamp moves, so the next attempt comes a
//! full interval later instead of hammering a sensor that just failed.

use crate::traits::{SensorError, TemperatureSensor};

/// Temperature value meaning "no successful read yet".
///
/// Anything at or below it is treated as invalid by the actuator policy.
pub const INVALID_TEMPERATURE: f32 = 0.0;

/// Outcome of one [`Acquisition::poll`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sample {
    /// The interval has not elapsed; the sensor was not touched.
    NotDue,
    /// A fresh temperature was stored.
    Updated(f32),
    /// The read failed and the previous value was kept.
    Failed(SensorError),
}

/// Scheduler for the external sensor plus the last-known-good readings.
#[derive(Clone, Debug)]
pub struct Acquisition {
    interval_ms: u64,
    last_sample_ms: Option<u64>,
    temperature: f32,
    humidity: Option<f32>,
    failures: u32,
}

impl Acquisition {
    /// Creates a scheduler with no reading yet.
    ///
    /// The first [`poll`](Self::poll) reads immediately.
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: u64::from(interval_ms),
            last_sample_ms: None,
            temperature: INVALID_TEMPERATURE,
            humidity: None,
            failures: 0,
        }
    }

    /// Last good temperature, or [`INVALID_TEMPERATURE`].
    #[inline]
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Last good relative humidity, if the sensor has one.
    #[inline]
    pub fn humidity(&self) -> Option<f32> {
        self.humidity
    }

    /// Returns true once a valid temperature has been read.
    #[inline]
    pub fn has_reading(&self) -> bool {
        self.temperature > INVALID_TEMPERATURE
    }

    /// Number of failed temperature reads since startup.
    #[inline]
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Returns true if a sample is due at `now_ms`.
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_sample_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        }
    }

    /// Reads the sensor if the sampling interval has elapsed.
    ///
    /// Failures are logged and swallowed; they never reach the caller as
    /// an error.
    pub fn poll<S: TemperatureSensor>(&mut self, sensor: &mut S, now_ms: u64) -> Sample {
        if !self.is_due(now_ms) {
            return Sample::NotDue;
        }
        self.last_sample_ms = Some(now_ms);

        let reading = sensor.read_temperature().and_then(validate);
        match reading {
            Ok(celsius) => {
                self.temperature = celsius;
                if let Ok(rh) = sensor.read_humidity().and_then(validate) {
                    self.humidity = Some(rh);
                }
                log::debug!("temperature {:.1} C, humidity {:?}", celsius, self.humidity);
                Sample::Updated(celsius)
            }
            Err(err) => {
                self.failures = self.failures.wrapping_add(1);
                log::warn!(
                    "sensor read failed ({}), keeping {:.1} C",
                    err.as_str(),
                    self.temperature
                );
                Sample::Failed(err)
            }
        }
    }
}

fn validate(value: f32) -> Result<f32, SensorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SensorError::InvalidReading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockSensor;

    const INTERVAL: u32 = 2000;

    #[test]
    fn starts_invalid() {
        let acq = Acquisition::new(INTERVAL);
        assert_eq!(acq.temperature(), INVALID_TEMPERATURE);
        assert!(!acq.has_reading());
        assert_eq!(acq.humidity(), None);
    }

    #[test]
    fn first_poll_reads_immediately() {
        let mut acq = Acquisition::new(INTERVAL);
        let mut sensor = MockSensor::new();
        sensor.queue_temperature(21.5);
        assert_eq!(acq.poll(&mut sensor, 0), Sample::Updated(21.5));
        assert_eq!(acq.temperature(), 21.5);
        assert!(acq.has_reading());
    }

    #[test]
    fn respects_interval() {
        let mut acq = Acquisition::new(INTERVAL);
        let mut sensor = MockSensor::new();
        sensor.queue_temperature(20.0);
        sensor.queue_temperature(22.0);

        acq.poll(&mut sensor, 0);
        assert_eq!(acq.poll(&mut sensor, 1999), Sample::NotDue);
        assert_eq!(sensor.reads, 1);
        assert_eq!(acq.poll(&mut sensor, 2000), Sample::Updated(22.0));
        assert_eq!(sensor.reads, 2);
    }

    #[test]
    fn failure_keeps_last_value_and_defers_retry() {
        let mut acq = Acquisition::new(INTERVAL);
        let mut sensor = MockSensor::new();
        sensor.queue_temperature(20.0);
        sensor.queue_error(SensorError::Timeout);
        sensor.queue_temperature(23.0);

        acq.poll(&mut sensor, 0);
        assert_eq!(acq.poll(&mut sensor, 2000), Sample::Failed(SensorError::Timeout));
        assert_eq!(acq.temperature(), 20.0);
        assert_eq!(acq.failures(), 1);

        // No tight retry loop.
        assert_eq!(acq.poll(&mut sensor, 2001), Sample::NotDue);
        assert_eq!(acq.poll(&mut sensor, 4000), Sample::Updated(23.0));
    }

    #[test]
    fn nan_is_a_failure() {
        let mut acq = Acquisition::new(INTERVAL);
        let mut sensor = MockSensor::new();
        sensor.queue_temperature(19.0);
        sensor.queue_temperature(f32::NAN);

        acq.poll(&mut sensor, 0);
        assert_eq!(acq.poll(&mut sensor, 2000), Sample::Failed(SensorError::InvalidReading));
        assert_eq!(acq.temperature(), 19.0);
    }

    #[test]
    fn failure_before_first_reading_stays_invalid() {
        let mut acq = Acquisition::new(INTERVAL);
        let mut sensor = MockSensor::new();
        sensor.queue_error(SensorError::Checksum);
        acq.poll(&mut sensor, 0);
        assert!(!acq.has_reading());
    }

    #[test]
    fn humidity_is_stored_with_temperature() {
        let mut acq = Acquisition::new(INTERVAL);
        let mut sensor = MockSensor::new();
        sensor.queue_temperature(20.0);
        sensor.humidity = Some(45.0);
        acq.poll(&mut sensor, 0);
        assert_eq!(acq.humidity(), Some(45.0));
    }
}
