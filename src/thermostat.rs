//! Main thermostat loop that ties everything together.
//!
//! This module provides [`Thermostat`], the cooperative orchestrator that
//! owns the sensor, heater, buttons and scan driver and runs every piece of
//! decision logic once per main-loop pass.
//!
//! # Overview
//!
//! Each call to [`Thermostat::poll`]:
//! 1. polls the setpoint buttons and the display timeout,
//! 2. samples the sensor if the sampling interval has elapsed,
//! 3. drives the heater from the last good temperature and the setpoint,
//! 4. composes and publishes a new frame if the displayed value changed,
//! 5. gives the scan driver a chance to step.
//!
//! Nothing blocks. Every stage returns immediately when its time condition
//! is not met, so the loop can spin as fast as the scan needs.
//!
//! # Example
//!
//! ```rust
//! use matrix_thermostat::config::ThermostatConfig;
//! use matrix_thermostat::frame::SharedFrame;
//! use matrix_thermostat::hal::{MockButtons, MockHeater, MockMatrix, MockSensor};
//! use matrix_thermostat::scanner::{MatrixWiring, PollingScan, Scanner};
//! use matrix_thermostat::Thermostat;
//!
//! let config = ThermostatConfig::default();
//! let frame = SharedFrame::new();
//! let scan = PollingScan::new(
//!     Scanner::new(MockMatrix::new(), MatrixWiring::default()),
//!     config.timing.scan_period_ms,
//! );
//!
//! let mut sensor = MockSensor::new();
//! sensor.set_temperature(20.0);
//!
//! let mut thermostat = Thermostat::new(
//!     &config,
//!     sensor,
//!     MockHeater::new(),
//!     MockButtons::new(),
//!     scan,
//!     &frame,
//! );
//!
//! // Main loop - call poll() every pass
//! let state = thermostat.poll(0).unwrap();
//! assert!(state.heater_on);
//! assert_eq!(state.displayed, 20);
//! ```

use core::fmt;

use crate::acquisition::Acquisition;
use crate::actuator::should_heat;
use crate::compose::{compose, saturate};
use crate::config::ThermostatConfig;
use crate::controls::{DisplayMode, SetpointController};
use crate::frame::SharedFrame;
use crate::scanner::ScanDriver;
use crate::traits::{ButtonPanel, HeaterOutput, TemperatureSensor};

/// Errors surfaced by [`Thermostat::poll`].
///
/// Sensor failures are not here: they are logged and the last good
/// reading is kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<HE, SE> {
    /// The heater output could not be driven.
    Heater(HE),
    /// The matrix output failed during a scan step.
    Scan(SE),
}

impl<HE: fmt::Debug, SE: fmt::Debug> fmt::Display for Error<HE, SE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Heater(e) => write!(f, "heater output error: {:?}", e),
            Error::Scan(e) => write!(f, "matrix output error: {:?}", e),
        }
    }
}

#[cfg(feature = "std")]
impl<HE: fmt::Debug, SE: fmt::Debug> std::error::Error for Error<HE, SE> {}

/// Snapshot of the thermostat for logging and the simulator.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThermostatState {
    /// Current setpoint in whole degrees.
    pub setpoint: i32,
    /// Last good temperature, or the invalid sentinel.
    pub temperature: f32,
    /// Last good relative humidity.
    pub humidity: Option<f32>,
    /// Whether a valid temperature has been read yet.
    pub has_reading: bool,
    /// Whether the heater is driven.
    pub heater_on: bool,
    /// What the readout shows.
    pub mode: DisplayMode,
    /// Value on the readout, after clamping.
    pub displayed: i32,
    /// Failed sensor reads since startup.
    pub sensor_failures: u32,
    /// Number of frames published.
    pub frame_generation: u32,
    /// Scan steps so far, when the scan runs in the main loop.
    pub scan_steps: Option<u64>,
}

/// Cooperative thermostat orchestrator.
///
/// # Type Parameters
///
/// - `S`: temperature sensor ([`TemperatureSensor`])
/// - `H`: heater output ([`HeaterOutput`])
/// - `B`: setpoint buttons ([`ButtonPanel`])
/// - `D`: scan driver ([`ScanDriver`])
///
/// The frame buffer is borrowed, not owned, because a timer interrupt or
/// scan thread may be reading it at the same time.
pub struct Thermostat<'f, S, H, B, D> {
    sensor: S,
    heater: H,
    buttons: B,
    scan: D,
    frame: &'f SharedFrame,
    controls: SetpointController,
    acquisition: Acquisition,
    displayed: Option<i32>,
}

impl<'f, S, H, B, D> Thermostat<'f, S, H, B, D>
where
    S: TemperatureSensor,
    H: HeaterOutput,
    B: ButtonPanel,
    D: ScanDriver,
{
    /// Create a new thermostat from a configuration.
    pub fn new(
        config: &ThermostatConfig,
        sensor: S,
        heater: H,
        buttons: B,
        scan: D,
        frame: &'f SharedFrame,
    ) -> Self {
        let timing = &config.timing;
        Self {
            sensor,
            heater,
            buttons,
            scan,
            frame,
            controls: SetpointController::new(
                config.setpoint,
                timing.debounce_ms,
                timing.display_timeout_ms,
            ),
            acquisition: Acquisition::new(timing.sample_interval_ms),
            displayed: None,
        }
    }

    /// Prepares the hardware: starts the sensor, switches the heater off
    /// and publishes the first frame.
    ///
    /// A sensor that fails to start is only logged; reads will keep
    /// failing and the heater stays off.
    pub fn begin(&mut self) -> Result<(), H::Error> {
        if let Err(e) = self.sensor.begin() {
            log::warn!("sensor init failed: {}", e.as_str());
        }
        self.heater.set_on(false)?;
        self.refresh_display();
        Ok(())
    }

    /// Runs one pass of the control loop.
    ///
    /// A heater error does not stop the display from updating; it is
    /// reported after the scan has been serviced. When both fail in the
    /// same pass the heater error is returned and the scan failure logged.
    pub fn poll(&mut self, now_ms: u64) -> Result<ThermostatState, Error<H::Error, D::Error>> {
        self.controls.poll(&mut self.buttons, now_ms);

        self.acquisition.poll(&mut self.sensor, now_ms);

        let heater = self.drive_heater();
        self.refresh_display();
        let scan = self.scan.service(now_ms, self.frame);
        if let Err(e) = heater {
            if scan.is_err() {
                log::warn!("matrix scan failed alongside the heater");
            }
            return Err(e);
        }
        scan.map_err(Error::Scan)?;

        Ok(self.state())
    }

    /// Get the current state snapshot.
    pub fn state(&self) -> ThermostatState {
        ThermostatState {
            setpoint: self.controls.setpoint(),
            temperature: self.acquisition.temperature(),
            humidity: self.acquisition.humidity(),
            has_reading: self.acquisition.has_reading(),
            heater_on: self.heater.is_on(),
            mode: self.controls.mode(),
            displayed: self.display_value(),
            sensor_failures: self.acquisition.failures(),
            frame_generation: self.frame.generation(),
            scan_steps: self.scan.steps(),
        }
    }

    /// The value the readout should show right now, clamped to the
    /// displayable range.
    ///
    /// The temperature is truncated toward zero.
    pub fn display_value(&self) -> i32 {
        let value = match self.controls.mode() {
            DisplayMode::Setpoint => self.controls.setpoint(),
            DisplayMode::Reading => self.acquisition.temperature() as i32,
        };
        saturate(value)
    }

    /// Current setpoint.
    pub fn setpoint(&self) -> i32 {
        self.controls.setpoint()
    }

    /// Last good temperature.
    pub fn temperature(&self) -> f32 {
        self.acquisition.temperature()
    }

    /// Current display mode.
    pub fn mode(&self) -> DisplayMode {
        self.controls.mode()
    }

    /// The setpoint and mode controller.
    pub fn controls(&self) -> &SetpointController {
        &self.controls
    }

    /// The acquisition scheduler.
    pub fn acquisition(&self) -> &Acquisition {
        &self.acquisition
    }

    /// The heater output.
    pub fn heater(&self) -> &H {
        &self.heater
    }

    /// Mutable access to the heater output.
    pub fn heater_mut(&mut self) -> &mut H {
        &mut self.heater
    }

    /// Mutable access to the sensor.
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Mutable access to the buttons.
    pub fn buttons_mut(&mut self) -> &mut B {
        &mut self.buttons
    }

    /// The scan driver.
    pub fn scan(&self) -> &D {
        &self.scan
    }

    /// Mutable access to the scan driver.
    pub fn scan_mut(&mut self) -> &mut D {
        &mut self.scan
    }

    /// Takes the thermostat apart, returning the sensor, heater, buttons
    /// and scan driver.
    pub fn into_parts(self) -> (S, H, B, D) {
        (self.sensor, self.heater, self.buttons, self.scan)
    }

    fn drive_heater(&mut self) -> Result<(), Error<H::Error, D::Error>> {
        let temperature = self.acquisition.temperature();
        let setpoint = self.controls.setpoint();
        let drive = should_heat(temperature, setpoint);
        let was_on = self.heater.is_on();
        self.heater.set_on(drive).map_err(Error::Heater)?;
        if drive != was_on {
            log::info!(
                "heater {} ({:.1} C, setpoint {})",
                if drive { "on" } else { "off" },
                temperature,
                setpoint
            );
        }
        Ok(())
    }

    fn refresh_display(&mut self) {
        let value = self.display_value();
        if self.displayed == Some(value) {
            return;
        }
        self.frame.publish(&compose(value));
        self.displayed = Some(value);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingConfig;
    use crate::hal::{MockButtons, MockHeater, MockMatrix, MockSensor};
    use crate::scanner::{ExternalScan, MatrixWiring, PollingScan, Scanner};
    use crate::traits::{Button, SensorError};

    type TestThermostat<'f> =
        Thermostat<'f, MockSensor, MockHeater, MockButtons, PollingScan<MockMatrix>>;

    fn thermostat(frame: &SharedFrame) -> TestThermostat<'_> {
        let config = ThermostatConfig::default();
        let scan = PollingScan::new(
            Scanner::new(MockMatrix::new(), MatrixWiring::default()),
            config.timing.scan_period_ms,
        );
        Thermostat::new(
            &config,
            MockSensor::new(),
            MockHeater::new(),
            MockButtons::new(),
            scan,
            frame,
        )
    }

    // =========================================================================
    // Startup Tests
    // =========================================================================

    #[test]
    fn begin_starts_sensor_and_publishes() {
        let frame = SharedFrame::new();
        let mut t = thermostat(&frame);
        t.begin().unwrap();
        assert!(!t.heater().is_on());
        assert_eq!(frame.generation(), 1);
        assert_eq!(frame.live(), compose(0));
    }

    #[test]
    fn no_reading_keeps_heater_off() {
        let frame = SharedFrame::new();
        let mut t = thermostat(&frame);
        let state = t.poll(0).unwrap();
        assert!(!state.has_reading);
        assert!(!state.heater_on);
        assert_eq!(state.displayed, 0);
        assert_eq!(state.sensor_failures, 1);
    }

    // =========================================================================
    // Control Tests
    // =========================================================================

    #[test]
    fn heats_below_setpoint() {
        let frame = SharedFrame::new();
        let mut t = thermostat(&frame);
        t.sensor_mut().set_temperature(20.0);
        let state = t.poll(0).unwrap();
        assert!(state.heater_on);
        assert_eq!(state.temperature, 20.0);
        assert_eq!(frame.live(), compose(20));
    }

    #[test]
    fn stops_heating_when_warm() {
        let frame = SharedFrame::new();
        let mut t = thermostat(&frame);
        t.sensor_mut().queue_temperature(20.0);
        t.sensor_mut().queue_temperature(26.0);
        assert!(t.poll(0).unwrap().heater_on);
        assert!(!t.poll(2000).unwrap().heater_on);
        assert_eq!(t.heater().switch_count, 2);
    }

    #[test]
    fn raising_setpoint_switches_heater_on() {
        let frame = SharedFrame::new();
        let mut t = thermostat(&frame);
        t.sensor_mut().set_temperature(25.0);
        assert!(!t.poll(0).unwrap().heater_on);

        t.buttons_mut().set(Button::Increase, true);
        let state = t.poll(10).unwrap();
        assert_eq!(state.setpoint, 26);
        assert!(state.heater_on);
    }

    #[test]
    fn sensor_failure_changes_nothing() {
        let frame = SharedFrame::new();
        let mut t = thermostat(&frame);
        t.sensor_mut().queue_temperature(21.0);
        t.sensor_mut().queue_error(SensorError::Checksum);

        let before = t.poll(0).unwrap();
        let after = t.poll(2000).unwrap();
        assert_eq!(after.temperature, before.temperature);
        assert_eq!(after.heater_on, before.heater_on);
        assert_eq!(after.displayed, before.displayed);
        assert_eq!(after.sensor_failures, 1);
        assert_eq!(after.frame_generation, before.frame_generation);
    }

    #[test]
    fn heater_error_still_updates_display() {
        let frame = SharedFrame::new();
        let mut t = thermostat(&frame);
        t.sensor_mut().set_temperature(18.0);
        t.heater_mut().fail = true;
        assert_eq!(t.poll(0), Err(Error::Heater(())));
        assert_eq!(frame.live(), compose(18));
        assert_eq!(t.scan().steps(), Some(1));
    }

    #[test]
    fn heater_error_wins_over_scan_error() {
        let frame = SharedFrame::new();
        let mut t = thermostat(&frame);
        t.sensor_mut().set_temperature(18.0);
        t.heater_mut().fail = true;
        t.scan_mut().scanner_mut().output_mut().fail_next = true;
        assert_eq!(t.poll(0), Err(Error::Heater(())));
        assert!(!t.scan().scanner().output().fail_next);
    }

    #[test]
    fn scan_error_is_reported_alone() {
        let frame = SharedFrame::new();
        let mut t = thermostat(&frame);
        t.sensor_mut().set_temperature(18.0);
        t.scan_mut().scanner_mut().output_mut().fail_next = true;
        assert_eq!(t.poll(0), Err(Error::Scan(())));
        assert!(t.heater().is_on());
    }

    // =========================================================================
    // Display Tests
    // =========================================================================

    #[test]
    fn temperature_is_truncated_toward_zero() {
        let frame = SharedFrame::new();
        let mut t = thermostat(&frame);
        t.sensor_mut().set_temperature(21.9);
        assert_eq!(t.poll(0).unwrap().displayed, 21);
    }

    #[test]
    fn hot_reading_is_clamped() {
        let frame = SharedFrame::new();
        let mut t = thermostat(&frame);
        t.sensor_mut().set_temperature(123.0);
        assert_eq!(t.poll(0).unwrap().displayed, 99);
        assert_eq!(frame.live(), compose(99));
    }

    #[test]
    fn unchanged_value_is_not_republished() {
        let frame = SharedFrame::new();
        let mut t = thermostat(&frame);
        t.sensor_mut().set_temperature(20.4);
        t.poll(0).unwrap();
        t.sensor_mut().set_temperature(20.8);
        t.poll(2000).unwrap();
        assert_eq!(frame.generation(), 1);
    }

    #[test]
    fn press_shows_setpoint_then_reverts() {
        let frame = SharedFrame::new();
        let mut t = thermostat(&frame);
        t.sensor_mut().set_temperature(20.0);
        t.poll(0).unwrap();

        t.buttons_mut().set(Button::Decrease, true);
        let state = t.poll(100).unwrap();
        assert_eq!(state.mode, DisplayMode::Setpoint);
        assert_eq!(state.displayed, 24);
        assert_eq!(frame.live(), compose(24));

        t.buttons_mut().set(Button::Decrease, false);
        let state = t.poll(3100).unwrap();
        assert_eq!(state.mode, DisplayMode::Reading);
        assert_eq!(frame.live(), compose(20));
    }

    // =========================================================================
    // Scan Tests
    // =========================================================================

    #[test]
    fn polling_scan_runs_from_poll() {
        let frame = SharedFrame::new();
        let mut t = thermostat(&frame);
        t.sensor_mut().set_temperature(20.0);
        for now in (0..16).step_by(2) {
            t.poll(now).unwrap();
        }
        assert_eq!(t.state().scan_steps, Some(8));
        let image = t.scan().scanner().output().reconstruct(MatrixWiring::default());
        assert_eq!(image, compose(20));
    }

    #[test]
    fn external_scan_only_publishes() {
        let frame = SharedFrame::new();
        let config = ThermostatConfig::default()
            .with_timing(TimingConfig::default().with_display_timeout_ms(1000));
        let mut sensor = MockSensor::new();
        sensor.set_temperature(5.0);
        let mut t = Thermostat::new(
            &config,
            sensor,
            MockHeater::new(),
            MockButtons::new(),
            ExternalScan,
            &frame,
        );
        let state = t.poll(0).unwrap();
        assert_eq!(state.scan_steps, None);
        assert_eq!(frame.live(), compose(5));
    }

    #[test]
    fn error_display() {
        let e: Error<(), ()> = Error::Heater(());
        assert_eq!(e.to_string(), "heater output error: ()");
        let e: Error<(), ()> = Error::Scan(());
        assert_eq!(e.to_string(), "matrix output error: ()");
    }
}
