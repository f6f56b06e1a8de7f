//! Matrix scan driven by a general-purpose hardware timer interrupt.
//!
//! The timer fires every scan period with auto-reload and the handler
//! performs exactly one [`Scanner`] step against the published frame. The
//! handler never composes digits and never logs; the main loop only
//! publishes frames and passes [`ExternalScan`](crate::scanner::ExternalScan)
//! to the thermostat.

use crate::frame::SharedFrame;
use crate::scanner::Scanner;
use crate::traits::MatrixOutput;
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::EspError;
use esp_idf_hal::timer::{config::Config as TimerConfig, Timer, TimerDriver};

/// Hardware timer that owns the scanner and steps it from its ISR.
///
/// Dropping this stops the timer.
///
/// # Example
///
/// ```ignore
/// use matrix_thermostat::hal::esp32::Esp32ScanTimer;
///
/// static FRAME: SharedFrame = SharedFrame::new();
///
/// let peripherals = Peripherals::take()?;
/// let _scan = Esp32ScanTimer::start(peripherals.timer00, scanner, &FRAME, 2)?;
/// ```
pub struct Esp32ScanTimer<'d> {
    timer: TimerDriver<'d>,
}

impl<'d> Esp32ScanTimer<'d> {
    /// Configures the timer for `period_ms` and starts scanning.
    ///
    /// # Errors
    ///
    /// Returns an error if the timer cannot be configured.
    pub fn start<M>(
        timer: impl Peripheral<P = impl Timer> + 'd,
        mut scanner: Scanner<M>,
        frame: &'static SharedFrame,
        period_ms: u32,
    ) -> Result<Self, EspError>
    where
        M: MatrixOutput + Send + 'static,
    {
        let mut timer = TimerDriver::new(timer, &TimerConfig::new().auto_reload(true))?;
        let ticks = timer.tick_hz() * u64::from(period_ms) / 1000;
        timer.set_alarm(ticks)?;

        // The closure is 'static and only touches data it owns or the
        // critical-section protected frame.
        unsafe {
            timer.subscribe(move || {
                let _ = scanner.step_shared(frame);
            })?;
        }

        timer.enable_interrupt()?;
        timer.enable_alarm(true)?;
        timer.enable(true)?;
        log::info!("scan timer started, {} ms per column", period_ms);
        Ok(Self { timer })
    }

    /// Stops the timer. The matrix keeps showing the last column.
    pub fn stop(&mut self) -> Result<(), EspError> {
        self.timer.enable(false)
    }
}

impl Drop for Esp32ScanTimer<'_> {
    fn drop(&mut self) {
        let _ = self.timer.enable(false);
    }
}
