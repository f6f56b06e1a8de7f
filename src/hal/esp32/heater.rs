//! Heater relay on a single GPIO output.

use crate::traits::HeaterOutput;
use esp_idf_hal::gpio::{Output, OutputPin, PinDriver};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::EspError;

/// Heater switched by one push-pull output, HIGH = heating.
///
/// # Example
///
/// ```ignore
/// use matrix_thermostat::hal::esp32::Esp32Heater;
/// use matrix_thermostat::traits::HeaterOutput;
///
/// let peripherals = Peripherals::take()?;
/// let mut heater = Esp32Heater::new(peripherals.pins.gpio10)?;
/// heater.set_on(true)?;
/// ```
pub struct Esp32Heater<'d, P: OutputPin> {
    pin: PinDriver<'d, P, Output>,
    on: bool,
}

impl<'d, P: OutputPin> Esp32Heater<'d, P> {
    /// Configures the pin as an output and switches the heater off.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(pin: impl Peripheral<P = P> + 'd) -> Result<Self, EspError> {
        let mut pin = PinDriver::output(pin)?;
        pin.set_low()?;
        Ok(Self { pin, on: false })
    }
}

impl<P: OutputPin> HeaterOutput for Esp32Heater<'_, P> {
    type Error = EspError;

    fn set_on(&mut self, on: bool) -> Result<(), EspError> {
        if on {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.on = on;
        Ok(())
    }

    fn is_on(&self) -> bool {
        self.on
    }
}
