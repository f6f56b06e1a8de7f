//! Setpoint buttons on two GPIO inputs.
//!
//! # Wiring
//!
//! - Up button → GPIO6 and 3.3V
//! - Down button → GPIO7 and 3.3V
//!
//! The internal pull-downs hold the inputs LOW while released, so a press
//! reads HIGH. Debouncing is done in software by the setpoint controller.

use crate::traits::{Button, ButtonPanel};
use esp_idf_hal::gpio::{Input, InputPin, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;

/// Increase/decrease buttons for ESP32.
///
/// # Example
///
/// ```ignore
/// use matrix_thermostat::hal::esp32::Esp32Buttons;
///
/// let peripherals = Peripherals::take()?;
/// let buttons = Esp32Buttons::new(peripherals.pins.gpio6, peripherals.pins.gpio7)?;
/// ```
pub struct Esp32Buttons<'d, UP, DOWN>
where
    UP: InputPin + OutputPin,
    DOWN: InputPin + OutputPin,
{
    up: PinDriver<'d, UP, Input>,
    down: PinDriver<'d, DOWN, Input>,
}

impl<'d, UP, DOWN> Esp32Buttons<'d, UP, DOWN>
where
    UP: InputPin + OutputPin,
    DOWN: InputPin + OutputPin,
{
    /// Configures both pins as inputs with pull-downs.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(
        up_pin: impl Peripheral<P = UP> + 'd,
        down_pin: impl Peripheral<P = DOWN> + 'd,
    ) -> Result<Self, esp_idf_hal::sys::EspError> {
        let mut up = PinDriver::input(up_pin)?;
        let mut down = PinDriver::input(down_pin)?;
        up.set_pull(Pull::Down)?;
        down.set_pull(Pull::Down)?;
        Ok(Self { up, down })
    }
}

impl<UP, DOWN> ButtonPanel for Esp32Buttons<'_, UP, DOWN>
where
    UP: InputPin + OutputPin,
    DOWN: InputPin + OutputPin,
{
    fn is_high(&mut self, button: Button) -> bool {
        match button {
            Button::Increase => self.up.is_high(),
            Button::Decrease => self.down.is_high(),
        }
    }
}
