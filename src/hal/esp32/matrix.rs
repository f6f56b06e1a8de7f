//! LED matrix behind two 74HC595 shift registers on three GPIOs.
//!
//! # Wiring
//!
//! - GPIO2 → DS of the first register, its Q7' → DS of the second
//! - GPIO3 → SHCP on both registers
//! - GPIO4 → STCP on both registers
//! - OE tied LOW, MR tied HIGH
//!
//! With [`ByteOrder::RowsFirst`] the second register drives the rows and
//! the first drives the column selects.

use crate::shift::{ByteOrder, ShiftRegisterMatrix};
use esp_idf_hal::gpio::{Output, OutputPin, PinDriver};
use esp_idf_hal::peripheral::Peripheral;

/// Shift-register matrix over ESP-IDF output pins.
pub type Esp32Matrix<'d, DATA, CLOCK, LATCH> = ShiftRegisterMatrix<
    PinDriver<'d, DATA, Output>,
    PinDriver<'d, CLOCK, Output>,
    PinDriver<'d, LATCH, Output>,
>;

/// Configures the three pins as outputs and builds the matrix driver.
///
/// # Example
///
/// ```ignore
/// use matrix_thermostat::hal::esp32::esp32_matrix;
/// use matrix_thermostat::shift::ByteOrder;
///
/// let peripherals = Peripherals::take()?;
/// let matrix = esp32_matrix(
///     peripherals.pins.gpio2,
///     peripherals.pins.gpio3,
///     peripherals.pins.gpio4,
///     ByteOrder::RowsFirst,
/// )?;
/// ```
///
/// # Errors
///
/// Returns an error if GPIO initialization fails.
pub fn esp32_matrix<'d, DATA, CLOCK, LATCH>(
    data: impl Peripheral<P = DATA> + 'd,
    clock: impl Peripheral<P = CLOCK> + 'd,
    latch: impl Peripheral<P = LATCH> + 'd,
    order: ByteOrder,
) -> anyhow::Result<Esp32Matrix<'d, DATA, CLOCK, LATCH>>
where
    DATA: OutputPin,
    CLOCK: OutputPin,
    LATCH: OutputPin,
{
    let data = PinDriver::output(data)?;
    let clock = PinDriver::output(clock)?;
    let latch = PinDriver::output(latch)?;
    ShiftRegisterMatrix::new(data, clock, latch, order)
        .map_err(|e| anyhow::anyhow!("shift register init failed: {:?}", e))
}
