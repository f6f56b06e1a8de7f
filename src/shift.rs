//! Bit-banged driver for two cascaded 74HC595-style shift registers.
//!
//! Three GPIOs drive the chain: data, clock (rising edge shifts one bit in)
//! and latch (rising edge copies the shift stage to the outputs). One call
//! to [`MatrixOutput::write`] shifts sixteen bits, most significant bit
//! first, and only then pulses the latch, so the row and column bytes reach
//! the LEDs together.
//!
//! # Example
//!
//! ```rust
//! use matrix_thermostat::hal::MockPin;
//! use matrix_thermostat::shift::{ByteOrder, ShiftRegisterMatrix};
//! use matrix_thermostat::traits::MatrixOutput;
//!
//! let mut chain = ShiftRegisterMatrix::new(
//!     MockPin::new(),
//!     MockPin::new(),
//!     MockPin::new(),
//!     ByteOrder::RowsFirst,
//! ).unwrap();
//!
//! chain.write(0b1010_0000, 0b0000_0001).unwrap();
//! let (data, clock, latch) = chain.release();
//! assert_eq!(clock.rising_edges(), 16);
//! assert_eq!(latch.rising_edges(), 1);
//! assert_eq!(data.sampled_bits(&clock)[..4], [true, false, true, false]);
//! ```

use embedded_hal::digital::OutputPin;

use crate::traits::MatrixOutput;

/// Which byte enters the chain first.
///
/// The first byte shifted ends up in the register furthest from the MCU.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ByteOrder {
    /// Row byte first, then column-select byte.
    #[default]
    RowsFirst,
    /// Column-select byte first, then row byte.
    ColumnsFirst,
}

impl ByteOrder {
    /// Orders `rows` and `columns` for transmission.
    #[inline]
    pub const fn arrange(&self, rows: u8, columns: u8) -> [u8; 2] {
        match self {
            ByteOrder::RowsFirst => [rows, columns],
            ByteOrder::ColumnsFirst => [columns, rows],
        }
    }
}

/// LED matrix behind a pair of cascaded shift registers.
pub struct ShiftRegisterMatrix<DATA, CLOCK, LATCH> {
    data: DATA,
    clock: CLOCK,
    latch: LATCH,
    order: ByteOrder,
}

impl<DATA, CLOCK, LATCH, E> ShiftRegisterMatrix<DATA, CLOCK, LATCH>
where
    DATA: OutputPin<Error = E>,
    CLOCK: OutputPin<Error = E>,
    LATCH: OutputPin<Error = E>,
{
    /// Takes ownership of the three pins and drives them low.
    ///
    /// # Errors
    ///
    /// Returns the pin error if any line cannot be driven.
    pub fn new(
        mut data: DATA,
        mut clock: CLOCK,
        mut latch: LATCH,
        order: ByteOrder,
    ) -> Result<Self, E> {
        data.set_low()?;
        clock.set_low()?;
        latch.set_low()?;
        Ok(Self {
            data,
            clock,
            latch,
            order,
        })
    }

    /// Gives the pins back.
    pub fn release(self) -> (DATA, CLOCK, LATCH) {
        (self.data, self.clock, self.latch)
    }

    /// Configured byte order.
    #[inline]
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    fn shift_byte(&mut self, byte: u8) -> Result<(), E> {
        for bit in (0..8).rev() {
            if byte & (1 << bit) != 0 {
                self.data.set_high()?;
            } else {
                self.data.set_low()?;
            }
            self.clock.set_high()?;
            self.clock.set_low()?;
        }
        Ok(())
    }
}

impl<DATA, CLOCK, LATCH, E> MatrixOutput for ShiftRegisterMatrix<DATA, CLOCK, LATCH>
where
    DATA: OutputPin<Error = E>,
    CLOCK: OutputPin<Error = E>,
    LATCH: OutputPin<Error = E>,
{
    type Error = E;

    fn write(&mut self, rows: u8, columns: u8) -> Result<(), E> {
        for byte in self.order.arrange(rows, columns) {
            self.shift_byte(byte)?;
        }
        self.latch.set_high()?;
        self.latch.set_low()
    }
}
