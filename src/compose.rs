//! Number-to-bitmap compositor.
//!
//! [`compose`] turns a signed integer into a [`Frame`]. It is pure: no
//! state, no I/O, same input same frame.
//!
//! # Layout
//!
//! ```text
//! column  0 1 2 3 4 5 6 7
//! 42      T T T . O O O .     tens, spacer, ones
//! 7       . . D D D . . .     single digit, centred on column 3
//! -5      - - . D D D . .     minus, spacer, digit
//! ```
//!
//! The single digit shares its centre column with the two-digit group, so
//! the readout does not jump sideways when a value crosses 10.
//!
//! # Example
//!
//! ```rust
//! use matrix_thermostat::compose::compose;
//! use matrix_thermostat::font::DIGITS;
//!
//! let frame = compose(42);
//! assert_eq!(&frame.columns()[0..3], DIGITS[4].columns());
//! assert!(frame.is_column_blank(3));
//! assert_eq!(&frame.columns()[4..7], DIGITS[2].columns());
//!
//! // Out-of-range values saturate.
//! assert_eq!(compose(150), compose(99));
//! assert_eq!(compose(-40), compose(-9));
//! ```

use crate::font::{self, DIGITS, MINUS};
use crate::frame::Frame;

/// Smallest value the readout can show.
pub const MIN_DISPLAY: i32 = -9;

/// Largest value the readout can show.
pub const MAX_DISPLAY: i32 = 99;

/// Left edge of the tens digit.
const TENS_AT: usize = 0;
/// Left edge of the ones digit in a two-digit value.
const ONES_AT: usize = TENS_AT + font::DIGIT_WIDTH + 1;
/// Left edge of a lone digit.
const SINGLE_AT: usize = 2;
/// Left edge of the digit after a minus sign.
const NEGATIVE_DIGIT_AT: usize = font::MINUS_WIDTH + 1;

/// Clamps `number` into the displayable range.
#[inline]
pub fn saturate(number: i32) -> i32 {
    number.clamp(MIN_DISPLAY, MAX_DISPLAY)
}

/// Renders `number` into a fresh frame.
///
/// Values outside [`MIN_DISPLAY`]..=[`MAX_DISPLAY`] are saturated, never
/// rejected. Unused columns are dark.
pub fn compose(number: i32) -> Frame {
    let number = saturate(number);
    let mut frame = Frame::blank();

    if number >= 10 {
        frame.blit(&DIGITS[(number / 10) as usize], TENS_AT);
        frame.blit(&DIGITS[(number % 10) as usize], ONES_AT);
    } else if number >= 0 {
        frame.blit(&DIGITS[number as usize], SINGLE_AT);
    } else {
        frame.blit(&MINUS, 0);
        frame.blit(&DIGITS[(number.unsigned_abs() % 10) as usize], NEGATIVE_DIGIT_AT);
    }

    frame
}
