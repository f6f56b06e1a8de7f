//! 3-column bitmap font for the LED matrix.
//!
//! Glyphs are drawn as eight rows of three pixels (bit 2 = left column,
//! row 0 = top) and transposed at compile time into column masks, which is
//! the layout the frame buffer and the scanner work with: one byte per
//! column, bit `i` lighting row `i`.

/// Width in columns of a digit glyph.
pub const DIGIT_WIDTH: usize = 3;

/// Width in columns of the minus glyph.
pub const MINUS_WIDTH: usize = 2;

/// A glyph as column masks, left to right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    columns: [u8; DIGIT_WIDTH],
    width: u8,
}

impl Glyph {
    const fn from_rows(rows: [u8; 8], width: usize) -> Self {
        let mut columns = [0u8; DIGIT_WIDTH];
        let mut row = 0;
        while row < 8 {
            let mut col = 0;
            while col < width {
                // Leftmost column is the highest bit of the row pattern.
                if rows[row] & (1 << (width - 1 - col)) != 0 {
                    columns[col] |= 1 << row;
                }
                col += 1;
            }
            row += 1;
        }
        Self {
            columns,
            width: width as u8,
        }
    }

    /// Number of columns the glyph occupies.
    #[inline]
    pub const fn width(&self) -> usize {
        self.width as usize
    }

    /// Column masks of the glyph, left to right.
    #[inline]
    pub fn columns(&self) -> &[u8] {
        &self.columns[..self.width()]
    }
}

#[rustfmt::skip]
const DIGIT_ROWS: [[u8; 8]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b101, 0b101, 0b111, 0],
    [0b010, 0b110, 0b010, 0b010, 0b010, 0b010, 0b111, 0],
    [0b111, 0b001, 0b001, 0b111, 0b100, 0b100, 0b111, 0],
    [0b111, 0b001, 0b001, 0b111, 0b001, 0b001, 0b111, 0],
    [0b101, 0b101, 0b101, 0b111, 0b001, 0b001, 0b001, 0],
    [0b111, 0b100, 0b100, 0b111, 0b001, 0b001, 0b111, 0],
    [0b111, 0b100, 0b100, 0b111, 0b101, 0b101, 0b111, 0],
    [0b111, 0b001, 0b001, 0b010, 0b010, 0b010, 0b010, 0],
    [0b111, 0b101, 0b101, 0b111, 0b101, 0b101, 0b111, 0],
    [0b111, 0b101, 0b101, 0b111, 0b001, 0b001, 0b111, 0],
];

#[rustfmt::skip]
const MINUS_ROWS: [u8; 8] = [0, 0, 0, 0b11, 0, 0, 0, 0];

const fn build_digits() -> [Glyph; 10] {
    let mut glyphs = [Glyph {
        columns: [0; DIGIT_WIDTH],
        width: DIGIT_WIDTH as u8,
    }; 10];
    let mut d = 0;
    while d < 10 {
        glyphs[d] = Glyph::from_rows(DIGIT_ROWS[d], DIGIT_WIDTH);
        d += 1;
    }
    glyphs
}

/// Digit glyphs, indexed by value.
pub static DIGITS: [Glyph; 10] = build_digits();

/// The minus sign.
pub static MINUS: Glyph = Glyph::from_rows(MINUS_ROWS, MINUS_WIDTH);

/// Glyph for a decimal digit, `None` above 9.
#[inline]
pub fn digit(value: u8) -> Option<&'static Glyph> {
    DIGITS.get(value as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_columns() {
        // Left and right columns fully lit over rows 0..=6, middle only top and bottom.
        assert_eq!(DIGITS[0].columns(), &[0x7F, 0x41, 0x7F]);
    }

    #[test]
    fn one_columns() {
        assert_eq!(DIGITS[1].columns(), &[0x42, 0x7F, 0x40]);
    }

    #[test]
    fn minus_is_two_columns_on_middle_row() {
        assert_eq!(MINUS.width(), MINUS_WIDTH);
        assert_eq!(MINUS.columns(), &[0x08, 0x08]);
    }

    #[test]
    fn every_digit_is_three_wide_and_uses_all_columns() {
        for (value, glyph) in DIGITS.iter().enumerate() {
            assert_eq!(glyph.width(), DIGIT_WIDTH, "digit {value}");
            for (col, mask) in glyph.columns().iter().enumerate() {
                assert_ne!(*mask, 0, "digit {value} column {col} is empty");
            }
        }
    }

    #[test]
    fn bottom_row_is_always_dark() {
        for glyph in DIGITS.iter().chain(core::iter::once(&MINUS)) {
            assert!(glyph.columns().iter().all(|c| c & 0x80 == 0));
        }
    }

    #[test]
    fn digits_are_distinct() {
        for a in 0..10 {
            for b in (a + 1)..10 {
                assert_ne!(DIGITS[a], DIGITS[b], "{a} and {b} share a glyph");
            }
        }
    }

    #[test]
    fn digit_lookup() {
        assert_eq!(digit(7), Some(&DIGITS[7]));
        assert_eq!(digit(10), None);
    }
}
