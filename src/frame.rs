//! Frame buffer and the double-buffered hand-off to the scanner.
//!
//! A [`Frame`] is eight column masks, one per physical column; bit `i` of a
//! mask lights the LED at row `i`. The main loop composes frames, the scan
//! engine reads them, and the two may run in different timing domains (a
//! timer interrupt or a dedicated thread). [`SharedFrame`] is the only state
//! crossing that boundary.
//!
//! # Publishing discipline
//!
//! [`SharedFrame::publish`] copies the new frame into the back slot of a
//! [`DoubleBuffer`] and flips the live index, all inside one
//! `critical_section::with` scope. The critical section is released when
//! the closure returns, on every path, so the scanner can never observe a
//! half-copied frame and is never locked out for longer than one 8-byte
//! copy.
//!
//! ```rust
//! use matrix_thermostat::frame::{Frame, SharedFrame};
//!
//! static FRAME: SharedFrame = SharedFrame::new();
//!
//! let mut frame = Frame::blank();
//! frame.set_column(3, 0xFF);
//! FRAME.publish(&frame);
//!
//! assert_eq!(FRAME.live().column(3), 0xFF);
//! assert_eq!(FRAME.generation(), 1);
//! ```

use core::cell::RefCell;

use critical_section::Mutex;

use crate::font::Glyph;

/// Number of columns (and rows) of the matrix.
pub const COLUMNS: usize = 8;

/// Number of rows of the matrix.
pub const ROWS: usize = 8;

/// One full image: a row bitmask per column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame([u8; COLUMNS]);

impl Frame {
    /// All LEDs off.
    #[inline]
    pub const fn blank() -> Self {
        Self([0; COLUMNS])
    }

    /// Builds a frame from raw column masks.
    #[inline]
    pub const fn from_columns(columns: [u8; COLUMNS]) -> Self {
        Self(columns)
    }

    /// Row mask of `column`. Out-of-range columns read as dark.
    #[inline]
    pub fn column(&self, column: usize) -> u8 {
        self.0.get(column).copied().unwrap_or(0)
    }

    /// Sets the row mask of `column`; out-of-range columns are ignored.
    pub fn set_column(&mut self, column: usize, rows: u8) {
        if let Some(slot) = self.0.get_mut(column) {
            *slot = rows;
        }
    }

    /// All column masks, left to right.
    #[inline]
    pub const fn columns(&self) -> &[u8; COLUMNS] {
        &self.0
    }

    /// Returns true if no LED in `column` is lit.
    #[inline]
    pub fn is_column_blank(&self, column: usize) -> bool {
        self.column(column) == 0
    }

    /// Returns true if every LED is off.
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|c| *c == 0)
    }

    /// Returns true if the LED at (`column`, `row`) is lit.
    #[inline]
    pub fn is_lit(&self, column: usize, row: usize) -> bool {
        row < ROWS && self.column(column) & (1 << row) != 0
    }

    /// Number of lit LEDs.
    pub fn lit_count(&self) -> u32 {
        self.0.iter().map(|c| c.count_ones()).sum()
    }

    /// Copies `glyph` into the frame with its left edge at column `at`.
    ///
    /// Returns the first column after the glyph. Columns that would fall
    /// past the right edge are dropped.
    pub fn blit(&mut self, glyph: &Glyph, at: usize) -> usize {
        for (offset, mask) in glyph.columns().iter().enumerate() {
            self.set_column(at + offset, *mask);
        }
        at + glyph.width()
    }

    /// Renders the frame as eight lines of `#` (lit) and `.` (dark).
    pub fn render_ascii(&self) -> heapless::String<{ (COLUMNS + 1) * ROWS }> {
        let mut out = heapless::String::new();
        for row in 0..ROWS {
            for column in 0..COLUMNS {
                let c = if self.is_lit(column, row) { '#' } else { '.' };
                // Capacity covers every pixel plus one newline per row.
                let _ = out.push(c);
            }
            let _ = out.push('\n');
        }
        out
    }
}

/// Two frame slots and the index of the one being scanned.
///
/// The writer only ever touches the back slot; [`swap`](Self::swap) makes
/// it live in a single index store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DoubleBuffer {
    slots: [Frame; 2],
    live: usize,
}

impl DoubleBuffer {
    /// Both slots blank, slot 0 live.
    pub const fn new() -> Self {
        Self {
            slots: [Frame::blank(), Frame::blank()],
            live: 0,
        }
    }

    /// The frame currently being scanned.
    #[inline]
    pub fn live(&self) -> &Frame {
        &self.slots[self.live]
    }

    /// The back slot, not visible to the scanner.
    #[inline]
    pub fn staged(&self) -> &Frame {
        &self.slots[self.live ^ 1]
    }

    /// Writes `frame` into the back slot.
    pub fn stage(&mut self, frame: &Frame) {
        self.slots[self.live ^ 1] = *frame;
    }

    /// Makes the back slot live.
    pub fn swap(&mut self) {
        self.live ^= 1;
    }
}

struct Exchange {
    buffers: DoubleBuffer,
    generation: u32,
}

/// Frame hand-off between the main loop (writer) and the scanner (reader).
///
/// Safe to place in a `static` and to share between an interrupt handler
/// or scan thread and the main loop.
pub struct SharedFrame {
    inner: Mutex<RefCell<Exchange>>,
}

impl SharedFrame {
    /// Creates a hand-off with a blank live frame.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Exchange {
                buffers: DoubleBuffer::new(),
                generation: 0,
            })),
        }
    }

    /// Stages `frame` and publishes it as the live frame.
    ///
    /// Runs entirely inside one critical section.
    pub fn publish(&self, frame: &Frame) {
        critical_section::with(|cs| {
            let mut exchange = self.inner.borrow_ref_mut(cs);
            exchange.buffers.stage(frame);
            exchange.buffers.swap();
            exchange.generation = exchange.generation.wrapping_add(1);
        });
    }

    /// Copy of the live frame.
    pub fn live(&self) -> Frame {
        critical_section::with(|cs| *self.inner.borrow_ref(cs).buffers.live())
    }

    /// Row mask of one column of the live frame.
    ///
    /// This is what the scan step reads; it copies a single byte.
    pub fn live_column(&self, column: usize) -> u8 {
        critical_section::with(|cs| self.inner.borrow_ref(cs).buffers.live().column(column))
    }

    /// Number of frames published so far (wrapping).
    pub fn generation(&self) -> u32 {
        critical_section::with(|cs| self.inner.borrow_ref(cs).generation)
    }
}

impl Default for SharedFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for SharedFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedFrame")
            .field("live", &self.live())
            .field("generation", &self.generation())
            .finish()
    }
}
