//! Display multiplexing engine.
//!
//! Only one column of the matrix is electrically active at a time. The
//! [`Scanner`] walks a cursor over the eight columns, and on each step:
//!
//! 1. blanks every output so the previous column cannot bleed into the
//!    next one (ghosting),
//! 2. computes the row pattern of the current column and the one-hot
//!    column select,
//! 3. hands both bytes to the [`MatrixOutput`], which latches them together,
//! 4. advances the cursor, wrapping from 7 back to 0.
//!
//! A full refresh takes eight steps, so the step period must stay well
//! under 2.5 ms for the image to hold above 50 Hz.
//!
//! # Driving the scan
//!
//! Two strategies are supported through the [`ScanDriver`] trait, which the
//! thermostat calls once per main-loop pass:
//!
//! - [`PollingScan`] steps from the main loop whenever the period has
//!   elapsed (cooperative polling).
//! - [`ExternalScan`] does nothing, because a hardware timer interrupt or
//!   a dedicated thread ([`ScanThread`], `std` only) runs the scanner in
//!   its own timing domain.
//!
//! Either way the scanner only reads the published frame from a
//! [`SharedFrame`]; it never composes digits.
//!
//! # Polarity
//!
//! Wiring decides whether a lit row or a selected column is a HIGH or a
//! LOW output. [`MatrixWiring`] carries both polarities, and the blank
//! pattern is derived from them, so "blank" always means no LED can light.
//!
//! ```rust
//! use matrix_thermostat::hal::MockMatrix;
//! use matrix_thermostat::frame::Frame;
//! use matrix_thermostat::scanner::{MatrixWiring, Polarity, Scanner};
//!
//! let wiring = MatrixWiring::new(Polarity::ActiveLow, Polarity::ActiveHigh);
//! let mut scanner = Scanner::new(MockMatrix::new(), wiring);
//!
//! let frame = Frame::from_columns([0b0000_0011, 0, 0, 0, 0, 0, 0, 0]);
//! scanner.step(&frame).unwrap();
//!
//! // Blank first (rows all HIGH, no column selected), then column 0.
//! assert_eq!(scanner.output().writes, vec![(0xFF, 0x00), (0b1111_1100, 0b0000_0001)]);
//! assert_eq!(scanner.cursor(), 1);
//! ```

use crate::frame::{Frame, SharedFrame, COLUMNS};
use crate::traits::MatrixOutput;

/// Electrical level that activates a row or a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Polarity {
    /// A set bit is driven HIGH.
    #[default]
    ActiveHigh,
    /// A set bit is driven LOW.
    ActiveLow,
}

impl Polarity {
    /// Converts a logical mask (1 = active) to wire levels.
    #[inline]
    pub const fn apply(&self, mask: u8) -> u8 {
        match self {
            Polarity::ActiveHigh => mask,
            Polarity::ActiveLow => !mask,
        }
    }

    /// Wire byte with nothing active.
    #[inline]
    pub const fn inactive(&self) -> u8 {
        self.apply(0)
    }
}

/// Row and column polarity of the matrix wiring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixWiring {
    /// Level that lights a row.
    pub row: Polarity,
    /// Level that selects a column.
    pub column: Polarity,
}

impl MatrixWiring {
    /// Creates a wiring description.
    pub const fn new(row: Polarity, column: Polarity) -> Self {
        Self { row, column }
    }

    /// Wire bytes `(rows, columns)` that light nothing.
    #[inline]
    pub const fn blank(&self) -> (u8, u8) {
        (self.row.inactive(), self.column.inactive())
    }

    /// Wire bytes `(rows, columns)` that light `rows` in `column` only.
    #[inline]
    pub const fn encode(&self, column: usize, rows: u8) -> (u8, u8) {
        (self.row.apply(rows), self.column.apply(1 << column))
    }
}

impl Default for MatrixWiring {
    /// Common-anode rows sunk through the row register, columns sourced.
    fn default() -> Self {
        Self::new(Polarity::ActiveLow, Polarity::ActiveHigh)
    }
}

/// Column cursor plus the output stage.
#[derive(Debug)]
pub struct Scanner<M> {
    output: M,
    wiring: MatrixWiring,
    cursor: usize,
    steps: u64,
}

impl<M: MatrixOutput> Scanner<M> {
    /// Creates a scanner starting at column 0.
    pub fn new(output: M, wiring: MatrixWiring) -> Self {
        Self {
            output,
            wiring,
            cursor: 0,
            steps: 0,
        }
    }

    /// Column the next step will drive.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total steps performed.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Configured wiring.
    #[inline]
    pub fn wiring(&self) -> MatrixWiring {
        self.wiring
    }

    /// The output stage.
    pub fn output(&self) -> &M {
        &self.output
    }

    /// Mutable access to the output stage.
    pub fn output_mut(&mut self) -> &mut M {
        &mut self.output
    }

    /// Consumes the scanner and returns the output stage.
    pub fn into_output(self) -> M {
        self.output
    }

    /// Blanks every output without moving the cursor.
    pub fn blank(&mut self) -> Result<(), M::Error> {
        let (rows, columns) = self.wiring.blank();
        self.output.write(rows, columns)
    }

    /// Drives the current column of `frame` and advances the cursor.
    ///
    /// # Errors
    ///
    /// Returns the output error. The cursor only advances once the column
    /// has been latched.
    pub fn step(&mut self, frame: &Frame) -> Result<(), M::Error> {
        self.drive(frame.column(self.cursor))
    }

    /// Same as [`step`](Self::step), reading the column from a shared frame.
    pub fn step_shared(&mut self, frame: &SharedFrame) -> Result<(), M::Error> {
        self.drive(frame.live_column(self.cursor))
    }

    fn drive(&mut self, rows: u8) -> Result<(), M::Error> {
        self.blank()?;
        let (rows, columns) = self.wiring.encode(self.cursor, rows);
        self.output.write(rows, columns)?;
        self.cursor = (self.cursor + 1) % COLUMNS;
        self.steps = self.steps.wrapping_add(1);
        Ok(())
    }
}

/// How the scan is driven, called once per main-loop pass.
pub trait ScanDriver {
    /// Error type of the underlying output.
    type Error;

    /// Performs at most one scan step if one is due.
    ///
    /// Returns true if a step was performed.
    fn service(&mut self, now_ms: u64, frame: &SharedFrame) -> Result<bool, Self::Error>;

    /// Scan steps performed so far, if this driver can see them.
    fn steps(&self) -> Option<u64> {
        None
    }
}

/// Cooperative scan: steps from the main loop when the period has elapsed.
#[derive(Debug)]
pub struct PollingScan<M> {
    scanner: Scanner<M>,
    period_ms: u64,
    last_refresh_ms: Option<u64>,
}

impl<M: MatrixOutput> PollingScan<M> {
    /// Creates a polling scan with the given step period.
    pub fn new(scanner: Scanner<M>, period_ms: u32) -> Self {
        Self {
            scanner,
            period_ms: u64::from(period_ms),
            last_refresh_ms: None,
        }
    }

    /// The wrapped scanner.
    pub fn scanner(&self) -> &Scanner<M> {
        &self.scanner
    }

    /// Mutable access to the wrapped scanner.
    pub fn scanner_mut(&mut self) -> &mut Scanner<M> {
        &mut self.scanner
    }

    /// Gives back the wrapped scanner.
    pub fn into_scanner(self) -> Scanner<M> {
        self.scanner
    }

    /// Step period in milliseconds.
    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    fn is_due(&self, now_ms: u64) -> bool {
        match self.last_refresh_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.period_ms,
        }
    }
}

impl<M: MatrixOutput> ScanDriver for PollingScan<M> {
    type Error = M::Error;

    fn service(&mut self, now_ms: u64, frame: &SharedFrame) -> Result<bool, M::Error> {
        if !self.is_due(now_ms) {
            return Ok(false);
        }
        self.last_refresh_ms = Some(now_ms);
        self.scanner.step_shared(frame)?;
        Ok(true)
    }

    fn steps(&self) -> Option<u64> {
        Some(self.scanner.steps())
    }
}

/// Scan driven outside the main loop (timer interrupt or scan thread).
#[derive(Clone, Copy, Debug, Default)]
pub struct ExternalScan;

impl ScanDriver for ExternalScan {
    type Error = core::convert::Infallible;

    fn service(&mut self, _now_ms: u64, _frame: &SharedFrame) -> Result<bool, Self::Error> {
        Ok(false)
    }
}

#[cfg(feature = "std")]
pub use thread::ScanThread;

#[cfg(feature = "std")]
mod thread {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread::JoinHandle;
    use std::time::Duration;

    use super::Scanner;
    use crate::frame::SharedFrame;
    use crate::traits::MatrixOutput;

    /// Dedicated thread stepping a scanner at a fixed period.
    ///
    /// Host stand-in for the timer-interrupt variant: the scan runs in its
    /// own timing domain and only reads the shared frame. Dropping the
    /// handle stops the thread and waits for it.
    pub struct ScanThread<M> {
        stop: Arc<AtomicBool>,
        handle: Option<JoinHandle<Scanner<M>>>,
    }

    impl<M> ScanThread<M>
    where
        M: MatrixOutput + Send + 'static,
    {
        /// Spawns the scan thread.
        pub fn spawn(mut scanner: Scanner<M>, frame: Arc<SharedFrame>, period: Duration) -> Self {
            let stop = Arc::new(AtomicBool::new(false));
            let flag = stop.clone();
            let handle = std::thread::spawn(move || {
                while !flag.load(Ordering::Relaxed) {
                    // Output errors are dropped; the next period retries.
                    let _ = scanner.step_shared(&frame);
                    std::thread::sleep(period);
                }
                let _ = scanner.blank();
                scanner
            });
            Self {
                stop,
                handle: Some(handle),
            }
        }

        /// Stops the thread and returns the scanner.
        pub fn stop(mut self) -> Option<Scanner<M>> {
            self.shutdown()
        }

        fn shutdown(&mut self) -> Option<Scanner<M>> {
            self.stop.store(true, Ordering::Relaxed);
            self.handle.take().and_then(|h| h.join().ok())
        }
    }

    impl<M> Drop for ScanThread<M> {
        fn drop(&mut self) {
            self.stop.store(true, Ordering::Relaxed);
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
    }
}
