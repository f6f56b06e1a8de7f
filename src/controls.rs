//! Setpoint buttons, debouncing and the display mode.
//!
//! Two momentary buttons raise or lower the setpoint by one degree per
//! accepted press. Every accepted press switches the readout to the
//! setpoint; once no press has been accepted for the display timeout, the
//! readout falls back to the current temperature.
//!
//! # Debouncing
//!
//! Each button has a [`Debouncer`]. While the debounce window since the
//! last accepted edge is still open, the raw input is not even sampled, so
//! bounces (and genuine presses) inside the window are dropped rather than
//! queued. Outside the window, a low-to-high change relative to the last
//! sampled level is an accepted press.
//!
//! # Example
//!
//! ```rust
//! use matrix_thermostat::controls::{DisplayMode, SetpointController};
//! use matrix_thermostat::hal::MockButtons;
//! use matrix_thermostat::traits::Button;
//!
//! let mut controls = SetpointController::new(25, 50, 3000);
//! let mut buttons = MockButtons::new();
//!
//! buttons.set(Button::Increase, true);
//! controls.poll(&mut buttons, 0);
//! assert_eq!(controls.setpoint(), 26);
//! assert_eq!(controls.mode(), DisplayMode::Setpoint);
//!
//! controls.poll(&mut buttons, 3000);
//! assert_eq!(controls.mode(), DisplayMode::Reading);
//! ```

use crate::traits::{Button, ButtonPanel};

/// What the readout shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DisplayMode {
    /// The last known temperature.
    #[default]
    Reading,
    /// The setpoint, shortly after a button press.
    Setpoint,
}

/// Edge detector with a lockout window after each accepted edge.
#[derive(Clone, Debug)]
pub struct Debouncer {
    window_ms: u64,
    last_level: bool,
    last_accepted_ms: Option<u64>,
}

impl Debouncer {
    /// Creates a debouncer that ignores the input for `window_ms` after
    /// each accepted edge.
    pub fn new(window_ms: u32) -> Self {
        Self {
            window_ms: u64::from(window_ms),
            last_level: false,
            last_accepted_ms: None,
        }
    }

    /// Returns true if the window since the last accepted edge has passed.
    pub fn is_settled(&self, now_ms: u64) -> bool {
        match self.last_accepted_ms {
            None => true,
            Some(at) => now_ms.saturating_sub(at) > self.window_ms,
        }
    }

    /// Samples the input through `read` if the window has passed.
    ///
    /// Returns true for an accepted low-to-high edge.
    pub fn sample(&mut self, now_ms: u64, read: impl FnOnce() -> bool) -> bool {
        if !self.is_settled(now_ms) {
            return false;
        }
        let level = read();
        let rising = level && !self.last_level;
        self.last_level = level;
        if rising {
            self.last_accepted_ms = Some(now_ms);
        }
        rising
    }

    /// Last sampled level.
    #[inline]
    pub fn level(&self) -> bool {
        self.last_level
    }

    /// Time of the last accepted edge.
    #[inline]
    pub fn last_accepted_ms(&self) -> Option<u64> {
        self.last_accepted_ms
    }
}

/// Owner of the setpoint and the display mode.
#[derive(Clone, Debug)]
pub struct SetpointController {
    setpoint: i32,
    mode: DisplayMode,
    display_timeout_ms: u64,
    last_edge_ms: Option<u64>,
    debouncers: [Debouncer; 2],
    accepted: u32,
}

impl SetpointController {
    /// Creates a controller showing the current reading.
    pub fn new(setpoint: i32, debounce_ms: u32, display_timeout_ms: u32) -> Self {
        Self {
            setpoint,
            mode: DisplayMode::Reading,
            display_timeout_ms: u64::from(display_timeout_ms),
            last_edge_ms: None,
            debouncers: [Debouncer::new(debounce_ms), Debouncer::new(debounce_ms)],
            accepted: 0,
        }
    }

    /// Current setpoint in whole degrees.
    #[inline]
    pub fn setpoint(&self) -> i32 {
        self.setpoint
    }

    /// Current display mode.
    #[inline]
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Number of presses accepted since startup.
    #[inline]
    pub fn accepted_presses(&self) -> u32 {
        self.accepted
    }

    /// Debounce state of `button`.
    pub fn debouncer(&self, button: Button) -> &Debouncer {
        &self.debouncers[button.index()]
    }

    /// Polls both buttons, then checks the display timeout.
    ///
    /// Call once per main-loop pass. Returns true if the setpoint changed.
    pub fn poll<P: ButtonPanel>(&mut self, panel: &mut P, now_ms: u64) -> bool {
        let mut changed = false;
        for button in Button::ALL {
            let accepted = self.debouncers[button.index()].sample(now_ms, || panel.is_high(button));
            if accepted {
                self.accept(button, now_ms);
                changed = true;
            }
        }
        self.update_mode(now_ms);
        changed
    }

    /// Reverts to the reading once the display timeout has elapsed since
    /// the last accepted press.
    pub fn update_mode(&mut self, now_ms: u64) {
        if self.mode != DisplayMode::Setpoint {
            return;
        }
        let expired = match self.last_edge_ms {
            Some(at) => now_ms.saturating_sub(at) >= self.display_timeout_ms,
            None => true,
        };
        if expired {
            log::debug!("display timeout, showing reading");
            self.mode = DisplayMode::Reading;
        }
    }

    fn accept(&mut self, button: Button, now_ms: u64) {
        let previous = self.setpoint;
        self.setpoint = self.setpoint.saturating_add(button.step());
        self.mode = DisplayMode::Setpoint;
        self.last_edge_ms = Some(now_ms);
        self.accepted = self.accepted.wrapping_add(1);
        log::info!("setpoint {} -> {} ({:?})", previous, self.setpoint, button);
    }
}
