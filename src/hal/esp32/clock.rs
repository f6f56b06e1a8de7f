//! ESP32 clock implementation using the ESP-IDF high-resolution timer.

use crate::traits::Clock;

/// Monotonic millisecond clock.
///
/// Reads `esp_timer_get_time()`, which counts microseconds since boot and
/// does not wrap in the lifetime of the device.
///
/// # Example
///
/// ```ignore
/// use matrix_thermostat::hal::esp32::Esp32Clock;
/// use matrix_thermostat::traits::Clock;
///
/// let clock = Esp32Clock::new();
/// let start = clock.now_ms();
/// thermostat.poll(clock.now_ms())?;
/// let elapsed = clock.now_ms() - start;
/// ```
pub struct Esp32Clock;

impl Esp32Clock {
    /// Creates a new ESP32 clock instance.
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Microseconds since boot.
    #[inline]
    pub fn now_us(&self) -> u64 {
        // Plain read of the system timer, no side effects
        let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
        micros.max(0) as u64
    }
}

impl Default for Esp32Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for Esp32Clock {
    #[inline]
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}
