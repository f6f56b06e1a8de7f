//! Shared configuration system for desktop and ESP32.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use matrix_thermostat::config::{ThermostatConfig, TimingConfig};
//!
//! // Use defaults
//! let config = ThermostatConfig::default();
//! assert!(config.validate().is_ok());
//!
//! // Or customize
//! let config = ThermostatConfig::default()
//!     .with_setpoint(21)
//!     .with_timing(TimingConfig::default().with_scan_period_ms(1));
//! assert_eq!(config.setpoint, 21);
//! ```

use heapless::String as HString;

use crate::frame::COLUMNS;
use crate::scanner::{MatrixWiring, Polarity};
use crate::shift::ByteOrder;

/// Maximum length for short config strings (device names)
pub const MAX_SHORT_STRING: usize = 32;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Longest full refresh (all columns) that still looks steady, in ms.
pub const MAX_FLICKER_FREE_REFRESH_MS: u32 = 20;

/// Fastest rate a DHT22-class sensor can be sampled, in ms.
pub const MIN_SENSOR_INTERVAL_MS: u32 = 2000;

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    let take = s.len().min(MAX_SHORT_STRING);
    // Find valid UTF-8 boundary
    let valid_end = s
        .char_indices()
        .take_while(|(i, c)| i + c.len_utf8() <= take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

/// Reasons a configuration is rejected by [`ThermostatConfig::validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Scan period of zero.
    ZeroScanPeriod,
    /// A full refresh would take this many ms, which flickers.
    ScanTooSlow {
        /// Milliseconds for all columns at the configured period.
        refresh_ms: u32,
    },
    /// Debounce window of zero.
    ZeroDebounce,
    /// Sampling faster than the sensor can convert.
    SamplingTooFast {
        /// Configured interval.
        interval_ms: u32,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroScanPeriod => write!(f, "scan period must be at least 1 ms"),
            ConfigError::ScanTooSlow { refresh_ms } => write!(
                f,
                "full refresh takes {} ms, must stay under {} ms",
                refresh_ms, MAX_FLICKER_FREE_REFRESH_MS
            ),
            ConfigError::ZeroDebounce => write!(f, "debounce window must be at least 1 ms"),
            ConfigError::SamplingTooFast { interval_ms } => write!(
                f,
                "sampling interval {} ms is below the sensor minimum of {} ms",
                interval_ms, MIN_SENSOR_INTERVAL_MS
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThermostatConfig {
    /// Setpoint at power-on, whole degrees Celsius
    pub setpoint: i32,
    /// Timing of the control loop and the scan
    pub timing: TimingConfig,
    /// LED matrix wiring
    pub matrix: MatrixConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Default for ThermostatConfig {
    fn default() -> Self {
        Self {
            setpoint: 25,
            timing: TimingConfig::default(),
            matrix: MatrixConfig::default(),
            device: DeviceConfig::default(),
        }
    }
}

impl ThermostatConfig {
    /// Set the power-on setpoint
    pub fn with_setpoint(mut self, setpoint: i32) -> Self {
        self.setpoint = setpoint;
        self
    }

    /// Set timing configuration
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Set matrix configuration
    pub fn with_matrix(mut self, matrix: MatrixConfig) -> Self {
        self.matrix = matrix;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }

    /// Checks the timing constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timing = &self.timing;
        if timing.scan_period_ms == 0 {
            return Err(ConfigError::ZeroScanPeriod);
        }
        let refresh_ms = timing.refresh_period_ms();
        if refresh_ms >= MAX_FLICKER_FREE_REFRESH_MS {
            return Err(ConfigError::ScanTooSlow { refresh_ms });
        }
        if timing.debounce_ms == 0 {
            return Err(ConfigError::ZeroDebounce);
        }
        if timing.sample_interval_ms < MIN_SENSOR_INTERVAL_MS {
            return Err(ConfigError::SamplingTooFast {
                interval_ms: timing.sample_interval_ms,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Timing Config
// ============================================================================

/// Intervals and windows, all in milliseconds
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingConfig {
    /// Minimum time between sensor reads
    pub sample_interval_ms: u32,
    /// Input lockout after an accepted button edge
    pub debounce_ms: u32,
    /// How long the setpoint stays on the readout after a press
    pub display_timeout_ms: u32,
    /// Time each column stays lit
    pub scan_period_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: MIN_SENSOR_INTERVAL_MS,
            debounce_ms: 50,
            display_timeout_ms: 3000,
            scan_period_ms: 2,
        }
    }
}

impl TimingConfig {
    /// Set the sensor sampling interval
    pub fn with_sample_interval_ms(mut self, ms: u32) -> Self {
        self.sample_interval_ms = ms;
        self
    }

    /// Set the debounce window
    pub fn with_debounce_ms(mut self, ms: u32) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Set the setpoint display timeout
    pub fn with_display_timeout_ms(mut self, ms: u32) -> Self {
        self.display_timeout_ms = ms;
        self
    }

    /// Set the per-column scan period
    pub fn with_scan_period_ms(mut self, ms: u32) -> Self {
        self.scan_period_ms = ms;
        self
    }

    /// Time for one full refresh of every column
    pub fn refresh_period_ms(&self) -> u32 {
        self.scan_period_ms.saturating_mul(COLUMNS as u32)
    }
}

// ============================================================================
// Matrix Config
// ============================================================================

/// LED matrix wiring
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixConfig {
    /// Level that lights a row
    pub row_polarity: Polarity,
    /// Level that selects a column
    pub column_polarity: Polarity,
    /// Which byte enters the shift chain first
    pub byte_order: ByteOrder,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        let wiring = MatrixWiring::default();
        Self {
            row_polarity: wiring.row,
            column_polarity: wiring.column,
            byte_order: ByteOrder::default(),
        }
    }
}

impl MatrixConfig {
    /// Set the row polarity
    pub fn with_row_polarity(mut self, polarity: Polarity) -> Self {
        self.row_polarity = polarity;
        self
    }

    /// Set the column polarity
    pub fn with_column_polarity(mut self, polarity: Polarity) -> Self {
        self.column_polarity = polarity;
        self
    }

    /// Set the shift byte order
    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    /// Polarity pair for the scanner
    pub fn wiring(&self) -> MatrixWiring {
        MatrixWiring::new(self.row_polarity, self.column_polarity)
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: ShortString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("matrix-thermostat"),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ThermostatConfig::default();
        assert_eq!(config.setpoint, 25);
        assert_eq!(config.timing.sample_interval_ms, 2000);
        assert_eq!(config.timing.debounce_ms, 50);
        assert_eq!(config.timing.display_timeout_ms, 3000);
        assert_eq!(config.timing.scan_period_ms, 2);
        assert_eq!(config.device.name.as_str(), "matrix-thermostat");
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn default_refresh_is_flicker_free() {
        let timing = TimingConfig::default();
        assert_eq!(timing.refresh_period_ms(), 16);
    }

    #[test]
    fn builder_pattern() {
        let config = ThermostatConfig::default()
            .with_setpoint(19)
            .with_timing(
                TimingConfig::default()
                    .with_debounce_ms(30)
                    .with_display_timeout_ms(5000)
                    .with_sample_interval_ms(5000)
                    .with_scan_period_ms(1),
            )
            .with_matrix(
                MatrixConfig::default()
                    .with_row_polarity(Polarity::ActiveHigh)
                    .with_column_polarity(Polarity::ActiveLow)
                    .with_byte_order(ByteOrder::ColumnsFirst),
            )
            .with_device(DeviceConfig::default().with_name("Greenhouse"));

        assert_eq!(config.setpoint, 19);
        assert_eq!(config.timing.debounce_ms, 30);
        assert_eq!(config.timing.display_timeout_ms, 5000);
        assert_eq!(config.timing.sample_interval_ms, 5000);
        assert_eq!(config.timing.scan_period_ms, 1);
        assert_eq!(
            config.matrix.wiring(),
            MatrixWiring::new(Polarity::ActiveHigh, Polarity::ActiveLow)
        );
        assert_eq!(config.matrix.byte_order, ByteOrder::ColumnsFirst);
        assert_eq!(config.device.name.as_str(), "Greenhouse");
    }

    #[test]
    fn rejects_slow_scan() {
        let config = ThermostatConfig::default()
            .with_timing(TimingConfig::default().with_scan_period_ms(3));
        assert_eq!(
            config.validate(),
            Err(ConfigError::ScanTooSlow { refresh_ms: 24 })
        );
    }

    #[test]
    fn rejects_zero_scan_period() {
        let config = ThermostatConfig::default()
            .with_timing(TimingConfig::default().with_scan_period_ms(0));
        assert_eq!(config.validate(), Err(ConfigError::ZeroScanPeriod));
    }

    #[test]
    fn rejects_zero_debounce() {
        let config =
            ThermostatConfig::default().with_timing(TimingConfig::default().with_debounce_ms(0));
        assert_eq!(config.validate(), Err(ConfigError::ZeroDebounce));
    }

    #[test]
    fn rejects_fast_sampling() {
        let config = ThermostatConfig::default()
            .with_timing(TimingConfig::default().with_sample_interval_ms(500));
        assert_eq!(
            config.validate(),
            Err(ConfigError::SamplingTooFast { interval_ms: 500 })
        );
    }

    #[test]
    fn config_error_messages() {
        let msg = ConfigError::ScanTooSlow { refresh_ms: 24 }.to_string();
        assert!(msg.contains("24 ms"));
        assert!(ConfigError::ZeroDebounce.to_string().contains("debounce"));
    }

    #[test]
    fn short_string_truncation() {
        let long_input = "a".repeat(100);
        let s = short_string(&long_input);
        assert_eq!(s.len(), MAX_SHORT_STRING);
    }

    #[test]
    fn long_device_name_is_truncated() {
        let device = DeviceConfig::default().with_name("living-room-thermostat-upstairs-east");
        assert_eq!(device.name.as_str(), "living-room-thermostat-upstairs-");
        assert_eq!(device.name.len(), MAX_SHORT_STRING);
    }

    #[test]
    fn short_string_utf8_boundary() {
        // 'é' is two bytes; 20 of them do not fit in 32 bytes.
        let input = "é".repeat(20);
        let s = short_string(&input);
        assert_eq!(s.len(), 32);
        assert!(core::str::from_utf8(s.as_bytes()).is_ok());
    }
}
