//! Heater policy: pure threshold comparison, no hysteresis, no PID.

use crate::acquisition::INVALID_TEMPERATURE;

/// Returns true if the heater should be on.
///
/// The heater only runs on a valid reading (above the invalid sentinel)
/// that is below the setpoint, so an unread or failed sensor never
/// energizes it.
///
/// ```rust
/// use matrix_thermostat::actuator::should_heat;
///
/// assert!(should_heat(20.0, 25));
/// assert!(!should_heat(30.0, 25));
/// assert!(!should_heat(-5.0, 25));
/// ```
#[inline]
pub fn should_heat(temperature: f32, setpoint: i32) -> bool {
    temperature > INVALID_TEMPERATURE && temperature < setpoint as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_setpoint_heats() {
        assert!(should_heat(20.0, 25));
        assert!(should_heat(24.9, 25));
    }

    #[test]
    fn at_or_above_setpoint_does_not_heat() {
        assert!(!should_heat(25.0, 25));
        assert!(!should_heat(30.0, 25));
    }

    #[test]
    fn invalid_reading_never_heats() {
        assert!(!should_heat(-5.0, 25));
        assert!(!should_heat(INVALID_TEMPERATURE, 25));
        assert!(!should_heat(f32::NAN, 25));
    }

    #[test]
    fn negative_setpoint_never_heats() {
        assert!(!should_heat(1.0, -3));
    }
}
