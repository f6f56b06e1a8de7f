//! DHT22 (AM2302) frame decoding.
//!
//! The sensor answers a start pulse with 40 bits: 16 bits of relative
//! humidity, 16 bits of temperature (sign-magnitude, top bit negative) and
//! an 8-bit checksum over the first four bytes. Both values are in tenths.
//!
//! Only the decoding lives here so it can be tested on the host; the GPIO
//! timing is in `hal::esp32`.

use crate::traits::SensorError;

/// Lowest temperature the sensor can report, in Celsius.
pub const MIN_TEMPERATURE: f32 = -40.0;
/// Highest temperature the sensor can report, in Celsius.
pub const MAX_TEMPERATURE: f32 = 80.0;

/// A decoded DHT22 frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DhtReading {
    /// Temperature in Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub humidity: f32,
}

impl DhtReading {
    /// Decodes the five raw bytes.
    ///
    /// # Errors
    ///
    /// - [`SensorError::Checksum`] if the checksum byte does not match
    /// - [`SensorError::InvalidReading`] if a value is outside the sensor's range
    pub fn decode(bytes: [u8; 5]) -> Result<Self, SensorError> {
        let sum = bytes[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        if sum != bytes[4] {
            return Err(SensorError::Checksum);
        }

        let humidity = f32::from(u16::from_be_bytes([bytes[0], bytes[1]])) / 10.0;
        let magnitude = f32::from(u16::from_be_bytes([bytes[2] & 0x7F, bytes[3]])) / 10.0;
        let temperature = if bytes[2] & 0x80 != 0 {
            -magnitude
        } else {
            magnitude
        };

        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature)
            || !(0.0..=100.0).contains(&humidity)
        {
            return Err(SensorError::InvalidReading);
        }

        Ok(Self {
            temperature,
            humidity,
        })
    }
}

/// Packs 40 bits, most significant first, into bytes.
pub fn pack_bits(bits: &[bool; 40]) -> [u8; 5] {
    let mut bytes = [0u8; 5];
    for (i, bit) in bits.iter().enumerate() {
        if *bit {
            bytes[i / 8] |= 0x80 >> (i % 8);
        }
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_checksum(data: [u8; 4]) -> [u8; 5] {
        let sum = data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        [data[0], data[1], data[2], data[3], sum]
    }

    #[test]
    fn decodes_datasheet_example() {
        // 65.2 %RH, 35.1 C
        let reading = DhtReading::decode([0x02, 0x8C, 0x01, 0x5F, 0xEE]).unwrap();
        assert!((reading.humidity - 65.2).abs() < 0.01);
        assert!((reading.temperature - 35.1).abs() < 0.01);
    }

    #[test]
    fn decodes_negative_temperature() {
        // -10.1 C
        let reading = DhtReading::decode(with_checksum([0x01, 0xF4, 0x80, 0x65])).unwrap();
        assert!((reading.temperature + 10.1).abs() < 0.01);
        assert!((reading.humidity - 50.0).abs() < 0.01);
    }

    #[test]
    fn rejects_bad_checksum() {
        assert_eq!(
            DhtReading::decode([0x02, 0x8C, 0x01, 0x5F, 0xEF]),
            Err(SensorError::Checksum)
        );
    }

    #[test]
    fn rejects_out_of_range() {
        // 100.0 C
        let bytes = with_checksum([0x01, 0xF4, 0x03, 0xE8]);
        assert_eq!(DhtReading::decode(bytes), Err(SensorError::InvalidReading));
        // 110.0 %RH
        let bytes = with_checksum([0x04, 0x4C, 0x00, 0xC8]);
        assert_eq!(DhtReading::decode(bytes), Err(SensorError::InvalidReading));
    }

    #[test]
    fn all_zero_frame_is_zero() {
        let reading = DhtReading::decode([0; 5]).unwrap();
        assert_eq!(reading.temperature, 0.0);
        assert_eq!(reading.humidity, 0.0);
    }

    #[test]
    fn pack_bits_msb_first() {
        let mut bits = [false; 40];
        bits[0] = true;
        bits[15] = true;
        bits[39] = true;
        assert_eq!(pack_bits(&bits), [0x80, 0x01, 0x00, 0x00, 0x01]);
    }
}
