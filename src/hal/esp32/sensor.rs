//! DHT22 single-wire sensor, bit-banged on one open-drain GPIO.
//!
//! # Wiring
//!
//! - DATA → GPIO5 with a 10k pull-up to 3.3V
//! - VCC → 3.3V
//! - GND → GND
//!
//! # Protocol
//!
//! The host pulls the line low for at least 1 ms and releases it. The
//! sensor answers with 80 µs low and 80 µs high, then sends 40 bits. Every
//! bit starts with 50 µs low; the following high phase lasts about 27 µs
//! for a 0 and 70 µs for a 1.
//!
//! A transfer takes about 5 ms, during which interrupts are masked so the
//! pulse widths are not stretched. The matrix scan skips a couple of steps
//! once per sampling interval as a result.

use crate::hal::dht::{pack_bits, DhtReading};
use crate::traits::{SensorError, TemperatureSensor};
use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{InputOutput, InputPin, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;

use super::Esp32Clock;

/// DHT22 temperature/humidity sensor for ESP32.
///
/// [`read_temperature`](TemperatureSensor::read_temperature) runs one
/// transfer and keeps the humidity from it for
/// [`read_humidity`](TemperatureSensor::read_humidity).
///
/// # Example
///
/// ```ignore
/// use matrix_thermostat::hal::esp32::Esp32Dht22;
/// use matrix_thermostat::traits::TemperatureSensor;
///
/// let peripherals = Peripherals::take()?;
/// let mut dht = Esp32Dht22::new(peripherals.pins.gpio5)?;
/// let celsius = dht.read_temperature()?;
/// let humidity = dht.read_humidity()?;
/// ```
pub struct Esp32Dht22<'d, P>
where
    P: InputPin + OutputPin,
{
    pin: PinDriver<'d, P, InputOutput>,
    clock: Esp32Clock,
    humidity: Option<f32>,
}

impl<'d, P> Esp32Dht22<'d, P>
where
    P: InputPin + OutputPin,
{
    /// Host start pulse (datasheet minimum is 1 ms)
    const START_LOW_US: u32 = 1_100;

    /// High phase longer than this is a 1 bit
    const ONE_THRESHOLD_US: u64 = 48;

    /// Configures the pin as open-drain with pull-up and releases the line.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(pin: impl Peripheral<P = P> + 'd) -> Result<Self, esp_idf_hal::sys::EspError> {
        let mut pin = PinDriver::input_output_od(pin)?;
        pin.set_pull(Pull::Up)?;
        pin.set_high()?;
        Ok(Self {
            pin,
            clock: Esp32Clock::new(),
            humidity: None,
        })
    }

    fn transfer(&mut self) -> Result<[u8; 5], SensorError> {
        self.pin.set_low().map_err(|_| SensorError::Bus)?;
        Ets::delay_us(Self::START_LOW_US);
        self.pin.set_high().map_err(|_| SensorError::Bus)?;

        esp_idf_hal::interrupt::free(|| {
            // Response: line goes low, then high, then low for the first bit
            self.wait_for(false, 200)?;
            self.wait_for(true, 120)?;
            self.wait_for(false, 120)?;

            let mut bits = [false; 40];
            for bit in bits.iter_mut() {
                self.wait_for(true, 80)?;
                let high_us = self.wait_for(false, 120)?;
                *bit = high_us > Self::ONE_THRESHOLD_US;
            }
            Ok(pack_bits(&bits))
        })
    }

    /// Spins until the line reads `level`, returning the time waited.
    fn wait_for(&self, level: bool, timeout_us: u64) -> Result<u64, SensorError> {
        let start = self.clock.now_us();
        loop {
            let elapsed = self.clock.now_us().saturating_sub(start);
            if self.pin.is_high() == level {
                return Ok(elapsed);
            }
            if elapsed > timeout_us {
                return Err(SensorError::Timeout);
            }
        }
    }
}

impl<P> TemperatureSensor for Esp32Dht22<'_, P>
where
    P: InputPin + OutputPin,
{
    fn begin(&mut self) -> Result<(), SensorError> {
        self.pin.set_high().map_err(|_| SensorError::Bus)
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        let bytes = self.transfer();
        // Release the line whatever happened
        let _ = self.pin.set_high();
        let reading = DhtReading::decode(bytes?)?;
        self.humidity = Some(reading.humidity);
        Ok(reading.temperature)
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.humidity.ok_or(SensorError::InvalidReading)
    }
}
