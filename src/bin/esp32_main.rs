//! ESP32-C3 SuperMini matrix thermostat.
//!
//! This is the main entry point for the physical hardware. It runs a
//! non-blocking control loop that:
//! - Polls the setpoint buttons (debounced)
//! - Samples the DHT22 every two seconds
//! - Switches the heater relay
//! - Publishes the readout to the shared frame buffer
//! - Steps the matrix scan (unless a timer interrupt does it)
//!
//! # Build
//!
//! ```bash
//! # Scan from the main loop
//! cargo build --release --no-default-features --features esp32 --bin esp32_main
//!
//! # Scan from a hardware timer interrupt
//! cargo build --release --no-default-features --features scan-interrupt --bin esp32_main
//!
//! # Power-on setpoint other than 25 C
//! THERMOSTAT_SETPOINT=21 cargo build ...
//! ```
//!
//! The polling scan sleeps 1 ms per pass, which needs `CONFIG_FREERTOS_HZ=1000`
//! (see `sdkconfig.defaults`).

use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::log::EspLogger;
use matrix_thermostat::hal::esp32::{
    esp32_matrix, Esp32Buttons, Esp32Clock, Esp32Dht22, Esp32Heater,
};
use matrix_thermostat::traits::Clock;
use matrix_thermostat::{Scanner, SharedFrame, Thermostat, ThermostatConfig, ThermostatState};
use std::thread;
use std::time::Duration;

/// Frame buffer shared between the main loop and the scan.
static FRAME: SharedFrame = SharedFrame::new();

/// Status log interval in milliseconds
const STATUS_INTERVAL_MS: u64 = 5_000;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    EspLogger::initialize_default();

    println!();
    println!("================================");
    println!("  matrix-thermostat SuperMini");
    println!("================================");
    println!();

    // =========================================================================
    // Configuration
    // =========================================================================
    let setpoint = option_env!("THERMOSTAT_SETPOINT")
        .and_then(|s| s.trim().parse::<i32>().ok())
        .unwrap_or(ThermostatConfig::default().setpoint);

    let mut config = ThermostatConfig::default().with_setpoint(setpoint);
    if let Some(name) = option_env!("THERMOSTAT_NAME") {
        config.device = config.device.with_name(name);
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    println!("Device: {}", config.device.name);

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Initialize Matrix (2x 74HC595 on GPIO2/3/4)
    // =========================================================================
    let matrix = esp32_matrix(
        peripherals.pins.gpio2,
        peripherals.pins.gpio3,
        peripherals.pins.gpio4,
        config.matrix.byte_order,
    )?;
    let mut scanner = Scanner::new(matrix, config.matrix.wiring());
    scanner
        .blank()
        .map_err(|e| anyhow::anyhow!("matrix blank failed: {:?}", e))?;
    println!("[OK] Matrix initialized (GPIO2/3/4)");

    // =========================================================================
    // Initialize Sensor, Heater and Buttons
    // =========================================================================
    let sensor = Esp32Dht22::new(peripherals.pins.gpio5)?;
    println!("[OK] DHT22 initialized (GPIO5)");

    let heater = Esp32Heater::new(peripherals.pins.gpio10)?;
    println!("[OK] Heater initialized (GPIO10)");

    let buttons = Esp32Buttons::new(peripherals.pins.gpio6, peripherals.pins.gpio7)?;
    println!("[OK] Buttons initialized (GPIO6/7)");

    // =========================================================================
    // Initialize Scan Driver
    // =========================================================================
    #[cfg(feature = "scan-interrupt")]
    let (scan, _scan_timer) = {
        use matrix_thermostat::hal::esp32::Esp32ScanTimer;
        use matrix_thermostat::ExternalScan;

        let timer = Esp32ScanTimer::start(
            peripherals.timer00,
            scanner,
            &FRAME,
            config.timing.scan_period_ms,
        )?;
        println!(
            "[OK] Scan timer running ({} ms per column)",
            config.timing.scan_period_ms
        );
        (ExternalScan, timer)
    };

    #[cfg(not(feature = "scan-interrupt"))]
    let scan = {
        use matrix_thermostat::PollingScan;

        println!(
            "[OK] Polling scan ({} ms per column)",
            config.timing.scan_period_ms
        );
        PollingScan::new(scanner, config.timing.scan_period_ms)
    };

    // =========================================================================
    // Initialize Clock and Thermostat
    // =========================================================================
    let clock = Esp32Clock::new();
    let mut thermostat = Thermostat::new(&config, sensor, heater, buttons, scan, &FRAME);
    thermostat.begin()?;

    println!();
    println!("Controls:");
    println!("  Up button (GPIO6):   setpoint +1 C");
    println!("  Down button (GPIO7): setpoint -1 C");
    println!();
    println!("Starting control loop (setpoint {} C)...", setpoint);
    println!();

    let mut last_status_ms = 0;

    // =========================================================================
    // Main Control Loop
    // =========================================================================
    loop {
        let now = clock.now_ms();

        match thermostat.poll(now) {
            Ok(state) => {
                if now.saturating_sub(last_status_ms) >= STATUS_INTERVAL_MS {
                    last_status_ms = now;
                    log_status(&state);
                }
            }
            Err(e) => log::error!("{}", e),
        }

        // Let the idle task feed the watchdog
        #[cfg(feature = "scan-interrupt")]
        thread::sleep(Duration::from_millis(10));
        #[cfg(not(feature = "scan-interrupt"))]
        thread::sleep(Duration::from_millis(1));
    }
}

fn log_status(state: &ThermostatState) {
    let humidity = state
        .humidity
        .map(|rh| format!("{:.0}%", rh))
        .unwrap_or_else(|| "--".into());
    log::info!(
        "temp {:.1} C, humidity {}, setpoint {} C, heater {}, showing {} ({:?}), sensor failures {}",
        state.temperature,
        humidity,
        state.setpoint,
        if state.heater_on { "ON" } else { "off" },
        state.displayed,
        state.mode,
        state.sensor_failures
    );
}
