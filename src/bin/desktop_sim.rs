//! Desktop simulator for the matrix thermostat.
//!
//! Runs the real control loop against mock hardware and a crude room model:
//! the room warms while the heater is on and cools toward the outside
//! temperature otherwise. The LED matrix is printed as ASCII art.
//!
//! A scripted user presses the increase button five times after a few
//! seconds, so the readout switches to the setpoint and back.
//!
//! # Usage
//!
//! Simulated time (fast, deterministic, scan polled from the loop):
//! ```sh
//! cargo run --bin desktop_sim
//! ```
//!
//! Real time, scan on a dedicated thread:
//! ```sh
//! cargo run --bin desktop_sim -- --realtime
//! ```

use matrix_thermostat::hal::{MockButtons, MockClock, MockHeater, MockMatrix, MockSensor};
use matrix_thermostat::traits::{Button, Clock};
use matrix_thermostat::{
    ExternalScan, PollingScan, ScanDriver, ScanThread, Scanner, SharedFrame, Thermostat,
    ThermostatConfig, ThermostatState,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Length of the simulation in milliseconds
const RUN_MS: u64 = 40_000;

/// Print interval in milliseconds
const PRINT_MS: u64 = 2_000;

/// Outside temperature the room drifts toward
const OUTSIDE_C: f32 = 12.0;

/// Times (ms) at which the scripted user presses increase
const PRESSES_MS: [u64; 5] = [6_000, 6_200, 6_400, 6_600, 6_800];

/// How long each scripted press is held
const HOLD_MS: u64 = 100;

/// First-order room model
struct Room {
    temperature: f32,
}

impl Room {
    fn step(&mut self, heater_on: bool, dt_ms: u64) {
        let dt = dt_ms as f32 / 1000.0;
        if heater_on {
            self.temperature += 0.25 * dt;
        }
        self.temperature += (OUTSIDE_C - self.temperature) * 0.01 * dt;
    }
}

type SimThermostat<'f, D> = Thermostat<'f, MockSensor, MockHeater, MockButtons, D>;

fn main() -> anyhow::Result<()> {
    let realtime = std::env::args().any(|a| a == "--realtime");

    println!("=================================");
    println!("  matrix-thermostat Simulator");
    println!("=================================");
    println!();

    let config = ThermostatConfig::default().with_setpoint(22);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    println!("Device: {}", config.device.name);
    println!(
        "Setpoint {} C, sampling every {} ms, scan {} ms/column",
        config.setpoint, config.timing.sample_interval_ms, config.timing.scan_period_ms
    );
    println!();

    let scanner = Scanner::new(MockMatrix::new(), config.matrix.wiring());
    let frame = Arc::new(SharedFrame::new());

    if realtime {
        let period = Duration::from_millis(u64::from(config.timing.scan_period_ms));
        let scan_thread = ScanThread::spawn(scanner, frame.clone(), period);
        let thermostat = build(&config, ExternalScan, &frame);
        run_realtime(thermostat, &frame);
        if let Some(scanner) = scan_thread.stop() {
            println!("Scan thread stopped after {} steps", scanner.steps());
        }
    } else {
        let scan = PollingScan::new(scanner, config.timing.scan_period_ms);
        let thermostat = build(&config, scan, &frame);
        run_simulated(thermostat, &frame);
    }

    Ok(())
}

fn build<'f, D: ScanDriver>(
    config: &ThermostatConfig,
    scan: D,
    frame: &'f SharedFrame,
) -> SimThermostat<'f, D> {
    let mut thermostat = Thermostat::new(
        config,
        MockSensor::new(),
        MockHeater::new(),
        MockButtons::new(),
        scan,
        frame,
    );
    // Mock heater never fails
    let _ = thermostat.begin();
    thermostat
}

fn run_simulated<D>(mut thermostat: SimThermostat<'_, D>, frame: &SharedFrame)
where
    D: ScanDriver,
    D::Error: core::fmt::Debug,
{
    let mut clock = MockClock::new();
    let mut room = Room { temperature: 18.0 };

    while clock.now_ms() <= RUN_MS {
        let now = clock.now_ms();
        if let Some(state) = tick(&mut thermostat, &mut room, now, 1) {
            if now % PRINT_MS == 0 {
                print_frame(now, &state, frame);
            }
        }
        clock.advance(1);
    }
}

fn run_realtime<D>(mut thermostat: SimThermostat<'_, D>, frame: &SharedFrame)
where
    D: ScanDriver,
    D::Error: core::fmt::Debug,
{
    let start = Instant::now();
    let mut room = Room { temperature: 18.0 };
    let mut last_ms = 0;
    let mut last_print_ms = 0;

    loop {
        let now = start.elapsed().as_millis() as u64;
        if now > RUN_MS {
            break;
        }
        if let Some(state) = tick(&mut thermostat, &mut room, now, now - last_ms) {
            if now - last_print_ms >= PRINT_MS {
                last_print_ms = now;
                print_frame(now, &state, frame);
            }
        }
        last_ms = now;
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// One loop pass: script the buttons, feed the sensor, poll, update the room.
fn tick<D>(
    thermostat: &mut SimThermostat<'_, D>,
    room: &mut Room,
    now: u64,
    dt_ms: u64,
) -> Option<ThermostatState>
where
    D: ScanDriver,
    D::Error: core::fmt::Debug,
{
    let pressed = PRESSES_MS
        .iter()
        .any(|&at| now >= at && now < at + HOLD_MS);
    thermostat.buttons_mut().set(Button::Increase, pressed);
    thermostat.sensor_mut().set_temperature(room.temperature);

    match thermostat.poll(now) {
        Ok(state) => {
            room.step(state.heater_on, dt_ms);
            Some(state)
        }
        Err(e) => {
            println!("[ERR] {}", e);
            None
        }
    }
}

fn print_frame(now: u64, state: &ThermostatState, frame: &SharedFrame) {
    println!(
        "t={:>5.1}s  room {:>5.2} C  setpoint {} C  heater {:<3}  showing {:?}",
        now as f32 / 1000.0,
        state.temperature,
        state.setpoint,
        if state.heater_on { "ON" } else { "off" },
        state.mode,
    );
    for line in frame.live().render_ascii().lines() {
        println!("    {}", line);
    }
    println!();
}
