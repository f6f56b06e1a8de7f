//! End-to-end tests for the thermostat loop against mock hardware.

use matrix_thermostat::hal::{MockButtons, MockHeater, MockMatrix, MockPin, MockSensor};
use matrix_thermostat::{
    compose, Button, ByteOrder, DisplayMode, Frame, MatrixWiring, PollingScan, Scanner,
    SensorError, SharedFrame, ShiftRegisterMatrix, Thermostat, ThermostatConfig, ThermostatState,
    COLUMNS,
};

type MockThermostat<'f> =
    Thermostat<'f, MockSensor, MockHeater, MockButtons, PollingScan<MockMatrix>>;

fn thermostat<'a>(config: &'a ThermostatConfig, frame: &'a SharedFrame) -> MockThermostat<'a> {
    let scan = PollingScan::new(
        Scanner::new(MockMatrix::new(), config.matrix.wiring()),
        config.timing.scan_period_ms,
    );
    Thermostat::new(
        config,
        MockSensor::new(),
        MockHeater::new(),
        MockButtons::new(),
        scan,
        frame,
    )
}

/// Polls every millisecond in `[from, to)` and returns the last state.
fn run(t: &mut MockThermostat<'_>, from: u64, to: u64) -> ThermostatState {
    let mut state = t.state();
    for now in from..to {
        state = t.poll(now).unwrap();
    }
    state
}

/// Holds `button` for 100 ms starting at `at`, then releases it.
fn press(t: &mut MockThermostat<'_>, button: Button, at: u64) -> ThermostatState {
    t.buttons_mut().set(button, true);
    run(t, at, at + 100);
    t.buttons_mut().set(button, false);
    run(t, at + 100, at + 101)
}

// ============================================================================
// Reference Scenario
// ============================================================================

#[test]
fn setpoint_adjustment_scenario() {
    let config = ThermostatConfig::default();
    let frame = SharedFrame::new();
    let mut t = thermostat(&config, &frame);
    t.sensor_mut().set_temperature(20.0);
    t.begin().unwrap();

    // Reading 20 below setpoint 25: heating, showing the reading.
    let state = run(&mut t, 0, 1000);
    assert_eq!(state.setpoint, 25);
    assert!(state.heater_on);
    assert_eq!(state.mode, DisplayMode::Reading);
    assert_eq!(frame.live(), compose(20));

    // First press shows the new setpoint at once.
    let state = press(&mut t, Button::Increase, 1000);
    assert_eq!(state.setpoint, 26);
    assert_eq!(state.mode, DisplayMode::Setpoint);
    assert_eq!(frame.live(), compose(26));

    for at in [1200, 1400, 1600, 1800] {
        press(&mut t, Button::Increase, at);
    }
    let state = t.state();
    assert_eq!(state.setpoint, 30);
    assert_eq!(frame.live(), compose(30));
    assert!(state.heater_on);

    // Still showing the setpoint just before the timeout...
    let state = run(&mut t, 1901, 4800);
    assert_eq!(state.mode, DisplayMode::Setpoint);
    assert_eq!(frame.live(), compose(30));

    // ...and the reading once it has elapsed.
    let state = run(&mut t, 4800, 4801);
    assert_eq!(state.mode, DisplayMode::Reading);
    assert_eq!(frame.live(), compose(20));
    assert_eq!(t.controls().accepted_presses(), 5);
}

// ============================================================================
// Heater Behaviour
// ============================================================================

#[test]
fn heater_follows_temperature() {
    let config = ThermostatConfig::default();
    let frame = SharedFrame::new();
    let mut t = thermostat(&config, &frame);

    for celsius in [20.0, 24.9, 25.0, 30.0, 22.0] {
        t.sensor_mut().queue_temperature(celsius);
    }
    let mut now = 0;
    for expected in [true, true, false, false, true] {
        let state = run(&mut t, now, now + 2000);
        assert_eq!(state.heater_on, expected, "at {} ms", now);
        now += 2000;
    }
    assert_eq!(t.heater().switch_count, 3);
}

#[test]
fn cold_start_keeps_heater_off_until_first_reading() {
    let config = ThermostatConfig::default();
    let frame = SharedFrame::new();
    let mut t = thermostat(&config, &frame);
    t.sensor_mut().queue_error(SensorError::Timeout);
    t.sensor_mut().queue_temperature(18.0);

    let state = run(&mut t, 0, 2000);
    assert!(!state.has_reading);
    assert!(!state.heater_on);
    assert_eq!(frame.live(), compose(0));

    let state = run(&mut t, 2000, 2001);
    assert!(state.has_reading);
    assert!(state.heater_on);
    assert_eq!(frame.live(), compose(18));
}

#[test]
fn sensor_failure_retains_outputs() {
    let config = ThermostatConfig::default();
    let frame = SharedFrame::new();
    let mut t = thermostat(&config, &frame);
    t.sensor_mut().queue_temperature(21.3);
    t.sensor_mut().queue_error(SensorError::Checksum);
    t.sensor_mut().queue_error(SensorError::Timeout);

    let before = run(&mut t, 0, 2000);
    let generation = frame.generation();
    let after = run(&mut t, 2000, 6000);

    assert_eq!(after.sensor_failures, 2);
    assert_eq!(after.temperature, before.temperature);
    assert_eq!(after.heater_on, before.heater_on);
    assert_eq!(frame.live(), compose(21));
    assert_eq!(frame.generation(), generation);
}

#[test]
fn lowering_setpoint_below_reading_stops_heater() {
    let config = ThermostatConfig::default().with_setpoint(21);
    let frame = SharedFrame::new();
    let mut t = thermostat(&config, &frame);
    t.sensor_mut().set_temperature(20.5);
    assert!(run(&mut t, 0, 10).heater_on);

    let state = press(&mut t, Button::Decrease, 10);
    assert_eq!(state.setpoint, 20);
    assert!(!state.heater_on);
}

#[test]
fn humidity_reaches_snapshot() {
    let config = ThermostatConfig::default();
    let frame = SharedFrame::new();
    let mut t = thermostat(&config, &frame);
    t.sensor_mut().set_temperature(19.0);
    t.sensor_mut().humidity = Some(48.5);
    let state = run(&mut t, 0, 1);
    assert_eq!(state.humidity, Some(48.5));
}

// ============================================================================
// Full Stack: Shift Registers
// ============================================================================

/// Decodes every latched 16-bit word from the pin histories.
fn latched_words(data: &MockPin, clock: &MockPin) -> Vec<(u8, u8)> {
    data.sampled_bits(clock)
        .chunks(16)
        .map(|word| {
            let byte = |bits: &[bool]| bits.iter().fold(0u8, |acc, b| (acc << 1) | *b as u8);
            (byte(&word[..8]), byte(&word[8..]))
        })
        .collect()
}

#[test]
fn shift_register_chain_shows_reading() {
    let config = ThermostatConfig::default();
    let wiring = config.matrix.wiring();
    let frame = SharedFrame::new();
    let chain = ShiftRegisterMatrix::new(
        MockPin::new(),
        MockPin::new(),
        MockPin::new(),
        ByteOrder::RowsFirst,
    )
    .unwrap();
    let scan = PollingScan::new(Scanner::new(chain, wiring), config.timing.scan_period_ms);
    let mut sensor = MockSensor::new();
    sensor.set_temperature(23.0);
    let mut t = Thermostat::new(
        &config,
        sensor,
        MockHeater::new(),
        MockButtons::new(),
        scan,
        &frame,
    );

    // Eight scan steps at 2 ms each.
    for now in 0..16 {
        t.poll(now).unwrap();
    }

    let (_, _, _, scan) = t.into_parts();
    let (data, clock, latch) = scan.into_scanner().into_output().release();
    let words = latched_words(&data, &clock);
    assert_eq!(latch.rising_edges(), words.len());
    assert_eq!(words.len(), 2 * COLUMNS);

    let mut image = Frame::blank();
    for (column, pair) in words.chunks(2).enumerate() {
        assert_eq!(pair[0], wiring.blank());
        let (rows, select) = pair[1];
        assert_eq!(wiring.column.apply(select), 1 << column);
        image.set_column(column, wiring.row.apply(rows));
    }
    assert_eq!(image, compose(23));
}

#[test]
fn custom_wiring_reaches_the_matrix() {
    use matrix_thermostat::{MatrixConfig, Polarity};

    let config = ThermostatConfig::default().with_matrix(
        MatrixConfig::default()
            .with_row_polarity(Polarity::ActiveHigh)
            .with_column_polarity(Polarity::ActiveLow),
    );
    let frame = SharedFrame::new();
    let mut t = thermostat(&config, &frame);
    t.sensor_mut().set_temperature(7.0);
    for now in (0..16).step_by(2) {
        t.poll(now).unwrap();
    }

    let wiring = MatrixWiring::new(Polarity::ActiveHigh, Polarity::ActiveLow);
    let output = t.scan().scanner().output();
    assert_eq!(output.writes[0], (0x00, 0xFF));
    assert_eq!(output.reconstruct(wiring), compose(7));
}
