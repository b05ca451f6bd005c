//! Thermogate terminal emulator.
//!
//! Runs the appliance control loop against mock peripherals. Each line on
//! stdin is typed on the keypad (`A1234#`); `t <celsius> <humidity>` sets
//! the simulated climate and `t fail` breaks the sensor. The display is
//! printed whenever it changes.
//!
//! Usage: `thermogate [config.toml]`

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use thermogate_access::AccessController;
use thermogate_appliance::{Appliance, Peripherals, TracingSink, load_config};
use thermogate_core::{AccessConfig, SystemClock};
use thermogate_hardware::mock::{MockKeypad, MockKeypadHandle, MockRelay, MockSensor, MockSensorHandle};
use thermogate_storage::SlotTable;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Control loop period.
const TICK_PERIOD: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the display frames on stdout stay readable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))
            .with_context(|| format!("loading configuration from {path}"))?,
        None => AccessConfig::default(),
    };
    info!(
        version = thermogate_core::VERSION,
        device_id = %config.device_id,
        ui_mode = ?config.ui_mode,
        "starting thermogate"
    );

    let (keypad, keys) = MockKeypad::with_name("door keypad");
    let (sensor, climate) = MockSensor::new();
    climate.set(25.0, 45.0);
    let peripherals = Peripherals {
        keypad: Some(keypad.into()),
        solenoid: MockRelay::new("solenoid").0.into(),
        fan1: MockRelay::new("fan1").0.into(),
        fan2: MockRelay::new("fan2").0.into(),
        sensor,
    };

    let access = AccessController::new(SlotTable::default(), config, SystemClock::new());
    let mut appliance = Appliance::new(access, peripherals, TracingSink::new());

    tokio::spawn(read_console(keys, climate.clone()));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    let mut last_frame = String::new();
    appliance
        .run(TICK_PERIOD, shutdown, |appliance| {
            let frame = appliance.display().render_frame();
            if frame != last_frame {
                println!("{frame}");
                last_frame = frame;
            }
        })
        .await;

    info!("shutdown complete");
    Ok(())
}

async fn read_console(keys: MockKeypadHandle, climate: MockSensorHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "console read failed");
                break;
            }
        };
        let line = line.trim();

        if let Some(args) = line.strip_prefix("t ") {
            set_climate(&climate, args);
        } else if let Err(e) = keys.send_keys(line).await {
            warn!(error = %e, "cannot type {line:?}");
        }
    }
}

fn set_climate(climate: &MockSensorHandle, args: &str) {
    if args.trim() == "fail" {
        climate.fail();
        return;
    }
    let mut values = args.split_whitespace().map(str::parse::<f32>);
    match (values.next(), values.next()) {
        (Some(Ok(temperature)), Some(Ok(humidity))) => climate.set(temperature, humidity),
        _ => warn!("usage: t <celsius> <humidity> | t fail"),
    }
}
