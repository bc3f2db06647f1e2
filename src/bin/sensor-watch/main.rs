mod args;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use args::Args;
use chrono_tz::Tz;
use clap::Parser as _;
use lectura_sensor::{
    api::ReadingsClient,
    reading::SensorReading,
    session::Session,
    viewer::{Phase, Viewer, ViewerState},
};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = run().await {
        eprintln!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let session = Session::with_token(&args.token);
    let client = ReadingsClient::new(&args.base_url, args.timestamp_field)
        .context("failed to build HTTP client")?;

    let viewer = Viewer::new(
        client,
        session.clone(),
        Duration::from_secs(args.interval_secs),
    );
    let mut updates = viewer.subscribe();

    viewer.refresh(true).await;

    let state = updates.borrow_and_update().clone();
    print_state(&state, args.timezone);

    if !args.watch {
        if let Some(error) = state.error {
            bail!("failed to fetch sensor readings: {error}");
        }
        return Ok(());
    }

    viewer.set_auto_refresh(true);

    loop {
        updates
            .changed()
            .await
            .context("viewer state channel closed")?;

        let state = updates.borrow_and_update().clone();
        if state.phase() == Phase::Loading {
            continue;
        }

        print_state(&state, args.timezone);

        if !session.is_authenticated() {
            bail!("session expired, please sign in again");
        }
    }
}

fn print_state(state: &ViewerState, timezone: Tz) {
    println!();

    if let Some(error) = &state.error {
        eprintln!("error: {error}");
        if state.history.is_empty() {
            eprintln!("no sensor data available; try refreshing or check the connection");
        }
        return;
    }

    match &state.latest {
        Some(latest) => println!(
            "latest: {} temp, {} hum, recorded {}",
            format_value(latest.temperature, "°C"),
            format_value(latest.humidity, "%"),
            format_recorded_at(latest, timezone),
        ),
        None => println!("no readings available"),
    }

    if let Some(last_fetched_at) = state.last_fetched_at {
        println!(
            "last fetched: {}",
            last_fetched_at
                .with_timezone(&timezone)
                .format("%Y-%m-%d %H:%M:%S")
        );
    }

    if !state.history.is_empty() {
        println!();
        println!("{:>6}  {:>8}  {:>7}  date/time", "id", "temp", "hum");
        for reading in &state.history {
            println!(
                "{:>6}  {:>8}  {:>7}  {}",
                reading.id,
                format_value(reading.temperature, "°C"),
                format_value(reading.humidity, "%"),
                format_recorded_at(reading, timezone),
            );
        }
    }
}

fn format_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.1}{unit}"),
        None => "N/A".to_string(),
    }
}

fn format_recorded_at(reading: &SensorReading, timezone: Tz) -> String {
    match reading.recorded_instant() {
        Some(instant) => instant
            .with_timezone(&timezone)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => match reading.recorded_at.as_deref() {
            Some(_) => "invalid date".to_string(),
            None => "N/A".to_string(),
        },
    }
}
