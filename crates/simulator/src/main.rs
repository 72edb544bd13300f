use std::num::NonZero;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitals_simulator::{generate, TelemetrySender};

#[derive(Parser)]
#[command(name = "vitals-simulator")]
#[command(about = "Simulated bedside monitor sending vital-sign telemetry")]
#[command(version)]
struct Cli {
    /// Device identifier stamped on every reading
    device_id: String,

    /// Delay between batches, in milliseconds
    #[arg(long, default_value = "5000")]
    interval_ms: u64,

    /// Chance of a warning reading, in percent
    #[arg(long, default_value = "10", value_parser = parse_percent)]
    warning_rate: f64,

    /// Chance of a critical reading, in percent
    #[arg(long, default_value = "1", value_parser = parse_percent)]
    critical_rate: f64,

    /// Readings per batch
    #[arg(long, default_value = "1")]
    batch_size: NonZero<usize>,

    /// Stop after this many readings (runs until Ctrl-C if omitted)
    #[arg(long)]
    count: Option<u64>,

    /// Worker invocation endpoint
    #[arg(long, default_value = "http://127.0.0.1:3000/ProcessTelemetry")]
    endpoint: String,

    /// Print readings as JSON lines instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "10")]
    timeout_secs: u64,
}

fn parse_percent(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|e| format!("not a number: {e}"))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside 0-100"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitals_simulator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.warning_rate + cli.critical_rate > 100.0 {
        anyhow::bail!("--warning-rate plus --critical-rate must not exceed 100");
    }

    let sender = if cli.dry_run {
        None
    } else {
        Some(TelemetrySender::new(
            cli.endpoint.clone(),
            Duration::from_secs(cli.timeout_secs),
        )?)
    };

    tracing::info!(
        device_id = %cli.device_id,
        interval_ms = cli.interval_ms,
        warning_rate = cli.warning_rate,
        critical_rate = cli.critical_rate,
        batch_size = cli.batch_size.get(),
        endpoint = sender.as_ref().map(TelemetrySender::endpoint).unwrap_or("<dry run>"),
        "Starting simulator, press Ctrl-C to stop"
    );

    let mut interval = tokio::time::interval(Duration::from_millis(cli.interval_ms.max(1)));
    let mut sent: u64 = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(sent, "Interrupted, shutting down");
                break;
            }
        }

        let remaining = cli.count.map_or(u64::MAX, |c| c.saturating_sub(sent));
        if remaining == 0 {
            break;
        }
        let size = cli.batch_size.get().min(usize::try_from(remaining).unwrap_or(usize::MAX));

        let readings: Vec<_> = {
            let mut rng = rand::rng();
            (0..size)
                .map(|_| generate(&cli.device_id, cli.warning_rate, cli.critical_rate, &mut rng))
                .collect()
        };

        for reading in &readings {
            tracing::info!(
                device_id = %reading.device_id,
                status = %reading.patient_status,
                heart_rate = reading.heart_rate,
                body_temperature = reading.body_temperature,
                spo2 = reading.spo2,
                "Generated reading"
            );
        }

        match &sender {
            None => {
                for reading in &readings {
                    println!("{}", serde_json::to_string(reading)?);
                }
            }
            Some(sender) => match sender.send(&readings).await {
                Ok(summary) => tracing::info!(summary = %summary, "Batch accepted"),
                Err(e) => tracing::warn!(error = %e, "Batch delivery failed"),
            },
        }

        sent += readings.len() as u64;
        if cli.count.is_some_and(|c| sent >= c) {
            break;
        }
    }

    tracing::info!(sent, "Simulator stopped");
    Ok(())
}
