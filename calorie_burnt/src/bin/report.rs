use std::{fs::File, io::Write, path::PathBuf, time::Duration};

use calorie_burnt::{CalculationMethod, CardioSession, Reading, SessionOptions, UserProfile};
use gps::Gps;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// One row per sampling interval. Every column but speed may be empty
#[derive(Debug, serde::Deserialize)]
struct TickCsv {
    speed_kmh: f64,
    incline: Option<f64>,
    heart_rate: Option<u16>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    altitude: Option<f64>,
}

#[derive(Debug, clap::Parser)]
pub struct Args {
    /// Input csv file with one row per tick
    #[arg(default_value_os_t = std::env::current_dir().unwrap_or_default().join("input.csv"), required = false)]
    pub input: PathBuf,
    /// Output json file with workout summary. _Note_: will truncate old file if exists
    #[arg(default_value_os_t = std::env::current_dir().unwrap_or_default().join("summary.json"), required = false)]
    pub output: PathBuf,
    /// User profile toml file. Defaults to 70 kg, 30 years old male
    #[arg(long, required = false)]
    pub profile: Option<PathBuf>,
    /// Calorie calculation method
    #[arg(short, long, value_enum, default_value_t = CalculationMethod::Met)]
    pub method: CalculationMethod,
    /// Seconds between two rows
    #[arg(short, long, default_value_t = 5)]
    pub interval: u64,
    /// Number of incline readings to average
    #[arg(short, long, default_value_t = 5)]
    pub window: usize,
    /// Don't save changes
    #[arg(short, long, default_value_t = false, required = false)]
    pub dry: bool,
    /// Print result to stdout
    #[arg(short, long, default_value_t = false, required = false)]
    pub print: bool,
}

/// Offset of the `index`-th row from the first one. Saturates at [`Duration::MAX`]
fn row_timestamp(interval: Duration, index: usize) -> Duration {
    u32::try_from(index)
        .ok()
        .and_then(|index| interval.checked_mul(index))
        .unwrap_or(Duration::MAX)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Args {
        input,
        output,
        profile,
        method,
        interval,
        window,
        dry,
        print,
    } = <Args as clap::Parser>::parse();

    let profile = match profile {
        Some(path) => UserProfile::from_toml_path(path)?,
        None => UserProfile::default(),
    };

    let interval = Duration::from_secs(interval);

    let options = SessionOptions::new()
        .set_method(method)
        .set_interval(interval)
        .set_incline_window(window);

    let mut session = CardioSession::new(profile, options)?;

    let mut rdr = csv::Reader::from_reader(
        File::open(input).map_err(|e| format!("Failed to read input file. Reason: {e}"))?,
    );

    let data = rdr
        .deserialize::<TickCsv>()
        .filter_map(|this| this.ok())
        .collect::<Vec<_>>();

    tracing::info!("Total: {} ticks", data.len());

    session.start()?;

    for (
        index,
        TickCsv {
            speed_kmh,
            incline,
            heart_rate,
            latitude,
            longitude,
            altitude,
        },
    ) in data.into_iter().enumerate()
    {
        if let (Some(latitude), Some(longitude)) = (latitude, longitude) {
            session.record_position(Gps {
                timestamp: row_timestamp(interval, index),
                latitude,
                longitude,
                altitude,
            });
        }

        if let Some(heart_rate) = heart_rate {
            session.record_heart_rate(heart_rate);
        }

        session.tick(Reading { speed_kmh, incline });
    }

    let summary = session.finish()?;

    tracing::info!(
        "{:.1} kcal | {:.2} km | pace {} /km | {:.1} km/h",
        summary.calories,
        summary.distance.as_kilometers(),
        summary
            .pace
            .map(|this| this.to_string())
            .unwrap_or_else(|| "0'00\"".to_string()),
        summary.average_speed_kmh,
    );

    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| format!("Failed to serialize summary. Reason: {e}"))?;

    if print {
        let mut io = std::io::stdout().lock();
        io.write_all(json.as_bytes())?;
        io.write_all(b"\n")?;
    }

    if !dry {
        tracing::info!("Saving to {}", output.to_string_lossy());

        std::fs::write(output, json).map_err(|e| format!("Failed to save summary. Reason: {e}"))?;
    }

    tracing::info!("Done!");

    Ok(())
}
