use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parking_booker::{
    config::{DEFAULT_BASE_URL, DEFAULT_VENUE_ID},
    BookerConfig, ClientConfig, Login, RunOutcome,
};

#[derive(Parser)]
#[command(name = "parking-booker")]
#[command(about = "Book venue parking as soon as a space opens up")]
struct Cli {
    /// License plate to register the booking under
    #[arg(short = 'l', long = "plates", env = "PARKING_PLATES")]
    plates: String,

    #[arg(short, long, env = "PARKING_EMAIL")]
    email: String,

    #[arg(short, long, env = "PARKING_PASSWORD", hide_env_values = true)]
    password: String,

    /// Comma separated dates (YYYY-MM-DD). Defaults to today, or tomorrow after 10:00
    #[arg(short, long, value_delimiter = ',')]
    dates: Vec<NaiveDate>,

    /// Go through the motions without booking anything
    #[arg(long)]
    dry_run: bool,

    /// Seconds to wait between polls for an event with no spaces
    #[arg(long, default_value_t = 3, num_args = 0..=1, default_missing_value = "1")]
    interval: u64,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, default_value_t = DEFAULT_VENUE_ID)]
    venue_id: u64,
}

impl From<Cli> for BookerConfig {
    fn from(cli: Cli) -> Self {
        BookerConfig {
            client: ClientConfig {
                base_url: cli.base_url,
                venue_id: cli.venue_id,
                ..Default::default()
            },
            login: Login {
                email: cli.email,
                password: cli.password,
            },
            plate_number: cli.plates,
            dates: cli.dates,
            dry_run: cli.dry_run,
            poll_interval: Duration::from_secs(cli.interval),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before the filter is built, so RUST_LOG may come from .env
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parking_booker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BookerConfig::from(Cli::parse());

    // The worker is abandoned on Ctrl-C and dropped with the runtime
    tokio::select! {
        outcome = parking_booker::run(config) => match outcome? {
            RunOutcome::NothingToBook => tracing::info!("Nothing to book, exiting"),
            RunOutcome::Completed { booked } => tracing::info!("Booked {booked} event(s), exiting"),
        },
        _ = signal::ctrl_c() => tracing::info!("Shutting down..."),
    }

    Ok(())
}
