pub mod cli;
pub mod config;
pub mod constants;
pub mod models;
pub mod pipeline;
pub mod scraping;
mod utils;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use constants::{Classification, Status};
pub use models::{Event, Meeting, RawRecord};

pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meeting_scrape_lib=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cli::execute(cli::Cli::parse())
}
