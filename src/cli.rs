use std::{fs, path::Path, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::models::{Event, RawRecord};
use crate::pipeline::{self, MigrationError};
use crate::scraping::{self, FeedSpider};
use crate::utils;

#[derive(Parser, Debug)]
#[command(name = "meeting-scrape")]
#[command(about = "Validate and normalize scraped public-meeting records")]
#[command(version)]
pub struct Cli {
    /// JSON config file (defaults to the user data directory)
    #[arg(long, global = true, env = "MEETING_SCRAPE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Annotate records with val_* flags and print a pass-rate summary
    Validate {
        file: PathBuf,
        /// Spider name for the summary; defaults to the file stem
        #[arg(long)]
        spider: Option<String>,
        #[arg(long)]
        threshold: Option<f64>,
        /// Write the annotated records here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Map legacy records onto normalized meeting items
    Migrate {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Stamp id and status onto events handed over by a spider
    Finalize {
        file: PathBuf,
        #[arg(long)]
        spider: String,
        /// Agency name for log lines; defaults to the spider name
        #[arg(long)]
        agency: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn execute(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(utils::config_path);
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    match cli.command {
        Command::Validate {
            file,
            spider,
            threshold,
            output,
        } => {
            let spider = spider.unwrap_or_else(|| file_stem(&file));
            let threshold = threshold.unwrap_or(config.pass_threshold);
            let records: Vec<RawRecord> = read_json(&file)?;
            let (validated, summary) = pipeline::validate_batch(&spider, records, config.today()?);
            if let Some(path) = output {
                write_json(&path, &validated)?;
            }
            println!("{summary}");
            summary.check(threshold)?;
            info!(spider = %spider, "validation passed");
        }
        Command::Migrate { file, output } => {
            let records: Vec<RawRecord> = read_json(&file)?;
            let meetings = pipeline::migrate_batch(&records)
                .with_context(|| format!("migrating {}", file.display()))?;
            emit(output.as_deref(), &meetings)?;
        }
        Command::Finalize {
            file,
            spider,
            agency,
            output,
        } => {
            if spider.trim().is_empty() {
                bail!("spider name is required");
            }
            let events: Vec<Event> = read_json(&file)?;
            require_sources(&events).with_context(|| format!("finalizing {}", file.display()))?;
            let mut feed = FeedSpider::new(spider, config.tz()?);
            if let Some(agency) = agency {
                feed = feed.with_agency(agency);
            }
            let finalized = scraping::finalize_all(&feed, events);
            emit(output.as_deref(), &finalized)?;
        }
    }
    Ok(())
}

/// Same contract `migrate` enforces: every event names at least one source url.
fn require_sources(events: &[Event]) -> Result<(), MigrationError> {
    match events.iter().find(|event| event.first_source().is_none()) {
        Some(event) => Err(MigrationError::MissingSource(event.name.clone())),
        None => Ok(()),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "feed".to_string())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("unable to read {}", path.display()))?;
    if contents.trim().is_empty() {
        bail!("{} was empty", path.display());
    }
    serde_json::from_str(&contents).with_context(|| format!("unable to decode {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_json::to_string_pretty(value)?;
    fs::write(path, contents).with_context(|| format!("unable to write {}", path.display()))
}

fn emit<T: Serialize + ?Sized>(output: Option<&Path>, value: &T) -> Result<()> {
    match output {
        Some(path) => write_json(path, value),
        None => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        }
    }
}
