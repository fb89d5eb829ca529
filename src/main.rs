mod analysis;
mod anomaly;
mod config;
mod data;
mod error;
mod manager;
mod model;
mod normality;
mod profile;
mod stats;
mod synth;
mod trend;
mod weather;

use crate::manager::{LiveStatus, Manager};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a synthetic historical dataset.
    Generate {
        #[arg(long)]
        output: PathBuf,

        #[arg(long, value_delimiter = ',', default_value = "Berlin,Cairo,Moscow,Tokyo")]
        cities: Vec<String>,

        #[arg(long, default_value = "2010-01-01")]
        start: NaiveDate,

        #[arg(long, default_value_t = 10)]
        years: usize,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Analyze historical series per city.
    Analyze {
        #[arg(long)]
        data: PathBuf,

        /// City to analyze (repeatable); all cities when omitted.
        #[arg(long = "city")]
        cities: Vec<String>,

        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long)]
        parallel: bool,
    },

    /// Classify the current temperature of a city against its seasonal norm.
    Check {
        #[arg(long)]
        data: PathBuf,

        #[arg(long)]
        city: String,

        #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
        api_key: String,
    },

    /// Time sequential against concurrent weather requests.
    Compare {
        #[arg(long = "city", required = true)]
        cities: Vec<String>,

        #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
        api_key: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli().await {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    let args = CLI::parse();

    let mgr = Manager::new(args.config.as_deref()).context("failed to construct mgr")?;

    match args.command {
        Command::Generate {
            output,
            cities,
            start,
            years,
            seed,
        } => mgr.generate_data(&output, &cities, start, years, seed)?,
        Command::Analyze {
            data,
            cities,
            output,
            parallel,
        } => {
            mgr.analyze(&data, &cities, output, parallel).await?;
        }
        Command::Check { data, city, api_key } => {
            let status = mgr.check_live(&data, &city, &api_key).await?;
            println!(
                "{city}: {}",
                match status {
                    LiveStatus::Normal => "normal",
                    LiveStatus::Anomalous => "anomalous",
                }
            );
        }
        Command::Compare { cities, api_key } => mgr.compare_fetch(&cities, &api_key).await?,
    }

    Ok(())
}
