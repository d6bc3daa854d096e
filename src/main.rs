use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use disaster_risk::analysis;
use disaster_risk::config::AppConfig;
use disaster_risk::engine;
use disaster_risk::ingest::{self, UnavailableExtractor};
use disaster_risk::live::LiveWeatherFeed;
use disaster_risk::manual;
use disaster_risk::models::{
    CurrentConditions, Dataset, DisasterType, Factor, PredictionInput, PredictionResult,
};
use disaster_risk::report;
use disaster_risk::seed;
use disaster_risk::store::{DatasetStore, PredictionLog, Store};
use disaster_risk::EngineError;

#[derive(Parser)]
#[command(name = "disaster-risk")]
#[command(about = "Heuristic disaster risk scoring from environmental readings", long_about = None)]
struct Cli {
    /// JSON store path, used when no database URL is configured
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    /// Postgres connection string (overrides DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct ConditionArgs {
    #[arg(long, default_value_t = 0.0)]
    rainfall: f64,
    #[arg(long, default_value_t = 25.0)]
    temperature: f64,
    #[arg(long, default_value_t = 60.0)]
    humidity: f64,
    #[arg(long, default_value_t = 10.0)]
    wind_speed: f64,
    #[arg(long, default_value_t = 1013.0)]
    pressure: f64,
    /// People per square kilometre; 0 uses the location's typical density
    #[arg(long, default_value_t = 0.0)]
    population_density: f64,
}

impl From<ConditionArgs> for CurrentConditions {
    fn from(args: ConditionArgs) -> Self {
        CurrentConditions {
            rainfall: args.rainfall,
            temperature: args.temperature,
            humidity: args.humidity,
            wind_speed: args.wind_speed,
            pressure: args.pressure,
            population_density: args.population_density,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the storage schema
    InitDb,
    /// Store a demo monsoon dataset
    Seed,
    /// Import a CSV (or document) dataset
    Import {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    /// List stored datasets
    Datasets,
    /// Delete a stored dataset
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Show correlation, pattern and seasonal analysis for a dataset
    Analyze {
        #[arg(long)]
        dataset: Uuid,
        #[arg(long, default_value = "flood")]
        disaster: DisasterType,
        #[arg(long, default_value = "")]
        location: String,
    },
    /// Predict risk from a dataset, or from fixed rules when no dataset is given
    Predict {
        #[arg(long)]
        dataset: Option<Uuid>,
        #[arg(long, default_value = "flood")]
        disaster: DisasterType,
        #[arg(long, default_value = "")]
        location: String,
        #[command(flatten)]
        conditions: ConditionArgs,
        /// Seed for the population variance of the rule-based path
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Generate a markdown report for a dataset prediction
    Report {
        #[arg(long)]
        dataset: Uuid,
        #[arg(long, default_value = "flood")]
        disaster: DisasterType,
        #[arg(long, default_value = "")]
        location: String,
        #[command(flatten)]
        conditions: ConditionArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Score simulated live readings on a fixed interval
    Live {
        #[arg(long)]
        location: String,
        #[arg(long, default_value = "flood")]
        disaster: DisasterType,
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,
        #[arg(long, default_value_t = 3)]
        ticks: u32,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show recent predictions
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(value) => StdRng::seed_from_u64(value),
        None => StdRng::from_entropy(),
    }
}

fn print_result(result: &PredictionResult) {
    println!(
        "{} risk for {}: {} ({}) confidence {}% [{}]",
        result.disaster,
        if result.location.is_empty() { "all locations" } else { result.location.as_str() },
        result.risk_score,
        result.risk_level().as_str(),
        result.confidence,
        result.source.as_str()
    );
    println!("Expected within {}; est. {} people affected", result.timeline, result.affected_population);
    println!("Recommendations:");
    for line in result.recommendations.iter() {
        println!("- {line}");
    }
    println!("Reasoning:");
    for line in result.reasoning.iter() {
        println!("- {line}");
    }
}

async fn load_dataset(store: &Store, id: Uuid) -> anyhow::Result<Dataset> {
    store
        .find_dataset(id)
        .await?
        .ok_or(EngineError::DatasetNotFound(id))
        .map_err(anyhow::Error::from)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().map_err(anyhow::Error::msg)?;
    if let Some(path) = cli.store {
        config.store_path = path;
    }
    if cli.database_url.is_some() {
        config.database_url = cli.database_url;
    }

    let store = Store::open(&config).await?;
    info!("using {}", store.describe());
    let today = Utc::now().date_naive();

    match cli.command {
        Commands::InitDb => {
            store.init().await?;
            println!("Storage ready.");
        }
        Commands::Seed => {
            let dataset = seed::demo_dataset();
            store.save_dataset(&dataset).await?;
            println!("Seed dataset {} stored ({} records).", dataset.id, dataset.records.len());
        }
        Commands::Import { file, name } => {
            let dataset = ingest::import_file(
                &file,
                name.as_deref(),
                &config.import_limits(),
                &UnavailableExtractor,
            )
            .await
            .with_context(|| format!("failed to import {}", file.display()))?;
            store.save_dataset(&dataset).await?;
            println!(
                "Imported {} records from {} as dataset {}.",
                dataset.records.len(),
                file.display(),
                dataset.id
            );
        }
        Commands::Datasets => {
            let datasets = store.stored_datasets().await?;
            if datasets.is_empty() {
                println!("No datasets stored.");
                return Ok(());
            }
            for dataset in datasets.iter() {
                println!(
                    "- {} \"{}\" ({}, {} records, uploaded {})",
                    dataset.id,
                    dataset.name,
                    dataset.source.as_str(),
                    dataset.summary.total_records,
                    dataset.uploaded_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Commands::Delete { id } => {
            if store.delete_dataset(id).await? {
                println!("Deleted dataset {id}.");
            } else {
                println!("No dataset with id {id}.");
            }
        }
        Commands::Analyze {
            dataset,
            disaster,
            location,
        } => {
            let dataset = load_dataset(&store, dataset).await?;
            let history: Vec<_> = engine::records_for_location(&dataset.records, &location)
                .into_iter()
                .cloned()
                .collect();
            let analysis = analysis::analyze(&history, disaster);

            println!("{} analysis over {} records:", disaster, analysis.record_count);
            for factor in Factor::ALL {
                println!(
                    "- {}: correlation {:.2}, trend {:.3}",
                    factor.label(),
                    analysis.correlation(factor),
                    analysis.trends.get(&factor).copied().unwrap_or(0.0)
                );
            }
            for pattern in analysis.risk_patterns.iter() {
                println!("High-risk pattern observed {} times", pattern.occurrences);
            }
            println!("Seasonal factors: {:?}", analysis.seasonal_factors.0);
            println!("Confidence: {:.0}%", analysis.confidence);
        }
        Commands::Predict {
            dataset,
            disaster,
            location,
            conditions,
            seed,
        } => {
            let input = PredictionInput {
                disaster,
                location,
                conditions: conditions.into(),
            };
            let result = match dataset {
                Some(id) => {
                    let dataset = load_dataset(&store, id).await?;
                    engine::predict_or_fallback(&dataset, &input, &config.engine_settings(), today)?
                }
                None => manual::predict_manual(&input, &mut rng_from(seed))?,
            };
            print_result(&result);
            store.record_prediction(&result).await?;
        }
        Commands::Report {
            dataset,
            disaster,
            location,
            conditions,
            out,
        } => {
            let dataset = load_dataset(&store, dataset).await?;
            let input = PredictionInput {
                disaster,
                location,
                conditions: conditions.into(),
            };
            let result =
                engine::predict_or_fallback(&dataset, &input, &config.engine_settings(), today)?;
            let report = report::build_report(&dataset, &result);
            tokio::fs::write(&out, report)
                .await
                .with_context(|| format!("failed to write {}", out.display()))?;
            store.record_prediction(&result).await?;
            println!("Report written to {}.", out.display());
        }
        Commands::Live {
            location,
            disaster,
            interval_secs,
            ticks,
            seed,
        } => {
            let mut feed = LiveWeatherFeed::new(config.weather_api_key.clone(), rng_from(seed));
            let mut variance_rng = rng_from(seed.map(|s| s.wrapping_add(1)));
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

            for tick in 1..=ticks {
                interval.tick().await;
                let reading = feed.fetch(&location);
                let input = PredictionInput {
                    disaster,
                    location: location.clone(),
                    conditions: reading.conditions,
                };
                let result = manual::predict_manual(&input, &mut variance_rng)?;
                println!(
                    "[{}] tick {tick}/{ticks} via {}: rain {:.1} mm, wind {:.1} km/h, pressure {:.1} hPa",
                    reading.observed_at.format("%H:%M:%S"),
                    reading.provider,
                    reading.conditions.rainfall,
                    reading.conditions.wind_speed,
                    reading.conditions.pressure
                );
                print_result(&result);
                store.record_prediction(&result).await?;
            }
        }
        Commands::History { limit } => {
            let history = store.prediction_history(limit).await?;
            if history.is_empty() {
                println!("No predictions recorded.");
                return Ok(());
            }
            for result in history.iter() {
                println!(
                    "- {} {} {} score {} ({}) confidence {}%",
                    result.generated_at.format("%Y-%m-%d %H:%M"),
                    result.disaster,
                    if result.location.is_empty() { "all" } else { result.location.as_str() },
                    result.risk_score,
                    result.source.as_str(),
                    result.confidence
                );
            }
        }
    }

    Ok(())
}
