//! Rolling-origin backtesting CLI.
//!
//! # Usage
//!
//! ```bash
//! # Evaluate one model on a built-in dataset
//! rolling-origin evaluate --dataset AirPassengers --model naive-seasonal --stride 1
//!
//! # Evaluate a local CSV with an explicit schedule
//! rolling-origin evaluate --csv data/sales.csv --time-column Month --value-column Sales \
//!     --time-format %Y-%m --model naive-drift --stride 5 --horizon 3
//!
//! # Rank the stock candidates
//! rolling-origin select --dataset AirPassengers --metric mae --stride 1 --seasonal-periods 12
//!
//! # List the built-in datasets
//! rolling-origin datasets
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use rolling_origin::datasets::{self, DatasetLoader};
use rolling_origin::evaluation::{
    evaluate_report, select_best, Candidate, EvaluationConfig, Origin,
};
use rolling_origin::models::{BoxedForecaster, ExpSmoothing, NaiveDrift, NaiveMean, NaiveSeasonal};
use rolling_origin::series::TimeSeries;

const SEPARATOR: &str = "============================================================";

/// Rolling-origin backtesting CLI.
#[derive(Parser)]
#[command(name = "rolling-origin")]
#[command(about = "Backtest forecasting models with rolling-origin evaluation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Dataset cache directory (defaults to $ROLLING_ORIGIN_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one model over a rolling-origin schedule
    Evaluate {
        #[command(flatten)]
        source: SourceArgs,

        /// Model: naive-mean, naive-seasonal, naive-drift, exp-smoothing,
        /// seasonal-exp-smoothing
        #[arg(long, default_value = "naive-seasonal")]
        model: String,

        /// Seasonal period used by the seasonal models
        #[arg(long, default_value_t = 12)]
        seasonal_periods: usize,

        #[command(flatten)]
        schedule: ScheduleArgs,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate the stock candidate set and rank it
    Select {
        #[command(flatten)]
        source: SourceArgs,

        /// Seasonal period used by the seasonal candidates
        #[arg(long, default_value_t = 12)]
        seasonal_periods: usize,

        #[command(flatten)]
        schedule: ScheduleArgs,

        /// Print the ranking as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in datasets and their cache state
    Datasets,
}

#[derive(Args)]
struct SourceArgs {
    /// Built-in dataset name
    #[arg(long, conflicts_with = "csv")]
    dataset: Option<String>,

    /// Local CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Time column of a local CSV
    #[arg(long, default_value = "date")]
    time_column: String,

    /// Value column of a local CSV
    #[arg(long, default_value = "value")]
    value_column: String,

    /// strftime format of the time column
    #[arg(long, default_value = "%Y-%m-%d")]
    time_format: String,
}

#[derive(Args)]
struct ScheduleArgs {
    /// Error metric (mae, mse, rmse, rmsle, mape, smape, marre, ope)
    #[arg(long, default_value = "mape")]
    metric: String,

    /// Step between consecutive origins
    #[arg(long)]
    stride: Option<usize>,

    /// Number of forecasting origins
    #[arg(long)]
    n_prediction_steps: Option<usize>,

    /// First origin, as a position or a YYYY-MM-DD date
    #[arg(long)]
    first_origin: Option<String>,

    /// Steps forecast at each origin
    #[arg(long, default_value_t = 1)]
    horizon: usize,
}

impl ScheduleArgs {
    fn to_config(&self) -> Result<EvaluationConfig> {
        let mut config = EvaluationConfig::new()
            .with_metric(self.metric.as_str())
            .with_forecast_horizon(self.horizon);
        if let Some(stride) = self.stride {
            config = config.with_stride(stride);
        }
        if let Some(steps) = self.n_prediction_steps {
            config = config.with_n_prediction_steps(steps);
        }
        if let Some(raw) = &self.first_origin {
            config = config.with_first_origin(parse_origin(raw)?);
        }
        Ok(config)
    }
}

fn parse_origin(raw: &str) -> Result<Origin> {
    if let Ok(position) = raw.parse::<usize>() {
        return Ok(Origin::Position(position));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .context("first origin must be a position or a YYYY-MM-DD date")?;
    Ok(Origin::Date(date))
}

fn build_model(name: &str, seasonal_periods: usize) -> Result<BoxedForecaster> {
    let model: BoxedForecaster = match name {
        "naive-mean" => Box::new(NaiveMean::new()),
        "naive-seasonal" => Box::new(NaiveSeasonal::new(seasonal_periods)),
        "naive-drift" => Box::new(NaiveDrift::new()),
        "exp-smoothing" => Box::new(ExpSmoothing::default()),
        "seasonal-exp-smoothing" => {
            Box::new(ExpSmoothing::default().with_seasonal_periods(seasonal_periods))
        }
        other => bail!("unknown model '{}'", other),
    };
    Ok(model)
}

fn load_series(source: &SourceArgs, data_dir: Option<&PathBuf>) -> Result<TimeSeries> {
    if let Some(path) = &source.csv {
        return datasets::read_csv(
            path,
            &source.time_column,
            &source.value_column,
            &source.time_format,
        )
        .with_context(|| format!("failed to read {}", path.display()));
    }

    let name = match &source.dataset {
        Some(name) => name,
        None => bail!("provide --dataset or --csv"),
    };
    let loader = match data_dir {
        Some(dir) => DatasetLoader::with_cache_dir(dir),
        None => DatasetLoader::new(),
    };
    loader
        .load_by_name(name)
        .with_context(|| format!("failed to load dataset '{}'", name))
}

fn cmd_evaluate(
    source: &SourceArgs,
    data_dir: Option<&PathBuf>,
    model_name: &str,
    seasonal_periods: usize,
    schedule: &ScheduleArgs,
    json: bool,
) -> Result<()> {
    let series = load_series(source, data_dir)?;
    let mut model = build_model(model_name, seasonal_periods)?;
    let config = schedule.to_config()?;
    let report = evaluate_report(&series, &mut model, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", SEPARATOR);
    println!("Rolling-origin evaluation: {}", report.model);
    println!("{}", SEPARATOR);
    println!("  Series length: {}", series.len());
    println!("  Metric: {}", report.metric);
    println!("  Windows: {}", report.windows.len());
    for window in &report.windows {
        println!(
            "    origin {:>5}  horizon {:>4}  score {}",
            window.origin, window.horizon, window.score
        );
    }
    println!("\n  Aggregate: {}", report.aggregate);
    Ok(())
}

fn cmd_select(
    source: &SourceArgs,
    data_dir: Option<&PathBuf>,
    seasonal_periods: usize,
    schedule: &ScheduleArgs,
    json: bool,
) -> Result<()> {
    let series = load_series(source, data_dir)?;
    let config = schedule.to_config()?;
    let candidates = Candidate::baseline_set(seasonal_periods);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Evaluating {} candidates...", candidates.len()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    let outcome = select_best(&series, &candidates, &config);
    spinner.finish_and_clear();
    let report = outcome?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", SEPARATOR);
    println!("Candidate ranking by {}", schedule.metric);
    println!("{}", SEPARATOR);
    for (rank, outcome) in report.outcomes.iter().enumerate() {
        println!("  {:>2}. {:<24} {}", rank + 1, outcome.name, outcome.score);
    }
    if let Some(mean) = report.score_mean {
        println!("\n  Mean finite score: {:.4}", mean);
    }
    if let Some(std) = report.score_std {
        println!("  Std dev: {:.4}", std);
    }
    println!("\n  Best: {}", report.best().name);
    Ok(())
}

fn cmd_datasets(data_dir: Option<&PathBuf>) -> Result<()> {
    let loader = match data_dir {
        Some(dir) => DatasetLoader::with_cache_dir(dir),
        None => DatasetLoader::new(),
    };

    println!("Built-in datasets (cache: {}):\n", loader.cache_dir().display());
    for metadata in datasets::builtin() {
        let state = if loader.cached_path(&metadata).exists() {
            "cached"
        } else {
            "not cached"
        };
        println!("  {:<16} {:<12} {}", metadata.name, state, metadata.uri);
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rolling_origin=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            source,
            model,
            seasonal_periods,
            schedule,
            json,
        } => {
            cmd_evaluate(
                &source,
                cli.data_dir.as_ref(),
                &model,
                seasonal_periods,
                &schedule,
                json,
            )?;
        }
        Commands::Select {
            source,
            seasonal_periods,
            schedule,
            json,
        } => {
            cmd_select(&source, cli.data_dir.as_ref(), seasonal_periods, &schedule, json)?;
        }
        Commands::Datasets => {
            cmd_datasets(cli.data_dir.as_ref())?;
        }
    }

    Ok(())
}
