//! Built-in benchmark datasets.
//!
//! Small classic forecasting series (air passengers, beer production, milk
//! yield) fetched over HTTP on first use and cached on disk:
//! - cache location: `$ROLLING_ORIGIN_DATA_DIR`, else `~/.rolling_origin/datasets`
//! - integrity: optional SHA-256 verified on every load; a mismatch evicts
//!   the cached file so the next load re-downloads
//! - format: CSV with one value column, dated by a time column or, for the
//!   undated members, by row order on the default daily index

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};

use crate::series::{SeriesError, TimeSeries};

/// Base URL the built-in catalog downloads from.
const DATASET_BASE_URL: &str = "https://raw.githubusercontent.com/unit8co/darts/master/datasets";

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("download of '{name}' failed: {source}")]
    Download {
        name: String,
        source: reqwest::Error,
    },

    #[error("checksum mismatch for '{name}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("cannot parse time value '{value}' with format '{format}'")]
    TimeParse { value: String, format: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Series error: {0}")]
    Series(#[from] SeriesError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where and how to fetch one dataset, and how to read its CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub name: String,
    pub uri: String,

    /// Hex-encoded SHA-256 of the raw file, when known.
    pub sha256: Option<String>,

    /// Time column; `None` dates the rows on the default daily index.
    pub time_column: Option<String>,

    /// Value column; `None` takes the single column left once the time
    /// column is excluded.
    pub value_column: Option<String>,

    /// strftime format of the time column. Formats without a day component
    /// anchor each period to its first day.
    pub time_format: Option<String>,
}

impl DatasetMetadata {
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<String>,
        time_column: impl Into<String>,
        value_column: impl Into<String>,
        time_format: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            sha256: None,
            time_column: Some(time_column.into()),
            value_column: Some(value_column.into()),
            time_format: Some(time_format.into()),
        }
    }

    /// Metadata for a CSV that carries no time column, only values in row
    /// order.
    pub fn sequential(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            sha256: None,
            time_column: None,
            value_column: None,
            time_format: None,
        }
    }

    pub fn with_sha256(mut self, digest: impl Into<String>) -> Self {
        self.sha256 = Some(digest.into());
        self
    }
}

/// The built-in catalog.
pub fn builtin() -> Vec<DatasetMetadata> {
    let entry = |name: &str, time_column: &str, value_column: &str, time_format: &str| {
        DatasetMetadata::new(
            name,
            format!("{}/{}.csv", DATASET_BASE_URL, name),
            time_column,
            value_column,
            time_format,
        )
    };
    let sequential = |name: &str| {
        DatasetMetadata::sequential(name, format!("{}/{}.csv", DATASET_BASE_URL, name))
    };
    vec![
        entry("AirPassengers", "Month", "#Passengers", "%Y-%m"),
        entry("ausbeer", "date", "Y", "%Y-%m-%d"),
        sequential("heart_rate"),
        entry("monthly-milk", "Month", "Pounds per cow", "%Y-%m"),
        entry("sunspots", "Month", "Sunspots", "%Y-%m-%d"),
        sequential("taylor"),
        entry("temps", "Date", "Daily minimum temperatures", "%m/%d/%Y"),
        entry("us_gasoline", "Week", "Gasoline", "%m/%d/%Y"),
        entry("wineind", "date", "Y", "%Y-%m-%d"),
        entry("woolyrnq", "date", "Y", "%Y-%m-%d"),
    ]
}

/// Look up a built-in dataset by name, case-insensitively.
pub fn by_name(name: &str) -> Option<DatasetMetadata> {
    builtin().into_iter().find(|d| d.name.eq_ignore_ascii_case(name))
}

/// Downloads datasets into a local cache and parses them into series.
pub struct DatasetLoader {
    cache_dir: PathBuf,
}

impl DatasetLoader {
    /// Create a loader over the default cache directory.
    pub fn new() -> Self {
        Self {
            cache_dir: default_cache_dir(),
        }
    }

    /// Create a loader over an explicit cache directory.
    pub fn with_cache_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path the dataset is cached at.
    pub fn cached_path(&self, metadata: &DatasetMetadata) -> PathBuf {
        self.cache_dir.join(format!("{}.csv", metadata.name))
    }

    /// Load a dataset, downloading it on a cache miss.
    ///
    /// When the metadata carries a checksum it is verified on every load; a
    /// mismatching cached file is removed before the error returns, so the
    /// next load starts from a fresh download.
    pub fn load(&self, metadata: &DatasetMetadata) -> Result<TimeSeries, DatasetError> {
        let path = self.cached_path(metadata);
        if path.exists() {
            debug!("Dataset {} found in cache at {}", metadata.name, path.display());
        } else {
            self.download(metadata, &path)?;
        }

        if let Some(expected) = &metadata.sha256 {
            let actual = file_sha256(&path)?;
            if !actual.eq_ignore_ascii_case(expected) {
                std::fs::remove_file(&path)?;
                return Err(DatasetError::ChecksumMismatch {
                    name: metadata.name.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        parse_csv(&path, metadata)
    }

    /// Load a built-in dataset by catalog name.
    pub fn load_by_name(&self, name: &str) -> Result<TimeSeries, DatasetError> {
        let metadata =
            by_name(name).ok_or_else(|| DatasetError::UnknownDataset(name.to_string()))?;
        self.load(&metadata)
    }

    fn download(&self, metadata: &DatasetMetadata, path: &Path) -> Result<(), DatasetError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        info!("Downloading dataset {} from {}", metadata.name, metadata.uri);
        let wrap = |source: reqwest::Error| DatasetError::Download {
            name: metadata.name.clone(),
            source,
        };
        let response = reqwest::blocking::get(&metadata.uri)
            .and_then(|r| r.error_for_status())
            .map_err(wrap)?;
        let bytes = response.bytes().map_err(wrap)?;
        std::fs::write(path, &bytes)?;
        Ok(())
    }
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a local CSV without going through the cache.
pub fn read_csv(
    path: impl AsRef<Path>,
    time_column: &str,
    value_column: &str,
    time_format: &str,
) -> Result<TimeSeries, DatasetError> {
    let metadata = DatasetMetadata::new("local", "", time_column, value_column, time_format);
    parse_csv(path.as_ref(), &metadata)
}

fn default_cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ROLLING_ORIGIN_DATA_DIR") {
        return PathBuf::from(dir);
    }
    match std::env::var("HOME") {
        Ok(home) => Path::new(&home).join(".rolling_origin").join("datasets"),
        Err(_) => PathBuf::from(".rolling_origin/datasets"),
    }
}

fn file_sha256(path: &Path) -> Result<String, DatasetError> {
    let bytes = std::fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

fn parse_csv(path: &Path, metadata: &DatasetMetadata) -> Result<TimeSeries, DatasetError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let value_col = match &metadata.value_column {
        Some(name) => df
            .column(name)
            .map_err(|_| DatasetError::MissingColumn(name.clone()))?,
        None => single_value_column(&df, metadata.time_column.as_deref())?,
    };
    let values = value_col.cast(&DataType::Float64)?;
    let values = values.f64()?;
    let mut data = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let value = values
            .get(i)
            .ok_or_else(|| DatasetError::InvalidData(format!("null value at row {}", i)))?;
        data.push(value);
    }

    let time_column = match &metadata.time_column {
        Some(column) => column,
        None => return Ok(TimeSeries::from_values(data)?),
    };
    let format = metadata.time_format.as_deref().ok_or_else(|| {
        DatasetError::InvalidData(format!("time column '{}' has no parse format", time_column))
    })?;

    let time_col = df
        .column(time_column)
        .map_err(|_| DatasetError::MissingColumn(time_column.clone()))?;
    let times = time_col.str().map_err(|_| {
        DatasetError::InvalidData(format!("time column '{}' is not text", time_column))
    })?;
    let mut index = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let raw = times
            .get(i)
            .ok_or_else(|| DatasetError::InvalidData(format!("null time at row {}", i)))?;
        index.push(parse_time(raw, format)?);
    }

    Ok(TimeSeries::new(index, data)?)
}

fn single_value_column<'a>(
    df: &'a DataFrame,
    time_column: Option<&str>,
) -> Result<&'a Series, DatasetError> {
    let mut candidates = df
        .get_columns()
        .iter()
        .filter(|c| Some(c.name().as_str()) != time_column);
    match (candidates.next(), candidates.next()) {
        (Some(column), None) => Ok(column),
        _ => Err(DatasetError::InvalidData(
            "expected a single value column".to_string(),
        )),
    }
}

/// Parse one time value. A format without a day component gets the period
/// anchored to its first day.
fn parse_time(raw: &str, format: &str) -> Result<NaiveDate, DatasetError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
        return Ok(date);
    }
    let padded = format!("{}-01", raw);
    let padded_format = format!("{}-%d", format);
    NaiveDate::parse_from_str(&padded, &padded_format).map_err(|_| DatasetError::TimeParse {
        value: raw.to_string(),
        format: format.to_string(),
    })
}
