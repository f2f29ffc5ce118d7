use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{BoundaryConvention, BracketSchedule, ScheduleBook, ScheduleError, TaxBracket};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading bracket schedules.
#[derive(Debug, Error)]
pub enum ScheduleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("schedule for tax year {year} is invalid: {source}")]
    InvalidSchedule {
        year: i32,
        #[source]
        source: ScheduleError,
    },

    #[error("no bracket rows found")]
    NoRecords,
}

impl From<csv::Error> for ScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        ScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from a bracket schedule CSV file.
///
/// - `tax_year`: first year the schedule applies to (e.g., 2024)
/// - `lower_bound`: where the bracket begins
/// - `upper_bound`: where the bracket ends (empty for unlimited)
/// - `rate`: the marginal rate as a fraction (e.g., 0.05 for 5%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for bracket schedules stored as CSV.
///
/// Rows may appear in any order; they are grouped by tax year and sorted by
/// lower bound before validation.
pub struct ScheduleLoader;

impl ScheduleLoader {
    /// Parse bracket records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, ScheduleLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        debug!(count = records.len(), "parsed bracket records");
        Ok(records)
    }

    /// Group records by tax year and validate each group as a schedule.
    pub fn build_book(
        records: &[BracketRecord],
        convention: BoundaryConvention,
    ) -> Result<ScheduleBook, ScheduleLoaderError> {
        if records.is_empty() {
            return Err(ScheduleLoaderError::NoRecords);
        }

        let mut groups: BTreeMap<i32, Vec<TaxBracket>> = BTreeMap::new();
        for record in records {
            groups.entry(record.tax_year).or_default().push(TaxBracket {
                lower_bound: record.lower_bound,
                upper_bound: record.upper_bound,
                rate: record.rate,
            });
        }

        let mut book = ScheduleBook::new();
        for (year, mut brackets) in groups {
            brackets.sort_by(|a, b| a.lower_bound.cmp(&b.lower_bound));

            let schedule = BracketSchedule::new(brackets, convention)
                .map_err(|source| ScheduleLoaderError::InvalidSchedule { year, source })?;
            book.insert(year, schedule);
        }

        info!(years = book.len(), "loaded bracket schedules");
        Ok(book)
    }

    /// Read, parse and validate a schedule file.
    pub fn load_from_file(
        path: &Path,
        convention: BoundaryConvention,
    ) -> Result<ScheduleBook, ScheduleLoaderError> {
        let file = File::open(path).map_err(|source| ScheduleLoaderError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let records = Self::parse(file)?;
        Self::build_book(&records, convention)
    }
}
