use chrono::Month;
use log::{Log, Metadata, Record as LogRecord};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// Simple logger implementation
pub struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &LogRecord) {
        println!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

/// One validated cell of a numeric column.
///
/// Validation happens once at ingestion, so downstream code can tell
/// "present but not a number" apart from "empty" without re-parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    /// Present in the source file but not parseable as a number.
    NonNumeric(String),
    /// Empty cell.
    Missing,
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{:.2}", v),
            Cell::NonNumeric(raw) => write!(f, "{}", raw),
            Cell::Missing => Ok(()),
        }
    }
}

/// Climate data record for one district row
///
/// Monthly maximum temperatures are keyed by calendar month; a month is
/// present in the map iff its column exists in the source file. The four
/// adjustable columns are `None` when the file lacks them entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateRecord {
    pub district: String,
    pub monthly_max: HashMap<Month, Cell>,
    pub apparent_temp_mean: Option<Cell>,
    pub precipitation_sum: Option<Cell>,
    pub wind_speed_max: Option<Cell>,
    pub rice_irrigated_area: Option<Cell>,
}

/// A loaded dataset: validated records plus the set of monthly
/// maximum-temperature columns that were present in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub records: Vec<ClimateRecord>,
    pub months: HashSet<Month>,
}

impl Dataset {
    /// Sorted unique district names, for selection prompts.
    pub fn districts(&self) -> Vec<String> {
        let unique: BTreeSet<&str> = self.records.iter().map(|r| r.district.as_str()).collect();
        unique.into_iter().map(str::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Configuration for climate-condition adjustment
///
/// Each delta shifts every numeric value of its column; `None` leaves the
/// column untouched.
#[derive(Debug, Clone)]
pub struct AdjustConfig {
    pub temperature: Option<f64>,
    pub rainfall: Option<f64>,
    pub wind_speed: Option<f64>,
    pub soil_moisture: Option<f64>,
}

impl Default for AdjustConfig {
    fn default() -> Self {
        Self {
            temperature: None,
            rainfall: None,
            wind_speed: None,
            soil_moisture: None,
        }
    }
}

impl AdjustConfig {
    pub fn is_noop(&self) -> bool {
        self.temperature.is_none()
            && self.rainfall.is_none()
            && self.wind_speed.is_none()
            && self.soil_moisture.is_none()
    }
}
