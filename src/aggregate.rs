use crate::error::{CropcastError, Result};
use crate::structs::{Cell, ClimateRecord, Dataset};
use chrono::Month;
use log::debug;
use serde::Serialize;

/// The three season buckets, in output-column order.
pub const SEASONS: [Season; 3] = [Season::Summer, Season::Monsoon, Season::Winter];

/// A fixed grouping of calendar months used to aggregate monthly maxima.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Summer,
    Monsoon,
    Winter,
}

impl Season {
    pub fn name(self) -> &'static str {
        match self {
            Season::Summer => "Summer",
            Season::Monsoon => "Monsoon",
            Season::Winter => "Winter",
        }
    }

    /// Candidate months for this season. Fixed configuration, not derived
    /// from the data; a dataset may lack any subset of these columns.
    pub fn months(self) -> &'static [Month] {
        match self {
            Season::Summer => &[Month::March, Month::April, Month::May],
            Season::Monsoon => &[Month::June, Month::July, Month::August, Month::September],
            Season::Winter => &[
                Month::October,
                Month::November,
                Month::December,
                Month::January,
                Month::February,
            ],
        }
    }
}

/// One output row: a per-season aggregate for one source record.
///
/// A value is NaN when none of the season's candidate columns carried
/// usable data for the row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SeasonalRow {
    pub summer: f64,
    pub monsoon: f64,
    pub winter: f64,
}

impl SeasonalRow {
    fn absent() -> Self {
        Self {
            summer: f64::NAN,
            monsoon: f64::NAN,
            winter: f64::NAN,
        }
    }

    pub fn value(&self, season: Season) -> f64 {
        match season {
            Season::Summer => self.summer,
            Season::Monsoon => self.monsoon,
            Season::Winter => self.winter,
        }
    }

    fn set(&mut self, season: Season, value: f64) {
        match season {
            Season::Summer => self.summer = value,
            Season::Monsoon => self.monsoon = value,
            Season::Winter => self.winter = value,
        }
    }
}

/// Min/mean/max of a season column, used to bound an adjustable input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Per-season aggregates for every record of one district, in the
/// district rows' original order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalAverageTable {
    pub rows: Vec<SeasonalRow>,
}

impl SeasonalAverageTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Min/mean/max over a season's non-absent values.
    ///
    /// Returns `None` when the season has no usable values at all, e.g.
    /// every candidate column was missing from the dataset.
    pub fn season_range(&self, season: Season) -> Option<ValueRange> {
        let values: Vec<f64> = self
            .rows
            .iter()
            .map(|row| row.value(season))
            .filter(|v| !v.is_nan())
            .collect();
        if values.is_empty() {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Some(ValueRange { min, max, mean })
    }
}

/// Computes the seasonal average table for one district.
///
/// Filters the dataset to the requested district (trim-insensitive on
/// both sides), then aggregates the monthly maximum-temperature columns
/// into one Summer/Monsoon/Winter value per row:
///
/// 1. A season's candidate columns are intersected with the columns the
///    dataset actually has; a season left with none stays NaN for every
///    row rather than degrading to zero.
/// 2. Within each present column, non-numeric and empty cells are filled
///    with the column's mean over the district rows. The mean ignores the
///    absences themselves; a column with no numeric values at all keeps
///    them absent.
/// 3. The season value of a row is the mean across its post-fill
///    candidate cells, skipping cells that are still absent.
///
/// The input dataset is not modified, and row order is preserved so
/// callers can line derived values back up with the source rows.
///
/// # Errors
///
/// Returns `CropcastError::NoDistrictData` when no record matches the
/// requested district. This is a reportable condition for the caller to
/// surface, not a failure of the computation itself.
pub fn seasonal_average(dataset: &Dataset, district: &str) -> Result<SeasonalAverageTable> {
    let wanted = district.trim();
    let rows: Vec<&ClimateRecord> = dataset
        .records
        .iter()
        .filter(|record| record.district == wanted)
        .collect();

    if rows.is_empty() {
        return Err(CropcastError::NoDistrictData(wanted.to_string()));
    }
    debug!("{} rows match district {}", rows.len(), wanted);

    let mut table = vec![SeasonalRow::absent(); rows.len()];
    for season in SEASONS {
        let months: Vec<Month> = season
            .months()
            .iter()
            .copied()
            .filter(|month| dataset.months.contains(month))
            .collect();
        if months.is_empty() {
            debug!("No {} columns in dataset, season stays absent", season.name());
            continue;
        }

        // Coerce each candidate column, then mean-impute its absences.
        let columns: Vec<Vec<Option<f64>>> = months
            .iter()
            .map(|month| {
                let mut column: Vec<Option<f64>> = rows
                    .iter()
                    .map(|record| record.monthly_max.get(month).and_then(Cell::as_number))
                    .collect();
                let numeric: Vec<f64> = column.iter().flatten().copied().collect();
                if !numeric.is_empty() {
                    let mean = numeric.iter().sum::<f64>() / numeric.len() as f64;
                    for cell in column.iter_mut() {
                        if cell.is_none() {
                            *cell = Some(mean);
                        }
                    }
                }
                column
            })
            .collect();

        for (i, out) in table.iter_mut().enumerate() {
            let values: Vec<f64> = columns.iter().filter_map(|column| column[i]).collect();
            let value = if values.is_empty() {
                f64::NAN
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            };
            out.set(season, value);
        }
    }

    Ok(SeasonalAverageTable { rows: table })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::read_dataset;
    use std::io::Cursor;

    fn dataset(csv: &str) -> Dataset {
        read_dataset(Cursor::new(csv.to_string())).expect("dataset should load")
    }

    fn rows_eq(a: &SeasonalRow, b: &SeasonalRow) -> bool {
        let eq = |x: f64, y: f64| (x.is_nan() && y.is_nan()) || x == y;
        eq(a.summer, b.summer) && eq(a.monsoon, b.monsoon) && eq(a.winter, b.winter)
    }

    const TWO_ROW_SUMMER: &str = "\
Dist Name,MARCH MAXIMUM (Centigrate),APRIL MAXIMUM (Centigrate)
X,10,20
X,30,n/a
";

    #[test]
    fn imputes_non_numeric_cells_with_column_mean() {
        let table = seasonal_average(&dataset(TWO_ROW_SUMMER), "X").unwrap();
        assert_eq!(table.len(), 2);
        // Row 1: (10 + 20) / 2. Row 2: April imputes to mean of {20}.
        assert_eq!(table.rows[0].summer, 15.0);
        assert_eq!(table.rows[1].summer, 25.0);
    }

    #[test]
    fn seasons_without_columns_stay_absent() {
        let table = seasonal_average(&dataset(TWO_ROW_SUMMER), "X").unwrap();
        for row in &table.rows {
            assert!(row.monsoon.is_nan());
            assert!(row.winter.is_nan());
        }
    }

    #[test]
    fn unknown_district_signals_no_data() {
        let result = seasonal_average(&dataset(TWO_ROW_SUMMER), "Y");
        assert!(matches!(
            result,
            Err(CropcastError::NoDistrictData(district)) if district == "Y"
        ));
    }

    #[test]
    fn district_matching_is_trim_insensitive() {
        let csv = "\
Dist Name,MARCH MAXIMUM (Centigrate)
  X  ,12
X,18
Other,99
";
        let table = seasonal_average(&dataset(csv), " X ").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].summer, 12.0);
        assert_eq!(table.rows[1].summer, 18.0);
    }

    #[test]
    fn row_order_follows_the_source() {
        let csv = "\
Dist Name,MARCH MAXIMUM (Centigrate)
X,1
Other,50
X,2
X,3
";
        let table = seasonal_average(&dataset(csv), "X").unwrap();
        let summers: Vec<f64> = table.rows.iter().map(|r| r.summer).collect();
        assert_eq!(summers, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn entirely_unusable_column_is_skipped_in_the_row_mean() {
        let csv = "\
Dist Name,MARCH MAXIMUM (Centigrate),APRIL MAXIMUM (Centigrate)
X,10,n/a
X,20,
";
        let table = seasonal_average(&dataset(csv), "X").unwrap();
        // April never coerces, so its mean is undefined and the fill is a
        // no-op; the row mean falls back to March alone.
        assert_eq!(table.rows[0].summer, 10.0);
        assert_eq!(table.rows[1].summer, 20.0);
    }

    #[test]
    fn compute_is_idempotent() {
        let ds = dataset(TWO_ROW_SUMMER);
        let first = seasonal_average(&ds, "X").unwrap();
        let second = seasonal_average(&ds, "X").unwrap();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.rows.iter().zip(&second.rows) {
            assert!(rows_eq(a, b));
        }
    }

    #[test]
    fn season_range_summarizes_non_absent_values() {
        let table = seasonal_average(&dataset(TWO_ROW_SUMMER), "X").unwrap();
        let range = table.season_range(Season::Summer).unwrap();
        assert_eq!(range.min, 15.0);
        assert_eq!(range.max, 25.0);
        assert_eq!(range.mean, 20.0);
        assert!(table.season_range(Season::Winter).is_none());
    }

    #[test]
    fn monsoon_and_winter_aggregate_their_own_months() {
        let csv = "\
Dist Name,JUNE MAXIMUM (Centigrate),JULY MAXIMUM (Centigrate),OCTOBER MAXIMUM (Centigrate)
X,30,34,26
";
        let table = seasonal_average(&dataset(csv), "X").unwrap();
        assert_eq!(table.rows[0].monsoon, 32.0);
        assert_eq!(table.rows[0].winter, 26.0);
        assert!(table.rows[0].summer.is_nan());
    }
}
