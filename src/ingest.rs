use crate::error::{CropcastError, Result};
use crate::structs::{Cell, ClimateRecord, Dataset};
use chrono::Month;
use csv::Reader;
use log::debug;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Required district-name header.
pub const DISTRICT_COLUMN: &str = "Dist Name";

/// Adjustable climate columns (exact headers, post-trim).
pub const APPARENT_TEMP_COLUMN: &str = "apparent_temperature_mean";
pub const PRECIPITATION_COLUMN: &str = "precipitation_sum";
pub const WIND_SPEED_COLUMN: &str = "wind_speed_10m_max";
pub const RICE_AREA_COLUMN: &str = "RICE IRRIGATED AREA (1000 ha)";

const ALL_MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Header string of a month's maximum-temperature column.
///
/// The spelling matches the source dataset exactly, including the
/// "Centigrate" typo carried by its headers.
pub fn monthly_header(month: Month) -> String {
    format!("{} MAXIMUM (Centigrate)", month.name().to_uppercase())
}

/// Loads a climate dataset from a CSV file.
///
/// # Arguments
///
/// * `path` - Path to the input CSV file
///
/// # Returns
///
/// Returns a `Result<Dataset>` with one validated record per data row.
///
/// # Errors
///
/// Returns `CropcastError` if the file cannot be opened, the CSV is
/// malformed, or the required district column is missing.
pub fn load_csv(path: &Path) -> Result<Dataset> {
    debug!("Reading CSV file: {}", path.display());
    let file = File::open(path)?;
    read_dataset(file)
}

/// Reads a climate dataset from any CSV source.
///
/// Headers are trimmed once up front; known columns are then located by
/// exact header string. Every cell of a known numeric column is coerced
/// into a [`Cell`] state at this point, so later stages never see raw
/// strings. District values are trimmed as well.
///
/// # Errors
///
/// Returns `CropcastError::MissingColumn` if no trimmed header equals
/// `Dist Name`, or `CropcastError::Csv` on malformed input.
pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = Reader::from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let district_idx = headers
        .iter()
        .position(|h| h == DISTRICT_COLUMN)
        .ok_or_else(|| CropcastError::MissingColumn(DISTRICT_COLUMN.to_string()))?;

    let month_columns: Vec<(Month, usize)> = ALL_MONTHS
        .iter()
        .filter_map(|&month| {
            let header = monthly_header(month);
            headers.iter().position(|h| *h == header).map(|i| (month, i))
        })
        .collect();

    let find = |name: &str| headers.iter().position(|h| h == name);
    let apparent_idx = find(APPARENT_TEMP_COLUMN);
    let precipitation_idx = find(PRECIPITATION_COLUMN);
    let wind_idx = find(WIND_SPEED_COLUMN);
    let rice_idx = find(RICE_AREA_COLUMN);

    debug!(
        "Found {} monthly temperature columns, district column at index {}",
        month_columns.len(),
        district_idx
    );

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let district = row.get(district_idx).unwrap_or("").trim().to_string();

        let mut monthly_max = HashMap::with_capacity(month_columns.len());
        for &(month, idx) in &month_columns {
            monthly_max.insert(month, parse_cell(row.get(idx)));
        }

        records.push(ClimateRecord {
            district,
            monthly_max,
            apparent_temp_mean: apparent_idx.map(|i| parse_cell(row.get(i))),
            precipitation_sum: precipitation_idx.map(|i| parse_cell(row.get(i))),
            wind_speed_max: wind_idx.map(|i| parse_cell(row.get(i))),
            rice_irrigated_area: rice_idx.map(|i| parse_cell(row.get(i))),
        });
    }

    debug!("Loaded {} records", records.len());
    Ok(Dataset {
        months: month_columns.iter().map(|&(month, _)| month).collect(),
        records,
    })
}

fn parse_cell(raw: Option<&str>) -> Cell {
    let text = raw.unwrap_or("").trim();
    if text.is_empty() {
        return Cell::Missing;
    }
    match text.parse::<f64>() {
        Ok(value) => Cell::Number(value),
        Err(_) => Cell::NonNumeric(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn dataset(csv: &str) -> Dataset {
        read_dataset(Cursor::new(csv.to_string())).expect("dataset should load")
    }

    #[test]
    fn trims_headers_and_district_values() {
        let ds = dataset(
            "  Dist Name , MARCH MAXIMUM (Centigrate)  \n  Pune  ,30.5\n",
        );
        assert_eq!(ds.records.len(), 1);
        assert_eq!(ds.records[0].district, "Pune");
        assert!(ds.months.contains(&Month::March));
        assert_eq!(
            ds.records[0].monthly_max.get(&Month::March),
            Some(&Cell::Number(30.5))
        );
    }

    #[test]
    fn missing_district_column_is_an_error() {
        let result = read_dataset(Cursor::new("Name,Value\na,1\n".to_string()));
        assert!(matches!(
            result,
            Err(CropcastError::MissingColumn(col)) if col == DISTRICT_COLUMN
        ));
    }

    #[test]
    fn distinguishes_cell_states() {
        let ds = dataset(
            "Dist Name,MARCH MAXIMUM (Centigrate),APRIL MAXIMUM (Centigrate)\nX,n/a,\n",
        );
        let record = &ds.records[0];
        assert_eq!(
            record.monthly_max.get(&Month::March),
            Some(&Cell::NonNumeric("n/a".to_string()))
        );
        assert_eq!(record.monthly_max.get(&Month::April), Some(&Cell::Missing));
        // May's column is absent from the file, not merely empty.
        assert_eq!(record.monthly_max.get(&Month::May), None);
        assert!(!ds.months.contains(&Month::May));
    }

    #[test]
    fn adjustable_columns_are_optional() {
        let ds = dataset(
            "Dist Name,apparent_temperature_mean,precipitation_sum\nX,21.4,abc\n",
        );
        let record = &ds.records[0];
        assert_eq!(record.apparent_temp_mean, Some(Cell::Number(21.4)));
        assert_eq!(
            record.precipitation_sum,
            Some(Cell::NonNumeric("abc".to_string()))
        );
        assert_eq!(record.wind_speed_max, None);
        assert_eq!(record.rice_irrigated_area, None);
    }

    #[test]
    fn monthly_header_matches_dataset_spelling() {
        assert_eq!(
            monthly_header(Month::September),
            "SEPTEMBER MAXIMUM (Centigrate)"
        );
    }
}
