use crate::aggregate::{SEASONS, SeasonalAverageTable};
use crate::error::Result;
use arrow_array::{Float64Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use csv::Writer;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::{fs::File, path::Path, sync::Arc};

fn format_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{:.2}", value)
    }
}

fn nullable(value: f64) -> Option<f64> {
    if value.is_nan() { None } else { Some(value) }
}

/// Writes a seasonal average table to a CSV file.
///
/// Absent season values render as empty fields, not zeros.
///
/// # Arguments
/// * `table` - Seasonal averages for one district
/// * `output_path` - Path where the CSV file will be created
///
/// # Errors
/// Returns error if file cannot be created or written to.
pub fn write_csv(table: &SeasonalAverageTable, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(SEASONS.iter().map(|season| season.name()))?;
    for row in &table.rows {
        writer.write_record(&[
            format_cell(row.summer),
            format_cell(row.monsoon),
            format_cell(row.winter),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes a seasonal average table to a pretty-formatted JSON file.
///
/// Absent season values serialize as `null`.
///
/// # Errors
/// Returns error if file cannot be created or serialization fails.
pub fn write_json(table: &SeasonalAverageTable, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, &table.rows)?;
    Ok(())
}

/// Writes a seasonal average table to a columnar Parquet file using Arrow
/// format, with one nullable Float64 column per season.
///
/// # Errors
/// Returns error if file cannot be created, schema is invalid, or Arrow
/// operations fail.
pub fn write_parquet(table: &SeasonalAverageTable, output_path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Summer", DataType::Float64, true),
        Field::new("Monsoon", DataType::Float64, true),
        Field::new("Winter", DataType::Float64, true),
    ]));

    let summer: Float64Array = table.rows.iter().map(|r| nullable(r.summer)).collect();
    let monsoon: Float64Array = table.rows.iter().map(|r| nullable(r.monsoon)).collect();
    let winter: Float64Array = table.rows.iter().map(|r| nullable(r.winter)).collect();

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(summer), Arc::new(monsoon), Arc::new(winter)],
    )?;

    let file = File::create(output_path)?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SeasonalRow;
    use std::fs;

    fn table() -> SeasonalAverageTable {
        SeasonalAverageTable {
            rows: vec![
                SeasonalRow {
                    summer: 15.0,
                    monsoon: 31.25,
                    winter: f64::NAN,
                },
                SeasonalRow {
                    summer: 25.0,
                    monsoon: 30.0,
                    winter: f64::NAN,
                },
            ],
        }
    }

    #[test]
    fn csv_renders_absent_values_as_empty_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seasonal.csv");
        write_csv(&table(), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("Summer,Monsoon,Winter"));
        assert_eq!(lines.next(), Some("15.00,31.25,"));
        assert_eq!(lines.next(), Some("25.00,30.00,"));
    }

    #[test]
    fn json_renders_absent_values_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seasonal.json");
        write_json(&table(), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"Winter\": null"));
        assert!(written.contains("\"Summer\": 15.0"));
    }
}
