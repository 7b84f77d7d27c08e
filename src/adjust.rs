use crate::structs::{AdjustConfig, Cell, Dataset};
use log::debug;

/// Applies climate-condition deltas to a dataset.
///
/// Pure recomputation: the base dataset is left untouched and a new
/// dataset is returned, so repeated interactions always start from the
/// same baseline. A delta shifts only the numeric cells of its column;
/// non-numeric, empty, and absent cells pass through unchanged.
pub fn apply_adjustments(dataset: &Dataset, config: &AdjustConfig) -> Dataset {
    if config.is_noop() {
        return dataset.clone();
    }
    debug!("Applying adjustments: {:?}", config);

    let mut adjusted = dataset.clone();
    for record in &mut adjusted.records {
        shift(&mut record.apparent_temp_mean, config.temperature);
        shift(&mut record.precipitation_sum, config.rainfall);
        shift(&mut record.wind_speed_max, config.wind_speed);
        shift(&mut record.rice_irrigated_area, config.soil_moisture);
    }
    adjusted
}

fn shift(cell: &mut Option<Cell>, delta: Option<f64>) {
    if let (Some(Cell::Number(value)), Some(delta)) = (cell.as_mut(), delta) {
        *value += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::read_dataset;
    use std::io::Cursor;

    const BASE: &str = "\
Dist Name,apparent_temperature_mean,precipitation_sum,wind_speed_10m_max
X,20.0,5.5,12.0
X,bad,3.0,
";

    fn dataset() -> Dataset {
        read_dataset(Cursor::new(BASE.to_string())).expect("dataset should load")
    }

    #[test]
    fn shifts_only_numeric_cells_of_named_columns() {
        let base = dataset();
        let config = AdjustConfig {
            temperature: Some(3.0),
            rainfall: Some(-2.0),
            ..AdjustConfig::default()
        };
        let adjusted = apply_adjustments(&base, &config);

        assert_eq!(
            adjusted.records[0].apparent_temp_mean,
            Some(Cell::Number(23.0))
        );
        assert_eq!(adjusted.records[0].precipitation_sum, Some(Cell::Number(3.5)));
        // Untouched column keeps its value; bad and empty cells survive as-is.
        assert_eq!(adjusted.records[0].wind_speed_max, Some(Cell::Number(12.0)));
        assert_eq!(
            adjusted.records[1].apparent_temp_mean,
            Some(Cell::NonNumeric("bad".to_string()))
        );
        assert_eq!(adjusted.records[1].wind_speed_max, Some(Cell::Missing));
        // Column absent from the file stays absent.
        assert_eq!(adjusted.records[0].rice_irrigated_area, None);
    }

    #[test]
    fn base_dataset_is_never_mutated() {
        let base = dataset();
        let before = base.clone();
        let _ = apply_adjustments(
            &base,
            &AdjustConfig {
                temperature: Some(10.0),
                rainfall: Some(10.0),
                wind_speed: Some(10.0),
                soil_moisture: Some(10.0),
            },
        );
        assert_eq!(base, before);
    }

    #[test]
    fn empty_config_is_the_identity() {
        let base = dataset();
        let adjusted = apply_adjustments(&base, &AdjustConfig::default());
        assert_eq!(adjusted, base);
    }
}
