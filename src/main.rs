use clap::{Parser, Subcommand};
use lib::{
    AdjustConfig, Cell, CropcastError, Dataset, ExogTable, FORECAST_STEPS, ModelLookup, Season,
    SimpleLogger, apply_adjustments, load_csv, lookup_model, seasonal_average, write_csv,
    write_json, write_parquet,
};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

static LOGGER: SimpleLogger = SimpleLogger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level for output
    #[arg(long, global = true, default_value = "false")]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the districts available in a dataset
    Districts {
        /// input CSV file
        #[arg(short, long)]
        input_file: PathBuf,
    },
    /// Forecast crop yield for a district from adjusted seasonal temperatures
    Forecast {
        /// input CSV file
        #[arg(short, long)]
        input_file: PathBuf,

        /// Directory holding per-district model artifacts
        #[arg(short, long, default_value = "models")]
        models_dir: PathBuf,

        /// District to forecast
        #[arg(short, long)]
        district: String,

        /// Adjusted Summer input (defaults to the district's seasonal mean)
        #[arg(long, allow_negative_numbers = true)]
        summer: Option<f64>,

        /// Adjusted Monsoon input (defaults to the district's seasonal mean)
        #[arg(long, allow_negative_numbers = true)]
        monsoon: Option<f64>,

        /// Adjusted Winter input (defaults to the district's seasonal mean)
        #[arg(long, allow_negative_numbers = true)]
        winter: Option<f64>,

        /// Output base name (will create dir containing .csv, .json, and .parquet exports of the seasonal table)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Apply climate-condition deltas and show the affected columns
    Adjust {
        /// input CSV file
        #[arg(short, long)]
        input_file: PathBuf,

        /// Change in temperature
        #[arg(long, allow_negative_numbers = true)]
        temperature: Option<f64>,

        /// Change in rainfall
        #[arg(long, allow_negative_numbers = true)]
        rainfall: Option<f64>,

        /// Change in wind speed
        #[arg(long, allow_negative_numbers = true)]
        wind_speed: Option<f64>,

        /// Change in soil moisture
        #[arg(long, allow_negative_numbers = true)]
        soil_moisture: Option<f64>,
    },
}

fn main() -> Result<(), CropcastError> {
    // Initialize timer and logger
    let total_start = Instant::now();
    log::set_logger(&LOGGER).unwrap();

    let args = Args::parse();
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }

    println!("Cropcast! District climate & crop yield pipeline");
    match args.command {
        Command::Districts { input_file } => run_districts(&input_file)?,
        Command::Forecast {
            input_file,
            models_dir,
            district,
            summer,
            monsoon,
            winter,
            output,
        } => run_forecast(
            &input_file,
            &models_dir,
            &district,
            [summer, monsoon, winter],
            output,
        )?,
        Command::Adjust {
            input_file,
            temperature,
            rainfall,
            wind_speed,
            soil_moisture,
        } => {
            let config = AdjustConfig {
                temperature,
                rainfall,
                wind_speed,
                soil_moisture,
            };
            run_adjust(&input_file, &config)?;
        }
    }

    println!("\nTotal runtime: {:.2?}", total_start.elapsed());
    Ok(())
}

/// Loads the dataset, reporting (rather than failing on) the conditions a
/// user can fix: a missing file or a dataset without the district column.
fn load_dataset(input_file: &Path) -> Result<Option<Dataset>, CropcastError> {
    if !input_file.exists() {
        println!("Dataset not found: {}", input_file.display());
        return Ok(None);
    }
    let load_start = Instant::now();
    match load_csv(input_file) {
        Ok(dataset) => {
            println!(
                "Loaded {} records in {:.2?}",
                dataset.records.len(),
                load_start.elapsed()
            );
            Ok(Some(dataset))
        }
        Err(CropcastError::MissingColumn(column)) => {
            println!("Error: No '{}' column found in dataset!", column);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn run_districts(input_file: &Path) -> Result<(), CropcastError> {
    let Some(dataset) = load_dataset(input_file)? else {
        return Ok(());
    };
    let districts = dataset.districts();
    println!("\n{} districts:", districts.len());
    for district in districts {
        println!("  {}", district);
    }
    Ok(())
}

fn run_forecast(
    input_file: &Path,
    models_dir: &Path,
    district: &str,
    overrides: [Option<f64>; 3],
    output: Option<String>,
) -> Result<(), CropcastError> {
    let Some(dataset) = load_dataset(input_file)? else {
        return Ok(());
    };

    let processing_start = Instant::now();
    let seasonal = match seasonal_average(&dataset, district) {
        Ok(table) => table,
        Err(CropcastError::NoDistrictData(district)) => {
            println!("No data found for district: {}", district);
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    println!(
        "Computed seasonal averages for {} rows in {:.2?}",
        seasonal.len(),
        processing_start.elapsed()
    );

    let model = match lookup_model(models_dir, district)? {
        ModelLookup::Found(model) => model,
        ModelLookup::NotFound { path } => {
            println!(
                "Prediction model not found for {}! (expected {})",
                district,
                path.display()
            );
            return Ok(());
        }
    };

    // One adjusted scalar per season: the explicit flag when given, the
    // seasonal mean otherwise, clamped into the district's observed range.
    // A season with no observed values falls back to 0.0.
    println!("\nAdjusted seasonal inputs:");
    let seasons = [Season::Summer, Season::Monsoon, Season::Winter];
    let mut exog_values = Vec::with_capacity(seasons.len());
    for (season, flag) in seasons.into_iter().zip(overrides) {
        let value = match seasonal.season_range(season) {
            Some(range) => {
                let chosen = flag.unwrap_or(range.mean);
                let clamped = chosen.clamp(range.min, range.max);
                if clamped != chosen {
                    debug!(
                        "{} input {:.2} clamped into [{:.2}, {:.2}]",
                        season.name(),
                        chosen,
                        range.min,
                        range.max
                    );
                }
                clamped
            }
            None => 0.0,
        };
        println!("  {}: {:.2}", season.name(), value);
        exog_values.push((season.name().to_string(), value));
    }

    let exog = ExogTable::repeated(&exog_values, FORECAST_STEPS);
    let predictions = match model.forecast(FORECAST_STEPS, &exog) {
        Ok(predictions) => predictions,
        Err(CropcastError::ExogMismatch { expected, .. }) => {
            println!("Exogenous variable mismatch! Model expects: {:?}", expected);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    println!("\n{} forecast for {}:", model.endog_name, district);
    for (step, value) in predictions.iter().enumerate() {
        println!("  step {}: {:.2}", step + 1, value);
    }

    if let Some(output) = output {
        // Create output directory
        let output_dir = PathBuf::from(format!("./output/{}", output));
        fs::create_dir_all(&output_dir)?;

        // Extract just the directory name for the file names (remove path separators)
        let output_name = output.split(['/', '\\']).next_back().unwrap_or(&output);
        let io_start = Instant::now();
        write_csv(&seasonal, &output_dir.join(format!("{}.csv", output_name)))?;
        write_json(&seasonal, &output_dir.join(format!("{}.json", output_name)))?;
        write_parquet(&seasonal, &output_dir.join(format!("{}.parquet", output_name)))?;
        println!(
            "\nWrote seasonal table to {} in {:.2?}",
            output_dir.display(),
            io_start.elapsed()
        );
    }

    Ok(())
}

fn run_adjust(input_file: &Path, config: &AdjustConfig) -> Result<(), CropcastError> {
    let Some(dataset) = load_dataset(input_file)? else {
        return Ok(());
    };

    let adjust_start = Instant::now();
    let adjusted = apply_adjustments(&dataset, config);
    println!("Applied adjustments in {:.2?}", adjust_start.elapsed());

    println!(
        "\n{:<24} {:>16} {:>16} {:>18} {:>24}",
        "Dist Name", "apparent_temp", "precipitation", "wind_speed_10m_max", "rice_irrigated_area"
    );
    for record in &adjusted.records {
        println!(
            "{:<24} {:>16} {:>16} {:>18} {:>24}",
            record.district,
            cell_text(&record.apparent_temp_mean),
            cell_text(&record.precipitation_sum),
            cell_text(&record.wind_speed_max),
            cell_text(&record.rice_irrigated_area),
        );
    }
    Ok(())
}

fn cell_text(cell: &Option<Cell>) -> String {
    cell.as_ref().map(|c| c.to_string()).unwrap_or_default()
}
