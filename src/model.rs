use crate::error::{CropcastError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Forecast horizon supplied to every prediction call.
pub const FORECAST_STEPS: usize = 5;

/// A fixed-width table of exogenous regressors, one row per forecast step.
#[derive(Debug, Clone, PartialEq)]
pub struct ExogTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl ExogTable {
    /// Builds a table that repeats one row of (column, value) pairs for
    /// every forecast step, the shape the prediction call expects.
    pub fn repeated(values: &[(String, f64)], steps: usize) -> Self {
        let columns = values.iter().map(|(name, _)| name.clone()).collect();
        let row: Vec<f64> = values.iter().map(|(_, value)| *value).collect();
        Self {
            columns,
            rows: vec![row; steps],
        }
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| CropcastError::Data(format!("Exogenous column not found: {}", name)))
    }
}

/// Serialized SARIMAX model parameters for one district.
///
/// The artifact carries the fitted mean-equation coefficients and enough
/// trailing endogenous history to seed the autoregressive terms. The
/// exogenous contract is explicit: `exog_names` declares, in coefficient
/// order, exactly which columns a forecast call must supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaxModel {
    pub endog_name: String,
    pub exog_names: Vec<String>,
    pub intercept: f64,
    pub ar_coefficients: Vec<f64>,
    pub exog_coefficients: Vec<f64>,
    pub recent_endog: Vec<f64>,
}

impl SarimaxModel {
    fn validate(&self) -> Result<()> {
        if self.exog_coefficients.len() != self.exog_names.len() {
            return Err(CropcastError::InvalidModel(format!(
                "{} exogenous coefficients for {} declared variables",
                self.exog_coefficients.len(),
                self.exog_names.len()
            )));
        }
        if self.recent_endog.len() < self.ar_coefficients.len() {
            return Err(CropcastError::InvalidModel(format!(
                "AR order {} needs at least that much endogenous history, got {}",
                self.ar_coefficients.len(),
                self.recent_endog.len()
            )));
        }
        Ok(())
    }

    /// Declared exogenous variable names, in coefficient order.
    pub fn exog_names(&self) -> &[String] {
        &self.exog_names
    }

    /// Forecasts `steps` values of the endogenous series.
    ///
    /// The mean equation is evaluated recursively: each step combines the
    /// intercept, the AR terms over the (prediction-extended) endogenous
    /// history, and the exogenous regression terms for that step's row.
    ///
    /// # Errors
    ///
    /// Returns `CropcastError::ExogMismatch` when the table's column name
    /// set differs from the declared exogenous names, and
    /// `CropcastError::Data` when the table does not have exactly one row
    /// per step.
    pub fn forecast(&self, steps: usize, exog: &ExogTable) -> Result<Vec<f64>> {
        let expected: HashSet<&str> = self.exog_names.iter().map(String::as_str).collect();
        let provided: HashSet<&str> = exog.columns.iter().map(String::as_str).collect();
        if expected != provided {
            let mut expected: Vec<String> = self.exog_names.clone();
            let mut provided: Vec<String> = exog.columns.clone();
            expected.sort();
            provided.sort();
            return Err(CropcastError::ExogMismatch { expected, provided });
        }
        if exog.rows.len() != steps {
            return Err(CropcastError::Data(format!(
                "Expected {} exogenous rows, got {}",
                steps,
                exog.rows.len()
            )));
        }

        // Map declared names onto the table's column order once.
        let indices: Vec<usize> = self
            .exog_names
            .iter()
            .map(|name| exog.column_index(name))
            .collect::<Result<_>>()?;

        let mut history = self.recent_endog.clone();
        let mut predictions = Vec::with_capacity(steps);
        for row in &exog.rows {
            let mut value = self.intercept;
            for (lag, coefficient) in self.ar_coefficients.iter().enumerate() {
                value += coefficient * history[history.len() - 1 - lag];
            }
            for (coefficient, &index) in self.exog_coefficients.iter().zip(&indices) {
                value += coefficient * row[index];
            }
            history.push(value);
            predictions.push(value);
        }
        Ok(predictions)
    }
}

/// Outcome of resolving a district's model artifact.
///
/// A missing artifact is a normal, reportable condition; only unreadable
/// or invalid artifacts surface as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelLookup {
    Found(SarimaxModel),
    NotFound { path: PathBuf },
}

/// Artifact path for a district, `<models_dir>/<district>_sarimax_model.json`.
pub fn model_path(models_dir: &Path, district: &str) -> PathBuf {
    models_dir.join(format!("{}_sarimax_model.json", district.trim()))
}

/// Resolves and deserializes the model artifact for a district.
///
/// # Errors
///
/// Returns `CropcastError::Json` for an unparseable artifact and
/// `CropcastError::InvalidModel` when the parsed coefficients are
/// internally inconsistent. A missing file is not an error.
pub fn lookup_model(models_dir: &Path, district: &str) -> Result<ModelLookup> {
    let path = model_path(models_dir, district);
    if !path.exists() {
        debug!("No model artifact at {}", path.display());
        return Ok(ModelLookup::NotFound { path });
    }
    let file = File::open(&path)?;
    let model: SarimaxModel = serde_json::from_reader(file)?;
    model.validate()?;
    debug!(
        "Loaded model for {}: {} exogenous variables, AR order {}",
        district,
        model.exog_names.len(),
        model.ar_coefficients.len()
    );
    Ok(ModelLookup::Found(model))
}
