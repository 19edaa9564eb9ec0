//! Calibration of lumped fuel cell models against experimental
//! current–voltage data.
//!
//! The crate provides three layers:
//! - containers for measured operating points ([`DataPoint`],
//!   [`DataManager`]) and the thermodynamic conditions they were acquired
//!   under ([`ThermodynamicState`]),
//! - the [`CellModel`] trait, the seam through which a concrete mathematical
//!   fuel cell model is plugged in,
//! - the [`Estimator`], which quantifies the deviation of a model from the
//!   measured data and drives a derivative-free minimizer to find the model
//!   constants with the smallest mean relative error.
//!
//! The mathematical model itself is left to the user. A minimal linear model
//! fitted to two operating points looks like this:
//!
//! ```
//! use sofc_estimator::{
//!     CellModel, DataManager, DataPoint, Estimator, MinimizeOptions, ThermodynamicState,
//! };
//!
//! struct LinearModel {
//!     state: ThermodynamicState,
//!     constants: Vec<f64>,
//! }
//!
//! impl CellModel for LinearModel {
//!     fn state(&self) -> &ThermodynamicState {
//!         &self.state
//!     }
//!
//!     fn set_state(&mut self, state: &ThermodynamicState) {
//!         self.state = *state;
//!     }
//!
//!     fn constants(&self) -> &[f64] {
//!         &self.constants
//!     }
//!
//!     fn set_constants(&mut self, constants: &[f64]) {
//!         self.constants = constants.to_vec();
//!     }
//!
//!     fn voltage(&self, current_density: f64) -> f64 {
//!         self.constants[0] - self.constants[1] * current_density
//!     }
//! }
//!
//! # fn main() -> Result<(), sofc_estimator::EstimatorError> {
//! let mut data = DataManager::new();
//! data.push(DataPoint::from_slice(&[0.0, 1.0])?);
//! data.push(DataPoint::from_slice(&[1.0, 0.5])?);
//!
//! let mut model = LinearModel {
//!     state: ThermodynamicState::new(),
//!     constants: vec![0.0, 0.0],
//! };
//!
//! let mut estimator = Estimator::new(&data, &mut model);
//! let constants = estimator.find_optimum(
//!     &[0.0, 0.0],
//!     "nelder-mead",
//!     &MinimizeOptions::default(),
//!     None,
//! )?;
//! assert!((constants[0] - 1.0).abs() < 1e-3);
//! assert!((constants[1] - 0.5).abs() < 1e-3);
//! # Ok(())
//! # }
//! ```
use std::num::ParseFloatError;
use thiserror::Error;

mod data;
mod estimator;
mod model;
mod reader;
mod state;

pub use data::{DataManager, DataPoint, Field};
pub use estimator::{Estimator, Method, MinimizeOptions};
pub use model::{CellModel, FARADAY, GAS_CONSTANT};
pub use reader::{parse_csv, parse_txt, read_csv, read_txt, CsvGroup, CsvTable, SkippedPair};
pub use state::ThermodynamicState;

#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error("Missing input. Need '{needed}' to evaluate '{to_evaluate}'.")]
    MissingInput { needed: String, to_evaluate: String },
    #[error("Expected a value >= 0 for '{field}', got {value}.")]
    InvalidValue { field: &'static str, value: f64 },
    #[error("Expected at most 7 values per data point, got {0}.")]
    TooManyValues(usize),
    #[error("No data points to evaluate.")]
    NoData,
    #[error("Method '{0}' unknown. Try: 'nelder-mead', 'simplex', 'downhill-simplex'")]
    UnknownMethod(String),
    #[error("Expected {expected} bounds to match the initial guess, got {got}.")]
    BoundsMismatch { expected: usize, got: usize },
    #[error("Minimizer failed: {0}")]
    Minimizer(String),
    #[error(transparent)]
    ParseError(#[from] ParseFloatError),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl EstimatorError {
    pub(crate) fn missing_input(needed: &str, to_evaluate: &str) -> Self {
        EstimatorError::MissingInput {
            needed: needed.to_owned(),
            to_evaluate: to_evaluate.to_owned(),
        }
    }
}
