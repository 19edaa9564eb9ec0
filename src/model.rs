//! The capability interface a concrete fuel cell model has to provide.
use crate::state::ThermodynamicState;

/// Universal gas constant in J/(mol K).
pub const GAS_CONSTANT: f64 = 8.31446261815324;

/// Faraday constant in C/mol.
pub const FARADAY: f64 = 96485.3321;

/// A lumped fuel cell model that predicts a cell voltage for a given current
/// density.
///
/// The model carries a mutable "current state": [`CellModel::voltage`] is
/// evaluated under whatever state was set last. The [`crate::Estimator`]
/// relies on this and mutates both the state (once per data point) and the
/// constants (once per objective evaluation) of the bound model. A model
/// instance must therefore not be shared across concurrent estimator calls,
/// and after an optimization its constants hold the minimizer's last
/// evaluated point, not necessarily the best one.
///
/// The constants vector is the model's set of free parameters; its length and
/// meaning are model specific, but [`CellModel::set_constants`] must accept
/// any vector of that length.
pub trait CellModel {
    /// The state under which calculations are performed.
    fn state(&self) -> &ThermodynamicState;

    /// Replaces the current state with a copy of `state`.
    fn set_state(&mut self, state: &ThermodynamicState);

    /// The model's free parameters.
    fn constants(&self) -> &[f64];

    /// Replaces the model's free parameters.
    fn set_constants(&mut self, constants: &[f64]);

    /// The predicted cell voltage in V at `current_density`, evaluated under
    /// the current state.
    fn voltage(&self, current_density: f64) -> f64;
}
