//! The [`Estimator`] quantifies the deviation of a [`CellModel`] from
//! measured polarization data and searches for the model constants that
//! minimize the mean relative error.
use std::cell::RefCell;
use std::str::FromStr;

use gomez::algo::NelderMead;
use gomez::nalgebra as na;
use gomez::{Domain, Function, OptimizerDriver, Problem};
use log::warn;
use na::{Dyn, IsContiguous};
use ndarray::Array1;
use ndarray_stats::QuantileExt;

use crate::data::{DataManager, DataPoint};
use crate::model::CellModel;
use crate::EstimatorError;

/// Relative deviation of the model prediction from one measured point.
///
/// Sets the model state to the point's state before evaluating. The measured
/// voltage is the denominator; a measurement of exactly zero is not
/// pre-validated and yields an infinite error.
fn relative_error<M: CellModel>(model: &mut M, point: &DataPoint) -> Result<f64, EstimatorError> {
    let current_density = point
        .current_density()
        .ok_or_else(|| EstimatorError::missing_input("current density", "relative error"))?;
    let measured = point
        .voltage()
        .ok_or_else(|| EstimatorError::missing_input("voltage", "relative error"))?;
    model.set_state(point.state());
    Ok((model.voltage(current_density) - measured).abs() / measured)
}

fn error_vector<M: CellModel>(
    data: &DataManager,
    model: &mut M,
) -> Result<Array1<f64>, EstimatorError> {
    let mut errors = Array1::zeros(data.len());
    for (i, point) in data.points().iter().enumerate() {
        errors[i] = relative_error(model, point)?;
    }
    Ok(errors)
}

fn mean_error<M: CellModel>(data: &DataManager, model: &mut M) -> Result<f64, EstimatorError> {
    if data.is_empty() {
        return Err(EstimatorError::NoData);
    }
    Ok(error_vector(data, model)?.sum() / data.len() as f64)
}

/// The minimization algorithm invoked by [`Estimator::find_optimum`].
///
/// Parsed from the method identifier string. Only derivative-free simplex
/// variants are wired up; gomez's remaining algorithms either target systems
/// of equations or require a random number source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    NelderMead,
}

impl FromStr for Method {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nelder-mead" | "simplex" | "downhill-simplex" => Ok(Method::NelderMead),
            _ => Err(EstimatorError::UnknownMethod(s.to_owned())),
        }
    }
}

/// Termination settings for [`Estimator::find_optimum`].
///
/// The minimizer stops as soon as the mean relative error drops to
/// `target_cost` or the iteration budget is exhausted, whichever comes
/// first.
#[derive(Clone, Copy, Debug)]
pub struct MinimizeOptions {
    pub max_iters: usize,
    pub target_cost: f64,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            max_iters: 500,
            target_cost: 1e-8,
        }
    }
}

/// The objective handed to gomez: constants vector in, mean relative error
/// out.
///
/// gomez evaluates through `&self`, while setting the constants needs a
/// mutable model, hence the `RefCell`. Evaluation failures inside the
/// minimizer cannot be returned and map to an infinite cost; malformed data
/// is caught before the search starts.
struct Objective<'a, M: CellModel> {
    data: &'a DataManager,
    model: RefCell<&'a mut M>,
    dimension: usize,
    bounds: Option<Vec<(f64, f64)>>,
}

impl<'a, M: CellModel> Problem for Objective<'a, M> {
    type Field = f64;

    fn domain(&self) -> Domain<Self::Field> {
        match &self.bounds {
            Some(bounds) => Domain::rect(
                bounds.iter().map(|b| b.0).collect(),
                bounds.iter().map(|b| b.1).collect(),
            ),
            None => Domain::unconstrained(self.dimension),
        }
    }
}

impl<'a, M: CellModel> Function for Objective<'a, M> {
    fn apply<Sx>(&self, x: &na::Vector<Self::Field, Dyn, Sx>) -> Self::Field
    where
        Sx: na::Storage<Self::Field, Dyn> + IsContiguous,
    {
        let mut model = self.model.borrow_mut();
        model.set_constants(x.as_slice());
        mean_error(self.data, &mut **model).unwrap_or(f64::INFINITY)
    }
}

/// Binds one [`DataManager`] and one [`CellModel`] and evaluates the model
/// against the data.
///
/// The estimator is stateless apart from its two borrows; rebinding either
/// collaborator means constructing a new `Estimator`. All operations mutate
/// the model's state in place, and [`Estimator::find_optimum`] additionally
/// mutates its constants, see [`CellModel`].
pub struct Estimator<'a, M: CellModel> {
    data: &'a DataManager,
    model: &'a mut M,
}

impl<'a, M: CellModel> Estimator<'a, M> {
    pub fn new(data: &'a DataManager, model: &'a mut M) -> Self {
        Self { data, model }
    }

    pub fn data(&self) -> &DataManager {
        self.data
    }

    pub fn model(&self) -> &M {
        self.model
    }

    /// The largest relative error across all data points.
    ///
    /// Zero means a perfect fit at every point. Fails on an empty manager
    /// and on points with an unset current density or voltage.
    pub fn max_error(&mut self) -> Result<f64, EstimatorError> {
        if self.data.is_empty() {
            return Err(EstimatorError::NoData);
        }
        let errors = error_vector(self.data, self.model)?;
        Ok(*errors.max().map_err(|_| EstimatorError::NoData)?)
    }

    /// The arithmetic mean of the relative errors across all data points.
    ///
    /// Fails on an empty manager and on points with an unset current density
    /// or voltage.
    pub fn mean_error(&mut self) -> Result<f64, EstimatorError> {
        mean_error(self.data, self.model)
    }

    /// Searches for the constants vector minimizing the mean relative error.
    ///
    /// `initial` is the starting constants vector, `method` the name of the
    /// minimization algorithm (see [`Method`]), and `bounds` an optional
    /// (min, max) pair per dimension. Returns the best vector found; the
    /// model's constants are left at the minimizer's last evaluated point,
    /// so callers wanting the optimum must use the returned vector or
    /// re-apply it.
    ///
    /// If the iteration budget runs out before the cost reaches
    /// `options.target_cost`, the possibly unconverged result is still
    /// returned and a warning is logged.
    pub fn find_optimum(
        &mut self,
        initial: &[f64],
        method: &str,
        options: &MinimizeOptions,
        bounds: Option<&[(f64, f64)]>,
    ) -> Result<Vec<f64>, EstimatorError> {
        let method: Method = method.parse()?;
        if let Some(bounds) = bounds {
            if bounds.len() != initial.len() {
                return Err(EstimatorError::BoundsMismatch {
                    expected: initial.len(),
                    got: bounds.len(),
                });
            }
        }

        // Evaluate once up front so malformed data surfaces as a real error
        // instead of an infinite cost inside the minimizer.
        self.model.set_constants(initial);
        mean_error(self.data, self.model)?;

        let objective = Objective {
            data: self.data,
            model: RefCell::new(&mut *self.model),
            dimension: initial.len(),
            bounds: bounds.map(|b| b.to_vec()),
        };
        let (x, fx) = match method {
            Method::NelderMead => {
                let mut driver = OptimizerDriver::builder(&objective)
                    .with_initial(initial.to_vec())
                    .with_algo(|f, dom| NelderMead::new(f, dom))
                    .build();
                let (x, fx) = driver
                    .find(|state| {
                        state.fx() <= options.target_cost || state.iter() >= options.max_iters
                    })
                    .map_err(|e| EstimatorError::Minimizer(e.to_string()))?;
                (x.to_vec(), fx)
            }
        };
        if fx > options.target_cost {
            warn!(
                "minimizer stopped after {} iterations at mean relative error {:e}",
                options.max_iters, fx
            );
        }
        Ok(x)
    }
}
