//! Containers for measured operating points.
//!
//! A [`DataPoint`] stores one measured (current density, voltage) pair
//! together with the [`ThermodynamicState`] it was acquired under. The
//! [`DataManager`] keeps points in insertion order and offers batch
//! operations over a single [`Field`] of every point, plus flat-text
//! serialization that round-trips through [`crate::read_txt`].
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::state::{non_negative, ThermodynamicState};
use crate::EstimatorError;

/// One of the seven physical fields stored per data point.
///
/// The order of the variants is the column order of the flat-text format:
/// current density, voltage, temperature, pressure, pH2, pO2, pH2O.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    CurrentDensity,
    Voltage,
    Temperature,
    Pressure,
    PartialH2,
    PartialO2,
    PartialH2O,
}

pub(crate) const FIELD_ORDER: [Field; 7] = [
    Field::CurrentDensity,
    Field::Voltage,
    Field::Temperature,
    Field::Pressure,
    Field::PartialH2,
    Field::PartialO2,
    Field::PartialH2O,
];

impl Field {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Field::CurrentDensity => "current density",
            Field::Voltage => "voltage",
            Field::Temperature => "temperature",
            Field::Pressure => "pressure",
            Field::PartialH2 => "pH2",
            Field::PartialO2 => "pO2",
            Field::PartialH2O => "pH2O",
        }
    }
}

/// A single measured operating point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DataPoint {
    current_density: Option<f64>,
    voltage: Option<f64>,
    state: ThermodynamicState,
}

impl DataPoint {
    /// A point with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a point from up to seven values in [`Field`] order.
    ///
    /// Trailing fields may be omitted. A NaN entry leaves the corresponding
    /// field unset, which is how the flat-text reader represents absent
    /// values.
    pub fn from_slice(values: &[f64]) -> Result<Self, EstimatorError> {
        if values.len() > FIELD_ORDER.len() {
            return Err(EstimatorError::TooManyValues(values.len()));
        }
        let mut point = Self::new();
        for (&field, &value) in FIELD_ORDER.iter().zip(values) {
            if !value.is_nan() {
                point.set(field, value)?;
            }
        }
        Ok(point)
    }

    /// The current density in A/m².
    pub fn current_density(&self) -> Option<f64> {
        self.current_density
    }

    pub fn set_current_density(&mut self, value: f64) -> Result<(), EstimatorError> {
        self.current_density = Some(non_negative("current density", value)?);
        Ok(())
    }

    /// The cell voltage in V.
    pub fn voltage(&self) -> Option<f64> {
        self.voltage
    }

    pub fn set_voltage(&mut self, value: f64) -> Result<(), EstimatorError> {
        self.voltage = Some(non_negative("voltage", value)?);
        Ok(())
    }

    /// The thermodynamic state under which the point was acquired.
    pub fn state(&self) -> &ThermodynamicState {
        &self.state
    }

    pub fn set_state(&mut self, state: ThermodynamicState) {
        self.state = state;
    }

    /// Reads a field by selector.
    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::CurrentDensity => self.current_density,
            Field::Voltage => self.voltage,
            Field::Temperature => self.state.temperature(),
            Field::Pressure => self.state.pressure(),
            Field::PartialH2 => self.state.p_h2(),
            Field::PartialO2 => self.state.p_o2(),
            Field::PartialH2O => self.state.p_h2o(),
        }
    }

    /// Writes a field by selector, enforcing the non-negativity invariant.
    pub fn set(&mut self, field: Field, value: f64) -> Result<(), EstimatorError> {
        match field {
            Field::CurrentDensity => self.set_current_density(value),
            Field::Voltage => self.set_voltage(value),
            Field::Temperature => self.state.set_temperature(value),
            Field::Pressure => self.state.set_pressure(value),
            Field::PartialH2 => self.state.set_p_h2(value),
            Field::PartialO2 => self.state.set_p_o2(value),
            Field::PartialH2O => self.state.set_p_h2o(value),
        }
    }
}

/// An ordered, append-only collection of [`DataPoint`]s.
///
/// Insertion order is significant: it determines both the iteration order of
/// the error metrics and the line order of the text output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataManager {
    points: Vec<DataPoint>,
}

impl DataManager {
    /// An empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a point. There is no removal operation.
    pub fn push(&mut self, point: DataPoint) {
        self.points.push(point);
    }

    /// The stored points in insertion order.
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sets `field` to `value` on every point where it is still unset.
    pub fn fill(&mut self, field: Field, value: f64) -> Result<(), EstimatorError> {
        for point in &mut self.points {
            if point.get(field).is_none() {
                point.set(field, value)?;
            }
        }
        Ok(())
    }

    /// Sets `field` to `value` on every point, regardless of prior values.
    pub fn overwrite(&mut self, field: Field, value: f64) -> Result<(), EstimatorError> {
        for point in &mut self.points {
            point.set(field, value)?;
        }
        Ok(())
    }

    /// Multiplies `field` by `factor` on every point.
    ///
    /// Fails with [`EstimatorError::MissingInput`] if any point has the
    /// field unset; points visited before the failure keep their rescaled
    /// values.
    pub fn rescale(&mut self, field: Field, factor: f64) -> Result<(), EstimatorError> {
        for point in &mut self.points {
            let current = point
                .get(field)
                .ok_or_else(|| EstimatorError::missing_input(field.name(), "rescale"))?;
            point.set(field, current * factor)?;
        }
        Ok(())
    }

    /// Adds `delta` to `field` on every point.
    ///
    /// Fails on unset fields like [`DataManager::rescale`], and on offsets
    /// that would drive a field negative.
    pub fn offset(&mut self, field: Field, delta: f64) -> Result<(), EstimatorError> {
        for point in &mut self.points {
            let current = point
                .get(field)
                .ok_or_else(|| EstimatorError::missing_input(field.name(), "offset"))?;
            point.set(field, current + delta)?;
        }
        Ok(())
    }

    /// Renders the manager in the flat-text format: one line per point,
    /// seven space-separated values in [`Field`] order, unset fields as
    /// `nan`.
    pub fn to_txt(&self) -> String {
        let mut out = String::new();
        for point in &self.points {
            let line: Vec<String> = FIELD_ORDER
                .iter()
                .map(|&field| match point.get(field) {
                    Some(value) => value.to_string(),
                    None => "nan".to_owned(),
                })
                .collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        out
    }

    /// Writes [`DataManager::to_txt`] to a file.
    pub fn save_txt<P: AsRef<Path>>(&self, path: P) -> Result<(), EstimatorError> {
        let mut file = File::create(path)?;
        file.write_all(self.to_txt().as_bytes())?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DataManager {
    type Item = &'a DataPoint;
    type IntoIter = std::slice::Iter<'a, DataPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
