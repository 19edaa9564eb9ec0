//! The thermodynamic state under which a voltage is measured or predicted.
use crate::EstimatorError;

/// Checks the non-negativity invariant shared by all physical fields.
///
/// NaN is rejected as well, so a field can never hold a value that breaks
/// comparisons downstream.
pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<f64, EstimatorError> {
    if value.is_nan() || value < 0.0 {
        Err(EstimatorError::InvalidValue { field, value })
    } else {
        Ok(value)
    }
}

/// Temperature, pressure and species partial pressures defining an operating
/// condition.
///
/// All fields start out unset and can only be set to non-negative values.
/// The struct is `Copy`; assigning a state always copies the values, so a
/// model and a data point never alias the same state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThermodynamicState {
    temperature: Option<f64>,
    pressure: Option<f64>,
    p_h2: Option<f64>,
    p_o2: Option<f64>,
    p_h2o: Option<f64>,
}

impl ThermodynamicState {
    /// A state with all fields unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// The temperature in K.
    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    pub fn set_temperature(&mut self, value: f64) -> Result<(), EstimatorError> {
        self.temperature = Some(non_negative("temperature", value)?);
        Ok(())
    }

    /// The total pressure in Pa.
    pub fn pressure(&self) -> Option<f64> {
        self.pressure
    }

    pub fn set_pressure(&mut self, value: f64) -> Result<(), EstimatorError> {
        self.pressure = Some(non_negative("pressure", value)?);
        Ok(())
    }

    /// The hydrogen partial pressure in Pa.
    pub fn p_h2(&self) -> Option<f64> {
        self.p_h2
    }

    pub fn set_p_h2(&mut self, value: f64) -> Result<(), EstimatorError> {
        self.p_h2 = Some(non_negative("pH2", value)?);
        Ok(())
    }

    /// The oxygen partial pressure in Pa.
    pub fn p_o2(&self) -> Option<f64> {
        self.p_o2
    }

    pub fn set_p_o2(&mut self, value: f64) -> Result<(), EstimatorError> {
        self.p_o2 = Some(non_negative("pO2", value)?);
        Ok(())
    }

    /// The water partial pressure in Pa.
    pub fn p_h2o(&self) -> Option<f64> {
        self.p_h2o
    }

    pub fn set_p_h2o(&mut self, value: f64) -> Result<(), EstimatorError> {
        self.p_h2o = Some(non_negative("pH2O", value)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_start_unset() {
        let state = ThermodynamicState::new();
        assert_eq!(state.temperature(), None);
        assert_eq!(state.pressure(), None);
        assert_eq!(state.p_h2(), None);
        assert_eq!(state.p_o2(), None);
        assert_eq!(state.p_h2o(), None);
    }

    #[test]
    fn setters_store_non_negative_values() {
        let mut state = ThermodynamicState::new();
        state.set_temperature(1073.15).unwrap();
        state.set_pressure(101325.0).unwrap();
        state.set_p_h2(0.0).unwrap();
        assert_eq!(state.temperature(), Some(1073.15));
        assert_eq!(state.pressure(), Some(101325.0));
        assert_eq!(state.p_h2(), Some(0.0));
    }

    #[test]
    fn setters_reject_negative_values() {
        let mut state = ThermodynamicState::new();
        assert!(state.set_temperature(-1.0).is_err());
        assert!(state.set_pressure(-1.0).is_err());
        assert!(state.set_p_h2(-1.0).is_err());
        assert!(state.set_p_o2(-1.0).is_err());
        assert!(state.set_p_h2o(-1.0).is_err());
        // A failed assignment leaves the field untouched.
        assert_eq!(state.temperature(), None);
    }

    #[test]
    fn setters_reject_nan() {
        let mut state = ThermodynamicState::new();
        assert!(state.set_pressure(f64::NAN).is_err());
    }

    #[test]
    fn copies_do_not_alias() {
        let mut original = ThermodynamicState::new();
        original.set_temperature(900.0).unwrap();
        let mut copy = original;
        copy.set_temperature(1000.0).unwrap();
        assert_eq!(original.temperature(), Some(900.0));
        assert_eq!(copy.temperature(), Some(1000.0));
    }
}
