//! Problem formulation for the adiabatic temperature search.

use std::{cell::RefCell, convert::Infallible};

use thiserror::Error;
use twine_core::{EquationProblem, Model};
use uom::si::{
    available_energy::joule_per_kilogram, f64::ThermodynamicTemperature,
    thermodynamic_temperature::kelvin,
};

use crate::{
    models::combustion::equilibrium::core::{EquilibriumError, EquilibriumState, Known, evaluate},
    support::optimize::Optimizer,
};

/// Stand-in error handed to the solver; the real error stays in the model.
#[derive(Debug, Error)]
#[error("equilibrium evaluation failed at {temperature:?}")]
pub(super) struct TrialFailed {
    temperature: ThermodynamicTemperature,
}

/// Model adapter that evaluates equilibrium at a trial temperature.
///
/// Successful evaluations are cached by temperature so the bracket endpoints,
/// checked before bisection starts, aren't optimized a second time. The
/// first failure is kept for the caller.
pub(super) struct TrialModel<'a, O> {
    known: &'a Known,
    optimizer: &'a O,
    cache: RefCell<Vec<EquilibriumState>>,
    failure: RefCell<Option<(ThermodynamicTemperature, EquilibriumError)>>,
}

impl<'a, O: Optimizer> TrialModel<'a, O> {
    pub(super) fn new(known: &'a Known, optimizer: &'a O) -> Self {
        Self {
            known,
            optimizer,
            cache: RefCell::new(Vec::new()),
            failure: RefCell::new(None),
        }
    }

    /// Previously evaluated state at exactly `temperature`.
    pub(super) fn cached(&self, temperature: ThermodynamicTemperature) -> Option<EquilibriumState> {
        self.cache
            .borrow()
            .iter()
            .find(|state| state.temperature == temperature)
            .cloned()
    }

    /// Number of distinct temperatures evaluated.
    pub(super) fn evaluations(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Smallest-magnitude residual evaluated so far, in J/kg.
    pub(super) fn best_residual(&self) -> Option<f64> {
        self.cache
            .borrow()
            .iter()
            .map(|state| state.residual.get::<joule_per_kilogram>())
            .min_by(|a, b| a.abs().total_cmp(&b.abs()))
    }

    pub(super) fn take_failure(&self) -> Option<(ThermodynamicTemperature, EquilibriumError)> {
        self.failure.borrow_mut().take()
    }
}

impl<O: Optimizer> Model for TrialModel<'_, O> {
    type Input = ThermodynamicTemperature;
    type Output = EquilibriumState;
    type Error = TrialFailed;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        if let Some(state) = self.cached(*input) {
            return Ok(state);
        }

        match evaluate(self.known, *input, self.optimizer) {
            Ok(state) => {
                self.cache.borrow_mut().push(state.clone());
                Ok(state)
            }
            Err(source) => {
                let mut failure = self.failure.borrow_mut();
                if failure.is_none() {
                    *failure = Some((*input, source));
                }
                Err(TrialFailed {
                    temperature: *input,
                })
            }
        }
    }
}

/// Equation problem whose residual is the products' enthalpy minus the reactants'.
pub(super) struct EnthalpyProblem;

impl EquationProblem<1> for EnthalpyProblem {
    type Input = ThermodynamicTemperature;
    type Output = EquilibriumState;
    type Error = Infallible;

    fn input(&self, x: &[f64; 1]) -> Result<Self::Input, Self::Error> {
        Ok(ThermodynamicTemperature::new::<kelvin>(x[0]))
    }

    fn residuals(
        &self,
        _input: &Self::Input,
        output: &Self::Output,
    ) -> Result<[f64; 1], Self::Error> {
        Ok([output.residual.get::<joule_per_kilogram>()])
    }
}
