use thiserror::Error;
use uom::si::f64::ThermodynamicTemperature;

use crate::support::optimize::OptimizeError;

/// Errors that can occur while evaluating equilibrium at one temperature.
#[derive(Debug, Error)]
pub enum EquilibriumError {
    /// Some element has no single-element species to absorb its mass balance.
    ///
    /// This is a dataset problem: the species valid at `temperature` can't
    /// represent the reactant elements.
    #[error("under-determined reduction at {temperature:?}: unclaimed elements {unclaimed_elements:?}")]
    UnderDeterminedReduction {
        temperature: ThermodynamicTemperature,
        unclaimed_elements: Vec<usize>,
    },

    /// The optimizer returned a composition that violates a mass balance.
    #[error("optimizer returned an infeasible composition at {temperature:?}: penalty={penalty}")]
    InfeasibleOptimum {
        temperature: ThermodynamicTemperature,
        penalty: f64,
    },

    /// The optimizer returned a vector of the wrong length.
    #[error("optimizer returned {found} free amounts at {temperature:?}, expected {expected}")]
    Dimension {
        temperature: ThermodynamicTemperature,
        expected: usize,
        found: usize,
    },

    /// The optimizer could not run.
    #[error("optimizer failed")]
    Optimizer(#[from] OptimizeError),
}
