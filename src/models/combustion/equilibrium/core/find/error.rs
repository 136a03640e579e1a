use std::time::Duration;

use thiserror::Error;
use twine_solvers::equation::bisection;
use uom::si::f64::ThermodynamicTemperature;

use crate::{
    models::combustion::equilibrium::core::EquilibriumError, support::units::SpecificEnthalpy,
};

/// Errors that can occur while searching for the adiabatic temperature.
#[derive(Debug, Error)]
pub enum FindError {
    /// The search bounds are not finite or coincide.
    #[error("invalid search bracket: [{low:?}, {high:?}]")]
    InvalidBracket {
        low: ThermodynamicTemperature,
        high: ThermodynamicTemperature,
    },

    /// Equilibrium evaluation failed at a trial temperature.
    #[error("equilibrium evaluation failed at {temperature:?}")]
    Equilibrium {
        temperature: ThermodynamicTemperature,

        #[source]
        source: EquilibriumError,
    },

    /// The enthalpy residual has the same sign at both bounds.
    #[error(
        "search bracket does not straddle a root: residual({low:?})={low_residual:?}, residual({high:?})={high_residual:?}"
    )]
    Unbracketed {
        low: ThermodynamicTemperature,
        high: ThermodynamicTemperature,
        low_residual: SpecificEnthalpy,
        high_residual: SpecificEnthalpy,
    },

    /// The iteration limit was reached before the bracket narrowed to tolerance.
    #[error("no convergence after {iters} iterations: bracket={bracket:?}, residual={residual:?}")]
    NonConvergence {
        /// Narrowest bracket reached.
        bracket: [ThermodynamicTemperature; 2],

        /// Smallest residual magnitude encountered, with its sign.
        residual: SpecificEnthalpy,

        iters: usize,
    },

    /// The configured timeout elapsed.
    #[error("timed out after {elapsed:?}: bracket={bracket:?}")]
    DeadlineExceeded {
        /// Bracket at cancellation.
        bracket: [ThermodynamicTemperature; 2],

        elapsed: Duration,
    },

    /// The bisection solver rejected its inputs.
    #[error("bisection solver error")]
    Bisection(#[from] bisection::Error),
}
