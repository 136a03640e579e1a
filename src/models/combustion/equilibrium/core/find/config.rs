use std::time::Duration;

use twine_solvers::equation::bisection;
use uom::si::{
    available_energy::joule_per_kilogram, f64::TemperatureInterval,
    temperature_interval::kelvin as delta_kelvin,
};

use crate::support::units::SpecificEnthalpy;

/// Solver configuration for the adiabatic temperature search.
#[derive(Debug, Clone, Copy)]
pub struct FindConfig {
    /// Maximum number of bisection steps.
    pub max_iters: usize,

    /// Bracket width at which the search stops.
    pub temp_tol: TemperatureInterval,

    /// Enthalpy residual accepted as a root.
    ///
    /// Zero means only an exact zero residual ends the search early.
    pub enthalpy_tol: SpecificEnthalpy,

    /// Wall-clock budget, checked after every trial temperature.
    pub timeout: Option<Duration>,
}

impl Default for FindConfig {
    fn default() -> Self {
        Self {
            max_iters: 100,
            temp_tol: TemperatureInterval::new::<delta_kelvin>(0.1),
            enthalpy_tol: SpecificEnthalpy::new::<joule_per_kilogram>(0.0),
            timeout: None,
        }
    }
}

impl FindConfig {
    pub(super) fn temp_tol_kelvin(&self) -> f64 {
        self.temp_tol.get::<delta_kelvin>()
    }

    pub(super) fn enthalpy_tol_j_per_kg(&self) -> f64 {
        self.enthalpy_tol.get::<joule_per_kilogram>()
    }

    /// Converts this configuration into a bisection solver configuration.
    pub(super) fn bisection(&self) -> bisection::Config {
        bisection::Config {
            max_iters: self.max_iters,
            x_abs_tol: self.temp_tol_kelvin(),
            x_rel_tol: 0.0,
            residual_tol: self.enthalpy_tol_j_per_kg(),
        }
    }
}
