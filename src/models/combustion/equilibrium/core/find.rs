//! Adiabatic temperature search.
//!
//! Bisects on temperature until the products' enthalpy matches the
//! reactants'. Every trial temperature runs a full equilibrium evaluation,
//! so the search is strictly sequential.

mod config;
mod error;
mod problem;

pub use config::FindConfig;
pub use error::FindError;

use std::time::Instant;

use tracing::{info, warn};
use twine_core::Model;
use twine_solvers::equation::bisection;
use uom::si::{
    available_energy::joule_per_kilogram, f64::ThermodynamicTemperature,
    temperature_interval::kelvin as delta_kelvin, thermodynamic_temperature::kelvin,
};

use crate::support::{
    optimize::Optimizer,
    units::{SpecificEnthalpy, TemperatureDifference},
};

use super::{EquilibriumState, Known};

use problem::{EnthalpyProblem, TrialModel};

/// Converged adiabatic equilibrium.
#[derive(Debug, Clone, PartialEq)]
pub struct FindSolution {
    /// Equilibrium state at the final bisection midpoint.
    pub state: EquilibriumState,

    /// Bisection steps taken.
    pub iters: usize,

    /// Distinct temperatures evaluated, bounds included.
    pub evaluations: usize,
}

/// Finds the temperature at which the equilibrium products' enthalpy equals
/// the reactants' initial enthalpy.
///
/// The residual is evaluated at both bounds first. If either is a root it is
/// returned directly; if both share a sign the search fails fast. Otherwise
/// the bracket is halved, keeping the half whose ends straddle the root,
/// until it is no wider than `config.temp_tol`. The result is the state at
/// the last midpoint.
///
/// # Errors
///
/// Returns a [`FindError`] if the bracket is invalid or doesn't straddle a
/// root, an equilibrium evaluation fails, the iteration limit or timeout is
/// reached first, or the solver rejects its configuration.
pub fn find<O: Optimizer>(
    known: &Known,
    bracket: [ThermodynamicTemperature; 2],
    config: FindConfig,
    optimizer: &O,
) -> Result<FindSolution, FindError> {
    let started = Instant::now();
    let deadline = config.timeout.map(|timeout| started + timeout);

    let width = bracket[1].minus(bracket[0]).get::<delta_kelvin>();
    if !width.is_finite() || width == 0.0 {
        return Err(FindError::InvalidBracket {
            low: bracket[0],
            high: bracket[1],
        });
    }
    let [a, b] = bracket.map(|t| t.get::<kelvin>());
    let (low, high) = if width > 0.0 { (a, b) } else { (b, a) };

    let model = TrialModel::new(known, optimizer);
    let residual_tol = config.enthalpy_tol_j_per_kg();

    let low_state = endpoint(&model, low)?;
    let high_state = endpoint(&model, high)?;
    let low_residual = low_state.residual.get::<joule_per_kilogram>();
    let high_residual = high_state.residual.get::<joule_per_kilogram>();

    for state in [low_state, high_state] {
        if state.residual.get::<joule_per_kilogram>().abs() <= residual_tol {
            info!(temperature = state.temperature.get::<kelvin>(), "search bound is a root");
            return Ok(FindSolution {
                state,
                iters: 0,
                evaluations: model.evaluations(),
            });
        }
    }

    if low_residual.signum() == high_residual.signum() {
        return Err(FindError::Unbracketed {
            low: temperature(low),
            high: temperature(high),
            low_residual: enthalpy(low_residual),
            high_residual: enthalpy(high_residual),
        });
    }

    let temp_tol = config.temp_tol_kelvin();
    let mut search = Search {
        left: low,
        right: high,
        left_sign: low_residual.signum(),
        last_mid: None,
        converged: false,
        timed_out: false,
    };

    if deadline.is_some_and(|d| Instant::now() >= d) {
        return Err(deadline_exceeded(&search, started));
    }

    let result = bisection::solve(
        &model,
        &EnthalpyProblem,
        [low, high],
        &config.bisection(),
        |event: &bisection::Event<'_, _, _>| {
            let Ok(eval) = event.result() else {
                return None;
            };
            let x = eval.x[0];
            if x > search.left && x < search.right {
                search.narrow(x, eval.residuals[0], residual_tol, temp_tol);
            }
            if search.converged {
                return Some(bisection::Action::StopEarly);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                search.timed_out = true;
                return Some(bisection::Action::StopEarly);
            }
            None
        },
    );

    if let Some((temperature, source)) = model.take_failure() {
        return Err(FindError::Equilibrium {
            temperature,
            source,
        });
    }
    if search.timed_out {
        warn!(
            left = search.left,
            right = search.right,
            "adiabatic temperature search timed out"
        );
        return Err(deadline_exceeded(&search, started));
    }

    let solution = result?;
    let converged = search.converged || solution.status == bisection::Status::Converged;

    if !converged {
        let residual = model.best_residual().unwrap_or(solution.residual);
        warn!(
            left = search.left,
            right = search.right,
            residual,
            iters = solution.iters,
            "adiabatic temperature search did not converge"
        );
        return Err(FindError::NonConvergence {
            bracket: [temperature(search.left), temperature(search.right)],
            residual: enthalpy(residual),
            iters: solution.iters,
        });
    }

    let state = search
        .last_mid
        .and_then(|mid| model.cached(temperature(mid)))
        .unwrap_or(solution.snapshot.output);

    info!(
        temperature = state.temperature.get::<kelvin>(),
        iters = solution.iters,
        evaluations = model.evaluations(),
        elapsed = ?started.elapsed(),
        "found adiabatic equilibrium"
    );

    Ok(FindSolution {
        state,
        iters: solution.iters,
        evaluations: model.evaluations(),
    })
}

/// Bracket tracked alongside the solver so termination follows the
/// bracket width after each step.
struct Search {
    left: f64,
    right: f64,
    left_sign: f64,
    last_mid: Option<f64>,
    converged: bool,
    timed_out: bool,
}

impl Search {
    fn narrow(&mut self, mid: f64, residual: f64, residual_tol: f64, temp_tol: f64) {
        self.last_mid = Some(mid);
        if residual.abs() <= residual_tol {
            self.converged = true;
            return;
        }
        if residual.signum() == self.left_sign {
            self.left = mid;
        } else {
            self.right = mid;
        }
        self.converged = self.right - self.left <= temp_tol;
    }
}

fn endpoint<O: Optimizer>(model: &TrialModel<'_, O>, k: f64) -> Result<EquilibriumState, FindError> {
    model.call(&temperature(k)).map_err(|_| match model.take_failure() {
        Some((temperature, source)) => FindError::Equilibrium {
            temperature,
            source,
        },
        None => FindError::InvalidBracket {
            low: temperature(k),
            high: temperature(k),
        },
    })
}

fn deadline_exceeded(search: &Search, started: Instant) -> FindError {
    FindError::DeadlineExceeded {
        bracket: [temperature(search.left), temperature(search.right)],
        elapsed: started.elapsed(),
    }
}

fn temperature(k: f64) -> ThermodynamicTemperature {
    ThermodynamicTemperature::new::<kelvin>(k)
}

fn enthalpy(j_per_kg: f64) -> SpecificEnthalpy {
    SpecificEnthalpy::new::<joule_per_kilogram>(j_per_kg)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use approx::assert_relative_eq;
    use uom::si::f64::TemperatureInterval;

    use crate::models::combustion::equilibrium::core::{
        EquilibriumError, Phase, Species, SpeciesSet, TemperatureRange,
        test_support::{
            FixedOptimizer, SlowOptimizer, constant_species, default_optimizer, known,
            linear_known, species_range, temperature as kelvins,
        },
    };

    fn bracket(low: f64, high: f64) -> [ThermodynamicTemperature; 2] {
        [kelvins(low), kelvins(high)]
    }

    #[test]
    fn converges_within_tolerance() {
        let known = linear_known(3594.3);
        let solution = find(
            &known,
            bracket(1000.0, 5000.0),
            FindConfig::default(),
            &FixedOptimizer(Vec::new()),
        )
        .unwrap();

        let t = solution.state.temperature.get::<kelvin>();
        assert!((t - 3594.3).abs() <= 0.1, "temperature {t} is not within 0.1 K of the root");
    }

    #[test]
    fn midpoint_count_is_logarithmic() {
        // Width 4000 K at 0.1 K takes ceil(log2(40000)) = 16 midpoints.
        let known = linear_known(2718.28);
        let solution = find(
            &known,
            bracket(1000.0, 5000.0),
            FindConfig::default(),
            &FixedOptimizer(Vec::new()),
        )
        .unwrap();

        assert!(solution.evaluations - 2 <= 16, "{} midpoints", solution.evaluations - 2);
        assert!(solution.iters <= 16);
    }

    #[test]
    fn reversed_bounds_are_accepted() {
        let known = linear_known(1500.0);
        let solution = find(
            &known,
            bracket(3000.0, 1000.0),
            FindConfig::default(),
            &FixedOptimizer(Vec::new()),
        )
        .unwrap();

        assert_relative_eq!(solution.state.temperature.get::<kelvin>(), 1500.0, epsilon = 0.1);
    }

    #[test]
    fn root_on_a_bound_is_returned_directly() {
        let known = linear_known(2000.0);
        let solution = find(
            &known,
            bracket(2000.0, 4000.0),
            FindConfig {
                enthalpy_tol: enthalpy(1e-6),
                ..FindConfig::default()
            },
            &FixedOptimizer(Vec::new()),
        )
        .unwrap();

        assert_eq!(solution.iters, 0);
        assert_eq!(solution.evaluations, 2);
        assert_eq!(solution.state.temperature, kelvins(2000.0));
    }

    #[test]
    fn rejects_unbracketed_interval() {
        let known = linear_known(6000.0);
        let err = find(
            &known,
            bracket(1000.0, 5000.0),
            FindConfig::default(),
            &FixedOptimizer(Vec::new()),
        )
        .unwrap_err();

        let FindError::Unbracketed {
            low_residual,
            high_residual,
            ..
        } = err
        else {
            panic!("expected an unbracketed error, got {err:?}");
        };
        assert!(low_residual.get::<joule_per_kilogram>() < 0.0);
        assert!(high_residual.get::<joule_per_kilogram>() < 0.0);
    }

    #[test]
    fn rejects_degenerate_bracket() {
        let known = linear_known(2000.0);
        let err = find(
            &known,
            bracket(2000.0, 2000.0),
            FindConfig::default(),
            &FixedOptimizer(Vec::new()),
        )
        .unwrap_err();
        assert!(matches!(err, FindError::InvalidBracket { .. }));
    }

    #[test]
    fn reports_best_bracket_without_convergence() {
        let known = linear_known(3594.3);
        let err = find(
            &known,
            bracket(1000.0, 5000.0),
            FindConfig {
                max_iters: 4,
                ..FindConfig::default()
            },
            &FixedOptimizer(Vec::new()),
        )
        .unwrap_err();

        let FindError::NonConvergence { bracket, .. } = err else {
            panic!("expected non-convergence, got {err:?}");
        };
        let [left, right] = bracket.map(|t| t.get::<kelvin>());
        assert!(left < 3594.3 && 3594.3 < right);
        assert!(right - left < 4000.0);
    }

    #[test]
    fn zero_timeout_cancels_the_search() {
        let known = linear_known(3594.3);
        let err = find(
            &known,
            bracket(1000.0, 5000.0),
            FindConfig {
                timeout: Some(Duration::ZERO),
                ..FindConfig::default()
            },
            &FixedOptimizer(Vec::new()),
        )
        .unwrap_err();

        assert!(matches!(err, FindError::DeadlineExceeded { .. }));
    }

    #[test]
    fn timeout_between_steps_reports_narrowed_bracket() {
        // H2 holds all hydrogen with H = 4.184·T J/mol; H is free but pinned at zero.
        let mut h2 = [0.0; 9];
        h2[2] = 1000.0;
        let range = TemperatureRange::new(kelvins(300.0), kelvins(6000.0)).unwrap();
        let set = SpeciesSet::new(
            1,
            vec![
                Species::new("H2", Phase::Gas, h2, vec![2.0], range).unwrap(),
                constant_species("H", &[1.0], 200.0, 0.0),
            ],
        )
        .unwrap();
        let known = known(set, &[2.0], 20.0, 4.184 * 3594.3);

        // Each trial takes 50 ms: both bounds finish well before the
        // deadline, the first midpoint just before it, the second after it.
        let optimizer = SlowOptimizer {
            delay: Duration::from_millis(50),
            x: vec![0.0],
        };
        let err = find(
            &known,
            bracket(1000.0, 5000.0),
            FindConfig {
                timeout: Some(Duration::from_millis(175)),
                ..FindConfig::default()
            },
            &optimizer,
        )
        .unwrap_err();

        let FindError::DeadlineExceeded { bracket, elapsed } = err else {
            panic!("expected a timeout, got {err:?}");
        };
        let [left, right] = bracket.map(|t| t.get::<kelvin>());
        assert!(left < 3594.3 && 3594.3 < right);
        assert!(right - left < 4000.0, "bracket [{left}, {right}] never narrowed");
        assert!(elapsed >= Duration::from_millis(175));
    }

    #[test]
    fn surfaces_under_determined_reduction() {
        // H is valid only below 2000 K, so nothing can absorb hydrogen above it.
        let set = SpeciesSet::new(
            1,
            vec![species_range("H", Phase::Gas, &[1.0], 300.0, 2000.0)],
        )
        .unwrap();
        let known = known(set, &[1.0], 20.0, 0.0);

        let err = find(
            &known,
            bracket(1000.0, 3000.0),
            FindConfig::default(),
            &FixedOptimizer(Vec::new()),
        )
        .unwrap_err();

        let FindError::Equilibrium { temperature, source } = err else {
            panic!("expected an equilibrium error, got {err:?}");
        };
        assert_eq!(temperature, kelvins(3000.0));
        assert!(matches!(source, EquilibriumError::UnderDeterminedReduction { .. }));
    }

    #[test]
    fn finds_flame_temperature_with_optimizer() {
        // H2 <-> 2 H. Dissociation absorbs 4.184·40000 J per mol of H2, so the
        // flame temperature sits well below the frozen 3000 K.
        let mut h2 = [0.0; 9];
        h2[0] = 30.0;
        h2[2] = 1000.0;
        let mut h = [0.0; 9];
        h[0] = 25.0;
        h[1] = 20_000.0;
        h[2] = 500.0;
        let range = TemperatureRange::new(kelvins(300.0), kelvins(6000.0)).unwrap();
        let set = SpeciesSet::new(
            1,
            vec![
                Species::new("H2", Phase::Gas, h2, vec![2.0], range).unwrap(),
                Species::new("H", Phase::Gas, h, vec![1.0], range).unwrap(),
            ],
        )
        .unwrap();
        let known = known(set, &[10.0], 20.0, 4.184 * 5.0 * 3000.0);

        let config = FindConfig {
            temp_tol: TemperatureInterval::new::<delta_kelvin>(1.0),
            ..FindConfig::default()
        };
        let solution = find(&known, bracket(1000.0, 5000.0), config, &default_optimizer()).unwrap();

        let state = &solution.state;
        let residual = state.residual.get::<joule_per_kilogram>();
        assert!(
            residual.abs() < 4.184 * 20_000.0,
            "residual {residual} J/kg is not close to zero"
        );
        assert_relative_eq!(state.element_totals(known.species())[0], 10.0, max_relative = 1e-9);
        assert!(state.amounts.iter().all(|&n| n >= 0.0));
    }

    #[test]
    fn fixed_composition_matches_closed_form() {
        // Only H2, reserved at 5 mol/kg with constant enthalpy. The residual
        // vanishes everywhere, so the first bound is already a root.
        let set = SpeciesSet::new(1, vec![constant_species("H2", &[2.0], -100.0, 0.0)]).unwrap();
        let known = known(set, &[10.0], 20.0, 5.0 * (4.184 * -100.0));

        let solution = find(
            &known,
            bracket(1000.0, 2000.0),
            FindConfig {
                enthalpy_tol: enthalpy(1e-9),
                ..FindConfig::default()
            },
            &FixedOptimizer(Vec::new()),
        )
        .unwrap();
        assert_eq!(solution.iters, 0);
        assert_relative_eq!(solution.state.amounts[0], 5.0);
    }
}
