//! Box-constrained global optimization.
//!
//! The equilibrium engine only needs "given an objective and box constraints,
//! return a feasible vector that approximately minimizes the objective". The
//! [`Optimizer`] trait captures that contract so the engine doesn't depend on
//! any particular search strategy.
//!
//! [`DifferentialEvolution`] is the default implementation: a population
//! search that evaluates candidates in parallel on a dedicated worker pool.
//!
//! # Example
//!
//! ```
//! use twine_combustion::support::optimize::{
//!     Bound, DifferentialEvolution, DifferentialEvolutionConfig, Goal, Optimizer,
//! };
//!
//! let de = DifferentialEvolution::new(DifferentialEvolutionConfig {
//!     population_size: 20,
//!     workers: 2,
//!     ..DifferentialEvolutionConfig::default()
//! })
//! .unwrap();
//!
//! let bounds = [Bound::new(-4.0, 4.0).unwrap()];
//! let optimum = de
//!     .optimize(|x: &[f64]| (x[0] - 1.5).powi(2), &bounds, Goal::Minimize)
//!     .unwrap();
//!
//! assert!((optimum.x[0] - 1.5).abs() < 1e-4);
//! ```

mod bound;
mod differential_evolution;
mod error;

pub use bound::Bound;
pub use differential_evolution::{DifferentialEvolution, DifferentialEvolutionConfig, Stagnation};
pub use error::OptimizeError;

/// Direction of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Goal {
    #[default]
    Minimize,
    Maximize,
}

impl Goal {
    /// Maps an objective value onto a score where lower is always better.
    ///
    /// Applying the mapping twice returns the original value.
    #[must_use]
    pub fn score(self, value: f64) -> f64 {
        match self {
            Self::Minimize => value,
            Self::Maximize => -value,
        }
    }
}

/// Why an optimizer run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The best objective stopped improving.
    Converged,

    /// The generation limit was reached first.
    MaxGenerations,

    /// The configured timeout elapsed between generations.
    TimedOut,
}

/// Best point found by an optimizer run.
#[derive(Debug, Clone, PartialEq)]
pub struct Optimum {
    /// Best vector found. Always within the requested bounds.
    pub x: Vec<f64>,

    /// Objective value at `x`.
    pub value: f64,

    /// Number of completed generations (or iterations).
    pub generations: usize,

    /// Termination reason.
    pub status: Status,
}

/// A box-constrained optimizer.
///
/// Implementations may evaluate `objective` concurrently from several
/// threads, so it must be a pure function of its argument.
pub trait Optimizer {
    /// Searches `bounds` for the vector that minimizes (or maximizes) `objective`.
    ///
    /// # Errors
    ///
    /// Returns an [`OptimizeError`] if the search can't be performed.
    fn optimize<F>(&self, objective: F, bounds: &[Bound], goal: Goal) -> Result<Optimum, OptimizeError>
    where
        F: Fn(&[f64]) -> f64 + Sync;
}

impl<T: Optimizer> Optimizer for &T {
    fn optimize<F>(&self, objective: F, bounds: &[Bound], goal: Goal) -> Result<Optimum, OptimizeError>
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        (**self).optimize(objective, bounds, goal)
    }
}
