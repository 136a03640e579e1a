//! Equilibrium composition at a fixed temperature.
//!
//! At a given temperature and pressure the equilibrium composition is the
//! one that minimizes the total Gibbs free energy of the products subject
//! to the elemental mass balances. The mass balances are eliminated by the
//! context's reservation, leaving a box-constrained search over the free
//! species amounts.

use tracing::debug;
use uom::si::{
    available_energy::joule_per_kilogram,
    f64::{SpecificHeatCapacity, ThermodynamicTemperature},
    specific_heat_capacity::joule_per_kilogram_kelvin,
};

use crate::support::{
    optimize::{Bound, Goal, OptimizeError, Optimizer},
    units::{SpecificEnthalpy, SpecificEntropy, SpecificGibbsEnergy},
};

use super::{
    EquilibriumContext, EquilibriumError, EquilibriumState, Known, Phase, polynomial,
    reduction::Composition,
};

/// Total Gibbs free energy of the composition, in J/kg.
///
/// Gas species use their partial pressure `n·P / n_gas`. Condensed species
/// carry no pressure correction. A reduced vector that violates a mass
/// balance yields the infeasibility penalty instead, which is strictly
/// positive.
///
/// This is the optimizer's objective. It reads nothing outside `ctx`.
#[must_use]
pub fn gibbs_energy(ctx: &EquilibriumContext<'_>, reduced: &[f64]) -> f64 {
    match ctx.reconstruct(reduced) {
        Composition::Feasible(full) => mixture_gibbs_energy(ctx, &full),
        Composition::Infeasible { penalty } => penalty,
    }
}

/// Total enthalpy of the composition, in J/kg.
///
/// Infeasible vectors yield the same penalty as [`gibbs_energy`].
#[must_use]
pub fn total_enthalpy(ctx: &EquilibriumContext<'_>, reduced: &[f64]) -> f64 {
    match ctx.reconstruct(reduced) {
        Composition::Feasible(full) => mixture_enthalpy(ctx, &full),
        Composition::Infeasible { penalty } => penalty,
    }
}

/// Box constraints for the free species.
///
/// Each free species is bounded by `[0, min_e(target_e / stoich_e)]` over
/// the elements it contains, so no single element is oversupplied.
///
/// # Errors
///
/// Returns an [`OptimizeError`] if a bound can't be formed.
pub fn bounds(ctx: &EquilibriumContext<'_>) -> Result<Vec<Bound>, OptimizeError> {
    let reduction = ctx.reduction();
    let targets = reduction.targets();

    reduction
        .free_positions()
        .iter()
        .map(|&position| {
            let upper = reduction
                .row(position)
                .iter()
                .zip(targets)
                .filter(|(s, _)| **s > 0.0)
                .map(|(s, target)| target / s)
                .fold(f64::INFINITY, f64::min);
            Bound::new(0.0, upper)
        })
        .collect()
}

/// Finds the equilibrium composition at `temperature`.
///
/// Builds the context for the trial, minimizes [`gibbs_energy`] over the
/// free species and reports the products' properties, including the
/// enthalpy residual against the reactants.
///
/// # Errors
///
/// Returns an [`EquilibriumError`] if the reduction is under-determined, the
/// optimizer fails, or it returns a vector of the wrong length or an
/// infeasible composition.
pub fn evaluate<O: Optimizer>(
    known: &Known,
    temperature: ThermodynamicTemperature,
    optimizer: &O,
) -> Result<EquilibriumState, EquilibriumError> {
    let ctx = EquilibriumContext::new(known, temperature)?;

    let reduced = if ctx.free_count() == 0 {
        Vec::new()
    } else {
        let bounds = bounds(&ctx)?;
        let optimum =
            optimizer.optimize(|x: &[f64]| gibbs_energy(&ctx, x), &bounds, Goal::Minimize)?;
        if optimum.x.len() != bounds.len() {
            return Err(EquilibriumError::Dimension {
                temperature,
                expected: bounds.len(),
                found: optimum.x.len(),
            });
        }
        debug!(
            temperature = ctx.kelvin(),
            free = ctx.free_count(),
            generations = optimum.generations,
            status = ?optimum.status,
            gibbs = optimum.value,
            "minimized gibbs energy"
        );
        optimum.x
    };

    let full = match ctx.reconstruct(&reduced) {
        Composition::Feasible(full) => full,
        Composition::Infeasible { penalty } => {
            return Err(EquilibriumError::InfeasibleOptimum {
                temperature,
                penalty,
            });
        }
    };

    let state = summarize(&ctx, full);
    debug!(
        temperature = ctx.kelvin(),
        residual = state.residual.get::<joule_per_kilogram>(),
        "evaluated trial temperature"
    );
    Ok(state)
}

fn summarize(ctx: &EquilibriumContext<'_>, full: Vec<f64>) -> EquilibriumState {
    let t = ctx.kelvin();
    let enthalpy = mixture_enthalpy(ctx, &full);

    let mut entropy = 0.0;
    let mut heat_capacity = 0.0;
    for (position, (&n, p)) in full.iter().zip(partial_pressures(ctx, &full)).enumerate() {
        let c = ctx.species_at(position).coefficients();
        entropy += n * polynomial::entropy(c, t, p);
        heat_capacity += n * polynomial::heat_capacity(c, t);
    }

    EquilibriumState {
        temperature: ctx.temperature(),
        pressure: ctx.pressure(),
        species: ctx.active_species().to_vec(),
        gas_count: ctx.gas_count(),
        enthalpy: SpecificEnthalpy::new::<joule_per_kilogram>(enthalpy),
        gibbs_energy: SpecificGibbsEnergy::new::<joule_per_kilogram>(mixture_gibbs_energy(ctx, &full)),
        entropy: SpecificEntropy::new::<joule_per_kilogram_kelvin>(entropy),
        heat_capacity: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(heat_capacity),
        residual: SpecificEnthalpy::new::<joule_per_kilogram>(
            enthalpy - ctx.known().initial_enthalpy_j_per_kg(),
        ),
        amounts: full,
    }
}

fn mixture_gibbs_energy(ctx: &EquilibriumContext<'_>, full: &[f64]) -> f64 {
    let t = ctx.kelvin();
    full.iter()
        .zip(partial_pressures(ctx, full))
        .enumerate()
        .map(|(position, (&n, p))| {
            n * polynomial::gibbs_energy(ctx.species_at(position).coefficients(), t, p)
        })
        .sum()
}

fn mixture_enthalpy(ctx: &EquilibriumContext<'_>, full: &[f64]) -> f64 {
    let t = ctx.kelvin();
    full.iter()
        .enumerate()
        .map(|(position, &n)| n * polynomial::enthalpy(ctx.species_at(position).coefficients(), t))
        .sum()
}

/// Partial pressure of each active species, zero for condensed species.
///
/// Absent gases also get zero, the no-correction value, since their
/// contribution vanishes anyway.
fn partial_pressures<'a>(
    ctx: &'a EquilibriumContext<'_>,
    full: &'a [f64],
) -> impl Iterator<Item = f64> + 'a {
    let gas = &full[..ctx.gas_count()];
    let total: f64 = gas.iter().sum();
    let p = ctx.pascal();

    full.iter().enumerate().map(move |(position, &n)| {
        debug_assert_eq!(
            ctx.species_at(position).phase() == Phase::Gas,
            position < gas.len()
        );
        if position < gas.len() && n > 0.0 {
            n * p / total
        } else {
            0.0
        }
    })
}
