use std::{thread, time::Duration};

use uom::si::{
    available_energy::joule_per_kilogram,
    f64::{Pressure, ThermodynamicTemperature},
    pressure::atmosphere,
    thermodynamic_temperature::kelvin,
};

use crate::support::{
    constraint::{Constrained, StrictlyPositive},
    optimize::{
        Bound, DifferentialEvolution, DifferentialEvolutionConfig, Goal, OptimizeError, Optimizer,
        Optimum, Stagnation, Status,
    },
    units::SpecificEnthalpy,
};

use super::{ElementalInventory, Known, Phase, Species, SpeciesSet, TemperatureRange};

pub(super) fn temperature(k: f64) -> ThermodynamicTemperature {
    ThermodynamicTemperature::new::<kelvin>(k)
}

pub(super) fn pressure(atm: f64) -> Constrained<Pressure, StrictlyPositive> {
    StrictlyPositive::new(Pressure::new::<atmosphere>(atm)).unwrap()
}

pub(super) fn species_range(
    name: &str,
    phase: Phase,
    stoichiometry: &[f64],
    min: f64,
    max: f64,
) -> Species {
    Species::new(
        name,
        phase,
        [0.0; 9],
        stoichiometry.to_vec(),
        TemperatureRange::new(temperature(min), temperature(max)).unwrap(),
    )
    .unwrap()
}

/// Species with temperature-independent enthalpy `4.184·h` and entropy `4.184·s`.
pub(super) fn constant_species(name: &str, stoichiometry: &[f64], h: f64, s: f64) -> Species {
    constant(name, Phase::Gas, stoichiometry, h, s)
}

pub(super) fn constant_condensed(name: &str, stoichiometry: &[f64], h: f64, s: f64) -> Species {
    constant(name, Phase::Condensed, stoichiometry, h, s)
}

fn constant(name: &str, phase: Phase, stoichiometry: &[f64], h: f64, s: f64) -> Species {
    let mut c = [0.0; 9];
    c[0] = s;
    c[1] = h;
    Species::new(
        name,
        phase,
        c,
        stoichiometry.to_vec(),
        TemperatureRange::new(temperature(300.0), temperature(6000.0)).unwrap(),
    )
    .unwrap()
}

pub(super) fn known(set: SpeciesSet, inventory: &[f64], atm: f64, enthalpy: f64) -> Known {
    Known::new(
        set,
        ElementalInventory::new(inventory.to_vec()).unwrap(),
        pressure(atm),
        SpecificEnthalpy::new::<joule_per_kilogram>(enthalpy),
    )
    .unwrap()
}

/// H2 (reserved) and H (free) over a single element.
pub(super) fn hydrogen_set() -> SpeciesSet {
    SpeciesSet::new(
        1,
        vec![
            constant_species("H2", &[2.0], -100.0, 0.0),
            constant_species("H", &[1.0], 200.0, 0.0),
        ],
    )
    .unwrap()
}

pub(super) fn hydrogen_known(target: f64, initial_enthalpy: f64) -> Known {
    known(hydrogen_set(), &[target], 20.0, initial_enthalpy)
}

/// A single reserved species with `H = 4.184·T` J/mol at 1 mol/kg.
///
/// The enthalpy residual is linear in temperature and crosses zero at `root`.
pub(super) fn linear_known(root: f64) -> Known {
    let mut c = [0.0; 9];
    c[2] = 1000.0;
    let set = SpeciesSet::new(
        1,
        vec![
            Species::new(
                "X",
                Phase::Gas,
                c,
                vec![1.0],
                TemperatureRange::new(temperature(100.0), temperature(10_000.0)).unwrap(),
            )
            .unwrap(),
        ],
    )
    .unwrap();
    known(set, &[1.0], 20.0, 4.184 * root)
}

pub(super) fn default_optimizer() -> DifferentialEvolution {
    DifferentialEvolution::new(DifferentialEvolutionConfig {
        population_size: 30,
        workers: 2,
        max_generations: 300,
        stagnation: Stagnation {
            generations: 40,
            threshold: 1e-10,
        },
        ..DifferentialEvolutionConfig::default()
    })
    .unwrap()
}

/// Optimizer that always returns the same vector.
#[derive(Debug, Clone)]
pub(super) struct FixedOptimizer(pub(super) Vec<f64>);

impl Optimizer for FixedOptimizer {
    fn optimize<F>(&self, objective: F, bounds: &[Bound], _goal: Goal) -> Result<Optimum, OptimizeError>
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        let value = if self.0.len() == bounds.len() {
            objective(&self.0)
        } else {
            f64::NAN
        };
        Ok(Optimum {
            x: self.0.clone(),
            value,
            generations: 0,
            status: Status::Converged,
        })
    }
}

/// Optimizer that sleeps before returning a fixed vector.
#[derive(Debug, Clone)]
pub(super) struct SlowOptimizer {
    pub(super) delay: Duration,
    pub(super) x: Vec<f64>,
}

impl Optimizer for SlowOptimizer {
    fn optimize<F>(&self, objective: F, bounds: &[Bound], goal: Goal) -> Result<Optimum, OptimizeError>
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        thread::sleep(self.delay);
        FixedOptimizer(self.x.clone()).optimize(objective, bounds, goal)
    }
}
