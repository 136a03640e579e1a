use uom::si::f64::{Pressure, SpecificHeatCapacity, ThermodynamicTemperature};

use crate::support::units::{SpecificEnthalpy, SpecificEntropy, SpecificGibbsEnergy};

use super::species::SpeciesSet;

/// Equilibrium composition and mixture properties at one temperature.
///
/// Amounts are in mol per kilogram of propellant, so mixture totals are
/// specific (per kilogram).
#[derive(Debug, Clone, PartialEq)]
pub struct EquilibriumState {
    /// Trial temperature.
    pub temperature: ThermodynamicTemperature,

    /// Chamber pressure.
    pub pressure: Pressure,

    /// Species-set indices of the active species, gas species first.
    pub species: Vec<usize>,

    /// Amount of each active species, aligned with `species`.
    pub amounts: Vec<f64>,

    /// Number of gas species at the front of `species`.
    pub gas_count: usize,

    /// Total enthalpy of the products.
    pub enthalpy: SpecificEnthalpy,

    /// Total Gibbs free energy of the products.
    pub gibbs_energy: SpecificGibbsEnergy,

    /// Total entropy, with gas entropies taken at their partial pressures.
    pub entropy: SpecificEntropy,

    /// Frozen heat capacity of the mixture.
    pub heat_capacity: SpecificHeatCapacity,

    /// `enthalpy − initial enthalpy`.
    pub residual: SpecificEnthalpy,
}

impl EquilibriumState {
    /// Amount of the species with the given species-set index.
    ///
    /// Returns `None` if the species isn't active at this temperature.
    #[must_use]
    pub fn amount_of(&self, species: usize) -> Option<f64> {
        self.species
            .iter()
            .position(|&i| i == species)
            .map(|position| self.amounts[position])
    }

    /// Total amount of gas species.
    #[must_use]
    pub fn gas_amount(&self) -> f64 {
        self.amounts[..self.gas_count].iter().sum()
    }

    /// Mole fraction of each gas species, as `(species index, fraction)`.
    ///
    /// Empty if there is no gas.
    #[must_use]
    pub fn gas_mole_fractions(&self) -> Vec<(usize, f64)> {
        let total = self.gas_amount();
        if total <= 0.0 {
            return Vec::new();
        }
        self.species[..self.gas_count]
            .iter()
            .zip(&self.amounts)
            .map(|(&i, &n)| (i, n / total))
            .collect()
    }

    /// Amount of each element held by the products.
    ///
    /// At equilibrium this reproduces the reactant inventory.
    #[must_use]
    pub fn element_totals(&self, set: &SpeciesSet) -> Vec<f64> {
        let mut totals = vec![0.0; set.element_count()];
        for (&i, &n) in self.species.iter().zip(&self.amounts) {
            for (total, s) in totals.iter_mut().zip(set[i].stoichiometry()) {
                *total += s * n;
            }
        }
        totals
    }
}
