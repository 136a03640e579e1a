use uom::si::{
    f64::{Pressure, ThermodynamicTemperature},
    thermodynamic_temperature::kelvin,
};

use super::{
    EquilibriumError, Known,
    reduction::{Composition, Reduction},
    species::Species,
};

/// Per-trial view of the problem at one temperature.
///
/// Holds the species active at the trial temperature (gas species first)
/// and their reservation. A context is read-only once built, so objective
/// evaluations may share it across threads. A new context is built for each
/// trial temperature.
#[derive(Debug, Clone)]
pub struct EquilibriumContext<'a> {
    known: &'a Known,
    temperature: ThermodynamicTemperature,
    active: Vec<usize>,
    gas_count: usize,
    reduction: Reduction<'a>,
}

impl<'a> EquilibriumContext<'a> {
    /// Selects active species and reserves one species per element.
    ///
    /// # Errors
    ///
    /// Returns [`EquilibriumError::UnderDeterminedReduction`] if some element
    /// has no single-element species among the active species.
    pub fn new(
        known: &'a Known,
        temperature: ThermodynamicTemperature,
    ) -> Result<Self, EquilibriumError> {
        let species = known.species();
        let active = species.active(temperature);
        let gas_count = active.partition_point(|&i| i < species.gas_count());

        let rows = active.iter().map(|&i| species[i].stoichiometry()).collect();
        let reduction = Reduction::new(rows, known.inventory().as_slice()).map_err(|err| {
            EquilibriumError::UnderDeterminedReduction {
                temperature,
                unclaimed_elements: err.elements,
            }
        })?;

        Ok(Self {
            known,
            temperature,
            active,
            gas_count,
            reduction,
        })
    }

    #[must_use]
    pub fn known(&self) -> &'a Known {
        self.known
    }

    #[must_use]
    pub fn temperature(&self) -> ThermodynamicTemperature {
        self.temperature
    }

    #[must_use]
    pub fn pressure(&self) -> Pressure {
        self.known.pressure()
    }

    /// Species-set indices of the active species, gas species first.
    #[must_use]
    pub fn active_species(&self) -> &[usize] {
        &self.active
    }

    /// Number of active gas species.
    #[must_use]
    pub fn gas_count(&self) -> usize {
        self.gas_count
    }

    /// Number of free optimization variables.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.reduction.free_count()
    }

    /// Species-set indices of the reserved species.
    #[must_use]
    pub fn reserved_species(&self) -> Vec<usize> {
        self.reduction
            .reserved_positions()
            .map(|position| self.active[position])
            .collect()
    }

    /// Elements claimed by reserved species, in species order.
    #[must_use]
    pub fn reserved_elements(&self) -> Vec<usize> {
        self.reduction.reserved_elements().collect()
    }

    /// `(species index, element index)` for each reserved species.
    #[must_use]
    pub fn pairing(&self) -> Vec<(usize, usize)> {
        self.reduction
            .pairing()
            .iter()
            .map(|&(position, element)| (self.active[position], element))
            .collect()
    }

    /// Rebuilds the full composition from a reduced vector.
    ///
    /// Returns `None` if the reduced vector doesn't hold one amount per free
    /// species or violates an elemental mass balance.
    #[must_use]
    pub fn full_composition(&self, reduced: &[f64]) -> Option<Vec<f64>> {
        if reduced.len() != self.free_count() {
            return None;
        }
        match self.reconstruct(reduced) {
            Composition::Feasible(full) => Some(full),
            Composition::Infeasible { .. } => None,
        }
    }

    /// Drops reserved entries from a full composition.
    ///
    /// Returns `None` unless `full` has one amount per active species.
    #[must_use]
    pub fn reduced_composition(&self, full: &[f64]) -> Option<Vec<f64>> {
        (full.len() == self.active.len()).then(|| self.reduction.reduce(full))
    }

    pub(super) fn reconstruct(&self, reduced: &[f64]) -> Composition {
        self.reduction.reconstruct(reduced)
    }

    pub(super) fn reduction(&self) -> &Reduction<'a> {
        &self.reduction
    }

    /// Species at an active position.
    pub(super) fn species_at(&self, position: usize) -> &'a Species {
        &self.known.species()[self.active[position]]
    }

    pub(super) fn kelvin(&self) -> f64 {
        self.temperature.get::<kelvin>()
    }

    pub(super) fn pascal(&self) -> f64 {
        self.known.pressure_pa()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::combustion::equilibrium::core::test_support::{
        known, species_range, temperature,
    };
    use crate::models::combustion::equilibrium::core::{Phase, SpeciesSet};

    #[test]
    fn reservation_follows_active_species() {
        // H2 is valid only above 2000 K, H everywhere, H2O(l) only below 2000 K.
        let set = SpeciesSet::new(
            2,
            vec![
                species_range("H2O(l)", Phase::Condensed, &[2.0, 1.0], 300.0, 2000.0),
                species_range("H2", Phase::Gas, &[2.0, 0.0], 2000.0, 6000.0),
                species_range("H", Phase::Gas, &[1.0, 0.0], 300.0, 6000.0),
                species_range("O", Phase::Gas, &[0.0, 1.0], 300.0, 6000.0),
            ],
        )
        .unwrap();
        let known = known(set, &[10.0, 2.0], 20.0, 0.0);

        let hot = EquilibriumContext::new(&known, temperature(3000.0)).unwrap();
        assert_eq!(hot.active_species(), [0, 1, 2]);
        assert_eq!(hot.gas_count(), 3);
        assert_eq!(hot.pairing(), [(0, 0), (2, 1)]);
        assert_eq!(hot.free_count(), 1);

        let cold = EquilibriumContext::new(&known, temperature(1000.0)).unwrap();
        assert_eq!(cold.active_species(), [1, 2, 3]);
        assert_eq!(cold.gas_count(), 2);
        assert_eq!(cold.reserved_species(), [1, 2]);
        assert_eq!(cold.reserved_elements(), [0, 1]);
    }

    #[test]
    fn under_determined_at_temperature() {
        let set = SpeciesSet::new(
            1,
            vec![species_range("H", Phase::Gas, &[1.0], 300.0, 2000.0)],
        )
        .unwrap();
        let known = known(set, &[1.0], 20.0, 0.0);

        let err = EquilibriumContext::new(&known, temperature(2500.0)).unwrap_err();
        assert!(matches!(
            err,
            EquilibriumError::UnderDeterminedReduction { ref unclaimed_elements, .. }
                if unclaimed_elements == &[0]
        ));
    }

    #[test]
    fn composition_lengths_are_checked() {
        let set = SpeciesSet::new(
            1,
            vec![
                species_range("H2", Phase::Gas, &[2.0], 300.0, 6000.0),
                species_range("H", Phase::Gas, &[1.0], 300.0, 6000.0),
            ],
        )
        .unwrap();
        let known = known(set, &[10.0], 20.0, 0.0);
        let ctx = EquilibriumContext::new(&known, temperature(3000.0)).unwrap();

        assert_eq!(ctx.reduced_composition(&[4.0, 2.0]), Some(vec![2.0]));
        assert_eq!(ctx.reduced_composition(&[4.0]), None);
        assert_eq!(ctx.full_composition(&[2.0]), Some(vec![4.0, 2.0]));
        assert_eq!(ctx.full_composition(&[]), None);
        assert_eq!(ctx.full_composition(&[2.0, 1.0]), None);
    }

    #[test]
    fn context_is_shareable_across_threads() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<EquilibriumContext<'_>>();
    }
}
