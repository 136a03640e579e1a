use thiserror::Error;
use uom::si::{available_energy::joule_per_kilogram, f64::Pressure, pressure::pascal};

use crate::support::{
    constraint::{Constrained, ConstraintError, NonNegative, StrictlyPositive},
    units::SpecificEnthalpy,
};

use super::species::SpeciesSet;

/// Reactant elemental content, mol of each tracked element per kg of propellant.
///
/// Entries follow the element ordering of the species stoichiometry rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementalInventory {
    targets: Vec<f64>,
}

impl ElementalInventory {
    /// Creates an inventory from per-element amounts.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Inventory`] if an entry is negative or `NaN`.
    pub fn new(targets: Vec<f64>) -> Result<Self, InputError> {
        for (element, &value) in targets.iter().enumerate() {
            NonNegative::new(value).map_err(|source| InputError::Inventory { element, source })?;
        }
        Ok(Self { targets })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.targets
    }
}

/// Everything needed to evaluate combustion products at a trial temperature.
#[derive(Debug, Clone)]
pub struct Known {
    species: SpeciesSet,
    inventory: ElementalInventory,
    pressure: Constrained<Pressure, StrictlyPositive>,
    initial_enthalpy: SpecificEnthalpy,
}

impl Known {
    /// Bundles validated inputs.
    ///
    /// # Errors
    ///
    /// Returns an [`InputError`] if the inventory doesn't have one entry per
    /// tracked element or the initial enthalpy isn't finite.
    pub fn new(
        species: SpeciesSet,
        inventory: ElementalInventory,
        pressure: Constrained<Pressure, StrictlyPositive>,
        initial_enthalpy: SpecificEnthalpy,
    ) -> Result<Self, InputError> {
        if inventory.len() != species.element_count() {
            return Err(InputError::InventoryLength {
                expected: species.element_count(),
                found: inventory.len(),
            });
        }
        let h = initial_enthalpy.get::<joule_per_kilogram>();
        if !h.is_finite() {
            return Err(InputError::InitialEnthalpy { value: h });
        }
        Ok(Self {
            species,
            inventory,
            pressure,
            initial_enthalpy,
        })
    }

    #[must_use]
    pub fn species(&self) -> &SpeciesSet {
        &self.species
    }

    #[must_use]
    pub fn inventory(&self) -> &ElementalInventory {
        &self.inventory
    }

    /// Chamber pressure.
    #[must_use]
    pub fn pressure(&self) -> Pressure {
        self.pressure.get()
    }

    /// Reactant enthalpy the products must match.
    #[must_use]
    pub fn initial_enthalpy(&self) -> SpecificEnthalpy {
        self.initial_enthalpy
    }

    pub(super) fn pressure_pa(&self) -> f64 {
        self.pressure.get().get::<pascal>()
    }

    pub(super) fn initial_enthalpy_j_per_kg(&self) -> f64 {
        self.initial_enthalpy.get::<joule_per_kilogram>()
    }
}

/// Errors that can occur while assembling [`Known`] inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("inventory entry for element {element} is invalid")]
    Inventory {
        element: usize,
        #[source]
        source: ConstraintError,
    },

    #[error("inventory has {found} entries but {expected} elements are tracked")]
    InventoryLength { expected: usize, found: usize },

    #[error("initial enthalpy must be finite, got {value} J/kg")]
    InitialEnthalpy { value: f64 },
}
