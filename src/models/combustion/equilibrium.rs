//! Chemical-equilibrium combustion model.
//!
//! [`CombustionEquilibrium`] is a [`twine_core::Model`] that maps a trial
//! temperature to the equilibrium state of the combustion products, and
//! finds the adiabatic flame temperature with [`CombustionEquilibrium::adiabatic`].
//! The computational core is in the internal `core` module.
//!
//! # Example
//!
//! ```
//! use twine_combustion::{
//!     models::combustion::equilibrium::{CombustionEquilibrium, Dataset, FindConfig},
//!     support::{
//!         constraint::StrictlyPositive,
//!         optimize::{DifferentialEvolution, DifferentialEvolutionConfig},
//!     },
//! };
//! use uom::si::{
//!     f64::{Pressure, ThermodynamicTemperature},
//!     pressure::atmosphere,
//!     thermodynamic_temperature::kelvin,
//! };
//!
//! // Hydrogen that may dissociate into atoms.
//! let products = r#"[
//!     { "formula": "H2", "coefficients": [30, 0, 1000, 0, 0, 0, 0, 0, 0],
//!       "phase": "gas", "temperature_range": { "min": 300, "max": 6000 } },
//!     { "formula": "H", "coefficients": [25, 20000, 500, 0, 0, 0, 0, 0, 0],
//!       "phase": "gas", "temperature_range": { "min": 300, "max": 6000 } }
//! ]"#;
//! let propellant = r#"{ "enthalpy": 62760.0, "formula": { "H": 10.0 } }"#;
//!
//! let dataset = Dataset::from_json(products, propellant).unwrap();
//! let pressure = StrictlyPositive::new(Pressure::new::<atmosphere>(1.0)).unwrap();
//! let optimizer = DifferentialEvolution::new(DifferentialEvolutionConfig {
//!     population_size: 20,
//!     workers: 2,
//!     ..DifferentialEvolutionConfig::default()
//! })
//! .unwrap();
//!
//! let model = CombustionEquilibrium::new(dataset.known(pressure).unwrap(), optimizer);
//! let solution = model
//!     .adiabatic(
//!         [
//!             ThermodynamicTemperature::new::<kelvin>(1000.0),
//!             ThermodynamicTemperature::new::<kelvin>(5000.0),
//!         ],
//!         FindConfig::default(),
//!     )
//!     .unwrap();
//!
//! // Dissociation keeps the flame below the 3000 K of frozen H2.
//! let t = solution.state.temperature.get::<kelvin>();
//! assert!(t > 1000.0 && t < 3000.0);
//! ```

mod core;

pub use self::core::{
    Dataset, DatasetError, ElementalInventory, EquilibriumContext, EquilibriumError,
    EquilibriumState, FindConfig, FindError, FindSolution, InputError, Known, Phase,
    ProductRecord, PropellantRecord, RangeRecord, Species, SpeciesError, SpeciesSet,
    SpeciesTables, TemperatureRange, bounds, evaluate, find, gibbs_energy, parse_formula,
    polynomial, total_enthalpy,
};

use twine_core::Model;
use uom::si::f64::ThermodynamicTemperature;

use crate::support::optimize::Optimizer;

/// Equilibrium combustion products of one propellant at one chamber pressure.
///
/// Calling the model evaluates equilibrium at the input temperature.
#[derive(Debug, Clone)]
pub struct CombustionEquilibrium<O> {
    known: Known,
    optimizer: O,
}

impl<O: Optimizer> CombustionEquilibrium<O> {
    /// Creates a model from validated inputs and an optimizer.
    #[must_use]
    pub fn new(known: Known, optimizer: O) -> Self {
        Self { known, optimizer }
    }

    #[must_use]
    pub fn known(&self) -> &Known {
        &self.known
    }

    #[must_use]
    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    /// Finds the adiabatic flame temperature within `bracket`.
    ///
    /// See [`find`] for the search itself.
    ///
    /// # Errors
    ///
    /// Returns a [`FindError`] if the search fails.
    pub fn adiabatic(
        &self,
        bracket: [ThermodynamicTemperature; 2],
        config: FindConfig,
    ) -> Result<FindSolution, FindError> {
        find(&self.known, bracket, config, &self.optimizer)
    }
}

impl<O: Optimizer> Model for CombustionEquilibrium<O> {
    type Input = ThermodynamicTemperature;
    type Output = EquilibriumState;
    type Error = EquilibriumError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        evaluate(&self.known, *input, &self.optimizer)
    }
}
