//! Chemical-equilibrium evaluation of combustion products.
//!
//! At a fixed temperature and pressure, the equilibrium composition is the
//! one that minimizes the mixture's Gibbs free energy while conserving every
//! chemical element the propellant supplies. Element conservation is enforced
//! exactly by reserving one single-element species per element, so the
//! optimizer only searches the remaining free amounts.
//!
//! The adiabatic flame temperature is then found by bisecting on the
//! difference between the products' enthalpy and the propellant's.

mod context;
mod dataset;
mod error;
mod evaluate;
mod find;
mod input;
pub mod polynomial;
mod reduction;
mod species;
mod state;

#[cfg(test)]
mod test_support;

pub use context::EquilibriumContext;
pub use dataset::{
    Dataset, DatasetError, ProductRecord, PropellantRecord, RangeRecord, parse_formula,
};
pub use error::EquilibriumError;
pub use evaluate::{bounds, evaluate, gibbs_energy, total_enthalpy};
pub use find::{FindConfig, FindError, FindSolution, find};
pub use input::{ElementalInventory, InputError, Known};
pub use species::{Phase, Species, SpeciesError, SpeciesSet, SpeciesTables, TemperatureRange};
pub use state::EquilibriumState;
