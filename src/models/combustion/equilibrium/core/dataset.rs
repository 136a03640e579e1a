//! JSON datasets of combustion products and propellant composition.
//!
//! Products are read from an array of records:
//!
//! ```json
//! [
//!   {
//!     "formula": "O",
//!     "coefficients": [45.168916, 58008.607, 5353.7423, -412.44632, 246.19247,
//!                      -86.140481, 17.415382, -1.8288189, 0.077299666],
//!     "phase": "gas",
//!     "temperature_range": { "min": 1000, "max": 5000 }
//!   }
//! ]
//! ```
//!
//! The propellant is a single record holding its enthalpy (J/kg) and its
//! conditional formula, mol of each element per kg:
//!
//! ```json
//! { "enthalpy": -1199461.0, "formula": { "H": 67.98, "O": 29.1 } }
//! ```
//!
//! Elements are tracked in the sorted order of the propellant formula keys.

use std::{collections::BTreeMap, fs, io, path::Path, path::PathBuf};

use serde::Deserialize;
use thiserror::Error;
use uom::si::{
    available_energy::joule_per_kilogram,
    f64::{Pressure, ThermodynamicTemperature},
    thermodynamic_temperature::kelvin,
};

use crate::support::{
    constraint::{Constrained, StrictlyPositive},
    units::SpecificEnthalpy,
};

use super::{
    ElementalInventory, InputError, Known, Phase, Species, SpeciesError, SpeciesSet,
    TemperatureRange, polynomial::Coefficients,
};

/// One combustion product as stored in a products file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductRecord {
    pub formula: String,
    pub coefficients: Coefficients,
    pub phase: Phase,
    pub temperature_range: RangeRecord,
}

/// Valid temperature range of a product, in kelvin.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RangeRecord {
    pub min: f64,
    pub max: f64,
}

/// Propellant enthalpy and conditional formula.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropellantRecord {
    /// Initial enthalpy, J/kg.
    pub enthalpy: f64,

    /// Mol of each element per kg of propellant.
    pub formula: BTreeMap<String, f64>,
}

/// Candidate products together with the propellant they come from.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub products: Vec<ProductRecord>,
    pub propellant: PropellantRecord,
}

impl Dataset {
    /// Parses products and propellant from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Json`] if either document is malformed.
    pub fn from_json(products: &str, propellant: &str) -> Result<Self, DatasetError> {
        Ok(Self {
            products: serde_json::from_str(products)?,
            propellant: serde_json::from_str(propellant)?,
        })
    }

    /// Reads products and propellant from JSON files.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] if a file can't be read or parsed.
    pub fn load(
        products: impl AsRef<Path>,
        propellant: impl AsRef<Path>,
    ) -> Result<Self, DatasetError> {
        Self::from_json(&read(products.as_ref())?, &read(propellant.as_ref())?)
    }

    /// Tracked element symbols, in stoichiometry order.
    #[must_use]
    pub fn elements(&self) -> Vec<&str> {
        self.propellant.formula.keys().map(String::as_str).collect()
    }

    /// Builds the species set, one stoichiometric row per product.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] if a formula can't be parsed, names an
    /// element the propellant doesn't contain, or a product is invalid.
    pub fn species_set(&self) -> Result<SpeciesSet, DatasetError> {
        let elements = self.elements();

        let species = self
            .products
            .iter()
            .map(|record| {
                let counts = parse_formula(&record.formula)?;
                let mut row = vec![0.0; elements.len()];
                for (symbol, count) in counts {
                    let index = elements.iter().position(|e| *e == symbol).ok_or_else(|| {
                        DatasetError::UnknownElement {
                            formula: record.formula.clone(),
                            element: symbol.clone(),
                        }
                    })?;
                    row[index] = f64::from(count);
                }

                let range = TemperatureRange::new(
                    ThermodynamicTemperature::new::<kelvin>(record.temperature_range.min),
                    ThermodynamicTemperature::new::<kelvin>(record.temperature_range.max),
                )?;
                Ok(Species::new(
                    record.formula.clone(),
                    record.phase,
                    record.coefficients,
                    row,
                    range,
                )?)
            })
            .collect::<Result<Vec<_>, DatasetError>>()?;

        Ok(SpeciesSet::new(elements.len(), species)?)
    }

    /// Builds validated inputs at the given chamber pressure.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] if the species set or inputs are invalid.
    pub fn known(
        &self,
        pressure: Constrained<Pressure, StrictlyPositive>,
    ) -> Result<Known, DatasetError> {
        let species = self.species_set()?;
        let inventory =
            ElementalInventory::new(self.propellant.formula.values().copied().collect())?;
        Ok(Known::new(
            species,
            inventory,
            pressure,
            SpecificEnthalpy::new::<joule_per_kilogram>(self.propellant.enthalpy),
        )?)
    }
}

/// Parses a chemical formula such as `H2O` or `Al2O3` into element counts.
///
/// A trailing parenthesized label, as in `Al2O3(l)`, is ignored. Repeated
/// elements are summed.
///
/// # Errors
///
/// Returns [`DatasetError::Formula`] if the formula is empty or contains
/// anything other than element symbols and counts.
pub fn parse_formula(formula: &str) -> Result<BTreeMap<String, u32>, DatasetError> {
    let body = match formula.find('(') {
        Some(open) if formula.ends_with(')') => &formula[..open],
        _ => formula,
    };

    let bad = |position: usize| DatasetError::Formula {
        formula: formula.to_owned(),
        position,
    };

    if body.is_empty() {
        return Err(bad(0));
    }

    let mut counts = BTreeMap::new();
    let mut chars = body.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if !c.is_ascii_uppercase() {
            return Err(bad(start));
        }
        let mut end = start + 1;
        while let Some(&(i, c)) = chars.peek() {
            if !c.is_ascii_lowercase() {
                break;
            }
            end = i + 1;
            chars.next();
        }
        let symbol = &body[start..end];

        let mut digits_end = end;
        while let Some(&(i, c)) = chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits_end = i + 1;
            chars.next();
        }
        let count = if digits_end == end {
            1
        } else {
            body[end..digits_end].parse().map_err(|_| bad(end))?
        };
        if count == 0 {
            return Err(bad(end));
        }

        *counts.entry(symbol.to_owned()).or_insert(0) += count;
    }

    Ok(counts)
}

fn read(path: &Path) -> Result<String, DatasetError> {
    fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_owned(),
        source,
    })
}

/// Errors that can occur while loading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed dataset JSON")]
    Json(#[from] serde_json::Error),

    #[error("invalid chemical formula {formula:?} at byte {position}")]
    Formula { formula: String, position: usize },

    #[error("{formula}: element {element} is not in the propellant formula")]
    UnknownElement { formula: String, element: String },

    #[error(transparent)]
    Species(#[from] SpeciesError),

    #[error(transparent)]
    Input(#[from] InputError),
}
