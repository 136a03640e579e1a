use serde::Deserialize;
use thiserror::Error;
use uom::si::{f64::ThermodynamicTemperature, thermodynamic_temperature::kelvin};

use super::polynomial::Coefficients;

/// Phase of a combustion product.
///
/// Gas species contribute a partial-pressure term to their entropy.
/// Condensed species (liquids and solids) don't.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Gas,
    Condensed,
}

/// Half-open temperature interval `[min, max)` over which a species' polynomial is valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRange {
    min: ThermodynamicTemperature,
    max: ThermodynamicTemperature,
}

impl TemperatureRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns [`SpeciesError::TemperatureRange`] unless `min < max` and both are finite.
    pub fn new(
        min: ThermodynamicTemperature,
        max: ThermodynamicTemperature,
    ) -> Result<Self, SpeciesError> {
        let (lo, hi) = (min.get::<kelvin>(), max.get::<kelvin>());
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return Err(SpeciesError::TemperatureRange { min: lo, max: hi });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn min(&self) -> ThermodynamicTemperature {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> ThermodynamicTemperature {
        self.max
    }

    /// Returns `true` if `min <= temperature < max`.
    #[must_use]
    pub fn contains(&self, temperature: ThermodynamicTemperature) -> bool {
        self.min <= temperature && temperature < self.max
    }
}

/// A candidate combustion product.
///
/// Each species holds its thermochemical polynomial and one stoichiometric
/// entry per tracked chemical element (zero when the element is absent).
/// Species are immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    name: String,
    phase: Phase,
    coefficients: Coefficients,
    stoichiometry: Vec<f64>,
    range: TemperatureRange,
}

impl Species {
    /// Creates a species.
    ///
    /// # Errors
    ///
    /// Returns a [`SpeciesError`] if a coefficient isn't finite, a
    /// stoichiometric entry is negative or not finite, or the species
    /// contains no element at all.
    pub fn new(
        name: impl Into<String>,
        phase: Phase,
        coefficients: Coefficients,
        stoichiometry: Vec<f64>,
        range: TemperatureRange,
    ) -> Result<Self, SpeciesError> {
        let name = name.into();

        if let Some((index, &value)) = coefficients.iter().enumerate().find(|(_, c)| !c.is_finite()) {
            return Err(SpeciesError::Coefficient {
                species: name,
                index,
                value,
            });
        }

        if let Some((element, &value)) = stoichiometry
            .iter()
            .enumerate()
            .find(|(_, s)| !s.is_finite() || **s < 0.0)
        {
            return Err(SpeciesError::Stoichiometry {
                species: name,
                element,
                value,
            });
        }

        if stoichiometry.iter().all(|&s| s == 0.0) {
            return Err(SpeciesError::NoElements { species: name });
        }

        Ok(Self {
            name,
            phase,
            coefficients,
            stoichiometry,
            range,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    /// Stoichiometric row, one entry per tracked element.
    #[must_use]
    pub fn stoichiometry(&self) -> &[f64] {
        &self.stoichiometry
    }

    #[must_use]
    pub fn range(&self) -> TemperatureRange {
        self.range
    }

    /// Returns the element index if this species contains exactly one element.
    #[must_use]
    pub fn single_element(&self) -> Option<usize> {
        single_element(&self.stoichiometry)
    }
}

pub(super) fn single_element(row: &[f64]) -> Option<usize> {
    let mut present = row.iter().enumerate().filter(|(_, s)| **s != 0.0);
    match (present.next(), present.next()) {
        (Some((element, _)), None) => Some(element),
        _ => None,
    }
}

/// Ordered collection of candidate species sharing one element ordering.
///
/// Gas species always come first, followed by condensed species. Relative
/// order within each phase is preserved, so species indices are stable and
/// reservation tie-breaking is predictable.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesSet {
    species: Vec<Species>,
    gas_count: usize,
    element_count: usize,
}

impl SpeciesSet {
    /// Creates a set tracking `element_count` chemical elements.
    ///
    /// # Errors
    ///
    /// Returns a [`SpeciesError`] if no elements are tracked, no species are
    /// given, or a stoichiometric row has the wrong length.
    pub fn new(element_count: usize, species: Vec<Species>) -> Result<Self, SpeciesError> {
        if element_count == 0 {
            return Err(SpeciesError::NoTrackedElements);
        }
        if species.is_empty() {
            return Err(SpeciesError::NoSpecies);
        }
        if let Some(bad) = species
            .iter()
            .find(|s| s.stoichiometry.len() != element_count)
        {
            return Err(SpeciesError::RowLength {
                species: bad.name.clone(),
                expected: element_count,
                found: bad.stoichiometry.len(),
            });
        }

        let (mut ordered, condensed): (Vec<_>, Vec<_>) =
            species.into_iter().partition(|s| s.phase == Phase::Gas);
        let gas_count = ordered.len();
        ordered.extend(condensed);

        Ok(Self {
            species: ordered,
            gas_count,
            element_count,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.species.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Number of gas species; condensed species start at this index.
    #[must_use]
    pub fn gas_count(&self) -> usize {
        self.gas_count
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Species> {
        self.species.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.species.iter()
    }

    /// Index of the first species with the given name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s.name == name)
    }

    /// Indices of species valid at `temperature`, gas species first.
    #[must_use]
    pub fn active(&self, temperature: ThermodynamicTemperature) -> Vec<usize> {
        self.species
            .iter()
            .enumerate()
            .filter(|(_, s)| s.range.contains(temperature))
            .map(|(i, _)| i)
            .collect()
    }
}

impl std::ops::Index<usize> for SpeciesSet {
    type Output = Species;

    fn index(&self, index: usize) -> &Species {
        &self.species[index]
    }
}

/// Species data as parallel numeric tables.
///
/// Rows at index `condensed_offset` and beyond are condensed species, rows
/// before it are gases. Use [`SpeciesTables::into_set`] to get a validated
/// [`SpeciesSet`]. Species are named by their row index (`"s0"`, `"s1"`, ...).
#[derive(Debug, Clone, Copy)]
pub struct SpeciesTables<'a> {
    /// Polynomial coefficients per species.
    pub coefficients: &'a [Coefficients],

    /// Stoichiometric row per species.
    pub stoichiometry: &'a [Vec<f64>],

    /// Lower bound of each species' valid range, in kelvin.
    pub min_temperatures: &'a [f64],

    /// Upper bound (exclusive) of each species' valid range, in kelvin.
    pub max_temperatures: &'a [f64],

    /// Index of the first condensed species.
    pub condensed_offset: usize,
}

impl SpeciesTables<'_> {
    /// Validates the tables and builds a [`SpeciesSet`].
    ///
    /// # Errors
    ///
    /// Returns [`SpeciesError::TableLength`] if the tables disagree in length
    /// or the offset is past the end, or any species-level error.
    pub fn into_set(self) -> Result<SpeciesSet, SpeciesError> {
        let count = self.coefficients.len();
        for found in [
            self.stoichiometry.len(),
            self.min_temperatures.len(),
            self.max_temperatures.len(),
        ] {
            if found != count {
                return Err(SpeciesError::TableLength {
                    expected: count,
                    found,
                });
            }
        }
        if self.condensed_offset > count {
            return Err(SpeciesError::TableLength {
                expected: count,
                found: self.condensed_offset,
            });
        }

        let element_count = self.stoichiometry.first().map_or(0, Vec::len);

        let species = (0..count)
            .map(|i| {
                let phase = if i >= self.condensed_offset {
                    Phase::Condensed
                } else {
                    Phase::Gas
                };
                let range = TemperatureRange::new(
                    ThermodynamicTemperature::new::<kelvin>(self.min_temperatures[i]),
                    ThermodynamicTemperature::new::<kelvin>(self.max_temperatures[i]),
                )?;
                Species::new(
                    format!("s{i}"),
                    phase,
                    self.coefficients[i],
                    self.stoichiometry[i].clone(),
                    range,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        SpeciesSet::new(element_count, species)
    }
}

/// Errors that can occur while building species data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpeciesError {
    #[error("temperature range requires finite min < max, got [{min}, {max}) K")]
    TemperatureRange { min: f64, max: f64 },

    #[error("{species}: coefficient {index} is not finite ({value})")]
    Coefficient {
        species: String,
        index: usize,
        value: f64,
    },

    #[error("{species}: stoichiometry for element {element} must be finite and non-negative, got {value}")]
    Stoichiometry {
        species: String,
        element: usize,
        value: f64,
    },

    #[error("{species}: contains no tracked element")]
    NoElements { species: String },

    #[error("{species}: expected {expected} stoichiometric entries, found {found}")]
    RowLength {
        species: String,
        expected: usize,
        found: usize,
    },

    #[error("species tables disagree in length: expected {expected}, found {found}")]
    TableLength { expected: usize, found: usize },

    #[error("at least one chemical element must be tracked")]
    NoTrackedElements,

    #[error("species set is empty")]
    NoSpecies,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp(k: f64) -> ThermodynamicTemperature {
        ThermodynamicTemperature::new::<kelvin>(k)
    }

    fn range(min: f64, max: f64) -> TemperatureRange {
        TemperatureRange::new(temp(min), temp(max)).unwrap()
    }

    fn species(name: &str, phase: Phase, stoichiometry: &[f64]) -> Species {
        Species::new(name, phase, [0.0; 9], stoichiometry.to_vec(), range(300.0, 5000.0)).unwrap()
    }

    #[test]
    fn range_is_half_open() {
        let r = range(1000.0, 2000.0);
        assert!(r.contains(temp(1000.0)));
        assert!(r.contains(temp(1999.999)));
        assert!(!r.contains(temp(2000.0)));
        assert!(!r.contains(temp(999.0)));
    }

    #[test]
    fn rejects_empty_or_inverted_range() {
        assert!(TemperatureRange::new(temp(2000.0), temp(2000.0)).is_err());
        assert!(TemperatureRange::new(temp(3000.0), temp(2000.0)).is_err());
        assert!(TemperatureRange::new(temp(f64::NAN), temp(2000.0)).is_err());
    }

    #[test]
    fn single_element_detection() {
        assert_eq!(species("H2", Phase::Gas, &[2.0, 0.0]).single_element(), Some(0));
        assert_eq!(species("O2", Phase::Gas, &[0.0, 2.0]).single_element(), Some(1));
        assert_eq!(species("H2O", Phase::Gas, &[2.0, 1.0]).single_element(), None);
    }

    #[test]
    fn rejects_invalid_species() {
        let r = range(300.0, 5000.0);

        let err = Species::new("X", Phase::Gas, [0.0; 9], vec![0.0, 0.0], r).unwrap_err();
        assert!(matches!(err, SpeciesError::NoElements { .. }));

        let err = Species::new("X", Phase::Gas, [0.0; 9], vec![1.0, -1.0], r).unwrap_err();
        assert!(matches!(err, SpeciesError::Stoichiometry { element: 1, .. }));

        let mut c = [0.0; 9];
        c[4] = f64::INFINITY;
        let err = Species::new("X", Phase::Gas, c, vec![1.0], r).unwrap_err();
        assert!(matches!(err, SpeciesError::Coefficient { index: 4, .. }));
    }

    #[test]
    fn gas_species_come_first() {
        let set = SpeciesSet::new(
            2,
            vec![
                species("Al2O3(l)", Phase::Condensed, &[1.0, 1.5]),
                species("H2", Phase::Gas, &[2.0, 0.0]),
                species("C(s)", Phase::Condensed, &[0.0, 1.0]),
                species("O2", Phase::Gas, &[0.0, 2.0]),
            ],
        )
        .unwrap();

        let names: Vec<_> = set.iter().map(Species::name).collect();
        assert_eq!(names, ["H2", "O2", "Al2O3(l)", "C(s)"]);
        assert_eq!(set.gas_count(), 2);
        assert_eq!(set.index_of("C(s)"), Some(3));
    }

    #[test]
    fn rejects_mismatched_rows() {
        let err = SpeciesSet::new(
            2,
            vec![species("H2", Phase::Gas, &[2.0, 0.0]), species("H", Phase::Gas, &[1.0])],
        )
        .unwrap_err();
        assert_eq!(
            err,
            SpeciesError::RowLength {
                species: "H".into(),
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn active_species_follow_temperature() {
        let hot = Species::new("A", Phase::Gas, [0.0; 9], vec![1.0], range(2000.0, 6000.0)).unwrap();
        let cold = Species::new("B", Phase::Gas, [0.0; 9], vec![1.0], range(300.0, 2000.0)).unwrap();
        let set = SpeciesSet::new(1, vec![hot, cold]).unwrap();

        assert_eq!(set.active(temp(1500.0)), [1]);
        assert_eq!(set.active(temp(2000.0)), [0]);
        assert!(set.active(temp(100.0)).is_empty());
    }

    #[test]
    fn tables_split_on_offset() {
        let coefficients = [[0.0; 9]; 3];
        let stoichiometry = [vec![2.0], vec![1.0], vec![1.0]];
        let set = SpeciesTables {
            coefficients: &coefficients,
            stoichiometry: &stoichiometry,
            min_temperatures: &[300.0; 3],
            max_temperatures: &[5000.0; 3],
            condensed_offset: 2,
        }
        .into_set()
        .unwrap();

        assert_eq!(set.gas_count(), 2);
        assert_eq!(set[2].phase(), Phase::Condensed);
        assert_eq!(set[2].name(), "s2");
    }

    #[test]
    fn tables_reject_length_mismatch() {
        let coefficients = [[0.0; 9]; 2];
        let stoichiometry = [vec![2.0], vec![1.0]];
        let err = SpeciesTables {
            coefficients: &coefficients,
            stoichiometry: &stoichiometry,
            min_temperatures: &[300.0],
            max_temperatures: &[5000.0; 2],
            condensed_offset: 2,
        }
        .into_set()
        .unwrap_err();

        assert_eq!(err, SpeciesError::TableLength { expected: 2, found: 1 });
    }

    #[test]
    fn tables_reject_offset_past_the_end() {
        let coefficients = [[0.0; 9]; 2];
        let stoichiometry = [vec![2.0], vec![1.0]];
        let err = SpeciesTables {
            coefficients: &coefficients,
            stoichiometry: &stoichiometry,
            min_temperatures: &[300.0; 2],
            max_temperatures: &[5000.0; 2],
            condensed_offset: 3,
        }
        .into_set()
        .unwrap_err();

        assert_eq!(err, SpeciesError::TableLength { expected: 2, found: 3 });
    }
}
