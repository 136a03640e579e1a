//! Reserved-species elimination of the elemental mass balances.
//!
//! Each tracked element gets one reserved species: a species made of that
//! element alone, whose amount follows directly from the element's mass
//! balance once every other amount is known. The optimizer then searches
//! only the remaining free species.
//!
//! Positions in this module are positions within the active species list of
//! one trial, not indices into the full species set.

use thiserror::Error;

use super::species::single_element;

/// Elements that no single-element species could claim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no single-element species for elements {elements:?}")]
pub(super) struct UnclaimedElements {
    pub(super) elements: Vec<usize>,
}

/// Full composition rebuilt from a reduced vector.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Composition {
    /// Every element residual is non-negative.
    Feasible(Vec<f64>),

    /// Some element residual is negative.
    ///
    /// `penalty` is the negated sum of the negative residuals, so it is
    /// strictly positive and grows as the violation deepens.
    Infeasible { penalty: f64 },
}

/// Reservation of one species per element, plus the reconstruction rule.
#[derive(Debug, Clone)]
pub(super) struct Reduction<'a> {
    rows: Vec<&'a [f64]>,
    targets: &'a [f64],
    /// `(position, element)` for each reserved species, in position order.
    pairing: Vec<(usize, usize)>,
    /// Positions of free species, ascending.
    free: Vec<usize>,
}

impl<'a> Reduction<'a> {
    /// Claims elements in position order.
    ///
    /// A species is reserved for its only element if no earlier species
    /// already claimed that element.
    ///
    /// # Errors
    ///
    /// Returns [`UnclaimedElements`] if some element ends up without a
    /// reserved species.
    pub(super) fn new(rows: Vec<&'a [f64]>, targets: &'a [f64]) -> Result<Self, UnclaimedElements> {
        let mut owner: Vec<Option<usize>> = vec![None; targets.len()];
        let mut pairing = Vec::with_capacity(targets.len());
        let mut free = Vec::with_capacity(rows.len());

        for (position, row) in rows.iter().enumerate() {
            match single_element(row) {
                Some(element) if owner[element].is_none() => {
                    owner[element] = Some(position);
                    pairing.push((position, element));
                }
                _ => free.push(position),
            }
        }

        let unclaimed: Vec<usize> = owner
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_none())
            .map(|(e, _)| e)
            .collect();
        if !unclaimed.is_empty() {
            return Err(UnclaimedElements {
                elements: unclaimed,
            });
        }

        Ok(Self {
            rows,
            targets,
            pairing,
            free,
        })
    }

    /// Number of variables the optimizer searches.
    pub(super) fn free_count(&self) -> usize {
        self.free.len()
    }

    pub(super) fn free_positions(&self) -> &[usize] {
        &self.free
    }

    /// `(position, element)` pairs, in position order.
    pub(super) fn pairing(&self) -> &[(usize, usize)] {
        &self.pairing
    }

    pub(super) fn reserved_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.pairing.iter().map(|&(position, _)| position)
    }

    pub(super) fn reserved_elements(&self) -> impl Iterator<Item = usize> + '_ {
        self.pairing.iter().map(|&(_, element)| element)
    }

    /// Stoichiometric row of the species at `position`.
    pub(super) fn row(&self, position: usize) -> &'a [f64] {
        self.rows[position]
    }

    pub(super) fn targets(&self) -> &'a [f64] {
        self.targets
    }

    /// Rebuilds the full composition from the free amounts.
    ///
    /// Free amounts are placed in position order. Every element's residual
    /// mass is accumulated over the free species first, and each reserved
    /// species then takes its element's residual divided by its own
    /// stoichiometric coefficient.
    pub(super) fn reconstruct(&self, reduced: &[f64]) -> Composition {
        debug_assert_eq!(reduced.len(), self.free.len());

        let mut full = vec![0.0; self.rows.len()];
        let mut residual = self.targets.to_vec();

        for (&position, &amount) in self.free.iter().zip(reduced) {
            full[position] = amount;
            for (r, s) in residual.iter_mut().zip(self.rows[position]) {
                *r -= s * amount;
            }
        }

        let penalty: f64 = residual.iter().filter(|r| **r < 0.0).map(|r| -r).sum();
        if penalty > 0.0 {
            return Composition::Infeasible { penalty };
        }

        for &(position, element) in &self.pairing {
            full[position] = residual[element] / self.rows[position][element];
        }

        Composition::Feasible(full)
    }

    /// Drops the reserved entries of a full composition.
    pub(super) fn reduce(&self, full: &[f64]) -> Vec<f64> {
        self.free.iter().map(|&position| full[position]).collect()
    }
}
