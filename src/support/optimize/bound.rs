use super::OptimizeError;

/// Closed interval `[lower, upper]` for one optimization variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    lower: f64,
    upper: f64,
}

impl Bound {
    /// Creates a bound.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::InvalidBound`] if either limit isn't finite or
    /// `lower > upper`.
    pub fn new(lower: f64, upper: f64) -> Result<Self, OptimizeError> {
        if !lower.is_finite() || !upper.is_finite() || lower > upper {
            return Err(OptimizeError::InvalidBound { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    #[must_use]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    #[must_use]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Maps `u` in `[0, 1)` onto the interval.
    pub(super) fn sample(&self, u: f64) -> f64 {
        self.lower + u * (self.upper - self.lower)
    }

    /// Pulls an out-of-bounds `value` back between the violated limit and `origin`.
    ///
    /// `origin` must lie within the bound; `u` in `[0, 1)` picks the point.
    pub(super) fn bounce(&self, value: f64, origin: f64, u: f64) -> f64 {
        if value < self.lower {
            self.lower + u * (origin - self.lower)
        } else if value > self.upper {
            self.upper - u * (self.upper - origin)
        } else {
            value
        }
    }
}
