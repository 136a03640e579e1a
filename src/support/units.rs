//! Extensions to [`uom`].
//!
//! Public inputs and results in this crate use [`uom`] quantities. Mixture
//! totals are reported per kilogram of propellant, which needs a few
//! specific quantities that [`uom`] doesn't name directly.
//!
//! ## Temperature differences
//!
//! [`TemperatureDifference::minus`] subtracts one absolute temperature from
//! another and returns a [`TemperatureInterval`](uom::si::f64::TemperatureInterval):
//!
//! ```
//! use uom::si::f64::ThermodynamicTemperature;
//! use uom::si::{temperature_interval, thermodynamic_temperature::kelvin};
//! use twine_combustion::support::units::TemperatureDifference;
//!
//! let hot = ThermodynamicTemperature::new::<kelvin>(3600.0);
//! let cold = ThermodynamicTemperature::new::<kelvin>(1000.0);
//! let width = hot.minus(cold);
//! assert_eq!(width.get::<temperature_interval::kelvin>(), 2600.0);
//! ```

mod quantities;
mod temperature_difference;

pub use quantities::{SpecificEnthalpy, SpecificEntropy, SpecificGibbsEnergy};
pub use temperature_difference::TemperatureDifference;
