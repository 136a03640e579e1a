//! # Twine Combustion
//!
//! Chemical-equilibrium models of rocket-propellant combustion products for
//! [Twine](https://github.com/isentropic-dev/twine).
//!
//! Given candidate product species, the propellant's elemental inventory,
//! chamber pressure and initial enthalpy, the models find the equilibrium
//! composition at a temperature by minimizing Gibbs free energy, and the
//! adiabatic flame temperature by bisecting on the energy balance.
//!
//! ## Crate layout
//!
//! - [`models`]: Domain-specific [`twine_core::Model`] implementations.
//! - [`support`]: Supporting utilities used by models.
//!
//! Modules in [`support`] are part of the public API because they're useful,
//! but their APIs are not stable.

pub mod models;
pub mod support;
