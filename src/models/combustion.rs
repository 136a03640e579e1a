//! Combustion models.
//!
//! This module contains models for propellant combustion products.

pub mod equilibrium;
