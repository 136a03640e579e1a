//! Supporting utilities used by models.
//!
//! These modules are public because they're useful outside the equilibrium
//! engine, but their APIs are not stable.

pub mod constraint;
pub mod optimize;
pub mod units;
