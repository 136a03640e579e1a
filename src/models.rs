//! Public Twine models.
//!
//! Each model lives in its own module and keeps its computation in an
//! internal `core` submodule. The [`twine_core::Model`] implementation is a
//! thin adapter that delegates to that core API.

pub mod combustion;
