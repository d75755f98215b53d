//! Utils Module - Helper Functions & Shared Utilities
//!
//! Constants, input validation and scan telemetry shared across the crate.

pub mod constants;
pub mod telemetry;
pub mod validation;

pub use constants::*;
pub use telemetry::*;
pub use validation::*;
