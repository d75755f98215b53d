//! Providers Module - External Data Sources
//!
//! Chain data for the bytecode rule and the optional external risk model.

pub mod model;
pub mod rpc;

pub use model::*;
pub use rpc::*;
