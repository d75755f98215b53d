//! Core Module - Scoring Logic
//!
//! Transaction and content scorers, the engine that picks between the
//! built-in rules and an external model, and scan attestations.

pub mod attestation;
pub mod content;
pub mod engine;
pub mod transaction;

pub use content::*;
pub use engine::*;
pub use transaction::*;
