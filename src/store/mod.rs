//! Store Module - In-Memory State
//!
//! Threat intelligence, labelled samples and demo accounts. All are explicit
//! objects that the server constructs and injects into its state.

pub mod samples;
pub mod threat_intel;
pub mod users;

pub use samples::*;
pub use threat_intel::*;
pub use users::*;
