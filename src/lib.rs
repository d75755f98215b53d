//! Sovereign Identity Guardian Library
//!
//! Heuristic risk scoring for user content and EVM transactions:
//! - Phishing and privacy-exposure detection in emails and activity logs
//! - Rule-based transaction scoring (blacklists, value, calldata, gas)
//! - Optional external risk model with rule-based fallback
//! - In-memory threat intelligence and demo accounts behind a JSON API

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod store;
pub mod utils;

pub use crate::core::{ContentScorer, RiskModel, RuleBasedModel, ScanEngine, TransactionScorer};
pub use models::{
    AppError, AppResult, ContentKind, ErrorCode, GuardianConfig, RiskLevel, ScanInput,
    ScanOutcome, ScanResult, Signal, TransactionInput,
};
pub use store::{InMemoryThreatStore, SampleStore, ThreatRepository, UserStore};
pub use utils::{ScanStats, ScanTelemetry};
