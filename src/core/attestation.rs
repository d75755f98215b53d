//! Scan attestations (`zkpData`)
//!
//! NOTE: these are plaintext attestations, NOT zero-knowledge proofs. The
//! token is `zkp_` followed by the hex encoding of a JSON envelope that
//! anyone can decode. The embedded digest only lets a holder detect that
//! the scan result was edited after issuance; it proves nothing about the
//! scanned input. The same prefix is what the threat store accepts as a
//! report proof, which is likewise a format check only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{RiskLevel, ScanResult};
use crate::utils::constants::PROOF_PREFIX;

/// Decoded attestation envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    /// "transaction", "email", "activity" or "general"
    pub kind: String,
    pub scan_id: String,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    /// sha256 over the serialized ScanResult
    pub result_digest: String,
    pub issued_at: DateTime<Utc>,
}

/// Build the `zkpData` token for a finished scan
pub fn issue(kind: &str, scan_id: &str, result: &ScanResult) -> AppResult<String> {
    let envelope = Attestation {
        kind: kind.to_string(),
        scan_id: scan_id.to_string(),
        risk_score: result.risk_score,
        risk_level: result.risk_level,
        result_digest: result_digest(result)?,
        issued_at: Utc::now(),
    };
    let json = serde_json::to_vec(&envelope).map_err(serialization_failure)?;
    Ok(format!("{}{}", PROOF_PREFIX, hex::encode(json)))
}

/// Placeholder proof check used by threat reports: prefix plus a non-empty body
pub fn is_well_formed_proof(token: &str) -> bool {
    token
        .strip_prefix(PROOF_PREFIX)
        .map(|rest| !rest.is_empty())
        .unwrap_or(false)
}

fn result_digest(result: &ScanResult) -> AppResult<String> {
    let json = serde_json::to_vec(result).map_err(serialization_failure)?;
    Ok(hex::encode(Sha256::digest(&json)))
}

/// Our own types failed to serialize: a server fault, never the caller's
fn serialization_failure(err: serde_json::Error) -> AppError {
    AppError::with_source(ErrorCode::Unknown, "Failed to serialize attestation", err)
}
