//! Input normalization helpers shared by the scorers, stores and handlers

use alloy_primitives::{Address, U256};
use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;

use crate::models::errors::{AppError, AppResult};

lazy_static! {
    static ref ADDRESS_RE: Regex = Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap();
}

/// Whether `raw` is `0x` followed by exactly 40 hex digits
pub fn is_valid_address(raw: &str) -> bool {
    ADDRESS_RE.is_match(raw)
}

/// Lowercase form used as the threat store key
pub fn normalize_address(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if !is_valid_address(trimmed) {
        return Err(AppError::bad_request(format!(
            "Invalid address {:?}: expected 0x followed by 40 hex characters",
            raw
        )));
    }
    Ok(trimmed.to_lowercase())
}

/// Parse an address field, naming the field in the error
pub fn parse_address(field: &str, raw: &str) -> AppResult<Address> {
    let normalized = normalize_address(raw)
        .map_err(|_| AppError::bad_request(format!("{} must be 0x followed by 40 hex characters", field)))?;
    Address::from_str(&normalized)
        .map_err(|_| AppError::bad_request(format!("{} is not a valid address", field)))
}

/// Parse a hex quantity ("0x1bc16d674ec80000", optional prefix). Empty means zero.
pub fn parse_hex_quantity(field: &str, raw: &str) -> AppResult<U256> {
    let digits = strip_hex_prefix(raw.trim());
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|_| AppError::bad_request(format!("{} must be a hex-encoded quantity", field)))
}

/// Decode hex calldata. Empty or bare "0x" yields no bytes.
pub fn parse_hex_bytes(field: &str, raw: &str) -> AppResult<Vec<u8>> {
    let digits = strip_hex_prefix(raw.trim());
    if digits.is_empty() {
        return Ok(Vec::new());
    }
    hex::decode(digits)
        .map_err(|_| AppError::bad_request(format!("{} must be even-length hex data", field)))
}

fn strip_hex_prefix(raw: &str) -> &str {
    raw.strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw)
}
