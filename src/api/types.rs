//! API Request/Response Types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::errors::AppError;
use crate::models::types::{ContentStatistics, RiskLevel, ScanResult, TransactionInput};
use crate::store::samples::SampleLabel;
use crate::store::users::UserProfile;

/// API Response wrapper
///
/// `data` is flattened so payload fields sit next to `success`,
/// `latencyMs` and `timestamp`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Client-facing view of an AppError. Server faults in production only
    /// expose the code.
    pub fn from_app_error(err: &AppError, production: bool) -> Self {
        if production && !err.is_client_error() {
            return Self {
                code: err.code_str().to_string(),
                message: "Internal server error".to_string(),
                details: None,
            };
        }
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            details: std::error::Error::source(err).map(|s| s.to_string()),
        }
    }
}

// ============================================
// Transaction Scan
// ============================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionScanRequest {
    #[serde(default)]
    pub transaction_data: Option<TransactionInput>,
    #[serde(default)]
    pub user_address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionScanData {
    pub analysis: ScanResult,
    pub zkp_data: String,
    pub scan_id: String,
    pub engine: String,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

// ============================================
// Content Scan
// ============================================

#[derive(Debug, Deserialize)]
pub struct ContentScanRequest {
    #[serde(default)]
    pub content: Option<String>,
    /// email | activity | general (defaults to general)
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentScanData {
    pub risk_level: RiskLevel,
    pub risk_score: u8,
    pub analysis: ScanResult,
    pub warnings: Vec<String>,
    pub statistics: ContentStatistics,
    pub zkp_data: String,
    pub scan_id: String,
    pub engine: String,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

// ============================================
// Threat Intelligence
// ============================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportThreatRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub proof: Option<String>,
    #[serde(default)]
    pub threat_data: Option<crate::store::threat_intel::ReportMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

// ============================================
// Labelled Samples
// ============================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSampleRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub label: Option<SampleLabel>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSampleRequest {
    #[serde(default)]
    pub transaction_data: Option<TransactionInput>,
    #[serde(default)]
    pub label: Option<SampleLabel>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearedData {
    pub cleared: usize,
}

// ============================================
// Auth (demo)
// ============================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    pub email: String,
    pub password: String,
    pub preferences: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: UserProfile,
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: String,
    pub service: String,
    pub version: String,
    pub environment: String,
    pub uptime_seconds: u64,
    pub external_model: bool,
    pub chain_provider: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;

    fn server_fault() -> AppError {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "disk unplugged");
        AppError::with_source(ErrorCode::RpcConnectionFailed, "RPC node unreachable", cause)
    }

    #[test]
    fn test_production_hides_server_fault() {
        let err = ApiError::from_app_error(&server_fault(), true);
        assert_eq!(err.code, "RPC_CONNECTION_FAILED");
        assert_eq!(err.message, "Internal server error");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_development_keeps_server_fault_details() {
        let err = ApiError::from_app_error(&server_fault(), false);
        assert_eq!(err.code, "RPC_CONNECTION_FAILED");
        assert_eq!(err.message, "RPC node unreachable");
        assert_eq!(err.details.as_deref(), Some("disk unplugged"));
    }

    #[test]
    fn test_production_keeps_client_error_message() {
        let app_err = AppError::new(ErrorCode::ApiBadRequest, "content must not be empty");
        let err = ApiError::from_app_error(&app_err, true);
        assert_eq!(err.code, "API_BAD_REQUEST");
        assert_eq!(err.message, "content must not be empty");
        assert!(err.details.is_none());
    }
}
