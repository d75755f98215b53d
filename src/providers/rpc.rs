//! RPC Client Module - Chain Data for the Bytecode Rule
//!
//! The transaction scorer wants to know whether `to` holds bytecode. This
//! module answers that through a plain JSON-RPC `eth_getCode` call.
//!
//! One attempt per lookup, bounded by the configured timeout. A failed
//! lookup is the caller's cue to skip the rule, so there is no retry or
//! fallback endpoint here.

use alloy_primitives::Address;
use async_trait::async_trait;
use eyre::{eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::models::config::mask_url;
use crate::models::errors::{AppError, ErrorCode};
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

/// Source of on-chain facts used by the scorers
#[async_trait]
pub trait ChainDataProvider: Send + Sync {
    /// Whether `address` has deployed bytecode
    async fn has_code(&self, address: Address) -> Result<bool>;
}

/// JSON-RPC provider for a single endpoint
#[derive(Clone)]
pub struct RpcProvider {
    url: String,
    /// HTTP client with custom headers (gzip enabled)
    client: reqwest::Client,
}

impl RpcProvider {
    /// Create a provider for `url` with a per-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::new(
                ErrorCode::ConfigInvalidValue,
                format!("RPC URL must be http(s): {}", mask_url(&url)),
            )
            .into());
        }

        Ok(Self {
            url,
            client: Self::build_client(timeout)?,
        })
    }

    fn build_client(timeout: Duration) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
    }

    /// Execute a single JSON-RPC call
    pub async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let code = if e.is_timeout() {
                    ErrorCode::RpcTimeout
                } else {
                    ErrorCode::RpcConnectionFailed
                };
                AppError::new(code, format!("Request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::new(ErrorCode::RpcError, format!("HTTP error: {}", status)).into());
        }

        let json: RpcResponse<T> = response.json().await.map_err(|e| {
            AppError::new(
                ErrorCode::RpcInvalidResponse,
                format!("Failed to parse response: {}", e),
            )
        })?;

        if let Some(error) = json.error {
            return Err(AppError::new(
                ErrorCode::RpcError,
                format!("RPC error: {} (code: {})", error.message, error.code),
            )
            .into());
        }

        json.result
            .ok_or_else(|| AppError::new(ErrorCode::RpcInvalidResponse, "No result in response").into())
    }

    /// Get bytecode at `address` ("0x" when none)
    pub async fn get_code(&self, address: Address) -> Result<String> {
        let params = serde_json::json!([format!("{:#x}", address), "latest"]);
        self.call::<String>("eth_getCode", params).await
    }

    /// Endpoint with credentials hidden, for logs
    pub fn masked_url(&self) -> String {
        mask_url(&self.url)
    }
}

#[async_trait]
impl ChainDataProvider for RpcProvider {
    async fn has_code(&self, address: Address) -> Result<bool> {
        let code = self.get_code(address).await?;
        let has_code = is_deployed_code(&code);
        debug!("🔍 eth_getCode {} -> {} bytes", address, code.len().saturating_sub(2) / 2);
        Ok(has_code)
    }
}

/// Bytecode strings for EOAs come back as "0x" (some nodes send "0x0")
fn is_deployed_code(code: &str) -> bool {
    let digits = code.trim_start_matches("0x");
    !digits.is_empty() && digits.chars().any(|c| c != '0')
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// JSON-RPC error structure
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}
