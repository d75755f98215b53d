//! External Risk Model Client
//!
//! Swappable scorer reached over HTTP: the ScanInput is POSTed as JSON and a
//! ScanResult JSON object is expected back. Anything else is an error; the
//! engine turns errors into a rule-based fallback.

use async_trait::async_trait;
use eyre::{eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;

use crate::core::engine::RiskModel;
use crate::models::config::mask_url;
use crate::models::errors::{AppError, ErrorCode};
use crate::models::types::{ScanInput, ScanResult};
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

/// HTTP-backed risk model
#[derive(Clone)]
pub struct HttpRiskModel {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl HttpRiskModel {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            name: format!("http-model@{}", mask_url(&url)),
            url,
            client,
        })
    }
}

#[async_trait]
impl RiskModel for HttpRiskModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn score(&self, input: &ScanInput) -> Result<ScanResult> {
        let response = self
            .client
            .post(&self.url)
            .json(input)
            .send()
            .await
            .map_err(|e| unavailable(format!("Model request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("Model returned HTTP {}", status)));
        }

        let result: ScanResult = response
            .json()
            .await
            .map_err(|e| invalid_output(format!("Model output is not a ScanResult: {}", e)))?;

        if result.risk_score > 100 {
            return Err(invalid_output(format!(
                "Model score {} out of range",
                result.risk_score
            )));
        }
        if !result.is_consistent() {
            return Err(invalid_output(format!(
                "Model level {} does not match score {}",
                result.risk_level.as_str(),
                result.risk_score
            )));
        }

        Ok(result)
    }
}

fn unavailable(message: String) -> eyre::Report {
    AppError::new(ErrorCode::ModelUnavailable, message).into()
}

fn invalid_output(message: String) -> eyre::Report {
    AppError::new(ErrorCode::ModelInvalidOutput, message).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::ContentKind;
    use httpmock::prelude::*;

    fn input() -> ScanInput {
        ScanInput::text("hello", ContentKind::Email).unwrap()
    }

    #[tokio::test]
    async fn test_valid_model_output() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/score")
                    .json_body(serde_json::json!({
                        "inputType": "text", "content": "hello", "kind": "email"
                    }));
                then.status(200).json_body(serde_json::json!({
                    "riskScore": 72,
                    "riskLevel": "HIGH",
                    "signals": ["PHISHING_LANGUAGE"],
                    "warnings": ["model says so"],
                    "recommendations": []
                }));
            })
            .await;

        let model = HttpRiskModel::new(server.url("/score"), Duration::from_secs(2)).unwrap();
        let result = model.score(&input()).await.unwrap();
        assert_eq!(result.risk_score, 72);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_inconsistent_output_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/score");
                then.status(200).json_body(serde_json::json!({
                    "riskScore": 10,
                    "riskLevel": "CRITICAL",
                    "signals": []
                }));
            })
            .await;

        let model = HttpRiskModel::new(server.url("/score"), Duration::from_secs(2)).unwrap();
        let err = model.score(&input()).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<AppError>().map(|e| e.code),
            Some(ErrorCode::ModelInvalidOutput)
        );
    }

    #[tokio::test]
    async fn test_non_2xx_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/score");
                then.status(500).body("boom");
            })
            .await;

        let model = HttpRiskModel::new(server.url("/score"), Duration::from_secs(2)).unwrap();
        let err = model.score(&input()).await.unwrap_err();
        assert!(err.to_string().contains("500"));
        assert_eq!(
            err.downcast_ref::<AppError>().map(|e| e.code),
            Some(ErrorCode::ModelUnavailable)
        );
    }
}
