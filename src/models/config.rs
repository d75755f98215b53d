//! Runtime configuration for the Guardian service
//!
//! Everything is read from environment variables with sensible defaults.
//! Rule thresholds and seed data are not configurable; they live in
//! `utils/constants.rs`.

use std::time::Duration;
use tracing::{info, warn};

use crate::utils::constants::{
    DEFAULT_HOST, DEFAULT_MODEL_TIMEOUT_SECS, DEFAULT_PORT, DEFAULT_REFRESH_INTERVAL_SECS,
    DEFAULT_RPC_TIMEOUT_SECS,
};

/// Deployment environment, controls how much error detail leaks to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Configuration for the Guardian API server
#[derive(Debug, Clone)]
pub struct GuardianConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// JSON-RPC endpoint for bytecode lookups; the contract rule is skipped when unset
    pub eth_rpc_url: Option<String>,
    /// Timeout for a single bytecode lookup
    pub rpc_timeout: Duration,
    /// External risk model endpoint; rule-based scoring only when unset
    pub model_url: Option<String>,
    /// Timeout for a single model call
    pub model_timeout: Duration,
    /// Interval of the threat feed refresh task
    pub refresh_interval: Duration,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            environment: Environment::Development,
            eth_rpc_url: None,
            rpc_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
            model_url: None,
            model_timeout: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
        }
    }
}

impl GuardianConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("GUARDIAN_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.host);

        // Hosting platforms inject PORT; GUARDIAN_PORT is for local dev
        let port = lookup("PORT")
            .or_else(|| lookup("GUARDIAN_PORT"))
            .and_then(|p| parse_or_warn::<u16>("PORT", &p))
            .unwrap_or(defaults.port);

        let environment = lookup("GUARDIAN_ENV")
            .map(|e| Environment::parse(&e))
            .unwrap_or(defaults.environment);

        let eth_rpc_url = lookup("ETH_HTTP_URL").filter(|u| is_usable_url(u));
        let model_url = lookup("GUARDIAN_MODEL_URL").filter(|u| is_usable_url(u));

        let rpc_timeout = lookup("GUARDIAN_RPC_TIMEOUT_SECS")
            .and_then(|v| parse_or_warn::<u64>("GUARDIAN_RPC_TIMEOUT_SECS", &v))
            .map(Duration::from_secs)
            .unwrap_or(defaults.rpc_timeout);

        let model_timeout = lookup("GUARDIAN_MODEL_TIMEOUT_SECS")
            .and_then(|v| parse_or_warn::<u64>("GUARDIAN_MODEL_TIMEOUT_SECS", &v))
            .map(Duration::from_secs)
            .unwrap_or(defaults.model_timeout);

        let refresh_interval = lookup("GUARDIAN_REFRESH_SECS")
            .and_then(|v| parse_or_warn::<u64>("GUARDIAN_REFRESH_SECS", &v))
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.refresh_interval);

        Self {
            host,
            port,
            environment,
            eth_rpc_url,
            rpc_timeout,
            model_url,
            model_timeout,
            refresh_interval,
        }
    }

    /// Log the effective configuration (URLs are masked)
    pub fn log_summary(&self) {
        info!(
            host = %self.host,
            port = self.port,
            environment = self.environment.as_str(),
            "Configuration loaded"
        );
        match &self.eth_rpc_url {
            Some(url) => info!("🔗 Chain data provider: {}", mask_url(url)),
            None => info!("🔗 Chain data provider disabled (ETH_HTTP_URL not set)"),
        }
        match &self.model_url {
            Some(url) => info!("🧠 External risk model: {}", mask_url(url)),
            None => info!("🧠 External risk model disabled, rule-based scoring only"),
        }
    }
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("⚠️ Ignoring invalid value for {}: {:?}", key, raw);
            None
        }
    }
}

fn is_usable_url(url: &str) -> bool {
    let url = url.trim();
    (url.starts_with("http://") || url.starts_with("https://")) && !url.contains("YOUR_API_KEY")
}

/// Hide API keys embedded in provider URLs
pub fn mask_url(url: &str) -> String {
    if let Some((base, _)) = url.split_once("/v2/") {
        return format!("{}/v2/***HIDDEN***", base);
    }
    url.to_string()
}
