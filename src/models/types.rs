//! Type definitions for the Guardian scanners
//! All core data structures shared by the scorers, engine and API

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::models::errors::{AppError, AppResult};
use crate::utils::validation::{parse_address, parse_hex_bytes, parse_hex_quantity};

/// Risk level classification
///
/// Transaction scans use all five levels; content scans only produce
/// LOW, MEDIUM and HIGH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Nothing of note
    Safe,
    /// Minor concerns
    Low,
    /// Proceed with caution
    Medium,
    /// Likely to lose funds or data
    High,
    /// Almost certain loss
    Critical,
}

impl RiskLevel {
    /// Five-level mapping used by the transaction scorer
    pub fn from_transaction_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Self::Critical,
            60..=79 => Self::High,
            40..=59 => Self::Medium,
            20..=39 => Self::Low,
            _ => Self::Safe,
        }
    }

    /// Three-level mapping used by the content scorer
    pub fn from_content_score(score: u8) -> Self {
        match score {
            70..=u8::MAX => Self::High,
            40..=69 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "✅",
            RiskLevel::Low => "🟡",
            RiskLevel::Medium => "🟠",
            RiskLevel::High => "🔴",
            RiskLevel::Critical => "💀",
        }
    }
}

/// Tag identifying which rule fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    // Transaction rules
    BlacklistedRecipient,
    ContractInteraction,
    HighValueTransaction,
    SuspiciousMethod,
    KnownExploitPattern,
    HighGasPrice,
    HighGasLimit,
    SuspiciousBehaviorPattern,

    // Content threat patterns
    PhishingLanguage,
    UrgencyLanguage,
    FinancialLure,
    ScamPayment,
    CredentialRequest,
    SuspiciousActivity,
    ShortenedUrl,
    IpAddressUrl,

    // Content privacy patterns
    SsnExposure,
    CardNumberExposure,
    EmailAddressExposure,
    PhoneNumberExposure,
    PersonalDataKeyword,
    StreetAddressExposure,

    // Content structure
    ExcessiveCapitals,
    ExclamationMarks,
    MultipleUrls,
}

impl Signal {
    /// Label used when building warnings
    pub fn label(&self) -> &'static str {
        match self {
            Signal::BlacklistedRecipient => "Blacklisted recipient",
            Signal::ContractInteraction => "Contract interaction",
            Signal::HighValueTransaction => "High value transaction",
            Signal::SuspiciousMethod => "Suspicious method",
            Signal::KnownExploitPattern => "Known exploit pattern",
            Signal::HighGasPrice => "High gas price",
            Signal::HighGasLimit => "High gas limit",
            Signal::SuspiciousBehaviorPattern => "Suspicious behavior pattern",
            Signal::PhishingLanguage => "Phishing language",
            Signal::UrgencyLanguage => "Urgency pressure",
            Signal::FinancialLure => "Financial lure",
            Signal::ScamPayment => "Scam payment request",
            Signal::CredentialRequest => "Credential request",
            Signal::SuspiciousActivity => "Suspicious account activity",
            Signal::ShortenedUrl => "Shortened URL",
            Signal::IpAddressUrl => "Raw IP address URL",
            Signal::SsnExposure => "Social security number",
            Signal::CardNumberExposure => "Payment card number",
            Signal::EmailAddressExposure => "Email address",
            Signal::PhoneNumberExposure => "Phone number",
            Signal::PersonalDataKeyword => "Personal data reference",
            Signal::StreetAddressExposure => "Street address",
            Signal::ExcessiveCapitals => "Excessive capitalization",
            Signal::ExclamationMarks => "Multiple exclamation marks",
            Signal::MultipleUrls => "Multiple URLs",
        }
    }
}

/// Outcome of a single scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Overall score (0-100)
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub signals: Vec<Signal>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl ScanResult {
    /// True when the score and level agree with one of the two level schemes
    pub fn is_consistent(&self) -> bool {
        self.risk_score <= 100
            && (RiskLevel::from_transaction_score(self.risk_score) == self.risk_level
                || RiskLevel::from_content_score(self.risk_score) == self.risk_level)
    }
}

/// Which kind of free text is being scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Email,
    Activity,
    General,
}

impl ContentKind {
    pub const ACCEPTED: [&'static str; 3] = ["email", "activity", "general"];

    /// Parse the `type` request field, listing accepted values on failure
    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "activity" => Ok(Self::Activity),
            "general" => Ok(Self::General),
            other => Err(AppError::bad_request(format!(
                "Invalid type {:?}. Accepted values: {}",
                other,
                Self::ACCEPTED.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Activity => "activity",
            Self::General => "general",
        }
    }
}

/// Raw Ethereum-style transaction as submitted (hex-encoded strings)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
}

impl TransactionInput {
    /// Validate the raw fields into typed values
    pub fn parse(&self) -> AppResult<ParsedTransaction> {
        let to_raw = self
            .to
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::bad_request("transactionData.to is required"))?;
        let to = parse_address("transactionData.to", to_raw)?;

        let from = match self.from.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(raw) => Some(parse_address("transactionData.from", raw)?),
            None => None,
        };

        let value_raw = self
            .value
            .as_deref()
            .ok_or_else(|| AppError::bad_request("transactionData.value is required"))?;
        let value = parse_hex_quantity("transactionData.value", value_raw)?;

        let data = match self.data.as_deref() {
            Some(raw) => parse_hex_bytes("transactionData.data", raw)?,
            None => Vec::new(),
        };

        let gas_price = match self.gas_price.as_deref() {
            Some(raw) => Some(parse_hex_quantity("transactionData.gasPrice", raw)?),
            None => None,
        };

        let gas = match self.gas.as_deref() {
            Some(raw) => Some(parse_hex_quantity("transactionData.gas", raw)?),
            None => None,
        };

        Ok(ParsedTransaction {
            to,
            from,
            value,
            data,
            gas_price,
            gas,
        })
    }
}

/// Validated transaction ready for scoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTransaction {
    pub to: Address,
    pub from: Option<Address>,
    /// Value in wei
    pub value: U256,
    /// Calldata bytes
    pub data: Vec<u8>,
    /// Gas price in wei
    pub gas_price: Option<U256>,
    /// Gas limit
    pub gas: Option<U256>,
}

impl ParsedTransaction {
    /// First 4 bytes of calldata as a lowercase 0x-prefixed string
    pub fn selector(&self) -> Option<String> {
        self.data
            .get(..4)
            .map(|bytes| format!("0x{}", hex::encode(bytes)))
    }

    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }
}

/// Anything a risk model can score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "inputType", rename_all = "camelCase")]
pub enum ScanInput {
    Text { content: String, kind: ContentKind },
    Transaction { transaction: TransactionInput },
}

impl ScanInput {
    /// Validated text input; blank content is rejected before scoring
    pub fn text(content: impl Into<String>, kind: ContentKind) -> AppResult<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(AppError::bad_request(
                "content is required and must not be empty or whitespace",
            ));
        }
        Ok(Self::Text { content, kind })
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Text { kind, .. } => kind.as_str(),
            Self::Transaction { .. } => "transaction",
        }
    }
}

/// Derived statistics reported with content scans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStatistics {
    /// Non-blank lines
    pub activities: usize,
    /// 100 - riskScore
    pub privacy_score: u8,
    /// First "<n> hours" mention, if any
    pub time_spent: Option<String>,
    pub behavior_patterns: Vec<String>,
    pub url_count: usize,
    /// One-line verdict for the score band
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_indicators: Vec<String>,
}

/// Scan result plus provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    pub result: ScanResult,
    /// Name of the model that produced the result
    pub engine: String,
    /// True when the external model failed and rules were used instead
    pub fallback: bool,
    /// Error code of the model failure behind a fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}
