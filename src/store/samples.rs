//! Labelled Sample Store
//!
//! Emails and transactions labelled legitimate (0) or malicious (1), kept for
//! retraining an external model offline. Samples pass the same validation as
//! scans and are held in memory in insertion order.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::models::errors::AppResult;
use crate::models::types::{ContentKind, ScanInput, TransactionInput};
use crate::utils::constants::{DEFAULT_PAGE_LIMIT, DEFAULT_SAMPLE_SOURCE, MAX_PAGE_LIMIT};

/// Which collection a sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    Email,
    Transaction,
}

/// Ground-truth label, `0` or `1` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SampleLabel {
    Legitimate,
    Malicious,
}

impl TryFrom<u8> for SampleLabel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Legitimate),
            1 => Ok(Self::Malicious),
            other => Err(format!(
                "label must be 0 (legitimate) or 1 (malicious), got {}",
                other
            )),
        }
    }
}

impl From<SampleLabel> for u8 {
    fn from(label: SampleLabel) -> Self {
        match label {
            SampleLabel::Legitimate => 0,
            SampleLabel::Malicious => 1,
        }
    }
}

/// The labelled input itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SampleBody {
    Email(String),
    Transaction(TransactionInput),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledSample {
    pub id: String,
    #[serde(flatten)]
    pub body: SampleBody,
    pub label: SampleLabel,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Provenance attached to a new sample
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleMeta {
    pub source: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplePage {
    pub samples: Vec<LabeledSample>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCounts {
    pub total_samples: usize,
    pub legitimate_count: usize,
    pub malicious_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SampleStats {
    pub emails: LabelCounts,
    pub transactions: LabelCounts,
}

/// DashMap-backed sample collections, one vector per kind
#[derive(Clone, Default)]
pub struct SampleStore {
    samples: Arc<DashMap<SampleKind, Vec<LabeledSample>>>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a labelled email. Blank content is rejected.
    pub fn add_email(
        &self,
        content: String,
        label: SampleLabel,
        meta: SampleMeta,
    ) -> AppResult<LabeledSample> {
        ScanInput::text(content.as_str(), ContentKind::Email)?;
        Ok(self.push(SampleKind::Email, SampleBody::Email(content), label, meta))
    }

    /// Add a labelled transaction. It must parse like a scan request.
    pub fn add_transaction(
        &self,
        transaction: TransactionInput,
        label: SampleLabel,
        meta: SampleMeta,
    ) -> AppResult<LabeledSample> {
        transaction.parse()?;
        Ok(self.push(
            SampleKind::Transaction,
            SampleBody::Transaction(transaction),
            label,
            meta,
        ))
    }

    fn push(
        &self,
        kind: SampleKind,
        body: SampleBody,
        label: SampleLabel,
        meta: SampleMeta,
    ) -> LabeledSample {
        let sample = LabeledSample {
            id: Uuid::new_v4().to_string(),
            body,
            label,
            source: meta
                .source
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SAMPLE_SOURCE.to_string()),
            description: meta.description.filter(|d| !d.trim().is_empty()),
            created_at: Utc::now(),
        };

        let mut entry = self.samples.entry(kind).or_default();
        entry.push(sample.clone());
        info!(
            "🧪 {:?} sample added from {} (label {}, {} total)",
            kind,
            sample.source,
            u8::from(label),
            entry.len()
        );
        sample
    }

    /// Page in insertion order
    pub fn list(&self, kind: SampleKind, limit: Option<usize>, offset: Option<usize>) -> SamplePage {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
        let offset = offset.unwrap_or(0);

        let (samples, total) = match self.samples.get(&kind) {
            Some(all) => (
                all.iter().skip(offset).take(limit).cloned().collect(),
                all.len(),
            ),
            None => (Vec::new(), 0),
        };

        SamplePage {
            samples,
            total,
            limit,
            offset,
        }
    }

    pub fn stats(&self) -> SampleStats {
        SampleStats {
            emails: self.counts(SampleKind::Email),
            transactions: self.counts(SampleKind::Transaction),
        }
    }

    fn counts(&self, kind: SampleKind) -> LabelCounts {
        let mut counts = LabelCounts::default();
        if let Some(all) = self.samples.get(&kind) {
            for sample in all.iter() {
                counts.total_samples += 1;
                match sample.label {
                    SampleLabel::Legitimate => counts.legitimate_count += 1,
                    SampleLabel::Malicious => counts.malicious_count += 1,
                }
            }
        }
        counts
    }

    /// Drop one collection; returns how many samples were removed
    pub fn clear(&self, kind: SampleKind) -> usize {
        let removed = self.samples.remove(&kind).map(|(_, v)| v.len()).unwrap_or(0);
        info!("🧹 Cleared {} {:?} samples", removed, kind);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;

    const TO: &str = "0x1234567890123456789012345678901234567890";

    fn tx(value: &str) -> TransactionInput {
        TransactionInput {
            to: Some(TO.to_string()),
            value: Some(value.to_string()),
            ..TransactionInput::default()
        }
    }

    #[test]
    fn test_add_and_stats() {
        let store = SampleStore::new();
        store
            .add_email("Claim your prize now".to_string(), SampleLabel::Malicious, SampleMeta::default())
            .unwrap();
        store
            .add_email("Minutes from Monday".to_string(), SampleLabel::Legitimate, SampleMeta::default())
            .unwrap();
        store
            .add_transaction(tx("0x0"), SampleLabel::Legitimate, SampleMeta::default())
            .unwrap();

        let stats = store.stats();
        assert_eq!(
            stats.emails,
            LabelCounts {
                total_samples: 2,
                legitimate_count: 1,
                malicious_count: 1,
            }
        );
        assert_eq!(stats.transactions.total_samples, 1);
        assert_eq!(stats.transactions.legitimate_count, 1);
    }

    #[test]
    fn test_source_defaults_to_manual() {
        let store = SampleStore::new();
        let sample = store
            .add_email(
                "hello".to_string(),
                SampleLabel::Legitimate,
                SampleMeta {
                    source: Some("  ".to_string()),
                    description: Some("greeting".to_string()),
                },
            )
            .unwrap();
        assert_eq!(sample.source, DEFAULT_SAMPLE_SOURCE);
        assert_eq!(sample.description.as_deref(), Some("greeting"));
    }

    #[test]
    fn test_invalid_samples_rejected() {
        let store = SampleStore::new();
        let err = store
            .add_email("   ".to_string(), SampleLabel::Malicious, SampleMeta::default())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ApiBadRequest);

        let bad = TransactionInput {
            to: Some("0xnope".to_string()),
            ..tx("0x1")
        };
        let err = store
            .add_transaction(bad, SampleLabel::Malicious, SampleMeta::default())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ApiBadRequest);
        assert_eq!(store.stats(), SampleStats::default());
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let store = SampleStore::new();
        for i in 0..5 {
            store
                .add_email(format!("email {}", i), SampleLabel::Legitimate, SampleMeta::default())
                .unwrap();
        }

        let page = store.list(SampleKind::Email, Some(2), Some(1));
        assert_eq!(page.total, 5);
        let bodies: Vec<_> = page.samples.iter().map(|s| s.body.clone()).collect();
        assert_eq!(
            bodies,
            vec![
                SampleBody::Email("email 1".to_string()),
                SampleBody::Email("email 2".to_string())
            ]
        );
        assert_eq!(store.list(SampleKind::Transaction, None, None).total, 0);
    }

    #[test]
    fn test_clear_one_kind() {
        let store = SampleStore::new();
        store
            .add_email("a".to_string(), SampleLabel::Malicious, SampleMeta::default())
            .unwrap();
        store
            .add_transaction(tx("0x1"), SampleLabel::Malicious, SampleMeta::default())
            .unwrap();

        assert_eq!(store.clear(SampleKind::Email), 1);
        assert_eq!(store.clear(SampleKind::Email), 0);
        assert_eq!(store.stats().emails.total_samples, 0);
        assert_eq!(store.stats().transactions.total_samples, 1);
    }

    #[test]
    fn test_label_wire_format() {
        assert_eq!(serde_json::to_value(SampleLabel::Malicious).unwrap(), 1);
        assert_eq!(
            serde_json::from_value::<SampleLabel>(serde_json::json!(0)).unwrap(),
            SampleLabel::Legitimate
        );
        assert!(serde_json::from_value::<SampleLabel>(serde_json::json!(2)).is_err());
    }
}
