//! Mock Threat Intelligence Store
//!
//! Address reputation kept in memory. Seeded with known exploiters at
//! construction; community reports raise confidence one step at a time.
//!
//! Report proofs go through a placeholder format check (`zkp_` prefix plus
//! at least one character). Nothing is verified cryptographically.
//!
//! Features:
//! - Address normalization (lowercase keys)
//! - Entry-level locking via DashMap, so concurrent reports for the same
//!   address never lose an increment
//! - Periodic refresh from a secondary feed list

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::core::attestation::is_well_formed_proof;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::*;
use crate::utils::validation::normalize_address;

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatSource {
    Seed,
    Feed,
    Community,
}

/// One known-bad address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatRecord {
    /// Lowercase 0x + 40 hex
    pub address: String,
    pub threat_type: String,
    /// 0-100
    pub confidence: u8,
    pub report_count: u32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source: ThreatSource,
}

impl ThreatRecord {
    fn from_seed(seed: &ThreatSeed, source: ThreatSource) -> Self {
        let (address, threat_type, confidence, description) = *seed;
        let now = Utc::now();
        Self {
            address: address.to_string(),
            threat_type: threat_type.to_string(),
            confidence,
            report_count: 1,
            first_seen: now,
            last_seen: now,
            description: Some(description.to_string()),
            source,
        }
    }

    pub fn is_malicious(&self) -> bool {
        self.confidence > MALICIOUS_CONFIDENCE_THRESHOLD
    }
}

/// Optional details attached to a report (`threatData`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    #[serde(default, alias = "type")]
    pub threat_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Result of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportReceipt {
    pub address: String,
    pub confidence: u8,
    pub report_count: u32,
}

/// Result of an address check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub is_malicious: bool,
    /// Serialized as null when unknown
    pub threat_info: Option<ThreatRecord>,
}

/// One page of records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatPage {
    pub records: Vec<ThreatRecord>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Confidence buckets: high > 75, medium 50-75, low < 50
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfidenceBuckets {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatStats {
    pub total_threats: usize,
    pub total_reports: u64,
    pub by_type: BTreeMap<String, usize>,
    pub by_confidence: ConfidenceBuckets,
}

/// Storage seam for threat intelligence
pub trait ThreatRepository: Send + Sync {
    /// Record a report, creating or strengthening the entry
    fn report(&self, address: &str, proof: &str, metadata: ReportMetadata) -> AppResult<ReportReceipt>;

    fn check(&self, address: &str) -> AppResult<CheckResult>;

    /// Page ordered by confidence descending, then address
    fn list(&self, limit: Option<usize>, offset: Option<usize>) -> ThreatPage;

    fn stats(&self) -> ThreatStats;

    /// Pull in missing feed entries; returns how many were added
    fn refresh(&self) -> usize;

    /// Drop every record
    fn clear(&self);
}

/// DashMap-backed repository
#[derive(Clone)]
pub struct InMemoryThreatStore {
    /// lowercase address -> record
    records: Arc<DashMap<String, ThreatRecord>>,
}

impl Default for InMemoryThreatStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryThreatStore {
    /// Store loaded with the seed list
    pub fn new() -> Self {
        let store = Self::empty();
        for seed in SEED_THREATS.iter() {
            let record = ThreatRecord::from_seed(seed, ThreatSource::Seed);
            store.records.insert(record.address.clone(), record);
        }
        info!("🛡️ Threat store seeded with {} records", store.records.len());
        store
    }

    /// Store with no records
    pub fn empty() -> Self {
        Self {
            records: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ThreatRepository for InMemoryThreatStore {
    fn report(&self, address: &str, proof: &str, metadata: ReportMetadata) -> AppResult<ReportReceipt> {
        let key = normalize_address(address)?;
        if !is_well_formed_proof(proof) {
            return Err(AppError::invalid_proof(format!(
                "proof must start with {} followed by the proof body",
                PROOF_PREFIX
            )));
        }

        let now = Utc::now();
        let mut entry = self.records.entry(key.clone()).or_insert_with(|| ThreatRecord {
            address: key.clone(),
            threat_type: "unknown".to_string(),
            confidence: INITIAL_REPORT_CONFIDENCE,
            report_count: 0,
            first_seen: now,
            last_seen: now,
            description: None,
            source: ThreatSource::Community,
        });

        let record = entry.value_mut();
        if record.report_count > 0 {
            record.confidence = record.confidence.saturating_add(CONFIDENCE_INCREMENT).min(100);
        }
        record.report_count += 1;
        record.last_seen = now;
        if let Some(threat_type) = metadata.threat_type.filter(|t| !t.trim().is_empty()) {
            record.threat_type = threat_type;
        }
        if let Some(description) = metadata.description.filter(|d| !d.trim().is_empty()) {
            record.description = Some(description);
        }

        info!(
            "🚩 Threat reported: {} (confidence {}, reports {})",
            key, record.confidence, record.report_count
        );

        Ok(ReportReceipt {
            address: key,
            confidence: record.confidence,
            report_count: record.report_count,
        })
    }

    fn check(&self, address: &str) -> AppResult<CheckResult> {
        let key = normalize_address(address)?;
        let threat_info = self.records.get(&key).map(|r| r.value().clone());
        debug!("🔍 Threat check {}: {}", key, if threat_info.is_some() { "known" } else { "unknown" });

        Ok(CheckResult {
            is_malicious: threat_info.as_ref().map(|r| r.is_malicious()).unwrap_or(false),
            threat_info,
        })
    }

    fn list(&self, limit: Option<usize>, offset: Option<usize>) -> ThreatPage {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
        let offset = offset.unwrap_or(0);

        let mut all: Vec<ThreatRecord> = self.records.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| {
            b.confidence
                .cmp(&a.confidence)
                .then_with(|| a.address.cmp(&b.address))
        });

        let total = all.len();
        let records = all.into_iter().skip(offset).take(limit).collect();

        ThreatPage {
            records,
            total,
            limit,
            offset,
        }
    }

    fn stats(&self) -> ThreatStats {
        let mut stats = ThreatStats::default();
        for record in self.records.iter() {
            stats.total_threats += 1;
            stats.total_reports += u64::from(record.report_count);
            *stats.by_type.entry(record.threat_type.clone()).or_insert(0) += 1;

            if record.confidence > MALICIOUS_CONFIDENCE_THRESHOLD {
                stats.by_confidence.high += 1;
            } else if record.confidence >= MEDIUM_CONFIDENCE_FLOOR {
                stats.by_confidence.medium += 1;
            } else {
                stats.by_confidence.low += 1;
            }
        }
        stats
    }

    fn refresh(&self) -> usize {
        let mut added = 0;
        for seed in FEED_THREATS.iter() {
            if !self.records.contains_key(seed.0) {
                let record = ThreatRecord::from_seed(seed, ThreatSource::Feed);
                self.records.entry(record.address.clone()).or_insert(record);
                added += 1;
            }
        }
        if added > 0 {
            info!("🔄 Threat feed refresh added {} records", added);
        } else {
            debug!("🔄 Threat feed refresh: nothing new");
        }
        added
    }

    fn clear(&self) {
        self.records.clear();
        info!("🗑️ Threat store cleared");
    }
}

/// Spawn the periodic feed refresh. Abort the handle to stop it.
pub fn start_refresh_task(store: Arc<dyn ThreatRepository>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick fires immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            store.refresh();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRESH: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn test_seeded_on_construction() {
        let store = InMemoryThreatStore::new();
        assert_eq!(store.len(), SEED_THREATS.len());

        let result = store.check("0x098B716B8Aaf21512996dC57EB0615e2383E2f96").unwrap();
        assert!(result.is_malicious);
        assert_eq!(result.threat_info.unwrap().source, ThreatSource::Seed);
    }

    #[test]
    fn test_report_twice() {
        let store = InMemoryThreatStore::empty();
        let first = store.report(FRESH, "zkp_abc", ReportMetadata::default()).unwrap();
        assert_eq!(first.report_count, 1);
        assert_eq!(first.confidence, INITIAL_REPORT_CONFIDENCE);

        let second = store.report(FRESH, "zkp_abc", ReportMetadata::default()).unwrap();
        assert_eq!(second.report_count, 2);
        assert_eq!(second.confidence, INITIAL_REPORT_CONFIDENCE + CONFIDENCE_INCREMENT);
    }

    #[test]
    fn test_confidence_capped() {
        let store = InMemoryThreatStore::empty();
        for _ in 0..20 {
            store.report(FRESH, "zkp_x", ReportMetadata::default()).unwrap();
        }
        let record = store.check(FRESH).unwrap().threat_info.unwrap();
        assert_eq!(record.confidence, 100);
        assert_eq!(record.report_count, 20);
    }

    #[test]
    fn test_threshold_is_strict() {
        let store = InMemoryThreatStore::empty();
        // 50, 60, 70
        for _ in 0..3 {
            store.report(FRESH, "zkp_x", ReportMetadata::default()).unwrap();
        }
        assert!(!store.check(FRESH).unwrap().is_malicious);
        // 80
        store.report(FRESH, "zkp_x", ReportMetadata::default()).unwrap();
        assert!(store.check(FRESH).unwrap().is_malicious);
    }

    #[test]
    fn test_report_validation() {
        let store = InMemoryThreatStore::empty();
        assert!(store.report("0x123", "zkp_x", ReportMetadata::default()).is_err());
        let err = store.report(FRESH, "zkp_", ReportMetadata::default()).unwrap_err();
        assert_eq!(err.code_str(), "STORE_INVALID_PROOF");
        assert!(store.is_empty());
    }

    #[test]
    fn test_metadata_applied() {
        let store = InMemoryThreatStore::empty();
        let meta = ReportMetadata {
            threat_type: Some("phishing".to_string()),
            description: Some("fake mint site".to_string()),
        };
        store.report(FRESH, "zkp_x", meta).unwrap();
        let record = store.check(FRESH).unwrap().threat_info.unwrap();
        assert_eq!(record.threat_type, "phishing");
        assert_eq!(record.description.as_deref(), Some("fake mint site"));
        assert_eq!(record.source, ThreatSource::Community);
    }

    #[test]
    fn test_unknown_address() {
        let store = InMemoryThreatStore::new();
        let result = store.check(FRESH).unwrap();
        assert!(!result.is_malicious);
        assert!(result.threat_info.is_none());
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["threatInfo"].is_null());
    }

    #[test]
    fn test_list_ordering_and_paging() {
        let store = InMemoryThreatStore::new();
        let page = store.list(None, None);
        assert_eq!(page.total, 4);
        assert_eq!(page.limit, DEFAULT_PAGE_LIMIT);
        let confidences: Vec<u8> = page.records.iter().map(|r| r.confidence).collect();
        assert_eq!(confidences, vec![95, 92, 88, 80]);

        let page = store.list(Some(2), Some(1));
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].confidence, 92);

        assert_eq!(store.list(Some(10_000), None).limit, MAX_PAGE_LIMIT);
    }

    #[test]
    fn test_stats_and_refresh() {
        let store = InMemoryThreatStore::new();
        assert_eq!(store.refresh(), FEED_THREATS.len());
        assert_eq!(store.refresh(), 0);

        let stats = store.stats();
        assert_eq!(stats.total_threats, 7);
        // 95, 92, 88, 80, 78 high; 65 medium; 45 low
        assert_eq!(stats.by_confidence.high, 5);
        assert_eq!(stats.by_confidence.medium, 1);
        assert_eq!(stats.by_confidence.low, 1);
        assert_eq!(stats.by_type.get("exploit"), Some(&3));
    }

    #[test]
    fn test_clear() {
        let store = InMemoryThreatStore::new();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.stats().total_threats, 0);
    }

    #[tokio::test]
    async fn test_refresh_task_runs() {
        let store = Arc::new(InMemoryThreatStore::new());
        let handle = start_refresh_task(store.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();
        assert_eq!(store.len(), SEED_THREATS.len() + FEED_THREATS.len());
    }
}
