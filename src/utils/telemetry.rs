//! Scan Telemetry
//!
//! In-process counters behind `GET /api/stats` and the shutdown summary.
//! Nothing about the scanned input is kept: only the kind, the resulting
//! level, latency and whether the engine fell back to rules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::models::types::{RiskLevel, ScanOutcome};

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    pub total_scans: u64,
    /// Scans that ended HIGH or CRITICAL
    pub flagged_scans: u64,
    /// Scans answered by rules after the external model failed
    pub fallbacks: u64,
    /// Fallbacks keyed by the model error code (MODEL_UNAVAILABLE, ...)
    pub fallbacks_by_reason: BTreeMap<String, u64>,
    pub scans_by_kind: BTreeMap<String, u64>,
    pub scans_by_level: BTreeMap<String, u64>,
    pub avg_latency_ms: f64,
    pub period_start: i64,
    pub period_end: i64,
}

impl ScanStats {
    /// Summary block printed at shutdown
    pub fn summary(&self) -> String {
        format!(
            r#"
╔══════════════════════════════════════════════════════════════════╗
║           🛡️ SOVEREIGN GUARDIAN - SESSION REPORT                 ║
╠══════════════════════════════════════════════════════════════════╣
║   🔍 Scans Performed:          {:>10}                           ║
║   🚨 Flagged HIGH+:            {:>10}                           ║
║   🔄 Model Fallbacks:          {:>10}                           ║
║   ⚡ Avg Scan Latency:         {:>10.2}ms                        ║
╚══════════════════════════════════════════════════════════════════╝
"#,
            self.total_scans, self.flagged_scans, self.fallbacks, self.avg_latency_ms,
        )
    }
}

/// Main telemetry collector
pub struct ScanTelemetry {
    /// Atomic counters for fast updates
    total_scans: AtomicU64,
    flagged_scans: AtomicU64,
    fallbacks: AtomicU64,
    total_latency_ms: AtomicU64,
    by_kind: RwLock<BTreeMap<String, u64>>,
    by_level: RwLock<BTreeMap<String, u64>>,
    by_fallback_reason: RwLock<BTreeMap<String, u64>>,
    session_start: i64,
}

impl ScanTelemetry {
    pub fn new() -> Self {
        Self {
            total_scans: AtomicU64::new(0),
            flagged_scans: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            by_kind: RwLock::new(BTreeMap::new()),
            by_level: RwLock::new(BTreeMap::new()),
            by_fallback_reason: RwLock::new(BTreeMap::new()),
            session_start: chrono::Utc::now().timestamp(),
        }
    }

    /// Record a finished scan
    pub fn record_scan(&self, kind: &str, outcome: &ScanOutcome, latency_ms: u64) {
        self.total_scans.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        if outcome.result.risk_level >= RiskLevel::High {
            self.flagged_scans.fetch_add(1, Ordering::Relaxed);
        }
        if outcome.fallback {
            self.fallbacks.fetch_add(1, Ordering::Relaxed);
            if let Some(reason) = &outcome.fallback_reason {
                if let Ok(mut counts) = self.by_fallback_reason.write() {
                    *counts.entry(reason.clone()).or_insert(0) += 1;
                }
            }
        }

        if let Ok(mut counts) = self.by_kind.write() {
            *counts.entry(kind.to_string()).or_insert(0) += 1;
        }
        if let Ok(mut counts) = self.by_level.write() {
            *counts
                .entry(outcome.result.risk_level.as_str().to_string())
                .or_insert(0) += 1;
        }
    }

    /// Get current statistics
    pub fn get_stats(&self) -> ScanStats {
        let total_scans = self.total_scans.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency_ms = if total_scans > 0 {
            total_latency as f64 / total_scans as f64
        } else {
            0.0
        };

        ScanStats {
            total_scans,
            flagged_scans: self.flagged_scans.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            fallbacks_by_reason: self
                .by_fallback_reason
                .read()
                .map(|c| c.clone())
                .unwrap_or_default(),
            scans_by_kind: self.by_kind.read().map(|c| c.clone()).unwrap_or_default(),
            scans_by_level: self.by_level.read().map(|c| c.clone()).unwrap_or_default(),
            avg_latency_ms,
            period_start: self.session_start,
            period_end: chrono::Utc::now().timestamp(),
        }
    }
}

impl Default for ScanTelemetry {
    fn default() -> Self {
        Self::new()
    }
}
