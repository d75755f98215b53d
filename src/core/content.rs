//! Content Risk Scorer
//!
//! Weighted regex tables over free text (emails, activity logs, anything
//! else). Two groups contribute to one score:
//! - threat patterns: phishing, urgency, lures, scam payments, shady links
//! - privacy patterns: personal data exposed in the text itself
//!
//! Each pattern adds `matches × weight`; the sum is clamped to 100 and mapped
//! with the three-level content scheme.
//!
//! Structural indicators (shouting, exclamation runs, many links) are reported
//! as signals and warnings but carry no weight.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use tracing::error;

use crate::models::types::{ContentStatistics, RiskLevel, ScanResult, Signal};
use crate::utils::constants::*;

/// A compiled, weighted pattern
#[derive(Debug)]
pub struct WeightedPattern {
    pub signal: Signal,
    pub weight: u32,
    pub regex: Regex,
}

const THREAT_TABLE: [(&str, u32, Signal); 10] = [
    (
        r"\b(verify|confirm|update)\s+(your\s+)?(account|identity|details|information)\b",
        15,
        Signal::PhishingLanguage,
    ),
    (
        r"\baccount\s+(has\s+been\s+|will\s+be\s+|is\s+)?(suspended|locked|disabled|closed)\b",
        15,
        Signal::PhishingLanguage,
    ),
    (r"\bclick\s+(here|this\s+link|below)\b", 10, Signal::PhishingLanguage),
    (
        r"\b(urgent|urgently|immediately|act\s+now|right\s+away|expires?\s+today|final\s+notice)\b",
        8,
        Signal::UrgencyLanguage,
    ),
    (
        r"\b(you\s+have\s+won|winner|prize|lottery|inheritance|unclaimed\s+funds|tax\s+refund)\b",
        10,
        Signal::FinancialLure,
    ),
    (
        r"\b(gift\s+cards?|wire\s+transfer|western\s+union|send\s+(bitcoin|crypto|btc|eth))\b",
        12,
        Signal::ScamPayment,
    ),
    (
        r"\b(password|passcode|pin\s+number|login\s+credentials|seed\s+phrase|recovery\s+phrase|private\s+key)\b",
        15,
        Signal::CredentialRequest,
    ),
    (
        r"\b(suspicious|unusual|unauthorized)\s+(activity|login|sign-?in|transaction)\b",
        10,
        Signal::SuspiciousActivity,
    ),
    (
        r"\b(bit\.ly|tinyurl\.com|goo\.gl|t\.co|ow\.ly|is\.gd)/\S+",
        10,
        Signal::ShortenedUrl,
    ),
    (r"https?://\d{1,3}(\.\d{1,3}){3}", 12, Signal::IpAddressUrl),
];

const PRIVACY_TABLE: [(&str, u32, Signal); 6] = [
    (r"\b\d{3}-\d{2}-\d{4}\b", 25, Signal::SsnExposure),
    (r"\b(\d{4}[ -]?){3}\d{4}\b", 25, Signal::CardNumberExposure),
    (
        r"\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b",
        5,
        Signal::EmailAddressExposure,
    ),
    (r"\(?\b\d{3}\)?[-. ]\d{3}[-. ]\d{4}\b", 8, Signal::PhoneNumberExposure),
    (
        r"\b(social\s+security|date\s+of\s+birth|passport\s+number|driver'?s?\s+licen[cs]e|mother'?s\s+maiden\s+name)\b",
        12,
        Signal::PersonalDataKeyword,
    ),
    (
        r"\b\d{1,5}\s+[a-z]+(\s+[a-z]+)?\s+(street|st|avenue|ave|road|rd|boulevard|blvd|lane|ln|drive|dr)\b",
        8,
        Signal::StreetAddressExposure,
    ),
];

fn compile(table: &[(&str, u32, Signal)]) -> Vec<WeightedPattern> {
    table
        .iter()
        .filter_map(|(pattern, weight, signal)| {
            match RegexBuilder::new(pattern).case_insensitive(true).build() {
                Ok(regex) => Some(WeightedPattern {
                    signal: *signal,
                    weight: *weight,
                    regex,
                }),
                Err(e) => {
                    error!("❌ Failed to compile content pattern {:?}: {}", signal, e);
                    None
                }
            }
        })
        .collect()
}

/// Signals that roll up into each reported key indicator
const KEY_INDICATORS: [(&[Signal], &str); 5] = [
    (
        &[Signal::PhishingLanguage, Signal::CredentialRequest],
        "Phishing attempt indicators",
    ),
    (&[Signal::UrgencyLanguage], "Urgent or threatening language"),
    (
        &[Signal::FinancialLure, Signal::ScamPayment],
        "Financial incentives mentioned",
    ),
    (
        &[Signal::ShortenedUrl, Signal::IpAddressUrl],
        "Suspicious URLs detected",
    ),
    (&[Signal::ExcessiveCapitals], "Excessive capitalization"),
];

lazy_static! {
    static ref THREAT_PATTERNS: Vec<WeightedPattern> = compile(&THREAT_TABLE);
    static ref PRIVACY_PATTERNS: Vec<WeightedPattern> = compile(&PRIVACY_TABLE);
    static ref TIME_SPENT_RE: Regex = Regex::new(r"(?i)\d+\s*hours").unwrap();
    static ref URL_RE: Regex = Regex::new(r"(?i)https?://").unwrap();
    static ref LATE_NIGHT_RE: Regex = Regex::new(
        r"(?i)\b(late[\s-]night|midnight|after\s+hours|(0?[0-4]|12)(:\d{2})?\s*am)\b"
    )
    .unwrap();
    static ref UNRECOGNIZED_RE: Regex = Regex::new(r"(?i)\b(unknown|unrecognized)\b").unwrap();
}

/// Rule-based scorer for free text
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentScorer;

impl ContentScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score text. Callers reject blank input before getting here.
    pub fn score(&self, text: &str) -> ScanResult {
        let mut total: u32 = 0;
        let mut signals: Vec<Signal> = Vec::new();
        let mut warnings = Vec::new();

        for pattern in THREAT_PATTERNS.iter().chain(PRIVACY_PATTERNS.iter()) {
            let matches = pattern.regex.find_iter(text).count() as u32;
            if matches == 0 {
                continue;
            }
            total = total.saturating_add(matches.saturating_mul(pattern.weight));
            if !signals.contains(&pattern.signal) {
                signals.push(pattern.signal);
            }
            warnings.push(format!(
                "{} detected ({} occurrence{})",
                pattern.signal.label(),
                matches,
                if matches == 1 { "" } else { "s" }
            ));
        }

        for (signal, warning) in structural_indicators(text) {
            signals.push(signal);
            warnings.push(warning);
        }

        let risk_score = total.min(100) as u8;
        let risk_level = RiskLevel::from_content_score(risk_score);

        ScanResult {
            risk_score,
            risk_level,
            signals,
            warnings,
            recommendations: recommendations_for(risk_level),
        }
    }

    /// Derived statistics for a scored text
    pub fn statistics(&self, text: &str, result: &ScanResult) -> ContentStatistics {
        let activities = text.lines().filter(|l| !l.trim().is_empty()).count();
        let url_count = URL_RE.find_iter(text).count();
        let time_spent = TIME_SPENT_RE.find(text).map(|m| m.as_str().to_string());

        ContentStatistics {
            activities,
            privacy_score: 100u8.saturating_sub(result.risk_score),
            time_spent,
            behavior_patterns: behavior_patterns(text, url_count),
            url_count,
            summary: summary_for(result.risk_score).to_string(),
            key_indicators: key_indicators(&result.signals),
        }
    }

    /// Score and derive statistics in one pass
    pub fn analyze(&self, text: &str) -> (ScanResult, ContentStatistics) {
        let result = self.score(text);
        let stats = self.statistics(text, &result);
        (result, stats)
    }
}

/// Shouting, exclamation runs and link-heavy text
fn structural_indicators(text: &str) -> Vec<(Signal, String)> {
    let mut found = Vec::new();

    let total = text.chars().count();
    let upper = text.chars().filter(|c| c.is_uppercase()).count();
    if total > 0 && upper as f64 / total as f64 > EXCESSIVE_CAPS_RATIO {
        found.push((
            Signal::ExcessiveCapitals,
            format!(
                "{} detected ({}% uppercase)",
                Signal::ExcessiveCapitals.label(),
                upper * 100 / total
            ),
        ));
    }

    let exclamations = text.matches('!').count();
    if exclamations > EXCLAMATION_THRESHOLD {
        found.push((
            Signal::ExclamationMarks,
            format!("{} ({})", Signal::ExclamationMarks.label(), exclamations),
        ));
    }

    let urls = URL_RE.find_iter(text).count();
    if urls > MULTIPLE_URL_THRESHOLD {
        found.push((
            Signal::MultipleUrls,
            format!("{} ({})", Signal::MultipleUrls.label(), urls),
        ));
    }

    found
}

fn summary_for(score: u8) -> &'static str {
    CONTENT_SUMMARIES
        .iter()
        .find(|(min, _)| score >= *min)
        .map(|(_, summary)| *summary)
        .unwrap_or(CONTENT_SUMMARY_CLEAN)
}

fn key_indicators(signals: &[Signal]) -> Vec<String> {
    KEY_INDICATORS
        .iter()
        .filter(|(members, _)| members.iter().any(|s| signals.contains(s)))
        .map(|(_, indicator)| indicator.to_string())
        .collect()
}

fn behavior_patterns(text: &str, url_count: usize) -> Vec<String> {
    let lower = text.to_lowercase();

    let mut tags = Vec::new();
    if LATE_NIGHT_RE.is_match(text) {
        tags.push(LATE_NIGHT_TAG.to_string());
    }
    if url_count > URL_VISIT_THRESHOLD {
        tags.push(HIGH_URL_COUNT_TAG.to_string());
    }
    if lower.contains("failed") && lower.contains("login") {
        tags.push(FAILED_LOGIN_TAG.to_string());
    }
    if UNRECOGNIZED_RE.is_match(text) {
        tags.push(UNRECOGNIZED_ACCESS_TAG.to_string());
    }
    if tags.is_empty() {
        tags.push(NORMAL_ACTIVITY_TAG.to_string());
    }
    tags
}

/// HIGH list, then MEDIUM list for MEDIUM and above, then the baseline
fn recommendations_for(level: RiskLevel) -> Vec<String> {
    let mut recs: Vec<String> = Vec::new();
    if level >= RiskLevel::High {
        recs.extend(CONTENT_RECOMMENDATIONS_HIGH.iter().map(|s| s.to_string()));
    }
    if level >= RiskLevel::Medium {
        recs.extend(CONTENT_RECOMMENDATIONS_MEDIUM.iter().map(|s| s.to_string()));
    }
    recs.extend(CONTENT_RECOMMENDATIONS_BASELINE.iter().map(|s| s.to_string()));
    recs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(THREAT_PATTERNS.len(), THREAT_TABLE.len());
        assert_eq!(PRIVACY_PATTERNS.len(), PRIVACY_TABLE.len());
        assert!(TIME_SPENT_RE.is_match("3 hours"));
        assert!(URL_RE.is_match("HTTPS://example.com"));
        assert!(LATE_NIGHT_RE.is_match("Late night"));
        assert!(UNRECOGNIZED_RE.is_match("Unknown device"));
    }

    #[test]
    fn test_benign_text_is_low() {
        let result = ContentScorer::new().score("Lunch with the team on Friday went well.");
        assert_eq!(result.risk_score, 0);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(result.signals.is_empty());
        assert_eq!(result.recommendations.len(), CONTENT_RECOMMENDATIONS_BASELINE.len());
    }

    #[test]
    fn test_phishing_email_is_high() {
        let email = "URGENT: Your account has been suspended.\n\
                     Click here to verify your account immediately and enter your password: \
                     http://192.168.10.5/login";
        let result = ContentScorer::new().score(email);
        // 15 (suspended) + 15 (verify) + 10 (click) + 8*2 (urgent, immediately)
        // + 15 (password) + 12 (ip url)
        assert_eq!(result.risk_score, 83);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert!(result.signals.contains(&Signal::PhishingLanguage));
        assert!(result.signals.contains(&Signal::IpAddressUrl));
        assert_eq!(
            result.recommendations.len(),
            CONTENT_RECOMMENDATIONS_HIGH.len()
                + CONTENT_RECOMMENDATIONS_MEDIUM.len()
                + CONTENT_RECOMMENDATIONS_BASELINE.len()
        );
    }

    #[test]
    fn test_privacy_exposure() {
        let result = ContentScorer::new().score("My SSN is 123-45-6789 and my card is 4111 1111 1111 1111");
        assert_eq!(result.risk_score, 50);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(
            result.signals,
            vec![Signal::SsnExposure, Signal::CardNumberExposure]
        );
        assert_eq!(
            result.recommendations.len(),
            CONTENT_RECOMMENDATIONS_MEDIUM.len() + CONTENT_RECOMMENDATIONS_BASELINE.len()
        );
    }

    #[test]
    fn test_repeated_matches_multiply_weight() {
        let result = ContentScorer::new().score("urgent urgent urgent");
        assert_eq!(result.risk_score, 24);
        assert_eq!(result.signals, vec![Signal::UrgencyLanguage]);
    }

    #[test]
    fn test_score_is_clamped() {
        let text = "123-45-6789 ".repeat(10);
        assert_eq!(ContentScorer::new().score(&text).risk_score, 100);
    }

    #[test]
    fn test_statistics() {
        let log = "09:00 checked email\n\n\
                   10:00 browsed news for 3 hours\n\
                   23:30 late night shopping\n";
        let scorer = ContentScorer::new();
        let (result, stats) = scorer.analyze(log);
        assert_eq!(stats.activities, 3);
        assert_eq!(stats.time_spent.as_deref(), Some("3 hours"));
        assert_eq!(stats.privacy_score, 100 - result.risk_score);
        assert_eq!(stats.behavior_patterns, vec![LATE_NIGHT_TAG.to_string()]);
        assert_eq!(stats.url_count, 0);
    }

    #[test]
    fn test_behavior_tags() {
        let scorer = ContentScorer::new();

        let urls = "http://a.com ".repeat(6);
        let (_, stats) = scorer.analyze(&urls);
        assert_eq!(stats.url_count, 6);
        assert!(stats.behavior_patterns.contains(&HIGH_URL_COUNT_TAG.to_string()));

        let (_, stats) = scorer.analyze(&"http://a.com ".repeat(5));
        assert!(!stats.behavior_patterns.contains(&HIGH_URL_COUNT_TAG.to_string()));

        let (_, stats) = scorer.analyze("3 failed login attempts from an unrecognized device");
        assert!(stats.behavior_patterns.contains(&FAILED_LOGIN_TAG.to_string()));
        assert!(stats.behavior_patterns.contains(&UNRECOGNIZED_ACCESS_TAG.to_string()));

        let (_, stats) = scorer.analyze("read a book");
        assert_eq!(stats.behavior_patterns, vec![NORMAL_ACTIVITY_TAG.to_string()]);
    }

    #[test]
    fn test_late_night_hours() {
        let scorer = ContentScorer::new();
        for log in [
            "logged in at 12:30 am",
            "logged in at 04:30 am",
            "logged in at 1:30 am",
            "logged in at 2am",
        ] {
            let (_, stats) = scorer.analyze(log);
            assert_eq!(stats.behavior_patterns, vec![LATE_NIGHT_TAG.to_string()], "{}", log);
        }

        for log in ["logged in at 10:30 am", "logged in at 5:15 am", "logged in at 12:30 pm"] {
            let (_, stats) = scorer.analyze(log);
            assert_eq!(stats.behavior_patterns, vec![NORMAL_ACTIVITY_TAG.to_string()], "{}", log);
        }
    }

    #[test]
    fn test_structural_indicators_add_no_weight() {
        let result = ContentScorer::new()
            .score("FREE STUFF FOR YOU!!!! http://a.com http://b.com http://c.com");
        assert_eq!(result.risk_score, 0);
        assert_eq!(
            result.signals,
            vec![
                Signal::ExcessiveCapitals,
                Signal::ExclamationMarks,
                Signal::MultipleUrls
            ]
        );
        assert!(result.warnings.contains(&"Multiple exclamation marks (4)".to_string()));
        assert!(result.warnings.contains(&"Multiple URLs (3)".to_string()));
    }

    #[test]
    fn test_structural_thresholds_are_exclusive() {
        let result = ContentScorer::new().score("Hi!!! see http://a.com and http://b.com");
        assert!(result.signals.is_empty());
    }

    #[test]
    fn test_summary_and_key_indicators() {
        let scorer = ContentScorer::new();
        let email = "URGENT: Your account has been suspended.\n\
                     Click here to verify your account immediately and enter your password: \
                     http://192.168.10.5/login";
        let (result, stats) = scorer.analyze(email);
        assert_eq!(result.risk_score, 83);
        assert_eq!(stats.summary, "High probability of spam/phishing email");
        assert_eq!(
            stats.key_indicators,
            vec![
                "Phishing attempt indicators".to_string(),
                "Urgent or threatening language".to_string(),
                "Suspicious URLs detected".to_string(),
            ]
        );

        let (_, stats) = scorer.analyze("Lunch with the team on Friday went well.");
        assert_eq!(stats.summary, CONTENT_SUMMARY_CLEAN);
        assert!(stats.key_indicators.is_empty());

        assert_eq!(summary_for(60), "Likely spam email");
        assert_eq!(summary_for(40), "Suspicious elements detected");
        assert_eq!(summary_for(39), CONTENT_SUMMARY_CLEAN);
    }
}
