//! Constants Module - Single Source of Truth
//!
//! Rule weights, thresholds, selector tables, seed data and fixed
//! recommendation texts. No other module hardcodes these values.

use alloy_primitives::U256;

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "Sovereign Identity Guardian";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for outbound HTTP requests
pub const USER_AGENT: &str = "SovereignGuardian/0.1.0";

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port
pub const DEFAULT_PORT: u16 = 8080;

/// Default timeout for bytecode lookups (seconds)
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 5;

/// Default timeout for external model calls (seconds)
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 10;

/// Default threat feed refresh interval (seconds)
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

/// Name reported for the built-in scorer
pub const RULE_ENGINE_NAME: &str = "rule-based";

// ============================================
// UNIT CONVERSION
// ============================================

/// 1 ETH in wei
pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

/// 1 Gwei in wei
pub const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Convert wei to ETH (display only, rule checks compare integers)
#[inline]
pub fn wei_to_eth(wei: U256) -> f64 {
    let wei_u128: u128 = wei.try_into().unwrap_or(u128::MAX);
    wei_u128 as f64 / 1e18
}

/// Convert wei to Gwei (display only)
#[inline]
pub fn wei_to_gwei(wei: U256) -> f64 {
    let wei_u128: u128 = wei.try_into().unwrap_or(u128::MAX);
    wei_u128 as f64 / 1e9
}

// ============================================
// TRANSACTION RULES
// ============================================

/// Destination is a known malicious address
pub const WEIGHT_BLACKLISTED_RECIPIENT: u32 = 40;
/// Destination holds bytecode
pub const WEIGHT_CONTRACT_INTERACTION: u32 = 10;
/// Value above 1 ETH
pub const WEIGHT_HIGH_VALUE: u32 = 15;
/// Value above 10 ETH (replaces WEIGHT_HIGH_VALUE)
pub const WEIGHT_VERY_HIGH_VALUE: u32 = 25;
/// Selector in the suspicious method table
pub const WEIGHT_SUSPICIOUS_METHOD: u32 = 20;
/// Selector in the known exploit table
pub const WEIGHT_KNOWN_EXPLOIT: u32 = 35;
/// Gas price above threshold
pub const WEIGHT_HIGH_GAS_PRICE: u32 = 10;
/// Gas limit above threshold
pub const WEIGHT_HIGH_GAS_LIMIT: u32 = 15;
/// Value + calldata + high gas price together
pub const WEIGHT_SUSPICIOUS_BEHAVIOR: u32 = 20;

/// High value threshold: 1 ETH
pub const HIGH_VALUE_WEI: u128 = WEI_PER_ETH;
/// Very high value threshold: 10 ETH
pub const VERY_HIGH_VALUE_WEI: u128 = 10 * WEI_PER_ETH;
/// Compound rule value threshold: 0.1 ETH
pub const BEHAVIOR_VALUE_WEI: u128 = WEI_PER_ETH / 10;
/// Gas price threshold: 200 Gwei
pub const HIGH_GAS_PRICE_WEI: u128 = 200 * WEI_PER_GWEI;
/// Gas limit threshold
pub const HIGH_GAS_LIMIT: u64 = 300_000;

/// Method selectors that move or approve assets
pub const SUSPICIOUS_METHODS: [(&str, &str); 5] = [
    ("0x095ea7b3", "approve"),
    ("0xa9059cbb", "transfer"),
    ("0x23b872dd", "transferFrom"),
    ("0x42842e0e", "safeTransferFrom"),
    ("0xb88d4fde", "safeTransferFrom"),
];

/// Selectors / bytecode prefixes seen in exploit payloads
pub const EXPLOIT_PATTERNS: [(&str, &str); 3] = [
    ("0x0e0a1c3d", "malicious_approve"),
    ("0x60806040", "contract_creation"),
    ("0x60a06040", "proxy_contract"),
];

/// Known exploiter / drainer addresses (lowercase)
pub const BLACKLISTED_ADDRESSES: [&str; 4] = [
    "0x098b716b8aaf21512996dc57eb0615e2383e2f96",
    "0x0d043128146654c7683fbf30ac98d7b2285ded00",
    "0x59abf3837fa962d6853b4cc0a19513aa031fd32b",
    "0xb66cd966670d962c227b3eaba30a872dbfb995db",
];

pub const TX_RECOMMENDATIONS_CRITICAL: [&str; 3] = [
    "Do not sign this transaction",
    "Report the recipient address to the threat intelligence network",
    "Revoke any token approvals previously granted to this address",
];

pub const TX_RECOMMENDATIONS_HIGH: [&str; 3] = [
    "Verify the recipient address through an independent source",
    "Send a small test transaction before moving the full amount",
    "Double-check the contract method being invoked",
];

pub const TX_RECOMMENDATIONS_MEDIUM: [&str; 2] = [
    "Review the transaction details carefully before signing",
    "Confirm that the gas settings are intentional",
];

pub const TX_RECOMMENDATIONS_LOW: [&str; 1] =
    ["Minor risk indicators found; proceed with normal caution"];

pub const TX_RECOMMENDATIONS_SAFE: [&str; 1] = ["No significant risks detected"];

// ============================================
// CONTENT RULES
// ============================================

/// More URLs than this marks heavy browsing
pub const URL_VISIT_THRESHOLD: usize = 5;

/// Default behavior tag when nothing else matched
pub const NORMAL_ACTIVITY_TAG: &str = "Normal activity patterns";
pub const LATE_NIGHT_TAG: &str = "Late-night activity detected";
pub const HIGH_URL_COUNT_TAG: &str = "High number of website visits";
pub const FAILED_LOGIN_TAG: &str = "Multiple failed login attempts";
pub const UNRECOGNIZED_ACCESS_TAG: &str = "Unrecognized device or location";

/// Uppercase share of all characters above which shouting is flagged
pub const EXCESSIVE_CAPS_RATIO: f64 = 0.3;
/// More exclamation marks than this is flagged
pub const EXCLAMATION_THRESHOLD: usize = 3;
/// More URLs than this is flagged in a single message
pub const MULTIPLE_URL_THRESHOLD: usize = 2;

/// Summary bands over the content score, highest first
pub const CONTENT_SUMMARIES: [(u8, &str); 3] = [
    (80, "High probability of spam/phishing email"),
    (60, "Likely spam email"),
    (40, "Suspicious elements detected"),
];
pub const CONTENT_SUMMARY_CLEAN: &str = "Appears to be legitimate";

pub const CONTENT_RECOMMENDATIONS_HIGH: [&str; 2] = [
    "Do not click any links or open attachments in this content",
    "Report this content to your security team or provider",
];

pub const CONTENT_RECOMMENDATIONS_MEDIUM: [&str; 2] = [
    "Verify the sender through an independent channel",
    "Review recent account activity for unauthorized access",
];

pub const CONTENT_RECOMMENDATIONS_BASELINE: [&str; 4] = [
    "Enable two-factor authentication on all accounts",
    "Use a password manager with unique passwords",
    "Keep software and browsers up to date",
    "Regularly review privacy settings and shared data",
];

// ============================================
// THREAT INTELLIGENCE
// ============================================

/// Confidence assigned to a first report
pub const INITIAL_REPORT_CONFIDENCE: u8 = 50;
/// Confidence added by each repeated report
pub const CONFIDENCE_INCREMENT: u8 = 10;
/// Confidence above which an address is considered malicious
pub const MALICIOUS_CONFIDENCE_THRESHOLD: u8 = 75;
/// Lower bound of the medium confidence bucket
pub const MEDIUM_CONFIDENCE_FLOOR: u8 = 50;
/// Default page size for threat listings
pub const DEFAULT_PAGE_LIMIT: usize = 50;
/// Maximum page size for threat listings
pub const MAX_PAGE_LIMIT: usize = 500;

/// Source recorded for a labelled sample when none is given
pub const DEFAULT_SAMPLE_SOURCE: &str = "manual";

/// Prefix accepted by the placeholder proof check
pub const PROOF_PREFIX: &str = "zkp_";

/// Seed record: (address, threat type, confidence, description)
pub type ThreatSeed = (&'static str, &'static str, u8, &'static str);

/// Records loaded at store construction
pub const SEED_THREATS: [ThreatSeed; 4] = [
    (BLACKLISTED_ADDRESSES[0], "exploit", 95, "Bridge exploiter"),
    (BLACKLISTED_ADDRESSES[1], "exploit", 92, "Bridge exploiter"),
    (BLACKLISTED_ADDRESSES[2], "phishing", 88, "Wallet drainer used in phishing campaigns"),
    (BLACKLISTED_ADDRESSES[3], "scam", 80, "Fake airdrop collector"),
];

/// Records added by the periodic refresh task
pub const FEED_THREATS: [ThreatSeed; 3] = [
    ("0x3cffd56b47b7b41c56258d9c7731abadc360e073", "exploit", 78, "Flash loan attacker"),
    ("0x6be6aeb0f5e3b1d7c2a7d3f5b89a1e0f4c2d7a11", "phishing", 65, "Permit signature phisher"),
    ("0x9d5f0b2a1e3c4d6f8a7b9c0d1e2f3a4b5c6d7e8f", "scam", 45, "Reported giveaway scam"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(HIGH_VALUE_WEI, 1_000_000_000_000_000_000);
        assert_eq!(BEHAVIOR_VALUE_WEI, 100_000_000_000_000_000);
        assert_eq!(HIGH_GAS_PRICE_WEI, 200_000_000_000);
    }

    #[test]
    fn test_selector_tables_are_disjoint_and_lowercase() {
        for (sel, _) in SUSPICIOUS_METHODS.iter().chain(EXPLOIT_PATTERNS.iter()) {
            assert_eq!(sel.len(), 10);
            assert_eq!(*sel, sel.to_lowercase());
        }
        for (sel, _) in SUSPICIOUS_METHODS {
            assert!(EXPLOIT_PATTERNS.iter().all(|(e, _)| *e != sel));
        }
    }

    #[test]
    fn test_seed_addresses_are_normalized() {
        for (addr, _, confidence, _) in SEED_THREATS.iter().chain(FEED_THREATS.iter()) {
            assert_eq!(addr.len(), 42);
            assert!(addr.starts_with("0x"));
            assert_eq!(*addr, addr.to_lowercase());
            assert!(*confidence <= 100);
        }
    }

    #[test]
    fn test_wei_to_eth() {
        assert_eq!(wei_to_eth(U256::from(WEI_PER_ETH * 2)), 2.0);
        assert_eq!(wei_to_gwei(U256::from(HIGH_GAS_PRICE_WEI)), 200.0);
    }
}
