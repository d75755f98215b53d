//! Transaction Risk Scorer
//!
//! Additive rule scoring over a validated EVM transaction. Every rule is
//! evaluated independently, contributes a fixed weight, and the total is
//! clamped to 0-100 before the five-level mapping is applied.
//!
//! The bytecode rule needs chain data. The scorer itself never performs I/O:
//! callers pass the lookup outcome in, `None` meaning "unknown, skip rule".

use alloy_primitives::{Address, U256};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use crate::models::types::{ParsedTransaction, RiskLevel, ScanResult, Signal};
use crate::utils::constants::*;

/// Rule-based scorer for transactions
#[derive(Debug, Clone)]
pub struct TransactionScorer {
    blacklist: HashSet<Address>,
    suspicious_methods: HashMap<&'static str, &'static str>,
    exploit_patterns: HashMap<&'static str, &'static str>,
}

impl Default for TransactionScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionScorer {
    /// Scorer loaded with the built-in tables
    pub fn new() -> Self {
        let blacklist = BLACKLISTED_ADDRESSES
            .iter()
            .filter_map(|a| Address::from_str(a).ok())
            .collect();

        Self {
            blacklist,
            suspicious_methods: SUSPICIOUS_METHODS.into_iter().collect(),
            exploit_patterns: EXPLOIT_PATTERNS.into_iter().collect(),
        }
    }

    /// Whether the address is on the built-in blacklist
    #[inline]
    pub fn is_blacklisted(&self, address: &Address) -> bool {
        self.blacklist.contains(address)
    }

    /// Score a transaction. `is_contract` is the bytecode lookup result.
    pub fn score(&self, tx: &ParsedTransaction, is_contract: Option<bool>) -> ScanResult {
        let mut total: u32 = 0;
        let mut signals = Vec::new();
        let mut warnings = Vec::new();

        if self.is_blacklisted(&tx.to) {
            total += WEIGHT_BLACKLISTED_RECIPIENT;
            signals.push(Signal::BlacklistedRecipient);
            warnings.push(format!("Recipient {} is on the known-malicious list", tx.to));
        }

        if is_contract == Some(true) {
            total += WEIGHT_CONTRACT_INTERACTION;
            signals.push(Signal::ContractInteraction);
            warnings.push("Recipient is a smart contract".to_string());
        }

        let value_eth = wei_to_eth(tx.value);
        if tx.value > U256::from(VERY_HIGH_VALUE_WEI) {
            total += WEIGHT_VERY_HIGH_VALUE;
            signals.push(Signal::HighValueTransaction);
            warnings.push(format!("Very high value transfer: {:.4} ETH", value_eth));
        } else if tx.value > U256::from(HIGH_VALUE_WEI) {
            total += WEIGHT_HIGH_VALUE;
            signals.push(Signal::HighValueTransaction);
            warnings.push(format!("High value transfer: {:.4} ETH", value_eth));
        }

        if let Some(selector) = tx.selector() {
            if let Some(method) = self.suspicious_methods.get(selector.as_str()) {
                total += WEIGHT_SUSPICIOUS_METHOD;
                signals.push(Signal::SuspiciousMethod);
                warnings.push(format!("Calls {} ({}) which can move or approve assets", method, selector));
            }
            if let Some(pattern) = self.exploit_patterns.get(selector.as_str()) {
                total += WEIGHT_KNOWN_EXPLOIT;
                signals.push(Signal::KnownExploitPattern);
                warnings.push(format!("Calldata matches known exploit pattern {} ({})", pattern, selector));
            }
        }

        let high_gas_price = tx
            .gas_price
            .map(|p| p > U256::from(HIGH_GAS_PRICE_WEI))
            .unwrap_or(false);
        if high_gas_price {
            total += WEIGHT_HIGH_GAS_PRICE;
            signals.push(Signal::HighGasPrice);
            let gwei = tx.gas_price.map(wei_to_gwei).unwrap_or_default();
            warnings.push(format!("Gas price {:.1} Gwei is unusually high", gwei));
        }

        if let Some(gas) = tx.gas {
            if gas > U256::from(HIGH_GAS_LIMIT) {
                total += WEIGHT_HIGH_GAS_LIMIT;
                signals.push(Signal::HighGasLimit);
                warnings.push(format!("Gas limit {} exceeds {}", gas, HIGH_GAS_LIMIT));
            }
        }

        if tx.value > U256::from(BEHAVIOR_VALUE_WEI) && tx.has_data() && high_gas_price {
            total += WEIGHT_SUSPICIOUS_BEHAVIOR;
            signals.push(Signal::SuspiciousBehaviorPattern);
            warnings.push(
                "Value transfer with calldata at a premium gas price resembles a drain attempt"
                    .to_string(),
            );
        }

        let risk_score = total.min(100) as u8;
        let risk_level = RiskLevel::from_transaction_score(risk_score);

        ScanResult {
            risk_score,
            risk_level,
            signals,
            warnings,
            recommendations: recommendations_for(risk_level),
        }
    }
}

/// Fixed list per level; only the achieved level's list is returned
fn recommendations_for(level: RiskLevel) -> Vec<String> {
    let texts: &[&str] = match level {
        RiskLevel::Critical => &TX_RECOMMENDATIONS_CRITICAL,
        RiskLevel::High => &TX_RECOMMENDATIONS_HIGH,
        RiskLevel::Medium => &TX_RECOMMENDATIONS_MEDIUM,
        RiskLevel::Low => &TX_RECOMMENDATIONS_LOW,
        RiskLevel::Safe => &TX_RECOMMENDATIONS_SAFE,
    };
    texts.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::TransactionInput;

    const CLEAN_TO: &str = "0x1111111111111111111111111111111111111111";

    fn tx(to: &str, value: &str) -> TransactionInput {
        TransactionInput {
            to: Some(to.to_string()),
            value: Some(value.to_string()),
            ..Default::default()
        }
    }

    fn score(input: TransactionInput) -> ScanResult {
        TransactionScorer::new().score(&input.parse().unwrap(), None)
    }

    #[test]
    fn test_clean_transaction_is_safe() {
        let result = score(tx(CLEAN_TO, "0x0"));
        assert_eq!(result.risk_score, 0);
        assert_eq!(result.risk_level, RiskLevel::Safe);
        assert!(result.signals.is_empty());
        assert_eq!(result.recommendations, vec!["No significant risks detected"]);
    }

    #[test]
    fn test_blacklisted_recipient() {
        let result = score(tx("0x098B716B8Aaf21512996dC57EB0615e2383E2f96", "0x0"));
        assert_eq!(result.risk_score, 40);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert!(result.signals.contains(&Signal::BlacklistedRecipient));
    }

    #[test]
    fn test_value_boundary_is_strict() {
        // exactly 1 ETH
        let result = score(tx(CLEAN_TO, "0xde0b6b3a7640000"));
        assert!(!result.signals.contains(&Signal::HighValueTransaction));
        assert_eq!(result.risk_score, 0);

        // 1.0000001 ETH = 1_000_000_100_000_000_000 wei
        let above = format!("0x{:x}", 1_000_000_100_000_000_000u128);
        let result = score(tx(CLEAN_TO, &above));
        assert!(result.signals.contains(&Signal::HighValueTransaction));
        assert_eq!(result.risk_score, 15);
    }

    #[test]
    fn test_very_high_value_replaces_high_value() {
        let eleven_eth = format!("0x{:x}", 11 * WEI_PER_ETH);
        let result = score(tx(CLEAN_TO, &eleven_eth));
        assert_eq!(result.risk_score, 25);
        assert_eq!(
            result
                .signals
                .iter()
                .filter(|s| **s == Signal::HighValueTransaction)
                .count(),
            1
        );
    }

    #[test]
    fn test_suspicious_and_exploit_selectors() {
        let mut input = tx(CLEAN_TO, "0x0");
        input.data = Some("0x095ea7b3".to_string());
        let result = score(input);
        assert_eq!(result.risk_score, 20);
        assert_eq!(result.signals, vec![Signal::SuspiciousMethod]);

        let mut input = tx(CLEAN_TO, "0x0");
        input.data = Some("0x0e0a1c3d00".to_string());
        let result = score(input);
        assert_eq!(result.risk_score, 35);
        assert_eq!(result.signals, vec![Signal::KnownExploitPattern]);
    }

    #[test]
    fn test_short_calldata_has_no_selector() {
        let mut input = tx(CLEAN_TO, "0x0");
        input.data = Some("0x095ea7".to_string());
        assert_eq!(score(input).risk_score, 0);
    }

    #[test]
    fn test_gas_rules() {
        let mut input = tx(CLEAN_TO, "0x0");
        input.gas_price = Some(format!("0x{:x}", HIGH_GAS_PRICE_WEI)); // exactly 200 gwei
        input.gas = Some(format!("0x{:x}", HIGH_GAS_LIMIT)); // exactly 300k
        assert_eq!(score(input).risk_score, 0);

        let mut input = tx(CLEAN_TO, "0x0");
        input.gas_price = Some(format!("0x{:x}", HIGH_GAS_PRICE_WEI + 1));
        input.gas = Some(format!("0x{:x}", HIGH_GAS_LIMIT + 1));
        let result = score(input);
        assert_eq!(result.risk_score, 25);
        assert!(result.signals.contains(&Signal::HighGasPrice));
        assert!(result.signals.contains(&Signal::HighGasLimit));
    }

    #[test]
    fn test_compound_behavior_rule() {
        let mut input = tx(CLEAN_TO, &format!("0x{:x}", WEI_PER_ETH / 2));
        input.data = Some("0xdeadbeef".to_string());
        input.gas_price = Some(format!("0x{:x}", 300 * WEI_PER_GWEI));
        let result = score(input);
        // 10 (gas price) + 20 (compound)
        assert_eq!(result.risk_score, 30);
        assert!(result.signals.contains(&Signal::SuspiciousBehaviorPattern));
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_contract_rule_only_when_known() {
        let parsed = tx(CLEAN_TO, "0x0").parse().unwrap();
        let scorer = TransactionScorer::new();
        assert_eq!(scorer.score(&parsed, Some(true)).risk_score, 10);
        assert_eq!(scorer.score(&parsed, Some(false)).risk_score, 0);
        assert_eq!(scorer.score(&parsed, None).risk_score, 0);
    }

    #[test]
    fn test_every_rule_clamps_to_100() {
        let input = TransactionInput {
            to: Some(BLACKLISTED_ADDRESSES[0].to_string()),
            from: Some(CLEAN_TO.to_string()),
            value: Some(format!("0x{:x}", 50 * WEI_PER_ETH)),
            data: Some("0x0e0a1c3d".to_string()),
            gas_price: Some(format!("0x{:x}", 500 * WEI_PER_GWEI)),
            gas: Some(format!("0x{:x}", 1_000_000u64)),
        };
        let result = TransactionScorer::new().score(&input.parse().unwrap(), Some(true));
        assert_eq!(result.risk_score, 100);
        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert_eq!(result.signals.len(), 7);
        assert_eq!(result.recommendations.len(), TX_RECOMMENDATIONS_CRITICAL.len());
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let input = tx(BLACKLISTED_ADDRESSES[1], &format!("0x{:x}", 2 * WEI_PER_ETH));
        assert_eq!(score(input.clone()), score(input));
    }
}
