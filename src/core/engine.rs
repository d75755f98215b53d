//! Scan Engine
//!
//! Routes a ScanInput to a scorer. With an external model configured it is
//! tried first; any failure there is logged and the rule-based result is
//! returned instead, flagged as a fallback. Without one, rules answer
//! directly.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::core::content::ContentScorer;
use crate::core::transaction::TransactionScorer;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{ScanInput, ScanOutcome, ScanResult};
use crate::providers::rpc::ChainDataProvider;
use crate::utils::constants::RULE_ENGINE_NAME;

/// Anything that can turn a ScanInput into a ScanResult
#[async_trait]
pub trait RiskModel: Send + Sync {
    fn name(&self) -> &str;

    async fn score(&self, input: &ScanInput) -> eyre::Result<ScanResult>;
}

/// Built-in heuristic model
pub struct RuleBasedModel {
    transactions: TransactionScorer,
    content: ContentScorer,
    chain: Option<Arc<dyn ChainDataProvider>>,
}

impl Default for RuleBasedModel {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleBasedModel {
    pub fn new() -> Self {
        Self {
            transactions: TransactionScorer::new(),
            content: ContentScorer::new(),
            chain: None,
        }
    }

    /// Enable the bytecode rule through `chain`
    pub fn with_chain(mut self, chain: Arc<dyn ChainDataProvider>) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn content_scorer(&self) -> &ContentScorer {
        &self.content
    }

    /// Validate and score. Validation errors surface; chain errors do not.
    pub async fn evaluate(&self, input: &ScanInput) -> AppResult<ScanResult> {
        match input {
            ScanInput::Text { content, .. } => Ok(self.content.score(content)),
            ScanInput::Transaction { transaction } => {
                let parsed = transaction.parse()?;
                let is_contract = match &self.chain {
                    Some(chain) => match chain.has_code(parsed.to).await {
                        Ok(has_code) => Some(has_code),
                        Err(e) => {
                            let code = e
                                .downcast_ref::<AppError>()
                                .map(|a| a.code_str())
                                .unwrap_or(ErrorCode::Unknown.as_str());
                            warn!(code, "⚠️ Bytecode lookup for {} failed, skipping rule: {}", parsed.to, e);
                            None
                        }
                    },
                    None => None,
                };
                Ok(self.transactions.score(&parsed, is_contract))
            }
        }
    }
}

#[async_trait]
impl RiskModel for RuleBasedModel {
    fn name(&self) -> &str {
        RULE_ENGINE_NAME
    }

    async fn score(&self, input: &ScanInput) -> eyre::Result<ScanResult> {
        self.evaluate(input).await.map_err(|e| eyre::eyre!(e.to_string()))
    }
}

/// Scorer selection plus fallback
pub struct ScanEngine {
    external: Option<Arc<dyn RiskModel>>,
    rules: RuleBasedModel,
}

impl ScanEngine {
    /// Rules only
    pub fn new(rules: RuleBasedModel) -> Self {
        Self {
            external: None,
            rules,
        }
    }

    /// Try `model` first, rules on failure
    pub fn with_external(mut self, model: Arc<dyn RiskModel>) -> Self {
        info!("🤖 External risk model enabled: {}", model.name());
        self.external = Some(model);
        self
    }

    pub fn rules(&self) -> &RuleBasedModel {
        &self.rules
    }

    pub fn has_external(&self) -> bool {
        self.external.is_some()
    }

    /// Score `input`. Only validation problems are returned as errors.
    pub async fn scan(&self, input: &ScanInput) -> AppResult<ScanOutcome> {
        let start = Instant::now();

        // Reject bad transactions before anything leaves the process
        if let ScanInput::Transaction { transaction } = input {
            transaction.parse()?;
        }

        if let Some(model) = &self.external {
            match model.score(input).await {
                Ok(result) => {
                    debug!(
                        "🤖 {} scored {} input: {} ({}ms)",
                        model.name(),
                        input.kind_str(),
                        result.risk_score,
                        start.elapsed().as_millis()
                    );
                    return Ok(ScanOutcome {
                        result,
                        engine: model.name().to_string(),
                        fallback: false,
                        fallback_reason: None,
                    });
                }
                Err(e) => {
                    let reason = failure_code(&e);
                    warn!(
                        code = reason.as_str(),
                        "⚠️ {} failed, falling back to rules: {}",
                        model.name(),
                        e
                    );
                    let result = self.rules.evaluate(input).await?;
                    return Ok(ScanOutcome {
                        result,
                        engine: RULE_ENGINE_NAME.to_string(),
                        fallback: true,
                        fallback_reason: Some(reason.as_str().to_string()),
                    });
                }
            }
        }

        let result = self.rules.evaluate(input).await?;
        debug!(
            "📐 Rules scored {} input: {} ({}ms)",
            input.kind_str(),
            result.risk_score,
            start.elapsed().as_millis()
        );
        Ok(ScanOutcome {
            result,
            engine: RULE_ENGINE_NAME.to_string(),
            fallback: false,
            fallback_reason: None,
        })
    }
}

/// Code carried by a model failure; untyped errors count as unavailability
fn failure_code(err: &eyre::Report) -> ErrorCode {
    err.downcast_ref::<AppError>()
        .map(|e| e.code)
        .unwrap_or(ErrorCode::ModelUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::{ContentKind, RiskLevel, Signal, TransactionInput};
    use alloy_primitives::Address;

    struct FailingModel;

    #[async_trait]
    impl RiskModel for FailingModel {
        fn name(&self) -> &str {
            "failing"
        }

        async fn score(&self, _input: &ScanInput) -> eyre::Result<ScanResult> {
            Err(eyre::eyre!("model crashed"))
        }
    }

    struct GarbageModel;

    #[async_trait]
    impl RiskModel for GarbageModel {
        fn name(&self) -> &str {
            "garbage"
        }

        async fn score(&self, _input: &ScanInput) -> eyre::Result<ScanResult> {
            Err(AppError::new(ErrorCode::ModelInvalidOutput, "score 300 out of range").into())
        }
    }

    struct FixedModel;

    #[async_trait]
    impl RiskModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn score(&self, _input: &ScanInput) -> eyre::Result<ScanResult> {
            Ok(ScanResult {
                risk_score: 5,
                risk_level: RiskLevel::Safe,
                signals: vec![],
                warnings: vec![],
                recommendations: vec![],
            })
        }
    }

    struct Chain(eyre::Result<bool>);

    #[async_trait]
    impl ChainDataProvider for Chain {
        async fn has_code(&self, _address: Address) -> eyre::Result<bool> {
            match &self.0 {
                Ok(v) => Ok(*v),
                Err(e) => Err(eyre::eyre!(e.to_string())),
            }
        }
    }

    fn tx_input() -> ScanInput {
        ScanInput::Transaction {
            transaction: TransactionInput {
                to: Some("0x1111111111111111111111111111111111111111".to_string()),
                value: Some("0x0".to_string()),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_rules_only() {
        let engine = ScanEngine::new(RuleBasedModel::new());
        let outcome = engine.scan(&tx_input()).await.unwrap();
        assert_eq!(outcome.engine, RULE_ENGINE_NAME);
        assert!(!outcome.fallback);
        assert_eq!(outcome.result.risk_score, 0);
    }

    #[tokio::test]
    async fn test_external_failure_falls_back() {
        let engine = ScanEngine::new(RuleBasedModel::new()).with_external(Arc::new(FailingModel));
        let input = ScanInput::text("urgent urgent", ContentKind::Email).unwrap();
        let outcome = engine.scan(&input).await.unwrap();
        assert!(outcome.fallback);
        assert_eq!(outcome.engine, RULE_ENGINE_NAME);
        assert_eq!(outcome.result.risk_score, 16);
        assert_eq!(outcome.fallback_reason.as_deref(), Some("MODEL_UNAVAILABLE"));
    }

    #[tokio::test]
    async fn test_fallback_reason_keeps_model_error_code() {
        let engine = ScanEngine::new(RuleBasedModel::new()).with_external(Arc::new(GarbageModel));
        let outcome = engine.scan(&tx_input()).await.unwrap();
        assert!(outcome.fallback);
        assert_eq!(outcome.fallback_reason.as_deref(), Some("MODEL_INVALID_OUTPUT"));
    }

    #[tokio::test]
    async fn test_external_success_is_used() {
        let engine = ScanEngine::new(RuleBasedModel::new()).with_external(Arc::new(FixedModel));
        let outcome = engine.scan(&tx_input()).await.unwrap();
        assert_eq!(outcome.engine, "fixed");
        assert_eq!(outcome.result.risk_score, 5);
        assert!(outcome.fallback_reason.is_none());
    }

    #[tokio::test]
    async fn test_invalid_transaction_never_reaches_model() {
        let engine = ScanEngine::new(RuleBasedModel::new()).with_external(Arc::new(FixedModel));
        let input = ScanInput::Transaction {
            transaction: TransactionInput {
                to: Some("0xnope".to_string()),
                value: Some("0x0".to_string()),
                ..Default::default()
            },
        };
        let err = engine.scan(&input).await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_bytecode_rule_and_lookup_failure() {
        let rules = RuleBasedModel::new().with_chain(Arc::new(Chain(Ok(true))));
        let result = rules.evaluate(&tx_input()).await.unwrap();
        assert_eq!(result.risk_score, 10);
        assert_eq!(result.signals, vec![Signal::ContractInteraction]);

        let rules = RuleBasedModel::new().with_chain(Arc::new(Chain(Err(eyre::eyre!("timeout")))));
        let result = rules.evaluate(&tx_input()).await.unwrap();
        assert_eq!(result.risk_score, 0);
    }
}
