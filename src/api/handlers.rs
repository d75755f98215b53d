//! API Request Handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Path, Query, State,
    },
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::types::*;
use crate::core::attestation;
use crate::core::engine::{RuleBasedModel, ScanEngine};
use crate::models::config::GuardianConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{ContentKind, ScanInput};
use crate::providers::model::HttpRiskModel;
use crate::providers::rpc::RpcProvider;
use crate::store::threat_intel::{
    CheckResult, InMemoryThreatStore, ReportReceipt, ThreatPage, ThreatRepository, ThreatStats,
};
use crate::store::samples::{
    LabeledSample, SampleKind, SampleLabel, SampleMeta, SamplePage, SampleStats, SampleStore,
};
use crate::store::users::UserStore;
use crate::utils::constants::{APP_NAME, APP_VERSION};
use crate::utils::telemetry::{ScanStats, ScanTelemetry};
use crate::utils::validation::is_valid_address;

/// Handler result: envelope on success, status plus error envelope on failure
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

/// Shared application state
pub struct AppState {
    pub engine: Arc<ScanEngine>,
    pub threats: Arc<dyn ThreatRepository>,
    pub samples: Arc<SampleStore>,
    pub users: Arc<UserStore>,
    pub telemetry: Arc<ScanTelemetry>,
    pub config: GuardianConfig,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: GuardianConfig, engine: ScanEngine, threats: Arc<dyn ThreatRepository>) -> Self {
        Self {
            engine: Arc::new(engine),
            threats,
            samples: Arc::new(SampleStore::new()),
            users: Arc::new(UserStore::new()),
            telemetry: Arc::new(ScanTelemetry::new()),
            config,
            start_time: Instant::now(),
        }
    }

    /// Wire providers and stores from configuration
    pub fn from_config(config: GuardianConfig) -> eyre::Result<Self> {
        let mut rules = RuleBasedModel::new();
        if let Some(url) = &config.eth_rpc_url {
            let provider = RpcProvider::new(url.clone(), config.rpc_timeout)?;
            info!("✅ Chain data provider ready ({})", provider.masked_url());
            rules = rules.with_chain(Arc::new(provider));
        }

        let mut engine = ScanEngine::new(rules);
        if let Some(url) = &config.model_url {
            let model = HttpRiskModel::new(url.clone(), config.model_timeout)?;
            engine = engine.with_external(Arc::new(model));
        }

        let threats: Arc<dyn ThreatRepository> = Arc::new(InMemoryThreatStore::new());
        Ok(Self::new(config, engine, threats))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    fn fail(&self, err: AppError, start: Instant) -> (StatusCode, Json<ApiResponse<()>>) {
        let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if err.is_client_error() {
            warn!("⚠️ {} rejected: {}", err.code_str(), err.message);
        } else {
            error!("❌ {}", err);
        }
        let body = ApiError::from_app_error(&err, self.config.environment.is_production());
        (status, Json(ApiResponse::error(body, elapsed_ms(start))))
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn bad_body(rejection: JsonRejection) -> AppError {
    AppError::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        service: APP_NAME.to_string(),
        version: APP_VERSION.to_string(),
        environment: state.config.environment.as_str().to_string(),
        uptime_seconds: state.uptime_seconds(),
        external_model: state.engine.has_external(),
        chain_provider: state.config.eth_rpc_url.is_some(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ScanStats>> {
    let start = Instant::now();
    Json(ApiResponse::success(state.telemetry.get_stats(), elapsed_ms(start)))
}

// ============================================
// Scanning
// ============================================

pub async fn scan_transaction(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TransactionScanRequest>, JsonRejection>,
) -> ApiResult<TransactionScanData> {
    let start = Instant::now();
    run_transaction_scan(&state, body, start)
        .await
        .map(|data| Json(ApiResponse::success(data, elapsed_ms(start))))
        .map_err(|e| state.fail(e, start))
}

async fn run_transaction_scan(
    state: &AppState,
    body: Result<Json<TransactionScanRequest>, JsonRejection>,
    start: Instant,
) -> AppResult<TransactionScanData> {
    let Json(req) = body.map_err(bad_body)?;
    let transaction = req
        .transaction_data
        .ok_or_else(|| AppError::bad_request("transactionData is required"))?;
    if let Some(user) = req.user_address.as_deref() {
        if !is_valid_address(user.trim()) {
            return Err(AppError::bad_request(
                "userAddress must be 0x followed by 40 hex characters",
            ));
        }
    }

    let input = ScanInput::Transaction { transaction };
    let outcome = state.engine.scan(&input).await?;
    let scan_id = Uuid::new_v4().to_string();
    let zkp_data = attestation::issue(input.kind_str(), &scan_id, &outcome.result)?;

    state
        .telemetry
        .record_scan(input.kind_str(), &outcome, start.elapsed().as_millis() as u64);
    info!(
        "{} Transaction scan {}: {} ({}) via {}",
        outcome.result.risk_level.emoji(),
        scan_id,
        outcome.result.risk_score,
        outcome.result.risk_level.as_str(),
        outcome.engine
    );

    Ok(TransactionScanData {
        analysis: outcome.result,
        zkp_data,
        scan_id,
        engine: outcome.engine,
        fallback: outcome.fallback,
        fallback_reason: outcome.fallback_reason,
    })
}

/// `type` from the body, defaulting to general
pub async fn scan_content(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ContentScanRequest>, JsonRejection>,
) -> ApiResult<ContentScanData> {
    scan_text(state, None, body).await
}

pub async fn scan_email(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ContentScanRequest>, JsonRejection>,
) -> ApiResult<ContentScanData> {
    scan_text(state, Some(ContentKind::Email), body).await
}

pub async fn scan_activity(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ContentScanRequest>, JsonRejection>,
) -> ApiResult<ContentScanData> {
    scan_text(state, Some(ContentKind::Activity), body).await
}

async fn scan_text(
    state: Arc<AppState>,
    forced_kind: Option<ContentKind>,
    body: Result<Json<ContentScanRequest>, JsonRejection>,
) -> ApiResult<ContentScanData> {
    let start = Instant::now();
    run_text_scan(&state, forced_kind, body, start)
        .await
        .map(|data| Json(ApiResponse::success(data, elapsed_ms(start))))
        .map_err(|e| state.fail(e, start))
}

async fn run_text_scan(
    state: &AppState,
    forced_kind: Option<ContentKind>,
    body: Result<Json<ContentScanRequest>, JsonRejection>,
    start: Instant,
) -> AppResult<ContentScanData> {
    let Json(req) = body.map_err(bad_body)?;
    let kind = match forced_kind {
        Some(kind) => kind,
        None => match req.kind.as_deref() {
            Some(raw) => ContentKind::parse(raw)?,
            None => ContentKind::General,
        },
    };
    let content = req.content.unwrap_or_default();
    let input = ScanInput::text(content.clone(), kind)?;

    let outcome = state.engine.scan(&input).await?;
    let statistics = state
        .engine
        .rules()
        .content_scorer()
        .statistics(&content, &outcome.result);
    let scan_id = Uuid::new_v4().to_string();
    let zkp_data = attestation::issue(kind.as_str(), &scan_id, &outcome.result)?;

    state
        .telemetry
        .record_scan(kind.as_str(), &outcome, start.elapsed().as_millis() as u64);
    info!(
        "{} {} scan {}: {} ({}) via {}",
        outcome.result.risk_level.emoji(),
        kind.as_str(),
        scan_id,
        outcome.result.risk_score,
        outcome.result.risk_level.as_str(),
        outcome.engine
    );

    Ok(ContentScanData {
        risk_level: outcome.result.risk_level,
        risk_score: outcome.result.risk_score,
        warnings: outcome.result.warnings.clone(),
        analysis: outcome.result,
        statistics,
        zkp_data,
        scan_id,
        engine: outcome.engine,
        fallback: outcome.fallback,
        fallback_reason: outcome.fallback_reason,
    })
}

// ============================================
// Threat Intelligence
// ============================================

pub async fn check_address(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<CheckResult> {
    let start = Instant::now();
    state
        .threats
        .check(&address)
        .map(|data| Json(ApiResponse::success(data, elapsed_ms(start))))
        .map_err(|e| state.fail(e, start))
}

pub async fn report_threat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ReportThreatRequest>, JsonRejection>,
) -> ApiResult<ReportReceipt> {
    let start = Instant::now();

    let result = body.map_err(bad_body).and_then(|Json(req)| {
        let address = req
            .address
            .ok_or_else(|| AppError::bad_request("address is required"))?;
        let proof = req
            .proof
            .ok_or_else(|| AppError::bad_request("proof is required"))?;
        state
            .threats
            .report(&address, &proof, req.threat_data.unwrap_or_default())
    });

    result
        .map(|data| Json(ApiResponse::success(data, elapsed_ms(start))))
        .map_err(|e| state.fail(e, start))
}

pub async fn list_threats(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<ThreatPage> {
    let start = Instant::now();
    let Query(params) = params.map_err(|e| {
        state.fail(
            AppError::bad_request(format!("Invalid query: {}", e.body_text())),
            start,
        )
    })?;

    let page = state.threats.list(params.limit, params.offset);
    Ok(Json(ApiResponse::success(page, elapsed_ms(start))))
}

pub async fn threat_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ThreatStats>> {
    let start = Instant::now();
    Json(ApiResponse::success(state.threats.stats(), elapsed_ms(start)))
}

// ============================================
// Labelled Samples
// ============================================

fn required_label(label: Option<SampleLabel>) -> AppResult<SampleLabel> {
    label.ok_or_else(|| AppError::bad_request("label is required (0 = legitimate, 1 = malicious)"))
}

pub async fn add_email_sample(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EmailSampleRequest>, JsonRejection>,
) -> ApiResult<LabeledSample> {
    let start = Instant::now();

    let result = body.map_err(bad_body).and_then(|Json(req)| {
        let label = required_label(req.label)?;
        let meta = SampleMeta {
            source: req.source,
            description: req.description,
        };
        state
            .samples
            .add_email(req.content.unwrap_or_default(), label, meta)
    });

    result
        .map(|data| Json(ApiResponse::success(data, elapsed_ms(start))))
        .map_err(|e| state.fail(e, start))
}

pub async fn add_transaction_sample(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TransactionSampleRequest>, JsonRejection>,
) -> ApiResult<LabeledSample> {
    let start = Instant::now();

    let result = body.map_err(bad_body).and_then(|Json(req)| {
        let transaction = req
            .transaction_data
            .ok_or_else(|| AppError::bad_request("transactionData is required"))?;
        let label = required_label(req.label)?;
        let meta = SampleMeta {
            source: req.source,
            description: req.description,
        };
        state.samples.add_transaction(transaction, label, meta)
    });

    result
        .map(|data| Json(ApiResponse::success(data, elapsed_ms(start))))
        .map_err(|e| state.fail(e, start))
}

fn list_samples(
    state: &AppState,
    kind: SampleKind,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<SamplePage> {
    let start = Instant::now();
    let Query(params) = params.map_err(|e| {
        state.fail(
            AppError::bad_request(format!("Invalid query: {}", e.body_text())),
            start,
        )
    })?;

    let page = state.samples.list(kind, params.limit, params.offset);
    Ok(Json(ApiResponse::success(page, elapsed_ms(start))))
}

pub async fn list_email_samples(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<SamplePage> {
    list_samples(&state, SampleKind::Email, params)
}

pub async fn list_transaction_samples(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<SamplePage> {
    list_samples(&state, SampleKind::Transaction, params)
}

pub async fn clear_email_samples(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ClearedData>> {
    let start = Instant::now();
    let cleared = state.samples.clear(SampleKind::Email);
    Json(ApiResponse::success(ClearedData { cleared }, elapsed_ms(start)))
}

pub async fn clear_transaction_samples(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<ClearedData>> {
    let start = Instant::now();
    let cleared = state.samples.clear(SampleKind::Transaction);
    Json(ApiResponse::success(ClearedData { cleared }, elapsed_ms(start)))
}

pub async fn sample_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<SampleStats>> {
    let start = Instant::now();
    Json(ApiResponse::success(state.samples.stats(), elapsed_ms(start)))
}

// ============================================
// Auth (demo)
// ============================================

pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<UserData> {
    let start = Instant::now();
    body.map_err(bad_body)
        .and_then(|Json(req)| state.users.register(&req.email, &req.password, &req.username))
        .map(|user| Json(ApiResponse::success(UserData { user }, elapsed_ms(start))))
        .map_err(|e| state.fail(e, start))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<UserData> {
    let start = Instant::now();
    body.map_err(bad_body)
        .and_then(|Json(req)| state.users.login(&req.email, &req.password))
        .map(|user| Json(ApiResponse::success(UserData { user }, elapsed_ms(start))))
        .map_err(|e| state.fail(e, start))
}

pub async fn update_preferences(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PreferencesRequest>, JsonRejection>,
) -> ApiResult<UserData> {
    let start = Instant::now();
    body.map_err(bad_body)
        .and_then(|Json(req)| {
            state
                .users
                .update_preferences(&req.email, &req.password, req.preferences)
        })
        .map(|user| Json(ApiResponse::success(UserData { user }, elapsed_ms(start))))
        .map_err(|e| state.fail(e, start))
}

/// Fallback for unknown paths
pub async fn not_found(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ApiResponse<()>>) {
    state.fail(AppError::not_found("Route not found"), Instant::now())
}
