//! Sovereign Identity Guardian API Server
//!
//! Usage:
//!   cargo run --bin guardian_api
//!
//! Environment:
//!   PORT / GUARDIAN_PORT - Server port (default: 8080)
//!   GUARDIAN_HOST        - Server host (default: 0.0.0.0)
//!   GUARDIAN_ENV         - development | production
//!   ETH_HTTP_URL         - JSON-RPC endpoint for the contract rule (optional)
//!   GUARDIAN_MODEL_URL   - External risk model endpoint (optional)
//!   RUST_LOG             - Log filter (default: info)

use sovereign_guardian::api::{create_router, AppState};
use sovereign_guardian::models::GuardianConfig;
use sovereign_guardian::store::start_refresh_task;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let config = GuardianConfig::from_env();
    config.log_summary();

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let refresh_interval = config.refresh_interval;

    // Create app state
    let state = Arc::new(AppState::from_config(config)?);
    let telemetry = state.telemetry.clone();

    // Periodic threat feed merge
    let refresh = start_refresh_task(state.threats.clone(), refresh_interval);
    info!("🔄 Threat feed refresh every {}s", refresh_interval.as_secs());

    let app = create_router(state);

    info!("🚀 Guardian API starting on http://{}", addr);
    info!("");
    info!("Endpoints:");
    info!("  POST /api/scan/transaction                  - Transaction risk scan");
    info!("  POST /api/scan/content                      - Content scan (type: email|activity|general)");
    info!("  POST /api/scan/email                        - Email phishing scan");
    info!("  POST /api/scan/activity                     - Activity log privacy scan");
    info!("  GET  /api/threat-intel/check-address/:addr  - Address lookup");
    info!("  POST /api/threat-intel/report-threat        - Report an address");
    info!("  GET  /api/threat-intel/threats              - List known threats");
    info!("  GET  /api/threat-intel/stats                - Threat statistics");
    info!("  POST /api/auth/register | /api/auth/login   - Demo accounts");
    info!("  GET  /health                                - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("");
    info!("🛑 Shutdown signal received, cleaning up...");
    refresh.abort();

    for line in telemetry.get_stats().summary().lines() {
        info!("{}", line);
    }

    info!("👋 Guardian API shutdown complete");

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════════════════════╗
    ║                                                              ║
    ║         S O V E R E I G N   I D E N T I T Y                  ║
    ║                  G U A R D I A N                             ║
    ║                                                              ║
    ║           Content & Transaction Risk Scoring                 ║
    ║                       API v0.1.0                             ║
    ║                                                              ║
    ╚══════════════════════════════════════════════════════════════╝
    "#
    );
}
