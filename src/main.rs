//! Sovereign Identity Guardian - offline scanner
//!
//! Scores a file (or stdin) with the same engine the API uses and prints
//! the outcome as pretty JSON.
//!
//! Usage:
//!   guardian <email|activity|general|transaction> [FILE]
//!
//! For `transaction` the input is a JSON object with hex-string fields
//! (`to`, `value`, `data`, `gasPrice`, `gas`). Set `GUARDIAN_MODEL_URL`
//! and/or `ETH_HTTP_URL` to use the same providers as the server.

use sovereign_guardian::api::AppState;
use sovereign_guardian::models::{AppError, ContentKind, GuardianConfig, ScanInput, TransactionInput};

use eyre::{Result, WrapErr};
use std::io::Read;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE: &str = "usage: guardian <email|activity|general|transaction> [FILE]";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so stdout stays valid JSON
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (mode, path) = match args.as_slice() {
        [mode] => (mode.as_str(), None),
        [mode, path] => (mode.as_str(), Some(path.as_str())),
        _ => {
            eprintln!("{}", USAGE);
            return Ok(ExitCode::from(2));
        }
    };

    let raw = read_input(path)?;

    let input = match build_input(mode, raw) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("❌ {}", e.message);
            eprintln!("{}", USAGE);
            return Ok(ExitCode::from(2));
        }
    };

    let state = AppState::from_config(GuardianConfig::from_env())?;
    let outcome = match state.engine.scan(&input).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_client_error() => {
            eprintln!("❌ {}", e.message);
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e).wrap_err("scan failed"),
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(ExitCode::SUCCESS)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path))
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .wrap_err("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn build_input(mode: &str, raw: String) -> Result<ScanInput, AppError> {
    if mode == "transaction" {
        let transaction: TransactionInput = serde_json::from_str(&raw)
            .map_err(|e| AppError::bad_request(format!("invalid transaction JSON: {}", e)))?;
        return Ok(ScanInput::Transaction { transaction });
    }
    let kind = ContentKind::parse(mode)?;
    ScanInput::text(raw, kind)
}
