//! Guardian HTTP API
//! JSON routes for scanning, threat intelligence and the demo accounts

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use types::*;
