//! Warden Gateway - Network-level governance enforcement
//!
//! Intercepts agent tool calls through an HTTP proxy and enforces the
//! governance kernel's decisions outside the agent process, making them
//! non-bypassable. Fail-closed: only an explicit ALLOW executes a tool.
//!
//! ## Endpoints
//!
//! ```text
//! POST /tool/:name   - execute a tool call under governance
//! GET  /health       - health check
//! GET  /metrics      - Prometheus metrics
//! GET  /status       - current kernel state
//! ```
//!
//! ## Environment
//!
//! - `WARDEN_GATEWAY_ADDR` - bind address (default `0.0.0.0:8000`)
//! - `WARDEN_POLICY_FILE`  - YAML policy file (default: built-in balanced)
//! - `WARDEN_AUDIT_FILE`   - audit chain path (default `audit_chain.jsonl`)

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use warden_audit::HashChainedAuditLogger;
use warden_kernel::GovernanceKernel;
use warden_types::Profile;

mod app;
mod backend;

use app::{create_app, GatewayState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let profile = match std::env::var("WARDEN_POLICY_FILE") {
        Ok(path) => {
            tracing::info!(%path, "loading governance policy");
            warden_policy::load_policy_profile(&path)?
        }
        Err(_) => Profile::balanced(),
    };
    tracing::info!(profile = %profile.name, max_steps = profile.max_steps, "governance profile loaded");

    let audit_path =
        std::env::var("WARDEN_AUDIT_FILE").unwrap_or_else(|_| "audit_chain.jsonl".to_string());
    let audit = HashChainedAuditLogger::with_file(&audit_path)?;
    tracing::info!(path = %audit_path, replayed = audit.entries_written(), "audit chain ready");

    let kernel = GovernanceKernel::new(profile)?;
    let state = Arc::new(GatewayState::new(kernel, audit));
    let app = create_app(state);

    let addr = std::env::var("WARDEN_GATEWAY_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    tracing::info!(%addr, "warden gateway listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
