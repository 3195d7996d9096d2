//! Gateway application: routes, state, and enforcement flow
//!
//! Fail-closed semantics:
//! - kernel says HALT                -> 403
//! - audit cannot record a decision -> 403
//! - tool execution fails           -> 403
//! - only an explicit ALLOW runs the tool
//!
//! The kernel's decision is audit-logged before the gateway acts on it.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use warden_audit::HashChainedAuditLogger;
use warden_kernel::GovernanceKernel;
use warden_metrics::GovernanceRegistry;
use warden_types::{Decision, Signal};

use crate::backend::{MockToolBackend, ToolBackend};

/// Shared gateway state: one kernel, one audit chain, one registry.
///
/// The kernel is a single-timeline decision authority; the mutex serializes
/// steps so the chain head and step counter stay sequential.
pub struct GatewayState {
    kernel: Mutex<GovernanceKernel>,
    audit: Mutex<HashChainedAuditLogger>,
    backend: Box<dyn ToolBackend>,
    registry: GovernanceRegistry,
}

impl GatewayState {
    pub fn new(kernel: GovernanceKernel, audit: HashChainedAuditLogger) -> Self {
        Self::with_backend(kernel, audit, Box::new(MockToolBackend::new()))
    }

    pub fn with_backend(
        kernel: GovernanceKernel,
        audit: HashChainedAuditLogger,
        backend: Box<dyn ToolBackend>,
    ) -> Self {
        Self {
            kernel: Mutex::new(kernel),
            audit: Mutex::new(audit),
            backend,
            registry: GovernanceRegistry::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ToolCallBody {
    params: Value,
    signals: Signal,
}

/// Build the gateway router
pub fn create_app(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/tool/:name", post(call_tool))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/status", get(status))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn call_tool(
    State(state): State<Arc<GatewayState>>,
    Path(tool_name): Path<String>,
    body: Option<Json<ToolCallBody>>,
) -> Response {
    let Json(body) = body.unwrap_or_default();

    // Governance decision first; any failure inside enforcement denies.
    let decision = match enforce(&state, &tool_name, &body) {
        Ok(decision) => decision,
        Err(error) => {
            tracing::error!(%error, tool = %tool_name, "enforcement failed; denying");
            return blocked_response(
                StatusCode::FORBIDDEN,
                "enforcement_error",
                None,
                Some(error.to_string()),
            );
        }
    };

    if decision.halted {
        tracing::warn!(
            tool = %tool_name,
            step = decision.step,
            reason = decision.failure.as_str(),
            "tool call blocked by governance"
        );
        return blocked_response(
            StatusCode::FORBIDDEN,
            decision.failure.as_str(),
            Some(&decision),
            None,
        );
    }

    if !state.backend.has_tool(&tool_name) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Tool not found: {tool_name}") })),
        )
            .into_response();
    }

    match state.backend.execute(&tool_name, &body.params) {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "allowed": true,
                "step": decision.step,
                "budget": decision.budget,
                "result": result,
            })),
        )
            .into_response(),
        Err(error) => {
            tracing::error!(%error, tool = %tool_name, "tool execution failed; denying");
            blocked_response(
                StatusCode::FORBIDDEN,
                "execution_error",
                Some(&decision),
                Some(error.to_string()),
            )
        }
    }
}

/// Step the kernel and record the decision before anyone acts on it
fn enforce(state: &GatewayState, tool_name: &str, body: &ToolCallBody) -> anyhow::Result<Decision> {
    let decision = {
        let mut kernel = state
            .kernel
            .lock()
            .map_err(|_| anyhow::anyhow!("kernel lock poisoned"))?;
        kernel.step(body.signals)
    };
    state.registry.record_step(&decision);

    {
        let mut audit = state
            .audit
            .lock()
            .map_err(|_| anyhow::anyhow!("audit lock poisoned"))?;
        audit.log(
            decision.step,
            tool_name,
            body.params.clone(),
            &body.signals,
            &decision,
        )?;
    }
    state.registry.record_audit_write();

    Ok(decision)
}

fn blocked_response(
    status: StatusCode,
    halt_reason: &str,
    decision: Option<&Decision>,
    error: Option<String>,
) -> Response {
    let mut body = json!({
        "blocked": true,
        "halt_reason": halt_reason,
    });
    if let Some(decision) = decision {
        body["step"] = json!(decision.step);
        body["budget"] = json!(decision.budget);
    }
    if let Some(error) = error {
        body["error"] = json!(error);
    }
    (status, Json(body)).into_response()
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn metrics(State(state): State<Arc<GatewayState>>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.registry.to_prometheus_text(),
    )
        .into_response()
}

async fn status(State(state): State<Arc<GatewayState>>) -> Response {
    let kernel = match state.kernel.lock() {
        Ok(kernel) => kernel,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "kernel lock poisoned" })),
            )
                .into_response()
        }
    };
    Json(json!({
        "step": kernel.step_count(),
        "mode": kernel.mode().as_str(),
        "halted": kernel.is_halted(),
        "budget": kernel.budget(),
        "profile": kernel.profile().name,
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use warden_types::Profile;

    fn create_test_app(profile: Profile) -> Router {
        let kernel = GovernanceKernel::new(profile).unwrap();
        let state = Arc::new(GatewayState::new(kernel, HashChainedAuditLogger::new()));
        create_app(state)
    }

    async fn post_tool(app: &Router, tool: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/tool/{tool}"))
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap_or(json!(null));
        (status, json)
    }

    async fn get_path(app: &Router, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[tokio::test]
    async fn test_healthy_action_is_allowed() {
        let app = create_test_app(Profile::balanced());
        let (status, body) = post_tool(
            &app,
            "echo",
            json!({
                "params": {"message": "hello"},
                "signals": {"reward": 0.5, "novelty": 0.1}
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["allowed"], true);
        assert_eq!(body["result"]["result"], "hello");
        assert!(body["budget"]["effort"].is_f64());
    }

    #[tokio::test]
    async fn test_stagnating_requests_are_eventually_blocked() {
        let app = create_test_app(Profile::conservative());

        let mut blocked = None;
        for _ in 0..25 {
            let (status, body) = post_tool(
                &app,
                "test_action",
                json!({
                    "params": {},
                    "signals": {"reward": 0.0, "novelty": 0.0, "urgency": 0.3}
                }),
            )
            .await;
            if status == StatusCode::FORBIDDEN {
                blocked = Some(body);
                break;
            }
        }

        let body = blocked.expect("conservative kernel must halt within 25 requests");
        assert_eq!(body["blocked"], true);
        let reason = body["halt_reason"].as_str().unwrap();
        assert!(["stagnation", "exhaustion", "max_steps"].contains(&reason));
    }

    #[tokio::test]
    async fn test_halted_kernel_blocks_even_glowing_signals() {
        let app = create_test_app(Profile::conservative());

        for _ in 0..25 {
            post_tool(&app, "test_action", json!({ "signals": {"reward": 0.0} })).await;
        }
        // Once halted, a perfect signal is still denied.
        let (status, body) = post_tool(
            &app,
            "echo",
            json!({ "params": {"message": "please"}, "signals": {"reward": 1.0} }),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["blocked"], true);
    }

    #[tokio::test]
    async fn test_execution_error_is_fail_closed() {
        struct FailingBackend;
        impl ToolBackend for FailingBackend {
            fn has_tool(&self, _name: &str) -> bool {
                true
            }
            fn execute(&self, _name: &str, _params: &Value) -> anyhow::Result<Value> {
                anyhow::bail!("backend failure")
            }
        }

        let kernel = GovernanceKernel::new(Profile::balanced()).unwrap();
        let state = Arc::new(GatewayState::with_backend(
            kernel,
            HashChainedAuditLogger::new(),
            Box::new(FailingBackend),
        ));
        let app = create_app(state);

        let (status, body) = post_tool(
            &app,
            "echo",
            json!({ "params": {"message": "test"}, "signals": {"reward": 0.5} }),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["blocked"], true);
        assert_eq!(body["halt_reason"], "execution_error");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_found() {
        let app = create_test_app(Profile::balanced());
        let (status, body) = post_tool(&app, "launch_missiles", json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("launch_missiles"));
    }

    #[tokio::test]
    async fn test_missing_body_defaults_to_zero_signals() {
        let app = create_test_app(Profile::balanced());
        let request = Request::builder()
            .method("POST")
            .uri("/tool/echo")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        // Zero signals on a fresh balanced kernel: allowed, not an error.
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app(Profile::balanced());
        let (status, body) = get_path(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("healthy"));
    }

    #[tokio::test]
    async fn test_metrics_endpoint_exposes_prometheus_text() {
        let app = create_test_app(Profile::balanced());
        post_tool(&app, "echo", json!({ "signals": {"reward": 0.5} })).await;

        let (status, body) = get_path(&app, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("agent_steps_total"));
        assert!(body.contains("halts_by_reason"));
        assert!(body.contains("governance_budget_effort"));
    }

    #[tokio::test]
    async fn test_status_reports_kernel_state() {
        let app = create_test_app(Profile::balanced());
        post_tool(&app, "echo", json!({ "signals": {"reward": 0.5} })).await;

        let (status, body) = get_path(&app, "/status").await;
        assert_eq!(status, StatusCode::OK);
        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["step"], 1);
        assert_eq!(parsed["halted"], false);
        assert_eq!(parsed["mode"], "nominal");
    }

    #[tokio::test]
    async fn test_audit_chain_on_disk_verifies_after_requests() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit_chain.jsonl");

        let kernel = GovernanceKernel::new(Profile::balanced()).unwrap();
        let audit = HashChainedAuditLogger::with_file(&path).unwrap();
        let state = Arc::new(GatewayState::new(kernel, audit));
        let app = create_app(state);

        for i in 0..5 {
            post_tool(
                &app,
                "test_action",
                json!({ "params": {"i": i}, "signals": {"reward": 0.3} }),
            )
            .await;
        }

        let report = warden_audit::verify_chain(&path).unwrap();
        assert_eq!(report.entries, 5);
    }
}
