//! Tool execution backends

use serde_json::{json, Value};

/// Executes allowed tool calls on behalf of the gateway.
///
/// The gateway owns the governance decision; the backend only runs what the
/// kernel allowed. Execution failures are reported upward and denied
/// fail-closed.
pub trait ToolBackend: Send + Sync {
    fn has_tool(&self, name: &str) -> bool;

    fn execute(&self, name: &str, params: &Value) -> anyhow::Result<Value>;
}

/// In-process backend that simulates tool execution.
///
/// In production the gateway would forward to real tool implementations;
/// this backend exists for demos and tests.
#[derive(Debug, Default)]
pub struct MockToolBackend;

impl MockToolBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ToolBackend for MockToolBackend {
    fn has_tool(&self, name: &str) -> bool {
        matches!(name, "echo" | "add" | "test_action")
    }

    fn execute(&self, name: &str, params: &Value) -> anyhow::Result<Value> {
        match name {
            "echo" => Ok(json!({
                "result": params.get("message").cloned().unwrap_or(Value::String(String::new())),
            })),
            "add" => {
                let a = params.get("a").and_then(Value::as_f64).unwrap_or(0.0);
                let b = params.get("b").and_then(Value::as_f64).unwrap_or(0.0);
                Ok(json!({ "result": a + b }))
            }
            "test_action" => Ok(json!({ "result": "executed", "params": params })),
            other => anyhow::bail!("unknown tool: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_returns_message() {
        let backend = MockToolBackend::new();
        let result = backend
            .execute("echo", &json!({"message": "hello"}))
            .unwrap();
        assert_eq!(result["result"], "hello");
    }

    #[test]
    fn test_add_sums_operands() {
        let backend = MockToolBackend::new();
        let result = backend.execute("add", &json!({"a": 2, "b": 3})).unwrap();
        assert_eq!(result["result"], 5.0);
    }

    #[test]
    fn test_unknown_tool_is_absent_and_fails() {
        let backend = MockToolBackend::new();
        assert!(!backend.has_tool("rm_rf"));
        assert!(backend.execute("rm_rf", &json!({})).is_err());
    }
}
