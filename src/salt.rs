//! Salt state execution on the local minion

use crate::error::{HookError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::process::Command;
use tracing::debug;

/// Outcome of a single state target, as reported by `state.apply`.
///
/// Salt sets `result` to `true`, `false`, or `null` ("not run"); only an
/// explicit `true` counts as success. The remaining fields (comment,
/// changes, duration, ...) are carried along for logging only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetResult {
    #[serde(default)]
    pub result: Option<bool>,
    #[serde(flatten)]
    pub details: BTreeMap<String, Value>,
}

/// Mapping from state target id to its outcome.
pub type StateRunReturn = BTreeMap<String, TargetResult>;

/// Overall success requires every target's `result` to be true. An empty
/// mapping means nothing executed and counts as failure.
pub fn all_targets_succeeded(ret: &StateRunReturn) -> bool {
    !ret.is_empty() && ret.values().all(|t| t.result == Some(true))
}

/// Capability to apply a named state with pillar data on the local node.
///
/// The webhook handler only depends on this trait, so validation and
/// result aggregation are testable against a substitute implementation.
#[async_trait]
pub trait StateRunner: Send + Sync {
    async fn apply(&self, state: &str, pillar: &Value) -> Result<StateRunReturn>;
}

/// Runs states by invoking the `salt-call` binary on the host.
pub struct SaltCaller {
    program: String,
}

impl SaltCaller {
    pub fn new() -> Self {
        Self {
            program: "salt-call".to_string(),
        }
    }

    /// Uses a different binary, e.g. a wrapper script.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SaltCaller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateRunner for SaltCaller {
    async fn apply(&self, state: &str, pillar: &Value) -> Result<StateRunReturn> {
        let pillar_arg = format!("pillar={}", pillar);

        let output = Command::new(&self.program)
            .arg("state.apply")
            .arg(state)
            .arg(&pillar_arg)
            .arg("--out=json")
            .output()
            .await?;

        // salt-call exits non-zero when a state fails, but the JSON
        // payload is authoritative either way.
        debug!(
            "salt-call exited with {:?}:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout)
        );
        if !output.stderr.is_empty() {
            debug!(
                "salt-call stderr:\n{}",
                String::from_utf8_lossy(&output.stderr)
            );
        }

        parse_caller_output(&output.stdout)
    }
}

/// Parses `salt-call --out=json` output into a target mapping.
///
/// The local client wraps the mapping in a single `local` key; that
/// envelope is stripped when present. Output that is not JSON, or whose
/// shape is not a target mapping (Salt renders compile errors as a list
/// of strings), is an invocation error rather than a state failure.
pub fn parse_caller_output(stdout: &[u8]) -> Result<StateRunReturn> {
    let mut value: Value = serde_json::from_slice(stdout)
        .map_err(|e| HookError::SaltOutputInvalid(format!("not JSON: {}", e)))?;

    if let Value::Object(map) = &mut value {
        if map.len() == 1 {
            if let Some(local) = map.remove("local") {
                value = local;
            }
        }
    }

    serde_json::from_value(value)
        .map_err(|e| HookError::SaltOutputInvalid(format!("unexpected shape: {}", e)))
}
