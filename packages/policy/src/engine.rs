// ABOUTME: Policy engine evaluating tasks against the loaded rule set
// ABOUTME: Fails closed on unknown actions and validates rules at load time

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{PolicyError, Result};
use crate::types::{Decision, PolicySet, Task};

/// Allow/deny counters exposed for observability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyStats {
    pub allowed: u64,
    pub denied: u64,
}

/// Evaluates tasks against a rule set loaded once at startup.
///
/// The rule set is read-only after construction, so a single engine is safe
/// to share across concurrent evaluations without locking. The only interior
/// state is a pair of atomic counters.
#[derive(Debug)]
pub struct PolicyEngine {
    policies: PolicySet,
    allowed: AtomicU64,
    denied: AtomicU64,
}

impl PolicyEngine {
    /// Build an engine from an already-deserialized rule set, validating it
    pub fn new(policies: PolicySet) -> Result<Self> {
        Self::validate(&policies)?;
        info!(actions = policies.len(), "Policy set loaded");
        Ok(Self {
            policies,
            allowed: AtomicU64::new(0),
            denied: AtomicU64::new(0),
        })
    }

    /// Load and validate a JSON policy document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse and validate a JSON policy document
    pub fn from_json(document: &str) -> Result<Self> {
        let policies: PolicySet = serde_json::from_str(document)?;
        Self::new(policies)
    }

    /// Malformed entries fail here, at startup, rather than per-evaluation
    fn validate(policies: &PolicySet) -> Result<()> {
        for (action, rule) in policies.iter() {
            for param in rule.restricted_values.keys() {
                if !rule.restricted_parameters.iter().any(|p| p == param) {
                    return Err(PolicyError::InvalidRule {
                        action: action.clone(),
                        reason: format!(
                            "restricted_values references '{}' which is not a restricted parameter",
                            param
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Evaluate a task against the rule set.
    ///
    /// Unknown actions deny (never default-allow). A deny is an expected
    /// outcome carried in the `Decision`; only internal faults return `Err`.
    pub fn evaluate(&self, task: &Task) -> Result<Decision> {
        let Some(rule) = self.policies.get(&task.name) else {
            warn!(action = %task.name, requester = %task.requester, "Action not defined in policy set");
            return Ok(self.record(Decision::deny("unknown action")));
        };

        for (param, value) in &task.parameters {
            if !rule.restricted_parameters.iter().any(|p| p == param) {
                continue;
            }

            if let Some(disallowed) = rule.restricted_values.get(param) {
                if disallowed.contains(value) {
                    warn!(
                        action = %task.name,
                        parameter = %param,
                        "Restricted parameter value blocked"
                    );
                    return Ok(self.record(Decision::deny(format!(
                        "parameter '{}' value '{}' is restricted for action '{}'",
                        param,
                        render_value(value),
                        task.name
                    ))));
                }
            }
        }

        debug!(action = %task.name, requester = %task.requester, "Action allowed");
        Ok(self.record(Decision::allow()))
    }

    fn record(&self, decision: Decision) -> Decision {
        if decision.allowed {
            self.allowed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.denied.fetch_add(1, Ordering::Relaxed);
        }
        decision
    }

    pub fn stats(&self) -> PolicyStats {
        PolicyStats {
            allowed: self.allowed.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
        }
    }
}

/// Strings render bare in deny reasons; other values render as JSON
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
