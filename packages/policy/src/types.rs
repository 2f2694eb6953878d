// ABOUTME: Core type definitions for the policy gate
// ABOUTME: Tasks submitted for execution, the loaded rule set, and per-evaluation decisions

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named unit of work submitted for policy-gated execution.
///
/// Immutable once submitted: the orchestrator takes ownership and no API
/// mutates a task after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Action name, matched against the policy set (e.g. "create_file")
    pub name: String,
    /// Action parameters (e.g. file path, command)
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
    /// Identity of the caller requesting the task
    pub requester: String,
}

impl Task {
    pub fn new(name: impl Into<String>, requester: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: HashMap::new(),
            requester: requester.into(),
        }
    }

    /// Builder-style parameter attachment, mainly for call sites and tests
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Restrictions applying to a single action.
///
/// Document format matches the policy JSON file:
/// `{"restricted_parameters": ["path"], "restricted_values": {"path": ["/etc/passwd"]}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionRule {
    /// Parameters subject to value restrictions
    #[serde(default)]
    pub restricted_parameters: Vec<String>,
    /// Disallowed values per restricted parameter
    #[serde(default)]
    pub restricted_values: HashMap<String, Vec<Value>>,
}

/// The full rule set: action name to its restrictions.
///
/// Loaded once per process and treated as read-only during evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicySet {
    actions: HashMap<String, ActionRule>,
}

impl PolicySet {
    pub fn get(&self, action: &str) -> Option<&ActionRule> {
        self.actions.get(action)
    }

    pub fn insert(&mut self, action: impl Into<String>, rule: ActionRule) {
        self.actions.insert(action.into(), rule);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ActionRule)> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Outcome of evaluating one task against the policy set.
///
/// A deny is an expected domain outcome, not an error; faults during
/// evaluation surface as `PolicyError` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    /// Populated on deny with the blocking rule
    pub reason: Option<String>,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_builder() {
        let task = Task::new("create_file", "agent-7").with_parameter("path", "/tmp/out.txt");
        assert_eq!(task.name, "create_file");
        assert_eq!(task.requester, "agent-7");
        assert_eq!(
            task.parameters.get("path"),
            Some(&Value::String("/tmp/out.txt".to_string()))
        );
    }

    #[test]
    fn test_policy_set_document_format() {
        let json = r#"{
            "create_file": {
                "restricted_parameters": ["path"],
                "restricted_values": {"path": ["/etc/passwd"]}
            }
        }"#;

        let set: PolicySet = serde_json::from_str(json).unwrap();
        assert_eq!(set.len(), 1);
        let rule = set.get("create_file").unwrap();
        assert_eq!(rule.restricted_parameters, vec!["path"]);
        assert_eq!(
            rule.restricted_values.get("path").unwrap(),
            &vec![Value::String("/etc/passwd".to_string())]
        );
    }

    #[test]
    fn test_policy_set_rejects_unknown_rule_fields() {
        let json = r#"{"create_file": {"restricted_params": ["path"]}}"#;
        assert!(serde_json::from_str::<PolicySet>(json).is_err());
    }

    #[test]
    fn test_decision_constructors() {
        assert!(Decision::allow().allowed);
        let deny = Decision::deny("unknown action");
        assert!(!deny.allowed);
        assert_eq!(deny.reason.as_deref(), Some("unknown action"));
    }
}
