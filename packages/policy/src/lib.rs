// ABOUTME: Policy gate for the Sudo SDK
// ABOUTME: Evaluates requested tasks against a loaded rule set before any execution

pub mod engine;
pub mod error;
pub mod types;

pub use engine::{PolicyEngine, PolicyStats};
pub use error::PolicyError;
pub use types::{ActionRule, Decision, PolicySet, Task};
