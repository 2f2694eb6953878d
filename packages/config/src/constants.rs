// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across the SDK

// Runtime environment
pub const SUDO_ENVIRONMENT: &str = "SUDO_ENVIRONMENT";
pub const SUDO_LOG_LEVEL: &str = "SUDO_LOG_LEVEL";

// Policy Configuration
pub const SUDO_POLICY_FILE: &str = "SUDO_POLICY_FILE";

// Container Configuration
pub const SUDO_CONTAINER_IMAGE: &str = "SUDO_CONTAINER_IMAGE";
pub const SUDO_CONTAINER_NETWORK: &str = "SUDO_CONTAINER_NETWORK";
pub const SUDO_TASK_TIMEOUT_SECS: &str = "SUDO_TASK_TIMEOUT_SECS";
pub const SUDO_MAX_CONCURRENT_ACQUIRES: &str = "SUDO_MAX_CONCURRENT_ACQUIRES";

// Ledger Configuration
pub const SUDO_LEDGER_URL: &str = "SUDO_LEDGER_URL";
pub const SUDO_LEDGER_TIMEOUT_SECS: &str = "SUDO_LEDGER_TIMEOUT_SECS";
