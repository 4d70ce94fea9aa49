//! Names and defaults that are not part of the TOML schema

/// Directory name under the platform config/state dirs
pub const APP_DIR: &str = "taskwatch";

pub const CONFIG_FILE: &str = "config.toml";

/// Placeholder replaced by the (percent-encoded) task id in status paths
pub const TASK_ID_PLACEHOLDER: &str = "{task_id}";

/// Status route of the admin dashboard
pub const ADMIN_STATUS_PATH: &str = "/admin/tasks/{task_id}/status";

/// Status route of the public API
pub const PUBLIC_STATUS_PATH: &str = "/api/tasks/{task_id}";

pub const ENV_BASE_URL: &str = "TASKWATCH_BASE_URL";
pub const ENV_STATUS_PATH: &str = "TASKWATCH_STATUS_PATH";
pub const ENV_POLL_INTERVAL_MS: &str = "TASKWATCH_POLL_INTERVAL_MS";
pub const ENV_MAX_POLLS: &str = "TASKWATCH_MAX_POLLS";
pub const ENV_OUTPUT: &str = "TASKWATCH_OUTPUT";
pub const ENV_COLOR: &str = "TASKWATCH_COLOR";
