//! Library configuration types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Logging configuration: a default level plus per-module overrides.
///
/// Consumed by [`crate::logging::init_with_config`]; the `RUST_LOG`
/// environment variable always takes precedence.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default log level (`error`, `warn`, `info`, `debug`, `trace`).
    #[serde(default = "default_level")]
    pub default: String,

    /// Per-module level overrides, e.g. `watcher = "debug"`.
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_level(),
            modules: HashMap::new(),
        }
    }
}
