//! Synchronization settings loaded from the environment.

use serde::{Deserialize, Serialize};

use crate::use_cases::merge::MergePolicy;

/// Default form root segment that every managed collection lives under.
pub const DEFAULT_ROOT: &str = "data";

/// Settings for the synchronization core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Form root segment (`data` in `data.skills.Climbing.stat`).
    #[serde(default = "default_root")]
    pub root: String,
    /// How the merger treats blank and duplicate names.
    #[serde(default)]
    pub merge_policy: MergePolicy,
}

fn default_root() -> String {
    DEFAULT_ROOT.to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            merge_policy: MergePolicy::default(),
        }
    }
}

impl SyncConfig {
    /// Load from `SHEETSYNC_ROOT` and `SHEETSYNC_MERGE_POLICY`.
    ///
    /// Missing or unusable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let root = lookup("SHEETSYNC_ROOT")
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty() && !r.split('.').any(str::is_empty))
            .unwrap_or_else(default_root);

        let merge_policy = match lookup("SHEETSYNC_MERGE_POLICY") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Unknown merge policy, using lenient");
                MergePolicy::default()
            }),
            None => MergePolicy::default(),
        };

        Self { root, merge_policy }
    }
}
