//! Watcher Settings
//!
//! Tunables for the scheduler, its timer and the per-call step budgets of
//! the incremental watchers.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use scene_watcher::settings::WatcherSettings;
//!
//! // Defaults: 200 ms timer, budgets tuned for native code
//! let settings = WatcherSettings::default();
//!
//! // Tighter budget for slow hosts
//! let settings = WatcherSettings {
//!     outline_step_budget: 64,
//!     ..Default::default()
//! };
//!
//! // Or from a JSON document; missing fields fall back to defaults
//! let settings = WatcherSettings::from_json_str(r#"{ "timer_interval_ms": 100 }"#)?;
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Default number of items an [`OutlineWatcher`](crate::watchers::OutlineWatcher)
/// examines per run before preempting.
pub const DEFAULT_OUTLINE_STEP_BUDGET: usize = 256;

/// Default number of materials a
/// [`MaterialOutputWatcher`](crate::watchers::MaterialOutputWatcher) examines
/// per run before preempting. Each material costs a walk over its links.
pub const DEFAULT_MATERIAL_OUTPUT_STEP_BUDGET: usize = 64;

/// Default number of objects an
/// [`ArmatureCountWatcher`](crate::watchers::ArmatureCountWatcher) counts per run.
pub const DEFAULT_ARMATURE_COUNT_STEP_BUDGET: usize = 1024;

/// Runtime configuration of the watcher subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherSettings {
    /// Interval of the periodic host timer that calls `process()`.
    pub timer_interval_ms: u64,
    /// Items examined per run by the outline watcher.
    pub outline_step_budget: usize,
    /// Materials examined per run by the material output watcher.
    pub material_output_step_budget: usize,
    /// Objects counted per run by the armature count watcher.
    pub armature_count_step_budget: usize,
    /// Wall-clock target for a single no-change run, in microseconds.
    pub fast_path_budget_us: u64,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            timer_interval_ms: 200,
            outline_step_budget: DEFAULT_OUTLINE_STEP_BUDGET,
            material_output_step_budget: DEFAULT_MATERIAL_OUTPUT_STEP_BUDGET,
            armature_count_step_budget: DEFAULT_ARMATURE_COUNT_STEP_BUDGET,
            fast_path_budget_us: 100,
        }
    }
}

impl WatcherSettings {
    /// Parses settings from a JSON string. Unknown fields are ignored and
    /// missing fields take their default value.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    #[must_use]
    pub fn timer_interval(&self) -> Duration {
        Duration::from_millis(self.timer_interval_ms)
    }

    #[must_use]
    pub fn fast_path_budget(&self) -> Duration {
        Duration::from_micros(self.fast_path_budget_us)
    }

    /// Returns a copy with every step budget clamped to at least one, so a
    /// misconfigured zero budget still makes forward progress.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.outline_step_budget = self.outline_step_budget.max(1);
        self.material_output_step_budget = self.material_output_step_budget.max(1);
        self.armature_count_step_budget = self.armature_count_step_budget.max(1);
        self
    }
}
