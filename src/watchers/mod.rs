//! Scene watchers
//!
//! A watcher is a resumable, bounded-time scan for one category of change in
//! the host [`Scene`]. Each [`SceneWatch::run`] call examines at most a fixed
//! number of items; when the budget runs out the cursor is kept in plain
//! fields and [`RunState::Preempt`] is returned, so the next call picks up
//! where this one stopped.
//!
//! # Contract
//!
//! - A run that finds a relevant change keeps scanning to the end of the pass,
//!   applies exactly one side effect for everything it found, and returns
//!   [`RunState::Finish`].
//! - A run that reaches the end without finding anything returns
//!   [`RunState::Finish`] with no side effect.
//! - The scene may be mutated between runs. A cursor that points past a
//!   shrunk collection restarts that nesting level, it is never an error.
//! - Watchers only store indices, keys and interned names across runs.
//!
//! The set of watchers is closed: [`SceneWatcherType`] is the registry and
//! [`SceneWatcher`] dispatches with a `match`, keeping the no-change path free
//! of virtual calls.

pub mod armature_count;
pub mod material_output;
pub mod outline;

pub use armature_count::ArmatureCountWatcher;
pub use material_output::MaterialOutputWatcher;
pub use outline::OutlineWatcher;

use std::fmt;

use crate::effects::SceneEffects;
use crate::errors::{Result, WatcherError};
use crate::scene::Scene;
use crate::settings::WatcherSettings;

/// Outcome of a single [`SceneWatch::run`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Budget exhausted mid-scan; call again with state intact.
    Preempt,
    /// The scan reached its end, with or without a detected change.
    Finish,
}

/// Everything a watcher may touch during a run: the host scene and the
/// collaborator that materializes side effects.
pub struct WatcherContext<'a> {
    pub scene: &'a mut Scene,
    pub effects: &'a mut dyn SceneEffects,
}

impl<'a> WatcherContext<'a> {
    pub fn new(scene: &'a mut Scene, effects: &'a mut dyn SceneEffects) -> Self {
        Self { scene, effects }
    }
}

/// Capability set shared by all watchers.
pub trait SceneWatch {
    /// Scans for changes within the watcher's step budget.
    fn run(&mut self, ctx: &mut WatcherContext<'_>) -> RunState;

    /// Populates a synthetic worst-case scene used to time the no-change path.
    fn create_fast_path_performance_test_objects(&self, ctx: &mut WatcherContext<'_>);

    /// Rewinds every cursor to the initial scan position.
    fn reset_run_progress(&mut self);
}

/// Consumes one step of a run budget. `None` means unlimited, which is what
/// a run switches to once it has found a change.
#[inline]
pub(crate) fn take_step(budget: &mut Option<usize>, steps: &mut usize) -> bool {
    match budget {
        Some(0) => false,
        Some(remaining) => {
            *remaining -= 1;
            *steps += 1;
            true
        }
        None => {
            *steps += 1;
            true
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// The closed registry of watcher variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneWatcherType {
    Outline,
    MaterialOutput,
    ArmatureCount,
}

impl SceneWatcherType {
    /// Every registered watcher type. The performance harness iterates this.
    pub const ALL: [Self; 3] = [Self::Outline, Self::MaterialOutput, Self::ArmatureCount];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Outline => "outline",
            Self::MaterialOutput => "material_output",
            Self::ArmatureCount => "armature_count",
        }
    }

    /// Resolves a watcher by name, failing loudly on unknown names.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.name() == name)
            .ok_or_else(|| WatcherError::UnregisteredWatcher(name.to_string()))
    }

    /// Instantiates the watcher for this type.
    #[must_use]
    pub fn create(self, settings: &WatcherSettings) -> SceneWatcher {
        match self {
            Self::Outline => SceneWatcher::Outline(OutlineWatcher::new(settings.outline_step_budget)),
            Self::MaterialOutput => SceneWatcher::MaterialOutput(MaterialOutputWatcher::new(
                settings.material_output_step_budget,
            )),
            Self::ArmatureCount => SceneWatcher::ArmatureCount(ArmatureCountWatcher::new(
                settings.armature_count_step_budget,
            )),
        }
    }
}

impl fmt::Display for SceneWatcherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the watcher types the scheduler may instantiate.
#[must_use]
pub fn registered_watcher_types() -> &'static [SceneWatcherType] {
    &SceneWatcherType::ALL
}

/// A concrete watcher instance.
#[derive(Debug)]
pub enum SceneWatcher {
    Outline(OutlineWatcher),
    MaterialOutput(MaterialOutputWatcher),
    ArmatureCount(ArmatureCountWatcher),
}

impl SceneWatcher {
    #[must_use]
    pub fn watcher_type(&self) -> SceneWatcherType {
        match self {
            Self::Outline(_) => SceneWatcherType::Outline,
            Self::MaterialOutput(_) => SceneWatcherType::MaterialOutput,
            Self::ArmatureCount(_) => SceneWatcherType::ArmatureCount,
        }
    }

    /// Items examined by the most recent run.
    #[must_use]
    pub fn last_step_count(&self) -> usize {
        match self {
            Self::Outline(w) => w.last_step_count(),
            Self::MaterialOutput(w) => w.last_step_count(),
            Self::ArmatureCount(w) => w.last_step_count(),
        }
    }
}

impl SceneWatch for SceneWatcher {
    #[inline]
    fn run(&mut self, ctx: &mut WatcherContext<'_>) -> RunState {
        match self {
            Self::Outline(w) => w.run(ctx),
            Self::MaterialOutput(w) => w.run(ctx),
            Self::ArmatureCount(w) => w.run(ctx),
        }
    }

    fn create_fast_path_performance_test_objects(&self, ctx: &mut WatcherContext<'_>) {
        match self {
            Self::Outline(w) => w.create_fast_path_performance_test_objects(ctx),
            Self::MaterialOutput(w) => w.create_fast_path_performance_test_objects(ctx),
            Self::ArmatureCount(w) => w.create_fast_path_performance_test_objects(ctx),
        }
    }

    fn reset_run_progress(&mut self) {
        match self {
            Self::Outline(w) => w.reset_run_progress(),
            Self::MaterialOutput(w) => w.reset_run_progress(),
            Self::ArmatureCount(w) => w.reset_run_progress(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_registry() {
        for ty in registered_watcher_types() {
            assert_eq!(SceneWatcherType::from_name(ty.name()).unwrap(), *ty);
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = SceneWatcherType::from_name("spring_bone").unwrap_err();
        assert!(matches!(err, WatcherError::UnregisteredWatcher(name) if name == "spring_bone"));
    }

    #[test]
    fn test_take_step() {
        let mut steps = 0;
        let mut budget = Some(2);
        assert!(take_step(&mut budget, &mut steps));
        assert!(take_step(&mut budget, &mut steps));
        assert!(!take_step(&mut budget, &mut steps));

        let mut unlimited = None;
        assert!(take_step(&mut unlimited, &mut steps));
        assert_eq!(steps, 3);
    }
}
