//! Cooperative, incremental scene-change detection.
//!
//! A host with an interactive loop owns a large, mutable [`Scene`]. This
//! crate watches it for a closed set of change categories without ever
//! blocking the loop: every [`SceneWatcherScheduler::process`] call performs
//! one bounded watcher run, and watchers keep their scan position in plain
//! fields between calls.
//!
//! ```rust,ignore
//! use scene_watcher::prelude::*;
//!
//! let mut driver = SceneWatcherDriver::new(WatcherSettings::default());
//! driver.setup(&mut timers, Instant::now());
//!
//! // A mutation site that knows outlines may have changed:
//! driver.scheduler_mut().trigger(SceneWatcherType::Outline);
//!
//! // Host event loop:
//! driver.poll(&mut timers, Instant::now(), &mut WatcherContext::new(&mut scene, &mut effects));
//!
//! // Before saving:
//! driver.on_save(&mut WatcherContext::new(&mut scene, &mut effects));
//! ```

pub mod driver;
pub mod effects;
pub mod errors;
pub mod perf;
pub mod scene;
pub mod scheduler;
pub mod settings;
pub mod utils;
pub mod watchers;

pub use driver::SceneWatcherDriver;
pub use effects::{SceneCollaborator, SceneEffects};
pub use errors::{Result, WatcherError};
pub use scene::Scene;
pub use scheduler::{SceneWatcherSchedule, SceneWatcherScheduler};
pub use settings::WatcherSettings;
pub use watchers::{
    RunState, SceneWatch, SceneWatcher, SceneWatcherType, WatcherContext,
    registered_watcher_types,
};

pub mod prelude {
    pub use crate::driver::SceneWatcherDriver;
    pub use crate::effects::{SceneCollaborator, SceneEffects};
    pub use crate::scene::{Armature, Material, Object, ObjectId, Scene};
    pub use crate::scheduler::SceneWatcherScheduler;
    pub use crate::settings::WatcherSettings;
    pub use crate::utils::TimerRegistry;
    pub use crate::watchers::{RunState, SceneWatch, SceneWatcherType, WatcherContext};
}
