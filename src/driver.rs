//! Host integration
//!
//! [`SceneWatcherDriver`] wires a [`SceneWatcherScheduler`] into the host's
//! lifecycle: a periodic timer steps the scheduler, document loads trigger
//! every watcher, and the pre-save checkpoint flushes pending work.

use std::time::{Duration, Instant};

use crate::scheduler::SceneWatcherScheduler;
use crate::settings::WatcherSettings;
use crate::utils::interner;
use crate::utils::time::{TimerId, TimerRegistry};
use crate::watchers::WatcherContext;

/// Timer under which the scheduler step is registered.
pub const PROCESS_TIMER: TimerId = "scene_watcher_process";

#[derive(Debug, Default)]
pub struct SceneWatcherDriver {
    scheduler: SceneWatcherScheduler,
}

impl SceneWatcherDriver {
    #[must_use]
    pub fn new(settings: WatcherSettings) -> Self {
        Self {
            scheduler: SceneWatcherScheduler::with_settings(settings),
        }
    }

    #[must_use]
    pub fn scheduler(&self) -> &SceneWatcherScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut SceneWatcherScheduler {
        &mut self.scheduler
    }

    /// Registers the periodic processing timer. Calling it again is a no-op.
    pub fn setup(&self, timers: &mut TimerRegistry, now: Instant) {
        interner::preload_common_names();
        let interval = self.scheduler.settings().timer_interval();
        if timers.register(PROCESS_TIMER, interval, now) {
            log::debug!("Registered scene watcher timer every {interval:?}");
        }
    }

    /// Timer callback body: one scheduler step. Returns the delay until the
    /// next call.
    pub fn on_timer(&mut self, ctx: &mut WatcherContext<'_>) -> Option<Duration> {
        self.scheduler.process(ctx);
        Some(self.scheduler.settings().timer_interval())
    }

    /// Runs every due timer this driver owns. Returns `true` if the
    /// processing timer fired.
    pub fn poll(
        &mut self,
        timers: &mut TimerRegistry,
        now: Instant,
        ctx: &mut WatcherContext<'_>,
    ) -> bool {
        if !timers.poll_due(now).contains(&PROCESS_TIMER) {
            return false;
        }
        let next = self.on_timer(ctx);
        timers.reschedule(PROCESS_TIMER, next, now);
        true
    }

    /// A new document was loaded; every watcher must rescan it.
    pub fn on_load(&mut self) {
        self.scheduler.trigger_all();
    }

    /// Pre-persistence checkpoint: converge everything before the host saves.
    pub fn on_save(&mut self, ctx: &mut WatcherContext<'_>) {
        self.scheduler.flush(ctx);
    }
}
