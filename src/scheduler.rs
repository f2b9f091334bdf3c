//! Scene watcher scheduler
//!
//! Owns one long-lived watcher per triggered type and steps them
//! cooperatively from the host's control thread.
//!
//! # Scheduling
//!
//! - [`SceneWatcherScheduler::trigger`] lazily creates a schedule for a type,
//!   or re-arms an existing one. Triggers coalesce.
//! - [`SceneWatcherScheduler::process`] performs at most one bounded watcher
//!   run, visiting schedules round-robin so a perpetually busy watcher cannot
//!   starve the others.
//! - [`SceneWatcherScheduler::flush`] drives every schedule to completion.
//!
//! ```rust,ignore
//! let mut scheduler = SceneWatcherScheduler::new();
//! scheduler.trigger(SceneWatcherType::Outline);
//!
//! // From a periodic host timer:
//! scheduler.process(&mut WatcherContext::new(&mut scene, &mut effects));
//!
//! // Before saving:
//! scheduler.flush(&mut WatcherContext::new(&mut scene, &mut effects));
//! ```

use rustc_hash::FxHashMap;

use crate::errors::Result;
use crate::settings::WatcherSettings;
use crate::watchers::{RunState, SceneWatch, SceneWatcher, SceneWatcherType, WatcherContext};

/// A watcher instance together with its completion flags.
#[derive(Debug)]
pub struct SceneWatcherSchedule {
    watcher: SceneWatcher,
    finished: bool,
    requires_run_once_more: bool,
    runs: u64,
}

impl SceneWatcherSchedule {
    fn new(watcher: SceneWatcher) -> Self {
        Self {
            watcher,
            finished: false,
            requires_run_once_more: false,
            runs: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn finished(&self) -> bool {
        self.finished
    }

    #[inline]
    #[must_use]
    pub fn requires_run_once_more(&self) -> bool {
        self.requires_run_once_more
    }

    /// Number of times the watcher has been run.
    #[inline]
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs
    }

    #[must_use]
    pub fn watcher(&self) -> &SceneWatcher {
        &self.watcher
    }
}

/// Round-robin scheduler over lazily created watcher schedules.
///
/// Schedules are never removed; there is at most one per
/// [`SceneWatcherType`].
#[derive(Debug)]
pub struct SceneWatcherScheduler {
    schedules: Vec<SceneWatcherSchedule>,
    type_to_schedule: FxHashMap<SceneWatcherType, usize>,
    cursor: usize,
    settings: WatcherSettings,
}

impl Default for SceneWatcherScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneWatcherScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(WatcherSettings::default())
    }

    #[must_use]
    pub fn with_settings(settings: WatcherSettings) -> Self {
        Self {
            schedules: Vec::with_capacity(SceneWatcherType::ALL.len()),
            type_to_schedule: FxHashMap::default(),
            cursor: 0,
            settings: settings.sanitized(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &WatcherSettings {
        &self.settings
    }

    /// Requests an eventual (re)scan of `ty`.
    ///
    /// A finished schedule is rewound to the start of its scan. A schedule
    /// that is mid-scan is flagged to run once more after it finishes, so a
    /// trigger arriving during a scan is never lost.
    pub fn trigger(&mut self, ty: SceneWatcherType) {
        if let Some(&index) = self.type_to_schedule.get(&ty) {
            let schedule = &mut self.schedules[index];
            if schedule.finished {
                schedule.finished = false;
                schedule.watcher.reset_run_progress();
            } else {
                schedule.requires_run_once_more = true;
            }
            return;
        }

        log::debug!("Creating scene watcher schedule for '{ty}'");
        self.type_to_schedule.insert(ty, self.schedules.len());
        self.schedules
            .push(SceneWatcherSchedule::new(ty.create(&self.settings)));
    }

    /// Triggers a watcher by its registry name.
    pub fn trigger_by_name(&mut self, name: &str) -> Result<()> {
        let ty = SceneWatcherType::from_name(name)?;
        self.trigger(ty);
        Ok(())
    }

    /// Triggers every registered watcher type.
    pub fn trigger_all(&mut self) {
        for ty in SceneWatcherType::ALL {
            self.trigger(ty);
        }
    }

    /// Runs at most one watcher step. Returns `false` when every schedule is
    /// finished (or none exists).
    pub fn process(&mut self, ctx: &mut WatcherContext<'_>) -> bool {
        let len = self.schedules.len();
        if len == 0 {
            return false;
        }

        for _ in 0..len {
            self.cursor = (self.cursor + 1) % len;
            let schedule = &mut self.schedules[self.cursor];
            if schedule.finished {
                continue;
            }

            schedule.runs += 1;
            match schedule.watcher.run(ctx) {
                RunState::Finish if schedule.requires_run_once_more => {
                    schedule.requires_run_once_more = false;
                    schedule.watcher.reset_run_progress();
                }
                RunState::Finish => {
                    schedule.finished = true;
                    log::trace!("Scene watcher '{}' finished", schedule.watcher.watcher_type());
                }
                RunState::Preempt => {}
            }
            return true;
        }
        false
    }

    /// Drives every schedule to completion.
    pub fn flush(&mut self, ctx: &mut WatcherContext<'_>) {
        let mut steps = 0usize;
        while self.process(ctx) {
            steps += 1;
        }
        if steps > 0 {
            log::debug!("Flushed scene watchers in {steps} step(s)");
        }
    }

    #[must_use]
    pub fn schedule(&self, ty: SceneWatcherType) -> Option<&SceneWatcherSchedule> {
        self.type_to_schedule
            .get(&ty)
            .map(|&index| &self.schedules[index])
    }

    #[must_use]
    pub fn schedules(&self) -> &[SceneWatcherSchedule] {
        &self.schedules
    }

    /// Returns `true` when no schedule has pending work.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.schedules.iter().all(|s| s.finished)
    }
}
