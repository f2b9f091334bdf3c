//! Fast-path performance harness
//!
//! Times the common case: a watcher scanning a large scene in which nothing
//! has changed since its previous pass. Every registered watcher type is
//! covered through [`measure_all`].

use std::time::{Duration, Instant};

use crate::effects::SceneCollaborator;
use crate::scene::Scene;
use crate::settings::WatcherSettings;
use crate::watchers::{
    RunState, SceneWatch, SceneWatcher, SceneWatcherType, WatcherContext,
    registered_watcher_types,
};

/// Upper bound on runs spent converging before measuring.
const CONVERGE_LIMIT: usize = 1_000_000;

/// Timing of no-change runs for one watcher type.
#[derive(Debug, Clone)]
pub struct FastPathReport {
    pub watcher_type: SceneWatcherType,
    pub calls: usize,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    /// Largest number of items examined by a single measured run.
    pub max_steps: usize,
    /// Number of measured runs that preempted.
    pub preempted: usize,
}

impl FastPathReport {
    /// Returns `true` if the mean run stayed within `budget`.
    #[must_use]
    pub fn within(&self, budget: Duration) -> bool {
        self.mean <= budget
    }
}

/// A scene populated with a watcher's worst-case fast-path objects, with the
/// watcher already converged on it.
#[derive(Debug)]
pub struct FastPathFixture {
    pub scene: Scene,
    pub effects: SceneCollaborator,
    pub watcher: SceneWatcher,
}

impl FastPathFixture {
    #[must_use]
    pub fn new(ty: SceneWatcherType, settings: &WatcherSettings) -> Self {
        let mut scene = Scene::new();
        let mut effects = SceneCollaborator::new();
        let mut watcher = ty.create(&settings.clone().sanitized());

        {
            let mut ctx = WatcherContext::new(&mut scene, &mut effects);
            watcher.create_fast_path_performance_test_objects(&mut ctx);

            // Initial pass may apply side effects; the following one must not.
            for _ in 0..2 {
                watcher.reset_run_progress();
                for _ in 0..CONVERGE_LIMIT {
                    if watcher.run(&mut ctx) == RunState::Finish {
                        break;
                    }
                }
            }
            watcher.reset_run_progress();
        }

        Self {
            scene,
            effects,
            watcher,
        }
    }

    /// One no-change run.
    pub fn run_once(&mut self) -> RunState {
        let state = self
            .watcher
            .run(&mut WatcherContext::new(&mut self.scene, &mut self.effects));
        if state == RunState::Finish {
            self.watcher.reset_run_progress();
        }
        state
    }
}

/// Average of `calls` runs totalling `total`, for any `calls`.
#[allow(clippy::cast_precision_loss)]
fn mean_duration(total: Duration, calls: usize) -> Duration {
    if calls == 0 {
        return Duration::ZERO;
    }
    total.div_f64(calls as f64)
}

/// Times `calls` consecutive no-change runs of `ty`.
#[must_use]
pub fn measure_fast_path(
    ty: SceneWatcherType,
    settings: &WatcherSettings,
    calls: usize,
) -> FastPathReport {
    let mut fixture = FastPathFixture::new(ty, settings);
    let calls = calls.max(1);

    let mut min = Duration::MAX;
    let mut max = Duration::ZERO;
    let mut total = Duration::ZERO;
    let mut max_steps = 0;
    let mut preempted = 0;

    for _ in 0..calls {
        let start = Instant::now();
        let state = fixture.run_once();
        let elapsed = start.elapsed();

        min = min.min(elapsed);
        max = max.max(elapsed);
        total += elapsed;
        max_steps = max_steps.max(fixture.watcher.last_step_count());
        if state == RunState::Preempt {
            preempted += 1;
        }
    }

    let report = FastPathReport {
        watcher_type: ty,
        calls,
        min,
        max,
        mean: mean_duration(total, calls),
        max_steps,
        preempted,
    };
    if !report.within(settings.fast_path_budget()) {
        log::warn!(
            "Fast path of '{ty}' averaged {:?}, over the {:?} budget",
            report.mean,
            settings.fast_path_budget()
        );
    }
    report
}

/// Measures every registered watcher type.
#[must_use]
pub fn measure_all(settings: &WatcherSettings, calls: usize) -> Vec<FastPathReport> {
    registered_watcher_types()
        .iter()
        .map(|&ty| measure_fast_path(ty, settings, calls))
        .collect()
}
