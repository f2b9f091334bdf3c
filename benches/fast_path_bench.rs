//! Fast-path benchmarks
//!
//! One no-change run per iteration for every registered watcher type, on the
//! watcher's own worst-case scene.
//!
//! ```sh
//! cargo bench --bench fast_path_bench
//! ```

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use scene_watcher::perf::FastPathFixture;
use scene_watcher::settings::WatcherSettings;
use scene_watcher::watchers::registered_watcher_types;

fn bench_fast_path(c: &mut Criterion) {
    let settings = WatcherSettings::default();
    let mut group = c.benchmark_group("fast_path");

    for &ty in registered_watcher_types() {
        let mut fixture = FastPathFixture::new(ty, &settings);
        group.bench_function(ty.name(), |b| {
            b.iter(|| black_box(fixture.run_once()));
        });
    }

    group.finish();
}

fn bench_scheduler_idle(c: &mut Criterion) {
    use scene_watcher::SceneWatcherScheduler;
    use scene_watcher::effects::SceneCollaborator;
    use scene_watcher::scene::Scene;
    use scene_watcher::watchers::WatcherContext;

    let mut scene = Scene::new();
    let mut effects = SceneCollaborator::new();
    let mut scheduler = SceneWatcherScheduler::new();
    scheduler.trigger_all();
    scheduler.flush(&mut WatcherContext::new(&mut scene, &mut effects));

    c.bench_function("scheduler_converged_process", |b| {
        b.iter(|| {
            let mut ctx = WatcherContext::new(&mut scene, &mut effects);
            black_box(scheduler.process(&mut ctx))
        });
    });
}

criterion_group!(benches, bench_fast_path, bench_scheduler_idle);
criterion_main!(benches);
