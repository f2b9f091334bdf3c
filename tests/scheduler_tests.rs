//! Scheduler Integration Tests
//!
//! Tests for:
//! - Lazy schedule creation and the end-to-end trigger/process/flush flow
//! - Convergence and flush idempotence
//! - Triggers arriving mid-scan are not lost
//! - Round-robin fairness between busy watchers
//! - Side-effect failures are fire-and-forget

use scene_watcher::effects::{EffectStats, SceneCollaborator, SceneEffects};
use scene_watcher::errors::{Result, WatcherError};
use scene_watcher::scene::{Armature, Material, MaterialKey, Object, ObjectId, Scene};
use scene_watcher::settings::WatcherSettings;
use scene_watcher::watchers::{SceneWatcherType, WatcherContext};
use scene_watcher::SceneWatcherScheduler;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn small_budgets(budget: usize) -> WatcherSettings {
    WatcherSettings {
        outline_step_budget: budget,
        material_output_step_budget: budget,
        armature_count_step_budget: budget,
        ..Default::default()
    }
}

/// Mesh objects, each with one slot on its own outline-less material.
fn populated_scene(objects: usize) -> Scene {
    let mut scene = Scene::new();
    for i in 0..objects {
        let material = scene.add_material(Material::new(&format!("SchedMaterial{i}")));
        scene.add_object(Object::mesh(&format!("SchedObject{i}")).with_slot(Some(material)));
    }
    scene
}

/// Drives `process` until it reports no work, returning the number of steps.
fn drain(scheduler: &mut SceneWatcherScheduler, ctx: &mut WatcherContext<'_>) -> usize {
    let mut steps = 0;
    while scheduler.process(ctx) {
        steps += 1;
        assert!(steps < 1_000_000, "scheduler did not converge");
    }
    steps
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn end_to_end_lazy_watchers_fire_exactly_once() {
    init_logging();
    let mut scene = Scene::new();
    let skin = scene.add_material(Material::with_outline("E2E Skin", 0.02));
    scene.add_object(Object::mesh("E2E Body").with_slot(Some(skin)));
    let mut effects = SceneCollaborator::new();
    let mut scheduler = SceneWatcherScheduler::new();

    scheduler.trigger(SceneWatcherType::Outline);
    {
        let mut ctx = WatcherContext::new(&mut scene, &mut effects);
        drain(&mut scheduler, &mut ctx);
    }

    assert_eq!(effects.stats.outline_regenerations, 1);
    assert!(scheduler.schedule(SceneWatcherType::Outline).unwrap().finished());
    assert!(scheduler.schedule(SceneWatcherType::ArmatureCount).is_none());
    assert_eq!(scene.objects[0].outline_modifiers().count(), 1);

    scene.add_object(Object::armature("E2E Rig", Armature::chain("spine", 3, 0.2)));
    scheduler.trigger(SceneWatcherType::ArmatureCount);
    scheduler.flush(&mut WatcherContext::new(&mut scene, &mut effects));

    assert_eq!(effects.stats.armature_syncs, 1);
    assert_eq!(effects.stats.outline_regenerations, 1);
    assert!(scheduler.is_converged());
}

// ============================================================================
// Convergence
// ============================================================================

#[test]
fn interleaved_triggers_converge() {
    init_logging();
    let mut scene = populated_scene(500);
    let mut effects = SceneCollaborator::new();
    let mut scheduler = SceneWatcherScheduler::with_settings(small_budgets(16));
    let mut ctx = WatcherContext::new(&mut scene, &mut effects);

    for i in 0..200 {
        if i % 7 == 0 {
            scheduler.trigger(SceneWatcherType::ALL[i % SceneWatcherType::ALL.len()]);
        }
        scheduler.process(&mut ctx);
    }

    // Each watcher needs at most two passes (the current one and one more),
    // each bounded by items / budget, plus one finishing step.
    let items = 500 * 2;
    let bound = SceneWatcherType::ALL.len() * 2 * (items / 16 + 2);
    let steps = drain(&mut scheduler, &mut ctx);
    assert!(steps <= bound, "{steps} steps exceeds bound {bound}");
    assert!(scheduler.is_converged());
    assert!(scheduler.schedules().iter().all(|s| s.finished()));
}

#[test]
fn flush_twice_applies_no_second_side_effect() {
    init_logging();
    let mut scene = populated_scene(50);
    let key = scene.add_material(Material::with_unwired_output("Flush Unwired"));
    scene.objects[0].material_slots.push(Some(key));
    scene.add_object(Object::armature("Flush Rig", Armature::chain("arm", 2, 0.1)));
    scene.material_mut(scene.material_order[0]).unwrap().outline.enabled = true;
    scene.material_mut(scene.material_order[0]).unwrap().outline.width = 0.01;

    let mut effects = SceneCollaborator::new();
    let mut scheduler = SceneWatcherScheduler::new();
    scheduler.trigger_all();

    scheduler.flush(&mut WatcherContext::new(&mut scene, &mut effects));
    let after_first = effects.stats;
    assert_eq!(
        after_first,
        EffectStats {
            outline_regenerations: 1,
            output_rewires: 1,
            armature_syncs: 1,
        }
    );

    scheduler.flush(&mut WatcherContext::new(&mut scene, &mut effects));
    assert_eq!(effects.stats, after_first);

    // Re-armed without any mutation: a full rescan, still nothing to do.
    scheduler.trigger_all();
    scheduler.flush(&mut WatcherContext::new(&mut scene, &mut effects));
    assert_eq!(effects.stats, after_first);
}

#[test]
fn single_step_budgets_converge_on_multi_slot_scene() {
    init_logging();
    let mut scene = Scene::new();
    let skin = scene.add_material(Material::with_outline("Tight Skin", 0.01));
    let cloth = scene.add_material(Material::new("Tight Cloth"));
    scene.add_material(Material::with_unwired_output("Tight Unwired"));
    for i in 0..12 {
        let first = if i % 3 == 0 { skin } else { cloth };
        scene.add_object(
            Object::mesh(&format!("Tight Mesh{i}"))
                .with_slot(Some(first))
                .with_slot(Some(cloth))
                .with_slot(None),
        );
    }
    scene.add_object(Object::armature("Tight Rig", Armature::chain("arm", 2, 0.1)));

    let mut effects = SceneCollaborator::new();
    let mut scheduler = SceneWatcherScheduler::with_settings(small_budgets(1));
    let mut ctx = WatcherContext::new(&mut scene, &mut effects);

    // Outline: one visit plus three slots per mesh, one visit for the rig.
    let outline_items = 12 * 4 + 1;
    let items = outline_items + 3 + 13;
    let bound = 2 * (items + SceneWatcherType::ALL.len());

    scheduler.trigger_all();
    let steps = drain(&mut scheduler, &mut ctx);
    assert!(steps <= bound, "{steps} steps exceeds bound {bound}");
    assert!(scheduler.is_converged());

    // Unchanged rescan: every call makes exactly one step of progress.
    scheduler.trigger_all();
    let steps = drain(&mut scheduler, &mut ctx);
    assert!(steps <= bound, "{steps} steps exceeds bound {bound}");
    assert!(scheduler.is_converged());

    scheduler.trigger_all();
    scheduler.flush(&mut ctx);
    assert!(scheduler.is_converged());

    assert_eq!(
        effects.stats,
        EffectStats {
            outline_regenerations: 1,
            output_rewires: 1,
            armature_syncs: 1,
        }
    );
}

// ============================================================================
// No missed update
// ============================================================================

#[test]
fn trigger_during_scan_detects_change_behind_cursor() {
    init_logging();
    let mut scene = populated_scene(400);
    let mut effects = SceneCollaborator::new();
    let mut scheduler = SceneWatcherScheduler::with_settings(small_budgets(8));
    scheduler.trigger(SceneWatcherType::Outline);

    {
        let mut ctx = WatcherContext::new(&mut scene, &mut effects);
        for _ in 0..5 {
            assert!(scheduler.process(&mut ctx));
        }
    }
    let schedule = scheduler.schedule(SceneWatcherType::Outline).unwrap();
    assert!(!schedule.finished(), "scan should still be in flight");

    // Object 0 has already been scanned in this pass.
    let first = scene.objects[0].material_slots[0].unwrap();
    let material = scene.material_mut(first).unwrap();
    material.outline.enabled = true;
    material.outline.width = 0.03;
    scheduler.trigger(SceneWatcherType::Outline);
    assert!(
        scheduler
            .schedule(SceneWatcherType::Outline)
            .unwrap()
            .requires_run_once_more()
    );

    scheduler.flush(&mut WatcherContext::new(&mut scene, &mut effects));
    assert_eq!(effects.stats.outline_regenerations, 1);
    assert_eq!(scene.objects[0].outline_modifiers().count(), 1);
    assert!(scheduler.is_converged());
}

#[test]
fn outline_flip_after_finish_is_detected_on_retrigger() {
    init_logging();
    let mut scene = populated_scene(10);
    let mut effects = SceneCollaborator::new();
    let mut scheduler = SceneWatcherScheduler::new();

    scheduler.trigger(SceneWatcherType::Outline);
    scheduler.flush(&mut WatcherContext::new(&mut scene, &mut effects));
    assert_eq!(effects.stats.outline_regenerations, 0);

    let key = scene.material_order[3];
    let material = scene.material_mut(key).unwrap();
    material.outline.enabled = true;
    material.outline.width = 0.01;

    scheduler.trigger(SceneWatcherType::Outline);
    scheduler.flush(&mut WatcherContext::new(&mut scene, &mut effects));
    assert_eq!(effects.stats.outline_regenerations, 1);
    assert_eq!(scene.objects[3].outline_modifiers().count(), 1);

    scene.material_mut(key).unwrap().outline.enabled = false;
    scheduler.trigger(SceneWatcherType::Outline);
    scheduler.flush(&mut WatcherContext::new(&mut scene, &mut effects));
    assert_eq!(effects.stats.outline_regenerations, 2);
    assert_eq!(scene.objects[3].outline_modifiers().count(), 0);
}

// ============================================================================
// Fairness
// ============================================================================

#[test]
fn round_robin_gives_every_busy_watcher_a_turn() {
    init_logging();
    let mut scene = populated_scene(4000);
    let mut effects = SceneCollaborator::new();
    let mut scheduler = SceneWatcherScheduler::with_settings(small_budgets(8));
    scheduler.trigger_all();

    let calls = 300;
    {
        let mut ctx = WatcherContext::new(&mut scene, &mut effects);
        for _ in 0..calls {
            assert!(scheduler.process(&mut ctx));
        }
    }

    let per_type = calls / SceneWatcherType::ALL.len() as u64;
    for ty in SceneWatcherType::ALL {
        let schedule = scheduler.schedule(ty).unwrap();
        assert!(!schedule.finished(), "{ty} should still be busy");
        assert!(
            schedule.runs() >= per_type,
            "{ty} ran {} times, expected at least {per_type}",
            schedule.runs()
        );
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Default)]
struct FailingEffects {
    calls: usize,
}

impl SceneEffects for FailingEffects {
    fn regenerate_outlines(&mut self, _scene: &mut Scene, _objects: &[ObjectId]) -> Result<()> {
        self.calls += 1;
        Err(WatcherError::SideEffectFailed {
            watcher: "outline",
            reason: "rebuild rejected".to_string(),
        })
    }

    fn rewire_material_outputs(
        &mut self,
        _scene: &mut Scene,
        _materials: &[MaterialKey],
    ) -> Result<()> {
        self.calls += 1;
        Err(WatcherError::SideEffectFailed {
            watcher: "material_output",
            reason: "rewire rejected".to_string(),
        })
    }

    fn sync_armatures(&mut self, _scene: &mut Scene, _armature_count: usize) -> Result<()> {
        self.calls += 1;
        Err(WatcherError::SideEffectFailed {
            watcher: "armature_count",
            reason: "sync rejected".to_string(),
        })
    }
}

#[test]
fn failed_side_effects_are_not_retried() {
    init_logging();
    let mut scene = Scene::new();
    let skin = scene.add_material(Material::with_outline("Failing Skin", 0.01));
    scene.add_object(Object::mesh("Failing Body").with_slot(Some(skin)));
    scene.add_material(Material::with_unwired_output("Failing Output"));
    scene.add_object(Object::armature("Failing Rig", Armature::default()));

    let mut effects = FailingEffects::default();
    let mut scheduler = SceneWatcherScheduler::new();
    scheduler.trigger_all();
    scheduler.flush(&mut WatcherContext::new(&mut scene, &mut effects));

    assert_eq!(effects.calls, 3);
    assert!(scheduler.is_converged());

    scheduler.flush(&mut WatcherContext::new(&mut scene, &mut effects));
    assert_eq!(effects.calls, 3);
}

#[test]
fn trigger_by_unknown_name_fails_loudly() {
    let mut scheduler = SceneWatcherScheduler::new();
    let err = scheduler.trigger_by_name("mtoon_auto_setup").unwrap_err();
    assert!(matches!(err, WatcherError::UnregisteredWatcher(_)));
    assert!(scheduler.schedules().is_empty());

    scheduler.trigger_by_name("outline").unwrap();
    assert!(scheduler.schedule(SceneWatcherType::Outline).is_some());
}
