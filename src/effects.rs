//! Side-effect collaborators
//!
//! Watchers only detect. Whatever they detect is materialized through
//! exactly one call into a [`SceneEffects`] implementation per converged
//! pass. The scheduler treats these calls as fire-and-forget: an error is
//! logged by the watcher and never retried or rolled back.

use crate::errors::{Result, WatcherError};
use crate::scene::{MaterialKey, Modifier, ObjectId, ObjectKind, Scene, ShaderNodeKind};
use crate::utils::interner;

/// Mutation entry points the watchers call when they detect a change.
pub trait SceneEffects {
    /// Rebuilds the outline modifiers of the given objects.
    fn regenerate_outlines(&mut self, scene: &mut Scene, objects: &[ObjectId]) -> Result<()>;

    /// Rewires materials whose output marker feeds the material output directly.
    fn rewire_material_outputs(&mut self, scene: &mut Scene, materials: &[MaterialKey])
    -> Result<()>;

    /// Regenerates bone display shapes after the number of armatures changed.
    fn sync_armatures(&mut self, scene: &mut Scene, armature_count: usize) -> Result<()>;
}

/// Number of times each entry point of a [`SceneCollaborator`] was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectStats {
    pub outline_regenerations: usize,
    pub output_rewires: usize,
    pub armature_syncs: usize,
}

/// Default collaborator that applies every side effect to the scene.
#[derive(Debug, Default)]
pub struct SceneCollaborator {
    pub stats: EffectStats,
}

impl SceneCollaborator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SceneEffects for SceneCollaborator {
    fn regenerate_outlines(&mut self, scene: &mut Scene, objects: &[ObjectId]) -> Result<()> {
        self.stats.outline_regenerations += 1;

        for &id in objects {
            let Some(index) = scene.find_object(id) else {
                // Deleted since it was scanned.
                continue;
            };

            let outlines: Vec<Modifier> = {
                let object = &scene.objects[index];
                if object.kind == ObjectKind::Mesh {
                    object
                        .material_slots
                        .iter()
                        .enumerate()
                        .filter_map(|(slot, key)| {
                            let key = (*key)?;
                            let material = scene.material(key)?;
                            material.outline.is_visible().then_some(Modifier::Outline {
                                slot,
                                material: key,
                                width: material.outline.width,
                            })
                        })
                        .collect()
                } else {
                    Vec::new()
                }
            };

            let object = &mut scene.objects[index];
            object.modifiers.retain(|m| !m.is_outline());
            log::debug!(
                "Regenerated {} outline modifier(s) on '{}'",
                outlines.len(),
                interner::resolve(object.name)
            );
            object.modifiers.extend(outlines);
        }
        Ok(())
    }

    fn rewire_material_outputs(
        &mut self,
        scene: &mut Scene,
        materials: &[MaterialKey],
    ) -> Result<()> {
        self.stats.output_rewires += 1;

        let marker = interner::intern(interner::MTOON_OUTPUT_GROUP);
        let shader_group = interner::intern(interner::MTOON_SHADER_GROUP);

        for &key in materials {
            let Some(material) = scene.material_mut(key) else {
                continue;
            };
            let tree = &mut material.node_tree;
            let stale: Vec<_> = tree.marker_links_to_sink(marker).collect();
            for link in stale {
                tree.unlink(link.from, link.to);
                let shader = tree.add_node(ShaderNodeKind::Group(shader_group));
                tree.link(link.from, shader);
                tree.link(shader, link.to);
            }
            log::debug!("Rewired output of material '{}'", interner::resolve(material.name));
        }
        Ok(())
    }

    fn sync_armatures(&mut self, scene: &mut Scene, armature_count: usize) -> Result<()> {
        self.stats.armature_syncs += 1;

        let mut missing = Vec::new();
        for object in scene
            .objects
            .iter_mut()
            .filter(|o| o.kind == ObjectKind::Armature)
        {
            match object.armature.as_mut() {
                Some(armature) => {
                    for bone in &mut armature.bones {
                        bone.shape_length = bone.length();
                    }
                }
                None => missing.push(interner::resolve(object.name)),
            }
        }
        log::debug!("Synchronized {armature_count} armature(s)");

        if missing.is_empty() {
            Ok(())
        } else {
            Err(WatcherError::SideEffectFailed {
                watcher: "armature_count",
                reason: format!("armature objects without bone data: {}", missing.join(", ")),
            })
        }
    }
}
