use slotmap::SlotMap;

use crate::scene::material::Material;
use crate::scene::object::{Object, ObjectId, ObjectKind};
use crate::scene::MaterialKey;

/// Scene graph
///
/// Pure data owned by the host. Objects live in an ordered list (outliner
/// order); materials live in a keyed pool with a separate ordered index so
/// both can be scanned by position.
///
/// Watchers never hold references into a `Scene` across runs. Positions may
/// shift and keys may go stale whenever the host mutates it.
#[derive(Debug, Default)]
pub struct Scene {
    pub objects: Vec<Object>,
    pub materials: SlotMap<MaterialKey, Material>,
    /// Materials in creation order.
    pub material_order: Vec<MaterialKey>,
    next_object_id: u64,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Objects
    // ========================================================================

    /// Appends an object, assigning it a fresh [`ObjectId`], and returns its
    /// current position.
    pub fn add_object(&mut self, mut object: Object) -> usize {
        self.next_object_id += 1;
        object.id = ObjectId(self.next_object_id);
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Removes the object at `index`, shifting later objects down.
    pub fn remove_object(&mut self, index: usize) -> Option<Object> {
        (index < self.objects.len()).then(|| self.objects.remove(index))
    }

    #[must_use]
    pub fn find_object(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// Number of armature objects in the scene.
    #[must_use]
    pub fn armature_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Armature)
            .count()
    }

    // ========================================================================
    // Materials
    // ========================================================================

    pub fn add_material(&mut self, material: Material) -> MaterialKey {
        let key = self.materials.insert(material);
        self.material_order.push(key);
        key
    }

    /// Removes a material. Slots still referring to it become dangling keys,
    /// which readers treat as empty.
    pub fn remove_material(&mut self, key: MaterialKey) -> Option<Material> {
        let material = self.materials.remove(key)?;
        self.material_order.retain(|&k| k != key);
        Some(material)
    }

    #[must_use]
    pub fn material(&self, key: MaterialKey) -> Option<&Material> {
        self.materials.get(key)
    }

    pub fn material_mut(&mut self, key: MaterialKey) -> Option<&mut Material> {
        self.materials.get_mut(key)
    }
}
