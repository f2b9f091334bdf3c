use crate::scene::{Armature, MaterialKey};
use crate::utils::interner::{self, Symbol};

/// Identity of an object within its scene, assigned by
/// [`Scene::add_object`](crate::scene::Scene::add_object). Unlike names it is
/// unique, and unlike positions it survives reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjectId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Mesh,
    Armature,
    Empty,
}

/// Geometry modifiers attached to an object.
#[derive(Debug, Clone, PartialEq)]
pub enum Modifier {
    /// Generated outline shell for one material slot.
    Outline {
        slot: usize,
        material: MaterialKey,
        width: f32,
    },
    /// Any modifier the watchers do not care about.
    Other(Symbol),
}

impl Modifier {
    #[inline]
    #[must_use]
    pub fn is_outline(&self) -> bool {
        matches!(self, Self::Outline { .. })
    }
}

/// A scene object.
///
/// Objects are kept in an ordered list by the [`Scene`](crate::scene::Scene)
/// and identified by [`ObjectId`] across watcher runs. Names need not be
/// unique.
#[derive(Debug, Clone)]
pub struct Object {
    pub(crate) id: ObjectId,
    pub name: Symbol,
    pub kind: ObjectKind,
    /// Material per slot. An empty slot is `None`.
    pub material_slots: Vec<Option<MaterialKey>>,
    pub modifiers: Vec<Modifier>,
    pub armature: Option<Armature>,
}

impl Object {
    #[must_use]
    pub fn mesh(name: &str) -> Self {
        Self {
            id: ObjectId::default(),
            name: interner::intern(name),
            kind: ObjectKind::Mesh,
            material_slots: Vec::new(),
            modifiers: Vec::new(),
            armature: None,
        }
    }

    #[must_use]
    pub fn armature(name: &str, armature: Armature) -> Self {
        Self {
            id: ObjectId::default(),
            name: interner::intern(name),
            kind: ObjectKind::Armature,
            material_slots: Vec::new(),
            modifiers: Vec::new(),
            armature: Some(armature),
        }
    }

    #[must_use]
    pub fn empty(name: &str) -> Self {
        Self {
            id: ObjectId::default(),
            name: interner::intern(name),
            kind: ObjectKind::Empty,
            material_slots: Vec::new(),
            modifiers: Vec::new(),
            armature: None,
        }
    }

    /// Appends a material slot (builder style).
    #[must_use]
    pub fn with_slot(mut self, material: Option<MaterialKey>) -> Self {
        self.material_slots.push(material);
        self
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn outline_modifiers(&self) -> impl Iterator<Item = &Modifier> {
        self.modifiers.iter().filter(|m| m.is_outline())
    }
}
