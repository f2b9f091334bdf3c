use glam::Vec3;

use crate::utils::interner::{self, Symbol};

/// A single bone of an armature.
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: Symbol,
    pub head: Vec3,
    pub tail: Vec3,
    /// Length of the generated display shape. Regenerated by the armature
    /// collaborator; zero until then.
    pub shape_length: f32,
}

impl Bone {
    #[must_use]
    pub fn new(name: &str, head: Vec3, tail: Vec3) -> Self {
        Self {
            name: interner::intern(name),
            head,
            tail,
            shape_length: 0.0,
        }
    }

    #[inline]
    #[must_use]
    pub fn length(&self) -> f32 {
        self.head.distance(self.tail)
    }
}

/// Bone list of an armature object. Ordered, `bones[0]` is the root.
#[derive(Debug, Clone, Default)]
pub struct Armature {
    pub bones: Vec<Bone>,
}

impl Armature {
    #[must_use]
    pub fn new(bones: Vec<Bone>) -> Self {
        Self { bones }
    }

    /// Builds a straight chain of `count` bones of `length` along +Y.
    #[must_use]
    pub fn chain(prefix: &str, count: usize, length: f32) -> Self {
        let bones = (0..count)
            .map(|i| {
                let head = Vec3::Y * (i as f32 * length);
                Bone::new(&format!("{prefix}.{i:03}"), head, head + Vec3::Y * length)
            })
            .collect();
        Self { bones }
    }
}
