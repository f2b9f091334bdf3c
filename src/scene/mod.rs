//! Scene graph module
//!
//! The host-owned graph the watchers scan:
//! - Scene: ordered objects plus a keyed material pool
//! - Object: a named object with material slots and modifiers
//! - Material: outline settings and a shader node tree
//! - Armature: bones of an armature object
//!
//! Unrelated code may mutate the scene freely between watcher runs.

pub mod armature;
pub mod material;
pub mod object;
pub mod scene;

pub use armature::{Armature, Bone};
pub use material::{
    Material, NodeLink, NodeTree, OutlineSettings, OutlineWidthMode, ShaderNode, ShaderNodeKind,
};
pub use object::{Modifier, Object, ObjectId, ObjectKind};
pub use scene::Scene;

use slotmap::new_key_type;

new_key_type! {
    pub struct MaterialKey;
    pub struct ShaderNodeKey;
}
