use slotmap::SlotMap;

use crate::scene::ShaderNodeKey;
use crate::utils::interner::{self, Symbol};

/// How the outline width of an MToon material is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutlineWidthMode {
    #[default]
    None,
    WorldCoordinates,
    ScreenCoordinates,
}

/// Outline parameters of a material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineSettings {
    pub enabled: bool,
    pub width_mode: OutlineWidthMode,
    pub width: f32,
}

impl Default for OutlineSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            width_mode: OutlineWidthMode::WorldCoordinates,
            width: 0.0,
        }
    }
}

impl OutlineSettings {
    /// Returns `true` when objects using this material need outline geometry.
    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.enabled && self.width_mode != OutlineWidthMode::None && self.width > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderNodeKind {
    /// The designated sink of a node tree.
    MaterialOutput,
    /// A node group instance, identified by its group name.
    Group(Symbol),
    Principled,
}

#[derive(Debug, Clone)]
pub struct ShaderNode {
    pub kind: ShaderNodeKind,
}

impl ShaderNode {
    #[inline]
    #[must_use]
    pub fn is_group(&self, name: Symbol) -> bool {
        self.kind == ShaderNodeKind::Group(name)
    }
}

/// A directed connection from one node's output to another node's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLink {
    pub from: ShaderNodeKey,
    pub to: ShaderNodeKey,
}

/// Shader node graph of a material.
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    pub nodes: SlotMap<ShaderNodeKey, ShaderNode>,
    pub links: Vec<NodeLink>,
}

impl NodeTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, kind: ShaderNodeKind) -> ShaderNodeKey {
        self.nodes.insert(ShaderNode { kind })
    }

    pub fn link(&mut self, from: ShaderNodeKey, to: ShaderNodeKey) {
        if self.nodes.contains_key(from) && self.nodes.contains_key(to) {
            self.links.push(NodeLink { from, to });
        } else {
            log::warn!("Ignoring link between missing shader nodes");
        }
    }

    pub fn unlink(&mut self, from: ShaderNodeKey, to: ShaderNodeKey) {
        self.links.retain(|l| !(l.from == from && l.to == to));
    }

    /// Removes a node together with every link touching it.
    pub fn remove_node(&mut self, key: ShaderNodeKey) {
        if self.nodes.remove(key).is_some() {
            self.links.retain(|l| l.from != key && l.to != key);
        }
    }

    /// Returns the first material output node, if any.
    #[must_use]
    pub fn output_node(&self) -> Option<ShaderNodeKey> {
        self.nodes
            .iter()
            .find(|(_, n)| n.kind == ShaderNodeKind::MaterialOutput)
            .map(|(k, _)| k)
    }

    /// Finds links that feed a `marker` group directly into a material output.
    pub fn marker_links_to_sink(&self, marker: Symbol) -> impl Iterator<Item = NodeLink> + '_ {
        self.links.iter().copied().filter(move |l| {
            let from = self.nodes.get(l.from);
            let to = self.nodes.get(l.to);
            matches!(
                (from, to),
                (Some(f), Some(t)) if f.is_group(marker) && t.kind == ShaderNodeKind::MaterialOutput
            )
        })
    }

    /// Returns `true` if a `marker` group is wired straight into the sink.
    #[must_use]
    pub fn has_marker_linked_to_sink(&self, marker: Symbol) -> bool {
        self.marker_links_to_sink(marker).next().is_some()
    }
}

/// A material: outline parameters plus its node tree.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: Symbol,
    pub outline: OutlineSettings,
    pub node_tree: NodeTree,
}

impl Material {
    /// Creates a material whose tree is a principled node feeding the output.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let mut node_tree = NodeTree::new();
        let shader = node_tree.add_node(ShaderNodeKind::Principled);
        let output = node_tree.add_node(ShaderNodeKind::MaterialOutput);
        node_tree.link(shader, output);
        Self {
            name: interner::intern(name),
            outline: OutlineSettings::default(),
            node_tree,
        }
    }

    /// Creates a material with an enabled world-space outline of `width`.
    #[must_use]
    pub fn with_outline(name: &str, width: f32) -> Self {
        let mut material = Self::new(name);
        material.outline = OutlineSettings {
            enabled: true,
            width_mode: OutlineWidthMode::WorldCoordinates,
            width,
        };
        material
    }

    /// Creates a material whose output marker group is wired straight into
    /// the material output, as left behind by importers.
    #[must_use]
    pub fn with_unwired_output(name: &str) -> Self {
        let mut node_tree = NodeTree::new();
        let marker = node_tree.add_node(ShaderNodeKind::Group(interner::intern(
            interner::MTOON_OUTPUT_GROUP,
        )));
        let output = node_tree.add_node(ShaderNodeKind::MaterialOutput);
        node_tree.link(marker, output);
        Self {
            name: interner::intern(name),
            outline: OutlineSettings::default(),
            node_tree,
        }
    }
}
