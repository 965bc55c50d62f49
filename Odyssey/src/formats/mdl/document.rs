//! Decoded model structure definitions
//!
//! Nodes live in an arena owned by [`Model`]. Children are owned forward
//! through `children`; `parent` is a plain lookup index and never drives
//! ownership.

use glam::{Quat, Vec3};
use serde::Serialize;

use super::controller::Controllers;
use super::header::{Classification, Variant};

/// Node type bits from the 16-bit node header bitmask.
pub mod node_flags {
    pub const NODE_BASE: u16 = 0x0001;
    pub const NODE_LIGHT: u16 = 0x0002;
    pub const NODE_EMITTER: u16 = 0x0004;
    pub const NODE_REFERENCE: u16 = 0x0010;
    pub const NODE_MESH: u16 = 0x0020;
    pub const NODE_SKIN: u16 = 0x0040;
    pub const NODE_DANGLY: u16 = 0x0100;
    pub const NODE_AABB: u16 = 0x0200;
    pub const NODE_SABER: u16 = 0x0800;
}

/// Semantic node variant, chosen from the bitmask by priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum NodeType {
    #[default]
    Dummy,
    Light,
    Emitter,
    Reference,
    TriMesh,
    Skin,
    DanglyMesh,
    Aabb,
    LightSaber,
}

impl NodeType {
    /// Resolve the most specific variant present in `flags`.
    ///
    /// Meshes can carry skin/dangly/aabb/saber bits at the same time, so the
    /// order is `LightSaber > Aabb > DanglyMesh > Skin > TriMesh > Reference >
    /// Emitter > Light > Dummy`.
    #[must_use]
    pub fn from_flags(flags: u16) -> Self {
        use node_flags::{
            NODE_AABB, NODE_DANGLY, NODE_EMITTER, NODE_LIGHT, NODE_MESH, NODE_REFERENCE,
            NODE_SABER, NODE_SKIN,
        };

        const PRIORITY: [(u16, NodeType); 8] = [
            (NODE_SABER, NodeType::LightSaber),
            (NODE_AABB, NodeType::Aabb),
            (NODE_DANGLY, NodeType::DanglyMesh),
            (NODE_SKIN, NodeType::Skin),
            (NODE_MESH, NodeType::TriMesh),
            (NODE_REFERENCE, NodeType::Reference),
            (NODE_EMITTER, NodeType::Emitter),
            (NODE_LIGHT, NodeType::Light),
        ];

        PRIORITY
            .iter()
            .find(|(bit, _)| flags & bit != 0)
            .map_or(NodeType::Dummy, |&(_, node_type)| node_type)
    }

    /// Lowercase name as used by the ASCII model format.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dummy => "dummy",
            Self::Light => "light",
            Self::Emitter => "emitter",
            Self::Reference => "reference",
            Self::TriMesh => "trimesh",
            Self::Skin => "skin",
            Self::DanglyMesh => "danglymesh",
            Self::Aabb => "aabb",
            Self::LightSaber => "lightsaber",
        }
    }

    /// Whether the variant carries mesh geometry.
    #[must_use]
    pub fn is_mesh(&self) -> bool {
        matches!(
            self,
            Self::TriMesh | Self::Skin | Self::DanglyMesh | Self::Aabb | Self::LightSaber
        )
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of a node inside [`Model`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Triangles of a mesh as vertex-index triples, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FaceList {
    pub faces: Vec<[u16; 3]>,
}

impl FaceList {
    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, [u16; 3]> {
        self.faces.iter()
    }
}

/// Light properties. Colour, radius and multiplier come from controllers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightData {
    pub color: [f32; 3],
    pub radius: f32,
    pub multiplier: f32,
    pub flare_radius: f32,
    pub priority: u32,
    pub ambient_only: bool,
    pub dynamic_type: u32,
    pub affect_dynamic: bool,
    pub shadow: bool,
    pub flare: bool,
    pub fading_light: bool,
}

impl Default for LightData {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            radius: 1.0,
            multiplier: 1.0,
            flare_radius: 0.0,
            priority: 0,
            ambient_only: false,
            dynamic_type: 0,
            affect_dynamic: false,
            shadow: false,
            flare: false,
            fading_light: false,
        }
    }
}

/// TSL-only mesh fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DirtSettings {
    pub enabled: bool,
    pub texture: u16,
    pub coord_space: u16,
    pub hide_in_holograms: bool,
}

/// UV scrolling parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UvAnimation {
    pub enabled: bool,
    pub direction: [f32; 2],
    pub jitter: f32,
    pub jitter_speed: f32,
}

/// Geometry and render settings of a mesh node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshData {
    pub faces: FaceList,
    pub vertices: Vec<Vec3>,
    pub diffuse: [f32; 3],
    pub ambient: [f32; 3],
    pub transparency_hint: u32,
    pub bitmap: String,
    pub bitmap2: String,
    pub bitmap3: String,
    pub bitmap4: String,
    pub uv_animation: UvAnimation,
    pub num_textures: u16,
    pub has_lightmap: bool,
    pub rotate_texture: bool,
    pub background_geometry: bool,
    pub shadow: bool,
    pub beaming: bool,
    pub render: bool,
    pub dirt: Option<DirtSettings>,
    pub total_area: f32,
    pub index_count: Option<u32>,
    pub index_offset: Option<u32>,
    pub self_illum_color: [f32; 3],
    pub alpha: f32,
}

/// One decoded node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelNode {
    pub id: NodeId,
    pub name: String,
    pub node_type: NodeType,
    /// Raw type bitmask.
    pub flags: u16,
    pub supernode_number: u16,
    pub parent: Option<NodeId>,
    /// Children in export/render order.
    pub children: Vec<NodeId>,
    pub position: Vec3,
    pub orientation: Quat,
    pub controllers: Controllers,
    pub light: Option<LightData>,
    pub mesh: Option<MeshData>,
}

impl ModelNode {
    #[must_use]
    pub fn has_flag(&self, bit: u16) -> bool {
        self.flags & bit != 0
    }
}

/// Model-wide properties from the model header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelProperties {
    pub classification: Classification,
    pub subclassification: u8,
    pub affected_by_fog: bool,
    pub num_child_models: u32,
    pub animation_count: u32,
    pub bounding_box: [f32; 6],
    pub radius: f32,
    pub animation_scale: f32,
    /// Node count declared in the geometry header.
    pub declared_node_count: u32,
}

/// A fully decoded model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    pub name: String,
    pub supermodel_name: String,
    pub variant: Variant,
    pub properties: ModelProperties,
    nodes: Vec<ModelNode>,
    root: NodeId,
}

impl Model {
    pub(crate) fn new(
        name: String,
        supermodel_name: String,
        variant: Variant,
        properties: ModelProperties,
        nodes: Vec<ModelNode>,
        root: NodeId,
    ) -> Self {
        Self {
            name,
            supermodel_name,
            variant,
            properties,
            nodes,
            root,
        }
    }

    #[must_use]
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn root(&self) -> &ModelNode {
        &self.nodes[self.root.0]
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&ModelNode> {
        self.nodes.get(id.0)
    }

    /// All nodes in decode (depth-first, pre-order) order.
    #[must_use]
    pub fn nodes(&self) -> &[ModelNode] {
        &self.nodes
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Children of `id` in order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &ModelNode> {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&child| self.node(child))
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<&ModelNode> {
        self.node(id)?.parent.and_then(|p| self.node(p))
    }

    /// First node with the given name (case-insensitive, like the engine).
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ModelNode> {
        self.nodes.iter().find(|n| n.name.eq_ignore_ascii_case(name))
    }

    /// Distance from the root.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.node(parent).and_then(|n| n.parent);
        }
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::node_flags::{
        NODE_AABB, NODE_BASE, NODE_DANGLY, NODE_EMITTER, NODE_LIGHT, NODE_MESH, NODE_REFERENCE,
        NODE_SABER, NODE_SKIN,
    };
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_node_type_priority() {
        assert_eq!(NodeType::from_flags(NODE_BASE | NODE_MESH | NODE_SKIN), NodeType::Skin);
        assert_eq!(NodeType::from_flags(NODE_BASE | NODE_MESH), NodeType::TriMesh);
        assert_eq!(NodeType::from_flags(NODE_BASE), NodeType::Dummy);
        assert_eq!(NodeType::from_flags(0x8000), NodeType::Dummy);
        assert_eq!(
            NodeType::from_flags(NODE_MESH | NODE_SKIN | NODE_DANGLY | NODE_AABB | NODE_SABER),
            NodeType::LightSaber
        );
        assert_eq!(NodeType::from_flags(NODE_MESH | NODE_AABB), NodeType::Aabb);
        assert_eq!(NodeType::from_flags(NODE_MESH | NODE_DANGLY), NodeType::DanglyMesh);
        assert_eq!(NodeType::from_flags(NODE_REFERENCE | NODE_LIGHT), NodeType::Reference);
        assert_eq!(NodeType::from_flags(NODE_EMITTER | NODE_LIGHT), NodeType::Emitter);
        assert_eq!(NodeType::from_flags(NODE_BASE | NODE_LIGHT), NodeType::Light);
    }

    #[test]
    fn test_node_type_names() {
        assert_eq!(NodeType::DanglyMesh.to_string(), "danglymesh");
        assert!(NodeType::Skin.is_mesh());
        assert!(!NodeType::Light.is_mesh());
    }

    fn node(id: usize, name: &str, parent: Option<usize>, children: &[usize]) -> ModelNode {
        ModelNode {
            id: NodeId(id),
            name: name.to_string(),
            node_type: NodeType::Dummy,
            flags: NODE_BASE,
            supernode_number: id as u16,
            parent: parent.map(NodeId),
            children: children.iter().copied().map(NodeId).collect(),
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            controllers: Controllers::new(),
            light: None,
            mesh: None,
        }
    }

    #[test]
    fn test_model_navigation() {
        let properties = ModelProperties {
            classification: Classification::Other,
            subclassification: 0,
            affected_by_fog: true,
            num_child_models: 0,
            animation_count: 0,
            bounding_box: [0.0; 6],
            radius: 0.0,
            animation_scale: 1.0,
            declared_node_count: 3,
        };
        let nodes = vec![
            node(0, "root", None, &[2, 1]),
            node(1, "Arm", Some(0), &[]),
            node(2, "leg", Some(0), &[]),
        ];
        let model = Model::new(
            "m".into(),
            "NULL".into(),
            Variant::default(),
            properties,
            nodes,
            NodeId(0),
        );

        let names: Vec<_> = model.children(NodeId(0)).map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["leg", "Arm"]);
        assert_eq!(model.parent(NodeId(1)).unwrap().name, "root");
        assert!(model.parent(NodeId(0)).is_none());
        assert_eq!(model.find("arm").unwrap().id, NodeId(1));
        assert_eq!(model.depth(NodeId(2)), 1);
        assert_eq!(model.children(NodeId(9)).count(), 0);
    }
}
