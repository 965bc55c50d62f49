//! MDL file inspection utilities
//!
//! Summarises a decoded model: header values, per-type node counts, geometry
//! totals and a flattened node listing in tree order.

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use super::document::{Model, NodeId};
use super::header::{Classification, Game, Platform};
use super::reader::read_mdl;
use crate::error::Result;

/// Summary of one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeInfo {
    pub name: String,
    pub node_type: String,
    pub depth: usize,
    pub parent: Option<String>,
    pub child_count: usize,
    pub controller_types: Vec<u32>,
    pub vertex_count: usize,
    pub face_count: usize,
    pub texture: Option<String>,
}

/// Summary of a whole model.
#[derive(Debug, Clone, Serialize)]
pub struct MdlInfo {
    pub file_path: String,
    pub name: String,
    pub supermodel: String,
    pub game: Game,
    pub platform: Platform,
    pub classification: Classification,
    pub node_count: usize,
    pub declared_node_count: u32,
    pub animation_count: u32,
    /// Node counts keyed by type name, in first-seen order.
    pub node_types: IndexMap<String, usize>,
    pub mesh_count: usize,
    pub light_count: usize,
    pub total_vertices: usize,
    pub total_faces: usize,
    pub nodes: Vec<NodeInfo>,
}

impl MdlInfo {
    /// Summarise an already decoded model.
    #[must_use]
    pub fn from_model(model: &Model, file_path: impl Into<String>) -> Self {
        let mut node_types: IndexMap<String, usize> = IndexMap::new();
        let mut nodes = Vec::with_capacity(model.node_count());
        let (mut mesh_count, mut light_count) = (0, 0);
        let (mut total_vertices, mut total_faces) = (0, 0);

        walk(model, model.root_id(), 0, &mut |id, depth| {
            let Some(node) = model.node(id) else {
                return;
            };
            *node_types.entry(node.node_type.to_string()).or_default() += 1;

            let (vertex_count, face_count, texture) = match &node.mesh {
                Some(mesh) => {
                    mesh_count += 1;
                    let texture = (!mesh.bitmap.is_empty() && !mesh.bitmap.eq_ignore_ascii_case("null"))
                        .then(|| mesh.bitmap.clone());
                    (mesh.vertices.len(), mesh.faces.len(), texture)
                }
                None => (0, 0, None),
            };
            total_vertices += vertex_count;
            total_faces += face_count;
            if node.light.is_some() {
                light_count += 1;
            }

            nodes.push(NodeInfo {
                name: node.name.clone(),
                node_type: node.node_type.to_string(),
                depth,
                parent: model.parent(id).map(|p| p.name.clone()),
                child_count: node.children.len(),
                controller_types: node.controllers.keys().copied().collect(),
                vertex_count,
                face_count,
                texture,
            });
        });

        Self {
            file_path: file_path.into(),
            name: model.name.clone(),
            supermodel: model.supermodel_name.clone(),
            game: model.variant.game,
            platform: model.variant.platform,
            classification: model.properties.classification,
            node_count: model.node_count(),
            declared_node_count: model.properties.declared_node_count,
            animation_count: model.properties.animation_count,
            node_types,
            mesh_count,
            light_count,
            total_vertices,
            total_faces,
            nodes,
        }
    }
}

/// Pre-order walk following child order.
fn walk(model: &Model, id: NodeId, depth: usize, visit: &mut impl FnMut(NodeId, usize)) {
    visit(id, depth);
    if let Some(node) = model.node(id) {
        for &child in &node.children {
            walk(model, child, depth + 1, visit);
        }
    }
}

/// Load an MDL file and summarise it.
///
/// # Errors
/// Returns an error if the model cannot be read or decoded.
pub fn inspect_mdl<P: AsRef<Path>>(path: P) -> Result<MdlInfo> {
    let path = path.as_ref();
    let model = read_mdl(path)?;
    Ok(MdlInfo::from_model(&model, path.display().to_string()))
}
