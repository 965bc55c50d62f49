//! MDL/MDX reading and node tree decoding
//!
//! A load reads the `.mdl` headers and name table, then walks the node tree
//! depth-first from the root offset. Geometry comes from the `.mdx` file,
//! which is addressed through a second, independent cursor.

use std::collections::HashSet;
use std::path::Path;

use glam::Vec3;
use tracing::{debug, warn};

use super::controller::{self, Controllers, controller_type};
use super::document::{
    FaceList, LightData, MeshData, Model, ModelNode, ModelProperties, NodeId, NodeType, node_flags,
};
use super::header::{ArrayDefinition, FileHeader, GeometryHeader, MDL_OFFSET, ModelHeader, Variant};
use super::node::{LightHeader, MeshHeader, NodeHeader, read_face};
use super::options::LoadOptions;
use crate::error::{Error, Result};
use crate::utils::BinaryCursor;

/// Read an MDL model and its paired `.mdx` file from disk
///
/// The `.mdx` path is the `.mdl` path with its extension replaced.
///
/// # Errors
/// Returns [`Error::MissingVertexFile`] if the `.mdx` file does not exist, or
/// any decode error for malformed data.
pub fn read_mdl<P: AsRef<Path>>(path: P) -> Result<Model> {
    read_mdl_with_options(path, &LoadOptions::default())
}

/// Read an MDL model from disk with custom options
///
/// # Errors
/// Returns an error if either file cannot be read or has an invalid format.
pub fn read_mdl_with_options<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Model> {
    let path = path.as_ref();
    let mdx_path = path.with_extension("mdx");
    if !mdx_path.is_file() {
        return Err(Error::MissingVertexFile { path: mdx_path });
    }

    debug!("Reading {}", path.display());
    let mdl = std::fs::read(path)?;
    let mdx = std::fs::read(&mdx_path)?;
    parse_mdl_bytes_with_options(&mdl, &mdx, options)
}

/// Parse an MDL model from in-memory `.mdl` and `.mdx` bytes
///
/// # Errors
/// Returns an error if the data has an invalid format.
pub fn parse_mdl_bytes(mdl: &[u8], mdx: &[u8]) -> Result<Model> {
    parse_mdl_bytes_with_options(mdl, mdx, &LoadOptions::default())
}

/// Parse an MDL model from bytes with custom options
///
/// # Errors
/// Returns an error if the data has an invalid format.
pub fn parse_mdl_bytes_with_options(mdl: &[u8], mdx: &[u8], options: &LoadOptions) -> Result<Model> {
    let mut cursor = BinaryCursor::new(mdl);

    let file_header = FileHeader::read(&mut cursor)?;
    let geometry = GeometryHeader::read(&mut cursor)?;
    let model_header = ModelHeader::read(&mut cursor, &file_header)?;

    if mdx.len() != file_header.mdx_size as usize {
        warn!(
            "MDX buffer is {} bytes but the header declares {}",
            mdx.len(),
            file_header.mdx_size
        );
    }

    let names = read_names(&mut cursor, &model_header.names)?;

    let mut reader = MdlReader {
        mdl: cursor,
        mdx: BinaryCursor::new(mdx),
        variant: geometry.variant,
        names,
        options,
        // The declared count is unchecked, so it only bounds the hint.
        nodes: Vec::with_capacity((geometry.node_count as usize).min(mdl.len() / NodeHeader::SIZE)),
        visited: HashSet::new(),
    };
    let root = reader.read_node(geometry.root_node_offset, None, 0)?;
    let nodes = reader.nodes;

    if nodes.len() != geometry.node_count as usize {
        debug!(
            "Decoded {} nodes, geometry header declares {}",
            nodes.len(),
            geometry.node_count
        );
    }

    let properties = ModelProperties {
        classification: model_header.classification,
        subclassification: model_header.subclassification,
        affected_by_fog: model_header.affected_by_fog,
        num_child_models: model_header.num_child_models,
        animation_count: model_header.animations.count,
        bounding_box: model_header.bounding_box,
        radius: model_header.radius,
        animation_scale: model_header.animation_scale,
        declared_node_count: geometry.node_count,
    };

    Ok(Model::new(
        geometry.model_name,
        model_header.supermodel_name,
        geometry.variant,
        properties,
        nodes,
        root,
    ))
}

/// Read the name table: an array of offsets, each pointing at a C string.
pub fn read_names(cursor: &mut BinaryCursor, names: &ArrayDefinition) -> Result<Vec<String>> {
    cursor.seek(names.absolute());
    let offsets = (0..names.count)
        .map(|_| cursor.get_u32())
        .collect::<Result<Vec<_>>>()?;

    let mut result = Vec::with_capacity(offsets.len());
    for offset in offsets {
        cursor.seek(MDL_OFFSET + offset as usize);
        result.push(cursor.get_c_string()?);
    }

    debug!("Read {} node names", result.len());
    Ok(result)
}

/// Recursive node decoder. Owns both cursors and the node arena for one load.
struct MdlReader<'a> {
    mdl: BinaryCursor<'a>,
    mdx: BinaryCursor<'a>,
    variant: Variant,
    names: Vec<String>,
    options: &'a LoadOptions,
    nodes: Vec<ModelNode>,
    visited: HashSet<u32>,
}

impl MdlReader<'_> {
    fn read_node(&mut self, offset: u32, parent: Option<NodeId>, depth: usize) -> Result<NodeId> {
        if depth > self.options.max_depth {
            return Err(Error::MalformedInput(format!(
                "node nesting exceeds {} levels at offset {offset:#x}",
                self.options.max_depth
            )));
        }
        if !self.visited.insert(offset) {
            return Err(Error::MalformedInput(format!(
                "node at offset {offset:#x} is referenced more than once"
            )));
        }

        self.mdl.seek(MDL_OFFSET + offset as usize);
        let header = NodeHeader::read(&mut self.mdl)?;

        let name_index = header.name_index as usize;
        let name = self
            .names
            .get(name_index)
            .cloned()
            .ok_or(Error::NameIndexOutOfRange {
                index: name_index,
                len: self.names.len(),
            })?;
        let node_type = NodeType::from_flags(header.flags);
        debug!("Node {name:?} ({node_type}) at {offset:#x}, depth {depth}");

        let light_header = if header.flags & node_flags::NODE_LIGHT != 0 {
            Some(LightHeader::read(&mut self.mdl)?)
        } else {
            None
        };
        let mesh_header = if header.flags & node_flags::NODE_MESH != 0 {
            Some(MeshHeader::read(&mut self.mdl, self.variant)?)
        } else {
            None
        };

        let controllers = controller::read_controllers(
            &mut self.mdl,
            &header.controller_keys,
            &header.controller_data,
        )?;

        let light = light_header
            .map(|light| light_data(&light, &controllers))
            .transpose()?;
        let mesh = mesh_header
            .map(|mesh| self.read_mesh(mesh, &controllers))
            .transpose()?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(ModelNode {
            id,
            name,
            node_type,
            flags: header.flags,
            supernode_number: header.supernode_number,
            parent,
            children: Vec::new(),
            position: header.position,
            orientation: header.orientation,
            controllers,
            light,
            mesh,
        });

        self.mdl.seek(header.children.absolute());
        let child_offsets = (0..header.children.count)
            .map(|_| self.mdl.get_u32())
            .collect::<Result<Vec<_>>>()?;

        let mut children = Vec::with_capacity(child_offsets.len());
        for child_offset in child_offsets {
            children.push(self.read_node(child_offset, Some(id), depth + 1)?);
        }
        self.nodes[id.0].children = children;

        Ok(id)
    }

    fn read_mesh(&mut self, header: MeshHeader, controllers: &Controllers) -> Result<MeshData> {
        let mut faces = FaceList::default();
        let mut index_count = None;
        let mut index_offset = None;

        if !header.faces.is_empty() {
            self.mdl.seek(header.faces.absolute());
            faces.faces = (0..header.faces.count)
                .map(|_| read_face(&mut self.mdl))
                .collect::<Result<Vec<_>>>()?;

            if !header.index_counts.is_empty() {
                self.mdl.seek(header.index_counts.absolute());
                index_count = Some(self.mdl.get_u32()?);
            }
            if !header.index_offsets.is_empty() {
                self.mdl.seek(header.index_offsets.absolute());
                index_offset = Some(self.mdl.get_u32()?);
            }
        }

        let vertices = if self.options.read_vertices {
            (0..header.num_verts as usize)
                .map(|i| {
                    self.mdx.seek(header.vertex_position(i));
                    self.mdx.get_f32_array::<3>().map(Vec3::from_array)
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            Vec::new()
        };

        Ok(MeshData {
            faces,
            vertices,
            diffuse: header.diffuse,
            ambient: header.ambient,
            transparency_hint: header.transparency_hint,
            bitmap: header.bitmap,
            bitmap2: header.bitmap2,
            bitmap3: header.bitmap3,
            bitmap4: header.bitmap4,
            uv_animation: header.uv_animation,
            num_textures: header.num_textures,
            has_lightmap: header.has_lightmap,
            rotate_texture: header.rotate_texture,
            background_geometry: header.background_geometry,
            shadow: header.shadow,
            beaming: header.beaming,
            render: header.render,
            dirt: header.dirt,
            total_area: header.total_area,
            index_count,
            index_offset,
            self_illum_color: controller::color_or(
                controllers,
                controller_type::MESH_SELFILLUMCOLOR,
                [0.0; 3],
            )?,
            alpha: controller::scalar_or(controllers, controller_type::MESH_ALPHA, 1.0)?,
        })
    }
}

/// Combine a light block with the light's first-row controller values.
fn light_data(header: &LightHeader, controllers: &Controllers) -> Result<LightData> {
    let defaults = LightData::default();
    Ok(LightData {
        color: controller::color_or(controllers, controller_type::LIGHT_COLOR, defaults.color)?,
        radius: controller::scalar_or(controllers, controller_type::LIGHT_RADIUS, defaults.radius)?,
        multiplier: controller::scalar_or(
            controllers,
            controller_type::LIGHT_MULTIPLIER,
            defaults.multiplier,
        )?,
        flare_radius: header.flare_radius,
        priority: header.priority,
        ambient_only: header.ambient_only != 0,
        dynamic_type: header.dynamic_type,
        affect_dynamic: header.affect_dynamic != 0,
        shadow: header.shadow != 0,
        flare: header.flare != 0,
        fading_light: header.fading_light != 0,
    })
}
