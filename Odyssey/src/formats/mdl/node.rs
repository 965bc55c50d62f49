//! Fixed-layout node records
//!
//! Every node starts with an 80-byte header. The type bitmask then decides
//! which sub-blocks follow it, in bit order:
//! ```text
//! header(80) [light(92)] [mesh(332 K1/PC, +8 TSL, -4 Xbox)]
//! ```
//! Emitter, reference, skin, dangly, AABB and saber blocks are not decoded;
//! they sit after the mesh block and are never read.

use glam::{Quat, Vec3};

use super::document::{DirtSettings, UvAnimation};
use super::header::{ArrayDefinition, Variant};
use crate::error::Result;
use crate::utils::BinaryCursor;

// ============================================================================
// Node Header
// ============================================================================

/// Common header shared by every node type.
#[derive(Debug, Clone)]
pub struct NodeHeader {
    pub flags: u16,
    pub supernode_number: u16,
    pub name_index: u16,
    pub root_offset: u32,
    pub parent_offset: u32,
    pub position: Vec3,
    pub orientation: Quat,
    pub children: ArrayDefinition,
    pub controller_keys: ArrayDefinition,
    pub controller_data: ArrayDefinition,
}

impl NodeHeader {
    pub const SIZE: usize = 80;

    pub fn read(cursor: &mut BinaryCursor) -> Result<Self> {
        let flags = cursor.get_u16()?;
        let supernode_number = cursor.get_u16()?;
        let name_index = cursor.get_u16()?;
        cursor.skip(2); // padding
        let root_offset = cursor.get_u32()?;
        let parent_offset = cursor.get_u32()?;

        let position = Vec3::from_array(cursor.get_f32_array::<3>()?);
        // Stored as w, x, y, z
        let [w, x, y, z] = cursor.get_f32_array::<4>()?;
        let orientation = Quat::from_xyzw(x, y, z, w);

        let children = ArrayDefinition::read(cursor)?;
        let controller_keys = ArrayDefinition::read(cursor)?;
        let controller_data = ArrayDefinition::read(cursor)?;

        Ok(Self {
            flags,
            supernode_number,
            name_index,
            root_offset,
            parent_offset,
            position,
            orientation,
            children,
            controller_keys,
            controller_data,
        })
    }
}

// ============================================================================
// Light Block
// ============================================================================

/// Light sub-block. Colour, radius and multiplier are animated and live in
/// the node's controllers instead.
#[derive(Debug, Clone)]
pub struct LightHeader {
    pub flare_radius: f32,
    pub unknown: ArrayDefinition,
    pub flare_sizes: ArrayDefinition,
    pub flare_positions: ArrayDefinition,
    pub flare_color_shifts: ArrayDefinition,
    pub flare_textures: ArrayDefinition,
    pub priority: u32,
    pub ambient_only: u32,
    pub dynamic_type: u32,
    pub affect_dynamic: u32,
    pub shadow: u32,
    pub flare: u32,
    pub fading_light: u32,
}

impl LightHeader {
    pub const SIZE: usize = 92;

    pub fn read(cursor: &mut BinaryCursor) -> Result<Self> {
        Ok(Self {
            flare_radius: cursor.get_f32()?,
            unknown: ArrayDefinition::read(cursor)?,
            flare_sizes: ArrayDefinition::read(cursor)?,
            flare_positions: ArrayDefinition::read(cursor)?,
            flare_color_shifts: ArrayDefinition::read(cursor)?,
            flare_textures: ArrayDefinition::read(cursor)?,
            priority: cursor.get_u32()?,
            ambient_only: cursor.get_u32()?,
            dynamic_type: cursor.get_u32()?,
            affect_dynamic: cursor.get_u32()?,
            shadow: cursor.get_u32()?,
            flare: cursor.get_u32()?,
            fading_light: cursor.get_u32()?,
        })
    }
}

// ============================================================================
// Mesh Block
// ============================================================================

/// Per-vertex attribute layout of a mesh's `.mdx` records.
///
/// Offsets are byte offsets inside one record of `stride` bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MdxLayout {
    pub stride: u32,
    pub bitmap: u32,
    pub vertices: u32,
    pub normals: u32,
    pub colors: u32,
    pub uv: [u32; 4],
    pub tangent_space: [u32; 4],
}

/// Trimesh sub-block.
#[derive(Debug, Clone)]
pub struct MeshHeader {
    pub fn_ptr1: u32,
    pub fn_ptr2: u32,
    pub faces: ArrayDefinition,
    pub bounding_box: [f32; 6],
    pub radius: f32,
    pub average: [f32; 3],
    pub diffuse: [f32; 3],
    pub ambient: [f32; 3],
    pub transparency_hint: u32,
    pub bitmap: String,
    pub bitmap2: String,
    pub bitmap3: String,
    pub bitmap4: String,
    pub index_counts: ArrayDefinition,
    pub index_offsets: ArrayDefinition,
    pub inverted_counters: ArrayDefinition,
    pub uv_animation: UvAnimation,
    pub mdx: MdxLayout,
    pub num_verts: u16,
    pub num_textures: u16,
    pub has_lightmap: bool,
    pub rotate_texture: bool,
    pub background_geometry: bool,
    pub shadow: bool,
    pub beaming: bool,
    pub render: bool,
    /// Present only in TSL files.
    pub dirt: Option<DirtSettings>,
    pub total_area: f32,
    /// Start of this mesh's records in the `.mdx` file.
    pub mdx_block_offset: u32,
    /// Absent in Xbox files.
    pub vertex_array_offset: Option<u32>,
}

impl MeshHeader {
    /// Encoded size for the given dialect.
    #[must_use]
    pub fn size(variant: Variant) -> usize {
        let mut size = 332;
        if variant.is_tsl() {
            size += 8;
        }
        if variant.is_xbox() {
            size -= 4;
        }
        size
    }

    pub fn read(cursor: &mut BinaryCursor, variant: Variant) -> Result<Self> {
        let fn_ptr1 = cursor.get_u32()?;
        let fn_ptr2 = cursor.get_u32()?;
        let faces = ArrayDefinition::read(cursor)?;
        let bounding_box = cursor.get_f32_array::<6>()?;
        let radius = cursor.get_f32()?;
        let average = cursor.get_f32_array::<3>()?;
        let diffuse = cursor.get_f32_array::<3>()?;
        let ambient = cursor.get_f32_array::<3>()?;
        let transparency_hint = cursor.get_u32()?;

        let bitmap = cursor.get_fixed_string(32)?;
        let bitmap2 = cursor.get_fixed_string(32)?;
        let bitmap3 = cursor.get_fixed_string(12)?;
        let bitmap4 = cursor.get_fixed_string(12)?;

        let index_counts = ArrayDefinition::read(cursor)?;
        let index_offsets = ArrayDefinition::read(cursor)?;
        let inverted_counters = ArrayDefinition::read(cursor)?;
        cursor.skip(12); // unknown
        cursor.skip(8); // saber unknown

        let uv_animation = UvAnimation {
            enabled: cursor.get_u32()? != 0,
            direction: cursor.get_f32_array::<2>()?,
            jitter: cursor.get_f32()?,
            jitter_speed: cursor.get_f32()?,
        };

        let mdx = MdxLayout {
            stride: cursor.get_u32()?,
            bitmap: cursor.get_u32()?,
            vertices: cursor.get_u32()?,
            normals: cursor.get_u32()?,
            colors: cursor.get_u32()?,
            uv: [
                cursor.get_u32()?,
                cursor.get_u32()?,
                cursor.get_u32()?,
                cursor.get_u32()?,
            ],
            tangent_space: [
                cursor.get_u32()?,
                cursor.get_u32()?,
                cursor.get_u32()?,
                cursor.get_u32()?,
            ],
        };

        let num_verts = cursor.get_u16()?;
        let num_textures = cursor.get_u16()?;
        let has_lightmap = cursor.get_u8()? != 0;
        let rotate_texture = cursor.get_u8()? != 0;
        let background_geometry = cursor.get_u8()? != 0;
        let shadow = cursor.get_u8()? != 0;
        let beaming = cursor.get_u8()? != 0;
        let render = cursor.get_u8()? != 0;

        let dirt = if variant.is_tsl() {
            let enabled = cursor.get_u8()? != 0;
            cursor.skip(1); // padding
            let texture = cursor.get_u16()?;
            let coord_space = cursor.get_u16()?;
            let hide_in_holograms = cursor.get_u8()? != 0;
            cursor.skip(1); // padding
            Some(DirtSettings {
                enabled,
                texture,
                coord_space,
                hide_in_holograms,
            })
        } else {
            None
        };

        cursor.skip(2); // padding
        let total_area = cursor.get_f32()?;
        cursor.skip(4); // padding
        let mdx_block_offset = cursor.get_u32()?;
        let vertex_array_offset = if variant.is_xbox() {
            None
        } else {
            Some(cursor.get_u32()?)
        };

        Ok(Self {
            fn_ptr1,
            fn_ptr2,
            faces,
            bounding_box,
            radius,
            average,
            diffuse,
            ambient,
            transparency_hint,
            bitmap,
            bitmap2,
            bitmap3,
            bitmap4,
            index_counts,
            index_offsets,
            inverted_counters,
            uv_animation,
            mdx,
            num_verts,
            num_textures,
            has_lightmap,
            rotate_texture,
            background_geometry,
            shadow,
            beaming,
            render,
            dirt,
            total_area,
            mdx_block_offset,
            vertex_array_offset,
        })
    }

    /// Absolute `.mdx` position of vertex `index`'s position attribute.
    #[must_use]
    pub fn vertex_position(&self, index: usize) -> usize {
        self.mdx_block_offset as usize + index * self.mdx.stride as usize + self.mdx.vertices as usize
    }
}

/// Size of one face record in the face array.
pub const FACE_SIZE: usize = 32;

/// Read a face record and keep its vertex index triple.
pub fn read_face(cursor: &mut BinaryCursor) -> Result<[u16; 3]> {
    cursor.skip(12); // plane normal
    cursor.skip(4); // plane distance
    cursor.skip(4); // material id
    cursor.skip(6); // adjacent faces
    Ok([cursor.get_u16()?, cursor.get_u16()?, cursor.get_u16()?])
}
