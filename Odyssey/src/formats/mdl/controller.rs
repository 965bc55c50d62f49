//! Controller (animated property) track decoding
//!
//! A node's controllers are described by a table of 16-byte keys:
//! ```text
//! type(4) unknown(2) num_rows(2) timekeys_start(2) values_start(2) num_columns(1) pad(3)
//! ```
//! `timekeys_start` and `values_start` are float indices into the node's
//! controller data array. The low nibble of `num_columns` is the column count;
//! bit `0x10` marks Bezier storage, where every value is followed by two
//! control-point floats.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::trace;

use super::header::ArrayDefinition;
use crate::error::{Error, Result};
use crate::utils::BinaryCursor;

/// Known controller type ids. Meaning depends on the node kind.
pub mod controller_type {
    pub const POSITION: u32 = 8;
    pub const ORIENTATION: u32 = 20;
    pub const SCALE: u32 = 36;

    pub const MESH_SELFILLUMCOLOR: u32 = 100;
    pub const MESH_ALPHA: u32 = 132;

    pub const LIGHT_COLOR: u32 = 76;
    pub const LIGHT_RADIUS: u32 = 88;
    pub const LIGHT_SHADOWRADIUS: u32 = 96;
    pub const LIGHT_VERTICALDISPLACEMENT: u32 = 100;
    pub const LIGHT_MULTIPLIER: u32 = 140;
}

const BEZIER_FLAG: u8 = 0x10;
const COLUMN_MASK: u8 = 0x0F;

/// Decoded keyframes keyed by controller type, in first-seen order.
pub type Controllers = IndexMap<u32, Vec<ControllerRow>>;

/// Location and shape of one controller track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerKey {
    pub controller_type: u32,
    pub num_rows: u16,
    pub timekeys_start: u16,
    pub values_start: u16,
    pub num_columns: u8,
}

impl ControllerKey {
    /// Encoded size of one key.
    pub const SIZE: usize = 16;

    pub fn read(cursor: &mut BinaryCursor) -> Result<Self> {
        let controller_type = cursor.get_u32()?;
        cursor.skip(2); // unknown
        let num_rows = cursor.get_u16()?;
        let timekeys_start = cursor.get_u16()?;
        let values_start = cursor.get_u16()?;
        let num_columns = cursor.get_u8()?;
        cursor.skip(3); // padding

        Ok(Self {
            controller_type,
            num_rows,
            timekeys_start,
            values_start,
            num_columns,
        })
    }

    #[must_use]
    pub fn is_bezier(&self) -> bool {
        self.num_columns & BEZIER_FLAG != 0
    }

    /// Orientation stored as a single packed value per row.
    #[must_use]
    pub fn is_compressed_orientation(&self) -> bool {
        self.controller_type == controller_type::ORIENTATION && self.num_columns == 2
    }

    /// Number of values kept in each output row.
    #[must_use]
    pub fn value_columns(&self) -> usize {
        if self.is_compressed_orientation() {
            1
        } else {
            (self.num_columns & COLUMN_MASK) as usize
        }
    }

    /// Number of floats stored per row, including Bezier control points.
    ///
    /// This is not the raw column byte: compressed orientation packs each row
    /// into one float and Bezier rows carry two control points per value.
    /// Slicing by the raw byte would misalign every row after the first.
    #[must_use]
    pub fn stored_columns(&self) -> usize {
        if self.is_compressed_orientation() {
            1
        } else if self.is_bezier() {
            self.value_columns() * 3
        } else {
            self.value_columns()
        }
    }
}

/// One keyframe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerRow {
    pub timekey: f32,
    pub values: Vec<f32>,
}

/// Split a flat value buffer into rows, keeping the leading `kept` floats of
/// every `stride`-wide block.
#[must_use]
pub fn build_rows(timekeys: &[f32], values: &[f32], stride: usize, kept: usize) -> Vec<ControllerRow> {
    timekeys
        .iter()
        .enumerate()
        .map(|(i, &timekey)| {
            let start = i * stride;
            let values = values
                .get(start..start + kept)
                .map(<[f32]>::to_vec)
                .unwrap_or_default();
            ControllerRow { timekey, values }
        })
        .collect()
}

/// Read the time and value axes of one track.
pub fn read_track(
    cursor: &mut BinaryCursor,
    key: &ControllerKey,
    data: &ArrayDefinition,
) -> Result<Vec<ControllerRow>> {
    let rows = key.num_rows as usize;

    cursor.seek(data.absolute() + 4 * key.timekeys_start as usize);
    let timekeys = cursor.get_f32_vec(rows)?;

    cursor.seek(data.absolute() + 4 * key.values_start as usize);
    let stride = key.stored_columns();
    let values = cursor.get_f32_vec(stride * rows)?;

    Ok(build_rows(&timekeys, &values, stride, key.value_columns()))
}

/// Read a node's controller key table and every track it describes.
pub fn read_controllers(
    cursor: &mut BinaryCursor,
    keys: &ArrayDefinition,
    data: &ArrayDefinition,
) -> Result<Controllers> {
    let mut controllers = Controllers::new();
    if keys.is_empty() {
        return Ok(controllers);
    }

    cursor.seek(keys.absolute());
    let controller_keys = (0..keys.count)
        .map(|_| ControllerKey::read(cursor))
        .collect::<Result<Vec<_>>>()?;

    for key in &controller_keys {
        trace!(
            "Controller type={} rows={} columns={:#04x}",
            key.controller_type, key.num_rows, key.num_columns
        );
        let rows = read_track(cursor, key, data)?;
        // A repeated type replaces the earlier track. Files are not known to
        // contain duplicates; this keeps the observed last-wins behavior.
        controllers.insert(key.controller_type, rows);
    }

    Ok(controllers)
}

/// Values of the first row of a track, if the track has any rows.
#[must_use]
pub fn first_values(controllers: &Controllers, controller_type: u32) -> Option<&[f32]> {
    controllers
        .get(&controller_type)
        .and_then(|rows| rows.first())
        .map(|row| row.values.as_slice())
}

/// First-row scalar of a track, or `default` when the track is absent.
pub fn scalar_or(controllers: &Controllers, controller_type: u32, default: f32) -> Result<f32> {
    match first_values(controllers, controller_type) {
        None => Ok(default),
        Some(values) => values.first().copied().ok_or_else(|| {
            Error::MalformedInput(format!("controller {controller_type} has no value columns"))
        }),
    }
}

/// First-row colour of a track, or `default` when the track is absent.
pub fn color_or(
    controllers: &Controllers,
    controller_type: u32,
    default: [f32; 3],
) -> Result<[f32; 3]> {
    match first_values(controllers, controller_type) {
        None => Ok(default),
        Some(&[r, g, b, ..]) => Ok([r, g, b]),
        Some(values) => Err(Error::MalformedInput(format!(
            "controller {controller_type} has {} columns, expected 3",
            values.len()
        ))),
    }
}
