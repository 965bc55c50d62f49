//! MDL file, geometry and model headers
//!
//! Layout (offsets absolute):
//! ```text
//! [0x00]  file header      12 bytes  signature(4)=0, mdl_size(4), mdx_size(4)
//! [0x0C]  geometry header  80 bytes  fn_ptr1(4), fn_ptr2(4), name(32), root(4),
//!                                    node_count(4), 2 x array(24), refcount(4),
//!                                    model_type(1)=2, pad(3)
//! [0x5C]  model header    116 bytes  see ModelHeader::read
//! ```
//! Every offset stored inside the file is relative to [`MDL_OFFSET`].

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::utils::BinaryCursor;

/// Size of the file header; base for every relative offset in the file.
pub const MDL_OFFSET: usize = 12;

/// Required value of the geometry header's model type byte.
pub const MODEL_TYPE_MODEL: u8 = 2;

/// Legacy function pointer constants that identify the game and platform.
pub mod fn_ptr {
    pub const FN_PTR_1_K1_PC: u32 = 4273776;
    pub const FN_PTR_1_K1_XBOX: u32 = 4254992;
    pub const FN_PTR_1_K2_PC: u32 = 4285200;
    pub const FN_PTR_1_K2_XBOX: u32 = 4285872;
    pub const FN_PTR_2_K1_PC: u32 = 4216096;
    pub const FN_PTR_2_K1_XBOX: u32 = 4255008;
    pub const FN_PTR_2_K2_PC: u32 = 4216320;
    pub const FN_PTR_2_K2_XBOX: u32 = 4216016;
}

// ============================================================================
// Array Definition
// ============================================================================

/// Relative table location plus element count.
///
/// Stored as `offset(4), count(4), count(4)`; the two counts must agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArrayDefinition {
    pub offset: u32,
    pub count: u32,
}

impl ArrayDefinition {
    /// Build from the raw encoded fields, validating the redundant count.
    ///
    /// `position` is only used for error reporting.
    pub fn from_counts(position: usize, offset: u32, count1: u32, count2: u32) -> Result<Self> {
        if count1 != count2 {
            return Err(Error::ArrayCountMismatch {
                offset: position,
                count1,
                count2,
            });
        }
        Ok(Self {
            offset,
            count: count1,
        })
    }

    pub fn read(cursor: &mut BinaryCursor) -> Result<Self> {
        let position = cursor.position();
        let offset = cursor.get_u32()?;
        let count1 = cursor.get_u32()?;
        let count2 = cursor.get_u32()?;
        Self::from_counts(position, offset, count1, count2)
    }

    /// Absolute file position of the first element.
    #[must_use]
    pub fn absolute(&self) -> usize {
        MDL_OFFSET + self.offset as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

// ============================================================================
// Game / Platform Variant
// ============================================================================

/// Which of the two games produced the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Game {
    /// Knights of the Old Republic
    #[default]
    Kotor,
    /// The Sith Lords
    Tsl,
}

/// Target platform of the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Platform {
    #[default]
    Pc,
    Xbox,
}

/// Binary dialect of a file. Resolved once per load and passed to every node decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub game: Game,
    pub platform: Platform,
}

impl Variant {
    #[must_use]
    pub const fn new(game: Game, platform: Platform) -> Self {
        Self { game, platform }
    }

    /// Identify the dialect from the two legacy function pointers.
    ///
    /// The first pointer is authoritative; the second is only consulted when
    /// the first is not one of the known constants.
    ///
    /// NOTE: the second-pointer fallback is an extension. Files seen in the
    /// wild are identified by the first pointer alone.
    #[must_use]
    pub fn detect(fn_ptr1: u32, fn_ptr2: u32) -> Option<Self> {
        use fn_ptr::{
            FN_PTR_1_K1_PC, FN_PTR_1_K1_XBOX, FN_PTR_1_K2_PC, FN_PTR_1_K2_XBOX, FN_PTR_2_K1_PC,
            FN_PTR_2_K1_XBOX, FN_PTR_2_K2_PC, FN_PTR_2_K2_XBOX,
        };

        match fn_ptr1 {
            FN_PTR_1_K1_PC => return Some(Self::new(Game::Kotor, Platform::Pc)),
            FN_PTR_1_K1_XBOX => return Some(Self::new(Game::Kotor, Platform::Xbox)),
            FN_PTR_1_K2_PC => return Some(Self::new(Game::Tsl, Platform::Pc)),
            FN_PTR_1_K2_XBOX => return Some(Self::new(Game::Tsl, Platform::Xbox)),
            _ => {}
        }

        match fn_ptr2 {
            FN_PTR_2_K1_PC => Some(Self::new(Game::Kotor, Platform::Pc)),
            FN_PTR_2_K1_XBOX => Some(Self::new(Game::Kotor, Platform::Xbox)),
            FN_PTR_2_K2_PC => Some(Self::new(Game::Tsl, Platform::Pc)),
            FN_PTR_2_K2_XBOX => Some(Self::new(Game::Tsl, Platform::Xbox)),
            _ => None,
        }
    }

    /// Legacy function pointers written by this dialect.
    #[must_use]
    pub fn fn_ptrs(&self) -> (u32, u32) {
        use fn_ptr::{
            FN_PTR_1_K1_PC, FN_PTR_1_K1_XBOX, FN_PTR_1_K2_PC, FN_PTR_1_K2_XBOX, FN_PTR_2_K1_PC,
            FN_PTR_2_K1_XBOX, FN_PTR_2_K2_PC, FN_PTR_2_K2_XBOX,
        };

        match (self.game, self.platform) {
            (Game::Kotor, Platform::Pc) => (FN_PTR_1_K1_PC, FN_PTR_2_K1_PC),
            (Game::Kotor, Platform::Xbox) => (FN_PTR_1_K1_XBOX, FN_PTR_2_K1_XBOX),
            (Game::Tsl, Platform::Pc) => (FN_PTR_1_K2_PC, FN_PTR_2_K2_PC),
            (Game::Tsl, Platform::Xbox) => (FN_PTR_1_K2_XBOX, FN_PTR_2_K2_XBOX),
        }
    }

    /// Mesh headers carry the dirt/hologram block.
    #[must_use]
    pub fn is_tsl(&self) -> bool {
        self.game == Game::Tsl
    }

    /// Mesh headers omit the trailing vertex array offset.
    #[must_use]
    pub fn is_xbox(&self) -> bool {
        self.platform == Platform::Xbox
    }
}

// ============================================================================
// Model Classification
// ============================================================================

/// Model classification byte from the model header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    Other,
    Effect,
    Tile,
    Character,
    Door,
    Lightsaber,
    Placeable,
    Flyer,
    Unknown(u8),
}

impl Classification {
    #[must_use]
    pub fn from_u8(v: u8) -> Self {
        match v {
            0x00 => Self::Other,
            0x01 => Self::Effect,
            0x02 => Self::Tile,
            0x04 => Self::Character,
            0x08 => Self::Door,
            0x10 => Self::Lightsaber,
            0x20 => Self::Placeable,
            0x40 => Self::Flyer,
            _ => Self::Unknown(v),
        }
    }
}

// ============================================================================
// Headers
// ============================================================================

/// The 12-byte file header.
#[derive(Debug, Clone, Copy)]
pub struct FileHeader {
    pub mdl_size: u32,
    pub mdx_size: u32,
}

impl FileHeader {
    pub fn read(cursor: &mut BinaryCursor) -> Result<Self> {
        let signature = cursor.get_u32()?;
        if signature != 0 {
            return Err(Error::BadSignature { found: signature });
        }
        let mdl_size = cursor.get_u32()?;
        let mdx_size = cursor.get_u32()?;

        debug!("MDL file header: mdl_size={mdl_size}, mdx_size={mdx_size}");
        Ok(Self { mdl_size, mdx_size })
    }
}

/// The geometry header that follows the file header.
#[derive(Debug, Clone)]
pub struct GeometryHeader {
    pub fn_ptr1: u32,
    pub fn_ptr2: u32,
    /// Resolved dialect; the default when the pointers were unrecognized.
    pub variant: Variant,
    /// Whether `variant` came from a known pointer constant.
    pub variant_recognized: bool,
    pub model_name: String,
    pub root_node_offset: u32,
    pub node_count: u32,
    pub runtime_arrays: [ArrayDefinition; 2],
    pub ref_count: u32,
    pub model_type: u8,
}

impl GeometryHeader {
    pub fn read(cursor: &mut BinaryCursor) -> Result<Self> {
        let fn_ptr1 = cursor.get_u32()?;
        let fn_ptr2 = cursor.get_u32()?;

        // Unknown pointers are tolerated and fall back to the KotOR/PC layout.
        let detected = Variant::detect(fn_ptr1, fn_ptr2);
        if detected.is_none() {
            warn!(
                "Unrecognized MDL function pointers ({fn_ptr1}, {fn_ptr2}), assuming KotOR/PC layout"
            );
        }

        let model_name = cursor.get_fixed_string(32)?;
        let root_node_offset = cursor.get_u32()?;
        let node_count = cursor.get_u32()?;
        let runtime_arrays = [ArrayDefinition::read(cursor)?, ArrayDefinition::read(cursor)?];
        let ref_count = cursor.get_u32()?;

        let model_type = cursor.get_u8()?;
        if model_type != MODEL_TYPE_MODEL {
            return Err(Error::BadModelType {
                expected: MODEL_TYPE_MODEL,
                found: model_type,
            });
        }
        cursor.skip(3); // padding

        let variant = detected.unwrap_or_default();
        debug!(
            "MDL geometry header: name={model_name:?}, variant={variant:?}, nodes={node_count}"
        );

        Ok(Self {
            fn_ptr1,
            fn_ptr2,
            variant,
            variant_recognized: detected.is_some(),
            model_name,
            root_node_offset,
            node_count,
            runtime_arrays,
            ref_count,
            model_type,
        })
    }
}

/// The model header that follows the geometry header.
#[derive(Debug, Clone)]
pub struct ModelHeader {
    pub classification: Classification,
    pub subclassification: u8,
    pub affected_by_fog: bool,
    pub num_child_models: u32,
    pub animations: ArrayDefinition,
    pub supermodel_ref: u32,
    pub bounding_box: [f32; 6],
    pub radius: f32,
    pub animation_scale: f32,
    pub supermodel_name: String,
    pub head_root_offset: u32,
    pub mdx_size: u32,
    pub mdx_offset: u32,
    pub names: ArrayDefinition,
}

impl ModelHeader {
    /// Read the model header, checking its `.mdx` size against the file header.
    pub fn read(cursor: &mut BinaryCursor, file_header: &FileHeader) -> Result<Self> {
        let classification = Classification::from_u8(cursor.get_u8()?);
        let subclassification = cursor.get_u8()?;
        cursor.skip(1); // unknown
        let affected_by_fog = cursor.get_u8()? != 0;
        let num_child_models = cursor.get_u32()?;
        let animations = ArrayDefinition::read(cursor)?;
        let supermodel_ref = cursor.get_u32()?;
        let bounding_box = cursor.get_f32_array::<6>()?;
        let radius = cursor.get_f32()?;
        let animation_scale = cursor.get_f32()?;
        let supermodel_name = cursor.get_fixed_string(32)?;
        let head_root_offset = cursor.get_u32()?;
        cursor.skip(4); // padding

        let mdx_size = cursor.get_u32()?;
        if mdx_size != file_header.mdx_size {
            return Err(Error::SizeMismatch {
                header: file_header.mdx_size,
                model: mdx_size,
            });
        }
        let mdx_offset = cursor.get_u32()?;
        let names = ArrayDefinition::read(cursor)?;

        debug!(
            "MDL model header: classification={classification:?}, supermodel={supermodel_name:?}, names={}",
            names.count
        );

        Ok(Self {
            classification,
            subclassification,
            affected_by_fog,
            num_child_models,
            animations,
            supermodel_ref,
            bounding_box,
            radius,
            animation_scale,
            supermodel_name,
            head_root_offset,
            mdx_size,
            mdx_offset,
            names,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn push_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn geometry_header_bytes(fn_ptr1: u32, fn_ptr2: u32, model_type: u8) -> Vec<u8> {
        let mut buf = Vec::new();
        push_u32(&mut buf, fn_ptr1);
        push_u32(&mut buf, fn_ptr2);
        let mut name = b"c_bantha".to_vec();
        name.resize(32, 0);
        buf.extend_from_slice(&name);
        push_u32(&mut buf, 0x120); // root
        push_u32(&mut buf, 7); // node count
        for _ in 0..2 {
            push_u32(&mut buf, 0);
            push_u32(&mut buf, 0);
            push_u32(&mut buf, 0);
        }
        push_u32(&mut buf, 0); // ref count
        buf.push(model_type);
        buf.extend_from_slice(&[0, 0, 0]);
        buf
    }

    #[test]
    fn test_array_definition_counts_must_match() {
        assert_eq!(
            ArrayDefinition::from_counts(0, 16, 3, 3).unwrap(),
            ArrayDefinition { offset: 16, count: 3 }
        );

        let err = ArrayDefinition::from_counts(0x40, 16, 3, 4).unwrap_err();
        assert!(matches!(
            err,
            Error::ArrayCountMismatch { offset: 0x40, count1: 3, count2: 4 }
        ));
    }

    #[test]
    fn test_array_definition_read_and_absolute() {
        let mut buf = Vec::new();
        push_u32(&mut buf, 100);
        push_u32(&mut buf, 2);
        push_u32(&mut buf, 2);
        let mut cursor = BinaryCursor::new(&buf);

        let arr = ArrayDefinition::read(&mut cursor).unwrap();
        assert_eq!(arr.count, 2);
        assert_eq!(arr.absolute(), 112);
        assert_eq!(cursor.position(), 12);
    }

    #[test]
    fn test_variant_detection() {
        use fn_ptr::{FN_PTR_1_K1_PC, FN_PTR_1_K2_XBOX, FN_PTR_2_K1_PC, FN_PTR_2_K1_XBOX};

        assert_eq!(
            Variant::detect(FN_PTR_1_K1_PC, FN_PTR_2_K1_PC),
            Some(Variant::new(Game::Kotor, Platform::Pc))
        );
        assert_eq!(
            Variant::detect(FN_PTR_1_K2_XBOX, 0),
            Some(Variant::new(Game::Tsl, Platform::Xbox))
        );
        assert_eq!(
            Variant::detect(0xDEAD, FN_PTR_2_K1_XBOX),
            Some(Variant::new(Game::Kotor, Platform::Xbox))
        );
        assert_eq!(Variant::detect(1, 2), None);
    }

    #[test]
    fn test_variant_fn_ptrs_roundtrip() {
        for game in [Game::Kotor, Game::Tsl] {
            for platform in [Platform::Pc, Platform::Xbox] {
                let variant = Variant::new(game, platform);
                let (p1, p2) = variant.fn_ptrs();
                assert_eq!(Variant::detect(p1, p2), Some(variant));
            }
        }
    }

    #[test]
    fn test_file_header_bad_signature_stops() {
        let mut buf = Vec::new();
        push_u32(&mut buf, 1);
        push_u32(&mut buf, 500);
        push_u32(&mut buf, 40);
        let mut cursor = BinaryCursor::new(&buf);

        let err = FileHeader::read(&mut cursor).unwrap_err();
        assert!(matches!(err, Error::BadSignature { found: 1 }));
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn test_geometry_header_unknown_variant_is_tolerated() {
        let buf = geometry_header_bytes(0x1234, 0x5678, MODEL_TYPE_MODEL);
        let mut cursor = BinaryCursor::new(&buf);

        let header = GeometryHeader::read(&mut cursor).unwrap();
        assert_eq!(header.variant, Variant::default());
        assert!(!header.variant_recognized);
        assert_eq!(header.model_name, "c_bantha");
        assert_eq!(header.root_node_offset, 0x120);
        assert_eq!(cursor.position(), 80);
    }

    #[test]
    fn test_geometry_header_bad_model_type() {
        let (p1, p2) = Variant::new(Game::Tsl, Platform::Pc).fn_ptrs();
        let buf = geometry_header_bytes(p1, p2, 5);
        let mut cursor = BinaryCursor::new(&buf);

        let err = GeometryHeader::read(&mut cursor).unwrap_err();
        assert!(matches!(err, Error::BadModelType { expected: 2, found: 5 }));
    }

    #[test]
    fn test_classification() {
        assert_eq!(Classification::from_u8(0x04), Classification::Character);
        assert_eq!(Classification::from_u8(0x03), Classification::Unknown(3));
    }
}
