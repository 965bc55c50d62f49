//! MDL/MDX (Odyssey binary model) format module
//!
//! A model is stored as a `.mdl` file holding headers, names, the node tree
//! and controller data, plus a `.mdx` file holding strided vertex records.

pub mod controller;
mod document;
pub mod header;
mod inspect;
pub mod node;
mod options;
mod reader;

// Public API
pub use controller::{ControllerKey, ControllerRow, Controllers, controller_type};
pub use document::{
    DirtSettings, FaceList, LightData, MeshData, Model, ModelNode, ModelProperties, NodeId,
    NodeType, UvAnimation, node_flags,
};
pub use header::{Classification, Game, MDL_OFFSET, Platform, Variant};
pub use inspect::{MdlInfo, NodeInfo, inspect_mdl};
pub use options::{DEFAULT_MAX_DEPTH, LoadOptions};
pub use reader::{
    parse_mdl_bytes, parse_mdl_bytes_with_options, read_mdl, read_mdl_with_options, read_names,
};
