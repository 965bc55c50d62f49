//! File format handlers for Odyssey engine formats

pub mod mdl;

// Re-export main document types
pub use mdl::{LoadOptions, MdlInfo, Model, ModelNode, NodeId, NodeType, inspect_mdl, read_mdl};
