//! # Odyssey
//!
//! A pure-Rust library for reading the binary model format of the Odyssey
//! engine games, Knights of the Old Republic and The Sith Lords.
//!
//! ## Supported Formats
//!
//! - **MDL/MDX** - Binary models: node trees, meshes, lights and controller
//!   tracks, for both games on PC and Xbox
//!
//! ## Quick Start
//!
//! ```no_run
//! use odyssey::formats::mdl::read_mdl;
//!
//! // Reads c_bantha.mdl and c_bantha.mdx
//! let model = read_mdl("c_bantha.mdl")?;
//! for child in model.children(model.root_id()) {
//!     println!("{} ({})", child.name, child.node_type);
//! }
//! # Ok::<(), odyssey::Error>(())
//! ```
//!
//! ### Using the Prelude
//!
//! ```
//! use odyssey::prelude::*;
//!
//! let options = LoadOptions::new().with_max_depth(64);
//! assert!(options.read_vertices);
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `odyssey` command-line binary

pub mod batch;
pub mod error;
pub mod formats;
pub mod utils;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::mdl::{
        Controllers, ControllerRow, FaceList, Game, LightData, LoadOptions, MdlInfo, MeshData,
        Model, ModelNode, NodeId, NodeType, Platform, Variant, inspect_mdl, parse_mdl_bytes,
        parse_mdl_bytes_with_options, read_mdl, read_mdl_with_options,
    };

    // Batch operations
    pub use crate::batch::{BatchLoadResult, LoadProgress, find_mdl_files, load_models};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
