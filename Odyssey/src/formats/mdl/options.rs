//! Load options for MDL decoding

/// Default limit on node nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options controlling how a model is decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Deepest node nesting accepted before the file is treated as malformed
    pub max_depth: usize,
    /// Read per-vertex positions from the `.mdx` file (default: true)
    ///
    /// When disabled the `.mdx` file is still required and the headers are
    /// still validated, but meshes come back without vertices.
    pub read_vertices: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadOptions {
    /// Create options with the default limits and full geometry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            read_vertices: true,
        }
    }

    /// Options for structure-only decoding (no vertex reads).
    #[must_use]
    pub fn structure_only() -> Self {
        Self::new().with_read_vertices(false)
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_read_vertices(mut self, read_vertices: bool) -> Self {
        self.read_vertices = read_vertices;
        self
    }
}
