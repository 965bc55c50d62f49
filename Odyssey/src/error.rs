//! Error types for `Odyssey`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `Odyssey` operations.
///
/// Every decode step is fail-fast: any of these aborts the whole load and no
/// partial model is returned.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== MDL/MDX Format Errors ====================
    /// The paired `.mdx` vertex-data file does not exist.
    #[error("MDX file not found: {path}")]
    MissingVertexFile {
        /// The expected path to the `.mdx` file.
        path: PathBuf,
    },

    /// The file header signature is not zero.
    #[error("invalid MDL signature: expected 0, found {found:#010x}")]
    BadSignature {
        /// The value found in the first four bytes.
        found: u32,
    },

    /// The geometry header's model type discriminant is not the expected constant.
    #[error("invalid model type: expected={expected}, actual={found}")]
    BadModelType {
        /// The required discriminant.
        expected: u8,
        /// The discriminant found in the file.
        found: u8,
    },

    /// The `.mdx` size in the model header disagrees with the file header.
    #[error("MDX size mismatch: expected={header}, actual={model}")]
    SizeMismatch {
        /// Size declared in the file header.
        header: u32,
        /// Size declared in the model header.
        model: u32,
    },

    /// An array definition's two redundant counts disagree.
    #[error("array count mismatch at {offset:#x}: count1={count1}, count2={count2}")]
    ArrayCountMismatch {
        /// Absolute position of the array definition.
        offset: usize,
        /// First encoded count.
        count1: u32,
        /// Second encoded count.
        count2: u32,
    },

    /// A node references a name outside the name table.
    #[error("name index {index} out of range (name table has {len} entries)")]
    NameIndexOutOfRange {
        /// The index referenced by the node.
        index: usize,
        /// Number of names in the table.
        len: usize,
    },

    /// A read ran past the end of the buffer.
    #[error("truncated read: {requested} bytes at {position:#x}, buffer is {len} bytes")]
    TruncatedRead {
        /// Cursor position when the read started.
        position: usize,
        /// Number of bytes requested.
        requested: usize,
        /// Total buffer length.
        len: usize,
    },

    /// Generic structural violation (cyclic or excessive node nesting, bad controller data).
    #[error("malformed MDL: {0}")]
    MalformedInput(String),
}

/// A specialized Result type for `Odyssey` operations.
pub type Result<T> = std::result::Result<T, Error>;
