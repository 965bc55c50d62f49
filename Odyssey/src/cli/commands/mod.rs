use clap::Subcommand;
use std::path::PathBuf;

use crate::formats::mdl::DEFAULT_MAX_DEPTH;

pub mod mdl;

#[derive(Subcommand)]
pub enum Commands {
    /// Show headers and the node tree of an MDL file
    Inspect {
        /// Source MDL file (the .mdx must sit next to it)
        file: PathBuf,

        /// Print the summary as JSON instead of a tree
        #[arg(long)]
        json: bool,
    },

    /// Decode an MDL file and write the full model as JSON
    Dump {
        /// Source MDL file
        file: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode every MDL file under a directory
    Batch {
        /// Directory to search recursively
        dir: PathBuf,

        /// Skip per-vertex reads
        #[arg(long)]
        structure_only: bool,

        /// Deepest node nesting to accept
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Inspect { file, json } => mdl::inspect(file, *json),
            Commands::Dump { file, output } => mdl::dump(file, output.as_deref()),
            Commands::Batch {
                dir,
                structure_only,
                max_depth,
                quiet,
            } => mdl::batch(dir, *structure_only, *max_depth, *quiet),
        }
    }
}
