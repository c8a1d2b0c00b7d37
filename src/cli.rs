//! CLI struct definitions for the `aidata` command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(
    name = "aidata",
    version = env!("CARGO_PKG_VERSION"),
    about = "Validate, hash, deduplicate, checkpoint and export aidata knowledge files."
)]
pub(crate) struct Cli {
    /// Output format: 'text' or 'json'.
    #[clap(long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,
    /// Config file (defaults to aidata.toml next to the target file).
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log filter when AIDATA_LOG / RUST_LOG are unset (e.g. 'info', 'debug').
    #[clap(long, global = true)]
    pub log_level: Option<String>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

#[derive(clap::Args, Debug)]
pub(crate) struct WriteArgs {
    /// Stage the write through a temp file and rename it into place.
    #[clap(long)]
    pub atomic: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Check header, mandatory sections, CREATED stamp, metadata and hash
    #[clap(name = "validate")]
    Validate {
        file: PathBuf,
        /// Require the configured metadata fields in FILE METADATA.
        #[clap(long)]
        strict_metadata: bool,
        /// Do not check an existing integrity-hash line.
        #[clap(long)]
        skip_integrity: bool,
    },

    /// Compute and write the integrity hash line
    #[clap(name = "generate-hash")]
    GenerateHash {
        file: PathBuf,
        #[clap(flatten)]
        write: WriteArgs,
    },

    /// Check the recorded integrity hash without writing
    #[clap(name = "verify-hash")]
    VerifyHash { file: PathBuf },

    /// Remove duplicate AUTOMATED LEARNINGS entries
    #[clap(name = "deduplicate")]
    Deduplicate {
        file: PathBuf,
        /// Remove duplicates without asking.
        #[clap(long)]
        auto_confirm: bool,
        #[clap(flatten)]
        write: WriteArgs,
    },

    /// Write a JSON projection next to the file
    #[clap(name = "to-json")]
    ToJson { file: PathBuf },

    /// Append a timestamped line to EVOLUTION TRACKING → Checkpoint History
    #[clap(name = "add-checkpoint")]
    AddCheckpoint {
        file: PathBuf,
        /// Checkpoint description (required).
        #[clap(long)]
        description: Option<String>,
        #[clap(flatten)]
        write: WriteArgs,
    },

    /// List top-level sections in document order
    #[clap(name = "list-sections")]
    ListSections { file: PathBuf },
}

impl Command {
    pub fn file(&self) -> &Path {
        match self {
            Command::Validate { file, .. }
            | Command::GenerateHash { file, .. }
            | Command::VerifyHash { file }
            | Command::Deduplicate { file, .. }
            | Command::ToJson { file }
            | Command::AddCheckpoint { file, .. }
            | Command::ListSections { file } => file,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Validate { .. } => "validate",
            Command::GenerateHash { .. } => "generate-hash",
            Command::VerifyHash { .. } => "verify-hash",
            Command::Deduplicate { .. } => "deduplicate",
            Command::ToJson { .. } => "to-json",
            Command::AddCheckpoint { .. } => "add-checkpoint",
            Command::ListSections { .. } => "list-sections",
        }
    }
}
