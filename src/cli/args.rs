//! Defines the command-line arguments and subcommands for the Sentree CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "sentree",
    version,
    about = "Renders tagged Korean sentences as constituency trees."
)]
pub struct SentreeArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Load lookup tables from a YAML file instead of the built-in set.
    #[arg(long, value_name = "FILE", global = true)]
    pub tables: Option<PathBuf>,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse annotated text (`surface=morpheme/TAG+morpheme/TAG ...`) and print the tree.
    Parse {
        /// The text to parse; one chunk per input word.
        #[arg(required = true)]
        text: String,
        /// Keep single-child branches instead of collapsing them.
        #[arg(long)]
        show_all_levels: bool,
        /// Print the full response as JSON.
        #[arg(long)]
        json: bool,
        /// Skip the definition lookup even when translator credentials are set.
        #[arg(long)]
        no_definitions: bool,
    },
    /// List the tag canonicalization map.
    Tags,
}
