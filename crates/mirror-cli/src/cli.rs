//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// Package mirror - regenerate a static package repository and publish it
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Build the repository and synchronize it with the remote store
    ///
    /// Examples:
    ///   mirror build --remote /mnt/bucket
    ///   mirror build satis.json --fresh -e cache:path=/var/cache/mirror
    ///   mirror build -e pause-at-hook:pause=BEFORE_UPLOAD_TO_S3
    Build {
        /// Configuration document
        #[arg(default_value = "satis.json")]
        config_file: PathBuf,

        /// Only rebuild these repositories
        #[arg(long = "repository-url", value_name = "URL")]
        repository_urls: Vec<String>,

        /// Do not download the published mirror before building
        #[arg(long)]
        fresh: bool,

        /// Enable an extension: `name` or `name:key=value,key2=value2`
        #[arg(short, long = "extension", value_name = "SPEC")]
        extensions: Vec<String>,

        /// Directory holding the published mirror
        #[arg(long, env = "MIRROR_REMOTE_ROOT", value_name = "DIR")]
        remote: Option<PathBuf>,

        /// Root of the staging area [default: $TMPDIR/package-mirror]
        #[arg(long, env = "MIRROR_STAGING_ROOT", value_name = "DIR")]
        staging_root: Option<PathBuf>,

        /// Repository generator command line
        #[arg(long, env = "MIRROR_GENERATOR", default_value = "satis", value_name = "BIN")]
        generator: String,
    },

    /// List the available extensions and their hooks
    ListExtensions {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
