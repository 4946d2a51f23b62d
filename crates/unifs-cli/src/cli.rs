use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "unifs",
    about = "Read, write, and remove files on any unifs backend",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub backend: BackendArgs,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendKind {
    Memory,
    Local,
    S3,
}

/// Backend selection. `--backend` wins over `--config`; with neither the
/// memory backend is used.
#[derive(Args, Debug, Default)]
pub struct BackendArgs {
    /// TOML file with a [backend] table
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum)]
    pub backend: Option<BackendKind>,

    /// Root directory for the local backend
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Bucket for the s3 backend
    #[arg(long, global = true)]
    pub bucket: Option<String>,

    #[arg(long, global = true)]
    pub region: Option<String>,

    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Key prefix for the s3 backend
    #[arg(long, global = true)]
    pub prefix: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Stream a file to stdout
    Cat(CatArgs),
    /// Write stdin (or a local file) to a path
    Put(PutArgs),
    /// Remove a file, or every file under a prefix
    Rm(RmArgs),
    /// Copy a file within the backend
    Cp(CpArgs),
}

#[derive(Args)]
pub struct CatArgs {
    pub path: String,
}

#[derive(Args)]
pub struct PutArgs {
    pub path: String,
    /// Read contents from this local file instead of stdin
    #[arg(long)]
    pub from: Option<PathBuf>,
}

#[derive(Args)]
pub struct RmArgs {
    pub path: String,
}

#[derive(Args)]
pub struct CpArgs {
    pub src: String,
    pub dst: String,
}
