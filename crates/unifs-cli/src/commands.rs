use anyhow::Context;
use colored::Colorize;
use tokio::io::{AsyncRead, AsyncWriteExt};
use unifs::{open_backend, BackendConfig, FileSystem, UnifsConfig};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = backend_config(&cli.backend)?;
    let fs = open_backend(&config)
        .with_context(|| format!("failed to open {} backend", config.kind()))?;
    tracing::debug!(backend = fs.name(), "backend ready");

    match cli.command {
        Command::Cat(args) => cmd_cat(fs.as_ref(), args).await,
        Command::Put(args) => cmd_put(fs.as_ref(), args).await,
        Command::Rm(args) => cmd_rm(fs.as_ref(), args).await,
        Command::Cp(args) => cmd_cp(fs.as_ref(), args).await,
    }
}

fn backend_config(args: &BackendArgs) -> anyhow::Result<BackendConfig> {
    let config = match args.backend {
        Some(BackendKind::Memory) => BackendConfig::Memory,
        Some(BackendKind::Local) => BackendConfig::Local {
            root: args
                .root
                .clone()
                .context("--root is required for the local backend")?,
            create: false,
        },
        Some(BackendKind::S3) => BackendConfig::S3 {
            bucket: args
                .bucket
                .clone()
                .context("--bucket is required for the s3 backend")?,
            region: args.region.clone(),
            endpoint: args.endpoint.clone(),
            prefix: args.prefix.clone(),
        },
        None => match &args.config {
            Some(path) => {
                UnifsConfig::load(path)
                    .with_context(|| format!("failed to load {}", path.display()))?
                    .backend
            }
            None => BackendConfig::default(),
        },
    };
    Ok(config)
}

async fn cmd_cat(fs: &dyn FileSystem, args: CatArgs) -> anyhow::Result<()> {
    let mut reader = fs
        .open(&args.path)
        .await
        .with_context(|| format!("cannot read {}", args.path))?;
    let mut stdout = tokio::io::stdout();
    tokio::io::copy(&mut reader, &mut stdout).await?;
    stdout.flush().await?;
    Ok(())
}

async fn cmd_put(fs: &dyn FileSystem, args: PutArgs) -> anyhow::Result<()> {
    let mut source: Box<dyn AsyncRead + Unpin + Send> = match &args.from {
        Some(local) => Box::new(
            tokio::fs::File::open(local)
                .await
                .with_context(|| format!("cannot open {}", local.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };
    let written = put_stream(fs, &args.path, &mut source).await?;
    eprintln!("{} wrote {} bytes to {}", "✓".green().bold(), written, args.path.bold());
    Ok(())
}

async fn cmd_rm(fs: &dyn FileSystem, args: RmArgs) -> anyhow::Result<()> {
    fs.remove(&args.path)
        .await
        .with_context(|| format!("cannot remove {}", args.path))?;
    eprintln!("{} removed {}", "✓".green().bold(), args.path.bold());
    Ok(())
}

async fn cmd_cp(fs: &dyn FileSystem, args: CpArgs) -> anyhow::Result<()> {
    let mut reader = fs
        .open(&args.src)
        .await
        .with_context(|| format!("cannot read {}", args.src))?;
    let copied = put_stream(fs, &args.dst, &mut reader).await?;
    eprintln!(
        "{} copied {} → {} ({} bytes)",
        "✓".green().bold(),
        args.src.bold(),
        args.dst.bold(),
        copied
    );
    Ok(())
}

/// Stream `source` into a new file at `path`. Nothing is published unless the
/// whole stream was copied.
async fn put_stream<R>(fs: &dyn FileSystem, path: &str, source: &mut R) -> anyhow::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut writer = fs
        .create(path)
        .await
        .with_context(|| format!("cannot create {path}"))?;
    let written = tokio::io::copy(source, &mut writer)
        .await
        .with_context(|| format!("write to {path} failed"))?;
    writer
        .shutdown()
        .await
        .with_context(|| format!("cannot close {path}"))?;
    Ok(written)
}
