use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::now_utc;
use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use rolodex_core::dto::SyncResult;
use rolodex_sync::directory::{FileDirectorySource, HttpDirectorySource};
use rolodex_sync::{sync_directory, DirectorySource};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Subcommand)]
pub enum SyncCommand {
    /// Merge the remote business directory into your contacts.
    Directory(SyncDirectoryArgs),
}

#[derive(Debug, Args)]
pub struct SyncDirectoryArgs {
    /// Read the directory from a JSON export instead of the API.
    #[arg(long, value_name = "PATH")]
    pub from_file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SyncOutput {
    #[serde(flatten)]
    result: SyncResult,
    warnings: Vec<String>,
}

pub fn sync_directory_cmd(ctx: &Context<'_>, args: SyncDirectoryArgs) -> Result<()> {
    let source = directory_source(ctx, args)?;
    let report = sync_directory(source.as_ref(), ctx.store, now_utc(), ctx.owner)
        .with_context(|| format!("sync directory from {}", source.source_name()))?;

    let warnings = report.warnings.clone();
    let result = report.into_result();
    if ctx.json {
        return print_json(&SyncOutput { result, warnings });
    }

    println!(
        "synced {} businesses: {} created, {} updated, {} unchanged, {} skipped",
        result.count, result.created, result.updated, result.unchanged, result.skipped
    );
    for warning in warnings {
        println!("warning: {warning}");
    }
    Ok(())
}

fn directory_source(
    ctx: &Context<'_>,
    args: SyncDirectoryArgs,
) -> Result<Box<dyn DirectorySource>> {
    if let Some(path) = args.from_file {
        return Ok(Box::new(FileDirectorySource::new(path)));
    }

    let directory = &ctx.config.directory;
    let url = directory.url.clone().ok_or_else(|| {
        invalid_input("directory url not configured: set directory.url or ROLODEX_DIRECTORY_URL")
    })?;
    let api_key = directory.api_key().ok_or_else(|| {
        invalid_input(format!(
            "directory api key missing: set {}",
            directory.api_key_env
        ))
    })?;
    Ok(Box::new(HttpDirectorySource::new(
        url,
        api_key,
        Duration::from_secs(directory.timeout_secs),
        directory.user_agent.clone(),
    )))
}
