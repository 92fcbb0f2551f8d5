use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::now_utc;
use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use rolodex_core::dto::{summarize_errors, ImportResult};
use rolodex_sync::import::{import_bytes, import_request, FileKind, ImportRequest};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
pub enum ImportCommand {
    /// Import a CSV or Excel file from disk.
    File(ImportFileArgs),
    /// Import an RPC-style JSON payload with base64 file content.
    Payload(ImportPayloadArgs),
}

#[derive(Debug, Args)]
pub struct ImportFileArgs {
    pub path: PathBuf,
    /// csv, xlsx or xls; inferred from the extension when omitted.
    #[arg(long)]
    pub kind: Option<String>,
}

#[derive(Debug, Args)]
pub struct ImportPayloadArgs {
    /// `{"fileContentBase64": ..., "fileName": ..., "fileKind": ...}`
    pub payload: String,
}

pub fn import_file(ctx: &Context<'_>, args: ImportFileArgs) -> Result<()> {
    let kind = match args.kind.as_deref() {
        Some(raw) => FileKind::parse(raw)
            .ok_or_else(|| invalid_input(format!("invalid file kind {raw:?}: expected csv|xlsx|xls")))?,
        None => FileKind::from_path(&args.path).ok_or_else(|| {
            invalid_input(format!(
                "cannot infer file kind of {}; pass --kind",
                args.path.display()
            ))
        })?,
    };
    let bytes = fs::read(&args.path)
        .with_context(|| format!("read import file {}", args.path.display()))?;
    let outcome = import_bytes(ctx.store, now_utc(), ctx.owner, &bytes, kind);
    finish(ctx, outcome)
}

pub fn import_payload(ctx: &Context<'_>, args: ImportPayloadArgs) -> Result<()> {
    let request: ImportRequest = serde_json::from_str(&args.payload)
        .map_err(|err| invalid_input(format!("invalid import payload: {err}")))?;
    let outcome = import_request(ctx.store, now_utc(), ctx.owner, &request);
    finish(ctx, outcome)
}

fn finish(ctx: &Context<'_>, outcome: rolodex_sync::Result<ImportResult>) -> Result<()> {
    let result = match outcome {
        Ok(result) => result,
        Err(err) => {
            if ctx.json {
                print_json(&ImportResult::failed(format!(
                    "Failed to import contacts: {err}"
                )))?;
            }
            return Err(err).context("import contacts");
        }
    };

    if ctx.json {
        return print_json(&result);
    }

    println!(
        "imported {} of {} valid contacts",
        result.inserted, result.total
    );
    if let Some(errors) = result.errors.as_deref() {
        println!("{} errors:", errors.len());
        for line in summarize_errors(errors, ctx.config.import.max_displayed_errors) {
            println!("  {line}");
        }
    }
    Ok(())
}
