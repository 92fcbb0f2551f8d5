use anyhow::Result;
use rolodex_config::AppConfig;
use rolodex_core::domain::UserId;
use rolodex_store::Store;
use serde::Serialize;
use std::io::{self, Write};

pub mod business;
pub mod contacts;
pub mod import;
pub mod sync;

pub struct Context<'a> {
    pub store: &'a Store,
    pub json: bool,
    pub config: &'a AppConfig,
    /// `--owner` when given, else the configured owner.
    pub owner: UserId,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
