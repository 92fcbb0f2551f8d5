use crate::error::invalid_input;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, Utc};
use rolodex_core::domain::{ContactId, ContactKind, ContactStatus, UserId};
use std::str::FromStr;

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}

pub fn format_timestamp_datetime(ts: i64) -> String {
    match DateTime::<Utc>::from_timestamp(ts, 0) {
        Some(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => ts.to_string(),
    }
}

pub fn parse_contact_id(raw: &str) -> Result<ContactId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("contact id cannot be empty"));
    }
    ContactId::from_str(trimmed).map_err(|_| anyhow!("invalid contact id"))
}

/// Empty input clears the parent.
pub fn parse_optional_contact_id(raw: &str) -> Result<Option<ContactId>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_contact_id(raw).map(Some)
}

pub fn parse_owner(raw: i64) -> Result<UserId> {
    if raw <= 0 {
        return Err(invalid_input("owner must be a positive user id"));
    }
    Ok(UserId::new(raw))
}

pub fn parse_status(raw: &str) -> Result<ContactStatus> {
    ContactStatus::parse(raw).ok_or_else(|| {
        invalid_input(format!(
            "invalid status {raw:?}: expected one of {}",
            ContactStatus::allowed_values()
        ))
    })
}

pub fn parse_kind(raw: &str) -> Result<ContactKind> {
    ContactKind::parse(raw.trim())
        .ok_or_else(|| invalid_input(format!("invalid kind {raw:?}: expected individual|company")))
}

pub fn normalize_optional_value(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
