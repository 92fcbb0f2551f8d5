mod delimited;
mod workbook;

pub use delimited::parse_csv;
pub use workbook::{parse_workbook, NO_SHEETS_ERROR};

use crate::sink::ContactWriter;
use crate::{Result, SyncError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rolodex_core::domain::UserId;
use rolodex_core::dto::ImportResult;
use rolodex_core::import::{validate_contact_row, ParsedContact, RawContactRow, RowValidation};
use rolodex_store::repo::ContactNew;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Csv,
    Xlsx,
    Xls,
}

impl FileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Csv => "csv",
            FileKind::Xlsx => "xlsx",
            FileKind::Xls => "xls",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(FileKind::Csv),
            "xlsx" => Some(FileKind::Xlsx),
            "xls" => Some(FileKind::Xls),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }
}

/// File upload as it arrives over RPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub file_content_base64: String,
    pub file_name: String,
    pub file_kind: FileKind,
}

/// Contacts that passed validation plus every row-level and file-level
/// error, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedContacts {
    pub contacts: Vec<ParsedContact>,
    pub errors: Vec<String>,
}

impl ParsedContacts {
    pub fn file_error(message: impl Into<String>) -> Self {
        Self {
            contacts: Vec::new(),
            errors: vec![message.into()],
        }
    }

    /// Validates rows in order; the row number in messages is the position
    /// among data rows, starting at 1.
    pub(crate) fn push_row(&mut self, row: &RawContactRow, index: usize) {
        match validate_contact_row(row, index) {
            RowValidation::Valid(contact) => self.contacts.push(contact),
            RowValidation::Invalid(errors) => self.errors.extend(errors),
        }
    }
}

pub fn parse_bytes(bytes: &[u8], kind: FileKind) -> Result<ParsedContacts> {
    match kind {
        FileKind::Csv => Ok(parse_csv(&decode_text(bytes))),
        FileKind::Xlsx | FileKind::Xls => parse_workbook(bytes),
    }
}

/// Decodes the base64 payload, parses it with the adapter for its kind and
/// inserts every valid row for `owner`.
pub fn import_request<W>(
    writer: &W,
    now_utc: i64,
    owner: UserId,
    request: &ImportRequest,
) -> Result<ImportResult>
where
    W: ContactWriter + ?Sized,
{
    let bytes = STANDARD
        .decode(request.file_content_base64.trim())
        .map_err(|err| SyncError::Decode(format!("invalid base64 content: {err}")))?;
    tracing::debug!(
        file = %request.file_name,
        kind = request.file_kind.as_str(),
        bytes = bytes.len(),
        "decoded import payload"
    );
    import_bytes(writer, now_utc, owner, &bytes, request.file_kind)
}

pub fn import_bytes<W>(
    writer: &W,
    now_utc: i64,
    owner: UserId,
    bytes: &[u8],
    kind: FileKind,
) -> Result<ImportResult>
where
    W: ContactWriter + ?Sized,
{
    let parsed = parse_bytes(bytes, kind)?;
    store_parsed(writer, now_utc, owner, parsed)
}

/// File imports never deduplicate: every valid row becomes a new contact.
pub fn store_parsed<W>(
    writer: &W,
    now_utc: i64,
    owner: UserId,
    parsed: ParsedContacts,
) -> Result<ImportResult>
where
    W: ContactWriter + ?Sized,
{
    let total = parsed.contacts.len();
    let inserted = if parsed.contacts.is_empty() {
        0
    } else {
        let batch = parsed.contacts.into_iter().map(ContactNew::from).collect();
        writer.insert_batch(now_utc, owner, batch)?
    };
    if !parsed.errors.is_empty() {
        tracing::info!(
            inserted,
            errors = parsed.errors.len(),
            "import finished with rejected rows"
        );
    }
    Ok(ImportResult::completed(inserted, total, parsed.errors))
}

fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
