use super::{DirectoryEnvelope, RawBusiness};
use crate::source::DirectorySource;
use crate::{Result, SyncError};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Reads a directory export from disk: either the API envelope
/// `{"businesses": [...]}` or a bare array of businesses.
#[derive(Debug, Clone)]
pub struct FileDirectorySource {
    path: PathBuf,
}

impl FileDirectorySource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DirectorySource for FileDirectorySource {
    fn source_name(&self) -> &'static str {
        "directory-file"
    }

    fn fetch_businesses(&self) -> Result<Vec<RawBusiness>> {
        let text = fs::read_to_string(&self.path)?;
        parse_feed(&text)
    }
}

pub(crate) fn parse_feed(text: &str) -> Result<Vec<RawBusiness>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => Ok(items.into_iter().map(RawBusiness::from_value).collect()),
        value @ Value::Object(_) => {
            let envelope: DirectoryEnvelope = serde_json::from_value(value)?;
            Ok(envelope.businesses)
        }
        _ => Err(SyncError::Parse(
            "directory feed must be an object with `businesses` or an array".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_feed, FileDirectorySource};
    use crate::source::DirectorySource;
    use crate::SyncError;
    use std::fs;

    #[test]
    fn accepts_envelope_and_bare_array() {
        let envelope = parse_feed(r#"{"businesses":[{"id":"b-1"},{"id":"b-2"}]}"#).expect("envelope");
        assert_eq!(envelope.len(), 2);
        let bare = parse_feed(r#"[{"id":"b-1"}]"#).expect("array");
        assert_eq!(bare[0].id.as_deref(), Some("b-1"));
        let empty = parse_feed("{}").expect("empty envelope");
        assert!(empty.is_empty());
    }

    #[test]
    fn rejects_scalars() {
        let err = parse_feed("42").expect_err("scalar");
        assert!(matches!(err, SyncError::Parse(_)));
    }

    #[test]
    fn reads_feed_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("feed.json");
        fs::write(&path, r#"{"businesses":[{"id":"b-1","name":"Bright"}]}"#).expect("write");
        let source = FileDirectorySource::new(path);
        let businesses = source.fetch_businesses().expect("fetch");
        assert_eq!(businesses[0].name.as_deref(), Some("Bright"));
    }
}
