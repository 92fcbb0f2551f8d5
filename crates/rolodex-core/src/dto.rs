use crate::domain::{Contact, ContactId, ContactKind, ContactStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactListItemDto {
    pub id: ContactId,
    pub name: String,
    pub kind: ContactKind,
    pub status: ContactStatus,
    pub email: Option<String>,
    pub company: Option<String>,
    pub parent_id: Option<ContactId>,
}

impl From<&Contact> for ContactListItemDto {
    fn from(contact: &Contact) -> Self {
        Self {
            id: contact.id,
            name: contact.name.clone(),
            kind: contact.kind,
            status: contact.status,
            email: contact.email.clone(),
            company: contact.company.clone(),
            parent_id: contact.parent_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactDetailDto {
    #[serde(flatten)]
    pub contact: Contact,
    pub staff: Vec<ContactListItemDto>,
}

/// Outcome of a file import, shaped like the RPC response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    pub inserted: usize,
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ImportResult {
    pub fn completed(inserted: usize, total: usize, errors: Vec<String>) -> Self {
        Self {
            success: true,
            inserted,
            total,
            errors: if errors.is_empty() { None } else { Some(errors) },
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            inserted: 0,
            total: 0,
            errors: Some(vec![message.into()]),
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub success: bool,
    pub count: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

/// At most `limit` errors, followed by a summary line when truncated.
pub fn summarize_errors(errors: &[String], limit: usize) -> Vec<String> {
    let mut shown: Vec<String> = errors.iter().take(limit).cloned().collect();
    if errors.len() > limit {
        shown.push(format!("... and {} more errors", errors.len() - limit));
    }
    shown
}
