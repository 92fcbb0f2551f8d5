use crate::domain::email::is_valid_email;
use crate::domain::ids::{ContactId, UserId};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    #[default]
    Individual,
    Company,
}

impl ContactKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ContactKind::Individual => "individual",
            ContactKind::Company => "company",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "individual" => Some(ContactKind::Individual),
            "company" => Some(ContactKind::Company),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    Prospect,
    Lead,
    Customer,
    Inactive,
}

impl ContactStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            ContactStatus::Prospect => "prospect",
            ContactStatus::Lead => "lead",
            ContactStatus::Customer => "customer",
            ContactStatus::Inactive => "inactive",
        }
    }

    /// Case-insensitive, surrounding whitespace ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "prospect" => Some(ContactStatus::Prospect),
            "lead" => Some(ContactStatus::Lead),
            "customer" => Some(ContactStatus::Customer),
            "inactive" => Some(ContactStatus::Inactive),
            _ => None,
        }
    }

    pub const fn all() -> &'static [ContactStatus] {
        &[
            ContactStatus::Prospect,
            ContactStatus::Lead,
            ContactStatus::Customer,
            ContactStatus::Inactive,
        ]
    }

    /// Directory businesses that are `active` are paying customers; anything
    /// else is still a lead. Re-derived on every sync.
    pub fn from_business_status(status: Option<&str>) -> Self {
        match status {
            Some(value) if value.trim().eq_ignore_ascii_case("active") => ContactStatus::Customer,
            _ => ContactStatus::Lead,
        }
    }

    pub fn allowed_values() -> String {
        Self::all()
            .iter()
            .map(|status| status.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub user_id: UserId,
    pub external_id: Option<String>,
    pub kind: ContactKind,
    pub parent_id: Option<ContactId>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub website: Option<String>,
    pub contact_person: Option<String>,
    pub notes: Option<String>,
    pub status: ContactStatus,
    pub external_data: Option<serde_json::Value>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Contact {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::EmptyName);
        }

        if let Some(email) = self.email.as_deref() {
            if !is_valid_email(email) {
                return Err(CoreError::InvalidEmail(email.to_string()));
            }
        }

        if let Some(parent_id) = self.parent_id {
            if self.kind == ContactKind::Company {
                return Err(CoreError::CompanyWithParent);
            }
            if parent_id == self.id {
                return Err(CoreError::SelfParent);
            }
        }

        Ok(())
    }

    pub fn is_company(&self) -> bool {
        self.kind == ContactKind::Company
    }
}
