use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Company,
    Location,
    Category,
    Status,
    Notes,
    Website,
    ContactPerson,
}

impl ContactField {
    pub const fn as_str(self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Company => "company",
            ContactField::Location => "location",
            ContactField::Category => "category",
            ContactField::Status => "status",
            ContactField::Notes => "notes",
            ContactField::Website => "website",
            ContactField::ContactPerson => "contactPerson",
        }
    }

    pub const fn all() -> &'static [ContactField] {
        &[
            ContactField::Name,
            ContactField::Email,
            ContactField::Phone,
            ContactField::Company,
            ContactField::Location,
            ContactField::Category,
            ContactField::Status,
            ContactField::Notes,
            ContactField::Website,
            ContactField::ContactPerson,
        ]
    }
}

const COLUMN_SYNONYMS: &[(&str, ContactField)] = &[
    ("name", ContactField::Name),
    ("full name", ContactField::Name),
    ("contact name", ContactField::Name),
    ("person", ContactField::Name),
    ("business name", ContactField::Name),
    ("email", ContactField::Email),
    ("email address", ContactField::Email),
    ("e-mail", ContactField::Email),
    ("phone", ContactField::Phone),
    ("phone number", ContactField::Phone),
    ("telephone", ContactField::Phone),
    ("mobile", ContactField::Phone),
    ("company", ContactField::Company),
    ("company name", ContactField::Company),
    ("organization", ContactField::Company),
    ("org", ContactField::Company),
    ("business", ContactField::Company),
    ("location", ContactField::Location),
    ("address", ContactField::Location),
    ("city", ContactField::Location),
    ("category", ContactField::Category),
    ("type", ContactField::Category),
    ("business size", ContactField::Category),
    ("size", ContactField::Category),
    ("status", ContactField::Status),
    ("notes", ContactField::Notes),
    ("note", ContactField::Notes),
    ("comments", ContactField::Notes),
    ("description", ContactField::Notes),
    ("website", ContactField::Website),
    ("url", ContactField::Website),
    ("web", ContactField::Website),
    ("contact person", ContactField::ContactPerson),
    ("contact", ContactField::ContactPerson),
    ("contactperson", ContactField::ContactPerson),
];

/// Maps a spreadsheet header onto a contact field. Exact lookup after
/// trimming and lower-casing; anything else is left unmapped.
pub fn normalize_column_name(header: &str) -> Option<ContactField> {
    let normalized = header.trim().to_lowercase();
    COLUMN_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == normalized)
        .map(|(_, field)| *field)
}
