use crate::domain::{is_valid_email, ContactStatus};
use crate::import::columns::{normalize_column_name, ContactField};
use serde::{Deserialize, Serialize};

/// One spreadsheet row keyed by contact field, values untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawContactRow {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub website: Option<String>,
    pub contact_person: Option<String>,
}

impl RawContactRow {
    /// Builds a row from `(header, value)` cells. Headers that do not map to
    /// a contact field are dropped; a later column for the same field wins.
    pub fn from_cells<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut row = RawContactRow::default();
        for (header, value) in cells {
            if let Some(field) = normalize_column_name(header) {
                row.set(field, value.to_string());
            }
        }
        row
    }

    pub fn set(&mut self, field: ContactField, value: String) {
        let slot = match field {
            ContactField::Name => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Phone => &mut self.phone,
            ContactField::Company => &mut self.company,
            ContactField::Location => &mut self.location,
            ContactField::Category => &mut self.category,
            ContactField::Status => &mut self.status,
            ContactField::Notes => &mut self.notes,
            ContactField::Website => &mut self.website,
            ContactField::ContactPerson => &mut self.contact_person,
        };
        *slot = Some(value);
    }

    pub fn is_blank(&self) -> bool {
        [
            &self.name,
            &self.email,
            &self.phone,
            &self.company,
            &self.location,
            &self.category,
            &self.status,
            &self.notes,
            &self.website,
            &self.contact_person,
        ]
        .iter()
        .all(|value| value.as_deref().map_or(true, |raw| raw.trim().is_empty()))
    }
}

/// A validated import row, not yet owned by any user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedContact {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub status: ContactStatus,
    pub notes: Option<String>,
    pub website: Option<String>,
    pub contact_person: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowValidation {
    Valid(ParsedContact),
    Invalid(Vec<String>),
}

impl RowValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, RowValidation::Valid(_))
    }
}

/// Validates one row; `index` is zero-based and reported one-based.
pub fn validate_contact_row(row: &RawContactRow, index: usize) -> RowValidation {
    let row_number = index + 1;
    let mut errors = Vec::new();

    let name = trimmed(row.name.as_deref());
    if name.is_none() {
        errors.push(format!("Row {row_number}: Name is required"));
    }

    let email = trimmed(row.email.as_deref());
    if let Some(email) = email.as_deref() {
        if !is_valid_email(email) {
            let raw = row.email.as_deref().unwrap_or_default();
            errors.push(format!("Row {row_number}: Invalid email format: {raw}"));
        }
    }

    let mut status = ContactStatus::default();
    if let Some(raw) = trimmed(row.status.as_deref()) {
        match ContactStatus::parse(&raw) {
            Some(parsed) => status = parsed,
            None => errors.push(format!(
                "Row {row_number}: Invalid status \"{}\". Must be one of: {}",
                row.status.as_deref().unwrap_or_default(),
                ContactStatus::allowed_values()
            )),
        }
    }

    let Some(name) = name else {
        return RowValidation::Invalid(errors);
    };
    if !errors.is_empty() {
        return RowValidation::Invalid(errors);
    }

    RowValidation::Valid(ParsedContact {
        name,
        email,
        phone: trimmed(row.phone.as_deref()),
        company: trimmed(row.company.as_deref()),
        location: trimmed(row.location.as_deref()),
        category: trimmed(row.category.as_deref()),
        status,
        notes: trimmed(row.notes.as_deref()),
        website: trimmed(row.website.as_deref()),
        contact_person: trimmed(row.contact_person.as_deref()),
    })
}

fn trimmed(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_contact_row, RawContactRow, RowValidation};
    use crate::domain::ContactStatus;

    fn row(name: &str) -> RawContactRow {
        RawContactRow {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn expect_valid(validation: RowValidation) -> super::ParsedContact {
        match validation {
            RowValidation::Valid(contact) => contact,
            RowValidation::Invalid(errors) => panic!("expected valid row, got {errors:?}"),
        }
    }

    fn expect_invalid(validation: RowValidation) -> Vec<String> {
        match validation {
            RowValidation::Valid(contact) => panic!("expected invalid row, got {contact:?}"),
            RowValidation::Invalid(errors) => errors,
        }
    }

    #[test]
    fn blank_name_is_rejected_even_when_other_fields_are_valid() {
        let mut raw = row("   ");
        raw.email = Some("ada@example.com".to_string());
        raw.status = Some("lead".to_string());
        let errors = expect_invalid(validate_contact_row(&raw, 2));
        assert_eq!(errors, vec!["Row 3: Name is required".to_string()]);

        let missing = RawContactRow::default();
        assert!(!validate_contact_row(&missing, 0).is_valid());
    }

    #[test]
    fn email_format_is_checked() {
        let mut raw = row("Ada");
        raw.email = Some("not-an-email".to_string());
        let errors = expect_invalid(validate_contact_row(&raw, 0));
        assert_eq!(
            errors,
            vec!["Row 1: Invalid email format: not-an-email".to_string()]
        );

        raw.email = Some("a@b.co".to_string());
        let contact = expect_valid(validate_contact_row(&raw, 0));
        assert_eq!(contact.email.as_deref(), Some("a@b.co"));
    }

    #[test]
    fn status_is_case_insensitive_and_checked() {
        let mut raw = row("Ada");
        raw.status = Some("Lead".to_string());
        let contact = expect_valid(validate_contact_row(&raw, 0));
        assert_eq!(contact.status, ContactStatus::Lead);

        raw.status = Some("bogus".to_string());
        let errors = expect_invalid(validate_contact_row(&raw, 4));
        assert_eq!(
            errors,
            vec![
                "Row 5: Invalid status \"bogus\". Must be one of: prospect, lead, customer, inactive"
                    .to_string()
            ]
        );
    }

    #[test]
    fn whitespace_status_defaults_to_prospect() {
        let mut raw = row("Ada");
        raw.status = Some("   ".to_string());
        let contact = expect_valid(validate_contact_row(&raw, 0));
        assert_eq!(contact.status, ContactStatus::Prospect);
    }

    #[test]
    fn collects_every_error_for_the_row() {
        let raw = RawContactRow {
            email: Some("nope".to_string()),
            status: Some("bogus".to_string()),
            ..Default::default()
        };
        let errors = expect_invalid(validate_contact_row(&raw, 0));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn optional_fields_are_trimmed_and_blank_becomes_unset() {
        let raw = RawContactRow {
            name: Some("  Ada Lovelace ".to_string()),
            email: Some("   ".to_string()),
            phone: Some(" 555-1212 ".to_string()),
            company: Some("".to_string()),
            notes: Some(" met at conf ".to_string()),
            ..Default::default()
        };
        let contact = expect_valid(validate_contact_row(&raw, 0));
        assert_eq!(contact.name, "Ada Lovelace");
        assert!(contact.email.is_none());
        assert_eq!(contact.phone.as_deref(), Some("555-1212"));
        assert!(contact.company.is_none());
        assert!(contact.location.is_none());
        assert_eq!(contact.notes.as_deref(), Some("met at conf"));
        assert_eq!(contact.status, ContactStatus::Prospect);
    }

    #[test]
    fn from_cells_maps_headers_and_drops_unknown_columns() {
        let raw = RawContactRow::from_cells([
            ("Full Name", "Ada"),
            ("E-mail", "ada@example.com"),
            ("Favourite colour", "green"),
            ("Org", "Analytical Engines"),
        ]);
        assert_eq!(raw.name.as_deref(), Some("Ada"));
        assert_eq!(raw.email.as_deref(), Some("ada@example.com"));
        assert_eq!(raw.company.as_deref(), Some("Analytical Engines"));
        assert!(raw.notes.is_none());
    }

    #[test]
    fn blank_rows_are_detected() {
        let raw = RawContactRow::from_cells([("name", "  "), ("email", "")]);
        assert!(raw.is_blank());
        assert!(!row("Ada").is_blank());
    }
}
