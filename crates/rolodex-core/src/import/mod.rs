pub mod columns;
pub mod row;

pub use columns::{normalize_column_name, ContactField};
pub use row::{validate_contact_row, ParsedContact, RawContactRow, RowValidation};
