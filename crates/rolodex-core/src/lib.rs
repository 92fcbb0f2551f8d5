pub mod domain;
pub mod dto;
pub mod error;
pub mod import;

pub use domain::*;
pub use dto::*;
pub use error::CoreError;
pub use import::{
    normalize_column_name, validate_contact_row, ContactField, ParsedContact, RawContactRow,
    RowValidation,
};
