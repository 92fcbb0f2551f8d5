pub mod contact;
pub mod email;
pub mod ids;

pub use contact::{Contact, ContactKind, ContactStatus};
pub use email::{is_valid_email, normalize_email};
pub use ids::{ContactId, UserId};
