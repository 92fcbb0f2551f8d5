use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("name is required")]
    EmptyName,
    #[error("invalid email: {0}")]
    InvalidEmail(String),
    #[error("invalid contact status: {0}")]
    InvalidStatus(String),
    #[error("invalid contact type: {0}")]
    InvalidKind(String),
    #[error("company contacts cannot have a parent")]
    CompanyWithParent,
    #[error("contact cannot be its own parent")]
    SelfParent,
}
