pub mod directory;
pub mod error;
pub mod import;
pub mod reconcile;
pub mod sink;
pub mod source;

pub use error::{Result, SyncError};
pub use reconcile::{reconcile, sync_directory, SyncReport};
pub use sink::{upsert_contact, ContactWriter, MatchKey};
pub use source::DirectorySource;
