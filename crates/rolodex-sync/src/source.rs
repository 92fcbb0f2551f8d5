use crate::directory::RawBusiness;
use crate::Result;

/// Where the remote business directory comes from.
pub trait DirectorySource {
    fn source_name(&self) -> &'static str;
    fn fetch_businesses(&self) -> Result<Vec<RawBusiness>>;
}
