pub mod contacts;
pub mod external_businesses;

pub use contacts::{
    ContactNew, ContactUpdate, ContactUpsert, ContactsRepo, UpsertOutcome, Upserted,
};
pub use external_businesses::{ExternalBusiness, ExternalBusinessNew, ExternalBusinessesRepo};
