use crate::Result;
use rolodex_core::domain::{normalize_email, Contact, ContactId, UserId};
use rolodex_store::repo::{ContactNew, ContactUpsert, ExternalBusinessNew, UpsertOutcome, Upserted};
use rolodex_store::Store;

/// Persistence operations the importer and the reconciler rely on.
pub trait ContactWriter {
    fn upsert_by_external_id(
        &self,
        now_utc: i64,
        owner: UserId,
        contact: &ContactUpsert,
    ) -> Result<Upserted>;

    fn upsert_by_email_and_owner(
        &self,
        now_utc: i64,
        owner: UserId,
        contact: &ContactUpsert,
    ) -> Result<Upserted>;

    fn insert_contact(&self, now_utc: i64, owner: UserId, contact: ContactNew) -> Result<Contact>;

    /// All or nothing.
    fn insert_batch(&self, now_utc: i64, owner: UserId, contacts: Vec<ContactNew>)
        -> Result<usize>;

    fn find_children_by_parent(&self, owner: UserId, parent_id: ContactId) -> Result<Vec<Contact>>;

    fn upsert_external_business(&self, now_utc: i64, business: &ExternalBusinessNew) -> Result<()>;
}

impl ContactWriter for Store {
    fn upsert_by_external_id(
        &self,
        now_utc: i64,
        owner: UserId,
        contact: &ContactUpsert,
    ) -> Result<Upserted> {
        Ok(self.contacts().upsert_by_external_id(now_utc, owner, contact)?)
    }

    fn upsert_by_email_and_owner(
        &self,
        now_utc: i64,
        owner: UserId,
        contact: &ContactUpsert,
    ) -> Result<Upserted> {
        Ok(self.contacts().upsert_by_email(now_utc, owner, contact)?)
    }

    fn insert_contact(&self, now_utc: i64, owner: UserId, contact: ContactNew) -> Result<Contact> {
        Ok(self.contacts().create(now_utc, owner, contact)?)
    }

    fn insert_batch(
        &self,
        now_utc: i64,
        owner: UserId,
        contacts: Vec<ContactNew>,
    ) -> Result<usize> {
        Ok(self.contacts().insert_batch(now_utc, owner, contacts)?)
    }

    fn find_children_by_parent(&self, owner: UserId, parent_id: ContactId) -> Result<Vec<Contact>> {
        Ok(self.contacts().list_children(owner, parent_id)?)
    }

    fn upsert_external_business(&self, now_utc: i64, business: &ExternalBusinessNew) -> Result<()> {
        Ok(self.external_businesses().upsert(now_utc, business)?)
    }
}

/// Keys used to find an existing contact for an incoming record, in
/// priority order. The first key that applies decides the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKey {
    ExternalId,
    EmailWithoutExternalId,
}

pub const MATCH_PRIORITY: [MatchKey; 2] = [MatchKey::ExternalId, MatchKey::EmailWithoutExternalId];

impl MatchKey {
    pub fn applies(self, contact: &ContactUpsert) -> bool {
        let has_external_id = contact
            .external_id
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty());
        match self {
            MatchKey::ExternalId => has_external_id,
            MatchKey::EmailWithoutExternalId => {
                !has_external_id && contact.email.as_deref().and_then(normalize_email).is_some()
            }
        }
    }
}

pub fn match_key_for(contact: &ContactUpsert) -> Option<MatchKey> {
    MATCH_PRIORITY
        .into_iter()
        .find(|key| key.applies(contact))
}

/// Upserts through the first applicable [`MatchKey`]; with no usable key the
/// record is inserted as a new contact.
pub fn upsert_contact<W>(
    writer: &W,
    now_utc: i64,
    owner: UserId,
    contact: &ContactUpsert,
) -> Result<Upserted>
where
    W: ContactWriter + ?Sized,
{
    match match_key_for(contact) {
        Some(MatchKey::ExternalId) => writer.upsert_by_external_id(now_utc, owner, contact),
        Some(MatchKey::EmailWithoutExternalId) => {
            writer.upsert_by_email_and_owner(now_utc, owner, contact)
        }
        None => {
            let created = writer.insert_contact(now_utc, owner, contact.to_new())?;
            Ok(Upserted {
                contact: created,
                outcome: UpsertOutcome::Created,
            })
        }
    }
}
