use crate::error::{Result, StoreError};
use rolodex_core::domain::{
    normalize_email, Contact, ContactId, ContactKind, ContactStatus, UserId,
};
use rolodex_core::ParsedContact;
use rusqlite::{params, Connection, OptionalExtension, Row};

const CONTACT_COLUMNS: &str = "id, user_id, external_id, kind, parent_id, name, email, phone, company, location, category, website, contact_person, notes, status, external_data, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct ContactNew {
    pub external_id: Option<String>,
    pub kind: ContactKind,
    pub parent_id: Option<ContactId>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub website: Option<String>,
    pub contact_person: Option<String>,
    pub notes: Option<String>,
    pub status: ContactStatus,
    pub external_data: Option<serde_json::Value>,
}

impl From<ParsedContact> for ContactNew {
    fn from(parsed: ParsedContact) -> Self {
        Self {
            external_id: None,
            kind: ContactKind::Individual,
            parent_id: None,
            name: parsed.name,
            email: parsed.email,
            phone: parsed.phone,
            company: parsed.company,
            location: parsed.location,
            category: parsed.category,
            website: parsed.website,
            contact_person: parsed.contact_person,
            notes: parsed.notes,
            status: parsed.status,
            external_data: None,
        }
    }
}

/// Explicit edit. `Some(None)` clears a field, `None` leaves it alone.
#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub kind: Option<ContactKind>,
    pub parent_id: Option<Option<ContactId>>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub website: Option<Option<String>>,
    pub contact_person: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub status: Option<ContactStatus>,
}

/// Fields a keyed sync writes. `kind`, `parent_id` and `contact_person`
/// keep their stored value when absent here.
#[derive(Debug, Clone, Default)]
pub struct ContactUpsert {
    pub external_id: Option<String>,
    pub kind: Option<ContactKind>,
    pub parent_id: Option<ContactId>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub contact_person: Option<String>,
    pub status: ContactStatus,
    pub external_data: Option<serde_json::Value>,
}

impl ContactUpsert {
    pub fn to_new(&self) -> ContactNew {
        ContactNew {
            external_id: self.external_id.clone(),
            kind: self.kind.unwrap_or_default(),
            parent_id: self.parent_id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            category: self.category.clone(),
            website: None,
            contact_person: self.contact_person.clone(),
            notes: None,
            status: self.status,
            external_data: self.external_data.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct Upserted {
    pub contact: Contact,
    pub outcome: UpsertOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpsertKey {
    ExternalId,
    Email,
}

pub struct ContactsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ContactsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, owner: UserId, input: ContactNew) -> Result<Contact> {
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let contact = insert_inner(&tx, now_utc, owner, input)?;
            tx.commit()?;
            Ok(contact)
        } else {
            insert_inner(self.conn, now_utc, owner, input)
        }
    }

    /// Inserts every contact or none of them.
    pub fn insert_batch(
        &self,
        now_utc: i64,
        owner: UserId,
        contacts: Vec<ContactNew>,
    ) -> Result<usize> {
        if contacts.is_empty() {
            return Ok(0);
        }
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let inserted = insert_batch_inner(&tx, now_utc, owner, contacts)?;
            tx.commit()?;
            Ok(inserted)
        } else {
            insert_batch_inner(self.conn, now_utc, owner, contacts)
        }
    }

    pub fn get(&self, owner: UserId, id: ContactId) -> Result<Option<Contact>> {
        get_inner(self.conn, owner, id)
    }

    pub fn list(&self, owner: UserId) -> Result<Vec<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE user_id = ?1
             ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([owner.get()])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(contact_from_row(row)?);
        }
        Ok(contacts)
    }

    pub fn count(&self, owner: UserId) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM contacts WHERE user_id = ?1;",
            [owner.get()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Staff of a company.
    pub fn list_children(&self, owner: UserId, parent_id: ContactId) -> Result<Vec<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE user_id = ?1 AND parent_id = ?2
             ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![owner.get(), parent_id.get()])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(contact_from_row(row)?);
        }
        Ok(contacts)
    }

    pub fn find_by_external_id(&self, owner: UserId, external_id: &str) -> Result<Option<Contact>> {
        find_by_external_id_inner(self.conn, owner, external_id)
    }

    pub fn find_by_email(&self, owner: UserId, email: &str) -> Result<Option<Contact>> {
        find_by_email_inner(self.conn, owner, email)
    }

    pub fn update(
        &self,
        now_utc: i64,
        owner: UserId,
        id: ContactId,
        update: ContactUpdate,
    ) -> Result<Contact> {
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let contact = update_inner(&tx, now_utc, owner, id, update)?;
            tx.commit()?;
            Ok(contact)
        } else {
            update_inner(self.conn, now_utc, owner, id, update)
        }
    }

    pub fn delete(&self, owner: UserId, id: ContactId) -> Result<()> {
        let deleted = self.conn.execute(
            "DELETE FROM contacts WHERE id = ?1 AND user_id = ?2;",
            params![id.get(), owner.get()],
        )?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("contact {id}")));
        }
        Ok(())
    }

    pub fn upsert_by_external_id(
        &self,
        now_utc: i64,
        owner: UserId,
        input: &ContactUpsert,
    ) -> Result<Upserted> {
        self.upsert(now_utc, owner, input, UpsertKey::ExternalId)
    }

    /// Matches on (owner, email). Never rewrites the stored email or
    /// provenance of the matched contact.
    pub fn upsert_by_email(
        &self,
        now_utc: i64,
        owner: UserId,
        input: &ContactUpsert,
    ) -> Result<Upserted> {
        self.upsert(now_utc, owner, input, UpsertKey::Email)
    }

    fn upsert(
        &self,
        now_utc: i64,
        owner: UserId,
        input: &ContactUpsert,
        key: UpsertKey,
    ) -> Result<Upserted> {
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let upserted = upsert_inner(&tx, now_utc, owner, input, key)?;
            tx.commit()?;
            Ok(upserted)
        } else {
            upsert_inner(self.conn, now_utc, owner, input, key)
        }
    }
}

fn insert_inner(
    conn: &Connection,
    now_utc: i64,
    owner: UserId,
    input: ContactNew,
) -> Result<Contact> {
    let mut contact = Contact {
        // Placeholder until SQLite assigns the rowid.
        id: ContactId::new(0),
        user_id: owner,
        external_id: clean(input.external_id),
        kind: input.kind,
        parent_id: input.parent_id,
        name: input.name.trim().to_string(),
        email: input.email.and_then(|email| normalize_email(&email)),
        phone: clean(input.phone),
        company: clean(input.company),
        location: clean(input.location),
        category: clean(input.category),
        website: clean(input.website),
        contact_person: clean(input.contact_person),
        notes: clean(input.notes),
        status: input.status,
        external_data: input.external_data,
        created_at: now_utc,
        updated_at: now_utc,
    };

    contact.validate()?;
    ensure_parent(conn, owner, contact.parent_id)?;

    conn.execute(
        "INSERT INTO contacts (user_id, external_id, kind, parent_id, name, email, phone, company, location, category, website, contact_person, notes, status, external_data, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17);",
        params![
            owner.get(),
            contact.external_id,
            contact.kind.as_str(),
            contact.parent_id.map(ContactId::get),
            contact.name,
            contact.email,
            contact.phone,
            contact.company,
            contact.location,
            contact.category,
            contact.website,
            contact.contact_person,
            contact.notes,
            contact.status.as_str(),
            encode_json(contact.external_data.as_ref())?,
            contact.created_at,
            contact.updated_at,
        ],
    )?;

    contact.id = ContactId::new(conn.last_insert_rowid());
    Ok(contact)
}

fn insert_batch_inner(
    conn: &Connection,
    now_utc: i64,
    owner: UserId,
    contacts: Vec<ContactNew>,
) -> Result<usize> {
    let mut inserted = 0;
    for input in contacts {
        insert_inner(conn, now_utc, owner, input)?;
        inserted += 1;
    }
    Ok(inserted)
}

fn get_inner(conn: &Connection, owner: UserId, id: ContactId) -> Result<Option<Contact>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1 AND user_id = ?2;"
    ))?;
    let mut rows = stmt.query(params![id.get(), owner.get()])?;
    if let Some(row) = rows.next()? {
        Ok(Some(contact_from_row(row)?))
    } else {
        Ok(None)
    }
}

fn find_by_external_id_inner(
    conn: &Connection,
    owner: UserId,
    external_id: &str,
) -> Result<Option<Contact>> {
    let trimmed = external_id.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts
         WHERE user_id = ?1 AND external_id = ?2
         LIMIT 1;"
    ))?;
    let mut rows = stmt.query(params![owner.get(), trimmed])?;
    match rows.next()? {
        Some(row) => Ok(Some(contact_from_row(row)?)),
        None => Ok(None),
    }
}

fn find_by_email_inner(conn: &Connection, owner: UserId, email: &str) -> Result<Option<Contact>> {
    let Some(email) = normalize_email(email) else {
        return Ok(None);
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts
         WHERE user_id = ?1 AND email = ?2 COLLATE NOCASE
         ORDER BY id ASC
         LIMIT 1;"
    ))?;
    let mut rows = stmt.query(params![owner.get(), email])?;
    match rows.next()? {
        Some(row) => Ok(Some(contact_from_row(row)?)),
        None => Ok(None),
    }
}

fn update_inner(
    conn: &Connection,
    now_utc: i64,
    owner: UserId,
    id: ContactId,
    update: ContactUpdate,
) -> Result<Contact> {
    let mut contact = get_inner(conn, owner, id)?
        .ok_or_else(|| StoreError::NotFound(format!("contact {id}")))?;

    if let Some(name) = update.name {
        contact.name = name.trim().to_string();
    }
    if let Some(kind) = update.kind {
        contact.kind = kind;
    }
    if let Some(parent_id) = update.parent_id {
        contact.parent_id = parent_id;
    }
    if let Some(email) = update.email {
        contact.email = email.and_then(|value| normalize_email(&value));
    }
    if let Some(phone) = update.phone {
        contact.phone = clean(phone);
    }
    if let Some(company) = update.company {
        contact.company = clean(company);
    }
    if let Some(location) = update.location {
        contact.location = clean(location);
    }
    if let Some(category) = update.category {
        contact.category = clean(category);
    }
    if let Some(website) = update.website {
        contact.website = clean(website);
    }
    if let Some(contact_person) = update.contact_person {
        contact.contact_person = clean(contact_person);
    }
    if let Some(notes) = update.notes {
        contact.notes = clean(notes);
    }
    if let Some(status) = update.status {
        contact.status = status;
    }
    contact.updated_at = now_utc;

    contact.validate()?;
    ensure_parent(conn, owner, contact.parent_id)?;
    // Demoting a company would leave its staff pointing at an individual.
    if contact.kind == ContactKind::Individual && has_children(conn, owner, contact.id)? {
        return Err(StoreError::InvalidParent(format!(
            "contact {} still has staff and must remain a company",
            contact.id
        )));
    }

    write_contact(conn, &contact)?;
    Ok(contact)
}

fn upsert_inner(
    conn: &Connection,
    now_utc: i64,
    owner: UserId,
    input: &ContactUpsert,
    key: UpsertKey,
) -> Result<Upserted> {
    let existing = match key {
        UpsertKey::ExternalId => {
            let external_id = input
                .external_id
                .as_deref()
                .filter(|value| !value.trim().is_empty())
                .ok_or(StoreError::MissingUpsertKey("external id"))?;
            find_by_external_id_inner(conn, owner, external_id)?
        }
        UpsertKey::Email => {
            let email = input
                .email
                .as_deref()
                .and_then(normalize_email)
                .ok_or(StoreError::MissingUpsertKey("email"))?;
            find_by_email_inner(conn, owner, &email)?
        }
    };

    let Some(existing) = existing else {
        let contact = insert_inner(conn, now_utc, owner, input.to_new())?;
        return Ok(Upserted {
            contact,
            outcome: UpsertOutcome::Created,
        });
    };

    let mut merged = existing.clone();
    merged.name = input.name.trim().to_string();
    merged.phone = clean(input.phone.clone());
    merged.company = clean(input.company.clone());
    merged.location = clean(input.location.clone());
    merged.category = clean(input.category.clone());
    merged.status = input.status;
    if let Some(kind) = input.kind {
        merged.kind = kind;
    }
    if let Some(parent_id) = input.parent_id {
        merged.parent_id = Some(parent_id);
    }
    if let Some(contact_person) = clean(input.contact_person.clone()) {
        merged.contact_person = Some(contact_person);
    }
    if key == UpsertKey::ExternalId {
        merged.email = input.email.as_deref().and_then(normalize_email);
        merged.external_data = input.external_data.clone();
    }

    if merged == existing {
        return Ok(Upserted {
            contact: existing,
            outcome: UpsertOutcome::Unchanged,
        });
    }

    merged.updated_at = now_utc;
    merged.validate()?;
    ensure_parent(conn, owner, merged.parent_id)?;
    write_contact(conn, &merged)?;
    Ok(Upserted {
        contact: merged,
        outcome: UpsertOutcome::Updated,
    })
}

fn write_contact(conn: &Connection, contact: &Contact) -> Result<()> {
    conn.execute(
        "UPDATE contacts
         SET external_id = ?1,
             kind = ?2,
             parent_id = ?3,
             name = ?4,
             email = ?5,
             phone = ?6,
             company = ?7,
             location = ?8,
             category = ?9,
             website = ?10,
             contact_person = ?11,
             notes = ?12,
             status = ?13,
             external_data = ?14,
             updated_at = ?15
         WHERE id = ?16 AND user_id = ?17;",
        params![
            contact.external_id,
            contact.kind.as_str(),
            contact.parent_id.map(ContactId::get),
            contact.name,
            contact.email,
            contact.phone,
            contact.company,
            contact.location,
            contact.category,
            contact.website,
            contact.contact_person,
            contact.notes,
            contact.status.as_str(),
            encode_json(contact.external_data.as_ref())?,
            contact.updated_at,
            contact.id.get(),
            contact.user_id.get(),
        ],
    )?;
    Ok(())
}

fn ensure_parent(conn: &Connection, owner: UserId, parent_id: Option<ContactId>) -> Result<()> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };
    let kind: Option<String> = conn
        .query_row(
            "SELECT kind FROM contacts WHERE id = ?1 AND user_id = ?2;",
            params![parent_id.get(), owner.get()],
            |row| row.get(0),
        )
        .optional()?;
    match kind.as_deref().and_then(ContactKind::parse) {
        Some(ContactKind::Company) => Ok(()),
        Some(ContactKind::Individual) => Err(StoreError::InvalidParent(format!(
            "contact {parent_id} is not a company"
        ))),
        None => Err(StoreError::InvalidParent(format!(
            "contact {parent_id} not found"
        ))),
    }
}

fn has_children(conn: &Connection, owner: UserId, id: ContactId) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM contacts WHERE user_id = ?1 AND parent_id = ?2 LIMIT 1;",
            params![owner.get(), id.get()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn clean(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub(crate) fn encode_json(value: Option<&serde_json::Value>) -> Result<Option<String>> {
    value
        .map(serde_json::to_string)
        .transpose()
        .map_err(StoreError::from)
}

pub(crate) fn decode_json(raw: Option<String>) -> Result<Option<serde_json::Value>> {
    raw.map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(StoreError::from)
}

fn contact_from_row(row: &Row<'_>) -> Result<Contact> {
    let kind: String = row.get(3)?;
    let status: String = row.get(14)?;
    let parent_id: Option<i64> = row.get(4)?;

    Ok(Contact {
        id: ContactId::new(row.get(0)?),
        user_id: UserId::new(row.get(1)?),
        external_id: row.get(2)?,
        kind: ContactKind::parse(&kind).ok_or(StoreError::InvalidColumn {
            column: "kind",
            value: kind.clone(),
        })?,
        parent_id: parent_id.map(ContactId::new),
        name: row.get(5)?,
        email: row.get(6)?,
        phone: row.get(7)?,
        company: row.get(8)?,
        location: row.get(9)?,
        category: row.get(10)?,
        website: row.get(11)?,
        contact_person: row.get(12)?,
        notes: row.get(13)?,
        status: ContactStatus::parse(&status).ok_or(StoreError::InvalidColumn {
            column: "status",
            value: status.clone(),
        })?,
        external_data: decode_json(row.get(15)?)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}
