use crate::error::Result;
use crate::repo::contacts::{decode_json, encode_json};
use rolodex_core::domain::{ContactId, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

const BUSINESS_COLUMNS: &str = "user_id, business_id, contact_id, name, category, owner_user_id, status, subscription, contact_info, owner_info, users, created_at, updated_at";

/// Denormalized copy of a directory business as last seen by a sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalBusiness {
    pub user_id: UserId,
    pub business_id: String,
    pub contact_id: Option<ContactId>,
    pub name: String,
    pub category: Option<String>,
    pub owner_user_id: Option<String>,
    pub status: Option<String>,
    pub subscription: Option<serde_json::Value>,
    pub contact_info: Option<serde_json::Value>,
    pub owner_info: Option<serde_json::Value>,
    pub users: Option<serde_json::Value>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct ExternalBusinessNew {
    pub user_id: UserId,
    pub business_id: String,
    pub contact_id: ContactId,
    pub name: String,
    pub category: Option<String>,
    pub owner_user_id: Option<String>,
    pub status: Option<String>,
    pub subscription: Option<serde_json::Value>,
    pub contact_info: Option<serde_json::Value>,
    pub owner_info: Option<serde_json::Value>,
    pub users: Option<serde_json::Value>,
    /// Vendor timestamps; `None` falls back to the sync time.
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

pub struct ExternalBusinessesRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ExternalBusinessesRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Keyed by (user, business id). `created_at` is only written on the
    /// first insert.
    pub fn upsert(&self, now_utc: i64, business: &ExternalBusinessNew) -> Result<()> {
        self.conn.execute(
            "INSERT INTO external_businesses
             (user_id, business_id, contact_id, name, category, owner_user_id, status, subscription, contact_info, owner_info, users, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(user_id, business_id) DO UPDATE SET
               contact_id = excluded.contact_id,
               name = excluded.name,
               category = excluded.category,
               owner_user_id = excluded.owner_user_id,
               status = excluded.status,
               subscription = excluded.subscription,
               contact_info = excluded.contact_info,
               owner_info = excluded.owner_info,
               users = excluded.users,
               updated_at = excluded.updated_at;",
            params![
                business.user_id.get(),
                business.business_id,
                business.contact_id.get(),
                business.name,
                business.category,
                business.owner_user_id,
                business.status,
                encode_json(business.subscription.as_ref())?,
                encode_json(business.contact_info.as_ref())?,
                encode_json(business.owner_info.as_ref())?,
                encode_json(business.users.as_ref())?,
                business.created_at.unwrap_or(now_utc),
                business.updated_at.unwrap_or(now_utc),
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, owner: UserId, business_id: &str) -> Result<Option<ExternalBusiness>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {BUSINESS_COLUMNS} FROM external_businesses
                     WHERE user_id = ?1 AND business_id = ?2;"
                ),
                params![owner.get(), business_id],
                raw_from_row,
            )
            .optional()?;
        row.map(RawBusinessRow::into_business).transpose()
    }

    pub fn get_by_contact(
        &self,
        owner: UserId,
        contact_id: ContactId,
    ) -> Result<Option<ExternalBusiness>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {BUSINESS_COLUMNS} FROM external_businesses
                     WHERE user_id = ?1 AND contact_id = ?2
                     LIMIT 1;"
                ),
                params![owner.get(), contact_id.get()],
                raw_from_row,
            )
            .optional()?;
        row.map(RawBusinessRow::into_business).transpose()
    }

    pub fn count(&self, owner: UserId) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM external_businesses WHERE user_id = ?1;",
            [owner.get()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

struct RawBusinessRow {
    user_id: i64,
    business_id: String,
    contact_id: Option<i64>,
    name: String,
    category: Option<String>,
    owner_user_id: Option<String>,
    status: Option<String>,
    subscription: Option<String>,
    contact_info: Option<String>,
    owner_info: Option<String>,
    users: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl RawBusinessRow {
    fn into_business(self) -> Result<ExternalBusiness> {
        Ok(ExternalBusiness {
            user_id: UserId::new(self.user_id),
            business_id: self.business_id,
            contact_id: self.contact_id.map(ContactId::new),
            name: self.name,
            category: self.category,
            owner_user_id: self.owner_user_id,
            status: self.status,
            subscription: decode_json(self.subscription)?,
            contact_info: decode_json(self.contact_info)?,
            owner_info: decode_json(self.owner_info)?,
            users: decode_json(self.users)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn raw_from_row(row: &Row<'_>) -> rusqlite::Result<RawBusinessRow> {
    Ok(RawBusinessRow {
        user_id: row.get(0)?,
        business_id: row.get(1)?,
        contact_id: row.get(2)?,
        name: row.get(3)?,
        category: row.get(4)?,
        owner_user_id: row.get(5)?,
        status: row.get(6)?,
        subscription: row.get(7)?,
        contact_info: row.get(8)?,
        owner_info: row.get(9)?,
        users: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}
