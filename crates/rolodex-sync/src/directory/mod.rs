//! The remote business directory feed: a loosely typed wire model and the
//! normalized view the reconciler works from.

mod client;
mod file;

pub use client::HttpDirectorySource;
pub use file::FileDirectorySource;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// One business exactly as the directory sent it. Fields are read leniently
/// (ids may be numbers or strings, anything may be missing); the untouched
/// JSON is kept for provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBusiness {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub owner: Option<RawPerson>,
    pub contact: Option<RawContactInfo>,
    pub users: Vec<RawPerson>,
    pub subscription: Option<Value>,
    pub created_date: Option<String>,
    pub modified_date: Option<String>,
    pub raw: Value,
}

/// A staff user or the business owner object.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPerson {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub user_type: Option<String>,
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub raw: Value,
}

/// Response body of the directory listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryEnvelope {
    #[serde(default)]
    pub businesses: Vec<RawBusiness>,
}

impl RawBusiness {
    pub fn from_value(raw: Value) -> Self {
        let users = match raw.get("users") {
            Some(Value::Array(items)) => items
                .iter()
                .filter(|item| item.is_object())
                .cloned()
                .map(RawPerson::from_value)
                .collect(),
            _ => Vec::new(),
        };
        Self {
            id: text_field(&raw, "id"),
            name: text_field(&raw, "name"),
            category: text_field(&raw, "category"),
            status: text_field(&raw, "status"),
            owner: object_field(&raw, "owner").map(RawPerson::from_value),
            contact: object_field(&raw, "contact").map(RawContactInfo::from_value),
            users,
            subscription: raw.get("subscription").filter(|value| !value.is_null()).cloned(),
            created_date: text_field(&raw, "createdDate"),
            modified_date: text_field(&raw, "modifiedDate"),
            raw,
        }
    }
}

impl RawPerson {
    pub fn from_value(raw: Value) -> Self {
        Self {
            id: text_field(&raw, "id"),
            name: text_field(&raw, "name"),
            email: text_field(&raw, "email"),
            phone: text_field(&raw, "phone"),
            role: text_field(&raw, "role"),
            user_type: text_field(&raw, "userType"),
            raw,
        }
    }
}

impl RawContactInfo {
    pub fn from_value(raw: Value) -> Self {
        Self {
            email: text_field(&raw, "email"),
            phone: text_field(&raw, "phone"),
            address: text_field(&raw, "address"),
            raw,
        }
    }
}

impl<'de> Deserialize<'de> for RawBusiness {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(RawBusiness::from_value)
    }
}

impl Serialize for RawBusiness {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn object_field(value: &Value, key: &str) -> Option<Value> {
    value.get(key).filter(|field| field.is_object()).cloned()
}

/// Placeholder values the directory uses for "no data".
const SENTINELS: &[&str] = &["unknown", "n/a"];

/// Trims and drops empty strings and placeholder values.
pub fn normalize_value(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty()
        || SENTINELS
            .iter()
            .any(|sentinel| trimmed.eq_ignore_ascii_case(sentinel))
    {
        return None;
    }
    Some(trimmed.to_string())
}

/// A directory business with placeholders removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Business {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub owner: Option<Person>,
    pub users: Vec<Person>,
    pub subscription: Option<Value>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub raw: Value,
    pub contact_raw: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub user_type: Option<String>,
    pub raw: Value,
}

impl Person {
    fn from_raw(raw: &RawPerson) -> Self {
        Self {
            id: normalize_value(raw.id.as_deref()),
            name: normalize_value(raw.name.as_deref()),
            email: normalize_value(raw.email.as_deref()),
            phone: normalize_value(raw.phone.as_deref()),
            role: normalize_value(raw.role.as_deref()),
            user_type: normalize_value(raw.user_type.as_deref()),
            raw: raw.raw.clone(),
        }
    }
}

impl Business {
    pub fn from_raw(raw: &RawBusiness) -> Self {
        let contact = raw.contact.as_ref();
        Self {
            id: normalize_value(raw.id.as_deref()),
            name: normalize_value(raw.name.as_deref()),
            category: normalize_value(raw.category.as_deref()),
            status: raw.status.clone(),
            address: normalize_value(contact.and_then(|info| info.address.as_deref())),
            contact_email: normalize_value(contact.and_then(|info| info.email.as_deref())),
            contact_phone: normalize_value(contact.and_then(|info| info.phone.as_deref())),
            owner: raw.owner.as_ref().map(Person::from_raw),
            users: raw.users.iter().map(Person::from_raw).collect(),
            subscription: raw.subscription.clone(),
            created_at: parse_timestamp(raw.created_date.as_deref()),
            updated_at: parse_timestamp(raw.modified_date.as_deref()),
            raw: raw.raw.clone(),
            contact_raw: contact.map(|info| info.raw.clone()),
        }
    }

    /// Staff flagged as the business owner, else the first admin, else the
    /// business's own owner record.
    pub fn best_owner(&self) -> Option<&Person> {
        self.users
            .iter()
            .find(|user| user.user_type.as_deref() == Some("business_owner"))
            .or_else(|| {
                self.users.iter().find(|user| {
                    user.role
                        .as_deref()
                        .is_some_and(|role| role.eq_ignore_ascii_case("admin"))
                })
            })
            .or(self.owner.as_ref())
    }

    pub fn company_email(&self) -> Option<String> {
        self.best_owner()
            .and_then(|owner| owner.email.clone())
            .or_else(|| self.contact_email.clone())
    }

    pub fn company_phone(&self) -> Option<String> {
        self.best_owner()
            .and_then(|owner| owner.phone.clone())
            .or_else(|| self.contact_phone.clone())
    }

    /// The owner record kept on the snapshot: the business's owner when it
    /// carries a name, otherwise the best owner.
    pub fn snapshot_owner(&self) -> Option<&Person> {
        match self.owner.as_ref() {
            Some(owner) if owner.name.is_some() => Some(owner),
            _ => self.best_owner(),
        }
    }

    pub fn owner_user_id(&self) -> Option<String> {
        self.owner
            .as_ref()
            .and_then(|owner| owner.id.clone())
            .or_else(|| self.best_owner().and_then(|owner| owner.id.clone()))
    }

    pub fn users_raw(&self) -> Option<Value> {
        self.raw.get("users").filter(|value| !value.is_null()).cloned()
    }
}

/// RFC 3339 first; ISO date-times without an offset and bare dates are
/// read as UTC.
fn parse_timestamp(value: Option<&str>) -> Option<i64> {
    let value = value?.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.timestamp());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::{normalize_value, Business, DirectoryEnvelope, RawBusiness};
    use serde_json::json;

    fn business(value: serde_json::Value) -> Business {
        Business::from_raw(&RawBusiness::from_value(value))
    }

    #[test]
    fn sentinels_normalize_to_none() {
        assert_eq!(normalize_value(Some("Unknown")), None);
        assert_eq!(normalize_value(Some(" n/a ")), None);
        assert_eq!(normalize_value(Some("")), None);
        assert_eq!(normalize_value(None), None);
        assert_eq!(normalize_value(Some(" Bea ")), Some("Bea".to_string()));
    }

    #[test]
    fn ids_may_be_numbers() {
        let raw = RawBusiness::from_value(json!({
            "id": 42,
            "name": "Bright Bakery",
            "users": [{"id": 7, "email": "bea@bright.example"}, "junk"]
        }));
        assert_eq!(raw.id.as_deref(), Some("42"));
        assert_eq!(raw.users.len(), 1);
        assert_eq!(raw.users[0].id.as_deref(), Some("7"));
    }

    #[test]
    fn envelope_keeps_raw_json() {
        let envelope: DirectoryEnvelope = serde_json::from_value(json!({
            "businesses": [{"id": "b-1", "name": "Bright", "extra": {"nested": true}}]
        }))
        .expect("envelope");
        assert_eq!(envelope.businesses.len(), 1);
        assert_eq!(envelope.businesses[0].raw["extra"]["nested"], json!(true));
    }

    #[test]
    fn best_owner_prefers_business_owner_then_admin_then_owner() {
        let with_flagged = business(json!({
            "id": "b-1",
            "users": [
                {"id": "u-1", "role": "Admin", "email": "admin@x.example"},
                {"id": "u-2", "userType": "business_owner", "email": "owner@x.example"}
            ],
            "owner": {"id": "o-1", "email": "fallback@x.example"}
        }));
        assert_eq!(
            with_flagged.best_owner().and_then(|owner| owner.id.as_deref()),
            Some("u-2")
        );

        let with_admin = business(json!({
            "id": "b-1",
            "users": [{"id": "u-3", "role": "staff"}, {"id": "u-1", "role": "ADMIN"}],
            "owner": {"id": "o-1"}
        }));
        assert_eq!(
            with_admin.best_owner().and_then(|owner| owner.id.as_deref()),
            Some("u-1")
        );

        let owner_only = business(json!({"id": "b-1", "owner": {"id": "o-1"}}));
        assert_eq!(
            owner_only.best_owner().and_then(|owner| owner.id.as_deref()),
            Some("o-1")
        );
        assert!(business(json!({"id": "b-1"})).best_owner().is_none());
    }

    #[test]
    fn company_contact_falls_back_to_contact_block() {
        let biz = business(json!({
            "id": "b-1",
            "users": [{"id": "u-1", "userType": "business_owner", "email": "N/A", "phone": "555-0100"}],
            "contact": {"email": "hello@bright.example", "phone": "555-0199", "address": "Unknown"}
        }));
        assert_eq!(biz.company_email().as_deref(), Some("hello@bright.example"));
        assert_eq!(biz.company_phone().as_deref(), Some("555-0100"));
        assert_eq!(biz.address, None);
    }

    #[test]
    fn snapshot_owner_needs_a_name() {
        let biz = business(json!({
            "id": "b-1",
            "users": [{"id": "u-1", "role": "admin", "name": "Bea"}],
            "owner": {"id": "o-1", "name": "Unknown"}
        }));
        assert_eq!(
            biz.snapshot_owner().and_then(|owner| owner.id.as_deref()),
            Some("u-1")
        );
        assert_eq!(biz.owner_user_id().as_deref(), Some("o-1"));
    }

    #[test]
    fn vendor_dates_parse_as_rfc3339() {
        let biz = business(json!({
            "id": "b-1",
            "createdDate": "2024-01-02T03:04:05Z",
            "modifiedDate": "not a date"
        }));
        assert_eq!(biz.created_at, Some(1_704_164_645));
        assert_eq!(biz.updated_at, None);
    }

    #[test]
    fn vendor_dates_without_offset_read_as_utc() {
        let biz = business(json!({
            "id": "b-1",
            "createdDate": "2024-01-02T03:04:05.000",
            "modifiedDate": "2024-01-02"
        }));
        assert_eq!(biz.created_at, Some(1_704_164_645));
        assert_eq!(biz.updated_at, Some(1_704_153_600));
    }
}
