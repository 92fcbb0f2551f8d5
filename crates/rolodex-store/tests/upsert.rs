use rolodex_core::domain::{ContactKind, ContactStatus, UserId};
use rolodex_store::error::StoreErrorKind;
use rolodex_store::repo::{ContactNew, ContactUpsert, UpsertOutcome};
use rolodex_store::Store;
use serde_json::json;

const OWNER: UserId = UserId::new(1);

fn store() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

fn company(external_id: &str, status: ContactStatus) -> ContactUpsert {
    ContactUpsert {
        external_id: Some(external_id.to_string()),
        kind: Some(ContactKind::Company),
        name: "Bright Bakery".to_string(),
        email: Some("owner@bright.example".to_string()),
        company: Some("Bright Bakery".to_string()),
        location: Some("12 Main St".to_string()),
        category: Some("food".to_string()),
        status,
        external_data: Some(json!({"id": external_id, "status": "active"})),
        ..Default::default()
    }
}

#[test]
fn upsert_by_external_id_inserts_then_updates_in_place() {
    let store = store();
    let now = 1_700_000_000;

    let first = store
        .contacts()
        .upsert_by_external_id(now, OWNER, &company("biz-1", ContactStatus::Customer))
        .expect("insert");
    assert_eq!(first.outcome, UpsertOutcome::Created);
    assert_eq!(first.contact.kind, ContactKind::Company);

    let second = store
        .contacts()
        .upsert_by_external_id(now + 60, OWNER, &company("biz-1", ContactStatus::Lead))
        .expect("update");
    assert_eq!(second.outcome, UpsertOutcome::Updated);
    assert_eq!(second.contact.id, first.contact.id);
    assert_eq!(second.contact.status, ContactStatus::Lead);
    assert_eq!(second.contact.created_at, now);
    assert_eq!(second.contact.updated_at, now + 60);

    let mut expected = first.contact.clone();
    expected.status = ContactStatus::Lead;
    expected.updated_at = now + 60;
    assert_eq!(second.contact, expected);
    assert_eq!(store.contacts().count(OWNER).expect("count"), 1);
}

#[test]
fn unchanged_upsert_writes_nothing() {
    let store = store();
    let now = 1_700_000_000;
    let input = company("biz-1", ContactStatus::Customer);

    let first = store
        .contacts()
        .upsert_by_external_id(now, OWNER, &input)
        .expect("insert");
    let again = store
        .contacts()
        .upsert_by_external_id(now + 3_600, OWNER, &input)
        .expect("repeat");
    assert_eq!(again.outcome, UpsertOutcome::Unchanged);

    let stored = store
        .contacts()
        .get(OWNER, first.contact.id)
        .expect("get")
        .expect("exists");
    assert_eq!(stored, first.contact);
    assert_eq!(stored.updated_at, now);
}

#[test]
fn upsert_preserves_user_owned_fields() {
    let store = store();
    let now = 1_700_000_000;
    let first = store
        .contacts()
        .upsert_by_external_id(now, OWNER, &company("biz-1", ContactStatus::Customer))
        .expect("insert");

    store
        .contacts()
        .update(
            now + 1,
            OWNER,
            first.contact.id,
            rolodex_store::repo::ContactUpdate {
                notes: Some(Some("prefers mornings".to_string())),
                website: Some(Some("https://bright.example".to_string())),
                ..Default::default()
            },
        )
        .expect("manual edit");

    let mut changed = company("biz-1", ContactStatus::Customer);
    changed.kind = None;
    changed.phone = Some("555-0100".to_string());
    let updated = store
        .contacts()
        .upsert_by_external_id(now + 2, OWNER, &changed)
        .expect("update");
    assert_eq!(updated.outcome, UpsertOutcome::Updated);
    assert_eq!(updated.contact.kind, ContactKind::Company);
    assert_eq!(updated.contact.notes.as_deref(), Some("prefers mornings"));
    assert_eq!(
        updated.contact.website.as_deref(),
        Some("https://bright.example")
    );
    assert_eq!(updated.contact.phone.as_deref(), Some("555-0100"));
}

#[test]
fn upsert_by_email_matches_existing_contact_without_touching_email() {
    let store = store();
    let now = 1_700_000_000;
    let existing = store
        .contacts()
        .create(
            now,
            OWNER,
            ContactNew {
                name: "Ada".to_string(),
                email: Some("Ada@Example.com".to_string()),
                external_data: Some(json!({"source": "manual"})),
                ..Default::default()
            },
        )
        .expect("create");

    let upserted = store
        .contacts()
        .upsert_by_email(
            now + 5,
            OWNER,
            &ContactUpsert {
                name: "Ada Lovelace".to_string(),
                email: Some("ada@example.com".to_string()),
                status: ContactStatus::Lead,
                external_data: Some(json!({"source": "feed"})),
                ..Default::default()
            },
        )
        .expect("upsert by email");
    assert_eq!(upserted.outcome, UpsertOutcome::Updated);
    assert_eq!(upserted.contact.id, existing.id);
    assert_eq!(upserted.contact.name, "Ada Lovelace");
    assert_eq!(upserted.contact.email.as_deref(), Some("Ada@Example.com"));
    assert_eq!(upserted.contact.external_data, Some(json!({"source": "manual"})));

    let created = store
        .contacts()
        .upsert_by_email(
            now + 5,
            OWNER,
            &ContactUpsert {
                name: "Grace".to_string(),
                email: Some("grace@example.com".to_string()),
                ..Default::default()
            },
        )
        .expect("insert by email");
    assert_eq!(created.outcome, UpsertOutcome::Created);
    assert_eq!(store.contacts().count(OWNER).expect("count"), 2);
}

#[test]
fn upsert_requires_its_key() {
    let store = store();
    let now = 1_700_000_000;
    let mut input = company("biz-1", ContactStatus::Lead);
    input.external_id = None;
    let err = store
        .contacts()
        .upsert_by_external_id(now, OWNER, &input)
        .expect_err("no external id");
    assert_eq!(err.kind(), StoreErrorKind::MissingUpsertKey);

    input.email = Some("   ".to_string());
    let err = store
        .contacts()
        .upsert_by_email(now, OWNER, &input)
        .expect_err("no email");
    assert_eq!(err.kind(), StoreErrorKind::MissingUpsertKey);
}

#[test]
fn external_ids_are_unique_per_owner() {
    let store = store();
    let now = 1_700_000_000;
    let input = company("biz-1", ContactStatus::Lead);
    store
        .contacts()
        .upsert_by_external_id(now, OWNER, &input)
        .expect("owner one");
    let other = store
        .contacts()
        .upsert_by_external_id(now, UserId::new(2), &input)
        .expect("owner two");
    assert_eq!(other.outcome, UpsertOutcome::Created);

    let err = store
        .contacts()
        .create(
            now,
            OWNER,
            ContactNew {
                name: "Dup".to_string(),
                external_id: Some("biz-1".to_string()),
                ..Default::default()
            },
        )
        .expect_err("duplicate external id");
    assert_eq!(err.kind(), StoreErrorKind::Sql);
}
