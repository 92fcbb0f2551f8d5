use rolodex_core::domain::{ContactId, ContactKind, ContactStatus, UserId};
use rolodex_core::CoreError;
use rolodex_store::error::{StoreError, StoreErrorKind};
use rolodex_store::repo::{ContactNew, ContactUpdate};
use rolodex_store::Store;

const OWNER: UserId = UserId::new(1);
const OTHER: UserId = UserId::new(2);

fn store() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

fn person(name: &str) -> ContactNew {
    ContactNew {
        name: name.to_string(),
        ..Default::default()
    }
}

#[test]
fn contact_crud_roundtrip() {
    let store = store();
    let now = 1_700_000_000;

    let contact = store
        .contacts()
        .create(
            now,
            OWNER,
            ContactNew {
                name: " Ada Lovelace ".to_string(),
                email: Some(" ada@example.com ".to_string()),
                phone: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .expect("create contact");
    assert_eq!(contact.name, "Ada Lovelace");
    assert_eq!(contact.email.as_deref(), Some("ada@example.com"));
    assert!(contact.phone.is_none());
    assert_eq!(contact.status, ContactStatus::Prospect);
    assert_eq!(contact.kind, ContactKind::Individual);

    let fetched = store
        .contacts()
        .get(OWNER, contact.id)
        .expect("get contact")
        .expect("contact exists");
    assert_eq!(fetched, contact);

    let updated = store
        .contacts()
        .update(
            now + 10,
            OWNER,
            contact.id,
            ContactUpdate {
                name: Some("Ada Byron".to_string()),
                email: Some(None),
                status: Some(ContactStatus::Customer),
                notes: Some(Some("met at the salon".to_string())),
                ..Default::default()
            },
        )
        .expect("update contact");
    assert_eq!(updated.name, "Ada Byron");
    assert!(updated.email.is_none());
    assert_eq!(updated.status, ContactStatus::Customer);
    assert_eq!(updated.created_at, now);
    assert_eq!(updated.updated_at, now + 10);

    store.contacts().delete(OWNER, contact.id).expect("delete");
    assert!(store.contacts().get(OWNER, contact.id).expect("get").is_none());

    let err = store
        .contacts()
        .delete(OWNER, contact.id)
        .expect_err("missing contact");
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
}

#[test]
fn contacts_are_scoped_to_their_owner() {
    let store = store();
    let now = 1_700_000_000;
    let contact = store
        .contacts()
        .create(now, OWNER, person("Ada"))
        .expect("create");

    assert!(store.contacts().get(OTHER, contact.id).expect("get").is_none());
    assert!(store.contacts().list(OTHER).expect("list").is_empty());
    assert!(store.contacts().delete(OTHER, contact.id).is_err());
    assert_eq!(store.contacts().list(OWNER).expect("list").len(), 1);
}

#[test]
fn create_rejects_invalid_fields() {
    let store = store();
    let now = 1_700_000_000;

    let err = store
        .contacts()
        .create(now, OWNER, person("   "))
        .expect_err("blank name");
    assert!(matches!(err, StoreError::Core(CoreError::EmptyName)));

    let err = store
        .contacts()
        .create(
            now,
            OWNER,
            ContactNew {
                name: "Ada".to_string(),
                email: Some("not-an-email".to_string()),
                ..Default::default()
            },
        )
        .expect_err("invalid email");
    assert!(matches!(err, StoreError::Core(CoreError::InvalidEmail(_))));
}

#[test]
fn insert_batch_is_all_or_nothing() {
    let store = store();
    let now = 1_700_000_000;

    let inserted = store
        .contacts()
        .insert_batch(now, OWNER, vec![person("Ada"), person("Grace")])
        .expect("insert batch");
    assert_eq!(inserted, 2);

    let err = store
        .contacts()
        .insert_batch(now, OWNER, vec![person("Alan"), person(" ")])
        .expect_err("second row invalid");
    assert_eq!(err.kind(), StoreErrorKind::Core);
    assert_eq!(store.contacts().count(OWNER).expect("count"), 2);

    assert_eq!(
        store
            .contacts()
            .insert_batch(now, OWNER, Vec::new())
            .expect("empty batch"),
        0
    );
}

#[test]
fn staff_link_to_companies_of_the_same_owner() {
    let store = store();
    let now = 1_700_000_000;

    let company = store
        .contacts()
        .create(
            now,
            OWNER,
            ContactNew {
                name: "Analytical Engines".to_string(),
                kind: ContactKind::Company,
                ..Default::default()
            },
        )
        .expect("create company");
    let staff = store
        .contacts()
        .create(
            now,
            OWNER,
            ContactNew {
                name: "Ada".to_string(),
                parent_id: Some(company.id),
                ..Default::default()
            },
        )
        .expect("create staff");

    let children = store
        .contacts()
        .list_children(OWNER, company.id)
        .expect("children");
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, staff.id);

    let err = store
        .contacts()
        .create(
            now,
            OWNER,
            ContactNew {
                name: "Grace".to_string(),
                parent_id: Some(staff.id),
                ..Default::default()
            },
        )
        .expect_err("parent must be a company");
    assert_eq!(err.kind(), StoreErrorKind::InvalidParent);

    let err = store
        .contacts()
        .create(
            now,
            OTHER,
            ContactNew {
                name: "Mallory".to_string(),
                parent_id: Some(company.id),
                ..Default::default()
            },
        )
        .expect_err("parent owned by someone else");
    assert_eq!(err.kind(), StoreErrorKind::InvalidParent);

    let err = store
        .contacts()
        .create(
            now,
            OWNER,
            ContactNew {
                name: "Nobody".to_string(),
                parent_id: Some(ContactId::new(9_999)),
                ..Default::default()
            },
        )
        .expect_err("missing parent");
    assert_eq!(err.kind(), StoreErrorKind::InvalidParent);

    let err = store
        .contacts()
        .update(
            now + 1,
            OWNER,
            company.id,
            ContactUpdate {
                kind: Some(ContactKind::Individual),
                ..Default::default()
            },
        )
        .expect_err("company with staff cannot be demoted");
    assert_eq!(err.kind(), StoreErrorKind::InvalidParent);
}

#[test]
fn deleting_a_company_detaches_its_staff() {
    let store = store();
    let now = 1_700_000_000;

    let company = store
        .contacts()
        .create(
            now,
            OWNER,
            ContactNew {
                name: "Analytical Engines".to_string(),
                kind: ContactKind::Company,
                ..Default::default()
            },
        )
        .expect("create company");
    let staff = store
        .contacts()
        .create(
            now,
            OWNER,
            ContactNew {
                name: "Ada".to_string(),
                parent_id: Some(company.id),
                ..Default::default()
            },
        )
        .expect("create staff");

    store.contacts().delete(OWNER, company.id).expect("delete");
    let staff = store
        .contacts()
        .get(OWNER, staff.id)
        .expect("get")
        .expect("staff remains");
    assert!(staff.parent_id.is_none());
}

#[test]
fn find_by_email_ignores_case() {
    let store = store();
    let now = 1_700_000_000;
    let contact = store
        .contacts()
        .create(
            now,
            OWNER,
            ContactNew {
                name: "Ada".to_string(),
                email: Some("Ada@Example.com".to_string()),
                ..Default::default()
            },
        )
        .expect("create");

    let found = store
        .contacts()
        .find_by_email(OWNER, " ada@example.com ")
        .expect("find")
        .expect("match");
    assert_eq!(found.id, contact.id);
    assert!(store
        .contacts()
        .find_by_email(OTHER, "ada@example.com")
        .expect("find")
        .is_none());
}
