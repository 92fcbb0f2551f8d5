use crate::directory::{Business, Person, RawBusiness};
use crate::sink::{upsert_contact, ContactWriter};
use crate::source::DirectorySource;
use crate::Result;
use rolodex_core::domain::{is_valid_email, Contact, ContactKind, ContactStatus, UserId};
use rolodex_core::dto::SyncResult;
use rolodex_store::repo::{ContactUpsert, ExternalBusinessNew, UpsertOutcome};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub const UNKNOWN_STAFF_NAME: &str = "Unknown Staff";

/// What one reconciliation pass did. `count` is the number of businesses
/// received, whether or not they could be applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub count: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped_businesses: usize,
    pub skipped_staff: usize,
    pub warnings: Vec<String>,
}

impl SyncReport {
    pub fn into_result(self) -> SyncResult {
        SyncResult {
            success: true,
            count: self.count,
            created: self.created,
            updated: self.updated,
            unchanged: self.unchanged,
            skipped: self.skipped_businesses + self.skipped_staff,
        }
    }

    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.created += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }

    fn skip_business(&mut self, message: String) {
        warn!("{message}");
        self.skipped_businesses += 1;
        self.warnings.push(message);
    }

    fn skip_staff(&mut self, message: String) {
        warn!("{message}");
        self.skipped_staff += 1;
        self.warnings.push(message);
    }

    fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }
}

/// Fetches the directory and reconciles it. Only a failed fetch fails the
/// call; per-business problems end up in the report.
pub fn sync_directory<S, W>(
    source: &S,
    writer: &W,
    now_utc: i64,
    owner: UserId,
) -> Result<SyncReport>
where
    S: DirectorySource + ?Sized,
    W: ContactWriter + ?Sized,
{
    let businesses = source.fetch_businesses()?;
    info!(
        source = source.source_name(),
        businesses = businesses.len(),
        "fetched directory businesses"
    );
    Ok(reconcile(writer, now_utc, owner, &businesses))
}

/// Merges directory businesses into `owner`'s contacts: one company per
/// business, one individual per staff user with an email, linked to the
/// company, plus a snapshot of the business. Businesses are handled one at a
/// time and a failure in one never stops the rest. A staff user listed under
/// several businesses belongs to the first one that applied it.
pub fn reconcile<W>(
    writer: &W,
    now_utc: i64,
    owner: UserId,
    businesses: &[RawBusiness],
) -> SyncReport
where
    W: ContactWriter + ?Sized,
{
    let mut report = SyncReport {
        count: businesses.len(),
        ..SyncReport::default()
    };
    let mut seen_staff = HashSet::new();
    for raw in businesses {
        reconcile_business(writer, now_utc, owner, raw, &mut seen_staff, &mut report);
    }
    info!(
        count = report.count,
        created = report.created,
        updated = report.updated,
        unchanged = report.unchanged,
        skipped_businesses = report.skipped_businesses,
        skipped_staff = report.skipped_staff,
        "directory reconciliation finished"
    );
    report
}

fn reconcile_business<W>(
    writer: &W,
    now_utc: i64,
    owner: UserId,
    raw: &RawBusiness,
    seen_staff: &mut HashSet<String>,
    report: &mut SyncReport,
) where
    W: ContactWriter + ?Sized,
{
    let business = Business::from_raw(raw);
    let (Some(business_id), Some(name)) = (business.id.clone(), business.name.clone()) else {
        report.skip_business(format!(
            "skipping directory business without id or name (id: {})",
            raw.id.as_deref().unwrap_or("none")
        ));
        return;
    };
    let status = ContactStatus::from_business_status(business.status.as_deref());

    let email = match business.company_email() {
        Some(email) if is_valid_email(&email) => Some(email),
        Some(email) => {
            report.warn(format!(
                "business {business_id}: ignoring invalid email {email}"
            ));
            None
        }
        None => None,
    };
    let company_input = ContactUpsert {
        external_id: Some(business_id.clone()),
        kind: Some(ContactKind::Company),
        parent_id: None,
        name: name.clone(),
        email,
        phone: business.company_phone(),
        company: Some(name.clone()),
        location: business.address.clone(),
        category: business.category.clone(),
        contact_person: None,
        status,
        external_data: Some(business.raw.clone()),
    };
    let company = match upsert_contact(writer, now_utc, owner, &company_input) {
        Ok(upserted) => {
            debug!(business = %business_id, outcome = ?upserted.outcome, "company upserted");
            report.record(upserted.outcome);
            upserted.contact
        }
        Err(err) => {
            report.skip_business(format!("business {business_id}: company not synced: {err}"));
            return;
        }
    };

    for user in &business.users {
        if let Some(user_id) = user.id.as_deref() {
            if seen_staff.contains(user_id) {
                report.skip_staff(format!(
                    "staff {user_id} of {}: already synced under another business",
                    company.name
                ));
                continue;
            }
        }
        let applied = reconcile_staff(writer, now_utc, owner, &business, &company, user, report);
        if let (true, Some(user_id)) = (applied, user.id.clone()) {
            seen_staff.insert(user_id);
        }
    }

    let snapshot = ExternalBusinessNew {
        user_id: owner,
        business_id: business_id.clone(),
        contact_id: company.id,
        name,
        category: business.category.clone(),
        owner_user_id: business.owner_user_id(),
        status: business.status.clone(),
        subscription: business.subscription.clone(),
        contact_info: business.contact_raw.clone(),
        owner_info: business.snapshot_owner().map(|person| person.raw.clone()),
        users: business.users_raw(),
        created_at: business.created_at,
        updated_at: business.updated_at,
    };
    if let Err(err) = writer.upsert_external_business(now_utc, &snapshot) {
        report.warn(format!(
            "business {business_id}: snapshot not stored: {err}"
        ));
    }
}

/// Staff inherit the company's derived status. Returns whether the contact
/// was written.
fn reconcile_staff<W>(
    writer: &W,
    now_utc: i64,
    owner: UserId,
    business: &Business,
    company: &Contact,
    user: &Person,
    report: &mut SyncReport,
) -> bool
where
    W: ContactWriter + ?Sized,
{
    let label = user.id.as_deref().unwrap_or("without id");
    let Some(email) = user.email.clone() else {
        debug!(company = %company.id, user = label, "staff without email skipped");
        report.skipped_staff += 1;
        return false;
    };
    if !is_valid_email(&email) {
        report.skip_staff(format!(
            "staff {label} of {}: invalid email {email}",
            company.name
        ));
        return false;
    }

    let input = ContactUpsert {
        external_id: user.id.clone(),
        kind: Some(ContactKind::Individual),
        parent_id: Some(company.id),
        name: user
            .name
            .clone()
            .unwrap_or_else(|| UNKNOWN_STAFF_NAME.to_string()),
        email: Some(email),
        phone: user.phone.clone().or_else(|| business.contact_phone.clone()),
        company: Some(company.name.clone()),
        location: business.address.clone(),
        category: business.category.clone(),
        contact_person: user.role.clone(),
        status: company.status,
        external_data: Some(user.raw.clone()),
    };
    match upsert_contact(writer, now_utc, owner, &input) {
        Ok(upserted) => {
            debug!(company = %company.id, user = label, outcome = ?upserted.outcome, "staff upserted");
            report.record(upserted.outcome);
            true
        }
        Err(err) => {
            report.skip_staff(format!("staff {label} of {}: {err}", company.name));
            false
        }
    }
}
