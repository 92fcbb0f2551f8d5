use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::util::{
    format_timestamp_datetime, normalize_optional_value, now_utc, parse_contact_id, parse_kind,
    parse_optional_contact_id, parse_status,
};
use anyhow::Result;
use clap::Args;
use rolodex_core::domain::{Contact, ContactKind};
use rolodex_core::dto::{ContactDetailDto, ContactListItemDto};
use rolodex_store::repo::{ContactNew, ContactUpdate};

#[derive(Debug, Args)]
pub struct AddContactArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub contact_person: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// individual (default) or company
    #[arg(long)]
    pub kind: Option<String>,
    /// Company this contact works for.
    #[arg(long, value_name = "ID")]
    pub parent: Option<String>,
}

/// Empty values clear optional fields.
#[derive(Debug, Args)]
pub struct EditContactArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub contact_person: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub kind: Option<String>,
    #[arg(long, value_name = "ID")]
    pub parent: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only staff of this company.
    #[arg(long, value_name = "ID")]
    pub parent: Option<String>,
}

#[derive(Debug, Args)]
pub struct StaffArgs {
    pub company_id: String,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub id: String,
}

pub fn add_contact(ctx: &Context<'_>, args: AddContactArgs) -> Result<()> {
    let kind = match args.kind.as_deref() {
        Some(raw) => parse_kind(raw)?,
        None => ContactKind::Individual,
    };
    let status = match args.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => Default::default(),
    };
    let parent_id = match args.parent.as_deref() {
        Some(raw) => Some(parse_contact_id(raw)?),
        None => None,
    };

    let contact = ctx.store.contacts().create(
        now_utc(),
        ctx.owner,
        ContactNew {
            external_id: None,
            kind,
            parent_id,
            name: args.name,
            email: args.email,
            phone: args.phone,
            company: args.company,
            location: args.location,
            category: args.category,
            website: args.website,
            contact_person: args.contact_person,
            notes: args.notes,
            status,
            external_data: None,
        },
    )?;

    if ctx.json {
        print_json(&contact)?;
    } else {
        println!("created {} {}", contact.id, contact.name);
    }
    Ok(())
}

pub fn edit_contact(ctx: &Context<'_>, args: EditContactArgs) -> Result<()> {
    let id = parse_contact_id(&args.id)?;

    let mut update = ContactUpdate::default();
    if let Some(name) = args.name {
        update.name = Some(name);
    }
    if let Some(kind) = args.kind {
        update.kind = Some(parse_kind(&kind)?);
    }
    if let Some(parent) = args.parent {
        update.parent_id = Some(parse_optional_contact_id(&parent)?);
    }
    if let Some(status) = args.status {
        update.status = Some(parse_status(&status)?);
    }
    update.email = args.email.map(normalize_optional_value);
    update.phone = args.phone.map(normalize_optional_value);
    update.company = args.company.map(normalize_optional_value);
    update.location = args.location.map(normalize_optional_value);
    update.category = args.category.map(normalize_optional_value);
    update.website = args.website.map(normalize_optional_value);
    update.contact_person = args.contact_person.map(normalize_optional_value);
    update.notes = args.notes.map(normalize_optional_value);

    if update_is_empty(&update) {
        return Err(invalid_input("no updates provided"));
    }

    let contact = ctx
        .store
        .contacts()
        .update(now_utc(), ctx.owner, id, update)?;
    if ctx.json {
        print_json(&contact)?;
    } else {
        println!("updated {} {}", contact.id, contact.name);
    }
    Ok(())
}

pub fn show_contact(ctx: &Context<'_>, args: ShowArgs) -> Result<()> {
    let id = parse_contact_id(&args.id)?;
    let contact = ctx
        .store
        .contacts()
        .get(ctx.owner, id)?
        .ok_or_else(|| not_found("contact not found"))?;

    let staff = if contact.is_company() {
        ctx.store
            .contacts()
            .list_children(ctx.owner, contact.id)?
            .iter()
            .map(ContactListItemDto::from)
            .collect()
    } else {
        Vec::new()
    };
    let detail = ContactDetailDto { contact, staff };

    if ctx.json {
        print_json(&detail)?;
        return Ok(());
    }

    let contact = &detail.contact;
    println!("id: {}", contact.id);
    println!("name: {}", contact.name);
    println!("kind: {}", contact.kind.as_str());
    println!("status: {}", contact.status.as_str());
    if let Some(parent) = contact.parent_id {
        println!("parent: {}", parent);
    }
    let optional = [
        ("external_id", &contact.external_id),
        ("email", &contact.email),
        ("phone", &contact.phone),
        ("company", &contact.company),
        ("location", &contact.location),
        ("category", &contact.category),
        ("website", &contact.website),
        ("contact_person", &contact.contact_person),
        ("notes", &contact.notes),
    ];
    for (label, value) in optional {
        if let Some(value) = value.as_deref() {
            println!("{label}: {value}");
        }
    }
    println!(
        "created_at: {}",
        format_timestamp_datetime(contact.created_at)
    );
    println!(
        "updated_at: {}",
        format_timestamp_datetime(contact.updated_at)
    );

    if contact.is_company() {
        if detail.staff.is_empty() {
            println!("staff: none");
        } else {
            println!("staff:");
            for item in &detail.staff {
                println!("  {}", list_line(item));
            }
        }
    }
    Ok(())
}

pub fn list_contacts(ctx: &Context<'_>, args: ListArgs) -> Result<()> {
    let contacts = match args.parent.as_deref() {
        Some(raw) => {
            let parent_id = parse_contact_id(raw)?;
            ctx.store.contacts().list_children(ctx.owner, parent_id)?
        }
        None => ctx.store.contacts().list(ctx.owner)?,
    };
    print_items(ctx, &contacts)
}

pub fn list_staff(ctx: &Context<'_>, args: StaffArgs) -> Result<()> {
    let id = parse_contact_id(&args.company_id)?;
    let company = ctx
        .store
        .contacts()
        .get(ctx.owner, id)?
        .ok_or_else(|| not_found("company not found"))?;
    if !company.is_company() {
        return Err(invalid_input(format!("contact {id} is not a company")));
    }
    let staff = ctx.store.contacts().list_children(ctx.owner, company.id)?;
    print_items(ctx, &staff)
}

pub fn delete_contact(ctx: &Context<'_>, args: DeleteArgs) -> Result<()> {
    let id = parse_contact_id(&args.id)?;
    ctx.store.contacts().delete(ctx.owner, id)?;
    if ctx.json {
        print_json(&serde_json::json!({ "id": id }))?;
    } else {
        println!("deleted {}", id);
    }
    Ok(())
}

fn print_items(ctx: &Context<'_>, contacts: &[Contact]) -> Result<()> {
    let items: Vec<ContactListItemDto> = contacts.iter().map(ContactListItemDto::from).collect();
    if ctx.json {
        print_json(&items)?;
        return Ok(());
    }

    if items.is_empty() {
        println!("no contacts");
        return Ok(());
    }
    for item in &items {
        println!("{}", list_line(item));
    }
    Ok(())
}

fn list_line(item: &ContactListItemDto) -> String {
    let mut line = format!(
        "{}  {}  [{}, {}]",
        item.id,
        item.name,
        item.kind.as_str(),
        item.status.as_str()
    );
    if let Some(email) = item.email.as_deref() {
        line.push_str("  ");
        line.push_str(email);
    }
    if let Some(company) = item.company.as_deref() {
        line.push_str(&format!("  @{company}"));
    }
    line
}

fn update_is_empty(update: &ContactUpdate) -> bool {
    update.name.is_none()
        && update.kind.is_none()
        && update.parent_id.is_none()
        && update.email.is_none()
        && update.phone.is_none()
        && update.company.is_none()
        && update.location.is_none()
        && update.category.is_none()
        && update.website.is_none()
        && update.contact_person.is_none()
        && update.notes.is_none()
        && update.status.is_none()
}
