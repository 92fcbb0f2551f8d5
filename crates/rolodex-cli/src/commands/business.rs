use crate::commands::{print_json, Context};
use crate::error::not_found;
use crate::util::{format_timestamp_datetime, parse_contact_id};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct BusinessArgs {
    /// Company contact created by a directory sync.
    pub contact_id: String,
}

pub fn show_business(ctx: &Context<'_>, args: BusinessArgs) -> Result<()> {
    let id = parse_contact_id(&args.contact_id)?;
    let business = ctx
        .store
        .external_businesses()
        .get_by_contact(ctx.owner, id)?
        .ok_or_else(|| not_found(format!("no directory business linked to contact {id}")))?;

    if ctx.json {
        return print_json(&business);
    }

    println!("business_id: {}", business.business_id);
    println!("name: {}", business.name);
    if let Some(category) = business.category.as_deref() {
        println!("category: {category}");
    }
    if let Some(status) = business.status.as_deref() {
        println!("status: {status}");
    }
    if let Some(owner) = business.owner_user_id.as_deref() {
        println!("owner_user_id: {owner}");
    }
    if let Some(users) = business.users.as_ref().and_then(|users| users.as_array()) {
        println!("users: {}", users.len());
    }
    if let Some(subscription) = business.subscription.as_ref() {
        println!("subscription: {subscription}");
    }
    println!(
        "created_at: {}",
        format_timestamp_datetime(business.created_at)
    );
    println!(
        "updated_at: {}",
        format_timestamp_datetime(business.updated_at)
    );
    Ok(())
}
