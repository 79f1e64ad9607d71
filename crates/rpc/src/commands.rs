//! CLI commands - one session per invocation
//!
//! Every authenticated command logs in, acts under the issued session's
//! actor, and logs out again, so the session lifecycle is visible end to
//! end instead of living in ambient state.

use crate::context::AppContext;
use grantflow_aml::Severity;
use grantflow_core::{Amount, Currency, GrantId, ItemId, RequestId, Role};
use grantflow_registry::Session;
use rust_decimal::Decimal;
use std::path::Path;

/// Credentials of the acting account.
pub struct Login<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

fn open_session(ctx: &AppContext, login: &Login) -> Result<Session, anyhow::Error> {
    Ok(ctx.registry.authenticate(login.email, login.password)?)
}

fn print_json(value: &impl serde::Serialize) -> Result<(), anyhow::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Register a new account
pub fn signup(
    ctx: &AppContext,
    email: &str,
    full_name: &str,
    role: Role,
    password: &str,
) -> Result<(), anyhow::Error> {
    let actor = ctx.registry.register(email, full_name, role, password)?;
    println!("Registered {} ({}) with id {}", actor.email, actor.role, actor.id);
    Ok(())
}

/// List registered universities (grant targets)
pub fn universities(ctx: &AppContext) -> Result<(), anyhow::Error> {
    print_json(&ctx.registry.list_by_role(Role::University)?)
}

/// List registered grantees (assignment targets)
pub fn grantees(ctx: &AppContext) -> Result<(), anyhow::Error> {
    print_json(&ctx.registry.list_by_role(Role::Grantee)?)
}

/// Create a grant (government)
pub fn create_grant(
    ctx: &AppContext,
    login: &Login,
    title: &str,
    description: &str,
    amount: Decimal,
    currency: &Currency,
    university_id: i64,
) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let result = ctx.ledger.create_grant(
        &session.actor,
        title,
        description,
        Amount::new(amount)?,
        currency,
        university_id,
    );
    ctx.registry.logout(&session.token);

    let grant = result?;
    println!("Created grant {} ({} {})", grant.id, grant.total_amount, grant.currency);
    Ok(())
}

/// List grants visible to the acting account
pub fn list_grants(ctx: &AppContext, login: &Login) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let result = ctx.ledger.list_grants(&session.actor);
    ctx.registry.logout(&session.token);
    print_json(&result?)
}

/// Show a grant with its items, requests and remaining budget
pub fn show_grant(ctx: &AppContext, login: &Login, grant_id: GrantId) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let detail = ctx.ledger.grant_detail(&session.actor, grant_id);
    let remaining = ctx.ledger.remaining_budget(&session.actor, grant_id);
    ctx.registry.logout(&session.token);

    let detail = detail?;
    print_json(&detail.grant)?;
    println!("Remaining budget: {}", remaining?);
    println!("Items: {}", detail.spending_items.len());
    print_json(&detail.spending_items)?;
    println!("Requests: {}", detail.spending_requests.len());
    print_json(&detail.spending_requests)
}

/// Assign the grantee of a grant (university)
pub fn assign_grantee(
    ctx: &AppContext,
    login: &Login,
    grant_id: GrantId,
    grantee_id: i64,
) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let result = ctx.ledger.assign_grantee(&session.actor, grant_id, grantee_id);
    ctx.registry.logout(&session.token);

    let grant = result?;
    println!("Grant {} assigned to grantee {}", grant.id, grantee_id);
    Ok(())
}

/// Add a spending item (grantee)
pub fn add_item(
    ctx: &AppContext,
    login: &Login,
    grant_id: GrantId,
    title: &str,
    description: &str,
    amount: Decimal,
) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let result = ctx.catalog.add_item(
        &session.actor,
        grant_id,
        title,
        description,
        Amount::new(amount)?,
    );
    ctx.registry.logout(&session.token);

    let item = result?;
    println!("Added item {} ({})", item.id, item.amount);
    Ok(())
}

/// Bulk-import spending items from a CSV file (government)
pub fn import_items(
    ctx: &AppContext,
    login: &Login,
    grant_id: GrantId,
    file: &Path,
) -> Result<(), anyhow::Error> {
    let data = std::fs::read(file)?;
    let session = open_session(ctx, login)?;
    let result = ctx.catalog.bulk_import(&session.actor, grant_id, &data);
    ctx.registry.logout(&session.token);

    let outcome = result?;
    println!(
        "Imported {} items, skipped {} invalid rows",
        outcome.created, outcome.skipped
    );
    Ok(())
}

/// List a grant's spending items
pub fn list_items(ctx: &AppContext, login: &Login, grant_id: GrantId) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let result = ctx.catalog.list_items(&session.actor, grant_id);
    ctx.registry.logout(&session.token);
    print_json(&result?)
}

/// Attach a receipt URL to a spending item (grantee)
pub fn item_receipt(
    ctx: &AppContext,
    login: &Login,
    item_id: ItemId,
    url: &str,
) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let result = ctx.catalog.attach_item_receipt(&session.actor, item_id, url);
    ctx.registry.logout(&session.token);

    let item = result?;
    println!("Receipt attached to item {}", item.id);
    Ok(())
}

/// Create a spending request (grantee)
pub fn create_request(
    ctx: &AppContext,
    login: &Login,
    grant_id: GrantId,
    item_id: ItemId,
    amount: Decimal,
) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let result = ctx.engine.create_request(
        &session.actor,
        grant_id,
        item_id,
        Amount::new(amount)?,
    );
    ctx.registry.logout(&session.token);

    let request = result?;
    println!("Created request {} ({}, {})", request.id, request.amount, request.status);
    Ok(())
}

/// List requests visible to the acting account
pub fn list_requests(ctx: &AppContext, login: &Login) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let result = ctx.engine.list_requests(&session.actor);
    ctx.registry.logout(&session.token);
    print_json(&result?)
}

/// Show one request
pub fn show_request(
    ctx: &AppContext,
    login: &Login,
    request_id: RequestId,
) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let result = ctx.engine.get_request(&session.actor, request_id);
    ctx.registry.logout(&session.token);
    print_json(&result?)
}

/// Approve a batch of exactly three pending requests (university)
pub fn approve_batch(
    ctx: &AppContext,
    login: &Login,
    request_ids: &[RequestId],
) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let result = ctx.engine.approve_batch(&session.actor, request_ids);
    ctx.registry.logout(&session.token);

    let updated = result?;
    for request in &updated {
        println!("Request {} -> {}", request.id, request.status);
    }
    Ok(())
}

/// Reject a pending request (university)
pub fn reject(ctx: &AppContext, login: &Login, request_id: RequestId) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let result = ctx.engine.reject(&session.actor, request_id);
    ctx.registry.logout(&session.token);

    let request = result?;
    println!("Request {} -> {}", request.id, request.status);
    Ok(())
}

/// Attach a receipt URL to a request (grantee)
pub fn attach_receipt(
    ctx: &AppContext,
    login: &Login,
    request_id: RequestId,
    url: &str,
) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let result = ctx.engine.attach_receipt(&session.actor, request_id, url);
    ctx.registry.logout(&session.token);

    let request = result?;
    println!("Receipt attached to request {}", request.id);
    Ok(())
}

/// Finalize payment of a receipted request (government)
pub fn finalize(
    ctx: &AppContext,
    login: &Login,
    request_id: RequestId,
) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let result = ctx.engine.finalize(&session.actor, request_id);
    ctx.registry.logout(&session.token);

    let request = result?;
    println!("Request {} -> {}", request.id, request.status);
    Ok(())
}

/// Government's materialized view of requests across all its grants
pub fn transactions(ctx: &AppContext, login: &Login) -> Result<(), anyhow::Error> {
    list_requests(ctx, login)
}

/// AML flags on one request
pub fn flags_for_request(
    ctx: &AppContext,
    login: &Login,
    request_id: RequestId,
) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let result = ctx.engine.flags_for_request(&session.actor, request_id);
    ctx.registry.logout(&session.token);
    print_json(&result?)
}

/// AML flags across a grant's requests
pub fn flags_for_grant(
    ctx: &AppContext,
    login: &Login,
    grant_id: GrantId,
) -> Result<(), anyhow::Error> {
    let session = open_session(ctx, login)?;
    let result = ctx.engine.flags_for_grant(&session.actor, grant_id);
    ctx.registry.logout(&session.token);
    print_json(&result?)
}

/// Record a flag on behalf of the external detection service.
///
/// This is the delivery path of the detector, not a user operation; it is
/// deliberately unauthenticated at this layer.
pub fn record_flag(
    ctx: &AppContext,
    request_id: RequestId,
    flag_type: &str,
    severity: Severity,
    description: &str,
) -> Result<(), anyhow::Error> {
    let flag = ctx
        .flags
        .record(request_id, flag_type, severity, description)?;
    println!(
        "Recorded {} flag {} on request {}",
        flag.severity, flag.id, flag.spending_request_id
    );
    Ok(())
}

/// Mirrored contract logs, optionally narrowed to one grant
pub fn contract_logs(ctx: &AppContext, grant_id: Option<GrantId>) -> Result<(), anyhow::Error> {
    let logs = match grant_id {
        Some(id) => ctx.contract.logs_for_grant(id)?,
        None => ctx.contract.read_all()?,
    };
    print_json(&logs)
}
