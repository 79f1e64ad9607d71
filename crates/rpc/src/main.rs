//! GrantFlow CLI - Main entry point

use clap::{Parser, Subcommand};
use grantflow_aml::Severity;
use grantflow_core::{Currency, Role};
use grantflow_rpc::{commands, commands::Login, AppContext};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grantflow")]
#[command(about = "GrantFlow - grant disbursement workflow", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    /// Acting account email
    #[arg(short = 'u', long, global = true)]
    email: Option<String>,

    /// Acting account password
    #[arg(short = 'p', long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account
    Signup {
        email: String,
        full_name: String,
        /// government, university or grantee
        role: Role,
        password: String,
    },

    /// List registered universities
    Universities,

    /// List registered grantees
    Grantees,

    /// Create a grant issued to a university (government)
    CreateGrant {
        title: String,
        /// Total budget
        amount: Decimal,
        /// University to issue the grant to
        university: i64,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "USD")]
        currency: Currency,
    },

    /// List grants visible to the acting account
    Grants,

    /// Show one grant with items, requests and remaining budget
    Grant { id: i64 },

    /// Assign the grantee of a grant (university)
    AssignGrantee { grant: i64, grantee: i64 },

    /// Add a spending item to a grant (grantee)
    AddItem {
        grant: i64,
        title: String,
        amount: Decimal,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Bulk-import spending items from a CSV file (government)
    ImportItems { grant: i64, file: PathBuf },

    /// List a grant's spending items
    Items { grant: i64 },

    /// Attach a receipt URL to a spending item (grantee)
    ItemReceipt { item: i64, url: String },

    /// Create a spending request against an item (grantee)
    CreateRequest {
        grant: i64,
        item: i64,
        amount: Decimal,
    },

    /// List requests visible to the acting account
    Requests,

    /// Show one request
    Request { id: i64 },

    /// Approve a batch of exactly three pending requests (university)
    ApproveBatch {
        #[arg(required = true)]
        requests: Vec<i64>,
    },

    /// Reject a pending request (university)
    Reject { request: i64 },

    /// Attach a receipt URL to a request (grantee)
    AttachReceipt { request: i64, url: String },

    /// Finalize payment of a receipted request (government)
    Finalize { request: i64 },

    /// Requests across all issued grants (government)
    Transactions,

    /// AML flags on one request
    Flags { request: i64 },

    /// AML flags across a grant's requests
    GrantFlags { grant: i64 },

    /// Record a flag delivered by the external AML detector
    RecordFlag {
        request: i64,
        flag_type: String,
        /// low, medium or high
        severity: Severity,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Mirrored contract logs, optionally narrowed to one grant
    Logs {
        #[arg(long)]
        grant: Option<i64>,
    },
}

fn login(cli: &Cli) -> Result<Login<'_>, anyhow::Error> {
    match (cli.email.as_deref(), cli.password.as_deref()) {
        (Some(email), Some(password)) => Ok(Login { email, password }),
        _ => anyhow::bail!("this command requires --email and --password"),
    }
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::new(&cli.data)?;

    match &cli.command {
        Commands::Signup {
            email,
            full_name,
            role,
            password,
        } => commands::signup(&ctx, email, full_name, *role, password),

        Commands::Universities => commands::universities(&ctx),
        Commands::Grantees => commands::grantees(&ctx),

        Commands::CreateGrant {
            title,
            amount,
            university,
            description,
            currency,
        } => commands::create_grant(
            &ctx,
            &login(&cli)?,
            title,
            description,
            *amount,
            currency,
            *university,
        ),

        Commands::Grants => commands::list_grants(&ctx, &login(&cli)?),
        Commands::Grant { id } => commands::show_grant(&ctx, &login(&cli)?, *id),

        Commands::AssignGrantee { grant, grantee } => {
            commands::assign_grantee(&ctx, &login(&cli)?, *grant, *grantee)
        }

        Commands::AddItem {
            grant,
            title,
            amount,
            description,
        } => commands::add_item(&ctx, &login(&cli)?, *grant, title, description, *amount),

        Commands::ImportItems { grant, file } => {
            commands::import_items(&ctx, &login(&cli)?, *grant, file)
        }

        Commands::Items { grant } => commands::list_items(&ctx, &login(&cli)?, *grant),

        Commands::ItemReceipt { item, url } => {
            commands::item_receipt(&ctx, &login(&cli)?, *item, url)
        }

        Commands::CreateRequest {
            grant,
            item,
            amount,
        } => commands::create_request(&ctx, &login(&cli)?, *grant, *item, *amount),

        Commands::Requests => commands::list_requests(&ctx, &login(&cli)?),
        Commands::Request { id } => commands::show_request(&ctx, &login(&cli)?, *id),

        Commands::ApproveBatch { requests } => {
            commands::approve_batch(&ctx, &login(&cli)?, requests)
        }

        Commands::Reject { request } => commands::reject(&ctx, &login(&cli)?, *request),

        Commands::AttachReceipt { request, url } => {
            commands::attach_receipt(&ctx, &login(&cli)?, *request, url)
        }

        Commands::Finalize { request } => commands::finalize(&ctx, &login(&cli)?, *request),

        Commands::Transactions => commands::transactions(&ctx, &login(&cli)?),

        Commands::Flags { request } => commands::flags_for_request(&ctx, &login(&cli)?, *request),
        Commands::GrantFlags { grant } => commands::flags_for_grant(&ctx, &login(&cli)?, *grant),

        Commands::RecordFlag {
            request,
            flag_type,
            severity,
            description,
        } => commands::record_flag(&ctx, *request, flag_type, *severity, description),

        Commands::Logs { grant } => commands::contract_logs(&ctx, *grant),
    }
}
