//! rcsync - RingCentral identity sync command line.

#![deny(clippy::all)]

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rcsync::config::Config;
use rcsync::connector::resource::{Traits, ROLE_PERMISSION_NAME};
use rcsync::connector::{
    Connector, Entitlement, Grant, PageToken, Resource, ResourceId, ResourceSyncer,
    ROLE_RESOURCE_TYPE, USER_RESOURCE_TYPE,
};

#[derive(Debug, Parser)]
#[command(name = "rcsync", version, about = "Sync RingCentral users and roles")]
struct Cli {
    /// RingCentral client ID (overrides RINGCENTRAL_CLIENT_ID)
    #[arg(long, global = true)]
    client_id: Option<String>,

    /// RingCentral client secret (overrides RINGCENTRAL_CLIENT_SECRET)
    #[arg(long, global = true)]
    client_secret: Option<String>,

    /// JWT of an admin user (overrides RINGCENTRAL_JWT)
    #[arg(long, global = true)]
    jwt: Option<String>,

    /// API base URL (overrides RINGCENTRAL_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every user and role with their entitlements and grants as JSON
    Sync {
        /// Records per page (1-100)
        #[arg(long)]
        page_size: Option<u32>,

        /// Upper bound on list calls per resource type
        #[arg(long, default_value_t = 10_000)]
        max_pages: u32,
    },
    /// Grant a role to a user
    Grant {
        #[arg(long)]
        user: String,
        #[arg(long)]
        role: String,
    },
    /// Revoke a role from a user
    Revoke {
        #[arg(long)]
        user: String,
        #[arg(long)]
        role: String,
    },
    /// Check that the credentials work
    Validate,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present) before anything else
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            eprintln!("\nSet the following environment variables:");
            eprintln!("  RINGCENTRAL_CLIENT_ID=<client-id>");
            eprintln!("  RINGCENTRAL_CLIENT_SECRET=<client-secret>");
            eprintln!("  RINGCENTRAL_JWT=<admin-user-jwt>");
            std::process::exit(2);
        }
    };

    init_logging(&config);
    info!("Starting rcsync v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli.command, &config).await {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging on stderr, keeping stdout for output.
fn init_logging(config: &Config) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Embedded defaults, then environment, then flags; validated once at the end.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env()?;
    apply_cli(&mut config, cli);
    config.validate()?;
    Ok(config)
}

fn apply_cli(config: &mut Config, cli: &Cli) {
    if let Some(client_id) = &cli.client_id {
        config.oauth.client_id = client_id.clone();
    }
    if let Some(client_secret) = &cli.client_secret {
        config.oauth.client_secret = client_secret.clone();
    }
    if let Some(jwt) = &cli.jwt {
        config.oauth.jwt = jwt.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let connector = Connector::new(config)
        .await
        .context("Failed to create connector")?;

    match command {
        Command::Sync {
            page_size,
            max_pages,
        } => {
            let page_size = page_size.unwrap_or(config.api.page_size);
            let document = sync_all(&connector, page_size, max_pages).await?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Command::Grant { user, role } => {
            let syncer = role_syncer(&connector)?;
            let provisioner = syncer
                .provisioner()
                .context("Role syncer cannot provision")?;
            let entitlement = Entitlement::permission(
                &role_reference(&role),
                ROLE_PERMISSION_NAME,
                &[&USER_RESOURCE_TYPE],
            );
            provisioner
                .grant(&ResourceId::new(&USER_RESOURCE_TYPE, user), &entitlement)
                .await?;
        }
        Command::Revoke { user, role } => {
            let syncer = role_syncer(&connector)?;
            let provisioner = syncer
                .provisioner()
                .context("Role syncer cannot provision")?;
            let grant = Grant::new(
                &role_reference(&role),
                ROLE_PERMISSION_NAME,
                ResourceId::new(&USER_RESOURCE_TYPE, user),
            );
            provisioner.revoke(&grant).await?;
        }
        Command::Validate => {
            connector.validate().await?;
            println!("OK");
        }
    }

    Ok(())
}

fn role_syncer(connector: &Connector) -> Result<Box<dyn ResourceSyncer>> {
    connector
        .syncer(ROLE_RESOURCE_TYPE.id)
        .context("No syncer for roles")
}

fn role_reference(role_id: &str) -> Resource {
    Resource {
        id: ResourceId::new(&ROLE_RESOURCE_TYPE, role_id),
        display_name: role_id.to_string(),
        description: String::new(),
        parent: None,
        traits: Traits::None,
    }
}

/// Walk every resource type to exhaustion, then collect entitlements and grants.
async fn sync_all(
    connector: &Connector,
    page_size: u32,
    max_pages: u32,
) -> Result<serde_json::Value> {
    let syncers = connector.resource_syncers();

    let mut resources = Vec::new();
    for syncer in &syncers {
        let listed = list_all(syncer.as_ref(), page_size, max_pages).await?;
        info!(
            "Listed {} {} resources",
            listed.len(),
            syncer.resource_type().id
        );
        resources.extend(listed);
    }

    let mut entitlements = Vec::new();
    let mut grants = Vec::new();
    for resource in &resources {
        let Some(syncer) = syncers
            .iter()
            .find(|s| resource.id.is_type(s.resource_type()))
        else {
            continue;
        };

        let token = PageToken::new(page_size);
        entitlements.extend(syncer.entitlements(resource, &token).await?.items);
        grants.extend(
            syncer
                .grants(resource, &token)
                .await
                .with_context(|| format!("Failed to list grants of {}", resource.id.resource))?
                .items,
        );
    }

    info!(
        "Sync complete: {} resources, {} entitlements, {} grants",
        resources.len(),
        entitlements.len(),
        grants.len()
    );

    Ok(json!({
        "synced_at": Utc::now().to_rfc3339(),
        "metadata": connector.metadata(),
        "resources": resources,
        "entitlements": entitlements,
        "grants": grants,
    }))
}

/// Chain continuation tokens until the listing reports exhaustion.
async fn list_all(
    syncer: &dyn ResourceSyncer,
    page_size: u32,
    max_pages: u32,
) -> Result<Vec<Resource>> {
    let mut token = PageToken::new(page_size);
    let mut resources = Vec::new();

    for _ in 0..max_pages {
        let page = syncer.list(None, &token).await?;
        resources.extend(page.items);
        if page.next_token.is_empty() {
            return Ok(resources);
        }
        token.token = page.next_token;
    }

    anyhow::bail!(
        "{} listing did not finish within {} pages",
        syncer.resource_type().id,
        max_pages
    )
}
