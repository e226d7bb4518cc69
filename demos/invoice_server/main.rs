//! Invoice action server
//!
//! This example demonstrates:
//! - Loading configuration from YAML with environment overrides
//! - Picking the in-memory or PostgreSQL store from `database.url`
//! - Credentials sign-in with a seeded demo user
//! - Logging page revalidations as they are published
//!
//! ```sh
//! cargo run --example invoice_server -- demos/invoice_server/config.yaml
//! DATABASE_URL=postgres://localhost/invoices cargo run --features postgres --example invoice_server
//! ```

use invoice_actions::config::UserConfig;
use invoice_actions::core::events::follow;
use invoice_actions::prelude::*;
use tracing_subscriber::EnvFilter;

const DEMO_EMAIL: &str = "user@nextmail.com";
const DEMO_PASSWORD: &str = "123456";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,invoice_actions=debug,tower_http=debug")),
        )
        .init();

    println!("🧾 Invoice Actions Server");
    println!("=========================\n");

    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_yaml_file(&path)?,
        None => AppConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;

    let mut auth_config = config.auth.clone();
    if auth_config.users.is_empty() {
        auth_config.users.push(UserConfig {
            id: "410544b2-4001-4271-9855-fec4b6a6442a".to_string(),
            name: "User".to_string(),
            email: DEMO_EMAIL.to_string(),
            password_hash: CredentialsProvider::hash_password(DEMO_PASSWORD)?,
        });
        println!("👤 Demo user: {} / {}\n", DEMO_EMAIL, DEMO_PASSWORD);
    }
    let provider = CredentialsProvider::from_config(&auth_config)
        .with_default_redirect(config.routes.after_sign_in.clone());

    let bus = RevalidationBus::default();
    tokio::spawn(follow(bus.subscribe(), |event| {
        tracing::info!(path = %event.path, at = %event.timestamp, "page revalidated")
    }));

    let listing = config.routes.invoices.clone();
    let bind_addr = config.server.bind_addr.clone();

    println!("📍 Routes:");
    println!("   POST {}/create", listing);
    println!("   POST {}/{{id}}/edit", listing);
    println!("   POST {}/{{id}}/delete", listing);
    println!("   POST /login");
    println!("   POST /logout");
    println!("   GET  /health\n");

    ServerBuilder::new()
        .with_config(config)
        .with_configured_store()
        .await?
        .with_auth_provider(provider)
        .with_page_cache(bus)
        .serve(&bind_addr)
        .await
}
