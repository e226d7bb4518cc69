//! Integration tests for the PostgreSQL invoice store.
//!
//! # Requirements
//!
//! - Docker must be running (testcontainers launches a PostgreSQL container)
//! - Feature flag `postgres` must be enabled
//!
//! # Running
//!
//! ```sh
//! cargo test --features postgres --test postgres_tests -- --test-threads=1
//! ```
//!
//! # Test isolation
//!
//! All tests share a single PostgreSQL container (via `OnceLock`). Each test
//! creates a fresh `PgPool` and truncates tables before running.

#![cfg(feature = "postgres")]

mod common;

use common::{LISTING, invoice_form, today};
use invoice_actions::core::error::{ActionError, StorageError};
use invoice_actions::prelude::*;
use invoice_actions::storage::ensure_schema;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::OnceLock;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Shared test environment (single container, fresh pool per test)
// ---------------------------------------------------------------------------

/// Holds the testcontainer handle (keeps it alive) and the connection URL.
struct PgTestEnv {
    _container: testcontainers::ContainerAsync<Postgres>,
    connection_url: String,
}

/// Initialized once per test binary; must outlive each `#[tokio::test]` runtime.
static TEST_ENV: OnceLock<PgTestEnv> = OnceLock::new();

async fn init_pg_env() -> &'static PgTestEnv {
    if let Some(env) = TEST_ENV.get() {
        return env;
    }

    let container = Postgres::default()
        .start()
        .await
        .expect("Failed to start PostgreSQL container, is Docker running?");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPool::connect(&url)
        .await
        .expect("Failed to connect to PostgreSQL");
    ensure_schema(&pool).await.expect("Failed to apply schema");
    // Applying twice must be harmless.
    ensure_schema(&pool).await.expect("Schema is not idempotent");
    pool.close().await;

    let _ = TEST_ENV.set(PgTestEnv {
        _container: container,
        connection_url: url,
    });
    TEST_ENV.get().unwrap()
}

async fn pg_pool() -> PgPool {
    let env = init_pg_env().await;
    PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&env.connection_url)
        .await
        .expect("Failed to connect to PostgreSQL")
}

/// Fresh store over empty tables, with one known customer
async fn clean_store() -> (PostgresInvoiceStore, Uuid) {
    let pool = pg_pool().await;
    sqlx::query("TRUNCATE invoices, customers CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to truncate tables");

    let customer_id = Uuid::new_v4();
    sqlx::query("INSERT INTO customers (id, name, email) VALUES ($1, $2, $3)")
        .bind(customer_id)
        .bind("Evil Rabbit")
        .bind("evil@rabbit.com")
        .execute(&pool)
        .await
        .expect("Failed to insert customer");

    (PostgresInvoiceStore::new(pool), customer_id)
}

async fn stored_invoice(pool: &PgPool, id: Uuid) -> Option<(Uuid, i64, String, chrono::NaiveDate)> {
    sqlx::query_as("SELECT customer_id, amount, status, date FROM invoices WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .unwrap()
}

fn actions(store: &PostgresInvoiceStore) -> InvoiceActions {
    InvoiceActions::new(Arc::new(store.clone()), LISTING).with_today(today)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_persists_row() {
    let (store, customer) = clean_store().await;

    let outcome = actions(&store)
        .create(
            &FormState::default(),
            &invoice_form(&customer.to_string(), "50", "paid"),
        )
        .await;
    assert!(outcome.is_success());

    let (id,): (Uuid,) = sqlx::query_as("SELECT id FROM invoices")
        .fetch_one(store.pool())
        .await
        .unwrap();
    let row = stored_invoice(store.pool(), id).await.unwrap();
    assert_eq!(row, (customer, 5000, "paid".to_string(), today()));
}

#[tokio::test]
async fn test_update_overwrites_row() {
    let (store, customer) = clean_store().await;
    let created = store
        .insert_invoice(NewInvoice {
            customer_id: customer.to_string(),
            amount_in_cents: 100,
            status: InvoiceStatus::Pending,
            date: today(),
        })
        .await
        .unwrap();

    let outcome = actions(&store)
        .update_invoice(
            &created.id,
            &FormState::default(),
            &invoice_form(&customer.to_string(), "19.995", "paid"),
        )
        .await;
    assert!(outcome.is_success());

    let id = Uuid::parse_str(&created.id).unwrap();
    let row = stored_invoice(store.pool(), id).await.unwrap();
    assert_eq!(row.1, 2000);
    assert_eq!(row.2, "paid");
}

#[tokio::test]
async fn test_missing_and_malformed_ids_affect_no_rows() {
    let (store, customer) = clean_store().await;
    let draft = InvoiceDraft {
        customer_id: customer.to_string(),
        amount_in_cents: 1,
        status: InvoiceStatus::Paid,
    };

    assert_eq!(
        store
            .update_invoice(&Uuid::new_v4().to_string(), draft.clone())
            .await
            .unwrap(),
        0
    );
    assert_eq!(store.update_invoice("nonexistent-id", draft).await.unwrap(), 0);
    assert_eq!(store.delete_invoice("nonexistent-id").await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_customer_is_integrity_error() {
    let (store, _) = clean_store().await;

    let err = store
        .insert_invoice(NewInvoice {
            customer_id: Uuid::new_v4().to_string(),
            amount_in_cents: 100,
            status: InvoiceStatus::Paid,
            date: today(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::IntegrityError { .. }));
}

#[tokio::test]
async fn test_non_uuid_customer_fails_create_with_generic_message() {
    let (store, _) = clean_store().await;

    let outcome = actions(&store)
        .create(&FormState::default(), &invoice_form("c1", "50", "paid"))
        .await;

    assert_eq!(
        outcome.state().and_then(|s| s.message.as_deref()),
        Some("Database Error: failed to create invoices")
    );
}

#[tokio::test]
async fn test_delete_removes_row() {
    let (store, customer) = clean_store().await;
    let created = store
        .insert_invoice(NewInvoice {
            customer_id: customer.to_string(),
            amount_in_cents: 100,
            status: InvoiceStatus::Paid,
            date: today(),
        })
        .await
        .unwrap();

    actions(&store).delete_invoice(&created.id).await.unwrap();

    let id = Uuid::parse_str(&created.id).unwrap();
    assert!(stored_invoice(store.pool(), id).await.is_none());
}

#[tokio::test]
async fn test_closed_pool_propagates_from_delete() {
    let (store, _) = clean_store().await;
    store.pool().close().await;

    let err = actions(&store)
        .delete_invoice(&Uuid::new_v4().to_string())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ActionError::Storage(StorageError::ConnectionError { .. })
    ));
}
