//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresInvoiceStore`, an [`InvoiceStore`] backed by a
//! `sqlx::PgPool`. Every operation is exactly one parameterized statement.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! invoice-actions = { version = "0.1", features = ["postgres"] }
//! ```

use crate::core::error::StorageError;
use crate::core::invoice::{Invoice, InvoiceDraft, NewInvoice};
use crate::core::store::InvoiceStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

const BACKEND: &str = "PostgreSQL";

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the required tables (idempotent).
///
/// This creates:
/// - `customers` table referenced by invoices
/// - `invoices` table with a generated UUID id
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS customers (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create customers table: {}", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS invoices (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            customer_id UUID NOT NULL REFERENCES customers(id),
            amount BIGINT NOT NULL,
            status VARCHAR(16) NOT NULL,
            date DATE NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create invoices table: {}", e))?;

    Ok(())
}

/// Map a driver error to a [`StorageError`]
///
/// Foreign-key violations (SQLSTATE 23503) are integrity errors; pool and
/// I/O failures are connection errors; everything else is a query error.
fn storage_error(context: &str, err: sqlx::Error) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
            StorageError::IntegrityError {
                message: format!("{}: {}", context, db.message()),
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StorageError::ConnectionError {
                backend: BACKEND.to_string(),
                message: format!("{}: {}", context, err),
            }
        }
        _ => StorageError::QueryError {
            backend: BACKEND.to_string(),
            message: format!("{}: {}", context, err),
        },
    }
}

/// Invoice storage backed by PostgreSQL.
///
/// # Example
///
/// ```rust,ignore
/// let store = PostgresInvoiceStore::connect("postgres://localhost/invoices", 5).await?;
/// ensure_schema(store.pool()).await?;
/// let actions = InvoiceActions::new(Arc::new(store), "/dashboard/invoices");
/// ```
#[derive(Clone, Debug)]
pub struct PostgresInvoiceStore {
    pool: PgPool,
}

impl PostgresInvoiceStore {
    /// Create a new `PostgresInvoiceStore` with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool of at most `max_connections` connections to `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| StorageError::ConnectionError {
                backend: BACKEND.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl InvoiceStore for PostgresInvoiceStore {
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice, StorageError> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO invoices (customer_id, amount, status, date)
             VALUES ($1::uuid, $2, $3, $4)
             RETURNING id",
        )
        .bind(&invoice.customer_id)
        .bind(invoice.amount_in_cents)
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to insert invoice", e))?;

        Ok(invoice.into_invoice(id.to_string()))
    }

    async fn update_invoice(&self, id: &str, changes: InvoiceDraft) -> Result<u64, StorageError> {
        // A non-UUID id cannot name a row.
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(0);
        };

        let result = sqlx::query(
            "UPDATE invoices
             SET customer_id = $1::uuid, amount = $2, status = $3
             WHERE id = $4",
        )
        .bind(&changes.customer_id)
        .bind(changes.amount_in_cents)
        .bind(changes.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to update invoice", e))?;

        Ok(result.rows_affected())
    }

    async fn delete_invoice(&self, id: &str) -> Result<u64, StorageError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(0);
        };

        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete invoice", e))?;

        Ok(result.rows_affected())
    }
}
