//! Storage collaborator for invoice mutations

use crate::core::error::StorageError;
use crate::core::invoice::{Invoice, InvoiceDraft, NewInvoice};
use async_trait::async_trait;

/// Persistence for invoice mutations
///
/// Each method maps to exactly one parameterized statement against the
/// `invoices` table. Implementations are constructed once at start-up and
/// shared behind an `Arc`.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert a new invoice; the store assigns its id
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice, StorageError>;

    /// Overwrite customer, amount and status of invoice `id`
    ///
    /// Returns the number of rows affected; `0` when no invoice has that id.
    async fn update_invoice(&self, id: &str, changes: InvoiceDraft) -> Result<u64, StorageError>;

    /// Hard-delete invoice `id`
    ///
    /// Returns the number of rows affected; `0` when no invoice has that id.
    async fn delete_invoice(&self, id: &str) -> Result<u64, StorageError>;
}
