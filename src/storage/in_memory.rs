//! In-memory implementation of InvoiceStore for testing and development

use crate::core::error::StorageError;
use crate::core::invoice::{Invoice, InvoiceDraft, NewInvoice};
use crate::core::store::InvoiceStore;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

const BACKEND: &str = "memory";

/// In-memory invoice store
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// When a customer registry is set, writes referencing an unknown customer
/// fail the way a foreign-key violation would.
#[derive(Clone, Default)]
pub struct InMemoryInvoiceStore {
    invoices: Arc<RwLock<HashMap<String, Invoice>>>,
    customers: Option<Arc<HashSet<String>>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept invoices for these customer ids
    pub fn with_customers<I, S>(mut self, customers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.customers = Some(Arc::new(customers.into_iter().map(Into::into).collect()));
        self
    }

    /// Insert a fully formed invoice, bypassing validation (fixtures)
    pub fn seed(&self, invoice: Invoice) -> Result<(), StorageError> {
        self.invoices
            .write()
            .map_err(lock_error)?
            .insert(invoice.id.clone(), invoice);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<Invoice>, StorageError> {
        Ok(self.invoices.read().map_err(lock_error)?.get(id).cloned())
    }

    /// All invoices, newest date first
    pub fn snapshot(&self) -> Result<Vec<Invoice>, StorageError> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .read()
            .map_err(lock_error)?
            .values()
            .cloned()
            .collect();
        invoices.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(invoices)
    }

    fn check_customer(&self, customer_id: &str) -> Result<(), StorageError> {
        match &self.customers {
            Some(known) if !known.contains(customer_id) => Err(StorageError::IntegrityError {
                message: format!("customer '{}' does not exist", customer_id),
            }),
            _ => Ok(()),
        }
    }
}

fn lock_error<T>(e: std::sync::PoisonError<T>) -> StorageError {
    StorageError::QueryError {
        backend: BACKEND.to_string(),
        message: format!("Failed to acquire lock: {}", e),
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice, StorageError> {
        self.check_customer(&invoice.customer_id)?;

        let invoice = invoice.into_invoice(Uuid::new_v4().to_string());
        self.invoices
            .write()
            .map_err(lock_error)?
            .insert(invoice.id.clone(), invoice.clone());

        Ok(invoice)
    }

    async fn update_invoice(&self, id: &str, changes: InvoiceDraft) -> Result<u64, StorageError> {
        self.check_customer(&changes.customer_id)?;

        let mut invoices = self.invoices.write().map_err(lock_error)?;
        let Some(invoice) = invoices.get_mut(id) else {
            return Ok(0);
        };

        invoice.customer_id = changes.customer_id;
        invoice.amount = changes.amount_in_cents;
        invoice.status = changes.status;
        Ok(1)
    }

    async fn delete_invoice(&self, id: &str) -> Result<u64, StorageError> {
        let removed = self.invoices.write().map_err(lock_error)?.remove(id);
        Ok(u64::from(removed.is_some()))
    }
}
