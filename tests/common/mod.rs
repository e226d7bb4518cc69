//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use invoice_actions::core::error::StorageError;
use invoice_actions::core::invoice::{Invoice, InvoiceDraft, NewInvoice};
use invoice_actions::core::store::InvoiceStore;
use invoice_actions::core::form::FormInput;
use invoice_actions::storage::InMemoryInvoiceStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const LISTING: &str = "/dashboard/invoices";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

pub fn invoice_form(customer: &str, amount: &str, status: &str) -> FormInput {
    FormInput::new()
        .with("customerId", customer)
        .with("amount", amount)
        .with("status", status)
}

/// In-memory store that counts the calls it receives
#[derive(Clone, Default)]
pub struct CountingStore {
    pub inner: InMemoryInvoiceStore,
    inserts: Arc<AtomicUsize>,
    updates: Arc<AtomicUsize>,
    deletes: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.inserts() + self.updates() + self.deletes()
    }
}

#[async_trait]
impl InvoiceStore for CountingStore {
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice, StorageError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_invoice(invoice).await
    }

    async fn update_invoice(&self, id: &str, changes: InvoiceDraft) -> Result<u64, StorageError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update_invoice(id, changes).await
    }

    async fn delete_invoice(&self, id: &str) -> Result<u64, StorageError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_invoice(id).await
    }
}

/// Store whose every statement fails
#[derive(Clone, Default)]
pub struct FailingStore;

impl FailingStore {
    pub fn error() -> StorageError {
        StorageError::ConnectionError {
            backend: "test".to_string(),
            message: "connection refused".to_string(),
        }
    }
}

#[async_trait]
impl InvoiceStore for FailingStore {
    async fn insert_invoice(&self, _: NewInvoice) -> Result<Invoice, StorageError> {
        Err(Self::error())
    }

    async fn update_invoice(&self, _: &str, _: InvoiceDraft) -> Result<u64, StorageError> {
        Err(Self::error())
    }

    async fn delete_invoice(&self, _: &str) -> Result<u64, StorageError> {
        Err(Self::error())
    }
}
