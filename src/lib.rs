//! # Invoice Actions
//!
//! Server-side form actions for an invoicing dashboard: create, update and
//! delete invoices, sign in and sign out, exposed over an axum router.
//!
//! ## Features
//!
//! - **Validated Forms**: every invalid field reported at once, in form order
//! - **Exact Money**: amounts converted to cents on the decimal text (`19.995` → `2000`)
//! - **Injected Collaborators**: store, auth provider and page cache are traits
//! - **Tagged Results**: actions return what should happen; the HTTP boundary does it
//! - **Pluggable Storage**: in-memory, or PostgreSQL behind the `postgres` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use invoice_actions::prelude::*;
//!
//! let store = Arc::new(InMemoryInvoiceStore::new());
//! let actions = InvoiceActions::new(store, "/dashboard/invoices");
//!
//! let form = FormInput::new()
//!     .with("customerId", "c1")
//!     .with("amount", "50")
//!     .with("status", "paid");
//!
//! match actions.create(&FormState::default(), &form).await {
//!     ActionOutcome::Success { next_path, .. } => println!("go to {next_path}"),
//!     ActionOutcome::Failure { state } => println!("{:?}", state.errors),
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Actions ===
    pub use crate::core::service::{AuthActions, InvoiceActions};

    // === Forms & Validation ===
    pub use crate::core::form::{ActionOutcome, FormInput, FormState, Revalidation};
    pub use crate::core::validation::{FieldErrors, FormSchema};

    // === Invoices ===
    pub use crate::core::invoice::{Invoice, InvoiceDraft, InvoiceStatus, NewInvoice};

    // === Collaborators ===
    pub use crate::core::auth::{
        AuthErrorKind, AuthOutcome, AuthProvider, NoAuthProvider, SignIn, SignInError, SignOut,
        SignOutOptions,
    };
    pub use crate::core::credentials::CredentialsProvider;
    pub use crate::core::events::{PageCache, RevalidationBus, RevalidationEvent};
    pub use crate::core::store::InvoiceStore;

    // === Errors ===
    pub use crate::core::error::{ActionError, ActionResult, StorageError};

    // === Storage ===
    pub use crate::storage::InMemoryInvoiceStore;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresInvoiceStore;

    // === Config ===
    pub use crate::config::{AppConfig, RoutesConfig};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}
