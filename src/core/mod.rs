//! Core module containing the actions, their collaborators and shared types

pub mod auth;
pub mod credentials;
pub mod error;
pub mod events;
pub mod form;
pub mod invoice;
pub mod service;
pub mod store;
pub mod validation;

pub use auth::{AuthErrorKind, AuthOutcome, AuthProvider, NoAuthProvider, SignInError};
pub use credentials::CredentialsProvider;
pub use error::{ActionError, ActionResult, StorageError};
pub use events::{PageCache, RevalidationBus, RevalidationEvent};
pub use form::{ActionOutcome, FormInput, FormState, Revalidation};
pub use invoice::{Invoice, InvoiceDraft, InvoiceStatus, NewInvoice};
pub use service::{AuthActions, InvoiceActions};
pub use store::InvoiceStore;
pub use validation::{FieldErrors, FormSchema};
