//! Invoice and authentication actions
//!
//! Each action is a single-shot request/response: validate, run one
//! statement, report. The actions never redirect or touch the page cache
//! themselves; they describe what should happen and the boundary does it.

use crate::core::auth::{AuthOutcome, AuthProvider, CREDENTIALS_PROVIDER, SignOut, SignOutOptions};
use crate::core::error::{ActionError, ActionResult};
use crate::core::form::{ActionOutcome, FormInput, FormState, Revalidation};
use crate::core::invoice::{
    InvoiceDraft, NewInvoice, create_invoice_schema, update_invoice_schema,
};
use crate::core::store::InvoiceStore;
use crate::core::validation::FormSchema;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

pub const CREATE_INVALID: &str = "Missing field. failed to create invoice";
pub const CREATE_FAILED: &str = "Database Error: failed to create invoices";
pub const UPDATE_INVALID: &str = "Missing field. failed to update invoice";
pub const UPDATE_FAILED: &str = "Database Error: failed to update invoice";

/// Source of "today" for new invoices
pub type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Create, update and delete invoices through an injected store
#[derive(Clone)]
pub struct InvoiceActions {
    store: Arc<dyn InvoiceStore>,
    listing_path: String,
    today: Today,
    create_schema: FormSchema,
    update_schema: FormSchema,
}

impl InvoiceActions {
    /// Actions writing to `store` and returning to `listing_path` on success
    pub fn new(store: Arc<dyn InvoiceStore>, listing_path: impl Into<String>) -> Self {
        Self {
            store,
            listing_path: listing_path.into(),
            today: Arc::new(|| Utc::now().date_naive()),
            create_schema: create_invoice_schema(),
            update_schema: update_invoice_schema(),
        }
    }

    /// Replace the clock used for creation dates
    pub fn with_today(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Arc::new(today);
        self
    }

    pub fn listing_path(&self) -> &str {
        &self.listing_path
    }

    fn success(&self) -> ActionOutcome {
        ActionOutcome::Success {
            revalidate: self.listing_path.clone(),
            next_path: self.listing_path.clone(),
        }
    }

    /// Validate `form` and insert a new invoice dated today
    ///
    /// `_previous` is the state the form currently shows; the returned state
    /// replaces it.
    pub async fn create(&self, _previous: &FormState, form: &FormInput) -> ActionOutcome {
        let draft = match InvoiceDraft::parse(&self.create_schema, form) {
            Ok(draft) => draft,
            Err(errors) => {
                tracing::debug!(fields = ?errors.fields().collect::<Vec<_>>(), "invoice form rejected");
                return ActionOutcome::Failure {
                    state: FormState::invalid(errors, CREATE_INVALID),
                };
            }
        };

        let invoice = NewInvoice::from_draft(draft, (self.today)());
        match self.store.insert_invoice(invoice).await {
            Ok(created) => {
                tracing::info!(
                    invoice_id = %created.id,
                    customer_id = %created.customer_id,
                    amount = created.amount,
                    "invoice created"
                );
                self.success()
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to create invoice");
                ActionOutcome::Failure {
                    state: FormState::message(CREATE_FAILED),
                }
            }
        }
    }

    /// Validate `form` and overwrite customer, amount and status of `id`
    ///
    /// An `id` matching no invoice updates nothing and still succeeds.
    pub async fn update_invoice(
        &self,
        id: &str,
        _previous: &FormState,
        form: &FormInput,
    ) -> ActionOutcome {
        let draft = match InvoiceDraft::parse(&self.update_schema, form) {
            Ok(draft) => draft,
            Err(errors) => {
                tracing::debug!(invoice_id = id, fields = ?errors.fields().collect::<Vec<_>>(), "invoice form rejected");
                return ActionOutcome::Failure {
                    state: FormState::invalid(errors, UPDATE_INVALID),
                };
            }
        };

        match self.store.update_invoice(id, draft).await {
            Ok(0) => {
                tracing::info!(invoice_id = id, "update matched no invoice");
                self.success()
            }
            Ok(rows) => {
                tracing::info!(invoice_id = id, rows, "invoice updated");
                self.success()
            }
            Err(e) => {
                tracing::warn!(invoice_id = id, error = %e, "failed to update invoice");
                ActionOutcome::Failure {
                    state: FormState::message(UPDATE_FAILED),
                }
            }
        }
    }

    /// Delete `id`
    ///
    /// The id is passed to the store unchecked, there is no existence check,
    /// and store failures are returned as-is rather than folded into a form
    /// state.
    pub async fn delete_invoice(&self, id: &str) -> ActionResult<Revalidation> {
        let rows = self.store.delete_invoice(id).await.map_err(|e| {
            tracing::error!(invoice_id = id, error = %e, "failed to delete invoice");
            ActionError::from(e)
        })?;
        tracing::info!(invoice_id = id, rows, "invoice deleted");

        Ok(Revalidation {
            path: self.listing_path.clone(),
        })
    }
}

/// Sign-in and sign-out through an injected provider
#[derive(Clone)]
pub struct AuthActions {
    provider: Arc<dyn AuthProvider>,
    home_path: String,
}

impl AuthActions {
    pub fn new(provider: Arc<dyn AuthProvider>, home_path: impl Into<String>) -> Self {
        Self {
            provider,
            home_path: home_path.into(),
        }
    }

    /// Sign in with the credentials provider
    ///
    /// `_previous` is the message the form currently shows.
    pub async fn authenticate(&self, _previous: Option<&str>, form: &FormInput) -> AuthOutcome {
        let outcome =
            AuthOutcome::from_sign_in(self.provider.sign_in(CREDENTIALS_PROVIDER, form).await);

        match &outcome {
            AuthOutcome::Success(_) => {}
            AuthOutcome::InvalidCredentials => tracing::debug!("sign-in rejected"),
            AuthOutcome::OtherAuthError { kind } => {
                tracing::warn!(kind = %kind, "sign-in failed")
            }
            AuthOutcome::Unrecognized { cause } => {
                tracing::error!(error = %cause, "sign-in failed unexpectedly")
            }
        }

        outcome
    }

    /// Terminate `session_token` (if any) and navigate home
    pub async fn sign_out(&self, session_token: Option<&str>) -> ActionResult<SignOut> {
        let out = self
            .provider
            .sign_out(SignOutOptions {
                session_token: session_token.map(str::to_string),
                redirect_to: self.home_path.clone(),
            })
            .await?;
        Ok(out)
    }
}
