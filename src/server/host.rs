//! Shared state handed to every handler
//!
//! Everything here is constructed once by the [`ServerBuilder`] and cloned
//! per request; the clones share the underlying store, provider and cache.
//!
//! [`ServerBuilder`]: crate::server::ServerBuilder

use crate::config::RoutesConfig;
use crate::core::events::PageCache;
use crate::core::service::{AuthActions, InvoiceActions};
use std::sync::Arc;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub invoices: InvoiceActions,
    pub auth: AuthActions,
    /// Invalidated after every successful mutation
    pub cache: Arc<dyn PageCache>,
    pub routes: Arc<RoutesConfig>,
}

impl AppState {
    pub fn new(
        invoices: InvoiceActions,
        auth: AuthActions,
        cache: Arc<dyn PageCache>,
        routes: RoutesConfig,
    ) -> Self {
        Self {
            invoices,
            auth,
            cache,
            routes: Arc::new(routes),
        }
    }
}
