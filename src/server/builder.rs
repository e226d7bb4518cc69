//! ServerBuilder for fluent API to build HTTP servers

use super::host::AppState;
use super::router::build_routes;
use crate::config::AppConfig;
use crate::core::auth::{AuthProvider, NoAuthProvider};
use crate::core::credentials::CredentialsProvider;
use crate::core::events::{PageCache, RevalidationBus};
use crate::core::service::{AuthActions, InvoiceActions};
use crate::core::store::InvoiceStore;
use crate::storage::InMemoryInvoiceStore;
use anyhow::Result;
use axum::Router;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Builder for the invoice action server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(config)
///     .with_store(InMemoryInvoiceStore::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    store: Option<Arc<dyn InvoiceStore>>,
    auth_provider: Option<Arc<dyn AuthProvider>>,
    page_cache: Option<Arc<dyn PageCache>>,
    today: Option<Arc<dyn Fn() -> NaiveDate + Send + Sync>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with default configuration
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            store: None,
            auth_provider: None,
            page_cache: None,
            today: None,
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the invoice store (required)
    pub fn with_store(mut self, store: impl InvoiceStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set the authentication provider
    ///
    /// Without one, configured users get a [`CredentialsProvider`]; with no
    /// users configured every sign-in is refused.
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth_provider = Some(Arc::new(provider));
        self
    }

    /// Set the page cache notified after mutations (default: a fresh [`RevalidationBus`])
    pub fn with_page_cache(mut self, cache: impl PageCache + 'static) -> Self {
        self.page_cache = Some(Arc::new(cache));
        self
    }

    /// Fix the creation date of new invoices
    pub fn with_today(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Some(Arc::new(today));
        self
    }

    /// Add custom routes to the server
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Pick the store from `database.url`
    ///
    /// With a URL (and the `postgres` feature) a pool is opened and the
    /// schema applied; without one the in-memory store is used.
    pub async fn with_configured_store(mut self) -> Result<Self> {
        let Some(url) = self.config.database.url.clone() else {
            tracing::info!("no database configured, using in-memory store");
            return Ok(self.with_store(InMemoryInvoiceStore::new()));
        };

        self.store = Some(connect_store(&url, self.config.database.max_connections).await?);
        Ok(self)
    }

    /// Build the handler state
    pub fn build_state(&mut self) -> Result<AppState> {
        self.config.validate()?;

        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("InvoiceStore is required. Call .with_store()"))?;

        let routes = self.config.routes.clone();

        let mut invoices = InvoiceActions::new(store, routes.invoices.clone());
        if let Some(today) = self.today.take() {
            invoices = invoices.with_today(move || today());
        }

        let provider = match self.auth_provider.take() {
            Some(provider) => provider,
            None if !self.config.auth.users.is_empty() => Arc::new(
                CredentialsProvider::from_config(&self.config.auth)
                    .with_default_redirect(routes.after_sign_in.clone()),
            ),
            None => {
                tracing::warn!("no users configured, sign-in is disabled");
                Arc::new(NoAuthProvider)
            }
        };
        let auth = AuthActions::new(provider, routes.home.clone());

        let cache = self
            .page_cache
            .take()
            .unwrap_or_else(|| Arc::new(RevalidationBus::default()));

        Ok(AppState::new(invoices, auth, cache, routes))
    }

    /// Build the final router
    ///
    /// This generates the invoice mutation routes under the configured
    /// listing path, the session routes and health checks, wrapped in a
    /// request trace layer.
    pub fn build(mut self) -> Result<Router> {
        let state = self.build_state()?;

        let mut app = build_routes(state);
        for custom_router in std::mem::take(&mut self.custom_routes) {
            app = app.merge(custom_router);
        }

        Ok(app.layer(TraceLayer::new_for_http()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new()
    ///     .with_store(store)
    ///     .serve("127.0.0.1:3000").await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

#[cfg(feature = "postgres")]
async fn connect_store(url: &str, max_connections: u32) -> Result<Arc<dyn InvoiceStore>> {
    let store = crate::storage::PostgresInvoiceStore::connect(url, max_connections).await?;
    crate::storage::ensure_schema(store.pool()).await?;
    tracing::info!(max_connections, "connected to PostgreSQL");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn connect_store(_url: &str, _max_connections: u32) -> Result<Arc<dyn InvoiceStore>> {
    anyhow::bail!("database.url is set but the `postgres` feature is disabled")
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
