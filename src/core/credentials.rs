//! Username/password [`AuthProvider`]
//!
//! Users come from configuration with bcrypt password hashes. Sessions are
//! opaque random tokens kept in memory with an expiry.

use crate::config::{AuthConfig, UserConfig};
use crate::core::auth::{
    AuthErrorKind, AuthProvider, CREDENTIALS_PROVIDER, Session, SignIn, SignInError, SignOut,
    SignOutOptions,
};
use crate::core::form::FormInput;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use axum::http::Uri;
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;
use validator::Validate;

/// Submitted sign-in fields
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6))]
    pub password: String,
}

impl Credentials {
    /// Read and validate credentials from a form; `None` when unusable
    pub fn from_form(form: &FormInput) -> Option<Self> {
        let credentials = Credentials {
            email: form.get("email")?.trim().to_lowercase(),
            password: form.get("password")?.to_string(),
        };
        credentials.validate().ok()?;
        Some(credentials)
    }
}

/// Credentials provider backed by configured users
#[derive(Clone)]
pub struct CredentialsProvider {
    users: Arc<HashMap<String, UserConfig>>,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    session_ttl: Duration,
    default_redirect: String,
}

impl CredentialsProvider {
    /// Create a provider for `users`, keyed by lowercased email
    pub fn new(users: impl IntoIterator<Item = UserConfig>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.email.trim().to_lowercase(), user))
            .collect();

        Self {
            users: Arc::new(users),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            session_ttl: Duration::days(30),
            default_redirect: "/dashboard".to_string(),
        }
    }

    /// Create a provider from the `auth` configuration section
    ///
    /// A lifetime too long for chrono saturates; sign-in then reports it as
    /// an unrecognized failure.
    pub fn from_config(config: &AuthConfig) -> Self {
        let ttl = Duration::try_seconds(config.session_ttl_secs).unwrap_or(Duration::MAX);
        Self::new(config.users.iter().cloned()).with_session_ttl(ttl)
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Where a successful sign-in navigates when the form names no target
    pub fn with_default_redirect(mut self, path: impl Into<String>) -> Self {
        self.default_redirect = path.into();
        self
    }

    /// Hash a password for storage in configuration
    pub fn hash_password(password: &str) -> Result<String> {
        bcrypt::hash(password, bcrypt::DEFAULT_COST).context("failed to hash password")
    }

    /// Look up a live session; expired sessions are dropped
    pub fn session(&self, token: &str) -> Result<Option<Session>> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        match sessions.get(token) {
            Some(session) if session.expires_at > Utc::now() => Ok(Some(session.clone())),
            Some(_) => {
                sessions.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn redirect_target(&self, form: &FormInput) -> String {
        form.get("redirectTo")
            .filter(|path| is_local_path(path))
            .map(str::to_string)
            .unwrap_or_else(|| self.default_redirect.clone())
    }
}

/// Same-site path usable as a `Location` header
///
/// Browsers read `\` as `/`, so `/\host` leaves the site just like `//host`.
fn is_local_path(path: &str) -> bool {
    if !path.starts_with('/')
        || path.starts_with("//")
        || path.contains('\\')
        || path.chars().any(char::is_control)
    {
        return false;
    }
    match path.parse::<Uri>() {
        Ok(uri) => uri.scheme().is_none() && uri.authority().is_none(),
        Err(_) => false,
    }
}

#[async_trait]
impl AuthProvider for CredentialsProvider {
    async fn sign_in(&self, provider: &str, form: &FormInput) -> Result<SignIn, SignInError> {
        if provider != CREDENTIALS_PROVIDER {
            return Err(SignInError::auth(AuthErrorKind::Configuration));
        }

        let Some(credentials) = Credentials::from_form(form) else {
            return Err(SignInError::auth(AuthErrorKind::CredentialsSignin));
        };

        let Some(user) = self.users.get(&credentials.email).cloned() else {
            tracing::info!(email = %credentials.email, "sign-in for unknown user");
            return Err(SignInError::auth(AuthErrorKind::CredentialsSignin));
        };

        let hash = user.password_hash.clone();
        let password = credentials.password;
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .context("password verification task failed")?
            .with_context(|| format!("stored password hash for '{}' is unusable", user.email))?;

        if !matches {
            tracing::info!(email = %user.email, "sign-in with wrong password");
            return Err(SignInError::auth(AuthErrorKind::CredentialsSignin));
        }

        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.session_ttl)
            .ok_or_else(|| anyhow!("session lifetime {} is out of range", self.session_ttl))?;
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user_id: user.id.clone(),
            email: user.email.clone(),
            expires_at,
        };
        let redirect_to = self.redirect_target(form);

        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(session.token.clone(), session.clone());
        drop(sessions);

        tracing::info!(user_id = %user.id, "signed in");

        Ok(SignIn {
            session,
            redirect_to,
        })
    }

    async fn sign_out(&self, options: SignOutOptions) -> Result<SignOut> {
        if let Some(token) = options.session_token.as_deref() {
            let removed = self
                .sessions
                .write()
                .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?
                .remove(token);
            if let Some(session) = removed {
                tracing::info!(user_id = %session.user_id, "signed out");
            }
        }

        Ok(SignOut {
            redirect_to: options.redirect_to,
        })
    }
}
