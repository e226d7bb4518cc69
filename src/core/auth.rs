//! Authentication collaborator
//!
//! Session mechanics belong to an [`AuthProvider`]. This module defines the
//! provider contract and the tagged [`AuthOutcome`] the sign-in action
//! reduces provider results to:
//! - a recognized `CredentialsSignin` failure becomes "Invalid credentials"
//! - any other recognized failure becomes "Something went wrong"
//! - an unrecognized failure is carried through untouched

use crate::core::form::FormInput;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Provider id of username/password sign-in
pub const CREDENTIALS_PROVIDER: &str = "credentials";

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong";

/// Recognized authentication failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// Wrong, unknown or malformed credentials
    CredentialsSignin,
    /// The provider refused the sign-in outright
    AccessDenied,
    /// The requested provider is not configured
    Configuration,
    /// The provider failed while completing the sign-in
    CallbackRouteError,
}

impl AuthErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorKind::CredentialsSignin => "CredentialsSignin",
            AuthErrorKind::AccessDenied => "AccessDenied",
            AuthErrorKind::Configuration => "Configuration",
            AuthErrorKind::CallbackRouteError => "CallbackRouteError",
        }
    }
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by [`AuthProvider::sign_in`]
#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    /// An authentication-domain failure the action knows how to word
    #[error("authentication failed ({kind})")]
    Auth { kind: AuthErrorKind },

    /// Anything else; the action propagates it
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SignInError {
    pub fn auth(kind: AuthErrorKind) -> Self {
        SignInError::Auth { kind }
    }
}

/// An established session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Successful sign-in: the session and where to navigate next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignIn {
    pub session: Session,
    pub redirect_to: String,
}

/// Parameters of a sign-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOutOptions {
    pub session_token: Option<String>,
    pub redirect_to: String,
}

/// Completed sign-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOut {
    pub redirect_to: String,
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Verify `credentials` with `provider` and establish a session
    async fn sign_in(&self, provider: &str, credentials: &FormInput)
    -> Result<SignIn, SignInError>;

    /// Terminate a session
    async fn sign_out(&self, options: SignOutOptions) -> Result<SignOut>;
}

/// Provider that refuses every sign-in (used when none is configured)
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn sign_in(&self, _: &str, _: &FormInput) -> Result<SignIn, SignInError> {
        Err(SignInError::auth(AuthErrorKind::AccessDenied))
    }

    async fn sign_out(&self, options: SignOutOptions) -> Result<SignOut> {
        Ok(SignOut {
            redirect_to: options.redirect_to,
        })
    }
}

/// Tagged result of the sign-in action
#[derive(Debug)]
pub enum AuthOutcome {
    Success(SignIn),
    InvalidCredentials,
    OtherAuthError { kind: AuthErrorKind },
    Unrecognized { cause: anyhow::Error },
}

impl AuthOutcome {
    /// Reduce a provider result
    pub fn from_sign_in(result: Result<SignIn, SignInError>) -> Self {
        match result {
            Ok(sign_in) => AuthOutcome::Success(sign_in),
            Err(SignInError::Auth {
                kind: AuthErrorKind::CredentialsSignin,
            }) => AuthOutcome::InvalidCredentials,
            Err(SignInError::Auth { kind }) => AuthOutcome::OtherAuthError { kind },
            Err(SignInError::Other(cause)) => AuthOutcome::Unrecognized { cause },
        }
    }

    /// User-facing message for recognized failures
    pub fn message(&self) -> Option<&'static str> {
        match self {
            AuthOutcome::InvalidCredentials => Some(INVALID_CREDENTIALS),
            AuthOutcome::OtherAuthError { .. } => Some(SOMETHING_WENT_WRONG),
            AuthOutcome::Success(_) | AuthOutcome::Unrecognized { .. } => None,
        }
    }

    /// `Ok(None)` on success, `Ok(Some(message))` on a recognized failure,
    /// `Err(cause)` on anything else
    pub fn into_message(self) -> Result<Option<String>> {
        match self {
            AuthOutcome::Unrecognized { cause } => Err(cause),
            other => Ok(other.message().map(str::to_string)),
        }
    }
}
