//! HTTP handlers for the invoice and session actions
//!
//! The actions themselves never navigate or touch the page cache. The handlers
//! perform both: a successful mutation revalidates the listing, then answers
//! `303 See Other`; a failed one answers `422` with the form state.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::{Value, json};

use crate::core::auth::{AuthOutcome, SOMETHING_WENT_WRONG, SignIn};
use crate::core::error::ActionResult;
use crate::core::form::{ActionOutcome, FormInput, FormState};
use crate::server::host::{AppState, SESSION_COOKIE};

/// Turn a create/update outcome into a response
fn respond(state: &AppState, outcome: ActionOutcome) -> Response {
    match outcome {
        ActionOutcome::Success {
            revalidate,
            next_path,
        } => {
            state.cache.revalidate(&revalidate);
            Redirect::to(&next_path).into_response()
        }
        ActionOutcome::Failure { state } => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(state)).into_response()
        }
    }
}

/// `POST {listing}/create`
pub async fn create_invoice(State(state): State<AppState>, form: FormInput) -> Response {
    let outcome = state.invoices.create(&FormState::default(), &form).await;
    respond(&state, outcome)
}

/// `POST {listing}/{id}/edit`
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormInput,
) -> Response {
    let outcome = state
        .invoices
        .update_invoice(&id, &FormState::default(), &form)
        .await;
    respond(&state, outcome)
}

/// `POST {listing}/{id}/delete`
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ActionResult<StatusCode> {
    let revalidation = state.invoices.delete_invoice(&id).await?;
    state.cache.revalidate(&revalidation.path);
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /login`
pub async fn login(State(state): State<AppState>, form: FormInput) -> ActionResult<Response> {
    match state.auth.authenticate(None, &form).await {
        AuthOutcome::Success(sign_in) => Ok(signed_in(sign_in)),
        failure => {
            let message = failure
                .into_message()?
                .unwrap_or_else(|| SOMETHING_WENT_WRONG.to_string());
            Ok((StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response())
        }
    }
}

fn signed_in(sign_in: SignIn) -> Response {
    let max_age = (sign_in.session.expires_at - chrono::Utc::now())
        .num_seconds()
        .max(0);
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, sign_in.session.token, max_age
    );
    (
        [(header::SET_COOKIE, cookie)],
        Redirect::to(&sign_in.redirect_to),
    )
        .into_response()
}

/// `POST /logout`
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ActionResult<Response> {
    let token = session_token(&headers);
    let out = state.auth.sign_out(token.as_deref()).await?;

    let cleared = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE
    );
    Ok(([(header::SET_COOKIE, cleared)], Redirect::to(&out.redirect_to)).into_response())
}

/// `GET /health`, `GET /healthz`
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Session token from the `Cookie` header(s), if any
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc123; lang=en"),
        );
        assert_eq!(session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_session_token_absent_or_empty() {
        assert_eq!(session_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_session_token_across_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("session=xyz"));
        assert_eq!(session_token(&headers), Some("xyz".to_string()));
    }
}
