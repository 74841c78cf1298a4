//! Bearer token identity middleware.
//!
//! Extracts `Authorization: Bearer <token>`, resolves the account and
//! its role (patient takes precedence over doctor), and injects a
//! `Caller` into request extensions for downstream handlers.
//!
//! A missing header is not an error — the caller proceeds as
//! `Caller::Anonymous` and the access rules decide what it may see.
//! A token that matches no account is refused outright.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::access::{resolve_role, Caller};
use crate::api::error::ApiError;
use crate::api::types::{hash_token, ApiContext};
use crate::db::repository::user;

/// Resolve the caller for this request and stash it in extensions.
///
/// Accesses `ApiContext` from request extensions (injected by the
/// Extension layer).
pub async fn resolve_caller(
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match resolve_caller_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn resolve_caller_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);

    let caller = match token {
        None => Caller::Anonymous,
        Some(token) => {
            let conn = ctx.lock_db()?;
            let user = user::find_by_token_hash(&conn, &hash_token(&token))
                .map_err(ApiError::from)?
                .ok_or(ApiError::Unauthorized)?;
            let role = resolve_role(&conn, user.id).map_err(ApiError::from)?;
            Caller::Known { user, role }
        } // MutexGuard dropped here, before any .await
    };

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}
