//! Request audit middleware.
//!
//! Logs every API request with caller, method, path, and response
//! status. Runs innermost (after identity has injected `Caller`).

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::access::Caller;

pub async fn log_access(
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let caller = match req.extensions().get::<Caller>() {
        Some(Caller::Known { user, .. }) => user.username.clone(),
        _ => "anonymous".to_string(),
    };

    let started = std::time::Instant::now();
    let response = next.run(req).await;

    tracing::info!(
        caller,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "{method} {path}"
    );

    response
}
