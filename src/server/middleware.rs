// Session-resolution middleware
//
// Resolves the identifying token from the request header, minting a guest
// session when it is absent or unrecognized, and echoes the active token
// back on the response so first-time clients can persist it.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::AppServer;

/// Header carrying the session token in both directions
pub const SESSION_HEADER: &str = "x-session-token";

pub async fn session_middleware(
    State(server): State<Arc<AppServer>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let identity = server.sessions().resolve(token.as_deref());
    let session_id = identity.session_id.clone();
    request.extensions_mut().insert(identity);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&session_id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}
