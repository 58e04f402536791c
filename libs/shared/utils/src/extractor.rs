use axum::{body::Body, http::Request, middleware::Next, response::Response};

use shared_models::error::AppError;
use shared_models::session::SessionUser;

/// Header set by the upstream gateway once it has authenticated the caller.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Middleware resolving the caller identity from the gateway header.
///
/// Authentication is handled upstream; a request that reaches this service
/// without a usable identity header is rejected rather than guessed at.
pub async fn identity_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::Auth("Missing caller identity header".to_string()))?;

    let value = header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid caller identity header".to_string()))?;

    let user_id: i64 = value
        .parse()
        .map_err(|_| AppError::Auth("Invalid caller identity header".to_string()))?;

    request.extensions_mut().insert(SessionUser::new(user_id));

    Ok(next.run(request).await)
}
