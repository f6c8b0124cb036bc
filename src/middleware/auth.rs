use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth;
use crate::database::users;
use crate::error::ApiError;
use crate::state::AppState;

/// Verified session context attached to the request by [`authenticate`].
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub session_version: i32,
}

/// Bearer-token gate for protected routes. Terminal in one hop:
/// missing header or token segment, failed verification, unknown account, or
/// a stale session version each reject the request before the handler runs.
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers)?;

    let claims = auth::verify_token(&token, &state.config.security.jwt_secret)
        .map_err(|_| ApiError::bad_request("Session expired, please login to continue"))?;

    let user = users::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("Account not found"))?;

    // Login and logout bump the account's counter; a token minted against an
    // older value belongs to a superseded session.
    if user.session_version != claims.sv {
        return Err(ApiError::unauthorized(
            "Authentication failed: account is not logged in",
        ));
    }

    request.extensions_mut().insert(CurrentUser {
        user_id: user.id,
        session_version: user.session_version,
    });

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::bad_request("Token is not passed to headers"))?;

    let value = header
        .to_str()
        .map_err(|_| ApiError::bad_request("Token is not passed to headers"))?;

    let token = value
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| ApiError::bad_request("Token not found"))?;

    Ok(token.to_string())
}
