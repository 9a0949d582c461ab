use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use common::errors::{AuthError, ServiceError};

use crate::handlers::ErrorResponse;
use crate::state::AppState;

/// Resolve the bearer access token to an active user and attach it to the request
#[tracing::instrument(skip(state, req, next))]
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ErrorResponse> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| {
            tracing::warn!("Missing or malformed authorization header");
            ErrorResponse::from(ServiceError::from(AuthError::CouldNotValidateCredentials))
        })?;

    let user = state.auth.current_user(token).await.map_err(|e| {
        tracing::warn!(error = %e, "Rejected access token");
        ErrorResponse::from(e)
    })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
