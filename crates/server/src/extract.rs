//! Request extractors: bearer authentication, staff gating, and JSON/query/path
//! wrappers whose rejections render as `ApiError`.

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use deployment::Deployment;
use services::services::auth::Principal;
use tracing::debug;

use crate::{DeploymentImpl, error::ApiError};

/// Caller identified by a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

/// Authenticated caller whose role is `officer` or `admin`.
#[derive(Debug, Clone)]
pub struct StaffUser(pub Principal);

impl FromRequestParts<DeploymentImpl> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        deployment: &DeploymentImpl,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let principal = deployment.auth().authenticate(token).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            ApiError::InvalidToken
        })?;
        Ok(AuthUser(principal))
    }
}

impl FromRequestParts<DeploymentImpl> for StaffUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        deployment: &DeploymentImpl,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, deployment).await?;
        if !principal.is_staff() {
            debug!(user_id = principal.user_id, "Staff route refused");
            return Err(ApiError::StaffOnly);
        }
        Ok(StaffUser(principal))
    }
}

/// Missing or empty credentials are 401; a token that is present but unusable is 403.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Err(ApiError::MissingToken);
    };
    let value = value.to_str().map_err(|_| ApiError::InvalidToken)?;
    match value.trim().split_once(' ') {
        Some((scheme, token)) if !token.trim().is_empty() => {
            if scheme.eq_ignore_ascii_case("bearer") {
                Ok(token.trim())
            } else {
                Err(ApiError::InvalidToken)
            }
        }
        _ => Err(ApiError::MissingToken),
    }
}

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(bearer_token(&headers("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn absent_or_empty_token_is_missing() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(ApiError::MissingToken)
        ));
        assert!(matches!(
            bearer_token(&headers("Bearer ")),
            Err(ApiError::MissingToken)
        ));
        assert!(matches!(
            bearer_token(&headers("Bearer")),
            Err(ApiError::MissingToken)
        ));
    }

    #[test]
    fn token_under_other_scheme_is_invalid() {
        assert!(matches!(
            bearer_token(&headers("Token abc")),
            Err(ApiError::InvalidToken)
        ));
        assert!(matches!(
            bearer_token(&headers("Basic dXNlcjpwYXNz")),
            Err(ApiError::InvalidToken)
        ));
    }
}
