//! Authenticated user extraction.
//!
//! Sessions and tokens are handled upstream; the gateway forwards the
//! verified user id in `X-User-Id`.

use crate::domain::UserId;
use crate::error::AppError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller's user id.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_user_id(parts)
            .map(|id| AuthUser(UserId::new(id.to_string())))
            .ok_or_else(|| AppError::Unauthorized("Missing or invalid X-User-Id header".into()))
    }
}

fn extract_user_id(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(USER_ID_HEADER)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<AuthUser, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_trimmed_user_id() {
        let AuthUser(user) = extract(Some("  user-7 ")).await.unwrap();
        assert_eq!(user.as_str(), "user-7");
    }

    #[tokio::test]
    async fn test_missing_or_blank_header_is_unauthorized() {
        assert!(matches!(extract(None).await, Err(AppError::Unauthorized(_))));
        assert!(matches!(
            extract(Some("   ")).await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
