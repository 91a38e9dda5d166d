use crate::api::AppState;
use crate::error::ApiError;
use crate::service::auth::bearer_token;
use crate::service::AuthenticatedUser;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};

/// 已认证请求的用户 (提取器)
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let token = bearer_token(header)?;
        let user = state.auth.authenticate(token).await?;
        Ok(AuthUser(user))
    }
}
