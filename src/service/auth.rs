use crate::config::AuthConfig;
use crate::error::AuthError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use std::time::Duration;

/// 已认证用户
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// 身份校验: bearer token -> 用户
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// 托管身份平台客户端 (GET {url}/auth/v1/user)
pub struct HttpAuthProvider {
    client: reqwest::Client,
    user_url: String,
    api_key: String,
}

impl HttpAuthProvider {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AuthError::Unavailable(format!("http client: {e}")))?;
        Ok(Self {
            client,
            user_url: format!("{}/auth/v1/user", config.url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }

    fn headers(&self, token: &str) -> Result<HeaderMap, AuthError> {
        let mut headers = HeaderMap::new();
        let bearer =
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| AuthError::InvalidToken)?;
        headers.insert(AUTHORIZATION, bearer);
        if !self.api_key.is_empty() {
            let key = HeaderValue::from_str(&self.api_key)
                .map_err(|e| AuthError::Unavailable(format!("invalid api key header: {e}")))?;
            headers.insert("apikey", key);
        }
        Ok(headers)
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    #[tracing::instrument(name = "auth_validate_token", skip_all)]
    async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let resp = self
            .client
            .get(&self.user_url)
            .headers(self.headers(token)?)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AuthError::InvalidToken);
        }
        if !status.is_success() {
            return Err(AuthError::Unavailable(format!("status {status}")));
        }

        resp.json::<AuthenticatedUser>()
            .await
            .map_err(|e| AuthError::Unavailable(format!("unexpected user payload: {e}")))
    }
}

/// 从 Authorization 头中取出 bearer token
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingToken)?.trim();
    let (scheme, token) = value.split_once(' ').ok_or(AuthError::MissingToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MissingToken);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(bearer_token(Some("bearer   tok ")), Ok("tok"));
        assert_eq!(bearer_token(None), Err(AuthError::MissingToken));
        assert_eq!(bearer_token(Some("Basic dXNlcg==")), Err(AuthError::MissingToken));
        assert_eq!(bearer_token(Some("Bearer ")), Err(AuthError::MissingToken));
    }
}
