use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 聚合错误: 仅在记录的 createdAt 缺失或无法解析时出现
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("invalid invoice record {id}: {reason}")]
    InvalidInput { id: String, reason: String },
}

/// 数据源错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("not authorized to read invoices: {0}")]
    Unauthorized(String),
    #[error("no invoices found: {0}")]
    NotFound(String),
    #[error("invoice store unavailable: {0}")]
    TransientIo(String),
}

impl From<sqlx::Error> for SourceError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => SourceError::NotFound(e.to_string()),
            // 42501 insufficient_privilege (行级安全拒绝)
            sqlx::Error::Database(db) if db.code().as_deref() == Some("42501") => {
                SourceError::Unauthorized(db.message().to_string())
            }
            // 22P02 invalid_text_representation: user id 不是合法 uuid, 不可能有发票
            sqlx::Error::Database(db) if db.code().as_deref() == Some("22P02") => {
                SourceError::NotFound(db.message().to_string())
            }
            _ => SourceError::TransientIo(e.to_string()),
        }
    }
}

/// 认证错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid or expired session")]
    InvalidToken,
    #[error("auth provider unavailable: {0}")]
    Unavailable(String),
}

/// 分析服务错误
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// HTTP 层错误, 统一输出 {"error": "..."}
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(String),
    #[error("{0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed with {}: {}", status, self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingToken | AuthError::InvalidToken => {
                ApiError::Unauthorized(e.to_string())
            }
            AuthError::Unavailable(_) => ApiError::Upstream(e.to_string()),
        }
    }
}

impl From<SourceError> for ApiError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Unauthorized(_) => ApiError::Unauthorized(e.to_string()),
            // AnalyticsService::invoices 已将 NotFound 转为空列表; 到达此处说明调用方绕过了该约定
            SourceError::NotFound(_) => ApiError::Internal(e.to_string()),
            SourceError::TransientIo(_) => ApiError::Upstream(e.to_string()),
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(e: AnalyticsError) -> Self {
        match e {
            AnalyticsError::Source(source) => source.into(),
            AnalyticsError::Aggregate(agg) => ApiError::Internal(agg.to_string()),
        }
    }
}
