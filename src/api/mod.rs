pub mod auth;
pub mod handlers;

pub use auth::AuthUser;
pub use handlers::*;

use crate::config::AnalyticsConfig;
use crate::service::{AnalyticsService, AuthProvider, FieldExtractor};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub analytics: Arc<AnalyticsService>,
    pub auth: Arc<dyn AuthProvider>,
    pub extractor: Arc<dyn FieldExtractor>,
    pub settings: Arc<AnalyticsConfig>,
    pub max_document_bytes: usize,
}

/// 构建路由
pub fn build_router(state: AppState) -> Router {
    // base64 编码膨胀 4/3, 另加 JSON 外壳
    let body_limit = state.max_document_bytes / 3 * 4 + 4 + 64 * 1024;

    let invoice_routes = Router::<AppState>::new()
        .route("/api/invoices", get(list_invoices))
        .route("/api/invoices/export", get(export_invoices))
        .route("/api/invoices/flags", get(flag_summary))
        .route(
            "/api/extract",
            post(extract_fields).layer(DefaultBodyLimit::max(body_limit)),
        );

    let analytics_routes = Router::<AppState>::new()
        .route("/api/analytics", get(spend_analytics))
        .route("/api/analytics/top", get(top_spend));

    Router::<AppState>::new()
        .route("/health", get(health_check))
        .merge(invoice_routes)
        .merge(analytics_routes)
        .with_state(state)
}
