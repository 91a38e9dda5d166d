use crate::api::{AppState, AuthUser};
use crate::error::ApiError;
use crate::models::{
    AggregationResult, Dimension, DocumentPayload, ExtractedFields, ExtractionOutcome, FlagSummary,
    InvoiceRecord, RankedEntry,
};
use crate::service::export::export_invoices_csv;
use axum::{
    extract::{rejection::JsonRejection, Json, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;

/// top 接口允许的最大条数
const MAX_TOP_LIMIT: usize = 100;

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 用户发票列表
pub async fn list_invoices(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<InvoiceRecord>>, ApiError> {
    let records = state.analytics.invoices(&user.id).await?;
    Ok(Json(records))
}

/// 导出发票 CSV
pub async fn export_invoices(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Response, ApiError> {
    let records = state.analytics.invoices(&user.id).await?;
    let csv = export_invoices_csv(&records)
        .map_err(|e| ApiError::Internal(format!("csv export failed: {e}")))?;
    tracing::info!("user {}: exported {} invoices", user.id, records.len());
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"invoices.csv\""),
        ],
        csv,
    )
        .into_response())
}

/// 欺诈 / 合规标记汇总
pub async fn flag_summary(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<FlagSummary>, ApiError> {
    let summary = state
        .analytics
        .flag_summary(&user.id, state.settings.fraud_threshold)
        .await?;
    Ok(Json(summary))
}

/// 支出分析: byVendor / byMonth / byCategory / forecastNextMonth
pub async fn spend_analytics(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<AggregationResult>, ApiError> {
    let result = state.analytics.spend_summary(&user.id).await?;
    Ok(Json(result))
}

/// 某维度的 Top-N (dimension=vendor|category|month, limit=N)
pub async fn top_spend(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<RankedEntry>>, ApiError> {
    let dimension = params
        .get("dimension")
        .map(|d| d.parse::<Dimension>())
        .transpose()
        .map_err(ApiError::BadRequest)?
        .unwrap_or(Dimension::Vendor);

    let limit = match params.get("limit") {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=MAX_TOP_LIMIT).contains(n))
            .ok_or_else(|| {
                ApiError::BadRequest(format!("limit must be between 1 and {MAX_TOP_LIMIT}"))
            })?,
        None => state.settings.top_n,
    };

    let entries = state
        .analytics
        .top_entries(&user.id, dimension, limit, &state.settings.currency_symbol)
        .await?;
    Ok(Json(entries))
}

/// 发票字段识别 (视觉模型)
pub async fn extract_fields(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<DocumentPayload>, JsonRejection>,
) -> Result<Json<ExtractedFields>, ApiError> {
    let Json(document) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    document
        .validate(state.max_document_bytes)
        .map_err(ApiError::BadRequest)?;

    match state.extractor.extract(&document).await {
        ExtractionOutcome::Success(fields) => {
            tracing::info!("user {}: extracted invoice fields", user.id);
            Ok(Json(fields))
        }
        ExtractionOutcome::MalformedResponse { raw } => {
            tracing::warn!("vision service returned malformed content: {}", raw);
            Err(ApiError::Upstream(
                "vision service returned a malformed response".to_string(),
            ))
        }
        ExtractionOutcome::UpstreamError { status, details } => {
            let status = status.map_or_else(|| "no response".to_string(), |s| s.to_string());
            Err(ApiError::Upstream(format!(
                "vision service error ({status}): {details}"
            )))
        }
    }
}
