use crate::db::queries;
use crate::error::SourceError;
use crate::models::InvoiceRecord;
use crate::service::RecordSource;
use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;

/// Postgres 数据源: 单次查询带超时, 瞬时故障重试一次
pub struct PgRecordSource {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgRecordSource {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn fetch_once(&self, user_id: &str) -> Result<Vec<InvoiceRecord>, SourceError> {
        let start = std::time::Instant::now();
        let rows = tokio::time::timeout(
            self.query_timeout,
            queries::list_invoices_for_user(&self.pool, user_id),
        )
        .await
        .map_err(|_| {
            SourceError::TransientIo(format!("query timed out after {:?}", self.query_timeout))
        })??;

        tracing::debug!(
            "loaded {} invoices for user {} in {:?}",
            rows.len(),
            user_id,
            start.elapsed()
        );
        Ok(rows.into_iter().map(InvoiceRecord::from).collect())
    }
}

#[async_trait]
impl RecordSource for PgRecordSource {
    async fn fetch_invoices_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<InvoiceRecord>, SourceError> {
        match self.fetch_once(user_id).await {
            Err(SourceError::TransientIo(reason)) => {
                tracing::warn!("invoice query for user {} failed ({}), retrying once", user_id, reason);
                self.fetch_once(user_id).await
            }
            other => other,
        }
    }
}
