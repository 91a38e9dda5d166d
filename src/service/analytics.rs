use crate::config::MalformedRecordPolicy;
use crate::error::{AnalyticsError, SourceError};
use crate::models::{AggregationResult, Dimension, FlagSummary, InvoiceRecord, RankedEntry};
use crate::service::{aggregator, flags, presenter, RecordSource};
use std::sync::Arc;

/// 分析服务: fetch -> aggregate, 数据源以依赖注入方式提供
pub struct AnalyticsService {
    source: Arc<dyn RecordSource>,
    policy: MalformedRecordPolicy,
}

impl AnalyticsService {
    pub fn new(source: Arc<dyn RecordSource>, policy: MalformedRecordPolicy) -> Self {
        Self { source, policy }
    }

    /// 用户发票; 数据源报告 NotFound 时视为尚无发票
    pub async fn invoices(&self, user_id: &str) -> Result<Vec<InvoiceRecord>, SourceError> {
        match self.source.fetch_invoices_for_user(user_id).await {
            Err(SourceError::NotFound(_)) => Ok(Vec::new()),
            other => other,
        }
    }

    #[tracing::instrument(name = "spend_summary", skip(self))]
    pub async fn spend_summary(&self, user_id: &str) -> Result<AggregationResult, AnalyticsError> {
        let records = self.invoices(user_id).await?;
        self.aggregate(user_id, &records)
    }

    pub async fn top_entries(
        &self,
        user_id: &str,
        dimension: Dimension,
        limit: usize,
        currency_symbol: &str,
    ) -> Result<Vec<RankedEntry>, AnalyticsError> {
        let result = self.spend_summary(user_id).await?;
        Ok(presenter::top_n(result.grouping(dimension), limit, currency_symbol))
    }

    #[tracing::instrument(name = "flag_summary", skip(self))]
    pub async fn flag_summary(
        &self,
        user_id: &str,
        threshold: f64,
    ) -> Result<FlagSummary, AnalyticsError> {
        let records = self.invoices(user_id).await?;
        Ok(flags::summarize_flags(&records, threshold))
    }

    fn aggregate(
        &self,
        user_id: &str,
        records: &[InvoiceRecord],
    ) -> Result<AggregationResult, AnalyticsError> {
        match self.policy {
            MalformedRecordPolicy::Reject => Ok(aggregator::try_aggregate(records)?),
            MalformedRecordPolicy::Skip => {
                let aggregation = aggregator::aggregate(records);
                if !aggregation.skipped.is_empty() {
                    tracing::warn!(
                        "user {}: skipped {} of {} invoices with malformed createdAt (first: {} - {})",
                        user_id,
                        aggregation.skipped.len(),
                        records.len(),
                        aggregation.skipped[0].id,
                        aggregation.skipped[0].reason
                    );
                }
                tracing::info!(
                    "user {}: aggregated {} invoices into {} months",
                    user_id,
                    records.len() - aggregation.skipped.len(),
                    aggregation.result.by_month.len()
                );
                Ok(aggregation.result)
            }
        }
    }
}
