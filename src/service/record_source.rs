use crate::error::SourceError;
use crate::models::InvoiceRecord;
use async_trait::async_trait;
use std::collections::HashMap;

/// 发票数据源: 按用户取回已物化的发票记录
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_invoices_for_user(&self, user_id: &str)
        -> Result<Vec<InvoiceRecord>, SourceError>;
}

/// 内存数据源 (测试 / 本地演示)
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecordSource {
    records: HashMap<String, Vec<InvoiceRecord>>,
}

impl InMemoryRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: &str, records: Vec<InvoiceRecord>) -> Self {
        self.records.insert(user_id.to_string(), records);
        self
    }
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    async fn fetch_invoices_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<InvoiceRecord>, SourceError> {
        self.records
            .get(user_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("user {user_id}")))
    }
}
