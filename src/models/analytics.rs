use crate::models::amount;
use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

/// 聚合结果: 按供应商 / 月份 / 分类的金额汇总及下月预测
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    #[serde(serialize_with = "amount::serialize_map")]
    pub by_vendor: BTreeMap<String, BigDecimal>,
    #[serde(serialize_with = "amount::serialize_map")]
    pub by_month: BTreeMap<String, BigDecimal>,
    #[serde(serialize_with = "amount::serialize_map")]
    pub by_category: BTreeMap<String, BigDecimal>,
    #[serde(serialize_with = "amount::serialize")]
    pub forecast_next_month: BigDecimal,
}

impl AggregationResult {
    pub fn grouping(&self, dimension: Dimension) -> &BTreeMap<String, BigDecimal> {
        match dimension {
            Dimension::Vendor => &self.by_vendor,
            Dimension::Month => &self.by_month,
            Dimension::Category => &self.by_category,
        }
    }
}

/// 宽松策略下被跳过的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub id: String,
    pub reason: String,
}

/// 分组维度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Vendor,
    Month,
    Category,
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vendor" => Ok(Dimension::Vendor),
            "month" => Ok(Dimension::Month),
            "category" => Ok(Dimension::Category),
            other => Err(format!(
                "unknown dimension '{other}', expected vendor, month or category"
            )),
        }
    }
}

/// Top-N 展示条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub label: String,
    #[serde(serialize_with = "amount::serialize")]
    pub amount: BigDecimal,
    pub formatted: String,
}

/// 合规状态分布
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceBreakdown {
    pub compliant: usize,
    pub needs_review: usize,
    pub unknown: usize,
}

/// 高风险发票
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskEntry {
    pub id: String,
    pub vendor_name: String,
    pub fraud_score: f64,
}

/// 欺诈 / 合规标记汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagSummary {
    pub total_invoices: usize,
    pub flagged_count: usize,
    pub compliance: ComplianceBreakdown,
    /// 异常标签 -> 出现次数 (按首次出现顺序)
    pub anomaly_labels: IndexMap<String, usize>,
    pub high_risk: Vec<RiskEntry>,
}
