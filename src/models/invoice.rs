use crate::models::amount;
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 缺失供应商名称时的分组名
pub const UNKNOWN_VENDOR: &str = "Unknown";
/// 缺失分类时的分组名
pub const UNCATEGORIZED: &str = "Uncategorized";

/// 合规状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ComplianceStatus {
    Compliant,
    NeedsReview,
    #[default]
    Unknown,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "compliant",
            ComplianceStatus::NeedsReview => "needs_review",
            ComplianceStatus::Unknown => "unknown",
        }
    }
}

impl From<&str> for ComplianceStatus {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "compliant" => ComplianceStatus::Compliant,
            "needs_review" | "needs-review" => ComplianceStatus::NeedsReview,
            _ => ComplianceStatus::Unknown,
        }
    }
}

impl From<String> for ComplianceStatus {
    fn from(raw: String) -> Self {
        ComplianceStatus::from(raw.as_str())
    }
}

/// 发票记录 (聚合的只读输入)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub id: String,
    #[serde(default)]
    pub vendor_name: Option<String>,
    #[serde(
        default,
        serialize_with = "amount::serialize_opt",
        deserialize_with = "amount::deserialize_lenient"
    )]
    pub total_amount: Option<BigDecimal>,
    #[serde(default)]
    pub category: Option<String>,
    /// 原始时间戳文本, 由聚合器解析
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_flagged: bool,
    #[serde(default)]
    pub compliance_status: ComplianceStatus,
    #[serde(default)]
    pub fraud_score: Option<f64>,
    #[serde(default)]
    pub anomaly_flags: Option<Vec<String>>,
}

impl InvoiceRecord {
    pub fn vendor_key(&self) -> &str {
        non_blank(self.vendor_name.as_deref()).unwrap_or(UNKNOWN_VENDOR)
    }

    pub fn category_key(&self) -> &str {
        non_blank(self.category.as_deref()).unwrap_or(UNCATEGORIZED)
    }

    pub fn amount_or_zero(&self) -> BigDecimal {
        self.total_amount.clone().unwrap_or_else(BigDecimal::zero)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// 发票表行 (invoices)
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceRow {
    pub id: String,
    pub vendor_name: Option<String>,
    pub total_amount: Option<BigDecimal>,
    pub category: Option<String>,
    pub created_at: Option<String>,
    pub is_flagged: Option<bool>,
    pub compliance_status: Option<String>,
    pub fraud_score: Option<f64>,
    pub anomaly_flags: Option<Vec<String>>,
}

impl From<InvoiceRow> for InvoiceRecord {
    fn from(row: InvoiceRow) -> Self {
        Self {
            id: row.id,
            vendor_name: row.vendor_name,
            total_amount: row.total_amount,
            category: row.category,
            created_at: row.created_at,
            is_flagged: row.is_flagged.unwrap_or(false),
            compliance_status: row
                .compliance_status
                .as_deref()
                .map(ComplianceStatus::from)
                .unwrap_or_default(),
            fraud_score: row.fraud_score,
            anomaly_flags: row.anomaly_flags,
        }
    }
}
