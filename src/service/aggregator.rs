use crate::error::AggregateError;
use crate::models::{AggregationResult, InvoiceRecord, SkippedRecord};
use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;

/// 预测使用的尾部月份窗口
pub const FORECAST_WINDOW: usize = 3;

/// 宽松聚合的输出: 结果 + 被跳过的记录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub result: AggregationResult,
    pub skipped: Vec<SkippedRecord>,
}

/// 宽松聚合: createdAt 缺失或无法解析的记录整条跳过 (不计入任何分组)
pub fn aggregate(records: &[InvoiceRecord]) -> Aggregation {
    let mut sums = GroupSums::default();
    let mut skipped = Vec::new();

    for record in records {
        match month_key_of(record) {
            Ok(month) => sums.add(record, month),
            Err(AggregateError::InvalidInput { id, reason }) => {
                skipped.push(SkippedRecord { id, reason });
            }
        }
    }

    Aggregation {
        result: sums.finish(),
        skipped,
    }
}

/// 严格聚合: 遇到第一条非法记录即失败
pub fn try_aggregate(records: &[InvoiceRecord]) -> Result<AggregationResult, AggregateError> {
    let mut sums = GroupSums::default();
    for record in records {
        let month = month_key_of(record)?;
        sums.add(record, month);
    }
    Ok(sums.finish())
}

#[derive(Default)]
struct GroupSums {
    by_vendor: BTreeMap<String, BigDecimal>,
    by_month: BTreeMap<String, BigDecimal>,
    by_category: BTreeMap<String, BigDecimal>,
}

impl GroupSums {
    fn add(&mut self, record: &InvoiceRecord, month: String) {
        let amount = record.amount_or_zero();
        add_to(&mut self.by_vendor, record.vendor_key().to_string(), &amount);
        add_to(&mut self.by_category, record.category_key().to_string(), &amount);
        add_to(&mut self.by_month, month, &amount);
    }

    fn finish(self) -> AggregationResult {
        let forecast_next_month = forecast_next_month(&self.by_month);
        AggregationResult {
            by_vendor: self.by_vendor,
            by_month: self.by_month,
            by_category: self.by_category,
            forecast_next_month,
        }
    }
}

fn add_to(map: &mut BTreeMap<String, BigDecimal>, key: String, amount: &BigDecimal) {
    let entry = map.entry(key).or_insert_with(BigDecimal::zero);
    *entry += amount;
}

fn month_key_of(record: &InvoiceRecord) -> Result<String, AggregateError> {
    let raw = record
        .created_at
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AggregateError::InvalidInput {
            id: record.id.clone(),
            reason: "missing createdAt".to_string(),
        })?;
    month_key(raw).ok_or_else(|| AggregateError::InvalidInput {
        id: record.id.clone(),
        reason: format!("unparseable createdAt '{raw}'"),
    })
}

/// 将时间戳截断为 "YYYY-MM" (UTC)
pub fn month_key(raw: &str) -> Option<String> {
    let date = parse_date(raw.trim())?;
    Some(format!("{:04}-{:02}", date.year(), date.month()))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    // Postgres 文本格式, 例如 "2024-01-15 10:30:00.123+00"
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// 下月预测: 最近 FORECAST_WINDOW 个月的算术平均 (保留两位小数)
///
/// 空序列为 0, 单月即该月金额。对每个月的输入单调不减。
pub fn forecast_next_month(by_month: &BTreeMap<String, BigDecimal>) -> BigDecimal {
    // BTreeMap 按 "YYYY-MM" 升序, 即时间顺序
    let window: Vec<&BigDecimal> = by_month.values().rev().take(FORECAST_WINDOW).collect();
    match window.len() {
        0 => BigDecimal::zero(),
        1 => window[0].clone(),
        n => {
            let total = window
                .into_iter()
                .fold(BigDecimal::zero(), |acc, v| acc + v);
            (total / BigDecimal::from(n as i64)).round(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn month_key_accepts_common_timestamp_shapes() {
        assert_eq!(month_key("2024-03-05T10:00:00Z").as_deref(), Some("2024-03"));
        assert_eq!(month_key("2024-03-05T10:00:00.250+02:00").as_deref(), Some("2024-03"));
        assert_eq!(month_key("2024-03-05 10:00:00+00").as_deref(), Some("2024-03"));
        assert_eq!(month_key("2024-03-05T10:00:00").as_deref(), Some("2024-03"));
        assert_eq!(month_key("2024-11-30").as_deref(), Some("2024-11"));
    }

    #[test]
    fn month_key_normalises_offsets_to_utc() {
        // 2024-02-01 01:00 +03:00 == 2024-01-31 22:00 UTC
        assert_eq!(month_key("2024-02-01T01:00:00+03:00").as_deref(), Some("2024-01"));
    }

    #[test]
    fn month_key_rejects_garbage() {
        assert_eq!(month_key("yesterday"), None);
        assert_eq!(month_key("2024-13-01"), None);
        assert_eq!(month_key(""), None);
    }

    #[test]
    fn forecast_of_empty_series_is_zero() {
        assert_eq!(forecast_next_month(&BTreeMap::new()), BigDecimal::zero());
    }

    #[test]
    fn forecast_of_single_month_is_flat() {
        let months = BTreeMap::from([("2024-05".to_string(), dec("420.10"))]);
        assert_eq!(forecast_next_month(&months), dec("420.10"));
    }

    #[test]
    fn forecast_averages_trailing_window() {
        let months = BTreeMap::from([
            ("2023-12".to_string(), dec("9000")),
            ("2024-01".to_string(), dec("100")),
            ("2024-02".to_string(), dec("200")),
            ("2024-03".to_string(), dec("301")),
        ]);
        // 只取最后三个月: (100 + 200 + 301) / 3 = 200.333.. -> 200.33
        assert_eq!(forecast_next_month(&months), dec("200.33"));
    }

    #[test]
    fn forecast_is_monotonic_in_each_month() {
        let base = BTreeMap::from([
            ("2024-01".to_string(), dec("100")),
            ("2024-02".to_string(), dec("250")),
        ]);
        let mut bumped = base.clone();
        bumped.insert("2024-01".to_string(), dec("160"));
        assert!(forecast_next_month(&bumped) >= forecast_next_month(&base));
        assert_eq!(forecast_next_month(&base), dec("175"));
    }
}
