use crate::models::RankedEntry;
use bigdecimal::{BigDecimal, Zero};
use std::collections::BTreeMap;

/// 按金额降序取前 N 项 (金额相同时按名称升序)
pub fn top_n(grouping: &BTreeMap<String, BigDecimal>, n: usize, symbol: &str) -> Vec<RankedEntry> {
    let mut entries: Vec<(&String, &BigDecimal)> = grouping.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(n)
        .map(|(label, amount)| RankedEntry {
            label: label.clone(),
            amount: amount.clone(),
            formatted: format_currency(amount, symbol),
        })
        .collect()
}

/// 货币格式化: 两位小数, 千分位逗号, 例如 "-$1,234.50"
pub fn format_currency(amount: &BigDecimal, symbol: &str) -> String {
    let rounded = amount.round(2).with_scale(2);
    let negative = rounded < BigDecimal::zero();
    let (digits, _) = rounded.abs().as_bigint_and_exponent();
    let digits = format!("{:0>3}", digits.to_string());

    let (int_part, frac_part) = digits.split_at(digits.len() - 2);
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{symbol}{grouped}.{frac_part}")
}
