use bigdecimal::BigDecimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

/// 经十进制文本转换为最接近的 f64
pub fn to_json_f64(amount: &BigDecimal) -> f64 {
    amount.to_string().parse::<f64>().unwrap_or(0.0)
}

/// 金额统一以 JSON 数字输出
pub fn serialize<S: Serializer>(amount: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(to_json_f64(amount))
}

pub fn serialize_opt<S: Serializer>(
    amount: &Option<BigDecimal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match amount {
        Some(v) => serialize(v, serializer),
        None => serializer.serialize_none(),
    }
}

/// 分组结果: 扁平的 key -> number 对象
pub fn serialize_map<S: Serializer>(
    map: &BTreeMap<String, BigDecimal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut out = serializer.serialize_map(Some(map.len()))?;
    for (key, value) in map {
        out.serialize_entry(key, &to_json_f64(value))?;
    }
    out.end()
}

/// 宽松解析金额: 数字或数字字符串; 无法解析时视为缺失
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_amount))
}

pub fn parse_amount(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            BigDecimal::from_str(&cleaned).ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_numbers_and_numeric_strings() {
        assert_eq!(parse_amount(&json!(12.5)), BigDecimal::from_str("12.5").ok());
        assert_eq!(parse_amount(&json!("1,234.50")), BigDecimal::from_str("1234.50").ok());
        assert_eq!(parse_amount(&json!("n/a")), None);
        assert_eq!(parse_amount(&json!(true)), None);
    }

    #[test]
    fn fractional_amounts_serialize_to_nearest_double() {
        for (text, expected) in [("100.10", 100.10), ("200.20", 200.20), ("0.07", 0.07), ("300.37", 300.37)] {
            let amount = BigDecimal::from_str(text).unwrap();
            assert_eq!(to_json_f64(&amount), expected);
        }
        let map = BTreeMap::from([("2024-01".to_string(), BigDecimal::from_str("100.10").unwrap())]);
        let mut out = Vec::new();
        serialize_map(&map, &mut serde_json::Serializer::new(&mut out)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), r#"{"2024-01":100.1}"#);
    }
}
