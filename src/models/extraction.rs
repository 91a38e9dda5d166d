use crate::models::amount;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// 允许提交识别的文档类型
pub const SUPPORTED_MIME_TYPES: [&str; 4] =
    ["application/pdf", "image/png", "image/jpeg", "image/webp"];

/// 待识别文档 (请求体)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    pub mime_type: String,
    pub data_base64: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl DocumentPayload {
    /// 入口校验, 返回错误描述; 大小限制针对解码后的字节数
    pub fn validate(&self, max_document_bytes: usize) -> Result<(), String> {
        let mime = self.mime_type.trim().to_ascii_lowercase();
        if !SUPPORTED_MIME_TYPES.contains(&mime.as_str()) {
            return Err(format!("unsupported mimeType '{}'", self.mime_type));
        }
        let data = self.encoded_data();
        if data.is_empty() {
            return Err("dataBase64 must not be empty".to_string());
        }
        let decoded = STANDARD
            .decode(data.as_bytes())
            .map_err(|e| format!("dataBase64 is not valid base64: {e}"))?;
        if decoded.is_empty() {
            return Err("dataBase64 decodes to an empty document".to_string());
        }
        if decoded.len() > max_document_bytes {
            return Err(format!(
                "document too large: {} bytes, limit {}",
                decoded.len(),
                max_document_bytes
            ));
        }
        Ok(())
    }

    /// 去掉换行后的 base64 文本
    fn encoded_data(&self) -> String {
        self.data_base64
            .trim()
            .chars()
            .filter(|c| *c != '\n' && *c != '\r')
            .collect()
    }

    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type.trim().to_ascii_lowercase(),
            self.encoded_data()
        )
    }
}

/// 视觉模型识别出的发票字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    #[serde(default)]
    pub vendor_name: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub invoice_date: Option<String>,
    #[serde(
        default,
        serialize_with = "amount::serialize_opt",
        deserialize_with = "amount::deserialize_lenient"
    )]
    pub total_amount: Option<BigDecimal>,
    #[serde(
        default,
        serialize_with = "amount::serialize_opt",
        deserialize_with = "amount::deserialize_lenient"
    )]
    pub tax_amount: Option<BigDecimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ExtractedFields {
    pub fn is_empty(&self) -> bool {
        self.vendor_name.is_none()
            && self.invoice_number.is_none()
            && self.invoice_date.is_none()
            && self.total_amount.is_none()
            && self.tax_amount.is_none()
            && self.currency.is_none()
            && self.category.is_none()
    }
}

/// 视觉服务调用结果 (边界处一次性校验)
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Success(ExtractedFields),
    MalformedResponse { raw: String },
    UpstreamError { status: Option<u16>, details: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(data: &str) -> DocumentPayload {
        DocumentPayload {
            mime_type: "image/png".to_string(),
            data_base64: data.to_string(),
            file_name: None,
        }
    }

    #[test]
    fn accepts_well_formed_base64_with_line_breaks() {
        assert_eq!(payload("aGVs\r\nbG8=").validate(1024), Ok(()));
        assert_eq!(payload("aGVs\r\nbG8=").data_uri(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn rejects_malformed_base64() {
        for bad in ["abc", "a=b=", "====", "A", "aGVs*G8="] {
            let err = payload(bad).validate(1024).unwrap_err();
            assert!(err.contains("not valid base64"), "{bad}: {err}");
        }
    }

    #[test]
    fn size_limit_applies_to_decoded_bytes() {
        // 8 个字符解码为 6 字节
        assert_eq!(payload("aGVsbG8h").validate(6), Ok(()));
        assert!(payload("aGVsbG8h").validate(5).unwrap_err().contains("too large"));
    }

    #[test]
    fn rejects_unsupported_mime_and_empty_data() {
        let mut doc = payload("aGVsbG8=");
        doc.mime_type = "text/plain".to_string();
        assert!(doc.validate(1024).unwrap_err().contains("mimeType"));
        assert!(payload("  ").validate(1024).unwrap_err().contains("empty"));
    }
}
