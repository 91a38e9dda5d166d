use crate::config::VisionConfig;
use crate::models::{DocumentPayload, ExtractedFields, ExtractionOutcome};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// 最大尝试次数 (首次 + 重试一次)
const MAX_ATTEMPTS: u32 = 2;
const RETRY_DELAY: Duration = Duration::from_millis(250);
const DETAILS_LIMIT: usize = 500;

const SYSTEM_PROMPT: &str = "You extract structured data from invoice documents. \
Reply with a single JSON object with the keys vendorName, invoiceNumber, invoiceDate \
(YYYY-MM-DD), totalAmount (number), taxAmount (number), currency (ISO 4217) and category. \
Use null for anything you cannot read.";

/// 发票字段识别
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract(&self, document: &DocumentPayload) -> ExtractionOutcome;
}

/// 视觉模型客户端 (chat-completions 协议)
pub struct VisionClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl VisionClient {
    pub fn new(config: &VisionConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn request_body(&self, document: &DocumentPayload) -> Value {
        json!({
            "model": self.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": "Extract the invoice fields." },
                        { "type": "image_url", "image_url": { "url": document.data_uri() } }
                    ]
                }
            ]
        })
    }
}

#[async_trait]
impl FieldExtractor for VisionClient {
    #[tracing::instrument(name = "vision_extract", skip_all, fields(file = ?document.file_name))]
    async fn extract(&self, document: &DocumentPayload) -> ExtractionOutcome {
        let body = self.request_body(document);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let sent = self
                .client
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            match sent {
                Ok(resp) => {
                    let status = resp.status();
                    let retryable = status.is_server_error()
                        || status == reqwest::StatusCode::TOO_MANY_REQUESTS;
                    if retryable && attempt < MAX_ATTEMPTS {
                        tracing::warn!("vision service returned {}, retrying", status);
                        tokio::time::sleep(RETRY_DELAY).await;
                        continue;
                    }
                    return match resp.text().await {
                        Ok(text) => interpret_response(status.as_u16(), &text),
                        Err(e) => ExtractionOutcome::UpstreamError {
                            status: Some(status.as_u16()),
                            details: format!("read body failed: {e}"),
                        },
                    };
                }
                Err(e) => {
                    if attempt < MAX_ATTEMPTS {
                        tracing::warn!("vision request failed ({}), retrying", e);
                        tokio::time::sleep(RETRY_DELAY).await;
                        continue;
                    }
                    return ExtractionOutcome::UpstreamError {
                        status: e.status().map(|s| s.as_u16()),
                        details: e.to_string(),
                    };
                }
            }
        }
    }
}

/// 解释视觉服务响应 (仅在此处校验一次)
pub fn interpret_response(status: u16, body: &str) -> ExtractionOutcome {
    if !(200..300).contains(&status) {
        return ExtractionOutcome::UpstreamError {
            status: Some(status),
            details: truncate(body, DETAILS_LIMIT),
        };
    }

    let content = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    let Some(content) = content else {
        return ExtractionOutcome::MalformedResponse {
            raw: truncate(body, DETAILS_LIMIT),
        };
    };

    match serde_json::from_str::<ExtractedFields>(strip_code_fence(&content)) {
        Ok(fields) if !fields.is_empty() => ExtractionOutcome::Success(fields),
        _ => ExtractionOutcome::MalformedResponse {
            raw: truncate(&content, DETAILS_LIMIT),
        },
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
