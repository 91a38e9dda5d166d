use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub vision: VisionConfig,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub query_timeout_secs: u64,
}

/// 认证服务 (托管身份平台)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

/// 视觉模型服务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionConfig {
    pub url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_document_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub top_n: usize,
    pub currency_symbol: String,
    pub fraud_threshold: f64,
    pub malformed_records: MalformedRecordPolicy,
}

/// createdAt 非法记录的处理策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedRecordPolicy {
    /// 跳过该记录并继续
    #[default]
    Skip,
    /// 整个聚合失败
    Reject,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/invoices".to_string(),
            max_connections: 20,
            query_timeout_secs: 15,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 60,
            max_document_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            currency_symbol: "$".to_string(),
            fraud_threshold: 0.7,
            malformed_records: MalformedRecordPolicy::Skip,
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> config/app.* -> APP__SECTION__KEY -> DATABASE_URL / SERVER_HOST / SERVER_PORT
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Some("config/app"))
    }

    pub fn load_from(file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);
        if let Some(path) = file {
            builder = builder.add_source(File::with_name(path).required(false));
        }

        builder
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .build()?
            .try_deserialize()
    }
}
