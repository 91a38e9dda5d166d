use invoice_insights::{
    build_router, create_pool, AnalyticsService, AppConfig, AppState, HttpAuthProvider,
    PgRecordSource, VisionClient,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式, RUST_LOG 控制级别
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!(
        "Starting server: {:?}, analytics: {:?}",
        config.server, config.analytics
    );

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    // 依赖注入: 数据源 / 认证 / 视觉服务
    let source = Arc::new(PgRecordSource::new(
        pool,
        Duration::from_secs(config.database.query_timeout_secs),
    ));
    let state = AppState {
        analytics: Arc::new(AnalyticsService::new(
            source,
            config.analytics.malformed_records,
        )),
        auth: Arc::new(HttpAuthProvider::new(&config.auth)?),
        extractor: Arc::new(VisionClient::new(&config.vision)?),
        settings: Arc::new(config.analytics.clone()),
        max_document_bytes: config.vision.max_document_bytes,
    };

    let app = build_router(state);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /api/invoices            - invoice list");
    info!("  GET  /api/invoices/export     - invoice CSV export");
    info!("  GET  /api/invoices/flags      - fraud / compliance summary");
    info!("  GET  /api/analytics           - spend aggregation + forecast");
    info!("  GET  /api/analytics/top       - top-N by vendor / category / month");
    info!("  POST /api/extract             - invoice field extraction");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
