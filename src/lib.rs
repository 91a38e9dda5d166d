pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use api::{build_router, AppState};
pub use config::AppConfig;
pub use db::{create_pool, PgRecordSource};
pub use error::{AggregateError, ApiError, SourceError};
pub use service::{
    aggregate, try_aggregate, AnalyticsService, HttpAuthProvider, InMemoryRecordSource,
    RecordSource, VisionClient,
};
