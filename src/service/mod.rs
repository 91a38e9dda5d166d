pub mod aggregator;
pub mod analytics;
pub mod auth;
pub mod export;
pub mod extraction;
pub mod flags;
pub mod presenter;
pub mod record_source;

pub use aggregator::{aggregate, try_aggregate, Aggregation};
pub use analytics::AnalyticsService;
pub use auth::{AuthProvider, AuthenticatedUser, HttpAuthProvider};
pub use extraction::{FieldExtractor, VisionClient};
pub use record_source::{InMemoryRecordSource, RecordSource};
