pub mod pool;
pub mod queries;
pub mod record_source;

pub use pool::create_pool;
pub use queries::*;
pub use record_source::PgRecordSource;
