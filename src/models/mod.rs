pub mod amount;
pub mod analytics;
pub mod extraction;
pub mod invoice;

pub use analytics::{
    AggregationResult, ComplianceBreakdown, Dimension, FlagSummary, RankedEntry, RiskEntry,
    SkippedRecord,
};
pub use extraction::{DocumentPayload, ExtractedFields, ExtractionOutcome, SUPPORTED_MIME_TYPES};
pub use invoice::{ComplianceStatus, InvoiceRecord, InvoiceRow, UNCATEGORIZED, UNKNOWN_VENDOR};
