pub mod migration;
pub mod schema;
pub mod summary;
pub mod validation;

use chrono::NaiveDate;
use tracing::info;

use crate::models::{Meeting, RawRecord};

pub use migration::{migrate, MigrationError};
pub use summary::{SummaryError, ValidationSummary};
pub use validation::ValidationPipeline;

pub fn validate_batch(
    spider: &str,
    records: Vec<RawRecord>,
    today: NaiveDate,
) -> (Vec<RawRecord>, ValidationSummary) {
    let pipeline = ValidationPipeline::default();
    let validated: Vec<RawRecord> = records
        .into_iter()
        .map(|record| pipeline.process_item(record, today))
        .collect();
    let summary = ValidationSummary::from_records(spider, &validated);
    info!(
        spider,
        validated = summary.items,
        skipped = validated.len() - summary.items,
        "validated batch"
    );
    (validated, summary)
}

/// Migrates every record, stopping at the first producer contract violation.
pub fn migrate_batch(records: &[RawRecord]) -> Result<Vec<Meeting>, MigrationError> {
    records.iter().map(migrate).collect()
}
