use futures::future::try_join_all;
use tracing::{debug, info};

use crate::aggregator::aggregate;
use crate::error::{ReservationError, ReservationResult};
use crate::extraction::{CapacityExtractor, ExtractedCapacity, extract};
use crate::models::{Category, CategorySet, ReconciliationReport};
use crate::reconciler::reconcile;

/// Regions extracted at the same time within one category
pub const DEFAULT_REGION_CONCURRENCY: usize = 4;

/// Audit Service - runs extraction for the enabled categories and reconciles the result
pub struct AuditService {
    extractors: Vec<Box<dyn CapacityExtractor>>,
    concurrency: usize,
}

impl AuditService {
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
            concurrency: DEFAULT_REGION_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Register the extractor for a category, replacing any earlier one.
    pub fn register(&mut self, extractor: Box<dyn CapacityExtractor>) {
        let category = extractor.category();
        self.extractors.retain(|e| e.category() != category);
        self.extractors.push(extractor);
    }

    pub fn extractor(&self, category: Category) -> Option<&dyn CapacityExtractor> {
        self.extractors
            .iter()
            .find(|e| e.category() == category)
            .map(|e| e.as_ref())
    }

    /// Extract every enabled category across `regions`.
    ///
    /// Disabled categories are never queried and contribute no records.
    pub async fn extract(
        &self,
        categories: &CategorySet,
        regions: &[String],
    ) -> ReservationResult<ExtractedCapacity> {
        let extractors = categories
            .iter()
            .map(|category| {
                self.extractor(category).ok_or_else(|| {
                    ReservationError::Internal(format!(
                        "no extractor registered for category {category}"
                    ))
                })
            })
            .collect::<ReservationResult<Vec<_>>>()?;

        let parts = try_join_all(
            extractors
                .into_iter()
                .map(|extractor| extract(extractor, regions, self.concurrency)),
        )
        .await?;

        Ok(parts
            .into_iter()
            .fold(ExtractedCapacity::default(), |mut acc, part| {
                acc.merge(part);
                acc
            }))
    }

    /// Produce one reconciliation snapshot.
    pub async fn run(
        &self,
        categories: &CategorySet,
        regions: &[String],
    ) -> ReservationResult<ReconciliationReport> {
        info!(
            categories = %categories,
            regions = ?regions,
            "Starting reservation audit"
        );

        let extracted = self.extract(categories, regions).await?;

        let reserved = aggregate(extracted.reserved);
        let running = aggregate(extracted.running);
        debug!(
            reserved_keys = reserved.len(),
            reserved_units = reserved.total(),
            running_keys = running.len(),
            running_units = running.total(),
            "Aggregated capacity"
        );

        let rows = reconcile(&reserved, &running);

        let report = ReconciliationReport::new(categories, regions, rows);
        let totals = report.totals();

        info!(
            rows = report.rows.len(),
            unused_reservations = totals.unused_reservations,
            unreserved_units = totals.unreserved_units,
            "Reservation audit complete"
        );

        Ok(report)
    }
}

impl Default for AuditService {
    fn default() -> Self {
        Self::new()
    }
}
