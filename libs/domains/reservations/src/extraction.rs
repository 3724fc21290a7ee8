//! Capacity extraction.
//!
//! Each category implements [`CapacityExtractor`] to list raw reserved and
//! running capacity for one region. [`extract`] is the single driver shared
//! by every category: it walks the regions, keeps only live listings, builds
//! class keys and returns fully materialized record streams.

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info_span};

use crate::error::{ReservationError, ReservationResult};
use crate::models::{CapacityRecord, CapacityUnit, Category, ClassKey, Side};

/// One provider listing before filtering and key construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityListing {
    pub unit: CapacityUnit,
    /// Provider lifecycle status, e.g. `active`, `running`, `available`
    pub status: String,
    pub count: u64,
}

impl CapacityListing {
    pub fn new(unit: CapacityUnit, status: impl Into<String>, count: u64) -> Self {
        Self {
            unit,
            status: status.into(),
            count,
        }
    }
}

/// Category-specific source of reserved and running capacity
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CapacityExtractor: Send + Sync {
    /// Category every listing from this extractor belongs to
    fn category(&self) -> Category;

    /// Reservations in `region`, in any lifecycle state
    async fn reserved(&self, region: &str) -> ReservationResult<Vec<CapacityListing>>;

    /// Provisioned capacity in `region`, in any lifecycle state
    async fn running(&self, region: &str) -> ReservationResult<Vec<CapacityListing>>;
}

/// Reserved and running records produced by an extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedCapacity {
    pub reserved: Vec<CapacityRecord>,
    pub running: Vec<CapacityRecord>,
}

impl ExtractedCapacity {
    pub fn merge(&mut self, other: ExtractedCapacity) {
        self.reserved.extend(other.reserved);
        self.running.extend(other.running);
    }
}

/// Extract one category across `regions`, at most `concurrency` regions at a time.
///
/// Any failure aborts the whole category.
pub async fn extract(
    extractor: &dyn CapacityExtractor,
    regions: &[String],
    concurrency: usize,
) -> ReservationResult<ExtractedCapacity> {
    let category = extractor.category();

    let per_region: Vec<ExtractedCapacity> = stream::iter(regions)
        .map(|region| {
            extract_region(extractor, region)
                .instrument(info_span!("extract", %category, region = %region))
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    let extracted = per_region
        .into_iter()
        .fold(ExtractedCapacity::default(), |mut acc, part| {
            acc.merge(part);
            acc
        });

    debug!(
        %category,
        regions = regions.len(),
        reserved = extracted.reserved.len(),
        running = extracted.running.len(),
        "Category extraction complete"
    );

    Ok(extracted)
}

async fn extract_region(
    extractor: &dyn CapacityExtractor,
    region: &str,
) -> ReservationResult<ExtractedCapacity> {
    let category = extractor.category();
    let (reserved, running) =
        futures::try_join!(extractor.reserved(region), extractor.running(region))?;

    debug!(
        reserved = reserved.len(),
        running = running.len(),
        "Fetched listings"
    );

    Ok(ExtractedCapacity {
        reserved: to_records(category, Side::Reserved, reserved)?,
        running: to_records(category, Side::Running, running)?,
    })
}

/// Keep live listings with a positive count and key them.
///
/// Inactive listings are dropped before key construction, so a retired
/// reservation with missing fields never fails the run.
pub fn to_records(
    category: Category,
    side: Side,
    listings: Vec<CapacityListing>,
) -> ReservationResult<Vec<CapacityRecord>> {
    listings
        .into_iter()
        .filter(|listing| listing.count > 0 && category.is_active(side, &listing.status))
        .map(|listing| {
            if listing.unit.category != category {
                return Err(ReservationError::Internal(format!(
                    "{} extractor produced a {} listing",
                    category, listing.unit.category
                )));
            }
            Ok(CapacityRecord {
                key: ClassKey::build(&listing.unit)?,
                count: listing.count,
            })
        })
        .collect()
}
