use std::collections::HashMap;

use crate::models::{CapacityRecord, ClassKey};

/// Total count per class key for one stream (reserved or running).
///
/// Lookups of absent keys read as zero through [`AggregatedMapping::count_of`]
/// and never insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedMapping {
    counts: HashMap<ClassKey, u64>,
}

impl AggregatedMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts saturate at `u64::MAX`.
    pub fn add(&mut self, key: ClassKey, count: u64) {
        let entry = self.counts.entry(key).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    pub fn count_of(&self, key: &ClassKey) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn contains(&self, key: &ClassKey) -> bool {
        self.counts.contains_key(key)
    }

    /// Keys in arbitrary order
    pub fn keys(&self) -> impl Iterator<Item = &ClassKey> {
        self.counts.keys()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum over every key
    pub fn total(&self) -> u64 {
        self.counts
            .values()
            .fold(0u64, |total, count| total.saturating_add(*count))
    }
}

impl Extend<CapacityRecord> for AggregatedMapping {
    fn extend<I: IntoIterator<Item = CapacityRecord>>(&mut self, records: I) {
        for record in records {
            self.add(record.key, record.count);
        }
    }
}

impl FromIterator<CapacityRecord> for AggregatedMapping {
    fn from_iter<I: IntoIterator<Item = CapacityRecord>>(records: I) -> Self {
        let mut mapping = Self::new();
        mapping.extend(records);
        mapping
    }
}

/// Sum the counts of every record sharing a class key.
pub fn aggregate<I>(records: I) -> AggregatedMapping
where
    I: IntoIterator<Item = CapacityRecord>,
{
    records.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<CapacityRecord> {
        vec![
            CapacityRecord::new("ec2:m5.large:us-east-1a", 2),
            CapacityRecord::new("rds:postgres:db.small:us-east-1", 1),
            CapacityRecord::new("ec2:m5.large:us-east-1a", 3),
            CapacityRecord::new("redshift:dc2.large:us-east-1", 4),
            CapacityRecord::new("rds:postgres:db.small:us-east-1", 2),
        ]
    }

    #[test]
    fn test_aggregate_sums_shared_keys() {
        let mapping = aggregate(records());

        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.count_of(&ClassKey::new("ec2:m5.large:us-east-1a")), 5);
        assert_eq!(mapping.count_of(&ClassKey::new("rds:postgres:db.small:us-east-1")), 3);
        assert_eq!(mapping.count_of(&ClassKey::new("redshift:dc2.large:us-east-1")), 4);
        assert_eq!(mapping.total(), 12);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let forward = aggregate(records());
        let reversed = aggregate(records().into_iter().rev());

        let mut rotated = records();
        rotated.rotate_left(2);
        let rotated = aggregate(rotated);

        assert_eq!(forward, reversed);
        assert_eq!(forward, rotated);
    }

    #[test]
    fn test_absent_key_reads_zero_without_inserting() {
        let mapping = aggregate(records());
        let missing = ClassKey::new("elasticache:redis:cache.t3.micro:us-east-1");

        assert_eq!(mapping.count_of(&missing), 0);
        assert!(!mapping.contains(&missing));
        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn test_aggregate_empty() {
        let mapping = aggregate(Vec::<CapacityRecord>::new());
        assert!(mapping.is_empty());
        assert_eq!(mapping.total(), 0);
    }

    #[test]
    fn test_aggregate_saturates_instead_of_overflowing() {
        let mapping = aggregate(vec![
            CapacityRecord::new("k", u64::MAX),
            CapacityRecord::new("k", 1),
            CapacityRecord::new("other", 7),
        ]);

        assert_eq!(mapping.count_of(&ClassKey::new("k")), u64::MAX);
        assert_eq!(mapping.count_of(&ClassKey::new("other")), 7);
        assert_eq!(mapping.total(), u64::MAX);
    }

    #[test]
    fn test_extend_accumulates_across_batches() {
        let mut mapping = AggregatedMapping::new();
        mapping.extend(vec![CapacityRecord::new("ec2:t3.micro:us-east-1b", 1)]);
        mapping.extend(vec![CapacityRecord::new("ec2:t3.micro:us-east-1b", 1)]);

        assert_eq!(mapping.count_of(&ClassKey::new("ec2:t3.micro:us-east-1b")), 2);
    }
}
