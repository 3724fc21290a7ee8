use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::{ReservationError, ReservationResult};

/// Service category whose capacity can be reserved
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
    /// Compute instances, pinned to an availability zone
    Ec2,
    /// Cache nodes
    Elasticache,
    /// Relational database instances
    Rds,
    /// Warehouse nodes
    Redshift,
}

impl Category {
    /// Leading token of every class key in this category
    pub fn tag(&self) -> &'static str {
        (*self).into()
    }

    /// Provider status that marks a listing as live capacity on the given side.
    pub fn active_status(&self, side: Side) -> &'static str {
        match (self, side) {
            (_, Side::Reserved) => "active",
            (Category::Ec2, Side::Running) => "running",
            (_, Side::Running) => "available",
        }
    }

    pub fn is_active(&self, side: Side, status: &str) -> bool {
        status.eq_ignore_ascii_case(self.active_status(side))
    }
}

/// Which stream a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Reserved,
    Running,
}

/// Explicit set of enabled categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet(BTreeSet<Category>);

impl CategorySet {
    pub fn all() -> Self {
        Self(Category::iter().collect())
    }

    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Parse category names, rejecting anything unknown.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> ReservationResult<Self> {
        names
            .iter()
            .map(|name| name.as_ref().trim())
            .filter(|name| !name.is_empty())
            .map(|name| {
                Category::from_str(name)
                    .map_err(|_| ReservationError::UnknownCategory(name.to_string()))
            })
            .collect::<ReservationResult<BTreeSet<_>>>()
            .map(Self)
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0.contains(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Categories in their natural order
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.iter().copied()
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for CategorySet {
    type Err = ReservationError;

    /// Comma separated list, e.g. `ec2,rds`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let names: Vec<&str> = s.split(',').collect();
        Self::from_names(&names)
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|c| c.tag()).collect();
        f.write_str(&names.join(","))
    }
}

/// A single normalized capacity unit description, as produced by an extractor.
///
/// `location` is the availability zone for compute and the region for every
/// other category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityUnit {
    pub category: Category,
    pub engine: Option<String>,
    pub size_class: String,
    pub location: String,
    pub multi_az: bool,
}

impl CapacityUnit {
    pub fn compute(instance_type: impl Into<String>, availability_zone: impl Into<String>) -> Self {
        Self {
            category: Category::Ec2,
            engine: None,
            size_class: instance_type.into(),
            location: availability_zone.into(),
            multi_az: false,
        }
    }

    pub fn cache(
        engine: impl Into<String>,
        node_type: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            category: Category::Elasticache,
            engine: Some(engine.into()),
            size_class: node_type.into(),
            location: region.into(),
            multi_az: false,
        }
    }

    pub fn relational(
        engine: impl Into<String>,
        instance_class: impl Into<String>,
        multi_az: bool,
        region: impl Into<String>,
    ) -> Self {
        Self {
            category: Category::Rds,
            engine: Some(engine.into()),
            size_class: instance_class.into(),
            location: region.into(),
            multi_az,
        }
    }

    pub fn warehouse(node_type: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            category: Category::Redshift,
            engine: None,
            size_class: node_type.into(),
            location: region.into(),
            multi_az: false,
        }
    }
}

/// Normalized identifier of a fungible capacity SKU.
///
/// Ordering is the byte order of the underlying string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassKey(String);

impl ClassKey {
    /// Wrap an already normalized key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ClassKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `(ClassKey, Count)` pair fed to the aggregator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityRecord {
    pub key: ClassKey,
    pub count: u64,
}

impl CapacityRecord {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: ClassKey::new(key),
            count,
        }
    }
}

/// Utilization of one class key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub key: ClassKey,
    pub unused_reservations: u64,
    pub unreserved_units: u64,
    pub total_reservations: u64,
    pub total_units: u64,
}

impl ReconciliationRow {
    /// Both floors are taken from the two totals, never from each other.
    pub fn new(key: ClassKey, total_reservations: u64, total_units: u64) -> Self {
        Self {
            key,
            unused_reservations: total_reservations.saturating_sub(total_units),
            unreserved_units: total_units.saturating_sub(total_reservations),
            total_reservations,
            total_units,
        }
    }

    /// Every reservation backs a running unit and every unit is reserved.
    pub fn is_balanced(&self) -> bool {
        self.unused_reservations == 0 && self.unreserved_units == 0
    }
}

/// Column sums over a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub unused_reservations: u64,
    pub unreserved_units: u64,
    pub total_reservations: u64,
    pub total_units: u64,
}

/// One reconciliation snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub generated_at: DateTime<Utc>,
    pub categories: Vec<Category>,
    pub regions: Vec<String>,
    pub rows: Vec<ReconciliationRow>,
}

impl ReconciliationReport {
    pub fn new(
        categories: &CategorySet,
        regions: &[String],
        rows: Vec<ReconciliationRow>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            categories: categories.iter().collect(),
            regions: regions.to_vec(),
            rows,
        }
    }

    pub fn totals(&self) -> ReportTotals {
        self.rows
            .iter()
            .fold(ReportTotals::default(), |mut totals, row| {
                totals.unused_reservations =
                    totals.unused_reservations.saturating_add(row.unused_reservations);
                totals.unreserved_units =
                    totals.unreserved_units.saturating_add(row.unreserved_units);
                totals.total_reservations =
                    totals.total_reservations.saturating_add(row.total_reservations);
                totals.total_units = totals.total_units.saturating_add(row.total_units);
                totals
            })
    }

    /// Rows with waste or exposure, in report order
    pub fn mismatched(&self) -> impl Iterator<Item = &ReconciliationRow> {
        self.rows.iter().filter(|row| !row.is_balanced())
    }

    /// Drop balanced rows, keeping the order of the rest.
    pub fn retain_mismatched(&mut self) {
        self.rows.retain(|row| !row.is_balanced());
    }
}
