//! Reservations Domain
//!
//! Reconciles purchased capacity reservations against running capacity.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  AuditService   │  ← wires extraction, aggregation and reconciliation
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │   Extraction    │  ← CapacityExtractor strategy per category, active-state filter
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │   Aggregator    │  ← ClassKey → total count, one mapping per side
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │   Reconciler    │  ← sorted ReconciliationRow per class key
//! └─────────────────┘
//! ```
//!
//! Aggregation and reconciliation are pure and synchronous. Only the
//! extraction driver is async, and it hands fully materialized record
//! streams to the core.

pub mod aggregator;
pub mod class_key;
pub mod error;
pub mod extraction;
pub mod models;
pub mod reconciler;
pub mod service;

// Re-export commonly used types
pub use aggregator::{AggregatedMapping, aggregate};
pub use class_key::fold_engine_alias;
pub use error::{ReservationError, ReservationResult};
pub use extraction::{CapacityExtractor, CapacityListing, ExtractedCapacity, extract};
pub use models::{
    CapacityRecord, CapacityUnit, Category, CategorySet, ClassKey, ReconciliationReport,
    ReconciliationRow, ReportTotals, Side,
};
pub use reconciler::reconcile;
pub use service::{AuditService, DEFAULT_REGION_CONCURRENCY};
