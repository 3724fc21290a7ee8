use thiserror::Error;

use crate::models::Category;

/// Result type for reservation operations
pub type ReservationResult<T> = Result<T, ReservationError>;

/// Errors that can occur in the reservations domain
#[derive(Debug, Error)]
pub enum ReservationError {
    /// A capacity unit is missing a component its class key needs
    #[error("Invalid {category} record: {field} must not be empty")]
    InvalidRecord {
        category: Category,
        field: &'static str,
    },

    /// Category name not recognised
    #[error("Unknown category: {0} (expected one of ec2, elasticache, rds, redshift)")]
    UnknownCategory(String),

    /// Listing reserved or running capacity from the provider failed
    #[error("Failed to list {category} capacity in {region}: {message}")]
    Extraction {
        category: Category,
        region: String,
        message: String,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReservationError {
    pub fn extraction(
        category: Category,
        region: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Extraction {
            category,
            region: region.into(),
            message: message.to_string(),
        }
    }
}
