//! RDS capacity extractor
//!
//! Reservations report the engine through their product description
//! (`postgresql`) while instances report it as `postgres`; the class key
//! builder folds the two together.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_rds::Client;
use aws_sdk_rds::config::Region;
use aws_sdk_rds::error::DisplayErrorContext;
use aws_sdk_rds::types::{DbInstance, ReservedDbInstance};
use domain_reservations::{
    CapacityExtractor, CapacityListing, CapacityUnit, Category, ReservationError,
    ReservationResult,
};
use tracing::debug;

use super::unit_count;

pub struct RdsExtractor {
    sdk_config: SdkConfig,
}

impl RdsExtractor {
    pub fn new(sdk_config: SdkConfig) -> Self {
        Self { sdk_config }
    }

    fn client(&self, region: &str) -> Client {
        let config = aws_sdk_rds::config::Builder::from(&self.sdk_config)
            .region(Region::new(region.to_string()))
            .build();
        Client::from_conf(config)
    }
}

fn reserved_listing(reservation: &ReservedDbInstance, region: &str) -> CapacityListing {
    CapacityListing::new(
        CapacityUnit::relational(
            reservation.product_description().unwrap_or_default(),
            reservation.db_instance_class().unwrap_or_default(),
            reservation.multi_az().unwrap_or(false),
            region,
        ),
        reservation.state().unwrap_or_default(),
        unit_count(reservation.db_instance_count()),
    )
}

fn instance_listing(instance: &DbInstance, region: &str) -> CapacityListing {
    CapacityListing::new(
        CapacityUnit::relational(
            instance.engine().unwrap_or_default(),
            instance.db_instance_class().unwrap_or_default(),
            instance.multi_az().unwrap_or(false),
            region,
        ),
        instance.db_instance_status().unwrap_or_default(),
        1,
    )
}

#[async_trait]
impl CapacityExtractor for RdsExtractor {
    fn category(&self) -> Category {
        Category::Rds
    }

    async fn reserved(&self, region: &str) -> ReservationResult<Vec<CapacityListing>> {
        let mut pages = self
            .client(region)
            .describe_reserved_db_instances()
            .into_paginator()
            .send();

        let mut listings = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                ReservationError::extraction(Category::Rds, region, DisplayErrorContext(&e))
            })?;

            listings.extend(
                page.reserved_db_instances()
                    .iter()
                    .map(|ri| reserved_listing(ri, region)),
            );
        }

        debug!(region, count = listings.len(), "Listed RDS reserved instances");
        Ok(listings)
    }

    async fn running(&self, region: &str) -> ReservationResult<Vec<CapacityListing>> {
        let mut pages = self
            .client(region)
            .describe_db_instances()
            .into_paginator()
            .send();

        let mut listings = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                ReservationError::extraction(Category::Rds, region, DisplayErrorContext(&e))
            })?;

            listings.extend(
                page.db_instances()
                    .iter()
                    .map(|instance| instance_listing(instance, region)),
            );
        }

        debug!(region, count = listings.len(), "Listed RDS instances");
        Ok(listings)
    }
}
