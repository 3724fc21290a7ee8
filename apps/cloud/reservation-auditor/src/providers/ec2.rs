//! EC2 capacity extractor
//!
//! Reserved instances come from `DescribeReservedInstances`, running capacity
//! from the paginated `DescribeInstances`. Compute keys are zone pinned.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::config::Region;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::{Instance, ReservedInstances};
use domain_reservations::{
    CapacityExtractor, CapacityListing, CapacityUnit, Category, ReservationError,
    ReservationResult,
};
use tracing::debug;

use super::unit_count;

pub struct Ec2Extractor {
    sdk_config: SdkConfig,
}

impl Ec2Extractor {
    pub fn new(sdk_config: SdkConfig) -> Self {
        Self { sdk_config }
    }

    fn client(&self, region: &str) -> Client {
        let config = aws_sdk_ec2::config::Builder::from(&self.sdk_config)
            .region(Region::new(region.to_string()))
            .build();
        Client::from_conf(config)
    }
}

/// Region-scoped reservations have no zone and are keyed by their region.
fn reserved_listing(reservation: &ReservedInstances, region: &str) -> CapacityListing {
    CapacityListing::new(
        CapacityUnit::compute(
            reservation
                .instance_type()
                .map(|t| t.as_str())
                .unwrap_or_default(),
            reservation.availability_zone().unwrap_or(region),
        ),
        reservation
            .state()
            .map(|s| s.as_str())
            .unwrap_or_default(),
        unit_count(reservation.instance_count()),
    )
}

fn instance_listing(instance: &Instance) -> CapacityListing {
    CapacityListing::new(
        CapacityUnit::compute(
            instance.instance_type().map(|t| t.as_str()).unwrap_or_default(),
            instance
                .placement()
                .and_then(|p| p.availability_zone())
                .unwrap_or_default(),
        ),
        instance
            .state()
            .and_then(|s| s.name())
            .map(|n| n.as_str())
            .unwrap_or_default(),
        1,
    )
}

#[async_trait]
impl CapacityExtractor for Ec2Extractor {
    fn category(&self) -> Category {
        Category::Ec2
    }

    async fn reserved(&self, region: &str) -> ReservationResult<Vec<CapacityListing>> {
        let output = self
            .client(region)
            .describe_reserved_instances()
            .send()
            .await
            .map_err(|e| {
                ReservationError::extraction(Category::Ec2, region, DisplayErrorContext(&e))
            })?;

        let listings: Vec<CapacityListing> = output
            .reserved_instances()
            .iter()
            .map(|ri| reserved_listing(ri, region))
            .collect();

        debug!(region, count = listings.len(), "Listed EC2 reserved instances");
        Ok(listings)
    }

    async fn running(&self, region: &str) -> ReservationResult<Vec<CapacityListing>> {
        let mut pages = self
            .client(region)
            .describe_instances()
            .into_paginator()
            .send();

        let mut listings = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                ReservationError::extraction(Category::Ec2, region, DisplayErrorContext(&e))
            })?;

            listings.extend(
                page.reservations()
                    .iter()
                    .flat_map(|r| r.instances())
                    .map(instance_listing),
            );
        }

        debug!(region, count = listings.len(), "Listed EC2 instances");
        Ok(listings)
    }
}
