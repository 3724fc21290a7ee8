//! Redshift capacity extractor

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_redshift::Client;
use aws_sdk_redshift::config::Region;
use aws_sdk_redshift::error::DisplayErrorContext;
use aws_sdk_redshift::types::{Cluster, ReservedNode};
use domain_reservations::{
    CapacityExtractor, CapacityListing, CapacityUnit, Category, ReservationError,
    ReservationResult,
};
use tracing::debug;

use super::unit_count;

pub struct RedshiftExtractor {
    sdk_config: SdkConfig,
}

impl RedshiftExtractor {
    pub fn new(sdk_config: SdkConfig) -> Self {
        Self { sdk_config }
    }

    fn client(&self, region: &str) -> Client {
        let config = aws_sdk_redshift::config::Builder::from(&self.sdk_config)
            .region(Region::new(region.to_string()))
            .build();
        Client::from_conf(config)
    }
}

fn reserved_listing(node: &ReservedNode, region: &str) -> CapacityListing {
    CapacityListing::new(
        CapacityUnit::warehouse(node.node_type().unwrap_or_default(), region),
        node.state().unwrap_or_default(),
        unit_count(node.node_count()),
    )
}

fn cluster_listing(cluster: &Cluster, region: &str) -> CapacityListing {
    CapacityListing::new(
        CapacityUnit::warehouse(cluster.node_type().unwrap_or_default(), region),
        cluster.cluster_status().unwrap_or_default(),
        unit_count(cluster.number_of_nodes()),
    )
}

#[async_trait]
impl CapacityExtractor for RedshiftExtractor {
    fn category(&self) -> Category {
        Category::Redshift
    }

    async fn reserved(&self, region: &str) -> ReservationResult<Vec<CapacityListing>> {
        let mut pages = self
            .client(region)
            .describe_reserved_nodes()
            .into_paginator()
            .send();

        let mut listings = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                ReservationError::extraction(Category::Redshift, region, DisplayErrorContext(&e))
            })?;

            listings.extend(
                page.reserved_nodes()
                    .iter()
                    .map(|node| reserved_listing(node, region)),
            );
        }

        debug!(region, count = listings.len(), "Listed Redshift reserved nodes");
        Ok(listings)
    }

    async fn running(&self, region: &str) -> ReservationResult<Vec<CapacityListing>> {
        let mut pages = self
            .client(region)
            .describe_clusters()
            .into_paginator()
            .send();

        let mut listings = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                ReservationError::extraction(Category::Redshift, region, DisplayErrorContext(&e))
            })?;

            listings.extend(
                page.clusters()
                    .iter()
                    .map(|cluster| cluster_listing(cluster, region)),
            );
        }

        debug!(region, count = listings.len(), "Listed Redshift clusters");
        Ok(listings)
    }
}
