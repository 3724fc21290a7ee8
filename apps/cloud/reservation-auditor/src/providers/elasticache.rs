//! ElastiCache capacity extractor

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_elasticache::Client;
use aws_sdk_elasticache::config::Region;
use aws_sdk_elasticache::error::DisplayErrorContext;
use aws_sdk_elasticache::types::{CacheCluster, ReservedCacheNode};
use domain_reservations::{
    CapacityExtractor, CapacityListing, CapacityUnit, Category, ReservationError,
    ReservationResult,
};
use tracing::debug;

use super::unit_count;

pub struct ElastiCacheExtractor {
    sdk_config: SdkConfig,
}

impl ElastiCacheExtractor {
    pub fn new(sdk_config: SdkConfig) -> Self {
        Self { sdk_config }
    }

    fn client(&self, region: &str) -> Client {
        let config = aws_sdk_elasticache::config::Builder::from(&self.sdk_config)
            .region(Region::new(region.to_string()))
            .build();
        Client::from_conf(config)
    }
}

/// The reservation's product description names the engine.
fn reserved_listing(node: &ReservedCacheNode, region: &str) -> CapacityListing {
    CapacityListing::new(
        CapacityUnit::cache(
            node.product_description().unwrap_or_default(),
            node.cache_node_type().unwrap_or_default(),
            region,
        ),
        node.state().unwrap_or_default(),
        unit_count(node.cache_node_count()),
    )
}

fn cluster_listing(cluster: &CacheCluster, region: &str) -> CapacityListing {
    CapacityListing::new(
        CapacityUnit::cache(
            cluster.engine().unwrap_or_default(),
            cluster.cache_node_type().unwrap_or_default(),
            region,
        ),
        cluster.cache_cluster_status().unwrap_or_default(),
        unit_count(cluster.num_cache_nodes()),
    )
}

#[async_trait]
impl CapacityExtractor for ElastiCacheExtractor {
    fn category(&self) -> Category {
        Category::Elasticache
    }

    async fn reserved(&self, region: &str) -> ReservationResult<Vec<CapacityListing>> {
        let mut pages = self
            .client(region)
            .describe_reserved_cache_nodes()
            .into_paginator()
            .send();

        let mut listings = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                ReservationError::extraction(
                    Category::Elasticache,
                    region,
                    DisplayErrorContext(&e),
                )
            })?;

            listings.extend(
                page.reserved_cache_nodes()
                    .iter()
                    .map(|node| reserved_listing(node, region)),
            );
        }

        debug!(region, count = listings.len(), "Listed ElastiCache reserved nodes");
        Ok(listings)
    }

    async fn running(&self, region: &str) -> ReservationResult<Vec<CapacityListing>> {
        let mut pages = self
            .client(region)
            .describe_cache_clusters()
            .into_paginator()
            .send();

        let mut listings = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                ReservationError::extraction(
                    Category::Elasticache,
                    region,
                    DisplayErrorContext(&e),
                )
            })?;

            listings.extend(
                page.cache_clusters()
                    .iter()
                    .map(|cluster| cluster_listing(cluster, region)),
            );
        }

        debug!(region, count = listings.len(), "Listed ElastiCache clusters");
        Ok(listings)
    }
}
