//! AWS capacity extractors
//!
//! One [`CapacityExtractor`] per category. Each builds a region-scoped SDK
//! client from the shared [`SdkConfig`] and maps provider listings into
//! [`domain_reservations::CapacityListing`]s. Status filtering and key
//! construction happen in the domain driver, not here.

pub mod ec2;
pub mod elasticache;
pub mod rds;
pub mod redshift;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use domain_reservations::{AuditService, CapacityExtractor};
use tracing::info;

pub use ec2::Ec2Extractor;
pub use elasticache::ElastiCacheExtractor;
pub use rds::RdsExtractor;
pub use redshift::RedshiftExtractor;

use crate::config::AwsConfig;

/// Load the shared SDK configuration.
///
/// Explicit keys win over the default credential chain (environment, profile,
/// web identity, instance profile).
pub async fn load_sdk_config(aws: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(aws.bootstrap_region.clone()));

    if let Some(profile) = &aws.profile {
        loader = loader.profile_name(profile);
    }

    if let Some(credentials) = &aws.credentials {
        loader = loader.credentials_provider(aws_sdk_ec2::config::Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            credentials.session_token.clone(),
            None, // expiry
            "reservation-auditor-explicit",
        ));
    }

    let sdk_config = loader.load().await;

    info!(
        region = %aws.bootstrap_region,
        profile = aws.profile.as_deref().unwrap_or("default"),
        explicit_creds = aws.credentials.is_some(),
        "AWS SDK configuration loaded"
    );

    sdk_config
}

/// All four category extractors sharing one SDK configuration
pub fn extractors(sdk_config: &SdkConfig) -> Vec<Box<dyn CapacityExtractor>> {
    vec![
        Box::new(Ec2Extractor::new(sdk_config.clone())),
        Box::new(ElastiCacheExtractor::new(sdk_config.clone())),
        Box::new(RdsExtractor::new(sdk_config.clone())),
        Box::new(RedshiftExtractor::new(sdk_config.clone())),
    ]
}

pub fn register_all(service: &mut AuditService, sdk_config: &SdkConfig) {
    for extractor in extractors(sdk_config) {
        service.register(extractor);
    }
}

/// Provider counts are optional `i32`s. A missing count means a single unit.
pub(crate) fn unit_count(count: Option<i32>) -> u64 {
    count.map_or(1, |n| u64::try_from(n).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticCredentials;
    use domain_reservations::Category;

    #[test]
    fn test_unit_count() {
        assert_eq!(unit_count(Some(3)), 3);
        assert_eq!(unit_count(Some(0)), 0);
        assert_eq!(unit_count(Some(-2)), 0);
        assert_eq!(unit_count(None), 1);
    }

    #[tokio::test]
    async fn test_load_sdk_config_uses_bootstrap_region() {
        let aws = AwsConfig {
            bootstrap_region: "eu-west-1".to_string(),
            profile: None,
            credentials: Some(StaticCredentials {
                access_key_id: "AKIDEXAMPLE".to_string(),
                secret_access_key: "secret".to_string(),
                session_token: None,
            }),
        };

        let sdk_config = load_sdk_config(&aws).await;

        assert_eq!(sdk_config.region().map(|r| r.as_ref()), Some("eu-west-1"));
        assert!(sdk_config.credentials_provider().is_some());
    }

    #[tokio::test]
    async fn test_register_all_covers_every_category() {
        let aws = AwsConfig {
            bootstrap_region: "us-east-1".to_string(),
            profile: None,
            credentials: Some(StaticCredentials {
                access_key_id: "AKIDEXAMPLE".to_string(),
                secret_access_key: "secret".to_string(),
                session_token: None,
            }),
        };
        let sdk_config = load_sdk_config(&aws).await;

        let mut service = AuditService::new();
        register_all(&mut service, &sdk_config);

        for category in [
            Category::Ec2,
            Category::Elasticache,
            Category::Rds,
            Category::Redshift,
        ] {
            assert!(service.extractor(category).is_some(), "{category} missing");
        }
    }
}
