//! Class key construction.
//!
//! One builder per category. Reservation and usage listings for the same
//! real-world SKU must produce byte-identical keys, so every key goes through
//! these functions and nothing else concatenates key segments.

use crate::error::{ReservationError, ReservationResult};
use crate::models::{CapacityUnit, Category, ClassKey};

/// Separator between key segments
pub const KEY_DELIMITER: &str = ":";

/// Appended to the instance class of multi-AZ database capacity
pub const MULTI_AZ_SUFFIX: &str = "-multi_az";

/// Engine spellings that different endpoints use for the same engine.
/// No canonical token may contain an alias, or folding stops being idempotent.
const ENGINE_ALIASES: &[(&str, &str)] = &[("postgresql", "postgres")];

/// Rewrite engine aliases to their canonical spelling.
///
/// Folding a canonical token is a no-op, and `fold(fold(x)) == fold(x)`.
pub fn fold_engine_alias(engine: &str) -> String {
    ENGINE_ALIASES
        .iter()
        .fold(engine.to_string(), |token, (alias, canonical)| {
            token.replace(alias, canonical)
        })
}

impl ClassKey {
    /// Build the key for a capacity unit using its category's rule.
    pub fn build(unit: &CapacityUnit) -> ReservationResult<Self> {
        match unit.category {
            Category::Ec2 => compute_key(&unit.size_class, &unit.location),
            Category::Elasticache => cache_key(
                unit.engine.as_deref().unwrap_or_default(),
                &unit.size_class,
                &unit.location,
            ),
            Category::Rds => relational_key(
                unit.engine.as_deref().unwrap_or_default(),
                &unit.size_class,
                unit.multi_az,
                &unit.location,
            ),
            Category::Redshift => warehouse_key(&unit.size_class, &unit.location),
        }
    }
}

/// `ec2:<instance type>:<availability zone>`
pub fn compute_key(instance_type: &str, availability_zone: &str) -> ReservationResult<ClassKey> {
    let category = Category::Ec2;
    Ok(join(&[
        category.tag(),
        require(category, "instance type", instance_type)?,
        require(category, "availability zone", availability_zone)?,
    ]))
}

/// `elasticache:<engine>:<node type>:<region>`
pub fn cache_key(engine: &str, node_type: &str, region: &str) -> ReservationResult<ClassKey> {
    let category = Category::Elasticache;
    Ok(join(&[
        category.tag(),
        require(category, "engine", engine)?,
        require(category, "node type", node_type)?,
        require(category, "region", region)?,
    ]))
}

/// `rds:<engine>:<instance class>[-multi_az]:<region>`
///
/// The suffix belongs to the instance class segment; alias folding only ever
/// rewrites the engine segment.
pub fn relational_key(
    engine: &str,
    instance_class: &str,
    multi_az: bool,
    region: &str,
) -> ReservationResult<ClassKey> {
    let category = Category::Rds;
    let engine = fold_engine_alias(require(category, "engine", engine)?);

    let mut size = require(category, "instance class", instance_class)?.to_string();
    if multi_az {
        size.push_str(MULTI_AZ_SUFFIX);
    }

    Ok(join(&[
        category.tag(),
        &engine,
        &size,
        require(category, "region", region)?,
    ]))
}

/// `redshift:<node type>:<region>`
pub fn warehouse_key(node_type: &str, region: &str) -> ReservationResult<ClassKey> {
    let category = Category::Redshift;
    Ok(join(&[
        category.tag(),
        require(category, "node type", node_type)?,
        require(category, "region", region)?,
    ]))
}

fn require<'a>(
    category: Category,
    field: &'static str,
    value: &'a str,
) -> ReservationResult<&'a str> {
    if value.trim().is_empty() {
        return Err(ReservationError::InvalidRecord { category, field });
    }
    Ok(value)
}

fn join(segments: &[&str]) -> ClassKey {
    ClassKey::new(segments.join(KEY_DELIMITER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_key_uses_zone() {
        let key = ClassKey::build(&CapacityUnit::compute("m5.large", "us-east-1a")).unwrap();
        assert_eq!(key.as_str(), "ec2:m5.large:us-east-1a");
    }

    #[test]
    fn test_cache_key() {
        let key = ClassKey::build(&CapacityUnit::cache("redis", "cache.r5.large", "eu-west-1"))
            .unwrap();
        assert_eq!(key.as_str(), "elasticache:redis:cache.r5.large:eu-west-1");
    }

    #[test]
    fn test_relational_key_single_az() {
        let key = relational_key("mysql", "db.m5.large", false, "us-west-2").unwrap();
        assert_eq!(key.as_str(), "rds:mysql:db.m5.large:us-west-2");
    }

    #[test]
    fn test_relational_key_multi_az_suffix() {
        let key = relational_key("mysql", "db.m5.large", true, "us-west-2").unwrap();
        assert_eq!(key.as_str(), "rds:mysql:db.m5.large-multi_az:us-west-2");
    }

    #[test]
    fn test_relational_key_folds_engine_alias() {
        let reserved = relational_key("postgresql", "db.small", false, "us-east-1").unwrap();
        let running = relational_key("postgres", "db.small", false, "us-east-1").unwrap();
        assert_eq!(reserved, running);
        assert_eq!(reserved.as_str(), "rds:postgres:db.small:us-east-1");
    }

    #[test]
    fn test_relational_key_alias_with_multi_az() {
        let key = relational_key("aurora-postgresql", "db.r5.large", true, "us-east-1").unwrap();
        assert_eq!(key.as_str(), "rds:aurora-postgres:db.r5.large-multi_az:us-east-1");
    }

    #[test]
    fn test_alias_folding_leaves_non_engine_segments() {
        // a class or region that happens to contain the alias text is not rewritten
        let key = relational_key("postgresql", "db.postgresql", false, "postgresql-1").unwrap();
        assert_eq!(key.as_str(), "rds:postgres:db.postgresql:postgresql-1");
    }

    #[test]
    fn test_warehouse_key() {
        let key = ClassKey::build(&CapacityUnit::warehouse("dc2.large", "us-east-1")).unwrap();
        assert_eq!(key.as_str(), "redshift:dc2.large:us-east-1");
    }

    #[test]
    fn test_fold_engine_alias_canonical_is_noop() {
        assert_eq!(fold_engine_alias("postgres"), "postgres");
        assert_eq!(fold_engine_alias("mysql"), "mysql");
        assert_eq!(fold_engine_alias("redis"), "redis");
    }

    #[test]
    fn test_fold_engine_alias_idempotent() {
        for engine in ["postgresql", "postgres", "aurora-postgresql", "mysql", "oracle-se2", ""] {
            let once = fold_engine_alias(engine);
            assert_eq!(fold_engine_alias(&once), once, "folding {engine} twice changed it");
        }
    }

    #[test]
    fn test_canonical_tokens_contain_no_alias() {
        for (_, canonical) in ENGINE_ALIASES {
            for (alias, _) in ENGINE_ALIASES {
                assert!(!canonical.contains(alias));
            }
        }
    }

    #[test]
    fn test_empty_components_rejected() {
        let cases = [
            (CapacityUnit::compute("", "us-east-1a"), "instance type"),
            (CapacityUnit::compute("m5.large", ""), "availability zone"),
            (CapacityUnit::cache("", "cache.t3.micro", "us-east-1"), "engine"),
            (CapacityUnit::cache("redis", " ", "us-east-1"), "node type"),
            (CapacityUnit::relational("mysql", "db.t3.micro", true, ""), "region"),
            (CapacityUnit::warehouse("", "us-east-1"), "node type"),
        ];

        for (unit, expected_field) in cases {
            match ClassKey::build(&unit) {
                Err(ReservationError::InvalidRecord { category, field }) => {
                    assert_eq!(category, unit.category);
                    assert_eq!(field, expected_field);
                }
                other => panic!("expected InvalidRecord for {unit:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_engine_rejected() {
        let mut unit = CapacityUnit::relational("mysql", "db.t3.micro", false, "us-east-1");
        unit.engine = None;
        assert!(matches!(
            ClassKey::build(&unit),
            Err(ReservationError::InvalidRecord { field: "engine", .. })
        ));
    }
}
