//! Report rendering

use clap::ValueEnum;
use domain_reservations::{ReconciliationReport, ReconciliationRow};
use eyre::Result;
use serde::Serialize;
use strum::{Display, EnumString};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    /// ASCII table, one row per class key
    #[default]
    Table,
    /// Pretty-printed JSON report
    Json,
}

#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "Type")]
    key: String,
    #[tabled(rename = "Unused Reservations")]
    unused_reservations: u64,
    #[tabled(rename = "Unreserved Units")]
    unreserved_units: u64,
    #[tabled(rename = "Total Reservations")]
    total_reservations: u64,
    #[tabled(rename = "Total Units")]
    total_units: u64,
}

impl From<&ReconciliationRow> for TableRow {
    fn from(row: &ReconciliationRow) -> Self {
        Self {
            key: row.key.to_string(),
            unused_reservations: row.unused_reservations,
            unreserved_units: row.unreserved_units,
            total_reservations: row.total_reservations,
            total_units: row.total_units,
        }
    }
}

pub fn render(report: &ReconciliationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

/// Rows keep report order.
pub fn render_table(report: &ReconciliationReport) -> String {
    let rows: Vec<TableRow> = report.rows.iter().map(TableRow::from).collect();
    Table::new(rows).with(Style::ascii()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_reservations::{Category, CategorySet, ClassKey};
    use std::str::FromStr;

    fn report() -> ReconciliationReport {
        ReconciliationReport::new(
            &CategorySet::from_iter([Category::Ec2, Category::Rds]),
            &["us-east-1".to_string()],
            vec![
                ReconciliationRow::new(ClassKey::new("ec2:m5.large:us-east-1a"), 0, 4),
                ReconciliationRow::new(ClassKey::new("rds:postgres:db.small:us-east-1"), 3, 2),
            ],
        )
    }

    #[test]
    fn test_table_has_headings_and_rows_in_order() {
        let table = render_table(&report());

        for heading in [
            "Type",
            "Unused Reservations",
            "Unreserved Units",
            "Total Reservations",
            "Total Units",
        ] {
            assert!(table.contains(heading), "missing heading {heading}");
        }

        let ec2 = table.find("ec2:m5.large:us-east-1a").unwrap();
        let rds = table.find("rds:postgres:db.small:us-east-1").unwrap();
        assert!(ec2 < rds);
    }

    #[test]
    fn test_empty_report_renders_headings_only() {
        let empty = ReconciliationReport::new(&CategorySet::all(), &["us-east-1".to_string()], vec![]);
        let table = render_table(&empty);

        assert!(table.contains("Type"));
        assert!(!table.contains("ec2:"));
    }

    #[test]
    fn test_json_round_trips_rows() {
        let json = render(&report(), OutputFormat::Json).unwrap();
        let parsed: ReconciliationReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.rows, report().rows);
        assert_eq!(parsed.categories, vec![Category::Ec2, Category::Rds]);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("TABLE").unwrap(), OutputFormat::Table);
        assert!(OutputFormat::from_str("csv").is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
