//! Reservation Auditor
//!
//! Runs the audit for the configured categories and regions, once or on a
//! cron schedule.

use domain_reservations::{AuditService, ReconciliationReport};
use eyre::{Result, WrapErr};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::Config;
use crate::providers;
use crate::render::render;

/// Main auditor service
pub struct Auditor {
    config: Config,
    service: AuditService,
}

impl Auditor {
    /// Build an auditor backed by the AWS extractors.
    pub async fn new(config: Config) -> Self {
        let sdk_config = providers::load_sdk_config(&config.aws).await;

        let mut service = AuditService::new().with_concurrency(config.max_concurrency);
        providers::register_all(&mut service, &sdk_config);

        Self::with_service(config, service)
    }

    pub fn with_service(config: Config, service: AuditService) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one audit
    pub async fn audit(&self) -> Result<ReconciliationReport> {
        let mut report = self
            .service
            .run(&self.config.categories, &self.config.regions)
            .await
            .wrap_err("Reservation audit failed")?;

        if self.config.mismatched_only {
            report.retain_mismatched();
        }

        Ok(report)
    }

    /// Run one audit and render it in the configured format
    pub async fn audit_and_render(&self) -> Result<String> {
        let report = self.audit().await?;
        render(&report, self.config.output)
    }

    /// Run audits on a cron schedule until interrupted.
    ///
    /// A failed run is logged and the next scheduled run goes ahead.
    pub async fn run_scheduled(self, cron_expr: &str) -> Result<()> {
        info!(cron = cron_expr, "Starting scheduled reservation audits");

        let mut sched = JobScheduler::new().await?;
        let auditor = Arc::new(self);

        let job = Job::new_async(cron_expr, move |_uuid, _l| {
            let auditor = auditor.clone();

            Box::pin(async move {
                info!("Running scheduled reservation audit");

                match auditor.audit_and_render().await {
                    Ok(output) => println!("{output}"),
                    Err(e) => {
                        error!(error = ?e, "Scheduled audit failed");
                    }
                }
            })
        })
        .wrap_err_with(|| format!("Invalid cron expression: {cron_expr}"))?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Scheduler started, press Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;

        info!("Shutting down scheduler");
        sched.shutdown().await?;
        Ok(())
    }
}
