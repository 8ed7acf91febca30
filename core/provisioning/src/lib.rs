#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![cfg_attr(feature = "fail-on-warnings", deny(clippy::all))]

mod aging;
mod config;
mod criteria;
pub mod error;
mod history;
mod installment;
mod line;
mod primitives;
mod time;

use chrono::NaiveDate;
use tracing::instrument;

pub use aging::days_overdue;
pub use config::*;
pub use criteria::error::CriteriaError;
pub use criteria::{CriteriaMatcher, CriteriaRepo, ProductCriteriaMapping, ProvisioningCriteria};
use error::*;
pub use history::error::ProvisioningHistoryError;
pub use history::{
    NewProvisioningHistory, ProvisioningEntry, ProvisioningHistory, ProvisioningHistoryRepo,
    ProvisioningHistoryWithEntries,
};
pub use installment::error::InstallmentError;
pub use installment::{InstallmentRepo, OverdueInstallment};
pub use line::{ProvisioningLine, build_lines};
pub use primitives::*;

#[derive(Clone)]
pub struct CoreProvisioning {
    config: ProvisioningConfig,
    criteria: CriteriaRepo,
    installments: InstallmentRepo,
    histories: ProvisioningHistoryRepo,
}

impl CoreProvisioning {
    pub fn new(pool: &sqlx::PgPool, config: ProvisioningConfig) -> Self {
        Self {
            config,
            criteria: CriteriaRepo::new(pool),
            installments: InstallmentRepo::new(pool),
            histories: ProvisioningHistoryRepo::new(pool),
        }
    }

    /// Computes the candidate lines for a run as of the given date without
    /// persisting anything.
    #[instrument(name = "provisioning.lines.compute", skip(self))]
    pub async fn compute_lines(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<ProvisioningLine>, CoreProvisioningError> {
        let matcher = self.criteria.load_matcher().await?;
        let installments = self
            .installments
            .list_unprovisioned(&self.config.provisioned_loan_statuses)
            .await?;
        Ok(line::build_lines(as_of, &installments, &matcher))
    }

    /// Computes and persists a run in one call. The history row and all its
    /// entries commit atomically.
    #[instrument(name = "provisioning.run.create", skip(self))]
    pub async fn create_run(
        &self,
        as_of: NaiveDate,
        created_by: impl Into<UserId> + std::fmt::Debug,
    ) -> Result<ProvisioningHistory, CoreProvisioningError> {
        let lines = self.compute_lines(as_of).await?;
        self.create_run_from_lines(lines, created_by).await
    }

    /// Persists previously computed candidate lines as a new run.
    #[instrument(name = "provisioning.run.create_from_lines", skip(self, lines))]
    pub async fn create_run_from_lines(
        &self,
        lines: Vec<ProvisioningLine>,
        created_by: impl Into<UserId> + std::fmt::Debug,
    ) -> Result<ProvisioningHistory, CoreProvisioningError> {
        let new_history = NewProvisioningHistory::builder()
            .id(ProvisioningHistoryId::new())
            .created_by(created_by.into())
            .lines(lines)
            .build()
            .expect("all fields provided");

        Ok(self.histories.create_in_tx(new_history).await?)
    }

    /// Records that the run has been posted to the general ledger.
    /// Idempotent; fails only when the run does not exist.
    #[instrument(name = "provisioning.run.mark_journaled", skip(self))]
    pub async fn mark_journaled(
        &self,
        id: impl Into<ProvisioningHistoryId> + std::fmt::Debug,
        modified_by: impl Into<UserId> + std::fmt::Debug,
    ) -> Result<(), CoreProvisioningError> {
        Ok(self
            .histories
            .mark_journaled(id.into(), modified_by.into())
            .await?)
    }

    #[instrument(name = "provisioning.run.find_by_id", skip(self))]
    pub async fn find_run(
        &self,
        id: impl Into<ProvisioningHistoryId> + std::fmt::Debug,
    ) -> Result<ProvisioningHistoryWithEntries, CoreProvisioningError> {
        Ok(self.histories.find_by_id(id.into()).await?)
    }

    #[instrument(name = "provisioning.run.find_by_created_date", skip(self))]
    pub async fn find_run_by_created_date(
        &self,
        on: NaiveDate,
    ) -> Result<Option<ProvisioningHistory>, CoreProvisioningError> {
        Ok(self.histories.find_by_created_date(on).await?)
    }

    #[instrument(name = "provisioning.run.find_by_criteria", skip(self))]
    pub async fn find_run_by_criteria(
        &self,
        criteria_id: impl Into<CriteriaId> + std::fmt::Debug,
    ) -> Result<Option<ProvisioningHistoryWithEntries>, CoreProvisioningError> {
        Ok(self.histories.find_by_criteria(criteria_id.into()).await?)
    }

    #[instrument(name = "provisioning.run.list", skip(self))]
    pub async fn list_runs(&self) -> Result<Vec<ProvisioningHistory>, CoreProvisioningError> {
        Ok(self.histories.list().await?)
    }

    #[instrument(name = "provisioning.run.find_latest_journaled", skip(self))]
    pub async fn find_latest_journaled_run(
        &self,
    ) -> Result<Option<ProvisioningHistory>, CoreProvisioningError> {
        Ok(self.histories.find_latest_journaled().await?)
    }
}
