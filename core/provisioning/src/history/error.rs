use thiserror::Error;

use crate::primitives::ProvisioningHistoryId;

#[derive(Error, Debug)]
pub enum ProvisioningHistoryError {
    #[error("ProvisioningHistoryError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("ProvisioningHistoryError - NotFound: no provisioning run with id {0}")]
    NotFound(ProvisioningHistoryId),
}
