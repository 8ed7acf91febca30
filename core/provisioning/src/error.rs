use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreProvisioningError {
    #[error("CoreProvisioningError - CriteriaError: {0}")]
    CriteriaError(#[from] crate::criteria::error::CriteriaError),
    #[error("CoreProvisioningError - InstallmentError: {0}")]
    InstallmentError(#[from] crate::installment::error::InstallmentError),
    #[error("CoreProvisioningError - ProvisioningHistoryError: {0}")]
    ProvisioningHistoryError(#[from] crate::history::error::ProvisioningHistoryError),
}
