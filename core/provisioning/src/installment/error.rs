use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallmentError {
    #[error("InstallmentError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
}
