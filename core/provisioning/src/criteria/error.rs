use thiserror::Error;

#[derive(Error, Debug)]
pub enum CriteriaError {
    #[error("CriteriaError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
}
