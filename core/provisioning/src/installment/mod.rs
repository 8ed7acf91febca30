pub mod error;
mod repo;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::primitives::*;

pub use repo::InstallmentRepo;

/// One uncompleted repayment-schedule row of a loan eligible for
/// provisioning. `outstanding_balance` is the loan's total outstanding,
/// repeated on every row of the loan.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OverdueInstallment {
    pub loan_id: LoanId,
    pub product_id: LoanProductId,
    pub office_id: OfficeId,
    pub currency_code: CurrencyCode,
    pub due_date: NaiveDate,
    pub outstanding_balance: Decimal,
}
