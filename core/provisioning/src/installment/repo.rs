use sqlx::PgPool;

use super::{OverdueInstallment, error::InstallmentError};

#[derive(Clone)]
pub struct InstallmentRepo {
    pool: PgPool,
}

impl InstallmentRepo {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    /// All uncompleted schedule rows of loans whose status participates in
    /// provisioning. Aging happens in the caller; rows due in the future age
    /// as zero there rather than being filtered here.
    pub async fn list_unprovisioned(
        &self,
        statuses: &[i32],
    ) -> Result<Vec<OverdueInstallment>, InstallmentError> {
        let rows = sqlx::query_as::<_, OverdueInstallment>(
            r#"
            SELECT l.id AS loan_id, l.product_id, l.office_id, l.currency_code,
                   s.due_date, l.total_outstanding AS outstanding_balance
            FROM core_loan_repayment_schedules s
            JOIN core_loans l ON l.id = s.loan_id
            WHERE l.status = ANY($1)
              AND NOT s.completed
            ORDER BY l.id, s.due_date
            "#,
        )
        .bind(statuses)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
