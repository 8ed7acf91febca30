use sqlx::PgPool;

use super::{CriteriaMatcher, ProductCriteriaMapping, ProvisioningCriteria, error::CriteriaError};

#[derive(Clone)]
pub struct CriteriaRepo {
    pool: PgPool,
}

impl CriteriaRepo {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn load_matcher(&self) -> Result<CriteriaMatcher, CriteriaError> {
        let definitions = sqlx::query_as::<_, ProvisioningCriteria>(
            r#"
            SELECT criteria_id, category_id, min_age, max_age,
                   provision_percentage, liability_account, expense_account
            FROM core_provisioning_criteria
            ORDER BY criteria_id, category_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mappings = sqlx::query_as::<_, ProductCriteriaMapping>(
            r#"
            SELECT product_id, criteria_id
            FROM core_loan_product_provisioning_mappings
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(CriteriaMatcher::new(mappings, definitions))
    }
}
