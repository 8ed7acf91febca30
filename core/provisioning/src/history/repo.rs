use chrono::NaiveDate;
use sqlx::PgPool;

use crate::primitives::*;

use super::{entity::*, error::ProvisioningHistoryError};

#[derive(Clone)]
pub struct ProvisioningHistoryRepo {
    pool: PgPool,
}

impl ProvisioningHistoryRepo {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    /// Persists the history row and one entry per line in a single
    /// transaction; the run commits as a whole or not at all.
    pub async fn create_in_tx(
        &self,
        new_history: NewProvisioningHistory,
    ) -> Result<ProvisioningHistory, ProvisioningHistoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO core_provisioning_histories (id, created_at, created_by, journal_entry_created)
            VALUES ($1, $2, $3, FALSE)
            "#,
        )
        .bind(new_history.id)
        .bind(crate::time::now())
        .bind(new_history.created_by)
        .execute(&mut *tx)
        .await?;

        for line in &new_history.lines {
            sqlx::query(
                r#"
                INSERT INTO core_provisioning_entries
                    (history_id, office_id, product_id, category_id, criteria_id,
                     currency_code, overdue_days, reserve_amount, liability_account, expense_account)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(new_history.id)
            .bind(line.office_id)
            .bind(line.product_id)
            .bind(line.category_id)
            .bind(line.criteria_id)
            .bind(&line.currency_code)
            .bind(line.overdue_days)
            .bind(line.reserve_amount())
            .bind(line.liability_account)
            .bind(line.expense_account)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.find_header(new_history.id).await
    }

    /// Idempotent: an already-journaled run stays journaled.
    pub async fn mark_journaled(
        &self,
        id: ProvisioningHistoryId,
        modified_by: UserId,
    ) -> Result<(), ProvisioningHistoryError> {
        let result = sqlx::query(
            r#"
            UPDATE core_provisioning_histories
            SET journal_entry_created = TRUE, last_modified_by = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(modified_by)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ProvisioningHistoryError::NotFound(id));
        }
        Ok(())
    }

    pub async fn find_by_id(
        &self,
        id: ProvisioningHistoryId,
    ) -> Result<ProvisioningHistoryWithEntries, ProvisioningHistoryError> {
        let history = self.find_header(id).await?;

        let entries = sqlx::query_as::<_, ProvisioningEntry>(
            r#"
            SELECT id, history_id, office_id, product_id, category_id, criteria_id,
                   currency_code, overdue_days, reserve_amount, liability_account, expense_account
            FROM core_provisioning_entries
            WHERE history_id = $1
            ORDER BY id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ProvisioningHistoryWithEntries { history, entries })
    }

    /// Runs created on the given calendar day (UTC); the earliest one wins if
    /// several exist. An empty result is an answer, not an error.
    pub async fn find_by_created_date(
        &self,
        on: NaiveDate,
    ) -> Result<Option<ProvisioningHistory>, ProvisioningHistoryError> {
        let history = sqlx::query_as::<_, ProvisioningHistory>(
            r#"
            SELECT h.id, h.created_at, h.created_by, cu.username AS created_by_username,
                   h.last_modified_by, mu.username AS last_modified_by_username,
                   h.journal_entry_created
            FROM core_provisioning_histories h
            LEFT JOIN core_users cu ON cu.id = h.created_by
            LEFT JOIN core_users mu ON mu.id = h.last_modified_by
            WHERE date(h.created_at AT TIME ZONE 'UTC') = $1
            ORDER BY h.created_at
            LIMIT 1
            "#,
        )
        .bind(on)
        .fetch_optional(&self.pool)
        .await?;

        Ok(history)
    }

    /// The earliest-created run holding entries for the criteria, returned
    /// with the entries that match it.
    pub async fn find_by_criteria(
        &self,
        criteria_id: CriteriaId,
    ) -> Result<Option<ProvisioningHistoryWithEntries>, ProvisioningHistoryError> {
        let history = sqlx::query_as::<_, ProvisioningHistory>(
            r#"
            SELECT h.id, h.created_at, h.created_by, cu.username AS created_by_username,
                   h.last_modified_by, mu.username AS last_modified_by_username,
                   h.journal_entry_created
            FROM core_provisioning_histories h
            LEFT JOIN core_users cu ON cu.id = h.created_by
            LEFT JOIN core_users mu ON mu.id = h.last_modified_by
            WHERE h.id = (
                SELECT e.history_id
                FROM core_provisioning_entries e
                JOIN core_provisioning_histories parent ON parent.id = e.history_id
                WHERE e.criteria_id = $1
                ORDER BY parent.created_at, e.id
                LIMIT 1
            )
            "#,
        )
        .bind(criteria_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(history) = history else {
            return Ok(None);
        };

        let entries = sqlx::query_as::<_, ProvisioningEntry>(
            r#"
            SELECT id, history_id, office_id, product_id, category_id, criteria_id,
                   currency_code, overdue_days, reserve_amount, liability_account, expense_account
            FROM core_provisioning_entries
            WHERE history_id = $1 AND criteria_id = $2
            ORDER BY id
            "#,
        )
        .bind(history.id)
        .bind(criteria_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ProvisioningHistoryWithEntries { history, entries }))
    }

    pub async fn list(&self) -> Result<Vec<ProvisioningHistory>, ProvisioningHistoryError> {
        let histories = sqlx::query_as::<_, ProvisioningHistory>(
            r#"
            SELECT h.id, h.created_at, h.created_by, cu.username AS created_by_username,
                   h.last_modified_by, mu.username AS last_modified_by_username,
                   h.journal_entry_created
            FROM core_provisioning_histories h
            LEFT JOIN core_users cu ON cu.id = h.created_by
            LEFT JOIN core_users mu ON mu.id = h.last_modified_by
            ORDER BY h.created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(histories)
    }

    /// The most recently created run that has been posted to the ledger;
    /// `None` if no run was ever journaled.
    pub async fn find_latest_journaled(
        &self,
    ) -> Result<Option<ProvisioningHistory>, ProvisioningHistoryError> {
        let history = sqlx::query_as::<_, ProvisioningHistory>(
            r#"
            SELECT h.id, h.created_at, h.created_by, cu.username AS created_by_username,
                   h.last_modified_by, mu.username AS last_modified_by_username,
                   h.journal_entry_created
            FROM core_provisioning_histories h
            LEFT JOIN core_users cu ON cu.id = h.created_by
            LEFT JOIN core_users mu ON mu.id = h.last_modified_by
            WHERE h.journal_entry_created
            ORDER BY h.created_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(history)
    }

    async fn find_header(
        &self,
        id: ProvisioningHistoryId,
    ) -> Result<ProvisioningHistory, ProvisioningHistoryError> {
        sqlx::query_as::<_, ProvisioningHistory>(
            r#"
            SELECT h.id, h.created_at, h.created_by, cu.username AS created_by_username,
                   h.last_modified_by, mu.username AS last_modified_by_username,
                   h.journal_entry_created
            FROM core_provisioning_histories h
            LEFT JOIN core_users cu ON cu.id = h.created_by
            LEFT JOIN core_users mu ON mu.id = h.last_modified_by
            WHERE h.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ProvisioningHistoryError::NotFound(id))
    }
}
