use chrono::{DateTime, Utc};
use derive_builder::Builder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{line::ProvisioningLine, primitives::*};

/// One provisioning run. `journal_entry_created` transitions false -> true
/// exactly once, when the ledger posting succeeds outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProvisioningHistory {
    pub id: ProvisioningHistoryId,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
    pub created_by_username: Option<String>,
    pub last_modified_by: Option<UserId>,
    pub last_modified_by_username: Option<String>,
    pub journal_entry_created: bool,
}

/// A persisted provisioning line. Entries have no identity outside their run;
/// deleting a history deletes its entries.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProvisioningEntry {
    pub id: ProvisioningEntryId,
    pub history_id: ProvisioningHistoryId,
    pub office_id: OfficeId,
    pub product_id: LoanProductId,
    pub category_id: CategoryId,
    pub criteria_id: CriteriaId,
    pub currency_code: CurrencyCode,
    pub overdue_days: i32,
    pub reserve_amount: Decimal,
    pub liability_account: GlAccountId,
    pub expense_account: GlAccountId,
}

#[derive(Debug, Clone)]
pub struct ProvisioningHistoryWithEntries {
    pub history: ProvisioningHistory,
    pub entries: Vec<ProvisioningEntry>,
}

#[derive(Debug, Builder)]
pub struct NewProvisioningHistory {
    #[builder(setter(into))]
    pub(super) id: ProvisioningHistoryId,
    #[builder(setter(into))]
    pub(super) created_by: UserId,
    pub(super) lines: Vec<ProvisioningLine>,
}

impl NewProvisioningHistory {
    pub fn builder() -> NewProvisioningHistoryBuilder {
        NewProvisioningHistoryBuilder::default()
    }
}
