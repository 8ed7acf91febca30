use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvisioningConfig {
    /// Loan status codes (as recorded by the loan subsystem) whose loans
    /// participate in provisioning.
    #[serde(default = "default_provisioned_loan_statuses")]
    pub provisioned_loan_statuses: Vec<i32>,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        ProvisioningConfig {
            provisioned_loan_statuses: default_provisioned_loan_statuses(),
        }
    }
}

fn default_provisioned_loan_statuses() -> Vec<i32> {
    vec![300]
}
