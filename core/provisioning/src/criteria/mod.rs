pub mod error;
mod repo;

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::primitives::*;

pub use repo::CriteriaRepo;

/// One configured aging bucket: an inclusive `[min_age, max_age]` range mapped
/// to a reserve percentage (a fraction, `0.1` = 10%) and the liability/expense
/// accounts the reserve is posted against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProvisioningCriteria {
    pub criteria_id: CriteriaId,
    pub category_id: CategoryId,
    pub min_age: i32,
    pub max_age: i32,
    pub provision_percentage: Decimal,
    pub liability_account: GlAccountId,
    pub expense_account: GlAccountId,
}

impl ProvisioningCriteria {
    pub fn contains_age(&self, age: i32) -> bool {
        self.min_age <= age && age <= self.max_age
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ProductCriteriaMapping {
    pub product_id: LoanProductId,
    pub criteria_id: CriteriaId,
}

/// Resolves which criteria definition applies to a loan product at a given
/// delinquency age.
pub struct CriteriaMatcher {
    by_product: HashMap<LoanProductId, Vec<ProvisioningCriteria>>,
}

impl CriteriaMatcher {
    pub fn new(
        mappings: impl IntoIterator<Item = ProductCriteriaMapping>,
        definitions: impl IntoIterator<Item = ProvisioningCriteria>,
    ) -> Self {
        let definitions: Vec<_> = definitions.into_iter().collect();
        let mut by_product: HashMap<LoanProductId, Vec<ProvisioningCriteria>> = HashMap::new();
        for mapping in mappings {
            let defs = definitions
                .iter()
                .filter(|d| d.criteria_id == mapping.criteria_id)
                .cloned();
            by_product.entry(mapping.product_id).or_default().extend(defs);
        }
        for defs in by_product.values_mut() {
            defs.sort_by_key(|d| (d.criteria_id, d.category_id, d.min_age));
        }
        Self { by_product }
    }

    /// `None` when the product has no mapping or no range contains the age;
    /// the loan is then simply not provisioned. Overlapping ranges are a
    /// misconfiguration: the lowest `(criteria_id, category_id)` wins and the
    /// overlap is reported.
    pub fn match_criteria(
        &self,
        product_id: LoanProductId,
        age: i32,
    ) -> Option<&ProvisioningCriteria> {
        let candidates: Vec<_> = self
            .by_product
            .get(&product_id)?
            .iter()
            .filter(|d| d.contains_age(age))
            .collect();
        if candidates.len() > 1 {
            tracing::warn!(
                %product_id,
                age,
                matches = candidates.len(),
                "overlapping provisioning criteria, keeping lowest criteria id"
            );
        }
        candidates.into_iter().next()
    }
}

#[cfg(test)]
mod test {
    use rust_decimal_macros::dec;

    use super::*;

    fn criteria(criteria_id: i64, category_id: i64, min_age: i32, max_age: i32) -> ProvisioningCriteria {
        ProvisioningCriteria {
            criteria_id: criteria_id.into(),
            category_id: category_id.into(),
            min_age,
            max_age,
            provision_percentage: dec!(0.1),
            liability_account: 500.into(),
            expense_account: 600.into(),
        }
    }

    fn mapping(product_id: i64, criteria_id: i64) -> ProductCriteriaMapping {
        ProductCriteriaMapping {
            product_id: product_id.into(),
            criteria_id: criteria_id.into(),
        }
    }

    #[test]
    fn matches_within_range() {
        let matcher = CriteriaMatcher::new([mapping(10, 1)], [criteria(1, 3, 20, 40)]);
        let matched = matcher
            .match_criteria(10.into(), 30)
            .expect("age 30 is in range");
        assert_eq!(matched.criteria_id, 1.into());
        assert_eq!(matched.category_id, 3.into());
    }

    #[test]
    fn range_boundaries_are_inclusive() {
        let matcher = CriteriaMatcher::new([mapping(10, 1)], [criteria(1, 3, 20, 40)]);
        assert!(matcher.match_criteria(10.into(), 20).is_some());
        assert!(matcher.match_criteria(10.into(), 40).is_some());
        assert!(matcher.match_criteria(10.into(), 19).is_none());
        assert!(matcher.match_criteria(10.into(), 41).is_none());
    }

    #[test]
    fn none_without_product_mapping() {
        let matcher = CriteriaMatcher::new([mapping(10, 1)], [criteria(1, 3, 0, 90)]);
        assert!(matcher.match_criteria(11.into(), 30).is_none());
    }

    #[test]
    fn adjacent_ranges_yield_one_match() {
        let matcher = CriteriaMatcher::new(
            [mapping(10, 1)],
            [criteria(1, 3, 0, 29), criteria(1, 4, 30, 60)],
        );
        let matched = matcher.match_criteria(10.into(), 30).expect("in range");
        assert_eq!(matched.category_id, 4.into());
    }

    #[test]
    fn overlapping_ranges_pick_lowest_criteria_id_deterministically() {
        let definitions = [criteria(2, 3, 25, 50), criteria(1, 3, 20, 40)];
        let matcher = CriteriaMatcher::new([mapping(10, 1), mapping(10, 2)], definitions.clone());
        let first = matcher.match_criteria(10.into(), 30).expect("in range");
        assert_eq!(first.criteria_id, 1.into());

        // Same winner regardless of definition input order.
        let reversed = CriteriaMatcher::new(
            [mapping(10, 2), mapping(10, 1)],
            definitions.into_iter().rev(),
        );
        let second = reversed.match_criteria(10.into(), 30).expect("in range");
        assert_eq!(second.criteria_id, 1.into());
    }

    #[test]
    fn products_resolve_independent_criteria_sets() {
        let matcher = CriteriaMatcher::new(
            [mapping(10, 1), mapping(20, 2)],
            [criteria(1, 3, 0, 30), criteria(2, 3, 0, 30)],
        );
        assert_eq!(
            matcher
                .match_criteria(10.into(), 10)
                .expect("mapped")
                .criteria_id,
            1.into()
        );
        assert_eq!(
            matcher
                .match_criteria(20.into(), 10)
                .expect("mapped")
                .criteria_id,
            2.into()
        );
    }
}
