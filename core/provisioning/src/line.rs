use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    aging::days_overdue, criteria::CriteriaMatcher, installment::OverdueInstallment, primitives::*,
};

/// A candidate provisioning line for one loan, computed fresh per run and not
/// persisted until committed to a history.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningLine {
    pub loan_id: LoanId,
    pub office_id: OfficeId,
    pub criteria_id: CriteriaId,
    pub product_id: LoanProductId,
    pub currency_code: CurrencyCode,
    pub overdue_days: i32,
    pub category_id: CategoryId,
    pub provision_percentage: Decimal,
    pub outstanding_balance: Decimal,
    pub liability_account: GlAccountId,
    pub expense_account: GlAccountId,
}

impl ProvisioningLine {
    pub fn reserve_amount(&self) -> Decimal {
        (self.outstanding_balance * self.provision_percentage).round_dp(2)
    }
}

/// Builds the candidate lines for a run: one line per loan, keyed off the
/// loan's oldest unpaid installment, skipping loans whose age matches no
/// criteria. Output is ordered by `(product_id, loan_id)`.
pub fn build_lines(
    as_of: NaiveDate,
    installments: &[OverdueInstallment],
    matcher: &CriteriaMatcher,
) -> Vec<ProvisioningLine> {
    let mut representative: BTreeMap<LoanId, &OverdueInstallment> = BTreeMap::new();
    for installment in installments {
        representative
            .entry(installment.loan_id)
            .and_modify(|kept| {
                if installment.due_date < kept.due_date {
                    *kept = installment;
                }
            })
            .or_insert(installment);
    }

    let mut lines: Vec<_> = representative
        .values()
        .filter_map(|installment| {
            let age = days_overdue(as_of, installment.due_date);
            let criteria = matcher.match_criteria(installment.product_id, age)?;
            Some(ProvisioningLine {
                loan_id: installment.loan_id,
                office_id: installment.office_id,
                criteria_id: criteria.criteria_id,
                product_id: installment.product_id,
                currency_code: installment.currency_code.clone(),
                overdue_days: age,
                category_id: criteria.category_id,
                provision_percentage: criteria.provision_percentage,
                outstanding_balance: installment.outstanding_balance,
                liability_account: criteria.liability_account,
                expense_account: criteria.expense_account,
            })
        })
        .collect();

    lines.sort_by_key(|line| (line.product_id, line.loan_id));
    lines
}

#[cfg(test)]
mod test {
    use rust_decimal_macros::dec;

    use crate::criteria::{ProductCriteriaMapping, ProvisioningCriteria};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn installment(loan_id: i64, product_id: i64, due_date: NaiveDate) -> OverdueInstallment {
        OverdueInstallment {
            loan_id: loan_id.into(),
            product_id: product_id.into(),
            office_id: 1.into(),
            currency_code: CurrencyCode::new("USD"),
            due_date,
            outstanding_balance: dec!(1000),
        }
    }

    fn default_matcher() -> CriteriaMatcher {
        CriteriaMatcher::new(
            [ProductCriteriaMapping {
                product_id: 10.into(),
                criteria_id: 1.into(),
            }],
            [ProvisioningCriteria {
                criteria_id: 1.into(),
                category_id: 3.into(),
                min_age: 20,
                max_age: 40,
                provision_percentage: dec!(0.1),
                liability_account: 500.into(),
                expense_account: 600.into(),
            }],
        )
    }

    #[test]
    fn provisions_an_overdue_loan() {
        let lines = build_lines(
            date(2024, 1, 31),
            &[installment(1, 10, date(2024, 1, 1))],
            &default_matcher(),
        );

        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.overdue_days, 30);
        assert_eq!(line.reserve_amount(), dec!(100.00));
        assert_eq!(line.liability_account, 500.into());
        assert_eq!(line.expense_account, 600.into());
        assert_eq!(line.category_id, 3.into());
        assert_eq!(line.criteria_id, 1.into());
    }

    #[test]
    fn keeps_one_line_per_loan_from_the_oldest_installment() {
        let lines = build_lines(
            date(2024, 1, 31),
            &[
                installment(1, 10, date(2024, 1, 10)),
                installment(1, 10, date(2024, 1, 1)),
                installment(1, 10, date(2024, 2, 15)),
            ],
            &default_matcher(),
        );

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].overdue_days, 30);
    }

    #[test]
    fn skips_loans_whose_age_matches_no_criteria() {
        let lines = build_lines(
            date(2024, 6, 1),
            &[installment(1, 10, date(2024, 1, 1))],
            &default_matcher(),
        );
        assert!(lines.is_empty());
    }

    #[test]
    fn skips_unmapped_products() {
        let lines = build_lines(
            date(2024, 1, 31),
            &[installment(1, 99, date(2024, 1, 1))],
            &default_matcher(),
        );
        assert!(lines.is_empty());
    }

    #[test]
    fn orders_lines_by_product_id() {
        let matcher = CriteriaMatcher::new(
            [
                ProductCriteriaMapping {
                    product_id: 10.into(),
                    criteria_id: 1.into(),
                },
                ProductCriteriaMapping {
                    product_id: 20.into(),
                    criteria_id: 1.into(),
                },
            ],
            [ProvisioningCriteria {
                criteria_id: 1.into(),
                category_id: 3.into(),
                min_age: 0,
                max_age: 90,
                provision_percentage: dec!(0.1),
                liability_account: 500.into(),
                expense_account: 600.into(),
            }],
        );

        let lines = build_lines(
            date(2024, 1, 31),
            &[
                installment(2, 20, date(2024, 1, 1)),
                installment(1, 10, date(2024, 1, 1)),
            ],
            &matcher,
        );

        let products: Vec<_> = lines.iter().map(|l| l.product_id).collect();
        assert_eq!(products, vec![10.into(), 20.into()]);
    }

    #[test]
    fn reserve_amount_rounds_to_cents() {
        let mut line_installment = installment(1, 10, date(2024, 1, 1));
        line_installment.outstanding_balance = dec!(333.33);
        let matcher = CriteriaMatcher::new(
            [ProductCriteriaMapping {
                product_id: 10.into(),
                criteria_id: 1.into(),
            }],
            [ProvisioningCriteria {
                criteria_id: 1.into(),
                category_id: 3.into(),
                min_age: 0,
                max_age: 90,
                provision_percentage: dec!(0.015),
                liability_account: 500.into(),
                expense_account: 600.into(),
            }],
        );

        let lines = build_lines(date(2024, 1, 31), &[line_installment], &matcher);
        assert_eq!(lines[0].reserve_amount(), dec!(5.00));
    }
}
