use chrono::NaiveDate;

/// Whole calendar days between `due_date` and `as_of`, floored at zero.
///
/// An installment that is not yet due ages as 0, never negative.
pub fn days_overdue(as_of: NaiveDate, due_date: NaiveDate) -> i32 {
    let days = as_of.signed_duration_since(due_date).num_days().max(0);
    i32::try_from(days).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn zero_when_not_yet_due() {
        assert_eq!(days_overdue(date(2024, 1, 1), date(2024, 2, 1)), 0);
    }

    #[test]
    fn zero_on_due_date() {
        assert_eq!(days_overdue(date(2024, 1, 15), date(2024, 1, 15)), 0);
    }

    #[test]
    fn counts_whole_days() {
        assert_eq!(days_overdue(date(2024, 1, 31), date(2024, 1, 1)), 30);
    }

    #[test]
    fn counts_across_year_boundary() {
        assert_eq!(days_overdue(date(2024, 1, 4), date(2023, 12, 25)), 10);
    }
}
