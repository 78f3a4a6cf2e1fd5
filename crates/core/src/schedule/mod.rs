//! Loan installment schedule arithmetic.
//!
//! Flat-rate amortization: principal is split evenly over the tenor and
//! every month carries the same interest charge on the original amount.
//! All rounding is to 2 decimal places; the final installment absorbs the
//! principal rounding remainder so the schedule always sums exactly to
//! the loan amount.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while building a schedule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// Tenor must be at least one month.
    #[error("Tenor must be at least one month")]
    ZeroTenor,

    /// Principal must be positive.
    #[error("Principal must be positive")]
    NonPositivePrincipal,

    /// Interest rate cannot be negative.
    #[error("Interest rate cannot be negative")]
    NegativeRate,
}

/// One planned installment of a loan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallmentPlan {
    /// 1-indexed installment number.
    pub number: u32,
    /// Due date, one month per installment after the start date.
    pub due_date: NaiveDate,
    /// Principal component.
    pub principal: Decimal,
    /// Interest component.
    pub interest: Decimal,
    /// Total due (principal + interest).
    pub total: Decimal,
}

/// Builds the full installment schedule for a loan.
///
/// # Errors
///
/// Returns `ScheduleError` when the inputs cannot form a schedule.
pub fn build_schedule(
    principal: Decimal,
    tenor_months: u32,
    monthly_rate_percent: Decimal,
    start_date: NaiveDate,
) -> Result<Vec<InstallmentPlan>, ScheduleError> {
    if tenor_months == 0 {
        return Err(ScheduleError::ZeroTenor);
    }
    if principal <= Decimal::ZERO {
        return Err(ScheduleError::NonPositivePrincipal);
    }
    if monthly_rate_percent < Decimal::ZERO {
        return Err(ScheduleError::NegativeRate);
    }

    let tenor = Decimal::from(tenor_months);
    let monthly_principal = (principal / tenor).round_dp(2);
    let monthly_interest = (principal * monthly_rate_percent / Decimal::ONE_HUNDRED).round_dp(2);

    let mut schedule = Vec::with_capacity(tenor_months as usize);
    for number in 1..=tenor_months {
        let principal_component = if number == tenor_months {
            // Last installment absorbs the rounding remainder.
            principal - monthly_principal * (tenor - Decimal::ONE)
        } else {
            monthly_principal
        };

        schedule.push(InstallmentPlan {
            number,
            due_date: start_date + Months::new(number),
            principal: principal_component,
            interest: monthly_interest,
            total: principal_component + monthly_interest,
        });
    }

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    #[test]
    fn test_even_split() {
        let schedule = build_schedule(dec!(1200000), 12, dec!(1.5), start()).unwrap();

        assert_eq!(schedule.len(), 12);
        for plan in &schedule {
            assert_eq!(plan.principal, dec!(100000));
            assert_eq!(plan.interest, dec!(18000));
            assert_eq!(plan.total, dec!(118000));
        }
        assert_eq!(schedule[0].due_date, NaiveDate::from_ymd_opt(2026, 2, 15).unwrap());
        assert_eq!(schedule[11].due_date, NaiveDate::from_ymd_opt(2027, 1, 15).unwrap());
    }

    #[test]
    fn test_last_installment_absorbs_remainder() {
        // 1000 / 3 = 333.33, last takes 333.34
        let schedule = build_schedule(dec!(1000), 3, dec!(0), start()).unwrap();

        assert_eq!(schedule[0].principal, dec!(333.33));
        assert_eq!(schedule[1].principal, dec!(333.33));
        assert_eq!(schedule[2].principal, dec!(333.34));

        let total: Decimal = schedule.iter().map(|p| p.principal).sum();
        assert_eq!(total, dec!(1000));
    }

    #[test]
    fn test_zero_rate_has_no_interest() {
        let schedule = build_schedule(dec!(500000), 5, dec!(0), start()).unwrap();
        assert!(schedule.iter().all(|p| p.interest.is_zero()));
        assert!(schedule.iter().all(|p| p.total == p.principal));
    }

    #[test]
    fn test_input_validation() {
        assert_eq!(
            build_schedule(dec!(1000), 0, dec!(1), start()).unwrap_err(),
            ScheduleError::ZeroTenor
        );
        assert_eq!(
            build_schedule(dec!(0), 10, dec!(1), start()).unwrap_err(),
            ScheduleError::NonPositivePrincipal
        );
        assert_eq!(
            build_schedule(dec!(1000), 10, dec!(-1), start()).unwrap_err(),
            ScheduleError::NegativeRate
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Principal components always sum exactly to the loan amount.
        #[test]
        fn prop_principal_sums_to_amount(
            cents in 1i64..100_000_000i64,
            tenor in 1u32..=60,
        ) {
            let principal = Decimal::new(cents, 2);
            let schedule = build_schedule(principal, tenor, dec!(1.25), start()).unwrap();

            prop_assert_eq!(schedule.len(), tenor as usize);
            let total: Decimal = schedule.iter().map(|p| p.principal).sum();
            prop_assert_eq!(total, principal);
        }

        /// Installment numbers are 1..=tenor in order, with strictly
        /// increasing due dates.
        #[test]
        fn prop_numbers_and_dates_ordered(tenor in 1u32..=48) {
            let schedule = build_schedule(dec!(1000000), tenor, dec!(2), start()).unwrap();

            for (i, plan) in schedule.iter().enumerate() {
                prop_assert_eq!(plan.number, u32::try_from(i).unwrap() + 1);
            }
            for window in schedule.windows(2) {
                prop_assert!(window[0].due_date < window[1].due_date);
            }
        }
    }
}
