//! Loan amortisation and discounting helpers.
//!
//! Rates are annual decimals and periods are whole years. A zero rate is a
//! valid input everywhere: loans then amortise straight-line and discount
//! factors are one.

/// Level annual payment that amortises `principal` over `years` at `rate`.
///
/// Returns zero for a non-positive principal and the full principal when
/// `years` is zero.
///
/// # Examples
///
/// ```
/// use dcf_core::math::finance::annuity_payment;
///
/// assert_eq!(annuity_payment(300_000.0, 0.0, 30), 10_000.0);
/// assert!((annuity_payment(100_000.0, 0.05, 10) - 12_950.4575).abs() < 1e-3);
/// ```
pub fn annuity_payment(principal: f64, rate: f64, years: u32) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    if years == 0 {
        return principal;
    }
    let n = f64::from(years);
    if rate == 0.0 {
        return principal / n;
    }
    principal * rate / (1.0 - (1.0 + rate).powf(-n))
}

/// Largest principal a level annual `payment` can amortise over `years`.
///
/// Inverse of [`annuity_payment`].
pub fn principal_for_payment(payment: f64, rate: f64, years: u32) -> f64 {
    if payment <= 0.0 || years == 0 {
        return 0.0;
    }
    let n = f64::from(years);
    if rate == 0.0 {
        return payment * n;
    }
    payment * (1.0 - (1.0 + rate).powf(-n)) / rate
}

/// Outstanding balance after `payments_made` level annual payments.
///
/// Zero once the loan is fully amortised.
pub fn remaining_balance(principal: f64, rate: f64, years: u32, payments_made: u32) -> f64 {
    if principal <= 0.0 || payments_made >= years {
        return 0.0;
    }
    let k = f64::from(payments_made);
    if rate == 0.0 {
        return principal * (1.0 - k / f64::from(years));
    }
    let payment = annuity_payment(principal, rate, years);
    let growth = (1.0 + rate).powf(k);
    (principal * growth - payment * (growth - 1.0) / rate).max(0.0)
}

/// Discount factor `(1 + rate)^-t`.
#[inline]
pub fn discount_factor(rate: f64, t: u32) -> f64 {
    (1.0 + rate).powi(-(t as i32))
}

/// Net present value of `flows`, where `flows[t]` occurs at the end of year `t`.
///
/// # Examples
///
/// ```
/// use dcf_core::math::finance::npv;
///
/// let value = npv(0.10, &[-100.0, 110.0]);
/// assert!(value.abs() < 1e-12);
/// ```
pub fn npv(rate: f64, flows: &[f64]) -> f64 {
    let base = 1.0 + rate;
    let mut factor = 1.0;
    let mut total = 0.0;
    for flow in flows {
        total += flow / factor;
        factor *= base;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_annuity_payment_known_value() {
        // 1M at 6% over 30 years
        assert_relative_eq!(
            annuity_payment(1_000_000.0, 0.06, 30),
            72_648.9115,
            max_relative = 1e-8
        );
    }

    #[test]
    fn test_zero_rate_amortises_straight_line() {
        assert_relative_eq!(annuity_payment(300_000.0, 0.0, 30), 10_000.0);
        assert_relative_eq!(
            remaining_balance(300_000.0, 0.0, 30, 5),
            250_000.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(principal_for_payment(10_000.0, 0.0, 30), 300_000.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(annuity_payment(0.0, 0.05, 30), 0.0);
        assert_eq!(annuity_payment(-5.0, 0.05, 30), 0.0);
        assert_eq!(annuity_payment(1_000.0, 0.05, 0), 1_000.0);
        assert_eq!(principal_for_payment(0.0, 0.05, 30), 0.0);
        assert_eq!(remaining_balance(1_000.0, 0.05, 30, 31), 0.0);
    }

    #[test]
    fn test_remaining_balance_matches_schedule() {
        let principal = 3_060_000.0;
        let rate = 0.065;
        let payment = annuity_payment(principal, rate, 30);
        let mut balance = principal;
        for year in 1..=5 {
            balance = balance * (1.0 + rate) - payment;
            assert_relative_eq!(
                remaining_balance(principal, rate, 30, year),
                balance,
                max_relative = 1e-10
            );
        }
    }

    #[test]
    fn test_npv_discounts_each_year() {
        let flows = [-1_000.0, 100.0, 100.0, 1_100.0];
        assert_relative_eq!(npv(0.10, &flows), 0.0, epsilon = 1e-9);
        assert_relative_eq!(npv(0.0, &flows), 300.0, max_relative = 1e-12);
        assert_relative_eq!(discount_factor(0.10, 2), 1.0 / 1.21, max_relative = 1e-12);
    }

    proptest! {
        #[test]
        fn prop_principal_for_payment_inverts_annuity(
            principal in 1.0e3..1.0e8f64,
            rate in 0.0..0.25f64,
            years in 1u32..40,
        ) {
            let payment = annuity_payment(principal, rate, years);
            let back = principal_for_payment(payment, rate, years);
            prop_assert!((back - principal).abs() <= principal * 1e-9);
        }

        #[test]
        fn prop_balance_decreases(
            principal in 1.0e3..1.0e8f64,
            rate in 0.0..0.25f64,
            years in 2u32..40,
        ) {
            let mut previous = principal;
            for k in 1..=years {
                let balance = remaining_balance(principal, rate, years, k);
                prop_assert!(balance <= previous + 1e-6);
                previous = balance;
            }
            prop_assert_eq!(previous, 0.0);
        }
    }
}
