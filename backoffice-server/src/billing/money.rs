//! Money arithmetic
//!
//! Stored and wire amounts are f64; every computation routes through
//! `rust_decimal` with a fixed 2-decimal half-up policy. The 0.005 tolerance
//! absorbs the representation error when comparing stored balances.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Tolerance for "fully paid" and balance comparisons on stored f64 amounts
pub const MONEY_TOLERANCE: f64 = 0.005;

pub fn dec(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Round to 2 decimals, midpoint away from zero
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round2_f64(value: f64) -> f64 {
    to_f64(round2(dec(value)))
}

/// Sum a series of stored amounts without accumulating float error
pub fn sum2(values: impl IntoIterator<Item = f64>) -> f64 {
    let total: Decimal = values.into_iter().map(dec).sum();
    to_f64(round2(total))
}

/// Commission split: `(monto_comision, monto_neto)` for a gross amount at a
/// percentage 0-100. Preview and commit share this exact function.
pub fn comision(monto_bruto: f64, porcentaje: f64) -> (f64, f64) {
    let bruto = dec(monto_bruto);
    let comision = round2(bruto * dec(porcentaje) / Decimal::ONE_HUNDRED);
    let neto = round2(bruto - comision);
    (to_f64(comision), to_f64(neto))
}

/// Whether an accumulated payment covers the total within tolerance
pub fn fully_paid(monto_pagado: f64, monto_total: f64) -> bool {
    monto_pagado + MONEY_TOLERANCE >= monto_total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2_f64(2.345), 2.35);
        assert_eq!(round2_f64(2.344), 2.34);
        assert_eq!(round2_f64(-2.345), -2.35);
    }

    #[test]
    fn test_comision_reference_case() {
        // 1000.00 at 8% -> 80.00 commission, 920.00 net
        let (comision, neto) = comision(1000.0, 8.0);
        assert_eq!(comision, 80.0);
        assert_eq!(neto, 920.0);
    }

    #[test]
    fn test_comision_rounds_to_cents() {
        let (comision, neto) = comision(333.33, 7.5);
        assert_eq!(comision, 25.0);
        assert_eq!(neto, 308.33);
    }

    #[test]
    fn test_sum2_avoids_float_drift() {
        let total = sum2([0.1, 0.2, 0.3]);
        assert_eq!(total, 0.6);
    }

    #[test]
    fn test_fully_paid_tolerance() {
        assert!(fully_paid(100.0, 100.0));
        assert!(fully_paid(99.996, 100.0));
        assert!(!fully_paid(99.99, 100.0));
    }
}
