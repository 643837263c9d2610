use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::errors::CoreError;
use crate::models::MpesaConfig;

/// KES minor unit.
const MONEY_SCALE: u32 = 2;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeeQuote {
    pub amount: Decimal,
    pub fee_percentage: Decimal,
    pub service_fee: Decimal,
    pub total_payable: Decimal,
}

pub fn compute_service_fee(amount: Decimal, fee_percentage: Decimal) -> Result<Decimal, CoreError> {
    if amount < Decimal::ZERO {
        return Err(CoreError::InvalidArgument(format!(
            "amount must be non-negative, got {amount}"
        )));
    }
    if fee_percentage < Decimal::ZERO || fee_percentage > Decimal::ONE_HUNDRED {
        return Err(CoreError::InvalidArgument(format!(
            "fee percentage must be between 0 and 100, got {fee_percentage}"
        )));
    }

    let fee = amount * fee_percentage / Decimal::ONE_HUNDRED;
    Ok(fee.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

pub fn compute_total_payable(amount: Decimal, fee_percentage: Decimal) -> Result<Decimal, CoreError> {
    Ok(amount + compute_service_fee(amount, fee_percentage)?)
}

pub fn quote(amount: Decimal, config: &MpesaConfig) -> Result<FeeQuote, CoreError> {
    let service_fee = compute_service_fee(amount, config.service_fee_percentage)?;
    Ok(FeeQuote {
        amount,
        fee_percentage: config.service_fee_percentage,
        service_fee,
        total_payable: amount + service_fee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_five_percent_of_1500() {
        assert_eq!(compute_service_fee(dec("1500"), dec("5")).unwrap(), dec("75"));
        assert_eq!(compute_total_payable(dec("1500"), dec("5")).unwrap(), dec("1575"));
    }

    #[test]
    fn test_zero_percent_is_free() {
        assert_eq!(compute_service_fee(dec("999.99"), Decimal::ZERO).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_rounds_half_up_to_cents() {
        // 10.10 * 2.5% = 0.2525
        assert_eq!(compute_service_fee(dec("10.10"), dec("2.5")).unwrap(), dec("0.25"));
        // 0.50 * 5% = 0.025
        assert_eq!(compute_service_fee(dec("0.50"), dec("5")).unwrap(), dec("0.03"));
    }

    #[test]
    fn test_rejects_negative_inputs() {
        assert!(matches!(
            compute_service_fee(dec("-1"), dec("5")),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            compute_service_fee(dec("100"), dec("-0.5")),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(compute_total_payable(dec("100"), dec("100.01")).is_err());
    }

    #[test]
    fn test_total_is_amount_plus_fee() {
        let amounts = ["0", "1", "33.33", "1500", "2000", "123456.78"];
        let percentages = ["0", "0.5", "5", "12.5", "33.333", "100"];
        for a in amounts {
            for p in percentages {
                let fee = compute_service_fee(dec(a), dec(p)).unwrap();
                let total = compute_total_payable(dec(a), dec(p)).unwrap();
                assert_eq!(total, dec(a) + fee, "amount {a} at {p}%");
            }
        }
    }

    #[test]
    fn test_quote_uses_config_percentage() {
        let config = MpesaConfig::default();
        let q = quote(dec("2000"), &config).unwrap();
        assert_eq!(q.service_fee, dec("100"));
        assert_eq!(q.total_payable, dec("2100"));
        assert_eq!(q.fee_percentage, dec("5"));
    }
}
