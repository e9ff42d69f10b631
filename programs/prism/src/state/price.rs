use anchor_lang::prelude::*;

use crate::{
    error::LendingError,
    math::{mul_div, pow10, SafeMath},
    MAX_BASIS_POINTS, MAX_PRICE_AGE_SECONDS, MAX_PRICE_CONFIDENCE_BPS, PRICE_SCALE,
};

/// A validated oracle quote supplied by the caller on refresh. Feed ingestion
/// and signature verification happen upstream; the ledger only checks shape,
/// age, and confidence before trusting the price.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct PriceQuote {
    /// Price mantissa.
    pub price: i64,
    /// Confidence interval around the price, in mantissa units.
    pub confidence: u64,
    /// Decimal exponent applied to the mantissa.
    pub exponent: i32,
    /// Unix timestamp the quote was published at.
    pub publish_time: i64,
}

impl PriceQuote {
    pub fn validate(&self, now: i64) -> Result<()> {
        require_gt!(self.price, 0, LendingError::InvalidPriceQuote);

        require!(
            now.safe_sub(self.publish_time)? <= MAX_PRICE_AGE_SECONDS,
            LendingError::PriceQuoteStale
        );

        // reject quotes whose confidence band is too wide to price against
        let max_confidence = mul_div(
            self.price as u128,
            MAX_PRICE_CONFIDENCE_BPS as u128,
            MAX_BASIS_POINTS as u128,
        )?;
        require!(
            (self.confidence as u128) <= max_confidence,
            LendingError::InvalidPriceQuote
        );

        Ok(())
    }

    /// Quote scaled to a fixed 1e9 USD price, `price * 10^exponent * PRICE_SCALE`.
    pub fn scaled_price(&self) -> Result<u128> {
        let mantissa = self.price as u128;
        let multiplier = pow10(self.exponent.unsigned_abs())?;

        if self.exponent >= 0 {
            mantissa.safe_mul(multiplier)?.safe_mul(PRICE_SCALE)
        } else {
            mul_div(mantissa, PRICE_SCALE, multiplier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(price: i64, exponent: i32) -> PriceQuote {
        PriceQuote {
            price,
            confidence: 0,
            exponent,
            publish_time: 1_000,
        }
    }

    #[test]
    fn scales_negative_exponent() {
        // 150.25 USD published as 15_025 * 10^-2
        let quote = quote(15_025, -2);
        assert_eq!(quote.scaled_price().unwrap(), 150_250_000_000);
    }

    #[test]
    fn scales_positive_and_zero_exponent() {
        assert_eq!(quote(3, 2).scaled_price().unwrap(), 300 * PRICE_SCALE);
        assert_eq!(quote(7, 0).scaled_price().unwrap(), 7 * PRICE_SCALE);
    }

    #[test]
    fn rejects_non_positive_price() {
        let mut bad = quote(0, 0);
        assert!(bad.validate(1_000).is_err());
        bad.price = -5;
        assert!(bad.validate(1_000).is_err());
    }

    #[test]
    fn rejects_old_publish_time() {
        let quote = quote(100, 0);
        assert!(quote.validate(1_000 + MAX_PRICE_AGE_SECONDS).is_ok());
        assert!(quote.validate(1_001 + MAX_PRICE_AGE_SECONDS).is_err());
    }

    #[test]
    fn rejects_wide_confidence() {
        let mut quote = quote(10_000, 0);
        quote.confidence = 200; // exactly 2%
        assert!(quote.validate(1_000).is_ok());
        quote.confidence = 201;
        assert!(quote.validate(1_000).is_err());
    }
}
