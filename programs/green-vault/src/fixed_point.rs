use anchor_lang::prelude::*;
use price_feed::MAX_DECIMALS;

use crate::state::VaultError;

/// Raw integer magnitude scaled by `10^decimals`.
///
/// Every debt/collateral conversion in the vault goes through
/// [`FixedRate::collateral_equivalent`] so that all callers round the same way.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedRate {
    pub raw: u64,
    pub decimals: u8,
}

impl FixedRate {
    pub fn new(raw: u64, decimals: u8) -> Result<Self> {
        require!(raw > 0, VaultError::InvalidQuote);
        require!(decimals <= MAX_DECIMALS, VaultError::InvalidQuote);
        Ok(Self { raw, decimals })
    }

    pub fn scale(&self) -> u128 {
        10u128.pow(self.decimals as u32)
    }

    /// `floor(amount * raw / 10^decimals)` without narrowing. The product of two
    /// u64 values always fits in u128.
    pub fn collateral_equivalent_wide(&self, amount: u64) -> u128 {
        (amount as u128) * (self.raw as u128) / self.scale()
    }

    /// Same as [`FixedRate::collateral_equivalent_wide`], narrowed back to an amount.
    pub fn collateral_equivalent(&self, amount: u64) -> Result<u64> {
        u64::try_from(self.collateral_equivalent_wide(amount)).map_err(|_| error!(VaultError::MathOverflow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_rate_is_identity() {
        let rate = FixedRate::new(1, 0).unwrap();
        assert_eq!(rate.collateral_equivalent(1_000_000_000).unwrap(), 1_000_000_000);
    }

    #[test]
    fn fractional_rate_rounds_down() {
        // 0.5 collateral per debt unit
        let rate = FixedRate::new(5, 1).unwrap();
        assert_eq!(rate.collateral_equivalent(3).unwrap(), 1);
        assert_eq!(rate.collateral_equivalent(1).unwrap(), 0);

        // 0.1 with an 18-decimal answer
        let rate = FixedRate::new(100_000_000_000_000_000, 18).unwrap();
        assert_eq!(rate.collateral_equivalent(1_000_000_000).unwrap(), 100_000_000);
        assert_eq!(rate.collateral_equivalent(19).unwrap(), 1);
    }

    #[test]
    fn large_operands_do_not_overflow_the_intermediate() {
        let rate = FixedRate::new(u64::MAX, 18).unwrap();
        assert_eq!(rate.collateral_equivalent(1_000_000_000_000_000_000).unwrap(), u64::MAX);
    }

    #[test]
    fn result_beyond_u64_is_an_error() {
        let rate = FixedRate::new(2, 0).unwrap();
        assert_eq!(rate.collateral_equivalent_wide(u64::MAX), u64::MAX as u128 * 2);
        assert_eq!(
            rate.collateral_equivalent(u64::MAX).unwrap_err(),
            VaultError::MathOverflow.into()
        );
    }

    #[test]
    fn rejects_unsupported_scale() {
        assert_eq!(FixedRate::new(1, 19).unwrap_err(), VaultError::InvalidQuote.into());
    }

    #[test]
    fn rejects_zero_rate() {
        assert_eq!(FixedRate::new(0, 0).unwrap_err(), VaultError::InvalidQuote.into());
        assert_eq!(FixedRate::new(0, 18).unwrap_err(), VaultError::InvalidQuote.into());
    }
}
