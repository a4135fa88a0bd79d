use anchor_lang::prelude::*;

use crate::state::ShareVaultError;

pub const WAD: u128 = 1_000_000_000_000_000_000;

fn scaled(amount: u64, rate_wad: u128) -> Result<u128> {
    (amount as u128)
        .checked_mul(rate_wad)
        .ok_or_else(|| error!(ShareVaultError::MathOverflow))
}

fn narrow(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| error!(ShareVaultError::MathOverflow))
}

/// Shares minted for `amount` underlying, rounded down.
pub fn shares_for_deposit(amount: u64, rate_wad: u128) -> Result<u64> {
    narrow(scaled(amount, rate_wad)? / WAD)
}

/// Shares burned to release `amount` underlying, rounded up so a withdrawal
/// never costs less than the shares it is worth.
pub fn shares_for_withdrawal(amount: u64, rate_wad: u128) -> Result<u64> {
    let value = scaled(amount, rate_wad)?;
    let shares = value / WAD + u128::from(value % WAD != 0);
    narrow(shares)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_rate_doubles_shares() {
        let rate = 2 * WAD;
        assert_eq!(shares_for_deposit(1337, rate).unwrap(), 2674);
        assert_eq!(shares_for_withdrawal(1337, rate).unwrap(), 2674);
    }

    #[test]
    fn fractional_rate() {
        let rate = 1_234_567_890_123_456_789u128;
        assert_eq!(
            shares_for_deposit(1_000_000_000_000_000_000, rate).unwrap(),
            1_234_567_890_123_456_789
        );
        // 1.2345... rounds down on deposit and up on withdrawal
        assert_eq!(shares_for_deposit(1, rate).unwrap(), 1);
        assert_eq!(shares_for_withdrawal(1, rate).unwrap(), 2);
    }

    #[test]
    fn raising_the_rate_costs_more_shares() {
        // 100 deposited at 2.0 holds 200 shares; at 4.0 those buy back only 50
        let held = shares_for_deposit(100, 2 * WAD).unwrap();
        assert_eq!(held, 200);
        assert_eq!(shares_for_withdrawal(50, 4 * WAD).unwrap(), held);
        assert_eq!(shares_for_deposit(1, 4 * WAD).unwrap(), 4);
    }

    #[test]
    fn lowering_the_rate_costs_fewer_shares() {
        let held = shares_for_deposit(100, 2 * WAD).unwrap();
        assert_eq!(shares_for_withdrawal(100, WAD).unwrap(), held - 100);
        assert_eq!(shares_for_deposit(10, WAD).unwrap(), 10);
    }

    #[test]
    fn tiny_deposits_can_round_to_zero() {
        assert_eq!(shares_for_deposit(1, WAD / 2).unwrap(), 0);
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(
            shares_for_deposit(u64::MAX, u128::MAX).unwrap_err(),
            ShareVaultError::MathOverflow.into()
        );
        assert_eq!(
            shares_for_deposit(u64::MAX, 2 * WAD).unwrap_err(),
            ShareVaultError::MathOverflow.into()
        );
    }
}
