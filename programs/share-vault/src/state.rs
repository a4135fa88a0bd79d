use anchor_lang::prelude::*;

use crate::math;

pub const SHARE_VAULT_SEED: &[u8] = b"share_vault";
pub const SHARE_MINT_SEED: &[u8] = b"shares";
pub const UNDERLYING_VAULT_SEED: &[u8] = b"vault";

#[account]
pub struct ShareVault {
    pub admin: Pubkey,
    pub underlying_mint: Pubkey,
    pub share_mint: Pubkey,
    pub vault: Pubkey,
    pub exchange_rate_wad: u128, // shares per underlying unit, scaled by WAD (1.0 = 1e18)
    pub total_underlying: u64,
    pub bump: u8,
    pub share_mint_bump: u8,
    pub vault_bump: u8,
}

impl ShareVault {
    pub const SIZE: usize = 8 + // discriminator
        32 + // admin
        32 + // underlying_mint
        32 + // share_mint
        32 + // vault
        16 + // exchange_rate_wad
        8 +  // total_underlying
        1 +  // bump
        1 +  // share_mint_bump
        1;   // vault_bump

    /// Admin-only rate update.
    pub fn set_exchange_rate(&mut self, caller: &Pubkey, rate: u128) -> Result<()> {
        require_keys_eq!(self.admin, *caller, ShareVaultError::Unauthorized);
        require!(rate > 0, ShareVaultError::InvalidRate);
        self.exchange_rate_wad = rate;
        Ok(())
    }

    pub fn shares_for_deposit(&self, amount: u64) -> Result<u64> {
        math::shares_for_deposit(amount, self.exchange_rate_wad)
    }

    pub fn shares_for_withdrawal(&self, amount: u64) -> Result<u64> {
        math::shares_for_withdrawal(amount, self.exchange_rate_wad)
    }
}

#[event]
pub struct Minted {
    pub user: Pubkey,
    pub token: Pubkey,
    pub shares: u64,
}

#[event]
pub struct Burned {
    pub user: Pubkey,
    pub token: Pubkey,
    pub shares: u64,
}

#[event]
pub struct ExchangeRateSet {
    pub rate: u128,
}

#[error_code]
pub enum ShareVaultError {
    #[msg("Unauthorized")]
    Unauthorized,
    #[msg("Invalid amount - must produce at least one share")]
    InvalidAmount,
    #[msg("Exchange rate must be greater than zero")]
    InvalidRate,
    #[msg("Insufficient share balance")]
    InsufficientShares,
    #[msg("Arithmetic overflow")]
    MathOverflow,
    #[msg("Asset transfer failed")]
    TransferFailed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::WAD;

    fn vault_at(rate: u128) -> ShareVault {
        ShareVault {
            admin: Pubkey::new_unique(),
            underlying_mint: Pubkey::new_unique(),
            share_mint: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
            exchange_rate_wad: rate,
            total_underlying: 0,
            bump: 255,
            share_mint_bump: 254,
            vault_bump: 253,
        }
    }

    #[test]
    fn conversions_follow_the_stored_rate() {
        let mut vault = vault_at(WAD);
        assert_eq!(vault.shares_for_deposit(500).unwrap(), 500);

        vault.exchange_rate_wad = 3 * WAD / 2;
        assert_eq!(vault.shares_for_deposit(3).unwrap(), 4);
        assert_eq!(vault.shares_for_withdrawal(3).unwrap(), 5);
    }

    #[test]
    fn size_covers_serialized_account() {
        let vault = vault_at(WAD);
        let data = vault.try_to_vec().unwrap();
        assert_eq!(8 + data.len(), ShareVault::SIZE);
    }

    #[test]
    fn only_admin_sets_a_positive_rate() {
        let mut vault = vault_at(WAD);
        let admin = vault.admin;

        assert_eq!(
            vault.set_exchange_rate(&Pubkey::new_unique(), 2 * WAD).unwrap_err(),
            ShareVaultError::Unauthorized.into()
        );
        assert_eq!(
            vault.set_exchange_rate(&admin, 0).unwrap_err(),
            ShareVaultError::InvalidRate.into()
        );
        assert_eq!(vault.exchange_rate_wad, WAD);

        vault.set_exchange_rate(&admin, 2 * WAD).unwrap();
        assert_eq!(vault.shares_for_deposit(1337).unwrap(), 2674);
    }
}
