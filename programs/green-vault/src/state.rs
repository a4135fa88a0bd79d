use anchor_lang::prelude::*;

use crate::ledger::AccountRecord;

pub const VAULT_SEED: &[u8] = b"vault";
pub const COLLATERAL_SEED: &[u8] = b"collateral";
pub const DEBT_VAULT_SEED: &[u8] = b"debt_vault";
pub const POSITION_SEED: &[u8] = b"position";

#[account]
pub struct Vault {
    pub admin: Pubkey,
    pub debt_mint: Pubkey,
    pub debt_vault: Pubkey,
    pub collateral_vault: Pubkey,
    pub price_feed: Pubkey,
    pub total_deposited: u64,   // lamports claimed by open positions
    pub total_borrowed: u64,    // debt units owed by open positions
    pub seized_collateral: u64, // lamports taken over by liquidations
    pub bump: u8,
    pub collateral_bump: u8,
    pub debt_vault_bump: u8,
}

impl Vault {
    pub const SIZE: usize = 8 + // discriminator
        32 + // admin
        32 + // debt_mint
        32 + // debt_vault
        32 + // collateral_vault
        32 + // price_feed
        8 +  // total_deposited
        8 +  // total_borrowed
        8 +  // seized_collateral
        1 +  // bump
        1 +  // collateral_bump
        1;   // debt_vault_bump

    /// Move the pool totals from `before` to `after` for one position.
    pub fn track(&mut self, before: &AccountRecord, after: &AccountRecord) -> Result<()> {
        self.total_deposited = self
            .total_deposited
            .checked_sub(before.deposited)
            .and_then(|v| v.checked_add(after.deposited))
            .ok_or(VaultError::MathOverflow)?;
        self.total_borrowed = self
            .total_borrowed
            .checked_sub(before.borrowed_debt)
            .and_then(|v| v.checked_add(after.borrowed_debt))
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }
}

#[account]
pub struct UserPosition {
    pub owner: Pubkey,
    pub vault: Pubkey,
    pub record: AccountRecord,
    pub bump: u8,
}

impl UserPosition {
    pub const SIZE: usize = 8 + // discriminator
        32 + // owner
        32 + // vault
        AccountRecord::SIZE +
        1;   // bump
}

#[event]
pub struct Deposited {
    pub amount: u64,
}

#[event]
pub struct Borrowed {
    pub requested: u64,
    pub collateral_equivalent: u64,
}

#[event]
pub struct PaidBack {
    pub repaid: u64,
    pub collateral_equivalent: u64,
}

#[event]
pub struct Withdrawn {
    pub amount: u64,
}

#[event]
pub struct Liquidated {
    pub account: Pubkey,
}

#[error_code]
pub enum VaultError {
    #[msg("Stale feed")]
    StaleFeed,
    #[msg("Not enough collateral")]
    InsufficientCollateral,
    #[msg("Not enough debt")]
    InsufficientDebt,
    #[msg("Asset transfer failed")]
    TransferFailed,
    #[msg("Unauthorized")]
    Unauthorized,
    #[msg("Good debt")]
    NoBadDebt,
    #[msg("Ledger underflow")]
    Underflow,
    #[msg("Invalid amount - must be greater than zero")]
    InvalidAmount,
    #[msg("Arithmetic overflow")]
    MathOverflow,
    #[msg("Invalid oracle quote")]
    InvalidQuote,
    #[msg("Price feed does not belong to this vault")]
    InvalidOracle,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> Vault {
        Vault {
            admin: Pubkey::new_unique(),
            debt_mint: Pubkey::new_unique(),
            debt_vault: Pubkey::new_unique(),
            collateral_vault: Pubkey::new_unique(),
            price_feed: Pubkey::new_unique(),
            total_deposited: 0,
            total_borrowed: 0,
            seized_collateral: 0,
            bump: 255,
            collateral_bump: 255,
            debt_vault_bump: 255,
        }
    }

    #[test]
    fn track_applies_position_delta() {
        let mut v = vault();
        let empty = AccountRecord::default();
        let opened = AccountRecord { deposited: 100, borrowed_debt: 40 };
        v.track(&empty, &opened).unwrap();
        assert_eq!((v.total_deposited, v.total_borrowed), (100, 40));

        let repaid = AccountRecord { deposited: 100, borrowed_debt: 10 };
        v.track(&opened, &repaid).unwrap();
        assert_eq!((v.total_deposited, v.total_borrowed), (100, 10));

        v.track(&repaid, &empty).unwrap();
        assert_eq!((v.total_deposited, v.total_borrowed), (0, 0));
    }

    #[test]
    fn track_rejects_position_larger_than_totals() {
        let mut v = vault();
        let ghost = AccountRecord { deposited: 1, borrowed_debt: 0 };
        assert_eq!(
            v.track(&ghost, &AccountRecord::default()).unwrap_err(),
            VaultError::MathOverflow.into()
        );
    }
}
