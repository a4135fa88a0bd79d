use anchor_lang::prelude::*;
use std::collections::BTreeMap;

use crate::state::VaultError;

/// Asset movement capability the vault relies on. `spender` is the party
/// acting on `owner`'s funds and needs an allowance unless it is the owner.
pub trait FungibleToken {
    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()>;
    fn transfer_from(&mut self, spender: &Pubkey, owner: &Pubkey, to: &Pubkey, amount: u64) -> Result<()>;
    fn balance_of(&self, owner: &Pubkey) -> u64;
}

/// In-memory balance ledger with allowances, used to run the vault off chain.
#[derive(Clone, Debug, Default)]
pub struct LedgerToken {
    balances: BTreeMap<Pubkey, u64>,
    allowances: BTreeMap<(Pubkey, Pubkey), u64>,
    supply: u64,
}

impl LedgerToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> u64 {
        self.supply
    }

    pub fn mint(&mut self, to: &Pubkey, amount: u64) -> Result<()> {
        self.supply = self.supply.checked_add(amount).ok_or(VaultError::MathOverflow)?;
        let balance = self.balances.entry(*to).or_default();
        *balance = balance.checked_add(amount).ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    pub fn approve(&mut self, owner: &Pubkey, spender: &Pubkey, amount: u64) {
        self.allowances.insert((*owner, *spender), amount);
    }

    pub fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u64 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    fn move_balance(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        let from_balance = self.balance_of(from);
        require!(from_balance >= amount, VaultError::TransferFailed);
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(VaultError::TransferFailed)?;
        self.balances.insert(*from, from_balance - amount);
        self.balances.insert(*to, to_balance);
        Ok(())
    }
}

impl FungibleToken for LedgerToken {
    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        self.move_balance(from, to, amount)
    }

    fn transfer_from(&mut self, spender: &Pubkey, owner: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        if spender == owner {
            return self.move_balance(owner, to, amount);
        }
        let allowance = self.allowance(owner, spender);
        require!(allowance >= amount, VaultError::TransferFailed);
        self.move_balance(owner, to, amount)?;
        self.allowances.insert((*owner, *spender), allowance - amount);
        Ok(())
    }

    fn balance_of(&self, owner: &Pubkey) -> u64 {
        self.balances.get(owner).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_moves_balance() {
        let mut token = LedgerToken::new();
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
        token.mint(&a, 10).unwrap();

        token.transfer(&a, &b, 4).unwrap();
        assert_eq!((token.balance_of(&a), token.balance_of(&b)), (6, 4));
        assert_eq!(token.total_supply(), 10);
    }

    #[test]
    fn transfer_beyond_balance_fails() {
        let mut token = LedgerToken::new();
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
        token.mint(&a, 3).unwrap();

        assert_eq!(token.transfer(&a, &b, 4).unwrap_err(), VaultError::TransferFailed.into());
        assert_eq!((token.balance_of(&a), token.balance_of(&b)), (3, 0));
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let mut token = LedgerToken::new();
        let (owner, spender) = (Pubkey::new_unique(), Pubkey::new_unique());
        token.mint(&owner, 10).unwrap();

        assert_eq!(
            token.transfer_from(&spender, &owner, &spender, 5).unwrap_err(),
            VaultError::TransferFailed.into()
        );

        token.approve(&owner, &spender, 6);
        token.transfer_from(&spender, &owner, &spender, 5).unwrap();
        assert_eq!(token.allowance(&owner, &spender), 1);
        assert_eq!(token.balance_of(&spender), 5);

        assert_eq!(
            token.transfer_from(&spender, &owner, &spender, 2).unwrap_err(),
            VaultError::TransferFailed.into()
        );
        assert_eq!(token.allowance(&owner, &spender), 1);
    }

    #[test]
    fn allowance_does_not_cover_missing_funds() {
        let mut token = LedgerToken::new();
        let (owner, spender) = (Pubkey::new_unique(), Pubkey::new_unique());
        token.mint(&owner, 1).unwrap();
        token.approve(&owner, &spender, 100);

        assert_eq!(
            token.transfer_from(&spender, &owner, &spender, 2).unwrap_err(),
            VaultError::TransferFailed.into()
        );
        assert_eq!(token.allowance(&owner, &spender), 100);
    }
}
