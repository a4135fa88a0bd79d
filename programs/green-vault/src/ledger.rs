use anchor_lang::prelude::*;
use std::collections::BTreeMap;

use crate::state::VaultError;

/// Collateral deposited and debt owed by one account.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccountRecord {
    pub deposited: u64,     // lamports
    pub borrowed_debt: u64, // debt mint base units
}

impl AccountRecord {
    pub const SIZE: usize = 8 + 8;

    pub fn is_empty(&self) -> bool {
        self.deposited == 0 && self.borrowed_debt == 0
    }

    pub fn increase_deposit(&mut self, delta: u64) -> Result<()> {
        self.deposited = self.deposited.checked_add(delta).ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    pub fn decrease_deposit(&mut self, delta: u64) -> Result<()> {
        self.deposited = self.deposited.checked_sub(delta).ok_or(VaultError::Underflow)?;
        Ok(())
    }

    pub fn increase_debt(&mut self, delta: u64) -> Result<()> {
        self.borrowed_debt = self.borrowed_debt.checked_add(delta).ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    pub fn decrease_debt(&mut self, delta: u64) -> Result<()> {
        self.borrowed_debt = self.borrowed_debt.checked_sub(delta).ok_or(VaultError::Underflow)?;
        Ok(())
    }
}

/// Address-keyed account records. Missing entries read as the zero record;
/// records that decay back to zero are dropped so the map only holds open positions.
#[derive(Clone, Debug, Default)]
pub struct CollateralLedger {
    records: BTreeMap<Pubkey, AccountRecord>,
}

impl CollateralLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, account: &Pubkey) -> AccountRecord {
        self.records.get(account).copied().unwrap_or_default()
    }

    pub fn store(&mut self, account: Pubkey, record: AccountRecord) {
        if record.is_empty() {
            self.records.remove(&account);
        } else {
            self.records.insert(account, record);
        }
    }

    pub fn increase_deposit(&mut self, account: Pubkey, delta: u64) -> Result<()> {
        self.update(account, |r| r.increase_deposit(delta))
    }

    pub fn decrease_deposit(&mut self, account: Pubkey, delta: u64) -> Result<()> {
        self.update(account, |r| r.decrease_deposit(delta))
    }

    pub fn increase_debt(&mut self, account: Pubkey, delta: u64) -> Result<()> {
        self.update(account, |r| r.increase_debt(delta))
    }

    pub fn decrease_debt(&mut self, account: Pubkey, delta: u64) -> Result<()> {
        self.update(account, |r| r.decrease_debt(delta))
    }

    pub fn open_positions(&self) -> impl Iterator<Item = (&Pubkey, &AccountRecord)> {
        self.records.iter()
    }

    pub fn total_deposited(&self) -> u128 {
        self.records.values().map(|r| r.deposited as u128).sum()
    }

    pub fn total_borrowed(&self) -> u128 {
        self.records.values().map(|r| r.borrowed_debt as u128).sum()
    }

    // Works on a copy so a failed operation leaves the entry untouched.
    fn update(&mut self, account: Pubkey, op: impl FnOnce(&mut AccountRecord) -> Result<()>) -> Result<()> {
        let mut record = self.get(&account);
        op(&mut record)?;
        self.store(account, record);
        Ok(())
    }
}
