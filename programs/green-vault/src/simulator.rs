//! Off-chain model of the vault: same settlement rules as the program, with the
//! per-user PDAs replaced by a [`CollateralLedger`] and the SPL/System transfers
//! by [`FungibleToken`] implementations. Used for previews and by the tests.

use anchor_lang::prelude::*;

use crate::asset::FungibleToken;
use crate::ledger::{AccountRecord, CollateralLedger};
use crate::oracle::PriceOracle;
use crate::settlement::{
    settle_borrow, settle_deposit, settle_liquidation, settle_payback, settle_withdraw,
};
use crate::state::VaultError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VaultEvent {
    Deposited { amount: u64 },
    Borrowed { requested: u64, collateral_equivalent: u64 },
    PaidBack { repaid: u64, collateral_equivalent: u64 },
    Withdrawn { amount: u64 },
    Liquidated { account: Pubkey },
}

pub struct LendingVault<C, D, O> {
    address: Pubkey,
    admin: Pubkey,
    collateral: C,
    debt: D,
    oracle: O,
    ledger: CollateralLedger,
    events: Vec<VaultEvent>,
}

impl<C, D, O> LendingVault<C, D, O>
where
    C: FungibleToken,
    D: FungibleToken,
    O: PriceOracle,
{
    pub fn new(address: Pubkey, admin: Pubkey, collateral: C, debt: D, oracle: O) -> Self {
        Self {
            address,
            admin,
            collateral,
            debt,
            oracle,
            ledger: CollateralLedger::new(),
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> &Pubkey {
        &self.address
    }

    pub fn admin(&self) -> &Pubkey {
        &self.admin
    }

    pub fn record(&self, account: &Pubkey) -> AccountRecord {
        self.ledger.get(account)
    }

    pub fn ledger(&self) -> &CollateralLedger {
        &self.ledger
    }

    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    pub fn collateral(&self) -> &C {
        &self.collateral
    }

    pub fn collateral_mut(&mut self) -> &mut C {
        &mut self.collateral
    }

    pub fn debt(&self) -> &D {
        &self.debt
    }

    pub fn debt_mut(&mut self) -> &mut D {
        &mut self.debt
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn deposit(&mut self, caller: &Pubkey, amount: u64) -> Result<()> {
        let settlement = settle_deposit(&self.ledger.get(caller), amount)?;

        self.collateral
            .transfer(caller, &self.address, amount)
            .map_err(|_| error!(VaultError::TransferFailed))?;

        self.ledger.store(*caller, settlement.next);
        self.events.push(VaultEvent::Deposited { amount });
        Ok(())
    }

    pub fn borrow(&mut self, caller: &Pubkey, amount: u64) -> Result<()> {
        let settlement = settle_borrow(&self.ledger.get(caller), &self.oracle, amount)?;

        self.debt
            .transfer(&self.address, caller, amount)
            .map_err(|_| error!(VaultError::TransferFailed))?;

        self.ledger.store(*caller, settlement.next);
        self.events.push(VaultEvent::Borrowed {
            requested: amount,
            collateral_equivalent: settlement.collateral_equivalent,
        });
        Ok(())
    }

    /// Pulls the repayment with `transfer_from`, so the caller must have approved the vault.
    pub fn payback(&mut self, caller: &Pubkey, amount: u64) -> Result<()> {
        let settlement = settle_payback(&self.ledger.get(caller), &self.oracle, amount)?;

        self.debt
            .transfer_from(&self.address, caller, &self.address, amount)
            .map_err(|_| error!(VaultError::TransferFailed))?;

        self.ledger.store(*caller, settlement.next);
        self.events.push(VaultEvent::PaidBack {
            repaid: amount,
            collateral_equivalent: settlement.collateral_equivalent,
        });
        Ok(())
    }

    pub fn withdraw(&mut self, caller: &Pubkey, amount: u64) -> Result<()> {
        let settlement = settle_withdraw(&self.ledger.get(caller), &self.oracle, amount)?;

        self.collateral
            .transfer(&self.address, caller, amount)
            .map_err(|_| error!(VaultError::TransferFailed))?;

        self.ledger.store(*caller, settlement.next);
        self.events.push(VaultEvent::Withdrawn { amount });
        Ok(())
    }

    /// Seized collateral stays in the vault's pool.
    pub fn liquidate(&mut self, caller: &Pubkey, account: &Pubkey) -> Result<()> {
        let liquidation = settle_liquidation(caller, &self.admin, &self.ledger.get(account), &self.oracle)?;

        self.ledger.store(*account, AccountRecord::default());
        msg!(
            "Liquidated {}: seized {} collateral, cleared {} debt",
            account,
            liquidation.seized_collateral,
            liquidation.cleared_debt
        );
        self.events.push(VaultEvent::Liquidated { account: *account });
        Ok(())
    }
}
