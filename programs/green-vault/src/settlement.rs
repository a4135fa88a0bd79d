//! Vault operations as pure functions over one account record.
//!
//! Each function performs every check the operation needs and returns the
//! record as it must look afterwards, without touching any state. Callers move
//! the assets and only then store the returned record, so a rejected operation
//! never leaves a partial update behind.

use anchor_lang::prelude::*;

use crate::ledger::AccountRecord;
use crate::oracle::{fresh_quote, PriceOracle, PriceQuote};
use crate::state::VaultError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub next: AccountRecord,
    /// Collateral value of the debt moved by the operation (0 when no price is involved).
    pub collateral_equivalent: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Liquidation {
    pub seized_collateral: u64,
    pub cleared_debt: u64,
}

/// True when the collateral value of the debt exceeds the deposit.
pub fn is_undercollateralized(record: &AccountRecord, quote: &PriceQuote) -> bool {
    quote.collateral_equivalent_wide(record.borrowed_debt) > record.deposited as u128
}

pub fn settle_deposit(record: &AccountRecord, amount: u64) -> Result<Settlement> {
    require!(amount > 0, VaultError::InvalidAmount);

    let mut next = *record;
    next.increase_deposit(amount)?;
    Ok(Settlement { next, collateral_equivalent: 0 })
}

pub fn settle_borrow<O: PriceOracle + ?Sized>(
    record: &AccountRecord,
    oracle: &O,
    amount: u64,
) -> Result<Settlement> {
    require!(amount > 0, VaultError::InvalidAmount);
    let quote = fresh_quote(oracle)?;

    let requested = quote.collateral_equivalent(amount)?;
    let mut next = *record;
    next.increase_debt(amount)?;

    // Value the combined debt once; flooring its parts separately undercounts.
    let required = quote.collateral_equivalent_wide(next.borrowed_debt);
    require!(required <= record.deposited as u128, VaultError::InsufficientCollateral);

    Ok(Settlement { next, collateral_equivalent: requested })
}

pub fn settle_payback<O: PriceOracle + ?Sized>(
    record: &AccountRecord,
    oracle: &O,
    amount: u64,
) -> Result<Settlement> {
    require!(amount > 0, VaultError::InvalidAmount);
    let quote = fresh_quote(oracle)?;

    require!(amount <= record.borrowed_debt, VaultError::InsufficientDebt);
    let repaid = quote.collateral_equivalent(amount)?;

    let mut next = *record;
    next.decrease_debt(amount)?;
    Ok(Settlement { next, collateral_equivalent: repaid })
}

/// The oracle is only consulted when the account carries debt.
pub fn settle_withdraw<O: PriceOracle + ?Sized>(
    record: &AccountRecord,
    oracle: &O,
    amount: u64,
) -> Result<Settlement> {
    require!(amount > 0, VaultError::InvalidAmount);
    let quote = if record.borrowed_debt > 0 {
        Some(fresh_quote(oracle)?)
    } else {
        None
    };

    require!(amount <= record.deposited, VaultError::InsufficientCollateral);
    let mut next = *record;
    next.decrease_deposit(amount)?;

    if let Some(quote) = quote {
        let owed = quote.collateral_equivalent_wide(record.borrowed_debt);
        require!(next.deposited as u128 >= owed, VaultError::InsufficientCollateral);
    }
    Ok(Settlement { next, collateral_equivalent: 0 })
}

/// All-or-nothing: the whole deposit is seized and the whole debt is cleared.
pub fn settle_liquidation<O: PriceOracle + ?Sized>(
    caller: &Pubkey,
    admin: &Pubkey,
    record: &AccountRecord,
    oracle: &O,
) -> Result<Liquidation> {
    require_keys_eq!(*caller, *admin, VaultError::Unauthorized);
    let quote = fresh_quote(oracle)?;
    require!(is_undercollateralized(record, &quote), VaultError::NoBadDebt);

    Ok(Liquidation {
        seized_collateral: record.deposited,
        cleared_debt: record.borrowed_debt,
    })
}
