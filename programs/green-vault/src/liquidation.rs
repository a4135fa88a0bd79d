use anchor_lang::prelude::*;
use price_feed::PriceFeed;

use crate::ledger::AccountRecord;
use crate::oracle::FeedSnapshot;
use crate::settlement::settle_liquidation;
use crate::state::*;

/// Wipe an undercollateralized position. The whole deposit stays in the
/// collateral pool as seized collateral and the whole debt is cleared.
pub fn liquidate(ctx: Context<Liquidate>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let oracle = FeedSnapshot::new(&ctx.accounts.price_feed, now);

    let vault = &mut ctx.accounts.vault;
    let position = &mut ctx.accounts.position;
    let before = position.record;

    let liquidation = settle_liquidation(&ctx.accounts.admin.key(), &vault.admin, &before, &oracle)?;

    let cleared = AccountRecord::default();
    vault.track(&before, &cleared)?;
    vault.seized_collateral = vault
        .seized_collateral
        .checked_add(liquidation.seized_collateral)
        .ok_or(VaultError::MathOverflow)?;
    position.record = cleared;

    msg!(
        "Liquidated {}: seized {} lamports, cleared {} debt",
        position.owner,
        liquidation.seized_collateral,
        liquidation.cleared_debt
    );
    emit!(Liquidated { account: position.owner });
    Ok(())
}

#[derive(Accounts)]
pub struct Liquidate<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        has_one = price_feed @ VaultError::InvalidOracle,
    )]
    pub vault: Box<Account<'info, Vault>>,

    /// CHECK: Owner of the liquidated position, only used for PDA derivation
    pub account: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [POSITION_SEED, vault.key().as_ref(), account.key().as_ref()],
        bump = position.bump,
        has_one = vault,
    )]
    pub position: Box<Account<'info, UserPosition>>,

    pub price_feed: Box<Account<'info, PriceFeed>>,
}
