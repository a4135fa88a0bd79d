// Summary: Anchor program implementing the exchange-rate variant of the Green
// vault. Deposits of the underlying token mint shares at an admin-set rate
// (WAD fixed point, 1e18 = 1.0); withdrawals of an underlying amount burn the
// shares it is worth at the current rate.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

pub mod math;
pub mod shares;
pub mod state;

use shares::*;
use state::*;

declare_id!("Ehe6zHt41fpkPFefxC8Bn8tSnEAF5Z3MhvFy8sWuksLR");

#[program]
pub mod share_vault {
    use super::*;

    /// Create the share vault for `underlying_mint`. The signer becomes admin.
    pub fn initialize_share_vault(ctx: Context<InitializeShareVault>, exchange_rate_wad: u128) -> Result<()> {
        require!(exchange_rate_wad > 0, ShareVaultError::InvalidRate);

        let share_vault = &mut ctx.accounts.share_vault;
        share_vault.admin = ctx.accounts.admin.key();
        share_vault.underlying_mint = ctx.accounts.underlying_mint.key();
        share_vault.share_mint = ctx.accounts.share_mint.key();
        share_vault.vault = ctx.accounts.vault.key();
        share_vault.exchange_rate_wad = exchange_rate_wad;
        share_vault.total_underlying = 0;
        share_vault.bump = ctx.bumps.share_vault;
        share_vault.share_mint_bump = ctx.bumps.share_mint;
        share_vault.vault_bump = ctx.bumps.vault;

        msg!("Share vault initialized for {} at rate {}", share_vault.underlying_mint, exchange_rate_wad);
        Ok(())
    }

    pub fn deposit(ctx: Context<DepositUnderlying>, amount: u64) -> Result<()> {
        shares::deposit(ctx, amount)
    }

    pub fn withdraw(ctx: Context<WithdrawUnderlying>, amount: u64) -> Result<()> {
        shares::withdraw(ctx, amount)
    }

    pub fn set_exchange_rate(ctx: Context<SetExchangeRate>, rate: u128) -> Result<()> {
        let admin = ctx.accounts.admin.key();
        ctx.accounts.share_vault.set_exchange_rate(&admin, rate)?;

        msg!("Exchange rate set to {}", rate);
        emit!(ExchangeRateSet { rate });
        Ok(())
    }
}

#[derive(Accounts)]
pub struct InitializeShareVault<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        init,
        payer = admin,
        space = ShareVault::SIZE,
        seeds = [SHARE_VAULT_SEED, underlying_mint.key().as_ref()],
        bump
    )]
    pub share_vault: Box<Account<'info, ShareVault>>,

    pub underlying_mint: Box<Account<'info, Mint>>,

    #[account(
        init,
        payer = admin,
        seeds = [SHARE_MINT_SEED, share_vault.key().as_ref()],
        bump,
        mint::decimals = underlying_mint.decimals,
        mint::authority = share_vault,
    )]
    pub share_mint: Box<Account<'info, Mint>>,

    #[account(
        init,
        payer = admin,
        seeds = [UNDERLYING_VAULT_SEED, share_vault.key().as_ref()],
        bump,
        token::mint = underlying_mint,
        token::authority = share_vault,
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[derive(Accounts)]
pub struct SetExchangeRate<'info> {
    #[account(mut)]
    pub share_vault: Account<'info, ShareVault>,
    pub admin: Signer<'info>,
}
