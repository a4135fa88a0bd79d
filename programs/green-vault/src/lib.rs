// Summary: Anchor program implementing the Green lending vault. Users deposit
// SOL as collateral and borrow a debt token against it, valued through an
// external price feed that quotes collateral per debt unit. Every priced
// operation rejects a stale feed before touching any balance. The vault admin
// can wipe positions whose debt is worth more than their collateral.

use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_spl::token::{Mint, Token, TokenAccount};
use price_feed::PriceFeed;

pub mod asset;
pub mod fixed_point;
pub mod ledger;
pub mod liquidation;
pub mod oracle;
pub mod position;
pub mod settlement;
pub mod simulator;
pub mod state;

use liquidation::*;
use position::*;
use state::*;

declare_id!("Gv7sAYAW7YfiZWD8eY2nuCPKZA3ZJRPfoF7ENt5AXxGq");

#[program]
pub mod green_vault {
    use super::*;

    /// Create a vault for `debt_mint`, its two asset pools, and bind the price feed.
    /// The signer becomes the liquidation admin.
    pub fn initialize_vault(ctx: Context<InitializeVault>) -> Result<()> {
        let vault = &mut ctx.accounts.vault;
        vault.admin = ctx.accounts.admin.key();
        vault.debt_mint = ctx.accounts.debt_mint.key();
        vault.debt_vault = ctx.accounts.debt_vault.key();
        vault.collateral_vault = ctx.accounts.collateral_vault.key();
        vault.price_feed = ctx.accounts.price_feed.key();
        vault.total_deposited = 0;
        vault.total_borrowed = 0;
        vault.seized_collateral = 0;
        vault.bump = ctx.bumps.vault;
        vault.collateral_bump = ctx.bumps.collateral_vault;
        vault.debt_vault_bump = ctx.bumps.debt_vault;

        // Keep the collateral pool rent exempt so pool transfers never strand dust.
        let reserve = Rent::get()?
            .minimum_balance(0)
            .saturating_sub(ctx.accounts.collateral_vault.lamports());
        if reserve > 0 {
            let cpi_accounts = system_program::Transfer {
                from: ctx.accounts.admin.to_account_info(),
                to: ctx.accounts.collateral_vault.to_account_info(),
            };
            system_program::transfer(
                CpiContext::new(ctx.accounts.system_program.to_account_info(), cpi_accounts),
                reserve,
            )?;
        }

        msg!("Vault initialized for debt mint {} with feed {}", vault.debt_mint, vault.price_feed);
        Ok(())
    }

    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        position::deposit(ctx, amount)
    }

    pub fn borrow(ctx: Context<Borrow>, amount: u64) -> Result<()> {
        position::borrow(ctx, amount)
    }

    pub fn payback(ctx: Context<Payback>, amount: u64) -> Result<()> {
        position::payback(ctx, amount)
    }

    pub fn withdraw(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
        position::withdraw(ctx, amount)
    }

    /// Admin only
    pub fn liquidate(ctx: Context<Liquidate>) -> Result<()> {
        liquidation::liquidate(ctx)
    }
}

#[derive(Accounts)]
pub struct InitializeVault<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        init,
        payer = admin,
        space = Vault::SIZE,
        seeds = [VAULT_SEED, debt_mint.key().as_ref()],
        bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    pub debt_mint: Box<Account<'info, Mint>>,

    #[account(
        init,
        payer = admin,
        seeds = [DEBT_VAULT_SEED, vault.key().as_ref()],
        bump,
        token::mint = debt_mint,
        token::authority = vault,
    )]
    pub debt_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [COLLATERAL_SEED, vault.key().as_ref()],
        bump
    )]
    pub collateral_vault: SystemAccount<'info>,

    pub price_feed: Box<Account<'info, PriceFeed>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}
