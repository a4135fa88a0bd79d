use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};
use price_feed::PriceFeed;

use crate::oracle::FeedSnapshot;
use crate::settlement::{settle_borrow, settle_deposit, settle_payback, settle_withdraw};
use crate::state::*;

/// Binds a freshly created position PDA to its owner. Existing positions are left alone.
fn open_position(position: &mut UserPosition, vault: Pubkey, owner: Pubkey, bump: u8) {
    if position.owner == Pubkey::default() {
        position.owner = owner;
        position.vault = vault;
        position.bump = bump;
    }
}

/// Deposit SOL collateral into the vault's collateral pool
pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
    let vault_key = ctx.accounts.vault.key();
    let user_key = ctx.accounts.user.key();
    let position = &mut ctx.accounts.position;
    open_position(position, vault_key, user_key, ctx.bumps.position);

    let before = position.record;
    let settlement = settle_deposit(&before, amount)?;

    let cpi_accounts = system_program::Transfer {
        from: ctx.accounts.user.to_account_info(),
        to: ctx.accounts.collateral_vault.to_account_info(),
    };
    let cpi_ctx = CpiContext::new(ctx.accounts.system_program.to_account_info(), cpi_accounts);
    system_program::transfer(cpi_ctx, amount).map_err(|_| error!(VaultError::TransferFailed))?;

    ctx.accounts.vault.track(&before, &settlement.next)?;
    position.record = settlement.next;

    emit!(Deposited { amount });
    Ok(())
}

/// Borrow debt tokens against deposited collateral at the current feed rate
pub fn borrow(ctx: Context<Borrow>, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let oracle = FeedSnapshot::new(&ctx.accounts.price_feed, now);

    let vault = &mut ctx.accounts.vault;
    let position = &mut ctx.accounts.position;
    open_position(position, vault.key(), ctx.accounts.user.key(), ctx.bumps.position);

    let before = position.record;
    let settlement = settle_borrow(&before, &oracle, amount)?;

    let seeds = &[VAULT_SEED, vault.debt_mint.as_ref(), &[vault.bump]];
    let signer = &[&seeds[..]];
    let cpi_accounts = Transfer {
        from: ctx.accounts.debt_vault.to_account_info(),
        to: ctx.accounts.user_debt_account.to_account_info(),
        authority: vault.to_account_info(),
    };
    token::transfer(
        CpiContext::new_with_signer(ctx.accounts.token_program.to_account_info(), cpi_accounts, signer),
        amount,
    )
    .map_err(|_| error!(VaultError::TransferFailed))?;

    vault.track(&before, &settlement.next)?;
    position.record = settlement.next;

    emit!(Borrowed {
        requested: amount,
        collateral_equivalent: settlement.collateral_equivalent,
    });
    Ok(())
}

/// Repay debt tokens from the user's token account
pub fn payback(ctx: Context<Payback>, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let oracle = FeedSnapshot::new(&ctx.accounts.price_feed, now);

    let vault = &mut ctx.accounts.vault;
    let position = &mut ctx.accounts.position;
    open_position(position, vault.key(), ctx.accounts.user.key(), ctx.bumps.position);

    let before = position.record;
    let settlement = settle_payback(&before, &oracle, amount)?;

    let cpi_accounts = Transfer {
        from: ctx.accounts.user_debt_account.to_account_info(),
        to: ctx.accounts.debt_vault.to_account_info(),
        authority: ctx.accounts.user.to_account_info(),
    };
    token::transfer(
        CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts),
        amount,
    )
    .map_err(|_| error!(VaultError::TransferFailed))?;

    vault.track(&before, &settlement.next)?;
    position.record = settlement.next;

    emit!(PaidBack {
        repaid: amount,
        collateral_equivalent: settlement.collateral_equivalent,
    });
    Ok(())
}

/// Withdraw SOL collateral; indebted positions must stay covered at the current rate
pub fn withdraw(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let oracle = FeedSnapshot::new(&ctx.accounts.price_feed, now);

    let vault = &mut ctx.accounts.vault;
    let position = &mut ctx.accounts.position;
    open_position(position, vault.key(), ctx.accounts.user.key(), ctx.bumps.position);

    let before = position.record;
    let settlement = settle_withdraw(&before, &oracle, amount)?;

    let vault_key = vault.key();
    let seeds = &[COLLATERAL_SEED, vault_key.as_ref(), &[vault.collateral_bump]];
    let signer = &[&seeds[..]];
    let cpi_accounts = system_program::Transfer {
        from: ctx.accounts.collateral_vault.to_account_info(),
        to: ctx.accounts.user.to_account_info(),
    };
    system_program::transfer(
        CpiContext::new_with_signer(ctx.accounts.system_program.to_account_info(), cpi_accounts, signer),
        amount,
    )
    .map_err(|_| error!(VaultError::TransferFailed))?;

    vault.track(&before, &settlement.next)?;
    position.record = settlement.next;

    emit!(Withdrawn { amount });
    Ok(())
}

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(mut)]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        init_if_needed,
        payer = user,
        space = UserPosition::SIZE,
        seeds = [POSITION_SEED, vault.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub position: Box<Account<'info, UserPosition>>,

    #[account(
        mut,
        seeds = [COLLATERAL_SEED, vault.key().as_ref()],
        bump = vault.collateral_bump,
    )]
    pub collateral_vault: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Borrow<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        has_one = price_feed @ VaultError::InvalidOracle,
        has_one = debt_vault,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        init_if_needed,
        payer = user,
        space = UserPosition::SIZE,
        seeds = [POSITION_SEED, vault.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub position: Box<Account<'info, UserPosition>>,

    pub price_feed: Box<Account<'info, PriceFeed>>,

    #[account(
        mut,
        seeds = [DEBT_VAULT_SEED, vault.key().as_ref()],
        bump = vault.debt_vault_bump,
    )]
    pub debt_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = user_debt_account.mint == vault.debt_mint @ VaultError::TransferFailed,
    )]
    pub user_debt_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Payback<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        has_one = price_feed @ VaultError::InvalidOracle,
        has_one = debt_vault,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        init_if_needed,
        payer = user,
        space = UserPosition::SIZE,
        seeds = [POSITION_SEED, vault.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub position: Box<Account<'info, UserPosition>>,

    pub price_feed: Box<Account<'info, PriceFeed>>,

    #[account(
        mut,
        seeds = [DEBT_VAULT_SEED, vault.key().as_ref()],
        bump = vault.debt_vault_bump,
    )]
    pub debt_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = user_debt_account.mint == vault.debt_mint @ VaultError::TransferFailed,
    )]
    pub user_debt_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        has_one = price_feed @ VaultError::InvalidOracle,
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        init_if_needed,
        payer = user,
        space = UserPosition::SIZE,
        seeds = [POSITION_SEED, vault.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub position: Box<Account<'info, UserPosition>>,

    pub price_feed: Box<Account<'info, PriceFeed>>,

    #[account(
        mut,
        seeds = [COLLATERAL_SEED, vault.key().as_ref()],
        bump = vault.collateral_bump,
    )]
    pub collateral_vault: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}
