use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{self, Burn, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::state::*;

/// Mint shares when a user deposits the underlying token
pub fn deposit(ctx: Context<DepositUnderlying>, amount: u64) -> Result<()> {
    let share_vault = &mut ctx.accounts.share_vault;

    let shares = share_vault.shares_for_deposit(amount)?;
    require!(shares > 0, ShareVaultError::InvalidAmount);

    let cpi_accounts = Transfer {
        from: ctx.accounts.user_token_account.to_account_info(),
        to: ctx.accounts.vault.to_account_info(),
        authority: ctx.accounts.user.to_account_info(),
    };
    let cpi_ctx = CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts);
    token::transfer(cpi_ctx, amount).map_err(|_| error!(ShareVaultError::TransferFailed))?;

    let seeds = &[
        SHARE_VAULT_SEED,
        share_vault.underlying_mint.as_ref(),
        &[share_vault.bump],
    ];
    let signer = &[&seeds[..]];
    let cpi_accounts = MintTo {
        mint: ctx.accounts.share_mint.to_account_info(),
        to: ctx.accounts.user_share_account.to_account_info(),
        authority: share_vault.to_account_info(),
    };
    let cpi_ctx = CpiContext::new_with_signer(ctx.accounts.token_program.to_account_info(), cpi_accounts, signer);
    token::mint_to(cpi_ctx, shares)?;

    share_vault.total_underlying = share_vault
        .total_underlying
        .checked_add(amount)
        .ok_or(ShareVaultError::MathOverflow)?;

    emit!(Minted {
        user: ctx.accounts.user.key(),
        token: share_vault.underlying_mint,
        shares,
    });
    Ok(())
}

/// Burn shares and release `amount` of the underlying token
pub fn withdraw(ctx: Context<WithdrawUnderlying>, amount: u64) -> Result<()> {
    require!(amount > 0, ShareVaultError::InvalidAmount);
    let share_vault = &mut ctx.accounts.share_vault;

    let shares = share_vault.shares_for_withdrawal(amount)?;
    require!(
        ctx.accounts.user_share_account.amount >= shares,
        ShareVaultError::InsufficientShares
    );

    let cpi_accounts = Burn {
        mint: ctx.accounts.share_mint.to_account_info(),
        from: ctx.accounts.user_share_account.to_account_info(),
        authority: ctx.accounts.user.to_account_info(),
    };
    let cpi_ctx = CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts);
    token::burn(cpi_ctx, shares)?;

    let seeds = &[
        SHARE_VAULT_SEED,
        share_vault.underlying_mint.as_ref(),
        &[share_vault.bump],
    ];
    let signer = &[&seeds[..]];
    let cpi_accounts = Transfer {
        from: ctx.accounts.vault.to_account_info(),
        to: ctx.accounts.user_token_account.to_account_info(),
        authority: share_vault.to_account_info(),
    };
    let cpi_ctx = CpiContext::new_with_signer(ctx.accounts.token_program.to_account_info(), cpi_accounts, signer);
    token::transfer(cpi_ctx, amount).map_err(|_| error!(ShareVaultError::TransferFailed))?;

    // Rate changes can release more than was tracked; the token balance is authoritative.
    share_vault.total_underlying = share_vault.total_underlying.saturating_sub(amount);

    emit!(Burned {
        user: ctx.accounts.user.key(),
        token: share_vault.underlying_mint,
        shares,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct DepositUnderlying<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        has_one = share_mint,
        has_one = vault,
    )]
    pub share_vault: Box<Account<'info, ShareVault>>,

    #[account(
        mut,
        constraint = user_token_account.mint == share_vault.underlying_mint @ ShareVaultError::TransferFailed,
    )]
    pub user_token_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [UNDERLYING_VAULT_SEED, share_vault.key().as_ref()],
        bump = share_vault.vault_bump,
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub share_mint: Box<Account<'info, Mint>>,

    #[account(
        init_if_needed,
        payer = user,
        associated_token::mint = share_mint,
        associated_token::authority = user,
    )]
    pub user_share_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct WithdrawUnderlying<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        has_one = share_mint,
        has_one = vault,
    )]
    pub share_vault: Box<Account<'info, ShareVault>>,

    #[account(
        mut,
        constraint = user_token_account.mint == share_vault.underlying_mint @ ShareVaultError::TransferFailed,
    )]
    pub user_token_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [UNDERLYING_VAULT_SEED, share_vault.key().as_ref()],
        bump = share_vault.vault_bump,
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub share_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        associated_token::mint = share_mint,
        associated_token::authority = user,
    )]
    pub user_share_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}
