// Summary: Anchor program publishing collateral-per-debt-unit quotes for the
// Green vaults. The authority pushes (rate, decimals) answers and can flag the
// feed stale; readers additionally treat answers older than `max_age` as stale.

use anchor_lang::prelude::*;

pub mod state;
pub use state::*;

declare_id!("HZNRTXmAMPURf2CSrn22FaLh3NF959gqxHk8oBEpG9YJ");

#[program]
pub mod price_feed {
    use super::*;

    pub fn initialize_feed(ctx: Context<InitializeFeed>, params: InitializeFeedParams) -> Result<()> {
        validate_answer(params.rate, params.decimals)?;
        require!(params.max_age >= 0, FeedError::InvalidMaxAge);

        let feed = &mut ctx.accounts.feed;
        feed.authority = ctx.accounts.authority.key();
        feed.feed_id = params.feed_id;
        feed.rate = params.rate;
        feed.decimals = params.decimals;
        feed.is_stale = params.is_stale;
        feed.max_age = params.max_age;
        feed.updated_at = Clock::get()?.unix_timestamp;
        feed.bump = ctx.bumps.feed;

        msg!("Price feed {} initialized: rate={} decimals={}", params.feed_id, params.rate, params.decimals);
        Ok(())
    }

    /// Publish a new answer. Refreshes `updated_at`; the stale flag is left as is.
    pub fn set_answer(ctx: Context<UpdateFeed>, rate: u64, decimals: u8) -> Result<()> {
        validate_answer(rate, decimals)?;
        let feed = &mut ctx.accounts.feed;

        feed.rate = rate;
        feed.decimals = decimals;
        feed.updated_at = Clock::get()?.unix_timestamp;

        emit!(AnswerUpdated { feed: feed.key(), rate, decimals });
        Ok(())
    }

    pub fn set_is_stale(ctx: Context<UpdateFeed>, is_stale: bool) -> Result<()> {
        let feed = &mut ctx.accounts.feed;
        feed.is_stale = is_stale;

        msg!("Price feed {} stale flag set to {}", feed.feed_id, is_stale);
        emit!(StalenessSet { feed: feed.key(), is_stale });
        Ok(())
    }
}

#[derive(Accounts)]
#[instruction(params: InitializeFeedParams)]
pub struct InitializeFeed<'info> {
    #[account(
        init,
        payer = authority,
        space = PriceFeed::SIZE,
        seeds = [b"feed", authority.key().as_ref(), &params.feed_id.to_le_bytes()],
        bump
    )]
    pub feed: Account<'info, PriceFeed>,
    #[account(mut)]
    pub authority: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct UpdateFeed<'info> {
    #[account(mut, has_one = authority @ FeedError::Unauthorized)]
    pub feed: Account<'info, PriceFeed>,
    pub authority: Signer<'info>,
}
