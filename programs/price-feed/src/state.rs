use anchor_lang::prelude::*;

/// Largest accepted scale exponent. 10^18 keeps every `amount * rate` product
/// inside u128 for u64 operands.
pub const MAX_DECIMALS: u8 = 18;

#[account]
pub struct PriceFeed {
    pub authority: Pubkey,
    pub feed_id: u64,
    pub rate: u64,      // collateral per debt unit, scaled by 10^decimals
    pub decimals: u8,
    pub is_stale: bool, // set by the authority when the source is unreliable
    pub max_age: i64,   // seconds a published answer stays fresh (0 = no limit)
    pub updated_at: i64,
    pub bump: u8,
}

impl PriceFeed {
    pub const SIZE: usize = 8 + // discriminator
        32 + // authority
        8 +  // feed_id
        8 +  // rate
        1 +  // decimals
        1 +  // is_stale
        8 +  // max_age
        8 +  // updated_at
        1;   // bump

    /// Staleness as seen at unix time `now`: either flagged by the authority
    /// or older than `max_age`.
    pub fn is_stale_at(&self, now: i64) -> bool {
        if self.is_stale {
            return true;
        }
        self.max_age > 0 && now.saturating_sub(self.updated_at) > self.max_age
    }
}

/// A published answer must quote a positive rate on a supported scale.
pub fn validate_answer(rate: u64, decimals: u8) -> Result<()> {
    require!(rate > 0, FeedError::InvalidRate);
    require!(decimals <= MAX_DECIMALS, FeedError::InvalidDecimals);
    Ok(())
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct InitializeFeedParams {
    pub feed_id: u64,
    pub rate: u64,
    pub decimals: u8,
    pub is_stale: bool,
    pub max_age: i64,
}

#[event]
pub struct AnswerUpdated {
    pub feed: Pubkey,
    pub rate: u64,
    pub decimals: u8,
}

#[event]
pub struct StalenessSet {
    pub feed: Pubkey,
    pub is_stale: bool,
}

#[error_code]
pub enum FeedError {
    #[msg("Unauthorized")]
    Unauthorized,
    #[msg("Decimals exceed the supported scale")]
    InvalidDecimals,
    #[msg("Max age must not be negative")]
    InvalidMaxAge,
    #[msg("Rate must be greater than zero")]
    InvalidRate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(is_stale: bool, max_age: i64, updated_at: i64) -> PriceFeed {
        PriceFeed {
            authority: Pubkey::new_unique(),
            feed_id: 0,
            rate: 1,
            decimals: 0,
            is_stale,
            max_age,
            updated_at,
            bump: 255,
        }
    }

    #[test]
    fn flag_marks_feed_stale() {
        assert!(feed(true, 0, 100).is_stale_at(100));
        assert!(!feed(false, 0, 100).is_stale_at(100));
    }

    #[test]
    fn zero_max_age_never_expires() {
        assert!(!feed(false, 0, 0).is_stale_at(i64::MAX));
    }

    #[test]
    fn answer_expires_after_max_age() {
        let f = feed(false, 300, 1_000);
        assert!(!f.is_stale_at(1_300));
        assert!(f.is_stale_at(1_301));
    }

    #[test]
    fn clock_behind_publish_time_is_fresh() {
        assert!(!feed(false, 300, 1_000).is_stale_at(900));
    }

    #[test]
    fn answers_need_a_positive_rate() {
        assert_eq!(validate_answer(0, 6).unwrap_err(), FeedError::InvalidRate.into());
        assert_eq!(validate_answer(0, 0).unwrap_err(), FeedError::InvalidRate.into());
        assert!(validate_answer(1, 0).is_ok());
    }

    #[test]
    fn answers_need_a_supported_scale() {
        assert!(validate_answer(5, MAX_DECIMALS).is_ok());
        assert_eq!(
            validate_answer(5, MAX_DECIMALS + 1).unwrap_err(),
            FeedError::InvalidDecimals.into()
        );
    }
}
