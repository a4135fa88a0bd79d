use anchor_lang::prelude::*;
use price_feed::PriceFeed;

use crate::fixed_point::FixedRate;
use crate::state::VaultError;

/// Raw answer as reported by an oracle; not yet trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawQuote {
    pub rate: u64,
    pub decimals: u8,
    pub is_stale: bool,
}

pub trait PriceOracle {
    fn latest_quote(&self) -> Result<RawQuote>;
}

/// A validated, non-stale quote. Operations hold one of these for their whole
/// duration and never go back to the oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceQuote {
    pub rate: FixedRate,
}

impl PriceQuote {
    pub fn collateral_equivalent(&self, debt: u64) -> Result<u64> {
        self.rate.collateral_equivalent(debt)
    }

    pub fn collateral_equivalent_wide(&self, debt: u64) -> u128 {
        self.rate.collateral_equivalent_wide(debt)
    }
}

/// Reads the oracle once and rejects a stale answer before anything else is
/// looked at.
pub fn fresh_quote<O: PriceOracle + ?Sized>(oracle: &O) -> Result<PriceQuote> {
    let raw = oracle.latest_quote()?;
    require!(!raw.is_stale, VaultError::StaleFeed);
    Ok(PriceQuote { rate: FixedRate::new(raw.rate, raw.decimals)? })
}

/// The on-chain price feed account as observed at a given unix time.
pub struct FeedSnapshot<'a> {
    feed: &'a PriceFeed,
    now: i64,
}

impl<'a> FeedSnapshot<'a> {
    pub fn new(feed: &'a PriceFeed, now: i64) -> Self {
        Self { feed, now }
    }
}

impl PriceOracle for FeedSnapshot<'_> {
    fn latest_quote(&self) -> Result<RawQuote> {
        Ok(RawQuote {
            rate: self.feed.rate,
            decimals: self.feed.decimals,
            is_stale: self.feed.is_stale_at(self.now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingOracle {
        quote: RawQuote,
        reads: Cell<u32>,
    }

    impl PriceOracle for CountingOracle {
        fn latest_quote(&self) -> Result<RawQuote> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.quote)
        }
    }

    fn feed(rate: u64, decimals: u8, is_stale: bool, max_age: i64) -> PriceFeed {
        PriceFeed {
            authority: Pubkey::new_unique(),
            feed_id: 1,
            rate,
            decimals,
            is_stale,
            max_age,
            updated_at: 1_000,
            bump: 254,
        }
    }

    #[test]
    fn fresh_quote_reads_once() {
        let oracle = CountingOracle {
            quote: RawQuote { rate: 2, decimals: 0, is_stale: false },
            reads: Cell::new(0),
        };
        let quote = fresh_quote(&oracle).unwrap();
        assert_eq!(oracle.reads.get(), 1);
        assert_eq!(quote.collateral_equivalent(10).unwrap(), 20);
    }

    #[test]
    fn stale_flag_wins_over_bad_decimals() {
        let oracle = CountingOracle {
            quote: RawQuote { rate: 1, decimals: 40, is_stale: true },
            reads: Cell::new(0),
        };
        assert_eq!(fresh_quote(&oracle).unwrap_err(), VaultError::StaleFeed.into());
    }

    #[test]
    fn bad_decimals_are_rejected() {
        let oracle = CountingOracle {
            quote: RawQuote { rate: 1, decimals: 40, is_stale: false },
            reads: Cell::new(0),
        };
        assert_eq!(fresh_quote(&oracle).unwrap_err(), VaultError::InvalidQuote.into());
    }

    #[test]
    fn zero_rate_is_rejected() {
        let oracle = CountingOracle {
            quote: RawQuote { rate: 0, decimals: 6, is_stale: false },
            reads: Cell::new(0),
        };
        assert_eq!(fresh_quote(&oracle).unwrap_err(), VaultError::InvalidQuote.into());
        assert_eq!(oracle.reads.get(), 1);
    }

    #[test]
    fn feed_snapshot_reports_flag_and_age() {
        let f = feed(5, 1, false, 60);
        assert!(fresh_quote(&FeedSnapshot::new(&f, 1_060)).is_ok());
        assert_eq!(
            fresh_quote(&FeedSnapshot::new(&f, 1_061)).unwrap_err(),
            VaultError::StaleFeed.into()
        );

        let flagged = feed(5, 1, true, 0);
        assert_eq!(
            fresh_quote(&FeedSnapshot::new(&flagged, 1_000)).unwrap_err(),
            VaultError::StaleFeed.into()
        );
    }
}
