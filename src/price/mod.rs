//! Reference Price Module
//!
//! SOL/USD price for display next to balances. Price data is decorative:
//! a failed lookup never fails the caller, it substitutes the configured
//! fallback and tries the provider again once the refresh interval passes.

pub mod coingecko;

pub use coingecko::*;

use std::time::Duration;

use crate::config::VaultConfig;
use crate::error::VaultResult;
use crate::types::PriceQuote;
use crate::utils::Cache;
use crate::{log_debug, log_warn};

const CACHE_KEY: &str = "solana/usd";

/// Source of the SOL/USD reference price
pub trait PriceProvider: Send + Sync {
    fn sol_usd(&self) -> VaultResult<f64>;
}

/// Cached price with fallback
pub struct PriceTracker {
    provider: Box<dyn PriceProvider>,
    cache: Cache<PriceQuote>,
    fallback_usd: f64,
}

impl PriceTracker {
    pub fn new(provider: Box<dyn PriceProvider>, refresh: Duration, fallback_usd: f64) -> Self {
        Self {
            provider,
            cache: Cache::new(refresh),
            fallback_usd,
        }
    }

    pub fn from_config(provider: Box<dyn PriceProvider>, config: &VaultConfig) -> Self {
        Self::new(provider, config.price_refresh, config.fallback_price_usd)
    }

    /// Cached quote if still current, otherwise a fresh one
    pub fn current(&mut self) -> PriceQuote {
        match self.cache.get(CACHE_KEY) {
            Some(quote) => quote,
            None => self.refresh(),
        }
    }

    /// Ask the provider now, falling back on any failure
    pub fn refresh(&mut self) -> PriceQuote {
        let quote = match self.provider.sol_usd() {
            Ok(usd) => {
                log_debug!("price", "SOL price updated", usd = usd);
                PriceQuote { usd, is_fallback: false }
            }
            Err(e) => {
                log_warn!("price", "Error fetching SOL price", error = e, fallback = self.fallback_usd);
                PriceQuote {
                    usd: self.fallback_usd,
                    is_fallback: true,
                }
            }
        };

        self.cache.set(CACHE_KEY, quote);
        quote
    }
}

/// USD value of a SOL amount
pub fn usd_value(sol: f64, quote: &PriceQuote) -> f64 {
    sol * quote.usd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FALLBACK_SOL_PRICE_USD;
    use crate::error::VaultError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingProvider {
        price: Option<f64>,
        calls: Arc<AtomicUsize>,
    }

    impl PriceProvider for CountingProvider {
        fn sol_usd(&self) -> VaultResult<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.price
                .ok_or_else(|| VaultError::network_error("Connection failed"))
        }
    }

    fn tracker(price: Option<f64>, refresh: Duration) -> (PriceTracker, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CountingProvider {
            price,
            calls: Arc::clone(&calls),
        };
        (
            PriceTracker::new(Box::new(provider), refresh, FALLBACK_SOL_PRICE_USD),
            calls,
        )
    }

    #[test]
    fn test_price_is_cached_within_interval() {
        let (mut tracker, calls) = tracker(Some(171.5), Duration::from_secs(300));

        assert_eq!(tracker.current(), PriceQuote { usd: 171.5, is_fallback: false });
        assert_eq!(tracker.current().usd, 171.5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_uses_fallback() {
        let (mut tracker, _) = tracker(None, Duration::from_secs(300));

        let quote = tracker.current();
        assert_eq!(quote.usd, 150.0);
        assert!(quote.is_fallback);
    }

    #[test]
    fn test_stale_price_refetches() {
        let (mut tracker, calls) = tracker(Some(99.0), Duration::ZERO);
        tracker.current();
        tracker.current();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_usd_value() {
        let quote = PriceQuote { usd: 150.0, is_fallback: true };
        assert_eq!(usd_value(2.5, &quote), 375.0);
    }
}
