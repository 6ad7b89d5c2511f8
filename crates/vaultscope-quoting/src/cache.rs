use std::{fmt::Display, future::Future, sync::Arc};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use vaultscope_metrics::{CacheOutcome, PricingMetrics};
use vaultscope_types::{ChainId, DataQuality, PriceKind, TokenKey};

use crate::{config::PricingConfig, source::PriceSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceEntry {
    pub price: Decimal,
    pub fetched_at: DateTime<Utc>,
    pub quality: DataQuality,
}

/// A price as handed to callers, with the verdict that applies to it right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub price: Decimal,
    pub quality: DataQuality,
}

impl PriceQuote {
    pub const fn new(price: Decimal, quality: DataQuality) -> Self {
        Self { price, quality }
    }

    pub const fn error() -> Self {
        Self::new(Decimal::ZERO, DataQuality::Error)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub fresh: usize,
    pub stale: usize,
    pub error: usize,
}

/// Last known unit prices keyed by [`TokenKey`].
///
/// A lookup serves the stored entry while it is younger than the TTL. Past
/// that it goes back to the source: a success replaces the entry, a failure
/// degrades to the previous price tagged `stale`, or to zero tagged `error`
/// when nothing was ever fetched.
///
/// Concurrent lookups of the same expired key are not coalesced and may each
/// hit the source.
pub struct PriceCache {
    entries: DashMap<TokenKey, PriceEntry>,
    source: Arc<dyn PriceSource>,
    config: PricingConfig,
    metrics: Option<Arc<PricingMetrics>>,
}

impl PriceCache {
    pub fn new(source: Arc<dyn PriceSource>, config: PricingConfig) -> Self {
        Self {
            entries: DashMap::new(),
            source,
            config,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<PricingMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub const fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn is_test_network(&self, chain_id: ChainId) -> bool {
        self.config.is_test_network(chain_id)
    }

    /// Unit price for `key`, asking the price source on miss or expiry.
    pub async fn get(&self, key: &TokenKey) -> PriceQuote {
        let source = Arc::clone(&self.source);
        self.get_or_compute(key, || async move {
            source
                .fetch(key)
                .await
                .map(|price| PriceQuote::new(price, DataQuality::Ok))
        })
        .await
    }

    /// Same policy as [`Self::get`], with the refresh supplied by the caller.
    /// Used for values derived elsewhere, such as LP unit prices.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &TokenKey, compute: F) -> PriceQuote
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<PriceQuote, E>>,
        E: Display,
    {
        let now = Utc::now();
        // Clone out of the map so no shard lock is held across the await below.
        let previous = self.entries.get(key).map(|entry| entry.value().clone());

        if let Some(entry) = &previous {
            if self.is_fresh(entry, now) {
                self.record(key, CacheOutcome::Fresh);
                return PriceQuote::new(entry.price, entry.quality);
            }
        }

        match compute().await {
            Ok(quote) => {
                self.put(key.clone(), quote.price, quote.quality);
                self.record(key, CacheOutcome::Refetched);
                quote
            }
            Err(e) => {
                tracing::warn!(token = %key, error = %e, "Price refresh failed");
                self.degrade(key, previous)
            }
        }
    }

    /// Record a price obtained outside of [`Self::get`].
    pub fn put(&self, key: TokenKey, price: Decimal, quality: DataQuality) {
        self.entries.insert(
            key,
            PriceEntry {
                price,
                fetched_at: Utc::now(),
                quality,
            },
        );
    }

    /// Entries of one kind on one chain, with their current verdict.
    pub fn snapshot(&self, chain_id: ChainId, kind: PriceKind) -> Vec<(TokenKey, PriceEntry)> {
        let now = Utc::now();
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .filter(|entry| entry.key().chain_id == chain_id && entry.key().kind == kind)
            .map(|entry| {
                let mut value = entry.value().clone();
                value.quality = self.current_quality(&value, now);
                (entry.key().clone(), value)
            })
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.address.cmp(&b.address));
        entries
    }

    pub fn stats(&self) -> CacheStats {
        let now = Utc::now();
        self.entries
            .iter()
            .fold(CacheStats::default(), |mut stats, entry| {
                stats.total_entries += 1;
                match self.current_quality(entry.value(), now) {
                    DataQuality::Ok => stats.fresh += 1,
                    DataQuality::Stale => stats.stale += 1,
                    DataQuality::Error => stats.error += 1,
                }
                stats
            })
    }

    /// Drops every entry and returns how many there were.
    pub fn clear(&self) -> usize {
        let cleared = self.entries.len();
        self.entries.clear();
        cleared
    }

    /// Error entries are never served from cache so the next lookup retries.
    fn is_fresh(&self, entry: &PriceEntry, now: DateTime<Utc>) -> bool {
        entry.quality != DataQuality::Error && Self::age(entry, now) < self.config.cache_ttl
    }

    fn current_quality(&self, entry: &PriceEntry, now: DateTime<Utc>) -> DataQuality {
        if entry.quality == DataQuality::Ok && Self::age(entry, now) >= self.config.cache_ttl {
            DataQuality::Stale
        } else {
            entry.quality
        }
    }

    fn age(entry: &PriceEntry, now: DateTime<Utc>) -> std::time::Duration {
        (now - entry.fetched_at).to_std().unwrap_or_default()
    }

    fn degrade(&self, key: &TokenKey, previous: Option<PriceEntry>) -> PriceQuote {
        match previous {
            Some(entry) if entry.quality != DataQuality::Error => {
                // Keep the original fetch time so the entry stays expired.
                self.entries.insert(
                    key.clone(),
                    PriceEntry {
                        quality: DataQuality::Stale,
                        ..entry.clone()
                    },
                );
                self.record(key, CacheOutcome::Stale);
                PriceQuote::new(entry.price, DataQuality::Stale)
            }
            _ => {
                self.entries.insert(
                    key.clone(),
                    PriceEntry {
                        price: Decimal::ZERO,
                        fetched_at: Utc::now(),
                        quality: DataQuality::Error,
                    },
                );
                self.record(key, CacheOutcome::Error);
                PriceQuote::error()
            }
        }
    }

    fn record(&self, key: &TokenKey, outcome: CacheOutcome) {
        if let Some(metrics) = &self.metrics {
            metrics.record_lookup(key.chain_id, outcome);
        }
    }
}
