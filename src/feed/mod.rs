//! Shared live-quote polling
//!
//! One poll task runs per distinct `(symbol set, interval)` pair and
//! every subscriber of that pair shares it, so N mounted views never
//! mean N identical in-flight requests. Subscriptions are ref-counted;
//! dropping the last one aborts the task, so a dead view cannot leave
//! a timer running behind it.
//!
//! Transport is behind [`QuoteSource`] so the polling client can be
//! swapped for a push-based feed without touching subscribers.

use crate::api::types::Quote;
use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::warn;

/// Poll cadence used by watchlist-style views.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Slower cadence used by single-symbol form views.
pub const FORM_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Where quotes come from. Production uses the REST client; tests
/// inject fakes; a push transport can implement this later.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self, symbols: &[String]) -> Result<Vec<Quote>>;
}

/// Last-known quotes for a subscription, plus when they were last
/// refreshed successfully. Subscribers render this between ticks.
#[derive(Debug, Clone, Default)]
pub struct QuoteSnapshot {
    quotes: HashMap<String, Quote>,
    last_success: Option<Instant>,
}

impl QuoteSnapshot {
    /// Quote for a symbol, case-insensitive on the symbol.
    pub fn get(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.get(&symbol.to_uppercase())
    }

    /// Finite live price for a symbol, if one has arrived.
    pub fn live_price(&self, symbol: &str) -> Option<f64> {
        self.get(symbol)
            .and_then(|quote| quote.price)
            .filter(|price| price.is_finite())
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn last_success(&self) -> Option<Instant> {
        self.last_success
    }

    /// True when no tick has succeeded within `max_age` (or ever).
    ///
    /// Per-tick failures are never surfaced to subscribers; this flag
    /// is the explicit way to notice the data has gone quiet.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        match self.last_success {
            Some(at) => at.elapsed() > max_age,
            None => true,
        }
    }
}

#[cfg(test)]
impl QuoteSnapshot {
    /// Seed a snapshot directly; unit tests for snapshot consumers.
    pub(crate) fn with_quotes(quotes: impl IntoIterator<Item = Quote>) -> Self {
        Self {
            quotes: quotes
                .into_iter()
                .map(|quote| (quote.symbol.to_uppercase(), quote))
                .collect(),
            last_success: Some(Instant::now()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FeedKey {
    symbols: Vec<String>,
    interval_ms: u64,
}

impl FeedKey {
    fn new<I, S>(symbols: I, interval: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut symbols: Vec<String> = symbols
            .into_iter()
            .map(|s| s.as_ref().trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        symbols.sort();
        symbols.dedup();
        Self {
            symbols,
            interval_ms: interval.as_millis() as u64,
        }
    }
}

struct FeedEntry {
    tx: watch::Sender<QuoteSnapshot>,
    subscribers: usize,
    task: Option<JoinHandle<()>>,
}

/// Registry of shared quote pollers.
pub struct QuoteFeed {
    source: Arc<dyn QuoteSource>,
    feeds: Arc<DashMap<FeedKey, FeedEntry>>,
}

impl QuoteFeed {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self {
            source,
            feeds: Arc::new(DashMap::new()),
        }
    }

    /// Subscribe to live quotes for a set of symbols.
    ///
    /// The first subscriber of a `(symbols, interval)` pair starts a
    /// poll task that fetches immediately and then on every tick;
    /// later subscribers share it. The subscription unsubscribes on
    /// drop.
    pub fn subscribe<I, S>(&self, symbols: I, interval: Duration) -> Subscription
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = FeedKey::new(symbols, interval);

        let mut entry = self
            .feeds
            .entry(key.clone())
            .or_insert_with(|| self.spawn_poller(&key));
        entry.subscribers += 1;
        let rx = entry.tx.subscribe();
        drop(entry);

        Subscription {
            feeds: Arc::clone(&self.feeds),
            key,
            rx,
        }
    }

    /// Number of live poll tasks; diagnostic.
    pub fn active_feeds(&self) -> usize {
        self.feeds.len()
    }

    fn spawn_poller(&self, key: &FeedKey) -> FeedEntry {
        let (tx, _) = watch::channel(QuoteSnapshot::default());

        // An empty symbol set gets a subscription but no network loop.
        if key.symbols.is_empty() {
            return FeedEntry {
                tx,
                subscribers: 0,
                task: None,
            };
        }

        let source = Arc::clone(&self.source);
        let symbols = key.symbols.clone();
        let interval = Duration::from_millis(key.interval_ms);
        let tx_poll = tx.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // First tick completes immediately: the cache-miss fast path.
                ticker.tick().await;
                match source.fetch(&symbols).await {
                    Ok(quotes) => {
                        tx_poll.send_modify(|snapshot| {
                            for quote in quotes {
                                snapshot.quotes.insert(quote.symbol.to_uppercase(), quote);
                            }
                            snapshot.last_success = Some(Instant::now());
                        });
                    }
                    Err(err) => {
                        // Previous snapshot holds; next tick retries. No backoff.
                        warn!("quote poll failed for {:?}: {}", symbols, err);
                    }
                }
            }
        });

        FeedEntry {
            tx,
            subscribers: 0,
            task: Some(task),
        }
    }
}

/// Handle to a shared quote poller. Dropping it unsubscribes; the
/// poller stops with its last subscriber.
pub struct Subscription {
    feeds: Arc<DashMap<FeedKey, FeedEntry>>,
    key: FeedKey,
    rx: watch::Receiver<QuoteSnapshot>,
}

impl Subscription {
    /// The last-known snapshot.
    pub fn snapshot(&self) -> QuoteSnapshot {
        self.rx.borrow().clone()
    }

    /// Wait until the snapshot changes. Returns `false` if the feed is
    /// gone, which cannot happen while this subscription is alive.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut last_out = false;
        if let Some(mut entry) = self.feeds.get_mut(&self.key) {
            entry.subscribers = entry.subscribers.saturating_sub(1);
            last_out = entry.subscribers == 0;
        }
        if last_out {
            if let Some((_, entry)) = self.feeds.remove_if(&self.key, |_, e| e.subscribers == 0) {
                if let Some(task) = entry.task {
                    task.abort();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TICK: Duration = Duration::from_millis(20);

    struct FakeSource {
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteSource for FakeSource {
        async fn fetch(&self, symbols: &[String]) -> Result<Vec<Quote>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(symbols
                .iter()
                .map(|symbol| Quote {
                    symbol: symbol.clone(),
                    price: Some(100.0 + call as f64),
                    change: None,
                    pct_change: None,
                    open: None,
                    day_high: None,
                    day_low: None,
                    exchange: None,
                })
                .collect())
        }
    }

    /// Fails every fetch after the first successful one.
    struct FlakySource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QuoteSource for FlakySource {
        async fn fetch(&self, symbols: &[String]) -> Result<Vec<Quote>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) > 0 {
                return Err(AppError::Internal("connection refused".to_string()));
            }
            Ok(vec![Quote {
                symbol: symbols[0].clone(),
                price: Some(250.0),
                change: None,
                pct_change: None,
                open: None,
                day_high: None,
                day_low: None,
                exchange: None,
            }])
        }
    }

    async fn wait_for_data(subscription: &mut Subscription) {
        while subscription.snapshot().is_empty() {
            assert!(subscription.changed().await);
        }
    }

    #[tokio::test]
    async fn same_symbols_share_one_poller() {
        let source = FakeSource::new();
        let feed = QuoteFeed::new(source.clone());

        let mut first = feed.subscribe(["TCS", "INFY"], TICK);
        let _second = feed.subscribe(["infy", " tcs "], TICK);
        assert_eq!(feed.active_feeds(), 1);

        wait_for_data(&mut first).await;
        let snapshot = first.snapshot();
        assert!(snapshot.live_price("TCS").is_some());
        assert!(snapshot.live_price("INFY").is_some());
    }

    #[tokio::test]
    async fn different_intervals_poll_separately() {
        let source = FakeSource::new();
        let feed = QuoteFeed::new(source);

        let _fast = feed.subscribe(["TCS"], TICK);
        let _slow = feed.subscribe(["TCS"], TICK * 2);
        assert_eq!(feed.active_feeds(), 2);
    }

    #[tokio::test]
    async fn last_drop_stops_polling() {
        let source = FakeSource::new();
        let feed = QuoteFeed::new(source.clone());

        let mut first = feed.subscribe(["TCS"], TICK);
        let second = feed.subscribe(["TCS"], TICK);
        wait_for_data(&mut first).await;

        drop(first);
        assert_eq!(feed.active_feeds(), 1);

        drop(second);
        assert_eq!(feed.active_feeds(), 0);

        let calls_after_drop = source.calls();
        tokio::time::sleep(TICK * 4).await;
        assert_eq!(source.calls(), calls_after_drop);
    }

    #[tokio::test]
    async fn first_fetch_is_immediate() {
        let source = FakeSource::new();
        let feed = QuoteFeed::new(source);

        let mut subscription = feed.subscribe(["TCS"], Duration::from_secs(3600));
        wait_for_data(&mut subscription).await;
        assert!(subscription.snapshot().live_price("TCS").is_some());
    }

    #[tokio::test]
    async fn failed_tick_keeps_previous_snapshot() {
        let source = Arc::new(FlakySource {
            calls: AtomicUsize::new(0),
        });
        let feed = QuoteFeed::new(source);

        let mut subscription = feed.subscribe(["TCS"], TICK);
        wait_for_data(&mut subscription).await;
        assert_eq!(subscription.snapshot().live_price("TCS"), Some(250.0));

        // Several failing ticks later the last good data is still there,
        // and staleness is now observable.
        tokio::time::sleep(TICK * 4).await;
        let snapshot = subscription.snapshot();
        assert_eq!(snapshot.live_price("TCS"), Some(250.0));
        assert!(snapshot.is_stale(Duration::from_millis(1)));
        assert!(!snapshot.is_stale(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn empty_symbol_set_never_fetches() {
        let source = FakeSource::new();
        let feed = QuoteFeed::new(source.clone());

        let subscription = feed.subscribe(Vec::<String>::new(), TICK);
        tokio::time::sleep(TICK * 3).await;
        assert_eq!(source.calls(), 0);
        assert!(subscription.snapshot().is_stale(Duration::from_secs(1)));
    }
}
