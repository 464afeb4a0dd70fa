//! Simulated live price feed.
//!
//! Each category owns a [`LiveFeed`]. While running, a tokio task replaces
//! the published snapshot on every tick with a perturbed copy; readers only
//! ever see whole snapshots. Stopping a feed awaits its task, so once
//! [`LiveFeed::set_enabled`] returns `false -> idle` no further tick lands.

use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::error::{DashboardError, Result};
use crate::generator::TokenCollections;
use crate::token::{Category, Token};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(3);

/// Largest relative price move per tick.
const PRICE_JITTER: f64 = 0.01;
/// Largest absolute change to the 24h percentage per tick.
const CHANGE_JITTER: f64 = 1.0;

/// Immutable view of a collection at one point in time.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    /// Number of ticks applied since the feed was created.
    pub tick: u64,
    pub tokens: Arc<[Token]>,
}

/// New record with the same identity and a nudged price / 24h change.
pub fn perturb<R: Rng + ?Sized>(token: &Token, rng: &mut R) -> Token {
    let mut next = token.clone();
    next.price *= 1.0 + rng.gen_range(-PRICE_JITTER..PRICE_JITTER);
    next.price_change_24h += rng.gen_range(-CHANGE_JITTER..CHANGE_JITTER);
    next
}

fn next_snapshot<R: Rng + ?Sized>(current: &FeedSnapshot, rng: &mut R) -> FeedSnapshot {
    let tokens: Vec<Token> = current.tokens.iter().map(|t| perturb(t, rng)).collect();
    FeedSnapshot {
        tick: current.tick + 1,
        tokens: tokens.into(),
    }
}

/// Running tick task. Dropping the handle aborts the task; [`cancel`]
/// additionally waits for it to finish.
///
/// [`cancel`]: FeedHandle::cancel
pub struct FeedHandle {
    category: Category,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    pub async fn cancel(mut self) -> Result<()> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        match self.task.take() {
            Some(task) => task.await.map_err(|source| DashboardError::FeedTask {
                category: self.category.slug(),
                source,
            }),
            None => Ok(()),
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Spawns a task that perturbs `snapshot` every `interval`. The first tick
/// lands one full interval after the call.
pub fn start<R>(
    category: Category,
    snapshot: Arc<watch::Sender<FeedSnapshot>>,
    interval: Duration,
    mut rng: R,
) -> FeedHandle
where
    R: Rng + Send + 'static,
{
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                _ = ticker.tick() => {
                    let next = {
                        let current = snapshot.borrow();
                        next_snapshot(&current, &mut rng)
                    };
                    let tick = next.tick;
                    snapshot.send_replace(next);
                    tracing::debug!(category = category.slug(), tick, "live feed tick");
                }
            }
        }
    });

    FeedHandle {
        category,
        stop: Some(stop_tx),
        task: Some(task),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Idle,
    Running,
}

/// One category's collection plus its (optional) tick task.
pub struct LiveFeed {
    category: Category,
    snapshot: Arc<watch::Sender<FeedSnapshot>>,
    interval: Duration,
    rng: StdRng,
    handle: Option<FeedHandle>,
}

impl LiveFeed {
    pub fn new(category: Category, tokens: Vec<Token>, interval: Duration, rng: StdRng) -> Self {
        let (snapshot, _) = watch::channel(FeedSnapshot {
            tick: 0,
            tokens: tokens.into(),
        });
        Self {
            category,
            snapshot: Arc::new(snapshot),
            interval,
            rng,
            handle: None,
        }
    }

    pub fn current(&self) -> FeedSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn state(&self) -> FeedState {
        if self.handle.is_some() {
            FeedState::Running
        } else {
            FeedState::Idle
        }
    }

    /// Idle -> Running starts a task, Running -> Idle cancels it and waits.
    /// Requests for the current state do nothing.
    pub async fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        match (enabled, self.handle.take()) {
            (true, None) => {
                let task_rng = StdRng::seed_from_u64(self.rng.gen());
                self.handle = Some(start(
                    self.category,
                    Arc::clone(&self.snapshot),
                    self.interval,
                    task_rng,
                ));
                tracing::info!(category = self.category.slug(), "live feed started");
                Ok(())
            }
            (false, Some(handle)) => {
                handle.cancel().await?;
                tracing::info!(category = self.category.slug(), "live feed stopped");
                Ok(())
            }
            (_, handle) => {
                self.handle = handle;
                Ok(())
            }
        }
    }
}

/// The feeds for all three categories.
pub struct LiveFeeds {
    feeds: [LiveFeed; 3],
}

impl LiveFeeds {
    pub fn new<R: Rng + ?Sized>(collections: TokenCollections, interval: Duration, rng: &mut R) -> Self {
        let feeds = collections.into_parts().map(|(category, tokens)| {
            LiveFeed::new(category, tokens, interval, StdRng::seed_from_u64(rng.gen()))
        });
        Self { feeds }
    }

    pub fn get(&self, category: Category) -> &LiveFeed {
        &self.feeds[category.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LiveFeed> {
        self.feeds.iter()
    }

    /// Runs only the active category's feed, and only when `live` is set.
    /// Other feeds are stopped first so two tasks never overlap.
    pub async fn reconcile(&mut self, active: Category, live: bool) -> Result<()> {
        for feed in self.feeds.iter_mut().filter(|f| f.category != active) {
            feed.set_enabled(false).await?;
        }
        self.feeds[active.index()].set_enabled(live).await
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        for feed in self.feeds.iter_mut() {
            feed.set_enabled(false).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use crate::generator::{TokenCollections, generate_token};

    const TICK: Duration = DEFAULT_TICK_INTERVAL;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
    }

    fn tokens(seed: u64) -> Vec<Token> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..10)
            .map(|i| generate_token(Category::New, i, now(), &mut rng))
            .collect()
    }

    fn feed(seed: u64) -> LiveFeed {
        LiveFeed::new(Category::New, tokens(seed), TICK, StdRng::seed_from_u64(seed))
    }

    #[test]
    fn perturb_changes_only_price_fields() {
        let mut rng = StdRng::seed_from_u64(9);
        for token in tokens(1) {
            let next = perturb(&token, &mut rng);
            let ratio = next.price / token.price;
            assert!((0.99..=1.01).contains(&ratio), "ratio {ratio}");
            assert!((next.price_change_24h - token.price_change_24h).abs() <= 1.0);

            let restored = Token {
                price: token.price,
                price_change_24h: token.price_change_24h,
                ..next
            };
            assert_eq!(restored, token);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_lands_after_one_interval() {
        let mut feed = feed(2);
        let original = feed.current();
        feed.set_enabled(true).await.unwrap();

        time::sleep(TICK - Duration::from_millis(100)).await;
        assert_eq!(feed.current().tick, 0);

        time::sleep(Duration::from_millis(200)).await;
        let after = feed.current();
        assert_eq!(after.tick, 1);
        assert_ne!(after.tokens[0].price, original.tokens[0].price);
        assert_eq!(after.tokens[0].id, original.tokens[0].id);
        // The previous snapshot is untouched.
        assert_eq!(&*original.tokens, tokens(2).as_slice());

        feed.set_enabled(false).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_feed_stays_frozen_across_two_windows() {
        let mut feed = feed(3);
        feed.set_enabled(true).await.unwrap();
        time::sleep(TICK * 2 + Duration::from_millis(100)).await;
        assert_eq!(feed.current().tick, 2);

        feed.set_enabled(false).await.unwrap();
        assert_eq!(feed.state(), FeedState::Idle);
        let frozen = feed.current();

        time::sleep(TICK).await;
        assert!(Arc::ptr_eq(&feed.current().tokens, &frozen.tokens));
        time::sleep(TICK).await;
        assert!(Arc::ptr_eq(&feed.current().tokens, &frozen.tokens));
        assert_eq!(feed.current().tick, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn reenabling_resumes_from_last_snapshot() {
        let mut feed = feed(4);
        feed.set_enabled(true).await.unwrap();
        time::sleep(TICK + Duration::from_millis(100)).await;
        feed.set_enabled(false).await.unwrap();
        let paused = feed.current();

        feed.set_enabled(true).await.unwrap();
        time::sleep(TICK + Duration::from_millis(100)).await;
        let resumed = feed.current();
        assert_eq!(resumed.tick, paused.tick + 1);
        for (before, after) in paused.tokens.iter().zip(resumed.tokens.iter()) {
            let ratio = after.price / before.price;
            assert!((0.99..=1.01).contains(&ratio));
        }
        feed.set_enabled(false).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_enable_keeps_a_single_task() {
        let mut feed = feed(5);
        feed.set_enabled(true).await.unwrap();
        feed.set_enabled(true).await.unwrap();
        assert_eq!(feed.state(), FeedState::Running);

        time::sleep(TICK + Duration::from_millis(100)).await;
        assert_eq!(feed.current().tick, 1);
        feed.set_enabled(false).await.unwrap();
        feed.set_enabled(false).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_active_category_runs() {
        let collections = TokenCollections::generate(10, now(), &mut StdRng::seed_from_u64(6));
        let mut feeds = LiveFeeds::new(collections, TICK, &mut StdRng::seed_from_u64(6));

        feeds.reconcile(Category::Final, true).await.unwrap();
        time::sleep(TICK + Duration::from_millis(100)).await;
        assert_eq!(feeds.get(Category::Final).current().tick, 1);
        assert_eq!(feeds.get(Category::New).current().tick, 0);
        assert_eq!(feeds.get(Category::Migrated).current().tick, 0);

        feeds.reconcile(Category::Migrated, true).await.unwrap();
        assert_eq!(feeds.get(Category::Final).state(), FeedState::Idle);
        time::sleep(TICK + Duration::from_millis(100)).await;
        assert_eq!(feeds.get(Category::Final).current().tick, 1);
        assert_eq!(feeds.get(Category::Migrated).current().tick, 1);

        feeds.reconcile(Category::Migrated, false).await.unwrap();
        assert!(feeds.iter().all(|f| f.state() == FeedState::Idle));

        feeds.reconcile(Category::New, true).await.unwrap();
        feeds.shutdown().await.unwrap();
        assert!(feeds.iter().all(|f| f.state() == FeedState::Idle));
    }
}
