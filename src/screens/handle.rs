//! Mounting a screen and driving its revalidation schedule
//!
//! Uses tokio timers and channels to refresh a screen in the background and
//! publish each new state through a `watch` channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::{Resolution, Screen, ScreenContext};

/// Timing of background revalidation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevalidatePolicy {
    /// Delay before the first pass when the screen painted from disk
    pub initial_delay: Duration,
    /// Interval between recurring passes
    pub interval: Duration,
}

impl Default for RevalidatePolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            interval: Duration::from_secs(60),
        }
    }
}

/// What a screen currently shows
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenState<M> {
    /// Last good model, kept across failed passes
    pub model: Option<M>,
    /// True until the first pass settles on a screen with nothing cached
    pub loading: bool,
    /// A fresh fetch could not resolve the screen's target
    pub not_found: bool,
    /// Message from the most recent failed pass
    pub last_error: Option<String>,
    /// When the model was last replaced by fresh data
    pub refreshed_at: Option<DateTime<Utc>>,
    /// The model came from the persistent cache and has not been revalidated
    pub from_cache: bool,
}

impl<M> Default for ScreenState<M> {
    fn default() -> Self {
        Self {
            model: None,
            loading: false,
            not_found: false,
            last_error: None,
            refreshed_at: None,
            from_cache: false,
        }
    }
}

/// A mounted screen
///
/// Dropping the handle unmounts the screen: its timers stop, and results of
/// passes still in flight are no longer applied to the state.
pub struct ScreenHandle<M> {
    state: watch::Receiver<ScreenState<M>>,
    refresh_tx: mpsc::Sender<()>,
    mounted: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl<M: Clone + Send + Sync + 'static> ScreenHandle<M> {
    /// Mounts `screen`, painting from the persistent cache when possible
    ///
    /// With a cache hit the first network pass runs after
    /// `policy.initial_delay`; without one it runs immediately and the screen
    /// starts in the loading state. Recurring passes follow every
    /// `policy.interval`. Must be called from within a tokio runtime.
    pub fn mount<S>(screen: S, ctx: ScreenContext, policy: RevalidatePolicy) -> Self
    where
        S: Screen<Model = M>,
    {
        let screen = Arc::new(screen);
        let cached = screen.from_local(&ctx.local);
        let had_cache = cached.is_some();
        if let Some(model) = &cached {
            debug!(screen = %screen.name(), "painted from persistent cache");
            screen.on_resolved(model, &ctx);
        }

        let initial = ScreenState {
            model: cached,
            loading: !had_cache,
            from_cache: had_cache,
            ..ScreenState::default()
        };
        let (state_tx, state_rx) = watch::channel(initial);
        let (refresh_tx, refresh_rx) = mpsc::channel(4);
        let mounted = Arc::new(AtomicBool::new(true));

        let pass = Pass {
            screen,
            ctx,
            state: Arc::new(state_tx),
            mounted: mounted.clone(),
        };
        let task = tokio::spawn(schedule(pass, policy, had_cache, refresh_rx));

        Self {
            state: state_rx,
            refresh_tx,
            mounted,
            task,
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> ScreenState<M> {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ScreenState<M>> {
        self.state.clone()
    }

    /// Requests an immediate revalidation pass
    ///
    /// Runs even while offline, since the user asked for it.
    pub fn refresh(&self) {
        if self.refresh_tx.try_send(()).is_err() {
            debug!("refresh already queued");
        }
    }

    /// Unmounts the screen
    pub fn unmount(self) {}
}

impl<M> Drop for ScreenHandle<M> {
    fn drop(&mut self) {
        self.mounted.store(false, Ordering::SeqCst);
        self.task.abort();
    }
}

/// Timer loop for one mounted screen. Aborted on unmount.
async fn schedule<S: Screen>(
    pass: Pass<S>,
    policy: RevalidatePolicy,
    had_cache: bool,
    mut refresh_rx: mpsc::Receiver<()>,
) {
    if had_cache {
        tokio::select! {
            _ = tokio::time::sleep(policy.initial_delay) => pass.spawn_if_online(),
            Some(()) = refresh_rx.recv() => {
                pass.spawn();
            }
        }
    } else {
        // Recurring passes start only once the first load has settled.
        if pass.spawn().await.is_err() {
            warn!(screen = %pass.screen.name(), "initial load task failed");
        }
    }

    let mut interval = tokio::time::interval_at(Instant::now() + policy.interval, policy.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => pass.spawn_if_online(),
            request = refresh_rx.recv() => match request {
                Some(()) => {
                    pass.spawn();
                }
                None => break,
            },
        }
    }
}

/// One revalidation pass and the state it reports into
struct Pass<S: Screen> {
    screen: Arc<S>,
    ctx: ScreenContext,
    state: Arc<watch::Sender<ScreenState<S::Model>>>,
    mounted: Arc<AtomicBool>,
}

impl<S: Screen> Clone for Pass<S> {
    fn clone(&self) -> Self {
        Self {
            screen: self.screen.clone(),
            ctx: self.ctx.clone(),
            state: self.state.clone(),
            mounted: self.mounted.clone(),
        }
    }
}

impl<S: Screen> Pass<S> {
    fn spawn_if_online(&self) {
        if !self.ctx.connectivity.is_online() {
            debug!(screen = %self.screen.name(), "offline, skipping revalidation");
            return;
        }
        self.spawn();
    }

    /// Runs the pass on its own task so unmounting never cancels the
    /// underlying network call.
    fn spawn(&self) -> JoinHandle<()> {
        let pass = self.clone();
        tokio::spawn(async move { pass.run().await })
    }

    async fn run(self) {
        let name = self.screen.name();
        let result = self.screen.revalidate(&self.ctx).await;

        if !self.mounted.load(Ordering::SeqCst) {
            debug!(screen = %name, "screen unmounted, discarding revalidation result");
            return;
        }

        match result {
            Ok(Resolution::Found(model)) => {
                self.screen.on_resolved(&model, &self.ctx);
                self.state.send_modify(|state| {
                    state.model = Some(model);
                    state.loading = false;
                    state.not_found = false;
                    state.last_error = None;
                    state.refreshed_at = Some(Utc::now());
                    state.from_cache = false;
                });
                debug!(screen = %name, "revalidated");
            }
            Ok(Resolution::NotFound) => {
                self.state.send_modify(|state| {
                    state.model = None;
                    state.loading = false;
                    state.not_found = true;
                    state.last_error = None;
                    state.refreshed_at = Some(Utc::now());
                    state.from_cache = false;
                });
                debug!(screen = %name, "target not found after fresh fetch");
            }
            Err(err) => {
                warn!(screen = %name, error = %err, "revalidation failed, keeping last good state");
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.last_error = Some(err.to_string());
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, Method};
    use crate::cache::LocalCache;
    use crate::screens::fixtures::context;
    use async_trait::async_trait;
    use serde_json::json;

    /// Counts the words of `/words` and persists them
    struct WordsScreen;

    #[async_trait]
    impl Screen for WordsScreen {
        type Model = Vec<String>;

        fn name(&self) -> String {
            "words".to_string()
        }

        fn from_local(&self, local: &LocalCache) -> Option<Vec<String>> {
            local.get("words").map(|record| record.data)
        }

        async fn revalidate(&self, ctx: &ScreenContext) -> Result<Resolution<Vec<String>>, ApiError> {
            ctx.api.clear_cache(Some("words"));
            let value = ctx.api.get("/words", true).await?;
            let words: Vec<String> = serde_json::from_value(value)?;
            if words.is_empty() {
                return Ok(Resolution::NotFound);
            }
            ctx.local.set("words", &words);
            Ok(Resolution::Found(words))
        }
    }

    fn sleep(secs: u64) -> tokio::time::Sleep {
        tokio::time::sleep(Duration::from_secs(secs))
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_paints_immediately_and_delays_network() {
        let (ctx, transport, _dir) = context();
        transport.respond(Method::Get, "/words", 200, json!(["fresh"]));
        ctx.local.set("words", &vec!["cached".to_string()]);

        let handle = ScreenHandle::mount(WordsScreen, ctx, RevalidatePolicy::default());
        let state = handle.state();
        assert_eq!(state.model, Some(vec!["cached".to_string()]));
        assert!(!state.loading);
        assert!(state.from_cache);

        sleep(4).await;
        assert_eq!(transport.total_calls(), 0, "No network call before the initial delay");

        sleep(2).await;
        assert_eq!(transport.calls(Method::Get, "/words"), 1);
        assert_eq!(handle.state().model, Some(vec!["fresh".to_string()]));
        assert!(!handle.state().from_cache);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_miss_loads_immediately() {
        let (ctx, transport, _dir) = context();
        transport.respond(Method::Get, "/words", 200, json!(["fresh"]));

        let start = Instant::now();
        let handle = ScreenHandle::mount(WordsScreen, ctx.clone(), RevalidatePolicy::default());
        assert!(handle.state().loading);
        assert!(handle.state().model.is_none());

        let mut rx = handle.subscribe();
        rx.wait_for(|state| !state.loading).await.unwrap();
        assert_eq!(transport.calls(Method::Get, "/words"), 1);
        assert_eq!(start.elapsed(), Duration::ZERO, "Load must not wait on any timer");
        assert_eq!(handle.state().model, Some(vec!["fresh".to_string()]));

        let persisted = ctx.local.get::<Vec<String>>("words").unwrap();
        assert_eq!(persisted.data, vec!["fresh".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recurring_passes_every_interval() {
        let (ctx, transport, _dir) = context();
        transport.respond(Method::Get, "/words", 200, json!(["w"]));

        let _handle = ScreenHandle::mount(WordsScreen, ctx, RevalidatePolicy::default());

        sleep(1).await;
        assert_eq!(transport.total_calls(), 1);
        sleep(60).await;
        assert_eq!(transport.total_calls(), 2);
        sleep(60).await;
        assert_eq!(transport.total_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_pass_keeps_last_good_state() {
        let (ctx, transport, _dir) = context();
        transport.respond(Method::Get, "/words", 503, json!({"message": "Maintenance"}));
        ctx.local.set("words", &vec!["cached".to_string()]);

        let handle = ScreenHandle::mount(WordsScreen, ctx, RevalidatePolicy::default());
        sleep(6).await;

        let state = handle.state();
        assert_eq!(state.model, Some(vec!["cached".to_string()]));
        assert_eq!(state.last_error.as_deref(), Some("Maintenance"));
        assert!(!state.not_found);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_not_found_clears_model() {
        let (ctx, transport, _dir) = context();
        transport.respond(Method::Get, "/words", 200, json!([]));

        let handle = ScreenHandle::mount(WordsScreen, ctx, RevalidatePolicy::default());
        sleep(1).await;

        let state = handle.state();
        assert!(state.not_found);
        assert!(!state.loading);
        assert!(state.model.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_skips_timer_passes() {
        let (ctx, transport, _dir) = context();
        transport.respond(Method::Get, "/words", 200, json!(["w"]));
        ctx.local.set("words", &vec!["cached".to_string()]);
        ctx.connectivity.set_online(false);

        let handle = ScreenHandle::mount(WordsScreen, ctx.clone(), RevalidatePolicy::default());
        sleep(130).await;
        assert_eq!(transport.total_calls(), 0);

        ctx.connectivity.set_online(true);
        sleep(60).await;
        assert_eq!(transport.total_calls(), 1);
        drop(handle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_runs_immediately() {
        let (ctx, transport, _dir) = context();
        transport.respond(Method::Get, "/words", 200, json!(["w"]));
        ctx.local.set("words", &vec!["cached".to_string()]);

        let handle = ScreenHandle::mount(WordsScreen, ctx, RevalidatePolicy::default());
        handle.refresh();
        sleep(1).await;

        assert_eq!(transport.total_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_stops_timers() {
        let (ctx, transport, _dir) = context();
        transport.respond(Method::Get, "/words", 200, json!(["w"]));
        ctx.local.set("words", &vec!["cached".to_string()]);

        let handle = ScreenHandle::mount(WordsScreen, ctx, RevalidatePolicy::default());
        sleep(2).await;
        handle.unmount();
        sleep(300).await;

        assert_eq!(transport.total_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_after_unmount_not_applied() {
        let (ctx, transport, _dir) = context();
        transport.respond(Method::Get, "/words", 200, json!(["late"]));
        transport.set_delay(Duration::from_secs(10));

        let handle = ScreenHandle::mount(WordsScreen, ctx.clone(), RevalidatePolicy::default());
        let rx = handle.subscribe();
        sleep(1).await;
        assert_eq!(transport.total_calls(), 1);
        handle.unmount();

        sleep(20).await;
        assert!(rx.borrow().model.is_none(), "Late result must not reach the state");
        assert!(rx.borrow().loading);
        // The network call itself still completed and was persisted
        assert!(ctx.local.get::<Vec<String>>("words").is_some());
    }
}
