use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::refresh::errors::{RefreshError, SourceError};
use crate::refresh::status::format_time_since;
use crate::refresh::types::{
    RefreshCallback, RefreshConfig, RefreshOutcome, RefreshReport, RefreshSnapshot, SourceOutcome,
};

/// Output of one spawned callback: its key and the caught result.
type CallbackResult = (String, std::thread::Result<Result<(), String>>);

/// Runs every registered refresh callback on a shared cadence.
///
/// Widgets register a keyed async reload operation and the coordinator runs
/// all of them in parallel, either when its timer fires or when
/// [`refresh`](Self::refresh) is called. At most one cycle is in flight; a
/// request that arrives during a cycle is dropped.
///
/// The timer only runs while the coordinator is enabled and at least one
/// callback is registered. Dropping the coordinator stops it; a timer-started
/// cycle already in flight still settles and records its completion time.
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    callbacks: Mutex<HashMap<String, RefreshCallback>>,
    refreshing: AtomicBool,
    last_update: Mutex<Option<DateTime<Utc>>>,
    config: Mutex<RefreshConfig>,
    timer: Mutex<Option<JoinHandle<()>>>,
    state_tx: watch::Sender<RefreshSnapshot>,
    runtime: Handle,
}

/// Callbacks never run while a lock is held, so a poisoned lock still
/// guards consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn validate_interval(config: &RefreshConfig) -> Result<(), RefreshError> {
    if config.interval.is_zero() {
        return Err(RefreshError::InvalidInterval);
    }
    Ok(())
}

impl RefreshCoordinator {
    /// Create a coordinator bound to the current tokio runtime.
    ///
    /// # Errors
    ///
    /// `NoRuntime` when called outside a runtime, `InvalidInterval` for a
    /// zero interval.
    pub fn new(config: RefreshConfig) -> Result<Self, RefreshError> {
        let runtime = Handle::try_current().map_err(|_| RefreshError::NoRuntime)?;
        Self::with_runtime(config, runtime)
    }

    /// Create a coordinator that spawns its timer and callbacks on `runtime`.
    pub fn with_runtime(config: RefreshConfig, runtime: Handle) -> Result<Self, RefreshError> {
        validate_interval(&config)?;

        let (state_tx, _) = watch::channel(RefreshSnapshot::default());

        info!(
            event = "core.refresh.coordinator_created",
            interval_ms = config.interval.as_millis() as u64,
            enabled = config.enabled,
        );

        Ok(Self {
            inner: Arc::new(Inner {
                callbacks: Mutex::new(HashMap::new()),
                refreshing: AtomicBool::new(false),
                last_update: Mutex::new(None),
                config: Mutex::new(config),
                timer: Mutex::new(None),
                state_tx,
                runtime,
            }),
        })
    }

    /// Add or replace the callback for `key`. Last registration wins.
    ///
    /// The callback's error only needs to be displayable; it is recorded
    /// against `key` in the cycle report and never propagated.
    pub fn register<F, Fut, E>(&self, key: impl Into<String>, operation: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let key = key.into();
        let callback: RefreshCallback = Arc::new(move || {
            operation()
                .map(|result| result.map_err(|e| e.to_string()))
                .boxed()
        });

        let replaced = lock(&self.inner.callbacks)
            .insert(key.clone(), callback)
            .is_some();

        debug!(
            event = "core.refresh.callback_registered",
            key = %key,
            replaced = replaced,
        );

        self.inner.sync_timer();
        self.inner.publish();
    }

    /// Remove the callback for `key`. Returns whether it was registered.
    ///
    /// A cycle already in flight still runs the removed callback.
    pub fn unregister(&self, key: &str) -> bool {
        let removed = lock(&self.inner.callbacks).remove(key).is_some();
        if !removed {
            return false;
        }

        debug!(event = "core.refresh.callback_unregistered", key = key);

        self.inner.sync_timer();
        self.inner.publish();
        true
    }

    /// Run one refresh cycle over every registered callback.
    ///
    /// The in-progress check and the registry snapshot happen when this is
    /// called, not when the returned future is first polled, and the
    /// callbacks start immediately. Awaiting yields
    /// [`RefreshOutcome::Skipped`] if another cycle was already running.
    ///
    /// Dropping the future before it settles aborts the outstanding
    /// callbacks and ends the cycle without updating the timestamp.
    pub fn refresh(&self) -> impl Future<Output = RefreshOutcome> + Send + 'static {
        self.inner.refresh()
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.refreshing.load(Ordering::Acquire)
    }

    /// Time the most recent cycle completed, if any.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *lock(&self.inner.last_update)
    }

    /// Relative time since the last completed cycle, e.g. "12s ago" or "Never".
    pub fn time_since_last_update(&self) -> String {
        format_time_since(self.last_update(), Utc::now())
    }

    pub fn snapshot(&self) -> RefreshSnapshot {
        self.inner.snapshot()
    }

    /// Receive a new snapshot whenever the coordinator's state changes.
    pub fn subscribe(&self) -> watch::Receiver<RefreshSnapshot> {
        self.inner.state_tx.subscribe()
    }

    pub fn config(&self) -> RefreshConfig {
        *lock(&self.inner.config)
    }

    /// Replace the cadence parameters and re-arm the timer with them.
    pub fn reconfigure(&self, config: RefreshConfig) -> Result<(), RefreshError> {
        validate_interval(&config)?;
        self.inner.apply_config(config);
        Ok(())
    }

    /// Turn timed refreshes on or off, keeping the current interval.
    pub fn set_enabled(&self, enabled: bool) {
        let config = RefreshConfig {
            enabled,
            ..self.config()
        };
        self.inner.apply_config(config);
    }

    /// Whether the recurring timer is currently armed.
    pub fn is_scheduled(&self) -> bool {
        lock(&self.inner.timer).is_some()
    }

    /// Registered keys, sorted.
    pub fn registered_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = lock(&self.inner.callbacks).keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Stop the timer and release the coordinator.
    pub fn shutdown(self) {
        info!(event = "core.refresh.shutdown_started");
    }
}

impl Drop for RefreshCoordinator {
    fn drop(&mut self) {
        self.inner.disarm_timer("coordinator_dropped");
    }
}

impl Inner {
    fn refresh(self: &Arc<Self>) -> impl Future<Output = RefreshOutcome> + Send + 'static {
        let cycle = Cycle::start(self);
        async move {
            match cycle {
                Some(cycle) => RefreshOutcome::Completed(cycle.settle().await),
                None => RefreshOutcome::Skipped,
            }
        }
    }

    /// Store an already validated config and re-arm the timer with it.
    fn apply_config(self: &Arc<Self>, config: RefreshConfig) {
        *lock(&self.config) = config;

        info!(
            event = "core.refresh.reconfigured",
            interval_ms = config.interval.as_millis() as u64,
            enabled = config.enabled,
        );

        self.rearm_timer();
    }

    fn snapshot(&self) -> RefreshSnapshot {
        RefreshSnapshot {
            is_refreshing: self.refreshing.load(Ordering::Acquire),
            last_update: *lock(&self.last_update),
            source_count: lock(&self.callbacks).len(),
        }
    }

    /// Publish the current state. Built under the channel lock so that
    /// concurrent publishers cannot leave an older snapshot in place.
    fn publish(&self) {
        self.state_tx.send_modify(|current| *current = self.snapshot());
    }

    fn should_schedule(&self) -> bool {
        lock(&self.config).enabled && !lock(&self.callbacks).is_empty()
    }

    /// Arm or disarm the timer to match the registry and config.
    fn sync_timer(self: &Arc<Self>) {
        let mut timer = lock(&self.timer);
        match (self.should_schedule(), timer.is_some()) {
            (true, false) => *timer = Some(self.spawn_timer()),
            (false, true) => {
                if let Some(handle) = timer.take() {
                    handle.abort();
                    debug!(event = "core.refresh.timer_disarmed", reason = "no_work");
                }
            }
            _ => {}
        }
    }

    fn rearm_timer(self: &Arc<Self>) {
        let mut timer = lock(&self.timer);
        if let Some(handle) = timer.take() {
            handle.abort();
            debug!(event = "core.refresh.timer_disarmed", reason = "reconfigured");
        }
        if self.should_schedule() {
            *timer = Some(self.spawn_timer());
        }
    }

    fn disarm_timer(&self, reason: &'static str) {
        if let Some(handle) = lock(&self.timer).take() {
            handle.abort();
            debug!(event = "core.refresh.timer_disarmed", reason = reason);
        }
    }

    fn spawn_timer(self: &Arc<Self>) -> JoinHandle<()> {
        let period = lock(&self.config).interval;
        let weak = Arc::downgrade(self);

        info!(
            event = "core.refresh.timer_armed",
            interval_ms = period.as_millis() as u64
        );

        self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                debug!(event = "core.refresh.timer_tick");
                // Each cycle runs as its own task so disarming the timer
                // stops future ticks without cancelling a cycle in flight.
                inner.runtime.spawn(inner.refresh());
            }
        })
    }
}

/// One in-flight refresh cycle. Dropping it clears the in-progress flag.
struct Cycle {
    inner: Arc<Inner>,
    tasks: JoinSet<CallbackResult>,
    started_at: DateTime<Utc>,
    settled: bool,
}

impl Cycle {
    /// Claim the in-progress flag and spawn every registered callback.
    /// Returns `None` if a cycle is already running.
    fn start(inner: &Arc<Inner>) -> Option<Self> {
        if inner
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(
                event = "core.refresh.cycle_skipped",
                reason = "cycle_in_progress"
            );
            return None;
        }

        let started_at = Utc::now();
        let callbacks: Vec<(String, RefreshCallback)> = lock(&inner.callbacks)
            .iter()
            .map(|(key, callback)| (key.clone(), Arc::clone(callback)))
            .collect();

        info!(
            event = "core.refresh.cycle_started",
            source_count = callbacks.len()
        );

        let mut tasks = JoinSet::new();
        for (key, callback) in callbacks {
            tasks.spawn_on(
                async move {
                    let result = AssertUnwindSafe(async move { callback().await })
                        .catch_unwind()
                        .await;
                    (key, result)
                },
                &inner.runtime,
            );
        }

        let cycle = Self {
            inner: Arc::clone(inner),
            tasks,
            started_at,
            settled: false,
        };
        inner.publish();
        Some(cycle)
    }

    /// Wait for every callback to settle, then record the completion time.
    async fn settle(mut self) -> RefreshReport {
        let mut outcomes = Vec::with_capacity(self.tasks.len());

        while let Some(joined) = self.tasks.join_next().await {
            let (key, result) = match joined {
                Ok(joined) => joined,
                Err(e) => {
                    warn!(event = "core.refresh.source_task_aborted", error = %e);
                    continue;
                }
            };

            let error = match result {
                Ok(Ok(())) => None,
                Ok(Err(message)) => Some(SourceError::Failed {
                    key: key.clone(),
                    message,
                }),
                Err(payload) => Some(SourceError::from_panic(&key, payload)),
            };

            if let Some(error) = &error {
                warn!(
                    event = "core.refresh.source_failed",
                    key = %key,
                    error = %error,
                );
            }

            outcomes.push(SourceOutcome { key, error });
        }

        outcomes.sort_by(|a, b| a.key.cmp(&b.key));

        let completed_at = Utc::now();
        *lock(&self.inner.last_update) = Some(completed_at);
        self.settled = true;

        let report = RefreshReport {
            started_at: self.started_at,
            completed_at,
            outcomes,
        };

        info!(
            event = "core.refresh.cycle_completed",
            succeeded = report.succeeded(),
            failed = report.failed(),
            duration_ms = (completed_at - self.started_at).num_milliseconds(),
        );

        report
    }
}

impl Drop for Cycle {
    fn drop(&mut self) {
        if !self.settled {
            self.tasks.abort_all();
            debug!(event = "core.refresh.cycle_cancelled");
        }
        self.inner.refreshing.store(false, Ordering::Release);
        self.inner.publish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn register_counting(coordinator: &RefreshCoordinator, key: &str, count: &Arc<AtomicUsize>) {
        let count = Arc::clone(count);
        coordinator.register(key, move || {
            let count = Arc::clone(&count);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Ok::<(), String>(())
            }
        });
    }

    /// Register a callback that waits for a permit on `gate` before finishing.
    fn register_gated(
        coordinator: &RefreshCoordinator,
        key: &str,
        count: &Arc<AtomicUsize>,
        gate: &Arc<Semaphore>,
    ) {
        let count = Arc::clone(count);
        let gate = Arc::clone(gate);
        coordinator.register(key, move || {
            let count = Arc::clone(&count);
            let gate = Arc::clone(&gate);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                let _permit = gate.acquire().await.map_err(|e| e.to_string())?;
                Ok::<(), String>(())
            }
        });
    }

    fn ok_to_panic() -> bool {
        true
    }

    fn keys(outcome: &RefreshOutcome) -> Vec<String> {
        outcome
            .report()
            .map(|r| r.outcomes.iter().map(|o| o.key.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        let result = RefreshCoordinator::new(RefreshConfig::default());
        assert!(matches!(result, Err(RefreshError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_zero_interval_rejected() {
        let result = RefreshCoordinator::new(RefreshConfig::new(Duration::ZERO, true));
        assert!(matches!(result, Err(RefreshError::InvalidInterval)));

        let coordinator = RefreshCoordinator::new(RefreshConfig::default()).unwrap();
        assert!(
            coordinator
                .reconfigure(RefreshConfig::new(Duration::ZERO, true))
                .is_err()
        );
        assert_eq!(coordinator.config(), RefreshConfig::default());
    }

    #[tokio::test]
    async fn test_refresh_runs_exactly_registered_set() {
        let coordinator = RefreshCoordinator::new(RefreshConfig::default()).unwrap();
        let a = counter();
        let b = counter();
        let c = counter();
        register_counting(&coordinator, "a", &a);
        register_counting(&coordinator, "b", &b);
        register_counting(&coordinator, "c", &c);
        assert!(coordinator.unregister("b"));
        assert!(!coordinator.unregister("missing"));

        let outcome = coordinator.refresh().await;

        assert_eq!(keys(&outcome), vec!["a", "c"]);
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 0);
        assert_eq!(c.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.registered_keys(), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_register_same_key_replaces() {
        let coordinator = RefreshCoordinator::new(RefreshConfig::default()).unwrap();
        let first = counter();
        let second = counter();
        register_counting(&coordinator, "vehicles", &first);
        register_counting(&coordinator, "vehicles", &second);

        coordinator.refresh().await;

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.snapshot().source_count, 1);
    }

    #[tokio::test]
    async fn test_overlapping_refresh_is_dropped() {
        let coordinator = RefreshCoordinator::new(RefreshConfig::default()).unwrap();
        let count = counter();
        let gate = Arc::new(Semaphore::new(0));
        register_gated(&coordinator, "slow", &count, &gate);

        let first = coordinator.refresh();
        assert!(coordinator.is_refreshing());

        let second = coordinator.refresh().await;
        assert!(second.is_skipped());

        gate.add_permits(1);
        let first = first.await;
        assert!(!first.is_skipped());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn test_empty_registry_still_completes() {
        let coordinator = RefreshCoordinator::new(RefreshConfig::default()).unwrap();
        assert!(coordinator.last_update().is_none());
        assert_eq!(coordinator.time_since_last_update(), "Never");

        let before = Utc::now();
        let pending = coordinator.refresh();
        assert!(coordinator.is_refreshing());

        let outcome = pending.await;
        let report = outcome.report().unwrap();
        assert!(report.outcomes.is_empty());
        assert!(!coordinator.is_refreshing());
        assert!(coordinator.last_update().unwrap() >= before);
        assert_eq!(coordinator.time_since_last_update(), "0s ago");
    }

    #[tokio::test]
    async fn test_failures_are_contained() {
        let coordinator = RefreshCoordinator::new(RefreshConfig::default()).unwrap();
        let ok = counter();
        register_counting(&coordinator, "ok", &ok);
        coordinator.register("rejects", || async { Err::<(), _>("backend unavailable") });
        coordinator.register("panics", || async {
            if ok_to_panic() {
                panic!("widget exploded");
            }
            Ok::<(), String>(())
        });

        let outcome = coordinator.refresh().await;
        let report = outcome.report().unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(ok.load(Ordering::SeqCst), 1);
        let errors: Vec<&SourceError> = report.errors().collect();
        assert_eq!(
            errors[0],
            &SourceError::Panicked {
                key: "panics".to_string(),
                message: "widget exploded".to_string(),
            }
        );
        assert_eq!(
            errors[1],
            &SourceError::Failed {
                key: "rejects".to_string(),
                message: "backend unavailable".to_string(),
            }
        );
        assert_eq!(coordinator.last_update(), Some(report.completed_at));
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_settles_after_slowest_source() {
        let coordinator = RefreshCoordinator::new(RefreshConfig::default()).unwrap();
        let a = counter();
        let b = counter();
        register_counting(&coordinator, "a", &a);
        let b_count = Arc::clone(&b);
        coordinator.register("b", move || {
            let b_count = Arc::clone(&b_count);
            async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                b_count.fetch_add(1, Ordering::SeqCst);
                Ok::<(), String>(())
            }
        });

        let started = Instant::now();
        let pending = tokio::spawn(coordinator.refresh());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(coordinator.is_refreshing());
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 0);

        let outcome = pending.await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert_eq!(keys(&outcome), vec!["a", "b"]);
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn test_registry_changes_do_not_affect_inflight_cycle() {
        let coordinator = RefreshCoordinator::new(RefreshConfig::default()).unwrap();
        let gated = counter();
        let late = counter();
        let gate = Arc::new(Semaphore::new(0));
        register_gated(&coordinator, "gated", &gated, &gate);

        let pending = coordinator.refresh();
        register_counting(&coordinator, "late", &late);
        coordinator.unregister("gated");
        gate.add_permits(1);

        let outcome = pending.await;
        assert_eq!(keys(&outcome), vec!["gated"]);
        assert_eq!(late.load(Ordering::SeqCst), 0);

        let outcome = coordinator.refresh().await;
        assert_eq!(keys(&outcome), vec!["late"]);
        assert_eq!(late.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_refresh_clears_flag_without_timestamp() {
        let coordinator = RefreshCoordinator::new(RefreshConfig::default()).unwrap();
        let count = counter();
        let gate = Arc::new(Semaphore::new(0));
        register_gated(&coordinator, "stuck", &count, &gate);

        let pending = coordinator.refresh();
        assert!(coordinator.is_refreshing());
        drop(pending);

        assert!(!coordinator.is_refreshing());
        assert!(coordinator.last_update().is_none());

        gate.add_permits(1);
        assert!(!coordinator.refresh().await.is_skipped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_not_armed_until_registration() {
        let coordinator =
            RefreshCoordinator::new(RefreshConfig::new(Duration::from_millis(1000), true)).unwrap();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(!coordinator.is_scheduled());
        assert!(coordinator.last_update().is_none());

        let count = counter();
        register_counting(&coordinator, "vehicles", &count);
        assert!(coordinator.is_scheduled());

        // First tick lands one interval after arming, not immediately.
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(coordinator.last_update().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unregistering_last_callback_disarms_timer() {
        let coordinator =
            RefreshCoordinator::new(RefreshConfig::new(Duration::from_millis(100), true)).unwrap();
        let count = counter();
        register_counting(&coordinator, "drivers", &count);
        assert!(coordinator.is_scheduled());

        coordinator.unregister("drivers");
        assert!(!coordinator.is_scheduled());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_coordinator_only_refreshes_manually() {
        let coordinator =
            RefreshCoordinator::new(RefreshConfig::new(Duration::from_millis(100), false)).unwrap();
        let count = counter();
        register_counting(&coordinator, "alerts", &count);
        assert!(!coordinator.is_scheduled());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        coordinator.refresh().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        coordinator.set_enabled(true);
        assert!(coordinator.is_scheduled());
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        coordinator.set_enabled(false);
        assert!(!coordinator.is_scheduled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_rearms_with_new_interval() {
        let coordinator =
            RefreshCoordinator::new(RefreshConfig::new(Duration::from_millis(1000), true)).unwrap();
        let count = counter();
        register_counting(&coordinator, "users", &count);

        tokio::time::sleep(Duration::from_millis(500)).await;
        coordinator
            .reconfigure(RefreshConfig::new(Duration::from_millis(200), true))
            .unwrap();
        assert!(coordinator.is_scheduled());

        tokio::time::sleep(Duration::from_millis(650)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    /// Register a callback that sleeps for `delay` and then counts.
    fn register_slow(
        coordinator: &RefreshCoordinator,
        key: &str,
        delay: Duration,
        count: &Arc<AtomicUsize>,
    ) {
        let count = Arc::clone(count);
        coordinator.register(key, move || {
            let count = Arc::clone(&count);
            async move {
                tokio::time::sleep(delay).await;
                count.fetch_add(1, Ordering::SeqCst);
                Ok::<(), String>(())
            }
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_unregister_during_timer_cycle_lets_it_settle() {
        let coordinator =
            RefreshCoordinator::new(RefreshConfig::new(Duration::from_millis(100), true)).unwrap();
        let done = counter();
        register_slow(&coordinator, "slow", Duration::from_millis(50), &done);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(coordinator.is_refreshing());

        coordinator.unregister("slow");
        assert!(!coordinator.is_scheduled());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert!(coordinator.last_update().is_some());
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_during_timer_cycle_lets_it_settle() {
        let coordinator =
            RefreshCoordinator::new(RefreshConfig::new(Duration::from_millis(100), true)).unwrap();
        let done = counter();
        register_slow(&coordinator, "slow", Duration::from_millis(50), &done);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(coordinator.is_refreshing());

        coordinator.set_enabled(false);
        assert!(!coordinator.is_scheduled());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert!(coordinator.last_update().is_some());
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_during_timer_cycle_lets_it_settle() {
        let coordinator =
            RefreshCoordinator::new(RefreshConfig::new(Duration::from_millis(100), true)).unwrap();
        let done = counter();
        register_slow(&coordinator, "slow", Duration::from_millis(50), &done);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(coordinator.is_refreshing());

        coordinator
            .reconfigure(RefreshConfig::new(Duration::from_millis(1000), true))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert!(coordinator.last_update().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_during_timer_cycle_lets_it_settle() {
        let done = counter();
        let coordinator =
            RefreshCoordinator::new(RefreshConfig::new(Duration::from_millis(100), true)).unwrap();
        register_slow(&coordinator, "slow", Duration::from_millis(50), &done);

        tokio::time::sleep(Duration::from_millis(120)).await;
        drop(coordinator);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_timer() {
        let count = counter();
        {
            let coordinator =
                RefreshCoordinator::new(RefreshConfig::new(Duration::from_millis(100), true))
                    .unwrap();
            register_counting(&coordinator, "clients", &count);
            tokio::time::sleep(Duration::from_millis(150)).await;
            assert_eq!(count.load(Ordering::SeqCst), 1);
        }

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_subscribe_tracks_cycle_completion() {
        let coordinator = RefreshCoordinator::new(RefreshConfig::default()).unwrap();
        let mut rx = coordinator.subscribe();
        assert_eq!(*rx.borrow_and_update(), RefreshSnapshot::default());

        let count = counter();
        register_counting(&coordinator, "integrations", &count);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().source_count, 1);

        coordinator.refresh().await;
        let snapshot = *rx.borrow_and_update();
        assert!(!snapshot.is_refreshing);
        assert_eq!(snapshot.last_update, coordinator.last_update());
    }
}
