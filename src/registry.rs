//! Per-key leading+trailing throttle.
//!
//! The first call for a key in a quiet period runs right away and arms a
//! single timer. Calls that land while that timer is live only replace the
//! pending action; when the timer fires the latest action runs once.
//! The deadline is fixed by the call that armed the timer.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::{
    sync::Notify,
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::debug;

use crate::throttler::Throttler;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(1000);

pub type Action = Arc<dyn Fn() + Send + Sync>;

struct Record {
    action: Action,
    timer: Option<JoinHandle<()>>,
    deadline: Option<Instant>,
}

/// Registry of throttled operations keyed by caller-chosen identifiers.
///
/// Cloning yields another handle onto the same table. Records are created
/// on first use and kept for as long as any handle (or live timer) exists.
#[derive(Clone, Default)]
pub struct Throttle {
    inner: Arc<Mutex<HashMap<String, Record>>>,
    idle: Arc<Notify>,
    // trailing actions currently running
    firing: Arc<AtomicUsize>,
}

impl Throttle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Throttles `action` under `key` with [`DEFAULT_COOLDOWN`].
    pub fn throttle<F>(&self, key: &str, action: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.throttle_with(key, action, DEFAULT_COOLDOWN);
    }

    pub fn keys(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn deadline(&self, key: &str) -> Option<Instant> {
        self.inner.lock().get(key).and_then(|record| record.deadline)
    }
}

impl Throttler for Throttle {
    fn throttle_with<F>(&self, key: &str, action: F, cooldown: Duration)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let action: Action = Arc::new(action);

        let leading = {
            let mut records = self.inner.lock();
            let record = records.entry(key.to_string()).or_insert_with(|| Record {
                action: action.clone(),
                timer: None,
                deadline: None,
            });
            record.action = action.clone();

            if record.timer.is_some() {
                debug!(key, "coalesced into pending call");
                None
            } else {
                let deadline = Instant::now() + cooldown;
                record.timer = Some(tokio::spawn(fire(self.clone(), key.to_string(), deadline)));
                record.deadline = Some(deadline);
                debug!(key, cooldown_ms = cooldown.as_millis() as u64, "timer armed");
                Some(action)
            }
        };

        // Never run callbacks under the lock: they may throttle again.
        if let Some(action) = leading {
            action();
        }
    }

    fn is_cooling(&self, key: &str) -> bool {
        self.inner
            .lock()
            .get(key)
            .is_some_and(|record| record.timer.is_some())
    }

    /// Resolves once no key has a live timer and no trailing call is running.
    async fn settled(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let (cooling, firing) = {
                let records = self.inner.lock();
                let cooling = records.values().filter(|record| record.timer.is_some()).count();
                (cooling, self.firing.load(Ordering::SeqCst))
            };
            if cooling == 0 && firing == 0 {
                return;
            }

            debug!(cooling, firing, "waiting for pending calls");
            notified.await;
        }
    }
}

async fn fire(state: Throttle, key: String, deadline: Instant) {
    time::sleep_until(deadline).await;

    let action = {
        let mut records = state.inner.lock();
        let Some(record) = records.get_mut(&key) else {
            return;
        };
        record.timer = None;
        record.deadline = None;
        state.firing.fetch_add(1, Ordering::SeqCst);
        record.action.clone()
    };

    let _firing = Firing(&state);
    debug!(key = %key, "cooldown elapsed, running pending call");
    action();
}

/// Marks a trailing call as finished, even when the action panics.
struct Firing<'a>(&'a Throttle);

impl Drop for Firing<'_> {
    fn drop(&mut self) {
        self.0.firing.fetch_sub(1, Ordering::SeqCst);
        self.0.idle.notify_waiters();
    }
}
