use std::{future::Future, time::Duration};

pub trait Throttler {
    /// Runs `action` now if `key` is idle, otherwise makes it the call that
    /// runs when the live timer fires. Each call replaces the pending action,
    /// so after a quiet period the new `action` is the one that runs.
    fn throttle_with<F>(&self, key: &str, action: F, cooldown: Duration)
    where
        F: Fn() + Send + Sync + 'static;

    fn is_cooling(&self, key: &str) -> bool;

    fn settled(&self) -> impl Future<Output = ()> + Send + '_;
}
