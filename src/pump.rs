//! Stdin event source driving the registry.
//!
//! Each non-empty line is one event. `@key payload` routes the payload under
//! `key`, anything else goes under the default key.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use crate::throttler::Throttler;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub events: usize,
    pub dispatched: usize,
}

pub async fn run<T, R>(throttler: &T, default_key: &str, cooldown: Duration, input: R) -> Result<PumpReport>
where
    T: Throttler,
    R: AsyncBufRead + Unpin,
{
    let dispatched = Arc::new(AtomicUsize::new(0));
    let mut events = 0;
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await.context("failed to read event")? {
        let Some((key, payload)) = route(&line, default_key) else {
            continue;
        };
        events += 1;

        let counter = dispatched.clone();
        let (key_owned, payload) = (key.to_string(), payload.to_string());
        throttler.throttle_with(
            key,
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                info!(key = %key_owned, payload = %payload, n, "dispatch");
            },
            cooldown,
        );
    }

    throttler.settled().await;

    Ok(PumpReport {
        events,
        dispatched: dispatched.load(Ordering::SeqCst),
    })
}

fn route<'a>(line: &'a str, default_key: &'a str) -> Option<(&'a str, &'a str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match line.strip_prefix('@') {
        Some(rest) => {
            let (key, payload) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let key = if key.is_empty() { default_key } else { key };
            Some((key, payload.trim_start()))
        }
        None => Some((default_key, line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Throttle;
    use tokio::{io::BufReader, time::Instant};

    #[test]
    fn routes_prefixed_lines() {
        assert_eq!(route("@save  doc 1", "search"), Some(("save", "doc 1")));
        assert_eq!(route("@save", "search"), Some(("save", "")));
        assert_eq!(route("@ hello", "search"), Some(("search", "hello")));
        assert_eq!(route("  hello world ", "search"), Some(("search", "hello world")));
        assert_eq!(route("   ", "search"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_into_two_dispatches() {
        let throttle = Throttle::new();
        let input = BufReader::new(&b"r\nru\nrus\n\nrust\n"[..]);

        let report = run(&throttle, "search", Duration::from_millis(500), input)
            .await
            .unwrap();

        assert_eq!(report, PumpReport { events: 4, dispatched: 2 });
        assert!(!throttle.is_cooling("search"));
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_pumped_independently() {
        let throttle = Throttle::new();
        let input = BufReader::new(&b"@x one\n@y two\nthree\n@x four\n"[..]);
        let start = Instant::now();

        let report = run(&throttle, "search", Duration::from_millis(200), input)
            .await
            .unwrap();

        // three keys, each with a leading and a trailing dispatch
        assert_eq!(report, PumpReport { events: 4, dispatched: 6 });
        assert_eq!(throttle.keys(), 3);
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_dispatches_nothing() {
        let throttle = Throttle::new();
        let report = run(&throttle, "search", Duration::from_millis(200), BufReader::new(&b""[..]))
            .await
            .unwrap();
        assert_eq!(report, PumpReport::default());
    }
}
