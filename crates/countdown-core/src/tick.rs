//! The one-second recompute tick.
//!
//! The tick only re-derives display values from already fetched state. It
//! never talks to the backend and never mutates the store.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::bridge::HostRuntime;
use crate::display::DisplaySnapshot;
use crate::store::SessionStore;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Stops a running [`Ticker`] from rescheduling itself.
#[derive(Debug, Clone, Default)]
pub struct TickHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TickHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    handle: TickHandle,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: TickHandle::default(),
        }
    }

    pub fn handle(&self) -> TickHandle {
        self.handle.clone()
    }

    /// Sleeps, then ticks, until cancelled. Returns how many ticks ran.
    pub async fn run<S, F, T>(&self, mut sleep: S, mut on_tick: T) -> u64
    where
        S: FnMut(Duration) -> F,
        F: Future<Output = ()>,
        T: FnMut(),
    {
        let mut ticks = 0;
        while !self.handle.is_cancelled() {
            sleep(self.interval).await;
            if self.handle.is_cancelled() {
                break;
            }
            on_tick();
            ticks += 1;
        }
        debug!(ticks, "ticker stopped");
        ticks
    }

    /// Runs the tick against `store`, handing each fresh snapshot to `render`.
    /// Ticks with no timers are skipped entirely.
    pub async fn drive<H, C, S, F, R>(&self, store: &SessionStore<H>, clock: C, sleep: S, mut render: R) -> u64
    where
        H: HostRuntime,
        C: Fn() -> i64,
        S: FnMut(Duration) -> F,
        F: Future<Output = ()>,
        R: FnMut(DisplaySnapshot),
    {
        self.run(sleep, || match store.snapshot(clock()) {
            Some(snapshot) => render(snapshot),
            None => trace!("no timers; skipping recompute"),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::future::ready;
    use std::time::Duration;

    use super::{TICK_INTERVAL, Ticker};

    #[tokio::test]
    async fn stops_rescheduling_once_cancelled() {
        let ticker = Ticker::default();
        let handle = ticker.handle();
        let seen = Cell::new(0);

        let ticks = ticker
            .run(
                |interval| {
                    assert_eq!(interval, TICK_INTERVAL);
                    ready(())
                },
                || {
                    seen.set(seen.get() + 1);
                    if seen.get() == 3 {
                        handle.cancel();
                    }
                },
            )
            .await;

        assert_eq!(ticks, 3);
        assert_eq!(seen.get(), 3);
    }

    #[tokio::test]
    async fn cancel_during_sleep_skips_the_pending_tick() {
        let ticker = Ticker::new(Duration::from_millis(5));
        let handle = ticker.handle();
        let ticked = Cell::new(false);

        let ticks = ticker
            .run(
                |_| {
                    handle.cancel();
                    ready(())
                },
                || ticked.set(true),
            )
            .await;

        assert_eq!(ticks, 0);
        assert!(!ticked.get());
    }
}
