//! Wall-clock scheduling for periodic captures.
//!
//! Capture times are anchored to whole calendar seconds. Each target is
//! computed from the current time rather than by sleeping a fixed amount, so
//! time spent capturing does not accumulate as drift.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDateTime, SubsecRound, TimeDelta};
use tracing::debug;

use crate::interrupt::{Interrupt, Wake};

/// Format of the timestamp embedded in snapshot file names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Wall clock plus an interruptible sleep.
pub trait Clock {
    /// Current local time.
    fn now(&self) -> NaiveDateTime;

    /// Blocks for `limit`, or until interrupted when `limit` is `None`.
    fn wait(&self, limit: Option<Duration>) -> Wake;

    fn interrupted(&self) -> bool;
}

/// The system clock, with sleeps cut short by an [`Interrupt`].
#[derive(Clone)]
pub struct SystemClock {
    interrupt: Interrupt,
}

impl SystemClock {
    pub fn new(interrupt: Interrupt) -> SystemClock {
        SystemClock { interrupt }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn wait(&self, limit: Option<Duration>) -> Wake {
        self.interrupt.wait(limit)
    }

    fn interrupted(&self) -> bool {
        self.interrupt.is_raised()
    }
}

/// `now + seconds`, truncated to a whole second.
pub fn next_boundary(now: NaiveDateTime, seconds: u64) -> NaiveDateTime {
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|offset| now.checked_add_signed(offset))
        .unwrap_or(NaiveDateTime::MAX)
        .trunc_subsecs(0)
}

/// Time left until `target`. Never negative.
pub fn delay_until(target: NaiveDateTime, now: NaiveDateTime) -> Duration {
    (target - now).to_std().unwrap_or(Duration::ZERO)
}

/// Sleeps until `target` unless interrupted first.
///
/// A target in the past does not sleep at all.
pub fn wait_until<C: Clock>(clock: &C, target: NaiveDateTime) -> Wake {
    let delay = delay_until(target, clock.now());
    debug!("Sleeping for {:.6} seconds", delay.as_secs_f64());

    if delay.is_zero() {
        if clock.interrupted() {
            return Wake::Interrupted;
        }
        return Wake::Elapsed;
    }
    clock.wait(Some(delay))
}

/// Path of the image captured at `timestamp`, e.g. `dir/img2024-03-01-12-00-05.jpg`.
pub fn snapshot_path(dir: &Path, timestamp: NaiveDateTime) -> PathBuf {
    dir.join(format!("img{}.jpg", timestamp.format(TIMESTAMP_FORMAT)))
}
