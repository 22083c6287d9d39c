use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::CaptureError;

/// How an interruptible wait ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wake {
    Elapsed,
    Interrupted,
}

#[derive(Default)]
struct Shared {
    raised: Mutex<bool>,
    cond: Condvar,
}

/// A one-shot shutdown flag that cuts interruptible waits short.
///
/// Clones share the same flag.
#[derive(Clone, Default)]
pub struct Interrupt {
    shared: Arc<Shared>,
}

impl Interrupt {
    pub fn new() -> Interrupt {
        Interrupt::default()
    }

    /// Raises this interrupt on SIGINT or SIGTERM.
    ///
    /// Can be called once per process.
    pub fn install(&self) -> Result<(), CaptureError> {
        let interrupt = self.clone();
        ctrlc::set_handler(move || interrupt.raise())?;
        Ok(())
    }

    pub fn raise(&self) {
        let mut raised = self.shared.raised.lock();
        *raised = true;
        self.shared.cond.notify_all();
    }

    pub fn is_raised(&self) -> bool {
        *self.shared.raised.lock()
    }

    /// Blocks until `limit` has passed or the interrupt is raised.
    ///
    /// `None` waits for the interrupt only.
    pub fn wait(&self, limit: Option<Duration>) -> Wake {
        let deadline = limit.and_then(|limit| Instant::now().checked_add(limit));
        let mut raised = self.shared.raised.lock();

        while !*raised {
            match deadline {
                Some(deadline) => {
                    if self.shared.cond.wait_until(&mut raised, deadline).timed_out() {
                        break;
                    }
                }
                None => self.shared.cond.wait(&mut raised),
            }
        }

        if *raised {
            Wake::Interrupted
        } else {
            Wake::Elapsed
        }
    }
}
