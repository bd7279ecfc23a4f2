//! Client-side resend cooldown. Purely cosmetic: the provider enforces its own
//! limits, this only keeps the resend button disabled while counting down.

use std::sync::Arc;
use tokio::{
    runtime::Handle,
    sync::watch,
    task::AbortHandle,
    time::{sleep, Duration},
};
use tracing::debug;

pub const RESEND_COOLDOWN_SECONDS: u32 = 120;
const TICK: Duration = Duration::from_secs(1);

/// Countdown from [`RESEND_COOLDOWN_SECONDS`] to zero in one-second ticks.
///
/// The ticking task is aborted when the cooldown is restarted, stopped, or
/// dropped, so no timer outlives its owner. Started outside a tokio runtime,
/// the counter holds at the full duration until [`ResendCooldown::resume`] runs
/// inside one.
pub struct ResendCooldown {
    seconds: u32,
    remaining: Arc<watch::Sender<u32>>,
    task: Option<AbortHandle>,
    deferred: bool,
}

impl Default for ResendCooldown {
    fn default() -> Self {
        Self::new()
    }
}

impl ResendCooldown {
    #[must_use]
    pub fn new() -> Self {
        Self::with_seconds(RESEND_COOLDOWN_SECONDS)
    }

    #[must_use]
    pub fn with_seconds(seconds: u32) -> Self {
        let (remaining, _) = watch::channel(0);
        Self {
            seconds,
            remaining: Arc::new(remaining),
            task: None,
            deferred: false,
        }
    }

    /// Starts (or restarts) the countdown at the full duration.
    pub fn start(&mut self) {
        self.stop();
        self.remaining.send_replace(self.seconds);
        self.deferred = true;
        self.resume();
    }

    /// Spawns the ticking task for a countdown whose start found no runtime.
    /// Does nothing once the countdown is ticking or has been stopped.
    pub fn resume(&mut self) {
        if !self.deferred {
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            debug!("no runtime yet, resend cooldown deferred");
            return;
        };

        let remaining = Arc::clone(&self.remaining);
        let handle = runtime.spawn(async move {
            loop {
                sleep(TICK).await;
                let mut left = 0;
                remaining.send_modify(|value| {
                    *value = value.saturating_sub(1);
                    left = *value;
                });
                if left == 0 {
                    break;
                }
            }
            debug!("resend cooldown finished");
        });

        self.deferred = false;
        self.task = Some(handle.abort_handle());
        debug!(remaining = self.remaining(), "resend cooldown ticking");
    }

    /// Cancels the ticking task, leaving the counter where it is.
    pub fn stop(&mut self) {
        self.deferred = false;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        *self.remaining.borrow()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.remaining() == 0
    }

    /// Watches the counter, e.g. to render the button label.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.remaining.subscribe()
    }
}

impl Drop for ResendCooldown {
    fn drop(&mut self) {
        self.stop();
    }
}
