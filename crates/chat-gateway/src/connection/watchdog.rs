//! Idle watchdog
//!
//! One timer per session. Every inbound line resets it to the full window;
//! if the window passes with no line, the watchdog expires exactly once.

use std::pin::Pin;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, Sleep};

/// Handle the read loop uses to report inbound activity
#[derive(Debug, Clone)]
pub struct Liveness {
    signals: mpsc::Sender<()>,
}

impl Liveness {
    /// Report activity. Never blocks.
    pub fn signal(&self) {
        // A full queue already holds a pending reset
        let _ = self.signals.try_send(());
    }
}

/// Per-session idle timer
pub struct Watchdog {
    window: Duration,
    timer: Pin<Box<Sleep>>,
    signals: mpsc::Receiver<()>,
}

impl Watchdog {
    /// Arm a watchdog with a full window starting now
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(window: Duration) -> (Self, Liveness) {
        let (tx, rx) = mpsc::channel(1);

        let watchdog = Self {
            window,
            timer: Box::pin(tokio::time::sleep(window)),
            signals: rx,
        };

        (watchdog, Liveness { signals: tx })
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Current deadline
    pub fn deadline(&self) -> Instant {
        self.timer.deadline()
    }

    /// Push the deadline out to a full window from now
    ///
    /// A fire that already happened but was never observed is discarded
    /// first, so it cannot surface as an expiry of the new deadline.
    fn reset(&mut self) {
        if self.timer.is_elapsed() {
            tracing::trace!("Discarding unobserved idle expiry");
        }
        self.timer.as_mut().reset(Instant::now() + self.window);
    }

    /// Resolve when the session has been idle for a full window
    ///
    /// Pending liveness signals always win over a simultaneous expiry. Once
    /// every `Liveness` handle is dropped the deadline is final.
    pub async fn expired(mut self) {
        let mut listening = true;

        loop {
            tokio::select! {
                biased;
                signal = self.signals.recv(), if listening => match signal {
                    Some(()) => self.reset(),
                    None => listening = false,
                },
                () = &mut self.timer => return,
            }
        }
    }
}

impl std::fmt::Debug for Watchdog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watchdog")
            .field("window", &self.window)
            .field("deadline", &self.timer.deadline())
            .finish()
    }
}
