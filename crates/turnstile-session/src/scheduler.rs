//! One-shot proactive renewal timer.
//!
//! The scheduler owns at most one outstanding timer per instance. Every
//! `arm` cancels and replaces; timers are never stacked. The timer is a
//! plain tokio task held by handle — aborting the handle is the
//! cancellation path, and dropping the scheduler aborts too, so there is
//! never a detached timer with no owner.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

use turnstile_protocol::unix_now;

/// Invoked when the renewal timer fires.
pub(crate) type RefreshHook = Arc<dyn Fn() + Send + Sync>;

struct ArmedTimer {
    id: u64,
    delay: Duration,
    handle: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

/// Schedules one proactive silent refresh ahead of token expiry.
pub struct RefreshScheduler {
    hook: RefreshHook,
    renewal_lead: Duration,
    next_timer_id: u64,
    armed: Option<ArmedTimer>,
}

impl RefreshScheduler {
    /// Creates a disarmed scheduler. `hook` runs exactly once per fire,
    /// on the timer task.
    pub fn new(
        renewal_lead: Duration,
        hook: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            hook: Arc::new(hook),
            renewal_lead,
            next_timer_id: 0,
            armed: None,
        }
    }

    /// Arms the timer for `expires_at_unix - renewal_lead`, cancelling
    /// any outstanding timer first.
    ///
    /// If that instant is now or already past, the timer is left
    /// disarmed rather than fired immediately: a token already inside
    /// its renewal window is left to the next explicit check, so a burst
    /// of arms (startup restore, rapid logins) cannot trigger a burst of
    /// unscheduled refreshes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self, expires_at_unix: i64) {
        self.disarm();

        let lead = self.renewal_lead.as_secs() as i64;
        let delay_secs = expires_at_unix - unix_now() - lead;
        if delay_secs <= 0 {
            tracing::debug!(
                expires_at_unix,
                "token already inside its renewal window; leaving renewal to the next explicit check"
            );
            return;
        }

        self.next_timer_id += 1;
        let id = self.next_timer_id;
        let delay = Duration::from_secs(delay_secs as u64);
        let fired = Arc::new(AtomicBool::new(false));

        let hook = Arc::clone(&self.hook);
        let fired_flag = Arc::clone(&fired);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fired_flag.store(true, Ordering::SeqCst);
            tracing::debug!(timer_id = id, "refresh timer fired");
            (hook)();
        });

        tracing::debug!(timer_id = id, delay_secs, "refresh timer armed");
        self.armed = Some(ArmedTimer {
            id,
            delay,
            handle,
            fired,
        });
    }

    /// Cancels the outstanding timer, if any. Idempotent.
    pub fn disarm(&mut self) {
        if let Some(timer) = self.armed.take() {
            timer.handle.abort();
            tracing::debug!(timer_id = timer.id, "refresh timer disarmed");
        }
    }

    /// Whether a timer is outstanding (armed and not yet fired).
    pub fn is_armed(&self) -> bool {
        self.armed
            .as_ref()
            .is_some_and(|t| !t.fired.load(Ordering::SeqCst))
    }

    /// The id of the outstanding timer. Ids increase monotonically and
    /// are never reused while armed.
    pub fn armed_timer_id(&self) -> Option<u64> {
        self.armed
            .as_ref()
            .filter(|t| !t.fired.load(Ordering::SeqCst))
            .map(|t| t.id)
    }

    /// How long after arming the outstanding timer will fire.
    pub fn armed_delay(&self) -> Option<Duration> {
        self.armed
            .as_ref()
            .filter(|t| !t.fired.load(Ordering::SeqCst))
            .map(|t| t.delay)
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}
