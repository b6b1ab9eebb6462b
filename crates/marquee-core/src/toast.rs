//! Notification center for transient, auto-dismissing toasts.
//!
//! Each toast runs a small state machine:
//!
//! ```text
//! Visible ──(lifetime elapsed | dismiss)──▶ Exiting ──(exit elapsed)──▶ removed
//! ```
//!
//! Every transition is driven by at most one pending timer task per toast.
//! Timers hold only a weak reference to the center and a child of the
//! center's shutdown token: once the last `ToastCenter` handle is dropped (or
//! [`ToastCenter::shutdown`] is called) no timer touches the queue again.
//!
//! The active sequence is published through a `watch` channel so any number
//! of surfaces can render it read-only.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::config::ToastConfig;

/// Default time a toast stays visible.
pub const DEFAULT_LIFETIME: Duration = Duration::from_millis(3500);

/// Length of the exit phase before removal.
pub const EXIT_DURATION: Duration = Duration::from_millis(300);

/// Opaque toast identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(Uuid);

impl ToastId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Presentation category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Visible,
    Exiting,
}

/// A notification as seen by display surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub kind: ToastKind,
    /// `Duration::ZERO` keeps the toast until dismissed.
    pub lifetime: Duration,
    pub phase: ToastPhase,
}

impl Toast {
    pub fn is_exiting(&self) -> bool {
        self.phase == ToastPhase::Exiting
    }
}

/// Options for [`ToastCenter::show`].
///
/// `lifetime: None` uses the center's configured default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToastOptions {
    pub kind: ToastKind,
    pub lifetime: Option<Duration>,
}

impl ToastOptions {
    pub fn info() -> Self {
        Self::default()
    }

    pub fn success() -> Self {
        Self {
            kind: ToastKind::Success,
            lifetime: None,
        }
    }

    pub fn error() -> Self {
        Self {
            kind: ToastKind::Error,
            lifetime: None,
        }
    }

    #[must_use]
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Keeps the toast until it is dismissed.
    #[must_use]
    pub fn sticky(self) -> Self {
        self.with_lifetime(Duration::ZERO)
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Exit,
    Remove,
}

struct Entry {
    toast: Toast,
    /// The single pending timer for this toast, if any.
    timer: Option<CancellationToken>,
}

struct Shared {
    entries: Mutex<Vec<Entry>>,
    changes: watch::Sender<Vec<Toast>>,
    shutdown: CancellationToken,
    runtime: Handle,
    default_lifetime: Duration,
    exit_duration: Duration,
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl Shared {
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, entries: &[Entry]) {
        let snapshot = entries.iter().map(|e| e.toast.clone()).collect();
        self.changes.send_replace(snapshot);
    }

    /// Spawns the timer for `step` and returns its cancellation token.
    fn schedule(self: &Arc<Self>, id: ToastId, delay: Duration, step: Step) -> CancellationToken {
        let token = self.shutdown.child_token();
        let cancelled = token.clone();
        let center: Weak<Self> = Arc::downgrade(self);

        self.runtime.spawn(async move {
            tokio::select! {
                () = cancelled.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    // Torn-down centers are never touched again.
                    let Some(center) = center.upgrade() else { return };
                    if cancelled.is_cancelled() {
                        return;
                    }
                    match step {
                        Step::Exit => center.begin_exit(id),
                        Step::Remove => center.remove(id),
                    }
                }
            }
        });

        token
    }

    /// `Visible → Exiting`, replacing any pending timer with the removal
    /// timer. No-op for absent or already-exiting toasts.
    fn begin_exit(self: &Arc<Self>, id: ToastId) {
        if self.shutdown.is_cancelled() {
            return;
        }

        let mut entries = self.lock();
        let Some(entry) = entries
            .iter_mut()
            .find(|e| e.toast.id == id && e.toast.phase == ToastPhase::Visible)
        else {
            return;
        };

        entry.toast.phase = ToastPhase::Exiting;
        if let Some(pending) = entry.timer.take() {
            pending.cancel();
        }
        entry.timer = Some(self.schedule(id, self.exit_duration, Step::Remove));
        debug!(toast = %id, "toast exiting");

        self.publish(&entries);
    }

    /// Drops the toast. Removing an absent id is a silent no-op.
    fn remove(&self, id: ToastId) {
        let mut entries = self.lock();
        let Some(index) = entries.iter().position(|e| e.toast.id == id) else {
            return;
        };

        let entry = entries.remove(index);
        if let Some(pending) = entry.timer {
            pending.cancel();
        }
        debug!(toast = %id, "toast removed");

        self.publish(&entries);
    }
}

/// Handle to the notification queue. Cheap to clone; all clones share one
/// queue.
#[derive(Clone)]
pub struct ToastCenter {
    shared: Arc<Shared>,
}

impl fmt::Debug for ToastCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastCenter")
            .field("active", &self.shared.lock().len())
            .field("default_lifetime", &self.shared.default_lifetime)
            .field("exit_duration", &self.shared.exit_duration)
            .finish()
    }
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastCenter {
    /// Creates a center with the default timings on the current runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn new() -> Self {
        Self::with_timings(DEFAULT_LIFETIME, EXIT_DURATION)
    }

    /// Creates a center from the `[toasts]` config section.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn from_config(config: &ToastConfig) -> Self {
        Self::with_timings(config.lifetime(), config.exit())
    }

    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn with_timings(default_lifetime: Duration, exit_duration: Duration) -> Self {
        Self::with_runtime(Handle::current(), default_lifetime, exit_duration)
    }

    /// Creates a center whose timers run on `runtime`.
    pub fn with_runtime(runtime: Handle, default_lifetime: Duration, exit_duration: Duration) -> Self {
        let (changes, _) = watch::channel(Vec::new());
        Self {
            shared: Arc::new(Shared {
                entries: Mutex::new(Vec::new()),
                changes,
                shutdown: CancellationToken::new(),
                runtime,
                default_lifetime,
                exit_duration,
            }),
        }
    }

    /// Enqueues a toast at the front and returns its id immediately.
    pub fn show(&self, message: impl Into<String>, options: ToastOptions) -> ToastId {
        let id = ToastId::generate();
        let lifetime = options.lifetime.unwrap_or(self.shared.default_lifetime);
        let toast = Toast {
            id,
            message: message.into(),
            kind: options.kind,
            lifetime,
            phase: ToastPhase::Visible,
        };

        let mut entries = self.shared.lock();
        let timer = (!lifetime.is_zero() && !self.shared.shutdown.is_cancelled())
            .then(|| self.shared.schedule(id, lifetime, Step::Exit));
        entries.insert(0, Entry { toast, timer });
        debug!(toast = %id, kind = ?options.kind, ?lifetime, "toast shown");

        self.shared.publish(&entries);
        id
    }

    pub fn info(&self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastOptions::info())
    }

    pub fn success(&self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastOptions::success())
    }

    pub fn error(&self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastOptions::error())
    }

    /// Starts the exit phase of a visible toast. Idempotent.
    pub fn dismiss(&self, id: ToastId) {
        self.shared.begin_exit(id);
    }

    /// Current active sequence, most recent first.
    pub fn snapshot(&self) -> Vec<Toast> {
        self.shared.lock().iter().map(|e| e.toast.clone()).collect()
    }

    /// Subscribes to changes of the active sequence.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.shared.changes.subscribe()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.lock().is_empty()
    }

    /// Cancels every pending timer. The queue is frozen afterwards.
    pub fn shutdown(&self) {
        self.shared.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Advances the paused clock by `ms` and lets woken timer tasks run.
    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn phase_of(center: &ToastCenter, id: ToastId) -> Option<ToastPhase> {
        center
            .snapshot()
            .into_iter()
            .find(|t| t.id == id)
            .map(|t| t.phase)
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_toast_lifecycle() {
        let center = ToastCenter::new();
        let id = center.show(
            "Added \"Inception\" to your watchlist",
            ToastOptions::success(),
        );

        let front = center.snapshot().remove(0);
        assert_eq!(front.id, id);
        assert_eq!(front.kind, ToastKind::Success);
        assert_eq!(front.phase, ToastPhase::Visible);
        assert_eq!(front.lifetime, DEFAULT_LIFETIME);

        advance(3499).await;
        assert_eq!(phase_of(&center, id), Some(ToastPhase::Visible));

        advance(2).await; // 3501ms
        assert_eq!(phase_of(&center, id), Some(ToastPhase::Exiting));

        advance(298).await; // 3799ms
        assert_eq!(phase_of(&center, id), Some(ToastPhase::Exiting));

        advance(2).await; // 3801ms
        assert_eq!(phase_of(&center, id), None);
        assert!(center.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_most_recent_first() {
        let center = ToastCenter::new();
        let first = center.info("first");
        let second = center.error("second");

        let ids: Vec<ToastId> = center.snapshot().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_ne!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sticky_toast_stays_until_dismissed() {
        let center = ToastCenter::new();
        let id = center.show("Check your inbox", ToastOptions::info().sticky());

        advance(60_000).await;
        assert_eq!(phase_of(&center, id), Some(ToastPhase::Visible));

        center.dismiss(id);
        assert_eq!(phase_of(&center, id), Some(ToastPhase::Exiting));

        advance(301).await;
        assert_eq!(phase_of(&center, id), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_is_idempotent() {
        let center = ToastCenter::new();
        let id = center.info("hello");

        advance(100).await;
        center.dismiss(id);
        advance(200).await; // 200ms into the exit phase
        center.dismiss(id); // must not restart the removal timer

        advance(101).await; // 301ms after the first dismiss
        assert_eq!(phase_of(&center, id), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_before_lifetime_cancels_auto_exit() {
        let center = ToastCenter::new();
        let id = center.info("short-lived");
        let mut rx = center.subscribe();
        rx.mark_unchanged();

        center.dismiss(id);
        advance(301).await;
        assert!(center.is_empty());
        assert!(rx.has_changed().unwrap());

        // The original auto-exit timer must not resurrect or re-publish.
        rx.mark_unchanged();
        advance(DEFAULT_LIFETIME.as_millis() as u64).await;
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_racing_auto_exit_converges() {
        let center = ToastCenter::new();
        let id = center.show("race", ToastOptions::info().with_lifetime(Duration::from_millis(50)));

        // Land the dismiss exactly on the auto-exit deadline.
        tokio::time::sleep(Duration::from_millis(50)).await;
        center.dismiss(id);
        advance(0).await;
        assert_eq!(phase_of(&center, id), Some(ToastPhase::Exiting));

        advance(301).await;
        assert!(center.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_unknown_id_is_noop() {
        let center = ToastCenter::new();
        let kept = center.info("kept");
        let other = ToastCenter::new();
        let foreign = other.info("foreign");

        let before = center.snapshot();
        center.dismiss(foreign);
        assert_eq!(center.snapshot(), before);
        assert_eq!(phase_of(&center, kept), Some(ToastPhase::Visible));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_transitions() {
        let center = ToastCenter::with_timings(Duration::from_millis(100), Duration::from_millis(10));
        let mut rx = center.subscribe();

        center.info("hi");
        assert_eq!(rx.borrow_and_update().len(), 1);

        advance(101).await;
        assert!(rx.borrow_and_update()[0].is_exiting());

        advance(11).await;
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_center_cancels_timers() {
        let center = ToastCenter::new();
        let rx = center.subscribe();
        center.info("bye");
        drop(center);

        advance(5_000).await;
        // Last published state is the single visible toast; nothing ran after teardown.
        let last = rx.borrow();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].phase, ToastPhase::Visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_freezes_queue() {
        let center = ToastCenter::new();
        let id = center.info("frozen");
        center.shutdown();

        advance(5_000).await;
        assert_eq!(phase_of(&center, id), Some(ToastPhase::Visible));
        center.dismiss(id);
        assert_eq!(phase_of(&center, id), Some(ToastPhase::Visible));
    }
}
