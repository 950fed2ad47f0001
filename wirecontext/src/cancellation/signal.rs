//! Cancellation signal with deadline support.

use crate::errors::CancelError;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, Once, RwLock};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// A callback type for cancellation notifications.
pub type CancelCallback = Box<dyn Fn() + Send + Sync>;

struct SignalInner {
    /// Guards the single cancelled transition.
    latch: Once,
    /// Why the signal fired; `None` while live.
    cause: RwLock<Option<CancelError>>,
    /// Free-form reason supplied by the canceller (first one wins).
    reason: RwLock<Option<String>>,
    /// Absolute deadline, already clamped to the parent's.
    deadline: Option<DateTime<Utc>>,
    fired: watch::Sender<bool>,
    callbacks: Mutex<Vec<CancelCallback>>,
    children: Mutex<Vec<Weak<SignalInner>>>,
}

/// A cloneable handle to a one-shot cancellation source.
///
/// Clones share the same underlying state. Derived signals (see
/// [`CancelSignal::child`]) are cancelled when their parent is, but
/// cancelling a child never reaches the parent.
#[derive(Clone)]
pub struct CancelSignal {
    inner: Arc<SignalInner>,
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::background()
    }
}

impl CancelSignal {
    /// Creates a root signal without a deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::with_deadline_inner(None)
    }

    /// Creates a root signal that expires at `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: DateTime<Utc>) -> Self {
        Self::with_deadline_inner(Some(deadline))
    }

    fn with_deadline_inner(deadline: Option<DateTime<Utc>>) -> Self {
        let (fired, _) = watch::channel(false);
        Self {
            inner: Arc::new(SignalInner {
                latch: Once::new(),
                cause: RwLock::new(None),
                reason: RwLock::new(None),
                deadline,
                fired,
                callbacks: Mutex::new(Vec::new()),
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Derives a child signal that inherits this signal's deadline.
    #[must_use]
    pub fn child(&self) -> Self {
        self.derive(None)
    }

    /// Derives a child signal expiring at `deadline` or at the parent's
    /// deadline, whichever comes first.
    #[must_use]
    pub fn child_with_deadline(&self, deadline: DateTime<Utc>) -> Self {
        self.derive(Some(deadline))
    }

    /// Derives a child signal expiring `timeout` from now.
    ///
    /// A timeout too large to represent leaves only the parent's deadline.
    #[must_use]
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let deadline = chrono::Duration::from_std(timeout)
            .ok()
            .and_then(|delta| Utc::now().checked_add_signed(delta));
        self.derive(deadline)
    }

    fn derive(&self, deadline: Option<DateTime<Utc>>) -> Self {
        let deadline = match (self.inner.deadline, deadline) {
            (Some(parent), Some(own)) => Some(parent.min(own)),
            (parent, own) => parent.or(own),
        };
        let child = Self::with_deadline_inner(deadline);

        {
            let mut children = self.inner.children.lock();
            children.retain(|c| c.strong_count() > 0);
            children.push(Arc::downgrade(&child.inner));
        }

        // The parent may have fired before the child was registered.
        if let Some(cause) = *self.inner.cause.read() {
            child.trigger(cause, self.reason());
        }

        child
    }

    /// Requests cancellation.
    ///
    /// Only the first call has an effect, even under concurrent callers.
    pub fn cancel(&self) {
        self.trigger(CancelError::Canceled, None);
    }

    /// Requests cancellation with a reason. The first reason wins.
    pub fn cancel_with_reason(&self, reason: impl Into<String>) {
        self.trigger(CancelError::Canceled, Some(reason.into()));
    }

    /// Fires the signal. Returns true for the one caller that performed the
    /// transition.
    fn trigger(&self, cause: CancelError, reason: Option<String>) -> bool {
        let mut performed = false;
        self.inner.latch.call_once(|| {
            *self.inner.reason.write() = reason;
            *self.inner.cause.write() = Some(cause);
            performed = true;
        });
        if !performed {
            return false;
        }

        self.inner.fired.send_replace(true);
        debug!(%cause, "Cancellation signal fired");

        let callbacks = std::mem::take(&mut *self.inner.callbacks.lock());
        for callback in &callbacks {
            if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                callback();
            })) {
                warn!("Cancellation callback panicked: {:?}", e);
            }
        }

        let children = std::mem::take(&mut *self.inner.children.lock());
        let reason = self.reason();
        for inner in children.iter().filter_map(Weak::upgrade) {
            Self { inner }.trigger(cause, reason.clone());
        }

        true
    }

    /// Registers a callback to be invoked on cancellation.
    ///
    /// If already cancelled, the callback is invoked immediately.
    pub fn on_cancel<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        {
            let mut callbacks = self.inner.callbacks.lock();
            if self.inner.cause.read().is_none() {
                callbacks.push(Box::new(callback));
                return;
            }
        }

        if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            callback();
        })) {
            warn!("Cancellation callback panicked: {:?}", e);
        }
    }

    fn poll_deadline(&self) {
        if let Some(deadline) = self.inner.deadline {
            if self.inner.cause.read().is_none() && Utc::now() >= deadline {
                self.trigger(CancelError::DeadlineExceeded, None);
            }
        }
    }

    /// Returns why the signal fired, or `None` while it is live.
    ///
    /// An expired deadline is observed here even if nobody awaited
    /// [`CancelSignal::done`].
    #[must_use]
    pub fn err(&self) -> Option<CancelError> {
        self.poll_deadline();
        *self.inner.cause.read()
    }

    /// Returns whether the signal has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.err().is_some()
    }

    /// Returns the cancellation reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.inner.reason.read().clone()
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.inner.deadline
    }

    /// Returns a receiver that flips to `true` once the signal fires.
    ///
    /// Deadline expiry is only published here once observed through
    /// [`CancelSignal::err`] or [`CancelSignal::done`].
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.fired.subscribe()
    }

    /// Completes once the signal is cancelled or its deadline passes.
    pub async fn done(&self) {
        let mut fired = self.inner.fired.subscribe();

        match self.inner.deadline {
            Some(deadline) => {
                let remaining = (deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO);
                tokio::select! {
                    _ = fired.wait_for(|fired| *fired) => {}
                    () = tokio::time::sleep(remaining) => {
                        self.trigger(CancelError::DeadlineExceeded, None);
                    }
                }
            }
            None => {
                // The sender lives as long as `self`, so this only returns
                // once the value flips.
                let _ = fired.wait_for(|fired| *fired).await;
            }
        }
    }

    /// Returns true if both handles point at the same signal.
    #[must_use]
    pub fn same_signal(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for CancelSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelSignal")
            .field("cause", &*self.inner.cause.read())
            .field("reason", &self.reason())
            .field("deadline", &self.inner.deadline)
            .finish()
    }
}
