//! Push-notification subscriber with an owned, explicit lifecycle.
//!
//! The storefront receives server pushes (inventory changes, auth expiry,
//! active-user counts) over a long-lived channel. Instead of a module-
//! level singleton living for the page's lifetime, the subscriber is an
//! explicitly constructed [`NotificationHub`] with `connect()` /
//! `disconnect()`, passed into whatever component needs it. The transport
//! itself stays behind the [`EventSource`] seam — a WebSocket
//! implementation belongs to the embedding application.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::NotifyError;

// ============================================================================
// Events and seam
// ============================================================================

/// A server push event.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// A record's stock level changed.
    InventoryChanged { record_id: i64, quantity: u32 },
    /// The visitor's session token expired server-side.
    AuthExpired,
    /// Live count of active visitors (admin dashboards).
    ActiveUsers { count: u32 },
}

/// Transport seam for the push channel.
///
/// `next_event` resolves with the next event, `Ok(None)` when the stream
/// ends cleanly, or an error when the transport fails. The hub stops its
/// pump on either terminal outcome.
#[async_trait]
pub trait EventSource: Send {
    async fn next_event(&mut self) -> Result<Option<StoreEvent>, NotifyError>;
}

// ============================================================================
// NotificationHub
// ============================================================================

/// Handle returned by [`NotificationHub::listen`].
pub type ListenerId = u64;

type ListenerFn = dyn Fn(&StoreEvent) + Send + Sync;

#[derive(Default)]
struct Listeners {
    callbacks: Mutex<Vec<(ListenerId, Arc<ListenerFn>)>>,
    next_id: AtomicU64,
}

impl Listeners {
    fn dispatch(&self, event: &StoreEvent) {
        let snapshot: Vec<Arc<ListenerFn>> = {
            let guard = self.callbacks.lock();
            guard.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for cb in snapshot {
            cb(event);
        }
    }
}

enum HubState {
    /// Constructed, not yet connected; holds the transport.
    Idle(Box<dyn EventSource>),
    /// Pump task running.
    Running(tokio::task::JoinHandle<()>),
    /// Disconnected (or the source ran dry); the transport is consumed.
    Done,
}

/// Owned subscriber for server push events.
///
/// One `connect()` per hub: the transport is consumed by the pump task.
/// A reconnect is a new hub over a new source.
pub struct NotificationHub {
    state: Mutex<HubState>,
    listeners: Arc<Listeners>,
    stopped: Arc<AtomicBool>,
}

impl NotificationHub {
    pub fn new(source: Box<dyn EventSource>) -> Self {
        Self {
            state: Mutex::new(HubState::Idle(source)),
            listeners: Arc::new(Listeners::default()),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register `callback` for every dispatched event.
    pub fn listen(&self, callback: impl Fn(&StoreEvent) + Send + Sync + 'static) -> ListenerId {
        let id = self.listeners.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .callbacks
            .lock()
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unlisten(&self, id: ListenerId) {
        self.listeners
            .callbacks
            .lock()
            .retain(|(lid, _)| *lid != id);
    }

    /// Start the pump task. Must be called from within a tokio runtime.
    ///
    /// Calling `connect` on an already-connected hub is a no-op; calling
    /// it after `disconnect` (or after the source ended) fails with
    /// [`NotifyError::Disconnected`].
    pub fn connect(&self) -> Result<(), NotifyError> {
        let mut state = self.state.lock();
        match std::mem::replace(&mut *state, HubState::Done) {
            HubState::Idle(mut source) => {
                let listeners = Arc::clone(&self.listeners);
                let stopped = Arc::clone(&self.stopped);
                let handle = tokio::spawn(async move {
                    loop {
                        if stopped.load(Ordering::Acquire) {
                            break;
                        }
                        match source.next_event().await {
                            Ok(Some(event)) => listeners.dispatch(&event),
                            Ok(None) => break,
                            Err(e) => {
                                tracing::warn!(error = %e, "notification channel failed");
                                break;
                            }
                        }
                    }
                });
                *state = HubState::Running(handle);
                Ok(())
            }
            running @ HubState::Running(_) => {
                *state = running;
                Ok(())
            }
            HubState::Done => Err(NotifyError::Disconnected),
        }
    }

    /// Stop the pump task. Idempotent; safe to call before `connect`.
    pub fn disconnect(&self) {
        self.stopped.store(true, Ordering::Release);
        let mut state = self.state.lock();
        if let HubState::Running(handle) = std::mem::replace(&mut *state, HubState::Done) {
            handle.abort();
        }
    }

    /// Whether the pump task is currently running.
    pub fn is_connected(&self) -> bool {
        matches!(&*self.state.lock(), HubState::Running(handle) if !handle.is_finished())
    }
}

impl Drop for NotificationHub {
    fn drop(&mut self) {
        self.disconnect();
    }
}
