//! Post store
//!
//! Contains the state container and its transition rules:
//! - Actions: lifecycle phases of an operation
//! - State: what the UI reads
//! - Reducer: pure function (State, Action) -> State
//!
//! [`Store`] is the single owner of a [`PostsState`]. It is created by the
//! composition root and handed out by cloning (the clones share state).
//! Every dispatch runs the reducer under a write lock, so reconciliations
//! never interleave; the order of dispatches is the order of arrival.
//!
//! # Change notifications
//!
//! After every dispatch the store broadcasts a [`StoreEvent`] carrying the
//! action and the resulting snapshot. Events are sent while the write lock is
//! held, so subscribers see them in the same order the reducer applied them. If no subscribers exist the event is
//! never built. Lagging subscribers lose the oldest events first and never
//! block a dispatch.
//!
//! # Example
//!
//! ```
//! use libpostsync::lifecycle::Operation;
//! use libpostsync::store::{Action, Store};
//!
//! let store = Store::new(16);
//! let mut events = store.subscribe();
//!
//! store.dispatch(Action::Pending(Operation::FetchAll));
//! assert!(store.state().is_list_loading);
//!
//! let event = events.try_recv().unwrap();
//! assert_eq!(event.action, Action::Pending(Operation::FetchAll));
//! ```

pub mod actions;
pub mod reducer;
pub mod state;

pub use actions::{Action, Fulfilled};
pub use reducer::reduce;
pub use state::PostsState;

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;
use tracing::debug;

/// Receiver of store change events
pub type StoreReceiver = broadcast::Receiver<StoreEvent>;

/// Default broadcast buffer per subscriber
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Emitted after every dispatch
#[derive(Debug, Clone)]
pub struct StoreEvent {
    /// The action that was applied
    pub action: Action,
    /// State right after the action
    pub snapshot: PostsState,
}

/// Shared handle to the post store
#[derive(Clone)]
pub struct Store {
    state: Arc<RwLock<PostsState>>,
    sender: broadcast::Sender<StoreEvent>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl Store {
    /// Create an empty store
    ///
    /// # Arguments
    ///
    /// * `capacity` - Events buffered per subscriber before the oldest are dropped
    pub fn new(capacity: usize) -> Self {
        Self::with_state(PostsState::new(), capacity)
    }

    /// Create a store seeded with an existing state
    pub fn with_state(state: PostsState, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            state: Arc::new(RwLock::new(state)),
            sender,
        }
    }

    /// Apply one action and return the resulting snapshot
    pub fn dispatch(&self, action: Action) -> PostsState {
        debug!(operation = %action.operation(), terminal = action.is_terminal(), "Dispatching action");

        // The old value is replaced only after reduce returns, so a
        // poisoned lock still guards a whole state.
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let snapshot = reduce(guard.clone(), action.clone());
        *guard = snapshot.clone();

        // Sent under the write lock so events leave in dispatch order
        if self.sender.receiver_count() > 0 {
            // send() only fails when every receiver dropped in the meantime
            let _ = self.sender.send(StoreEvent {
                action,
                snapshot: snapshot.clone(),
            });
        }
        drop(guard);

        snapshot
    }

    /// Current snapshot
    pub fn state(&self) -> PostsState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Read the current state without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&PostsState) -> R) -> R {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Subscribe to change events emitted after subscription
    pub fn subscribe(&self) -> StoreReceiver {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
