//! Lifecycle tracker
//!
//! Runs one endpoint through `pending → fulfilled | rejected`, dispatching
//! each phase into the store. The terminal phase is chosen by a single
//! `match` on the settled outcome, so exactly one terminal action follows
//! every pending action. A run dropped mid-flight (timeout, `select!`) is
//! settled as rejected with `ErrorKind::Cancelled` by `PendingGuard`.

use std::sync::Arc;

use tracing::{info, warn};

use super::{Endpoint, Operation};
use crate::error::{ErrorKind, RequestError};
use crate::store::{Action, Store};
use crate::transport::Transport;

/// Drives endpoints against a transport and records every phase in a store
#[derive(Clone)]
pub struct LifecycleTracker {
    transport: Arc<dyn Transport>,
    store: Store,
}

impl LifecycleTracker {
    pub fn new(transport: Arc<dyn Transport>, store: Store) -> Self {
        Self { transport, store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Run one operation to settlement
    ///
    /// The store sees the outcome either way; the caller gets it as a
    /// `Result` and decides how to surface it.
    ///
    /// # Errors
    ///
    /// Returns `RequestError` when the transport failed, the status did not
    /// match the operation's expected status, or no payload could be derived.
    pub async fn run<E: Endpoint>(&self, endpoint: E) -> Result<E::Output, RequestError> {
        let operation = endpoint.operation();
        let guard = PendingGuard::dispatch(&self.store, operation);

        let outcome = match self.transport.call(endpoint.request()).await {
            Ok(response) => endpoint.settle(response),
            Err(error) => Err(ErrorKind::Transport(error)),
        };

        guard.disarm();
        match outcome {
            Ok(output) => {
                info!(operation = %operation, "Operation fulfilled");
                self.store
                    .dispatch(Action::Fulfilled(endpoint.fulfilled(output.clone())));
                Ok(output)
            }
            Err(kind) => {
                let error = RequestError::new(operation, kind);
                warn!(operation = %operation, error = %error.kind, "Operation rejected");
                self.store.dispatch(Action::Rejected(error.clone()));
                Err(error)
            }
        }
    }
}

/// Dispatches `Pending` on creation and `Rejected(Cancelled)` on drop
/// unless disarmed first
struct PendingGuard<'a> {
    store: &'a Store,
    operation: Operation,
    armed: bool,
}

impl<'a> PendingGuard<'a> {
    fn dispatch(store: &'a Store, operation: Operation) -> Self {
        store.dispatch(Action::Pending(operation));
        Self {
            store,
            operation,
            armed: true,
        }
    }

    /// The caller now owns the terminal dispatch
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!(operation = %self.operation, "Operation cancelled before settlement");
            self.store.dispatch(Action::Rejected(RequestError::new(
                self.operation,
                ErrorKind::Cancelled,
            )));
        }
    }
}
