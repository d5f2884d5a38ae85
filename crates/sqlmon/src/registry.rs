use crate::operation::Operation;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Observer invoked after an intercepted driver call returns.
///
/// Arguments are the operation, the time spent in the wrapped driver, and the
/// error the driver returned (`None` on success). Callbacks can't influence
/// the value handed back to the caller.
pub type Callback =
    Arc<dyn Fn(Operation, Duration, Option<&(dyn StdError + 'static)>) + Send + Sync>;

/// Build a [`Callback`] from a closure.
pub fn callback<F>(f: F) -> Callback
where
    F: Fn(Operation, Duration, Option<&(dyn StdError + 'static)>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Map from operation to its callback. At most one callback per operation.
///
/// Registration and lookup are both safe at any time. Lookups clone the
/// callback out and release the lock before calling it, so a callback may
/// (un)register callbacks itself.
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: RwLock<HashMap<Operation, Callback>>,
}

impl CallbackRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the callback for `op`, returning the one it replaced.
    pub fn insert(&self, op: Operation, callback: Callback) -> Option<Callback> {
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(op, callback)
    }

    /// Set the callback for `op` only if none is registered.
    ///
    /// Returns `true` if `callback` was installed.
    pub fn insert_if_absent(&self, op: Operation, callback: Callback) -> bool {
        let mut callbacks = self.callbacks.write().unwrap_or_else(PoisonError::into_inner);
        if callbacks.contains_key(&op) {
            return false;
        }
        callbacks.insert(op, callback);
        true
    }

    /// Remove the callback for `op`, returning it if one was set.
    pub fn remove(&self, op: Operation) -> Option<Callback> {
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&op)
    }

    /// Current callback for `op`.
    pub fn get(&self, op: Operation) -> Option<Callback> {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&op)
            .cloned()
    }

    pub fn contains(&self, op: Operation) -> bool {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&op)
    }

    /// Registered operations in taxonomy order.
    pub fn operations(&self) -> Vec<Operation> {
        let callbacks = self.callbacks.read().unwrap_or_else(PoisonError::into_inner);
        Operation::ALL
            .into_iter()
            .filter(|op| callbacks.contains_key(op))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke the callback for `op`, if any.
    ///
    /// With `isolate` set, a panicking callback is caught and logged; otherwise
    /// the panic unwinds into the caller.
    pub(crate) fn dispatch(
        &self,
        op: Operation,
        elapsed: Duration,
        error: Option<&(dyn StdError + 'static)>,
        isolate: bool,
    ) {
        let Some(callback) = self.get(op) else {
            return;
        };

        if !isolate {
            callback(op, elapsed, error);
            return;
        }

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(op, elapsed, error)))
        {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            tracing::warn!(
                target: "sqlmon",
                operation = %op,
                panic = %message,
                "callback panicked; driver result returned unchanged"
            );
        }
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("operations", &self.operations())
            .finish()
    }
}
