use super::Shared;
use crate::driver::Transaction;
use crate::operation::Operation;
use std::sync::Arc;
use std::time::Instant;

/// A transaction begun through a [`Conn`](super::Conn).
pub struct Tx<T> {
    origin: T,
    shared: Arc<Shared>,
}

impl<T: Transaction> Tx<T> {
    pub(super) fn new(origin: T, shared: Arc<Shared>) -> Self {
        Self { origin, shared }
    }

    /// Get a reference to the wrapped transaction.
    pub fn inner(&self) -> &T {
        &self.origin
    }

    /// Get the wrapped transaction, consuming this wrapper.
    pub fn into_inner(self) -> T {
        self.origin
    }
}

impl<T: Transaction> Transaction for Tx<T> {
    type Error = T::Error;

    async fn commit(self) -> Result<(), Self::Error> {
        let started = Instant::now();
        let result = self.origin.commit().await;
        self.shared.report(Operation::TxCommit, started, &result);
        result
    }

    async fn rollback(self) -> Result<(), Self::Error> {
        let started = Instant::now();
        let result = self.origin.rollback().await;
        self.shared.report(Operation::TxRollback, started, &result);
        result
    }
}

impl<T> std::fmt::Debug for Tx<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tx")
            .field("origin", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}
