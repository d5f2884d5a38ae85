use super::Shared;
use super::stmt::Stmt;
use super::tx::Tx;
use crate::driver::Connection;
use crate::operation::Operation;
use std::sync::Arc;
use std::time::Instant;

/// A connection opened through a [`Proxy`](super::Proxy).
pub struct Conn<C> {
    origin: C,
    shared: Arc<Shared>,
}

impl<C: Connection> Conn<C> {
    pub(super) fn new(origin: C, shared: Arc<Shared>) -> Self {
        Self { origin, shared }
    }

    /// Get a reference to the wrapped connection.
    pub fn inner(&self) -> &C {
        &self.origin
    }

    /// Get a mutable reference to the wrapped connection.
    ///
    /// Calls made directly on it are not reported.
    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.origin
    }

    /// Get the wrapped connection, consuming this wrapper.
    pub fn into_inner(self) -> C {
        self.origin
    }
}

impl<C: Connection> Connection for Conn<C> {
    type Error = C::Error;
    type Tx = Tx<C::Tx>;
    type Stmt = Stmt<C::Stmt>;

    async fn begin(&mut self) -> Result<Self::Tx, Self::Error> {
        let started = Instant::now();
        let result = self.origin.begin().await;
        self.shared.report(Operation::ConnBegin, started, &result);

        result.map(|origin| Tx::new(origin, self.shared.clone()))
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        let started = Instant::now();
        let result = self.origin.close().await;
        self.shared.report(Operation::ConnClose, started, &result);
        result
    }

    async fn prepare(&mut self, query: &str) -> Result<Self::Stmt, Self::Error> {
        let started = Instant::now();
        let result = self.origin.prepare(query).await;
        self.shared.report(Operation::ConnPrepare, started, &result);

        result.map(|origin| Stmt::new(origin, self.shared.clone()))
    }
}

impl<C> std::fmt::Debug for Conn<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conn")
            .field("origin", &std::any::type_name::<C>())
            .finish_non_exhaustive()
    }
}
