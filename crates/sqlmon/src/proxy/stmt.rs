use super::Shared;
use crate::driver::Statement;
use crate::operation::Operation;
use crate::value::{ExecResult, Value};
use std::sync::Arc;
use std::time::Instant;

/// A statement prepared through a [`Conn`](super::Conn).
///
/// The cursor returned by [`Statement::query`] is the driver's own; row
/// iteration is not reported.
pub struct Stmt<S> {
    origin: S,
    shared: Arc<Shared>,
}

impl<S: Statement> Stmt<S> {
    pub(super) fn new(origin: S, shared: Arc<Shared>) -> Self {
        Self { origin, shared }
    }

    /// Get a reference to the wrapped statement.
    pub fn inner(&self) -> &S {
        &self.origin
    }

    /// Get the wrapped statement, consuming this wrapper.
    pub fn into_inner(self) -> S {
        self.origin
    }
}

impl<S: Statement> Statement for Stmt<S> {
    type Error = S::Error;
    type Rows = S::Rows;

    async fn close(&mut self) -> Result<(), Self::Error> {
        let started = Instant::now();
        let result = self.origin.close().await;
        let op = self.shared.config.stmt_close_routing.operation();
        self.shared.report(op, started, &result);
        result
    }

    fn param_count(&self) -> Option<usize> {
        self.origin.param_count()
    }

    async fn exec(&mut self, args: &[Value]) -> Result<ExecResult, Self::Error> {
        let started = Instant::now();
        let result = self.origin.exec(args).await;
        self.shared.report(Operation::StmtExec, started, &result);
        result
    }

    async fn query(&mut self, args: &[Value]) -> Result<Self::Rows, Self::Error> {
        let started = Instant::now();
        let result = self.origin.query(args).await;
        self.shared.report(Operation::StmtQuery, started, &result);
        result
    }
}

impl<S> std::fmt::Debug for Stmt<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stmt")
            .field("origin", &std::any::type_name::<S>())
            .finish_non_exhaustive()
    }
}
