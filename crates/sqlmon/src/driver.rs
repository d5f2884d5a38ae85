//! Capability traits implemented by a database driver.
//!
//! A driver is modelled as four capabilities, each producing the next:
//! [`Driver`] opens a [`Connection`], which begins a [`Transaction`] or
//! prepares a [`Statement`]. The proxy wrappers implement the same traits as
//! the origins they wrap, so a wrapped driver can be used anywhere the original
//! one is accepted.

use crate::value::{ExecResult, Value};

/// A database driver that can open connections.
pub trait Driver: Send + Sync {
    /// Error returned by every capability of this driver.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Connection type produced by [`Driver::open`].
    type Conn: Connection<Error = Self::Error>;

    /// Open a new connection.
    ///
    /// `target` is driver-specific (a DSN, URL, file path, ...) and is passed
    /// through untouched.
    fn open(
        &self,
        target: &str,
    ) -> impl std::future::Future<Output = Result<Self::Conn, Self::Error>> + Send;
}

/// An open connection.
pub trait Connection: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Transaction type produced by [`Connection::begin`].
    type Tx: Transaction<Error = Self::Error>;

    /// Statement type produced by [`Connection::prepare`].
    type Stmt: Statement<Error = Self::Error>;

    /// Start a transaction.
    fn begin(&mut self)
    -> impl std::future::Future<Output = Result<Self::Tx, Self::Error>> + Send;

    /// Close the connection.
    ///
    /// Behavior of calls made after `close` is up to the driver.
    fn close(&mut self) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;

    /// Prepare a statement bound to this connection.
    fn prepare(
        &mut self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<Self::Stmt, Self::Error>> + Send;
}

/// A transaction in progress.
///
/// Both methods consume the transaction.
pub trait Transaction: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    fn commit(self) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;

    fn rollback(self) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;
}

/// A prepared statement.
pub trait Statement: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Cursor returned by [`Statement::query`]. Row iteration is driver-owned.
    type Rows: Send;

    /// Close the statement.
    fn close(&mut self) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;

    /// Number of placeholders, or `None` if the driver can't tell.
    fn param_count(&self) -> Option<usize>;

    /// Execute a statement that doesn't return rows.
    fn exec(
        &mut self,
        args: &[Value],
    ) -> impl std::future::Future<Output = Result<ExecResult, Self::Error>> + Send;

    /// Execute a statement that returns rows.
    fn query(
        &mut self,
        args: &[Value],
    ) -> impl std::future::Future<Output = Result<Self::Rows, Self::Error>> + Send;
}
