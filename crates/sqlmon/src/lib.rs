//! # sqlmon
//!
//! Timing callbacks for database driver operations.
//!
//! `sqlmon` wraps a driver in a transparent proxy. The proxy implements the
//! same capability traits as the driver it wraps, forwards every call, and
//! after each call reports the [`Operation`], the elapsed time and the error
//! (if any) to a callback registered for that operation.
//!
//! ## Features
//!
//! - **Transparent**: values and errors from the wrapped driver are returned
//!   unchanged; a proxy with no callbacks behaves exactly like the driver
//! - **Follows the hierarchy**: connections, transactions and statements
//!   obtained through the proxy are wrapped as well
//! - **One callback per operation**: registering again replaces, never chains
//! - **Panic isolation**: a panicking callback is logged and can't eat the
//!   driver's result (configurable)
//! - **Tracing out of the box**: [`TracingCallback`] logs every operation via
//!   `tracing`
//!
//! ```ignore
//! use sqlmon::{Connection, Driver, Operation, Statement, wrap};
//!
//! let proxy = wrap(driver);
//! proxy.register_callback(Operation::StmtQuery, |op, elapsed, err| {
//!     eprintln!("{op}: {elapsed:?} ok={}", err.is_none());
//! });
//!
//! let mut conn = proxy.open("file:app.db").await?;
//! let mut stmt = conn.prepare("SELECT id FROM users WHERE name = ?").await?;
//! let rows = stmt.query(&["alice".into()]).await?;
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod operation;
pub mod proxy;
pub mod registry;
pub mod tracing_callback;
pub mod value;

pub use config::{LogConfig, ProxyConfig, StmtCloseRouting};
pub use driver::{Connection, Driver, Statement, Transaction};
pub use error::{SqlmonError, SqlmonResult};
pub use operation::{Capability, Operation};
pub use proxy::{Conn, Proxy, Stmt, Tx, wrap};
pub use registry::{Callback, CallbackRegistry, callback};
pub use tracing_callback::TracingCallback;
pub use value::{ExecResult, Value};
