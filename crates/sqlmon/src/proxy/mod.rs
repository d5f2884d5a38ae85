//! Driver proxy that reports timing and outcome of every driver call.
//!
//! [`Proxy`] wraps a [`Driver`] and implements `Driver` itself. Every
//! connection it opens is wrapped in a [`Conn`], every transaction begun on a
//! `Conn` in a [`Tx`], and every statement prepared on a `Conn` in a
//! [`Stmt`], so instrumentation follows the caller down the capability
//! hierarchy.
//!
//! Each intercepted method:
//! - times the wrapped call,
//! - invokes the callback registered for its [`Operation`] (if any) after the
//!   wrapped call returns and before the wrapper returns,
//! - hands back the wrapped call's value or error unchanged.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlmon::{Operation, ProxyConfig, wrap};
//!
//! let proxy = wrap(my_driver)
//!     .with_callback(Operation::StmtExec, |op, elapsed, err| {
//!         println!("{op} took {elapsed:?} (failed: {})", err.is_some());
//!     });
//!
//! let mut conn = proxy.open("postgres://localhost/app").await?;
//! let mut stmt = conn.prepare("UPDATE jobs SET done = true WHERE id = $1").await?;
//! stmt.exec(&[42.into()]).await?;
//! ```
//!
//! # Failed open / prepare
//!
//! When the wrapped driver fails to open a connection or prepare a statement,
//! the error is returned as-is and no wrapper is produced.

mod conn;
mod stmt;
mod tx;


pub use conn::Conn;
pub use stmt::Stmt;
pub use tx::Tx;

use crate::config::ProxyConfig;
use crate::driver::Driver;
use crate::error::SqlmonResult;
use crate::operation::Operation;
use crate::registry::{Callback, CallbackRegistry, callback};
use crate::tracing_callback::TracingCallback;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// State shared by a proxy and every wrapper descended from it.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) registry: Arc<CallbackRegistry>,
    pub(crate) config: ProxyConfig,
}

impl Shared {
    /// Report a finished driver call.
    pub(crate) fn report<T, E>(&self, op: Operation, started: Instant, result: &Result<T, E>)
    where
        E: StdError + 'static,
    {
        let elapsed = started.elapsed();
        let error = result
            .as_ref()
            .err()
            .map(|e| e as &(dyn StdError + 'static));
        self.report_elapsed(op, elapsed, error);
    }

    pub(crate) fn report_elapsed(
        &self,
        op: Operation,
        elapsed: Duration,
        error: Option<&(dyn StdError + 'static)>,
    ) {
        if !self.config.enabled {
            return;
        }
        self.registry
            .dispatch(op, elapsed, error, self.config.isolate_callback_panics);
    }
}

/// Wrap a driver. Shorthand for [`Proxy::new`].
pub fn wrap<D: Driver>(driver: D) -> Proxy<D> {
    Proxy::new(driver)
}

/// A driver wrapper that owns the callback registry.
pub struct Proxy<D> {
    origin: D,
    shared: Arc<Shared>,
}

impl<D: Driver> Proxy<D> {
    /// Wrap `driver` with an empty registry and default configuration.
    pub fn new(driver: D) -> Self {
        tracing::debug!(
            target: "sqlmon",
            driver = std::any::type_name::<D>(),
            "wrapping driver"
        );
        Self {
            origin: driver,
            shared: Arc::new(Shared {
                registry: Arc::new(CallbackRegistry::new()),
                config: ProxyConfig::default(),
            }),
        }
    }

    /// Set the proxy configuration.
    ///
    /// If `config.log` is set, a [`TracingCallback`] is registered for the
    /// listed operations that have no callback yet. Callbacks registered so
    /// far are kept. Wrappers
    /// already handed out keep the configuration they were created with but
    /// still share the registry.
    pub fn with_config(mut self, config: ProxyConfig) -> SqlmonResult<Self> {
        let tracing_cb = match &config.log {
            Some(log) => Some((TracingCallback::from_config(log)?, log.operations())),
            None => None,
        };

        self.shared = Arc::new(Shared {
            registry: self.shared.registry.clone(),
            config,
        });

        if let Some((cb, ops)) = tracing_cb {
            let cb = cb.into_callback();
            for op in ops {
                if self.shared.registry.insert_if_absent(op, cb.clone()) {
                    tracing::debug!(target: "sqlmon", operation = %op, "tracing callback registered");
                }
            }
        }
        Ok(self)
    }

    /// Register `f` for `op`, replacing any callback already registered for it.
    ///
    /// Takes effect immediately for this proxy and every wrapper created from
    /// it, including wrappers already in use.
    pub fn register_callback<F>(&self, op: Operation, f: F)
    where
        F: Fn(Operation, Duration, Option<&(dyn StdError + 'static)>) + Send + Sync + 'static,
    {
        self.register_callback_arc(op, callback(f));
    }

    /// Register an already-built [`Callback`] for `op`.
    pub fn register_callback_arc(&self, op: Operation, cb: Callback) {
        let replaced = self.shared.registry.insert(op, cb).is_some();
        tracing::debug!(target: "sqlmon", operation = %op, replaced, "callback registered");
    }

    /// Builder form of [`Proxy::register_callback`].
    pub fn with_callback<F>(self, op: Operation, f: F) -> Self
    where
        F: Fn(Operation, Duration, Option<&(dyn StdError + 'static)>) + Send + Sync + 'static,
    {
        self.register_callback(op, f);
        self
    }

    /// Register `cb` for every operation.
    pub fn register_all(&self, cb: impl Into<Callback>) {
        let cb = cb.into();
        for op in Operation::ALL {
            self.register_callback_arc(op, cb.clone());
        }
    }

    /// Remove the callback for `op`. Returns whether one was registered.
    pub fn unregister_callback(&self, op: Operation) -> bool {
        let removed = self.shared.registry.remove(op).is_some();
        if removed {
            tracing::debug!(target: "sqlmon", operation = %op, "callback unregistered");
        }
        removed
    }

    pub fn has_callback(&self, op: Operation) -> bool {
        self.shared.registry.contains(op)
    }

    /// Operations with a registered callback, in taxonomy order.
    pub fn registered_operations(&self) -> Vec<Operation> {
        self.shared.registry.operations()
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.shared.config
    }

    /// Get a reference to the wrapped driver.
    pub fn inner(&self) -> &D {
        &self.origin
    }

    /// Get the wrapped driver, consuming this proxy.
    pub fn into_inner(self) -> D {
        self.origin
    }
}

impl<D: Driver> Driver for Proxy<D> {
    type Error = D::Error;
    type Conn = Conn<D::Conn>;

    async fn open(&self, target: &str) -> Result<Self::Conn, Self::Error> {
        let started = Instant::now();
        let result = self.origin.open(target).await;
        self.shared.report(Operation::DriverOpen, started, &result);

        result.map(|origin| Conn::new(origin, self.shared.clone()))
    }
}

impl<D> std::fmt::Debug for Proxy<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proxy")
            .field("driver", &std::any::type_name::<D>())
            .field("shared", &self.shared)
            .finish()
    }
}
