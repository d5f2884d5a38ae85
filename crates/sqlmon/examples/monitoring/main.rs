//! Example demonstrating driver monitoring via a wrapped driver.
//!
//! Run with:
//!   RUST_LOG=sqlmon=debug cargo run --example monitoring -p sqlmon
//!
//! Uses a tiny in-memory driver so no database is required.

use sqlmon::{
    Connection, Driver, ExecResult, LogConfig, Operation, ProxyConfig, Statement, Transaction,
    Value, wrap,
};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
struct MemError(String);

impl fmt::Display for MemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MemError {}

/// Rows shared by every connection; a transaction stages rows until commit.
#[derive(Clone, Default)]
struct MemDriver {
    rows: Arc<Mutex<Vec<String>>>,
}

struct MemConn {
    rows: Arc<Mutex<Vec<String>>>,
    staged: Arc<Mutex<Option<Vec<String>>>>,
}

struct MemTx {
    rows: Arc<Mutex<Vec<String>>>,
    staged: Arc<Mutex<Option<Vec<String>>>>,
}

struct MemStmt {
    sql: String,
    rows: Arc<Mutex<Vec<String>>>,
    staged: Arc<Mutex<Option<Vec<String>>>>,
}

impl Driver for MemDriver {
    type Error = MemError;
    type Conn = MemConn;

    async fn open(&self, target: &str) -> Result<MemConn, MemError> {
        if target != "mem://" {
            return Err(MemError(format!("unsupported target: {target}")));
        }
        Ok(MemConn {
            rows: self.rows.clone(),
            staged: Arc::new(Mutex::new(None)),
        })
    }
}

impl Connection for MemConn {
    type Error = MemError;
    type Tx = MemTx;
    type Stmt = MemStmt;

    async fn begin(&mut self) -> Result<MemTx, MemError> {
        let mut staged = self.staged.lock().unwrap();
        if staged.is_some() {
            return Err(MemError("transaction already open".into()));
        }
        *staged = Some(Vec::new());
        Ok(MemTx {
            rows: self.rows.clone(),
            staged: self.staged.clone(),
        })
    }

    async fn close(&mut self) -> Result<(), MemError> {
        Ok(())
    }

    async fn prepare(&mut self, query: &str) -> Result<MemStmt, MemError> {
        let sql = query.trim().to_ascii_uppercase();
        if !(sql.starts_with("INSERT") || sql.starts_with("SELECT")) {
            return Err(MemError(format!("unsupported statement: {query}")));
        }
        Ok(MemStmt {
            sql,
            rows: self.rows.clone(),
            staged: self.staged.clone(),
        })
    }
}

impl Transaction for MemTx {
    type Error = MemError;

    async fn commit(self) -> Result<(), MemError> {
        let staged = self.staged.lock().unwrap().take().unwrap_or_default();
        self.rows.lock().unwrap().extend(staged);
        Ok(())
    }

    async fn rollback(self) -> Result<(), MemError> {
        self.staged.lock().unwrap().take();
        Ok(())
    }
}

impl Statement for MemStmt {
    type Error = MemError;
    type Rows = Vec<String>;

    async fn close(&mut self) -> Result<(), MemError> {
        Ok(())
    }

    fn param_count(&self) -> Option<usize> {
        Some(self.sql.matches('?').count())
    }

    async fn exec(&mut self, args: &[Value]) -> Result<ExecResult, MemError> {
        let Some(Value::Text(name)) = args.first() else {
            return Err(MemError("expected one text argument".into()));
        };
        let mut staged = self.staged.lock().unwrap();
        match staged.as_mut() {
            Some(pending) => pending.push(name.clone()),
            None => self.rows.lock().unwrap().push(name.clone()),
        }
        Ok(ExecResult::affected(1))
    }

    async fn query(&mut self, _args: &[Value]) -> Result<Vec<String>, MemError> {
        Ok(self.rows.lock().unwrap().clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sqlmon=debug".into()),
        )
        .init();

    let config = ProxyConfig::new().with_log(LogConfig::new());
    let proxy = wrap(MemDriver::default()).with_config(config)?;

    // Replace the logging callback for exec with one that flags slow writes.
    proxy.register_callback(Operation::StmtExec, |op, elapsed, err| {
        if elapsed > Duration::from_millis(1) || err.is_some() {
            eprintln!("[sqlmon] {op} slow or failed: {elapsed:?} {err:?}");
        }
    });

    let mut conn = proxy.open("mem://").await?;

    let tx = conn.begin().await?;
    let mut insert = conn.prepare("INSERT INTO names VALUES (?)").await?;
    insert.exec(&["alice".into()]).await?;
    insert.exec(&["bob".into()]).await?;
    tx.commit().await?;

    let tx = conn.begin().await?;
    insert.exec(&["mallory".into()]).await?;
    tx.rollback().await?;

    // A failing call is reported and the driver's error comes back untouched.
    if let Err(e) = insert.exec(&[]).await {
        println!("exec failed as expected: {e}");
    }
    insert.close().await?;

    let mut select = conn.prepare("SELECT name FROM names").await?;
    let names = select.query(&[]).await?;
    println!("names: {names:?}");
    select.close().await?;

    if let Err(e) = conn.prepare("DROP TABLE names").await {
        println!("prepare failed as expected: {e}");
    }

    conn.close().await?;
    Ok(())
}
