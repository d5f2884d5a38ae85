use crate::error::SqlmonError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The driver-level operation a callback is registered for.
///
/// Each variant corresponds to exactly one intercepted method. The string form
/// returned by [`Operation::as_str`] is stable and is what gets logged and
/// (de)serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// `Driver::open`
    DriverOpen,
    /// `Connection::begin`
    ConnBegin,
    /// `Connection::close`
    ConnClose,
    /// `Connection::prepare`
    ConnPrepare,
    /// `Transaction::commit`
    TxCommit,
    /// `Transaction::rollback`
    TxRollback,
    /// `Statement::close`
    StmtClose,
    /// `Statement::exec`
    StmtExec,
    /// `Statement::query`
    StmtQuery,
}

/// The capability that emits an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Driver,
    Connection,
    Transaction,
    Statement,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 9] = [
        Operation::DriverOpen,
        Operation::ConnBegin,
        Operation::ConnClose,
        Operation::ConnPrepare,
        Operation::TxCommit,
        Operation::TxRollback,
        Operation::StmtClose,
        Operation::StmtExec,
        Operation::StmtQuery,
    ];

    /// Stable name, e.g. `"stmt.exec"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Operation::DriverOpen => "driver.open",
            Operation::ConnBegin => "conn.begin",
            Operation::ConnClose => "conn.close",
            Operation::ConnPrepare => "conn.prepare",
            Operation::TxCommit => "tx.commit",
            Operation::TxRollback => "tx.rollback",
            Operation::StmtClose => "stmt.close",
            Operation::StmtExec => "stmt.exec",
            Operation::StmtQuery => "stmt.query",
        }
    }

    /// Which wrapper reports this operation.
    pub const fn capability(self) -> Capability {
        match self {
            Operation::DriverOpen => Capability::Driver,
            Operation::ConnBegin | Operation::ConnClose | Operation::ConnPrepare => {
                Capability::Connection
            }
            Operation::TxCommit | Operation::TxRollback => Capability::Transaction,
            Operation::StmtClose | Operation::StmtExec | Operation::StmtQuery => {
                Capability::Statement
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = SqlmonError;

    /// Parse an operation name.
    ///
    /// Matching is ASCII case-insensitive, so both `stmt.exec` and the older
    /// `stmt.Exec` spelling are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| SqlmonError::unknown_operation(name))
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
