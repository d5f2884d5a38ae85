use crate::error::{SqlmonError, SqlmonResult};
use crate::operation::Operation;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Which operation a statement close is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtCloseRouting {
    /// Report as [`Operation::StmtClose`].
    #[default]
    Distinct,
    /// Report as [`Operation::ConnBegin`], matching deployments that were
    /// built against the older mis-tagged behavior.
    Legacy,
}

impl StmtCloseRouting {
    pub(crate) fn operation(self) -> Operation {
        match self {
            StmtCloseRouting::Distinct => Operation::StmtClose,
            StmtCloseRouting::Legacy => Operation::ConnBegin,
        }
    }
}

/// Configuration for a driver proxy.
///
/// By default callbacks are enabled and callback panics are isolated from the
/// caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
    /// Whether registered callbacks are invoked at all.
    pub enabled: bool,
    /// Routing for statement close events.
    pub stmt_close_routing: StmtCloseRouting,
    /// Catch and log callback panics instead of unwinding into the caller.
    pub isolate_callback_panics: bool,
    /// Install a `TracingCallback` when the proxy is configured.
    pub log: Option<LogConfig>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stmt_close_routing: StmtCloseRouting::Distinct,
            isolate_callback_panics: true,
            log: None,
        }
    }
}

impl ProxyConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable callbacks.
    pub fn enable(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Disable callbacks. Driver results are still forwarded unchanged.
    pub fn disable(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Choose how statement close is reported.
    pub fn with_stmt_close_routing(mut self, routing: StmtCloseRouting) -> Self {
        self.stmt_close_routing = routing;
        self
    }

    /// Let callback panics unwind into the caller of the wrapped method.
    ///
    /// The driver call has already completed when the callback runs, but its
    /// result is lost to the caller when the panic propagates.
    pub fn propagate_callback_panics(mut self) -> Self {
        self.isolate_callback_panics = false;
        self
    }

    /// Install a tracing callback for the operations named in `log`.
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = Some(log);
        self
    }

    /// Parse a configuration from TOML.
    pub fn from_toml_str(raw: &str) -> SqlmonResult<Self> {
        let config: ProxyConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> SqlmonResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            SqlmonError::Config(msg) => {
                SqlmonError::config(format!("failed to parse {}: {msg}", path.display()))
            }
            other => other,
        })
    }

    fn validate(&self) -> SqlmonResult<()> {
        if let Some(log) = &self.log {
            log.level()?;
        }
        Ok(())
    }
}

/// Settings for the tracing callback installed from configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`.
    pub level: String,
    /// Skip events faster than this many milliseconds.
    pub min_duration_ms: Option<u64>,
    /// Operations to log. Empty means all of them.
    pub operations: Vec<Operation>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            min_duration_ms: None,
            operations: Vec::new(),
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> SqlmonResult<tracing::Level> {
        self.level
            .parse()
            .map_err(|_| SqlmonError::InvalidLevel(self.level.clone()))
    }

    pub fn min_duration(&self) -> Option<Duration> {
        self.min_duration_ms.map(Duration::from_millis)
    }

    /// Operations this config applies to.
    pub fn operations(&self) -> Vec<Operation> {
        if self.operations.is_empty() {
            Operation::ALL.to_vec()
        } else {
            self.operations.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_callbacks_and_isolate_panics() {
        let config = ProxyConfig::new();
        assert!(config.enabled);
        assert!(config.isolate_callback_panics);
        assert_eq!(config.stmt_close_routing, StmtCloseRouting::Distinct);
        assert!(config.log.is_none());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ProxyConfig::from_toml_str("").unwrap();
        assert!(config.enabled);
        assert_eq!(config.stmt_close_routing, StmtCloseRouting::Distinct);
    }

    #[test]
    fn parses_full_toml() {
        let config = ProxyConfig::from_toml_str(
            r#"
            enabled = false
            stmt_close_routing = "legacy"
            isolate_callback_panics = false

            [log]
            level = "info"
            min_duration_ms = 25
            operations = ["stmt.exec", "stmt.Query"]
            "#,
        )
        .unwrap();

        assert!(!config.enabled);
        assert!(!config.isolate_callback_panics);
        assert_eq!(config.stmt_close_routing, StmtCloseRouting::Legacy);

        let log = config.log.unwrap();
        assert_eq!(log.level().unwrap(), tracing::Level::INFO);
        assert_eq!(log.min_duration(), Some(Duration::from_millis(25)));
        assert_eq!(
            log.operations(),
            vec![Operation::StmtExec, Operation::StmtQuery]
        );
    }

    #[test]
    fn unknown_operation_is_a_config_error() {
        let err = ProxyConfig::from_toml_str(
            r#"
            [log]
            operations = ["rows.next"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SqlmonError::Config(_)));
        assert!(err.to_string().contains("rows.next"));
    }

    #[test]
    fn invalid_level_is_rejected() {
        let err = ProxyConfig::from_toml_str(
            r#"
            [log]
            level = "loud"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SqlmonError::InvalidLevel(ref l) if l == "loud"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(ProxyConfig::from_toml_str("retries = 3").is_err());
    }

    #[test]
    fn empty_operation_list_means_all() {
        assert_eq!(LogConfig::new().operations(), Operation::ALL.to_vec());
    }

    #[test]
    fn legacy_routing_reports_conn_begin() {
        assert_eq!(StmtCloseRouting::Legacy.operation(), Operation::ConnBegin);
        assert_eq!(StmtCloseRouting::Distinct.operation(), Operation::StmtClose);
    }

    #[test]
    fn load_reports_missing_file_as_io() {
        let err = ProxyConfig::load("/definitely/not/here/sqlmon.toml").unwrap_err();
        assert!(matches!(err, SqlmonError::Io(_)));
    }
}
