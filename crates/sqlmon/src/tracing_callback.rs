use crate::config::LogConfig;
use crate::error::SqlmonResult;
use crate::operation::Operation;
use crate::registry::{Callback, callback};
use std::error::Error as StdError;
use std::time::Duration;
use tracing::Level;

/// A `tracing`-based callback that emits one event per driver operation.
///
/// Events go to the `sqlmon.driver` target with `operation` and `elapsed`
/// fields, plus `error` when the driver call failed.
///
/// ```rust,ignore
/// let proxy = sqlmon::wrap(driver);
/// proxy.register_all(TracingCallback::new().min_duration(Duration::from_millis(5)));
/// ```
#[derive(Debug, Clone)]
pub struct TracingCallback {
    /// Tracing event level for successful operations.
    pub level: Level,
    /// Skip operations faster than this.
    pub min_duration: Option<Duration>,
    /// Emit failed operations at `WARN` or higher regardless of `level`.
    pub escalate_errors: bool,
}

impl Default for TracingCallback {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            min_duration: None,
            escalate_errors: true,
        }
    }
}

impl TracingCallback {
    /// Create a new callback with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a [`LogConfig`].
    pub fn from_config(config: &LogConfig) -> SqlmonResult<Self> {
        Ok(Self {
            level: config.level()?,
            min_duration: config.min_duration(),
            escalate_errors: true,
        })
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Only log operations slower than this duration.
    pub fn min_duration(mut self, duration: Duration) -> Self {
        self.min_duration = Some(duration);
        self
    }

    /// Log failures at the configured level like everything else.
    pub fn no_escalation(mut self) -> Self {
        self.escalate_errors = false;
        self
    }

    /// Level an event is emitted at, or `None` if it is filtered out.
    pub(crate) fn event_level(
        &self,
        elapsed: Duration,
        error: Option<&(dyn StdError + 'static)>,
    ) -> Option<Level> {
        if let Some(min) = self.min_duration
            && elapsed < min
        {
            return None;
        }
        // Level ordering in tracing: ERROR < WARN < ... < TRACE.
        if error.is_some() && self.escalate_errors && self.level > Level::WARN {
            Some(Level::WARN)
        } else {
            Some(self.level)
        }
    }

    /// Emit the event for one operation.
    pub fn observe(
        &self,
        op: Operation,
        elapsed: Duration,
        error: Option<&(dyn StdError + 'static)>,
    ) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let Some(level) = self.event_level(elapsed, error) else {
            return;
        };

        match error {
            Some(err) => emit_at_level!(
                level,
                target: "sqlmon.driver",
                operation = op.as_str(),
                elapsed = ?elapsed,
                error = %err,
            ),
            None => emit_at_level!(
                level,
                target: "sqlmon.driver",
                operation = op.as_str(),
                elapsed = ?elapsed,
            ),
        }
    }

    /// Turn this into a [`Callback`] for registration.
    pub fn into_callback(self) -> Callback {
        callback(move |op, elapsed, error| self.observe(op, elapsed, error))
    }
}

impl From<TracingCallback> for Callback {
    fn from(cb: TracingCallback) -> Self {
        cb.into_callback()
    }
}
