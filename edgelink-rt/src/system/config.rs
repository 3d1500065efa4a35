//! System configuration with sensible defaults.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Default namespace prefixed onto every metric name
pub const DEFAULT_METRICS_NAMESPACE: &str = "edgelink";

/// Default per-call timeout (10 seconds)
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Default retry budget surfaced to higher layers (core never retries)
pub const DEFAULT_MAX_RETRIES: u32 = 0;

/// Default label attached to this system's log records
pub const DEFAULT_LOGGER_LABEL: &str = "edgelink-rt";

/// Default minimum grace period for draining on shutdown (5 seconds)
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Configuration for one actor system instance.
///
/// Nothing here is global; two systems in one process can run with
/// different settings.
///
/// # Examples
///
/// ```rust
/// use edgelink_rt::system::SystemConfig;
/// use std::time::Duration;
///
/// let config = SystemConfig::builder()
///     .with_call_timeout(Duration::from_millis(250))
///     .with_metrics_namespace("chat")
///     .build()
///     .unwrap();
/// assert_eq!(config.call_timeout, Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Namespace prefixed onto metric names
    pub metrics_namespace: String,

    /// Per-call timeout applied to every remote call.
    /// Zero is permitted and times the call out on the next turn.
    pub call_timeout: Duration,

    /// Retry budget surfaced to higher layers; the core retries nothing
    pub max_retries: u32,

    /// Label identifying this system in log records
    pub logger_label: String,

    /// Whether outbound calls stamp a fresh trace id when none is given
    pub trace_propagation: bool,

    /// Minimum grace period granted to in-flight calls on shutdown
    pub shutdown_grace: Duration,

    /// Actor ids handed out by `assign_id` before generating fresh ones
    pub preassigned_ids: Vec<String>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            metrics_namespace: DEFAULT_METRICS_NAMESPACE.to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            logger_label: DEFAULT_LOGGER_LABEL.to_string(),
            trace_propagation: true,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            preassigned_ids: Vec::new(),
        }
    }
}

impl SystemConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SystemConfigBuilder {
        SystemConfigBuilder::default()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.metrics_namespace.is_empty() {
            return Err("metrics_namespace must not be empty".to_string());
        }
        if self.logger_label.is_empty() {
            return Err("logger_label must not be empty".to_string());
        }
        Ok(())
    }
}

/// Builder for [`SystemConfig`] with a fluent API.
#[derive(Debug, Default)]
pub struct SystemConfigBuilder {
    config: SystemConfig,
}

impl SystemConfigBuilder {
    /// Set the metrics namespace.
    pub fn with_metrics_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.metrics_namespace = namespace.into();
        self
    }

    /// Set the per-call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.config.call_timeout = timeout;
        self
    }

    /// Set the retry budget surfaced to higher layers.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the logger label.
    pub fn with_logger_label(mut self, label: impl Into<String>) -> Self {
        self.config.logger_label = label.into();
        self
    }

    /// Enable or disable trace id stamping on outbound calls.
    pub fn with_trace_propagation(mut self, enabled: bool) -> Self {
        self.config.trace_propagation = enabled;
        self
    }

    /// Set the minimum shutdown grace period.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.config.shutdown_grace = grace;
        self
    }

    /// Seed ids handed out by `assign_id` before generating fresh ones.
    pub fn with_preassigned_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.preassigned_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<SystemConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SystemConfig::default();
        assert_eq!(config.metrics_namespace, "edgelink");
        assert_eq!(config.call_timeout, Duration::from_secs(10));
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.logger_label, "edgelink-rt");
        assert!(config.trace_propagation);
        assert!(config.preassigned_ids.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_builder_options() {
        let config = SystemConfig::builder()
            .with_metrics_namespace("chat")
            .with_call_timeout(Duration::from_millis(50))
            .with_max_retries(3)
            .with_logger_label("chat-client")
            .with_trace_propagation(false)
            .with_shutdown_grace(Duration::from_secs(1))
            .with_preassigned_ids(["chat-server"])
            .build()
            .unwrap();

        assert_eq!(config.metrics_namespace, "chat");
        assert_eq!(config.call_timeout, Duration::from_millis(50));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.logger_label, "chat-client");
        assert!(!config.trace_propagation);
        assert_eq!(config.shutdown_grace, Duration::from_secs(1));
        assert_eq!(config.preassigned_ids, vec!["chat-server".to_string()]);
    }

    #[test]
    fn test_zero_call_timeout_is_permitted() {
        let config = SystemConfig::builder()
            .with_call_timeout(Duration::ZERO)
            .build()
            .unwrap();
        assert_eq!(config.call_timeout, Duration::ZERO);
    }

    #[test]
    fn test_empty_namespace_rejected() {
        let result = SystemConfig::builder().with_metrics_namespace("").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_logger_label_rejected() {
        let result = SystemConfig::builder().with_logger_label("").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = SystemConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.call_timeout, config.call_timeout);
        assert_eq!(back.metrics_namespace, config.metrics_namespace);
    }
}
