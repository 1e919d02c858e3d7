use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Broker settings.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use permission_broker::BrokerConfig;
///
/// let config = BrokerConfig::from_json(r#"{ "decision_timeout_ms": 30000 }"#).unwrap();
/// assert_eq!(config.decision_timeout(), Some(Duration::from_secs(30)));
/// assert!(config.audit);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    /// Deny a request if the authority has not answered within this many
    /// milliseconds. `None` waits indefinitely.
    pub decision_timeout_ms: Option<u64>,
    /// Emit an audit event for every delivered decision.
    pub audit: bool,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            decision_timeout_ms: None,
            audit: true,
        }
    }
}

impl BrokerConfig {
    /// Parses and validates a JSON document. Missing fields take defaults.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the decision timeout.
    pub fn with_decision_timeout(mut self, timeout: Duration) -> Self {
        self.decision_timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    /// The decision timeout as a `Duration`.
    pub fn decision_timeout(&self) -> Option<Duration> {
        self.decision_timeout_ms.map(Duration::from_millis)
    }

    /// Checks invariants not expressed by the types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decision_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
