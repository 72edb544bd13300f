use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use vitals_cloud::DEFAULT_CONTAINER;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// LogFormat
// ---------------------------------------------------------------------------

/// Output format of the `fmt` tracing layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected 'text' or 'json', got '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// WorkerConfig
// ---------------------------------------------------------------------------

/// Worker configuration loaded from environment variables.
///
/// Empty values count as unset. Secrets are kept out of the `Debug` output.
#[derive(Clone)]
pub struct WorkerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port handed over by the function host (default: `3000`).
    pub port: u16,
    /// Per-invocation timeout in seconds (default: `300`).
    pub request_timeout_secs: u64,
    /// Event hub the batch trigger reads from. Only logged.
    pub event_hub_name: Option<String>,
    /// Whether the trigger's connection string is present. Only logged.
    pub event_hub_connection_set: bool,
    /// Consumer group of the batch trigger. Only logged.
    pub consumer_group: String,
    /// Storage account connection string; unset disables persistence.
    pub storage_connection_string: Option<String>,
    /// Container processed records are written to.
    pub container_name: String,
    /// Alert endpoint; unset disables notifications.
    pub webhook_url: Option<String>,
    pub webhook_timeout_secs: u64,
    pub storage_timeout_secs: u64,
    pub log_format: LogFormat,
}

impl WorkerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                          | Default      |
    /// |----------------------------------|--------------|
    /// | `HOST`                           | `127.0.0.1`  |
    /// | `FUNCTIONS_CUSTOMHANDLER_PORT`   | `3000`       |
    /// | `REQUEST_TIMEOUT_SECS`           | `300`        |
    /// | `IoTHubEventHubName`             | unset        |
    /// | `IoTHubEventHubConnectionString` | unset        |
    /// | `IoTHubConsumerGroup`            | `$Default`   |
    /// | `ProcessedBlobConnectionString`  | unset        |
    /// | `ProcessedBlobContainerName`     | `processed`  |
    /// | `LOGIC_APP_URL`                  | unset        |
    /// | `WEBHOOK_TIMEOUT_SECS`           | `30`         |
    /// | `STORAGE_TIMEOUT_SECS`           | `30`         |
    /// | `LOG_FORMAT`                     | `text`       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: parse_or(&get, "FUNCTIONS_CUSTOMHANDLER_PORT", 3000)?,
            request_timeout_secs: parse_secs(&get, "REQUEST_TIMEOUT_SECS", 300)?,
            event_hub_name: get("IoTHubEventHubName"),
            event_hub_connection_set: get("IoTHubEventHubConnectionString").is_some(),
            consumer_group: get("IoTHubConsumerGroup").unwrap_or_else(|| "$Default".into()),
            storage_connection_string: get("ProcessedBlobConnectionString"),
            container_name: get("ProcessedBlobContainerName")
                .unwrap_or_else(|| DEFAULT_CONTAINER.into()),
            webhook_url: get("LOGIC_APP_URL"),
            webhook_timeout_secs: parse_secs(&get, "WEBHOOK_TIMEOUT_SECS", 30)?,
            storage_timeout_secs: parse_secs(&get, "STORAGE_TIMEOUT_SECS", 30)?,
            log_format: parse_or(&get, "LOG_FORMAT", LogFormat::Text)?,
        })
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_secs)
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage_timeout_secs)
    }
}

impl fmt::Debug for WorkerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("event_hub_name", &self.event_hub_name)
            .field("event_hub_connection_set", &self.event_hub_connection_set)
            .field("consumer_group", &self.consumer_group)
            .field(
                "storage_connection_string",
                &self.storage_connection_string.as_ref().map(|_| "<redacted>"),
            )
            .field("container_name", &self.container_name)
            .field("webhook_url", &self.webhook_url.as_ref().map(|_| "<redacted>"))
            .field("webhook_timeout_secs", &self.webhook_timeout_secs)
            .field("storage_timeout_secs", &self.storage_timeout_secs)
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

/// A timeout in whole seconds; zero is rejected.
fn parse_secs<G>(get: &G, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match parse_or(get, key, default)? {
        0 => Err(ConfigError::Invalid {
            key,
            value: "0".into(),
            reason: "must be at least 1 second".into(),
        }),
        secs => Ok(secs),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
