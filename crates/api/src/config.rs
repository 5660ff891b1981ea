use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use airwatch_monitor::PollerConfig;
use airwatch_registry::DEFAULT_REGISTRY_PATH;
use airwatch_tasmota::subnet::DEFAULT_TUNNEL_PATTERN;
use airwatch_tasmota::ScanConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). Does not apply to
    /// the WebSocket or the scan stream.
    pub request_timeout_secs: u64,
    /// Upper bound on each post-shutdown cleanup step (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Location of the sensor registry document.
    pub registry_path: PathBuf,
    /// Directory of a built dashboard to serve for unmatched paths.
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `REGISTRY_PATH`        | `sensors.json`             |
    /// | `STATIC_DIR`           | unset (no static files)    |
    ///
    /// Panics on unparsable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);
        let shutdown_timeout_secs: u64 = env_or("SHUTDOWN_TIMEOUT_SECS", 30);

        let registry_path = std::env::var("REGISTRY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_REGISTRY_PATH));

        let static_dir = std::env::var("STATIC_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            registry_path,
            static_dir,
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Polling and scanning knobs.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub poll_interval_ms: u64,
    pub poll_timeout_ms: u64,
    pub scan_batch_size: usize,
    pub scan_timeout_ms: u64,
    /// Fixed scan targets; `None` means detect from local interfaces.
    pub scan_subnets: Option<Vec<String>>,
    /// Regex matched against interface names to skip VPN tunnels.
    pub tunnel_interface_pattern: String,
}

impl MonitorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default              |
    /// |----------------------------|----------------------|
    /// | `POLL_INTERVAL_MS`         | `5000`               |
    /// | `POLL_TIMEOUT_MS`          | `3000`               |
    /// | `SCAN_BATCH_SIZE`          | `20`                 |
    /// | `SCAN_TIMEOUT_MS`          | `800`                |
    /// | `SCAN_SUBNETS`             | unset (detect)       |
    /// | `TUNNEL_INTERFACE_PATTERN` | `utun`               |
    pub fn from_env() -> Self {
        let scan_subnets = std::env::var("SCAN_SUBNETS").ok().and_then(|raw| {
            let subnets: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            (!subnets.is_empty()).then_some(subnets)
        });

        Self {
            poll_interval_ms: env_or("POLL_INTERVAL_MS", 5000),
            poll_timeout_ms: env_or("POLL_TIMEOUT_MS", 3000),
            scan_batch_size: env_or("SCAN_BATCH_SIZE", 20),
            scan_timeout_ms: env_or("SCAN_TIMEOUT_MS", 800),
            scan_subnets,
            tunnel_interface_pattern: std::env::var("TUNNEL_INTERFACE_PATTERN")
                .unwrap_or_else(|_| DEFAULT_TUNNEL_PATTERN.into()),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: self.poll_interval(),
            request_timeout: Duration::from_millis(self.poll_timeout_ms),
        }
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            batch_size: self.scan_batch_size,
            timeout: Duration::from_millis(self.scan_timeout_ms),
            subnets: self.scan_subnets.clone(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5000,
            poll_timeout_ms: 3000,
            scan_batch_size: 20,
            scan_timeout_ms: 800,
            scan_subnets: None,
            tunnel_interface_pattern: DEFAULT_TUNNEL_PATTERN.into(),
        }
    }
}

fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a valid number: {e}")),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_defaults_map_to_component_configs() {
        let config = MonitorConfig::default();

        let poller = config.poller_config();
        assert_eq!(poller.interval, Duration::from_millis(5000));
        assert_eq!(poller.request_timeout, Duration::from_millis(3000));

        let scan = config.scan_config();
        assert_eq!(scan.batch_size, 20);
        assert_eq!(scan.timeout, Duration::from_millis(800));
        assert!(scan.subnets.is_none());
    }
}
