//! Application configuration loaded from environment variables.

use serde::Deserialize;

use crate::metrics::DEFAULT_LATENCY_BUCKETS;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// Interface the HTTP server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    // === Metrics ===
    /// Latency histogram bucket bounds in seconds, comma separated.
    #[serde(default = "default_latency_buckets")]
    pub latency_buckets: Vec<f64>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_latency_buckets() -> Vec<f64> {
    DEFAULT_LATENCY_BUCKETS.to_vec()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("HOST must not be empty".to_string());
        }

        if self.port == 0 {
            return Err("PORT must be greater than 0".to_string());
        }

        if self.latency_buckets.is_empty() {
            return Err("LATENCY_BUCKETS must contain at least one bound".to_string());
        }

        if self
            .latency_buckets
            .iter()
            .any(|b| !b.is_finite() || *b <= 0.0)
        {
            return Err("LATENCY_BUCKETS must be positive finite numbers".to_string());
        }

        if self.latency_buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err("LATENCY_BUCKETS must be strictly increasing".to_string());
        }

        Ok(())
    }

    /// Address the HTTP server binds to.
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            rust_log: default_log_level(),
            latency_buckets: default_latency_buckets(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn from_vars(vars: &[(&str, &str)]) -> Result<Config, envy::Error> {
        envy::from_iter(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }

    #[test]
    fn default_values_are_sensible() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.latency_buckets, DEFAULT_LATENCY_BUCKETS.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_overrides_from_environment() {
        let config = from_vars(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9100"),
            ("LATENCY_BUCKETS", "0.1,0.5,1"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr(), ("127.0.0.1", 9100));
        assert_eq!(config.latency_buckets, vec![0.1, 0.5, 1.0]);
    }

    #[test]
    fn validate_rejects_zero_port() {
        let config = Config {
            port: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_buckets() {
        let config = Config {
            latency_buckets: Vec::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unordered_buckets() {
        let config = Config {
            latency_buckets: vec![0.5, 0.1],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_negative_buckets() {
        let config = Config {
            latency_buckets: vec![-1.0, 0.1],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
