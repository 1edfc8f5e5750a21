use std::env;

use crate::parse_or;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Enables file logging and the Prometheus exporter.
    pub observability_enabled: bool,
    pub metrics_port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 5000),
            observability_enabled: parse_or(&lookup, "OBSERVABILITY_ENABLED", false),
            metrics_port: parse_or(&lookup, "METRICS_PORT", 9090),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert!(!config.observability_enabled);
        assert_eq!(config.metrics_port, 9090);
    }

    #[test]
    fn test_port_override() {
        let config = ServerConfig::from_lookup(|key| (key == "PORT").then(|| "8080".to_string()));
        assert_eq!(config.port, 8080);
    }
}
