//! Configuration handling

use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use vitrine_rules::{default_route_specs, RouteSpec, RouteTable};

/// Gateway configuration file
#[derive(Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Upstream timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Ordered routes; the last one must be mounted at "/"
    #[serde(default = "default_route_specs")]
    pub routes: Vec<RouteSpec>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            timeouts: TimeoutConfig::default(),
            routes: default_route_specs(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:4000".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Upper bound for TCP connect plus HTTP handshake
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Upper bound for the upstream response head
    #[serde(default = "default_response_timeout")]
    pub response_timeout_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            response_timeout_secs: default_response_timeout(),
        }
    }
}

impl TimeoutConfig {
    /// Reject zero durations
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.connect_timeout_secs > 0,
            "timeouts.connect_timeout_secs must be greater than zero"
        );
        ensure!(
            self.response_timeout_secs > 0,
            "timeouts.response_timeout_secs must be greater than zero"
        );
        Ok(())
    }

    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn response(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }
}

fn default_connect_timeout() -> u64 {
    5
}
fn default_response_timeout() -> u64 {
    30
}

impl GatewayConfig {
    /// Load config from a file path, falling back to defaults when it is missing
    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path).to_string();
        let path = Path::new(&expanded);

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: GatewayConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config
            .timeouts
            .validate()
            .with_context(|| format!("invalid timeouts in {}", path.display()))?;
        Ok(config)
    }

    /// Validate the routes into a table
    pub fn route_table(&self) -> Result<RouteTable> {
        RouteTable::from_specs(&self.routes).context("invalid route table")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen, "0.0.0.0:4000");
        assert_eq!(config.timeouts.connect_timeout_secs, 5);
        assert_eq!(config.timeouts.response_timeout_secs, 30);
        assert_eq!(config.routes.len(), 2);
        assert!(config.route_table().is_ok());
    }

    #[test]
    fn test_load_nonexistent_file_returns_default() {
        let config = GatewayConfig::load("/nonexistent/path/gateway.toml").unwrap();
        assert_eq!(config.listen, "0.0.0.0:4000");
        assert_eq!(config.routes, default_route_specs());
    }

    #[test]
    fn test_load_valid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
listen = "127.0.0.1:8088"

[timeouts]
connect_timeout_secs = 2
response_timeout_secs = 10

[[routes]]
name = "admin"
match_prefix = "/admin"
rewrite_from = "/admin"
rewrite_to = "/"
upstream = "http://10.0.0.5:3200"

[[routes]]
name = "storefront"
match_prefix = "/"
upstream = "http://10.0.0.6:3000"
"#
        )
        .unwrap();

        let config = GatewayConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.listen, "127.0.0.1:8088");
        assert_eq!(config.timeouts.connect(), Duration::from_secs(2));
        assert_eq!(config.timeouts.response(), Duration::from_secs(10));

        let table = config.route_table().unwrap();
        let matched = table.resolve("/admin/org/acme");
        assert_eq!(matched.rule.upstream().authority(), "10.0.0.5:3200");
        assert_eq!(matched.forward_path, "/org/acme");
    }

    #[test]
    fn test_load_partial_toml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"listen = "127.0.0.1:9000""#).unwrap();

        let config = GatewayConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.listen, "127.0.0.1:9000");
        assert_eq!(config.timeouts.connect_timeout_secs, 5);
        assert_eq!(config.routes, default_route_specs());
    }

    #[test]
    fn test_routes_without_catch_all_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[routes]]
name = "admin"
match_prefix = "/admin"
upstream = "http://localhost:3200"
"#
        )
        .unwrap();

        let config = GatewayConfig::load(file.path().to_str().unwrap()).unwrap();
        let err = config.route_table().unwrap_err();
        assert!(format!("{err:#}").contains("catch-all"));
    }

    #[test]
    fn test_zero_timeouts_are_rejected() {
        for (field, other) in [
            ("connect_timeout_secs", "response_timeout_secs"),
            ("response_timeout_secs", "connect_timeout_secs"),
        ] {
            let mut file = NamedTempFile::new().unwrap();
            writeln!(file, "[timeouts]\n{field} = 0\n{other} = 3").unwrap();

            let err = GatewayConfig::load(file.path().to_str().unwrap()).unwrap_err();
            let message = format!("{err:#}");
            assert!(message.contains(field), "{message}");
            assert!(message.contains("greater than zero"), "{message}");
        }
        assert!(TimeoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[[[not valid toml").unwrap();
        assert!(GatewayConfig::load(file.path().to_str().unwrap()).is_err());
    }
}
