//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory written by `staysense train`
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    /// Where probabilities come from
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Optional YAML tables; serving refuses to start unless they match the saved ones
    #[serde(default)]
    pub tables: Option<PathBuf>,
}

/// Scoring oracle selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OracleConfig {
    /// Naive Bayes parameters saved next to the other artifacts
    #[default]
    NaiveBayes,
    /// External model server
    Remote { url: String },
}

/// CLI values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ServeOverrides {
    pub artifacts: Option<PathBuf>,
    pub oracle_url: Option<String>,
    pub listen: Option<String>,
    pub port: Option<u16>,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, overrides: &ServeOverrides) -> anyhow::Result<Self> {
        // Fall back to defaults when no file is present
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Some(artifacts) = &overrides.artifacts {
            config.artifacts_dir = artifacts.clone();
        }
        if let Some(url) = &overrides.oracle_url {
            config.oracle = OracleConfig::Remote { url: url.clone() };
        }
        if let Some(listen) = &overrides.listen {
            config.listen = listen.clone();
        }
        if let Some(port) = overrides.port {
            config.port = port;
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            artifacts_dir: default_artifacts_dir(),
            oracle: OracleConfig::default(),
            tables: None,
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("saved_model")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ServerConfig::load("does-not-exist.yaml", &ServeOverrides::default()).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.oracle, OracleConfig::NaiveBayes);
        assert_eq!(config.artifacts_dir, PathBuf::from("saved_model"));
    }

    #[test]
    fn test_yaml_with_remote_oracle() {
        let yaml = "port: 9100\noracle:\n  type: remote\n  url: http://models:8501/score\n";
        let config: ServerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.listen, "0.0.0.0");
        assert_eq!(
            config.oracle,
            OracleConfig::Remote {
                url: "http://models:8501/score".to_string()
            }
        );
    }

    #[test]
    fn test_overrides_win() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"port: 9100\nartifacts_dir: /srv/model\n").unwrap();

        let overrides = ServeOverrides {
            port: Some(7000),
            oracle_url: Some("http://localhost:9/score".to_string()),
            ..Default::default()
        };
        let config = ServerConfig::load(file.path().to_str().unwrap(), &overrides).unwrap();
        assert_eq!(config.port, 7000);
        assert_eq!(config.artifacts_dir, PathBuf::from("/srv/model"));
        assert!(matches!(config.oracle, OracleConfig::Remote { .. }));
    }
}
