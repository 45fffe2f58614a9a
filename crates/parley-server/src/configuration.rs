use config::{Config, Environment};
use parley::runtime::{ollama, OllamaConfig};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Failed to parse socket address")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default = "default_runtime_host")]
    pub host: String,
    #[serde(default = "default_runtime_model")]
    pub model: String,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            host: default_runtime_host(),
            model: default_runtime_model(),
        }
    }
}

impl RuntimeSettings {
    pub fn into_config(self) -> OllamaConfig {
        OllamaConfig {
            host: self.host,
            model: self.model,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "default_uploads_dir")]
    pub dir: PathBuf,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: default_uploads_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub runtime: RuntimeSettings,
    #[serde(default)]
    pub uploads: UploadSettings,
}

impl Settings {
    /// Environment variables layer over the defaults, e.g.
    /// `PARLEY_SERVER__PORT=8080` or `PARLEY_RUNTIME__HOST=http://ollama:11434`.
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("PARLEY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_runtime_host() -> String {
    ollama::OLLAMA_HOST.to_string()
}

fn default_runtime_model() -> String {
    ollama::OLLAMA_MODEL.to_string()
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("PARLEY_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 3001);
        assert_eq!(settings.runtime.host, ollama::OLLAMA_HOST);
        assert_eq!(settings.runtime.model, ollama::OLLAMA_MODEL);
        assert_eq!(settings.uploads.dir, PathBuf::from("uploads"));
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("PARLEY_SERVER__PORT", "8080");
        env::set_var("PARLEY_RUNTIME__HOST", "http://ollama.internal:11434");
        env::set_var("PARLEY_RUNTIME__MODEL", "llama3.2");
        env::set_var("PARLEY_UPLOADS__DIR", "/var/parley/uploads");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.runtime.host, "http://ollama.internal:11434");
        assert_eq!(settings.runtime.model, "llama3.2");
        assert_eq!(settings.uploads.dir, PathBuf::from("/var/parley/uploads"));

        env::remove_var("PARLEY_SERVER__PORT");
        env::remove_var("PARLEY_RUNTIME__HOST");
        env::remove_var("PARLEY_RUNTIME__MODEL");
        env::remove_var("PARLEY_UPLOADS__DIR");
    }

    #[test]
    fn test_socket_addr_conversion() {
        let server_settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 3001,
        };
        assert_eq!(server_settings.socket_addr().to_string(), "127.0.0.1:3001");
    }
}
