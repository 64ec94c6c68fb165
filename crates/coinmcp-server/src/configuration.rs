use crate::error::{to_env_var, ConfigError};
use coinmcp::coingecko::{CoinGeckoConfig, COINGECKO_BASE_URL, REQUEST_TIMEOUT_SECS};
use coinmcp::providers::{
    configs::{
        OllamaProviderConfig, OpenAiProviderConfig, ProviderConfig,
        DEFAULT_PROVIDER_TIMEOUT_SECS,
    },
    ollama, openai,
};
use config::{Config, Environment};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

pub const DEFAULT_API_KEY: &str = "demo-key-12345";

#[derive(Debug, Deserialize)]
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
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CoinGeckoSettings {
    #[serde(default = "default_coingecko_base_url")]
    pub base_url: String,
    #[serde(default = "default_coingecko_timeout")]
    pub timeout_secs: u64,
}

impl Default for CoinGeckoSettings {
    fn default() -> Self {
        Self {
            base_url: default_coingecko_base_url(),
            timeout_secs: default_coingecko_timeout(),
        }
    }
}

impl CoinGeckoSettings {
    pub fn into_config(self) -> CoinGeckoConfig {
        CoinGeckoConfig {
            base_url: self.base_url,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ProviderSettings {
    OpenAi {
        #[serde(default = "default_openai_host")]
        host: String,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default = "default_provider_timeout")]
        timeout_secs: u64,
    },
    Ollama {
        #[serde(default = "default_ollama_host")]
        host: String,
        #[serde(default = "default_ollama_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default = "default_provider_timeout")]
        timeout_secs: u64,
    },
}

impl ProviderSettings {
    // Convert to the coinmcp ProviderConfig
    pub fn into_config(self) -> Result<ProviderConfig, ConfigError> {
        match self {
            ProviderSettings::OpenAi {
                host,
                api_key,
                model,
                temperature,
                timeout_secs,
            } => {
                let api_key = api_key.ok_or_else(|| ConfigError::MissingEnvVar {
                    env_var: to_env_var("provider.api_key"),
                })?;
                Ok(ProviderConfig::OpenAi(OpenAiProviderConfig {
                    host,
                    api_key,
                    model,
                    temperature,
                    timeout: Duration::from_secs(timeout_secs),
                }))
            }
            ProviderSettings::Ollama {
                host,
                model,
                temperature,
                timeout_secs,
            } => Ok(ProviderConfig::Ollama(OllamaProviderConfig {
                host,
                model,
                temperature,
                timeout: Duration::from_secs(timeout_secs),
            })),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub coingecko: CoinGeckoSettings,
    pub provider: ProviderSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("auth.api_key", default_api_key())?
            .set_default("provider.type", "ollama")?
            .add_source(
                Environment::with_prefix("COINMCP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                // "missing field `type`" carries the bare field name only
                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }

    pub fn uses_default_api_key(&self) -> bool {
        self.auth.api_key == DEFAULT_API_KEY
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_api_key() -> String {
    DEFAULT_API_KEY.to_string()
}

fn default_coingecko_base_url() -> String {
    COINGECKO_BASE_URL.to_string()
}

fn default_coingecko_timeout() -> u64 {
    REQUEST_TIMEOUT_SECS
}

fn default_provider_timeout() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT_SECS
}

fn default_openai_host() -> String {
    openai::OPENAI_HOST.to_string()
}

fn default_openai_model() -> String {
    openai::OPENAI_MODEL.to_string()
}

fn default_ollama_host() -> String {
    ollama::OLLAMA_HOST.to_string()
}

fn default_ollama_model() -> String {
    ollama::OLLAMA_MODEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("COINMCP_") {
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
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.auth.api_key, "demo-key-12345");
        assert!(settings.uses_default_api_key());
        assert_eq!(settings.coingecko.base_url, COINGECKO_BASE_URL);
        assert_eq!(settings.coingecko.timeout_secs, 10);

        if let ProviderSettings::Ollama {
            host,
            model,
            temperature,
            timeout_secs,
        } = settings.provider
        {
            assert_eq!(host, "http://localhost:11434");
            assert_eq!(model, "llama3.1:8b");
            assert_eq!(temperature, None);
            assert_eq!(timeout_secs, 30);
        } else {
            panic!("Expected Ollama provider");
        }
    }

    #[test]
    #[serial]
    fn test_openai_settings() {
        clean_env();
        env::set_var("COINMCP_PROVIDER__TYPE", "openai");
        env::set_var("COINMCP_PROVIDER__API_KEY", "sk-test");
        env::set_var("COINMCP_PROVIDER__MODEL", "gpt-4o");
        env::set_var("COINMCP_PROVIDER__TEMPERATURE", "0.2");
        env::set_var("COINMCP_PROVIDER__TIMEOUT_SECS", "45");

        let settings = Settings::new().unwrap();
        match settings.provider.into_config().unwrap() {
            ProviderConfig::OpenAi(config) => {
                assert_eq!(config.host, "https://api.openai.com");
                assert_eq!(config.api_key, "sk-test");
                assert_eq!(config.model, "gpt-4o");
                assert_eq!(config.temperature, Some(0.2));
                assert_eq!(config.timeout, Duration::from_secs(45));
            }
            other => panic!("Expected OpenAI provider, got {:?}", other),
        }

        clean_env();
    }

    #[test]
    #[serial]
    fn test_openai_requires_api_key() {
        clean_env();
        env::set_var("COINMCP_PROVIDER__TYPE", "openai");

        let settings = Settings::new().unwrap();
        match settings.provider.into_config() {
            Err(ConfigError::MissingEnvVar { env_var }) => {
                assert_eq!(env_var, "COINMCP_PROVIDER__API_KEY");
            }
            other => panic!("Expected missing env var error, got {:?}", other),
        }

        clean_env();
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("COINMCP_SERVER__PORT", "9090");
        env::set_var("COINMCP_SERVER__HOST", "0.0.0.0");
        env::set_var("COINMCP_AUTH__API_KEY", "s3cret-key");
        env::set_var("COINMCP_COINGECKO__BASE_URL", "http://localhost:1234");
        env::set_var("COINMCP_COINGECKO__TIMEOUT_SECS", "3");
        env::set_var("COINMCP_PROVIDER__HOST", "http://ollama.internal:11434");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.auth.api_key, "s3cret-key");
        assert!(!settings.uses_default_api_key());

        let coingecko = settings.coingecko.into_config();
        assert_eq!(coingecko.base_url, "http://localhost:1234");
        assert_eq!(coingecko.timeout, Duration::from_secs(3));

        match settings.provider.into_config().unwrap() {
            ProviderConfig::Ollama(config) => {
                assert_eq!(config.host, "http://ollama.internal:11434")
            }
            other => panic!("Expected Ollama provider, got {:?}", other),
        }

        clean_env();
    }

    #[test]
    #[serial]
    fn test_unknown_provider_type() {
        clean_env();
        env::set_var("COINMCP_PROVIDER__TYPE", "databricks");

        assert!(matches!(Settings::new(), Err(ConfigError::Other(_))));

        clean_env();
    }

    #[test]
    fn test_socket_addr_conversion() {
        let server_settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 8000,
        };
        let addr = server_settings.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8000");

        let bad = ServerSettings {
            host: "not a host".to_string(),
            port: 8000,
        };
        assert!(bad.socket_addr().is_err());
    }
}
