use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::{env, path::Path};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    pub port: u16,
    pub request_timeout_secs: u64,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub api_uri: Url,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    pub scopes: Vec<String>,
    pub thread_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    pub api_uri: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub rate_limit_per_sec: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrontendConfig {
    pub base_url: Url,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    http: HttpSettings,
    provider: ProviderConfig,
    completion: CompletionConfig,
    frontend: Option<FrontendConfig>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub http: HttpSettings,
    pub provider: ProviderConfig,
    pub completion: CompletionConfig,
    pub frontend: FrontendConfig,
}

impl std::fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Server Config:\nHTTP: {:?}\n\nProvider: {} (client {}, scopes [{}], thread limit {})\n\nCompletion: {} model {} (max_tokens {}, temperature {}, top_p {})\n\nFrontend: {}",
            self.http,
            self.provider.api_uri,
            self.provider.client_id,
            self.provider.scopes.join(", "),
            self.provider.thread_limit,
            self.completion.api_uri,
            self.completion.model,
            self.completion.max_tokens,
            self.completion.temperature,
            self.completion.top_p,
            self.frontend.base_url,
        )
    }
}

fn config_dir() -> anyhow::Result<String> {
    if let Ok(dir) = env::var("APP_DIR") {
        return Ok(dir);
    }
    let cargo_dir = env::var("CARGO_MANIFEST_DIR")
        .map_err(|_| anyhow::anyhow!("CARGO_MANIFEST_DIR or APP_DIR is required"))?;
    let parent_dir = Path::new(&cargo_dir)
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Failed to get parent dir"))?
        .display()
        .to_string();
    Ok(format!("{}/config", parent_dir))
}

impl ServerConfig {
    /// Loads `config.toml` from the config dir, then applies `APP__SECTION__KEY`
    /// overrides and the secret environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let path = format!("{}/config.toml", config_dir()?);
        let cfg_file = Self::read_file(&path)?;

        let ConfigFile {
            http,
            mut provider,
            mut completion,
            frontend,
        } = cfg_file;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL is not set in .env file"))?;

        if let Ok(secret) = env::var("PROVIDER_CLIENT_SECRET") {
            provider.client_secret = secret;
        }
        if let Ok(key) = env::var("COMPLETION_API_KEY") {
            completion.api_key = key;
        }

        let frontend = match env::var("FRONTEND_URL") {
            Ok(url) => FrontendConfig {
                base_url: Url::parse(&url)?,
            },
            Err(_) => frontend.ok_or_else(|| anyhow::anyhow!("FRONTEND_URL is required"))?,
        };

        Ok(ServerConfig {
            database_url,
            http,
            provider,
            completion,
            frontend,
        })
    }

    fn read_file(path: &str) -> Result<ConfigFile, ConfigError> {
        Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }
}
