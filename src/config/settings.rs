use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub templates: TemplateConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateConfig {
    /// JSON file with templates to load at startup
    pub seed_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of open composer sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Close sessions untouched for this many seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,
    /// Idle sweep interval in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_idle_timeout() -> u64 {
    1800 // 30 minutes
}

fn default_cleanup_interval() -> u64 {
    60 // 1 minute
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("sessions.max_sessions", default_max_sessions() as i64)?
            .set_default("sessions.idle_timeout", default_idle_timeout() as i64)?
            .set_default("sessions.cleanup_interval", default_cleanup_interval() as i64)?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // SERVER__PORT, TEMPLATES__SEED_PATH, SESSIONS__IDLE_TIMEOUT, ...
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            body_limit: default_body_limit(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            idle_timeout: default_idle_timeout(),
            cleanup_interval: default_cleanup_interval(),
        }
    }
}
