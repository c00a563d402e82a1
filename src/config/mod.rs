mod settings;

pub use settings::{LogFormat, LoggingConfig, ServerConfig, SessionConfig, Settings, TemplateConfig};
