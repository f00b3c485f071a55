mod app_config;

pub use app_config::{
    AdminConfig, AppConfig, AuthConfig, CorsConfig, LogFormat, LoggingConfig, QueueConfig,
    QueueMode, ServerConfig, StorageConfig, StorageMode, DEV_TOKEN_SECRET,
};
