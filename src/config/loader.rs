//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VOCALIS_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `VOCALIS_SERVER__PORT=8080`
/// - `VOCALIS_PROVIDER__API_KEY=...`
/// - `VOCALIS_PROVIDER__GROUP_ID=...`
/// - `VOCALIS_RETRY__MAX_ATTEMPTS=5`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("provider.base_url", "https://api.minimaxi.com")?
        .set_default("provider.api_key", "")?
        .set_default("provider.group_id", "")?
        .set_default("provider.model", "speech-02-hd")?
        .set_default("provider.sample_rate", 32000)?
        .set_default("provider.bitrate", 128000)?
        .set_default("provider.format", "mp3")?
        .set_default("provider.timeout_secs", 30)?
        .set_default("synthesis.default_voice_id", "male-qn-qingse")?
        .set_default("synthesis.builtin_voice_id", "male-qn-qingse")?
        .set_default("synthesis.max_text_chars", 5000)?
        .set_default("synthesis.min_audio_bytes", 1000)?
        .set_default("synthesis.request_timeout_secs", 90)?
        .set_default("retry.max_attempts", 3)?
        .set_default("retry.base_delay_ms", 1000)?
        .set_default("storage.audio_dir", "data/audio")?
        .set_default("storage.audio_url_prefix", "/audio")?
        .set_default("storage.samples_dir", "data/voice_samples")?
        .set_default("storage.samples_url_prefix", "/uploads/voice_samples")?
        .set_default("storage.max_upload_size", 20 * 1024 * 1024)?
        .set_default("database.path", "data/vocalis.db")?
        .set_default("database.max_connections", 5)?
        .set_default("log.level", "info")?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: VOCALIS_PROVIDER__API_KEY=xxx
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("VOCALIS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.provider.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Provider base URL cannot be empty".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.synthesis.max_text_chars == 0 {
        return Err(ConfigError::ValidationError(
            "synthesis.max_text_chars must be greater than 0".to_string(),
        ));
    }

    if config.synthesis.builtin_voice_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "synthesis.builtin_voice_id cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志），不输出 API Key
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Public Base URL: {}", config.server.public_base_url());
    tracing::info!("Provider URL: {}", config.provider.base_url);
    tracing::info!(
        "Provider API Key: {}",
        if config.provider.api_key.is_empty() {
            "<not set>"
        } else {
            "<set>"
        }
    );
    tracing::info!("Provider Model: {}", config.provider.model);
    tracing::info!("Builtin Fallback Voice: {}", config.synthesis.builtin_voice_id);
    tracing::info!(
        "Retry: {} attempts, base delay {}ms",
        config.retry.max_attempts,
        config.retry.base_delay_ms
    );
    tracing::info!("Request Timeout: {}s", config.synthesis.request_timeout_secs);
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Audio Directory: {:?}", config.storage.audio_dir);
    tracing::info!("Samples Directory: {:?}", config.storage.samples_dir);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_provider_url() {
        let mut config = AppConfig::default();
        config.provider.base_url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_db_path() {
        let mut config = AppConfig::default();
        config.database.path = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_text_limit() {
        let mut config = AppConfig::default();
        config.synthesis.max_text_chars = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[provider]
group_id = "g-123"

[retry]
max_attempts = 5

[[synthesis.builtin_voices]]
id = "female-shaonv"
name = "少女音"
"#,
        )
        .unwrap();

        let config = load_config_from_path(Some(&path)).unwrap();
        assert_eq!(config.provider.group_id, "g-123");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 1000);
        assert_eq!(config.synthesis.builtin_voices.len(), 1);
        assert_eq!(config.synthesis.builtin_voice_id, "male-qn-qingse");
    }
}
