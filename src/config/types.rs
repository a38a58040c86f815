//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 语音服务商配置
    #[serde(default)]
    pub provider: ProviderConfig,

    /// 合成配置
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// 重试配置
    #[serde(default)]
    pub retry: RetryConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 公开访问的 Base URL
    /// 如果未设置，则使用 http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,

    /// 静态文件服务配置
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

/// 静态文件服务配置（前端页面）
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    #[serde(default = "default_static_enabled")]
    pub enabled: bool,

    #[serde(default = "default_static_dir")]
    pub dir: PathBuf,

    /// URL 路径前缀（如 "/" 表示根路径托管）
    #[serde(default = "default_static_path")]
    pub path: String,
}

fn default_static_enabled() -> bool {
    false
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_static_path() -> String {
    "/".to_string()
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: default_static_enabled(),
            dir: default_static_dir(),
            path: default_static_path(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取公开的 Base URL
    pub fn public_base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            let host = if self.host == "0.0.0.0" {
                "localhost"
            } else {
                &self.host
            };
            format!("http://{}:{}", host, self.port)
        })
    }
}

/// 语音服务商（MiniMax）配置
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_url")]
    pub base_url: String,

    /// 为空时所有远程调用直接失败，请求走降级阶梯
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub group_id: String,

    #[serde(default = "default_provider_model")]
    pub model: String,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_provider_bitrate")]
    pub bitrate: u32,

    #[serde(default = "default_provider_format")]
    pub format: String,

    /// 单次请求超时时间（秒）
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

fn default_provider_url() -> String {
    "https://api.minimaxi.com".to_string()
}

fn default_provider_model() -> String {
    "speech-02-hd".to_string()
}

fn default_sample_rate() -> u32 {
    32000
}

fn default_provider_bitrate() -> u32 {
    128000
}

fn default_provider_format() -> String {
    "mp3".to_string()
}

fn default_provider_timeout() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            api_key: String::new(),
            group_id: String::new(),
            model: default_provider_model(),
            sample_rate: default_sample_rate(),
            bitrate: default_provider_bitrate(),
            format: default_provider_format(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

/// 内置音色
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuiltinVoiceConfig {
    pub id: String,
    pub name: String,
}

/// 合成配置
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    /// 请求未指定且未设置默认音色时使用
    #[serde(default = "default_builtin_voice_id")]
    pub default_voice_id: String,

    /// 降级使用的内置音色
    #[serde(default = "default_builtin_voice_id")]
    pub builtin_voice_id: String,

    /// 启动时写入配置存储的内置音色
    #[serde(default = "default_builtin_voices")]
    pub builtin_voices: Vec<BuiltinVoiceConfig>,

    /// 单次合成最大字符数
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// 可接受的最小音频字节数（不含）
    #[serde(default = "default_min_audio_bytes")]
    pub min_audio_bytes: usize,

    /// HTTP 层单次合成请求的总时限（秒）
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_builtin_voice_id() -> String {
    "male-qn-qingse".to_string()
}

fn default_builtin_voices() -> Vec<BuiltinVoiceConfig> {
    vec![
        BuiltinVoiceConfig {
            id: "male-qn-qingse".to_string(),
            name: "青涩青年音".to_string(),
        },
        BuiltinVoiceConfig {
            id: "female-shaonv".to_string(),
            name: "少女音".to_string(),
        },
    ]
}

fn default_max_text_chars() -> usize {
    5000
}

fn default_min_audio_bytes() -> usize {
    1000
}

fn default_request_timeout() -> u64 {
    90
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            default_voice_id: default_builtin_voice_id(),
            builtin_voice_id: default_builtin_voice_id(),
            builtin_voices: default_builtin_voices(),
            max_text_chars: default_max_text_chars(),
            min_audio_bytes: default_min_audio_bytes(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// 重试配置
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// 首次重试前的等待时间，之后每次翻倍
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 合成音频目录
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    #[serde(default = "default_audio_url_prefix")]
    pub audio_url_prefix: String,

    /// 克隆样本目录
    #[serde(default = "default_samples_dir")]
    pub samples_dir: PathBuf,

    #[serde(default = "default_samples_url_prefix")]
    pub samples_url_prefix: String,

    /// 上传文件最大大小（字节），默认 20MB
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("data/audio")
}

fn default_audio_url_prefix() -> String {
    "/audio".to_string()
}

fn default_samples_dir() -> PathBuf {
    PathBuf::from("data/voice_samples")
}

fn default_samples_url_prefix() -> String {
    "/uploads/voice_samples".to_string()
}

fn default_max_upload_size() -> u64 {
    20 * 1024 * 1024 // 20 MB
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            audio_dir: default_audio_dir(),
            audio_url_prefix: default_audio_url_prefix(),
            samples_dir: default_samples_dir(),
            samples_url_prefix: default_samples_url_prefix(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/vocalis.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.provider.model, "speech-02-hd");
        assert_eq!(config.synthesis.builtin_voice_id, "male-qn-qingse");
        assert_eq!(config.synthesis.builtin_voices.len(), 2);
        assert_eq!(config.synthesis.max_text_chars, 5000);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.storage.audio_url_prefix, "/audio");
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.public_base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_database_url() {
        let config = DatabaseConfig::default();
        assert_eq!(config.database_url(), "sqlite:data/vocalis.db?mode=rwc");
    }
}
