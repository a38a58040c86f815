//! Vocalis - 语音合成与音色克隆服务
//!
//! - Domain: voice/, synthesis/, payload/ (Bounded Contexts)
//! - Application: commands, queries, ports, retry
//! - Infrastructure: http, persistence, memory, adapters

use std::sync::Arc;
use std::time::Duration;

use vocalis::application::{
    restore_provider_credentials, seed_builtin_voices, RetryPolicy, SynthesisSettings,
    MAX_CLONE_SAMPLES,
};
use vocalis::config::{load_config, print_config};
use vocalis::domain::payload::{AudioPayloadDecoder, DecoderSettings};
use vocalis::domain::voice::{VoiceId, VoiceName};
use vocalis::infrastructure::adapters::{
    FileArtifactStore, FileSampleLibrary, MiniMaxClient, MiniMaxClientConfig,
};
use vocalis::infrastructure::http::{AppSettings, AppState, HttpServer, ServerConfig, StaticMount};
use vocalis::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteVoiceStore,
};

fn parse_voice_id(field: &str, raw: &str) -> anyhow::Result<VoiceId> {
    VoiceId::new(raw).map_err(|e| anyhow::anyhow!("Invalid {} '{}': {}", field, raw, e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},vocalis={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Vocalis - 语音合成与音色克隆服务");
    print_config(&config);

    // 确保数据目录存在
    tokio::fs::create_dir_all(&config.storage.audio_dir).await?;
    tokio::fs::create_dir_all(&config.storage.samples_dir).await?;
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    let voice_store = Arc::new(SqliteVoiceStore::new(pool));

    // 写入内置音色
    let builtin_voices = config
        .synthesis
        .builtin_voices
        .iter()
        .map(|v| -> anyhow::Result<(VoiceId, VoiceName)> {
            let id = parse_voice_id("builtin voice id", &v.id)?;
            let name = VoiceName::new(v.name.as_str())
                .map_err(|e| anyhow::anyhow!("Invalid builtin voice name '{}': {}", v.name, e))?;
            Ok((id, name))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let seeded = seed_builtin_voices(voice_store.as_ref(), &builtin_voices).await?;
    tracing::info!(seeded, total = builtin_voices.len(), "Builtin voices ready");

    // 创建 MiniMax 客户端
    let provider_config = MiniMaxClientConfig {
        base_url: config.provider.base_url.clone(),
        api_key: config.provider.api_key.clone(),
        group_id: config.provider.group_id.clone(),
        model: config.provider.model.clone(),
        sample_rate: config.provider.sample_rate,
        bitrate: config.provider.bitrate,
        format: config.provider.format.clone(),
        timeout_secs: config.provider.timeout_secs,
    };
    let provider = Arc::new(MiniMaxClient::new(provider_config)?);
    let credentials = provider.credentials();
    let restored = restore_provider_credentials(voice_store.as_ref(), &credentials).await?;
    if !restored && config.provider.api_key.is_empty() {
        tracing::warn!("Provider API key is not set, synthesis will fall back to client-side");
    }

    // 本地存储
    let artifacts = Arc::new(FileArtifactStore::new(
        &config.storage.audio_dir,
        config.storage.audio_url_prefix.clone(),
    ));
    let samples = Arc::new(FileSampleLibrary::new(
        &config.storage.samples_dir,
        config.storage.samples_url_prefix.clone(),
    ));

    let settings = AppSettings {
        synthesis: SynthesisSettings {
            default_voice_id: parse_voice_id("default voice id", &config.synthesis.default_voice_id)?,
            builtin_voice_id: parse_voice_id("builtin voice id", &config.synthesis.builtin_voice_id)?,
            max_text_chars: config.synthesis.max_text_chars,
        },
        retry: RetryPolicy::new(
            config.retry.max_attempts,
            Duration::from_millis(config.retry.base_delay_ms),
        ),
        decoder: AudioPayloadDecoder::new(DecoderSettings {
            min_audio_bytes: config.synthesis.min_audio_bytes,
            ..DecoderSettings::default()
        }),
        request_timeout: Duration::from_secs(config.synthesis.request_timeout_secs),
        max_sample_bytes: config.storage.max_upload_size as usize,
    };

    let state = AppState::new(
        provider,
        Arc::new(credentials),
        artifacts,
        samples,
        voice_store,
        settings,
    );

    // 创建 HTTP 服务器
    let mut server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_body_limit(config.storage.max_upload_size as usize * MAX_CLONE_SAMPLES)
        .with_static_mount(StaticMount::new(
            config.storage.audio_url_prefix.clone(),
            &config.storage.audio_dir,
        ))
        .with_static_mount(StaticMount::new(
            config.storage.samples_url_prefix.clone(),
            &config.storage.samples_dir,
        ));
    if config.server.static_files.enabled {
        server_config = server_config.with_static_mount(StaticMount::new(
            config.server.static_files.path.clone(),
            &config.server.static_files.dir,
        ));
    }

    let server = HttpServer::new(server_config, state);

    tracing::info!(
        "Server listening on {}, public url {}",
        config.server.addr(),
        config.server.public_base_url()
    );

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install CTRL+C signal handler");
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}
