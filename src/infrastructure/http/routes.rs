//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                  GET   健康检查
//! - /api/synthesize-speech     POST  合成语音，返回 JSON（音频 URL 或客户端合成提示）
//! - /api/audio                 POST  合成语音，直接返回音频字节
//! - /api/clone-voice           POST  上传样本并注册克隆音色（multipart）
//! - /api/voice-clones          GET   列出所有音色
//! - /api/voice-clones/delete   POST  删除克隆音色
//! - /api/voice-config          GET   当前默认音色
//! - /api/set-voice             POST  设置默认音色
//! - /api/test-voice            POST  试听指定音色（只走服务商层级）
//! - /api/minimax/config        GET   服务商配置（API Key 脱敏）
//! - /api/minimax/config        POST  更新服务商凭据

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/synthesize-speech", post(handlers::synthesize_speech))
        .route("/audio", post(handlers::synthesize_audio))
        .route("/test-voice", post(handlers::test_voice))
        .route(
            "/minimax/config",
            get(handlers::get_provider_config).post(handlers::update_provider_config),
        )
        .merge(voice_routes())
}

/// Voice 路由
fn voice_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/clone-voice", post(handlers::clone_voice))
        .route("/voice-clones", get(handlers::list_voice_clones))
        .route("/voice-clones/delete", post(handlers::delete_voice_clone))
        .route("/voice-config", get(handlers::get_voice_config))
        .route("/set-voice", post(handlers::set_voice))
}
