//! Synthesis HTTP Handlers

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::application::{StoreMode, SynthesizeSpeech};
use crate::domain::synthesis::{SynthesisAudio, SynthesisOutcome, SynthesisTier};
use crate::infrastructure::http::dto::{
    ApiResponse, SynthesisResponse, SynthesizeRequest, TestVoiceRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

const SYNTHESIS_SOURCE_HEADER: &str = "x-synthesis-source";

/// 合成语音，音频落盘后返回 URL
pub async fn synthesize_speech(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SynthesizeRequest>,
) -> Result<Json<ApiResponse<SynthesisResponse>>, ApiError> {
    let outcome = run_synthesis(&state, req, StoreMode::Persist, true).await?;
    Ok(Json(ApiResponse::success(SynthesisResponse::from(&outcome))))
}

/// 试听指定音色
///
/// 只走服务商的两个层级（指定音色、内置音色），都失败时返回错误而不是本地回放
pub async fn test_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TestVoiceRequest>,
) -> Result<Json<ApiResponse<SynthesisResponse>>, ApiError> {
    if req.text.trim().is_empty() || req.voice_id.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "请输入测试文字并选择语音克隆".to_string(),
        ));
    }

    tracing::info!(voice_id = %req.voice_id, "Testing voice");
    let request = SynthesizeRequest {
        text: req.text,
        voice_id: Some(req.voice_id),
    };
    let outcome = run_synthesis(&state, request, StoreMode::Persist, false).await?;
    Ok(Json(ApiResponse::success(SynthesisResponse::from(&outcome))))
}

/// 合成语音，直接返回音频字节
///
/// 没有音频（客户端合成）或服务商只给了 URL 时退回 JSON 响应
pub async fn synthesize_audio(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SynthesizeRequest>,
) -> Result<Response, ApiError> {
    let outcome = run_synthesis(&state, req, StoreMode::Passthrough, true).await?;

    let source = outcome.tier().source();
    let summary = SynthesisResponse::from(&outcome);

    match outcome.into_audio() {
        Some(SynthesisAudio::Bytes { data, content_type }) => {
            let headers = [
                (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
                (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
                (
                    HeaderName::from_static(SYNTHESIS_SOURCE_HEADER),
                    HeaderValue::from_static(source),
                ),
            ];
            Ok((headers, data).into_response())
        }
        _ => Ok(Json(ApiResponse::success(summary)).into_response()),
    }
}

/// 带整体超时地执行合成
///
/// 允许离线降级时，只有请求本身不合法才返回错误
async fn run_synthesis(
    state: &AppState,
    req: SynthesizeRequest,
    mode: StoreMode,
    allow_offline_fallback: bool,
) -> Result<SynthesisOutcome, ApiError> {
    let text = req.text.clone();
    let command = SynthesizeSpeech {
        text: req.text,
        voice_id: req.voice_id,
        mode,
        allow_offline_fallback,
    };

    let outcome = match tokio::time::timeout(
        state.request_timeout,
        state.synthesize_handler.handle(command),
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(_) if allow_offline_fallback => {
            tracing::warn!(
                timeout_secs = state.request_timeout.as_secs(),
                "Synthesis timed out, falling back to client-side synthesis"
            );
            SynthesisOutcome::client_side(&text)
        }
        Err(_) => {
            tracing::warn!(timeout_secs = state.request_timeout.as_secs(), "Synthesis timed out");
            SynthesisOutcome::failed("语音合成超时")
        }
    };

    if outcome.tier() == SynthesisTier::Failed {
        return Err(ApiError::BadRequest(
            outcome.note().unwrap_or("语音合成失败").to_string(),
        ));
    }

    tracing::info!(
        tier = ?outcome.tier(),
        voice_id = outcome.voice_id().map(|v| v.as_str()).unwrap_or("-"),
        "Synthesis completed"
    );
    Ok(outcome)
}
