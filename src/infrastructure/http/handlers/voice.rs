//! Voice HTTP Handlers

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;

use crate::application::{
    DeleteVoiceClone, GetVoiceConfig, ListVoices, RegisterVoiceClone, SetDefaultVoice,
    VoiceSummary, MAX_CLONE_SAMPLES,
};
use crate::domain::voice::AudioSample;
use crate::infrastructure::http::dto::{
    ApiResponse, CloneRegistrationResponse, DeleteVoiceResponse, VoiceConfigResponse,
    VoiceIdRequest, VoiceResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 样本文件字段名
const SAMPLE_FIELD: &str = "voiceSamples";
const NAME_FIELD: &str = "name";

/// 上传样本并注册克隆音色
///
/// 服务商不可用时仍然成功返回，音色降级为本地占位
pub async fn clone_voice(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<CloneRegistrationResponse>>, ApiError> {
    let mut display_name: Option<String> = None;
    let mut samples: Vec<AudioSample> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            NAME_FIELD => {
                let text = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read name: {}", e))
                })?;
                display_name = Some(text);
            }
            SAMPLE_FIELD => {
                if samples.len() >= MAX_CLONE_SAMPLES {
                    return Err(ApiError::BadRequest(format!(
                        "最多上传 {} 个样本文件",
                        MAX_CLONE_SAMPLES
                    )));
                }

                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read sample {}: {}", file_name, e))
                })?;

                if data.len() > state.max_sample_bytes {
                    return Err(ApiError::BadRequest(format!(
                        "{}: 文件超过 {} MB",
                        file_name,
                        state.max_sample_bytes / (1024 * 1024)
                    )));
                }

                let sample = AudioSample::new(file_name, content_type, data.to_vec())
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                samples.push(sample);
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    if samples.is_empty() {
        return Err(ApiError::BadRequest("请上传至少一个语音样本".to_string()));
    }

    tracing::info!(
        samples = samples.len(),
        name = display_name.as_deref().unwrap_or("-"),
        "Registering voice clone"
    );

    let registration = state
        .register_clone_handler
        .handle(RegisterVoiceClone {
            samples,
            display_name,
            make_default: true,
        })
        .await?;

    Ok(Json(ApiResponse::success(registration.into())))
}

/// 列出所有音色
pub async fn list_voice_clones(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<VoiceResponse>>>, ApiError> {
    let voices = state.list_voices_handler.handle(ListVoices).await?;
    let response = voices.into_iter().map(VoiceResponse::from).collect();
    Ok(Json(ApiResponse::success(response)))
}

/// 删除克隆音色
pub async fn delete_voice_clone(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoiceIdRequest>,
) -> Result<Json<ApiResponse<DeleteVoiceResponse>>, ApiError> {
    let result = state
        .delete_clone_handler
        .handle(DeleteVoiceClone {
            voice_id: req.voice_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(DeleteVoiceResponse {
        voice_id: result.voice_id.to_string(),
        samples_removed: result.samples_removed,
    })))
}

/// 当前语音配置
pub async fn get_voice_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<VoiceConfigResponse>>, ApiError> {
    let view = state.voice_config_handler.handle(GetVoiceConfig).await?;
    Ok(Json(ApiResponse::success(VoiceConfigResponse {
        default_voice_id: view.default_voice_id,
        voice: view.voice.map(VoiceResponse::from),
    })))
}

/// 设置默认音色
pub async fn set_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoiceIdRequest>,
) -> Result<Json<ApiResponse<VoiceResponse>>, ApiError> {
    let voice = state
        .set_default_handler
        .handle(SetDefaultVoice {
            voice_id: req.voice_id,
        })
        .await?;

    let summary = VoiceSummary::from_identity(&voice, voice.id());
    Ok(Json(ApiResponse::success(summary.into())))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::Request,
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    use crate::application::ProviderError;
    use crate::infrastructure::adapters::{fake_mp3, FakeTtsProvider};
    use crate::infrastructure::http::routes::create_routes;
    use crate::infrastructure::http::state::testing::{test_state, BUILTIN_VOICE};
    use crate::infrastructure::http::state::AppState;

    const BOUNDARY: &str = "vocalis-test-boundary";

    fn app(state: Arc<AppState>) -> Router {
        create_routes().with_state(state)
    }

    fn multipart_body(name: &str, files: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n",
                b = BOUNDARY
            )
            .as_bytes(),
        );
        for (file_name, data) in files {
            body.extend_from_slice(
                format!(
                    "--{b}\r\nContent-Disposition: form-data; name=\"voiceSamples\"; filename=\"{f}\"\r\nContent-Type: audio/mpeg\r\n\r\n",
                    b = BOUNDARY,
                    f = file_name
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn clone_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/clone-voice")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_clone_voice_registers_and_becomes_default() {
        let provider = FakeTtsProvider::new()
            .push_upload(Ok(json!({ "file": { "file_id": 42 } })))
            .push_clone(Ok(json!({ "base_resp": { "status_code": 0 } })));
        let (_dir, state) = test_state(provider).await;

        let body = multipart_body("我的声音", &[("sample.mp3", fake_mp3(2000))]);
        let response = app(state.clone()).oneshot(clone_request(body)).await.unwrap();
        let body = read_json(response).await;

        assert_eq!(body["errno"], 0);
        let data = &body["data"];
        assert_eq!(data["success"], true);
        assert_eq!(data["voice_name"], "我的声音");
        assert_eq!(data["origin"], "provider_clone");
        assert_eq!(data["sample_file_refs"], json!(["42"]));
        let voice_id = data["voice_id"].as_str().unwrap().to_string();

        let config = read_json(app(state).oneshot(get("/api/voice-config")).await.unwrap()).await;
        assert_eq!(config["data"]["default_voice_id"], voice_id.as_str());
        assert_eq!(config["data"]["voice"]["is_default"], true);
    }

    #[tokio::test]
    async fn test_clone_voice_with_provider_down_creates_placeholder() {
        let provider = FakeTtsProvider::new()
            .push_upload(Err(ProviderError::Permanent("HTTP 401".into())));
        let (_dir, state) = test_state(provider).await;

        let body = multipart_body("离线", &[("a.wav", fake_mp3(1500))]);
        let response = app(state).oneshot(clone_request(body)).await.unwrap();
        let body = read_json(response).await;

        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["success"], false);
        assert_eq!(body["data"]["origin"], "local_placeholder");
    }

    #[tokio::test]
    async fn test_clone_voice_rejects_unsupported_format() {
        let (_dir, state) = test_state(FakeTtsProvider::new()).await;

        let body = multipart_body("x", &[("notes.txt", b"hello".to_vec())]);
        let response = app(state).oneshot(clone_request(body)).await.unwrap();
        let body = read_json(response).await;

        assert_eq!(body["errno"], 400);
    }

    #[tokio::test]
    async fn test_clone_voice_requires_samples() {
        let (_dir, state) = test_state(FakeTtsProvider::new()).await;

        let response = app(state)
            .oneshot(clone_request(multipart_body("x", &[])))
            .await
            .unwrap();
        let body = read_json(response).await;

        assert_eq!(body["errno"], 400);
    }

    #[tokio::test]
    async fn test_list_voices_includes_builtin() {
        let (_dir, state) = test_state(FakeTtsProvider::new()).await;

        let response = app(state).oneshot(get("/api/voice-clones")).await.unwrap();
        let body = read_json(response).await;

        let voices = body["data"].as_array().unwrap();
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0]["voice_id"], BUILTIN_VOICE);
        assert_eq!(voices[0]["source"], "system");
        assert_eq!(voices[0]["is_default"], true);
    }

    #[tokio::test]
    async fn test_set_unknown_voice_is_not_found() {
        let (_dir, state) = test_state(FakeTtsProvider::new()).await;

        let response = app(state)
            .oneshot(post_json("/api/set-voice", json!({ "voiceId": "clone_missing" })))
            .await
            .unwrap();
        let body = read_json(response).await;

        assert_eq!(body["errno"], 404);
    }

    #[tokio::test]
    async fn test_delete_builtin_voice_is_conflict() {
        let (_dir, state) = test_state(FakeTtsProvider::new()).await;

        let response = app(state)
            .oneshot(post_json(
                "/api/voice-clones/delete",
                json!({ "voiceId": BUILTIN_VOICE }),
            ))
            .await
            .unwrap();
        let body = read_json(response).await;

        assert_eq!(body["errno"], 409);
    }
}
