//! Provider Config HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{GetProviderConfig, UpdateProviderCredentials};
use crate::infrastructure::http::dto::{
    ApiResponse, ProviderConfigRequest, ProviderConfigResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 当前服务商配置（API Key 脱敏）
pub async fn get_provider_config(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<ProviderConfigResponse>> {
    let view = state.provider_config_handler.handle(GetProviderConfig);
    Json(ApiResponse::success(view.into()))
}

/// 更新服务商凭据，下一次合成立即使用新凭据
pub async fn update_provider_config(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProviderConfigRequest>,
) -> Result<Json<ApiResponse<ProviderConfigResponse>>, ApiError> {
    let view = state
        .update_credentials_handler
        .handle(UpdateProviderCredentials {
            api_key: req.api_key,
            group_id: req.group_id,
        })
        .await?;
    Ok(Json(ApiResponse::success(view.into())))
}
