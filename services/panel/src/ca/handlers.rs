//! CA 管理动作的 HTTP 路由处理函数。
//!
//! 这些动作都是 daemon 操作的薄封装：受理即成功（证书在后台生成），
//! RPC 失败统一降级为用户可见的错误消息，不做自动重试。

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use cg_shared_protocol::{CaInfo, client_name_is_valid};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::{
    api::{
        error::ApiError,
        response::{ApiEnvelope, ok_response, pem_attachment},
        types::ClientNameForm,
    },
    state::AppState,
};

/// 请求签发新的客户端证书。
pub(crate) async fn new_client_handler(
    State(state): State<AppState>,
    Json(req): Json<ClientNameForm>,
) -> (StatusCode, Json<ApiEnvelope<Value>>) {
    let client_name = req.client_name.trim();
    if !client_name_is_valid(client_name) {
        return ApiError::invalid_client_name().respond();
    }

    match state.admin.new_client(client_name).await {
        Ok(true) => {
            info!("new-client accepted for {client_name}");
            ok_response(
                StatusCode::OK,
                format!("客户端 {client_name} 的创建请求已提交"),
                "凭据将在约一分钟后可下载",
                None,
            )
        }
        Ok(false) => ApiError::upstream(format!("daemon 拒绝了客户端 {client_name} 的创建请求"))
            .respond(),
        Err(err) => {
            error!("new-client rpc failed: {err}");
            ApiError::upstream(format!("创建客户端 {client_name} 时发生错误")).respond()
        }
    }
}

/// 请求吊销客户端证书。
pub(crate) async fn revoke_client_handler(
    State(state): State<AppState>,
    Json(req): Json<ClientNameForm>,
) -> (StatusCode, Json<ApiEnvelope<Value>>) {
    let client_name = req.client_name.trim();
    if !client_name_is_valid(client_name) {
        return ApiError::invalid_client_name().respond();
    }

    match state.admin.revoke_client(client_name).await {
        Ok(true) => ok_response(
            StatusCode::OK,
            format!("客户端 {client_name} 的吊销请求已提交"),
            "状态刷新后该客户端将显示为 revoked",
            None,
        ),
        Ok(false) => {
            ApiError::upstream(format!("daemon 拒绝了客户端 {client_name} 的吊销请求")).respond()
        }
        Err(err) => {
            error!("revoke-client rpc failed: {err}");
            ApiError::upstream(format!("吊销客户端 {client_name} 时发生错误")).respond()
        }
    }
}

/// 请求重建整个 CA。
pub(crate) async fn reset_ca_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiEnvelope<Value>>) {
    match state.admin.reset_ca().await {
        Ok(true) => {
            info!("reset-ca accepted");
            ok_response(
                StatusCode::OK,
                "证书颁发机构重置请求已提交",
                "重建在后台进行，期间客户端列表可能为空",
                None,
            )
        }
        Ok(false) => ApiError::upstream("daemon 拒绝了 CA 重置请求").respond(),
        Err(err) => {
            error!("reset-ca rpc failed: {err}");
            ApiError::upstream("重置 CA 时发生错误").respond()
        }
    }
}

/// 查询 CA 当前快照。
pub(crate) async fn ca_status_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiEnvelope<CaInfo>>) {
    match state.admin.get_ca().await {
        Ok(ca) => ok_response(StatusCode::OK, "CA 状态已获取", "", Some(ca)),
        Err(err) => {
            error!("get-ca rpc failed: {err}");
            ApiError::upstream("获取 CA 状态失败").respond()
        }
    }
}

/// 主会话内直接下载凭据（不经过一次性 code）。
pub(crate) async fn get_token_download_handler(
    State(state): State<AppState>,
    Json(req): Json<ClientNameForm>,
) -> Response {
    let client_name = req.client_name.trim();
    if !client_name_is_valid(client_name) {
        let (status, body) = ApiError::invalid_client_name().respond::<Value>();
        return (status, body).into_response();
    }

    match state.admin.get_token(client_name).await {
        Ok(Some(bytes)) => pem_attachment(&format!("{client_name}.pem"), bytes),
        Ok(None) => {
            warn!("no credential available yet for {client_name}");
            Redirect::to("/").into_response()
        }
        Err(err) => {
            error!("get-token rpc failed: {err}");
            Redirect::to("/").into_response()
        }
    }
}
