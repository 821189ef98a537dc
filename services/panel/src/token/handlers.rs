//! token 签发与兑换的 HTTP 路由处理函数。

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use cg_shared_protocol::client_name_is_valid;
use tracing::{info, warn};

use crate::{
    api::{
        error::ApiError,
        response::{ApiEnvelope, ok_response, pem_attachment},
        types::{ClientNameForm, TokenIssueData},
    },
    state::AppState,
    token::{
        issue::issue_token,
        redeem::{RedeemError, redeem_token},
        unix_now,
    },
};

/// 反向代理注入的原始 scheme 头。
const FORWARDED_PROTO_HEADER: &str = "x-forwarded-proto";

/// 签发一次性下载链接（二维码数据源）。
pub(crate) async fn issue_token_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ClientNameForm>,
) -> (StatusCode, Json<ApiEnvelope<TokenIssueData>>) {
    let client_name = req.client_name.trim();
    if !client_name_is_valid(client_name) {
        return ApiError::invalid_client_name().respond();
    }

    let host = header_value(&headers, header::HOST.as_str()).unwrap_or_default();
    let scheme = header_value(&headers, FORWARDED_PROTO_HEADER)
        .unwrap_or_else(|| state.config.public_scheme.clone());

    let data = issue_token(&state, client_name, &scheme, &host).await;
    info!("issued one-time download link for client {client_name}");
    ok_response(
        StatusCode::OK,
        "一次性下载链接已签发",
        "请在有效期内完成扫码下载",
        Some(data),
    )
}

/// 兑换一次性 code，成功时返回 PEM 附件。
pub(crate) async fn redeem_token_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Response {
    // 路由约束：code 只允许小写十六进制，其余一律按未知处理。
    if code.is_empty() || !code.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return StatusCode::NOT_FOUND.into_response();
    }

    match redeem_token(&state, &code, unix_now()).await {
        Ok(credential) => {
            info!("one-time code redeemed, serving {}", credential.file_name);
            pem_attachment(&credential.file_name, credential.bytes)
        }
        Err(RedeemError::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Err(RedeemError::Expired) => StatusCode::GONE.into_response(),
        Err(RedeemError::Upstream(reason)) => {
            warn!("redeem failed upstream: {reason}");
            Redirect::to("/").into_response()
        }
    }
}

/// 读取并裁剪 header 值。
fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        routing::{get, post},
    };
    use tower::ServiceExt;

    use super::{issue_token_handler, redeem_token_handler};
    use crate::{
        rpc::mock::MockAdminService,
        state::AppState,
        token::{registry::PendingToken, unix_now},
    };

    /// 组装只含 token 路由的测试应用。
    fn test_app(state: AppState) -> Router {
        Router::new()
            .route("/v1/token/issue", post(issue_token_handler))
            .route("/get-token/{code}", get(redeem_token_handler))
            .with_state(state)
    }

    /// 手工登记一条待兑换记录。
    async fn register(state: &AppState, code: &str, name: &str, expires_at: u64) {
        state
            .registry
            .insert(
                code.to_string(),
                PendingToken {
                    client_name: name.to_string(),
                    expires_at,
                },
            )
            .await;
    }

    /// 构造兑换 GET 请求。
    fn redeem_request(code: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/get-token/{code}"))
            .body(Body::empty())
            .expect("build redeem request")
    }

    #[tokio::test]
    async fn unknown_code_maps_to_404() {
        let state = AppState::for_test(Arc::new(MockAdminService::with_token(b"PEM")), 30);
        let app = test_app(state);

        let response = app
            .clone()
            .oneshot(redeem_request("deadbeef"))
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // 大写十六进制不满足路由约束，同样按未知处理。
        let response = app
            .oneshot(redeem_request("DEADBEEF"))
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn expired_code_maps_to_410() {
        let state = AppState::for_test(Arc::new(MockAdminService::with_token(b"PEM")), 30);
        register(&state, "ab12", "alpha", 1).await;

        let response = test_app(state)
            .oneshot(redeem_request("ab12"))
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::GONE);
    }

    #[tokio::test]
    async fn upstream_failure_redirects_to_main_page() {
        let admin = Arc::new(MockAdminService {
            token: None,
            ..MockAdminService::default()
        });
        let state = AppState::for_test(admin, 30);
        register(&state, "cd34", "alpha", unix_now() + 60).await;

        let response = test_app(state)
            .oneshot(redeem_request("cd34"))
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .expect("location header"),
            "/"
        );
    }

    #[tokio::test]
    async fn successful_redeem_serves_pem_attachment() {
        let pem = b"-----BEGIN PEM-----";
        let state = AppState::for_test(Arc::new(MockAdminService::with_token(pem)), 30);
        register(&state, "ef56", "alpha", unix_now() + 60).await;

        let response = test_app(state)
            .oneshot(redeem_request("ef56"))
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers().clone();
        assert_eq!(
            headers.get(header::CONTENT_TYPE).expect("content type"),
            "application/x-pem-file"
        );
        assert_eq!(
            headers
                .get(header::CONTENT_DISPOSITION)
                .expect("content disposition"),
            "attachment; filename=\"alpha.pem\""
        );
        assert_eq!(
            headers
                .get(header::CONTENT_LENGTH)
                .expect("content length"),
            &pem.len().to_string()
        );

        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .expect("read body");
        assert_eq!(body.as_ref(), pem);
    }

    #[tokio::test]
    async fn invalid_client_name_is_rejected_before_issuance() {
        let state = AppState::for_test(Arc::new(MockAdminService::with_token(b"PEM")), 30);
        let registry = Arc::clone(&state.registry);

        let request = Request::builder()
            .method("POST")
            .uri("/v1/token/issue")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"clientName":"my client"}"#))
            .expect("build issue request");
        let response = test_app(state).oneshot(request).await.expect("dispatch");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        // 校验失败不触达注册表：没有条目被登记。
        assert_eq!(registry.len().await, 0);
    }
}
