//! API 错误定义与响应转换。

use axum::{Json, http::StatusCode};
use serde::Serialize;

use super::response::ApiEnvelope;

/// 面板接口统一错误。
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) code: &'static str,
    pub(crate) message: String,
    pub(crate) suggestion: &'static str,
}

impl ApiError {
    /// 构造统一 API 错误。
    pub(crate) fn new(
        status: StatusCode,
        code: &'static str,
        message: impl Into<String>,
        suggestion: &'static str,
    ) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            suggestion,
        }
    }

    /// clientName 校验失败错误。
    pub(crate) fn invalid_client_name() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "INVALID_CLIENT_NAME",
            "clientName 无效：须为 1~63 个字符，仅允许字母数字与 _ . -",
            "请修改名称后重试",
        )
    }

    /// admin RPC 不可用错误。
    pub(crate) fn upstream(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_GATEWAY,
            "UPSTREAM_UNAVAILABLE",
            message,
            "请确认路由器配置服务在线后重试",
        )
    }

    /// 转换为统一响应体；data 恒为空，泛型仅用于对齐成功分支的类型。
    pub(crate) fn respond<T: Serialize>(self) -> (StatusCode, Json<ApiEnvelope<T>>) {
        (
            self.status,
            Json(ApiEnvelope {
                ok: false,
                code: self.code.to_string(),
                message: self.message,
                suggestion: self.suggestion.to_string(),
                data: None,
            }),
        )
    }
}
