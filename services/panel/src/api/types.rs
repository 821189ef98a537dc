//! API 请求/响应类型。

use serde::{Deserialize, Serialize};

/// 携带 clientName 的动作请求（new-client / revoke / get-token / token 签发）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClientNameForm {
    pub(crate) client_name: String,
}

/// 一次性 token 签发描述（供前端渲染二维码）。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenIssueData {
    /// 过期时刻（unix 秒）。
    pub(crate) expires_at: u64,
    /// 请求方 Host。
    pub(crate) host: String,
    /// 请求方 scheme。
    pub(crate) scheme: String,
    /// 兑换路径（含 code）。
    pub(crate) path: String,
    /// 主板型号（小写）；stats 获取失败时为空。
    pub(crate) board_name: String,
    /// 设备主机名；stats 获取失败时为空。
    pub(crate) hostname: String,
}
