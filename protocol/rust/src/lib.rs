// 文件职责：
// 1) 定义面板与路由器配置守护进程（admin RPC）共用的数据结构。
// 2) 提供 clientName 校验等两端一致的基础函数。
// 3) 作为 Rust 侧协议唯一代码源，供其他服务复用。

use serde::{Deserialize, Serialize};

/// clientName 最大长度（字符）。
pub const MAX_CLIENT_NAME_LEN: usize = 63;

/// 校验 clientName：1~63 个字符，仅允许字母数字与 `_` `.` `-`。
pub fn client_name_is_valid(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_CLIENT_NAME_LEN {
        return false;
    }
    name.bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'))
}

/// 客户端证书状态。
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Revoked,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaClient {
    // 客户端显示名。
    pub name: String,
    // 证书状态。
    pub status: ClientStatus,
}

/// CA 当前快照：客户端列表与是否正在后台生成。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaInfo {
    // 已签发客户端列表。
    #[serde(default)]
    pub clients: Vec<CaClient>,
    // CA 是否正在后台重建/签发。
    #[serde(default)]
    pub generating: bool,
}

/// 设备元数据快照（用于二维码描述信息）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStats {
    // 主板型号标识。
    #[serde(default)]
    pub board_name: String,
    // 设备主机名。
    #[serde(default)]
    pub hostname: String,
}

/// 携带 clientName 的 RPC 请求体（new-client / revoke-client / get-token）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedRpcRequest {
    // 目标客户端名。
    pub name: String,
    // 是否后台执行（daemon 异步处理）。
    #[serde(default)]
    pub background: bool,
}

/// 无参数 RPC 请求体（reset-CA）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BareRpcRequest {
    // 是否后台执行。
    #[serde(default)]
    pub background: bool,
}

/// RPC 受理回执：accepted 表示请求已进入后台处理队列。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcAck {
    #[serde(default)]
    pub accepted: bool,
}

/// get-token 应答：token 为 base64 编码的 PEM 凭据，缺失表示尚未生成。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenReply {
    #[serde(default)]
    pub token_b64: Option<String>,
}
