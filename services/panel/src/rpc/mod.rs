//! admin RPC 抽象：面板与路由器配置守护进程之间的操作边界。

pub(crate) mod client;

use async_trait::async_trait;
use cg_shared_protocol::{CaInfo, DeviceStats};
use thiserror::Error;

/// RPC 调用失败原因。传输层与协议层对调用方同等对待：记日志并降级。
#[derive(Debug, Error)]
pub(crate) enum RpcError {
    /// 网络不可达、连接被拒或超时。
    #[error("rpc transport failed: {0}")]
    Transport(String),
    /// daemon 返回错误状态或应答无法解析。
    #[error("rpc protocol failed: {0}")]
    Protocol(String),
}

/// 路由器配置守护进程暴露的 CA 管理操作。
///
/// `new_client`/`reset_ca`/`revoke_client` 为受理语义：返回 true 仅表示请求
/// 已进入后台队列，证书生成仍需等待。
#[async_trait]
pub(crate) trait AdminService: Send + Sync {
    /// 请求签发新的客户端证书。
    async fn new_client(&self, name: &str) -> Result<bool, RpcError>;
    /// 请求吊销指定客户端证书。
    async fn revoke_client(&self, name: &str) -> Result<bool, RpcError>;
    /// 请求重建整个 CA。
    async fn reset_ca(&self) -> Result<bool, RpcError>;
    /// 拉取客户端凭据；`None` 表示 daemon 尚未生成该凭据。
    async fn get_token(&self, name: &str) -> Result<Option<Vec<u8>>, RpcError>;
    /// 拉取 CA 当前快照。
    async fn get_ca(&self) -> Result<CaInfo, RpcError>;
    /// 拉取设备元数据。
    async fn get_stats(&self) -> Result<DeviceStats, RpcError>;
}

#[cfg(test)]
pub(crate) mod mock {
    //! 测试用 admin RPC 桩实现。

    use std::sync::Mutex;

    use async_trait::async_trait;
    use cg_shared_protocol::{CaInfo, DeviceStats};

    use super::{AdminService, RpcError};

    /// 可配置的桩 admin 服务。
    #[derive(Default)]
    pub(crate) struct MockAdminService {
        /// `get_token` 返回的凭据；None 表示 daemon 未生成。
        pub(crate) token: Option<Vec<u8>>,
        /// `get_stats` 返回的数据；None 时模拟 RPC 失败。
        pub(crate) stats: Option<DeviceStats>,
        /// 记录 `get_token` 请求过的名称。
        pub(crate) token_requests: Mutex<Vec<String>>,
    }

    impl MockAdminService {
        /// 构造始终返回给定凭据的桩。
        pub(crate) fn with_token(bytes: &[u8]) -> Self {
            Self {
                token: Some(bytes.to_vec()),
                stats: Some(DeviceStats::default()),
                token_requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AdminService for MockAdminService {
        async fn new_client(&self, _name: &str) -> Result<bool, RpcError> {
            Ok(true)
        }

        async fn revoke_client(&self, _name: &str) -> Result<bool, RpcError> {
            Ok(true)
        }

        async fn reset_ca(&self) -> Result<bool, RpcError> {
            Ok(true)
        }

        async fn get_token(&self, name: &str) -> Result<Option<Vec<u8>>, RpcError> {
            self.token_requests
                .lock()
                .expect("token_requests lock")
                .push(name.to_string());
            Ok(self.token.clone())
        }

        async fn get_ca(&self) -> Result<CaInfo, RpcError> {
            Ok(CaInfo::default())
        }

        async fn get_stats(&self) -> Result<DeviceStats, RpcError> {
            self.stats
                .clone()
                .ok_or_else(|| RpcError::Transport("stats unavailable".to_string()))
        }
    }
}
