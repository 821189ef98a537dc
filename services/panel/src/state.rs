//! 面板共享状态：配置、token 注册表与 admin RPC 句柄。

use std::sync::Arc;

use crate::{config::Config, rpc::AdminService, token::registry::TokenRegistry};

/// 面板共享状态。注册表是唯一的共享可变资源，作为显式注入的服务对象
/// 挂在状态上，测试可各自实例化互不干扰。
#[derive(Clone)]
pub(crate) struct AppState {
    /// 运行时配置。
    pub(crate) config: Arc<Config>,
    /// 待兑换 token 注册表。
    pub(crate) registry: Arc<TokenRegistry>,
    /// admin RPC 服务句柄。
    pub(crate) admin: Arc<dyn AdminService>,
}

impl AppState {
    /// 装配共享状态。
    pub(crate) fn new(config: Config, admin: Arc<dyn AdminService>) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(TokenRegistry::default()),
            admin,
        }
    }

    #[cfg(test)]
    /// 测试辅助：用桩 admin 服务与指定 TTL 构造独立状态。
    pub(crate) fn for_test(admin: Arc<dyn AdminService>, token_ttl_sec: u64) -> Self {
        use std::time::Duration;

        Self::new(
            Config {
                listen_addr: "127.0.0.1:0".to_string(),
                admin_rpc_url: "http://127.0.0.1:8051".to_string(),
                rpc_timeout: Duration::from_secs(1),
                token_ttl_sec,
                sweep_interval: Duration::from_secs(300),
                public_scheme: "http".to_string(),
            },
            admin,
        )
    }
}
