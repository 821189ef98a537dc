//! 一次性兑换 code 的签发逻辑。

use tracing::warn;
use uuid::Uuid;

use crate::{
    api::types::TokenIssueData,
    state::AppState,
    token::{registry::PendingToken, unix_now},
};

/// 生成兑换 code：64 位小写十六进制字符（两段 uuid v4，约 244 bit 随机性）。
pub(crate) fn generate_code() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// 签发一次性兑换链接。
///
/// 仅登记注册表条目并组装描述数据；证书本身由更早的 new-client 动作
/// 异步生成，签发阶段不触碰 daemon 的证书操作。scheme/host 来自请求
/// 上下文，由调用方传入。
pub(crate) async fn issue_token(
    state: &AppState,
    client_name: &str,
    scheme: &str,
    host: &str,
) -> TokenIssueData {
    let code = generate_code();
    let expires_at = unix_now() + state.config.token_ttl_sec;
    state
        .registry
        .insert(
            code.clone(),
            PendingToken {
                client_name: client_name.to_string(),
                expires_at,
            },
        )
        .await;

    // 设备元数据仅用于展示；拉取失败降级为空字段，不影响签发。
    let (board_name, hostname) = match state.admin.get_stats().await {
        Ok(stats) => (stats.board_name.to_lowercase(), stats.hostname),
        Err(err) => {
            warn!("fetch device stats failed, issuing without metadata: {err}");
            (String::new(), String::new())
        }
    };

    TokenIssueData {
        expires_at,
        host: host.to_string(),
        scheme: scheme.to_string(),
        path: format!("/get-token/{code}"),
        board_name,
        hostname,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cg_shared_protocol::DeviceStats;

    use super::{generate_code, issue_token};
    use crate::{
        rpc::mock::MockAdminService,
        state::AppState,
        token::unix_now,
    };

    #[test]
    fn codes_are_long_lowercase_hex_and_unique() {
        let first = generate_code();
        let second = generate_code();
        assert_eq!(first.len(), 64);
        assert!(first.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn issued_descriptor_embeds_code_and_expiry() {
        let admin = Arc::new(MockAdminService {
            stats: Some(DeviceStats {
                board_name: "Omnia-2020".to_string(),
                hostname: "router.lan".to_string(),
            }),
            ..MockAdminService::default()
        });
        let state = AppState::for_test(admin, 30);

        let before = unix_now();
        let data = issue_token(&state, "alpha", "https", "192.168.1.1").await;

        assert!(data.expires_at >= before + 30 && data.expires_at <= unix_now() + 30);
        assert_eq!(data.scheme, "https");
        assert_eq!(data.host, "192.168.1.1");
        assert_eq!(data.board_name, "omnia-2020");
        assert_eq!(data.hostname, "router.lan");

        let code = data
            .path
            .strip_prefix("/get-token/")
            .expect("path carries redemption prefix");
        let entry = state.registry.take(code).await.expect("registered entry");
        assert_eq!(entry.client_name, "alpha");
        assert_eq!(entry.expires_at, data.expires_at);
    }

    #[tokio::test]
    async fn stats_failure_degrades_to_empty_metadata() {
        let admin = Arc::new(MockAdminService {
            stats: None,
            ..MockAdminService::default()
        });
        let state = AppState::for_test(admin, 30);

        let data = issue_token(&state, "alpha", "http", "10.0.0.1").await;
        assert!(data.board_name.is_empty());
        assert!(data.hostname.is_empty());
        // 元数据失败不拦截签发：条目仍然登记成功。
        assert_eq!(state.registry.len().await, 1);
    }
}
