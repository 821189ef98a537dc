//! 配置模块职责：
//! 1. 读取面板运行所需的环境变量并提供默认值。
//! 2. 校验 admin RPC 地址并约束 token TTL 等数值范围。

use std::time::Duration;

use anyhow::{Context, bail};
use url::Url;

/// 面板默认监听地址。
const DEFAULT_PANEL_ADDR: &str = "0.0.0.0:18090";
/// admin RPC 默认地址（路由器本机 daemon）。
const DEFAULT_ADMIN_RPC_URL: &str = "http://127.0.0.1:8051";
/// RPC 超时默认值（秒）。
const DEFAULT_RPC_TIMEOUT_SEC: u64 = 10;
/// 一次性 token 默认有效期（秒）。二维码扫码窗口，后续按实际体验调优。
const DEFAULT_TOKEN_TTL_SEC: u64 = 30;
/// 过期条目后台清扫周期默认值（秒）。
const DEFAULT_SWEEP_INTERVAL_SEC: u64 = 300;
/// 兑换链接默认 scheme（无反向代理头时的回退值）。
const DEFAULT_PUBLIC_SCHEME: &str = "http";

/// 面板监听地址环境变量。
const PANEL_ADDR_ENV: &str = "CG_PANEL_ADDR";
/// admin RPC 地址环境变量。
const ADMIN_RPC_URL_ENV: &str = "CG_ADMIN_RPC_URL";
/// RPC 超时环境变量（秒）。
const RPC_TIMEOUT_ENV: &str = "CG_RPC_TIMEOUT_SEC";
/// token TTL 环境变量（秒）。
const TOKEN_TTL_ENV: &str = "CG_TOKEN_TTL_SEC";
/// 清扫周期环境变量（秒）。
const SWEEP_INTERVAL_ENV: &str = "CG_SWEEP_INTERVAL_SEC";
/// 兑换链接 scheme 回退环境变量。
const PUBLIC_SCHEME_ENV: &str = "CG_PUBLIC_SCHEME";

/// 面板运行时配置。
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// HTTP 监听地址。
    pub(crate) listen_addr: String,
    /// admin RPC base URL。
    pub(crate) admin_rpc_url: String,
    /// 每次 RPC 调用的有界超时。
    pub(crate) rpc_timeout: Duration,
    /// 一次性 token 有效期（秒）。
    pub(crate) token_ttl_sec: u64,
    /// 过期条目清扫周期。
    pub(crate) sweep_interval: Duration,
    /// 无代理头时的兑换链接 scheme。
    pub(crate) public_scheme: String,
}

impl Config {
    /// 从环境变量装配配置。
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        let admin_rpc_url = env_trimmed(ADMIN_RPC_URL_ENV)
            .unwrap_or_else(|| DEFAULT_ADMIN_RPC_URL.to_string());
        validate_rpc_url(&admin_rpc_url)
            .with_context(|| format!("invalid {ADMIN_RPC_URL_ENV}: {admin_rpc_url}"))?;

        Ok(Self {
            listen_addr: env_trimmed(PANEL_ADDR_ENV)
                .unwrap_or_else(|| DEFAULT_PANEL_ADDR.to_string()),
            admin_rpc_url,
            rpc_timeout: Duration::from_secs(
                env_u64(RPC_TIMEOUT_ENV)
                    .unwrap_or(DEFAULT_RPC_TIMEOUT_SEC)
                    .clamp(1, 120),
            ),
            token_ttl_sec: normalize_token_ttl(env_u64(TOKEN_TTL_ENV)),
            sweep_interval: Duration::from_secs(
                env_u64(SWEEP_INTERVAL_ENV)
                    .unwrap_or(DEFAULT_SWEEP_INTERVAL_SEC)
                    .clamp(10, 86_400),
            ),
            public_scheme: env_trimmed(PUBLIC_SCHEME_ENV)
                .unwrap_or_else(|| DEFAULT_PUBLIC_SCHEME.to_string()),
        })
    }
}

/// 归一化 token TTL（秒）。
pub(crate) fn normalize_token_ttl(raw: Option<u64>) -> u64 {
    raw.unwrap_or(DEFAULT_TOKEN_TTL_SEC).clamp(5, 3600)
}

/// 校验 admin RPC 地址必须是 http/https。
fn validate_rpc_url(raw: &str) -> anyhow::Result<()> {
    let parsed = Url::parse(raw).context("parse url")?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("unsupported rpc scheme: {other}"),
    }
}

/// 读取并去除空白的环境变量；空值视为未设置。
fn env_trimmed(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// 读取 u64 环境变量；非法值视为未设置。
fn env_u64(key: &str) -> Option<u64> {
    env_trimmed(key).and_then(|value| value.parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::{normalize_token_ttl, validate_rpc_url};

    #[test]
    fn token_ttl_is_clamped_to_allowed_range() {
        assert_eq!(normalize_token_ttl(None), 30);
        assert_eq!(normalize_token_ttl(Some(1)), 5);
        assert_eq!(normalize_token_ttl(Some(29)), 29);
        assert_eq!(normalize_token_ttl(Some(7200)), 3600);
    }

    #[test]
    fn rpc_url_must_be_http() {
        assert!(validate_rpc_url("http://127.0.0.1:8051").is_ok());
        assert!(validate_rpc_url("https://router.lan/rpc").is_ok());
        assert!(validate_rpc_url("ws://127.0.0.1:8051").is_err());
        assert!(validate_rpc_url("not a url").is_err());
    }
}
