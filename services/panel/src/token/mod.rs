//! 一次性 token 兑换核心：注册表、签发与兑换。

pub(crate) mod handlers;
pub(crate) mod issue;
pub(crate) mod redeem;
pub(crate) mod registry;

/// 当前 unix 秒。
pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
