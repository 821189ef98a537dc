//! 一次性兑换 code 的消费逻辑。

use thiserror::Error;

use crate::state::AppState;

/// 兑换失败原因；NotFound/Expired 为终态，不重试。
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum RedeemError {
    /// code 未签发、已被消费或已被清扫。
    #[error("code not found or already consumed")]
    NotFound,
    /// code 存在但已过有效期；条目此时已被消费。
    #[error("code expired")]
    Expired,
    /// daemon 未返回凭据或 RPC 失败；条目同样已被消费。
    #[error("credential fetch failed: {0}")]
    Upstream(String),
}

/// 兑换产物：PEM 凭据与下载文件名。
#[derive(Debug)]
pub(crate) struct Credential {
    pub(crate) file_name: String,
    pub(crate) bytes: Vec<u8>,
}

/// 消费一个兑换 code。
///
/// 先无条件摘除条目再判定过期：code 一经触达即失效，无论后续凭据
/// 拉取是否成功。过期判定只信注册表内存储的 expires_at，不信调用方
/// 手里的描述数据。`now` 由调用方传入，便于测试注入时钟。
pub(crate) async fn redeem_token(
    state: &AppState,
    code: &str,
    now: u64,
) -> Result<Credential, RedeemError> {
    let Some(entry) = state.registry.take(code).await else {
        return Err(RedeemError::NotFound);
    };
    if now > entry.expires_at {
        return Err(RedeemError::Expired);
    }

    match state.admin.get_token(&entry.client_name).await {
        Ok(Some(bytes)) => Ok(Credential {
            file_name: format!("{}.pem", entry.client_name),
            bytes,
        }),
        Ok(None) => Err(RedeemError::Upstream(format!(
            "daemon has no credential for {} yet",
            entry.client_name
        ))),
        Err(err) => Err(RedeemError::Upstream(err.to_string())),
    }
}
