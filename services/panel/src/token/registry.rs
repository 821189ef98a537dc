//! 待兑换 token 注册表：进程级共享，单锁保证 take 的原子性。

use std::collections::HashMap;

use tokio::sync::RwLock;

/// 一条待兑换记录。code 本身作为注册表键，不在记录内重复保存。
#[derive(Debug, Clone)]
pub(crate) struct PendingToken {
    /// 兑换成功后向 daemon 拉取凭据所用的客户端名。
    pub(crate) client_name: String,
    /// 过期时刻（unix 秒）；超过后条目只能被消费为 Expired。
    pub(crate) expires_at: u64,
}

/// code -> PendingToken 注册表。
///
/// 写锁内完成插入与摘除，`take` 对并发调用方可线性化：同一 code 的两个
/// 并发兑换恰有一个观察到条目，另一个得到 None。
#[derive(Debug, Default)]
pub(crate) struct TokenRegistry {
    entries: RwLock<HashMap<String, PendingToken>>,
}

impl TokenRegistry {
    /// 登记新条目。code 冲突时覆盖旧条目：code 含 ≥244 bit 随机性，
    /// 冲突概率视为可忽略，不做专门处理。
    pub(crate) async fn insert(&self, code: String, token: PendingToken) {
        self.entries.write().await.insert(code, token);
    }

    /// 原子摘除并返回条目；不存在返回 None，属正常结果而非错误。
    pub(crate) async fn take(&self, code: &str) -> Option<PendingToken> {
        self.entries.write().await.remove(code)
    }

    /// 清扫已过期条目，返回清除数量。仅是内存回收优化：未清扫的过期
    /// 条目在 take 后仍会按过期处理，正确性不依赖本方法。
    pub(crate) async fn sweep_expired(&self, now: u64) -> usize {
        let mut guard = self.entries.write().await;
        let before = guard.len();
        guard.retain(|_, token| token.expires_at >= now);
        before - guard.len()
    }

    #[cfg(test)]
    /// 测试辅助：当前条目数（含逻辑过期但未清扫的条目）。
    pub(crate) async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{PendingToken, TokenRegistry};

    /// 构造测试条目。
    fn pending(name: &str, expires_at: u64) -> PendingToken {
        PendingToken {
            client_name: name.to_string(),
            expires_at,
        }
    }

    #[tokio::test]
    async fn take_removes_entry_exactly_once() {
        let registry = TokenRegistry::default();
        registry.insert("c0de".to_string(), pending("alpha", 100)).await;

        let first = registry.take("c0de").await;
        assert_eq!(first.expect("first take").client_name, "alpha");
        assert!(registry.take("c0de").await.is_none());
    }

    #[tokio::test]
    async fn take_of_unknown_code_is_none() {
        let registry = TokenRegistry::default();
        assert!(registry.take("deadbeef").await.is_none());
    }

    #[tokio::test]
    async fn insert_overwrites_on_code_collision() {
        let registry = TokenRegistry::default();
        registry.insert("same".to_string(), pending("old", 10)).await;
        registry.insert("same".to_string(), pending("new", 20)).await;

        let entry = registry.take("same").await.expect("entry");
        assert_eq!(entry.client_name, "new");
        assert_eq!(entry.expires_at, 20);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_take_has_single_winner() {
        for _ in 0..64 {
            let registry = Arc::new(TokenRegistry::default());
            registry.insert("race".to_string(), pending("alpha", 100)).await;

            let mut tasks = Vec::new();
            for _ in 0..8 {
                let registry = Arc::clone(&registry);
                tasks.push(tokio::spawn(async move { registry.take("race").await }));
            }

            let mut winners = 0;
            for task in tasks {
                if task.await.expect("join take task").is_some() {
                    winners += 1;
                }
            }
            assert_eq!(winners, 1);
        }
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_entries() {
        let registry = TokenRegistry::default();
        registry.insert("old".to_string(), pending("a", 50)).await;
        registry.insert("edge".to_string(), pending("b", 60)).await;
        registry.insert("live".to_string(), pending("c", 70)).await;

        let removed = registry.sweep_expired(60).await;
        assert_eq!(removed, 1);
        assert!(registry.take("old").await.is_none());
        assert!(registry.take("edge").await.is_some());
        assert!(registry.take("live").await.is_some());
    }
}
