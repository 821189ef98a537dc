//! admin RPC 的 HTTP 客户端实现。
//!
//! 具体线缆编码不属于面板关注点：daemon 侧以 JSON 镜像 NETCONF 子树，
//! 这里只负责按操作名分发请求并套用有界超时。

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use cg_shared_protocol::{BareRpcRequest, CaInfo, DeviceStats, NamedRpcRequest, RpcAck, TokenReply};
use reqwest::Url;
use serde::{Serialize, de::DeserializeOwned};

use super::{AdminService, RpcError};

/// 基于 reqwest 的 admin RPC 客户端。
pub(crate) struct HttpAdminClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpAdminClient {
    /// 构造客户端；所有调用共用同一个有界超时。
    pub(crate) fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut base = Url::parse(base_url)
            .with_context(|| format!("invalid admin rpc url: {base_url}"))?;
        base.set_query(None);
        base.set_fragment(None);
        // 结尾保留 `/`，确保 `Url::join("rpc/get-token")` 不会吞掉路径段。
        base.set_path("/rpc/");

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build rpc http client")?;
        Ok(Self { http, base })
    }

    /// POST 一个 RPC 操作并解析 JSON 应答。
    async fn call<Req: Serialize, Reply: DeserializeOwned>(
        &self,
        op: &str,
        body: &Req,
    ) -> Result<Reply, RpcError> {
        let url = self
            .base
            .join(op)
            .map_err(|err| RpcError::Protocol(format!("join rpc op {op}: {err}")))?;
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(RpcError::Protocol(format!(
                "op {op} returned status {}",
                response.status()
            )));
        }
        response
            .json::<Reply>()
            .await
            .map_err(|err| RpcError::Protocol(format!("decode op {op} reply: {err}")))
    }
}

/// reqwest 错误归类：发送阶段失败（含超时）一律视为传输失败。
fn transport_error(err: reqwest::Error) -> RpcError {
    RpcError::Transport(err.to_string())
}

#[async_trait]
impl AdminService for HttpAdminClient {
    async fn new_client(&self, name: &str) -> Result<bool, RpcError> {
        let ack: RpcAck = self
            .call(
                "new-client",
                &NamedRpcRequest {
                    name: name.to_string(),
                    background: true,
                },
            )
            .await?;
        Ok(ack.accepted)
    }

    async fn revoke_client(&self, name: &str) -> Result<bool, RpcError> {
        let ack: RpcAck = self
            .call(
                "revoke-client",
                &NamedRpcRequest {
                    name: name.to_string(),
                    background: false,
                },
            )
            .await?;
        Ok(ack.accepted)
    }

    async fn reset_ca(&self) -> Result<bool, RpcError> {
        let ack: RpcAck = self
            .call("reset-ca", &BareRpcRequest { background: true })
            .await?;
        Ok(ack.accepted)
    }

    async fn get_token(&self, name: &str) -> Result<Option<Vec<u8>>, RpcError> {
        let reply: TokenReply = self
            .call(
                "get-token",
                &NamedRpcRequest {
                    name: name.to_string(),
                    background: false,
                },
            )
            .await?;
        let Some(encoded) = reply.token_b64 else {
            return Ok(None);
        };
        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|err| RpcError::Protocol(format!("decode token payload: {err}")))?;
        Ok(Some(bytes))
    }

    async fn get_ca(&self) -> Result<CaInfo, RpcError> {
        self.call("ca", &BareRpcRequest { background: false })
            .await
    }

    async fn get_stats(&self) -> Result<DeviceStats, RpcError> {
        self.call("stats", &BareRpcRequest { background: false })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::HttpAdminClient;

    #[test]
    fn base_url_is_normalized_to_rpc_root() {
        let client =
            HttpAdminClient::new("http://127.0.0.1:8051?x=1#frag", Duration::from_secs(5))
                .expect("build client");
        let joined = client.base.join("get-token").expect("join op");
        assert_eq!(joined.as_str(), "http://127.0.0.1:8051/rpc/get-token");
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        assert!(HttpAdminClient::new("not a url", Duration::from_secs(5)).is_err());
    }
}
