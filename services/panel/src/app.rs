//! 面板应用装配：路由、CORS、后台清扫任务与监听。

use std::sync::Arc;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tokio::time::MissedTickBehavior;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::{
    ca::{
        handlers::{
            ca_status_handler, get_token_download_handler, new_client_handler, reset_ca_handler,
            revoke_client_handler,
        },
        page::index_handler,
    },
    config::Config,
    rpc::client::HttpAdminClient,
    state::AppState,
    token::{
        handlers::{issue_token_handler, redeem_token_handler},
        registry::TokenRegistry,
        unix_now,
    },
};

/// 面板入口：装配状态与路由并启动 HTTP 服务。
pub(crate) async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let admin = Arc::new(HttpAdminClient::new(
        &config.admin_rpc_url,
        config.rpc_timeout,
    )?);
    let addr = config.listen_addr.clone();
    let sweep_interval = config.sweep_interval;
    let state = AppState::new(config, admin);

    spawn_sweep_task(Arc::clone(&state.registry), sweep_interval);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(index_handler))
        .route("/v1/ca/status", get(ca_status_handler))
        .route("/v1/ca/new-client", post(new_client_handler))
        .route("/v1/ca/revoke", post(revoke_client_handler))
        .route("/v1/ca/reset", post(reset_ca_handler))
        .route("/v1/ca/get-token", post(get_token_download_handler))
        .route("/v1/token/issue", post(issue_token_handler))
        .route("/get-token/{code}", get(redeem_token_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("cg-panel listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// 启动过期条目清扫任务。清扫只是内存回收优化，兑换正确性不依赖它。
fn spawn_sweep_task(registry: Arc<TokenRegistry>, interval: std::time::Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let removed = registry.sweep_expired(unix_now()).await;
            if removed > 0 {
                debug!("swept {removed} expired one-time codes");
            }
        }
    });
}

/// 健康检查接口。
async fn healthz() -> &'static str {
    "ok"
}
