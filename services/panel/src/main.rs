//! 面板二进制入口：仅负责启动应用。

mod api;
mod app;
mod ca;
mod cli;
mod config;
mod logging;
mod rpc;
mod state;
mod token;

#[tokio::main]
/// 启动 CA 管理面板服务。
async fn main() -> anyhow::Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<String>>();
    match cli::dispatch(&args)? {
        cli::CliDispatch::Run => {}
        cli::CliDispatch::Exit => return Ok(()),
    }

    let _log_runtime = logging::init("panel")?;
    app::run().await
}
