//! panel CLI 分发：`run`、`status`、`doctor`、`version`。

use std::process::Command;

use anyhow::anyhow;
use serde_json::json;

/// CLI 分发结果。
pub(crate) enum CliDispatch {
    /// 继续进入面板主循环。
    Run,
    /// 命令已处理完成，主程序应退出。
    Exit,
}

/// 解析并执行 panel CLI。
pub(crate) fn dispatch(args: &[String]) -> anyhow::Result<CliDispatch> {
    if args.is_empty() {
        return Ok(CliDispatch::Run);
    }

    let cmd = args[0].trim();
    if cmd.is_empty() || cmd == "run" {
        return Ok(CliDispatch::Run);
    }

    if matches!(cmd, "-h" | "--help" | "help") {
        print_root_help();
        return Ok(CliDispatch::Exit);
    }

    match cmd {
        "status" => {
            let active = service_active();
            println!("cg-panel: {}", if active { "active" } else { "inactive" });
            if !active {
                std::process::exit(1);
            }
            Ok(CliDispatch::Exit)
        }
        "doctor" => {
            let format = parse_doctor_format(&args[1..])?;
            run_doctor(format);
            Ok(CliDispatch::Exit)
        }
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(CliDispatch::Exit)
        }
        other => Err(anyhow!(
            "unknown command: {other}; run `cg-panel --help` for usage"
        )),
    }
}

/// `doctor` 输出格式。
enum DoctorFormat {
    Text,
    Json,
}

/// 解析 doctor 的 `--format` 参数。
fn parse_doctor_format(args: &[String]) -> anyhow::Result<DoctorFormat> {
    if args.is_empty() {
        return Ok(DoctorFormat::Text);
    }
    if args.len() == 2 && args[0] == "--format" {
        return match args[1].as_str() {
            "text" => Ok(DoctorFormat::Text),
            "json" => Ok(DoctorFormat::Json),
            other => Err(anyhow!("unsupported doctor format: {other}")),
        };
    }
    Err(anyhow!("usage: cg-panel doctor [--format text|json]"))
}

/// 打印 doctor 信息并按健康度设置退出码。
fn run_doctor(format: DoctorFormat) {
    let manager = service_manager();
    let active = service_active();
    let panel_addr =
        std::env::var("CG_PANEL_ADDR").unwrap_or_else(|_| "0.0.0.0:18090".to_string());
    let rpc_url =
        std::env::var("CG_ADMIN_RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:8051".to_string());

    match format {
        DoctorFormat::Text => {
            println!("service-manager: {}", manager);
            println!("service-active: {}", if active { "yes" } else { "no" });
            println!("panel-addr: {}", panel_addr);
            println!("admin-rpc-url: {}", rpc_url);
        }
        DoctorFormat::Json => {
            let payload = json!({
                "serviceManager": manager,
                "serviceActive": active,
                "panelAddr": panel_addr,
                "adminRpcUrl": rpc_url,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
            );
        }
    }

    if !active {
        std::process::exit(1);
    }
}

/// 服务管理器标识。
fn service_manager() -> &'static str {
    if cfg!(target_os = "linux") {
        "systemd"
    } else if cfg!(target_os = "macos") {
        "launchd"
    } else {
        "unknown"
    }
}

/// 检查面板是否由系统守护进程托管并活跃。
fn service_active() -> bool {
    if cfg!(target_os = "linux") {
        return Command::new("systemctl")
            .args(["is-active", "--quiet", "cg-panel.service"])
            .status()
            .map(|st| st.success())
            .unwrap_or(false);
    }

    if cfg!(target_os = "macos") {
        return Command::new("launchctl")
            .args(["print", "system/dev.certgate.panel"])
            .status()
            .map(|st| st.success())
            .unwrap_or(false);
    }

    false
}

/// 打印 root help。
fn print_root_help() {
    println!("cg-panel usage:");
    println!("  cg-panel run");
    println!("  cg-panel status");
    println!("  cg-panel doctor [--format text|json]");
    println!("  cg-panel version");
}
