//! 日志系统模块职责：
//! 1. 初始化 stdout + 文件双通道 tracing 日志。
//! 2. 将运行日志按天落在 `logs/raw` 目录。
//! 3. 将历史日期日志归档到 `logs/archive/<YYYY-MM-DD>.7z`。

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use sevenz_rust::compress_to_path;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// 默认日志根目录（相对当前工作目录）。
const DEFAULT_LOG_DIR: &str = "logs";
/// 日志根目录环境变量。
const LOG_DIR_ENV: &str = "CG_LOG_DIR";
/// 文件日志级别环境变量（独立于 `RUST_LOG`）。
const FILE_LOG_LEVEL_ENV: &str = "CG_FILE_LOG_LEVEL";
/// 归档轮询周期环境变量（秒）。
const ARCHIVE_INTERVAL_ENV: &str = "CG_LOG_ARCHIVE_INTERVAL_SEC";
/// 归档任务默认轮询周期（秒）。
const DEFAULT_ARCHIVE_INTERVAL_SEC: u64 = 3600;

/// 日志运行时守卫，防止 non-blocking writer 提前析构。
pub(crate) struct LogRuntime {
    _stdout_guard: WorkerGuard,
    _file_guard: WorkerGuard,
    _archiver: JoinHandle<()>,
}

/// 初始化面板日志系统，并启动自动归档任务。
pub(crate) fn init(service_name: &str) -> Result<LogRuntime> {
    let root_dir = resolve_log_root();
    let raw_dir = root_dir.join("raw");
    let archive_dir = root_dir.join("archive");
    fs::create_dir_all(&raw_dir)
        .with_context(|| format!("create raw log dir: {}", raw_dir.display()))?;
    fs::create_dir_all(&archive_dir)
        .with_context(|| format!("create archive log dir: {}", archive_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&raw_dir, format!("{service_name}.log"));
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(stdout_writer)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        );
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(file_level_filter());

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let archiver = spawn_archive_task(raw_dir, archive_dir);
    Ok(LogRuntime {
        _stdout_guard: stdout_guard,
        _file_guard: file_guard,
        _archiver: archiver,
    })
}

/// 文件日志级别；默认保留 `debug` 级别，确保日志文件可完整回放。
fn file_level_filter() -> LevelFilter {
    std::env::var(FILE_LOG_LEVEL_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::DEBUG)
}

/// 解析日志根目录为绝对路径。
fn resolve_log_root() -> PathBuf {
    let raw = std::env::var(LOG_DIR_ENV).unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(dir) => dir.join(path),
        Err(_) => PathBuf::from(DEFAULT_LOG_DIR),
    }
}

/// 启动后台归档任务，定期将历史日志打包为 `.7z`。
fn spawn_archive_task(raw_dir: PathBuf, archive_dir: PathBuf) -> JoinHandle<()> {
    let interval = archive_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(err) = archive_completed_days(&raw_dir, &archive_dir) {
                warn!("archive logs failed: {err}");
            }
        }
    })
}

/// 读取归档轮询间隔配置。
fn archive_interval() -> Duration {
    let sec = std::env::var(ARCHIVE_INTERVAL_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_ARCHIVE_INTERVAL_SEC);
    Duration::from_secs(sec)
}

/// 将已完成日期的日志文件压缩归档，成功后删除 raw 原文件。
fn archive_completed_days(raw_dir: &Path, archive_dir: &Path) -> Result<()> {
    if !raw_dir.exists() {
        return Ok(());
    }
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();

    for entry in fs::read_dir(raw_dir)
        .with_context(|| format!("read raw logs: {}", raw_dir.display()))?
    {
        let path = entry
            .with_context(|| format!("read entry under {}", raw_dir.display()))?
            .path();
        if !path.is_file() {
            continue;
        }
        let Some(day) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(extract_day_from_log_name)
        else {
            continue;
        };
        if day >= today {
            continue;
        }

        let archive_path = archive_dir.join(format!("{day}.7z"));
        if !archive_path.exists() {
            let archive_tmp = archive_dir.join(format!("{day}.7z.tmp"));
            if archive_tmp.exists() {
                let _ = fs::remove_file(&archive_tmp);
            }
            compress_to_path(&path, &archive_tmp)
                .with_context(|| format!("compress logs to {}", archive_tmp.display()))?;
            fs::rename(&archive_tmp, &archive_path).with_context(|| {
                format!(
                    "finalize archive {} -> {}",
                    archive_tmp.display(),
                    archive_path.display()
                )
            })?;
        }
        let _ = fs::remove_file(&path);
    }

    Ok(())
}

/// 从日志文件名中提取日期（格式：`YYYY-MM-DD`）。
fn extract_day_from_log_name(file_name: &str) -> Option<String> {
    let day = file_name.rsplit('.').next()?;
    if NaiveDate::parse_from_str(day, "%Y-%m-%d").is_err() {
        return None;
    }
    Some(day.to_string())
}
