use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 日志文件名: famly-fetch.2025-10-05.log
const LOG_FILE_PREFIX: &str = "famly-fetch";
const LOG_FILE_SUFFIX: &str = "log";

/// 默认日志目录
///
/// - Linux: `~/.local/share/famly-fetch/logs/`
/// - macOS: `~/Library/Application Support/famly-fetch/logs/`
/// - Windows: `C:\Users\<user>\AppData\Local\famly-fetch\logs\`
///
/// 无法获取系统目录时回退到 `./logs`
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("famly-fetch").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// 初始化日志系统
///
/// - 文件层: JSON格式,按天轮转,non_blocking 写入
/// - 控制台层: 人类可读格式
/// - 环境变量控制: RUST_LOG=debug 可调整日志级别,默认 INFO
///
/// # 重要提示
/// 返回的guard必须被调用者保存,直到程序退出。
/// 如果guard被drop,文件写入器将被关闭。
pub fn init(log_dir: &Path) -> Result<WorkerGuard, io::Error> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = file_appender(log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false);

    let console_layer = fmt::layer()
        .with_writer(io::stdout)
        .with_target(false)
        .with_level(true)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    Ok(guard)
}

/// 按天轮转的日志文件
fn file_appender(log_dir: &Path) -> Result<RollingFileAppender, io::Error> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(log_dir)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}
