//! Logging system initialization
//!
//! 根据 `LoggingConfig` 初始化 tracing：控制台或文件输出、按天滚动、text / json 格式。

use std::io::Write;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::LoggingConfig;
use crate::errors::{Result, StatsError};

type BoxedWriter = Box<dyn Write + Send + Sync>;

/// 初始化日志系统
///
/// 返回的 `WorkerGuard` 必须在程序运行期间保持存活，否则非阻塞写入的日志可能丢失。
/// 只能调用一次，重复初始化会返回错误。
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let writer = make_writer(config)?;
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::new(config.level.clone());

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(config.file.as_ref().is_none_or(|f| f.is_empty()));

    let result = if config.format == "json" {
        subscriber_builder.json().try_init()
    } else {
        subscriber_builder.try_init()
    };
    result.map_err(|e| StatsError::file_operation(format!("日志初始化失败: {}", e)))?;

    Ok(guard)
}

fn make_writer(config: &LoggingConfig) -> Result<BoxedWriter> {
    let log_file = match config.file.as_deref() {
        Some(f) if !f.is_empty() => f,
        _ => return Ok(Box::new(std::io::stdout())),
    };

    if config.enable_rotation {
        let path = Path::new(log_file);
        let dir = path.parent().unwrap_or(Path::new("."));
        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("hitstats.log");
        let appender = rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(filename.trim_end_matches(".log"))
            .filename_suffix("log")
            .max_log_files(config.max_backups.max(1) as usize)
            .build(dir)
            .map_err(|e| StatsError::file_operation(format!("无法创建滚动日志: {}", e)))?;
        Ok(Box::new(appender))
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .map_err(|e| {
                StatsError::file_operation(format!("无法打开日志文件 {}: {}", log_file, e))
            })?;
        Ok(Box::new(file))
    }
}
