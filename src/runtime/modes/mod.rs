//! Mode routing
//!
//! - Server mode (HTTP server)
//! - Config mode (生成示例配置)

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "server")]
pub use server::run_server;

use std::path::Path;

use crate::config::AppConfig;
use crate::errors::{Result, StatsError};

/// 写出示例配置文件；文件已存在且未指定 `force` 时返回错误
pub fn generate_config(output_path: Option<&str>, force: bool) -> Result<String> {
    let path = output_path.unwrap_or("config.example.toml");
    if Path::new(path).exists() && !force {
        return Err(StatsError::file_operation(format!(
            "{} already exists, use --force to overwrite",
            path
        )));
    }

    std::fs::write(path, AppConfig::generate_sample_config())?;
    Ok(path.to_string())
}
