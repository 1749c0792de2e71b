//! hitstats - package download statistics service
//!
//! 从按天、按文件记录的下载命中数中聚合包级统计，并通过 HTTP 提供查询。
//!
//! # Features
//! - **server**: HTTP server mode (default)
//!
//! # Architecture
//! - `validation`: Schema 驱动的请求参数校验
//! - `api`: 请求上下文与 HTTP 端点
//! - `services`: 命中数聚合（按名称汇总、透视、排名、热门包）
//! - `storage`: SeaORM 存储后端
//! - `config`: 配置加载
//! - `runtime`: 运行模式
//! - `system`: 日志等系统功能
//! - `utils`: 分页与日期范围

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
pub mod validation;
