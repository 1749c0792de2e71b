//! HTTP 层：请求上下文与 actix-web 端点

pub mod request;
pub mod services;

pub use request::{CachePolicy, StatsRequest};
pub use services::stats_routes;
