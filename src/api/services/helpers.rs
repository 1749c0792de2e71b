//! Stats API 帮助函数

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::http::header;
use serde::Serialize;
use tracing::error;

use crate::api::request::{CachePolicy, NO_CACHE};
use crate::errors::StatsError;
use crate::validation::ErrorBody;

/// 构建带缓存头的成功响应
pub fn success_response<T: Serialize>(data: &T, policy: CachePolicy) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, policy.cache_control()))
        .insert_header((header::EXPIRES, policy.expires_header()))
        .json(data)
}

/// 构建错误响应（禁止缓存）
pub fn error_response(body: &ErrorBody) -> HttpResponse {
    let status = StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status)
        .insert_header((header::CACHE_CONTROL, NO_CACHE))
        .json(body)
}

/// 从 StatsError 构建错误响应
///
/// 4xx 直接返回错误信息；5xx 只记录日志，对外返回通用信息。
pub fn error_from_stats(err: &StatsError) -> HttpResponse {
    let status = err.http_status();
    let message = if status >= 500 {
        error!("Stats request failed: {}", err);
        "Internal server error.".to_string()
    } else {
        err.message().to_string()
    };

    error_response(&ErrorBody { status, message })
}
