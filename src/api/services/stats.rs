//! Stats API 端点
//!
//! - `GET /v1/package/{type}/{name}/stats`：包统计概览
//! - `GET /v1/package/{type}/{name}/stats/versions`：按版本透视
//! - `GET /v1/stats/packages[/{type}[/{period}]]`：热门包（分页）
//! - `GET /v1/stats/packages/all[/{period}]`：热门包（不分页）
//!
//! 路径中的 `{period}` 按查询参数 `period` 处理，并覆盖查询字符串中的同名参数。

use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::api::request::StatsRequest;
use crate::config::AppConfig;
use crate::services::HitStatsService;
use crate::validation::{
    ErrorBody, Field, RawSections, RequestValidator, Schema, ValidationContext,
};

use super::helpers::{error_from_stats, error_response, success_response};

const PACKAGE_TYPES: [&str; 2] = ["gh", "npm"];

/// 可以写在路径里的查询参数
const PATH_QUERY_KEYS: [&str; 1] = ["period"];

// ============ Schemas ============

fn package_params() -> Schema {
    Schema::new()
        .field("type", Field::one_of(PACKAGE_TYPES).required())
        .field("name", Field::string().min_len(1).max_len(255).required())
}

fn top_params() -> Schema {
    Schema::new()
        .field("type", Field::one_of(PACKAGE_TYPES))
        .field("all", Field::boolean())
}

fn period_query() -> Schema {
    Schema::new()
        .field("period", Field::period().default_value("month"))
        .field("country", Field::string().min_len(2).max_len(2).uppercase())
        .field("continent", Field::string().min_len(2).max_len(2).uppercase())
}

fn top_query(config: &AppConfig) -> Schema {
    let pagination = &config.pagination;
    period_query()
        .field("by", Field::one_of(["hits", "bandwidth"]).default_value("hits"))
        .field(
            "limit",
            Field::integer()
                .min(1)
                .max(pagination.max_limit as i64)
                .default_value(pagination.default_limit),
        )
        .field(
            "page",
            Field::integer()
                .min(1)
                .default_value(pagination.default_page),
        )
}

pub fn package_validator() -> RequestValidator {
    RequestValidator::new()
        .params(package_params())
        .query(period_query())
}

pub fn top_validator(config: &AppConfig) -> RequestValidator {
    RequestValidator::new()
        .params(top_params())
        .query(top_query(config))
}

// ============ 请求准备 ============

fn string_object<'a, I>(pairs: I) -> Value
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    Value::Object(
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect::<Map<String, Value>>(),
    )
}

/// 校验路径参数与查询参数，构建 StatsRequest；失败时直接返回 400 响应
fn prepare(
    req: &HttpRequest,
    query: &HashMap<String, String>,
    validator: &RequestValidator,
    all: bool,
    config: &AppConfig,
) -> Result<StatsRequest, HttpResponse> {
    let (path_query, mut params): (Vec<(&str, &str)>, Vec<(&str, &str)>) = req
        .match_info()
        .iter()
        .partition(|(k, _)| PATH_QUERY_KEYS.contains(k));
    if all {
        params.push(("all", "true"));
    }

    let query = query
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .filter(|(k, _)| !path_query.iter().any(|(pk, _)| pk == k))
        .chain(path_query.iter().copied());

    let raw = RawSections {
        body: None,
        params: Some(string_object(params)),
        query: Some(string_object(query)),
    };

    let outcome = validator.validate(&raw, &ValidationContext::now());
    if !outcome.is_valid() {
        let body = outcome.error.unwrap_or_else(|| ErrorBody {
            status: 400,
            message: "Invalid parameter value.".to_string(),
        });
        warn!("Rejected {}: {}", req.path(), body.message);
        return Err(error_response(&body));
    }

    let sections = outcome.sections;
    StatsRequest::new(req.path(), sections.params, sections.query, config).map_err(|e| {
        warn!("Rejected {}: {}", req.path(), e);
        error_from_stats(&e)
    })
}

fn package_key(stats_req: &StatsRequest) -> Result<(&str, &str), HttpResponse> {
    match (stats_req.param("type"), stats_req.param("name")) {
        (Some(t), Some(n)) => Ok((t, n)),
        _ => Err(error_response(&ErrorBody {
            status: 400,
            message: "Invalid parameter value: `name` is required, `type` is required."
                .to_string(),
        })),
    }
}

// ============ 端点 ============

pub struct StatsService;

impl StatsService {
    pub async fn package_stats(
        req: HttpRequest,
        query: web::Query<HashMap<String, String>>,
        service: web::Data<HitStatsService>,
        config: web::Data<AppConfig>,
    ) -> HttpResponse {
        let stats_req = match prepare(&req, &query, &package_validator(), false, &config) {
            Ok(r) => r,
            Err(resp) => return resp,
        };
        let (package_type, name) = match package_key(&stats_req) {
            Ok(key) => key,
            Err(resp) => return resp,
        };
        debug!(
            "Package stats {}/{} location={:?}",
            package_type, name, stats_req.composed_location_filter
        );

        match service
            .package_stats(
                package_type,
                name,
                &stats_req.range(),
                stats_req.prev_date_range.as_ref(),
            )
            .await
        {
            Ok(stats) => success_response(&stats, stats_req.cache_policy()),
            Err(e) => error_from_stats(&e),
        }
    }

    pub async fn package_versions(
        req: HttpRequest,
        query: web::Query<HashMap<String, String>>,
        service: web::Data<HitStatsService>,
        config: web::Data<AppConfig>,
    ) -> HttpResponse {
        let stats_req = match prepare(&req, &query, &package_validator(), false, &config) {
            Ok(r) => r,
            Err(resp) => return resp,
        };
        let (package_type, name) = match package_key(&stats_req) {
            Ok(key) => key,
            Err(resp) => return resp,
        };

        match service
            .pivot_by_version(package_type, name, &stats_req.range())
            .await
        {
            Ok(pivot) => success_response(&pivot, stats_req.cache_policy()),
            Err(e) => error_from_stats(&e),
        }
    }

    pub async fn top_packages(
        req: HttpRequest,
        query: web::Query<HashMap<String, String>>,
        service: web::Data<HitStatsService>,
        config: web::Data<AppConfig>,
    ) -> HttpResponse {
        Self::top(req, query.into_inner(), service, config, false).await
    }

    pub async fn top_packages_all(
        req: HttpRequest,
        query: web::Query<HashMap<String, String>>,
        service: web::Data<HitStatsService>,
        config: web::Data<AppConfig>,
    ) -> HttpResponse {
        Self::top(req, query.into_inner(), service, config, true).await
    }

    async fn top(
        req: HttpRequest,
        query: HashMap<String, String>,
        service: web::Data<HitStatsService>,
        config: web::Data<AppConfig>,
        all: bool,
    ) -> HttpResponse {
        let stats_req = match prepare(&req, &query, &top_validator(&config), all, &config) {
            Ok(r) => r,
            Err(resp) => return resp,
        };

        match service
            .top_packages(
                &stats_req.range(),
                stats_req.pagination,
                stats_req.param("type"),
            )
            .await
        {
            Ok(packages) => success_response(&packages, stats_req.cache_policy_delayed()),
            Err(e) => error_from_stats(&e),
        }
    }
}

/// Stats 路由
pub fn stats_routes() -> actix_web::Scope {
    web::scope("/v1")
        .route(
            "/package/{type}/{name:.+}/stats/versions",
            web::get().to(StatsService::package_versions),
        )
        .route(
            "/package/{type}/{name:.+}/stats",
            web::get().to(StatsService::package_stats),
        )
        .route(
            "/stats/packages/all",
            web::get().to(StatsService::top_packages_all),
        )
        .route(
            "/stats/packages/all/{period}",
            web::get().to(StatsService::top_packages_all),
        )
        .route("/stats/packages", web::get().to(StatsService::top_packages))
        .route(
            "/stats/packages/{type}",
            web::get().to(StatsService::top_packages),
        )
        .route(
            "/stats/packages/{type}/{period}",
            web::get().to(StatsService::top_packages),
        )
}
