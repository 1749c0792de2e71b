//! 请求上下文
//!
//! 从原始路径、校验后的路径参数和查询参数派生统计查询所需的信息：
//! 分页、位置过滤、日期范围以及缓存策略。原始查询字符串不会进入这里。

use chrono::{DateTime, Days, TimeDelta, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{AppConfig, V1Config};
use crate::errors::{Result, StatsError};
use crate::utils::{DateRange, Pagination, Period, date_range, paginate, previous_range};

/// 错误响应使用的 Cache-Control
pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// 扁平位置过滤：`{countryIso}`、`{continentCode}` 或空对象
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleLocationFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_iso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continent_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Country,
    Continent,
    Global,
}

/// 组合位置过滤：`{locationType, locationId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedLocationFilter {
    pub location_type: LocationType,
    pub location_id: Option<String>,
}

/// 缓存策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub expires: DateTime<Utc>,
    pub stale_while_revalidate: u64,
    pub stale_if_error: u64,
}

impl CachePolicy {
    /// 过期时间固定为下一个 UTC 零点再加 `delay_secs`
    pub fn at(now: DateTime<Utc>, delay_secs: u64, v1: &V1Config) -> Self {
        let next_midnight = now
            .date_naive()
            .checked_add_days(Days::new(1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or(now);
        let delay = TimeDelta::try_seconds(delay_secs as i64).unwrap_or_default();

        Self {
            expires: next_midnight + delay,
            stale_while_revalidate: v1.max_stale_short,
            stale_if_error: v1.max_stale_error,
        }
    }

    pub fn cache_control(&self) -> String {
        format!(
            "public, stale-while-revalidate={}, stale-if-error={}",
            self.stale_while_revalidate, self.stale_if_error
        )
    }

    /// `Expires` 头使用的 HTTP-date
    pub fn expires_header(&self) -> String {
        self.expires.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }
}

/// 单个统计请求的上下文
#[derive(Debug, Clone)]
pub struct StatsRequest {
    pub path: String,
    pub params: Map<String, Value>,
    pub query: Map<String, Value>,
    pub pagination: Pagination,
    pub simple_location_filter: SimpleLocationFilter,
    pub composed_location_filter: ComposedLocationFilter,
    pub period: Option<Period>,
    pub date_range: Option<DateRange>,
    pub prev_date_range: Option<DateRange>,
    v1: V1Config,
}

impl StatsRequest {
    pub fn new(
        path: impl Into<String>,
        params: Map<String, Value>,
        query: Map<String, Value>,
        config: &AppConfig,
    ) -> Result<Self> {
        let pagination = if params.get("all").and_then(Value::as_bool) == Some(true) {
            Pagination::All
        } else {
            paginate(
                query.get("limit").and_then(Value::as_i64),
                query.get("page").and_then(Value::as_i64),
                &config.pagination,
            )?
        };

        let (simple_location_filter, composed_location_filter) = location_filters(&query);

        let period = match query.get("period") {
            Some(value @ Value::Object(_)) => Some(
                serde_json::from_value::<Period>(value.clone())
                    .map_err(|e| StatsError::validation(format!("invalid period: {}", e)))?,
            ),
            _ => None,
        };
        let date_range = period.map(|p| date_range(p.period, p.date));
        let prev_date_range = match (period, date_range.as_ref()) {
            (Some(p), Some(current)) => previous_range(p.period, current),
            _ => None,
        };

        Ok(Self {
            path: path.into(),
            params,
            query,
            pagination,
            simple_location_filter,
            composed_location_filter,
            period,
            date_range,
            prev_date_range,
            v1: config.v1.clone(),
        })
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }

    /// 当前日期范围；未指定周期时不设界
    pub fn range(&self) -> DateRange {
        self.date_range.unwrap_or_default()
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::at(Utc::now(), 0, &self.v1)
    }

    pub fn cache_policy_delayed(&self) -> CachePolicy {
        CachePolicy::at(Utc::now(), self.v1.expires_delay, &self.v1)
    }
}

/// 位置过滤优先级：country > continent > global
fn location_filters(query: &Map<String, Value>) -> (SimpleLocationFilter, ComposedLocationFilter) {
    let country = query.get("country").and_then(Value::as_str);
    let continent = query.get("continent").and_then(Value::as_str);

    match (country, continent) {
        (Some(c), _) => (
            SimpleLocationFilter {
                country_iso: Some(c.to_string()),
                continent_code: None,
            },
            ComposedLocationFilter {
                location_type: LocationType::Country,
                location_id: Some(c.to_string()),
            },
        ),
        (None, Some(c)) => (
            SimpleLocationFilter {
                country_iso: None,
                continent_code: Some(c.to_string()),
            },
            ComposedLocationFilter {
                location_type: LocationType::Continent,
                location_id: Some(c.to_string()),
            },
        ),
        (None, None) => (
            SimpleLocationFilter::default(),
            ComposedLocationFilter {
                location_type: LocationType::Global,
                location_id: None,
            },
        ),
    }
}
