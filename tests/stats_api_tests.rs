//! Stats HTTP API 集成测试

mod common;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use hitstats::api::stats_routes;
use hitstats::config::AppConfig;
use hitstats::services::HitStatsService;

use common::{create_temp_storage, seed_standard};

const SUCCESS_CACHE: &str = "public, stale-while-revalidate=3600, stale-if-error=86400";
const ERROR_CACHE: &str = "no-cache, no-store, must-revalidate";

macro_rules! stats_app {
    () => {{
        let (storage, td) = create_temp_storage().await;
        seed_standard(storage.get_db()).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(HitStatsService::new(storage)))
                .app_data(web::Data::new(AppConfig::default()))
                .service(stats_routes()),
        )
        .await;
        (app, td)
    }};
}

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_top_packages_by_type() {
    let (app, _td) = stats_app!();

    let req = test::TestRequest::get()
        .uri("/v1/stats/packages/npm?period=2024-01")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).unwrap(),
        SUCCESS_CACHE
    );
    assert!(resp.headers().contains_key(header::EXPIRES));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(names(&body), vec!["a", "b", "c"]);
    assert_eq!(body[0], json!({"type": "npm", "name": "a", "hits": 100}));
}

#[tokio::test]
async fn test_top_packages_paginated() {
    let (app, _td) = stats_app!();

    let req = test::TestRequest::get()
        .uri("/v1/stats/packages?period=2024-01&limit=2&page=2")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(names(&body), vec!["d", "c"]);
}

#[tokio::test]
async fn test_top_packages_all_ignores_limit() {
    let (app, _td) = stats_app!();

    let req = test::TestRequest::get()
        .uri("/v1/stats/packages/all?period=2024-01&limit=1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(names(&body), vec!["a", "b", "d", "c"]);
}

#[tokio::test]
async fn test_unknown_query_params_are_ignored() {
    let (app, _td) = stats_app!();

    let req = test::TestRequest::get()
        .uri("/v1/stats/packages?period=2024-01&utm=abc")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_limit_is_400() {
    let (app, _td) = stats_app!();

    let req = test::TestRequest::get()
        .uri("/v1/stats/packages?limit=0")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).unwrap(),
        ERROR_CACHE
    );
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "status": 400,
            "message": "Invalid parameter value: `limit` must be greater than or equal to 1."
        })
    );
}

#[tokio::test]
async fn test_invalid_type_is_400() {
    let (app, _td) = stats_app!();

    let req = test::TestRequest::get()
        .uri("/v1/stats/packages/pypi")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        "Invalid parameter value: `type` must be one of [gh, npm]."
    );
}

#[tokio::test]
async fn test_multiple_query_errors_sorted() {
    let (app, _td) = stats_app!();

    let req = test::TestRequest::get()
        .uri("/v1/stats/packages?page=x&limit=500&by=size")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        "Invalid parameter value: `by` must be one of [hits, bandwidth], \
         `limit` must be less than or equal to 100, `page` must be a number."
    );
}

#[tokio::test]
async fn test_package_stats() {
    let (app, _td) = stats_app!();

    let req = test::TestRequest::get()
        .uri("/v1/package/npm/a/stats?period=2024-01")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).unwrap(),
        SUCCESS_CACHE
    );

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["hits"], json!({"total": 100, "rank": 1}));
    assert_eq!(body["prev"], json!({"total": 0, "rank": null}));
    assert_eq!(body["dates"]["2024-01-05"], 50);
    assert_eq!(body["versions"]["1.0.0"]["2024-01-06"], 10);
}

#[tokio::test]
async fn test_package_versions() {
    let (app, _td) = stats_app!();

    let req = test::TestRequest::get()
        .uri("/v1/package/npm/a/stats/versions?period=2024-01")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        json!({
            "1.0.0": {"2024-01-05": 50, "2024-01-06": 10},
            "2.0.0": {"2024-01-06": 40}
        })
    );
}

#[tokio::test]
async fn test_package_stats_invalid_period() {
    let (app, _td) = stats_app!();

    let req = test::TestRequest::get()
        .uri("/v1/package/npm/a/stats?period=decade")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("`period` must be one of [day, week, month, year, all]")
    );
}

#[tokio::test]
async fn test_package_stats_bad_country() {
    let (app, _td) = stats_app!();

    let req = test::TestRequest::get()
        .uri("/v1/package/gh/d/stats?period=2024-01&country=POL")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_page_beyond_offset_range_is_400() {
    let (app, _td) = stats_app!();

    let req = test::TestRequest::get()
        .uri("/v1/stats/packages?limit=100&page=100000000000000001")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).unwrap(),
        ERROR_CACHE
    );
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_period_as_path_segment() {
    let (app, _td) = stats_app!();

    let req = test::TestRequest::get()
        .uri("/v1/stats/packages/npm/2024-01")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(names(&body), vec!["a", "b", "c"]);

    // 路径中的周期覆盖查询字符串
    let req = test::TestRequest::get()
        .uri("/v1/stats/packages/gh/2024-01?period=2023")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(names(&body), vec!["d"]);

    let req = test::TestRequest::get()
        .uri("/v1/stats/packages/all/2024-01")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(names(&body), vec!["a", "b", "d", "c"]);
}

#[tokio::test]
async fn test_invalid_path_period_is_400() {
    let (app, _td) = stats_app!();

    let req = test::TestRequest::get()
        .uri("/v1/stats/packages/npm/+024-01")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
