//! 集成测试共用的存储与数据准备

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tempfile::TempDir;

use hitstats::config::DatabaseConfig;
use hitstats::storage::SeaOrmStorage;
use hitstats::utils::DateRange;
use migration::entities::{file, file_hits, package, package_version};

pub async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let td = TempDir::new().unwrap();
    let p = td.path().join("hitstats_test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", p.display()),
        ..Default::default()
    };
    let s = SeaOrmStorage::new(&config).await.unwrap();
    (Arc::new(s), td)
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn january() -> DateRange {
    DateRange::bounded(d(2024, 1, 1), d(2024, 1, 31))
}

pub fn december() -> DateRange {
    DateRange::bounded(d(2023, 12, 1), d(2023, 12, 31))
}

pub async fn insert_package(db: &DatabaseConnection, package_type: &str, name: &str) -> i64 {
    package::ActiveModel {
        name: Set(name.to_string()),
        package_type: Set(package_type.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn insert_version(db: &DatabaseConnection, package_id: i64, version: &str) -> i64 {
    package_version::ActiveModel {
        package_id: Set(package_id),
        version: Set(version.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn insert_file(db: &DatabaseConnection, version_id: i64, path: &str) -> i64 {
    file::ActiveModel {
        package_version_id: Set(version_id),
        path: Set(path.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn insert_hits(db: &DatabaseConnection, file_id: i64, date: NaiveDate, hits: i64) {
    file_hits::Entity::insert(file_hits::ActiveModel {
        file_id: Set(file_id),
        date: Set(date),
        hits: Set(hits),
    })
    .exec_without_returning(db)
    .await
    .unwrap();
}

/// 标准测试数据（2024 年 1 月）：
///
/// - npm/a = 100：1.0.0 有两个文件（同一天 20 + 30，次日 10），2.0.0 为 40；2 月另有 500
/// - npm/b = 50；2023-12-31 另有 7
/// - gh/d = 30
/// - npm/c = 10
pub async fn seed_standard(db: &DatabaseConnection) {
    let a = insert_package(db, "npm", "a").await;
    let a1 = insert_version(db, a, "1.0.0").await;
    let a2 = insert_version(db, a, "2.0.0").await;
    let f1 = insert_file(db, a1, "/dist/a.js").await;
    let f2 = insert_file(db, a1, "/dist/a.min.js").await;
    let f3 = insert_file(db, a2, "/dist/a.js").await;
    insert_hits(db, f1, d(2024, 1, 5), 20).await;
    insert_hits(db, f2, d(2024, 1, 5), 30).await;
    insert_hits(db, f1, d(2024, 1, 6), 10).await;
    insert_hits(db, f3, d(2024, 1, 6), 40).await;
    insert_hits(db, f3, d(2024, 2, 1), 500).await;

    let b = insert_package(db, "npm", "b").await;
    let b1 = insert_version(db, b, "0.1.0").await;
    let fb = insert_file(db, b1, "/index.js").await;
    insert_hits(db, fb, d(2024, 1, 10), 50).await;
    insert_hits(db, fb, d(2023, 12, 31), 7).await;

    let c = insert_package(db, "npm", "c").await;
    let c1 = insert_version(db, c, "3.0.0").await;
    let fc = insert_file(db, c1, "/c.js").await;
    insert_hits(db, fc, d(2024, 1, 20), 10).await;

    let gh = insert_package(db, "gh", "d").await;
    let gh1 = insert_version(db, gh, "v1.0.0").await;
    let fd = insert_file(db, gh1, "/d.js").await;
    insert_hits(db, fd, d(2024, 1, 15), 30).await;
}
