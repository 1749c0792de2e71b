//! HitStatsService 集成测试
//!
//! 覆盖 sum_hits_by_name、pivot_by_date、pivot_by_version、
//! package_rank、top_packages 和 package_stats。

mod common;

use hitstats::config::PaginationConfig;
use hitstats::services::{HitStatsService, PackageRef};
use hitstats::utils::{DateRange, Pagination, paginate};

use common::{create_temp_storage, d, december, january, seed_standard};

async fn seeded_service() -> (HitStatsService, tempfile::TempDir) {
    let (storage, td) = create_temp_storage().await;
    seed_standard(storage.get_db()).await;
    (HitStatsService::new(storage), td)
}

fn names(items: &[PackageRef]) -> Vec<&str> {
    items.iter().map(|p| p.name.as_str()).collect()
}

fn page(limit: i64, page: i64) -> Pagination {
    paginate(Some(limit), Some(page), &PaginationConfig::default()).unwrap()
}

// =============================================================================
// sum_hits_by_name
// =============================================================================

#[tokio::test]
async fn test_sum_hits_merges_files_of_same_version() {
    let (service, _td) = seeded_service().await;

    let rows = service
        .sum_hits_by_name("npm", "a", &january())
        .await
        .unwrap();

    // 1.0.0 在 1/5 有两个文件（20 + 30），只能出现一行
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].version, "1.0.0");
    assert_eq!(rows[0].date, d(2024, 1, 5));
    assert_eq!(rows[0].hits, 50);

    assert_eq!(rows[1].version, "1.0.0");
    assert_eq!(rows[1].date, d(2024, 1, 6));
    assert_eq!(rows[1].hits, 10);

    assert_eq!(rows[2].version, "2.0.0");
    assert_eq!(rows[2].date, d(2024, 1, 6));
    assert_eq!(rows[2].hits, 40);
}

#[tokio::test]
async fn test_sum_hits_respects_date_bounds() {
    let (service, _td) = seeded_service().await;

    let unbounded: u64 = service
        .sum_hits_by_name("npm", "a", &DateRange::unbounded())
        .await
        .unwrap()
        .iter()
        .map(|r| r.hits)
        .sum();
    assert_eq!(unbounded, 600);

    let from_feb: u64 = service
        .sum_hits_by_name("npm", "a", &DateRange::new(Some(d(2024, 2, 1)), None))
        .await
        .unwrap()
        .iter()
        .map(|r| r.hits)
        .sum();
    assert_eq!(from_feb, 500);

    // 闭区间：起止同一天
    let single_day = DateRange::bounded(d(2024, 1, 6), d(2024, 1, 6));
    let rows = service
        .sum_hits_by_name("npm", "a", &single_day)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_sum_hits_unknown_package_is_empty() {
    let (service, _td) = seeded_service().await;

    let rows = service
        .sum_hits_by_name("npm", "missing", &january())
        .await
        .unwrap();
    assert!(rows.is_empty());

    // 同名不同类型不会混入
    let rows = service
        .sum_hits_by_name("gh", "a", &january())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

// =============================================================================
// pivots
// =============================================================================

#[tokio::test]
async fn test_pivot_totals_match_sum() {
    let (service, _td) = seeded_service().await;
    let range = january();

    let total: u64 = service
        .sum_hits_by_name("npm", "a", &range)
        .await
        .unwrap()
        .iter()
        .map(|r| r.hits)
        .sum();
    let by_date: u64 = service
        .pivot_by_date("npm", "a", &range)
        .await
        .unwrap()
        .values()
        .flat_map(|m| m.values())
        .sum();
    let by_version: u64 = service
        .pivot_by_version("npm", "a", &range)
        .await
        .unwrap()
        .values()
        .flat_map(|m| m.values())
        .sum();

    assert_eq!(total, 100);
    assert_eq!(by_date, total);
    assert_eq!(by_version, total);
}

#[tokio::test]
async fn test_pivot_by_version_shape() {
    let (service, _td) = seeded_service().await;

    let pivot = service
        .pivot_by_version("npm", "a", &january())
        .await
        .unwrap();
    assert_eq!(pivot.len(), 2);
    assert_eq!(pivot["1.0.0"]["2024-01-05"], 50);
    assert_eq!(pivot["1.0.0"]["2024-01-06"], 10);
    assert_eq!(pivot["2.0.0"]["2024-01-06"], 40);
}

// =============================================================================
// package_rank
// =============================================================================

#[tokio::test]
async fn test_package_rank_counts_strictly_greater() {
    let (service, _td) = seeded_service().await;
    let range = january();

    assert_eq!(service.package_rank(60, &range).await.unwrap(), 1);
    assert_eq!(service.package_rank(50, &range).await.unwrap(), 1);
    assert_eq!(service.package_rank(49, &range).await.unwrap(), 2);
    assert_eq!(service.package_rank(0, &range).await.unwrap(), 4);
    assert_eq!(service.package_rank(100, &range).await.unwrap(), 0);
}

#[tokio::test]
async fn test_package_rank_is_non_increasing() {
    let (service, _td) = seeded_service().await;
    let range = january();

    let mut previous = u64::MAX;
    for threshold in [0, 5, 10, 29, 30, 31, 50, 99, 100, 1_000, u64::MAX] {
        let rank = service.package_rank(threshold, &range).await.unwrap();
        assert!(
            rank <= previous,
            "rank({}) = {} > {}",
            threshold,
            rank,
            previous
        );
        previous = rank;
    }
}

// =============================================================================
// top_packages
// =============================================================================

#[tokio::test]
async fn test_top_packages_ordered_by_hits() {
    let (service, _td) = seeded_service().await;

    let npm = service
        .top_packages(&january(), page(10, 1), Some("npm"))
        .await
        .unwrap();
    assert_eq!(names(&npm), vec!["a", "b", "c"]);
    assert_eq!(npm[0].hits, 100);
    assert_eq!(npm[0].package_type, "npm");

    let all_types = service
        .top_packages(&january(), page(10, 1), None)
        .await
        .unwrap();
    assert_eq!(names(&all_types), vec!["a", "b", "d", "c"]);
    assert_eq!(all_types[2].package_type, "gh");
}

#[tokio::test]
async fn test_top_packages_pagination_slices_full_list() {
    let (service, _td) = seeded_service().await;
    let range = january();

    let full = service
        .top_packages(&range, page(10, 1), None)
        .await
        .unwrap();
    let second = service
        .top_packages(&range, page(2, 2), None)
        .await
        .unwrap();

    assert_eq!(second, full[2..4].to_vec());
}

#[tokio::test]
async fn test_top_packages_all_is_unpaginated() {
    let (service, _td) = seeded_service().await;

    let all = service
        .top_packages(&january(), Pagination::All, None)
        .await
        .unwrap();
    assert_eq!(all.len(), 4);

    let past_end = service
        .top_packages(&january(), page(10, 2), None)
        .await
        .unwrap();
    assert!(past_end.is_empty());
}

// =============================================================================
// package_stats
// =============================================================================

#[tokio::test]
async fn test_package_stats_with_previous_period() {
    let (service, _td) = seeded_service().await;

    let a = service
        .package_stats("npm", "a", &january(), Some(&december()))
        .await
        .unwrap();
    assert_eq!(a.hits.total, 100);
    assert_eq!(a.hits.rank, Some(1));
    assert_eq!(a.prev.total, 0);
    assert_eq!(a.prev.rank, None);
    assert_eq!(a.dates["2024-01-05"], 50);
    assert_eq!(a.dates["2024-01-06"], 50);
    assert_eq!(a.versions["2.0.0"]["2024-01-06"], 40);

    let b = service
        .package_stats("npm", "b", &january(), Some(&december()))
        .await
        .unwrap();
    assert_eq!(b.hits.total, 50);
    assert_eq!(b.hits.rank, Some(2));
    assert_eq!(b.prev.total, 7);
    assert_eq!(b.prev.rank, Some(1));
}

#[tokio::test]
async fn test_package_stats_without_hits() {
    let (service, _td) = seeded_service().await;

    let stats = service
        .package_stats("npm", "missing", &january(), None)
        .await
        .unwrap();
    assert_eq!(stats.hits.total, 0);
    assert_eq!(stats.hits.rank, None);
    assert!(stats.dates.is_empty());
    assert!(stats.versions.is_empty());
}
