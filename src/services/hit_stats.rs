//! Hit statistics service layer
//!
//! 基于 file_hits 表的下载量聚合：
//!
//! - `sum_hits_by_name`：某个包在日期范围内按 (版本, 日期) 汇总的命中数
//! - `pivot_by_date` / `pivot_by_version`：对上述结果的两种重新分组
//! - `package_rank`：总命中数严格大于阈值的包数量
//! - `top_packages`：按总命中数排序的热门包列表
//! - `package_stats`：包的总量、排名及上一周期对比

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{Result, StatsError};
use crate::storage::{HitRow, SeaOrmStorage, TopPackageRow};
use crate::utils::{DateRange, Pagination};

// ============ 公共类型定义 ============

/// 某版本某天的命中数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionDayHits {
    #[serde(skip)]
    pub version_id: i64,
    pub version: String,
    pub date: NaiveDate,
    pub hits: u64,
}

/// 日期 → { 版本 → 命中数 }
pub type DatePivot = BTreeMap<String, BTreeMap<String, u64>>;

/// 版本 → { 日期 → 命中数 }
pub type VersionPivot = BTreeMap<String, BTreeMap<String, u64>>;

/// 热门包条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageRef {
    #[serde(rename = "type")]
    pub package_type: String,
    pub name: String,
    pub hits: u64,
}

impl From<TopPackageRow> for PackageRef {
    fn from(row: TopPackageRow) -> Self {
        Self {
            package_type: row.package_type,
            name: row.name,
            hits: row.hits.max(0) as u64,
        }
    }
}

/// 单个周期的总量与排名
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeriodTotal {
    pub total: u64,
    /// 没有任何命中时为 None
    pub rank: Option<u64>,
}

/// 包统计概览
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageStats {
    pub hits: PeriodTotal,
    pub prev: PeriodTotal,
    /// 日期 → 当天所有版本的命中数之和
    pub dates: BTreeMap<String, u64>,
    pub versions: VersionPivot,
}

// ============ 纯函数 ============

/// 按 (日期, 版本 id) 合并数据行
///
/// 即使输入是文件粒度的多行，输出中每个 (版本, 日期) 也只出现一次。
pub fn collapse_hits<I>(rows: I) -> Vec<VersionDayHits>
where
    I: IntoIterator<Item = HitRow>,
{
    let mut folded: BTreeMap<(NaiveDate, i64), (String, u64)> = BTreeMap::new();
    for row in rows {
        let entry = folded
            .entry((row.date, row.version_id))
            .or_insert_with(|| (row.version, 0));
        entry.1 += row.hits.max(0) as u64;
    }

    folded
        .into_iter()
        .map(|((date, version_id), (version, hits))| VersionDayHits {
            version_id,
            version,
            date,
            hits,
        })
        .collect()
}

pub fn pivot_by_date(rows: &[VersionDayHits]) -> DatePivot {
    let mut pivot = DatePivot::new();
    for row in rows {
        *pivot
            .entry(row.date.format("%Y-%m-%d").to_string())
            .or_default()
            .entry(row.version.clone())
            .or_default() += row.hits;
    }
    pivot
}

pub fn pivot_by_version(rows: &[VersionDayHits]) -> VersionPivot {
    let mut pivot = VersionPivot::new();
    for row in rows {
        *pivot
            .entry(row.version.clone())
            .or_default()
            .entry(row.date.format("%Y-%m-%d").to_string())
            .or_default() += row.hits;
    }
    pivot
}

/// 每天所有版本的命中数之和
pub fn totals_by_date(rows: &[VersionDayHits]) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    for row in rows {
        *totals
            .entry(row.date.format("%Y-%m-%d").to_string())
            .or_default() += row.hits;
    }
    totals
}

// ============ HitStatsService ============

/// 命中统计服务
pub struct HitStatsService {
    storage: Arc<SeaOrmStorage>,
}

impl HitStatsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 获取包在日期范围内按 (版本, 日期) 汇总的命中数，按日期、版本 id 排序
    pub async fn sum_hits_by_name(
        &self,
        package_type: &str,
        name: &str,
        range: &DateRange,
    ) -> Result<Vec<VersionDayHits>> {
        info!(
            "HitStats: sum_hits_by_name {}/{} from {:?} to {:?}",
            package_type, name, range.from, range.to
        );

        let rows = self
            .storage
            .get_hits_by_name(package_type, name, range)
            .await
            .map_err(|e| StatsError::query_failed(format!("Hits by name query failed: {}", e)))?;

        let hits = collapse_hits(rows);
        debug!("HitStats: sum_hits_by_name returned {} rows", hits.len());
        Ok(hits)
    }

    pub async fn pivot_by_date(
        &self,
        package_type: &str,
        name: &str,
        range: &DateRange,
    ) -> Result<DatePivot> {
        let rows = self.sum_hits_by_name(package_type, name, range).await?;
        Ok(pivot_by_date(&rows))
    }

    pub async fn pivot_by_version(
        &self,
        package_type: &str,
        name: &str,
        range: &DateRange,
    ) -> Result<VersionPivot> {
        let rows = self.sum_hits_by_name(package_type, name, range).await?;
        Ok(pivot_by_version(&rows))
    }

    /// 统计日期范围内总命中数严格大于 `threshold` 的包数量
    pub async fn package_rank(&self, threshold: u64, range: &DateRange) -> Result<u64> {
        info!(
            "HitStats: package_rank threshold={} from {:?} to {:?}",
            threshold, range.from, range.to
        );

        // 超出 i64 的阈值不可能被任何包超过
        let Ok(threshold) = i64::try_from(threshold) else {
            return Ok(0);
        };

        let count = self
            .storage
            .count_packages_above(threshold, range)
            .await
            .map_err(|e| StatsError::query_failed(format!("Package rank query failed: {}", e)))?;

        debug!("HitStats: package_rank returned {}", count);
        Ok(count)
    }

    /// 获取热门包列表
    pub async fn top_packages(
        &self,
        range: &DateRange,
        pagination: Pagination,
        package_type: Option<&str>,
    ) -> Result<Vec<PackageRef>> {
        info!(
            "HitStats: top_packages from {:?} to {:?}, pagination={:?}, type={:?}",
            range.from, range.to, pagination, package_type
        );

        let results = self
            .storage
            .get_top_packages(range, pagination, package_type)
            .await
            .map_err(|e| StatsError::query_failed(format!("Top packages query failed: {}", e)))?;

        let packages: Vec<PackageRef> = results.into_iter().map(PackageRef::from).collect();
        debug!("HitStats: top_packages returned {} packages", packages.len());
        Ok(packages)
    }

    /// 包统计概览：当前周期与上一周期的总量、排名，按日期的总量和版本透视
    pub async fn package_stats(
        &self,
        package_type: &str,
        name: &str,
        range: &DateRange,
        prev_range: Option<&DateRange>,
    ) -> Result<PackageStats> {
        let rows = self.sum_hits_by_name(package_type, name, range).await?;
        let dates = totals_by_date(&rows);
        let versions = pivot_by_version(&rows);
        let total = dates.values().sum();
        let hits = self.period_total(total, range).await?;

        let prev = match prev_range {
            Some(prev_range) => {
                let prev_rows = self.sum_hits_by_name(package_type, name, prev_range).await?;
                let prev_total = prev_rows.iter().map(|r| r.hits).sum();
                self.period_total(prev_total, prev_range).await?
            }
            None => PeriodTotal::default(),
        };

        Ok(PackageStats {
            hits,
            prev,
            dates,
            versions,
        })
    }

    async fn period_total(&self, total: u64, range: &DateRange) -> Result<PeriodTotal> {
        let rank = if total > 0 {
            Some(self.package_rank(total, range).await? + 1)
        } else {
            None
        };
        Ok(PeriodTotal { total, rank })
    }
}
