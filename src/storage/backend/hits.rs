//! 下载命中数相关的数据库查询
//!
//! 提供按包聚合的统计查询方法，供 HitStatsService 调用。
//! 所有日期边界均为闭区间，`None` 表示该端不设界。

use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select, sea_query::Expr,
};

use crate::utils::{DateRange, Pagination};
use migration::entities::{file, file_hits, package, package_version};

// ============ 查询结果类型 ============

/// 版本 × 日期的命中数（已合并同一版本下的所有文件）
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct HitRow {
    pub version_id: i64,
    pub version: String,
    pub date: NaiveDate,
    pub hits: i64,
}

/// 热门包查询结果行
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct TopPackageRow {
    pub package_id: i64,
    pub package_type: String,
    pub name: String,
    pub hits: i64,
}

fn apply_range<E: EntityTrait>(query: Select<E>, range: &DateRange) -> Select<E> {
    let query = match range.from {
        Some(from) => query.filter(file_hits::Column::Date.gte(from)),
        None => query,
    };
    match range.to {
        Some(to) => query.filter(file_hits::Column::Date.lte(to)),
        None => query,
    }
}

// ============ SeaOrmStorage 查询方法 ============

impl super::SeaOrmStorage {
    /// SUM(file_hits.hits) 的整数表达式
    ///
    /// PostgreSQL 的 SUM(bigint) 返回 numeric，MySQL 返回 decimal，需要显式转换。
    fn sum_hits_expr(&self) -> Expr {
        let target = match self.backend_name.as_str() {
            "mysql" => "SIGNED",
            _ => "BIGINT",
        };
        Expr::cust(format!("CAST(SUM(file_hits.hits) AS {})", target))
    }

    /// 获取某个包在日期范围内按 (版本, 日期) 汇总的命中数
    ///
    /// 结果按日期、版本 id 升序排列。
    pub async fn get_hits_by_name(
        &self,
        package_type: &str,
        name: &str,
        range: &DateRange,
    ) -> anyhow::Result<Vec<HitRow>> {
        let query = file_hits::Entity::find()
            .select_only()
            .column_as(package_version::Column::Id, "version_id")
            .column_as(package_version::Column::Version, "version")
            .column_as(file_hits::Column::Date, "date")
            .column_as(self.sum_hits_expr(), "hits")
            .join(JoinType::InnerJoin, file_hits::Relation::File.def())
            .join(JoinType::InnerJoin, file::Relation::PackageVersion.def())
            .join(JoinType::InnerJoin, package_version::Relation::Package.def())
            .filter(package::Column::PackageType.eq(package_type))
            .filter(package::Column::Name.eq(name));

        apply_range(query, range)
            .group_by(package_version::Column::Id)
            .group_by(package_version::Column::Version)
            .group_by(file_hits::Column::Date)
            .order_by_asc(file_hits::Column::Date)
            .order_by_asc(package_version::Column::Id)
            .into_model::<HitRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 统计日期范围内总命中数严格大于 `threshold` 的包数量
    pub async fn count_packages_above(
        &self,
        threshold: i64,
        range: &DateRange,
    ) -> anyhow::Result<u64> {
        let query = package::Entity::find()
            .select_only()
            .column(package::Column::Id)
            .join(JoinType::InnerJoin, package::Relation::PackageVersion.def())
            .join(JoinType::InnerJoin, package_version::Relation::File.def())
            .join(JoinType::InnerJoin, file::Relation::FileHits.def());

        // count() 会把分组查询包成子查询再计数
        apply_range(query, range)
            .group_by(package::Column::Id)
            .having(Expr::cust(format!(
                "SUM(file_hits.hits) > {}",
                threshold
            )))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 获取日期范围内命中数最高的包
    ///
    /// 按总命中数降序，命中数相同时按包 id 升序。
    pub async fn get_top_packages(
        &self,
        range: &DateRange,
        pagination: Pagination,
        package_type: Option<&str>,
    ) -> anyhow::Result<Vec<TopPackageRow>> {
        let sum = self.sum_hits_expr();
        let mut query = package::Entity::find()
            .select_only()
            .column_as(package::Column::Id, "package_id")
            .column_as(package::Column::PackageType, "package_type")
            .column_as(package::Column::Name, "name")
            .column_as(sum.clone(), "hits")
            .join(JoinType::InnerJoin, package::Relation::PackageVersion.def())
            .join(JoinType::InnerJoin, package_version::Relation::File.def())
            .join(JoinType::InnerJoin, file::Relation::FileHits.def());

        if let Some(t) = package_type {
            query = query.filter(package::Column::PackageType.eq(t));
        }

        let mut query = apply_range(query, range)
            .group_by(package::Column::Id)
            .group_by(package::Column::PackageType)
            .group_by(package::Column::Name)
            .order_by_desc(sum)
            .order_by_asc(package::Column::Id);

        if let Pagination::Bounded { limit, offset } = pagination {
            query = query.limit(limit).offset(offset);
        }

        query
            .into_model::<TopPackageRow>()
            .all(&self.db)
            .await
            .map_err(Into::into)
    }
}
