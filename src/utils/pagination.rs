//! 分页工具
//!
//! 将 `limit` / `page` 转换为有界的 `(limit, offset)`，或不限制的 `All`。

use serde::Serialize;

use crate::config::PaginationConfig;
use crate::errors::{Result, StatsError};

/// 分页描述
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pagination {
    Bounded { limit: u64, offset: u64 },
    /// 不做任何切片，返回全部行
    All,
}

impl Pagination {
    pub fn limit(&self) -> Option<u64> {
        match self {
            Self::Bounded { limit, .. } => Some(*limit),
            Self::All => None,
        }
    }

    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Bounded { offset, .. } => Some(*offset),
            Self::All => None,
        }
    }
}

/// 计算分页参数
///
/// 缺省值取自配置；`limit < 1` 或 `page < 1` 返回 Validation 错误，不做截断。
pub fn paginate(
    limit: Option<i64>,
    page: Option<i64>,
    defaults: &PaginationConfig,
) -> Result<Pagination> {
    let limit = limit.unwrap_or(defaults.default_limit as i64);
    let page = page.unwrap_or(defaults.default_page as i64);

    if limit < 1 {
        return Err(StatsError::validation(format!(
            "limit must be greater than or equal to 1, got {}",
            limit
        )));
    }
    if page < 1 {
        return Err(StatsError::validation(format!(
            "page must be greater than or equal to 1, got {}",
            page
        )));
    }

    let (limit, page) = (limit as u64, page as u64);
    let offset = (page - 1)
        .checked_mul(limit)
        .ok_or_else(|| StatsError::validation("page * limit is out of range"))?;
    // 数据库驱动以 i64 绑定 OFFSET
    if i64::try_from(offset).is_err() {
        return Err(StatsError::validation(format!(
            "page {} is out of range for limit {}",
            page, limit
        )));
    }

    Ok(Pagination::Bounded { limit, offset })
}
