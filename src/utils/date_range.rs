//! 日期范围工具
//!
//! 把 `(period, anchor)` 转换为闭区间的 UTC 日期范围，并计算紧邻的上一个周期。
//!
//! - 滚动周期（day / week / month / year）以 anchor 为结束日向前推
//! - 静态周期（s-month / s-year）取 anchor 所在的自然月 / 自然年
//! - `all` 两端都不设界

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

/// 周期类型
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, AsRefStr,
)]
pub enum PeriodKind {
    #[serde(rename = "day")]
    #[strum(serialize = "day")]
    Day,
    #[serde(rename = "week")]
    #[strum(serialize = "week")]
    Week,
    #[serde(rename = "month")]
    #[strum(serialize = "month")]
    Month,
    #[serde(rename = "year")]
    #[strum(serialize = "year")]
    Year,
    #[serde(rename = "s-month")]
    #[strum(serialize = "s-month")]
    StaticMonth,
    #[serde(rename = "s-year")]
    #[strum(serialize = "s-year")]
    StaticYear,
    #[serde(rename = "all")]
    #[strum(serialize = "all")]
    All,
}

impl PeriodKind {
    /// 可直接出现在查询字符串中的周期名
    pub const NAMED: [PeriodKind; 5] = [
        PeriodKind::Day,
        PeriodKind::Week,
        PeriodKind::Month,
        PeriodKind::Year,
        PeriodKind::All,
    ];

    /// 滚动周期包含的天数
    fn rolling_days(self) -> Option<u64> {
        match self {
            Self::Day => Some(1),
            Self::Week => Some(7),
            Self::Month => Some(30),
            Self::Year => Some(365),
            _ => None,
        }
    }
}

/// 结构化周期 `{period, date}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub period: PeriodKind,
    pub date: NaiveDate,
}

impl Period {
    /// 解析查询参数中的周期
    ///
    /// 滚动周期和 `all` 以 `today` 的前一天为锚点（当天数据尚不完整）；
    /// `YYYY-MM` 解析为静态月，`YYYY` 解析为静态年。
    pub fn parse(input: &str, today: NaiveDate) -> Option<Self> {
        let input = input.trim();
        let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);

        if let Some(kind) = PeriodKind::NAMED.iter().find(|k| k.as_ref() == input) {
            return Some(Self {
                period: *kind,
                date: yesterday,
            });
        }

        let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

        if input.len() == 7 && input.as_bytes()[4] == b'-' {
            if !digits(&input[..4]) || !digits(&input[5..]) {
                return None;
            }
            let year: i32 = input[..4].parse().ok()?;
            let month: u32 = input[5..].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, 1).map(|date| Self {
                period: PeriodKind::StaticMonth,
                date,
            });
        }

        if input.len() == 4 && digits(input) {
            let year: i32 = input.parse().ok()?;
            return NaiveDate::from_ymd_opt(year, 1, 1).map(|date| Self {
                period: PeriodKind::StaticYear,
                date,
            });
        }

        None
    }
}

/// 闭区间日期范围，`None` 表示该端不设界
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn bounded(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// 计算周期对应的日期范围
pub fn date_range(period: PeriodKind, anchor: NaiveDate) -> DateRange {
    if let Some(days) = period.rolling_days() {
        let from = anchor
            .checked_sub_days(Days::new(days - 1))
            .unwrap_or(NaiveDate::MIN);
        return DateRange::bounded(from, anchor);
    }

    match period {
        PeriodKind::StaticMonth => {
            let first = anchor.with_day(1).unwrap_or(anchor);
            let last = first
                .checked_add_months(Months::new(1))
                .and_then(|d| d.checked_sub_days(Days::new(1)))
                .unwrap_or(NaiveDate::MAX);
            DateRange::bounded(first, last)
        }
        PeriodKind::StaticYear => {
            let year = anchor.year();
            match (
                NaiveDate::from_ymd_opt(year, 1, 1),
                NaiveDate::from_ymd_opt(year, 12, 31),
            ) {
                (Some(first), Some(last)) => DateRange::bounded(first, last),
                _ => DateRange::unbounded(),
            }
        }
        _ => DateRange::unbounded(),
    }
}

/// 计算紧邻的上一个周期：锚点为当前范围起始日的前一天
///
/// 无下界的范围没有上一个周期。
pub fn previous_range(period: PeriodKind, current: &DateRange) -> Option<DateRange> {
    let anchor = current.from?.checked_sub_days(Days::new(1))?;
    Some(date_range(period, anchor))
}
