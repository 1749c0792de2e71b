//! Service layer for business logic
//!
//! 下载量统计的业务逻辑，HTTP 层和测试共用。

mod hit_stats;

pub use hit_stats::*;
