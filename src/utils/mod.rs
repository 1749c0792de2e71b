pub mod date_range;
pub mod pagination;

pub use date_range::{DateRange, Period, PeriodKind, date_range, previous_range};
pub use pagination::{Pagination, paginate};
