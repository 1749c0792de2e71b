pub mod helpers;
pub mod stats;

pub use helpers::{error_from_stats, error_response, success_response};
pub use stats::{StatsService, stats_routes};
