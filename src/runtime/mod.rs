//! Application runtime: execution modes

pub mod modes;
