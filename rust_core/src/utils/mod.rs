//! Utility modules for totals_core

pub mod points;
