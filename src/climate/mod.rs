//! Turning downloaded monthly files into series, climatologies and
//! anomalies.

pub mod climatology;
pub mod dataset;
pub mod error;

pub use climatology::{anomaly, monthly_climatology};
pub use dataset::{GriddedMonthly, MonthlySeries};
