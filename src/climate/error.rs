use crate::dates::Month;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClimateDataError {
    #[error("Data file not found: '{0}' (download it first)")]
    FileNotFound(PathBuf),

    #[error("Failed to read NetCDF file '{path}'")]
    NetCdf {
        path: PathBuf,
        #[source]
        source: netcdf::Error,
    },

    #[error("Variable '{0}' not present in the data file")]
    MissingVariable(String),

    #[error("Coordinate '{0}' not present in the data file")]
    MissingCoordinate(String),

    #[error("Cannot decode time axis units '{0}'")]
    CfTimeUnits(String),

    #[error("Variable '{variable}' has {found} time steps, expected {expected}")]
    ShapeMismatch {
        variable: String,
        expected: usize,
        found: usize,
    },

    #[error("Window {start} to {end} is not chronological")]
    NonChronological { start: Month, end: Month },

    #[error("Window spans {years} years, more than the supported 20")]
    WindowTooLong { years: i32 },

    #[error("No data for calendar month {0:02} in the reference window")]
    MissingMonth(u32),

    #[error("Series length {series} does not match baseline length {baseline}")]
    BaselineLengthMismatch { series: usize, baseline: usize },

    #[error("Series lengths differ: {left} on the left axis, {right} on the right")]
    SeriesLengthMismatch { left: usize, right: usize },

    #[error("Failed processing series: {0}")]
    DataFrame(#[from] PolarsError),
}
