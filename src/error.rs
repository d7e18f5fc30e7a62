use crate::climate::error::ClimateDataError;
use crate::dates::Month;
use crate::download::error::DownloadError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Era5VisError {
    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    ClimateData(#[from] ClimateDataError),

    #[error("Coordinates out of range: longitude {longitude}, latitude {latitude}")]
    InvalidCoordinates { longitude: f64, latitude: f64 },

    #[error("Not a valid calendar month: {0}")]
    InvalidMonth(Month),

    #[error("Unknown variable label '{0}'")]
    UnknownVariable(String),

    #[error("Failed to create data directory '{0}'")]
    DataDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine data directory")]
    DataDirResolution(#[source] std::io::Error),
}
