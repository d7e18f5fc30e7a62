//! Fetching monthly reanalysis data from the archive.

pub mod cds_client;
pub mod error;
pub mod request;

pub use cds_client::{CdsClient, CdsConfig};
pub use request::CdsRequest;

use crate::download::error::DownloadError;
use crate::variables::EnsoRegion;
use log::warn;

/// The archive dataset every request in this crate targets.
pub const DATASET: &str = "reanalysis-era5-single-levels-monthly-means";

/// File name for point-variable downloads inside the data directory.
pub const VARIABLES_FILE_NAME: &str = "era5_data.nc";

/// First year the monthly archive covers.
pub const ENSO_FIRST_YEAR: i32 = 1979;
/// Last year an index window may end on.
pub const ENSO_LAST_YEAR: i32 = 2019;
/// How many years before the final year the index window reaches back.
pub const ENSO_WINDOW_YEARS: i32 = 20;

/// File name for a regional SST download inside the data directory.
pub fn enso_file_name(final_year: i32, region: EnsoRegion) -> String {
    format!("ERA5_Monthly_sst_{}_{}.nc", final_year, region.tag())
}

/// Years of the index window ending on `final_year`, oldest first: the final
/// year plus the twenty before it, clipped at the start of the archive. The
/// extra leading year keeps a full 20-calendar-year anomaly window inside the
/// downloaded file.
///
/// # Errors
///
/// Returns [`DownloadError::FinalYearOutOfRange`] when `final_year` falls
/// outside `1979..=2019`.
pub fn enso_year_range(final_year: i32) -> Result<Vec<String>, DownloadError> {
    if !(ENSO_FIRST_YEAR..=ENSO_LAST_YEAR).contains(&final_year) {
        return Err(DownloadError::FinalYearOutOfRange(final_year));
    }

    let mut first = final_year - ENSO_WINDOW_YEARS;
    if first < ENSO_FIRST_YEAR {
        warn!(
            "Index window ending {} reaches before {}; clipping",
            final_year, ENSO_FIRST_YEAR
        );
        first = ENSO_FIRST_YEAR;
    }

    Ok((first..=final_year).map(|y| y.to_string()).collect())
}
