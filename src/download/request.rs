//! The JSON body of an archive retrieve request.

use crate::variables::EnsoRegion;
use serde::Serialize;

/// A monthly-means retrieve request, serialized as the archive's JSON body.
///
/// `area` and `grid` are omitted entirely for global full-resolution
/// requests; the archive treats their absence as the 0.25° global grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CdsRequest {
    pub format: &'static str,
    pub product_type: &'static str,
    pub variable: Vec<String>,
    pub year: Vec<String>,
    pub month: Vec<String>,
    pub time: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<[f64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<[f64; 2]>,
}

impl CdsRequest {
    /// Global 0.25° request for a set of variables over an expanded window.
    pub fn monthly_means(
        variables: Vec<String>,
        years: Vec<String>,
        months: Vec<String>,
    ) -> CdsRequest {
        CdsRequest {
            format: "netcdf",
            product_type: "monthly_averaged_reanalysis",
            variable: variables,
            year: years,
            month: months,
            time: "00:00",
            area: None,
            grid: None,
        }
    }

    /// Regional sea surface temperature request for one ENSO index region,
    /// every month of every given year, on the coarse 1° grid.
    pub fn enso_sst(region: EnsoRegion, years: Vec<String>) -> CdsRequest {
        CdsRequest {
            format: "netcdf",
            product_type: "monthly_averaged_reanalysis",
            variable: vec!["sea_surface_temperature".to_string()],
            year: years,
            month: (1..=12).map(|m| format!("{m:02}")).collect(),
            time: "00:00",
            area: Some(region.bounding_box()),
            grid: Some(EnsoRegion::grid_resolution()),
        }
    }
}
