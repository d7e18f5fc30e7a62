//! User-facing variable labels, the archive codes behind them, and the fixed
//! reference tables (short names, display units, ENSO index regions).

use crate::error::Era5VisError;
use std::fmt;

/// Archive codes behind the "Energy Budget" composite label: the four surface
/// flux fields, always downloaded together.
pub const ENERGY_BUDGET_CODES: &[&str] = &[
    "surface_latent_heat_flux",
    "surface_net_solar_radiation",
    "surface_net_thermal_radiation",
    "surface_sensible_heat_flux",
];

/// Archive codes behind the "Snow Depth" composite label. Depth arrives as
/// water equivalent; density is needed to convert it to meters of snow.
pub const SNOW_DEPTH_CODES: &[&str] = &["snow_depth", "snow_density"];

/// Label prefix marking the anomaly-index class of variables.
pub const ENSO_PREFIX: &str = "ENSO";

/// Direct label → archive code mapping for the simple 1:1 variables.
pub fn archive_code(label: &str) -> Option<&'static str> {
    Some(match label {
        "Temperature at 2m" => "2m_temperature",
        "Lake Cover" => "lake_cover",
        "Friction Velocity" => "friction_velocity",
        "Cloud Base Height" => "cloud_base_height",
        "Snow Albedo" => "snow_albedo",
        "Sea Surface Temperature" => "sea_surface_temperature",
        "Zonal Wind at 10 m" => "10m_u_component_of_wind",
        "Meridional Wind at 10 m" => "10m_v_component_of_wind",
        "Surface Pressure" => "surface_pressure",
        "Soil Temperature" => "soil_temperature_level_1",
        "Boundary Layer Height" => "boundary_layer_height",
        "Low Cloud Cover" => "low_cloud_cover",
        "Medium Cloud Cover" => "medium_cloud_cover",
        "High Cloud Cover" => "high_cloud_cover",
        _ => return None,
    })
}

/// Archive code → NetCDF short variable name, for every code that can appear
/// in a downloaded file.
pub fn short_name(code: &str) -> Option<&'static str> {
    Some(match code {
        "2m_temperature" => "t2m",
        "surface_latent_heat_flux" => "slhf",
        "surface_sensible_heat_flux" => "sshf",
        "surface_net_solar_radiation" => "ssr",
        "surface_net_thermal_radiation" => "str",
        "snow_depth" => "sd",
        "snow_density" => "rsn",
        "lake_cover" => "cl",
        "friction_velocity" => "zust",
        "cloud_base_height" => "cbh",
        "snow_albedo" => "asn",
        "sea_surface_temperature" => "sst",
        "surface_pressure" => "sp",
        "soil_temperature_level_1" => "stl1",
        "boundary_layer_height" => "blh",
        "low_cloud_cover" => "lcc",
        "medium_cloud_cover" => "mcc",
        "high_cloud_cover" => "hcc",
        _ => return None,
    })
}

/// Short variable name → display unit string, as it should appear on an axis
/// label. Kelvin-tagged fields get converted to Celsius before plotting.
pub fn display_unit(short: &str) -> Option<&'static str> {
    Some(match short {
        "t2m" => "[K]",
        "slhf" => "[J m**-2]",
        "sshf" => "[J m**-2]",
        "ssr" => "[J m**-2]",
        "str" => "[J m**-2]",
        "sd" => "[m of water equivalent]",
        "rsn" => "[kg m**-3]",
        "cl" => "[]",
        "zust" => "[m/s]",
        "cbh" => "[m]",
        "asn" => "[0-1]",
        "sst" => "[K]",
        "sp" => "[Pa]",
        "stl1" => "[K]",
        "blh" => "[m]",
        "lcc" => "[0-1]",
        "mcc" => "[0-1]",
        "hcc" => "[0-1]",
        _ => return None,
    })
}

/// Every archive code with a short name, in table order. Exposed for the
/// round-trip consistency tests and for callers enumerating the catalogue.
pub const KNOWN_CODES: &[&str] = &[
    "2m_temperature",
    "surface_latent_heat_flux",
    "surface_sensible_heat_flux",
    "surface_net_solar_radiation",
    "surface_net_thermal_radiation",
    "snow_depth",
    "snow_density",
    "lake_cover",
    "friction_velocity",
    "cloud_base_height",
    "snow_albedo",
    "sea_surface_temperature",
    "surface_pressure",
    "soil_temperature_level_1",
    "boundary_layer_height",
    "low_cloud_cover",
    "medium_cloud_cover",
    "high_cloud_cover",
];

/// One of the four fixed El Niño index regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnsoRegion {
    Nino12,
    Nino3,
    Nino34,
    Nino4,
}

impl EnsoRegion {
    /// The short tag used in labels and file names ("en12", "en3", ...).
    pub fn tag(&self) -> &'static str {
        match self {
            EnsoRegion::Nino12 => "en12",
            EnsoRegion::Nino3 => "en3",
            EnsoRegion::Nino34 => "en34",
            EnsoRegion::Nino4 => "en4",
        }
    }

    /// Human-readable name for legends.
    pub fn display_name(&self) -> &'static str {
        match self {
            EnsoRegion::Nino12 => "ENSO Region 1+2",
            EnsoRegion::Nino3 => "ENSO Region 3",
            EnsoRegion::Nino34 => "ENSO Region 3.4",
            EnsoRegion::Nino4 => "ENSO Region 4",
        }
    }

    /// Download bounding box as `[north, west, south, east]`, the order the
    /// archive's `area` parameter expects.
    pub fn bounding_box(&self) -> [f64; 4] {
        match self {
            EnsoRegion::Nino12 => [0.0, -90.0, -10.0, -80.0],
            EnsoRegion::Nino3 => [5.0, -150.0, -5.0, -90.0],
            EnsoRegion::Nino34 => [5.0, -170.0, -5.0, -120.0],
            EnsoRegion::Nino4 => [5.0, 160.0, -5.0, -150.0],
        }
    }

    /// Regional SST requests are fetched on a coarser 1°×1° grid.
    pub fn grid_resolution() -> [f64; 2] {
        [1.0, 1.0]
    }

    pub fn from_tag(tag: &str) -> Option<EnsoRegion> {
        Some(match tag {
            "en12" => EnsoRegion::Nino12,
            "en3" => EnsoRegion::Nino3,
            "en34" => EnsoRegion::Nino34,
            "en4" => EnsoRegion::Nino4,
            _ => return None,
        })
    }
}

impl fmt::Display for EnsoRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// What a single user-facing label resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedVariable {
    /// A single archive code.
    Direct(&'static str),
    /// A fixed bundle of archive codes downloaded together.
    Composite(&'static [&'static str]),
    /// An anomaly-index variable routed through the ENSO pipeline.
    EnsoIndex(EnsoRegion),
}

/// Resolves one label, or `None` when it is not in the catalogue. Callers
/// must handle the `None` case explicitly; there is no silent fallback.
pub fn resolve_label(label: &str) -> Option<ResolvedVariable> {
    if let Some(tag) = label.strip_prefix(ENSO_PREFIX) {
        let region = EnsoRegion::from_tag(tag.trim_start())?;
        return Some(ResolvedVariable::EnsoIndex(region));
    }
    match label {
        "Energy Budget" => Some(ResolvedVariable::Composite(ENERGY_BUDGET_CODES)),
        "Snow Depth" => Some(ResolvedVariable::Composite(SNOW_DEPTH_CODES)),
        _ => archive_code(label).map(ResolvedVariable::Direct),
    }
}

/// The archive codes to download and the ENSO regions to fetch separately,
/// for an ordered list of labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSelection {
    /// Codes in input order; composite bundles expand as contiguous blocks.
    pub archive_codes: Vec<&'static str>,
    /// Region tags in input order.
    pub regions: Vec<EnsoRegion>,
}

/// Resolves an ordered list of labels into a [`DownloadSelection`].
///
/// # Errors
///
/// Returns [`Era5VisError::UnknownVariable`] for the first label that is not
/// in the catalogue.
pub fn variables_to_download(labels: &[&str]) -> Result<DownloadSelection, Era5VisError> {
    let mut selection = DownloadSelection::default();

    for label in labels {
        match resolve_label(label) {
            Some(ResolvedVariable::Direct(code)) => selection.archive_codes.push(code),
            Some(ResolvedVariable::Composite(codes)) => {
                selection.archive_codes.extend_from_slice(codes)
            }
            Some(ResolvedVariable::EnsoIndex(region)) => selection.regions.push(region),
            None => return Err(Era5VisError::UnknownVariable(label.to_string())),
        }
    }

    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_labels_expand_to_contiguous_blocks() {
        let selection = variables_to_download(&["Snow Depth", "Energy Budget"]).unwrap();
        assert_eq!(
            selection.archive_codes,
            [
                "snow_depth",
                "snow_density",
                "surface_latent_heat_flux",
                "surface_net_solar_radiation",
                "surface_net_thermal_radiation",
                "surface_sensible_heat_flux",
            ]
        );
        assert!(selection.regions.is_empty());
    }

    #[test]
    fn direct_labels_resolve_one_to_one() {
        let selection =
            variables_to_download(&["Temperature at 2m", "Friction Velocity"]).unwrap();
        assert_eq!(
            selection.archive_codes,
            ["2m_temperature", "friction_velocity"]
        );
        assert!(selection.regions.is_empty());
    }

    #[test]
    fn enso_labels_resolve_to_region_tags_only() {
        let selection = variables_to_download(&["ENSO en12", "ENSO en3"]).unwrap();
        assert!(selection.archive_codes.is_empty());
        assert_eq!(selection.regions, [EnsoRegion::Nino12, EnsoRegion::Nino3]);
    }

    #[test]
    fn unknown_labels_are_an_error() {
        let err = variables_to_download(&["Dew Point"]).unwrap_err();
        assert!(matches!(err, Era5VisError::UnknownVariable(label) if label == "Dew Point"));

        let err = variables_to_download(&["ENSO en99"]).unwrap_err();
        assert!(matches!(err, Era5VisError::UnknownVariable(_)));
    }

    #[test]
    fn every_known_code_round_trips_to_a_unit() {
        assert_eq!(KNOWN_CODES.len(), 18);
        for code in KNOWN_CODES {
            let short = short_name(code)
                .unwrap_or_else(|| panic!("code {code} has no short name"));
            let unit = display_unit(short)
                .unwrap_or_else(|| panic!("short name {short} has no unit"));
            assert!(unit.starts_with('[') && unit.ends_with(']'), "unit for {short}");
        }
    }

    #[test]
    fn region_metadata_is_fixed() {
        assert_eq!(EnsoRegion::Nino34.tag(), "en34");
        assert_eq!(EnsoRegion::Nino34.display_name(), "ENSO Region 3.4");
        assert_eq!(EnsoRegion::Nino12.bounding_box(), [0.0, -90.0, -10.0, -80.0]);
        assert_eq!(EnsoRegion::Nino4.bounding_box(), [5.0, 160.0, -5.0, -150.0]);
        assert_eq!(EnsoRegion::grid_resolution(), [1.0, 1.0]);
        assert_eq!(EnsoRegion::from_tag("en3"), Some(EnsoRegion::Nino3));
        assert_eq!(EnsoRegion::from_tag("nope"), None);
    }

    #[test]
    fn resolve_label_classifies_each_kind() {
        assert_eq!(
            resolve_label("Surface Pressure"),
            Some(ResolvedVariable::Direct("surface_pressure"))
        );
        assert_eq!(
            resolve_label("Energy Budget"),
            Some(ResolvedVariable::Composite(ENERGY_BUDGET_CODES))
        );
        assert_eq!(
            resolve_label("ENSO en4"),
            Some(ResolvedVariable::EnsoIndex(EnsoRegion::Nino4))
        );
        assert_eq!(resolve_label("Nonsense"), None);
    }
}
