//! The main entry point: a client that downloads monthly reanalysis data
//! into a data directory and builds overlay plot descriptions from it.

use crate::climate::climatology::{anomaly, monthly_climatology};
use crate::climate::dataset::GriddedMonthly;
use crate::dates::DateRange;
use crate::download::{
    enso_file_name, enso_year_range, CdsClient, CdsConfig, CdsRequest, DATASET,
    VARIABLES_FILE_NAME,
};
use crate::error::Era5VisError;
use crate::grid::GridPoint;
use crate::plot::overlay::{overlay, OverlayPlot, SLOT_COLORS};
use crate::plot::series::{self, AxisSeries};
use crate::selection::CompleteSelection;
use crate::utils::{ensure_data_dir_exists, get_data_dir};
use crate::variables::{
    display_unit, resolve_label, short_name, variables_to_download, ResolvedVariable,
    SNOW_DEPTH_CODES,
};
use bon::bon;
use log::info;
use std::path::{Path, PathBuf};

/// Client for downloading reanalysis variables and plotting them.
///
/// Downloads land in a data directory ([`Era5Vis::new`] resolves the default
/// one) and plotting reads from that directory, so a client built from
/// already-downloaded files works without archive credentials. Credentials
/// are only read when a download actually happens.
///
/// # Examples
///
/// ```no_run
/// # use era5vis::{DateRange, Era5Vis, Era5VisError, Month};
/// # async fn run() -> Result<(), Era5VisError> {
/// let client = Era5Vis::new().await?;
/// let range = DateRange::new(Month::new(1999, 2), Month::new(2000, 4));
///
/// client
///     .download_variables()
///     .labels(vec!["Temperature at 2m".to_string(), "Snow Depth".to_string()])
///     .range(range)
///     .call()
///     .await?;
///
/// let plot = client
///     .overlay_plot()
///     .longitude(11.3)
///     .latitude(47.3)
///     .range(range)
///     .left_label("Temperature at 2m")
///     .right_label("Snow Depth")
///     .call()
///     .await?;
/// println!("{} (r = {:.2})", plot.title, plot.correlation);
/// # Ok(())
/// # }
/// ```
pub struct Era5Vis {
    data_dir: PathBuf,
}

#[bon]
impl Era5Vis {
    /// Creates a client with a specific data directory, creating it if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`Era5VisError::DataDirCreation`] when the directory cannot
    /// be created or a file occupies its path.
    pub async fn with_data_folder(data_folder: PathBuf) -> Result<Self, Era5VisError> {
        ensure_data_dir_exists(&data_folder)
            .await
            .map_err(|e| Era5VisError::DataDirCreation(data_folder.clone(), e))?;
        Ok(Self {
            data_dir: data_folder,
        })
    }

    /// Creates a client with the default data directory (the `ERA5VIS_DATA_DIR`
    /// environment variable, a `~/.era5vis` pointer file, or the platform
    /// data directory).
    ///
    /// # Errors
    ///
    /// Returns [`Era5VisError::DataDirResolution`] when no data directory can
    /// be determined, or [`Era5VisError::DataDirCreation`] when it cannot be
    /// created.
    pub async fn new() -> Result<Self, Era5VisError> {
        let data_folder = get_data_dir().map_err(Era5VisError::DataDirResolution)?;
        Self::with_data_folder(data_folder).await
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Downloads everything a list of variable labels needs for `range`.
    ///
    /// Archive variables (direct labels and composite bundles) go into one
    /// `era5_data.nc` in the data directory; each index label gets its own
    /// regional SST file covering the index window ending in
    /// `enso_final_year` (default: the range's end year). Existing files are
    /// reused unless `.overwrite(true)` is set. Returns the paths the plot
    /// step will read, written or reused.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.labels(Vec<String>)`: **Required.** The variable labels to fetch.
    /// * `.range(DateRange)`: **Required.** The month window to cover.
    /// * `.enso_final_year(i32)`: Optional. Final year of the index window.
    /// * `.overwrite(bool)`: Optional. Re-download existing files. Defaults to `false`.
    ///
    /// # Errors
    ///
    /// Returns [`Era5VisError::UnknownVariable`] for a label outside the
    /// catalogue, and [`Era5VisError::Download`] variants for credential,
    /// network and archive-task failures.
    #[builder]
    pub async fn download_variables(
        &self,
        labels: Vec<String>,
        range: DateRange,
        enso_final_year: Option<i32>,
        overwrite: Option<bool>,
    ) -> Result<Vec<PathBuf>, Era5VisError> {
        let overwrite = overwrite.unwrap_or(false);
        let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        let selection = variables_to_download(&label_refs)?;

        if selection.archive_codes.is_empty() && selection.regions.is_empty() {
            return Ok(Vec::new());
        }

        let client = CdsClient::new(CdsConfig::from_env().map_err(Era5VisError::from)?);
        let mut targets = Vec::new();

        if !selection.archive_codes.is_empty() {
            let target = self.data_dir.join(VARIABLES_FILE_NAME);
            if !overwrite && target.is_file() {
                info!("Reusing existing download at {:?}", target);
            } else {
                let (years, months) = range.expand();
                let codes = selection
                    .archive_codes
                    .iter()
                    .map(|c| c.to_string())
                    .collect();
                let request = CdsRequest::monthly_means(codes, years, months);
                client
                    .retrieve(DATASET, &request, &target)
                    .await
                    .map_err(Era5VisError::from)?;
            }
            targets.push(target);
        }

        for region in selection.regions {
            let final_year = enso_final_year.unwrap_or(range.end.year);
            let years = enso_year_range(final_year).map_err(Era5VisError::from)?;
            let target = self.data_dir.join(enso_file_name(final_year, region));
            if !overwrite && target.is_file() {
                info!("Reusing existing download at {:?}", target);
                targets.push(target);
                continue;
            }
            let request = CdsRequest::enso_sst(region, years);
            client
                .retrieve(DATASET, &request, &target)
                .await
                .map_err(Era5VisError::from)?;
            targets.push(target);
        }

        Ok(targets)
    }

    /// Builds an overlay plot of two variables at a location over a month
    /// window, from files already present in the data directory.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.longitude(f64)` / `.latitude(f64)`: **Required.** The location of
    ///   interest; it is snapped to the 0.25° grid.
    /// * `.range(DateRange)`: **Required.** The month window to plot.
    /// * `.left_label(&str)` / `.right_label(&str)`: **Required.** The two
    ///   variable labels.
    /// * `.enso_final_year(i32)`: Optional. Selects which index file an index
    ///   label reads. Defaults to the range's end year.
    ///
    /// # Errors
    ///
    /// Returns [`Era5VisError::InvalidCoordinates`] for an out-of-range
    /// location, [`Era5VisError::UnknownVariable`] for an unknown label, and
    /// [`Era5VisError::ClimateData`] variants when a needed file is missing
    /// or does not cover the window.
    #[builder]
    pub async fn overlay_plot(
        &self,
        longitude: f64,
        latitude: f64,
        range: DateRange,
        left_label: &str,
        right_label: &str,
        enso_final_year: Option<i32>,
    ) -> Result<OverlayPlot, Era5VisError> {
        let point = GridPoint::snap(longitude, latitude)?;
        let left = self.axis_for(left_label, 0, &point, &range, enso_final_year)?;
        let right = self.axis_for(right_label, 1, &point, &range, enso_final_year)?;
        overlay(left_label, right_label, &point, &range, left, right)
    }

    /// Builds the overlay a completed selection describes.
    pub async fn overlay_from_selection(
        &self,
        selection: &CompleteSelection,
    ) -> Result<OverlayPlot, Era5VisError> {
        self.overlay_plot()
            .longitude(selection.longitude)
            .latitude(selection.latitude)
            .range(selection.window)
            .left_label(&selection.left_label)
            .right_label(&selection.right_label)
            .call()
            .await
    }

    fn axis_for(
        &self,
        label: &str,
        slot: usize,
        point: &GridPoint,
        range: &DateRange,
        enso_final_year: Option<i32>,
    ) -> Result<AxisSeries, Era5VisError> {
        let resolved = resolve_label(label)
            .ok_or_else(|| Era5VisError::UnknownVariable(label.to_string()))?;

        match resolved {
            ResolvedVariable::Direct(code) => {
                let dataset = self.open_variables_file()?;
                let short = short_name(code)
                    .ok_or_else(|| Era5VisError::UnknownVariable(label.to_string()))?;
                let series = dataset.point_series(short, point)?.window(range)?;
                let unit = display_unit(short).unwrap_or("[]");
                Ok(series::direct(label, unit, SLOT_COLORS[slot], series))
            }
            ResolvedVariable::Composite(codes) if codes == SNOW_DEPTH_CODES => {
                let dataset = self.open_variables_file()?;
                let water_equivalent = dataset.point_series("sd", point)?.window(range)?;
                let density = dataset.point_series("rsn", point)?.window(range)?;
                series::snow_depth(&water_equivalent, &density).map_err(Era5VisError::from)
            }
            ResolvedVariable::Composite(_) => {
                let dataset = self.open_variables_file()?;
                let net_solar = dataset.point_series("ssr", point)?.window(range)?;
                let net_thermal = dataset.point_series("str", point)?.window(range)?;
                let latent = dataset.point_series("slhf", point)?.window(range)?;
                let sensible = dataset.point_series("sshf", point)?.window(range)?;
                series::energy_budget(&net_solar, &net_thermal, &latent, &sensible)
                    .map_err(Era5VisError::from)
            }
            ResolvedVariable::EnsoIndex(region) => {
                let final_year = enso_final_year.unwrap_or(range.end.year);
                let path = self.data_dir.join(enso_file_name(final_year, region));
                let dataset = GriddedMonthly::open(path)?;
                let sst = dataset.spatial_mean_series("sst")?;
                let climatology = monthly_climatology(&sst)?;
                let index = anomaly(&sst, range, &climatology)?;
                Ok(series::enso_index(region, index, SLOT_COLORS[slot]))
            }
        }
    }

    fn open_variables_file(&self) -> Result<GriddedMonthly, Era5VisError> {
        GriddedMonthly::open(self.data_dir.join(VARIABLES_FILE_NAME)).map_err(Era5VisError::from)
    }
}
