mod climate;
mod dates;
mod download;
mod era5vis;
mod error;
mod grid;
mod plot;
mod selection;
mod utils;
mod variables;

pub use error::Era5VisError;
pub use era5vis::*;

pub use dates::{DateRange, Month};
pub use grid::GridPoint;
pub use selection::{CompleteSelection, Selection, SelectionEvent, Slot};
pub use variables::{
    archive_code, display_unit, resolve_label, short_name, variables_to_download,
    DownloadSelection, EnsoRegion, ResolvedVariable, ENERGY_BUDGET_CODES, SNOW_DEPTH_CODES,
};

pub use climate::{anomaly, monthly_climatology, GriddedMonthly, MonthlySeries};
pub use download::{
    enso_file_name, enso_year_range, CdsClient, CdsConfig, CdsRequest, DATASET,
    VARIABLES_FILE_NAME,
};
pub use plot::{overlay, AxisSeries, Curve, OverlayPlot, LEGEND_LOCATIONS, SLOT_COLORS};

pub use climate::error::ClimateDataError;
pub use download::error::DownloadError;
