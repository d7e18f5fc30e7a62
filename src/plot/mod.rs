//! Renderable plot descriptions. Rendering itself is left to the caller;
//! these types carry everything a backend needs.

pub mod overlay;
pub mod series;

pub use overlay::{overlay, OverlayPlot, LEGEND_LOCATIONS, SLOT_COLORS};
pub use series::{AxisSeries, Curve};
