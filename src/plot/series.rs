//! Building renderable axis series from monthly data. Each variable class
//! has its own strategy for units, curve styling and the curve that feeds
//! the correlation.

use crate::climate::dataset::MonthlySeries;
use crate::climate::error::ClimateDataError;
use crate::variables::EnsoRegion;
use chrono::NaiveDate;

pub const KELVIN_OFFSET: f64 = 273.15;
/// Accumulated fluxes arrive as J m**-2 per day; dividing by the day length
/// yields the mean flux in W m**-2.
pub const SECONDS_PER_DAY: f64 = 86400.0;
/// Water density over snow density turns water equivalent into snow depth.
const WATER_DENSITY: f64 = 1000.0;

/// One plotted line.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub label: String,
    pub color: &'static str,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

/// Everything one y-axis renders: its label, its curves, and which curve
/// represents the variable in the correlation.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSeries {
    pub ylabel: String,
    pub curves: Vec<Curve>,
    pub key_curve: usize,
}

impl AxisSeries {
    pub fn key(&self) -> &Curve {
        &self.curves[self.key_curve]
    }

    /// The axis bounds: the data minimum, with 20% of the spread added above
    /// the maximum so curves clear the legend.
    pub fn y_range(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for curve in &self.curves {
            for &v in &curve.values {
                if v.is_finite() {
                    min = min.min(v);
                    max = max.max(v);
                }
            }
        }
        (min, min + (max - min) * 1.2)
    }
}

/// A single archive variable on one axis. Kelvin-tagged values are shown in
/// Celsius.
pub fn direct(
    label: &str,
    unit: &str,
    slot_color: &'static str,
    series: MonthlySeries,
) -> AxisSeries {
    let (values, unit) = if unit == "[K]" {
        (
            series.values.iter().map(|v| v - KELVIN_OFFSET).collect(),
            "[°C]",
        )
    } else {
        (series.values, unit)
    };

    AxisSeries {
        ylabel: format!("{label} {unit}"),
        curves: vec![Curve {
            label: label.to_string(),
            color: slot_color,
            dates: series.dates,
            values,
        }],
        key_curve: 0,
    }
}

/// Snow depth from water equivalent and density.
pub fn snow_depth(
    water_equivalent: &MonthlySeries,
    density: &MonthlySeries,
) -> Result<AxisSeries, ClimateDataError> {
    if water_equivalent.len() != density.len() {
        return Err(ClimateDataError::SeriesLengthMismatch {
            left: water_equivalent.len(),
            right: density.len(),
        });
    }

    let values = water_equivalent
        .values
        .iter()
        .zip(&density.values)
        .map(|(sd, rsn)| WATER_DENSITY * sd / rsn)
        .collect();

    Ok(AxisSeries {
        ylabel: "Snow Depth [m]".to_string(),
        curves: vec![Curve {
            label: "Snow Depth".to_string(),
            color: "deepskyblue",
            dates: water_equivalent.dates.clone(),
            values,
        }],
        key_curve: 0,
    })
}

/// The four surface energy fluxes on one axis, converted from daily
/// accumulations to W m**-2. The latent heat curve carries the correlation.
pub fn energy_budget(
    net_solar: &MonthlySeries,
    net_thermal: &MonthlySeries,
    latent: &MonthlySeries,
    sensible: &MonthlySeries,
) -> Result<AxisSeries, ClimateDataError> {
    let components = [
        ("SW_net", "m", net_solar),
        ("LW_net", "royalblue", net_thermal),
        ("Latent Heat Flux", "g", latent),
        ("Sensible Heat Flux", "orange", sensible),
    ];

    let expected = net_solar.len();
    let mut curves = Vec::with_capacity(components.len());
    for (label, color, series) in components {
        if series.len() != expected {
            return Err(ClimateDataError::SeriesLengthMismatch {
                left: expected,
                right: series.len(),
            });
        }
        curves.push(Curve {
            label: label.to_string(),
            color,
            dates: series.dates.clone(),
            values: series.values.iter().map(|v| v / SECONDS_PER_DAY).collect(),
        });
    }

    Ok(AxisSeries {
        ylabel: "Energy Fluxes (W m^2)".to_string(),
        curves,
        key_curve: 2,
    })
}

/// A regional SST anomaly index on one axis.
pub fn enso_index(
    region: EnsoRegion,
    anomaly: MonthlySeries,
    slot_color: &'static str,
) -> AxisSeries {
    AxisSeries {
        ylabel: "El Nino Index".to_string(),
        curves: vec![Curve {
            label: region.display_name().to_string(),
            color: slot_color,
            dates: anomaly.dates,
            values: anomaly.values,
        }],
        key_curve: 0,
    }
}
