//! Combining two axis series into one overlay plot description.

use crate::climate::error::ClimateDataError;
use crate::dates::DateRange;
use crate::error::Era5VisError;
use crate::grid::GridPoint;
use crate::plot::series::AxisSeries;
use chrono::NaiveDate;
use polars::prelude::*;

/// Curve colors for single-curve slots, left then right.
pub const SLOT_COLORS: [&str; 2] = ["b", "r"];
/// Legend placement, left slot then right slot.
pub const LEGEND_LOCATIONS: [&str; 2] = ["upper left", "upper right"];

/// A complete two-variable overlay, ready for any rendering backend.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPlot {
    pub title: String,
    pub x_range: (NaiveDate, NaiveDate),
    pub legend_locations: [&'static str; 2],
    pub axes: [AxisSeries; 2],
    /// Pearson correlation between the two key curves.
    pub correlation: f64,
}

/// Assembles the overlay: title from the snapped location, shared x-range
/// from the window, and the correlation between the two key curves.
pub fn overlay(
    left_label: &str,
    right_label: &str,
    point: &GridPoint,
    range: &DateRange,
    left: AxisSeries,
    right: AxisSeries,
) -> Result<OverlayPlot, Era5VisError> {
    let correlation = pearson(&left.key().values, &right.key().values)?;
    let title = format!(
        "{} vs {} at Longitude = {}º and Latitude = {}º",
        left_label,
        right_label,
        point.display_longitude(),
        point.latitude,
    );

    Ok(OverlayPlot {
        title,
        x_range: (range.start_date()?, range.end_date()?),
        legend_locations: LEGEND_LOCATIONS,
        axes: [left, right],
        correlation,
    })
}

fn pearson(a: &[f64], b: &[f64]) -> Result<f64, ClimateDataError> {
    if a.len() != b.len() {
        return Err(ClimateDataError::SeriesLengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let df = df!(
        "a" => a.to_vec(),
        "b" => b.to_vec(),
    )?;
    let out = df
        .lazy()
        .select([pearson_corr(col("a"), col("b")).alias("r")])
        .collect()?;
    Ok(out.column("r")?.f64()?.get(0).unwrap_or(f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::dataset::MonthlySeries;
    use crate::dates::Month;
    use crate::plot::series::direct;

    fn axis(label: &str, color: &'static str, values: Vec<f64>) -> AxisSeries {
        let dates = (0..values.len())
            .map(|i| NaiveDate::from_ymd_opt(1999, i as u32 + 1, 1).unwrap())
            .collect();
        direct(label, "[]", color, MonthlySeries { dates, values })
    }

    #[test]
    fn title_uses_the_display_longitude() {
        let point = GridPoint::snap(-33.96, 23.1).unwrap();
        let range = DateRange::new(Month::new(1999, 1), Month::new(1999, 4));
        let plot = overlay(
            "Lake Cover",
            "Surface Pressure",
            &point,
            &range,
            axis("Lake Cover", "b", vec![1.0, 2.0, 3.0, 4.0]),
            axis("Surface Pressure", "r", vec![4.0, 3.0, 2.0, 1.0]),
        )
        .unwrap();

        assert_eq!(
            plot.title,
            "Lake Cover vs Surface Pressure at Longitude = -34º and Latitude = 23º"
        );
        assert_eq!(
            plot.x_range,
            (
                NaiveDate::from_ymd_opt(1999, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(1999, 4, 1).unwrap()
            )
        );
        assert_eq!(plot.legend_locations, ["upper left", "upper right"]);
    }

    #[test]
    fn correlation_is_signed() {
        let point = GridPoint::snap(0.0, 0.0).unwrap();
        let range = DateRange::new(Month::new(1999, 1), Month::new(1999, 4));

        let plot = overlay(
            "A",
            "B",
            &point,
            &range,
            axis("A", "b", vec![1.0, 2.0, 3.0, 4.0]),
            axis("B", "r", vec![2.0, 4.0, 6.0, 8.0]),
        )
        .unwrap();
        assert!((plot.correlation - 1.0).abs() < 1e-12);

        let plot = overlay(
            "A",
            "B",
            &point,
            &range,
            axis("A", "b", vec![1.0, 2.0, 3.0, 4.0]),
            axis("B", "r", vec![8.0, 6.0, 4.0, 2.0]),
        )
        .unwrap();
        assert!((plot.correlation + 1.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_key_lengths_are_rejected() {
        let point = GridPoint::snap(0.0, 0.0).unwrap();
        let range = DateRange::new(Month::new(1999, 1), Month::new(1999, 3));
        let err = overlay(
            "A",
            "B",
            &point,
            &range,
            axis("A", "b", vec![1.0, 2.0, 3.0]),
            axis("B", "r", vec![1.0, 2.0]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Era5VisError::ClimateData(ClimateDataError::SeriesLengthMismatch { left: 3, right: 2 })
        ));
    }
}
