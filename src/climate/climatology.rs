//! Monthly climatology and anomalies against it.

use crate::climate::dataset::MonthlySeries;
use crate::climate::error::ClimateDataError;
use crate::dates::DateRange;
use chrono::Datelike;
use polars::prelude::*;

/// The mean of `series` for each calendar month, January first.
///
/// Every calendar month must appear in the series at least once; a reference
/// window that misses a month cannot anchor an anomaly.
pub fn monthly_climatology(series: &MonthlySeries) -> Result<[f64; 12], ClimateDataError> {
    let months: Vec<i64> = series.dates.iter().map(|d| d.month() as i64).collect();
    let df = df!(
        "month" => months,
        "value" => series.values.clone(),
    )?;

    let aggregated = df
        .lazy()
        .group_by([col("month")])
        .agg([col("value").mean().alias("mean")])
        .sort(["month"], Default::default())
        .collect()?;

    let month_col = aggregated.column("month")?.i64()?;
    let mean_col = aggregated.column("mean")?.f64()?;

    let mut climatology = [f64::NAN; 12];
    let mut seen = [false; 12];
    for (month, mean) in month_col.into_iter().zip(mean_col) {
        if let (Some(month), Some(mean)) = (month, mean) {
            if (1..=12).contains(&month) {
                climatology[(month - 1) as usize] = mean;
                seen[(month - 1) as usize] = true;
            }
        }
    }

    if let Some(missing) = seen.iter().position(|s| !s) {
        return Err(ClimateDataError::MissingMonth(missing as u32 + 1));
    }
    Ok(climatology)
}

/// `series` restricted to `range`, with the climatology's value for each
/// calendar month subtracted.
///
/// The baseline tiles the climatology across the window: the start year's
/// remaining months, the full cycle once per intervening year, and the end
/// year's leading months. A window inside a single year takes the direct
/// slice instead.
///
/// # Errors
///
/// [`ClimateDataError::WindowTooLong`] for windows spanning more than 20
/// years, and [`ClimateDataError::BaselineLengthMismatch`] when the windowed
/// series has gaps and no longer lines up with the tiled baseline month for
/// month.
pub fn anomaly(
    series: &MonthlySeries,
    range: &DateRange,
    climatology: &[f64; 12],
) -> Result<MonthlySeries, ClimateDataError> {
    let years = range.end.year - range.start.year;
    if years > 20 {
        return Err(ClimateDataError::WindowTooLong { years });
    }

    let windowed = series.window(range)?;
    let baseline = tiled_baseline(range, climatology);

    if windowed.len() != baseline.len() {
        return Err(ClimateDataError::BaselineLengthMismatch {
            series: windowed.len(),
            baseline: baseline.len(),
        });
    }

    let values = windowed
        .values
        .iter()
        .zip(&baseline)
        .map(|(v, b)| v - b)
        .collect();
    Ok(MonthlySeries {
        dates: windowed.dates,
        values,
    })
}

fn tiled_baseline(range: &DateRange, climatology: &[f64; 12]) -> Vec<f64> {
    let start = range.start;
    let end = range.end;

    if start.year == end.year {
        return climatology[(start.month - 1) as usize..end.month as usize].to_vec();
    }

    let mut baseline = climatology[(start.month - 1) as usize..].to_vec();
    for _ in 0..(end.year - start.year - 1) {
        baseline.extend_from_slice(climatology);
    }
    baseline.extend_from_slice(&climatology[..end.month as usize]);
    baseline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::Month;
    use chrono::NaiveDate;

    /// Monthly series from 1990-01 over `n` months; the value of a sample in
    /// calendar month m of year 1990+k is `10 m + k`.
    fn synthetic_series(n: usize) -> MonthlySeries {
        let dates: Vec<NaiveDate> = (0..n)
            .map(|i| {
                NaiveDate::from_ymd_opt(1990 + (i / 12) as i32, (i % 12) as u32 + 1, 1).unwrap()
            })
            .collect();
        let values = dates
            .iter()
            .map(|d| 10.0 * d.month() as f64 + (d.year() - 1990) as f64)
            .collect();
        MonthlySeries { dates, values }
    }

    #[test]
    fn climatology_is_the_per_month_mean() {
        // Three full years: years contribute 0, 1, 2, so each month's mean
        // is 10 m + 1.
        let clim = monthly_climatology(&synthetic_series(36)).unwrap();
        for (i, value) in clim.iter().enumerate() {
            let expected = 10.0 * (i + 1) as f64 + 1.0;
            assert!((value - expected).abs() < 1e-12, "month {}", i + 1);
        }
    }

    #[test]
    fn climatology_needs_every_calendar_month() {
        let err = monthly_climatology(&synthetic_series(6)).unwrap_err();
        assert!(matches!(err, ClimateDataError::MissingMonth(7)));
    }

    #[test]
    fn baseline_tiling_has_the_expected_lengths() {
        let clim = [0.0; 12];
        let cases = [
            ((1999, 2, 2000, 4), 15),
            ((1998, 12, 2000, 2), 15),
            ((1999, 2, 2000, 12), 23),
            ((2000, 3, 2000, 4), 2),
            ((2000, 1, 2000, 2), 2),
            ((1999, 2, 2002, 4), 39),
        ];
        for ((sy, sm, ey, em), expected) in cases {
            let range = DateRange::new(Month::new(sy, sm), Month::new(ey, em));
            assert_eq!(tiled_baseline(&range, &clim).len(), expected);
        }
    }

    #[test]
    fn baseline_cycles_the_climatology_across_intervening_years() {
        let clim: [f64; 12] = std::array::from_fn(|i| (i + 1) as f64);
        let range = DateRange::new(Month::new(1990, 11), Month::new(1993, 2));
        let baseline = tiled_baseline(&range, &clim);

        let mut expected = vec![11.0, 12.0];
        expected.extend((1..=12).map(f64::from));
        expected.extend((1..=12).map(f64::from));
        expected.extend([1.0, 2.0]);
        assert_eq!(baseline, expected);
    }

    #[test]
    fn anomalies_remove_the_annual_cycle() {
        // Full three years as the reference, anomaly over a wrapped window.
        let series = synthetic_series(36);
        let clim = monthly_climatology(&series).unwrap();
        let range = DateRange::new(Month::new(1990, 11), Month::new(1992, 2));
        let result = anomaly(&series, &range, &clim).unwrap();

        assert_eq!(result.len(), 16);
        assert_eq!(
            result.dates.first().copied(),
            NaiveDate::from_ymd_opt(1990, 11, 1)
        );
        // Year k contributes k against a mean contribution of 1.
        for (date, value) in result.dates.iter().zip(&result.values) {
            let expected = (date.year() - 1990) as f64 - 1.0;
            assert!((value - expected).abs() < 1e-12, "{date}");
        }
    }

    #[test]
    fn widest_window_fits_a_full_archive_fetch() {
        // A file fetched for final year 2019 starts at 1999, so the widest
        // accepted window (20 calendar years back) must line up exactly.
        let dates: Vec<NaiveDate> = (0..252)
            .map(|i| {
                NaiveDate::from_ymd_opt(1999 + (i / 12) as i32, (i % 12) as u32 + 1, 1).unwrap()
            })
            .collect();
        let series = MonthlySeries {
            values: vec![0.0; dates.len()],
            dates,
        };
        let clim = [0.0; 12];

        let range = DateRange::new(Month::new(1999, 1), Month::new(2019, 12));
        let result = anomaly(&series, &range, &clim).unwrap();
        assert_eq!(result.len(), 252);
    }

    #[test]
    fn windows_over_twenty_years_are_rejected() {
        let series = synthetic_series(12);
        let clim = [0.0; 12];
        let range = DateRange::new(Month::new(1990, 1), Month::new(2011, 1));
        let err = anomaly(&series, &range, &clim).unwrap_err();
        assert!(matches!(err, ClimateDataError::WindowTooLong { years: 21 }));
    }

    #[test]
    fn gappy_windows_are_a_hard_error() {
        // Series ends 1991-06 but the window runs to 1991-12.
        let series = synthetic_series(18);
        let clim = [0.0; 12];
        let range = DateRange::new(Month::new(1991, 1), Month::new(1991, 12));
        let err = anomaly(&series, &range, &clim).unwrap_err();
        assert!(matches!(
            err,
            ClimateDataError::BaselineLengthMismatch {
                series: 6,
                baseline: 12,
            }
        ));
    }
}
