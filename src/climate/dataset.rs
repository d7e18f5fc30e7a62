//! Reading monthly-means NetCDF files: coordinates, CF time decoding, packed
//! value unpacking, point and regional-mean extraction.

use crate::climate::error::ClimateDataError;
use crate::dates::DateRange;
use crate::grid::GridPoint;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::path::{Path, PathBuf};

/// Values above this are treated as fill values, per CF convention.
const FILL_THRESHOLD: f64 = 1.0e30;

/// One variable sampled at monthly instants.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl MonthlySeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The sub-series covered by `range`, inclusive on both ends.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateDataError::NonChronological`] when the range's end
    /// does not lie strictly after its start.
    pub fn window(&self, range: &DateRange) -> Result<MonthlySeries, ClimateDataError> {
        if !range.is_chronological() {
            return Err(ClimateDataError::NonChronological {
                start: range.start,
                end: range.end,
            });
        }
        let (start, end) = match (range.start.first_day(), range.end.first_day()) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(ClimateDataError::NonChronological {
                    start: range.start,
                    end: range.end,
                })
            }
        };

        let mut dates = Vec::new();
        let mut values = Vec::new();
        for (date, value) in self.dates.iter().zip(&self.values) {
            if (start..=end).contains(date) {
                dates.push(*date);
                values.push(*value);
            }
        }
        Ok(MonthlySeries { dates, values })
    }
}

/// A monthly-means file on a regular longitude/latitude grid.
#[derive(Debug)]
pub struct GriddedMonthly {
    file: netcdf::File,
    path: PathBuf,
    pub longitudes: Vec<f64>,
    pub latitudes: Vec<f64>,
    pub dates: Vec<NaiveDate>,
}

impl GriddedMonthly {
    /// Opens a downloaded file and decodes its coordinate axes.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateDataError::FileNotFound`] when the file does not
    /// exist yet, before any NetCDF parsing is attempted.
    pub fn open(path: impl AsRef<Path>) -> Result<GriddedMonthly, ClimateDataError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(ClimateDataError::FileNotFound(path));
        }

        let file = netcdf::open(&path).map_err(|source| ClimateDataError::NetCdf {
            path: path.clone(),
            source,
        })?;

        let longitudes = Self::read_coord(&file, &path, &["longitude", "lon"])?;
        let latitudes = Self::read_coord(&file, &path, &["latitude", "lat"])?;
        let dates = Self::read_time(&file, &path)?;

        Ok(GriddedMonthly {
            file,
            path,
            longitudes,
            latitudes,
            dates,
        })
    }

    /// The series of one variable at the grid cell nearest to `point`.
    pub fn point_series(
        &self,
        short_name: &str,
        point: &GridPoint,
    ) -> Result<MonthlySeries, ClimateDataError> {
        let lon_idx = nearest_index(&self.longitudes, point.longitude)
            .ok_or_else(|| ClimateDataError::MissingCoordinate("longitude".to_string()))?;
        let lat_idx = nearest_index(&self.latitudes, point.latitude)
            .ok_or_else(|| ClimateDataError::MissingCoordinate("latitude".to_string()))?;

        let var = self
            .file
            .variable(short_name)
            .ok_or_else(|| ClimateDataError::MissingVariable(short_name.to_string()))?;
        let (scale, offset) = packing(&var);

        let raw: Vec<f64> = var
            .get_values((.., lat_idx, lon_idx))
            .map_err(|source| ClimateDataError::NetCdf {
                path: self.path.clone(),
                source,
            })?;
        if raw.len() != self.dates.len() {
            return Err(ClimateDataError::ShapeMismatch {
                variable: short_name.to_string(),
                expected: self.dates.len(),
                found: raw.len(),
            });
        }

        let values = raw.into_iter().map(|v| unpack(v, scale, offset)).collect();
        Ok(MonthlySeries {
            dates: self.dates.clone(),
            values,
        })
    }

    /// The per-timestep spatial mean of one variable over the whole file,
    /// skipping fill values. This is how a regional box becomes an index
    /// series.
    pub fn spatial_mean_series(&self, short_name: &str) -> Result<MonthlySeries, ClimateDataError> {
        let var = self
            .file
            .variable(short_name)
            .ok_or_else(|| ClimateDataError::MissingVariable(short_name.to_string()))?;
        let (scale, offset) = packing(&var);

        let raw: Vec<f64> = var
            .get_values(..)
            .map_err(|source| ClimateDataError::NetCdf {
                path: self.path.clone(),
                source,
            })?;

        let cell_count = self.latitudes.len() * self.longitudes.len();
        if cell_count == 0 || raw.len() != self.dates.len() * cell_count {
            return Err(ClimateDataError::ShapeMismatch {
                variable: short_name.to_string(),
                expected: self.dates.len() * cell_count,
                found: raw.len(),
            });
        }

        let values = raw
            .chunks_exact(cell_count)
            .map(|cells| {
                let mut sum = 0.0;
                let mut n = 0usize;
                for &cell in cells {
                    let value = unpack(cell, scale, offset);
                    if value.is_finite() {
                        sum += value;
                        n += 1;
                    }
                }
                if n == 0 {
                    f64::NAN
                } else {
                    sum / n as f64
                }
            })
            .collect();

        Ok(MonthlySeries {
            dates: self.dates.clone(),
            values,
        })
    }

    fn read_coord(
        file: &netcdf::File,
        path: &Path,
        names: &[&str],
    ) -> Result<Vec<f64>, ClimateDataError> {
        for name in names {
            if let Some(var) = file.variable(name) {
                return var
                    .get_values(..)
                    .map_err(|source| ClimateDataError::NetCdf {
                        path: path.to_path_buf(),
                        source,
                    });
            }
        }
        Err(ClimateDataError::MissingCoordinate(names.join(" or ")))
    }

    fn read_time(file: &netcdf::File, path: &Path) -> Result<Vec<NaiveDate>, ClimateDataError> {
        let var = file
            .variable("time")
            .ok_or_else(|| ClimateDataError::MissingCoordinate("time".to_string()))?;

        let units = attr_str(&var, "units")
            .ok_or_else(|| ClimateDataError::CfTimeUnits("<missing units>".to_string()))?;
        let (seconds_per_unit, epoch) = parse_time_units(&units)?;

        let raw: Vec<f64> = var
            .get_values(..)
            .map_err(|source| ClimateDataError::NetCdf {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(raw
            .into_iter()
            .map(|v| (epoch + TimeDelta::seconds((v * seconds_per_unit) as i64)).date())
            .collect())
    }
}

/// Parses a CF time unit string like `hours since 1900-01-01 00:00:00.0`
/// into seconds-per-unit and the epoch instant.
fn parse_time_units(units: &str) -> Result<(f64, NaiveDateTime), ClimateDataError> {
    let bad = || ClimateDataError::CfTimeUnits(units.to_string());

    let (unit, epoch_text) = units.split_once(" since ").ok_or_else(bad)?;
    let seconds_per_unit = match unit.trim() {
        "seconds" | "second" => 1.0,
        "hours" | "hour" => 3600.0,
        "days" | "day" => 86400.0,
        _ => return Err(bad()),
    };

    let epoch_text = epoch_text.trim();
    let epoch = NaiveDateTime::parse_from_str(epoch_text, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(epoch_text, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| {
            NaiveDate::parse_from_str(epoch_text, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        })
        .map_err(|_| bad())?;

    Ok((seconds_per_unit, epoch))
}

fn nearest_index(coords: &[f64], value: f64) -> Option<usize> {
    coords
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - value)
                .abs()
                .total_cmp(&(*b - value).abs())
        })
        .map(|(i, _)| i)
}

fn unpack(raw: f64, scale: f64, offset: f64) -> f64 {
    if raw.abs() > FILL_THRESHOLD || !raw.is_finite() {
        f64::NAN
    } else {
        raw * scale + offset
    }
}

/// `scale_factor`/`add_offset` packing attributes, defaulting to identity.
fn packing(var: &netcdf::Variable) -> (f64, f64) {
    (
        attr_f64(var, "scale_factor").unwrap_or(1.0),
        attr_f64(var, "add_offset").unwrap_or(0.0),
    )
}

fn attr_f64(var: &netcdf::Variable, name: &str) -> Option<f64> {
    var.attribute_value(name)
        .and_then(|r| r.ok())
        .and_then(|v| match v {
            netcdf::AttributeValue::Double(d) => Some(d),
            netcdf::AttributeValue::Float(f) => Some(f as f64),
            _ => None,
        })
}

fn attr_str(var: &netcdf::Variable, name: &str) -> Option<String> {
    var.attribute_value(name)
        .and_then(|r| r.ok())
        .and_then(|v| match v {
            netcdf::AttributeValue::Str(s) => Some(s),
            _ => None,
        })
}
