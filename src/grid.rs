//! Snapping arbitrary coordinates onto the fixed 0.25° ERA5 grid.

use crate::error::Era5VisError;

/// A point on the 0.25° ERA5 reanalysis grid.
///
/// The stored longitude uses the archive's internal origin: 0° sits at the
/// -180° antimeridian, so `longitude = 180 + input longitude` and lies in
/// `[0, 360]`. Latitude keeps its usual sign and lies in `[-90, 90]`. Both
/// values are multiples of 0.25 by construction.
///
/// # Examples
///
/// ```
/// use era5vis::GridPoint;
///
/// let point = GridPoint::snap(136.34, 23.78).unwrap();
/// assert_eq!(point.longitude, 316.25);
/// assert_eq!(point.latitude, 23.75);
/// assert_eq!(point.display_longitude(), 136.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    /// Longitude after the +180 origin shift, in `[0, 360]`.
    pub longitude: f64,
    /// Latitude in `[-90, 90]`.
    pub latitude: f64,
}

impl GridPoint {
    /// Snaps a user-facing coordinate pair to the nearest grid point.
    ///
    /// Accepts longitudes in `[-180, 180]` and latitudes in `[-90, 90]`;
    /// anything else is [`Era5VisError::InvalidCoordinates`], carrying the
    /// offending pair.
    ///
    /// Quantization multiplies by 4, rounds, and divides by 4. Rounding uses
    /// [`f64::round`], which rounds halves *away from zero*: an input landing
    /// exactly on a `.125` boundary snaps to the gridline further from zero
    /// (e.g. latitude `23.125` becomes `23.25`, `-23.125` becomes `-23.25`).
    ///
    /// # Errors
    ///
    /// Returns [`Era5VisError::InvalidCoordinates`] when either coordinate is
    /// outside its validity window.
    pub fn snap(longitude: f64, latitude: f64) -> Result<GridPoint, Era5VisError> {
        if latitude.abs() > 90.0 || longitude.abs() > 180.0 {
            return Err(Era5VisError::InvalidCoordinates {
                longitude,
                latitude,
            });
        }

        let shifted = 180.0 + longitude;

        Ok(GridPoint {
            longitude: (shifted * 4.0).round() / 4.0,
            latitude: (latitude * 4.0).round() / 4.0,
        })
    }

    /// The longitude in the user's convention, undoing the internal +180
    /// origin shift. This is what titles and labels should show.
    pub fn display_longitude(&self) -> f64 {
        self.longitude - 180.0
    }
}
