//! Builds the elevation chart for a route. The route polyline is resampled at
//! evenly spaced points, elevations are looked up for each of them, and the
//! usual climbing statistics are derived from the result.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::config::RouterConfig;
use crate::common::geodesy::{LatLon, distance_meters};
use crate::elevation::client::ElevationSource;
use crate::routing::route::Route;

/// One sample along the route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationPoint {
    pub distance: f64,
    pub elevation: f64,
    pub lat: f64,
    pub lon: f64,
}

/// Summary of an elevation series, all values in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationStats {
    pub gain: f64,
    pub loss: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationProfile {
    pub points: Vec<ElevationPoint>,
    pub stats: ElevationStats,
}

/// Walk the elevation series, totalling up every climb and every descent.
/// An empty series gives min = +inf and max = -inf, which callers should not
/// present as a real range.
pub fn calculate_elevation_stats(elevations: &[f64]) -> ElevationStats {
    let mut gain = 0.0;
    let mut loss = 0.0;

    for pair in elevations.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            gain += delta;
        } else {
            loss += delta.abs();
        }
    }

    let min = elevations.iter().copied().fold(f64::INFINITY, f64::min);
    let max = elevations.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    ElevationStats {
        gain,
        loss,
        min,
        max,
    }
}

/// Cumulative distance along the path at each of its points
fn cumulative_distances(path: &[LatLon]) -> Vec<f64> {
    let mut dists = Vec::with_capacity(path.len());
    let mut total = 0.0;
    dists.push(total);
    for pair in path.windows(2) {
        total += distance_meters(pair[0], pair[1]);
        dists.push(total);
    }
    dists
}

/// Resample a path at num_points locations spaced equally along its length.
/// The first and last points are always exactly the first and last points of
/// the original path. Paths with no length collapse to a single point.
pub fn subdivide_path_equally(path: &[LatLon], num_points: usize) -> Vec<LatLon> {
    let (Some(first), Some(last)) = (path.first(), path.last()) else {
        return Vec::new();
    };

    let dists = cumulative_distances(path);
    let total = dists[dists.len() - 1];

    if path.len() < 2 || num_points < 2 || total <= 0.0 {
        return vec![*first];
    }

    let step = total / (num_points - 1) as f64;
    let mut output = Vec::with_capacity(num_points);
    output.push(*first);

    // Index of the original point at the start of the current stretch
    let mut inx = 0;
    for sample in 1..num_points - 1 {
        let target = sample as f64 * step;
        while inx < path.len() - 2 && dists[inx + 1] < target {
            inx += 1;
        }

        let (start, end) = (path[inx], path[inx + 1]);
        let stretch = dists[inx + 1] - dists[inx];
        let frac = if stretch > 0.0 {
            ((target - dists[inx]) / stretch).clamp(0.0, 1.0)
        } else {
            0.0
        };

        output.push(LatLon::new(
            start.lat + (end.lat - start.lat) * frac,
            start.lon + (end.lon - start.lon) * frac,
        ));
    }

    output.push(*last);
    output
}

/// Look up elevations for every point, batch_size points at a time. A batch
/// which fails is filled with zeros so the rest of the profile survives.
pub async fn fetch_elevations<S>(
    source: &S,
    points: &[LatLon],
    batch_size: usize,
) -> Vec<f64>
where
    S: ElevationSource + Sync,
{
    let mut elevations = Vec::with_capacity(points.len());

    for (batch_inx, batch) in points.chunks(batch_size.max(1)).enumerate() {
        match source.fetch_elevations(batch).await {
            Ok(values) if values.len() == batch.len() => elevations.extend(values),
            Ok(values) => {
                warn!(
                    batch = batch_inx,
                    expected = batch.len(),
                    received = values.len(),
                    "elevation batch returned the wrong number of values"
                );
                elevations.extend(std::iter::repeat_n(0.0, batch.len()));
            }
            Err(err) => {
                warn!(batch = batch_inx, error = %err, "elevation batch failed");
                elevations.extend(std::iter::repeat_n(0.0, batch.len()));
            }
        }
    }

    elevations
}

/// Generate the elevation profile for a route. Returns None if the route
/// doesn't have at least two distinct points to chart.
pub async fn build_elevation_profile<S>(
    route: &Route,
    source: &S,
    config: &RouterConfig,
) -> Option<ElevationProfile>
where
    S: ElevationSource + Sync,
{
    let path = route.coordinates();
    if path.len() < 2 {
        return None;
    }

    let total = cumulative_distances(&path)[path.len() - 1];
    let samples = subdivide_path_equally(&path, config.elevation_samples);
    debug!(samples = samples.len(), total, "building elevation profile");

    let elevations =
        fetch_elevations(source, &samples, config.elevation_batch_size).await;

    // Spacing is taken from the total length rather than the interpolated
    // positions, so the chart axis is exactly uniform
    let spacing = match samples.len() {
        0 | 1 => 0.0,
        count => total / (count - 1) as f64,
    };

    let points: Vec<ElevationPoint> = samples
        .iter()
        .zip(elevations.iter())
        .enumerate()
        .map(|(inx, (coord, elevation))| ElevationPoint {
            distance: inx as f64 * spacing,
            elevation: *elevation,
            lat: coord.lat,
            lon: coord.lon,
        })
        .collect();

    Some(ElevationProfile {
        points,
        stats: calculate_elevation_stats(&elevations),
    })
}
