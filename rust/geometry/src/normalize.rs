// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinate normalization
//!
//! Turns the raw (possibly quantized) vertex pool into real-world coordinates
//! and re-centers the whole pool on its minimum bounding corner. Georeferenced
//! city models sit millions of metres from the origin; subtracting the corner
//! in f64 keeps the later f32 render buffers precise. The subtracted offset is
//! returned so the original coordinates can be rebuilt.

use cityjson_lite_core::Transform;
use nalgebra::Point3;
use serde::Serialize;

use crate::{Error, Result};

/// Offset subtracted from every vertex during re-centering
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CoordinateShift {
    /// X offset (subtracted from all X coordinates)
    pub x: f64,
    /// Y offset (subtracted from all Y coordinates)
    pub y: f64,
    /// Z offset (subtracted from all Z coordinates)
    pub z: f64,
}

impl CoordinateShift {
    /// Create a new coordinate shift
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Create shift from a Point3
    #[inline]
    pub fn from_point(point: Point3<f64>) -> Self {
        Self {
            x: point.x,
            y: point.y,
            z: point.z,
        }
    }

    /// Check if shift is significant (>10km from origin)
    #[inline]
    pub fn is_significant(&self) -> bool {
        const THRESHOLD: f64 = 10000.0; // 10km
        self.x.abs() > THRESHOLD || self.y.abs() > THRESHOLD || self.z.abs() > THRESHOLD
    }

    /// Check if shift is zero (no shifting needed)
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Subtract the shift from a point
    #[inline]
    pub fn apply(&self, point: Point3<f64>) -> Point3<f64> {
        Point3::new(point.x - self.x, point.y - self.y, point.z - self.z)
    }

    /// Add the shift back, recovering the pre-centering coordinate
    #[inline]
    pub fn restore(&self, point: Point3<f64>) -> Point3<f64> {
        Point3::new(point.x + self.x, point.y + self.y, point.z + self.z)
    }

    /// Restore a whole buffer of re-centered points
    pub fn restore_all(&self, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        points.iter().map(|p| self.restore(*p)).collect()
    }
}

/// Axis-aligned bounds in f64 precision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelBounds {
    /// Minimum X coordinate found
    pub min_x: f64,
    /// Minimum Y coordinate found
    pub min_y: f64,
    /// Minimum Z coordinate found
    pub min_z: f64,
    /// Maximum X coordinate found
    pub max_x: f64,
    /// Maximum Y coordinate found
    pub max_y: f64,
    /// Maximum Z coordinate found
    pub max_z: f64,
    /// Number of points sampled
    pub sample_count: usize,
}

impl ModelBounds {
    /// Create new bounds initialized to invalid state
    pub fn new() -> Self {
        Self {
            min_x: f64::MAX,
            min_y: f64::MAX,
            min_z: f64::MAX,
            max_x: f64::MIN,
            max_y: f64::MIN,
            max_z: f64::MIN,
            sample_count: 0,
        }
    }

    /// Bounds of a set of points
    pub fn from_points(points: &[Point3<f64>]) -> Self {
        let mut bounds = Self::new();
        for p in points {
            bounds.expand(p.x, p.y, p.z);
        }
        bounds
    }

    /// Check if bounds are valid (at least one point added)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.sample_count > 0
    }

    /// Expand bounds to include a point
    #[inline]
    pub fn expand(&mut self, x: f64, y: f64, z: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.min_z = self.min_z.min(z);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.max_z = self.max_z.max(z);
        self.sample_count += 1;
    }

    /// Minimum corner, or the origin for empty bounds
    #[inline]
    pub fn min_corner(&self) -> Point3<f64> {
        if !self.is_valid() {
            return Point3::origin();
        }
        Point3::new(self.min_x, self.min_y, self.min_z)
    }

    /// Get centroid (center of bounding box)
    #[inline]
    pub fn centroid(&self) -> (f64, f64, f64) {
        if !self.is_valid() {
            return (0.0, 0.0, 0.0);
        }
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
            (self.min_z + self.max_z) / 2.0,
        )
    }
}

impl Default for ModelBounds {
    fn default() -> Self {
        Self::new()
    }
}

/// The shared, read-only vertex pool every face indexes into
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexPool {
    points: Vec<Point3<f64>>,
}

impl VertexPool {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    /// Vertex at a pool index
    #[inline]
    pub fn get(&self, index: u32) -> Option<&Point3<f64>> {
        self.points.get(index as usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Point3<f64>] {
        &self.points
    }
}

/// Result of [`normalize_vertices`]
#[derive(Debug, Clone)]
pub struct NormalizedVertices {
    /// Origin-relative pool, same length and order as the input
    pub pool: VertexPool,
    /// Offset that was subtracted (the pre-centering minimum corner)
    pub shift: CoordinateShift,
    /// Real-world bounds before re-centering
    pub bounds: ModelBounds,
}

/// Apply the optional quantization transform, then re-center on the minimum corner.
///
/// Output length and order always match the input; downstream faces index
/// into it by position.
pub fn normalize_vertices(
    raw: &[[f64; 3]],
    transform: Option<&Transform>,
) -> Result<NormalizedVertices> {
    if raw.is_empty() {
        return Err(Error::MalformedDocument("vertex pool is empty".to_string()));
    }

    let real: Vec<Point3<f64>> = raw
        .iter()
        .map(|&v| {
            let [x, y, z] = match transform {
                Some(t) => t.apply(v),
                None => v,
            };
            Point3::new(x, y, z)
        })
        .collect();

    let (points, shift, bounds) = recenter(real);

    Ok(NormalizedVertices {
        pool: VertexPool::new(points),
        shift,
        bounds,
    })
}

/// Subtract the componentwise minimum from every point
pub fn recenter(mut points: Vec<Point3<f64>>) -> (Vec<Point3<f64>>, CoordinateShift, ModelBounds) {
    let bounds = ModelBounds::from_points(&points);
    let shift = CoordinateShift::from_point(bounds.min_corner());

    if !shift.is_zero() {
        for p in points.iter_mut() {
            *p = shift.apply(*p);
        }
    }

    (points, shift, bounds)
}
