//! Geographic input types.
//!
//! Area queries are reduced to a single representative point before any
//! request is built: the upstream extraction API is driven through its point
//! interface even for "area" inputs, so a polygon contributes only its
//! centroid. Geometry beyond centroid extraction is out of scope.

use serde::{Deserialize, Serialize};

// ============================================================================
// Area Of Interest
// ============================================================================

/// A caller-supplied geographic input: a point or a polygon ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AreaOfInterest {
    /// A single point.
    Point {
        /// Latitude in decimal degrees.
        latitude: f64,
        /// Longitude in decimal degrees.
        longitude: f64,
    },
    /// A polygon ring as (latitude, longitude) vertices.
    Polygon {
        /// Ring vertices; a closing duplicate of the first vertex is ignored.
        vertices: Vec<(f64, f64)>,
    },
}

impl AreaOfInterest {
    /// Creates a point area.
    pub fn point(latitude: f64, longitude: f64) -> Self {
        Self::Point {
            latitude,
            longitude,
        }
    }

    /// Reduces the area to a representative (latitude, longitude) point.
    ///
    /// Points map to themselves; polygons map to the vertex mean. An empty
    /// polygon degenerates to (0, 0), which request validation then rejects
    /// as implausible for any configured deployment.
    pub fn centroid(&self) -> (f64, f64) {
        match self {
            Self::Point {
                latitude,
                longitude,
            } => (*latitude, *longitude),
            Self::Polygon { vertices } => {
                // Drop the conventional closing vertex if present.
                let ring: &[(f64, f64)] = match vertices.as_slice() {
                    [first, .., last] if first == last => &vertices[..vertices.len() - 1],
                    other => other,
                };
                if ring.is_empty() {
                    return (0.0, 0.0);
                }
                #[allow(clippy::cast_precision_loss)]
                let n = ring.len() as f64;
                let (lat_sum, lon_sum) = ring
                    .iter()
                    .fold((0.0, 0.0), |(la, lo), (lat, lon)| (la + lat, lo + lon));
                (lat_sum / n, lon_sum / n)
            }
        }
    }
}

// ============================================================================
// Bounding Box
// ============================================================================

/// A west/south/east/north search box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western edge (longitude).
    pub west: f64,
    /// Southern edge (latitude).
    pub south: f64,
    /// Eastern edge (longitude).
    pub east: f64,
    /// Northern edge (latitude).
    pub north: f64,
}

impl BoundingBox {
    /// Builds a box of `half_width` degrees around a point.
    pub fn around(latitude: f64, longitude: f64, half_width: f64) -> Self {
        Self {
            west: longitude - half_width,
            south: latitude - half_width,
            east: longitude + half_width,
            north: latitude + half_width,
        }
    }

    /// Formats the box as the `west,south,east,north` string catalog APIs expect.
    pub fn to_query(&self) -> String {
        format!(
            "{:.4},{:.4},{:.4},{:.4}",
            self.west, self.south, self.east, self.north
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
