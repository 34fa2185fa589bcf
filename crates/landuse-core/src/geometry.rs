//! Parcel geometry and its well-known-text encoding.
//!
//! A [`Polygon`] is an exterior ring of coordinate pairs. Callers supply the
//! ring open (first point not repeated); the WKT encoder always emits a closed
//! ring, e.g. `POLYGON((0 0, 0 1, 1 1, 1 0, 0 0))`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as _;

use crate::error::{LanduseError, Result};

/// Minimum number of distinct points for a polygon.
pub const MIN_DISTINCT_POINTS: usize = 3;

/// A single `(x, y)` coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn bits(&self) -> (u64, u64) {
        // -0.0 and 0.0 are the same location
        ((self.x + 0.0).to_bits(), (self.y + 0.0).to_bits())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A simple polygon described by its exterior ring.
///
/// The ring is stored open: if the caller repeats the first point at the end
/// it is dropped on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    ring: Vec<Coordinate>,
}

impl Polygon {
    /// Builds a polygon from an ordered ring of points.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if any coordinate is not finite, the ring
    /// has fewer than three distinct points, or the points are collinear.
    pub fn new(points: impl Into<Vec<Coordinate>>) -> Result<Self> {
        let mut ring: Vec<Coordinate> = points.into();

        if let Some(bad) = ring.iter().find(|c| !c.is_finite()) {
            return Err(LanduseError::invalid_argument(format!(
                "coordinate ({}, {}) is not finite",
                bad.x, bad.y
            )));
        }

        if ring.len() > 1 && ring.first().map(Coordinate::bits) == ring.last().map(Coordinate::bits)
        {
            ring.pop();
        }

        let distinct: HashSet<(u64, u64)> = ring.iter().map(Coordinate::bits).collect();
        if distinct.len() < MIN_DISTINCT_POINTS {
            return Err(LanduseError::invalid_argument(format!(
                "polygon needs at least {} distinct points, got {}",
                MIN_DISTINCT_POINTS,
                distinct.len()
            )));
        }

        if ring_area(&ring) == 0.0 {
            return Err(LanduseError::invalid_argument(
                "polygon has zero area, its points are collinear",
            ));
        }

        Ok(Self { ring })
    }

    /// Builds a polygon from `(x, y)` tuples.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        Self::new(pairs.iter().copied().map(Coordinate::from).collect::<Vec<_>>())
    }

    /// The open exterior ring.
    pub fn ring(&self) -> &[Coordinate] {
        &self.ring
    }

    /// Absolute planar area (shoelace formula).
    pub fn area(&self) -> f64 {
        ring_area(&self.ring)
    }

    /// Encodes the polygon as WKT with a closed ring.
    pub fn to_wkt(&self) -> String {
        let mut out = String::from("POLYGON((");
        for (i, c) in self.ring.iter().chain(self.ring.first()).enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{} {}", c.x, c.y);
        }
        out.push_str("))");
        out
    }

    /// Parses a `POLYGON((...))` WKT string, reading the exterior ring only.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for anything that is not a polygon with a
    /// valid exterior ring.
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        let trimmed = wkt.trim();
        let body = trimmed
            .get(..7)
            .filter(|tag| tag.eq_ignore_ascii_case("POLYGON"))
            .map(|_| trimmed[7..].trim_start())
            .ok_or_else(|| LanduseError::invalid_argument(format!("not a WKT polygon: {wkt}")))?;

        let inner = body
            .strip_prefix('(')
            .and_then(|s| s.trim_start().strip_prefix('('))
            .ok_or_else(|| LanduseError::invalid_argument(format!("malformed WKT ring: {wkt}")))?;
        let exterior = inner
            .split(')')
            .next()
            .ok_or_else(|| LanduseError::invalid_argument(format!("malformed WKT ring: {wkt}")))?;

        let points = exterior
            .split(',')
            .map(|pair| {
                let mut parts = pair.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(x), Some(y), None) => {
                        let x = x.parse::<f64>();
                        let y = y.parse::<f64>();
                        match (x, y) {
                            (Ok(x), Ok(y)) => Ok(Coordinate::new(x, y)),
                            _ => Err(LanduseError::invalid_argument(format!(
                                "bad WKT coordinate '{}'",
                                pair.trim()
                            ))),
                        }
                    }
                    _ => Err(LanduseError::invalid_argument(format!(
                        "bad WKT coordinate '{}'",
                        pair.trim()
                    ))),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(points)
    }
}

fn ring_area(ring: &[Coordinate]) -> f64 {
    let n = ring.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice.abs() / 2.0
}

impl TryFrom<Vec<Coordinate>> for Polygon {
    type Error = LanduseError;

    fn try_from(points: Vec<Coordinate>) -> Result<Self> {
        Self::new(points)
    }
}

impl std::fmt::Display for Polygon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_wkt())
    }
}
