use crate::error::{Result, SectionError};
use crate::geom::Vec2;
use itertools::Itertools;
use std::f64::consts::PI;
use std::str::FromStr;

/// Upper bound on the points placed along one segment.
pub const MAX_SEGMENT_SAMPLES: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// `[width, height]`
    Rectangle,
    /// `[diameter]`
    Circle,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rec",
            ShapeKind::Circle => "circle",
        }
    }

    fn param_count(&self) -> usize {
        match self {
            ShapeKind::Rectangle => 2,
            ShapeKind::Circle => 1,
        }
    }

    pub fn area(&self, params: &[f64]) -> Result<f64> {
        if params.len() != self.param_count() {
            return Err(SectionError::ShapeParameters {
                kind: self.name(),
                expected: self.param_count(),
                got: params.len(),
            });
        }
        Ok(match self {
            ShapeKind::Rectangle => params[0] * params[1],
            ShapeKind::Circle => circle_area(params[0]),
        })
    }
}

impl FromStr for ShapeKind {
    type Err = SectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rec" | "rect" | "rectangle" => Ok(ShapeKind::Rectangle),
            "circle" => Ok(ShapeKind::Circle),
            _ => Err(SectionError::UnsupportedShape(s.to_string())),
        }
    }
}

/// Area of a named shape kind, e.g. `area("circle", &[25.0])`.
pub fn area(kind: &str, params: &[f64]) -> Result<f64> {
    kind.parse::<ShapeKind>()?.area(params)
}

pub fn circle_area(diameter: f64) -> f64 {
    PI * diameter * diameter / 4.0
}

/// Closed outline of a `width` x `height` rectangle centered on the origin:
/// bottom-left, top-left, top-right, bottom-right, bottom-left.
pub fn rectangle_corners(width: f64, height: f64) -> [Vec2; 5] {
    let (hw, hh) = (width / 2.0, height / 2.0);
    [
        Vec2::new(-hw, -hh),
        Vec2::new(-hw, hh),
        Vec2::new(hw, hh),
        Vec2::new(hw, -hh),
        Vec2::new(-hw, -hh),
    ]
}

/// Lays points along a closed point list (first point repeated at the end).
///
/// Each segment of length `L` gets `floor(L / spacing) + 1` evenly spaced
/// points starting at its first endpoint; the second endpoint is left to the
/// next segment. A segment needing more than [`MAX_SEGMENT_SAMPLES`] points
/// is rejected.
pub fn perimeter_samples(points: &[Vec2], spacing: f64) -> Result<Vec<Vec2>> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(SectionError::InvalidSpacing(spacing));
    }
    let mut samples = Vec::new();
    for (start, end) in points.iter().tuple_windows() {
        let delta = *end - *start;
        let length = delta.length();
        let steps = (length / spacing).floor();
        if !steps.is_finite() || steps >= MAX_SEGMENT_SAMPLES as f64 {
            return Err(SectionError::TooManySamples { length, spacing });
        }
        let count = steps as usize + 1;
        samples.extend((0..count).map(|k| *start + delta * (k as f64 / count as f64)));
    }
    Ok(samples)
}
