use crate::dialect::{arc_block, line_block};
use crate::error::{Result, SectionError};
use crate::geom::Vec2;
use crate::model::PolylineVertex2D;
use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Edge {
    Line { from: Vec2, to: Vec2 },
    /// Circular arc through three points.
    Arc { from: Vec2, through: Vec2, to: Vec2 },
}

impl Edge {
    pub fn from(&self) -> Vec2 {
        match self {
            Edge::Line { from, .. } | Edge::Arc { from, .. } => *from,
        }
    }

    pub fn to(&self) -> Vec2 {
        match self {
            Edge::Line { to, .. } | Edge::Arc { to, .. } => *to,
        }
    }

    pub fn is_arc(&self) -> bool {
        matches!(self, Edge::Arc { .. })
    }

    pub fn translated(&self, offset: Vec2) -> Edge {
        match *self {
            Edge::Line { from, to } => Edge::Line {
                from: from + offset,
                to: to + offset,
            },
            Edge::Arc { from, through, to } => Edge::Arc {
                from: from + offset,
                through: through + offset,
                to: to + offset,
            },
        }
    }

    pub fn to_dialect(&self) -> String {
        match *self {
            Edge::Line { from, to } => line_block(&[from, to]),
            Edge::Arc { from, through, to } => arc_block(&[from, through, to]),
        }
    }
}

/// Point on the arc that leaves `from` for `to` with the given bulge.
///
/// The half chord from the chord midpoint back to `from` is scaled by the bulge
/// and turned a quarter turn counter-clockwise about the midpoint. With
/// bulge = tan(θ/4) its tip lands on the arc's apex.
pub fn arc_through_point(from: Vec2, to: Vec2, bulge: f64) -> Vec2 {
    let mid = from.midpoint(to);
    let half: Vector2<f64> = (from - mid).into();
    let apex = Rotation2::new(FRAC_PI_2) * (half * bulge);
    mid + Vec2::from(apex)
}

/// Turns a closed vertex loop into one edge per vertex; the last edge runs
/// back to the first vertex.
pub fn reconstruct_edges(vertices: &[PolylineVertex2D]) -> Result<Vec<Edge>> {
    let n = vertices.len();
    let mut edges = Vec::with_capacity(n);
    for (i, v) in vertices.iter().enumerate() {
        if !v.bulge.is_finite() {
            return Err(SectionError::MalformedEdge {
                index: i,
                bulge: v.bulge,
            });
        }
        let from = v.pos;
        let to = vertices[(i + 1) % n].pos;
        if v.bulge == 0.0 {
            edges.push(Edge::Line { from, to });
        } else {
            let through = arc_through_point(from, to, v.bulge);
            edges.push(Edge::Arc { from, through, to });
        }
    }
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_bulge_is_a_counter_clockwise_half_circle() {
        let p = arc_through_point(Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0), 1.0);
        assert!((p.x - 0.0).abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn negative_bulge_flips_the_apex() {
        let p = arc_through_point(Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0), -1.0);
        assert!((p.y + 1.0).abs() < 1e-12);
    }

    #[test]
    fn translation_moves_every_point() {
        let e = Edge::Arc {
            from: Vec2::new(0.0, 0.0),
            through: Vec2::new(1.0, 1.0),
            to: Vec2::new(2.0, 0.0),
        };
        let t = e.translated(Vec2::new(-1.0, -1.0));
        assert_eq!(
            Edge::Arc {
                from: Vec2::new(-1.0, -1.0),
                through: Vec2::new(0.0, 0.0),
                to: Vec2::new(1.0, -1.0),
            },
            t
        );
    }
}
