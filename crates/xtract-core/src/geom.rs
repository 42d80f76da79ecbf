use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ORIGIN: Vec2 = Vec2::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(&self, other: Vec2) -> f64 {
        (*self - other).length()
    }

    pub fn midpoint(&self, other: Vec2) -> Vec2 {
        Vec2::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    pub fn cross(&self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl From<nalgebra::Vector2<f64>> for Vec2 {
    fn from(v: nalgebra::Vector2<f64>) -> Self {
        Vec2::new(v.x, v.y)
    }
}

impl From<Vec2> for nalgebra::Vector2<f64> {
    fn from(v: Vec2) -> Self {
        nalgebra::Vector2::new(v.x, v.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl BBox2 {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Vec2::new(f64::INFINITY, f64::INFINITY),
            max: Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn include_point(&mut self, point: Vec2) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    pub fn contains_box(&self, other: &Self) -> bool {
        !other.is_empty()
            && other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    pub fn width(&self) -> f64 {
        (self.max.x - self.min.x).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.max.y - self.min.y).max(0.0)
    }

    /// Smaller of the two side lengths.
    pub fn min_extent(&self) -> f64 {
        self.width().min(self.height())
    }
}

/// Closed straight-line loop. The first point is not repeated at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Vec2>,
}

impl Polygon {
    pub fn new(points: Vec<Vec2>) -> Self {
        let mut points = points;
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Self { points }
    }

    /// Shoelace sum; positive when the loop runs counter-clockwise.
    pub fn signed_area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        self.points
            .iter()
            .circular_tuple_windows()
            .map(|(a, b)| a.cross(*b))
            .sum::<f64>()
            * 0.5
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Area centroid of the enclosed region. `None` for loops without area.
    pub fn centroid(&self) -> Option<Vec2> {
        let a = self.signed_area();
        if a.abs() < EPS {
            return None;
        }
        let (cx, cy) = self
            .points
            .iter()
            .circular_tuple_windows()
            .fold((0.0, 0.0), |(cx, cy), (p, q)| {
                let f = p.cross(*q);
                (cx + (p.x + q.x) * f, cy + (p.y + q.y) * f)
            });
        Some(Vec2::new(cx / (6.0 * a), cy / (6.0 * a)))
    }

    pub fn bbox(&self) -> BBox2 {
        let mut bbox = BBox2::empty();
        for p in &self.points {
            bbox.include_point(*p);
        }
        bbox
    }

    /// Strict containment: points on the outline count as outside.
    pub fn contains(&self, p: Vec2) -> bool {
        if self.points.len() < 3 {
            return false;
        }
        let mut inside = false;
        for (a, b) in self.points.iter().circular_tuple_windows() {
            if on_segment(p, *a, *b) {
                return false;
            }
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

fn on_segment(p: Vec2, a: Vec2, b: Vec2) -> bool {
    let ab = b - a;
    let ap = p - a;
    let len = ab.length();
    if len < EPS {
        return p.distance(a) < EPS;
    }
    if (ab.cross(ap) / len).abs() > EPS * len.max(1.0) {
        return false;
    }
    let t = (ap.x * ab.x + ap.y * ab.y) / (len * len);
    (-EPS..=1.0 + EPS).contains(&t)
}
