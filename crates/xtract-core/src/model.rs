use crate::error::BoxError;
use crate::geom::{BBox2, Polygon, Vec2};
use crate::shapes::circle_area;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolylineVertex2D {
    pub pos: Vec2,
    /// Zero for a straight segment to the next vertex, otherwise tan(θ/4) of
    /// the arc to it (positive = counter-clockwise).
    pub bulge: f64,
}

impl PolylineVertex2D {
    pub const fn line(x: f64, y: f64) -> Self {
        Self {
            pos: Vec2::new(x, y),
            bulge: 0.0,
        }
    }

    pub const fn arc(x: f64, y: f64, bulge: f64) -> Self {
        Self {
            pos: Vec2::new(x, y),
            bulge,
        }
    }
}

/// Closed polyline as delivered by the CAD side. The last vertex connects back
/// to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOutline {
    pub vertices: Vec<PolylineVertex2D>,
    pub layer: String,
}

impl RawOutline {
    pub fn new(layer: impl Into<String>, vertices: Vec<PolylineVertex2D>) -> Self {
        Self {
            vertices,
            layer: layer.into(),
        }
    }

    /// Straight-line approximation through the vertices only.
    pub fn vertex_polygon(&self) -> Polygon {
        Polygon::new(self.vertices.iter().map(|v| v.pos).collect())
    }

    pub fn bbox(&self) -> BBox2 {
        self.vertex_polygon().bbox()
    }
}

/// Circle standing for one reinforcing bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub center: Vec2,
    pub radius: f64,
    pub layer: String,
}

impl RawPoint {
    pub fn new(layer: impl Into<String>, center: Vec2, radius: f64) -> Self {
        Self {
            center,
            radius,
            layer: layer.into(),
        }
    }

    pub fn area(&self) -> f64 {
        circle_area(self.radius * 2.0)
    }

    pub fn bbox(&self) -> BBox2 {
        BBox2::new(
            Vec2::new(self.center.x - self.radius, self.center.y - self.radius),
            Vec2::new(self.center.x + self.radius, self.center.y + self.radius),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CadEntity {
    Outline(RawOutline),
    Point(RawPoint),
}

impl CadEntity {
    pub fn layer(&self) -> &str {
        match self {
            CadEntity::Outline(o) => &o.layer,
            CadEntity::Point(p) => &p.layer,
        }
    }

    pub fn bbox(&self) -> BBox2 {
        match self {
            CadEntity::Outline(o) => o.bbox(),
            CadEntity::Point(p) => p.bbox(),
        }
    }
}

/// Which entities of a drawing make up one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Everything in model space.
    All,
    /// The entities of a named block definition.
    Block(String),
    /// Entities whose extents lie inside the rectangle.
    Window { min: Vec2, max: Vec2 },
}

/// The CAD side of an extraction run: hands out the raw entities of one
/// selection.
pub trait EntitySource {
    fn select(&mut self, selection: &Selection) -> Result<Vec<CadEntity>, BoxError>;
}

/// In-memory source, mostly useful for tests and for data that was already
/// read elsewhere. Ignores block names.
impl EntitySource for Vec<CadEntity> {
    fn select(&mut self, selection: &Selection) -> Result<Vec<CadEntity>, BoxError> {
        Ok(match selection {
            Selection::All | Selection::Block(_) => self.clone(),
            Selection::Window { min, max } => {
                let window = BBox2::new(*min, *max);
                self.iter()
                    .filter(|e| window.contains_box(&e.bbox()))
                    .cloned()
                    .collect()
            }
        })
    }
}
