use crate::edge::{reconstruct_edges, Edge};
use crate::error::{Result, SectionError};
use crate::geom::{BBox2, Polygon, Vec2};
use crate::model::{CadEntity, EntitySource, RawOutline, RawPoint, Selection};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Divisor applied to the primary outline's smaller extent to get the default
/// mesh size.
pub const MESH_DIVISOR: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub layer: String,
    pub edges: Vec<Edge>,
    pub polygon: Polygon,
    pub area: f64,
    pub centroid: Vec2,
    pub bbox: BBox2,
}

impl Boundary {
    pub fn from_outline(outline: &RawOutline) -> Result<Self> {
        if outline.vertices.len() < 2 {
            return Err(SectionError::DegenerateOutline {
                layer: outline.layer.clone(),
            });
        }
        let edges = reconstruct_edges(&outline.vertices)?;
        let polygon = outline.vertex_polygon();
        let centroid = polygon
            .centroid()
            .ok_or_else(|| SectionError::DegenerateOutline {
                layer: outline.layer.clone(),
            })?;
        Ok(Self {
            layer: outline.layer.clone(),
            area: polygon.area(),
            bbox: polygon.bbox(),
            centroid,
            edges,
            polygon,
        })
    }

    pub fn is_closed(&self) -> bool {
        match (self.edges.first(), self.edges.last()) {
            (Some(first), Some(last)) => first.from() == last.to(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebarPoint {
    pub pos: Vec2,
    pub area: f64,
    pub material: String,
    #[serde(default)]
    pub prestress: f64,
}

impl From<&RawPoint> for RebarPoint {
    fn from(p: &RawPoint) -> Self {
        Self {
            pos: p.center,
            area: p.area(),
            material: p.layer.clone(),
            prestress: 0.0,
        }
    }
}

/// Geometry of one cross-section in drawing coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    /// Largest first; index 0 is the outer profile.
    pub boundaries: Vec<Boundary>,
    pub rebars: Vec<RebarPoint>,
    pub center: Vec2,
    pub mesh_size: f64,
}

impl Section {
    pub fn primary(&self) -> &Boundary {
        &self.boundaries[0]
    }
}

/// Builds a section from the outlines and bar circles of one selection.
pub fn extract_section(name: &str, entities: &[CadEntity]) -> Result<Section> {
    let mut outlines: Vec<(f64, &RawOutline)> = Vec::new();
    let mut points: Vec<&RawPoint> = Vec::new();
    for ent in entities {
        match ent {
            CadEntity::Outline(o) => outlines.push((o.vertex_polygon().area(), o)),
            CadEntity::Point(p) => points.push(p),
        }
    }
    if outlines.is_empty() {
        return Err(SectionError::EmptySelection);
    }
    outlines.sort_by(|a, b| b.0.total_cmp(&a.0));

    let primary = Boundary::from_outline(outlines[0].1)?;
    let center = primary.centroid;
    let mesh_size = primary.bbox.min_extent() / MESH_DIVISOR;
    debug!(
        section = name,
        layer = %primary.layer,
        area = primary.area,
        cx = center.x,
        cy = center.y,
        mesh_size,
        "primary outline"
    );

    let mut boundaries = vec![primary];
    for (index, (_, outline)) in outlines.iter().enumerate().skip(1) {
        let boundary = Boundary::from_outline(outline)?;
        if !boundaries[0].polygon.contains(boundary.centroid) {
            return Err(SectionError::ContainmentViolation {
                index,
                layer: boundary.layer,
                centroid: boundary.centroid,
            });
        }
        boundaries.push(boundary);
    }

    let mut rebars = Vec::with_capacity(points.len());
    for p in points {
        if boundaries[0].polygon.contains(p.center) {
            rebars.push(RebarPoint::from(p));
        } else {
            debug!(
                section = name,
                layer = %p.layer,
                x = p.center.x,
                y = p.center.y,
                "circle outside the main profile skipped"
            );
        }
    }

    Ok(Section {
        name: name.to_string(),
        boundaries,
        rebars,
        center,
        mesh_size,
    })
}

/// Pulls one selection from `source` and extracts it.
pub fn extract_from_source(
    source: &mut dyn EntitySource,
    name: &str,
    selection: &Selection,
) -> Result<Section> {
    let entities = source.select(selection).map_err(SectionError::Source)?;
    debug!(section = name, entities = entities.len(), "selection received");
    extract_section(name, &entities)
}
