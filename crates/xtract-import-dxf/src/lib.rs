use anyhow::{bail, Context, Result};
use dxf::entities::EntityType;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};
use xtract_core::error::BoxError;
use xtract_core::geom::{BBox2, Vec2};
use xtract_core::model::{
    CadEntity, EntitySource, PolylineVertex2D, RawOutline, RawPoint, Selection,
};

const MAX_INSERT_DEPTH: usize = 8;
const CLOSE_EPS: f64 = 1e-9;
/// Outline coordinates are kept to two decimals.
const COORD_SCALE: f64 = 100.0;

/// Serves section selections out of a DXF drawing: closed polylines become
/// outlines, circles become bars.
pub struct DxfSource {
    drawing: dxf::Drawing,
}

impl DxfSource {
    pub fn load(path: &Path) -> Result<Self> {
        let drawing =
            dxf::Drawing::load_file(path).with_context(|| format!("load DXF: {path:?}"))?;
        Ok(Self::from_drawing(drawing))
    }

    pub fn from_drawing(drawing: dxf::Drawing) -> Self {
        Self { drawing }
    }

    pub fn entities(&self, selection: &Selection) -> Result<Vec<CadEntity>> {
        let mut collector = Collector::new(&self.drawing);
        match selection {
            Selection::All => {
                for ent in self.drawing.entities() {
                    collector.collect(ent, &Transform2D::identity(), None, 0);
                }
            }
            Selection::Block(name) => {
                let key = name.to_ascii_lowercase();
                let Some(block) = collector.blocks.get(&key).copied() else {
                    bail!("block not found: {name:?}");
                };
                collector.stack.push(key);
                for ent in &block.entities {
                    collector.collect(ent, &Transform2D::identity(), None, 0);
                }
            }
            Selection::Window { min, max } => {
                for ent in self.drawing.entities() {
                    collector.collect(ent, &Transform2D::identity(), None, 0);
                }
                let window = BBox2::new(*min, *max);
                collector.out.retain(|e| window.contains_box(&e.bbox()));
            }
        }
        debug!(?selection, entities = collector.out.len(), "DXF selection collected");
        Ok(collector.out)
    }
}

impl EntitySource for DxfSource {
    fn select(&mut self, selection: &Selection) -> std::result::Result<Vec<CadEntity>, BoxError> {
        self.entities(selection).map_err(Into::into)
    }
}

struct Collector<'a> {
    blocks: HashMap<String, &'a dxf::Block>,
    stack: Vec<String>,
    out: Vec<CadEntity>,
}

impl<'a> Collector<'a> {
    fn new(drawing: &'a dxf::Drawing) -> Self {
        let mut blocks = HashMap::new();
        for block in drawing.blocks() {
            blocks.insert(block.name.to_ascii_lowercase(), block);
        }
        Self {
            blocks,
            stack: Vec::new(),
            out: Vec::new(),
        }
    }

    fn collect(
        &mut self,
        ent: &dxf::entities::Entity,
        tx: &Transform2D,
        parent_layer: Option<&str>,
        depth: usize,
    ) {
        let layer = resolve_layer(&ent.common.layer, parent_layer);
        match &ent.specific {
            EntityType::Insert(insert) => self.collect_insert(insert, &layer, tx, depth + 1),
            EntityType::LwPolyline(poly) => {
                let points = poly.vertices.iter().map(|v| (Vec2::new(v.x, v.y), v.bulge));
                self.push_outline(layer, points, tx);
            }
            EntityType::Polyline(poly) => {
                let points = poly
                    .vertices()
                    .map(|v| (Vec2::new(v.location.x, v.location.y), v.bulge));
                self.push_outline(layer, points, tx);
            }
            EntityType::Circle(circle) => {
                let Some(scale) = tx.uniform_scale() else {
                    warn!(%layer, "skipping circle under a non-uniform block scale");
                    return;
                };
                let center = tx.apply_point(Vec2::new(circle.center.x, circle.center.y));
                self.out.push(CadEntity::Point(RawPoint::new(
                    layer,
                    center,
                    circle.radius * scale,
                )));
            }
            _ => {}
        }
    }

    fn push_outline(
        &mut self,
        layer: String,
        points: impl Iterator<Item = (Vec2, f64)>,
        tx: &Transform2D,
    ) {
        let bulge_sign = match tx.uniform_scale() {
            Some(_) if tx.is_mirrored() => -1.0,
            Some(_) => 1.0,
            None => {
                warn!(%layer, "arcs flattened to chords under a non-uniform block scale");
                0.0
            }
        };
        let mut vertices: Vec<PolylineVertex2D> = points
            .map(|(p, bulge)| PolylineVertex2D {
                pos: round_coords(tx.apply_point(p)),
                bulge: bulge * bulge_sign,
            })
            .collect();
        if vertices.len() > 2 {
            let first = vertices[0].pos;
            if vertices.last().is_some_and(|v| v.pos.distance(first) < CLOSE_EPS) {
                vertices.pop();
            }
        }
        if vertices.len() < 2 {
            debug!(%layer, "skipping polyline with fewer than two vertices");
            return;
        }
        self.out.push(CadEntity::Outline(RawOutline::new(layer, vertices)));
    }

    fn collect_insert(
        &mut self,
        insert: &dxf::entities::Insert,
        insert_layer: &str,
        parent_tx: &Transform2D,
        depth: usize,
    ) {
        if depth > MAX_INSERT_DEPTH {
            warn!(block = %insert.name, "block nesting too deep; skipped");
            return;
        }
        let name = insert.name.to_ascii_lowercase();
        if self.stack.iter().any(|n| n == &name) {
            return;
        }
        let Some(block) = self.blocks.get(&name).copied() else {
            warn!(block = %insert.name, "insert references an unknown block");
            return;
        };
        self.stack.push(name);
        let base = Vec2::new(block.base_point.x, block.base_point.y);
        let loc = Vec2::new(insert.location.x, insert.location.y);
        let scale = Vec2::new(insert.x_scale_factor, insert.y_scale_factor);
        let col_count = insert.column_count.max(1) as i32;
        let row_count = insert.row_count.max(1) as i32;

        for row in 0..row_count {
            for col in 0..col_count {
                let offset = Vec2::new(
                    col as f64 * insert.column_spacing,
                    row as f64 * insert.row_spacing,
                );
                let local = Transform2D::from_insert(base, loc, scale, insert.rotation, offset);
                let combined = parent_tx.compose(&local);
                for ent in &block.entities {
                    self.collect(ent, &combined, Some(insert_layer), depth);
                }
            }
        }
        self.stack.pop();
    }
}

fn round_coords(p: Vec2) -> Vec2 {
    Vec2::new(
        (p.x * COORD_SCALE).round() / COORD_SCALE,
        (p.y * COORD_SCALE).round() / COORD_SCALE,
    )
}

/// Entities on layer `0` inside a block take the layer of the insert.
fn resolve_layer(layer: &str, parent: Option<&str>) -> String {
    match parent {
        Some(p) if layer == "0" => p.to_string(),
        _ => layer.to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
struct Transform2D {
    m11: f64,
    m12: f64,
    m21: f64,
    m22: f64,
    tx: f64,
    ty: f64,
}

impl Transform2D {
    fn identity() -> Self {
        Self {
            m11: 1.0,
            m12: 0.0,
            m21: 0.0,
            m22: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    fn from_insert(base: Vec2, location: Vec2, scale: Vec2, rotation_deg: f64, offset: Vec2) -> Self {
        let (sin, cos) = rotation_deg.to_radians().sin_cos();
        let m11 = cos * scale.x;
        let m12 = -sin * scale.y;
        let m21 = sin * scale.x;
        let m22 = cos * scale.y;

        let off_x = m11 * offset.x + m12 * offset.y;
        let off_y = m21 * offset.x + m22 * offset.y;
        Self {
            m11,
            m12,
            m21,
            m22,
            tx: location.x + off_x - (m11 * base.x + m12 * base.y),
            ty: location.y + off_y - (m21 * base.x + m22 * base.y),
        }
    }

    fn compose(&self, other: &Transform2D) -> Self {
        Self {
            m11: self.m11 * other.m11 + self.m12 * other.m21,
            m12: self.m11 * other.m12 + self.m12 * other.m22,
            m21: self.m21 * other.m11 + self.m22 * other.m21,
            m22: self.m21 * other.m12 + self.m22 * other.m22,
            tx: self.m11 * other.tx + self.m12 * other.ty + self.tx,
            ty: self.m21 * other.tx + self.m22 * other.ty + self.ty,
        }
    }

    fn apply_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.m11 * p.x + self.m12 * p.y + self.tx,
            self.m21 * p.x + self.m22 * p.y + self.ty,
        )
    }

    fn is_mirrored(&self) -> bool {
        self.m11 * self.m22 - self.m12 * self.m21 < 0.0
    }

    /// Scale factor when the linear part keeps circles circular (mirroring
    /// allowed).
    fn uniform_scale(&self) -> Option<f64> {
        const EPS: f64 = 1e-6;
        let sx = (self.m11 * self.m11 + self.m21 * self.m21).sqrt();
        let sy = (self.m12 * self.m12 + self.m22 * self.m22).sqrt();
        if !sx.is_finite() || !sy.is_finite() {
            return None;
        }
        if (sx - sy).abs() > EPS {
            return None;
        }
        let dot = self.m11 * self.m12 + self.m21 * self.m22;
        if dot.abs() > EPS {
            return None;
        }
        Some(sx)
    }
}
