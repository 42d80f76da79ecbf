#![allow(dead_code)]

use xtract_core::geom::Vec2;
use xtract_core::model::{CadEntity, PolylineVertex2D, RawOutline, RawPoint};
use xtract_core::template::TemplateSet;

pub const TEMPLATES: [(&str, &str); 8] = [
    ("global", "Global Parameters\nName = {name}\nEnd_Global"),
    (
        "unconfined_concrete",
        "Begin_Material\nName = {name}\nType = Unconfined Concrete\nFc = {strength}\nEnd_Material",
    ),
    (
        "bilinear_rebar",
        "Begin_Material\nName = {name}\nType = Bilinear Steel\nFy = {stress}\nEnd_Material",
    ),
    (
        "section",
        "Begin_Section\nName = {name}\nBoundary = {boundary}\nBegin_Shapes\n{shape_part}\nEnd_Shapes\nBegin_Rebar\n{rebar_part}\nEnd_Rebar\nBegin_Loading\n{loading_part}\nEnd_Loading\nEnd_Section",
    ),
    (
        "shape",
        "Begin_Shape\nMaterial = {material}\nMeshSize = {mesh_size}\n{line_and_arc}\nEnd_Shape",
    ),
    (
        "moment_curvature",
        "Begin_Loading\nName = {name}\nType = Moment Curvature\nConstAxial = {const_axial}\nConstMxx = {const_mxx}\nConstMyy = {const_myy}\n{inc} = {direction}\nEnd_Loading",
    ),
    (
        "pm_interaction",
        "Begin_Loading\nName = {name}\nType = PM Interaction\nIncludeFullOrHalf = {full_or_half}\nAngle = {angle}\nEnd_Loading",
    ),
    (
        "capacity_orbit",
        "Begin_Loading\nName = {name}\nType = Capacity Orbit\nConstAxial = {load}\nEnd_Loading",
    ),
];

pub fn templates() -> TemplateSet {
    TemplateSet::new(TEMPLATES).expect("test templates are valid")
}

/// Axis-aligned square outline, counter-clockwise from its lower-left corner.
pub fn square(layer: &str, x0: f64, y0: f64, side: f64) -> CadEntity {
    CadEntity::Outline(RawOutline::new(
        layer,
        vec![
            PolylineVertex2D::line(x0, y0),
            PolylineVertex2D::line(x0 + side, y0),
            PolylineVertex2D::line(x0 + side, y0 + side),
            PolylineVertex2D::line(x0, y0 + side),
        ],
    ))
}

pub fn bar(layer: &str, x: f64, y: f64, radius: f64) -> CadEntity {
    CadEntity::Point(RawPoint::new(layer, Vec2::new(x, y), radius))
}

/// Parses the `x, y` columns of a rebar block.
pub fn rebar_positions(block: &str) -> Vec<Vec2> {
    block
        .lines()
        .map(|line| {
            let cols: Vec<f64> = line
                .split(',')
                .take(2)
                .map(|c| c.trim().parse().expect("numeric coordinate"))
                .collect();
            Vec2::new(cols[0], cols[1])
        })
        .collect()
}
