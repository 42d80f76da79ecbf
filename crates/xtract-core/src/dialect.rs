//! Text encodings of geometry in the analysis tool's input dialect.

use crate::geom::Vec2;

/// Shortest round-tripping decimal form; negative zero prints as `0`.
pub fn num(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    format!("{v}")
}

fn point_block(begin: &str, end: &str, points: &[Vec2]) -> String {
    let mut lines = Vec::with_capacity(points.len() + 2);
    lines.push(begin.to_string());
    lines.extend(points.iter().map(|p| format!("{},{}", num(p.x), num(p.y))));
    lines.push(end.to_string());
    lines.join("\n")
}

pub fn line_block(points: &[Vec2]) -> String {
    point_block("Begin_Line", "End_Line", points)
}

/// Arc given as start, a point on the arc, end.
pub fn arc_block(points: &[Vec2]) -> String {
    point_block("Begin_Arc", "End_Arc", points)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RebarRecord<'a> {
    pub pos: Vec2,
    pub area: f64,
    pub prestress: f64,
    pub material: &'a str,
}

pub fn rebar_line(r: &RebarRecord<'_>) -> String {
    format!(
        "{}, {}, {}, {}, {}",
        num(r.pos.x),
        num(r.pos.y),
        num(r.area),
        num(r.prestress),
        r.material
    )
}

/// Rebar records sharing one area and material, one per line.
pub fn rebar_block(points: &[Vec2], area: f64, material: &str, prestress: f64) -> String {
    points
        .iter()
        .map(|&pos| {
            rebar_line(&RebarRecord {
                pos,
                area,
                prestress,
                material,
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}
