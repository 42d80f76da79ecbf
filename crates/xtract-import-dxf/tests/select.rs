use dxf::entities::{Circle, Entity, EntityType, Insert, LwPolyline};
use dxf::{Block, Drawing, LwPolylineVertex, Point};
use xtract_core::edge::{reconstruct_edges, Edge};
use xtract_core::extract::extract_from_source;
use xtract_core::geom::Vec2;
use xtract_core::model::{CadEntity, RawOutline, Selection};
use xtract_import_dxf::DxfSource;

fn polyline(layer: &str, pts: &[(f64, f64, f64)]) -> Entity {
    let mut poly = LwPolyline::default();
    poly.set_is_closed(true);
    poly.vertices = pts
        .iter()
        .map(|&(x, y, bulge)| LwPolylineVertex {
            x,
            y,
            bulge,
            ..Default::default()
        })
        .collect();
    let mut ent = Entity::new(EntityType::LwPolyline(poly));
    ent.common.layer = layer.to_string();
    ent
}

fn circle(layer: &str, x: f64, y: f64, r: f64) -> Entity {
    let mut ent = Entity::new(EntityType::Circle(Circle::new(Point::new(x, y, 0.0), r)));
    ent.common.layer = layer.to_string();
    ent
}

fn square(layer: &str, x0: f64, y0: f64, side: f64) -> Entity {
    polyline(
        layer,
        &[
            (x0, y0, 0.0),
            (x0 + side, y0, 0.0),
            (x0 + side, y0 + side, 0.0),
            (x0, y0 + side, 0.0),
        ],
    )
}

fn column_drawing() -> Drawing {
    let mut drawing = Drawing::new();
    drawing.add_entity(square("C50", 0.0, 0.0, 400.0));
    drawing.add_entity(circle("HRB400", 50.0, 50.0, 10.0));
    drawing.add_entity(circle("HRB400", 350.0, 350.0, 10.0));
    drawing
}

#[test]
fn polylines_and_circles_are_collected_with_their_layers() {
    let source = DxfSource::from_drawing(column_drawing());
    let entities = source.entities(&Selection::All).unwrap();
    assert_eq!(3, entities.len());
    match &entities[0] {
        CadEntity::Outline(o) => {
            assert_eq!("C50", o.layer);
            assert_eq!(4, o.vertices.len());
        }
        other => panic!("expected an outline, got {other:?}"),
    }
    match &entities[1] {
        CadEntity::Point(p) => {
            assert_eq!("HRB400", p.layer);
            assert_eq!(Vec2::new(50.0, 50.0), p.center);
            assert_eq!(10.0, p.radius);
        }
        other => panic!("expected a point, got {other:?}"),
    }
}

#[test]
fn repeated_closing_vertex_is_dropped_and_bulges_kept() {
    let mut drawing = Drawing::new();
    drawing.add_entity(polyline(
        "C40",
        &[
            (0.0, 0.0, 0.0),
            (100.0, 0.0, 0.5),
            (100.0, 100.0, 0.0),
            (0.0, 100.0, 0.0),
            (0.0, 0.0, 0.0),
        ],
    ));
    let entities = DxfSource::from_drawing(drawing)
        .entities(&Selection::All)
        .unwrap();
    let CadEntity::Outline(o) = &entities[0] else {
        panic!("expected an outline");
    };
    assert_eq!(4, o.vertices.len());
    assert_eq!(0.5, o.vertices[1].bulge);
}

#[test]
fn window_keeps_only_entities_inside() {
    let mut drawing = column_drawing();
    drawing.add_entity(square("C30", 2000.0, 0.0, 400.0));
    let source = DxfSource::from_drawing(drawing);
    let window = Selection::Window {
        min: Vec2::new(-1.0, -1.0),
        max: Vec2::new(401.0, 401.0),
    };
    let entities = source.entities(&window).unwrap();
    assert_eq!(3, entities.len());
    assert!(entities.iter().all(|e| e.layer() != "C30"));
}

#[test]
fn block_selection_reads_the_block_definition() {
    let mut drawing = Drawing::new();
    drawing.add_entity(square("C30", 5000.0, 5000.0, 100.0));
    let mut block = Block {
        name: "Pier".to_string(),
        ..Default::default()
    };
    block.entities.push(square("C50", 0.0, 0.0, 400.0));
    block.entities.push(circle("HRB400", 200.0, 200.0, 12.0));
    drawing.add_block(block);

    let source = DxfSource::from_drawing(drawing);
    let entities = source.entities(&Selection::Block("pier".to_string())).unwrap();
    assert_eq!(2, entities.len());
    assert!(source
        .entities(&Selection::Block("missing".to_string()))
        .is_err());
}

#[test]
fn inserted_blocks_are_placed_and_inherit_layer_zero() {
    let mut drawing = Drawing::new();
    let mut block = Block {
        name: "bar".to_string(),
        ..Default::default()
    };
    block.entities.push(circle("0", 0.0, 0.0, 10.0));
    drawing.add_block(block);

    let insert = Insert {
        name: "bar".to_string(),
        location: Point::new(100.0, 50.0, 0.0),
        ..Default::default()
    };
    let mut ent = Entity::new(EntityType::Insert(insert));
    ent.common.layer = "HRB500".to_string();
    drawing.add_entity(ent);

    let entities = DxfSource::from_drawing(drawing)
        .entities(&Selection::All)
        .unwrap();
    assert_eq!(1, entities.len());
    let CadEntity::Point(p) = &entities[0] else {
        panic!("expected a point");
    };
    assert_eq!("HRB500", p.layer);
    assert!((p.center.x - 100.0).abs() < 1e-9);
    assert!((p.center.y - 50.0).abs() < 1e-9);
}

#[test]
fn drawing_drives_a_full_extraction() {
    let mut source = DxfSource::from_drawing(column_drawing());
    let section = extract_from_source(&mut source, "col", &Selection::All).unwrap();
    assert_eq!(1, section.boundaries.len());
    assert_eq!(2, section.rebars.len());
    assert_eq!(Vec2::new(200.0, 200.0), section.center);
}

/// Block "cap": a square whose right side bulges outward, plus one bar.
fn drawing_with_scaled_cap(x_scale: f64, y_scale: f64) -> Drawing {
    let mut drawing = Drawing::new();
    let mut block = Block {
        name: "cap".to_string(),
        ..Default::default()
    };
    block.entities.push(polyline(
        "C40",
        &[
            (0.0, 0.0, 0.0),
            (100.0, 0.0, 1.0),
            (100.0, 100.0, 0.0),
            (0.0, 100.0, 0.0),
        ],
    ));
    block.entities.push(circle("HRB400", 50.0, 50.0, 8.0));
    drawing.add_block(block);

    let insert = Insert {
        name: "cap".to_string(),
        x_scale_factor: x_scale,
        y_scale_factor: y_scale,
        ..Default::default()
    };
    drawing.add_entity(Entity::new(EntityType::Insert(insert)));
    drawing
}

fn only_outline(entities: &[CadEntity]) -> &RawOutline {
    let outlines: Vec<_> = entities
        .iter()
        .filter_map(|e| match e {
            CadEntity::Outline(o) => Some(o),
            CadEntity::Point(_) => None,
        })
        .collect();
    assert_eq!(1, outlines.len());
    outlines[0]
}

#[test]
fn mirrored_insert_keeps_arcs_on_the_outer_side() {
    let entities = DxfSource::from_drawing(drawing_with_scaled_cap(-1.0, 1.0))
        .entities(&Selection::All)
        .unwrap();
    assert_eq!(2, entities.len());
    let outline = only_outline(&entities);
    assert_eq!(-1.0, outline.vertices[1].bulge);

    let edges = reconstruct_edges(&outline.vertices).unwrap();
    match edges[1] {
        Edge::Arc { from, through, to } => {
            assert_eq!(Vec2::new(-100.0, 0.0), from);
            assert_eq!(Vec2::new(-100.0, 100.0), to);
            assert!((through.x + 150.0).abs() < 1e-9);
            assert!((through.y - 50.0).abs() < 1e-9);
        }
        ref other => panic!("expected an arc, got {other:?}"),
    }
}

#[test]
fn stretched_insert_flattens_arcs_and_drops_bars() {
    let entities = DxfSource::from_drawing(drawing_with_scaled_cap(2.0, 1.0))
        .entities(&Selection::All)
        .unwrap();
    assert_eq!(1, entities.len());
    assert!(!entities.iter().any(|e| matches!(e, CadEntity::Point(_))));

    let outline = only_outline(&entities);
    assert_eq!(Vec2::new(200.0, 0.0), outline.vertices[1].pos);
    let edges = reconstruct_edges(&outline.vertices).unwrap();
    assert_eq!(4, edges.len());
    assert!(edges.iter().all(|e| matches!(e, Edge::Line { .. })));
}

#[test]
fn outline_coordinates_are_rounded_to_two_decimals() {
    let mut drawing = Drawing::new();
    drawing.add_entity(polyline(
        "C40",
        &[
            (0.004, 0.0, 0.0),
            (100.126, 0.0, 0.0),
            (100.126, 99.994, 0.0),
            (0.0, 99.994, 0.0),
        ],
    ));
    let entities = DxfSource::from_drawing(drawing)
        .entities(&Selection::All)
        .unwrap();
    let outline = only_outline(&entities);
    assert_eq!(Vec2::new(0.0, 0.0), outline.vertices[0].pos);
    assert_eq!(Vec2::new(100.13, 99.99), outline.vertices[2].pos);
}
