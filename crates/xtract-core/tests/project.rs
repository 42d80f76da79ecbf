mod common;

use common::{bar, square, templates};
use xtract_core::extract::extract_section;
use xtract_core::project::{MaterialDef, Project};
use xtract_core::section::{HollowRectangle, IncrementVariable, SectionModel};
use xtract_core::template::TemplateSet;

fn materials() -> Vec<MaterialDef> {
    vec![
        MaterialDef::UnconfinedConcrete {
            name: "C40".to_string(),
            strength: 18.4,
        },
        MaterialDef::BilinearRebar {
            name: "HRB500".to_string(),
            stress: 415.0,
        },
    ]
}

fn assemble(templates: &TemplateSet) -> String {
    let mut project = Project::new(templates, "NupPier").unwrap();
    project.add_materials(&materials()).unwrap();

    let mut hollow = SectionModel::new(templates, "hollow_sec_1", 5000.0);
    hollow
        .hollow_rectangle(
            &HollowRectangle {
                outer: [3000.0, 3000.0],
                inner: [2000.0, 2000.0],
                cover: 75.0,
                outer_bar: 45.0,
                inner_bar: 45.0,
                outer_spacing: 100.0,
                inner_spacing: 100.0,
            },
            ["C40", "HRB500"],
        )
        .unwrap();
    hollow
        .add_moment_curvature("test_mc", -1.0, 1.0, 0.0, IncrementVariable::MomentX, true)
        .unwrap();
    project.add_section(&hollow).unwrap();

    let entities = vec![
        square("C40", 0.0, 0.0, 800.0),
        bar("HRB500", 100.0, 100.0, 12.5),
    ];
    let section = extract_section("cad_sec_2", &entities).unwrap();
    let mut cad = SectionModel::new(templates, "cad_sec_2", 3000.0);
    cad.build_from_extraction(&section, Some(100.0)).unwrap();
    cad.add_capacity_orbit("100kn_mm", -1000e3).unwrap();
    project.add_section(&cad).unwrap();

    project.command_stream()
}

#[test]
fn stream_is_header_then_materials_then_sections() {
    let templates = templates();
    let out = assemble(&templates);
    assert!(out.starts_with("Global Parameters\nName = NupPier\nEnd_Global\n"));

    let concrete = out.find("Fc = 18.4").unwrap();
    let steel = out.find("Fy = 415").unwrap();
    let hollow = out.find("Name = hollow_sec_1").unwrap();
    let cad = out.find("Name = cad_sec_2").unwrap();
    assert!(concrete < steel && steel < hollow && hollow < cad);

    assert!(out.contains("Boundary = 5000\n"));
    assert!(out.contains("IncMxx = 113"));
    assert!(out.contains("Type = Capacity Orbit"));
    assert!(out.ends_with("End_Section"));
}

#[test]
fn assembling_twice_gives_identical_bytes() {
    let templates = templates();
    assert_eq!(assemble(&templates), assemble(&templates));
}

#[test]
fn empty_project_is_just_the_header() {
    let templates = templates();
    let project = Project::new(&templates, "empty").unwrap();
    assert_eq!(0, project.material_count());
    assert_eq!(0, project.section_count());
    assert_eq!("Global Parameters\nName = empty\nEnd_Global", project.command_stream());
}

#[test]
fn materials_keep_their_names() {
    let names: Vec<_> = materials().iter().map(|m| m.name().to_string()).collect();
    assert_eq!(vec!["C40", "HRB500"], names);
}
