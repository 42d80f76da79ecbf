use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use xtract_core::model::Selection;
use xtract_core::project::MaterialDef;
use xtract_core::section::{HollowRectangle, IncrementVariable};
use xtract_core::template::TemplateSet;

/// Template file: one `[commands]` table mapping command kinds to templates.
#[derive(Debug, Deserialize)]
struct TemplateFile {
    commands: BTreeMap<String, String>,
}

pub fn parse_templates(text: &str) -> Result<TemplateSet> {
    let file: TemplateFile = toml::from_str(text).context("parse template file")?;
    TemplateSet::new(file.commands).context("validate templates")
}

pub fn load_templates(path: &Path) -> Result<TemplateSet> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read templates: {path:?}"))?;
    parse_templates(&text).with_context(|| format!("templates: {path:?}"))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    pub name: String,
    /// DXF drawing for `cad` sections, relative to the project file.
    #[serde(default)]
    pub drawing: Option<PathBuf>,
    #[serde(default)]
    pub materials: Vec<MaterialDef>,
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionSpec {
    pub name: String,
    pub boundary: f64,
    pub geometry: SectionGeometry,
    #[serde(default)]
    pub loadings: Vec<LoadingCase>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SectionGeometry {
    /// Outlines and bars read from the drawing.
    Cad {
        selection: Selection,
        #[serde(default)]
        mesh_size: Option<f64>,
    },
    HollowRectangle {
        dims: HollowRectangle,
        /// `[concrete, rebar]`
        materials: [String; 2],
    },
}

fn positive() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadingCase {
    MomentCurvature {
        name: String,
        axial: f64,
        mxx: f64,
        myy: f64,
        inc: IncrementVariable,
        #[serde(default = "positive")]
        positive: bool,
    },
    PmInteraction {
        name: String,
        full_or_half: String,
        angle: f64,
    },
    CapacityOrbit {
        name: String,
        load: f64,
    },
}

impl ProjectFile {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse project file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).with_context(|| format!("read project: {path:?}"))?;
        let mut project = Self::parse(&text).with_context(|| format!("project: {path:?}"))?;
        if let (Some(drawing), Some(dir)) = (&project.drawing, path.parent()) {
            if drawing.is_relative() {
                project.drawing = Some(dir.join(drawing));
            }
        }
        Ok(project)
    }

    pub fn needs_drawing(&self) -> bool {
        self.sections
            .iter()
            .any(|s| matches!(s.geometry, SectionGeometry::Cad { .. }))
    }
}
