use crate::dialect::{line_block, num, rebar_block, rebar_line, RebarRecord};
use crate::error::{Result, SectionError};
use crate::extract::Section;
use crate::geom::Vec2;
use crate::shapes::{circle_area, perimeter_samples, rectangle_corners};
use crate::template::{CommandKind, TemplateSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Material key that makes the analysis tool cut a shape out instead of
/// filling it.
pub const VOID_MATERIAL: &str = "Delete";

/// Load step used when the axial force is incremented.
pub const AXIAL_INCREMENT: f64 = 4448.0;
/// Load step used when a moment is incremented.
pub const MOMENT_INCREMENT: f64 = 113.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IncrementVariable {
    Axial,
    MomentX,
    MomentY,
}

impl IncrementVariable {
    pub fn name(&self) -> &'static str {
        match self {
            IncrementVariable::Axial => "IncAxial",
            IncrementVariable::MomentX => "IncMxx",
            IncrementVariable::MomentY => "IncMyy",
        }
    }

    pub fn step(&self) -> f64 {
        match self {
            IncrementVariable::Axial => AXIAL_INCREMENT,
            IncrementVariable::MomentX | IncrementVariable::MomentY => MOMENT_INCREMENT,
        }
    }
}

impl fmt::Display for IncrementVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IncrementVariable {
    type Err = SectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "IncAxial" => Ok(IncrementVariable::Axial),
            "IncMxx" => Ok(IncrementVariable::MomentX),
            "IncMyy" => Ok(IncrementVariable::MomentY),
            _ => Err(SectionError::InvalidIncrement(s.to_string())),
        }
    }
}

impl TryFrom<String> for IncrementVariable {
    type Error = SectionError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<IncrementVariable> for String {
    fn from(v: IncrementVariable) -> String {
        v.name().to_string()
    }
}

/// Dimensions and bar layout of a rectangular hollow section, millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HollowRectangle {
    /// Outer `[width, height]`.
    pub outer: [f64; 2],
    /// Inner (void) `[width, height]`.
    pub inner: [f64; 2],
    pub cover: f64,
    pub outer_bar: f64,
    pub inner_bar: f64,
    pub outer_spacing: f64,
    pub inner_spacing: f64,
}

/// One section's worth of commands, filled in call order.
#[derive(Debug, Clone)]
pub struct SectionModel<'t> {
    templates: &'t TemplateSet,
    pub name: String,
    /// Passed through to the section template untouched.
    pub boundary: f64,
    pub shapes: Vec<String>,
    pub rebars: Vec<String>,
    pub loadings: Vec<String>,
}

impl<'t> SectionModel<'t> {
    pub fn new(templates: &'t TemplateSet, name: impl Into<String>, boundary: f64) -> Self {
        Self {
            templates,
            name: name.into(),
            boundary,
            shapes: Vec::new(),
            rebars: Vec::new(),
            loadings: Vec::new(),
        }
    }

    pub fn add_shape(&mut self, material: &str, mesh_size: f64, line_and_arc: &str) -> Result<()> {
        let mesh_size = num(mesh_size);
        let cmd = self.templates.render(
            CommandKind::Shape,
            &[
                ("material", material),
                ("mesh_size", mesh_size.as_str()),
                ("line_and_arc", line_and_arc),
            ],
        )?;
        self.shapes.push(cmd);
        Ok(())
    }

    pub fn add_rebar_block(&mut self, block: impl Into<String>) {
        self.rebars.push(block.into());
    }

    /// Moment-curvature analysis with `inc` swept in the positive or negative
    /// direction while the other two actions stay at their given values.
    pub fn add_moment_curvature(
        &mut self,
        name: &str,
        axial: f64,
        mxx: f64,
        myy: f64,
        inc: IncrementVariable,
        positive: bool,
    ) -> Result<()> {
        let step = if positive { inc.step() } else { -inc.step() };
        let (axial, mxx, myy, step) = (num(axial), num(mxx), num(myy), num(step));
        let cmd = self.templates.render(
            CommandKind::MomentCurvature,
            &[
                ("name", name),
                ("const_axial", axial.as_str()),
                ("const_mxx", mxx.as_str()),
                ("const_myy", myy.as_str()),
                ("inc", inc.name()),
                ("direction", step.as_str()),
            ],
        )?;
        self.loadings.push(cmd);
        Ok(())
    }

    pub fn add_interaction(&mut self, name: &str, full_or_half: &str, angle: f64) -> Result<()> {
        let angle = num(angle);
        let cmd = self.templates.render(
            CommandKind::PmInteraction,
            &[("name", name), ("full_or_half", full_or_half), ("angle", angle.as_str())],
        )?;
        self.loadings.push(cmd);
        Ok(())
    }

    pub fn add_capacity_orbit(&mut self, name: &str, load: f64) -> Result<()> {
        let load = num(load);
        let cmd = self.templates.render(
            CommandKind::CapacityOrbit,
            &[("name", name), ("load", load.as_str())],
        )?;
        self.loadings.push(cmd);
        Ok(())
    }

    /// Solid outer rectangle, void inner rectangle and one ring of bars inside
    /// each face, all centered on the origin. `materials` is
    /// `[concrete, rebar]`.
    pub fn hollow_rectangle(&mut self, dims: &HollowRectangle, materials: [&str; 2]) -> Result<()> {
        let [concrete, steel] = materials;
        let mesh_size = (dims.outer[0] - dims.inner[0]).min(dims.outer[1] - dims.inner[1]) / 5.0;

        let outer = rectangle_corners(dims.outer[0], dims.outer[1]);
        let inner = rectangle_corners(dims.inner[0], dims.inner[1]);
        self.add_shape(concrete, mesh_size, &line_block(&outer))?;
        self.add_shape(VOID_MATERIAL, mesh_size, &line_block(&inner))?;

        let outer_offset = 2.0 * dims.cover + dims.outer_bar;
        let inner_offset = 2.0 * dims.cover + dims.inner_bar;
        let outer_ring =
            rectangle_corners(dims.outer[0] - outer_offset, dims.outer[1] - outer_offset);
        let inner_ring =
            rectangle_corners(dims.inner[0] + inner_offset, dims.inner[1] + inner_offset);

        for (ring, bar, spacing) in [
            (outer_ring, dims.outer_bar, dims.outer_spacing),
            (inner_ring, dims.inner_bar, dims.inner_spacing),
        ] {
            let points = perimeter_samples(&ring, spacing)?;
            debug!(section = %self.name, bars = points.len(), diameter = bar, "rebar ring");
            self.add_rebar_block(rebar_block(&points, circle_area(bar), steel, 0.0));
        }
        Ok(())
    }

    /// Adds the shapes and bars of an extracted section, moved so the primary
    /// outline's centroid sits at the origin. `mesh_size` overrides the one
    /// derived during extraction.
    pub fn build_from_extraction(
        &mut self,
        section: &Section,
        mesh_size: Option<f64>,
    ) -> Result<()> {
        let mesh_size = mesh_size.unwrap_or(section.mesh_size);
        let offset = Vec2::ORIGIN - section.center;

        for boundary in &section.boundaries {
            let body = boundary
                .edges
                .iter()
                .map(|e| e.translated(offset).to_dialect())
                .collect::<Vec<_>>()
                .join("\n");
            self.add_shape(&boundary.layer, mesh_size, &body)?;
        }

        let block = section
            .rebars
            .iter()
            .map(|r| {
                rebar_line(&RebarRecord {
                    pos: r.pos + offset,
                    area: r.area,
                    prestress: 0.0,
                    material: &r.material,
                })
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.add_rebar_block(block);
        debug!(
            section = %self.name,
            shapes = section.boundaries.len(),
            bars = section.rebars.len(),
            mesh_size,
            "section built from extraction"
        );
        Ok(())
    }
}
