use crate::dialect::num;
use crate::error::Result;
use crate::section::SectionModel;
use crate::template::{CommandKind, TemplateSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialDef {
    /// Concrete without confinement; `strength` in MPa.
    UnconfinedConcrete { name: String, strength: f64 },
    /// Elastic-perfectly-plastic steel; `stress` is the yield stress in MPa.
    BilinearRebar { name: String, stress: f64 },
}

impl MaterialDef {
    pub fn name(&self) -> &str {
        match self {
            MaterialDef::UnconfinedConcrete { name, .. } => name,
            MaterialDef::BilinearRebar { name, .. } => name,
        }
    }
}

/// Whole output file: a header, the material definitions, then one block per
/// section, in the order they were added.
#[derive(Debug, Clone)]
pub struct Project<'t> {
    templates: &'t TemplateSet,
    header: String,
    materials: Vec<String>,
    sections: Vec<String>,
}

impl<'t> Project<'t> {
    pub fn new(templates: &'t TemplateSet, name: &str) -> Result<Self> {
        let header = templates.render(CommandKind::Global, &[("name", name)])?;
        Ok(Self {
            templates,
            header,
            materials: Vec::new(),
            sections: Vec::new(),
        })
    }

    pub fn add_material(&mut self, material: &MaterialDef) -> Result<()> {
        let cmd = match material {
            MaterialDef::UnconfinedConcrete { name, strength } => self.templates.render(
                CommandKind::UnconfinedConcrete,
                &[("name", name.as_str()), ("strength", num(*strength).as_str())],
            )?,
            MaterialDef::BilinearRebar { name, stress } => self.templates.render(
                CommandKind::BilinearRebar,
                &[("name", name.as_str()), ("stress", num(*stress).as_str())],
            )?,
        };
        self.materials.push(cmd);
        Ok(())
    }

    pub fn add_materials<'m>(
        &mut self,
        materials: impl IntoIterator<Item = &'m MaterialDef>,
    ) -> Result<()> {
        for m in materials {
            self.add_material(m)?;
        }
        Ok(())
    }

    pub fn add_section(&mut self, section: &SectionModel<'_>) -> Result<()> {
        let boundary = num(section.boundary);
        let shapes = section.shapes.join("\n");
        let rebars = section.rebars.join("\n");
        let loadings = section.loadings.join("\n");
        let cmd = self.templates.render(
            CommandKind::Section,
            &[
                ("name", section.name.as_str()),
                ("boundary", boundary.as_str()),
                ("shape_part", shapes.as_str()),
                ("rebar_part", rebars.as_str()),
                ("loading_part", loadings.as_str()),
            ],
        )?;
        self.sections.push(cmd);
        Ok(())
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn command_stream(&self) -> String {
        std::iter::once(&self.header)
            .chain(&self.materials)
            .chain(&self.sections)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
