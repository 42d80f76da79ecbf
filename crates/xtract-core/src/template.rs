//! Command templates with `{slot}` placeholders.
//!
//! A template set is supplied by the caller (usually read from a file) and is
//! checked once when it is built: every command kind must be present, and each
//! template must use exactly the slots the assembler fills for that kind.
//! Literal braces are written `{{` and `}}`.

use crate::error::{Result, SectionError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Global,
    UnconfinedConcrete,
    BilinearRebar,
    Section,
    Shape,
    MomentCurvature,
    PmInteraction,
    CapacityOrbit,
}

impl CommandKind {
    pub const ALL: [CommandKind; 8] = [
        CommandKind::Global,
        CommandKind::UnconfinedConcrete,
        CommandKind::BilinearRebar,
        CommandKind::Section,
        CommandKind::Shape,
        CommandKind::MomentCurvature,
        CommandKind::PmInteraction,
        CommandKind::CapacityOrbit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Global => "global",
            CommandKind::UnconfinedConcrete => "unconfined_concrete",
            CommandKind::BilinearRebar => "bilinear_rebar",
            CommandKind::Section => "section",
            CommandKind::Shape => "shape",
            CommandKind::MomentCurvature => "moment_curvature",
            CommandKind::PmInteraction => "pm_interaction",
            CommandKind::CapacityOrbit => "capacity_orbit",
        }
    }

    /// Slots the assembler fills for this kind.
    pub fn slots(&self) -> &'static [&'static str] {
        match self {
            CommandKind::Global => &["name"],
            CommandKind::UnconfinedConcrete => &["name", "strength"],
            CommandKind::BilinearRebar => &["name", "stress"],
            CommandKind::Section => &["name", "boundary", "shape_part", "rebar_part", "loading_part"],
            CommandKind::Shape => &["material", "mesh_size", "line_and_arc"],
            CommandKind::MomentCurvature => &[
                "name",
                "const_axial",
                "const_mxx",
                "const_myy",
                "inc",
                "direction",
            ],
            CommandKind::PmInteraction => &["name", "full_or_half", "angle"],
            CommandKind::CapacityOrbit => &["name", "load"],
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CommandKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        CommandKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Slot(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    kind: CommandKind,
    pieces: Vec<Piece>,
}

impl Template {
    pub fn parse(kind: CommandKind, source: &str) -> Result<Self> {
        let syntax = |offset: usize, reason: &'static str| SectionError::TemplateSyntax {
            kind,
            offset,
            reason,
        };
        let mut pieces = Vec::new();
        let mut text = String::new();
        let mut chars = source.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            match c {
                '{' if chars.next_if(|&(_, n)| n == '{').is_some() => text.push('{'),
                '}' if chars.next_if(|&(_, n)| n == '}').is_some() => text.push('}'),
                '}' => return Err(syntax(i, "unmatched '}'")),
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, n)) if n.is_ascii_alphanumeric() || n == '_' => name.push(n),
                            Some((j, _)) => return Err(syntax(j, "invalid placeholder character")),
                            None => return Err(syntax(i, "unclosed placeholder")),
                        }
                    }
                    if name.is_empty() {
                        return Err(syntax(i, "empty placeholder"));
                    }
                    if !text.is_empty() {
                        pieces.push(Piece::Text(std::mem::take(&mut text)));
                    }
                    pieces.push(Piece::Slot(name));
                }
                _ => text.push(c),
            }
        }
        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }

        let template = Self { kind, pieces };
        template.check_slots()?;
        Ok(template)
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Slot(name) => Some(name.as_str()),
            Piece::Text(_) => None,
        })
    }

    fn check_slots(&self) -> Result<()> {
        let slots = self.kind.slots();
        if let Some(name) = self.placeholders().find(|n| !slots.iter().any(|s| s == n)) {
            return Err(SectionError::UnknownPlaceholder {
                kind: self.kind,
                name: name.to_string(),
            });
        }
        if let Some(name) = slots
            .iter()
            .copied()
            .find(|s| !self.placeholders().any(|n| n == *s))
        {
            return Err(SectionError::MissingPlaceholder {
                kind: self.kind,
                name,
            });
        }
        Ok(())
    }

    /// Fills the slots from `values`. Slots were checked at parse time, so a
    /// value missing here renders as empty text.
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(t) => out.push_str(t),
                Piece::Slot(name) => {
                    if let Some((_, v)) = values.iter().find(|(k, _)| *k == name.as_str()) {
                        out.push_str(v);
                    }
                }
            }
        }
        out
    }
}

/// All command templates of one output dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    templates: BTreeMap<CommandKind, Template>,
}

impl TemplateSet {
    /// Builds and validates a set from `name -> template` pairs. Names that are
    /// not a known command kind are ignored.
    pub fn new<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut templates = BTreeMap::new();
        for (name, source) in entries {
            let name = name.as_ref();
            match name.parse::<CommandKind>() {
                Ok(kind) => {
                    templates.insert(kind, Template::parse(kind, source.as_ref())?);
                }
                Err(()) => warn!(name, "ignoring unknown command template"),
            }
        }
        if let Some(kind) = CommandKind::ALL
            .into_iter()
            .find(|k| !templates.contains_key(k))
        {
            return Err(SectionError::MissingTemplate(kind));
        }
        Ok(Self { templates })
    }

    pub fn get(&self, kind: CommandKind) -> Result<&Template> {
        self.templates
            .get(&kind)
            .ok_or(SectionError::MissingTemplate(kind))
    }

    pub fn render(&self, kind: CommandKind, values: &[(&str, &str)]) -> Result<String> {
        Ok(self.get(kind)?.render(values))
    }
}
