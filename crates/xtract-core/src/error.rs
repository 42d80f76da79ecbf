use crate::geom::Vec2;
use crate::template::CommandKind;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SectionError {
    #[error("unsupported shape kind: {0:?}")]
    UnsupportedShape(String),

    #[error("shape {kind} expects {expected} parameter(s), got {got}")]
    ShapeParameters {
        kind: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("sampling spacing must be a positive number, got {0}")]
    InvalidSpacing(f64),

    #[error("spacing {spacing} is too fine for a segment of length {length}")]
    TooManySamples { length: f64, spacing: f64 },

    #[error("vertex {index} carries a bulge that cannot describe an edge: {bulge}")]
    MalformedEdge { index: usize, bulge: f64 },

    #[error("outline on layer {layer:?} does not enclose an area")]
    DegenerateOutline { layer: String },

    #[error("selection contains no outline")]
    EmptySelection,

    #[error(
        "outline {index} (layer {layer:?}) lies outside the main profile: centroid ({}, {})",
        .centroid.x,
        .centroid.y
    )]
    ContainmentViolation {
        index: usize,
        layer: String,
        centroid: Vec2,
    },

    #[error("invalid increment variable {0:?}; expected IncAxial, IncMxx or IncMyy")]
    InvalidIncrement(String),

    #[error("template set has no {0} template")]
    MissingTemplate(CommandKind),

    #[error("{kind} template is malformed at byte {offset}: {reason}")]
    TemplateSyntax {
        kind: CommandKind,
        offset: usize,
        reason: &'static str,
    },

    #[error("{kind} template uses unknown placeholder {{{name}}}")]
    UnknownPlaceholder { kind: CommandKind, name: String },

    #[error("{kind} template does not use placeholder {{{name}}}")]
    MissingPlaceholder { kind: CommandKind, name: &'static str },

    #[error("entity source failed")]
    Source(#[source] BoxError),
}

pub type Result<T> = std::result::Result<T, SectionError>;
