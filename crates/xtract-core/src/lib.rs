pub mod dialect;
pub mod edge;
pub mod error;
pub mod extract;
pub mod geom;
pub mod model;
pub mod project;
pub mod section;
pub mod shapes;
pub mod template;

pub use error::{Result, SectionError};
