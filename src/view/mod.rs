mod dirty;
mod element;
mod flow;
mod properties;
mod resolver;
mod scissor;
mod text;
mod transform;
mod tree;
mod viewport;

pub use dirty::*;
pub use element::*;
pub use resolver::CHILD_Z_EPSILON;
pub use text::*;
pub use transform::*;
pub use tree::*;
pub use viewport::*;
