mod anchor;
mod layout;

pub use anchor::*;
pub use layout::*;
