mod event;
mod group;
mod input;

pub use event::*;
pub use group::*;
pub use input::*;
