//! Layout and input arbitration core for rfgui.
//!
//! Elements live in a [`UiTree`] arena. Style code mutates their [`Layout`]
//! records and tags them dirty, the [`Viewport`] stabilizes dirty trees once per
//! frame, regenerates clip rects, polls pointer input against the settled
//! geometry and finally lets the event [`Group`] pick a winner for each
//! contested pointer event.

mod config;
mod error;
pub mod style;
pub mod ui;
pub mod view;

pub use config::*;
pub use error::*;
pub use style::*;
pub use ui::*;
pub use view::*;
