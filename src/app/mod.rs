//! Viewer state: an immutable viewport reduced from events, and the command
//! interface controls use to drive it.

pub mod controller;
pub mod state;

pub use controller::{LayoutCommands, LayoutController};
pub use state::{reduce, Layout, LayoutEvent, ViewBox};
