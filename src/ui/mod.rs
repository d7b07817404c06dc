//! User Interface module
//!
//! Terminal front end: an overhead map of the dungeon and a status panel.

pub mod app;
pub mod widgets;

pub use app::App;
