//! Game module - the explorable session around a generated dungeon

mod motion;
mod state;
mod time;

pub use motion::Motion;
pub use state::{FrameInput, Game};
pub use time::FrameClock;
