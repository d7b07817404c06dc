//! Deepcrawl - procedural 3D dungeon generation and navigation
//!
//! Grows a dungeon of rooms and corridors from a single entrance, tracks
//! which ground is walkable in an occupancy grid and answers per-frame
//! collision queries for a first-person viewer.

pub mod config;
pub mod dungeon;
pub mod game;
pub mod render;
pub mod ui;

// Re-export commonly used types
pub use config::DungeonConfig;
pub use dungeon::{Dungeon, GenerationError, MoveDirection};
pub use game::{FrameInput, Game};
