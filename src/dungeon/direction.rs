//! Side directions
//!
//! Pieces grow into each other through one of four sides. `Sides<T>` is a
//! small per-side table used for exit flags, door flags and neighbor links.

use std::ops::{Index, IndexMut};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One side of a rectangular piece in the dungeon plane
///
/// Left/Right run along X, Up/Down run along Z (the plane's second axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    /// All four sides in table order
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];

    /// Order in which a freshly committed piece grows its exits
    pub const GROWTH_ORDER: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Down,
        Direction::Up,
    ];

    /// Order in which the entrance grows its exits
    pub const ENTRANCE_ORDER: [Direction; 4] = [
        Direction::Right,
        Direction::Up,
        Direction::Left,
        Direction::Down,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// True for Left/Right (growth along X)
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Unit step in the dungeon plane
    pub fn offset(self) -> Vec2 {
        match self {
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::Up => Vec2::new(0.0, 1.0),
            Direction::Down => Vec2::new(0.0, -1.0),
        }
    }

    fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Up => 1,
            Direction::Right => 2,
            Direction::Down => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
        }
    }
}

/// A value for each of the four sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sides<T> {
    values: [T; 4],
}

impl<T: Copy> Sides<T> {
    pub fn splat(value: T) -> Self {
        Self { values: [value; 4] }
    }

    /// Iterate `(side, value)` pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (Direction, T)> + '_ {
        Direction::ALL.iter().map(move |&d| (d, self[d]))
    }
}

impl Sides<bool> {
    /// Number of sides set to true
    pub fn count(&self) -> usize {
        self.values.iter().filter(|v| **v).count()
    }

    /// Sides set to true, in the given order
    pub fn enabled_in(&self, order: &[Direction]) -> Vec<Direction> {
        order.iter().copied().filter(|&d| self[d]).collect()
    }
}

impl<T> Index<Direction> for Sides<T> {
    type Output = T;

    fn index(&self, dir: Direction) -> &T {
        &self.values[dir.index()]
    }
}

impl<T> IndexMut<Direction> for Sides<T> {
    fn index_mut(&mut self, dir: Direction) -> &mut T {
        &mut self.values[dir.index()]
    }
}
