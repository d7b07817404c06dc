//! Occupancy grid
//!
//! A dense 2D field over the dungeon plane. Generation reserves piece
//! footprints in it to reject overlaps; afterwards walls are stamped in and
//! the player's movement is checked against it every frame.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::transform::GridMapping;

/// State of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Never reserved by any piece
    #[default]
    Unvisited,
    /// Inside a committed piece's footprint
    Floor,
    /// On a registered wall segment
    Wall,
}

impl Cell {
    pub fn is_walkable(&self) -> bool {
        matches!(self, Cell::Floor)
    }

    /// Anything a new footprint may not overlap
    pub fn is_filled(&self) -> bool {
        !matches!(self, Cell::Unvisited)
    }
}

/// Fatal grid failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// The footprint maps outside the grid: the grid is too small for the
    /// requested dungeon
    #[error(
        "grid exhausted: cells {start:?}..={end:?} fall outside the {width}x{height} grid"
    )]
    Exhausted {
        start: (i32, i32),
        end: (i32, i32),
        width: i32,
        height: i32,
    },
}

/// Inclusive cell rectangle covered by a footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub start: IVec2,
    pub end: IVec2,
}

impl CellRect {
    /// Iterate every cell in the rectangle, inclusive
    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        (self.start.y..=self.end.y)
            .flat_map(move |z| (self.start.x..=self.end.x).map(move |x| IVec2::new(x, z)))
    }

    /// Iterate the cells that are not on the 1-cell border
    pub fn interior(&self) -> impl Iterator<Item = IVec2> + '_ {
        (self.start.y + 1..self.end.y)
            .flat_map(move |z| (self.start.x + 1..self.end.x).map(move |x| IVec2::new(x, z)))
    }
}

/// Fixed-size grid of cells over the dungeon plane
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: i32,
    height: i32,
    mapping: GridMapping,
    cells: Vec<Cell>,
}

impl OccupancyGrid {
    /// Create an empty grid centered on the dungeon origin
    pub fn new(width: i32, height: i32, cells_per_unit: f32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            mapping: GridMapping::centered(cells_per_unit, width, height),
            cells: vec![Cell::Unvisited; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn mapping(&self) -> GridMapping {
        self.mapping
    }

    #[inline]
    fn idx(&self, x: i32, z: i32) -> usize {
        (z * self.width + x) as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, z: i32) -> bool {
        x >= 0 && x < self.width && z >= 0 && z < self.height
    }

    /// Cell at grid indices, `None` when off the grid
    pub fn get(&self, x: i32, z: i32) -> Option<Cell> {
        if self.in_bounds(x, z) {
            Some(self.cells[self.idx(x, z)])
        } else {
            None
        }
    }

    fn set(&mut self, x: i32, z: i32, cell: Cell) {
        if self.in_bounds(x, z) {
            let idx = self.idx(x, z);
            self.cells[idx] = cell;
        }
    }

    /// Cell under a dungeon-plane point
    pub fn cell_at(&self, point: Vec2) -> Option<Cell> {
        let c = self.mapping.to_cell(point);
        self.get(c.x, c.y)
    }

    /// Off-grid points are never walkable
    pub fn is_walkable(&self, point: Vec2) -> bool {
        self.cell_at(point).is_some_and(|c| c.is_walkable())
    }

    /// Cell rectangle for a footprint
    ///
    /// The lower bound rounds down (half-width floored in cells) so
    /// neighbouring footprints share their touching row of cells.
    pub fn footprint_rect(&self, center: Vec2, size: Vec2) -> CellRect {
        let k = self.mapping.cells_per_unit;
        let cells = IVec2::new(
            self.mapping.extent_to_cells(size.x),
            self.mapping.extent_to_cells(size.y),
        );
        let c = center * k;
        let start = IVec2::new(
            (c.x - (cells.x / 2) as f32 + 1e-3).floor() as i32,
            (c.y - (cells.y / 2) as f32 + 1e-3).floor() as i32,
        );
        let end = IVec2::new(
            (c.x + cells.x as f32 * 0.5 + 1e-3).floor() as i32,
            (c.y + cells.y as f32 * 0.5 + 1e-3).floor() as i32,
        );
        CellRect {
            start: start + self.mapping.offset,
            end: end + self.mapping.offset,
        }
    }

    /// Try to claim a footprint
    ///
    /// Returns `Ok(false)` without touching the grid when the footprint's
    /// interior overlaps a filled cell; `Ok(true)` after filling every cell
    /// of the footprint. A footprint reaching off the grid is fatal.
    pub fn try_reserve(&mut self, center: Vec2, size: Vec2) -> Result<bool, GridError> {
        let rect = self.footprint_rect(center, size);
        if !self.in_bounds(rect.start.x, rect.start.y) || !self.in_bounds(rect.end.x, rect.end.y) {
            return Err(GridError::Exhausted {
                start: (rect.start.x, rect.start.y),
                end: (rect.end.x, rect.end.y),
                width: self.width,
                height: self.height,
            });
        }

        let blocked = rect
            .interior()
            .any(|c| self.cells[self.idx(c.x, c.y)].is_filled());
        if blocked {
            return Ok(false);
        }

        for c in rect.cells() {
            self.set(c.x, c.y, Cell::Floor);
        }
        Ok(true)
    }

    /// Stamp a wall segment running between two dungeon-plane points
    ///
    /// The segment runs along whichever axis its endpoints differ on; cells
    /// between them (inclusive) at the fixed lateral cell become `Wall`.
    /// Returns the number of cells marked.
    pub fn mark_wall_segment(&mut self, start: Vec2, end: Vec2) -> usize {
        let a = self.mapping.to_cell(start);
        let b = self.mapping.to_cell(end);
        let along_x = (start.y - end.y).abs() <= (start.x - end.x).abs();

        let cells: Vec<IVec2> = if along_x {
            (a.x.min(b.x)..=a.x.max(b.x)).map(|x| IVec2::new(x, a.y)).collect()
        } else {
            (a.y.min(b.y)..=a.y.max(b.y)).map(|z| IVec2::new(a.x, z)).collect()
        };

        let mut marked = 0;
        for c in cells {
            if self.in_bounds(c.x, c.y) {
                self.set(c.x, c.y, Cell::Wall);
                marked += 1;
            } else {
                log::warn!("Wall cell ({}, {}) is off the grid, skipping", c.x, c.y);
            }
        }
        marked
    }

    /// Number of cells in the given state
    pub fn count(&self, state: Cell) -> usize {
        self.cells.iter().filter(|c| **c == state).count()
    }

    /// Smallest cell rectangle containing every filled cell
    pub fn filled_bounds(&self) -> Option<CellRect> {
        let mut bounds: Option<CellRect> = None;
        for z in 0..self.height {
            for x in 0..self.width {
                if !self.cells[self.idx(x, z)].is_filled() {
                    continue;
                }
                let p = IVec2::new(x, z);
                bounds = Some(match bounds {
                    Some(b) => CellRect {
                        start: b.start.min(p),
                        end: b.end.max(p),
                    },
                    None => CellRect { start: p, end: p },
                });
            }
        }
        bounds
    }
}
