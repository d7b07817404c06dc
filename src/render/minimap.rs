//! Overhead map
//!
//! Rasterizes the occupancy grid into rows of glyphs around a focus cell.
//! Each glyph summarizes an n x n block of cells; walls win over floor so
//! thin walls survive downsampling.

use glam::IVec2;

use crate::dungeon::{Cell, OccupancyGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinimapGlyph {
    Empty,
    Floor,
    Wall,
    Player,
}

impl MinimapGlyph {
    pub fn symbol(&self) -> char {
        match self {
            MinimapGlyph::Empty => ' ',
            MinimapGlyph::Floor => '.',
            MinimapGlyph::Wall => '#',
            MinimapGlyph::Player => '@',
        }
    }
}

/// View window over the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimap {
    /// Grid cell drawn at the center of the view
    pub focus: IVec2,
    /// Cells per glyph along each axis
    pub zoom: i32,
    pub cols: u16,
    pub rows: u16,
}

impl Minimap {
    pub fn new(focus: IVec2, zoom: i32, cols: u16, rows: u16) -> Self {
        Self {
            focus,
            zoom: zoom.max(1),
            cols,
            rows,
        }
    }

    fn summarize(grid: &OccupancyGrid, origin: IVec2, zoom: i32) -> MinimapGlyph {
        let mut glyph = MinimapGlyph::Empty;
        for dz in 0..zoom {
            for dx in 0..zoom {
                match grid.get(origin.x + dx, origin.y + dz) {
                    Some(Cell::Wall) => return MinimapGlyph::Wall,
                    Some(Cell::Floor) => glyph = MinimapGlyph::Floor,
                    _ => {}
                }
            }
        }
        glyph
    }

    /// Glyph rows, north (higher z) first
    ///
    /// The block containing `player` is drawn as the player marker.
    pub fn rasterize(&self, grid: &OccupancyGrid, player: Option<IVec2>) -> Vec<Vec<MinimapGlyph>> {
        let zoom = self.zoom.max(1);
        let half_cols = self.cols as i32 / 2;
        let half_rows = self.rows as i32 / 2;
        let focus_block = self.focus.div_euclid(IVec2::splat(zoom));
        let player_block = player.map(|p| p.div_euclid(IVec2::splat(zoom)));

        (0..self.rows as i32)
            .map(|row| {
                let block_z = focus_block.y + half_rows - row;
                (0..self.cols as i32)
                    .map(|col| {
                        let block = IVec2::new(focus_block.x - half_cols + col, block_z);
                        if Some(block) == player_block {
                            MinimapGlyph::Player
                        } else {
                            Self::summarize(grid, block * zoom, zoom)
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Plain-text rendition, one string per row
    pub fn render_lines(&self, grid: &OccupancyGrid, player: Option<IVec2>) -> Vec<String> {
        self.rasterize(grid, player)
            .iter()
            .map(|row| row.iter().map(|g| g.symbol()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn room_grid() -> OccupancyGrid {
        let mut grid = OccupancyGrid::new(100, 100, 10.0);
        grid.try_reserve(Vec2::ZERO, Vec2::new(2.0, 2.0)).unwrap();
        grid.mark_wall_segment(Vec2::new(-1.0, 1.0), Vec2::new(1.0, 1.0));
        grid
    }

    #[test]
    fn test_full_resolution_view() {
        let grid = room_grid();
        let map = Minimap::new(IVec2::new(50, 50), 1, 41, 41);
        let lines = map.render_lines(&grid, Some(IVec2::new(50, 50)));

        assert_eq!(lines.len(), 41);
        assert!(lines.iter().all(|l| l.chars().count() == 41));
        // Center holds the player, the wall at z cell 60 is ten rows up
        assert_eq!(lines[20].chars().nth(20), Some('@'));
        assert_eq!(lines[10].chars().nth(20), Some('#'));
        assert_eq!(lines[15].chars().nth(20), Some('.'));
        assert_eq!(lines[0].chars().nth(20), Some(' '));
    }

    #[test]
    fn test_downsampling_keeps_walls() {
        let grid = room_grid();
        let map = Minimap::new(IVec2::new(50, 50), 4, 11, 11);
        let rows = map.rasterize(&grid, None);
        let walls = rows.iter().flatten().filter(|g| **g == MinimapGlyph::Wall).count();
        assert!(walls >= 5, "walls lost while downsampling: {}", walls);
    }

    #[test]
    fn test_off_grid_is_empty() {
        let grid = room_grid();
        let map = Minimap::new(IVec2::new(-500, -500), 2, 5, 5);
        let rows = map.rasterize(&grid, None);
        assert!(rows.iter().flatten().all(|g| *g == MinimapGlyph::Empty));
    }
}
