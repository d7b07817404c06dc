//! Wall synthesis
//!
//! Every floor piece gets a wall on each of its four sides. Sides carrying a
//! door are split into two segments around a gap centered on the side.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::grid::OccupancyGrid;
use super::piece::{Piece, PieceId, TextureId};

/// Wall height in dungeon units
pub const WALL_HEIGHT: f32 = 1.5;

/// Half the width of the opening left for a door
pub const DOOR_GAP_HALF_WIDTH: f32 = 0.3;

/// Axis a wall segment runs along in the dungeon plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallAxis {
    X,
    Z,
}

/// One vertical wall quad standing on a piece's edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    pub owner: PieceId,
    pub side: Direction,
    /// Plane endpoints (x, z)
    pub start: Vec2,
    pub end: Vec2,
    /// Half of a wall split around a door gap
    pub split: bool,
}

impl WallSegment {
    pub fn axis(&self) -> WallAxis {
        if self.side.is_horizontal() {
            WallAxis::Z
        } else {
            WallAxis::X
        }
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Normal facing into the owning piece
    pub fn normal(&self) -> Vec3 {
        match self.side {
            Direction::Up => Vec3::new(0.0, 0.0, -1.0),
            Direction::Right => Vec3::new(-1.0, 0.0, 0.0),
            Direction::Down => Vec3::new(0.0, 0.0, 1.0),
            Direction::Left => Vec3::new(1.0, 0.0, 0.0),
        }
    }

    pub fn texture(&self) -> TextureId {
        TextureId::StoneWall
    }

    pub fn texture_scale(&self) -> Vec2 {
        if self.split {
            Vec2::new(1.0, 2.0)
        } else {
            Vec2::new(2.0, 2.0)
        }
    }

    /// Quad corners in dungeon space: bottom-start, top-start, top-end, bottom-end
    pub fn corners(&self) -> [Vec3; 4] {
        [
            Vec3::new(self.start.x, 0.0, self.start.y),
            Vec3::new(self.start.x, WALL_HEIGHT, self.start.y),
            Vec3::new(self.end.x, WALL_HEIGHT, self.end.y),
            Vec3::new(self.end.x, 0.0, self.end.y),
        ]
    }
}

/// Corner-to-corner span of one side, wound clockwise seen from above
fn side_span(piece: &Piece, side: Direction) -> (Vec2, Vec2) {
    let (min, max) = (piece.min(), piece.max());
    match side {
        Direction::Up => (Vec2::new(min.x, max.y), Vec2::new(max.x, max.y)),
        Direction::Right => (Vec2::new(max.x, max.y), Vec2::new(max.x, min.y)),
        Direction::Down => (Vec2::new(max.x, min.y), Vec2::new(min.x, min.y)),
        Direction::Left => (Vec2::new(min.x, min.y), Vec2::new(min.x, max.y)),
    }
}

/// Walls for a single floor piece
pub fn piece_walls(owner: PieceId, piece: &Piece) -> Vec<WallSegment> {
    let mut walls = Vec::with_capacity(5);
    for side in Direction::ALL {
        let (from, to) = side_span(piece, side);
        if !piece.doors[side] {
            walls.push(WallSegment {
                owner,
                side,
                start: from,
                end: to,
                split: false,
            });
            continue;
        }

        let mid = piece.side_midpoint(side);
        let along = (to - from).normalize_or_zero();
        let gap = along * DOOR_GAP_HALF_WIDTH;
        for (start, end) in [(from, mid - gap), (mid + gap, to)] {
            walls.push(WallSegment {
                owner,
                side,
                start,
                end,
                split: true,
            });
        }
    }
    walls
}

/// Walls for every floor piece, in piece order
pub fn build_walls(pieces: &[Piece]) -> Vec<WallSegment> {
    pieces
        .iter()
        .enumerate()
        .flat_map(|(i, piece)| piece_walls(PieceId(i), piece))
        .collect()
}

/// Stamp wall segments into the grid so they block movement
pub fn register_walls(grid: &mut OccupancyGrid, walls: &[WallSegment]) -> usize {
    walls
        .iter()
        .map(|wall| grid.mark_wall_segment(wall.start, wall.end))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::direction::Sides;
    use crate::dungeon::grid::Cell;
    use crate::dungeon::piece::PieceType;

    #[test]
    fn test_closed_piece_has_four_walls() {
        let walls = piece_walls(PieceId(0), &Piece::entrance(Vec2::ZERO));
        assert_eq!(walls.len(), 4);
        assert!(walls.iter().all(|w| !w.split));
        assert!(walls.iter().all(|w| (w.length() - 2.0).abs() < 1e-5));
        assert!(walls.iter().all(|w| w.texture_scale() == Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn test_door_side_is_split_around_gap() {
        let mut piece = Piece::entrance(Vec2::ZERO);
        piece.doors[Direction::Right] = true;

        let walls = piece_walls(PieceId(0), &piece);
        assert_eq!(walls.len(), 5);

        let right: Vec<_> = walls.iter().filter(|w| w.side == Direction::Right).collect();
        assert_eq!(right.len(), 2);
        assert_eq!(right[0].start, Vec2::new(1.0, 1.0));
        assert!((right[0].end - Vec2::new(1.0, 0.3)).length() < 1e-5);
        assert!((right[1].start - Vec2::new(1.0, -0.3)).length() < 1e-5);
        assert_eq!(right[1].end, Vec2::new(1.0, -1.0));
        assert!(right.iter().all(|w| w.axis() == WallAxis::Z && w.split));
        assert_eq!(right[0].texture_scale(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_normals_face_inward() {
        let piece = Piece::entrance(Vec2::ZERO);
        for wall in piece_walls(PieceId(0), &piece) {
            let mid = (wall.start + wall.end) * 0.5;
            let inward = piece.center - mid;
            let n = wall.normal();
            assert!(inward.dot(Vec2::new(n.x, n.z)) > 0.0, "{:?}", wall.side);
        }
    }

    #[test]
    fn test_registered_walls_leave_door_gap_open() {
        let mut grid = OccupancyGrid::new(100, 100, 10.0);
        let entrance = Piece::entrance(Vec2::ZERO);
        grid.try_reserve(entrance.center, entrance.size()).unwrap();

        let size = Vec2::new(2.0, 1.0);
        let center = entrance.abutting_center(Direction::Right, size);
        grid.try_reserve(center, size).unwrap();
        let mut corridor = Piece::grown(
            PieceType::HorizontalCorridor,
            center,
            size,
            PieceId(0),
            Direction::Right,
            1,
            Sides::splat(false),
        );
        corridor.exits = Sides::splat(false);
        let mut entrance = entrance;
        entrance.doors[Direction::Right] = true;

        let walls = build_walls(&[entrance, corridor]);
        assert!(register_walls(&mut grid, &walls) > 0);

        // Doorway between the two pieces is walkable, the wall beside it is not
        assert!(grid.is_walkable(Vec2::new(1.0, 0.0)));
        assert!(!grid.is_walkable(Vec2::new(1.0, 0.6)));
        // Far end of the corridor is closed
        assert_eq!(grid.cell_at(Vec2::new(3.0, 0.0)), Some(Cell::Wall));
    }
}
