//! Movement collision queries
//!
//! The renderer's player lives in world space; collision happens on the
//! occupancy grid. A move is allowed when the cell one collision step ahead
//! (or behind) the player in the plane is floor.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::grid::OccupancyGrid;
use super::transform::{plane, WorldTransform};

/// Probe distance ahead of the player, in dungeon units
pub const COLLISION_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    Forward,
    Backward,
}

impl MoveDirection {
    fn sign(self) -> f32 {
        match self {
            MoveDirection::Forward => 1.0,
            MoveDirection::Backward => -1.0,
        }
    }
}

/// Unit heading in the dungeon plane from `current` toward `look_at`
///
/// Zero when the two points coincide in the plane.
pub fn heading(current: Vec3, look_at: Vec3) -> Vec2 {
    (plane(look_at) - plane(current)).normalize_or_zero()
}

/// Tracks where the player is and the last place they were free to move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerTracker {
    world: Vec3,
    dungeon: Vec3,
    last_free: Vec3,
}

impl PlayerTracker {
    pub fn new(world: Vec3, transform: &WorldTransform) -> Self {
        Self {
            world,
            dungeon: transform.player_position(world),
            last_free: world,
        }
    }

    /// Update the tracked position from the renderer's world position
    pub fn set_position(&mut self, world: Vec3, transform: &WorldTransform) {
        self.world = world;
        self.dungeon = transform.player_position(world);
    }

    pub fn world_position(&self) -> Vec3 {
        self.world
    }

    /// Tracked position in dungeon space, on the eye plane
    pub fn dungeon_position(&self) -> Vec3 {
        self.dungeon
    }

    /// World position of the most recent successful move check
    pub fn last_free_position(&self) -> Vec3 {
        self.last_free
    }

    /// Check whether one step in `direction` stays on floor
    ///
    /// `look_at` and `current` are world-space points; the step follows the
    /// view heading projected onto the plane. On success the pre-step
    /// position is remembered as the last free position.
    pub fn can_move(
        &mut self,
        grid: &OccupancyGrid,
        transform: &WorldTransform,
        look_at: Vec3,
        current: Vec3,
        direction: MoveDirection,
    ) -> bool {
        self.set_position(current, transform);

        let look = transform.world_to_dungeon(look_at);
        let step = heading(self.dungeon, look) * COLLISION_STEP * direction.sign();
        let target = plane(self.dungeon) + step;

        let free = grid.is_walkable(target);
        if free {
            self.last_free = current;
        }
        free
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::transform::GridMapping;

    fn setup() -> (OccupancyGrid, WorldTransform) {
        let mut grid = OccupancyGrid::new(100, 100, 10.0);
        grid.try_reserve(Vec2::ZERO, Vec2::new(2.0, 2.0)).unwrap();
        grid.mark_wall_segment(Vec2::new(1.0, 1.0), Vec2::new(1.0, -1.0));
        let transform = WorldTransform::new(20.0, Vec3::splat(10.0), GridMapping::centered(10.0, 100, 100));
        (grid, transform)
    }

    #[test]
    fn test_heading_ignores_height() {
        let h = heading(Vec3::new(0.0, 0.1, 0.0), Vec3::new(3.0, 5.0, 4.0));
        assert!((h - Vec2::new(0.6, 0.8)).length() < 1e-5);
        assert_eq!(heading(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)), Vec2::ZERO);
    }

    #[test]
    fn test_open_floor_allows_movement() {
        let (grid, t) = setup();
        let current = t.dungeon_to_world(Vec3::new(0.0, 0.1, 0.0));
        let look = t.dungeon_to_world(Vec3::new(0.0, 0.1, 1.0));
        let mut tracker = PlayerTracker::new(current, &t);

        assert!(tracker.can_move(&grid, &t, look, current, MoveDirection::Forward));
        assert!(tracker.can_move(&grid, &t, look, current, MoveDirection::Backward));
        assert_eq!(tracker.last_free_position(), current);
    }

    #[test]
    fn test_wall_ahead_blocks_and_keeps_last_free() {
        let (grid, t) = setup();
        let free = t.dungeon_to_world(Vec3::new(0.5, 0.1, 0.0));
        let mut tracker = PlayerTracker::new(free, &t);

        // 0.1 short of the wall at x = 1.0, looking straight at it
        let current = t.dungeon_to_world(Vec3::new(0.9, 0.1, 0.0));
        let look = t.dungeon_to_world(Vec3::new(2.0, 0.1, 0.0));
        assert!(!tracker.can_move(&grid, &t, look, current, MoveDirection::Forward));
        assert_eq!(tracker.last_free_position(), free);

        // Backing away is fine
        assert!(tracker.can_move(&grid, &t, look, current, MoveDirection::Backward));
        assert_eq!(tracker.last_free_position(), current);
    }

    #[test]
    fn test_off_grid_blocks() {
        let (grid, t) = setup();
        let current = t.dungeon_to_world(Vec3::new(40.0, 0.1, 0.0));
        let look = t.dungeon_to_world(Vec3::new(41.0, 0.1, 0.0));
        let mut tracker = PlayerTracker::new(current, &t);
        assert!(!tracker.can_move(&grid, &t, look, current, MoveDirection::Forward));
    }

    #[test]
    fn test_tracker_pins_eye_height() {
        let (_, t) = setup();
        let tracker = PlayerTracker::new(Vec3::new(30.0, 99.0, 10.0), &t);
        assert_eq!(tracker.dungeon_position(), Vec3::new(1.0, 0.1, 0.0));
    }
}
