//! Coordinate transforms
//!
//! Three spaces are in play:
//! - world space: what the renderer draws, the dungeon scaled up and shifted
//! - dungeon space: the generator's own units (pieces are a few units wide)
//! - grid space: integer cell indices into the occupancy grid
//!
//! Every conversion goes through `WorldTransform` so collision and visuals
//! cannot drift apart.

use glam::{IVec2, Vec2, Vec3};

/// Cell boundaries are nudged by this many cells so values that should land
/// exactly on a boundary (e.g. 0.3 * 10) do not fall one cell short
const CELL_EPSILON: f32 = 1e-3;

/// Height of the player's eye plane in dungeon space
pub const EYE_HEIGHT: f32 = 0.1;

/// Drop the vertical component: world/dungeon (x, y, z) -> plane (x, z)
pub fn plane(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Dungeon-space plane <-> grid cell mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapping {
    pub cells_per_unit: f32,
    /// Cell index of the dungeon origin; keeps indices non-negative
    pub offset: IVec2,
}

impl GridMapping {
    /// Mapping for a `width` x `height` grid centered on the dungeon origin
    pub fn centered(cells_per_unit: f32, width: i32, height: i32) -> Self {
        Self {
            cells_per_unit,
            offset: IVec2::new(width / 2, height / 2),
        }
    }

    /// Cell index along one axis, before the offset is applied
    #[inline]
    pub fn axis_to_cell(&self, v: f32) -> i32 {
        (v * self.cells_per_unit + CELL_EPSILON).floor() as i32
    }

    /// Length in whole cells
    #[inline]
    pub fn extent_to_cells(&self, len: f32) -> i32 {
        (len * self.cells_per_unit).round() as i32
    }

    /// Cell containing a dungeon-plane point
    pub fn to_cell(&self, p: Vec2) -> IVec2 {
        IVec2::new(self.axis_to_cell(p.x), self.axis_to_cell(p.y)) + self.offset
    }

    /// Dungeon-plane center of a cell
    pub fn cell_center(&self, cell: IVec2) -> Vec2 {
        ((cell - self.offset).as_vec2() + Vec2::splat(0.5)) / self.cells_per_unit
    }

    /// Size of one cell in dungeon units
    pub fn cell_size(&self) -> f32 {
        1.0 / self.cells_per_unit
    }
}

/// World <-> dungeon <-> grid transform
///
/// Rendering draws the dungeon as `world = dungeon * scale + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub scale: f32,
    pub translation: Vec3,
    pub grid: GridMapping,
}

impl WorldTransform {
    pub fn new(scale: f32, translation: Vec3, grid: GridMapping) -> Self {
        Self {
            scale,
            translation,
            grid,
        }
    }

    pub fn dungeon_to_world(&self, p: Vec3) -> Vec3 {
        p * self.scale + self.translation
    }

    pub fn world_to_dungeon(&self, p: Vec3) -> Vec3 {
        (p - self.translation) / self.scale
    }

    /// Player position in dungeon space, pinned to the eye plane
    pub fn player_position(&self, world: Vec3) -> Vec3 {
        let p = self.world_to_dungeon(world);
        Vec3::new(p.x, EYE_HEIGHT, p.z)
    }

    pub fn world_to_cell(&self, world: Vec3) -> IVec2 {
        self.grid.to_cell(plane(self.world_to_dungeon(world)))
    }

    /// World position of a cell center at world height `y`
    pub fn cell_to_world(&self, cell: IVec2, y: f32) -> Vec3 {
        let c = self.grid.cell_center(cell);
        let mut world = self.dungeon_to_world(Vec3::new(c.x, 0.0, c.y));
        world.y = y;
        world
    }

    /// Size of one cell in world units
    pub fn world_cell_size(&self) -> f32 {
        self.grid.cell_size() * self.scale
    }
}
