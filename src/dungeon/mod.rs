//! Dungeon generation and navigation
//!
//! A `Dungeon` owns the generated pieces, their doors, ceilings and walls,
//! the occupancy grid they were placed into and the transform relating it all
//! to render space. It is built once per seed and queried every frame.

pub mod collision;
pub mod direction;
pub mod generation;
pub mod grid;
pub mod piece;
pub mod transform;
pub mod walls;

pub use collision::{MoveDirection, PlayerTracker};
pub use direction::{Direction, Sides};
pub use generation::{GenerationError, GenerationStats, SpawnChances};
pub use grid::{Cell, GridError, OccupancyGrid};
pub use piece::{DoorOrientation, Piece, PieceId, PieceType, TextureId};
pub use transform::{GridMapping, WorldTransform};
pub use walls::WallSegment;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::DungeonConfig;
use transform::EYE_HEIGHT;

/// A generated, navigable dungeon
#[derive(Debug, Clone)]
pub struct Dungeon {
    pieces: Vec<Piece>,
    ceilings: Vec<Piece>,
    doors: Vec<Piece>,
    walls: Vec<WallSegment>,
    grid: OccupancyGrid,
    transform: WorldTransform,
    tracker: PlayerTracker,
    stats: GenerationStats,
    seed: Option<u64>,
}

/// Serializable snapshot of a dungeon's geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayout {
    pub seed: Option<u64>,
    pub pieces: Vec<Piece>,
    pub doors: Vec<Piece>,
    pub ceilings: Vec<Piece>,
    pub walls: Vec<WallSegment>,
    /// Asset each symbolic texture binds to by default
    pub textures: Vec<TextureBinding>,
    pub stats: GenerationStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureBinding {
    pub texture: TextureId,
    pub path: String,
}

impl Dungeon {
    /// Generate a dungeon with the given RNG
    ///
    /// On error nothing usable has been built; the caller should treat the
    /// dungeon as absent.
    pub fn generate<R: Rng>(config: &DungeonConfig, rng: &mut R) -> Result<Self, GenerationError> {
        config.validate()?;

        let mut grid = config.grid.build();
        let layout = generation::generate_layout(&config.generation, &mut grid, rng)
            .inspect_err(|e| log::error!("Dungeon generation aborted: {}", e))?;

        let walls = walls::build_walls(&layout.pieces);
        let wall_cells = walls::register_walls(&mut grid, &walls);
        log::debug!("Registered {} wall segments over {} cells", walls.len(), wall_cells);

        let transform = config.world_transform();
        let entrance = layout.pieces[0].center;
        let spawn = transform.dungeon_to_world(Vec3::new(entrance.x, EYE_HEIGHT, entrance.y));

        log::info!(
            "Generated dungeon: {} rooms, {} corridors, {} doors, {} walls ({} cells), depth {}",
            layout.stats.rooms,
            layout.stats.corridors,
            layout.stats.doors,
            walls.len(),
            wall_cells,
            layout.stats.deepest
        );

        Ok(Self {
            pieces: layout.pieces,
            ceilings: layout.ceilings,
            doors: layout.doors,
            walls,
            grid,
            transform,
            tracker: PlayerTracker::new(spawn, &transform),
            stats: layout.stats,
            seed: None,
        })
    }

    /// Generate a reproducible dungeon from a seed
    pub fn from_seed(config: &DungeonConfig, seed: u64) -> Result<Self, GenerationError> {
        log::info!("Generating dungeon with seed {}", seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut dungeon = Self::generate(config, &mut rng)?;
        dungeon.seed = Some(seed);
        Ok(dungeon)
    }

    /// Generate with the config's seed, or a fresh one
    pub fn new(config: &DungeonConfig) -> Result<Self, GenerationError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::from_seed(config, seed)
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Floor pieces; the first one is the entrance
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.0)
    }

    pub fn entrance(&self) -> &Piece {
        &self.pieces[0]
    }

    pub fn doors(&self) -> &[Piece] {
        &self.doors
    }

    pub fn ceilings(&self) -> &[Piece] {
        &self.ceilings
    }

    pub fn walls(&self) -> &[WallSegment] {
        &self.walls
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn transform(&self) -> &WorldTransform {
        &self.transform
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    /// World-space spawn point: the entrance center at eye height
    pub fn spawn_position(&self) -> Vec3 {
        let c = self.entrance().center;
        self.transform
            .dungeon_to_world(Vec3::new(c.x, EYE_HEIGHT, c.y))
    }

    /// Index of the floor piece containing a world-space point
    pub fn piece_at(&self, world: Vec3) -> Option<PieceId> {
        let p = transform::plane(self.transform.world_to_dungeon(world));
        self.pieces
            .iter()
            .position(|piece| piece.contains(p, 0.0))
            .map(PieceId)
    }

    /// Inform the dungeon of the player's current world position
    pub fn set_player_position(&mut self, world: Vec3) {
        self.tracker.set_position(world, &self.transform);
    }

    pub fn player_position(&self) -> Vec3 {
        self.tracker.world_position()
    }

    /// Whether one collision step in `direction` keeps the player on floor
    pub fn can_move(&mut self, look_at: Vec3, current: Vec3, direction: MoveDirection) -> bool {
        self.tracker
            .can_move(&self.grid, &self.transform, look_at, current, direction)
    }

    /// World position recorded by the last successful `can_move`
    pub fn last_free_position(&self) -> Vec3 {
        self.tracker.last_free_position()
    }

    pub fn layout(&self) -> DungeonLayout {
        DungeonLayout {
            seed: self.seed,
            pieces: self.pieces.clone(),
            doors: self.doors.clone(),
            ceilings: self.ceilings.clone(),
            walls: self.walls.clone(),
            textures: TextureId::ALL
                .iter()
                .map(|&texture| TextureBinding {
                    texture,
                    path: texture.asset_path().to_string(),
                })
                .collect(),
            stats: self.stats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_dungeon(seed: u64) -> Dungeon {
        Dungeon::from_seed(&DungeonConfig::default(), seed).unwrap()
    }

    #[test]
    fn test_single_entrance_on_exact_grid() {
        let mut config = DungeonConfig::default();
        config.grid.width = 21;
        config.grid.height = 21;
        config.generation.max_depth = 0;

        let dungeon = Dungeon::from_seed(&config, 4).unwrap();
        assert_eq!(dungeon.pieces().len(), 1);
        assert_eq!(dungeon.entrance().kind, PieceType::Entrance);
        assert_eq!(dungeon.walls().len(), 4);
        assert!(dungeon.doors().is_empty());
    }

    #[test]
    fn test_one_cell_grid_fails() {
        let mut config = DungeonConfig::default();
        config.grid.width = 1;
        config.grid.height = 1;

        let result = Dungeon::from_seed(&config, 4);
        assert!(matches!(result, Err(GenerationError::GridExhausted(_))));
    }

    #[test]
    fn test_invalid_config_fails_before_generation() {
        let mut config = DungeonConfig::default();
        config.grid.cells_per_unit = -1.0;
        let result = Dungeon::from_seed(&config, 4);
        assert!(matches!(result, Err(GenerationError::InvalidConfig(_))));
    }

    #[test]
    fn test_every_side_has_walls() {
        let dungeon = default_dungeon(21);
        for (i, piece) in dungeon.pieces().iter().enumerate() {
            let owned: Vec<_> = dungeon.walls().iter().filter(|w| w.owner == PieceId(i)).collect();
            assert_eq!(owned.len(), 4 + piece.doors.count());
            for side in Direction::ALL {
                let expected = if piece.doors[side] { 2 } else { 1 };
                assert_eq!(owned.iter().filter(|w| w.side == side).count(), expected);
            }
        }
    }

    #[test]
    fn test_doors_join_linked_pieces() {
        let dungeon = default_dungeon(8);
        for door in dungeon.doors() {
            let (parent, child) = door.joins.unwrap();
            let parent = dungeon.piece(parent).unwrap();
            let child = dungeon.piece(child).unwrap();
            let entry = child.entry.unwrap();
            assert!(parent.doors[entry.opposite()]);
            assert!((door.center - child.side_midpoint(entry)).length() < 1e-5);
        }
    }

    #[test]
    fn test_door_gaps_stay_walkable() {
        use glam::Vec2;

        for seed in 0..20 {
            let dungeon = default_dungeon(seed);
            for door in dungeon.doors() {
                // Offsets run along the shared side, across the doorway
                let along = match door.door_orientation {
                    Some(DoorOrientation::Vertical) => Vec2::new(0.0, 0.15),
                    Some(DoorOrientation::Horizontal) => Vec2::new(0.15, 0.0),
                    None => panic!("door piece without orientation"),
                };
                for p in [door.center - along, door.center, door.center + along] {
                    assert!(
                        dungeon.grid().is_walkable(p),
                        "seed {}: doorway {:?} blocked at {:?}",
                        seed,
                        door.joins,
                        p
                    );
                }
            }
        }
    }

    #[test]
    fn test_spawn_is_walkable() {
        let mut dungeon = default_dungeon(12);
        let spawn = dungeon.spawn_position();
        assert_eq!(dungeon.piece_at(spawn), Some(PieceId(0)));

        let look = spawn + Vec3::new(0.0, 0.0, 5.0);
        assert!(dungeon.can_move(look, spawn, MoveDirection::Forward));
        assert_eq!(dungeon.last_free_position(), spawn);
    }

    #[test]
    fn test_walking_into_wall_is_blocked() {
        let mut config = DungeonConfig::default();
        config.generation.max_depth = 0;
        let mut dungeon = Dungeon::from_seed(&config, 1).unwrap();
        let t = *dungeon.transform();

        let free = dungeon.spawn_position();
        let look = t.dungeon_to_world(Vec3::new(5.0, EYE_HEIGHT, 0.0));
        assert!(dungeon.can_move(look, free, MoveDirection::Forward));

        // One step short of the entrance's right wall
        let near_wall = t.dungeon_to_world(Vec3::new(0.9, EYE_HEIGHT, 0.0));
        assert!(!dungeon.can_move(look, near_wall, MoveDirection::Forward));
        assert_eq!(dungeon.last_free_position(), free);
    }

    #[test]
    fn test_seed_reproduces_layout() {
        let a = default_dungeon(99).layout();
        let b = default_dungeon(99).layout();
        assert_eq!(a, b);
        assert_eq!(a.seed, Some(99));
    }

    #[test]
    fn test_layout_exports_as_json() {
        let layout = default_dungeon(3).layout();
        let json = serde_json::to_string(&layout).unwrap();
        let back: DungeonLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pieces.len(), layout.pieces.len());

        // Every texture a piece or wall names has an asset to bind to
        for piece in layout.pieces.iter().chain(&layout.doors) {
            let texture = piece.map_texture();
            let binding = back.textures.iter().find(|b| b.texture == texture).unwrap();
            assert_eq!(binding.path, texture.asset_path());
        }
        assert!(json.contains("data/stone_walls.png"));
    }
}
