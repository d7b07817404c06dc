//! Recursive room/corridor placement
//!
//! Starting from the entrance, every open exit gets up to `max_attempts`
//! tries at growing a new piece: pick a type from depth-dependent chances,
//! draw a footprint, abut it against the parent and try to reserve it in the
//! occupancy grid. A successful placement commits the piece, its ceiling and
//! its door, then recurses into the new piece's own exits.
//!
//! Grid mutation happens only inside a successful reservation, so a rejected
//! attempt never leaves anything behind.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::direction::Direction;
use super::grid::{GridError, OccupancyGrid};
use super::piece::{random_exits, Piece, PieceId, PieceType};
use crate::config::{ConfigError, GenerationConfig};

/// Why generation stopped
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The grid is too small for the requested dungeon
    #[error(transparent)]
    GridExhausted(#[from] GridError),
    #[error("invalid dungeon config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Piece-choice weights (out of their pair's sum) plus the room exit limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnChances {
    pub corridor_after_room: u32,
    pub room_after_room: u32,
    pub corridor_after_corridor: u32,
    pub room_after_corridor: u32,
    /// Connections a room may have, counting the one it was entered through
    pub room_exit_limit: usize,
}

impl Default for SpawnChances {
    fn default() -> Self {
        Self {
            corridor_after_room: 60,
            room_after_room: 40,
            corridor_after_corridor: 10,
            room_after_corridor: 90,
            room_exit_limit: 4,
        }
    }
}

impl SpawnChances {
    /// Chances at the last level: only dead-end rooms
    pub fn final_depth() -> Self {
        Self {
            corridor_after_room: 0,
            room_after_room: 100,
            corridor_after_corridor: 0,
            room_after_corridor: 100,
            room_exit_limit: 1,
        }
    }

    /// Choose the type of the next piece grown from `parent` toward `dir`
    pub fn pick<R: Rng>(&self, parent: PieceType, dir: Direction, rng: &mut R) -> PieceType {
        let (corridor_weight, room_weight) = if parent.is_corridor() {
            (self.corridor_after_corridor, self.room_after_corridor)
        } else {
            (self.corridor_after_room, self.room_after_room)
        };

        let corridor = match corridor_weight.checked_add(room_weight) {
            Some(0) => false,
            Some(total) => rng.gen_range(1..=total) <= corridor_weight,
            None => {
                let total = u64::from(corridor_weight) + u64::from(room_weight);
                rng.gen_range(1..=total) <= u64::from(corridor_weight)
            }
        };
        if corridor {
            PieceType::corridor_along(dir)
        } else {
            PieceType::Room
        }
    }
}

impl GenerationConfig {
    /// Chances for a piece placed at `depth`
    pub fn chances_for(&self, depth: u32) -> SpawnChances {
        if depth >= self.max_depth {
            return SpawnChances::final_depth();
        }
        let mut chances = self.chances;
        if depth <= self.early_depth {
            chances.room_exit_limit = self.early_exit_limit;
        }
        chances
    }
}

/// Counters collected while generating
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub rooms: usize,
    pub corridors: usize,
    pub doors: usize,
    pub deepest: u32,
    pub attempts: usize,
    pub rejected: usize,
    pub abandoned_exits: usize,
}

/// Everything placement commits
#[derive(Debug, Clone, Default)]
pub struct GeneratedLayout {
    /// Entrance, rooms and corridors; index 0 is the entrance
    pub pieces: Vec<Piece>,
    /// One per floor piece, same order
    pub ceilings: Vec<Piece>,
    pub doors: Vec<Piece>,
    pub stats: GenerationStats,
}

/// Build the piece tree into `grid`
///
/// Fails only when a footprint reaches off the grid; in that case nothing
/// built so far should be used.
pub fn generate_layout<R: Rng>(
    config: &GenerationConfig,
    grid: &mut OccupancyGrid,
    rng: &mut R,
) -> Result<GeneratedLayout, GenerationError> {
    let mut placer = Placer {
        config,
        grid,
        rng,
        layout: GeneratedLayout::default(),
    };
    placer.run()?;
    Ok(placer.layout)
}

struct Placer<'a, R: Rng> {
    config: &'a GenerationConfig,
    grid: &'a mut OccupancyGrid,
    rng: &'a mut R,
    layout: GeneratedLayout,
}

impl<R: Rng> Placer<'_, R> {
    fn run(&mut self) -> Result<(), GenerationError> {
        let entrance = Piece::entrance(Vec2::ZERO);
        // The grid is fresh, so only exhaustion can stop the entrance
        self.grid.try_reserve(entrance.center, entrance.size())?;
        let id = self.commit(entrance);

        if self.config.max_depth > 0 {
            for dir in Direction::ENTRANCE_ORDER {
                self.place_next(1, id, dir)?;
            }
        }
        Ok(())
    }

    fn commit(&mut self, piece: Piece) -> PieceId {
        let id = PieceId(self.layout.pieces.len());
        let stats = &mut self.layout.stats;
        match piece.kind {
            PieceType::Entrance | PieceType::Room => stats.rooms += 1,
            PieceType::HorizontalCorridor | PieceType::VerticalCorridor => stats.corridors += 1,
            PieceType::Door | PieceType::Ceiling => {}
        }
        stats.deepest = stats.deepest.max(piece.depth);

        self.layout.ceilings.push(Piece::ceiling_of(&piece));
        self.layout.pieces.push(piece);
        id
    }

    /// Record the door between `parent` and its new child on both sides
    fn link(&mut self, parent: PieceId, child: PieceId, dir: Direction) {
        let parent_piece = &mut self.layout.pieces[parent.0];
        parent_piece.doors[dir] = true;
        parent_piece.exits[dir] = false;
        parent_piece.neighbors[dir] = Some(child);

        let door = Piece::door(parent, child, &self.layout.pieces[child.0], dir);
        self.layout.doors.push(door);
        self.layout.stats.doors += 1;
    }

    /// Grow one piece off `parent` toward `dir`, then recurse into its exits
    ///
    /// Returns `Ok(None)` when every attempt was rejected; that exit simply
    /// stays closed.
    fn place_next(
        &mut self,
        depth: u32,
        parent: PieceId,
        dir: Direction,
    ) -> Result<Option<PieceId>, GenerationError> {
        let chances = self.config.chances_for(depth);
        let parent_kind = self.layout.pieces[parent.0].kind;

        for _ in 0..self.config.max_attempts {
            self.layout.stats.attempts += 1;

            let kind = chances.pick(parent_kind, dir, self.rng);
            let Some(size) = kind.random_footprint(self.rng) else {
                continue;
            };
            let center = self.layout.pieces[parent.0].abutting_center(dir, size);

            if !self.grid.try_reserve(center, size)? {
                self.layout.stats.rejected += 1;
                continue;
            }

            let exits = random_exits(kind, chances.room_exit_limit, Some(dir.opposite()), self.rng);
            let piece = Piece::grown(kind, center, size, parent, dir, depth, exits);
            let id = self.commit(piece);
            self.link(parent, id, dir);

            log::debug!(
                "Placed {} #{} at ({:.2}, {:.2}) size {:.1}x{:.1}, depth {}, {} of #{}",
                kind.name(),
                id.0,
                center.x,
                center.y,
                size.x,
                size.y,
                depth,
                dir.name(),
                parent.0
            );

            if depth < self.config.max_depth {
                let open = self.layout.pieces[id.0]
                    .exits
                    .enabled_in(&Direction::GROWTH_ORDER);
                for next in open {
                    self.place_next(depth + 1, id, next)?;
                }
            }
            return Ok(Some(id));
        }

        self.layout.stats.abandoned_exits += 1;
        log::debug!(
            "Gave up on {} exit of #{} after {} attempts",
            dir.name(),
            parent.0,
            self.config.max_attempts
        );
        Ok(None)
    }
}
