//! Exploration state
//!
//! Ties the viewer's motion to the dungeon's collision queries: each frame
//! the player position is pushed to the dungeon, turning is applied freely,
//! and forward/backward motion only happens while the next step is floor.

use std::time::Duration;

use glam::Vec3;

use crate::config::DungeonConfig;
use crate::dungeon::{Dungeon, GenerationError, MoveDirection};

use super::motion::Motion;
use super::time::FrameClock;

/// Keys held during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

/// The walkable session: one dungeon and one viewer
pub struct Game {
    config: DungeonConfig,
    dungeon: Dungeon,
    motion: Motion,
    clock: FrameClock,
    collision_on: bool,
}

impl Game {
    /// Start in a dungeon generated from the config's seed, or a fresh one
    pub fn new(config: DungeonConfig) -> Result<Self, GenerationError> {
        let dungeon = Dungeon::new(&config)?;
        Ok(Self::with_dungeon(config, dungeon))
    }

    pub fn with_seed(config: DungeonConfig, seed: u64) -> Result<Self, GenerationError> {
        let dungeon = Dungeon::from_seed(&config, seed)?;
        Ok(Self::with_dungeon(config, dungeon))
    }

    fn with_dungeon(config: DungeonConfig, dungeon: Dungeon) -> Self {
        let motion = Motion::new(dungeon.spawn_position(), 0.0);
        Self {
            config,
            dungeon,
            motion,
            clock: FrameClock::new(),
            collision_on: true,
        }
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn collision_on(&self) -> bool {
        self.collision_on
    }

    pub fn seed(&self) -> Option<u64> {
        self.dungeon.seed()
    }

    /// Advance one frame
    pub fn update(&mut self, delta: Duration, input: &FrameInput) {
        let frame_time = self.clock.tick(delta);
        self.step(frame_time, input);
    }

    /// Advance one frame of `frame_time` milliseconds
    pub fn step(&mut self, frame_time: f32, input: &FrameInput) {
        self.motion.set_frame_time(frame_time);

        let position = self.motion.position();
        self.dungeon.set_player_position(position);

        self.motion.turn_left(input.turn_left);
        self.motion.turn_right(input.turn_right);

        if !self.collision_on {
            self.motion.move_forward(input.forward);
            self.motion.move_backward(input.backward);
            return;
        }

        let look_at = self.motion.look_at();
        if self.dungeon.can_move(look_at, position, MoveDirection::Forward) {
            self.motion.move_forward(input.forward);
        } else {
            self.motion.halt_forward();
        }
        if self.dungeon.can_move(look_at, position, MoveDirection::Backward) {
            self.motion.move_backward(input.backward);
        } else {
            self.motion.halt_backward();
        }
    }

    /// Flip collision; re-enabling it snaps back to the last free position
    pub fn toggle_collision(&mut self) {
        self.collision_on = !self.collision_on;
        if self.collision_on {
            let free = self.dungeon.last_free_position();
            self.motion.set_position(free);
            self.dungeon.set_player_position(free);
        }
        log::info!("Collision {}", if self.collision_on { "on" } else { "off" });
    }

    /// Replace the dungeon with a new one and respawn at its entrance
    ///
    /// On failure the current dungeon is kept.
    pub fn regenerate(&mut self, seed: Option<u64>) -> Result<(), GenerationError> {
        let dungeon = match seed {
            Some(seed) => Dungeon::from_seed(&self.config, seed)?,
            None => {
                let mut config = self.config.clone();
                config.seed = None;
                Dungeon::new(&config)?
            }
        };
        self.motion = Motion::new(dungeon.spawn_position(), 0.0);
        self.dungeon = dungeon;
        self.clock.reset();
        Ok(())
    }

    /// World position of the player
    pub fn player_position(&self) -> Vec3 {
        self.motion.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::transform::EYE_HEIGHT;

    fn walled_in() -> Game {
        let mut config = DungeonConfig::default();
        config.generation.max_depth = 0;
        Game::with_seed(config, 5).unwrap()
    }

    fn hold_forward() -> FrameInput {
        FrameInput {
            forward: true,
            ..FrameInput::default()
        }
    }

    #[test]
    fn test_spawns_at_entrance() {
        let game = walled_in();
        assert_eq!(game.player_position(), game.dungeon().spawn_position());
        assert!(game.collision_on());
    }

    #[test]
    fn test_walls_stop_the_player() {
        let mut game = walled_in();
        for _ in 0..500 {
            game.step(16.0, &hold_forward());
        }
        // The lone entrance spans -1..1 in dungeon space
        let p = game.dungeon().transform().world_to_dungeon(game.player_position());
        assert!(p.z < 1.0, "walked through the wall to {:?}", p);
        assert!(p.z > 0.5);
    }

    #[test]
    fn test_no_collision_walks_through_walls() {
        let mut game = walled_in();
        game.toggle_collision();
        for _ in 0..500 {
            game.step(16.0, &hold_forward());
        }
        let p = game.dungeon().transform().world_to_dungeon(game.player_position());
        assert!(p.z > 1.0);

        // Turning collision back on snaps to the last free spot
        game.toggle_collision();
        let back = game.dungeon().transform().world_to_dungeon(game.player_position());
        assert!(back.z < 1.0);
        assert!((back.y - EYE_HEIGHT).abs() < 1e-4);
    }

    #[test]
    fn test_regenerate_respawns() {
        let mut game = walled_in();
        for _ in 0..20 {
            game.step(16.0, &hold_forward());
        }
        game.regenerate(Some(11)).unwrap();
        assert_eq!(game.seed(), Some(11));
        assert_eq!(game.player_position(), game.dungeon().spawn_position());
    }

    #[test]
    fn test_regenerate_restarts_the_clock() {
        let mut game = walled_in();
        for _ in 0..10 {
            game.update(Duration::from_millis(20), &FrameInput::default());
        }
        assert!(game.clock().elapsed() > 0.1);

        game.regenerate(Some(6)).unwrap();
        assert_eq!(game.clock().elapsed(), 0.0);
    }

    #[test]
    fn test_failed_regenerate_keeps_dungeon() {
        let mut game = walled_in();
        game.config.grid.width = 1;
        game.config.grid.height = 1;
        assert!(game.regenerate(Some(2)).is_err());
        assert_eq!(game.seed(), Some(5));
    }
}
