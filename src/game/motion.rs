//! Player motion
//!
//! Speeds build up while a key is held and decay once it is released, all
//! scaled by the frame time in milliseconds. Positions are in world space.

use glam::Vec3;

/// Per-millisecond acceleration and caps
const MOVE_ACCEL: f32 = 0.001;
const MOVE_MAX: f32 = 0.03;
const MOVE_DECAY: f32 = 0.0007;
const TURN_ACCEL: f32 = 0.01;
const TURN_MAX: f32 = 0.15;
const TURN_DECAY: f32 = 0.005;

/// How far ahead of the eye the look-at point sits
const LOOK_DISTANCE: f32 = 1.0;

/// Build up or decay one speed channel
fn ramp(speed: f32, held: bool, frame_time: f32, accel: f32, max: f32, decay: f32) -> f32 {
    if held {
        (speed + frame_time * accel).min(frame_time * max)
    } else {
        (speed - frame_time * decay).max(0.0)
    }
}

/// Position, heading and momentum of the viewer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    position: Vec3,
    /// Heading in degrees, kept in [0, 360)
    yaw: f32,
    frame_time: f32,
    forward_speed: f32,
    backward_speed: f32,
    left_turn_speed: f32,
    right_turn_speed: f32,
}

impl Motion {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            yaw: yaw.rem_euclid(360.0),
            frame_time: 0.0,
            forward_speed: 0.0,
            backward_speed: 0.0,
            left_turn_speed: 0.0,
            right_turn_speed: 0.0,
        }
    }

    /// Frame duration in milliseconds
    pub fn set_frame_time(&mut self, frame_time: f32) {
        self.frame_time = frame_time.max(0.0);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move without touching momentum (used when snapping back)
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Unit heading in the XZ plane; yaw 0 looks down +Z
    pub fn heading(&self) -> Vec3 {
        let radians = self.yaw.to_radians();
        Vec3::new(radians.sin(), 0.0, radians.cos())
    }

    /// Point the viewer is looking at
    pub fn look_at(&self) -> Vec3 {
        self.position + self.heading() * LOOK_DISTANCE
    }

    pub fn forward_speed(&self) -> f32 {
        self.forward_speed
    }

    pub fn turn_left(&mut self, held: bool) {
        self.left_turn_speed = ramp(self.left_turn_speed, held, self.frame_time, TURN_ACCEL, TURN_MAX, TURN_DECAY);
        self.yaw = (self.yaw - self.left_turn_speed).rem_euclid(360.0);
    }

    pub fn turn_right(&mut self, held: bool) {
        self.right_turn_speed = ramp(self.right_turn_speed, held, self.frame_time, TURN_ACCEL, TURN_MAX, TURN_DECAY);
        self.yaw = (self.yaw + self.right_turn_speed).rem_euclid(360.0);
    }

    pub fn move_forward(&mut self, held: bool) {
        self.forward_speed = ramp(self.forward_speed, held, self.frame_time, MOVE_ACCEL, MOVE_MAX, MOVE_DECAY);
        self.position += self.heading() * self.forward_speed;
    }

    pub fn move_backward(&mut self, held: bool) {
        self.backward_speed = ramp(self.backward_speed, held, self.frame_time, MOVE_ACCEL, MOVE_MAX, MOVE_DECAY);
        self.position -= self.heading() * self.backward_speed;
    }

    /// Drop forward momentum, e.g. when blocked by a wall
    pub fn halt_forward(&mut self) {
        self.forward_speed = 0.0;
    }

    pub fn halt_backward(&mut self) {
        self.backward_speed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_builds_and_caps() {
        let mut motion = Motion::new(Vec3::ZERO, 0.0);
        motion.set_frame_time(16.0);
        for _ in 0..100 {
            motion.move_forward(true);
        }
        assert!((motion.forward_speed() - 16.0 * MOVE_MAX).abs() < 1e-5);
        assert!(motion.position().z > 0.0);
        assert!(motion.position().x.abs() < 1e-3);
    }

    #[test]
    fn test_speed_decays_to_rest() {
        let mut motion = Motion::new(Vec3::ZERO, 0.0);
        motion.set_frame_time(16.0);
        motion.move_forward(true);
        for _ in 0..10 {
            motion.move_forward(false);
        }
        assert_eq!(motion.forward_speed(), 0.0);
    }

    #[test]
    fn test_yaw_wraps() {
        let mut motion = Motion::new(Vec3::ZERO, 359.0);
        motion.set_frame_time(100.0);
        motion.turn_right(true);
        assert!(motion.yaw() >= 0.0 && motion.yaw() < 360.0);
        assert!((motion.yaw() - 0.0).abs() < 1e-3);

        let mut motion = Motion::new(Vec3::ZERO, 0.5);
        motion.set_frame_time(100.0);
        motion.turn_left(true);
        assert!((motion.yaw() - 359.5).abs() < 1e-3);
    }

    #[test]
    fn test_heading_follows_yaw() {
        let motion = Motion::new(Vec3::ZERO, 90.0);
        assert!((motion.heading() - Vec3::X).length() < 1e-5);
        assert!((motion.look_at() - Vec3::X * LOOK_DISTANCE).length() < 1e-5);
    }
}
