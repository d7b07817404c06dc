//! Rendering abstraction layer
//!
//! The dungeon is described as textured quads in dungeon space: one floor
//! quad per piece, door slots lifted just above the floor, one ceiling quad
//! per piece and the synthesized walls. A backend receives them through
//! `MeshBuilder` and draws them with `world_matrix` applied.

pub mod minimap;

pub use minimap::{Minimap, MinimapGlyph};

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::dungeon::walls::WALL_HEIGHT;
use crate::dungeon::{Dungeon, Piece, PieceType, TextureId, WallSegment, WorldTransform};

/// Door slots sit this far above the floor to avoid z-fighting
pub const DOOR_LIFT: f32 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuadLayer {
    Floor,
    Door,
    Ceiling,
    Wall,
}

/// A textured rectangle in dungeon space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub layer: QuadLayer,
    /// Corners in winding order
    pub corners: [Vec3; 4],
    pub normal: Vec3,
    pub texture: TextureId,
    /// UV repeat across the quad
    pub texture_scale: Vec2,
}

/// Receives quads from `instantiate`
pub trait MeshBuilder {
    type Error;

    fn build_quad(&mut self, quad: &Quad) -> Result<(), Self::Error>;
}

/// Collects quads into a list
impl MeshBuilder for Vec<Quad> {
    type Error = std::convert::Infallible;

    fn build_quad(&mut self, quad: &Quad) -> Result<(), Self::Error> {
        self.push(*quad);
        Ok(())
    }
}

/// Horizontal quad covering a piece's footprint at height `y`
fn flat_corners(piece: &Piece, y: f32) -> [Vec3; 4] {
    let (min, max) = (piece.min(), piece.max());
    [
        Vec3::new(min.x, y, min.y),
        Vec3::new(min.x, y, max.y),
        Vec3::new(max.x, y, max.y),
        Vec3::new(max.x, y, min.y),
    ]
}

/// Walkable surface of a floor piece or door slot
pub fn floor_quad(piece: &Piece) -> Quad {
    let (layer, y, texture) = match piece.kind {
        PieceType::Door => (QuadLayer::Door, DOOR_LIFT, piece.map_texture()),
        _ => (QuadLayer::Floor, 0.0, piece.kind.surface_texture()),
    };
    Quad {
        layer,
        corners: flat_corners(piece, y),
        normal: Vec3::Y,
        texture,
        texture_scale: piece.kind.texture_scale(),
    }
}

/// Ceiling over a piece, facing down
pub fn ceiling_quad(ceiling: &Piece) -> Quad {
    let mut corners = flat_corners(ceiling, WALL_HEIGHT);
    corners.reverse();
    Quad {
        layer: QuadLayer::Ceiling,
        corners,
        normal: Vec3::NEG_Y,
        texture: TextureId::StoneWall,
        texture_scale: PieceType::Ceiling.texture_scale(),
    }
}

pub fn wall_quad(wall: &WallSegment) -> Quad {
    Quad {
        layer: QuadLayer::Wall,
        corners: wall.corners(),
        normal: wall.normal(),
        texture: wall.texture(),
        texture_scale: wall.texture_scale(),
    }
}

/// Every quad of the dungeon: floors, doors, ceilings, then walls
pub fn dungeon_quads(dungeon: &Dungeon) -> Vec<Quad> {
    let mut quads = Vec::new();
    match instantiate(dungeon, &mut quads) {
        Ok(_) => quads,
        Err(never) => match never {},
    }
}

/// Hand every quad to a mesh builder, returning how many were built
pub fn instantiate<B: MeshBuilder>(dungeon: &Dungeon, builder: &mut B) -> Result<usize, B::Error> {
    let mut count = 0;
    for piece in dungeon.pieces().iter().chain(dungeon.doors()) {
        builder.build_quad(&floor_quad(piece))?;
        count += 1;
    }
    for ceiling in dungeon.ceilings() {
        builder.build_quad(&ceiling_quad(ceiling))?;
        count += 1;
    }
    for wall in dungeon.walls() {
        builder.build_quad(&wall_quad(wall))?;
        count += 1;
    }
    log::debug!("Instantiated {} quads", count);
    Ok(count)
}

/// Model matrix taking dungeon space to world space
pub fn world_matrix(transform: &WorldTransform) -> Mat4 {
    Mat4::from_translation(transform.translation) * Mat4::from_scale(Vec3::splat(transform.scale))
}
