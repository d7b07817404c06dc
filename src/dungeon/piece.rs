//! Dungeon pieces
//!
//! A piece is one rectangular component of the dungeon: the entrance, a room,
//! a corridor, a door slot or a ceiling tile. Per-type behavior (footprint
//! ranges, exit rules, textures) is table-driven off `PieceType`.

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::direction::{Direction, Sides};

/// Footprints are drawn at tenth-of-a-unit granularity
const FOOTPRINT_STEPS_PER_UNIT: f32 = 10.0;

/// Entrance footprint (fixed)
pub const ENTRANCE_SIZE: Vec2 = Vec2::new(2.0, 2.0);

/// Stable handle into the dungeon's piece arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub usize);

/// Kinds of dungeon pieces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Entrance,
    Room,
    HorizontalCorridor,
    VerticalCorridor,
    Door,
    Ceiling,
}

/// Which way a door slot is laid across its link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorOrientation {
    /// Joins pieces stacked along Z (Up/Down links)
    Horizontal,
    /// Joins pieces side by side along X (Left/Right links)
    Vertical,
}

impl DoorOrientation {
    pub fn for_direction(dir: Direction) -> Self {
        if dir.is_horizontal() {
            DoorOrientation::Vertical
        } else {
            DoorOrientation::Horizontal
        }
    }

    /// Door slot footprint (width, height)
    pub fn size(self) -> Vec2 {
        match self {
            DoorOrientation::Horizontal => Vec2::new(1.1, 0.55),
            DoorOrientation::Vertical => Vec2::new(0.55, 1.1),
        }
    }
}

/// Symbolic texture identifiers; binding to real assets happens outside the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureId {
    Entrance,
    Room,
    HorizontalDoor,
    VerticalDoor,
    StoneWall,
    WoodenFloor,
}

impl TextureId {
    pub const ALL: [TextureId; 6] = [
        TextureId::Entrance,
        TextureId::Room,
        TextureId::HorizontalDoor,
        TextureId::VerticalDoor,
        TextureId::StoneWall,
        TextureId::WoodenFloor,
    ];

    /// Conventional asset path for this texture
    pub fn asset_path(&self) -> &'static str {
        match self {
            TextureId::Entrance => "data/entrance.png",
            TextureId::Room => "data/room.png",
            TextureId::HorizontalDoor => "data/horizontal_door.png",
            TextureId::VerticalDoor => "data/vertical_door.png",
            TextureId::StoneWall => "data/stone_walls.png",
            TextureId::WoodenFloor => "data/wooden_floors.png",
        }
    }
}

impl PieceType {
    /// Inclusive footprint range `(min, max)` for types with a random size
    ///
    /// Doors and ceilings take their size from the link or floor piece instead.
    pub fn size_range(self) -> Option<(Vec2, Vec2)> {
        match self {
            PieceType::Entrance => Some((ENTRANCE_SIZE, ENTRANCE_SIZE)),
            PieceType::Room => Some((Vec2::new(1.5, 1.5), Vec2::new(4.0, 4.0))),
            PieceType::HorizontalCorridor => Some((Vec2::new(2.0, 1.0), Vec2::new(5.0, 1.0))),
            PieceType::VerticalCorridor => Some((Vec2::new(1.0, 2.0), Vec2::new(1.0, 5.0))),
            PieceType::Door | PieceType::Ceiling => None,
        }
    }

    /// Draw a random footprint (width, height) for this type
    pub fn random_footprint<R: Rng>(self, rng: &mut R) -> Option<Vec2> {
        let (min, max) = self.size_range()?;
        Some(Vec2::new(
            random_extent(rng, min.x, max.x),
            random_extent(rng, min.y, max.y),
        ))
    }

    pub fn is_corridor(self) -> bool {
        matches!(self, PieceType::HorizontalCorridor | PieceType::VerticalCorridor)
    }

    /// Corridor type that runs along the growth direction
    pub fn corridor_along(dir: Direction) -> PieceType {
        if dir.is_horizontal() {
            PieceType::HorizontalCorridor
        } else {
            PieceType::VerticalCorridor
        }
    }

    /// Texture drawn on the overhead map
    pub fn map_texture(self, door: Option<DoorOrientation>) -> TextureId {
        match self {
            PieceType::Entrance => TextureId::Entrance,
            PieceType::Door => match door {
                Some(DoorOrientation::Horizontal) => TextureId::HorizontalDoor,
                _ => TextureId::VerticalDoor,
            },
            _ => TextureId::Room,
        }
    }

    /// Texture drawn on the walkable surface
    pub fn surface_texture(self) -> TextureId {
        TextureId::WoodenFloor
    }

    /// UV repeat for the surface quad
    pub fn texture_scale(self) -> Vec2 {
        match self {
            PieceType::HorizontalCorridor => Vec2::new(2.0, 1.0),
            PieceType::VerticalCorridor => Vec2::new(1.0, 2.0),
            PieceType::Ceiling => Vec2::new(2.0, 2.0),
            _ => Vec2::ONE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PieceType::Entrance => "entrance",
            PieceType::Room => "room",
            PieceType::HorizontalCorridor => "horizontal corridor",
            PieceType::VerticalCorridor => "vertical corridor",
            PieceType::Door => "door",
            PieceType::Ceiling => "ceiling",
        }
    }
}

/// Draw one axis uniformly in tenths, both bounds inclusive
fn random_extent<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    let lo = (min * FOOTPRINT_STEPS_PER_UNIT).round() as u32;
    let hi = (max * FOOTPRINT_STEPS_PER_UNIT).round() as u32;
    if lo >= hi {
        return min;
    }
    rng.gen_range(lo..=hi) as f32 / FOOTPRINT_STEPS_PER_UNIT
}

/// Pick the exit sides for a freshly committed piece
///
/// `entry` is the piece's own side facing its parent; it is never offered as
/// an exit. `exit_limit` counts that entry connection, so a room gets between
/// one and `exit_limit - 1` new exits (none when the limit is 1).
pub fn random_exits<R: Rng>(
    kind: PieceType,
    exit_limit: usize,
    entry: Option<Direction>,
    rng: &mut R,
) -> Sides<bool> {
    let mut exits = Sides::splat(false);
    match kind {
        PieceType::Entrance => {
            for dir in Direction::ALL {
                exits[dir] = Some(dir) != entry;
            }
        }
        PieceType::Room => {
            let count = if exit_limit > 1 {
                rng.gen_range(1..exit_limit)
            } else {
                0
            };
            let mut free: Vec<Direction> = Direction::ALL
                .iter()
                .copied()
                .filter(|&d| Some(d) != entry)
                .collect();
            free.shuffle(rng);
            for dir in free.into_iter().take(count) {
                exits[dir] = true;
            }
        }
        PieceType::HorizontalCorridor => {
            exits[Direction::Left] = true;
            exits[Direction::Right] = true;
        }
        PieceType::VerticalCorridor => {
            exits[Direction::Up] = true;
            exits[Direction::Down] = true;
        }
        PieceType::Door | PieceType::Ceiling => {}
    }
    if let Some(entry) = entry {
        exits[entry] = false;
    }
    exits
}

/// One committed dungeon component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceType,
    /// Center in the dungeon plane (x, z)
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
    /// Sides a new piece may still be grown from
    pub exits: Sides<bool>,
    /// Sides that need a wall with a door gap
    pub doors: Sides<bool>,
    /// This piece's side facing its parent
    pub entry: Option<Direction>,
    pub parent: Option<PieceId>,
    pub depth: u32,
    /// Piece across each door
    pub neighbors: Sides<Option<PieceId>>,
    /// Set for door pieces only
    pub door_orientation: Option<DoorOrientation>,
    /// Set for door pieces only: the two floor pieces this door joins
    pub joins: Option<(PieceId, PieceId)>,
}

impl Piece {
    fn with_footprint(kind: PieceType, center: Vec2, size: Vec2) -> Self {
        Self {
            kind,
            center,
            width: size.x,
            height: size.y,
            exits: Sides::splat(false),
            doors: Sides::splat(false),
            entry: None,
            parent: None,
            depth: 0,
            neighbors: Sides::splat(None),
            door_orientation: None,
            joins: None,
        }
    }

    /// The root piece, open on all four sides
    pub fn entrance(center: Vec2) -> Self {
        let mut piece = Self::with_footprint(PieceType::Entrance, center, ENTRANCE_SIZE);
        piece.exits = Sides::splat(true);
        piece
    }

    /// A piece grown from `parent` in direction `grown_toward`
    ///
    /// The side facing the parent is recorded as the entry and already carries
    /// a door; it is never an exit.
    pub fn grown(
        kind: PieceType,
        center: Vec2,
        size: Vec2,
        parent: PieceId,
        grown_toward: Direction,
        depth: u32,
        exits: Sides<bool>,
    ) -> Self {
        let entry = grown_toward.opposite();
        let mut piece = Self::with_footprint(kind, center, size);
        piece.exits = exits;
        piece.exits[entry] = false;
        piece.doors[entry] = true;
        piece.entry = Some(entry);
        piece.parent = Some(parent);
        piece.depth = depth;
        piece.neighbors[entry] = Some(parent);
        piece
    }

    /// Ceiling tile mirroring a floor piece
    pub fn ceiling_of(floor: &Piece) -> Self {
        let mut piece = Self::with_footprint(PieceType::Ceiling, floor.center, floor.size());
        piece.depth = floor.depth;
        piece
    }

    /// Door slot centered on `child`'s side facing its parent
    pub fn door(parent: PieceId, child_id: PieceId, child: &Piece, grown_toward: Direction) -> Self {
        let orientation = DoorOrientation::for_direction(grown_toward);
        let center = child.side_midpoint(grown_toward.opposite());
        let mut piece = Self::with_footprint(PieceType::Door, center, orientation.size());
        piece.door_orientation = Some(orientation);
        piece.joins = Some((parent, child_id));
        piece.depth = child.depth;
        piece
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn half_extents(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Lower-left corner (min x, min z)
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents()
    }

    /// Upper-right corner (max x, max z)
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents()
    }

    /// Midpoint of one side
    pub fn side_midpoint(&self, side: Direction) -> Vec2 {
        self.center + side.offset() * self.half_extents()
    }

    /// Center of a piece of `size` abutting this one on `side`
    pub fn abutting_center(&self, side: Direction, size: Vec2) -> Vec2 {
        self.center + side.offset() * (self.half_extents() + size * 0.5)
    }

    /// True if `point` lies inside the footprint, shrunk by `margin`
    pub fn contains(&self, point: Vec2, margin: f32) -> bool {
        let min = self.min() + Vec2::splat(margin);
        let max = self.max() - Vec2::splat(margin);
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    pub fn map_texture(&self) -> TextureId {
        self.kind.map_texture(self.door_orientation)
    }
}
