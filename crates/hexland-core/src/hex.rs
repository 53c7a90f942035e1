//! Hex coordinate system using axial coordinates (q, r).
//!
//! Coordinates are only used while the board arena is being constructed;
//! once the graph exists, everything refers to tiles, vertices, and edges
//! by integer index. Vertices are named by their owning hex plus a North
//! or South pole — in that scheme every corner of the grid has exactly one
//! name, so deduplication is a plain map lookup.

use serde::{Deserialize, Serialize};

/// Direction of a vertex relative to a hex (North or South pole)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexDirection {
    /// Top vertex of the hex
    North,
    /// Bottom vertex of the hex
    South,
}

/// Direction of an edge relative to a hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeDirection {
    NorthEast,
    East,
    SouthEast,
    SouthWest,
    West,
    NorthWest,
}

impl EdgeDirection {
    /// All edge directions in clockwise order starting from NorthEast.
    ///
    /// The ordering matters: edge `i` of a hex connects corners `i` and
    /// `(i + 1) % 6` as returned by [`HexCoord::corners`].
    pub const ALL: [EdgeDirection; 6] = [
        EdgeDirection::NorthEast,
        EdgeDirection::East,
        EdgeDirection::SouthEast,
        EdgeDirection::SouthWest,
        EdgeDirection::West,
        EdgeDirection::NorthWest,
    ];
}

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going southeast)
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Ring index around the origin (0 for the center hex)
    pub fn ring(&self) -> u32 {
        self.q.abs().max(self.r.abs()).max(self.s().abs()) as u32
    }

    /// The six neighboring hexes in clockwise order starting from East
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),     // East
            HexCoord::new(self.q + 1, self.r - 1), // NorthEast
            HexCoord::new(self.q, self.r - 1),     // NorthWest
            HexCoord::new(self.q - 1, self.r),     // West
            HexCoord::new(self.q - 1, self.r + 1), // SouthWest
            HexCoord::new(self.q, self.r + 1),     // SouthEast
        ]
    }

    /// Get the neighbor in a specific direction
    pub fn neighbor(&self, direction: EdgeDirection) -> HexCoord {
        match direction {
            EdgeDirection::East => HexCoord::new(self.q + 1, self.r),
            EdgeDirection::NorthEast => HexCoord::new(self.q + 1, self.r - 1),
            EdgeDirection::NorthWest => HexCoord::new(self.q, self.r - 1),
            EdgeDirection::West => HexCoord::new(self.q - 1, self.r),
            EdgeDirection::SouthWest => HexCoord::new(self.q - 1, self.r + 1),
            EdgeDirection::SouthEast => HexCoord::new(self.q, self.r + 1),
        }
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// The six corners of this hex, clockwise starting from the top.
    ///
    /// Four of the six corners are the N/S pole of a neighboring hex; the
    /// resulting (hex, direction) pair is the unique name of that corner on
    /// the whole grid.
    pub fn corners(&self) -> [(HexCoord, VertexDirection); 6] {
        [
            (*self, VertexDirection::North),
            (self.neighbor(EdgeDirection::NorthEast), VertexDirection::South),
            (self.neighbor(EdgeDirection::SouthEast), VertexDirection::North),
            (*self, VertexDirection::South),
            (self.neighbor(EdgeDirection::SouthWest), VertexDirection::North),
            (self.neighbor(EdgeDirection::NorthWest), VertexDirection::South),
        ]
    }
}
