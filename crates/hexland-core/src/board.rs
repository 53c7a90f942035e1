//! Board arena: tiles, vertices, and edges with adjacency by index.
//!
//! The board is an arena of entities. Tiles, vertices, and edges are
//! created once by the map generator (see [`crate::mapgen`]) and referred
//! to by plain integer indices afterwards; adjacency is stored as index
//! lists on each entity. Nothing is ever removed, so indices stay valid
//! for the life of a match. Out-of-range indices are a programming error
//! and panic like any other slice access.
//!
//! The board knows topology and ownership, not rules: legality checks that
//! need turn or phase context live in [`crate::game`].

use crate::hex::HexCoord;
use serde::{Deserialize, Serialize};

/// Player identifier (index into the match's player list)
pub type PlayerId = u8;

/// Index of a tile in the board arena
pub type TileId = usize;

/// Index of a vertex in the board arena
pub type VertexId = usize;

/// Index of an edge in the board arena
pub type EdgeId = usize;

/// The five producible resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Wood,
    Brick,
    Ore,
    Wheat,
    Sheep,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Ore,
        Resource::Wheat,
        Resource::Sheep,
    ];
}

/// What a tile is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    /// Produces the given resource on its dice number
    Producing(Resource),
    /// Never produces; the robber starts here
    Desert,
    /// Coastal ring around the land, never produces, never buildable
    Beach,
}

impl TileKind {
    /// The resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self {
            TileKind::Producing(r) => Some(*r),
            TileKind::Desert | TileKind::Beach => None,
        }
    }

    /// Whether the robber may be placed on this tile
    pub fn accepts_robber(&self) -> bool {
        !matches!(self, TileKind::Beach)
    }
}

/// A port attached to a coastal vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortKind {
    /// Generic 3:1 port
    Any,
    /// 2:1 port for a specific resource
    Exact(Resource),
}

/// What occupies a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexBuilding {
    Empty,
    Settlement(PlayerId),
    City(PlayerId),
}

impl VertexBuilding {
    /// The player who owns this building, if any
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            VertexBuilding::Empty => None,
            VertexBuilding::Settlement(p) | VertexBuilding::City(p) => Some(*p),
        }
    }

    /// Victory points this building is worth
    pub fn victory_points(&self) -> u32 {
        match self {
            VertexBuilding::Empty => 0,
            VertexBuilding::Settlement(_) => 1,
            VertexBuilding::City(_) => 2,
        }
    }

    /// How many resources this building collects per production event
    pub fn production_multiplier(&self) -> u32 {
        match self {
            VertexBuilding::Empty => 0,
            VertexBuilding::Settlement(_) => 1,
            VertexBuilding::City(_) => 2,
        }
    }
}

/// What occupies an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeBuilding {
    Empty,
    Road(PlayerId),
}

impl EdgeBuilding {
    /// The player who owns this road, if any
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            EdgeBuilding::Empty => None,
            EdgeBuilding::Road(p) => Some(*p),
        }
    }
}

/// A single hex tile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    /// Axial position, kept for clients that lay the board out visually
    pub coord: HexCoord,
    pub kind: TileKind,
    /// Production number (2-12), 0 for non-producing tiles
    pub number: u8,
    pub has_robber: bool,
    /// Corner vertices, clockwise; empty for beach tiles
    pub vertices: Vec<VertexId>,
}

/// A building site where up to three tiles meet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub building: VertexBuilding,
    pub port: Option<PortKind>,
    /// Incident edges (at most 3)
    pub edges: Vec<EdgeId>,
    /// Adjacent land tiles (at most 3)
    pub tiles: Vec<TileId>,
}

/// A path site between exactly two vertices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub building: EdgeBuilding,
    pub vertices: [VertexId; 2],
}

/// The full board arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub tiles: Vec<Tile>,
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    /// Tile currently hosting the robber
    pub robber_tile: TileId,
    /// Map radius the board was generated with
    pub radius: u8,
}

impl Board {
    // ----- adjacency queries -----

    /// Edges incident to a vertex
    pub fn adjacent_edges(&self, vertex: VertexId) -> &[EdgeId] {
        &self.vertices[vertex].edges
    }

    /// The endpoint of `edge` that is not `vertex`
    pub fn other_endpoint(&self, edge: EdgeId, vertex: VertexId) -> VertexId {
        let [a, b] = self.edges[edge].vertices;
        if a == vertex {
            b
        } else {
            a
        }
    }

    /// Land tiles touching a vertex
    pub fn adjacent_tiles(&self, vertex: VertexId) -> &[TileId] {
        &self.vertices[vertex].tiles
    }

    /// Corner vertices of a tile
    pub fn adjacent_vertices(&self, tile: TileId) -> &[VertexId] {
        &self.tiles[tile].vertices
    }

    /// Vertices one edge away from a vertex
    pub fn neighbor_vertices(&self, vertex: VertexId) -> Vec<VertexId> {
        self.vertices[vertex]
            .edges
            .iter()
            .map(|&e| self.other_endpoint(e, vertex))
            .collect()
    }

    // ----- rule-free placement predicates -----

    /// No adjacent vertex may hold a building
    pub fn satisfies_distance_rule(&self, vertex: VertexId) -> bool {
        self.neighbor_vertices(vertex)
            .iter()
            .all(|&v| self.vertices[v].building == VertexBuilding::Empty)
    }

    /// Whether the player owns a road on any edge incident to the vertex
    pub fn has_road_at(&self, vertex: VertexId, player: PlayerId) -> bool {
        self.vertices[vertex]
            .edges
            .iter()
            .any(|&e| self.edges[e].building == EdgeBuilding::Road(player))
    }

    /// Whether an edge is attached to the player's network: a building of
    /// theirs at either endpoint, or another road of theirs meeting either
    /// endpoint.
    pub fn edge_connects_to_network(&self, edge: EdgeId, player: PlayerId) -> bool {
        self.edges[edge].vertices.iter().any(|&v| {
            if self.vertices[v].building.owner() == Some(player) {
                return true;
            }
            self.vertices[v]
                .edges
                .iter()
                .any(|&e| e != edge && self.edges[e].building == EdgeBuilding::Road(player))
        })
    }

    /// Whether an edge touches the given vertex
    pub fn edge_touches(&self, edge: EdgeId, vertex: VertexId) -> bool {
        self.edges[edge].vertices.contains(&vertex)
    }

    // ----- mutations -----

    /// Place a settlement. Caller must have validated legality.
    pub fn place_settlement(&mut self, vertex: VertexId, player: PlayerId) {
        self.vertices[vertex].building = VertexBuilding::Settlement(player);
    }

    /// Upgrade a settlement to a city. Caller must have validated ownership.
    pub fn upgrade_to_city(&mut self, vertex: VertexId, player: PlayerId) {
        self.vertices[vertex].building = VertexBuilding::City(player);
    }

    /// Place a road. Caller must have validated legality.
    pub fn place_road(&mut self, edge: EdgeId, player: PlayerId) {
        self.edges[edge].building = EdgeBuilding::Road(player);
    }

    /// Relocate the robber
    pub fn move_robber(&mut self, tile: TileId) {
        self.tiles[self.robber_tile].has_robber = false;
        self.tiles[tile].has_robber = true;
        self.robber_tile = tile;
    }

    // ----- production & robber queries -----

    /// Resource grants for a dice total: (player, resource, amount) per
    /// building adjacent to a producing tile. Robbed tiles grant nothing.
    pub fn production_for_roll(&self, total: u8) -> Vec<(PlayerId, Resource, u32)> {
        let mut grants = Vec::new();
        for tile in &self.tiles {
            if tile.number != total || tile.has_robber {
                continue;
            }
            let Some(resource) = tile.kind.resource() else {
                continue;
            };
            for &v in &tile.vertices {
                let building = self.vertices[v].building;
                if let Some(owner) = building.owner() {
                    grants.push((owner, resource, building.production_multiplier()));
                }
            }
        }
        grants
    }

    /// Distinct players owning a building adjacent to a tile
    pub fn players_adjacent_to_tile(&self, tile: TileId) -> Vec<PlayerId> {
        let mut players = Vec::new();
        for &v in &self.tiles[tile].vertices {
            if let Some(owner) = self.vertices[v].building.owner() {
                if !players.contains(&owner) {
                    players.push(owner);
                }
            }
        }
        players
    }

    /// Whether the player owns any vertex with the given port kind
    pub fn owns_port(&self, player: PlayerId, port: PortKind) -> bool {
        self.vertices
            .iter()
            .any(|v| v.port == Some(port) && v.building.owner() == Some(player))
    }

    // ----- longest road -----

    /// Longest continuous road for a player, in edges.
    ///
    /// Runs a depth-first walk from both endpoints of every road the player
    /// owns. An edge may appear once per walk (visited set is per-walk,
    /// backtracked on return). A vertex holding an opposing building cuts
    /// the branch; the player's own buildings do not.
    pub fn longest_road(&self, player: PlayerId) -> u32 {
        let mut best = 0;
        let mut visited = vec![false; self.edges.len()];

        for (id, edge) in self.edges.iter().enumerate() {
            if edge.building != EdgeBuilding::Road(player) {
                continue;
            }
            for &start in &edge.vertices {
                visited[id] = true;
                best = best.max(self.walk_roads(player, start, &mut visited, 1));
                visited[id] = false;
            }
        }
        best
    }

    fn walk_roads(
        &self,
        player: PlayerId,
        from: VertexId,
        visited: &mut [bool],
        length: u32,
    ) -> u32 {
        // An enemy building severs the road at this vertex.
        if let Some(owner) = self.vertices[from].building.owner() {
            if owner != player {
                return length;
            }
        }

        let mut best = length;
        for &e in &self.vertices[from].edges {
            if visited[e] || self.edges[e].building != EdgeBuilding::Road(player) {
                continue;
            }
            visited[e] = true;
            let next = self.other_endpoint(e, from);
            best = best.max(self.walk_roads(player, next, visited, length + 1));
            visited[e] = false;
        }
        best
    }
}
