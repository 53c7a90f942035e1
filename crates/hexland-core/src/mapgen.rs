//! Seeded board generation.
//!
//! Generation is a pure function of `(radius, seed)`: the server hands the
//! same seed to every client and each one regenerates an identical board.
//! Land tiles fill the hex disc of the given radius, surrounded by a ring
//! of beach tiles; the desert sits at the origin with the robber on it.
//! Production numbers are drawn from the standard token pool and reshuffled
//! until no two equal numbers touch and 6 never touches 8 (bounded retries,
//! then the last shuffle is accepted). Nine ports land on coastal edges of
//! the border tiles.

use crate::board::{
    Board, Edge, EdgeBuilding, PortKind, Resource, Tile, TileKind, Vertex, VertexBuilding,
};
use crate::hex::{EdgeDirection, HexCoord, VertexDirection};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// The standard production-number token pool for a radius-2 map (18 land
/// tiles minus the desert). Larger maps cycle through it.
const NUMBER_POOL: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Base resource pool for a radius-2 map. Larger maps top up uniformly.
const RESOURCE_POOL: [(Resource, usize); 5] = [
    (Resource::Wood, 4),
    (Resource::Wheat, 4),
    (Resource::Sheep, 4),
    (Resource::Brick, 3),
    (Resource::Ore, 3),
];

/// Number of generic 3:1 ports; each resource additionally gets one 2:1 port.
const ANY_PORTS: usize = 4;

const NUMBER_SHUFFLE_ATTEMPTS: usize = 100;

/// Generate a board from a map radius and a shared seed.
pub fn generate(radius: u8, seed: u64) -> Board {
    let mut rng = StdRng::seed_from_u64(seed);
    let radius = radius.max(1);

    let land = disc_coords(radius as i32);
    let beach = ring_coords(radius as i32 + 1);

    let kinds = assign_kinds(&land, &mut rng);
    let numbers = assign_numbers(&land, &kinds, &mut rng);

    let mut builder = Builder::default();
    let mut tiles = Vec::with_capacity(land.len() + beach.len());
    let mut robber_tile = 0;

    for (i, &coord) in land.iter().enumerate() {
        let kind = kinds[i];
        let id = tiles.len();
        let vertices = builder.tile_vertices(coord, id);
        if kind == TileKind::Desert {
            robber_tile = id;
        }
        tiles.push(Tile {
            coord,
            kind,
            number: numbers[i],
            has_robber: kind == TileKind::Desert,
            vertices,
        });
    }

    // Beach tiles exist for layout only; they get no vertices.
    for &coord in &beach {
        tiles.push(Tile {
            coord,
            kind: TileKind::Beach,
            number: 0,
            has_robber: false,
            vertices: Vec::new(),
        });
    }

    let mut board = Board {
        tiles,
        vertices: builder.vertices,
        edges: builder.edges,
        robber_tile,
        radius,
    };

    place_ports(&mut board, &land, radius, &builder.vertex_ids, &mut rng);

    board
}

/// All coordinates with ring index <= radius, in a fixed scan order.
fn disc_coords(radius: i32) -> Vec<HexCoord> {
    let mut coords = Vec::new();
    for q in -radius..=radius {
        for r in -radius..=radius {
            let c = HexCoord::new(q, r);
            if c.ring() <= radius as u32 {
                coords.push(c);
            }
        }
    }
    coords
}

/// All coordinates with ring index exactly `radius`
fn ring_coords(radius: i32) -> Vec<HexCoord> {
    let mut coords = Vec::new();
    for q in -radius..=radius {
        for r in -radius..=radius {
            let c = HexCoord::new(q, r);
            if c.ring() == radius as u32 {
                coords.push(c);
            }
        }
    }
    coords
}

fn assign_kinds(land: &[HexCoord], rng: &mut StdRng) -> Vec<TileKind> {
    let mut pool: Vec<Resource> = RESOURCE_POOL
        .iter()
        .flat_map(|&(r, n)| std::iter::repeat(r).take(n))
        .collect();
    pool.shuffle(rng);

    land.iter()
        .map(|c| {
            if c.ring() == 0 {
                TileKind::Desert
            } else {
                let resource = pool
                    .pop()
                    .unwrap_or_else(|| Resource::ALL[rng.gen_range(0..Resource::ALL.len())]);
                TileKind::Producing(resource)
            }
        })
        .collect()
}

/// Draw production numbers, retrying the shuffle while two equal numbers or
/// a 6 and an 8 sit on adjacent tiles.
fn assign_numbers(land: &[HexCoord], kinds: &[TileKind], rng: &mut StdRng) -> Vec<u8> {
    let producing: Vec<usize> = (0..land.len())
        .filter(|&i| kinds[i].resource().is_some())
        .collect();

    let mut pool: Vec<u8> = NUMBER_POOL
        .iter()
        .cycle()
        .take(producing.len())
        .copied()
        .collect();

    let mut numbers = vec![0u8; land.len()];
    for attempt in 0..NUMBER_SHUFFLE_ATTEMPTS {
        pool.shuffle(rng);
        for (slot, &i) in producing.iter().enumerate() {
            numbers[i] = pool[slot];
        }
        if attempt == NUMBER_SHUFFLE_ATTEMPTS - 1 || numbers_acceptable(land, &numbers) {
            break;
        }
    }
    numbers
}

fn numbers_acceptable(land: &[HexCoord], numbers: &[u8]) -> bool {
    let by_coord: HashMap<HexCoord, u8> = land.iter().copied().zip(numbers.iter().copied()).collect();

    for (i, coord) in land.iter().enumerate() {
        let a = numbers[i];
        if a == 0 {
            continue;
        }
        for neighbor in coord.neighbors() {
            let Some(&b) = by_coord.get(&neighbor) else {
                continue;
            };
            if b == 0 {
                continue;
            }
            if a == b {
                return false;
            }
            if (a == 6 && b == 8) || (a == 8 && b == 6) {
                return false;
            }
        }
    }
    true
}

/// Incrementally builds the vertex/edge arenas while tiles are added.
/// The coordinate keyed maps are dropped with the builder once the board
/// is assembled.
#[derive(Default)]
struct Builder {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    vertex_ids: HashMap<(HexCoord, VertexDirection), usize>,
    edge_ids: HashMap<(usize, usize), usize>,
}

impl Builder {
    /// Register the six corners and six edges of a land tile, returning the
    /// tile's vertex list in clockwise order.
    fn tile_vertices(&mut self, coord: HexCoord, tile_id: usize) -> Vec<usize> {
        let corners = coord.corners();
        let ids: Vec<usize> = corners
            .iter()
            .map(|&key| self.vertex_id(key, tile_id))
            .collect();

        for i in 0..6 {
            self.edge_id(ids[i], ids[(i + 1) % 6]);
        }
        ids
    }

    fn vertex_id(&mut self, key: (HexCoord, VertexDirection), tile_id: usize) -> usize {
        let id = match self.vertex_ids.get(&key) {
            Some(&id) => id,
            None => {
                let id = self.vertices.len();
                self.vertices.push(Vertex {
                    building: VertexBuilding::Empty,
                    port: None,
                    edges: Vec::new(),
                    tiles: Vec::new(),
                });
                self.vertex_ids.insert(key, id);
                id
            }
        };
        self.vertices[id].tiles.push(tile_id);
        id
    }

    fn edge_id(&mut self, a: usize, b: usize) -> usize {
        let key = (a.min(b), a.max(b));
        if let Some(&id) = self.edge_ids.get(&key) {
            return id;
        }
        let id = self.edges.len();
        self.edges.push(Edge {
            building: EdgeBuilding::Empty,
            vertices: [a, b],
        });
        self.edge_ids.insert(key, id);
        self.vertices[a].edges.push(id);
        self.vertices[b].edges.push(id);
        id
    }
}

/// Scatter ports over coastal edges of border tiles: four generic ports
/// plus one exact port per resource. Both endpoint vertices of a chosen
/// coastal edge carry the port.
fn place_ports(
    board: &mut Board,
    land: &[HexCoord],
    radius: u8,
    vertex_ids: &HashMap<(HexCoord, VertexDirection), usize>,
    rng: &mut StdRng,
) {
    let mut pool: Vec<PortKind> = std::iter::repeat(PortKind::Any)
        .take(ANY_PORTS)
        .chain(Resource::ALL.iter().map(|&r| PortKind::Exact(r)))
        .collect();
    pool.shuffle(rng);

    // Every (border tile, outward edge) pair is a candidate port location.
    let mut candidates: Vec<(usize, usize)> = Vec::new();
    for &coord in land.iter().filter(|c| c.ring() == radius as u32) {
        let corners = coord.corners();
        for (i, dir) in EdgeDirection::ALL.iter().enumerate() {
            if coord.neighbor(*dir).ring() <= radius as u32 {
                continue;
            }
            let a = vertex_ids[&corners[i]];
            let b = vertex_ids[&corners[(i + 1) % 6]];
            candidates.push((a, b));
        }
    }
    candidates.shuffle(rng);

    for (a, b) in candidates {
        if board.vertices[a].port.is_some() || board.vertices[b].port.is_some() {
            continue;
        }
        let Some(port) = pool.pop() else {
            break;
        };
        board.vertices[a].port = Some(port);
        board.vertices[b].port = Some(port);
    }
}
