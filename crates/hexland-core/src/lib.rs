//! Hexland - a hex territory-and-trade board game engine
//!
//! This crate provides the core game logic for Hexland, including:
//! - Hex coordinate system used while constructing the board
//! - Board arena with tiles, vertices, and edges addressed by index
//! - Seeded map generation shared between server and clients
//! - Player state and resource management
//! - Match state machine with placement, trade, card, and victory rules
//! - Player controllers and the AI driver loop
//!
//! # Architecture
//!
//! The engine is synchronous and I/O-free. A caller — human UI, AI
//! controller, or the network session layer — owns a [`MatchState`] and
//! invokes its operations; `can_*` predicates come first, mutations after.
//! In networked play every participant regenerates the same board from a
//! shared seed and replays the same action stream.
//!
//! # Modules
//!
//! - [`hex`]: axial coordinates, used during board construction
//! - [`board`]: the tile/vertex/edge arena and adjacency queries
//! - [`mapgen`]: seeded board generation
//! - [`player`]: resources, development cards, player state
//! - [`game`]: the match state machine and rule engine
//! - [`controller`]: player controllers and the AI turn driver

pub mod board;
pub mod controller;
pub mod game;
pub mod hex;
pub mod mapgen;
pub mod player;

// Re-export commonly used types
pub use board::{
    Board, Edge, EdgeBuilding, EdgeId, PlayerId, PortKind, Resource, Tile, TileId, TileKind,
    Vertex, VertexBuilding, VertexId,
};
pub use controller::{AiController, PipStrategy, PlayerController, Strategy};
pub use game::{GamePhase, MatchState, TurnStep};
pub use hex::{EdgeDirection, HexCoord, VertexDirection};
pub use player::{DevCardType, Player, ResourceHand};
