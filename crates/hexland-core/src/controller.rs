//! Player controllers and the match driver loop.
//!
//! A [`PlayerController`] drives one seat through the same public
//! [`MatchState`] operations a human UI calls; nothing in the engine is
//! reserved for AI use. Scoring heuristics live behind the [`Strategy`]
//! trait so they can be swapped without touching the engine contract.
//!
//! [`run_ai_turns`] is the driver: after any turn-advancing mutation it
//! keeps invoking controllers while the current seat is AI-driven, so
//! chained AI turns are a plain loop rather than re-entrant calls into
//! the state machine.

use crate::board::{Board, PlayerId, Resource, TileId, VertexId};
use crate::game::{GamePhase, MatchState, TurnStep};
use crate::player::{costs, DevCardType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A seat driver: performs one setup placement or one full turn per call.
pub trait PlayerController {
    /// Place one settlement/road pair during a setup round
    fn take_setup_placement(&mut self, game: &mut MatchState, player: PlayerId);

    /// Play one complete turn: roll, resolve, build, end
    fn take_turn(&mut self, game: &mut MatchState, player: PlayerId);
}

/// Pluggable scoring heuristics for an [`AiController`]
pub trait Strategy {
    /// Desirability of settling a vertex
    fn score_vertex(&self, board: &Board, vertex: VertexId) -> i32;

    /// Desirability of parking the robber on a tile, from `player`'s view
    fn score_robber_tile(&self, board: &Board, tile: TileId, player: PlayerId) -> i32;
}

/// Default heuristics: production pips plus a port bonus; robber targets
/// tiles crowded with opposing buildings.
pub struct PipStrategy;

impl PipStrategy {
    /// Expected-frequency weight of a production number
    fn pips(number: u8) -> i32 {
        match number {
            6 | 8 => 5,
            5 | 9 => 4,
            4 | 10 => 3,
            3 | 11 => 2,
            2 | 12 => 1,
            _ => 0,
        }
    }
}

impl Strategy for PipStrategy {
    fn score_vertex(&self, board: &Board, vertex: VertexId) -> i32 {
        let mut score = 0;
        for &t in board.adjacent_tiles(vertex) {
            if board.tiles[t].kind.resource().is_some() {
                score += Self::pips(board.tiles[t].number);
            }
        }
        if board.vertices[vertex].port.is_some() {
            score += 1;
        }
        score
    }

    fn score_robber_tile(&self, board: &Board, tile: TileId, player: PlayerId) -> i32 {
        let mut score = 0;
        for p in board.players_adjacent_to_tile(tile) {
            if p == player {
                // Never rob our own production.
                return -10;
            }
            score += 2;
        }
        score + Self::pips(board.tiles[tile].number)
    }
}

/// An AI seat driver built on a [`Strategy`]
pub struct AiController {
    strategy: Box<dyn Strategy>,
    rng: StdRng,
}

impl AiController {
    pub fn new(strategy: Box<dyn Strategy>, seed: u64) -> Self {
        Self {
            strategy,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Default controller with [`PipStrategy`]
    pub fn with_default_strategy(seed: u64) -> Self {
        Self::new(Box::new(PipStrategy), seed)
    }

    fn best_settlement_spot(&self, game: &MatchState, player: PlayerId) -> Option<VertexId> {
        (0..game.board.vertices.len())
            .filter(|&v| game.can_build_settlement(player, v))
            .max_by_key(|&v| self.strategy.score_vertex(&game.board, v))
    }

    fn any_legal_road(&self, game: &MatchState, player: PlayerId) -> Option<usize> {
        (0..game.board.edges.len()).find(|&e| game.can_build_road(player, e))
    }

    fn move_robber(&mut self, game: &mut MatchState, player: PlayerId) {
        let best = (0..game.board.tiles.len())
            .filter(|&t| game.can_move_robber(player, t))
            .max_by_key(|&t| self.strategy.score_robber_tile(&game.board, t, player));
        if let Some(tile) = best {
            game.move_robber_to(player, tile);
        }
    }

    /// Most common resource across opposing hands, for Monopoly
    fn monopoly_pick(&self, game: &MatchState, player: PlayerId) -> Resource {
        Resource::ALL
            .into_iter()
            .max_by_key(|&r| {
                game.players
                    .iter()
                    .filter(|p| p.id != player)
                    .map(|p| p.resources.get(r))
                    .sum::<u32>()
            })
            .unwrap_or(Resource::Wood)
    }

    fn play_cards(&mut self, game: &mut MatchState, player: PlayerId) {
        if game.players[player as usize].holds_card(DevCardType::RoadBuilding)
            && game.use_card(player, DevCardType::RoadBuilding)
        {
            while game.step == TurnStep::RoadBuildingCard {
                match self.any_legal_road(game, player) {
                    Some(e) => game.build_road(player, e),
                    None => break,
                }
            }
        }

        if game.players[player as usize].holds_card(DevCardType::Monopoly)
            && game.use_card(player, DevCardType::Monopoly)
        {
            let pick = self.monopoly_pick(game, player);
            game.execute_monopoly(player, pick);
        }

        if game.players[player as usize].holds_card(DevCardType::Knight)
            && game.use_card(player, DevCardType::Knight)
        {
            self.move_robber(game, player);
        }
    }

    fn build_phase(&mut self, game: &mut MatchState, player: PlayerId) {
        // Cities first: biggest VP return for the hand.
        loop {
            let own_settlement = (0..game.board.vertices.len())
                .find(|&v| game.can_upgrade_city(player, v));
            let Some(v) = own_settlement else { break };
            if !game.players[player as usize]
                .resources
                .try_consume(&costs::city())
            {
                break;
            }
            game.upgrade_to_city(player, v);
            if game.is_over() {
                return;
            }
        }

        while let Some(v) = self.best_settlement_spot(game, player) {
            if !game.players[player as usize]
                .resources
                .try_consume(&costs::settlement())
            {
                break;
            }
            game.build_settlement(player, v);
            if game.is_over() {
                return;
            }
        }

        // Roads expand toward the next settlement spot; cap per turn so a
        // flush hand does not pave the whole board.
        for _ in 0..2 {
            if !game.players[player as usize]
                .resources
                .can_afford(&costs::road())
            {
                break;
            }
            let Some(e) = self.any_legal_road(game, player) else {
                break;
            };
            game.players[player as usize]
                .resources
                .try_consume(&costs::road());
            game.build_road(player, e);
            if game.is_over() {
                return;
            }
        }

        if self.rng.gen_bool(0.5) {
            game.buy_card(player);
        }
    }
}

impl PlayerController for AiController {
    fn take_setup_placement(&mut self, game: &mut MatchState, player: PlayerId) {
        if game.step == TurnStep::PlaceSettlement {
            if let Some(v) = self.best_settlement_spot(game, player) {
                game.build_settlement(player, v);
            }
        }
        if game.step == TurnStep::PlaceRoad {
            if let Some(e) = self.any_legal_road(game, player) {
                game.build_road(player, e);
            }
        }
    }

    fn take_turn(&mut self, game: &mut MatchState, player: PlayerId) {
        if game.roll_dice(player).is_some() && game.step == TurnStep::MoveRobber {
            self.move_robber(game, player);
        }
        if game.is_over() {
            return;
        }

        self.play_cards(game, player);
        if game.is_over() {
            return;
        }

        self.build_phase(game, player);
        if game.is_over() {
            return;
        }

        game.end_turn(player);
    }
}

/// Drive consecutive AI turns until the current seat is human-controlled
/// or the match ends. `controllers` is indexed by player id; seats without
/// a controller (or non-AI seats) hand control back to the caller.
///
/// If a controller fails to advance the match the loop bails out instead
/// of spinning.
pub fn run_ai_turns(game: &mut MatchState, controllers: &mut [AiController]) {
    loop {
        if game.is_over() {
            return;
        }
        let player = game.current_player;
        if !game.players[player as usize].is_ai {
            return;
        }
        let Some(controller) = controllers.get_mut(player as usize) else {
            return;
        };

        let before = (game.phase, game.step, game.current_player);
        match game.phase {
            GamePhase::Setup1 | GamePhase::Setup2 => {
                controller.take_setup_placement(game, player);
            }
            GamePhase::Playing => controller.take_turn(game, player),
        }

        if (game.phase, game.step, game.current_player) == before && !game.is_over() {
            // Stuck controller; surface control to the caller.
            return;
        }
    }
}
