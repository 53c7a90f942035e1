//! Match state machine and rule engine.
//!
//! [`MatchState`] is the single context object for one match: the board,
//! the players, the turn/phase machine, the development card deck, and the
//! longest-road / largest-army records. Everything a caller (human UI, AI
//! controller, or network relay) does goes through its public operations.
//!
//! The operation surface follows a predicate/mutator split: every mutation
//! has a `can_*` predicate that callers check first. Mutators that take no
//! cost themselves (settlements, cities, roads) expect the caller to have
//! debited the building cost via [`ResourceHand::try_consume`] beforehand;
//! they only apply the board change and advance the state machine. Illegal
//! invocations are a caller bug, not a runtime error.

use crate::board::{Board, EdgeId, PlayerId, PortKind, Resource, TileId, VertexBuilding, VertexId};
use crate::mapgen;
use crate::player::{DevCardType, Player, ResourceHand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Minimum road length to claim Longest Road
pub const MIN_LONGEST_ROAD: u32 = 5;

/// Minimum played knights to claim Largest Army
pub const MIN_LARGEST_ARMY: u32 = 3;

/// Default victory point threshold
pub const DEFAULT_VICTORY_TARGET: u32 = 10;

/// Hand size above which a roll of 7 forces a discard
const BURST_LIMIT: u32 = 7;

/// Major phase of the match (one-way progression)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// First placement round, forward turn order
    Setup1,
    /// Second placement round, reverse turn order
    Setup2,
    /// Normal play
    Playing,
}

impl GamePhase {
    /// Whether this is one of the two placement rounds
    pub fn is_setup(&self) -> bool {
        matches!(self, GamePhase::Setup1 | GamePhase::Setup2)
    }
}

/// What the current player is expected to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnStep {
    /// Setup: place a settlement
    PlaceSettlement,
    /// Setup: place the road paired with the settlement just placed
    PlaceRoad,
    /// Normal play: roll, build, trade, end turn
    Waiting,
    /// A 7 was rolled or a Knight played; the robber must move
    MoveRobber,
    /// RoadBuilding card active; free roads remain
    RoadBuildingCard,
    /// Monopoly card active; a resource kind must be named
    Monopoly,
}

/// Complete state of one match
pub struct MatchState {
    pub board: Board,
    pub players: Vec<Player>,
    pub phase: GamePhase,
    pub step: TurnStep,
    pub current_player: PlayerId,
    /// Settlement placed this setup turn; its paired road must touch it
    pub last_settlement: Option<VertexId>,
    /// Whether the current player has rolled this turn
    pub has_rolled: bool,
    /// Free roads remaining from an active RoadBuilding card
    pub free_roads: u8,
    pub longest_road_owner: Option<PlayerId>,
    pub longest_road_length: u32,
    pub largest_army_owner: Option<PlayerId>,
    pub largest_army_count: u32,
    /// Remaining development cards, top of deck last
    pub deck: Vec<DevCardType>,
    pub victory_target: u32,
    pub winner: Option<PlayerId>,
    rng: StdRng,
}

impl MatchState {
    /// Start a new match. `seats` gives each player's name and whether an
    /// AI controller drives the seat; the board and deck are derived from
    /// the shared seed so every participant builds the same match.
    pub fn new(seats: &[(&str, bool)], radius: u8, seed: u64) -> Self {
        let board = mapgen::generate(radius, seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let deck = DevCardType::shuffled_deck(&mut rng);

        let players = seats
            .iter()
            .enumerate()
            .map(|(i, &(name, is_ai))| Player::new(i as PlayerId, name.to_string(), is_ai))
            .collect();

        Self {
            board,
            players,
            phase: GamePhase::Setup1,
            step: TurnStep::PlaceSettlement,
            current_player: 0,
            last_settlement: None,
            has_rolled: false,
            free_roads: 0,
            longest_road_owner: None,
            longest_road_length: 0,
            largest_army_owner: None,
            largest_army_count: 0,
            deck,
            victory_target: DEFAULT_VICTORY_TARGET,
            winner: None,
            rng,
        }
    }

    /// Whether the match has ended
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    fn is_current(&self, player: PlayerId) -> bool {
        !self.is_over() && player == self.current_player
    }

    // ----- placement -----

    /// Whether `player` may build a settlement at `vertex` right now
    pub fn can_build_settlement(&self, player: PlayerId, vertex: VertexId) -> bool {
        if !self.is_current(player) {
            return false;
        }
        if self.board.vertices[vertex].building != VertexBuilding::Empty {
            return false;
        }
        if !self.board.satisfies_distance_rule(vertex) {
            return false;
        }
        if self.phase.is_setup() {
            return self.step == TurnStep::PlaceSettlement;
        }
        // Normal play: must attach to the player's road network.
        self.step == TurnStep::Waiting && self.board.has_road_at(vertex, player)
    }

    /// Build a settlement. Precondition: [`Self::can_build_settlement`]
    /// holds and, outside setup, the caller has paid the settlement cost.
    pub fn build_settlement(&mut self, player: PlayerId, vertex: VertexId) {
        debug_assert!(self.can_build_settlement(player, vertex));

        self.board.place_settlement(vertex, player);
        self.last_settlement = Some(vertex);

        match self.phase {
            GamePhase::Setup1 => {
                self.step = TurnStep::PlaceRoad;
            }
            GamePhase::Setup2 => {
                // Second-round settlement grants one of each adjacent
                // producing resource.
                for &t in self.board.adjacent_tiles(vertex) {
                    if let Some(resource) = self.board.tiles[t].kind.resource() {
                        self.players[player as usize].resources.add(resource, 1);
                    }
                }
                self.step = TurnStep::PlaceRoad;
            }
            GamePhase::Playing => {
                self.check_victory();
            }
        }
    }

    /// Whether `player` may build a road on `edge` right now
    pub fn can_build_road(&self, player: PlayerId, edge: EdgeId) -> bool {
        if !self.is_current(player) {
            return false;
        }
        if self.board.edges[edge].building.owner().is_some() {
            return false;
        }
        if self.phase.is_setup() {
            // The setup road pairs with the settlement just placed.
            return self.step == TurnStep::PlaceRoad
                && self
                    .last_settlement
                    .is_some_and(|v| self.board.edge_touches(edge, v));
        }
        let step_ok = self.step == TurnStep::Waiting || self.step == TurnStep::RoadBuildingCard;
        step_ok && self.board.edge_connects_to_network(edge, player)
    }

    /// Build a road. Precondition: [`Self::can_build_road`] holds and, in
    /// normal play outside an active RoadBuilding card, the caller has paid
    /// the road cost.
    pub fn build_road(&mut self, player: PlayerId, edge: EdgeId) {
        debug_assert!(self.can_build_road(player, edge));

        self.board.place_road(edge, player);
        self.update_longest_road(player);

        if self.phase.is_setup() {
            self.advance_setup_turn();
        } else {
            if self.step == TurnStep::RoadBuildingCard {
                self.free_roads = self.free_roads.saturating_sub(1);
                if self.free_roads == 0 {
                    self.step = TurnStep::Waiting;
                }
            }
            self.check_victory();
        }
    }

    /// Whether `player` may upgrade the settlement at `vertex` to a city
    pub fn can_upgrade_city(&self, player: PlayerId, vertex: VertexId) -> bool {
        self.is_current(player)
            && self.phase == GamePhase::Playing
            && self.step == TurnStep::Waiting
            && self.board.vertices[vertex].building == VertexBuilding::Settlement(player)
    }

    /// Upgrade to a city. Precondition: [`Self::can_upgrade_city`] holds
    /// and the caller has paid the city cost.
    pub fn upgrade_to_city(&mut self, player: PlayerId, vertex: VertexId) {
        debug_assert!(self.can_upgrade_city(player, vertex));

        self.board.upgrade_to_city(vertex, player);
        self.check_victory();
    }

    // ----- trade -----

    /// Units of `give` needed for one unit of anything else: 4 base, 3
    /// with any generic port, 2 with a port matching the exact resource
    /// (the exact port always wins).
    pub fn trade_cost(&self, player: PlayerId, give: Resource) -> u32 {
        if self.board.owns_port(player, PortKind::Exact(give)) {
            return 2;
        }
        if self.board.owns_port(player, PortKind::Any) {
            return 3;
        }
        4
    }

    /// Execute a maritime trade: debit `cost` units of `give`, credit one
    /// unit of `get`. Precondition: it is `player`'s turn in normal play,
    /// `cost` came from [`Self::trade_cost`], and the hand covers it.
    pub fn execute_trade(&mut self, player: PlayerId, give: Resource, get: Resource, cost: u32) {
        debug_assert!(self.is_current(player) && self.phase == GamePhase::Playing);
        debug_assert!(self.players[player as usize].resources.get(give) >= cost);

        let hand = &mut self.players[player as usize].resources;
        hand.consume(give, cost);
        hand.add(get, 1);
    }

    // ----- development cards -----

    /// Buy a development card: costs 1 ore + 1 wheat + 1 sheep, requires a
    /// non-empty deck. Returns false (and changes nothing) on failure.
    pub fn buy_card(&mut self, player: PlayerId) -> bool {
        if !self.is_current(player)
            || self.phase != GamePhase::Playing
            || self.step != TurnStep::Waiting
            || self.deck.is_empty()
        {
            return false;
        }
        if !self.players[player as usize]
            .resources
            .try_consume(&crate::player::costs::development_card())
        {
            return false;
        }
        let Some(card) = self.deck.pop() else {
            return false;
        };
        self.players[player as usize].cards.push(card);
        // A drawn VictoryPoint card can end the match on the spot.
        self.check_victory();
        true
    }

    /// Play a development card from hand. VictoryPoint cards are never
    /// played; attempting to is a no-op and the card stays in hand. A card
    /// is removed from the hand only when its effect applies.
    pub fn use_card(&mut self, player: PlayerId, card: DevCardType) -> bool {
        if !self.is_current(player)
            || self.phase != GamePhase::Playing
            || self.step != TurnStep::Waiting
            || !card.is_playable()
            || !self.players[player as usize].holds_card(card)
        {
            return false;
        }

        match card {
            DevCardType::Knight => {
                self.players[player as usize].remove_card(card);
                self.players[player as usize].used_knights += 1;
                self.update_largest_army(player);
                self.step = TurnStep::MoveRobber;
                self.check_victory();
            }
            DevCardType::RoadBuilding => {
                self.players[player as usize].remove_card(card);
                self.free_roads = 2;
                self.step = TurnStep::RoadBuildingCard;
            }
            DevCardType::Monopoly => {
                self.players[player as usize].remove_card(card);
                self.step = TurnStep::Monopoly;
            }
            DevCardType::VictoryPoint => unreachable!("filtered by is_playable"),
        }
        true
    }

    /// Resolve an active Monopoly card: every other player hands over
    /// their entire holding of `resource`. Valid only in the Monopoly step.
    pub fn execute_monopoly(&mut self, player: PlayerId, resource: Resource) -> bool {
        if !self.is_current(player) || self.step != TurnStep::Monopoly {
            return false;
        }

        let mut collected = 0;
        for other in &mut self.players {
            if other.id == player {
                continue;
            }
            let held = other.resources.get(resource);
            other.resources.consume(resource, held);
            collected += held;
        }
        self.players[player as usize].resources.add(resource, collected);
        self.step = TurnStep::Waiting;
        true
    }

    // ----- dice, production, robber -----

    /// Roll the dice with the match RNG. Returns the two die values, or
    /// None if rolling is not legal right now.
    pub fn roll_dice(&mut self, player: PlayerId) -> Option<(u8, u8)> {
        if !self.can_roll(player) {
            return None;
        }
        let d1 = self.rng.gen_range(1..=6);
        let d2 = self.rng.gen_range(1..=6);
        self.apply_dice_result(player, d1, d2);
        Some((d1, d2))
    }

    /// Whether `player` may roll right now
    pub fn can_roll(&self, player: PlayerId) -> bool {
        self.is_current(player)
            && self.phase == GamePhase::Playing
            && self.step == TurnStep::Waiting
            && !self.has_rolled
    }

    /// Apply a dice result, either from [`Self::roll_dice`] or supplied by
    /// the network session. Precondition: [`Self::can_roll`] holds.
    ///
    /// A total of 7 bursts every overloaded hand and sends the robber
    /// moving; any other total produces resources.
    pub fn apply_dice_result(&mut self, player: PlayerId, d1: u8, d2: u8) {
        debug_assert!(self.can_roll(player));

        self.has_rolled = true;
        let total = d1 + d2;

        if total == 7 {
            self.burst_hands();
            self.step = TurnStep::MoveRobber;
            return;
        }

        for (owner, resource, amount) in self.board.production_for_roll(total) {
            self.players[owner as usize].resources.add(resource, amount);
        }
    }

    /// Every player holding more than [`BURST_LIMIT`] resources discards
    /// half (floor), drawn at random from their held kinds.
    fn burst_hands(&mut self) {
        for i in 0..self.players.len() {
            let total = self.players[i].resources.total();
            if total <= BURST_LIMIT {
                continue;
            }
            for _ in 0..total / 2 {
                if let Some(kind) = self.players[i].resources.random_kind(&mut self.rng) {
                    self.players[i].resources.consume(kind, 1);
                }
            }
        }
    }

    /// Whether the robber may be moved to `tile` right now
    pub fn can_move_robber(&self, player: PlayerId, tile: TileId) -> bool {
        self.is_current(player)
            && self.step == TurnStep::MoveRobber
            && tile != self.board.robber_tile
            && self.board.tiles[tile].kind.accepts_robber()
    }

    /// Move the robber and steal one random resource from one random
    /// player with a building adjacent to the new tile. Returns false if
    /// the move is not legal.
    pub fn move_robber_to(&mut self, player: PlayerId, tile: TileId) -> bool {
        if !self.can_move_robber(player, tile) {
            return false;
        }
        self.board.move_robber(tile);

        let victims: Vec<PlayerId> = self
            .board
            .players_adjacent_to_tile(tile)
            .into_iter()
            .filter(|&p| p != player && !self.players[p as usize].resources.is_empty())
            .collect();

        if !victims.is_empty() {
            let victim = victims[self.rng.gen_range(0..victims.len())];
            if let Some(kind) = self.players[victim as usize]
                .resources
                .random_kind(&mut self.rng)
            {
                self.players[victim as usize].resources.consume(kind, 1);
                self.players[player as usize].resources.add(kind, 1);
            }
        }

        self.step = TurnStep::Waiting;
        true
    }

    // ----- turn machine -----

    /// End the current turn. Requires a dice roll to have happened and no
    /// pending sub-step. Returns false if ending is not legal.
    pub fn end_turn(&mut self, player: PlayerId) -> bool {
        if !self.is_current(player)
            || self.phase != GamePhase::Playing
            || self.step != TurnStep::Waiting
            || !self.has_rolled
        {
            return false;
        }
        self.current_player = (self.current_player + 1) % self.players.len() as PlayerId;
        self.has_rolled = false;
        self.step = TurnStep::Waiting;
        true
    }

    /// Setup turn order: forward through all players, then the last player
    /// again, then backward to player 0, who opens normal play.
    fn advance_setup_turn(&mut self) {
        let last = self.players.len() as PlayerId - 1;
        match self.phase {
            GamePhase::Setup1 => {
                if self.current_player == last {
                    self.phase = GamePhase::Setup2;
                } else {
                    self.current_player += 1;
                }
                self.step = TurnStep::PlaceSettlement;
            }
            GamePhase::Setup2 => {
                if self.current_player == 0 {
                    self.phase = GamePhase::Playing;
                    self.step = TurnStep::Waiting;
                } else {
                    self.current_player -= 1;
                    self.step = TurnStep::PlaceSettlement;
                }
            }
            GamePhase::Playing => {}
        }
    }

    // ----- records & victory -----

    /// Recompute the builder's road length and transfer the Longest Road
    /// record if it is at least 5 and strictly beats the recorded length.
    /// Ties never transfer and the recorded length never decreases.
    fn update_longest_road(&mut self, player: PlayerId) {
        let length = self.board.longest_road(player);
        if length >= MIN_LONGEST_ROAD && length > self.longest_road_length {
            self.longest_road_owner = Some(player);
            self.longest_road_length = length;
        }
    }

    /// Same transfer rule as longest road, for played knights.
    fn update_largest_army(&mut self, player: PlayerId) {
        let count = self.players[player as usize].used_knights;
        if count >= MIN_LARGEST_ARMY && count > self.largest_army_count {
            self.largest_army_owner = Some(player);
            self.largest_army_count = count;
        }
    }

    /// Victory points: settlements + 2 per city + held VictoryPoint cards
    /// + 2 for each of the Longest Road and Largest Army records.
    pub fn victory_points(&self, player: PlayerId) -> u32 {
        let buildings: u32 = self
            .board
            .vertices
            .iter()
            .filter(|v| v.building.owner() == Some(player))
            .map(|v| v.building.victory_points())
            .sum();

        let mut vp = buildings + self.players[player as usize].victory_cards();
        if self.longest_road_owner == Some(player) {
            vp += 2;
        }
        if self.largest_army_owner == Some(player) {
            vp += 2;
        }
        vp
    }

    /// The match ends the moment the current player reaches the target
    /// during normal play. Terminal: nothing mutates afterward.
    fn check_victory(&mut self) {
        if self.phase != GamePhase::Playing || self.is_over() {
            return;
        }
        if self.victory_points(self.current_player) >= self.victory_target {
            self.winner = Some(self.current_player);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::costs;
    use pretty_assertions::assert_eq;

    fn three_player_game() -> MatchState {
        MatchState::new(
            &[("Alice", false), ("Bob", false), ("Carol", true)],
            2,
            42,
        )
    }

    /// Place one legal settlement/road pair for the current setup player
    fn place_setup_pair(game: &mut MatchState) -> (PlayerId, VertexId) {
        let p = game.current_player;
        let v = (0..game.board.vertices.len())
            .find(|&v| game.can_build_settlement(p, v))
            .expect("a legal setup vertex exists");
        game.build_settlement(p, v);

        let e = game
            .board
            .adjacent_edges(v)
            .iter()
            .copied()
            .find(|&e| game.can_build_road(p, e))
            .expect("a legal setup edge exists");
        game.build_road(p, e);
        (p, v)
    }

    fn complete_setup(game: &mut MatchState) {
        while game.phase != GamePhase::Playing {
            place_setup_pair(game);
        }
    }

    #[test]
    fn test_setup_turn_order() {
        let mut game = three_player_game();
        let mut order = Vec::new();

        while game.phase != GamePhase::Playing {
            let (p, _) = place_setup_pair(&mut game);
            order.push(p);
        }

        assert_eq!(order, vec![0, 1, 2, 2, 1, 0]);
        assert_eq!(game.current_player, 0);
        assert_eq!(game.step, TurnStep::Waiting);
    }

    #[test]
    fn test_setup_second_settlement_grants_resources() {
        let mut game = three_player_game();

        // First round grants nothing.
        place_setup_pair(&mut game);
        assert_eq!(game.players[0].resources.total(), 0);

        place_setup_pair(&mut game);
        place_setup_pair(&mut game);

        // Second round: player 2 goes again and collects one per adjacent
        // producing tile.
        let (p, v) = place_setup_pair(&mut game);
        assert_eq!(p, 2);
        let producing = game
            .board
            .adjacent_tiles(v)
            .iter()
            .filter(|&&t| game.board.tiles[t].kind.resource().is_some())
            .count() as u32;
        assert_eq!(game.players[2].resources.total(), producing);
    }

    #[test]
    fn test_distance_rule_blocks_adjacent_settlement() {
        let mut game = three_player_game();

        let (_, v) = place_setup_pair(&mut game);
        let p = game.current_player;
        for n in game.board.neighbor_vertices(v) {
            assert!(!game.can_build_settlement(p, n));
        }
    }

    #[test]
    fn test_playing_requires_roll_before_end_turn() {
        let mut game = three_player_game();
        complete_setup(&mut game);

        assert!(!game.end_turn(0));
        assert!(game.can_roll(0));

        game.apply_dice_result(0, 2, 3);
        assert!(!game.can_roll(0), "only one roll per turn");
        assert!(game.end_turn(0));
        assert_eq!(game.current_player, 1);
        assert!(!game.has_rolled);
    }

    #[test]
    fn test_turn_ownership() {
        let mut game = three_player_game();
        complete_setup(&mut game);

        assert!(!game.can_roll(1));
        assert!(game.roll_dice(1).is_none());
        assert!(!game.end_turn(2));
    }

    #[test]
    fn test_seven_bursts_without_production() {
        let mut game = three_player_game();
        complete_setup(&mut game);

        game.players[1].resources = ResourceHand::with_amounts(3, 2, 2, 1, 1); // 9 cards
        game.players[2].resources = ResourceHand::with_amounts(1, 1, 1, 1, 1); // 5 cards
        let p0_before = game.players[0].resources.clone();

        game.apply_dice_result(0, 3, 4);

        // floor(9/2) = 4 discarded; hands at or under the limit untouched;
        // no tile produced anything.
        assert_eq!(game.players[1].resources.total(), 5);
        assert_eq!(game.players[2].resources.total(), 5);
        assert_eq!(game.players[0].resources, p0_before);
        assert_eq!(game.step, TurnStep::MoveRobber);
    }

    #[test]
    fn test_move_robber_rejects_same_tile() {
        let mut game = three_player_game();
        complete_setup(&mut game);
        game.apply_dice_result(0, 3, 4);

        let here = game.board.robber_tile;
        assert!(!game.move_robber_to(0, here));
        assert_eq!(game.step, TurnStep::MoveRobber);

        let target = (0..game.board.tiles.len())
            .find(|&t| game.can_move_robber(0, t))
            .unwrap();
        assert!(game.move_robber_to(0, target));
        assert_eq!(game.board.robber_tile, target);
        assert_eq!(game.step, TurnStep::Waiting);
    }

    #[test]
    fn test_robber_steals_one_resource() {
        let mut game = three_player_game();
        complete_setup(&mut game);
        game.apply_dice_result(0, 3, 4);

        // Park the robber next to one of player 1's buildings.
        let target = (0..game.board.vertices.len())
            .filter(|&v| game.board.vertices[v].building.owner() == Some(1))
            .flat_map(|v| game.board.adjacent_tiles(v).to_vec())
            .find(|&t| game.can_move_robber(0, t))
            .expect("a robber target next to player 1 exists");

        // Player 1 is the only possible victim.
        game.players[1].resources = ResourceHand::with_amounts(0, 2, 0, 0, 0);
        game.players[2].resources = ResourceHand::new();
        let brick_before = game.players[0].resources.brick;

        assert!(game.move_robber_to(0, target));

        assert_eq!(game.players[1].resources.total(), 1);
        assert_eq!(game.players[0].resources.brick, brick_before + 1);
    }

    #[test]
    fn test_trade_cost_rates() {
        let mut game = three_player_game();

        assert_eq!(game.trade_cost(0, Resource::Brick), 4);

        // Generic port drops the rate to 3.
        let any_port = game
            .board
            .vertices
            .iter()
            .position(|v| v.port == Some(PortKind::Any))
            .unwrap();
        game.board.place_settlement(any_port, 0);
        assert_eq!(game.trade_cost(0, Resource::Brick), 3);

        // An exact port wins over the generic one.
        let brick_port = game
            .board
            .vertices
            .iter()
            .position(|v| v.port == Some(PortKind::Exact(Resource::Brick)))
            .unwrap();
        game.board.place_settlement(brick_port, 0);
        assert_eq!(game.trade_cost(0, Resource::Brick), 2);
        assert_eq!(game.trade_cost(0, Resource::Ore), 3);
    }

    #[test]
    fn test_execute_trade() {
        let mut game = three_player_game();
        complete_setup(&mut game);
        game.apply_dice_result(0, 2, 3);

        game.players[0].resources = ResourceHand::with_amounts(4, 0, 0, 0, 0);
        let cost = game.trade_cost(0, Resource::Wood);
        game.execute_trade(0, Resource::Wood, Resource::Ore, cost);

        assert_eq!(game.players[0].resources.wood, 4 - cost);
        assert_eq!(game.players[0].resources.ore, 1);
    }

    #[test]
    fn test_buy_card() {
        let mut game = three_player_game();
        complete_setup(&mut game);
        game.apply_dice_result(0, 2, 3);

        game.players[0].resources = ResourceHand::new();
        assert!(!game.buy_card(0), "cannot afford");

        game.players[0].resources = ResourceHand::with_amounts(0, 0, 1, 1, 1);
        let deck_before = game.deck.len();
        assert!(game.buy_card(0));
        assert_eq!(game.deck.len(), deck_before - 1);
        assert_eq!(game.players[0].cards.len(), 1);
        assert!(game.players[0].resources.is_empty());

        // Deck exhaustion is a plain failure.
        game.players[0].resources = ResourceHand::with_amounts(0, 0, 1, 1, 1);
        game.deck.clear();
        assert!(!game.buy_card(0));
        assert_eq!(game.players[0].resources.total(), 3);
    }

    #[test]
    fn test_victory_point_card_cannot_be_played() {
        let mut game = three_player_game();
        complete_setup(&mut game);
        game.apply_dice_result(0, 2, 3);

        game.players[0].cards.push(DevCardType::VictoryPoint);
        assert!(!game.use_card(0, DevCardType::VictoryPoint));
        assert!(game.players[0].holds_card(DevCardType::VictoryPoint));
    }

    #[test]
    fn test_knight_card_and_largest_army() {
        let mut game = three_player_game();
        complete_setup(&mut game);

        for round in 0..3 {
            game.apply_dice_result(0, 2, 3);
            game.players[0].cards.push(DevCardType::Knight);
            assert!(game.use_card(0, DevCardType::Knight));
            assert_eq!(game.step, TurnStep::MoveRobber);

            let target = (0..game.board.tiles.len())
                .find(|&t| game.can_move_robber(0, t))
                .unwrap();
            assert!(game.move_robber_to(0, target));

            if round < 2 {
                assert_eq!(game.largest_army_owner, None);
            }
            assert!(game.end_turn(0));
            // Hand the turn straight back for the next round.
            game.current_player = 0;
        }

        assert_eq!(game.players[0].used_knights, 3);
        assert_eq!(game.largest_army_owner, Some(0));
        assert_eq!(game.largest_army_count, 3);

        // A tie does not transfer the record.
        game.players[1].used_knights = 3;
        game.current_player = 1;
        game.update_largest_army(1);
        assert_eq!(game.largest_army_owner, Some(0));
    }

    #[test]
    fn test_road_building_card() {
        let mut game = three_player_game();
        complete_setup(&mut game);
        game.apply_dice_result(0, 2, 3);

        game.players[0].cards.push(DevCardType::RoadBuilding);
        assert!(game.use_card(0, DevCardType::RoadBuilding));
        assert_eq!(game.step, TurnStep::RoadBuildingCard);
        assert_eq!(game.free_roads, 2);

        for _ in 0..2 {
            let e = (0..game.board.edges.len())
                .find(|&e| game.can_build_road(0, e))
                .unwrap();
            game.build_road(0, e);
        }
        assert_eq!(game.free_roads, 0);
        assert_eq!(game.step, TurnStep::Waiting);
    }

    #[test]
    fn test_monopoly_card() {
        let mut game = three_player_game();
        complete_setup(&mut game);
        game.apply_dice_result(0, 2, 3);

        game.players[1].resources = ResourceHand::with_amounts(0, 3, 0, 0, 0);
        game.players[2].resources = ResourceHand::with_amounts(1, 2, 0, 0, 0);
        game.players[0].resources = ResourceHand::new();

        // Naming a resource outside the Monopoly step is refused.
        assert!(!game.execute_monopoly(0, Resource::Brick));

        game.players[0].cards.push(DevCardType::Monopoly);
        assert!(game.use_card(0, DevCardType::Monopoly));
        assert_eq!(game.step, TurnStep::Monopoly);

        assert!(game.execute_monopoly(0, Resource::Brick));
        assert_eq!(game.players[0].resources.brick, 5);
        assert_eq!(game.players[1].resources.brick, 0);
        assert_eq!(game.players[2].resources.brick, 0);
        assert_eq!(game.players[2].resources.wood, 1);
        assert_eq!(game.step, TurnStep::Waiting);
    }

    #[test]
    fn test_victory_points_from_buildings() {
        let mut game = three_player_game();
        complete_setup(&mut game);

        // Two settlements from setup.
        assert_eq!(game.victory_points(0), 2);

        // Upgrading both to cities: 2 x 2 VP.
        game.apply_dice_result(0, 2, 3);
        let own: Vec<VertexId> = (0..game.board.vertices.len())
            .filter(|&v| game.board.vertices[v].building == VertexBuilding::Settlement(0))
            .collect();
        for v in own {
            game.players[0].resources = costs::city();
            assert!(game.players[0].resources.try_consume(&costs::city()));
            game.upgrade_to_city(0, v);
        }
        assert_eq!(game.victory_points(0), 4);

        // Records add two each.
        game.longest_road_owner = Some(0);
        assert_eq!(game.victory_points(0), 6);
        game.largest_army_owner = Some(0);
        assert_eq!(game.victory_points(0), 8);

        // Held VP cards count too.
        game.players[0].cards.push(DevCardType::VictoryPoint);
        assert_eq!(game.victory_points(0), 9);
    }

    #[test]
    fn test_longest_road_record_via_builds() {
        let mut game = three_player_game();
        complete_setup(&mut game);
        game.apply_dice_result(0, 2, 3);

        // Build roads until the record transfers.
        let mut built = 2; // two setup roads
        while game.longest_road_owner.is_none() && built < 30 {
            game.players[0].resources = costs::road();
            let Some(e) = (0..game.board.edges.len()).find(|&e| game.can_build_road(0, e)) else {
                break;
            };
            assert!(game.players[0].resources.try_consume(&costs::road()));
            game.build_road(0, e);
            built += 1;
        }

        assert_eq!(game.longest_road_owner, Some(0));
        assert!(game.longest_road_length >= MIN_LONGEST_ROAD);
        assert!(game.board.longest_road(0) >= MIN_LONGEST_ROAD);
    }

    #[test]
    fn test_victory_is_terminal() {
        let mut game = three_player_game();
        complete_setup(&mut game);
        game.victory_target = 3;
        game.apply_dice_result(0, 2, 3);

        // Upgrade one settlement: 1 + 2 = 3 VP, match over.
        let v = (0..game.board.vertices.len())
            .find(|&v| game.board.vertices[v].building == VertexBuilding::Settlement(0))
            .unwrap();
        game.players[0].resources = costs::city();
        game.players[0].resources.try_consume(&costs::city());
        game.upgrade_to_city(0, v);

        assert_eq!(game.winner, Some(0));
        assert!(game.is_over());

        // No further mutation is accepted.
        assert!(!game.end_turn(0));
        assert!(game.roll_dice(0).is_none());
        assert!(!game.buy_card(0));
        assert!((0..game.board.vertices.len()).all(|v| !game.can_build_settlement(0, v)));
        assert!((0..game.board.edges.len()).all(|e| !game.can_build_road(0, e)));
    }

    #[test]
    fn test_phase_and_step_wire_names() {
        // The server mirrors these enums over the wire by variant name.
        assert_eq!(
            serde_json::to_string(&GamePhase::Setup1).unwrap(),
            "\"Setup1\""
        );
        assert_eq!(
            serde_json::to_string(&TurnStep::PlaceSettlement).unwrap(),
            "\"PlaceSettlement\""
        );
        assert_eq!(
            serde_json::to_string(&DevCardType::RoadBuilding).unwrap(),
            "\"RoadBuilding\""
        );
    }
}
