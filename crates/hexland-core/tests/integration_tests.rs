//! Integration tests for the Hexland game engine.
//!
//! These tests verify complete match flows from setup through normal play.

use hexland_core::player::costs;
use hexland_core::*;

/// Place one legal settlement/road pair for the current setup player
fn place_setup_pair(game: &mut MatchState) -> PlayerId {
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
    p
}

fn complete_setup(game: &mut MatchState) {
    let mut iterations = 0;
    while game.phase != GamePhase::Playing {
        place_setup_pair(game);
        iterations += 1;
        assert!(iterations <= 8, "setup must finish within two rounds");
    }
}

fn four_player_game() -> MatchState {
    MatchState::new(
        &[
            ("Alice", false),
            ("Bob", false),
            ("Charlie", false),
            ("Diana", false),
        ],
        2,
        17,
    )
}

#[test]
fn test_setup_phase_completes() {
    let mut game = four_player_game();
    complete_setup(&mut game);

    assert_eq!(game.phase, GamePhase::Playing);
    assert_eq!(game.current_player, 0);

    // Every player holds two settlements and two roads.
    for p in 0..4u8 {
        let settlements = game
            .board
            .vertices
            .iter()
            .filter(|v| v.building == VertexBuilding::Settlement(p))
            .count();
        assert_eq!(settlements, 2, "player {} settlements", p);

        let roads = game
            .board
            .edges
            .iter()
            .filter(|e| e.building == EdgeBuilding::Road(p))
            .count();
        assert_eq!(roads, 2, "player {} roads", p);

        assert_eq!(game.victory_points(p), 2);
    }
}

#[test]
fn test_no_adjacent_buildings_ever() {
    let mut game = four_player_game();
    complete_setup(&mut game);

    for (id, edge) in game.board.edges.iter().enumerate() {
        let [a, b] = edge.vertices;
        let both_built = game.board.vertices[a].building.owner().is_some()
            && game.board.vertices[b].building.owner().is_some();
        assert!(!both_built, "edge {} joins two buildings", id);
    }
}

#[test]
fn test_normal_turn_flow() {
    let mut game = four_player_game();
    complete_setup(&mut game);

    // Roll, then end; the turn passes circularly.
    for expected in [0u8, 1, 2, 3, 0] {
        assert_eq!(game.current_player, expected);
        let (d1, d2) = game.roll_dice(expected).expect("roll is legal");
        assert!((1..=6).contains(&d1));
        assert!((1..=6).contains(&d2));

        if game.step == TurnStep::MoveRobber {
            let target = (0..game.board.tiles.len())
                .find(|&t| game.can_move_robber(expected, t))
                .expect("a robber target exists");
            assert!(game.move_robber_to(expected, target));
        }

        assert!(game.end_turn(expected));
    }
}

#[test]
fn test_building_requires_resources() {
    let mut game = four_player_game();
    complete_setup(&mut game);
    game.apply_dice_result(0, 2, 3);

    game.players[0].resources = ResourceHand::new();

    // The predicate may allow a spot, but the hand cannot pay for it.
    assert!(!game.players[0].resources.try_consume(&costs::road()));
    assert!(!game.players[0].resources.try_consume(&costs::settlement()));
    assert!(!game.players[0].resources.try_consume(&costs::city()));
}

#[test]
fn test_building_with_resources() {
    let mut game = four_player_game();
    complete_setup(&mut game);
    game.apply_dice_result(0, 2, 3);

    game.players[0].resources = ResourceHand::with_amounts(5, 5, 5, 5, 5);

    let e = (0..game.board.edges.len())
        .find(|&e| game.can_build_road(0, e))
        .expect("an expansion edge exists");
    assert!(game.players[0].resources.try_consume(&costs::road()));
    game.build_road(0, e);

    assert_eq!(game.board.edges[e].building, EdgeBuilding::Road(0));
    assert_eq!(game.players[0].resources.wood, 4);
    assert_eq!(game.players[0].resources.brick, 4);
}

#[test]
fn test_maritime_trade_round_trip() {
    let mut game = four_player_game();
    complete_setup(&mut game);
    game.apply_dice_result(0, 2, 3);

    game.players[0].resources = ResourceHand::single(Resource::Sheep, 4);
    let cost = game.trade_cost(0, Resource::Sheep);
    assert!((2..=4).contains(&cost));

    game.execute_trade(0, Resource::Sheep, Resource::Ore, cost);
    assert_eq!(game.players[0].resources.sheep, 4 - cost);
    assert_eq!(game.players[0].resources.ore, 1);
}

#[test]
fn test_full_ai_match_progresses() {
    let mut game = MatchState::new(&[("A", true), ("B", true), ("C", true)], 2, 5);
    let mut controllers: Vec<AiController> = (0..3)
        .map(|i| AiController::with_default_strategy(i as u64))
        .collect();

    for _ in 0..200 {
        if game.is_over() {
            break;
        }
        let p = game.current_player;
        match game.phase {
            GamePhase::Playing => controllers[p as usize].take_turn(&mut game, p),
            _ => controllers[p as usize].take_setup_placement(&mut game, p),
        }
    }

    assert_eq!(game.phase, GamePhase::Playing);

    // VP bookkeeping stays consistent throughout.
    for p in 0..3u8 {
        let vp = game.victory_points(p);
        assert!(vp >= 2, "setup settlements keep every player at 2+ VP");
        if game.winner == Some(p) {
            assert!(vp >= game.victory_target);
        }
    }
}

#[test]
fn test_identical_seeds_share_a_board() {
    let a = MatchState::new(&[("A", false), ("B", false)], 2, 123);
    let b = MatchState::new(&[("A", false), ("B", false)], 2, 123);

    assert_eq!(a.board.tiles.len(), b.board.tiles.len());
    for (ta, tb) in a.board.tiles.iter().zip(&b.board.tiles) {
        assert_eq!(ta.kind, tb.kind);
        assert_eq!(ta.number, tb.number);
    }
    assert_eq!(a.deck, b.deck);
}

#[test]
fn test_longest_road_holder_via_play() {
    let mut game = four_player_game();
    complete_setup(&mut game);
    game.apply_dice_result(0, 2, 3);

    assert_eq!(game.longest_road_owner, None);

    let mut built = 0;
    while game.longest_road_owner.is_none() && built < 30 {
        let Some(e) = (0..game.board.edges.len()).find(|&e| game.can_build_road(0, e)) else {
            break;
        };
        game.players[0].resources = costs::road();
        game.players[0].resources.try_consume(&costs::road());
        game.build_road(0, e);
        built += 1;
    }

    assert_eq!(game.longest_road_owner, Some(0));
    assert!(game.longest_road_length >= 5);
    assert_eq!(game.victory_points(0), 4, "2 settlements + longest road");
}
