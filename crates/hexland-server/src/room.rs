//! Game room management.
//!
//! A room is a seat list plus a lightweight mirror of the turn state. The
//! server does not run the rule engine; it validates turn ownership and
//! mirrors the phase/step transitions it needs to keep validating future
//! actions, while clients replay the relayed action stream against their
//! own engines. Empty seats (`None`) are AI seats driven by the host's
//! client.

use hexland_core::{GamePhase, TurnStep};
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::protocol::SeatInfo;

/// Room-code alphabet: no visually ambiguous characters (0/O, 1/I)
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a room code
pub const CODE_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Room is full")]
    RoomFull,

    #[error("Only host can start")]
    NotHost,

    #[error("Need at least 1 player")]
    NotEnoughPlayers,

    #[error("Game already started")]
    GameAlreadyStarted,
}

/// Why a game action was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotYourTurn,
    /// The current seat is AI-driven and only the host may act for it
    NotYourTurnAi,
}

impl RejectReason {
    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::NotYourTurn => "Not your turn",
            RejectReason::NotYourTurnAi => "Not your turn (AI)",
        }
    }
}

/// Lobby/playing state of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Lobby,
    Playing,
}

/// A human occupying a seat
#[derive(Debug, Clone)]
pub struct Seat {
    pub conn: Uuid,
    pub name: String,
    pub ready: bool,
}

/// What happened when a connection left a room
#[derive(Debug)]
pub struct LeaveOutcome {
    /// Seat the leaver held, now an AI seat
    pub seat: Option<usize>,
    /// Connection promoted to host, if the host left
    pub new_host: Option<Uuid>,
    /// True when no humans remain and the room must be destroyed
    pub destroy: bool,
}

/// A game room holding up to four seats.
pub struct Room {
    pub code: String,
    pub host: Uuid,
    /// Seats in game order; `None` is an AI seat
    pub seats: Vec<Option<Seat>>,
    pub map_radius: u8,
    pub state: RoomState,
    // Turn mirror, enough to gatekeep future actions.
    pub current_index: usize,
    pub phase: GamePhase,
    pub step: TurnStep,
}

impl Room {
    pub fn new(code: String, host: Uuid, host_name: String, max_players: u8, map_radius: u8) -> Self {
        let max_players = max_players.clamp(2, 4) as usize;
        let mut seats: Vec<Option<Seat>> = vec![None; max_players];
        seats[0] = Some(Seat {
            conn: host,
            name: host_name,
            ready: false,
        });

        Self {
            code,
            host,
            seats,
            map_radius,
            state: RoomState::Lobby,
            current_index: 0,
            phase: GamePhase::Setup1,
            step: TurnStep::PlaceSettlement,
        }
    }

    /// Generate a room code from the unambiguous alphabet
    pub fn generate_code<R: Rng>(rng: &mut R) -> String {
        (0..CODE_LEN)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }

    /// Seat index held by a connection
    pub fn seat_of(&self, conn: Uuid) -> Option<usize> {
        self.seats
            .iter()
            .position(|s| s.as_ref().is_some_and(|seat| seat.conn == conn))
    }

    pub fn human_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_some()).count()
    }

    /// Take the first free seat. Fails once the game has started or every
    /// seat is taken.
    pub fn join(&mut self, conn: Uuid, name: String) -> Result<usize, RoomError> {
        if self.state != RoomState::Lobby {
            return Err(RoomError::GameAlreadyStarted);
        }
        let slot = self
            .seats
            .iter()
            .position(|s| s.is_none())
            .ok_or(RoomError::RoomFull)?;
        self.seats[slot] = Some(Seat {
            conn,
            name,
            ready: false,
        });
        Ok(slot)
    }

    pub fn set_ready(&mut self, conn: Uuid, ready: bool) {
        if let Some(idx) = self.seat_of(conn) {
            if let Some(seat) = self.seats[idx].as_mut() {
                seat.ready = ready;
            }
        }
    }

    /// The roster as broadcast to clients; empty seats show as ready AI.
    pub fn roster(&self) -> Vec<SeatInfo> {
        self.seats
            .iter()
            .map(|s| match s {
                Some(seat) => SeatInfo {
                    name: seat.name.clone(),
                    ready: seat.ready,
                    is_ai: false,
                },
                None => SeatInfo {
                    name: "AI".to_string(),
                    ready: true,
                    is_ai: true,
                },
            })
            .collect()
    }

    /// Start the game: host only, at least one human. Resets the turn
    /// mirror and returns the seed every client regenerates the board
    /// from.
    pub fn start<R: Rng>(&mut self, conn: Uuid, rng: &mut R) -> Result<u32, RoomError> {
        if self.state != RoomState::Lobby {
            return Err(RoomError::GameAlreadyStarted);
        }
        if conn != self.host {
            return Err(RoomError::NotHost);
        }
        if self.human_count() < 1 {
            return Err(RoomError::NotEnoughPlayers);
        }

        self.state = RoomState::Playing;
        self.current_index = 0;
        self.phase = GamePhase::Setup1;
        self.step = TurnStep::PlaceSettlement;

        Ok(rng.gen_range(1..i32::MAX as u32))
    }

    /// Gatekeep a game action: only the current seat may act, or the host
    /// when the current seat is an AI seat. Returns the acting seat index.
    pub fn validate_turn(&self, conn: Uuid) -> Result<usize, RejectReason> {
        let current_is_ai = self.seats[self.current_index].is_none();
        if current_is_ai {
            if conn == self.host {
                Ok(self.current_index)
            } else {
                Err(RejectReason::NotYourTurnAi)
            }
        } else if self.seat_of(conn) == Some(self.current_index) {
            Ok(self.current_index)
        } else {
            Err(RejectReason::NotYourTurn)
        }
    }

    /// Mirror a dice result: a 7 sends the current player robber-moving.
    pub fn record_roll(&mut self, total: u8) {
        self.step = if total == 7 {
            TurnStep::MoveRobber
        } else {
            TurnStep::Waiting
        };
    }

    /// Mirror the turn-state effect of a relayed action.
    pub fn apply_action_mirror(&mut self, action: &str, card_type: Option<&str>) {
        match action {
            "build_settlement" if self.phase.is_setup() => {
                self.step = TurnStep::PlaceRoad;
            }
            "build_road" if self.phase.is_setup() => {
                self.advance_setup_turn();
            }
            "move_robber" => {
                self.step = TurnStep::Waiting;
            }
            "end_turn" => {
                self.advance_playing_turn();
            }
            "use_dev_card" => match card_type {
                Some("RoadBuilding") => self.step = TurnStep::RoadBuildingCard,
                Some("Monopoly") => self.step = TurnStep::Monopoly,
                _ => {}
            },
            "execute_monopoly" => {
                self.step = TurnStep::Waiting;
            }
            _ => {}
        }
    }

    fn advance_setup_turn(&mut self) {
        match self.phase {
            GamePhase::Setup1 => {
                if self.current_index + 1 >= self.seats.len() {
                    // Last seat places again, then the order reverses.
                    self.phase = GamePhase::Setup2;
                    self.current_index = self.seats.len() - 1;
                } else {
                    self.current_index += 1;
                }
                self.step = TurnStep::PlaceSettlement;
            }
            GamePhase::Setup2 => {
                if self.current_index == 0 {
                    self.phase = GamePhase::Playing;
                    self.step = TurnStep::Waiting;
                } else {
                    self.current_index -= 1;
                    self.step = TurnStep::PlaceSettlement;
                }
            }
            GamePhase::Playing => {}
        }
    }

    fn advance_playing_turn(&mut self) {
        self.current_index = (self.current_index + 1) % self.seats.len();
        self.step = TurnStep::Waiting;
    }

    /// Drop a connection from the room: the seat becomes an AI seat, the
    /// host role moves to the first remaining human, and the room is
    /// flagged for destruction when no humans remain.
    pub fn leave(&mut self, conn: Uuid) -> LeaveOutcome {
        let seat = self.seat_of(conn);
        if let Some(idx) = seat {
            self.seats[idx] = None;
        }

        let mut new_host = None;
        if conn == self.host {
            if let Some(next) = self.seats.iter().flatten().next() {
                self.host = next.conn;
                new_host = Some(next.conn);
            }
        }

        LeaveOutcome {
            seat,
            new_host,
            destroy: self.human_count() == 0,
        }
    }
}
