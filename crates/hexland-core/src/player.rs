//! Player state and resource management.
//!
//! This module contains:
//! - ResourceHand for managing the five per-player resource counts
//! - Development card types and deck construction
//! - Building costs
//! - The Player struct

use crate::board::{PlayerId, Resource};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Development card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevCardType {
    /// Move robber and steal, counts toward Largest Army
    Knight,
    /// Worth 1 VP while held; never "played"
    VictoryPoint,
    /// Build 2 roads for free
    RoadBuilding,
    /// Every other player hands over all of one resource kind
    Monopoly,
}

impl DevCardType {
    /// Create the full development card deck (23 cards)
    pub fn full_deck() -> Vec<DevCardType> {
        let mut deck = Vec::with_capacity(23);
        deck.extend(std::iter::repeat(DevCardType::Knight).take(14));
        deck.extend(std::iter::repeat(DevCardType::VictoryPoint).take(5));
        deck.extend(std::iter::repeat(DevCardType::RoadBuilding).take(2));
        deck.extend(std::iter::repeat(DevCardType::Monopoly).take(2));
        deck
    }

    /// Create a deck shuffled with the given RNG
    pub fn shuffled_deck<R: Rng>(rng: &mut R) -> Vec<DevCardType> {
        let mut deck = Self::full_deck();
        deck.shuffle(rng);
        deck
    }

    /// Whether this card can be played (VP cards are only ever held)
    pub fn is_playable(&self) -> bool {
        !matches!(self, DevCardType::VictoryPoint)
    }
}

/// A hand of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub wood: u32,
    pub brick: u32,
    pub ore: u32,
    pub wheat: u32,
    pub sheep: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, brick: u32, ore: u32, wheat: u32, sheep: u32) -> Self {
        Self {
            wood,
            brick,
            ore,
            wheat,
            sheep,
        }
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.wood + self.brick + self.ore + self.wheat + self.sheep
    }

    /// Check if hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Brick => self.brick,
            Resource::Ore => self.ore,
            Resource::Wheat => self.wheat,
            Resource::Sheep => self.sheep,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        match resource {
            Resource::Wood => self.wood = count,
            Resource::Brick => self.brick = count,
            Resource::Ore => self.ore = count,
            Resource::Wheat => self.wheat = count,
            Resource::Sheep => self.sheep = count,
        }
    }

    /// Add resources to the hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        self.set(resource, self.get(resource) + amount);
    }

    /// Remove resources, saturating at zero
    pub fn consume(&mut self, resource: Resource, amount: u32) {
        self.set(resource, self.get(resource).saturating_sub(amount));
    }

    /// Check if every amount in `cost` is covered
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL.iter().all(|&r| self.get(r) >= cost.get(r))
    }

    /// All-or-nothing debit: applies `cost` only if every amount is
    /// satisfiable, otherwise leaves the hand untouched.
    pub fn try_consume(&mut self, cost: &ResourceHand) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for r in Resource::ALL {
            self.consume(r, cost.get(r));
        }
        true
    }

    /// A random resource kind the hand currently holds, weighted by count
    pub fn random_kind<R: Rng>(&self, rng: &mut R) -> Option<Resource> {
        let held: Vec<Resource> = Resource::ALL
            .iter()
            .flat_map(|&r| std::iter::repeat(r).take(self.get(r) as usize))
            .collect();
        held.choose(rng).copied()
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 wood, 1 brick
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 wood, 1 brick, 1 wheat, 1 sheep
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 1, 1)
    }

    /// Cost to upgrade to a city: 3 ore, 2 wheat
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 3, 2, 0)
    }

    /// Cost to buy a development card: 1 ore, 1 wheat, 1 sheep
    pub fn development_card() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 1, 1, 1)
    }
}

/// A single player's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Player ID (index into the match's player list)
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Current resources
    pub resources: ResourceHand,
    /// Development cards in hand
    pub cards: Vec<DevCardType>,
    /// Knights played so far (for Largest Army)
    pub used_knights: u32,
    /// Whether a controller drives this seat instead of a human
    pub is_ai: bool,
}

impl Player {
    /// Create a new player
    pub fn new(id: PlayerId, name: String, is_ai: bool) -> Self {
        Self {
            id,
            name,
            resources: ResourceHand::new(),
            cards: Vec::new(),
            used_knights: 0,
            is_ai,
        }
    }

    /// Number of VictoryPoint cards held
    pub fn victory_cards(&self) -> u32 {
        self.cards
            .iter()
            .filter(|c| matches!(c, DevCardType::VictoryPoint))
            .count() as u32
    }

    /// Whether the player holds a card of the given type
    pub fn holds_card(&self, card: DevCardType) -> bool {
        self.cards.contains(&card)
    }

    /// Remove one card of the given type from the hand
    pub fn remove_card(&mut self, card: DevCardType) -> bool {
        if let Some(pos) = self.cards.iter().position(|c| *c == card) {
            self.cards.remove(pos);
            true
        } else {
            false
        }
    }
}
