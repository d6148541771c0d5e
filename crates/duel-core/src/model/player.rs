use crate::model::card::{CardId, CardSummary};
use crate::model::mana::ManaPool;
use crate::model::permanent::Permanent;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One player's slice of the snapshot. `commander_damage` is damage this
/// player has TAKEN, keyed by the commander's owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub life: i32,
    #[serde(default)]
    pub poison: u32,
    #[serde(default)]
    pub commander_damage: BTreeMap<PlayerId, i32>,
    #[serde(default)]
    pub hand: Vec<CardSummary>,
    #[serde(default)]
    pub graveyard: Vec<CardId>,
    #[serde(default)]
    pub exile: Vec<CardId>,
    pub library_count: u32,
    #[serde(default)]
    pub battlefield: Vec<Permanent>,
    #[serde(default)]
    pub mana_pool: ManaPool,
    #[serde(default)]
    pub lands_played_this_turn: u32,
}

impl PlayerState {
    pub fn creatures(&self) -> impl Iterator<Item = &Permanent> {
        self.battlefield.iter().filter(|p| p.is_creature())
    }

    pub fn untapped_creatures(&self) -> impl Iterator<Item = &Permanent> {
        self.creatures().filter(|p| p.untapped())
    }

    pub fn lands(&self) -> impl Iterator<Item = &Permanent> {
        self.battlefield.iter().filter(|p| p.is_land())
    }

    pub fn planeswalkers(&self) -> impl Iterator<Item = &Permanent> {
        self.battlefield.iter().filter(|p| p.is_planeswalker())
    }

    pub fn creature_count(&self) -> usize {
        self.creatures().count()
    }

    pub fn land_count(&self) -> usize {
        self.lands().count()
    }

    pub fn untapped_land_count(&self) -> usize {
        self.lands().filter(|p| p.untapped()).count()
    }

    /// Hand + battlefield + graveyard, the card-advantage resource measure.
    pub fn resource_count(&self) -> usize {
        self.hand.len() + self.battlefield.len() + self.graveyard.len()
    }

    /// Mana the player could produce right now: floating mana plus one per
    /// untapped land. An approximation; actual payment is the rules
    /// engine's problem.
    pub fn potential_mana(&self) -> u32 {
        self.mana_pool.total() + self.untapped_land_count() as u32
    }

    pub fn commander_damage_taken(&self) -> i32 {
        self.commander_damage.values().sum()
    }

    pub fn find_permanent(&self, id: crate::model::permanent::PermanentId) -> Option<&Permanent> {
        self.battlefield.iter().find(|p| p.id == id)
    }
}
