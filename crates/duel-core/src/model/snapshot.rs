use crate::model::card::CardSummary;
use crate::model::player::{PlayerId, PlayerState};
use crate::model::stack::StackObject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Beginning,
    PrecombatMain,
    Combat,
    PostcombatMain,
    Ending,
}

impl Phase {
    pub const fn is_main(self) -> bool {
        matches!(self, Phase::PrecombatMain | Phase::PostcombatMain)
    }

    pub const fn is_precombat_main(self) -> bool {
        matches!(self, Phase::PrecombatMain)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnInfo {
    pub number: u32,
    pub active_player: PlayerId,
    pub phase: Phase,
    pub priority_player: PlayerId,
}

/// Read-only game state handed in by the rules engine. One snapshot per
/// decision call; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub players: BTreeMap<PlayerId, PlayerState>,
    pub turn: TurnInfo,
    #[serde(default)]
    pub stack: Vec<StackObject>,
    /// Commanders not yet on the battlefield, keyed by owner. Empty outside
    /// commander games.
    #[serde(default)]
    pub command_zone: BTreeMap<PlayerId, Vec<CardSummary>>,
}

impl GameSnapshot {
    /// Panics on an unknown player id: that is a caller bug in the rules
    /// engine, not a condition this engine can recover from.
    pub fn player(&self, id: &PlayerId) -> &PlayerState {
        self.players
            .get(id)
            .unwrap_or_else(|| panic!("unknown player id {id} in snapshot"))
    }

    pub fn opponents<'a>(
        &'a self,
        id: &'a PlayerId,
    ) -> impl Iterator<Item = (&'a PlayerId, &'a PlayerState)> {
        self.players.iter().filter(move |(pid, _)| *pid != id)
    }

    pub fn opponent_count(&self, id: &PlayerId) -> usize {
        self.opponents(id).count()
    }

    /// Mean of `f` over all opponents, 0.0 when the player is alone.
    pub fn avg_opponent<F>(&self, id: &PlayerId, f: F) -> f32
    where
        F: Fn(&PlayerState) -> f32,
    {
        let mut total = 0.0_f32;
        let mut count = 0_u32;
        for (_, opp) in self.opponents(id) {
            total += f(opp);
            count += 1;
        }
        if count == 0 { 0.0 } else { total / count as f32 }
    }

    pub fn is_turn_of(&self, id: &PlayerId) -> bool {
        self.turn.active_player == *id
    }

    pub fn has_priority(&self, id: &PlayerId) -> bool {
        self.turn.priority_player == *id
    }

    /// True when one of the player's command-zone commanders is currently on
    /// their battlefield (matched by card id, falling back to name).
    pub fn commander_on_battlefield(&self, id: &PlayerId) -> bool {
        let Some(commanders) = self.command_zone.get(id) else {
            return false;
        };
        let player = self.player(id);
        player.battlefield.iter().any(|perm| {
            commanders
                .iter()
                .any(|cmd| cmd.id == perm.card_id || cmd.name == perm.name)
        })
    }

    /// Total commander damage the player has dealt, maximized over single
    /// opponents (commander lethality is tracked per pairing).
    pub fn max_commander_damage_dealt(&self, id: &PlayerId) -> i32 {
        self.opponents(id)
            .filter_map(|(_, opp)| opp.commander_damage.get(id).copied())
            .max()
            .unwrap_or(0)
    }

    pub fn total_commander_damage_dealt(&self, id: &PlayerId) -> i32 {
        self.opponents(id)
            .filter_map(|(_, opp)| opp.commander_damage.get(id).copied())
            .sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mana::ManaPool;

    fn bare_player(life: i32) -> PlayerState {
        PlayerState {
            life,
            poison: 0,
            commander_damage: BTreeMap::new(),
            hand: Vec::new(),
            graveyard: Vec::new(),
            exile: Vec::new(),
            library_count: 50,
            battlefield: Vec::new(),
            mana_pool: ManaPool::empty(),
            lands_played_this_turn: 0,
        }
    }

    fn two_player_snapshot() -> GameSnapshot {
        let mut players = BTreeMap::new();
        players.insert(PlayerId::new("p1"), bare_player(20));
        players.insert(PlayerId::new("p2"), bare_player(14));
        GameSnapshot {
            players,
            turn: TurnInfo {
                number: 4,
                active_player: PlayerId::new("p1"),
                phase: Phase::PrecombatMain,
                priority_player: PlayerId::new("p1"),
            },
            stack: Vec::new(),
            command_zone: BTreeMap::new(),
        }
    }

    #[test]
    fn avg_opponent_over_single_opponent() {
        let snapshot = two_player_snapshot();
        let avg = snapshot.avg_opponent(&PlayerId::new("p1"), |p| p.life as f32);
        assert!((avg - 14.0).abs() < f32::EPSILON);
    }

    #[test]
    fn avg_opponent_with_no_opponents_is_zero() {
        let mut snapshot = two_player_snapshot();
        snapshot.players.remove(&PlayerId::new("p2"));
        let avg = snapshot.avg_opponent(&PlayerId::new("p1"), |p| p.life as f32);
        assert_eq!(avg, 0.0);
    }

    #[test]
    #[should_panic(expected = "unknown player id")]
    fn unknown_player_panics() {
        let snapshot = two_player_snapshot();
        snapshot.player(&PlayerId::new("nobody"));
    }

    #[test]
    fn commander_damage_dealt_maximizes_over_opponents() {
        let mut snapshot = two_player_snapshot();
        let mut p3 = bare_player(30);
        p3.commander_damage.insert(PlayerId::new("p1"), 12);
        snapshot.players.insert(PlayerId::new("p3"), p3);
        snapshot
            .players
            .get_mut(&PlayerId::new("p2"))
            .unwrap()
            .commander_damage
            .insert(PlayerId::new("p1"), 5);
        assert_eq!(snapshot.max_commander_damage_dealt(&PlayerId::new("p1")), 12);
        assert_eq!(snapshot.total_commander_damage_dealt(&PlayerId::new("p1")), 17);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = two_player_snapshot();
        let json = snapshot.to_json().unwrap();
        let restored = GameSnapshot::from_json(&json).unwrap();
        assert_eq!(snapshot, restored);
    }
}
