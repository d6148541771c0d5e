use crate::eval::MAX_THREATS;
use crate::model::permanent::{Permanent, PermanentId, PermanentKind};
use crate::model::player::PlayerId;
use crate::model::snapshot::GameSnapshot;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How soon a threat demands an answer. `Immediate` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Immediate,
    Soon,
    Eventual,
    Low,
}

impl Urgency {
    pub const fn rank(self) -> u8 {
        match self {
            Urgency::Immediate => 0,
            Urgency::Soon => 1,
            Urgency::Eventual => 2,
            Urgency::Low => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatSource {
    Creature,
    Planeswalker,
    Enchantment,
    Artifact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    pub permanent: PermanentId,
    pub name: String,
    pub controller: PlayerId,
    pub source: ThreatSource,
    pub level: f32,
    pub urgency: Urgency,
}

/// Scan every opponent permanent and rank the ten worst. Lands never
/// register as threats.
pub fn assess_threats(snapshot: &GameSnapshot, player: &PlayerId) -> Vec<Threat> {
    let mut threats = Vec::new();
    for (opp_id, opp) in snapshot.opponents(player) {
        for perm in &opp.battlefield {
            if let Some(threat) = classify(perm, opp_id) {
                threats.push(threat);
            }
        }
    }

    threats.sort_by(compare_threats);
    threats.truncate(MAX_THREATS);
    threats
}

fn classify(perm: &Permanent, controller: &PlayerId) -> Option<Threat> {
    let (source, level, urgency) = match perm.kind {
        PermanentKind::Creature { power, .. } => {
            let level = (power as f32 / 10.0).min(1.0);
            let urgency = if perm.untapped() {
                if power >= 5 {
                    Urgency::Immediate
                } else if power >= 3 {
                    Urgency::Soon
                } else {
                    Urgency::Eventual
                }
            } else {
                Urgency::Low
            };
            (ThreatSource::Creature, level, urgency)
        }
        PermanentKind::Planeswalker { loyalty } => {
            let urgency = if loyalty >= 5 {
                Urgency::Immediate
            } else {
                Urgency::Soon
            };
            (ThreatSource::Planeswalker, 0.7, urgency)
        }
        PermanentKind::Enchantment => (ThreatSource::Enchantment, 0.5, Urgency::Eventual),
        PermanentKind::Artifact => (ThreatSource::Artifact, 0.4, Urgency::Eventual),
        PermanentKind::Land => return None,
    };

    Some(Threat {
        permanent: perm.id,
        name: perm.name.clone(),
        controller: controller.clone(),
        source,
        level,
        urgency,
    })
}

fn compare_threats(a: &Threat, b: &Threat) -> Ordering {
    a.urgency
        .rank()
        .cmp(&b.urgency.rank())
        .then_with(|| b.level.partial_cmp(&a.level).unwrap_or(Ordering::Equal))
        .then_with(|| a.permanent.cmp(&b.permanent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::CardId;
    use crate::model::mana::ManaPool;
    use crate::model::player::PlayerState;
    use crate::model::snapshot::{Phase, TurnInfo};
    use std::collections::BTreeMap;

    fn permanent(id: u64, kind: PermanentKind, tapped: bool) -> Permanent {
        Permanent {
            id: PermanentId(id),
            card_id: CardId::new(format!("c{id}")),
            name: format!("perm-{id}"),
            kind,
            controller: PlayerId::new("p2"),
            tapped,
            counters: BTreeMap::new(),
            keywords: Vec::new(),
            mana_value: 3,
            text: String::new(),
        }
    }

    fn snapshot_with_opponent_board(battlefield: Vec<Permanent>) -> GameSnapshot {
        let mut players = BTreeMap::new();
        players.insert(
            PlayerId::new("p1"),
            PlayerState {
                life: 20,
                poison: 0,
                commander_damage: BTreeMap::new(),
                hand: Vec::new(),
                graveyard: Vec::new(),
                exile: Vec::new(),
                library_count: 50,
                battlefield: Vec::new(),
                mana_pool: ManaPool::empty(),
                lands_played_this_turn: 0,
            },
        );
        players.insert(
            PlayerId::new("p2"),
            PlayerState {
                life: 20,
                poison: 0,
                commander_damage: BTreeMap::new(),
                hand: Vec::new(),
                graveyard: Vec::new(),
                exile: Vec::new(),
                library_count: 50,
                battlefield,
                mana_pool: ManaPool::empty(),
                lands_played_this_turn: 0,
            },
        );
        GameSnapshot {
            players,
            turn: TurnInfo {
                number: 5,
                active_player: PlayerId::new("p1"),
                phase: Phase::PrecombatMain,
                priority_player: PlayerId::new("p1"),
            },
            stack: Vec::new(),
            command_zone: BTreeMap::new(),
        }
    }

    #[test]
    fn urgency_tiers_by_power() {
        let snap = snapshot_with_opponent_board(vec![
            permanent(1, PermanentKind::Creature { power: 6, toughness: 6 }, false),
            permanent(2, PermanentKind::Creature { power: 3, toughness: 3 }, false),
            permanent(3, PermanentKind::Creature { power: 1, toughness: 1 }, false),
        ]);
        let threats = assess_threats(&snap, &PlayerId::new("p1"));
        assert_eq!(threats[0].urgency, Urgency::Immediate);
        assert_eq!(threats[1].urgency, Urgency::Soon);
        assert_eq!(threats[2].urgency, Urgency::Eventual);
    }

    #[test]
    fn tapped_creature_demotes_to_low() {
        let snap = snapshot_with_opponent_board(vec![permanent(
            1,
            PermanentKind::Creature { power: 8, toughness: 8 },
            true,
        )]);
        let threats = assess_threats(&snap, &PlayerId::new("p1"));
        assert_eq!(threats[0].urgency, Urgency::Low);
        assert!((threats[0].level - 0.8).abs() < 1e-6);
    }

    #[test]
    fn planeswalker_urgency_by_loyalty() {
        let snap = snapshot_with_opponent_board(vec![
            permanent(1, PermanentKind::Planeswalker { loyalty: 6 }, false),
            permanent(2, PermanentKind::Planeswalker { loyalty: 3 }, false),
        ]);
        let threats = assess_threats(&snap, &PlayerId::new("p1"));
        assert_eq!(threats[0].urgency, Urgency::Immediate);
        assert!((threats[0].level - 0.7).abs() < 1e-6);
        assert_eq!(threats[1].urgency, Urgency::Soon);
    }

    #[test]
    fn lands_are_not_threats() {
        let snap = snapshot_with_opponent_board(vec![permanent(1, PermanentKind::Land, false)]);
        assert!(assess_threats(&snap, &PlayerId::new("p1")).is_empty());
    }

    #[test]
    fn noncreatures_rank_eventual() {
        let snap = snapshot_with_opponent_board(vec![
            permanent(1, PermanentKind::Artifact, false),
            permanent(2, PermanentKind::Enchantment, false),
        ]);
        let threats = assess_threats(&snap, &PlayerId::new("p1"));
        // Same tier; higher level (enchantment 0.5) sorts first.
        assert_eq!(threats[0].source, ThreatSource::Enchantment);
        assert_eq!(threats[1].source, ThreatSource::Artifact);
        assert!(threats.iter().all(|t| t.urgency == Urgency::Eventual));
    }

    #[test]
    fn threat_list_truncates_to_ten() {
        let board: Vec<Permanent> = (0..14)
            .map(|id| {
                permanent(
                    id,
                    PermanentKind::Creature {
                        power: id as i32 % 7,
                        toughness: 2,
                    },
                    false,
                )
            })
            .collect();
        let snap = snapshot_with_opponent_board(board);
        let threats = assess_threats(&snap, &PlayerId::new("p1"));
        assert_eq!(threats.len(), 10);
        for pair in threats.windows(2) {
            assert!(pair[0].urgency.rank() <= pair[1].urgency.rank());
            if pair[0].urgency == pair[1].urgency {
                assert!(pair[0].level >= pair[1].level);
            }
        }
    }
}
