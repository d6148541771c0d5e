mod factors;
mod threat;
mod weights;

pub use factors::{FactorScores, looks_like_ramp};
pub use threat::{Threat, ThreatSource, Urgency, assess_threats};
pub use weights::EvalWeights;

use crate::model::player::PlayerId;
use crate::model::snapshot::GameSnapshot;
use serde::{Deserialize, Serialize};

/// How many threats an evaluation reports at most.
pub const MAX_THREATS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    CastCreature,
    LethalAttack,
    HoldInstant,
    DevelopLands,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub kind: OpportunityKind,
    pub value: f32,
    pub description: String,
}

/// Full output of one `evaluate` call. Built fresh per snapshot, never
/// cached across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedEvaluation {
    pub player: PlayerId,
    pub total: f32,
    pub factors: FactorScores,
    pub threats: Vec<Threat>,
    pub opportunities: Vec<Opportunity>,
    pub recommendations: Vec<String>,
}

impl DetailedEvaluation {
    pub fn has_immediate_threat(&self) -> bool {
        self.threats
            .iter()
            .any(|t| t.urgency == Urgency::Immediate)
    }

    pub fn best_opportunity(&self) -> Option<&Opportunity> {
        self.opportunities.first()
    }
}

/// Score the position from `player`'s point of view.
///
/// Precondition: `player` exists in the snapshot; an unknown id panics
/// (caller bug in the rules engine, not recoverable here).
pub fn evaluate(
    snapshot: &GameSnapshot,
    player: &PlayerId,
    weights: &EvalWeights,
) -> DetailedEvaluation {
    let factors = FactorScores::compute(snapshot, player);
    let total = factors.weighted_total(weights);
    let threats = assess_threats(snapshot, player);
    let opportunities = detect_opportunities(snapshot, player);
    let recommendations = build_recommendations(&factors, &threats, &opportunities);

    DetailedEvaluation {
        player: player.clone(),
        total,
        factors,
        threats,
        opportunities,
        recommendations,
    }
}

fn detect_opportunities(snapshot: &GameSnapshot, player: &PlayerId) -> Vec<Opportunity> {
    let state = snapshot.player(player);
    let mana = state.potential_mana();
    let mut found = Vec::new();

    if let Some(card) = state
        .hand
        .iter()
        .filter(|c| c.is_creature() && c.mana_value <= mana)
        .max_by_key(|c| c.mana_value)
    {
        found.push(Opportunity {
            kind: OpportunityKind::CastCreature,
            value: 0.6,
            description: format!("Cast {} to build board presence", card.name),
        });
    }

    let own_power: i32 = state.untapped_creatures().map(|c| c.power()).sum();
    if let Some((opp_id, opp)) = snapshot
        .opponents(player)
        .min_by_key(|(_, opp)| opp.life)
    {
        if opp.life <= 15 && own_power > 0 {
            let value = if own_power >= opp.life { 0.9 } else { 0.5 };
            found.push(Opportunity {
                kind: OpportunityKind::LethalAttack,
                value,
                description: format!(
                    "Attack window: {opp_id} is at {} life against {own_power} power",
                    opp.life
                ),
            });
        }
    }

    if let Some(instant) = state
        .hand
        .iter()
        .filter(|c| c.is_instant_speed() && c.mana_value <= mana)
        .min_by_key(|c| c.mana_value)
    {
        found.push(Opportunity {
            kind: OpportunityKind::HoldInstant,
            value: 0.4,
            description: format!("Hold mana for {}", instant.name),
        });
    }

    if state.land_count() < 5 && state.hand.iter().any(|c| c.is_land()) {
        found.push(Opportunity {
            kind: OpportunityKind::DevelopLands,
            value: 0.5,
            description: "Develop mana base before committing to spells".to_string(),
        });
    }

    found.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    found
}

fn build_recommendations(
    factors: &FactorScores,
    threats: &[Threat],
    opportunities: &[Opportunity],
) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(threat) = threats.iter().find(|t| t.urgency == Urgency::Immediate) {
        out.push(format!(
            "Answer {} now (threat level {:.2})",
            threat.name, threat.level
        ));
    }
    if factors.life < -0.3 {
        out.push("Life total is slipping; prioritize defense or lifegain".to_string());
    }
    if factors.card_advantage < -0.3 {
        out.push("Behind on cards; look for card draw".to_string());
    }
    if factors.creature_count < -0.3 || factors.permanent_advantage < -0.3 {
        out.push("Behind on board; deploy threats or find removal".to_string());
    }
    if let Some(best) = opportunities.first() {
        out.push(best.description.clone());
    }
    if factors.win_condition_progress > 0.7 {
        out.push("Win is close; push the win condition over stabilizing".to_string());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::{CardId, CardKind, CardSummary};
    use crate::model::mana::ManaPool;
    use crate::model::permanent::{Permanent, PermanentId, PermanentKind};
    use crate::model::player::PlayerState;
    use crate::model::snapshot::{Phase, TurnInfo};
    use std::collections::BTreeMap;

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

    fn creature(id: u64, controller: &str, power: i32, toughness: i32) -> Permanent {
        Permanent {
            id: PermanentId(id),
            card_id: CardId::new(format!("c{id}")),
            name: format!("creature-{id}"),
            kind: PermanentKind::Creature { power, toughness },
            controller: PlayerId::new(controller),
            tapped: false,
            counters: BTreeMap::new(),
            keywords: Vec::new(),
            mana_value: 2,
            text: String::new(),
        }
    }

    fn snapshot(p1: PlayerState, p2: PlayerState) -> GameSnapshot {
        let mut players = BTreeMap::new();
        players.insert(PlayerId::new("p1"), p1);
        players.insert(PlayerId::new("p2"), p2);
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
    fn evaluation_reports_all_parts() {
        let mut p1 = bare_player(20);
        p1.battlefield.push(creature(1, "p1", 3, 3));
        let mut p2 = bare_player(12);
        p2.battlefield.push(creature(2, "p2", 5, 5));
        let snap = snapshot(p1, p2);
        let eval = evaluate(&snap, &PlayerId::new("p1"), &EvalWeights::default());
        assert_eq!(eval.player, PlayerId::new("p1"));
        assert!(!eval.threats.is_empty());
        assert!(eval.total.is_finite());
    }

    #[test]
    fn lethal_window_detected_at_low_opponent_life() {
        let mut p1 = bare_player(20);
        p1.battlefield.push(creature(1, "p1", 6, 6));
        let p2 = bare_player(5);
        let snap = snapshot(p1, p2);
        let eval = evaluate(&snap, &PlayerId::new("p1"), &EvalWeights::default());
        let lethal = eval
            .opportunities
            .iter()
            .find(|o| o.kind == OpportunityKind::LethalAttack)
            .expect("lethal window");
        assert!((lethal.value - 0.9).abs() < 1e-6);
        assert_eq!(eval.best_opportunity().unwrap().kind, OpportunityKind::LethalAttack);
    }

    #[test]
    fn immediate_threat_heads_recommendations() {
        let p1 = bare_player(20);
        let mut p2 = bare_player(20);
        p2.battlefield.push(creature(7, "p2", 7, 7));
        let snap = snapshot(p1, p2);
        let eval = evaluate(&snap, &PlayerId::new("p1"), &EvalWeights::default());
        assert!(eval.has_immediate_threat());
        assert!(eval.recommendations[0].contains("creature-7"));
    }

    #[test]
    fn land_development_suggested_when_short_on_lands() {
        let mut p1 = bare_player(20);
        p1.hand.push(CardSummary {
            id: CardId::new("l1"),
            name: "Forest".to_string(),
            kind: CardKind::Land,
            mana_value: 0,
            colors: Vec::new(),
            keywords: Vec::new(),
            power: None,
            toughness: None,
            text: String::new(),
        });
        let snap = snapshot(p1, bare_player(20));
        let eval = evaluate(&snap, &PlayerId::new("p1"), &EvalWeights::default());
        assert!(eval
            .opportunities
            .iter()
            .any(|o| o.kind == OpportunityKind::DevelopLands));
    }
}
