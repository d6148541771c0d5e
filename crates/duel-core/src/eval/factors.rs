use crate::eval::weights::EvalWeights;
use crate::model::card::CardSummary;
use crate::model::player::{PlayerId, PlayerState};
use crate::model::snapshot::GameSnapshot;
use serde::{Deserialize, Serialize};

fn clip(value: f32) -> f32 {
    value.clamp(-1.0, 1.0)
}

/// The eighteen per-factor scores, each normalized to roughly [-1, 1]
/// before weighting. Poison may only exceed the band on the negative side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorScores {
    pub life: f32,
    pub poison: f32,
    pub card_advantage: f32,
    pub hand_quality: f32,
    pub library_depth: f32,
    pub creature_power: f32,
    pub creature_toughness: f32,
    pub creature_count: f32,
    pub permanent_advantage: f32,
    pub mana_available: f32,
    pub tempo: f32,
    pub commander_damage: f32,
    pub commander_presence: f32,
    pub card_selection: f32,
    pub graveyard_value: f32,
    pub synergy: f32,
    pub win_condition_progress: f32,
    pub inevitability: f32,
}

impl FactorScores {
    pub fn compute(snapshot: &GameSnapshot, player: &PlayerId) -> Self {
        let own = snapshot.player(player);

        Self {
            life: life_score(snapshot, player, own),
            poison: poison_score(own),
            card_advantage: card_advantage(snapshot, player, own),
            hand_quality: hand_quality(own),
            library_depth: library_depth(own),
            creature_power: untapped_stat_advantage(snapshot, player, own, |p| p.power()),
            creature_toughness: untapped_stat_advantage(snapshot, player, own, |p| p.toughness()),
            creature_count: creature_count_advantage(snapshot, player, own),
            permanent_advantage: permanent_advantage(snapshot, player, own),
            mana_available: mana_available(own),
            tempo: tempo_advantage(snapshot, player, own),
            commander_damage: commander_damage(snapshot, player, own),
            commander_presence: commander_presence(snapshot, player),
            card_selection: card_selection(own),
            graveyard_value: graveyard_value(own),
            synergy: synergy(own),
            win_condition_progress: win_condition_progress(snapshot, player),
            inevitability: inevitability(snapshot, player, own),
        }
    }

    pub fn weighted_total(&self, weights: &EvalWeights) -> f32 {
        self.life * weights.life
            + self.poison * weights.poison
            + self.card_advantage * weights.card_advantage
            + self.hand_quality * weights.hand_quality
            + self.library_depth * weights.library_depth
            + self.creature_power * weights.creature_power
            + self.creature_toughness * weights.creature_toughness
            + self.creature_count * weights.creature_count
            + self.permanent_advantage * weights.permanent_advantage
            + self.mana_available * weights.mana_available
            + self.tempo * weights.tempo
            + self.commander_damage * weights.commander_damage
            + self.commander_presence * weights.commander_presence
            + self.card_selection * weights.card_selection
            + self.graveyard_value * weights.graveyard_value
            + self.synergy * weights.synergy
            + self.win_condition_progress * weights.win_condition_progress
            + self.inevitability * weights.inevitability
    }
}

fn life_score(snapshot: &GameSnapshot, player: &PlayerId, own: &PlayerState) -> f32 {
    let avg_opp = snapshot.avg_opponent(player, |p| p.life as f32);
    clip((own.life as f32 - avg_opp) / 20.0)
}

// Ten poison is lethal, so this naturally bottoms near -1. Not clipped.
fn poison_score(own: &PlayerState) -> f32 {
    -(own.poison as f32) / 10.0
}

fn card_advantage(snapshot: &GameSnapshot, player: &PlayerId, own: &PlayerState) -> f32 {
    let avg_opp = snapshot.avg_opponent(player, |p| p.resource_count() as f32);
    clip((own.resource_count() as f32 - avg_opp) / 3.0)
}

fn hand_quality(own: &PlayerState) -> f32 {
    if own.hand.is_empty() {
        return -0.5;
    }
    let avg_mv: f32 = own.hand.iter().map(|c| c.mana_value as f32).sum::<f32>()
        / own.hand.len() as f32;
    let curve = 1.0 - (avg_mv - 2.5).abs() / 3.0;
    let land_factor = if own.hand.iter().any(|c| c.is_land()) {
        1.0
    } else {
        0.5
    };
    curve * land_factor
}

fn library_depth(own: &PlayerState) -> f32 {
    match own.library_count {
        n if n > 20 => 1.0,
        n if n > 10 => 0.5,
        n if n > 5 => 0.0,
        _ => -1.0,
    }
}

fn untapped_stat_advantage<F>(
    snapshot: &GameSnapshot,
    player: &PlayerId,
    own: &PlayerState,
    stat: F,
) -> f32
where
    F: Fn(&crate::model::permanent::Permanent) -> i32 + Copy,
{
    let own_total: i32 = own.untapped_creatures().map(stat).sum();
    let avg_opp = snapshot.avg_opponent(player, |p| {
        p.untapped_creatures().map(stat).sum::<i32>() as f32
    });
    clip((own_total as f32 - avg_opp) / 7.0)
}

fn creature_count_advantage(snapshot: &GameSnapshot, player: &PlayerId, own: &PlayerState) -> f32 {
    let avg_opp = snapshot.avg_opponent(player, |p| p.creature_count() as f32);
    clip((own.creature_count() as f32 - avg_opp) / 2.0)
}

fn permanent_advantage(snapshot: &GameSnapshot, player: &PlayerId, own: &PlayerState) -> f32 {
    let avg_opp = snapshot.avg_opponent(player, |p| p.battlefield.len() as f32);
    clip((own.battlefield.len() as f32 - avg_opp) / 3.0)
}

fn mana_available(own: &PlayerState) -> f32 {
    let total = own.potential_mana() as f32;
    if total == 0.0 {
        -0.5
    } else if total <= 5.0 {
        total / 5.0
    } else {
        // Diminishing value past five mana.
        1.0 - (total - 5.0) / 10.0
    }
}

fn tempo_advantage(snapshot: &GameSnapshot, player: &PlayerId, own: &PlayerState) -> f32 {
    let mut score: f32 = 0.0;
    if snapshot.is_turn_of(player) {
        score += 0.5;
    }
    if snapshot.has_priority(player) {
        score += 0.3;
    }
    let avg_opp_untapped = snapshot.avg_opponent(player, |p| p.untapped_land_count() as f32);
    if own.untapped_land_count() as f32 > avg_opp_untapped {
        score += 0.2;
    }
    score.min(1.0)
}

fn commander_damage(snapshot: &GameSnapshot, player: &PlayerId, own: &PlayerState) -> f32 {
    let dealt = snapshot.total_commander_damage_dealt(player) as f32;
    let taken = own.commander_damage_taken() as f32;
    (dealt - taken) / 21.0
}

fn commander_presence(snapshot: &GameSnapshot, player: &PlayerId) -> f32 {
    if snapshot.commander_on_battlefield(player) {
        1.0
    } else {
        0.0
    }
}

fn card_selection(own: &PlayerState) -> f32 {
    if own.hand.is_empty() {
        return -0.5;
    }
    let mut total = 0.0;
    for card in &own.hand {
        if card.is_instant_speed() {
            total += 0.2;
        }
        if card.mana_value <= 2 {
            total += 0.1;
        }
        if card.mana_value >= 6 {
            total -= 0.1;
        }
    }
    clip(total / own.hand.len() as f32)
}

fn graveyard_value(own: &PlayerState) -> f32 {
    (own.graveyard.len() as f32 / 10.0).min(1.0)
}

fn synergy(own: &PlayerState) -> f32 {
    let mut score: f32 = 0.0;
    if own.creature_count() >= 2 && own.hand.iter().any(|c| c.is_creature()) {
        score += 0.3;
    }
    if own.land_count() >= 3 && own.hand.iter().any(looks_like_ramp) {
        score += 0.2;
    }
    score.min(1.0)
}

/// Best-effort flavor check for land ramp. Misses are fine; the factor just
/// stays flat.
pub fn looks_like_ramp(card: &CardSummary) -> bool {
    let text = card.text_lower();
    let name = card.name_lower();
    (text.contains("search your library") && text.contains("land"))
        || text.contains("add {")
        || name.contains("cultivate")
        || name.contains("growth")
}

fn win_condition_progress(snapshot: &GameSnapshot, player: &PlayerId) -> f32 {
    let mut score: f32 = 0.0;
    let min_opp_life = snapshot
        .opponents(player)
        .map(|(_, p)| p.life)
        .min()
        .unwrap_or(i32::MAX);
    let min_opp_library = snapshot
        .opponents(player)
        .map(|(_, p)| p.library_count)
        .min()
        .unwrap_or(u32::MAX);
    let max_opp_poison = snapshot
        .opponents(player)
        .map(|(_, p)| p.poison)
        .max()
        .unwrap_or(0);

    if min_opp_life <= 10 {
        score += 0.5;
    }
    if min_opp_life <= 5 {
        score += 0.3;
    }
    if min_opp_library <= 20 {
        score += 0.3;
    }
    if min_opp_library <= 10 {
        score += 0.4;
    }
    if max_opp_poison >= 5 {
        score += 0.5;
    }
    if max_opp_poison >= 8 {
        score += 0.3;
    }
    let max_dealt = snapshot.max_commander_damage_dealt(player);
    if max_dealt >= 10 {
        score += 0.3;
    }
    if max_dealt >= 15 {
        score += 0.4;
    }
    score.min(1.0)
}

fn inevitability(snapshot: &GameSnapshot, player: &PlayerId, own: &PlayerState) -> f32 {
    let mut score: f32 = 0.0;
    let own_depth = (own.hand.len() + own.library_count as usize) as f32;
    let avg_opp_depth =
        snapshot.avg_opponent(player, |p| (p.hand.len() + p.library_count as usize) as f32);
    if own_depth - avg_opp_depth > 5.0 {
        score += 0.3;
    }
    if own.battlefield.len() > 5 {
        score += 0.2;
    }
    score += 0.3 * own.planeswalkers().count() as f32;
    score.min(1.0)
}
