//! Main-phase decision tree: rank candidate land drops, spells, and
//! activated abilities, or decide to pass priority.

use crate::planner::config::PlannerConfig;
use crate::planner::decision::{
    ActionKind, ActionPriority, MainPhaseDecision, PossibleAction,
};
use duel_core::eval::{DetailedEvaluation, EvalWeights, evaluate, looks_like_ramp};
use duel_core::model::card::{CardKind, CardSummary, Color};
use duel_core::model::player::{PlayerId, PlayerState};
use duel_core::model::snapshot::GameSnapshot;
use tracing::{Level, event};

const LAND_DROPS_PER_TURN: u32 = 1;
const BASIC_LAND_NAMES: [&str; 5] = ["plains", "island", "swamp", "mountain", "forest"];

/// Rank everything castable this main phase and decide whether to act or
/// pass. Candidates are only generated during the player's own main phases.
pub fn plan_main_phase(
    snapshot: &GameSnapshot,
    player: &PlayerId,
    config: &PlannerConfig,
    weights: &EvalWeights,
) -> MainPhaseDecision {
    let evaluation = evaluate(snapshot, player, weights);

    if !snapshot.turn.phase.is_main() || !snapshot.is_turn_of(player) {
        return pass_decision(evaluation, "not a main phase with initiative");
    }

    let state = snapshot.player(player);
    let mut actions = Vec::new();
    collect_land_actions(snapshot, state, &mut actions);
    collect_spell_actions(snapshot, player, state, config, &evaluation, &mut actions);
    collect_ability_actions(state, &evaluation, &mut actions);

    apply_ranking_boosts(&evaluation, &mut actions);
    rank_actions(&mut actions);

    let should_pass = should_pass_priority(snapshot, state, config, &actions);
    let confidence = if should_pass {
        0.9
    } else {
        decision_confidence(&actions, &evaluation)
    };

    let best_action = if should_pass {
        None
    } else {
        actions.first().cloned()
    };

    log_decision(player, &actions, should_pass, confidence);

    MainPhaseDecision {
        best_action,
        ranked_actions: actions,
        evaluation,
        should_pass_priority: should_pass,
        confidence,
    }
}

fn pass_decision(evaluation: DetailedEvaluation, reason: &str) -> MainPhaseDecision {
    event!(target: "duel_bot::main_phase", Level::TRACE, reason);
    MainPhaseDecision {
        best_action: None,
        ranked_actions: Vec::new(),
        evaluation,
        should_pass_priority: true,
        confidence: 0.9,
    }
}

fn collect_land_actions(
    snapshot: &GameSnapshot,
    state: &PlayerState,
    actions: &mut Vec<PossibleAction>,
) {
    if state.lands_played_this_turn >= LAND_DROPS_PER_TURN {
        return;
    }
    let behind_on_lands = (state.land_count() as u32) < snapshot.turn.number;
    let needed = colors_hand_needs(state);

    for card in state.hand.iter().filter(|c| c.is_land()) {
        let mut value = 0.5;
        let mut notes = vec!["land drop"];
        if behind_on_lands {
            value += 0.3;
            notes.push("behind on lands");
        }
        if !is_basic_land(card) {
            value += 0.2;
            notes.push("utility land");
        }
        if card.colors.iter().any(|c| needed.contains(c)) {
            value += 0.3;
            notes.push("fills a color the hand needs");
        }
        actions.push(PossibleAction {
            kind: ActionKind::PlayLand,
            card: Some(card.id.clone()),
            permanent: None,
            value,
            risk: 0.0,
            priority: if behind_on_lands {
                ActionPriority::High
            } else {
                ActionPriority::Medium
            },
            reasoning: format!("Play {}: {}", card.name, notes.join(", ")),
        });
    }
}

fn is_basic_land(card: &CardSummary) -> bool {
    BASIC_LAND_NAMES.contains(&card.name_lower().as_str())
}

/// Colors appearing in nonland hand cards that no land in play provides.
fn colors_hand_needs(state: &PlayerState) -> Vec<Color> {
    let mut needed = Vec::new();
    for card in state.hand.iter().filter(|c| !c.is_land()) {
        for color in &card.colors {
            if !needed.contains(color) {
                needed.push(*color);
            }
        }
    }
    needed.retain(|color| !state.lands().any(|land| land_produces(land, *color)));
    needed
}

fn collect_spell_actions(
    snapshot: &GameSnapshot,
    player: &PlayerId,
    state: &PlayerState,
    config: &PlannerConfig,
    evaluation: &DetailedEvaluation,
    actions: &mut Vec<PossibleAction>,
) {
    let mana = state.potential_mana();
    for card in state
        .hand
        .iter()
        .filter(|c| !c.is_land() && c.mana_value <= mana)
    {
        let (base, reasoning) = match card.kind {
            CardKind::Creature => score_creature(snapshot, player, state, card),
            CardKind::Instant => score_instant(snapshot, player, card, config, evaluation),
            CardKind::Sorcery => score_sorcery(state, card, evaluation),
            CardKind::Artifact => score_artifact(snapshot, state, card),
            CardKind::Enchantment => score_enchantment(state, card, evaluation),
            CardKind::Planeswalker => score_planeswalker(snapshot, state, card),
            CardKind::Land => continue,
        };

        let value = base
            * mana_efficiency_factor(state, card)
            * timing_factor(snapshot.turn.number, card.mana_value);
        let risk = (0.1 + card.mana_value as f32 / 20.0).min(0.4);
        actions.push(PossibleAction {
            kind: ActionKind::CastSpell,
            card: Some(card.id.clone()),
            permanent: None,
            value,
            risk,
            priority: bucket_for_value(value),
            reasoning,
        });
    }
}

fn score_creature(
    snapshot: &GameSnapshot,
    player: &PlayerId,
    state: &PlayerState,
    card: &CardSummary,
) -> (f32, String) {
    let stats = (card.power() + card.toughness()) as f32;
    let efficiency = stats / (2.0 * card.mana_value.max(1) as f32);
    let mut value = 0.3 + (efficiency * 0.4).min(0.4);
    let keyword_bonus = (card.keywords.len() as f32 * 0.05).min(0.15);
    value += keyword_bonus;

    let avg_opp_creatures = snapshot.avg_opponent(player, |p| p.creature_count() as f32);
    let mut note = String::new();
    if (state.creature_count() as f32) < avg_opp_creatures {
        value += 0.2;
        note = ", rebuilds board parity".to_string();
    }
    (
        value,
        format!("Creature {}: adds board presence{note}", card.name),
    )
}

fn score_instant(
    snapshot: &GameSnapshot,
    player: &PlayerId,
    card: &CardSummary,
    config: &PlannerConfig,
    evaluation: &DetailedEvaluation,
) -> (f32, String) {
    let text = card.text_lower();
    let mut value = 0.4;
    let mut notes = vec!["instant-speed flexibility"];
    if text.contains("counter target") {
        value += 0.15;
        notes.push("interaction");
    }
    if text.contains("destroy") || text.contains("exile") {
        value += 0.15;
        notes.push("removal");
    }
    if text.contains("draw") {
        value += 0.1;
        notes.push("card draw");
    }
    if evaluation.has_immediate_threat() {
        value += 0.1;
        notes.push("answers a live threat");
    }
    // Casting at sorcery speed wastes the flexibility; discounted when we
    // would rather hold it for later turns.
    if config.hold_mana_for_instants
        && snapshot.turn.phase.is_precombat_main()
        && snapshot.is_turn_of(player)
    {
        value *= 0.7;
    }
    (value, format!("Instant {}: {}", card.name, notes.join(", ")))
}

fn score_sorcery(
    state: &PlayerState,
    card: &CardSummary,
    evaluation: &DetailedEvaluation,
) -> (f32, String) {
    let text = card.text_lower();
    let mut value = 0.3;
    let mut notes = vec!["sorcery"];
    if text.contains("draw") {
        value += if evaluation.factors.card_advantage < 0.0 {
            0.2
        } else {
            0.05
        };
        notes.push("card draw");
    }
    if text.contains("destroy") || text.contains("exile") {
        value += if evaluation.threats.is_empty() { 0.1 } else { 0.25 };
        notes.push("removal");
    }
    if looks_like_ramp(card) && state.land_count() < 4 {
        value += 0.2;
        notes.push("ramp while mana-light");
    }
    (value, format!("Sorcery {}: {}", card.name, notes.join(", ")))
}

fn score_artifact(
    snapshot: &GameSnapshot,
    state: &PlayerState,
    card: &CardSummary,
) -> (f32, String) {
    let text = card.text_lower();
    let mut value = 0.3;
    let mut notes = vec!["artifact"];
    if text.contains("equip") && state.creature_count() >= 1 {
        value += 0.2;
        notes.push("equipment with carriers");
    }
    if (text.contains("add {") || card.name_lower().contains("signet")) && card.mana_value <= 3 {
        value += if snapshot.turn.number <= 4 { 0.2 } else { 0.1 };
        notes.push("mana rock");
    }
    (value, format!("Artifact {}: {}", card.name, notes.join(", ")))
}

fn score_enchantment(
    state: &PlayerState,
    card: &CardSummary,
    evaluation: &DetailedEvaluation,
) -> (f32, String) {
    let text = card.text_lower();
    let mut value = 0.3;
    let mut notes = vec!["enchantment"];
    if text.contains("enchant creature") && state.creature_count() >= 1 {
        value += 0.15;
        notes.push("aura with a target");
    }
    if text.contains("destroy") || text.contains("exile") || text.contains("can't attack") {
        value += if evaluation.threats.is_empty() { 0.1 } else { 0.2 };
        notes.push("removal");
    }
    (
        value,
        format!("Enchantment {}: {}", card.name, notes.join(", ")),
    )
}

fn score_planeswalker(
    snapshot: &GameSnapshot,
    state: &PlayerState,
    card: &CardSummary,
) -> (f32, String) {
    let mut value = 0.7;
    let mut notes = vec!["planeswalker, recurring advantage"];
    if snapshot.turn.number >= 6 {
        value += 0.1;
        notes.push("late game");
    }
    if state.creature_count() >= 2 {
        value += 0.1;
        notes.push("board can protect it");
    }
    (
        value,
        format!("Planeswalker {}: {}", card.name, notes.join(", ")),
    )
}

/// 1.0 when the colored requirements look payable, else a flat discount.
fn mana_efficiency_factor(state: &PlayerState, card: &CardSummary) -> f32 {
    if card.colors.is_empty() {
        return 1.0;
    }
    let payable = card.colors.iter().all(|color| {
        state.mana_pool.of(*color) > 0
            || state.lands().any(|land| land.untapped() && land_produces(land, *color))
    });
    if payable { 1.0 } else { 0.5 }
}

fn land_produces(land: &duel_core::model::permanent::Permanent, color: Color) -> bool {
    let name = land.name.to_ascii_lowercase();
    let basic = match color {
        Color::White => "plains",
        Color::Blue => "island",
        Color::Black => "swamp",
        Color::Red => "mountain",
        Color::Green => "forest",
    };
    if name.contains(basic) {
        return true;
    }
    let symbol = match color {
        Color::White => "{w}",
        Color::Blue => "{u}",
        Color::Black => "{b}",
        Color::Red => "{r}",
        Color::Green => "{g}",
    };
    land.text_lower().contains(symbol)
}

/// Cheap spells early, expensive spells late.
fn timing_factor(turn: u32, mana_value: u32) -> f32 {
    if mana_value <= 3 && turn <= 4 {
        1.1
    } else if mana_value >= 5 && turn >= 6 {
        1.1
    } else if mana_value >= 5 && turn <= 3 {
        0.8
    } else {
        1.0
    }
}

fn collect_ability_actions(
    state: &PlayerState,
    evaluation: &DetailedEvaluation,
    actions: &mut Vec<PossibleAction>,
) {
    for perm in &state.battlefield {
        let text = perm.text_lower();
        // Activated abilities read "cost: effect"; plain mana abilities are
        // not worth a decision slot.
        if !text.contains(':') || text.contains("add {") {
            continue;
        }
        let (value, note) = if text.contains("draw") {
            (0.5, "card draw engine")
        } else if text.contains("destroy") || text.contains("exile") || text.contains("damage") {
            if evaluation.threats.is_empty() {
                (0.3, "removal, nothing pressing")
            } else {
                (0.5, "removal for a live threat")
            }
        } else if text.contains("+1/+1") || text.contains("gets +") {
            (0.4, "pump effect")
        } else {
            continue; // unrecognized ability text, skip the candidate
        };
        actions.push(PossibleAction {
            kind: ActionKind::ActivateAbility,
            card: None,
            permanent: Some(perm.id),
            value,
            risk: 0.2,
            priority: ActionPriority::Medium,
            reasoning: format!("Activate {}: {}", perm.name, note),
        });
    }
}

fn apply_ranking_boosts(evaluation: &DetailedEvaluation, actions: &mut [PossibleAction]) {
    for action in actions.iter_mut() {
        if action.marks_removal() && !evaluation.threats.is_empty() {
            action.value += 0.2;
        }
        if action.marks_card_draw() && evaluation.factors.card_advantage < 0.0 {
            action.value += 0.3;
        }
    }
}

/// Priority bucket first, value second; near-ties inside 0.1 prefer the
/// lower-risk action.
fn rank_actions(actions: &mut Vec<PossibleAction>) {
    actions.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal))
    });
    // Secondary tie-break: one stable pass swapping near-equal values on risk.
    for i in 1..actions.len() {
        let near = actions[i - 1].priority == actions[i].priority
            && (actions[i - 1].value - actions[i].value).abs() <= 0.1;
        if near && actions[i].risk < actions[i - 1].risk {
            actions.swap(i - 1, i);
        }
    }
}

fn bucket_for_value(value: f32) -> ActionPriority {
    if value >= 0.9 {
        ActionPriority::Critical
    } else if value >= 0.6 {
        ActionPriority::High
    } else if value >= 0.35 {
        ActionPriority::Medium
    } else {
        ActionPriority::Low
    }
}

fn should_pass_priority(
    snapshot: &GameSnapshot,
    state: &PlayerState,
    config: &PlannerConfig,
    actions: &[PossibleAction],
) -> bool {
    let Some(best) = actions.first() else {
        return true;
    };
    if best.value < config.min_action_value {
        return true;
    }
    if best.risk > config.max_action_risk {
        return true;
    }
    config.hold_mana_for_instants
        && state.hand.iter().any(|c| c.is_instant_speed())
        && snapshot.turn.phase.is_precombat_main()
        && state.potential_mana() >= 2
        && best.kind != ActionKind::PlayLand
}

fn decision_confidence(actions: &[PossibleAction], evaluation: &DetailedEvaluation) -> f32 {
    let mut confidence: f32 = 0.5;
    match (actions.first(), actions.get(1)) {
        (Some(best), Some(second)) => {
            confidence += (best.value - second.value).clamp(0.0, 0.3);
        }
        (Some(_), None) => confidence += 0.3,
        _ => {}
    }
    if actions.first().is_some_and(|a| a.risk < 0.3) {
        confidence += 0.2;
    }
    if evaluation.total.abs() > 5.0 {
        confidence += 0.2;
    }
    confidence.min(1.0)
}

fn log_decision(player: &PlayerId, actions: &[PossibleAction], pass: bool, confidence: f32) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    let best = actions
        .first()
        .map(|a| a.reasoning.clone())
        .unwrap_or_else(|| "none".to_string());
    event!(
        target: "duel_bot::main_phase",
        Level::DEBUG,
        player = %player,
        candidates = actions.len(),
        pass,
        confidence,
        best = %best,
    );
}
