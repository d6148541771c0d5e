//! Stack interaction engine: threat assessment for pending objects,
//! response scoring, counterspell cost/benefit, mana holding, and
//! priority-pass risk.

use crate::planner::config::PlannerConfig;
use crate::planner::decision::{
    ManaDirective, PassDecision, ResourceDecision, ResponseAction, ResponseDecision, RiskLevel,
};
use duel_core::eval::{EvalWeights, FactorScores, Urgency, assess_threats, evaluate};
use duel_core::model::card::{CardId, Color};
use duel_core::model::permanent::Permanent;
use duel_core::model::player::PlayerId;
use duel_core::model::snapshot::GameSnapshot;
use duel_core::model::stack::{AvailableResponse, StackContext, StackObject};
use tracing::{Level, event};

/// Threat floor below which responses are not even considered.
const RESPONSE_THREAT_FLOOR: f32 = 0.3;
/// Expected-value gate for spending a response, and its lowered variant
/// when we are behind or the threat is severe.
const RESPONSE_GATE: f32 = 2.0;
const RESPONSE_GATE_PRESSED: f32 = 1.5;
/// Counterspell decision score required to actually counter.
const COUNTER_GATE: f32 = 2.0;
/// Exhaustive ordering search is factorial; past this many candidates fall
/// back to magnitude-descending.
const MAX_ORDER_PERMUTATION: usize = 6;

/// How dangerous the pending stack object is to `player`, in [0,1].
pub fn assess_stack_threat(
    ctx: &StackContext,
    snapshot: &GameSnapshot,
    player: &PlayerId,
) -> f32 {
    let pending = &ctx.pending;
    let state = snapshot.player(player);
    let mut threat = (pending.mana_value as f32 / 15.0).min(0.4);

    if pending.targets_player(player) {
        threat += 0.3;
    }

    let own_target_importance = pending
        .targeted_permanents()
        .filter_map(|id| state.find_permanent(id))
        .map(permanent_importance)
        .fold(0.0f32, f32::max);
    threat += 0.3 * own_target_importance;

    let name = pending.name_lower();
    if name.contains("destroy") || name.contains("exile") || name.contains("wrath") {
        threat += 0.2;
    }
    if name.contains("counter") {
        threat += 0.3;
    }
    if name.contains("draw") && &pending.controller != player {
        threat += 0.15;
    }

    // Context bumps: already hurting, or already under board pressure.
    if state.life < 10 {
        threat += 0.1;
    }
    if assess_threats(snapshot, player)
        .iter()
        .any(|t| t.urgency == Urgency::Immediate)
    {
        threat += 0.1;
    }

    threat.clamp(0.0, 1.0)
}

/// Importance of one of our permanents as a removal target, in [0,1].
fn permanent_importance(perm: &Permanent) -> f32 {
    let base = if perm.is_planeswalker() {
        (0.4 + perm.loyalty() as f32 / 10.0).min(0.8)
    } else if perm.is_creature() {
        ((perm.power() + perm.toughness()) as f32 / 12.0).min(0.8)
    } else if perm.is_land() {
        0.1
    } else {
        0.3
    };
    let hexproof_bonus = if perm.has_keyword(duel_core::model::keyword::Keyword::Hexproof) {
        0.2
    } else {
        0.0
    };
    (base + hexproof_bonus).min(1.0)
}

/// Name/color heuristic for "this probably deals damage". Deliberately
/// approximate; there is no structured damage amount to read.
fn looks_like_damage(obj: &StackObject) -> bool {
    let name = obj.name_lower();
    name.contains("bolt")
        || name.contains("shock")
        || name.contains("strike")
        || name.contains("blast")
        || name.contains("burn")
        || name.contains("damage")
        || obj.has_color(Color::Red)
}

/// General response decision for the pending stack object.
pub fn evaluate_response(
    ctx: &StackContext,
    snapshot: &GameSnapshot,
    player: &PlayerId,
    config: &PlannerConfig,
    weights: &EvalWeights,
) -> ResponseDecision {
    let threat = assess_stack_threat(ctx, snapshot, player);
    if threat < RESPONSE_THREAT_FLOOR {
        return ResponseDecision::pass(
            format!("{} is not threatening enough to answer", ctx.pending.name),
            0.7,
        );
    }

    let evaluation = evaluate(snapshot, player, weights);
    let factors = &evaluation.factors;
    let win_protect = factors.win_condition_progress > 0.7 && pending_touches_us(ctx, snapshot, player);

    let mut best: Option<(&AvailableResponse, f32)> = None;
    for response in ctx.affordable_responses() {
        let score = response_score(response, ctx, threat, config, win_protect);
        let better = best.as_ref().is_none_or(|(b, s)| {
            score > *s || (score == *s && response.card_id < b.card_id)
        });
        if better {
            best = Some((response, score));
        }
    }

    let Some((response, score)) = best else {
        return ResponseDecision::pass("no affordable response available", 0.8);
    };

    let gate = if evaluation.total < 0.0 || threat > 0.7 {
        RESPONSE_GATE_PRESSED
    } else {
        RESPONSE_GATE
    };
    if score <= gate {
        return ResponseDecision::pass(
            format!("best response {} not worth the card", response.name),
            0.6,
        );
    }

    let confidence = (0.5
        + ((score - gate) * 0.1).min(0.3)
        + if threat > 0.5 { 0.1 } else { 0.0 })
    .min(1.0);

    log_stack_decision(player, &ctx.pending.name, true, score);
    ResponseDecision {
        should_respond: true,
        action: ResponseAction::Respond,
        response_card: Some(response.card_id.clone()),
        target: Some(ctx.pending.id),
        expected_value: score,
        confidence,
        reasoning: format!(
            "Answer {} with {} (threat {threat:.2})",
            ctx.pending.name, response.name
        ),
    }
}

fn pending_touches_us(ctx: &StackContext, snapshot: &GameSnapshot, player: &PlayerId) -> bool {
    let state = snapshot.player(player);
    ctx.pending.targets_player(player)
        || ctx
            .pending
            .targeted_permanents()
            .any(|id| state.find_permanent(id).is_some())
}

fn response_score(
    response: &AvailableResponse,
    ctx: &StackContext,
    threat: f32,
    config: &PlannerConfig,
    win_protect: bool,
) -> f32 {
    use duel_core::model::stack::ResponseEffect;

    let magnitude = response.magnitude as f32;
    let cost = response.mana_cost as f32;
    let mut score = magnitude * 0.5;
    score += magnitude / (cost + 1.0) * config.response_efficiency_weight;
    score += threat;
    score += match response.effect {
        ResponseEffect::Counter => 0.8,
        ResponseEffect::Destroy | ResponseEffect::Exile => 0.5,
        ResponseEffect::Damage => 0.4,
        ResponseEffect::Bounce => 0.3,
        ResponseEffect::Draw => 0.1,
        ResponseEffect::Other => 0.0,
    };
    score += (ctx.pending.mana_value as f32 - cost) * 0.1;
    score -= ctx.stack_depth as f32 * 0.1;
    score += (ctx.available_mana as f32 - cost) * 0.05;
    if win_protect {
        score += 1.0;
    }
    score
}

/// Dedicated counter-magic cost/benefit decision.
pub fn decide_counterspell(
    ctx: &StackContext,
    snapshot: &GameSnapshot,
    player: &PlayerId,
) -> ResponseDecision {
    let state = snapshot.player(player);
    let mut counters: Vec<&AvailableResponse> =
        ctx.affordable_responses().filter(|r| r.is_counter()).collect();
    counters.sort_by(|a, b| {
        b.magnitude
            .cmp(&a.magnitude)
            .then_with(|| a.mana_cost.cmp(&b.mana_cost))
            .then_with(|| a.card_id.cmp(&b.card_id))
    });
    let Some(best) = counters.first().copied() else {
        return ResponseDecision::pass("no counter available", 0.7);
    };
    let has_backup = counters.len() > 1;

    let threat = assess_stack_threat(ctx, snapshot, player);
    let factors = FactorScores::compute(snapshot, player);

    let mv_delta = ctx.pending.mana_value as f32 - best.mana_cost as f32;
    let card_advantage = (0.5 + 0.05 * mv_delta).clamp(0.0, 1.0);
    let tempo = (mv_delta * 0.1).clamp(-0.5, 1.0);

    let self_targeted_damage =
        ctx.pending.targets_player(player) && looks_like_damage(&ctx.pending);
    let life_impact = if self_targeted_damage && state.life <= 5 {
        1.0
    } else if self_targeted_damage {
        0.3
    } else {
        0.0
    };

    let win_disruption = if factors.win_condition_progress > 0.7
        && pending_touches_us(ctx, snapshot, player)
    {
        1.0
    } else {
        0.0
    };

    let opp_likely_counter = snapshot
        .opponents(player)
        .any(|(_, opp)| opp.hand.len() > 2);

    let mut score = 3.0 * threat
        + 1.5 * card_advantage
        + 1.0 * tempo
        + 1.2 * life_impact
        + 2.5 * win_disruption;
    if opp_likely_counter && !has_backup {
        score -= 2.0;
    }
    if has_backup {
        score += 0.5;
    }
    if best.recurrable {
        score += 0.3;
    }

    let confidence = (0.5
        + 0.2 * threat
        + if opp_likely_counter { 0.0 } else { 0.1 }
        + if has_backup { 0.1 } else { 0.0 }
        + if win_disruption > 0.0 { 0.1 } else { 0.0 }
        + 0.3 * life_impact
        + if threat > 0.5 { 0.15 } else { 0.0 })
    .min(1.0);

    if score <= COUNTER_GATE {
        return ResponseDecision::pass(
            format!("countering {} scores {score:.2}, below the bar", ctx.pending.name),
            confidence,
        );
    }

    log_stack_decision(player, &ctx.pending.name, true, score);
    ResponseDecision {
        should_respond: true,
        action: ResponseAction::Respond,
        response_card: Some(best.card_id.clone()),
        target: Some(ctx.pending.id),
        expected_value: score,
        confidence,
        reasoning: format!(
            "Counter {} with {} (score {score:.2})",
            ctx.pending.name, best.name
        ),
    }
}

/// Hold or spend open mana this priority window.
pub fn manage_resources(
    ctx: &StackContext,
    snapshot: &GameSnapshot,
    player: &PlayerId,
) -> ResourceDecision {
    let reserve = ctx
        .responses
        .iter()
        .filter(|r| r.instant_speed)
        .max_by_key(|r| (r.magnitude, std::cmp::Reverse(r.mana_cost)))
        .map(|r| r.mana_cost)
        .unwrap_or(0);

    let immediate = assess_threats(snapshot, player)
        .iter()
        .any(|t| t.urgency == Urgency::Immediate);
    let any_instant = ctx.responses.iter().any(|r| r.instant_speed);
    let good_instant = ctx
        .responses
        .iter()
        .any(|r| r.instant_speed && r.magnitude >= 5);
    let opponents_remain = snapshot.opponent_count(player) > 0;

    let (directive, reasoning) = if !immediate && ctx.responses.len() >= 2 {
        (
            ManaDirective::HoldForBetterThreat,
            "nothing urgent; keep options open for a scarier spell".to_string(),
        )
    } else if good_instant && ctx.own_turn {
        (
            ManaDirective::HoldForEndStep,
            "strong instant in hand; act at end of turn with information".to_string(),
        )
    } else if any_instant && ctx.own_turn && opponents_remain {
        (
            ManaDirective::HoldForOpponentTurn,
            "keep interaction up across the opponent's turn".to_string(),
        )
    } else {
        (
            ManaDirective::UseNow,
            "no instant-speed reason to sit on mana".to_string(),
        )
    };

    ResourceDecision {
        directive,
        reserved_mana: if directive == ManaDirective::UseNow {
            0
        } else {
            reserve
        },
        reasoning,
    }
}

/// Whether passing priority without acting is acceptable right now.
pub fn decide_priority_pass(
    ctx: &StackContext,
    snapshot: &GameSnapshot,
    player: &PlayerId,
) -> PassDecision {
    let state = snapshot.player(player);
    let threat = assess_stack_threat(ctx, snapshot, player);
    let factors = FactorScores::compute(snapshot, player);
    let avg_opp_hand = snapshot.avg_opponent(player, |p| p.hand.len() as f32);

    let mut risk_score = 0.5 * threat;
    if state.life < 10 {
        risk_score += 0.3;
    }
    risk_score += (avg_opp_hand / 7.0).min(1.0) * 0.1;
    if factors.card_advantage < 0.0 {
        risk_score += 0.2;
    }

    let risk = if risk_score < 0.3 {
        RiskLevel::Low
    } else if risk_score < 0.6 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };

    let opponents_remain = snapshot.opponent_count(player) > 0;
    let should_pass = !(threat > 0.7
        || (threat > 0.5 && risk != RiskLevel::Low)
        || (opponents_remain && risk == RiskLevel::High));

    PassDecision {
        should_pass,
        risk,
        reasoning: if should_pass {
            format!("safe to pass (threat {threat:.2}, risk {risk:?})")
        } else {
            format!("holding priority (threat {threat:.2}, risk {risk:?})")
        },
    }
}

/// Order multiple responses so the most impactful resolves first. Earlier
/// resolution is discounted least: position `i` is worth `1 - 0.1*i` of the
/// response's magnitude. Up to six candidates get a full permutation
/// search; beyond that, magnitude-descending (which the decay makes
/// optimal anyway) is used directly.
pub fn optimize_response_order(ctx: &StackContext) -> Vec<CardId> {
    let mut candidates: Vec<&AvailableResponse> = ctx.affordable_responses().collect();
    if candidates.len() <= 1 {
        return candidates.iter().map(|r| r.card_id.clone()).collect();
    }

    if candidates.len() > MAX_ORDER_PERMUTATION {
        candidates.sort_by(|a, b| {
            b.magnitude
                .cmp(&a.magnitude)
                .then_with(|| a.card_id.cmp(&b.card_id))
        });
        return candidates.iter().map(|r| r.card_id.clone()).collect();
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    let mut best_order = order.clone();
    let mut best_score = ordering_score(&order, &candidates);
    permute(&mut order, 0, &mut |perm| {
        let score = ordering_score(perm, &candidates);
        if score > best_score {
            best_score = score;
            best_order = perm.to_vec();
        }
    });

    best_order
        .iter()
        .map(|&i| candidates[i].card_id.clone())
        .collect()
}

fn ordering_score(order: &[usize], candidates: &[&AvailableResponse]) -> f32 {
    order
        .iter()
        .enumerate()
        .map(|(pos, &i)| candidates[i].magnitude as f32 * (1.0 - 0.1 * pos as f32))
        .sum()
}

fn permute(items: &mut Vec<usize>, at: usize, visit: &mut impl FnMut(&[usize])) {
    if at == items.len() {
        visit(items);
        return;
    }
    for i in at..items.len() {
        items.swap(at, i);
        permute(items, at + 1, visit);
        items.swap(at, i);
    }
}

fn log_stack_decision(player: &PlayerId, pending: &str, respond: bool, score: f32) {
    if tracing::enabled!(Level::DEBUG) {
        event!(
            target: "duel_bot::stack",
            Level::DEBUG,
            player = %player,
            pending,
            respond,
            score,
        );
    }
}
