//! Combat decision tree: overall posture, attack declarations against the
//! defender's best blocks, and block assignments against declared attacks.

use crate::planner::config::PlannerConfig;
use crate::planner::decision::{
    AttackDecision, BlockDecision, CombatPlan, CombatStrategy, IncomingAttack,
};
use crate::planner::tricks::find_combat_tricks;
use duel_core::model::keyword::Keyword;
use duel_core::model::permanent::Permanent;
use duel_core::model::player::{PlayerId, PlayerState};
use duel_core::model::snapshot::GameSnapshot;
use tracing::{Level, event};

/// What a single block resolves to, assuming no pumps or tricks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockOutcome {
    AttackerDies,
    Trade,
    NoDeaths,
    BlockerDies,
}

impl BlockOutcome {
    /// Defender preference, best first. Used to pick the worst case for the
    /// attacker when valuing an attack.
    const fn defender_rank(self) -> u8 {
        match self {
            BlockOutcome::AttackerDies => 0,
            BlockOutcome::Trade => 1,
            BlockOutcome::NoDeaths => 2,
            BlockOutcome::BlockerDies => 3,
        }
    }
}

/// Outcome of `blocker` blocking `attacker`, pure stats plus first strike.
/// Deliberately ignores deathtouch so identical stats always classify the
/// same way regardless of keyword order.
fn classify_block(attacker: &Permanent, blocker: &Permanent) -> BlockOutcome {
    let attacker_dies = blocker.power() >= attacker.toughness();
    let blocker_dies = attacker.power() >= blocker.toughness();

    // First strike kills before the slower creature deals damage.
    if attacker.has_first_strike() && !blocker.has_first_strike() && blocker_dies {
        return BlockOutcome::BlockerDies;
    }
    if blocker.has_first_strike() && !attacker.has_first_strike() && attacker_dies {
        return BlockOutcome::AttackerDies;
    }

    match (attacker_dies, blocker_dies) {
        (true, true) => BlockOutcome::Trade,
        (true, false) => BlockOutcome::AttackerDies,
        (false, true) => BlockOutcome::BlockerDies,
        (false, false) => BlockOutcome::NoDeaths,
    }
}

/// Whether `blocker` may legally be assigned to `attacker` under the
/// simplified evasion model.
pub(crate) fn can_block(attacker: &Permanent, blocker: &Permanent) -> bool {
    if !blocker.is_creature() || !blocker.untapped() {
        return false;
    }
    if attacker.is_unblockable() {
        return false;
    }
    if attacker.has_keyword(Keyword::Flying)
        && !blocker.has_keyword(Keyword::Flying)
        && !blocker.has_keyword(Keyword::Reach)
    {
        return false;
    }
    true
}

/// Overall combat posture for the turn.
pub fn classify_strategy(
    snapshot: &GameSnapshot,
    player: &PlayerId,
    config: &PlannerConfig,
) -> CombatStrategy {
    let state = snapshot.player(player);
    if state.life <= config.defensive_life_threshold {
        return CombatStrategy::Defensive;
    }
    if snapshot.opponents(player).any(|(_, opp)| opp.life <= 10) {
        return CombatStrategy::Aggressive;
    }
    let own = state.creature_count() as i32;
    let best_opp = snapshot
        .opponents(player)
        .map(|(_, opp)| opp.creature_count() as i32)
        .max()
        .unwrap_or(0);
    if own - best_opp >= 2 && config.aggression >= 0.4 {
        CombatStrategy::Aggressive
    } else if best_opp - own >= 2 {
        CombatStrategy::Defensive
    } else {
        CombatStrategy::Moderate
    }
}

/// Value each untapped creature as an attacker against each opponent,
/// assuming the defender makes their best available block.
pub fn generate_attack_decisions(
    snapshot: &GameSnapshot,
    player: &PlayerId,
    strategy: CombatStrategy,
) -> Vec<AttackDecision> {
    let state = snapshot.player(player);
    let mut attacks = Vec::new();

    for attacker in state.untapped_creatures() {
        if attacker.power() <= 0 {
            continue;
        }
        let mut best: Option<AttackDecision> = None;
        for (opp_id, opp) in snapshot.opponents(player) {
            let (value, risk, note) = attack_value(attacker, opp, strategy);
            if value <= strategy.attack_threshold() {
                continue;
            }
            let candidate = AttackDecision {
                attacker: attacker.id,
                attacker_name: attacker.name.clone(),
                target: opp_id.clone(),
                expected_value: value,
                risk,
                reasoning: format!("{} attacks {opp_id}: {note}", attacker.name),
            };
            let better = best
                .as_ref()
                .is_none_or(|b| candidate.expected_value > b.expected_value);
            if better {
                best = Some(candidate);
            }
        }
        if let Some(attack) = best {
            attacks.push(attack);
        }
    }

    attacks.sort_by(|a, b| {
        b.expected_value
            .partial_cmp(&a.expected_value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.attacker.cmp(&b.attacker))
    });
    attacks
}

fn attack_value(
    attacker: &Permanent,
    defender: &PlayerState,
    strategy: CombatStrategy,
) -> (f32, f32, String) {
    let blockers: Vec<&Permanent> = defender
        .untapped_creatures()
        .filter(|b| can_block(attacker, b))
        .collect();

    let mut value;
    let mut risk = 0.2;
    let note;

    if blockers.is_empty() {
        value = 0.5 + (attacker.power() as f32 / 4.0 * 0.3).min(0.3);
        note = "no blocker can stop it".to_string();
    } else {
        // Defender picks their best block, so price in the worst case.
        let worst = blockers
            .iter()
            .min_by_key(|b| classify_block(attacker, b).defender_rank())
            .copied()
            .unwrap();
        // Damage that still reaches the defender through the block: trample
        // pushes the excess over the blocker's toughness, anything else is
        // fully absorbed. Scaled against the defender's remaining life.
        let through = if attacker.has_keyword(Keyword::Trample) {
            (attacker.power() - worst.toughness()).max(0)
        } else {
            0
        };
        value = (through as f32 / defender.life.max(1) as f32).min(1.0);
        match classify_block(attacker, worst) {
            BlockOutcome::AttackerDies => {
                value -= 0.5 + (attacker.mana_value as f32 / 20.0).min(0.3);
                risk = 0.8;
                note = format!("{} eats it one-sided", worst.name);
            }
            BlockOutcome::Trade => {
                let delta = attacker.mana_value as f32 - worst.mana_value as f32;
                value += -0.1 + 0.05 * -delta;
                risk = 0.5;
                note = format!("trades with {}", worst.name);
            }
            BlockOutcome::NoDeaths => {
                value -= 0.1;
                risk = 0.3;
                note = format!("bounces off {}", worst.name);
            }
            BlockOutcome::BlockerDies => {
                value += 0.3 + (0.05 * worst.mana_value as f32).min(0.2);
                risk = 0.3;
                note = format!("forces a losing block from {}", worst.name);
            }
        }
    }
    if attacker.has_evasion() {
        value += 0.2;
    }

    // Losing an expensive creature hurts more than losing a cheap one.
    value -= (attacker.mana_value as f32 / 20.0).min(0.3);
    match strategy {
        CombatStrategy::Aggressive => value += 0.1,
        CombatStrategy::Defensive => value -= 0.2,
        CombatStrategy::Moderate => {}
    }

    (value, risk, note)
}

/// Assign blockers to declared attacks, each creature used at most once.
/// Attacks are handled biggest first so the scariest attacker gets first
/// pick of our blockers.
pub fn plan_blocks(
    snapshot: &GameSnapshot,
    player: &PlayerId,
    incoming: &[IncomingAttack],
    config: &PlannerConfig,
) -> Vec<BlockDecision> {
    let state = snapshot.player(player);
    let mut used: Vec<duel_core::model::permanent::PermanentId> = Vec::new();
    let mut decisions = Vec::new();

    let mut attackers: Vec<&Permanent> = incoming
        .iter()
        .filter(|atk| &atk.target == player)
        .filter_map(|atk| {
            snapshot
                .players
                .values()
                .flat_map(|p| p.battlefield.iter())
                .find(|perm| perm.id == atk.attacker)
        })
        .collect();
    attackers.sort_by(|a, b| b.power().cmp(&a.power()).then_with(|| a.id.cmp(&b.id)));

    let unblocked_total: i32 = attackers.iter().map(|a| a.power()).sum();
    let under_pressure =
        state.life - unblocked_total <= config.defensive_life_threshold;

    for attacker in attackers {
        let mut candidates: Vec<(&Permanent, f32)> = state
            .untapped_creatures()
            .filter(|b| !used.contains(&b.id) && can_block(attacker, b))
            .map(|b| (b, block_value(attacker, b, under_pressure)))
            .collect();
        candidates.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });

        let Some(&(first, first_value)) = candidates.first() else {
            continue;
        };
        if first_value <= 0.0 {
            continue;
        }

        let mut blockers = vec![first];
        let mut value = first_value;
        if attacker.has_keyword(Keyword::Menace) {
            // Menace needs a second body; only worth it if the gang block
            // still carries real value after paying for the extra creature.
            let second = candidates
                .iter()
                .skip(1)
                .find(|(b, _)| b.id != first.id)
                .copied();
            match second {
                Some((b, _)) if first_value * 0.6 > 0.2 => {
                    blockers.push(b);
                    value = first_value * 0.6;
                }
                _ => continue, // cannot legally block menace with one creature
            }
        }

        used.extend(blockers.iter().map(|b| b.id));
        let mut order: Vec<&Permanent> = blockers.clone();
        order.sort_by(|a, b| a.mana_value.cmp(&b.mana_value).then_with(|| a.id.cmp(&b.id)));

        decisions.push(BlockDecision {
            attacker: attacker.id,
            blockers: blockers.iter().map(|b| b.id).collect(),
            damage_order: order.iter().map(|b| b.id).collect(),
            value,
            reasoning: format!(
                "Block {} with {}",
                attacker.name,
                blockers
                    .iter()
                    .map(|b| b.name.as_str())
                    .collect::<Vec<_>>()
                    .join(" + ")
            ),
        });
    }

    decisions
}

/// Value of `blocker` blocking `attacker`; anything at or below zero is
/// never taken.
fn block_value(attacker: &Permanent, blocker: &Permanent, under_pressure: bool) -> f32 {
    let mut value = match classify_block(attacker, blocker) {
        BlockOutcome::AttackerDies => 0.8,
        BlockOutcome::Trade => {
            0.4 + 0.05 * (attacker.mana_value as f32 - blocker.mana_value as f32)
        }
        // Eating the hit saves the attacker's power in life, less a
        // discount for tying the blocker up.
        BlockOutcome::NoDeaths => 0.1 * attacker.power() as f32 - 0.1,
        BlockOutcome::BlockerDies => {
            // A chump pays off when the life saved matters, or when the
            // blocker costs next to nothing anyway.
            let saves_real_life = under_pressure && attacker.power() >= 3;
            if saves_real_life || blocker.mana_value <= 1 {
                0.5 - 0.05 * blocker.mana_value as f32
            } else {
                -0.1 - 0.05 * blocker.mana_value as f32
            }
        }
    };
    if attacker.has_first_strike() && !blocker.has_first_strike() {
        value -= 0.2;
    }
    if blocker.has_first_strike() && !attacker.has_first_strike() {
        value += 0.2;
    }
    value
}

/// Full combat plan for the active player's turn: posture, attacks, and
/// combat tricks worth holding up.
pub fn plan_combat(
    snapshot: &GameSnapshot,
    player: &PlayerId,
    config: &PlannerConfig,
) -> CombatPlan {
    let strategy = classify_strategy(snapshot, player, config);
    let attacks = generate_attack_decisions(snapshot, player, strategy);
    let tricks = find_combat_tricks(snapshot, player, &attacks);

    if tracing::enabled!(Level::DEBUG) {
        event!(
            target: "duel_bot::combat",
            Level::DEBUG,
            player = %player,
            strategy = ?strategy,
            attacks = attacks.len(),
            tricks = tricks.len(),
        );
    }

    CombatPlan {
        strategy,
        attacks,
        tricks,
    }
}
