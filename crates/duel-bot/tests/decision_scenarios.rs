//! End-to-end decision scenarios through the public planner surface.

use duel_bot::planner::{
    CombatStrategy, PlannerConfig, ResponseAction, combat, stack,
};
use duel_bot::BotPlayer;
use duel_core::difficulty::{DifficultyLevel, DifficultyRegistry};
use duel_core::eval::EvalWeights;
use duel_core::model::card::{CardId, Color};
use duel_core::model::mana::ManaPool;
use duel_core::model::permanent::{Permanent, PermanentId, PermanentKind};
use duel_core::model::player::{PlayerId, PlayerState};
use duel_core::model::snapshot::{GameSnapshot, Phase, TurnInfo};
use duel_core::model::stack::{
    AvailableResponse, ResponseEffect, StackContext, StackObject, StackObjectKind, Target,
};
use std::collections::BTreeMap;
use std::sync::Arc;

fn player(life: i32) -> PlayerState {
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

fn creature(id: u64, controller: &str, power: i32, toughness: i32, mv: u32) -> Permanent {
    Permanent {
        id: PermanentId(id),
        card_id: CardId::new(format!("c{id}")),
        name: format!("creature-{id}"),
        kind: PermanentKind::Creature { power, toughness },
        controller: PlayerId::new(controller),
        tapped: false,
        counters: BTreeMap::new(),
        keywords: Vec::new(),
        mana_value: mv,
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
            number: 6,
            active_player: PlayerId::new("p2"),
            phase: Phase::PrecombatMain,
            priority_player: PlayerId::new("p1"),
        },
        stack: Vec::new(),
        command_zone: BTreeMap::new(),
    }
}

fn pending(name: &str, mv: u32, colors: Vec<Color>, targets: Vec<Target>) -> StackObject {
    StackObject {
        id: 1,
        controller: PlayerId::new("p2"),
        kind: StackObjectKind::Spell,
        name: name.to_string(),
        mana_value: mv,
        colors,
        targets,
        instant_speed: false,
        timestamp: 20,
    }
}

fn counter_response(id: &str, cost: u32, magnitude: u8) -> AvailableResponse {
    AvailableResponse {
        card_id: CardId::new(id),
        name: format!("counter-{id}"),
        mana_cost: cost,
        can_counter: true,
        can_target: true,
        effect: ResponseEffect::Counter,
        magnitude,
        instant_speed: true,
        recurrable: false,
    }
}

fn context(pending: StackObject, mana: u32, responses: Vec<AvailableResponse>) -> StackContext {
    StackContext {
        pending,
        stack_depth: 1,
        items_above: Vec::new(),
        available_mana: mana,
        responses,
        own_turn: false,
        phase: Phase::PrecombatMain,
    }
}

// A plain 3-mana creature resolves unanswered when the player holds no
// responses.
#[test]
fn creature_spell_with_no_responses_resolves() {
    let ctx = context(pending("Centaur Courser", 3, Vec::new(), Vec::new()), 4, Vec::new());
    let snap = snapshot(player(20), player(20));
    let decision = stack::evaluate_response(
        &ctx,
        &snap,
        &PlayerId::new("p1"),
        &PlannerConfig::default(),
        &EvalWeights::default(),
    );
    assert!(!decision.should_respond);
    assert_eq!(decision.action, ResponseAction::Pass);
}

// A 6-mana spell against an affordable magnitude-7 counter is answered,
// naming the counter's card id.
#[test]
fn haymaker_draws_out_the_counter() {
    let ctx = context(
        pending("Endgame Engine", 6, Vec::new(), Vec::new()),
        4,
        vec![counter_response("daze", 2, 7)],
    );
    let snap = snapshot(player(20), player(20));
    let player_id = PlayerId::new("p1");

    let general = stack::evaluate_response(
        &ctx,
        &snap,
        &player_id,
        &PlannerConfig::default(),
        &EvalWeights::default(),
    );
    assert!(general.should_respond);
    assert_eq!(general.action, ResponseAction::Respond);
    assert_eq!(general.response_card, Some(CardId::new("daze")));

    let counterspell = stack::decide_counterspell(&ctx, &snap, &player_id);
    assert!(counterspell.should_respond);
    assert_eq!(counterspell.response_card, Some(CardId::new("daze")));
}

// At 5 life against targeted burn, a free high-magnitude counter is used
// with confidence above 0.8.
#[test]
fn lethal_burn_countered_with_conviction() {
    let ctx = context(
        pending(
            "Searing Bolt",
            1,
            vec![Color::Red],
            vec![Target::Player(PlayerId::new("p1"))],
        ),
        0,
        vec![counter_response("pact", 0, 8)],
    );
    let snap = snapshot(player(5), player(20));
    let decision = stack::decide_counterspell(&ctx, &snap, &PlayerId::new("p1"));
    assert!(decision.should_respond);
    assert!(decision.confidence > 0.8);
}

// The counterspell gate: across a sweep of pending spells, shouldRespond
// implies the weighted score cleared 2.0.
#[test]
fn counterspell_gate_holds_across_a_sweep() {
    let snap = snapshot(player(20), player(20));
    let player_id = PlayerId::new("p1");
    for mv in 0..=8 {
        for magnitude in 1..=9 {
            let ctx = context(
                pending("Sweep Spell", mv, Vec::new(), Vec::new()),
                4,
                vec![counter_response("c", 2, magnitude)],
            );
            let decision = stack::decide_counterspell(&ctx, &snap, &player_id);
            if decision.should_respond {
                assert!(
                    decision.expected_value > 2.0,
                    "responded at score {} (mv {mv}, magnitude {magnitude})",
                    decision.expected_value
                );
            }
        }
    }
}

// A lone 2/2 against an empty board attacks.
#[test]
fn lone_bear_attacks_an_open_opponent() {
    let mut p1 = player(20);
    p1.battlefield.push(creature(1, "p1", 2, 2, 2));
    let snap = snapshot(p1, player(20));
    for strategy in [CombatStrategy::Aggressive, CombatStrategy::Moderate] {
        let attacks =
            combat::generate_attack_decisions(&snap, &PlayerId::new("p1"), strategy);
        assert!(!attacks.is_empty(), "no attack under {strategy:?}");
        assert_eq!(attacks[0].target, PlayerId::new("p2"));
    }
}

// The same 2/2 into a 6-mana 6/4 is a recognized bad trade.
#[test]
fn bear_into_a_dragon_is_a_bad_trade() {
    let mut p1 = player(20);
    p1.battlefield.push(creature(1, "p1", 2, 2, 2));
    let mut p2 = player(20);
    p2.battlefield.push(creature(2, "p2", 6, 4, 6));
    let snap = snapshot(p1, p2);
    for strategy in [
        CombatStrategy::Aggressive,
        CombatStrategy::Moderate,
        CombatStrategy::Defensive,
    ] {
        let attacks =
            combat::generate_attack_decisions(&snap, &PlayerId::new("p1"), strategy);
        for attack in attacks {
            assert!(
                attack.expected_value <= 0.3,
                "bad trade overvalued at {}",
                attack.expected_value
            );
        }
    }
}

// The facade path: an expert bot never responds to a spell its own gate
// rejects, across repeated calls (no randomness at expert).
#[test]
fn expert_facade_is_consistent_on_the_stack() {
    let registry = Arc::new(DifficultyRegistry::with_level(DifficultyLevel::Expert));
    let mut bot = BotPlayer::with_seed(PlayerId::new("p1"), registry, 9);
    let ctx = context(
        pending("Ornithopter", 0, Vec::new(), Vec::new()),
        4,
        vec![counter_response("c", 2, 3)],
    );
    let snap = snapshot(player(20), player(20));
    for _ in 0..20 {
        let decision = bot.respond_to_stack(&ctx, &snap);
        assert!(!decision.should_respond);
    }
}
