//! Game-facing bot facade. Wires the decision trees to a difficulty
//! registry and a per-bot RNG so difficulty randomness and blunders apply
//! uniformly across every decision surface.

use crate::planner::{
    BlockDecision, CombatPlan, IncomingAttack, MainPhaseDecision, PassDecision, PlannerConfig,
    ResourceDecision, ResponseDecision, combat, main_phase, stack,
};
use duel_core::difficulty::DifficultyRegistry;
use duel_core::model::player::PlayerId;
use duel_core::model::snapshot::GameSnapshot;
use duel_core::model::stack::StackContext;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::Arc;
use tracing::{Level, event};

/// One bot-controlled seat. Holds the session difficulty registry and its
/// own RNG; all decision entry points go through here so blunders and
/// randomness are applied consistently.
pub struct BotPlayer {
    player: PlayerId,
    registry: Arc<DifficultyRegistry>,
    config: PlannerConfig,
    rng: SmallRng,
}

impl BotPlayer {
    pub fn new(player: PlayerId, registry: Arc<DifficultyRegistry>) -> Self {
        Self::with_seed(player, registry, rand::random())
    }

    /// Deterministic construction for tests and replays.
    pub fn with_seed(player: PlayerId, registry: Arc<DifficultyRegistry>, seed: u64) -> Self {
        Self {
            player,
            registry,
            config: PlannerConfig::default(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    /// Main-phase action choice, with difficulty randomness applied to the
    /// ranked list and blunders degrading to a pass.
    pub fn choose_main_phase(&mut self, snapshot: &GameSnapshot) -> MainPhaseDecision {
        let weights = self.registry.weights_for(Some(&self.player));
        let mut decision =
            main_phase::plan_main_phase(snapshot, &self.player, &self.config, &weights);

        if decision.best_action.is_some() && self.registry.should_blunder(Some(&self.player), &mut self.rng)
        {
            event!(
                target: "duel_bot::policy",
                Level::DEBUG,
                player = %self.player,
                "blunder: passing over a playable action",
            );
            decision.best_action = None;
            decision.should_pass_priority = true;
            decision.confidence = 0.3;
            return decision;
        }

        decision.best_action = self
            .registry
            .apply_randomness(&decision.ranked_actions, Some(&self.player), &mut self.rng)
            .cloned();
        decision
    }

    pub fn plan_combat(&mut self, snapshot: &GameSnapshot) -> CombatPlan {
        let mut plan = combat::plan_combat(snapshot, &self.player, &self.config);
        if !plan.attacks.is_empty()
            && self.registry.should_blunder(Some(&self.player), &mut self.rng)
        {
            // A combat blunder drops the single best attack, not the whole turn.
            event!(
                target: "duel_bot::policy",
                Level::DEBUG,
                player = %self.player,
                dropped = %plan.attacks[0].attacker_name,
                "blunder: forgetting an attack",
            );
            plan.attacks.remove(0);
        }
        plan
    }

    pub fn plan_blocks(
        &mut self,
        snapshot: &GameSnapshot,
        incoming: &[IncomingAttack],
    ) -> Vec<BlockDecision> {
        let mut blocks = combat::plan_blocks(snapshot, &self.player, incoming, &self.config);
        if !blocks.is_empty() && self.registry.should_blunder(Some(&self.player), &mut self.rng) {
            blocks.pop();
        }
        blocks
    }

    /// Stack response: counter-magic gets the dedicated path when a counter
    /// is among the affordable responses.
    pub fn respond_to_stack(
        &mut self,
        ctx: &StackContext,
        snapshot: &GameSnapshot,
    ) -> ResponseDecision {
        if self.registry.should_blunder(Some(&self.player), &mut self.rng) {
            return ResponseDecision::pass("missed the response window", 0.3);
        }
        let has_counter = ctx.affordable_responses().any(|r| r.is_counter());
        if has_counter {
            stack::decide_counterspell(ctx, snapshot, &self.player)
        } else {
            let weights = self.registry.weights_for(Some(&self.player));
            stack::evaluate_response(ctx, snapshot, &self.player, &self.config, &weights)
        }
    }

    pub fn manage_resources(
        &mut self,
        ctx: &StackContext,
        snapshot: &GameSnapshot,
    ) -> ResourceDecision {
        stack::manage_resources(ctx, snapshot, &self.player)
    }

    pub fn decide_priority_pass(
        &mut self,
        ctx: &StackContext,
        snapshot: &GameSnapshot,
    ) -> PassDecision {
        stack::decide_priority_pass(ctx, snapshot, &self.player)
    }
}
