//! Output-only decision records. Each carries a chosen or ranked action, a
//! numeric expected value, a risk or confidence scalar, and a justification
//! string; none of them reference live engine state after being returned.

use duel_core::eval::DetailedEvaluation;
use duel_core::model::card::CardId;
use duel_core::model::permanent::PermanentId;
use duel_core::model::player::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl ActionPriority {
    pub const fn rank(self) -> u8 {
        match self {
            ActionPriority::Critical => 0,
            ActionPriority::High => 1,
            ActionPriority::Medium => 2,
            ActionPriority::Low => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    PlayLand,
    CastSpell,
    ActivateAbility,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PossibleAction {
    pub kind: ActionKind,
    pub card: Option<CardId>,
    pub permanent: Option<PermanentId>,
    pub value: f32,
    pub risk: f32,
    pub priority: ActionPriority,
    pub reasoning: String,
}

impl PossibleAction {
    /// The ranking pass keys off the justification text, same as the
    /// recommendations it feeds.
    pub fn marks_removal(&self) -> bool {
        let reasoning = self.reasoning.to_ascii_lowercase();
        reasoning.contains("removal") || reasoning.contains("destroy")
    }

    pub fn marks_card_draw(&self) -> bool {
        self.reasoning.to_ascii_lowercase().contains("draw")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MainPhaseDecision {
    pub best_action: Option<PossibleAction>,
    pub ranked_actions: Vec<PossibleAction>,
    pub evaluation: DetailedEvaluation,
    pub should_pass_priority: bool,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatStrategy {
    Aggressive,
    Moderate,
    Defensive,
}

impl CombatStrategy {
    /// Minimum adjusted value an attack must clear.
    pub const fn attack_threshold(self) -> f32 {
        match self {
            CombatStrategy::Aggressive => 0.3,
            CombatStrategy::Moderate => 0.5,
            CombatStrategy::Defensive => 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttackDecision {
    pub attacker: PermanentId,
    pub attacker_name: String,
    pub target: PlayerId,
    pub expected_value: f32,
    pub risk: f32,
    pub reasoning: String,
}

/// An attack declared against us, as reported by the rules engine.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingAttack {
    pub attacker: PermanentId,
    pub target: PlayerId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockDecision {
    pub attacker: PermanentId,
    pub blockers: Vec<PermanentId>,
    /// Damage assignment order, cheapest blocker first.
    pub damage_order: Vec<PermanentId>,
    pub value: f32,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrickTiming {
    BeforeAttackers,
    BeforeBlockers,
    AfterBlockers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrickPlay {
    pub card: CardId,
    pub name: String,
    pub target: Option<PermanentId>,
    pub value: f32,
    pub timing: TrickTiming,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombatPlan {
    pub strategy: CombatStrategy,
    pub attacks: Vec<AttackDecision>,
    pub tricks: Vec<TrickPlay>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseAction {
    Pass,
    Respond,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDecision {
    pub should_respond: bool,
    pub action: ResponseAction,
    pub response_card: Option<CardId>,
    /// Stack object the response is aimed at.
    pub target: Option<u64>,
    pub expected_value: f32,
    pub confidence: f32,
    pub reasoning: String,
}

impl ResponseDecision {
    pub fn pass(reasoning: impl Into<String>, confidence: f32) -> Self {
        Self {
            should_respond: false,
            action: ResponseAction::Pass,
            response_card: None,
            target: None,
            expected_value: 0.0,
            confidence,
            reasoning: reasoning.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManaDirective {
    UseNow,
    HoldForEndStep,
    HoldForOpponentTurn,
    HoldForBetterThreat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDecision {
    pub directive: ManaDirective,
    /// Mana to keep open for the best instant-speed response when holding.
    pub reserved_mana: u32,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassDecision {
    pub should_pass: bool,
    pub risk: RiskLevel,
    pub reasoning: String,
}
