mod config;
mod decision;

pub mod combat;
pub mod main_phase;
pub mod stack;
pub mod tricks;

pub use config::PlannerConfig;
pub use decision::{
    ActionKind, ActionPriority, AttackDecision, BlockDecision, CombatPlan, CombatStrategy,
    IncomingAttack, MainPhaseDecision, ManaDirective, PassDecision, PossibleAction,
    ResponseAction, ResponseDecision, ResourceDecision, RiskLevel, TrickPlay, TrickTiming,
};
