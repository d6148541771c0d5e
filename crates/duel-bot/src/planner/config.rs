/// Tunable planner parameters.
///
/// These control candidate filtering and the pass/hold gates across the
/// three decision trees. Extracted from hardcoded magic numbers to enable
/// systematic tuning.
#[derive(Debug, Clone, Copy)]
pub struct PlannerConfig {
    /// Best action values below this trigger a priority pass (default: 0.2).
    pub min_action_value: f32,

    /// Best action risks above this trigger a priority pass (default: 0.7).
    pub max_action_risk: f32,

    /// Hold open mana during our own pre-combat main when instants are in
    /// hand (default: true).
    pub hold_mana_for_instants: bool,

    /// Life total at or below which combat turns defensive (default: 10).
    pub defensive_life_threshold: i32,

    /// Baseline appetite for attacking, 0.0..=1.0 (default: 0.5).
    pub aggression: f32,

    /// Weight of the magnitude-per-mana efficiency bonus when scoring stack
    /// responses (default: 0.3).
    pub response_efficiency_weight: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_action_value: 0.2,
            max_action_risk: 0.7,
            hold_mana_for_instants: true,
            defensive_life_threshold: 10,
            aggression: 0.5,
            response_efficiency_weight: 0.3,
        }
    }
}
