use serde::{Deserialize, Serialize};

/// One multiplier per scoring factor. A profile is always a complete set;
/// deriving a variant means building a new value, never mutating one in use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalWeights {
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

impl EvalWeights {
    /// Balanced profile used by the normal difficulty tier.
    pub const fn balanced() -> Self {
        Self {
            life: 1.5,
            poison: 1.2,
            card_advantage: 1.3,
            hand_quality: 0.8,
            library_depth: 0.4,
            creature_power: 1.0,
            creature_toughness: 0.7,
            creature_count: 0.9,
            permanent_advantage: 0.8,
            mana_available: 0.6,
            tempo: 0.7,
            commander_damage: 1.0,
            commander_presence: 0.5,
            card_selection: 0.5,
            graveyard_value: 0.3,
            synergy: 0.6,
            win_condition_progress: 1.8,
            inevitability: 0.8,
        }
    }

    /// Easy tier: mostly board- and life-driven, blind to subtler factors.
    pub const fn forgiving() -> Self {
        Self {
            life: 1.2,
            poison: 0.8,
            card_advantage: 0.6,
            hand_quality: 0.3,
            library_depth: 0.1,
            creature_power: 0.9,
            creature_toughness: 0.5,
            creature_count: 0.9,
            permanent_advantage: 0.5,
            mana_available: 0.3,
            tempo: 0.2,
            commander_damage: 0.6,
            commander_presence: 0.3,
            card_selection: 0.1,
            graveyard_value: 0.1,
            synergy: 0.2,
            win_condition_progress: 1.0,
            inevitability: 0.3,
        }
    }

    /// Hard tier: balanced plus sharper tempo and win-condition senses.
    pub fn focused() -> Self {
        Self {
            tempo: 0.9,
            card_advantage: 1.4,
            win_condition_progress: 2.0,
            inevitability: 1.0,
            ..Self::balanced()
        }
    }

    /// Expert tier: fully tuned toward closing games.
    pub fn ruthless() -> Self {
        Self {
            life: 1.4,
            card_advantage: 1.5,
            tempo: 1.0,
            card_selection: 0.7,
            synergy: 0.8,
            win_condition_progress: 2.2,
            inevitability: 1.2,
            ..Self::balanced()
        }
    }
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self::balanced()
    }
}
