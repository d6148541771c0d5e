//! Difficulty presets and the per-session profile registry.
//!
//! The registry is the only mutable state in the engine. It is meant to be
//! constructed once per game session and passed explicitly; running several
//! games through one registry would leak difficulty changes between them.

use crate::eval::EvalWeights;
use crate::model::player::PlayerId;
use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    Normal,
    Hard,
    Expert,
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        Self::Normal
    }
}

impl DifficultyLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "normal" | "default" => Some(Self::Normal),
            "hard" => Some(Self::Hard),
            "expert" | "max" => Some(Self::Expert),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
            Self::Expert => "expert",
        }
    }
}

/// Immutable bundle of tuning knobs for one difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub level: DifficultyLevel,
    pub weights: EvalWeights,
    /// Probability that a ranked choice is replaced by a uniformly random one.
    pub randomness: f32,
    /// Declared lookahead depth. Mostly unused by the current trees.
    pub lookahead_depth: u8,
    /// Probability of a deliberate blunder per decision.
    pub blunder_chance: f32,
    pub tempo_priority: f32,
    pub risk_tolerance: f32,
}

impl DifficultyProfile {
    pub fn preset(level: DifficultyLevel) -> Self {
        match level {
            DifficultyLevel::Easy => Self {
                level,
                weights: EvalWeights::forgiving(),
                randomness: 0.35,
                lookahead_depth: 1,
                blunder_chance: 0.25,
                tempo_priority: 0.3,
                risk_tolerance: 0.7,
            },
            DifficultyLevel::Normal => Self {
                level,
                weights: EvalWeights::balanced(),
                randomness: 0.15,
                lookahead_depth: 1,
                blunder_chance: 0.10,
                tempo_priority: 0.5,
                risk_tolerance: 0.5,
            },
            DifficultyLevel::Hard => Self {
                level,
                weights: EvalWeights::focused(),
                randomness: 0.05,
                lookahead_depth: 2,
                blunder_chance: 0.02,
                tempo_priority: 0.7,
                risk_tolerance: 0.35,
            },
            DifficultyLevel::Expert => Self {
                level,
                weights: EvalWeights::ruthless(),
                randomness: 0.0,
                lookahead_depth: 3,
                blunder_chance: 0.0,
                tempo_priority: 0.85,
                risk_tolerance: 0.25,
            },
        }
    }
}

/// Session-scoped difficulty state: a global default plus per-player
/// overrides. Guarded so one registry can be shared by reference across the
/// decision trees of a single game.
#[derive(Debug, Default)]
pub struct DifficultyRegistry {
    current: RwLock<DifficultyLevel>,
    overrides: RwLock<HashMap<PlayerId, DifficultyLevel>>,
}

impl DifficultyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(level: DifficultyLevel) -> Self {
        Self {
            current: RwLock::new(level),
            overrides: RwLock::new(HashMap::new()),
        }
    }

    pub fn set_level(&self, level: DifficultyLevel) {
        *self.current.write() = level;
    }

    pub fn set_level_for(&self, player: PlayerId, level: DifficultyLevel) {
        self.overrides.write().insert(player, level);
    }

    pub fn clear_override(&self, player: &PlayerId) {
        self.overrides.write().remove(player);
    }

    /// Player override wins over the global default.
    pub fn level_for(&self, player: Option<&PlayerId>) -> DifficultyLevel {
        if let Some(player) = player {
            if let Some(level) = self.overrides.read().get(player) {
                return *level;
            }
        }
        *self.current.read()
    }

    pub fn profile_for(&self, player: Option<&PlayerId>) -> DifficultyProfile {
        DifficultyProfile::preset(self.level_for(player))
    }

    /// Full copy of the active weight profile.
    pub fn weights_for(&self, player: Option<&PlayerId>) -> EvalWeights {
        self.profile_for(player).weights
    }

    pub fn lookahead_depth_for(&self, player: Option<&PlayerId>) -> u8 {
        self.profile_for(player).lookahead_depth
    }

    pub fn tempo_priority_for(&self, player: Option<&PlayerId>) -> f32 {
        self.profile_for(player).tempo_priority
    }

    pub fn risk_tolerance_for(&self, player: Option<&PlayerId>) -> f32 {
        self.profile_for(player).risk_tolerance
    }

    /// With probability `randomness`, pick a uniformly random element;
    /// otherwise keep the first (pre-ranked) one.
    pub fn apply_randomness<'a, T, R: Rng>(
        &self,
        options: &'a [T],
        player: Option<&PlayerId>,
        rng: &mut R,
    ) -> Option<&'a T> {
        if options.is_empty() {
            return None;
        }
        let randomness = self.profile_for(player).randomness;
        if randomness > 0.0 && rng.gen_range(0.0..1.0f32) < randomness {
            let idx = rng.gen_range(0..options.len());
            return options.get(idx);
        }
        options.first()
    }

    /// Bernoulli draw at the tier's blunder chance.
    pub fn should_blunder<R: Rng>(&self, player: Option<&PlayerId>, rng: &mut R) -> bool {
        let chance = self.profile_for(player).blunder_chance;
        chance > 0.0 && rng.gen_range(0.0..1.0f32) < chance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn parse_levels() {
        assert_eq!(DifficultyLevel::parse("Easy"), Some(DifficultyLevel::Easy));
        assert_eq!(DifficultyLevel::parse(" expert "), Some(DifficultyLevel::Expert));
        assert_eq!(DifficultyLevel::parse("brutal"), None);
    }

    #[test]
    fn override_wins_over_global() {
        let registry = DifficultyRegistry::new();
        registry.set_level(DifficultyLevel::Hard);
        let p1 = PlayerId::new("p1");
        registry.set_level_for(p1.clone(), DifficultyLevel::Easy);
        assert_eq!(registry.level_for(Some(&p1)), DifficultyLevel::Easy);
        assert_eq!(registry.level_for(None), DifficultyLevel::Hard);
        registry.clear_override(&p1);
        assert_eq!(registry.level_for(Some(&p1)), DifficultyLevel::Hard);
    }

    #[test]
    fn expert_never_blunders_or_randomizes() {
        let registry = DifficultyRegistry::with_level(DifficultyLevel::Expert);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(!registry.should_blunder(None, &mut rng));
        }
        let options = [1, 2, 3];
        for _ in 0..100 {
            assert_eq!(registry.apply_randomness(&options, None, &mut rng), Some(&1));
        }
    }

    #[test]
    fn easy_randomness_eventually_deviates() {
        let registry = DifficultyRegistry::with_level(DifficultyLevel::Easy);
        let mut rng = SmallRng::seed_from_u64(42);
        let options = [1, 2, 3, 4];
        let deviated = (0..200).any(|_| {
            registry.apply_randomness(&options, None, &mut rng) != Some(&1)
        });
        assert!(deviated);
    }

    #[test]
    fn empty_options_yield_none() {
        let registry = DifficultyRegistry::new();
        let mut rng = SmallRng::seed_from_u64(1);
        let options: [u8; 0] = [];
        assert_eq!(registry.apply_randomness(&options, None, &mut rng), None);
    }

    #[test]
    fn presets_scale_with_tier() {
        let easy = DifficultyProfile::preset(DifficultyLevel::Easy);
        let hard = DifficultyProfile::preset(DifficultyLevel::Hard);
        assert!(easy.blunder_chance > hard.blunder_chance);
        assert!(easy.randomness > hard.randomness);
        assert!(easy.risk_tolerance > hard.risk_tolerance);
        assert!(hard.lookahead_depth > easy.lookahead_depth);
    }
}
