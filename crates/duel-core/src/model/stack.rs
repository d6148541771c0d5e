use crate::model::card::{CardId, Color};
use crate::model::permanent::PermanentId;
use crate::model::player::PlayerId;
use crate::model::snapshot::Phase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackObjectKind {
    Spell,
    Ability,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Player(PlayerId),
    Permanent(PermanentId),
}

/// A spell or ability waiting to resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackObject {
    pub id: u64,
    pub controller: PlayerId,
    pub kind: StackObjectKind,
    pub name: String,
    pub mana_value: u32,
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub instant_speed: bool,
    pub timestamp: u64,
}

impl StackObject {
    pub fn targets_player(&self, player: &PlayerId) -> bool {
        self.targets
            .iter()
            .any(|t| matches!(t, Target::Player(p) if p == player))
    }

    pub fn targeted_permanents(&self) -> impl Iterator<Item = PermanentId> + '_ {
        self.targets.iter().filter_map(|t| match t {
            Target::Permanent(id) => Some(*id),
            Target::Player(_) => None,
        })
    }

    pub fn has_color(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    pub fn name_lower(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

/// Typed effect of a legal response, as classified by the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseEffect {
    Counter,
    Destroy,
    Bounce,
    Exile,
    Damage,
    Draw,
    Other,
}

/// A response candidate the player could legally play right now. Legality
/// and targeting validity were already checked by the rules engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableResponse {
    pub card_id: CardId,
    pub name: String,
    pub mana_cost: u32,
    #[serde(default)]
    pub can_counter: bool,
    #[serde(default)]
    pub can_target: bool,
    pub effect: ResponseEffect,
    /// Effect strength on a 1-10 scale.
    pub magnitude: u8,
    #[serde(default)]
    pub instant_speed: bool,
    /// Whether the card can plausibly be rebought from the graveyard.
    #[serde(default)]
    pub recurrable: bool,
}

impl AvailableResponse {
    pub fn is_counter(&self) -> bool {
        self.can_counter || matches!(self.effect, ResponseEffect::Counter)
    }
}

/// Everything the stack engine needs to weigh a response, bundled by the
/// rules engine at priority time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackContext {
    pub pending: StackObject,
    pub stack_depth: usize,
    #[serde(default)]
    pub items_above: Vec<StackObject>,
    pub available_mana: u32,
    #[serde(default)]
    pub responses: Vec<AvailableResponse>,
    pub own_turn: bool,
    pub phase: Phase,
}

impl StackContext {
    pub fn affordable_responses(&self) -> impl Iterator<Item = &AvailableResponse> {
        self.responses
            .iter()
            .filter(|r| r.mana_cost <= self.available_mana)
    }
}
