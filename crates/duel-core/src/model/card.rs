use crate::model::keyword::Keyword;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Stable card identifier assigned by the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub String);

impl CardId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Creature,
    Land,
    Artifact,
    Enchantment,
    Planeswalker,
    Instant,
    Sorcery,
}

impl CardKind {
    pub const fn is_permanent(self) -> bool {
        !matches!(self, CardKind::Instant | CardKind::Sorcery)
    }

    pub const fn is_instant_speed(self) -> bool {
        matches!(self, CardKind::Instant)
    }
}

/// A card as seen in a hand or command zone. Stats the rules engine has not
/// defined yet (face-down, morph, token-maker output) arrive as `None` and
/// read as 0 through the accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    pub id: CardId,
    pub name: String,
    pub kind: CardKind,
    pub mana_value: u32,
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    #[serde(default)]
    pub power: Option<i32>,
    #[serde(default)]
    pub toughness: Option<i32>,
    #[serde(default)]
    pub text: String,
}

impl CardSummary {
    pub fn power(&self) -> i32 {
        self.power.unwrap_or(0)
    }

    pub fn toughness(&self) -> i32 {
        self.toughness.unwrap_or(0)
    }

    pub fn is_land(&self) -> bool {
        matches!(self.kind, CardKind::Land)
    }

    pub fn is_creature(&self) -> bool {
        matches!(self.kind, CardKind::Creature)
    }

    pub fn is_instant_speed(&self) -> bool {
        self.kind.is_instant_speed()
    }

    pub fn has_color(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    pub fn text_lower(&self) -> String {
        self.text.to_ascii_lowercase()
    }

    pub fn name_lower(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}
