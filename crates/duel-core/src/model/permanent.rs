use crate::model::card::CardId;
use crate::model::keyword::Keyword;
use crate::model::player::PlayerId;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Battlefield instance identifier assigned by the rules engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PermanentId(pub u64);

impl fmt::Display for PermanentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-kind payload. Power/toughness exist only for creatures and loyalty
/// only for planeswalkers; the accessors on [`Permanent`] read 0 elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PermanentKind {
    Creature { power: i32, toughness: i32 },
    Land,
    Artifact,
    Enchantment,
    Planeswalker { loyalty: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permanent {
    pub id: PermanentId,
    pub card_id: CardId,
    pub name: String,
    #[serde(flatten)]
    pub kind: PermanentKind,
    pub controller: PlayerId,
    #[serde(default)]
    pub tapped: bool,
    #[serde(default)]
    pub counters: BTreeMap<String, i32>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    pub mana_value: u32,
    #[serde(default)]
    pub text: String,
}

impl Permanent {
    pub const fn is_creature(&self) -> bool {
        matches!(self.kind, PermanentKind::Creature { .. })
    }

    pub const fn is_land(&self) -> bool {
        matches!(self.kind, PermanentKind::Land)
    }

    pub const fn is_artifact(&self) -> bool {
        matches!(self.kind, PermanentKind::Artifact)
    }

    pub const fn is_enchantment(&self) -> bool {
        matches!(self.kind, PermanentKind::Enchantment)
    }

    pub const fn is_planeswalker(&self) -> bool {
        matches!(self.kind, PermanentKind::Planeswalker { .. })
    }

    pub const fn power(&self) -> i32 {
        match self.kind {
            PermanentKind::Creature { power, .. } => power,
            _ => 0,
        }
    }

    pub const fn toughness(&self) -> i32 {
        match self.kind {
            PermanentKind::Creature { toughness, .. } => toughness,
            _ => 0,
        }
    }

    pub const fn loyalty(&self) -> i32 {
        match self.kind {
            PermanentKind::Planeswalker { loyalty } => loyalty,
            _ => 0,
        }
    }

    pub const fn untapped(&self) -> bool {
        !self.tapped
    }

    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    pub fn has_evasion(&self) -> bool {
        self.keywords.iter().any(|kw| kw.is_evasive())
    }

    pub fn is_unblockable(&self) -> bool {
        self.keywords.iter().any(|kw| kw.makes_unblockable())
    }

    pub fn has_first_strike(&self) -> bool {
        self.has_keyword(Keyword::FirstStrike) || self.has_keyword(Keyword::DoubleStrike)
    }

    pub fn text_lower(&self) -> String {
        self.text.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creature(power: i32, toughness: i32) -> Permanent {
        Permanent {
            id: PermanentId(1),
            card_id: CardId::new("c1"),
            name: "Grizzly Bears".to_string(),
            kind: PermanentKind::Creature { power, toughness },
            controller: PlayerId::new("p1"),
            tapped: false,
            counters: BTreeMap::new(),
            keywords: Vec::new(),
            mana_value: 2,
            text: String::new(),
        }
    }

    #[test]
    fn creature_stats_through_accessors() {
        let bear = creature(2, 2);
        assert!(bear.is_creature());
        assert_eq!(bear.power(), 2);
        assert_eq!(bear.toughness(), 2);
        assert_eq!(bear.loyalty(), 0);
    }

    #[test]
    fn non_creature_stats_are_zero() {
        let mut land = creature(0, 0);
        land.kind = PermanentKind::Land;
        assert_eq!(land.power(), 0);
        assert_eq!(land.toughness(), 0);
        assert!(land.is_land());
    }

    #[test]
    fn planeswalker_loyalty() {
        let mut walker = creature(0, 0);
        walker.kind = PermanentKind::Planeswalker { loyalty: 4 };
        assert_eq!(walker.loyalty(), 4);
        assert_eq!(walker.power(), 0);
        assert!(walker.is_planeswalker());
    }

    #[test]
    fn double_strike_counts_as_first_strike() {
        let mut bear = creature(2, 2);
        bear.keywords.push(Keyword::DoubleStrike);
        assert!(bear.has_first_strike());
    }

    #[test]
    fn unblockable_modeling_from_keywords() {
        let mut sneak = creature(1, 1);
        sneak.keywords.push(Keyword::Fear);
        assert!(sneak.is_unblockable());
        assert!(sneak.has_evasion());
    }
}
