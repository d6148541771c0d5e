use serde::{Deserialize, Serialize};

/// Combat-relevant keyword abilities. Anything outside this set is ignored
/// by the heuristics rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    Flying,
    Reach,
    Menace,
    Intimidate,
    Fear,
    Unblockable,
    Shadow,
    Skulk,
    Prowl,
    Wither,
    Trample,
    FirstStrike,
    DoubleStrike,
    Deathtouch,
    Lifelink,
    Indestructible,
    Hexproof,
    Haste,
    Vigilance,
}

impl Keyword {
    /// Best-effort parse from free text. Unrecognized words yield `None`
    /// and the candidate keyword is simply skipped.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "flying" => Some(Keyword::Flying),
            "reach" => Some(Keyword::Reach),
            "menace" => Some(Keyword::Menace),
            "intimidate" => Some(Keyword::Intimidate),
            "fear" => Some(Keyword::Fear),
            "unblockable" | "can't be blocked" => Some(Keyword::Unblockable),
            "shadow" => Some(Keyword::Shadow),
            "skulk" => Some(Keyword::Skulk),
            "prowl" => Some(Keyword::Prowl),
            "wither" => Some(Keyword::Wither),
            "trample" => Some(Keyword::Trample),
            "first strike" => Some(Keyword::FirstStrike),
            "double strike" => Some(Keyword::DoubleStrike),
            "deathtouch" => Some(Keyword::Deathtouch),
            "lifelink" => Some(Keyword::Lifelink),
            "indestructible" => Some(Keyword::Indestructible),
            "hexproof" => Some(Keyword::Hexproof),
            "haste" => Some(Keyword::Haste),
            "vigilance" => Some(Keyword::Vigilance),
            _ => None,
        }
    }

    /// Keywords that earn the attacker-evaluation evasion bonus.
    pub const fn is_evasive(self) -> bool {
        matches!(
            self,
            Keyword::Flying
                | Keyword::Menace
                | Keyword::Intimidate
                | Keyword::Fear
                | Keyword::Unblockable
                | Keyword::Shadow
                | Keyword::Skulk
                | Keyword::Prowl
                | Keyword::Wither
                | Keyword::Trample
        )
    }

    /// Keywords that model the bearer as outright unblockable. A documented
    /// simplification, not full rules fidelity.
    pub const fn makes_unblockable(self) -> bool {
        matches!(
            self,
            Keyword::Intimidate | Keyword::Fear | Keyword::Unblockable | Keyword::Shadow
        )
    }
}
