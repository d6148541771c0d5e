//! Combat-trick detection. Reads instant card text for pump, keyword
//! grants, and removal, and schedules when in combat to cast them.

use crate::planner::combat::can_block;
use crate::planner::decision::{AttackDecision, TrickPlay, TrickTiming};
use duel_core::model::card::CardSummary;
use duel_core::model::keyword::Keyword;
use duel_core::model::permanent::Permanent;
use duel_core::model::player::PlayerId;
use duel_core::model::snapshot::GameSnapshot;

/// What an instant does in combat, as far as the text heuristics can tell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrickEffect {
    /// Power/toughness change from a "+N/+M" (or "-N/-M") clause.
    pub pump: Option<(i32, i32)>,
    pub grants: Option<Keyword>,
    pub removal: bool,
    pub prevents_damage: bool,
}

impl TrickEffect {
    /// Parse an instant's rules text. `None` when nothing combat-relevant
    /// is recognized.
    pub fn parse(card: &CardSummary) -> Option<Self> {
        if !card.is_instant_speed() {
            return None;
        }
        let text = card.text_lower();
        let pump = parse_pump(&text);
        let grants = parse_grant(&text);
        let removal = text.contains("destroy target") || text.contains("exile target");
        let prevents_damage = text.contains("prevent all combat damage")
            || text.contains("prevent all damage");

        if pump.is_none() && grants.is_none() && !removal && !prevents_damage {
            return None;
        }
        Some(TrickEffect {
            pump,
            grants,
            removal,
            prevents_damage,
        })
    }
}

/// Scan for the first `+N/+M` or `-N/-M` stat clause.
fn parse_pump(text: &str) -> Option<(i32, i32)> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'+' || bytes[i] == b'-' {
            if let Some((power, rest)) = read_signed(bytes, i) {
                if rest < bytes.len() && bytes[rest] == b'/' {
                    if let Some((toughness, _)) = read_signed(bytes, rest + 1) {
                        return Some((power, toughness));
                    }
                }
            }
        }
        i += 1;
    }
    None
}

/// Read a `+N` or `-N` starting at `at`; returns the value and the index
/// one past the digits.
fn read_signed(bytes: &[u8], at: usize) -> Option<(i32, usize)> {
    let sign = match bytes.get(at)? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let mut i = at + 1;
    let mut value: i32 = 0;
    let start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        value = value * 10 + (bytes[i] - b'0') as i32;
        i += 1;
    }
    if i == start {
        return None;
    }
    Some((sign * value, i))
}

fn parse_grant(text: &str) -> Option<Keyword> {
    let at = text.find("gains ").map(|i| i + 6).or_else(|| {
        text.find("gain ").map(|i| i + 5)
    })?;
    let rest = &text[at..];
    let word = rest
        .split(|c: char| c == '.' || c == ',' || c == '\n')
        .next()?
        .trim();
    // "first strike" and "double strike" are two words; try the first two
    // words before falling back to one.
    let mut parts = word.split_whitespace();
    let first = parts.next()?;
    if let Some(second) = parts.next() {
        if let Some(kw) = Keyword::parse(&format!("{first} {second}")) {
            return Some(kw);
        }
    }
    Keyword::parse(first)
}

pub fn looks_like_trick(card: &CardSummary) -> bool {
    TrickEffect::parse(card).is_some()
}

/// Whether a +X/+Y on `creature` turns the best available block from a kill
/// into a survival.
fn pump_saves_from_a_block(
    snapshot: &GameSnapshot,
    player: &PlayerId,
    creature: &Permanent,
    toughness_pump: i32,
) -> bool {
    if toughness_pump <= 0 {
        return false;
    }
    let hardest_hit = snapshot
        .opponents(player)
        .flat_map(|(_, opp)| opp.untapped_creatures())
        .filter(|b| can_block(creature, b))
        .map(|b| b.power())
        .max();
    hardest_hit.is_some_and(|hit| {
        hit >= creature.toughness() && hit < creature.toughness() + toughness_pump
    })
}

/// Tricks worth holding mana for this combat, given the attacks we intend
/// to declare.
pub fn find_combat_tricks(
    snapshot: &GameSnapshot,
    player: &PlayerId,
    attacks: &[AttackDecision],
) -> Vec<TrickPlay> {
    let state = snapshot.player(player);
    let mana = state.potential_mana();
    let mut plays = Vec::new();

    // Prefer backing up a declared attacker; otherwise the biggest body.
    let target = state
        .untapped_creatures()
        .filter(|c| attacks.iter().any(|a| a.attacker == c.id))
        .max_by_key(|c| (c.power(), std::cmp::Reverse(c.id)))
        .or_else(|| {
            state
                .untapped_creatures()
                .max_by_key(|c| (c.power(), std::cmp::Reverse(c.id)))
        });
    // Removal goes after the biggest opposing threat on the board.
    let removal_target = snapshot
        .opponents(player)
        .flat_map(|(_, opp)| opp.battlefield.iter())
        .filter(|p| p.is_creature())
        .max_by_key(|c| (c.mana_value, c.power(), std::cmp::Reverse(c.id)))
        .map(|c| c.id);

    for card in state.hand.iter().filter(|c| c.mana_value <= mana) {
        let Some(effect) = TrickEffect::parse(card) else {
            continue;
        };

        let mut value: f32 = 0.0;
        let mut notes = Vec::new();
        if effect.removal {
            value += 0.6;
            notes.push("removes a blocker or attacker");
        }
        if let Some((power, toughness)) = effect.pump {
            if power > 0 || toughness > 0 {
                let saves = target
                    .is_some_and(|t| pump_saves_from_a_block(snapshot, player, t, toughness));
                if saves {
                    value += 0.5;
                    notes.push("pump flips a losing block");
                } else {
                    value += 0.3;
                    notes.push("pump as a rate boost");
                }
            } else {
                value += 0.4;
                notes.push("shrink effect doubles as removal");
            }
        }
        match effect.grants {
            Some(Keyword::Lifelink) => {
                value += 0.2;
                notes.push("lifelink swing");
            }
            Some(Keyword::Trample) => {
                value += 0.15;
                notes.push("trample pushes damage through");
            }
            Some(Keyword::Indestructible) => {
                value += 0.4;
                notes.push("blanks removal and blocks");
            }
            _ => {}
        }
        if effect.prevents_damage {
            value += 0.3;
            notes.push("fog effect");
        }
        // A thin hand makes spending the trick speculatively worse.
        if state.hand.len() <= 2 {
            value *= 0.5;
        }
        if value <= 0.0 {
            continue;
        }

        let timing = if effect.removal {
            TrickTiming::BeforeBlockers
        } else if effect.pump.is_some_and(|(p, _)| p >= 3) {
            TrickTiming::BeforeAttackers
        } else {
            TrickTiming::AfterBlockers
        };

        plays.push(TrickPlay {
            card: card.id.clone(),
            name: card.name.clone(),
            target: if effect.removal {
                removal_target
            } else {
                target.map(|t| t.id)
            },
            value,
            timing,
            reasoning: format!("{}: {}", card.name, notes.join(", ")),
        });
    }

    plays.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.card.cmp(&b.card))
    });
    plays
}
