//! Hand-curated player tier multipliers and positions.
//!
//! A small lookup keyed by normalized player name. Unlisted players get 1.0.
//! The multiplier scales award and record-chasing base rates, and also picks
//! the quarterback tier when there is no passing history to derive one from.

use crate::data::models::{normalize_player_name, PositionGroup};
use PositionGroup::*;

use super::rate_model::QbTier;

pub const DEFAULT_TIER_MULTIPLIER: f64 = 1.0;

const TIER_MULTIPLIERS: [(&str, f64, PositionGroup); 40] = [
    // Quarterbacks
    ("patrick mahomes", 2.6, Quarterback),
    ("josh allen", 2.0, Quarterback),
    ("lamar jackson", 2.0, Quarterback),
    ("joe burrow", 1.7, Quarterback),
    ("jalen hurts", 1.4, Quarterback),
    ("cj stroud", 1.4, Quarterback),
    ("justin herbert", 1.3, Quarterback),
    ("jayden daniels", 1.3, Quarterback),
    ("dak prescott", 1.2, Quarterback),
    ("jordan love", 1.2, Quarterback),
    ("brock purdy", 1.2, Quarterback),
    ("jared goff", 1.15, Quarterback),
    ("tua tagovailoa", 1.1, Quarterback),
    ("aaron rodgers", 1.1, Quarterback),
    ("kyler murray", 1.1, Quarterback),
    ("mac jones", 0.85, Quarterback),
    ("kenny pickett", 0.85, Quarterback),
    ("zach wilson", 0.8, Quarterback),
    // Running backs
    ("christian mccaffrey", 1.8, RunningBack),
    ("saquon barkley", 1.5, RunningBack),
    ("derrick henry", 1.4, RunningBack),
    ("bijan robinson", 1.3, RunningBack),
    ("jahmyr gibbs", 1.3, RunningBack),
    ("breece hall", 1.2, RunningBack),
    ("jonathan taylor", 1.2, RunningBack),
    // Receivers and tight ends
    ("justin jefferson", 1.8, WideReceiver),
    ("jamarr chase", 1.7, WideReceiver),
    ("tyreek hill", 1.5, WideReceiver),
    ("ceedee lamb", 1.5, WideReceiver),
    ("amon ra st brown", 1.4, WideReceiver),
    ("aj brown", 1.4, WideReceiver),
    ("puka nacua", 1.3, WideReceiver),
    ("davante adams", 1.3, WideReceiver),
    ("garrett wilson", 1.2, WideReceiver),
    ("cooper kupp", 1.2, WideReceiver),
    ("travis kelce", 1.5, TightEnd),
    ("george kittle", 1.3, TightEnd),
    ("sam laporta", 1.1, TightEnd),
    // Kickers
    ("justin tucker", 1.3, Kicker),
    ("brandon aubrey", 1.2, Kicker),
];

fn lookup(name: &str) -> Option<&'static (&'static str, f64, PositionGroup)> {
    let key = normalize_player_name(name);
    TIER_MULTIPLIERS.iter().find(|(n, _, _)| *n == key)
}

pub fn tier_multiplier(name: &str) -> f64 {
    lookup(name).map(|(_, m, _)| *m).unwrap_or(DEFAULT_TIER_MULTIPLIER)
}

pub fn is_listed(name: &str) -> bool {
    lookup(name).is_some()
}

/// Position of a listed player.
pub fn listed_position(name: &str) -> Option<PositionGroup> {
    lookup(name).map(|(_, _, pos)| *pos)
}

pub fn qb_tier_from_multiplier(multiplier: f64) -> QbTier {
    if multiplier >= 1.25 {
        QbTier::Elite
    } else if multiplier >= 1.1 {
        QbTier::Good
    } else if multiplier >= 0.95 {
        QbTier::Average
    } else {
        QbTier::Low
    }
}

pub fn qb_tier_for(name: &str) -> QbTier {
    qb_tier_from_multiplier(tier_multiplier(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_tolerates_case_and_punctuation() {
        assert_eq!(tier_multiplier("Patrick Mahomes II"), 2.6);
        assert_eq!(tier_multiplier("Ja'Marr Chase"), 1.7);
        assert_eq!(tier_multiplier("C.J. Stroud"), 1.4);
        assert_eq!(tier_multiplier("Amon-Ra St. Brown"), 1.4);
        assert_eq!(tier_multiplier("Some Backup"), DEFAULT_TIER_MULTIPLIER);
        assert!(is_listed("josh allen"));
        assert!(!is_listed("Some Backup"));
    }

    #[test]
    fn listed_players_carry_positions() {
        assert_eq!(listed_position("Christian McCaffrey"), Some(RunningBack));
        assert_eq!(listed_position("Josh Allen"), Some(Quarterback));
        assert_eq!(listed_position("Travis Kelce"), Some(TightEnd));
        assert_eq!(listed_position("Justin Tucker"), Some(Kicker));
        assert_eq!(listed_position("Some Backup"), None);
    }

    #[test]
    fn quarterback_tiers_follow_multiplier() {
        assert_eq!(qb_tier_for("Patrick Mahomes"), QbTier::Elite);
        assert_eq!(qb_tier_for("Jared Goff"), QbTier::Good);
        assert_eq!(qb_tier_for("Unknown Rookie"), QbTier::Average);
        assert_eq!(qb_tier_for("Zach Wilson"), QbTier::Low);
    }
}
