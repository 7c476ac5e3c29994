//! American odds conversion.
//!
//! Favourites (p ≥ 0.5) quote negative: -(p/(1-p))·100, the stake needed to
//! win 100. Underdogs quote positive: ((1-p)/p)·100, the win on a 100 stake.
//! Probability exactly zero is the impossibility sentinel.

/// Odds literal for a probability of exactly zero.
pub const NO_CHANCE: &str = "NO CHANCE";

/// Probabilities are pinned inside this band (as fractions) before quoting
/// so 0% and 100% never divide by zero.
const MIN_FRACTION: f64 = 0.0001;
const MAX_FRACTION: f64 = 0.9999;

/// Convert a probability percentage to an American odds string.
pub fn to_american_odds(pct: f64) -> String {
    if pct.is_nan() || pct <= 0.0 {
        return NO_CHANCE.to_string();
    }
    let p = (pct / 100.0).clamp(MIN_FRACTION, MAX_FRACTION);
    if p >= 0.5 {
        format!("-{}", (p / (1.0 - p) * 100.0).round() as i64)
    } else {
        format!("+{}", ((1.0 - p) / p * 100.0).round() as i64)
    }
}

/// Parse an American odds string back into a probability percentage.
///
/// Accepts "+250", "250", "-150", "EVEN"/"EV" and the impossibility
/// sentinel. Anything else, including |odds| < 100, is rejected.
pub fn from_american_odds(text: &str) -> Option<f64> {
    let t = text.trim();
    if t.eq_ignore_ascii_case(NO_CHANCE) {
        return Some(0.0);
    }
    if t.eq_ignore_ascii_case("even") || t.eq_ignore_ascii_case("ev") {
        return Some(50.0);
    }
    let (negative, digits) = match t.as_bytes().first()? {
        b'-' => (true, &t[1..]),
        b'+' => (false, &t[1..]),
        _ => (false, t),
    };
    let value: f64 = digits.replace(',', "").parse().ok()?;
    if !value.is_finite() || value < 100.0 {
        return None;
    }
    let p = if negative {
        value / (value + 100.0)
    } else {
        100.0 / (value + 100.0)
    };
    Some(p * 100.0)
}

/// Fixed one-decimal percentage string, e.g. "37.5%".
pub fn format_implied_probability(pct: f64) -> String {
    format!("{:.1}%", pct.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn favourite_and_underdog_signs() {
        assert_eq!(to_american_odds(75.0), "-300");
        assert_eq!(to_american_odds(25.0), "+300");
        assert_eq!(to_american_odds(50.0), "-100");
        assert_eq!(to_american_odds(99.9), "-99900");
        assert_eq!(to_american_odds(0.1), "+99900");
    }

    #[test]
    fn zero_probability_is_the_sentinel() {
        assert_eq!(to_american_odds(0.0), NO_CHANCE);
        assert_eq!(from_american_odds(NO_CHANCE), Some(0.0));
    }

    #[test]
    fn parses_common_formats() {
        assert_relative_eq!(from_american_odds("+300").unwrap(), 25.0, epsilon = 1e-9);
        assert_relative_eq!(from_american_odds("-300").unwrap(), 75.0, epsilon = 1e-9);
        assert_relative_eq!(from_american_odds("300").unwrap(), 25.0, epsilon = 1e-9);
        assert_relative_eq!(from_american_odds("EVEN").unwrap(), 50.0, epsilon = 1e-9);
        assert_relative_eq!(from_american_odds("+1,000").unwrap(), 100.0 / 11.0, epsilon = 1e-9);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(from_american_odds(""), None);
        assert_eq!(from_american_odds("+50"), None);
        assert_eq!(from_american_odds("lock"), None);
        assert_eq!(from_american_odds("-"), None);
    }

    #[test]
    fn round_trip_recovers_probability_within_rounding() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..5_000 {
            let pct: f64 = rng.gen_range(0.1..=99.9);
            let back = from_american_odds(&to_american_odds(pct)).expect("parsable odds");
            // Half a unit of integer odds is worth at most 0.125 points,
            // reached next to even money.
            assert!((back - pct).abs() < 0.13, "pct={pct} back={back}");
        }
    }

    #[test]
    fn implied_probability_format() {
        assert_eq!(format_implied_probability(37.456), "37.5%");
        assert_eq!(format_implied_probability(0.0), "0.0%");
    }
}
