//! Cross-prompt consistency repairs, applied once after odds are computed.

use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

use super::intent::{Horizon, Intent};
use super::odds::NO_CHANCE;
use super::{Confidence, Estimate, EstimateTrace, SourceType, Status};

/// Season-scoped counterpart of the estimate being repaired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompanionEstimate {
    pub season_probability_pct: f64,
}

static DECEASED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:deceased|died|passed\s+away|posthumous(?:ly)?|from\s+the\s+grave|beyond\s+the\s+grave|rest\s+in\s+peace)\b",
    )
    .expect("valid deceased regex")
});

/// "the late <word>": a deceased cue unless the word is about the schedule.
static THE_LATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bthe\s+late\s+([a-z']+)").expect("valid the-late regex"));

const LATE_SCHEDULE_WORDS: [&str; 14] = [
    "game", "games", "season", "window", "slate", "kickoff", "afternoon", "night", "stages", "innings",
    "rounds", "push", "surge", "start",
];

static RETURN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:comes?|coming)\s+(?:back\s+)?out\s+of\s+retirement\b|\bun-?retires?\b|\breturns?\s+(?:to|from)\b|\bcomeback\b|\bcomes?\s+back\b|\bplays?\s+(?:again|another|in|for)\b|\bsigns?\s+(?:with|a\s+contract)\b|\bsuits?\s+up\b|\bstarts?\s+(?:a\s+game|at|for)\b",
    )
    .expect("valid return regex")
});

/// Athletes whose death makes any return to play impossible.
const DECEASED_ATHLETES: [&str; 16] = [
    "walter payton",
    "reggie white",
    "junior seau",
    "johnny unitas",
    "sean taylor",
    "pat tillman",
    "dwayne haskins",
    "jim brown",
    "dick butkus",
    "kobe bryant",
    "wilt chamberlain",
    "bill russell",
    "roberto clemente",
    "lou gehrig",
    "babe ruth",
    "gordie howe",
];

/// A deceased cue (explicit wording or a known name) plus an active-return cue.
pub fn is_impossible(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    let the_late = THE_LATE_RE
        .captures_iter(&lower)
        .any(|c| !LATE_SCHEDULE_WORDS.contains(&&c[1]));
    let deceased = the_late || DECEASED_RE.is_match(&lower) || DECEASED_ATHLETES.iter().any(|n| lower.contains(n));
    deceased && RETURN_RE.is_match(&lower)
}

pub fn repair(
    prompt: &str,
    intent: &Intent,
    estimate: Estimate,
    companion: Option<&CompanionEstimate>,
) -> Estimate {
    if estimate.status != Status::Ok || estimate.odds == NO_CHANCE {
        return estimate;
    }

    // Impossibility wins outright; nothing after it may touch the result.
    if is_impossible(prompt) {
        info!("Impossibility override: {}", prompt);
        return force_impossible(estimate);
    }

    let mut estimate = estimate;
    if intent.horizon == Horizon::Ever {
        if let Some(c) = companion {
            if c.season_probability_pct > estimate.probability_pct {
                info!(
                    "Horizon repair: ever {:.3}% raised to season {:.3}%",
                    estimate.probability_pct, c.season_probability_pct
                );
                estimate.set_probability(c.season_probability_pct);
                estimate.assumptions.push(
                    "Raised to the single-season probability: an \"ever\" outcome cannot be rarer than the same outcome this season".to_string(),
                );
                estimate.trace.repairs.push("horizon_monotonicity".to_string());
            }
        }
    }
    estimate
}

/// The constraint answer for an impossible prompt, needing no estimator.
pub fn impossible_estimate(intent: &Intent) -> Estimate {
    let trace = EstimateTrace {
        horizon: Some(intent.horizon),
        ..Default::default()
    };
    force_impossible(Estimate::from_probability(
        0.0,
        Confidence::High,
        Vec::new(),
        SourceType::ConstraintModel,
        String::new(),
        trace,
    ))
}

fn force_impossible(mut estimate: Estimate) -> Estimate {
    estimate.set_probability(0.0);
    estimate.confidence = Confidence::High;
    estimate.source_type = SourceType::ConstraintModel;
    estimate.source_label = "Hard constraint: deceased athlete".to_string();
    estimate.assumptions = vec!["The athlete is deceased, so any return to play is impossible".to_string()];
    estimate.trace.repairs.push("impossibility".to_string());
    estimate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::intent::parse_intent;

    fn ok_estimate(pct: f64) -> Estimate {
        Estimate::from_probability(
            pct,
            Confidence::Medium,
            vec!["base".to_string()],
            SourceType::HistoricalModel,
            "test",
            EstimateTrace::default(),
        )
    }

    #[test]
    fn deceased_athlete_return_is_no_chance() {
        let prompt = "Walter Payton comes out of retirement";
        let intent = parse_intent(prompt);
        let out = repair(prompt, &intent, ok_estimate(2.0), None);
        assert_eq!(out.status, Status::Ok);
        assert_eq!(out.odds, NO_CHANCE);
        assert_eq!(out.implied_probability, "0.0%");
        assert_eq!(out.confidence, Confidence::High);
        assert_eq!(out.source_type, SourceType::ConstraintModel);
    }

    #[test]
    fn living_retiree_is_left_alone() {
        let prompt = "Tom Brady comes out of retirement";
        let out = repair(prompt, &parse_intent(prompt), ok_estimate(2.0), None);
        assert_eq!(out.odds, ok_estimate(2.0).odds);
    }

    #[test]
    fn impossibility_dominates_horizon_repair() {
        let prompt = "The late Sean Taylor ever plays again";
        let intent = parse_intent(prompt);
        assert_eq!(intent.horizon, Horizon::Ever);
        let companion = CompanionEstimate { season_probability_pct: 40.0 };
        let out = repair(prompt, &intent, ok_estimate(5.0), Some(&companion));
        assert_eq!(out.odds, NO_CHANCE);
        // Running it again changes nothing.
        let again = repair(prompt, &intent, out.clone(), Some(&companion));
        assert_eq!(again, out);
    }

    #[test]
    fn ever_is_raised_to_season_companion() {
        let prompt = "A team ever goes 17-0";
        let intent = parse_intent(prompt);
        let companion = CompanionEstimate { season_probability_pct: 3.0 };
        let out = repair(prompt, &intent, ok_estimate(1.0), Some(&companion));
        assert!((out.probability_pct - 3.0).abs() < 1e-12);
        assert_eq!(out.odds, ok_estimate(3.0).odds);
        assert!(out.trace.repairs.contains(&"horizon_monotonicity".to_string()));

        // Already above the companion: untouched.
        let out = repair(prompt, &intent, ok_estimate(10.0), Some(&companion));
        assert!(out.trace.repairs.is_empty());
    }

    #[test]
    fn non_ok_estimates_pass_through() {
        let prompt = "Walter Payton comes out of retirement";
        let refused = Estimate::refused("no");
        let out = repair(prompt, &parse_intent(prompt), refused.clone(), None);
        assert_eq!(out, refused);
    }

    #[test]
    fn schedule_sense_of_late_is_not_a_death() {
        assert!(!is_impossible("Josh Allen plays in the late game on Sunday"));
        assert!(!is_impossible("The Bills make a comeback in the late window"));
        assert!(is_impossible("The late Kobe Bryant suits up for the Lakers"));
    }

    #[test]
    fn impossible_estimate_stands_alone() {
        let prompt = "Sean Taylor signs with the Commanders";
        let intent = parse_intent(prompt);
        let out = impossible_estimate(&intent);
        assert_eq!(out.status, Status::Ok);
        assert_eq!(out.odds, NO_CHANCE);
        assert_eq!(out.trace.repairs, vec!["impossibility".to_string()]);
        // A later repair pass leaves it alone.
        assert_eq!(repair(prompt, &intent, out.clone(), None), out);
    }
}
