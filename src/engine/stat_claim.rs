//! Stat-claim parsing: "1500 receiving yards this season" → (metric, threshold, scope).

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    PassingTds,
    PassingInterceptions,
    PassingYards,
    RushingTds,
    RushingYards,
    ReceivingTds,
    ReceivingYards,
    Receptions,
    ScrimmageYards,
    TotalTds,
}

/// How a metric's tail is modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricFamily {
    /// Discrete, low-mean counts.
    Touchdowns,
    /// Interceptions behave like touchdowns but sit on the QB track.
    Turnovers,
    /// Continuous-like totals.
    Yardage,
    /// Catch counts: discrete but high-mean.
    Receptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Season,
    Game,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatClaim {
    pub metric: Metric,
    pub threshold: f64,
    pub scope: Scope,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Metric::PassingTds => "passing touchdowns",
            Metric::PassingInterceptions => "interceptions thrown",
            Metric::PassingYards => "passing yards",
            Metric::RushingTds => "rushing touchdowns",
            Metric::RushingYards => "rushing yards",
            Metric::ReceivingTds => "receiving touchdowns",
            Metric::ReceivingYards => "receiving yards",
            Metric::Receptions => "receptions",
            Metric::ScrimmageYards => "scrimmage yards",
            Metric::TotalTds => "total touchdowns",
        }
    }

    pub fn is_passing(self) -> bool {
        matches!(
            self,
            Metric::PassingTds | Metric::PassingInterceptions | Metric::PassingYards
        )
    }

    pub fn family(self) -> MetricFamily {
        match self {
            Metric::PassingTds | Metric::RushingTds | Metric::ReceivingTds | Metric::TotalTds => {
                MetricFamily::Touchdowns
            }
            Metric::PassingInterceptions => MetricFamily::Turnovers,
            Metric::Receptions => MetricFamily::Receptions,
            Metric::PassingYards
            | Metric::RushingYards
            | Metric::ReceivingYards
            | Metric::ScrimmageYards => MetricFamily::Yardage,
        }
    }

    /// Season-rate clamp applied to every lambda the rate model produces.
    pub fn sane_bounds(self) -> (f64, f64) {
        match self {
            Metric::PassingTds => (0.5, 55.0),
            Metric::PassingInterceptions => (0.5, 30.0),
            Metric::PassingYards => (300.0, 5600.0),
            Metric::RushingTds => (0.2, 25.0),
            Metric::RushingYards => (20.0, 2200.0),
            Metric::ReceivingTds => (0.2, 20.0),
            Metric::ReceivingYards => (20.0, 2000.0),
            Metric::Receptions => (2.0, 150.0),
            Metric::ScrimmageYards => (40.0, 2600.0),
            Metric::TotalTds => (0.3, 28.0),
        }
    }

    /// Top of the plausible range for one scope. Seasons use the lambda clamp;
    /// single games sit at or just above the NFL single-game records.
    pub fn plausible_max(self, scope: Scope) -> f64 {
        match scope {
            Scope::Season => self.sane_bounds().1,
            Scope::Game => match self {
                Metric::PassingTds => 7.0,
                Metric::PassingInterceptions => 8.0,
                Metric::PassingYards => 560.0,
                Metric::RushingTds => 6.0,
                Metric::RushingYards => 300.0,
                Metric::ReceivingTds => 5.0,
                Metric::ReceivingYards => 340.0,
                Metric::Receptions => 21.0,
                Metric::ScrimmageYards => 375.0,
                Metric::TotalTds => 6.0,
            },
        }
    }

    /// Smallest threshold that reads as a real claim for this scope.
    pub fn min_threshold(self, scope: Scope) -> f64 {
        match (self, scope) {
            (Metric::PassingYards, Scope::Game) => 200.0,
            (Metric::PassingYards, Scope::Season) => 500.0,
            (Metric::ReceivingYards | Metric::ScrimmageYards, Scope::Game) => 10.0,
            (Metric::ReceivingYards | Metric::ScrimmageYards, Scope::Season) => 100.0,
            (Metric::RushingYards, _) => 10.0,
            _ => 1.0,
        }
    }
}

struct ClaimRule {
    metric: Metric,
    patterns: &'static [&'static str],
}

// `{N}` is the threshold capture, `{GT}` the optional "at least / more than" prefix.
const NUM: &str = r"(?P<n>\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?k?)";
const GT: &str = r"(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?";

static CLAIM_RULES: &[ClaimRule] = &[
    ClaimRule {
        metric: Metric::PassingInterceptions,
        patterns: &[
            r"throws?\s+{GT}{N}\+?\s+(?:interceptions|ints|picks)\b",
            r"{N}\+?\s+(?:interceptions|ints|picks)\b",
        ],
    },
    ClaimRule {
        metric: Metric::PassingYards,
        patterns: &[
            r"(?:throws?|pass(?:es)?)\s+for\s+{GT}{N}\+?\s+(?:passing\s+)?(?:yards|yds)\b",
            r"{N}\+?\s+passing\s+(?:yards|yds)\b",
        ],
    },
    ClaimRule {
        metric: Metric::PassingTds,
        patterns: &[
            r"throws?\s+(?:for\s+)?{GT}{N}\+?\s+(?:passing\s+)?(?:touchdowns?|tds?|td\s+passes|touchdown\s+passes)\b",
            r"{N}\+?\s+(?:passing\s+(?:touchdowns?|tds?)|touchdown\s+passes|td\s+passes)\b",
        ],
    },
    ClaimRule {
        metric: Metric::ReceivingYards,
        patterns: &[
            r"{N}\+?\s+receiving\s+(?:yards|yds)\b",
            r"(?:catch(?:es)?|receiv\w*)\s+for\s+{GT}{N}\+?\s+(?:yards|yds)\b",
        ],
    },
    ClaimRule {
        metric: Metric::ReceivingTds,
        patterns: &[
            r"{N}\+?\s+(?:receiving\s+(?:touchdowns?|tds?)|touchdown\s+(?:catches|receptions))\b",
            r"catch(?:es)?\s+{GT}{N}\+?\s+(?:touchdowns?|tds?)\b",
        ],
    },
    ClaimRule {
        metric: Metric::Receptions,
        patterns: &[
            r"{GT}{N}\+?\s+(?:receptions|catches)\b",
            r"catch(?:es)?\s+{GT}{N}\+?\s+(?:passes|balls)\b",
        ],
    },
    ClaimRule {
        metric: Metric::RushingYards,
        patterns: &[
            r"(?:rush(?:es)?|runs?)\s+for\s+{GT}{N}\+?\s+(?:rushing\s+)?(?:yards|yds)\b",
            r"{N}\+?\s+rushing\s+(?:yards|yds)\b",
        ],
    },
    ClaimRule {
        metric: Metric::RushingTds,
        patterns: &[
            r"{N}\+?\s+rushing\s+(?:touchdowns?|tds?)\b",
            r"(?:rush(?:es)?|runs?)\s+for\s+{GT}{N}\+?\s+(?:touchdowns?|tds?)\b",
        ],
    },
    ClaimRule {
        metric: Metric::ScrimmageYards,
        patterns: &[
            r"{N}\+?\s+(?:scrimmage|all[- ]purpose|total)\s+(?:yards|yds)\b",
            r"{N}\+?\s+(?:yards|yds)\s+from\s+scrimmage\b",
        ],
    },
    ClaimRule {
        metric: Metric::TotalTds,
        patterns: &[
            r"scores?\s+{GT}{N}\+?\s+(?:total\s+)?(?:touchdowns?|tds?)\b",
            r"{GT}{N}\+?\s+(?:total\s+)?(?:touchdowns?|tds?)\b",
        ],
    },
];

static COMPILED_RULES: LazyLock<Vec<Vec<Regex>>> = LazyLock::new(|| {
    CLAIM_RULES
        .iter()
        .map(|rule| {
            rule.patterns
                .iter()
                .map(|p| {
                    let expanded = p.replace("{N}", NUM).replace("{GT}", GT);
                    Regex::new(&format!("(?i){}", expanded)).expect("valid stat-claim pattern")
                })
                .collect()
        })
        .collect()
});

static GAME_CUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bin\s+(?:a|one|an|any|the\s+same)\s+(?:single\s+)?(?:nfl\s+|playoff\s+)?game\b|\bsingle[- ]game\b|\bone[- ]game\b|\bin\s+week\s+\d{1,2}\b|\b(?:tonight|this\s+week|on\s+sunday|on\s+(?:monday|thursday)\s+night)\b",
    )
    .expect("valid game cue regex")
});

static SEASON_CUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:this|next|upcoming|coming|a|one|single|the)\s+(?:regular\s+)?(?:season|year)\b|\bin\s+20\d\d\b|\b20\d\d\s+season\b|\bseason\b",
    )
    .expect("valid season cue regex")
});

/// Extract a (metric, threshold, scope) claim. Needs a season or single-game
/// cue, so purely career-framed claims are rejected.
pub fn parse_season_stat_intent(prompt: &str) -> Option<StatClaim> {
    let scope = if GAME_CUE_RE.is_match(prompt) {
        Scope::Game
    } else if SEASON_CUE_RE.is_match(prompt) {
        Scope::Season
    } else {
        return None;
    };

    for (rule, patterns) in CLAIM_RULES.iter().zip(COMPILED_RULES.iter()) {
        for re in patterns {
            let Some(caps) = re.captures(prompt) else {
                continue;
            };
            let Some(threshold) = claim_threshold(&caps) else {
                continue;
            };
            if threshold < rule.metric.min_threshold(scope) {
                continue;
            }
            debug!(
                "Stat claim: {} >= {} ({:?})",
                rule.metric.label(),
                threshold,
                scope
            );
            return Some(StatClaim {
                metric: rule.metric,
                threshold,
                scope,
            });
        }
    }
    None
}

fn claim_threshold(caps: &Captures<'_>) -> Option<f64> {
    let raw = caps.name("n")?.as_str().to_ascii_lowercase().replace(',', "");
    let (digits, scale) = match raw.strip_suffix('k') {
        Some(d) => (d, 1000.0),
        None => (raw.as_str(), 1.0),
    };
    let value = digits.parse::<f64>().ok()? * scale;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    let strict = caps.name("gt").is_some();
    Some(if strict { value.floor() + 1.0 } else { value.ceil() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(prompt: &str) -> Option<StatClaim> {
        parse_season_stat_intent(prompt)
    }

    #[test]
    fn parses_season_passing_touchdowns() {
        let c = claim("Josh Allen throws 30 touchdowns this season").unwrap();
        assert_eq!(c.metric, Metric::PassingTds);
        assert_eq!(c.threshold, 30.0);
        assert_eq!(c.scope, Scope::Season);
    }

    #[test]
    fn parses_single_game_scope() {
        let c = claim("Ja'Marr Chase has 200 receiving yards in a single game").unwrap();
        assert_eq!(c.metric, Metric::ReceivingYards);
        assert_eq!(c.scope, Scope::Game);
        assert_eq!(c.threshold, 200.0);
    }

    #[test]
    fn handles_commas_k_suffix_and_strict_phrasing() {
        assert_eq!(claim("Derrick Henry rushes for 2,000 yards this season").unwrap().threshold, 2000.0);
        assert_eq!(claim("Lamb gets 1.5k receiving yards this season").unwrap().threshold, 1500.0);
        assert_eq!(
            claim("Burrow throws more than 40 touchdowns next season").unwrap().threshold,
            41.0
        );
    }

    #[test]
    fn metric_order_prefers_specific_rules() {
        assert_eq!(
            claim("Kelce catches 10 touchdowns this season").unwrap().metric,
            Metric::ReceivingTds
        );
        assert_eq!(
            claim("McCaffrey scores 20 touchdowns this season").unwrap().metric,
            Metric::TotalTds
        );
        assert_eq!(
            claim("Bijan Robinson has 2,000 scrimmage yards this season").unwrap().metric,
            Metric::ScrimmageYards
        );
        assert_eq!(
            claim("Stroud throws 15 interceptions this season").unwrap().metric,
            Metric::PassingInterceptions
        );
        assert_eq!(claim("Nacua has 120 catches this season").unwrap().metric, Metric::Receptions);
    }

    #[test]
    fn rejects_nonsense_magnitudes() {
        // Under the passing-yard floor for a season claim.
        assert_eq!(claim("Purdy throws for 300 yards this season"), None);
        // But fine for one game.
        assert_eq!(
            claim("Purdy throws for 300 yards in a game").unwrap().metric,
            Metric::PassingYards
        );
        assert_eq!(claim("Henry rushes for 5 yards this season"), None);
    }

    #[test]
    fn requires_temporal_cue() {
        assert_eq!(claim("Josh Allen throws 30 touchdowns"), None);
        assert_eq!(claim("Bijan Robinson reaches 10,000 career rushing yards"), None);
    }

    #[test]
    fn sane_bounds_are_ordered() {
        for metric in [
            Metric::PassingTds,
            Metric::PassingInterceptions,
            Metric::PassingYards,
            Metric::RushingTds,
            Metric::RushingYards,
            Metric::ReceivingTds,
            Metric::ReceivingYards,
            Metric::Receptions,
            Metric::ScrimmageYards,
            Metric::TotalTds,
        ] {
            let (lo, hi) = metric.sane_bounds();
            assert!(lo > 0.0 && lo < hi, "{:?}", metric);
        }
    }
}
