//! Baseline event library.
//!
//! An ordered catalogue of structural and rare league events, each a set of
//! patterns plus a closed-form or table-driven season probability. Rules are
//! tried top to bottom and the first one that both matches and prices the
//! prompt wins, so specific events (Super Bowl overtime, single-game records)
//! sit above the generic thresholds that would otherwise swallow them.
//!
//! Probabilities are season-level. Career/ever framings are compounded
//! afterwards by [`horizon_adjusted_probability`].

use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

use super::calibration::HorizonCalibration;
use super::intent::{extract_player_name, Horizon};
use super::stats::{
    beta_binomial_pmf, beta_binomial_tail, clamp_pct, interp_table_log, normal_tail_cc,
    union_probability,
};

/// Games in an NFL regular season.
pub const NFL_GAMES: u32 = 17;
/// NFL franchises; the "any team" union size.
pub const NFL_TEAMS: u32 = 32;
/// Quarterback starts (or team-games) league-wide in one NFL season.
const NFL_TEAM_GAMES: u32 = NFL_TEAMS * NFL_GAMES;
/// Beta-binomial team-strength prior, symmetric around 8.5 wins.
pub const TEAM_RECORD_ALPHA: f64 = 30.0;
pub const TEAM_RECORD_BETA: f64 = 30.0;
/// Multi-year windows with no explicit length.
const DEFAULT_MULTI_YEAR_WINDOW: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineEvent {
    pub key: String,
    pub season_probability_pct: f64,
    pub assumptions: Vec<String>,
}

/// Who the event is about, which decides how a rule's number is scaled.
#[derive(Debug, Clone, Copy)]
enum Subject {
    /// League-level event; the rule's number is used as is.
    Event,
    /// Only fires on "a/any quarterback"-style phrasing; the rule prices the
    /// any-entity probability itself.
    AnyEntity,
    /// Team record events. The rule prices one team; "any team" phrasing (or
    /// no team named) is unioned across the league.
    Team,
    /// The rule prices "anyone in the league". A named subject is treated as
    /// one of `n` realistic contenders and the union is inverted.
    Field(u32),
}

/// One matched prompt handed to a rule's pricing function.
struct RuleMatch<'a> {
    text: &'a str,
    caps: Captures<'a>,
}

impl RuleMatch<'_> {
    fn number(&self, name: &str) -> Option<f64> {
        let raw = self.caps.name(name)?.as_str().replace(',', "");
        raw.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    fn has(&self, name: &str) -> bool {
        self.caps.name(name).is_some()
    }

    /// Threshold with strict phrasing ("more than 40") bumped by one.
    fn threshold(&self) -> Option<f64> {
        let n = self.number("n")?;
        Some(if self.has("gt") { n + 1.0 } else { n })
    }
}

struct Priced {
    pct: f64,
    assumptions: Vec<String>,
}

impl Priced {
    fn new(pct: f64, assumptions: &[&str]) -> Self {
        Priced {
            pct,
            assumptions: assumptions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

struct BaselineRule {
    key: &'static str,
    subject: Subject,
    patterns: &'static [&'static str],
    price: fn(&RuleMatch<'_>) -> Option<Priced>,
}

static ANY_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:a|an|any|some|one|every)\s+(?:single\s+)?(?:nfl\s+|nba\s+|mlb\s+|nhl\s+)?(?:team|teams|quarterback|qb|passer|player|running\s+back|rb|rusher|receiver|wide\s+receiver|wr|tight\s+end|kicker|hitter|batter|slugger|skater)\b|\b(?:someone|anyone|somebody|anybody)\b",
    )
    .expect("valid any-entity regex")
});

/// "Nobody", "no one", "no team": the prompt asks for the complement.
static NEGATED_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:nobody|no\s+one|no\s+(?:single\s+)?(?:nfl\s+|nba\s+|mlb\s+|nhl\s+)?(?:team|quarterback|qb|passer|player|running\s+back|rb|rusher|receiver|wide\s+receiver|wr|tight\s+end|kicker|hitter|batter|slugger|skater)s?)\b",
    )
    .expect("valid negated-entity regex")
});

static NFL_TEAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:cardinals|falcons|ravens|bills|panthers|bears|bengals|browns|cowboys|broncos|lions|packers|texans|colts|jaguars|jags|chiefs|raiders|chargers|rams|dolphins|vikings|patriots|pats|saints|giants|jets|eagles|steelers|49ers|niners|seahawks|buccaneers|bucs|titans|commanders)\b",
    )
    .expect("valid team regex")
});

static NBA_TEAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:celtics|nets|knicks|76ers|sixers|raptors|bulls|cavaliers|cavs|pistons|pacers|bucks|hawks|hornets|heat|magic|wizards|nuggets|timberwolves|wolves|thunder|blazers|jazz|warriors|clippers|lakers|suns|kings|mavericks|mavs|rockets|grizzlies|pelicans|spurs)\b",
    )
    .expect("valid nba team regex")
});

// ── Tail tables ──────────────────────────────────────────────────────────────
//
// Season tables give P(at least one player in the league reaches x), in
// percent. Per-game tables give P(one quarterback start / team-game reaches x)
// as a fraction and are unioned over every team-game of the season.

const LEAGUE_MAX_PASSING_TDS: [(f64, f64); 12] = [
    (20.0, 99.9), (25.0, 99.8), (30.0, 98.0), (35.0, 82.0), (40.0, 42.0), (45.0, 16.0),
    (48.0, 8.0), (50.0, 5.0), (55.0, 1.3), (56.0, 0.8), (60.0, 0.2), (70.0, 0.02),
];
const LEAGUE_MAX_PASSING_YARDS: [(f64, f64); 10] = [
    (3000.0, 99.9), (4000.0, 99.5), (4500.0, 90.0), (4800.0, 62.0), (5000.0, 38.0),
    (5200.0, 15.0), (5300.0, 9.0), (5477.0, 3.5), (5600.0, 1.5), (6000.0, 0.2),
];
const LEAGUE_MAX_RUSHING_YARDS: [(f64, f64); 10] = [
    (1000.0, 99.9), (1300.0, 99.0), (1500.0, 82.0), (1700.0, 50.0), (1800.0, 32.0),
    (1900.0, 18.0), (2000.0, 9.0), (2105.0, 3.5), (2200.0, 1.5), (2500.0, 0.1),
];
const LEAGUE_MAX_RECEIVING_YARDS: [(f64, f64); 9] = [
    (1000.0, 99.9), (1400.0, 97.0), (1500.0, 88.0), (1600.0, 66.0), (1700.0, 45.0),
    (1800.0, 24.0), (1964.0, 6.0), (2000.0, 4.0), (2200.0, 0.7),
];
const LEAGUE_LONGEST_FIELD_GOAL: [(f64, f64); 9] = [
    (55.0, 99.9), (58.0, 97.0), (60.0, 80.0), (62.0, 45.0), (64.0, 18.0), (66.0, 6.0),
    (67.0, 3.5), (70.0, 0.6), (75.0, 0.05),
];
const GAME_QB_PASSING_YARDS: [(f64, f64); 9] = [
    (250.0, 0.42), (300.0, 0.2), (350.0, 0.075), (400.0, 0.017), (450.0, 0.0032),
    (500.0, 0.000_55), (550.0, 0.000_08), (600.0, 0.000_01), (700.0, 1e-7),
];
const GAME_QB_PASSING_TDS: [(f64, f64); 8] = [
    (1.0, 0.85), (2.0, 0.6), (3.0, 0.3), (4.0, 0.1), (5.0, 0.018), (6.0, 0.0025),
    (7.0, 0.0003), (8.0, 0.000_02),
];
const GAME_PLAYER_TOTAL_TDS: [(f64, f64); 6] = [
    (2.0, 0.45), (3.0, 0.09), (4.0, 0.009), (5.0, 0.0009), (6.0, 0.000_06), (7.0, 0.000_004),
];
const SUPER_BOWL_MARGIN_AT_LEAST: [(f64, f64); 16] = [
    (1.0, 100.0), (3.0, 88.0), (4.0, 80.0), (7.0, 66.0), (10.0, 55.0), (14.0, 42.0),
    (17.0, 33.0), (21.0, 24.0), (25.0, 17.0), (30.0, 11.0), (35.0, 7.0), (40.0, 4.0),
    (45.0, 2.2), (50.0, 1.2), (60.0, 0.4), (80.0, 0.05),
];
const NBA_PLAYER_POINTS_GAME: [(f64, f64); 10] = [
    (40.0, 99.9), (50.0, 99.5), (55.0, 90.0), (60.0, 45.0), (65.0, 15.0), (70.0, 6.0),
    (73.0, 3.0), (81.0, 0.5), (90.0, 0.08), (100.0, 0.01),
];
const NBA_TEAM_WINS: [(f64, f64); 9] = [
    (55.0, 99.9), (60.0, 92.0), (62.0, 75.0), (65.0, 40.0), (67.0, 22.0), (70.0, 6.0),
    (73.0, 1.5), (74.0, 1.0), (80.0, 0.02),
];
const MLB_HOME_RUNS: [(f64, f64); 12] = [
    (30.0, 99.9), (40.0, 99.0), (45.0, 85.0), (50.0, 45.0), (55.0, 18.0), (58.0, 8.0),
    (60.0, 4.5), (62.0, 2.5), (66.0, 0.8), (70.0, 0.3), (73.0, 0.15), (80.0, 0.01),
];
const NHL_GOALS: [(f64, f64); 9] = [
    (40.0, 99.9), (50.0, 92.0), (55.0, 70.0), (60.0, 40.0), (65.0, 16.0), (70.0, 5.0),
    (76.0, 1.2), (87.0, 0.15), (92.0, 0.05),
];

const SUPER_BOWL_OVERTIME_PCT: f64 = 4.5;
const SUPER_BOWL_SHUTOUT_PCT: f64 = 1.2;
const SUPER_BOWL_TOTAL_MEAN: f64 = 48.0;
const SUPER_BOWL_TOTAL_SD: f64 = 14.0;
const PERFECT_TEAM_PLAYOFF_SWEEP: f64 = 0.4;
const NFL_TIES_PER_SEASON: f64 = 0.6;
const TEAM_POINTS_MEAN: f64 = 23.0;
const TEAM_POINTS_SD: f64 = 10.5;
const RETIREMENT_COMEBACK_PCT: f64 = 2.0;

// ── Pricing functions ────────────────────────────────────────────────────────

fn price_super_bowl_overtime(_: &RuleMatch<'_>) -> Option<Priced> {
    Some(Priced::new(
        SUPER_BOWL_OVERTIME_PCT,
        &[
            "Two of the first 58 Super Bowls reached overtime",
            "Modern scoring parity nudges that base rate up slightly",
        ],
    ))
}

fn price_super_bowl_shutout(_: &RuleMatch<'_>) -> Option<Priced> {
    Some(Priced::new(
        SUPER_BOWL_SHUTOUT_PCT,
        &["No team has ever been shut out in a Super Bowl; the lowest score is 3 points"],
    ))
}

fn super_bowl_margin_at_least_pct(margin: f64) -> f64 {
    if margin <= 1.0 {
        return 100.0;
    }
    interp_table_log(&SUPER_BOWL_MARGIN_AT_LEAST, margin)
}

fn price_super_bowl_margin_at_most(m: &RuleMatch<'_>) -> Option<Priced> {
    let at_most = if let Some(n) = m.number("n") {
        n
    } else if let Some(lt) = m.number("lt") {
        lt - 1.0
    } else if m.has("fg") {
        3.0
    } else {
        return None;
    };
    if at_most < 1.0 {
        return None;
    }
    let pct = 100.0 - super_bowl_margin_at_least_pct(at_most + 1.0);
    Some(Priced {
        pct,
        assumptions: vec![
            format!("Historical Super Bowl margin distribution; P(margin ≤ {})", at_most),
            "One-score finishes have become more common since 2000".to_string(),
        ],
    })
}

fn price_super_bowl_margin_at_least(m: &RuleMatch<'_>) -> Option<Priced> {
    let margin = m.threshold()?;
    if margin < 1.0 {
        return None;
    }
    Some(Priced {
        pct: super_bowl_margin_at_least_pct(margin),
        assumptions: vec![
            format!("Historical Super Bowl margin distribution; P(margin ≥ {})", margin),
            "Largest Super Bowl margin on record is 45 points".to_string(),
        ],
    })
}

fn price_super_bowl_total(m: &RuleMatch<'_>) -> Option<Priced> {
    let total = m.threshold()?;
    let pct = 100.0 * normal_tail_cc(SUPER_BOWL_TOTAL_MEAN, SUPER_BOWL_TOTAL_SD, total);
    Some(Priced {
        pct,
        assumptions: vec![
            format!(
                "Combined Super Bowl scoring modeled as normal (mean {}, sd {})",
                SUPER_BOWL_TOTAL_MEAN, SUPER_BOWL_TOTAL_SD
            ),
            format!("P(total ≥ {})", total),
        ],
    })
}

fn team_record_pct(wins: u32) -> f64 {
    100.0 * beta_binomial_pmf(wins, NFL_GAMES, TEAM_RECORD_ALPHA, TEAM_RECORD_BETA)
}

fn price_perfect_with_playoffs(_: &RuleMatch<'_>) -> Option<Priced> {
    Some(Priced::new(
        team_record_pct(NFL_GAMES) * PERFECT_TEAM_PLAYOFF_SWEEP,
        &[
            "Requires 17-0 in the regular season, then a playoff sweep",
            "A 17-0 team is assumed to sweep the playoffs 40% of the time",
            "Only the 1972 Dolphins have finished a season unbeaten",
        ],
    ))
}

fn price_perfect_regular_season(_: &RuleMatch<'_>) -> Option<Priced> {
    Some(Priced::new(
        team_record_pct(NFL_GAMES),
        &[
            "Team records follow a beta-binomial (17 games, alpha = beta = 30)",
            "The only 16-0 regular season was the 2007 Patriots",
        ],
    ))
}

fn price_winless_season(_: &RuleMatch<'_>) -> Option<Priced> {
    Some(Priced::new(
        team_record_pct(0),
        &[
            "Team records follow a beta-binomial (17 games, alpha = beta = 30)",
            "The 2008 Lions and 2017 Browns are the only 0-16 teams",
        ],
    ))
}

fn price_exact_record(m: &RuleMatch<'_>) -> Option<Priced> {
    let wins = m.number("w")? as u32;
    let losses = m.number("l")? as u32;
    if wins + losses != NFL_GAMES {
        return None;
    }
    Some(Priced {
        pct: team_record_pct(wins),
        assumptions: vec![
            format!("Exactly {}-{} under a beta-binomial team-strength model", wins, losses),
            "No ties assumed".to_string(),
        ],
    })
}

fn price_team_win_total(m: &RuleMatch<'_>) -> Option<Priced> {
    let wins = m.threshold()?;
    if !(0.0..=NFL_GAMES as f64).contains(&wins) {
        return None;
    }
    let pct = 100.0
        * beta_binomial_tail(wins as u32, NFL_GAMES, TEAM_RECORD_ALPHA, TEAM_RECORD_BETA);
    Some(Priced {
        pct,
        assumptions: vec![
            format!("P(at least {} wins in 17 games) under a beta-binomial model", wins),
            "Schedule strength and roster changes are not modeled".to_string(),
        ],
    })
}

fn price_qb_game_passing_yards(m: &RuleMatch<'_>) -> Option<Priced> {
    let yards = m.threshold()?;
    if yards < 200.0 {
        return None;
    }
    let per_start = interp_table_log(&GAME_QB_PASSING_YARDS, yards);
    Some(Priced {
        pct: 100.0 * union_probability(per_start, NFL_TEAM_GAMES),
        assumptions: vec![
            format!("Single-start P({}+ passing yards) from the modern per-game distribution", yards),
            format!("Compounded over {} quarterback starts in a season", NFL_TEAM_GAMES),
            "Single-game record is 554 yards (Norm Van Brocklin, 1951)".to_string(),
        ],
    })
}

fn price_qb_game_passing_tds(m: &RuleMatch<'_>) -> Option<Priced> {
    let tds = m.threshold()?;
    if !(1.0..=20.0).contains(&tds) {
        return None;
    }
    let per_start = interp_table_log(&GAME_QB_PASSING_TDS, tds);
    Some(Priced {
        pct: 100.0 * union_probability(per_start, NFL_TEAM_GAMES),
        assumptions: vec![
            format!("Single-start P({}+ passing TDs)", tds),
            format!("Compounded over {} quarterback starts in a season", NFL_TEAM_GAMES),
            "Single-game record is 7 passing touchdowns".to_string(),
        ],
    })
}

fn price_player_game_tds(m: &RuleMatch<'_>) -> Option<Priced> {
    let tds = m.threshold()?;
    if !(1.0..=20.0).contains(&tds) {
        return None;
    }
    let per_team_game = interp_table_log(&GAME_PLAYER_TOTAL_TDS, tds);
    Some(Priced {
        pct: 100.0 * union_probability(per_team_game, NFL_TEAM_GAMES),
        assumptions: vec![
            format!("Per team-game chance that one player scores {}+ touchdowns", tds),
            "Single-game record is 6 touchdowns".to_string(),
        ],
    })
}

fn price_league_table(
    table: &[(f64, f64)],
    value: f64,
    label: &str,
    record_note: &str,
) -> Priced {
    Priced {
        pct: interp_table_log(table, value),
        assumptions: vec![
            format!("League-leader distribution for {}: P(someone reaches {})", label, value),
            record_note.to_string(),
        ],
    }
}

fn price_qb_season_passing_tds(m: &RuleMatch<'_>) -> Option<Priced> {
    let tds = m.threshold()?;
    if !(1.0..=120.0).contains(&tds) {
        return None;
    }
    Some(price_league_table(
        &LEAGUE_MAX_PASSING_TDS,
        tds,
        "passing touchdowns",
        "Single-season record is 55 (Peyton Manning, 2013)",
    ))
}

fn price_qb_season_passing_yards(m: &RuleMatch<'_>) -> Option<Priced> {
    let yards = m.threshold()?;
    if yards < 1000.0 {
        return None;
    }
    Some(price_league_table(
        &LEAGUE_MAX_PASSING_YARDS,
        yards,
        "passing yards",
        "Single-season record is 5,477 (Peyton Manning, 2013)",
    ))
}

fn price_rusher_season_yards(m: &RuleMatch<'_>) -> Option<Priced> {
    let yards = m.threshold()?;
    if yards < 500.0 {
        return None;
    }
    Some(price_league_table(
        &LEAGUE_MAX_RUSHING_YARDS,
        yards,
        "rushing yards",
        "Single-season record is 2,105 (Eric Dickerson, 1984)",
    ))
}

fn price_receiver_season_yards(m: &RuleMatch<'_>) -> Option<Priced> {
    let yards = m.threshold()?;
    if yards < 500.0 {
        return None;
    }
    Some(price_league_table(
        &LEAGUE_MAX_RECEIVING_YARDS,
        yards,
        "receiving yards",
        "Single-season record is 1,964 (Calvin Johnson, 2012)",
    ))
}

fn price_long_field_goal(m: &RuleMatch<'_>) -> Option<Priced> {
    let yards = m.threshold()?;
    if !(40.0..=100.0).contains(&yards) {
        return None;
    }
    Some(price_league_table(
        &LEAGUE_LONGEST_FIELD_GOAL,
        yards,
        "longest made field goal",
        "Record is 66 yards (Justin Tucker, 2021)",
    ))
}

fn price_tie_game(_: &RuleMatch<'_>) -> Option<Priced> {
    let pct = 100.0 * (1.0 - (-NFL_TIES_PER_SEASON).exp());
    Some(Priced::new(
        pct,
        &[
            "Ties arrive as a Poisson process at about 0.6 per season under current overtime rules",
        ],
    ))
}

fn price_team_points_game(m: &RuleMatch<'_>) -> Option<Priced> {
    if m.text.contains("nba") || m.text.contains("basketball") {
        return None;
    }
    let points = m.threshold()?;
    if !(10.0..=120.0).contains(&points) {
        return None;
    }
    let per_game = normal_tail_cc(TEAM_POINTS_MEAN, TEAM_POINTS_SD, points);
    Some(Priced {
        pct: 100.0 * union_probability(per_game, NFL_TEAM_GAMES),
        assumptions: vec![
            format!(
                "Team scoring modeled as normal (mean {}, sd {}) per game",
                TEAM_POINTS_MEAN, TEAM_POINTS_SD
            ),
            format!("Compounded over {} team-games", NFL_TEAM_GAMES),
        ],
    })
}

fn price_nba_player_points(m: &RuleMatch<'_>) -> Option<Priced> {
    if !(m.text.contains("nba") || m.text.contains("basketball")) {
        return None;
    }
    let points = m.threshold()?;
    if points < 20.0 {
        return None;
    }
    Some(price_league_table(
        &NBA_PLAYER_POINTS_GAME,
        points,
        "single-game NBA points",
        "Record is 100 points (Wilt Chamberlain, 1962)",
    ))
}

fn price_nba_team_wins(m: &RuleMatch<'_>) -> Option<Priced> {
    let wins = m.threshold()?;
    // Anything an NFL schedule can hold belongs to the NFL win-total rule.
    if !(18.0..=82.0).contains(&wins) {
        return None;
    }
    Some(price_league_table(
        &NBA_TEAM_WINS,
        wins,
        "NBA regular-season wins",
        "Record is 73 wins (2015-16 Warriors)",
    ))
}

fn price_mlb_home_runs(m: &RuleMatch<'_>) -> Option<Priced> {
    let hr = m.threshold()?;
    if !(10.0..=120.0).contains(&hr) {
        return None;
    }
    Some(price_league_table(
        &MLB_HOME_RUNS,
        hr,
        "MLB home runs",
        "Record is 73 (Barry Bonds, 2001); 62 is the AL record",
    ))
}

fn price_nhl_goals(m: &RuleMatch<'_>) -> Option<Priced> {
    if ["nba", "mlb", "soccer", "premier league", "in a game"]
        .iter()
        .any(|w| m.text.contains(w))
    {
        return None;
    }
    let goals = m.threshold()?;
    if !(30.0..=120.0).contains(&goals) {
        return None;
    }
    Some(price_league_table(
        &NHL_GOALS,
        goals,
        "NHL goals",
        "Record is 92 goals (Wayne Gretzky, 1981-82)",
    ))
}

fn price_team_wins_super_bowl(m: &RuleMatch<'_>) -> Option<Priced> {
    if !NFL_TEAM_RE.is_match(m.text) {
        return None;
    }
    Some(Priced::new(
        100.0 / NFL_TEAMS as f64,
        &["Every team is treated as equally likely absent power ratings"],
    ))
}

fn price_retirement_comeback(_: &RuleMatch<'_>) -> Option<Priced> {
    Some(Priced::new(
        RETIREMENT_COMEBACK_PCT,
        &["One or two notable retired stars attempt a return in a typical season; any one player is a long shot"],
    ))
}

// ── Catalogue (order matters) ────────────────────────────────────────────────

static RULES: &[BaselineRule] = &[
    BaselineRule {
        key: "retirement_comeback",
        subject: Subject::Event,
        patterns: &[
            r"(?:comes?|coming)\s+(?:back\s+)?out\s+of\s+retirement",
            r"\bun-?retires?\b",
            r"returns?\s+(?:to|from)\s+retirement",
            r"returns?\s+to\s+(?:the\s+)?(?:nfl|nba|mlb|nhl)\b",
            r"comeback\s+(?:to|in)\s+the\s+(?:nfl|nba|mlb|nhl)",
            r"\bplays?\s+(?:again|another\s+(?:game|season|down))\b",
        ],
        price: price_retirement_comeback,
    },
    BaselineRule {
        key: "super_bowl_overtime",
        subject: Subject::Event,
        patterns: &[
            r"super\s+bowl\s+(?:goes|going|heads|go)\s+(?:in)?to\s+overtime",
            r"overtime\s+(?:in|of)\s+the\s+super\s+bowl",
            r"super\s+bowl\s+(?:ends|is\s+decided|decided)\s+in\s+overtime",
        ],
        price: price_super_bowl_overtime,
    },
    BaselineRule {
        key: "super_bowl_shutout",
        subject: Subject::Event,
        patterns: &[
            r"shut\s*out\s+in\s+the\s+super\s+bowl",
            r"super\s+bowl\s+shut\s*out",
            r"(?:held|kept)\s+scoreless\s+in\s+the\s+super\s+bowl",
        ],
        price: price_super_bowl_shutout,
    },
    BaselineRule {
        key: "super_bowl_margin_at_most",
        subject: Subject::Event,
        patterns: &[
            r"super\s+bowl\s+(?:is\s+)?(?:won|decided)\s+by\s+(?:(?P<n>\d+)\s+(?:points?|pts)\s+or\s+(?:fewer|less)|(?:fewer|less)\s+than\s+(?P<lt>\d+)\s+(?:points?|pts)|(?P<fg>a\s+field\s+goal\s+or\s+less))",
        ],
        price: price_super_bowl_margin_at_most,
    },
    BaselineRule {
        key: "super_bowl_margin_at_least",
        subject: Subject::Event,
        patterns: &[
            r"super\s+bowl\s+(?:is\s+)?(?:won|decided)\s+by\s+(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d+)\+?\s+(?:points?|pts)",
            r"wins?\s+the\s+super\s+bowl\s+by\s+(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d+)\+?\s+(?:points?|pts)",
            r"(?P<n>\d+)\+?[- ]point\s+(?:blowout|margin|win)\s+in\s+the\s+super\s+bowl",
        ],
        price: price_super_bowl_margin_at_least,
    },
    BaselineRule {
        key: "super_bowl_total_points",
        subject: Subject::Event,
        patterns: &[
            r"super\s+bowl\s+(?:total|combined)\s+(?:score\s+|points\s+)?(?:is\s+|goes\s+)?(?:at\s+least\s+|(?P<gt>over\s+|above\s+|more\s+than\s+))(?P<n>\d+)",
            r"(?:at\s+least\s+|(?P<gt>over\s+|more\s+than\s+))(?P<n>\d+)\s+(?:total|combined)\s+points\s+(?:are\s+)?(?:scored\s+)?in\s+the\s+super\s+bowl",
        ],
        price: price_super_bowl_total,
    },
    BaselineRule {
        key: "perfect_season_with_playoffs",
        subject: Subject::Team,
        patterns: &[
            r"\b(?:19|20|21)-0\b",
            r"undefeated\s+(?:season\s+)?(?:including|through)\s+(?:the\s+)?playoffs",
            r"perfect\s+season\s+(?:and|including|capped\s+(?:off\s+)?(?:by|with))\s+(?:a\s+|the\s+)?super\s+bowl",
            r"(?:go|goes|going)\s+undefeated\s+and\s+wins?\s+the\s+super\s+bowl",
        ],
        price: price_perfect_with_playoffs,
    },
    BaselineRule {
        key: "perfect_regular_season",
        subject: Subject::Team,
        patterns: &[
            r"\b17-0\b",
            r"(?:undefeated|perfect|unbeaten)\s+(?:regular\s+)?season",
            r"\bgo(?:es|ing)?\s+undefeated\b",
            r"never\s+loses?\s+a\s+(?:regular[- ]season\s+)?game",
        ],
        price: price_perfect_regular_season,
    },
    BaselineRule {
        key: "winless_season",
        subject: Subject::Team,
        patterns: &[
            r"\b0-17\b",
            r"winless\s+(?:regular\s+)?season",
            r"\bgo(?:es|ing)?\s+winless\b",
            r"(?:doesn't|does\s+not|fails\s+to)\s+win\s+a\s+(?:single\s+)?game",
        ],
        price: price_winless_season,
    },
    BaselineRule {
        key: "exact_team_record",
        subject: Subject::Team,
        patterns: &[
            r"(?:go|goes|going|finish(?:es)?|finishing|ends?\s+up|record\s+of)\s+(?P<w>\d{1,2})-(?P<l>\d{1,2})\b",
        ],
        price: price_exact_record,
    },
    BaselineRule {
        key: "nba_team_wins",
        subject: Subject::Field(30),
        patterns: &[
            r"(?:win|wins|winning)\s+(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d{2})\+?\s+(?:regular[- ]season\s+)?games",
            r"\b(?P<n>\d{2})\+?\s+wins\b",
        ],
        price: price_nba_team_wins,
    },
    BaselineRule {
        key: "team_win_total",
        subject: Subject::Team,
        patterns: &[
            r"(?:win|wins|winning)\s+(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d{1,2})\+?\s+(?:or\s+more\s+)?(?:regular[- ]season\s+)?games",
            r"\b(?P<n>\d{1,2})\+\s+wins\b",
            r"at\s+least\s+(?P<n>\d{1,2})\s+wins\b",
        ],
        price: price_team_win_total,
    },
    BaselineRule {
        key: "qb_single_game_passing_yards",
        subject: Subject::AnyEntity,
        patterns: &[
            r"throws?\s+for\s+(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d{3})\+?\s+(?:passing\s+)?(?:yards|yds)\s+in\s+(?:a|one|an)\s+(?:single\s+)?(?:nfl\s+)?game",
            r"(?P<n>\d{3})\+?[- ](?:passing[- ])?yard\s+(?:passing\s+)?game",
        ],
        price: price_qb_game_passing_yards,
    },
    BaselineRule {
        key: "qb_single_game_passing_tds",
        subject: Subject::AnyEntity,
        patterns: &[
            r"throws?\s+(?:for\s+)?(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d{1,2})\+?\s+(?:passing\s+)?(?:touchdowns?|tds?|td\s+passes|touchdown\s+passes)\s+in\s+(?:a|one|an)\s+(?:single\s+)?(?:nfl\s+)?game",
            r"(?P<n>\d{1,2})[- ](?:touchdown|td)\s+passing\s+game",
        ],
        price: price_qb_game_passing_tds,
    },
    BaselineRule {
        key: "player_single_game_touchdowns",
        subject: Subject::AnyEntity,
        patterns: &[
            r"scores?\s+(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d{1,2})\+?\s+(?:total\s+)?(?:touchdowns?|tds?)\s+in\s+(?:a|one|an)\s+(?:single\s+)?(?:nfl\s+)?game",
        ],
        price: price_player_game_tds,
    },
    BaselineRule {
        key: "qb_season_passing_tds",
        subject: Subject::AnyEntity,
        patterns: &[
            r"throws?\s+(?:for\s+)?(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d{1,3})\+?\s+(?:passing\s+)?(?:touchdowns?|tds?|td\s+passes|touchdown\s+passes)",
            r"(?P<n>\d{1,3})\+?\s+(?:passing\s+touchdowns|passing\s+tds|touchdown\s+passes|td\s+passes)",
        ],
        price: price_qb_season_passing_tds,
    },
    BaselineRule {
        key: "qb_season_passing_yards",
        subject: Subject::AnyEntity,
        patterns: &[
            r"throws?\s+for\s+(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d{1,2},?\d{3})\+?\s+(?:passing\s+)?(?:yards|yds)",
            r"(?P<n>\d{1,2},?\d{3})\+?\s+passing\s+(?:yards|yds)",
        ],
        price: price_qb_season_passing_yards,
    },
    BaselineRule {
        key: "rusher_season_yards",
        subject: Subject::AnyEntity,
        patterns: &[
            r"rush(?:es)?\s+for\s+(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d{1,2},?\d{3}|\d{3})\+?\s+(?:yards|yds)",
            r"(?P<n>\d{1,2},?\d{3})\+?\s+rushing\s+(?:yards|yds)",
        ],
        price: price_rusher_season_yards,
    },
    BaselineRule {
        key: "receiver_season_yards",
        subject: Subject::AnyEntity,
        patterns: &[
            r"(?:catch(?:es)?|receiv\w*|has)\s+(?:for\s+)?(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d{1,2},?\d{3})\+?\s+(?:receiving\s+)?(?:yards|yds)",
            r"(?P<n>\d{1,2},?\d{3})\+?\s+receiving\s+(?:yards|yds)",
        ],
        price: price_receiver_season_yards,
    },
    BaselineRule {
        key: "longest_field_goal",
        subject: Subject::Field(8),
        patterns: &[
            r"(?:at\s+least\s+(?:a\s+)?|(?P<gt>longer\s+than\s+(?:a\s+)?))?(?P<n>\d{2})\+?[- ]yard(?:er|\s+field\s+goal)",
            r"field\s+goal\s+(?:of|from)\s+(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d{2})\+?\s+(?:yards|yds)",
        ],
        price: price_long_field_goal,
    },
    BaselineRule {
        key: "nfl_tie_game",
        subject: Subject::Event,
        patterns: &[r"game\s+ends?\s+in\s+a\s+tie", r"\ba\s+tie\s+game\b", r"\bends\s+in\s+a\s+tie\b"],
        price: price_tie_game,
    },
    BaselineRule {
        key: "nba_player_points",
        subject: Subject::Field(15),
        patterns: &[
            r"(?:scores?|drops?|puts?\s+up)\s+(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d{2,3})\+?\s+(?:points|pts)\s+in\s+(?:a|one|an)\s+(?:single\s+)?(?:nba\s+)?game",
        ],
        price: price_nba_player_points,
    },
    BaselineRule {
        key: "team_points_single_game",
        subject: Subject::AnyEntity,
        patterns: &[
            r"(?:scores?|puts?\s+up|drops?)\s+(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d{2,3})\+?\s+points\s+in\s+(?:a|one|an)\s+(?:single\s+)?(?:nfl\s+)?game",
        ],
        price: price_team_points_game,
    },
    BaselineRule {
        key: "mlb_home_runs",
        subject: Subject::Field(12),
        patterns: &[
            r"hits?\s+(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d{2,3})\+?\s+(?:home\s+runs|homers|hrs)",
            r"(?P<n>\d{2,3})\+?\s+(?:home\s+runs|homers)",
        ],
        price: price_mlb_home_runs,
    },
    BaselineRule {
        key: "nhl_goals",
        subject: Subject::Field(10),
        patterns: &[
            r"scores?\s+(?:at\s+least\s+|(?P<gt>more\s+than\s+|over\s+))?(?P<n>\d{2,3})\+?\s+goals",
            r"(?P<n>\d{2,3})[- ]goal\s+season",
        ],
        price: price_nhl_goals,
    },
    BaselineRule {
        key: "team_wins_super_bowl",
        subject: Subject::Event,
        patterns: &[r"\bwins?\s+(?:the\s+)?(?:next\s+)?super\s+bowl\b", r"super\s+bowl\s+champions?\b"],
        price: price_team_wins_super_bowl,
    },
];

static COMPILED: LazyLock<Vec<Vec<Regex>>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|rule| {
            rule.patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){}", p)).expect("valid baseline pattern"))
                .collect()
        })
        .collect()
});

/// Match a normalized prompt against the catalogue. First match wins.
pub fn detect_baseline_event(prompt: &str) -> Option<BaselineEvent> {
    let text = prompt.to_lowercase();
    let subject = subject_text(prompt);
    if NEGATED_ENTITY_RE.is_match(&subject) {
        // Every rule prices the event happening; a negated subject inverts it
        // and would break the horizon compounding.
        debug!("Negated subject, no baseline: {}", prompt);
        return None;
    }
    let any_entity = ANY_ENTITY_RE.is_match(&subject);

    for (rule, patterns) in RULES.iter().zip(COMPILED.iter()) {
        if matches!(rule.subject, Subject::AnyEntity) && !any_entity {
            continue;
        }
        for re in patterns {
            let Some(caps) = re.captures(&text) else {
                continue;
            };
            let m = RuleMatch { text: &text, caps };
            let Some(priced) = (rule.price)(&m) else {
                continue;
            };
            let event = scale_for_subject(rule, priced, &text, any_entity);
            debug!(
                "Baseline rule {} matched: {:.3}%",
                event.key, event.season_probability_pct
            );
            return Some(event);
        }
    }
    None
}

/// Lowercased prompt with any named player cut out, so words like "Nobody"
/// in "Zed Nobody" are not read as the subject.
fn subject_text(prompt: &str) -> String {
    let lower = prompt.to_lowercase();
    match extract_player_name(prompt) {
        Some(name) => lower.replacen(&name.to_lowercase(), " ", 1),
        None => lower,
    }
}

fn scale_for_subject(rule: &BaselineRule, priced: Priced, text: &str, any_entity: bool) -> BaselineEvent {
    let Priced { pct, mut assumptions } = priced;
    let pct = match rule.subject {
        Subject::Event | Subject::AnyEntity => pct,
        Subject::Team => {
            let named = NFL_TEAM_RE.is_match(text) || NBA_TEAM_RE.is_match(text);
            if any_entity || !named {
                assumptions.push(format!("Any of the {} teams can do it: 1 - (1 - p)^{}", NFL_TEAMS, NFL_TEAMS));
                any_entity_pct(pct, NFL_TEAMS)
            } else {
                assumptions.push("Priced for a single named team of average strength".to_string());
                pct
            }
        }
        Subject::Field(n) => {
            if any_entity {
                pct
            } else {
                assumptions.push(format!(
                    "Named player treated as one of {} realistic contenders for the league mark",
                    n
                ));
                single_entity_pct(pct, n)
            }
        }
    };
    BaselineEvent {
        key: rule.key.to_string(),
        season_probability_pct: clamp_pct(pct),
        assumptions,
    }
}

/// Union bound across `n` entities, in percent.
pub fn any_entity_pct(single_pct: f64, n: u32) -> f64 {
    100.0 * union_probability(single_pct / 100.0, n)
}

/// Inverse of [`any_entity_pct`]: the per-entity share of a league-wide chance.
pub fn single_entity_pct(any_pct: f64, n: u32) -> f64 {
    let p_any = (any_pct / 100.0).clamp(0.0, 1.0);
    if n == 0 {
        return 0.0;
    }
    100.0 * (1.0 - (1.0 - p_any).powf(1.0 / n as f64))
}

/// Compound a season probability over the horizon's window:
/// 1 - (1 - p)^years, clamped to the engine's percentage band.
pub fn horizon_adjusted_probability(
    season_pct: f64,
    horizon: Horizon,
    horizon_years: Option<u32>,
    cal: &HorizonCalibration,
) -> f64 {
    let years = match horizon {
        Horizon::Season | Horizon::Unspecified => return clamp_pct(season_pct),
        Horizon::Career => cal.career_years(),
        Horizon::Ever => cal.ever_years(),
        Horizon::MultiYear => horizon_years.unwrap_or(DEFAULT_MULTI_YEAR_WINDOW),
    };
    clamp_pct(100.0 * union_probability(season_pct / 100.0, years.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::normalize::normalize;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn detect(prompt: &str) -> Option<BaselineEvent> {
        detect_baseline_event(&normalize(prompt))
    }

    #[test]
    fn every_pattern_compiles() {
        assert_eq!(COMPILED.len(), RULES.len());
        assert!(RULES.len() >= 20);
    }

    #[test]
    fn generic_quarterback_touchdown_threshold_is_near_lock() {
        let ev = detect("A quarterback throws for 20 touchdowns this season").unwrap();
        assert_eq!(ev.key, "qb_season_passing_tds");
        assert!(ev.season_probability_pct >= 90.0);
    }

    #[test]
    fn generic_qb_rules_need_any_entity_phrasing() {
        // Named players go to the stat-claim path instead.
        assert!(detect("Josh Allen throws 30 touchdowns this season").is_none());
    }

    #[test]
    fn record_breaking_season_is_rare() {
        let ev = detect("Any QB throws 60 touchdowns this season").unwrap();
        assert!(ev.season_probability_pct < 1.0);
    }

    #[test]
    fn specific_detectors_win_over_generic_ones() {
        let ev = detect("A quarterback throws 7 touchdowns in a single game this season").unwrap();
        assert_eq!(ev.key, "qb_single_game_passing_tds");
        let ev = detect("Super Bowl goes to overtime").unwrap();
        assert_eq!(ev.key, "super_bowl_overtime");
        let ev = detect("A team goes 20-0").unwrap();
        assert_eq!(ev.key, "perfect_season_with_playoffs");
    }

    #[test]
    fn perfect_season_any_team_uses_union_bound() {
        let any = detect("A team goes 17-0 in the NFL regular season this year").unwrap();
        let named = detect("The Chiefs go 17-0").unwrap();
        assert_eq!(any.key, "perfect_regular_season");
        assert!(any.season_probability_pct > named.season_probability_pct);
        assert_relative_eq!(
            any.season_probability_pct,
            any_entity_pct(team_record_pct(NFL_GAMES), NFL_TEAMS),
            epsilon = 1e-9
        );
        assert!(any.season_probability_pct < 5.0);
    }

    #[test]
    fn exact_record_requires_seventeen_games() {
        let ev = detect("The Bears go 12-5").unwrap();
        assert_eq!(ev.key, "exact_team_record");
        // A score line is not a season record.
        assert!(detect("The Bears win 24-17").is_none());
    }

    #[test]
    fn team_win_total_tail() {
        let ten = detect("The Lions win at least 10 games").unwrap();
        let fourteen = detect("The Lions win at least 14 games").unwrap();
        assert_eq!(ten.key, "team_win_total");
        assert!(ten.season_probability_pct > fourteen.season_probability_pct);
    }

    #[test]
    fn nba_win_totals_route_to_nba_table() {
        let ev = detect("A team wins 70 games in the NBA").unwrap();
        assert_eq!(ev.key, "nba_team_wins");
        assert!(ev.season_probability_pct < 10.0);
    }

    #[test]
    fn super_bowl_margins_are_complementary() {
        let close = detect("The Super Bowl is decided by 3 points or fewer").unwrap();
        let wide = detect("The Super Bowl is decided by at least 4 points").unwrap();
        assert_relative_eq!(
            close.season_probability_pct + wide.season_probability_pct,
            100.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn single_game_union_over_team_games() {
        let ev = detect("A quarterback throws for 500 yards in a game this season").unwrap();
        assert_eq!(ev.key, "qb_single_game_passing_yards");
        assert!(ev.season_probability_pct > 10.0 && ev.season_probability_pct < 60.0);
    }

    #[test]
    fn named_player_in_field_rule_gets_inverted_union() {
        let any = detect("Someone hits 62 home runs this season").unwrap();
        let named = detect("Aaron Judge hits 62 home runs this season").unwrap();
        assert!(named.season_probability_pct < any.season_probability_pct);
    }

    #[test]
    fn comeback_rule_matches_return_phrasing() {
        let ev = detect("Tom Brady comes out of retirement").unwrap();
        assert_eq!(ev.key, "retirement_comeback");
    }

    #[test]
    fn unrelated_prompt_has_no_baseline() {
        assert!(detect("It snows in Miami on Christmas").is_none());
    }

    #[test]
    fn union_bound_stays_between_p_and_one() {
        let mut rng = StdRng::seed_from_u64(32);
        for _ in 0..2_000 {
            let p: f64 = rng.gen_range(0.0..=1.0);
            let any = union_probability(p, NFL_TEAMS);
            assert!(any >= p - 1e-12);
            assert!(any <= 1.0);
        }
    }

    #[test]
    fn single_and_any_entity_are_inverses() {
        let single = 0.7;
        let any = any_entity_pct(single, 12);
        assert_relative_eq!(single_entity_pct(any, 12), single, epsilon = 1e-9);
    }

    #[test]
    fn horizon_adjustment_is_monotone() {
        let cal = HorizonCalibration::default();
        let season = 0.5;
        let career = horizon_adjusted_probability(season, Horizon::Career, None, &cal);
        let ever = horizon_adjusted_probability(season, Horizon::Ever, None, &cal);
        assert_relative_eq!(
            horizon_adjusted_probability(season, Horizon::Season, None, &cal),
            season
        );
        assert!(career > season);
        assert!(ever > career);
        assert_relative_eq!(
            ever,
            100.0 * (1.0 - (1.0 - 0.005f64).powi(30)),
            epsilon = 1e-9
        );
        assert_eq!(horizon_adjusted_probability(80.0, Horizon::Ever, None, &cal), 99.9);
    }

    #[test]
    fn horizon_monotone_for_every_rule_with_season_and_ever_framings() {
        let cal = HorizonCalibration::default();
        for prompt in [
            "A team goes 17-0 this season",
            "Super Bowl goes to overtime",
            "A quarterback throws 55 touchdowns this season",
            "A running back rushes for 2,200 yards this season",
        ] {
            let ev = detect(prompt).unwrap();
            let season = horizon_adjusted_probability(ev.season_probability_pct, Horizon::Season, None, &cal);
            let ever = horizon_adjusted_probability(ev.season_probability_pct, Horizon::Ever, None, &cal);
            assert!(ever >= season, "{prompt}: ever {ever} < season {season}");
        }
    }

    #[test]
    fn negated_subjects_do_not_price_the_event() {
        let someone = detect("Someone throws for 5,000 passing yards this season").unwrap();
        assert_eq!(someone.key, "qb_season_passing_yards");
        assert!(detect("Nobody throws for 5,000 passing yards this season").is_none());
        assert!(detect("No one throws for 5,000 passing yards this season").is_none());
        assert!(detect("No team goes 17-0 this season").is_none());
    }

    #[test]
    fn surnames_are_not_subjects() {
        assert!(detect("Zed Nobody throws 30 touchdowns this season").is_none());
        assert!(detect("Ty Someone rushes for 2,000 yards this season").is_none());
        // The generic subject still works once the name is out of the way.
        assert!(detect("A quarterback throws 30 touchdowns this season").is_some());
    }
}
