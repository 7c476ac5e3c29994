use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    Season,
    Career,
    Ever,
    MultiYear,
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum League {
    Nfl,
    Nba,
    Mlb,
    Nhl,
    Unknown,
}

impl League {
    /// Stat claims are NFL box-score lines, so another named league rules them out.
    pub fn allows_nfl_stats(self) -> bool {
        matches!(self, League::Nfl | League::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub horizon: Horizon,
    /// Window length when the horizon is `MultiYear` and the prompt names one.
    #[serde(default)]
    pub horizon_years: Option<u32>,
    pub league: League,
    pub is_betting_advice: bool,
    pub is_player_prompt: bool,
}

static MULTI_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:in|within|over|during)\s+(?:the\s+)?(?:next\s+)?(\d{1,2}|two|three|four|five|six|seven|eight|nine|ten)\s+(?:years|seasons)\b|\bnext\s+(\d{1,2}|two|three|four|five|six|seven|eight|nine|ten)\s+(?:years|seasons)\b",
    )
    .expect("valid multi-year regex")
});
static BY_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:by|before)\s+(?:the\s+)?(20\d\d)\b").expect("valid by-year regex")
});
static EVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:ever|all[- ]time|someday|some\s+day|one\s+day|at\s+some\s+point)\b")
        .expect("valid ever regex")
});
static CAREER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:career|lifetime|before\s+(?:he|she|they)\s+retires?|before\s+retiring|by\s+the\s+time\s+(?:he|she|they)\s+retires?)\b",
    )
    .expect("valid career regex")
});
static HALL_OF_FAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bhall\s+of\s+fame\b|\bhof\b|\bhall\s+of\s+famer\b").expect("valid hof regex")
});
static SEASON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:next|this|upcoming|coming)\s+(?:regular\s+)?(?:year|season)\b|\bin\s+20\d\d\b|\b20\d\d(?:-\d\d)?\s+season\b|\bthis\s+(?:fall|winter)\b",
    )
    .expect("valid season regex")
});
static BETTING_ADVICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bshould\s+i\s+(?:bet|take|hammer|parlay|wager|put\s+money)\b|\bis\s+(?:it|this|that)\s+a\s+good\s+bet\b|\b(?:lock|bet)\s+of\s+the\s+(?:day|week|year)\b|\bbest\s+bet\b|\bwho\s+should\s+i\s+bet\b|\bworth\s+(?:a\s+)?bet(?:ting)?\b|\bhow\s+much\s+should\s+i\s+(?:bet|wager)\b|\bunits?\s+on\b|\bparlay\s+(?:advice|picks?)\b",
    )
    .expect("valid betting advice regex")
});

const LEAGUE_KEYWORDS: [(League, &[&str]); 4] = [
    (
        League::Nfl,
        &[
            "nfl", "super bowl", "touchdown", "quarterback", "qb", "afc", "nfc", "passing yards",
            "rushing yards", "receiving yards", "field goal", "interception", "sack",
            "running back", "wide receiver", "tight end", "17-0", "heisman",
        ],
    ),
    (
        League::Nba,
        &["nba", "basketball", "three-pointer", "triple-double", "triple double", "rebounds", "assists", "finals mvp", "dunk"],
    ),
    (
        League::Mlb,
        &["mlb", "baseball", "world series", "home run", "homer", "strikeout", "no-hitter", "perfect game", "batting average", "pitcher"],
    ),
    (
        League::Nhl,
        &["nhl", "hockey", "stanley cup", "hat trick", "goalie", "power play"],
    ),
];

/// Capitalised words that start sentences or name things other than players.
const NON_NAME_WORDS: [&str; 40] = [
    "The", "A", "An", "What", "Will", "Would", "Can", "Could", "Does", "Do", "Is", "How", "Who",
    "Super", "Bowl", "Hall", "Fame", "Pro", "All", "World", "Series", "Stanley", "Cup", "Finals",
    "Most", "Valuable", "Player", "Rookie", "Year", "Comeback", "Defensive", "Offensive", "Any",
    "Team", "Game", "Season", "Regular", "National", "Football", "League",
];

/// Derive the structured intent of a normalized prompt.
pub fn parse_intent(text: &str) -> Intent {
    let (horizon, horizon_years) = detect_horizon(text);
    Intent {
        horizon,
        horizon_years,
        league: detect_league(text),
        is_betting_advice: BETTING_ADVICE_RE.is_match(text),
        is_player_prompt: extract_player_name(text).is_some(),
    }
}

/// First-match-wins horizon rules.
fn detect_horizon(text: &str) -> (Horizon, Option<u32>) {
    if let Some(caps) = MULTI_YEAR_RE.captures(text) {
        let years = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| parse_small_number(m.as_str()));
        return (Horizon::MultiYear, years);
    }
    if BY_YEAR_RE.is_match(text) {
        return (Horizon::MultiYear, None);
    }
    if EVER_RE.is_match(text) {
        return (Horizon::Ever, None);
    }
    if CAREER_RE.is_match(text) {
        return (Horizon::Career, None);
    }
    let season_cue = SEASON_RE.is_match(text);
    if HALL_OF_FAME_RE.is_match(text) && !season_cue {
        return (Horizon::Career, None);
    }
    if season_cue {
        return (Horizon::Season, None);
    }
    (Horizon::Unspecified, None)
}

fn detect_league(text: &str) -> League {
    let lower = text.to_lowercase();
    LEAGUE_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| contains_word(&lower, w)))
        .map(|(league, _)| *league)
        .unwrap_or(League::Unknown)
}

/// Word-boundary containment for short keywords like "qb" or "afc". A
/// trailing plural "s" still counts as a boundary.
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(i, _)| {
        let before = haystack[..i].chars().next_back();
        let mut rest = haystack[i + needle.len()..].chars();
        let after_ok = match rest.next() {
            None => true,
            Some('s') => !rest.next().is_some_and(|c| c.is_alphanumeric()),
            Some(c) => !c.is_alphanumeric(),
        };
        !before.is_some_and(|c| c.is_alphanumeric()) && after_ok
    })
}

/// Two consecutive capitalised tokens that are not stock phrases, e.g.
/// "Josh Allen". Returns the first such pair.
pub fn extract_player_name(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| matches!(c, ',' | '?' | '!' | ':' | ';' | '"' | '(' | ')')))
        .map(|t| t.strip_suffix("'s").unwrap_or(t))
        .collect();
    tokens.windows(2).find_map(|pair| {
        let (first, second) = (pair[0], pair[1]);
        let usable = |w: &str| is_name_token(w) && !NON_NAME_WORDS.contains(&w.trim_end_matches('.'));
        (usable(first) && usable(second)).then(|| format!("{} {}", first, second))
    })
}

/// "Allen", "Ja'Marr", "St.", "C.J." qualify; "NFL", "17-0", "throws" do not.
fn is_name_token(token: &str) -> bool {
    let Some(head) = token.chars().next() else {
        return false;
    };
    if !head.is_ascii_uppercase() {
        return false;
    }
    if !token.chars().all(|c| c.is_ascii_alphabetic() || matches!(c, '\'' | '.' | '-')) {
        return false;
    }
    let initials = token.contains('.') && token.chars().all(|c| c.is_ascii_uppercase() || c == '.');
    initials || token.chars().any(|c| c.is_ascii_lowercase())
}

fn parse_small_number(s: &str) -> Option<u32> {
    match s.to_ascii_lowercase().as_str() {
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        other => other.parse().ok(),
    }
}
