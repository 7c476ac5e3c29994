//! Prompt canonicalisation.
//!
//! Order matters: unicode folding first so the instruction and boilerplate
//! patterns only ever see ASCII quotes and dashes, then trailing
//! meta-instructions, then leading question boilerplate, then punctuation and
//! whitespace runs.

use regex::Regex;
use std::sync::LazyLock;

/// Trailing clauses that tell us how to answer rather than what to price.
/// A clause is only stripped when it matches one of these in full.
static INSTRUCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^(?:please\s+)?(?:
            explain(?:\s+why|\s+your\s+reasoning|\s+it)?
          | (?:give|show)\s+(?:me\s+)?(?:your\s+)?(?:reasoning|work|math)
          | show\s+your\s+work
          | odds\s+only
          | just\s+(?:give\s+me\s+)?(?:the\s+)?(?:odds|number|probability)
          | no\s+explanation
          | be\s+(?:brief|concise|honest)
          | keep\s+it\s+(?:short|brief)
          | one\s+(?:line|sentence)
          | briefly
          | thanks?(?:\s+you)?
          | be\s+realistic
          | in\s+american\s+odds
        )\s*[.!?]*$",
    )
    .expect("valid instruction regex")
});

/// Leading question boilerplate, most specific first. Only the first match is
/// removed.
static BOILERPLATE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^what\s+(?:are|re)\s+the\s+odds\s+(?:that|of)\s+",
        r"^what\s+(?:are|re)\s+the\s+odds\s*[:,-]?\s+",
        r"^what(?:\s+is|'s)\s+the\s+(?:probability|chance|likelihood)\s+(?:that|of)\s+",
        r"^what\s+(?:are|re)\s+the\s+chances\s+(?:that|of)\s+",
        r"^how\s+likely\s+is\s+it\s+that\s+",
        r"^how\s+likely\s+is\s+",
        r"^give\s+me\s+(?:the\s+)?odds\s+(?:on|that|of|for)\s+",
        r"^(?:can\s+you\s+)?(?:price|quote)\s+(?:me\s+)?(?:odds\s+(?:on|that|for)\s+)?",
        r"^odds\s+(?:on|that|of|for)\s+",
        r"^chances\s+(?:that|of)\s+",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){}", p)).expect("valid boilerplate regex"))
    .collect()
});

static PUNCT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([!?.,;:])[!?.,;:]+").expect("valid punctuation regex"));

/// Clause separators searched when looking for a trailing instruction.
/// No bare hyphen: "17-0" must survive.
const CLAUSE_DELIMITERS: [&str; 9] = [" - ", " -- ", ":", ";", ",", "|", ".", "!", "?"];

/// Canonicalise raw prompt text. Never fails; may return an empty string.
pub fn normalize(raw: &str) -> String {
    let mut text = fold_unicode(raw);
    while let Some(stripped) = strip_trailing_instruction(&text) {
        text = stripped;
    }
    text = strip_leading_boilerplate(text.trim());
    text = PUNCT_RUN_RE.replace_all(&text, "$1").into_owned();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold_unicode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => out.push('"'),
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}'
            | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\u{200B}' => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

fn strip_trailing_instruction(text: &str) -> Option<String> {
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        return None;
    }

    // "(explain why)" / "[odds only]"
    if let Some(last) = trimmed.chars().last() {
        let open = match last {
            ')' => Some('('),
            ']' => Some('['),
            _ => None,
        };
        if let Some(open) = open {
            if let Some(start) = trimmed.rfind(open) {
                let inner = &trimmed[start + 1..trimmed.len() - 1];
                if INSTRUCTION_RE.is_match(inner.trim()) {
                    return Some(trimmed[..start].trim_end().to_string());
                }
            }
            return None;
        }
    }

    // "..., explain why." / "... - odds only"
    let core = trimmed.trim_end_matches(['.', '!', '?']).trim_end();
    let (idx, delim) = CLAUSE_DELIMITERS
        .iter()
        .filter_map(|d| core.rfind(d).map(|i| (i, *d)))
        .max_by_key(|(i, d)| i + d.len())?;
    let clause = core[idx + delim.len()..].trim();
    if clause.is_empty() || !INSTRUCTION_RE.is_match(clause) {
        return None;
    }
    Some(core[..idx].trim_end().to_string())
}

fn strip_leading_boilerplate(text: &str) -> String {
    for re in BOILERPLATE_RES.iter() {
        if let Some(m) = re.find(text) {
            return text[m.end()..].to_string();
        }
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_smart_quotes_and_dashes() {
        assert_eq!(normalize("Ja\u{2019}Marr Chase \u{2014} 2,000 yards"), "Ja'Marr Chase - 2,000 yards");
    }

    #[test]
    fn strips_leading_boilerplate_once() {
        assert_eq!(
            normalize("What are the odds that Josh Allen throws 30 touchdowns this season?"),
            "Josh Allen throws 30 touchdowns this season?"
        );
        assert_eq!(
            normalize("Give me odds on the Lions winning the Super Bowl"),
            "the Lions winning the Super Bowl"
        );
        // Only removed once.
        assert_eq!(normalize("odds that odds that x"), "odds that x");
    }

    #[test]
    fn strips_trailing_parenthetical_instruction() {
        assert_eq!(
            normalize("A team goes 17-0 this season (explain why)"),
            "A team goes 17-0 this season"
        );
        assert_eq!(normalize("Chiefs three-peat [odds only]"), "Chiefs three-peat");
    }

    #[test]
    fn strips_trailing_delimited_instructions_repeatedly() {
        assert_eq!(
            normalize("Derrick Henry rushes for 2000 yards this season - odds only, explain why."),
            "Derrick Henry rushes for 2000 yards this season"
        );
    }

    #[test]
    fn keeps_legitimate_trailing_content() {
        // Parenthetical that is not an instruction stays.
        assert_eq!(normalize("Lions win it all (finally)"), "Lions win it all (finally)");
        // Hyphenated records are not clauses.
        assert_eq!(normalize("A team goes 17-0"), "A team goes 17-0");
        // Clause merely containing an instruction word stays.
        assert_eq!(
            normalize("Mahomes wins MVP, explain why the Chiefs repeat"),
            "Mahomes wins MVP, explain why the Chiefs repeat"
        );
    }

    #[test]
    fn collapses_punctuation_and_whitespace() {
        assert_eq!(normalize("  Will   he do it?!?!  "), "Will he do it?");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }
}
