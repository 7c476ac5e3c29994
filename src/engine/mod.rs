//! Estimation pipeline.
//!
//! normalize → intent → {baseline | stat claim → rate model → tail} → odds →
//! consistency repair. Career outlooks bypass the claim path and go straight
//! to the outcome builder.

pub mod baseline;
pub mod calibration;
pub mod consistency;
pub mod intent;
pub mod normalize;
pub mod odds;
pub mod outcomes;
pub mod rate_model;
pub mod stat_claim;
pub mod stats;
pub mod tail;
pub mod tiers;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::data::models::{PlayerProfile, PositionGroup};
use crate::data::DatasetCache;

use baseline::{detect_baseline_event, horizon_adjusted_probability, BaselineEvent};
use calibration::Calibration;
use consistency::{impossible_estimate, is_impossible, repair, CompanionEstimate};
use intent::{extract_player_name, parse_intent, Horizon, Intent};
use normalize::normalize;
use odds::{format_implied_probability, to_american_odds};
use outcomes::{
    build_count_distribution, career_outlook, decayed_season_probabilities, expected_remaining_seasons,
    milestone_probability, position_hazard, CareerOutlook, CountDistribution, DEFAULT_AGE, MAX_MODELED_SEASONS,
};
use rate_model::{rate, ModelType, RateModelResult};
use stat_claim::{parse_season_stat_intent, Metric, Scope, StatClaim};
use stats::{clamp_pct, MIN_PCT};
use tail::{tail_estimate, tail_probability, TailFamily};

/// A stat claim this many times the metric's plausible maximum is a joke, not a question.
const ABSURD_THRESHOLD_FACTOR: f64 = 3.0;
const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    Refused,
    Snark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    HistoricalModel,
    ConstraintModel,
}

/// Diagnostic fields for observability. Not a stable contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateTrace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizon: Option<Horizon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_probability_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<ModelType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_seasons: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reliability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail_family: Option<TailFamily>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispersion: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub repairs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub status: Status,
    pub odds: String,
    pub implied_probability: String,
    pub confidence: Confidence,
    pub assumptions: Vec<String>,
    pub source_type: SourceType,
    pub source_label: String,
    pub trace: EstimateTrace,
    /// The probability both `odds` and `implied_probability` were derived from.
    #[serde(skip)]
    pub probability_pct: f64,
}

impl Estimate {
    pub fn from_probability(
        pct: f64,
        confidence: Confidence,
        assumptions: Vec<String>,
        source_type: SourceType,
        source_label: impl Into<String>,
        trace: EstimateTrace,
    ) -> Self {
        let mut estimate = Estimate {
            status: Status::Ok,
            odds: String::new(),
            implied_probability: String::new(),
            confidence,
            assumptions,
            source_type,
            source_label: source_label.into(),
            trace,
            probability_pct: 0.0,
        };
        estimate.set_probability(pct);
        estimate
    }

    pub fn refused(reason: &str) -> Self {
        Estimate {
            status: Status::Refused,
            odds: NOT_APPLICABLE.to_string(),
            implied_probability: NOT_APPLICABLE.to_string(),
            confidence: Confidence::Low,
            assumptions: vec![reason.to_string()],
            source_type: SourceType::ConstraintModel,
            source_label: "Request declined".to_string(),
            trace: EstimateTrace::default(),
            probability_pct: 0.0,
        }
    }

    pub fn snark(message: String, trace: EstimateTrace) -> Self {
        let mut estimate = Estimate::from_probability(
            MIN_PCT,
            Confidence::High,
            vec![message],
            SourceType::ConstraintModel,
            "Sanity check",
            trace,
        );
        estimate.status = Status::Snark;
        estimate
    }

    /// Odds and implied probability always move together.
    fn set_probability(&mut self, pct: f64) {
        self.probability_pct = pct;
        self.odds = to_american_odds(pct);
        self.implied_probability = format_implied_probability(pct);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneOutlook {
    pub player: String,
    pub metric: Metric,
    pub target: f64,
    pub current: f64,
    pub per_season_rate: f64,
    pub probability_pct: f64,
}

/// Engine input. Everything but the prompt is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub prompt: String,
    #[serde(default)]
    pub profile: Option<PlayerProfile>,
    #[serde(default)]
    pub intent: Option<Intent>,
    #[serde(default)]
    pub calibration: Option<Calibration>,
    #[serde(default)]
    pub as_of_date: Option<NaiveDate>,
}

impl EstimateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        EstimateRequest {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

pub struct Engine {
    datasets: Arc<DatasetCache>,
    calibration: Calibration,
}

impl Engine {
    pub fn new(datasets: Arc<DatasetCache>, calibration: Calibration) -> Self {
        Engine {
            datasets,
            calibration,
        }
    }

    /// Run the pipeline. `None` means no estimator recognised the prompt.
    pub fn estimate(&self, req: &EstimateRequest) -> Option<Estimate> {
        let text = normalize(&req.prompt);
        if text.is_empty() {
            return Some(Estimate::refused("Empty prompt: nothing to price"));
        }
        let intent = req.intent.clone().unwrap_or_else(|| parse_intent(&text));
        if intent.is_betting_advice {
            return Some(Estimate::refused(
                "Entertainment-grade estimates only; this is not betting advice",
            ));
        }
        if is_impossible(&text) {
            info!("Impossible prompt, no estimator needed: {}", text);
            return Some(impossible_estimate(&intent));
        }
        let cal = req.calibration.as_ref().unwrap_or(&self.calibration);
        let as_of = req.as_of_date.unwrap_or_else(|| Utc::now().date_naive());

        let (estimate, companion) = if let Some(event) = detect_baseline_event(&text) {
            self.price_baseline(event, &intent, cal)
        } else if let Some(claim) = parse_season_stat_intent(&text) {
            if !intent.league.allows_nfl_stats() {
                debug!("Stat claim outside the NFL ({:?}): {}", intent.league, text);
                return None;
            }
            self.price_stat_claim(&text, claim, req, &intent, cal, as_of)?
        } else {
            debug!("No estimator matched: {}", text);
            return None;
        };

        Some(repair(&text, &intent, estimate, companion.as_ref()))
    }

    fn price_baseline(
        &self,
        event: BaselineEvent,
        intent: &Intent,
        cal: &Calibration,
    ) -> (Estimate, Option<CompanionEstimate>) {
        let season_pct = event.season_probability_pct;
        let pct = horizon_adjusted_probability(season_pct, intent.horizon, intent.horizon_years, &cal.horizon);

        let mut assumptions = event.assumptions;
        let confidence = match intent.horizon {
            Horizon::Season | Horizon::Unspecified => Confidence::High,
            Horizon::Career | Horizon::Ever | Horizon::MultiYear => {
                assumptions.push(format!(
                    "Season probability {:.2}% compounded over the {} horizon",
                    season_pct,
                    horizon_label(intent.horizon)
                ));
                Confidence::Medium
            }
        };

        let trace = EstimateTrace {
            baseline_key: Some(event.key),
            horizon: Some(intent.horizon),
            season_probability_pct: Some(season_pct),
            ..Default::default()
        };
        let estimate = Estimate::from_probability(
            pct,
            confidence,
            assumptions,
            SourceType::HistoricalModel,
            "Baseline event library",
            trace,
        );
        let companion = CompanionEstimate {
            season_probability_pct: season_pct,
        };
        (estimate, Some(companion))
    }

    fn price_stat_claim(
        &self,
        text: &str,
        claim: StatClaim,
        req: &EstimateRequest,
        intent: &Intent,
        cal: &Calibration,
        as_of: NaiveDate,
    ) -> Option<(Estimate, Option<CompanionEstimate>)> {
        let profile = self.resolve_profile(req.profile.as_ref(), text, intent, claim.metric)?;

        let mut trace = EstimateTrace {
            horizon: Some(intent.horizon),
            metric: Some(claim.metric),
            threshold: Some(claim.threshold),
            scope: Some(claim.scope),
            ..Default::default()
        };

        if claim.threshold > ABSURD_THRESHOLD_FACTOR * claim.metric.plausible_max(claim.scope) {
            let message = format!(
                "{} {} is more than triple anything plausible. Sure, and pigs fly.",
                claim.threshold,
                claim.metric.label()
            );
            return Some((Estimate::snark(message, trace), None));
        }

        let meta = rate(&profile, claim.metric, cal, as_of, &self.datasets);
        let tail = tail_estimate(meta.lambda, claim.metric, claim.threshold, claim.scope, &meta, &cal.tail);
        let season_pct = tail.probability_pct;

        let mut assumptions = claim_assumptions(&profile, &claim, &meta, tail.family);
        let pct = match intent.horizon {
            Horizon::Career | Horizon::Ever | Horizon::MultiYear => {
                let seasons = match (intent.horizon, intent.horizon_years) {
                    (Horizon::MultiYear, Some(years)) => years.max(1),
                    _ => remaining_seasons(&profile, cal),
                };
                let per_season = decayed_season_probabilities(season_pct / 100.0, cal.career.stat_season_decay(), seasons);
                let compounded = build_count_distribution(&per_season, cal.career.max_count()).at_least_one_pct();
                assumptions.push(format!(
                    "At least one qualifying season in the next {} (aging decay {:.2}/yr)",
                    seasons,
                    cal.career.stat_season_decay()
                ));
                clamp_pct(compounded.max(season_pct))
            }
            Horizon::Season | Horizon::Unspecified => season_pct,
        };

        let confidence = if tail.family == TailFamily::PositionMismatch {
            Confidence::High
        } else if meta.is_fallback() {
            Confidence::Low
        } else if meta.reliability >= 0.7 && meta.stale_years == 0 {
            Confidence::High
        } else {
            Confidence::Medium
        };

        trace.season_probability_pct = Some(season_pct);
        trace.lambda = Some(meta.lambda);
        trace.model_type = Some(meta.model_type);
        trace.sample_seasons = Some(meta.sample_seasons);
        trace.reliability = Some(meta.reliability);
        trace.stale_years = Some(meta.stale_years);
        trace.tail_family = Some(tail.family);
        trace.sigma = tail.sigma;
        trace.dispersion = tail.dispersion;

        let estimate = Estimate::from_probability(
            pct,
            confidence,
            assumptions,
            SourceType::HistoricalModel,
            "Historical rate model",
            trace,
        );
        let companion = CompanionEstimate {
            season_probability_pct: season_pct,
        };
        Some((estimate, Some(companion)))
    }

    /// Profile from the request, or one inferred from a name in the prompt.
    /// Missing positions come from the datasets, then from the metric itself.
    fn resolve_profile(
        &self,
        given: Option<&PlayerProfile>,
        text: &str,
        intent: &Intent,
        metric: Metric,
    ) -> Option<PlayerProfile> {
        let mut profile = match given {
            Some(p) if !p.name.trim().is_empty() => p.clone(),
            _ if intent.is_player_prompt => PlayerProfile {
                name: extract_player_name(text)?,
                ..Default::default()
            },
            _ => return None,
        };
        self.fill_position(&mut profile, metric);
        Some(profile)
    }

    fn fill_position(&self, profile: &mut PlayerProfile, metric: Metric) {
        if profile.position.trim().is_empty() {
            profile.position = self.infer_position(&profile.name, metric).label().to_string();
        }
    }

    fn infer_position(&self, name: &str, metric: Metric) -> PositionGroup {
        if self.datasets.qb().player(name).is_some() {
            return PositionGroup::Quarterback;
        }
        if let Some(group) = self
            .datasets
            .skill()
            .player(name)
            .and_then(|p| p.position.as_deref())
            .map(PositionGroup::from_label)
        {
            return group;
        }
        if let Some(group) = tiers::listed_position(name) {
            return group;
        }
        match metric {
            Metric::PassingTds | Metric::PassingYards | Metric::PassingInterceptions => PositionGroup::Quarterback,
            Metric::ReceivingTds | Metric::ReceivingYards | Metric::Receptions => PositionGroup::WideReceiver,
            Metric::RushingTds | Metric::RushingYards | Metric::ScrimmageYards | Metric::TotalTds => {
                PositionGroup::RunningBack
            }
        }
    }

    pub fn career_outlook(
        &self,
        profile: &PlayerProfile,
        calibration: Option<&Calibration>,
        as_of: Option<NaiveDate>,
    ) -> CareerOutlook {
        let cal = calibration.unwrap_or(&self.calibration);
        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
        let outlook = career_outlook(profile, upcoming_season(as_of), &cal.career);
        info!(
            "Career outlook for {}: {:.1} expected seasons",
            profile.name, outlook.expected_remaining_seasons
        );
        outlook
    }

    /// Distribution of future seasons in which `metric` clears `threshold`.
    pub fn stat_season_projection(
        &self,
        profile: &PlayerProfile,
        metric: Metric,
        threshold: f64,
        years: u32,
        as_of: Option<NaiveDate>,
    ) -> CountDistribution {
        let cal = &self.calibration;
        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
        let mut profile = profile.clone();
        self.fill_position(&mut profile, metric);
        let meta = rate(&profile, metric, cal, as_of, &self.datasets);
        let p = tail_probability(meta.lambda, metric, threshold, Scope::Season, &meta, &cal.tail) / 100.0;
        let per_season = decayed_season_probabilities(p, cal.career.stat_season_decay(), years.max(1));
        build_count_distribution(&per_season, cal.career.max_count())
    }

    /// Chance of reaching a cumulative career total. Without `current`, the
    /// qualifying seasons on file are summed.
    pub fn milestone_outlook(
        &self,
        profile: &PlayerProfile,
        metric: Metric,
        target: f64,
        current: Option<f64>,
        as_of: Option<NaiveDate>,
    ) -> MilestoneOutlook {
        let cal = &self.calibration;
        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
        let mut profile = profile.clone();
        self.fill_position(&mut profile, metric);
        let meta = rate(&profile, metric, cal, as_of, &self.datasets);
        let current = current.unwrap_or_else(|| meta.history.iter().sum());
        let age = profile.age.unwrap_or(DEFAULT_AGE) as f64;
        let hazard = position_hazard(profile.position_group()) * cal.career.retirement_hazard_scale();
        let probability_pct = milestone_probability(current, target, meta.lambda, age, hazard);
        info!(
            "Milestone {} {} {}: {:.1}%",
            profile.name,
            target,
            metric.label(),
            probability_pct
        );
        MilestoneOutlook {
            player: profile.name,
            metric,
            target,
            current,
            per_season_rate: meta.lambda,
            probability_pct,
        }
    }
}

fn remaining_seasons(profile: &PlayerProfile, cal: &Calibration) -> u32 {
    let Some(age) = profile.age else {
        return cal.horizon.career_years();
    };
    let hazard = position_hazard(profile.position_group()) * cal.career.retirement_hazard_scale();
    (expected_remaining_seasons(age as f64, hazard).round() as u32).clamp(1, MAX_MODELED_SEASONS)
}

/// The first season an outlook covers. A season straddling New Year is
/// labelled by its kickoff year, and the outlook includes one in progress.
fn upcoming_season(as_of: NaiveDate) -> i32 {
    if as_of.month() <= 2 {
        as_of.year() - 1
    } else {
        as_of.year()
    }
}

fn horizon_label(horizon: Horizon) -> &'static str {
    match horizon {
        Horizon::Season => "season",
        Horizon::Career => "career",
        Horizon::Ever => "all-time",
        Horizon::MultiYear => "multi-year",
        Horizon::Unspecified => "unspecified",
    }
}

fn claim_assumptions(profile: &PlayerProfile, claim: &StatClaim, meta: &RateModelResult, family: TailFamily) -> Vec<String> {
    if family == TailFamily::PositionMismatch {
        return vec![format!(
            "{} is listed at {}, not quarterback; passing claims are priced as near-impossible",
            profile.name,
            profile.position_group().label()
        )];
    }
    let mut out = vec![format!(
        "{} projects for {:.1} {} per season",
        profile.name,
        meta.lambda,
        claim.metric.label()
    )];
    if claim.scope == Scope::Game {
        out.push("Single-game mean is the season rate divided by 17".to_string());
    }
    if meta.is_fallback() {
        out.push("No usable history on file; tier and positional priors only".to_string());
    } else {
        out.push(format!(
            "Blended from {} qualifying season(s), reliability {:.2}",
            meta.sample_seasons, meta.reliability
        ));
    }
    if meta.stale_years > 0 {
        out.push(format!("Most recent season on file is {} year(s) old", meta.stale_years));
    }
    if meta.trend_boost > 0.0 {
        out.push(format!("Breakout trend carried forward (+{:.0}%)", meta.trend_boost * 100.0));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::{PlayerSeasons, QbSeason, SeasonDataset};
    use approx::assert_relative_eq;
    use super::odds::NO_CHANCE;
    use std::collections::HashMap;

    fn engine() -> Engine {
        Engine::new(Arc::new(DatasetCache::from_datasets(Default::default(), Default::default())), Calibration::default())
    }

    fn request(prompt: &str) -> EstimateRequest {
        EstimateRequest {
            as_of_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            ..EstimateRequest::new(prompt)
        }
    }

    #[test]
    fn generic_quarterback_threshold_is_a_high_confidence_lock() {
        let est = engine()
            .estimate(&request("A quarterback throws for 20 touchdowns this season"))
            .unwrap();
        assert_eq!(est.status, Status::Ok);
        assert!(est.probability_pct >= 90.0);
        assert_eq!(est.confidence, Confidence::High);
        assert!(est.odds.starts_with('-'));
        assert_eq!(est.trace.baseline_key.as_deref(), Some("qb_season_passing_tds"));
    }

    #[test]
    fn ever_is_never_rarer_than_season() {
        let e = engine();
        let season = e
            .estimate(&request("A team goes 17-0 in the NFL regular season this year"))
            .unwrap();
        let ever = e
            .estimate(&request("A team ever goes 17-0 in the NFL regular season"))
            .unwrap();
        assert!(ever.probability_pct >= season.probability_pct);
        assert_eq!(ever.confidence, Confidence::Medium);
    }

    #[test]
    fn deceased_athlete_comeback_is_no_chance() {
        let est = engine()
            .estimate(&request("What are the odds Walter Payton comes out of retirement?"))
            .unwrap();
        assert_eq!(est.status, Status::Ok);
        assert_eq!(est.odds, NO_CHANCE);
        assert_eq!(est.source_type, SourceType::ConstraintModel);
    }

    #[test]
    fn non_quarterback_passing_claim_is_near_zero() {
        let req = EstimateRequest {
            profile: Some(PlayerProfile {
                name: "Christian McCaffrey".into(),
                position: "RB".into(),
                ..Default::default()
            }),
            ..request("Christian McCaffrey throws 30 touchdowns this season")
        };
        let est = engine().estimate(&req).unwrap();
        assert_eq!(est.status, Status::Ok);
        assert_relative_eq!(est.probability_pct, 0.1, epsilon = 1e-9);
        assert_eq!(est.implied_probability, "0.1%");
        assert_eq!(est.trace.tail_family, Some(TailFamily::PositionMismatch));
    }

    #[test]
    fn refusals() {
        let e = engine();
        assert_eq!(e.estimate(&request("   ")).unwrap().status, Status::Refused);
        let advice = e.estimate(&request("Should I bet on the Lions to go 17-0?")).unwrap();
        assert_eq!(advice.status, Status::Refused);
        assert_eq!(advice.odds, NOT_APPLICABLE);
    }

    #[test]
    fn absurd_claims_get_snark() {
        let est = engine()
            .estimate(&request("Josh Allen throws 200 touchdowns this season"))
            .unwrap();
        assert_eq!(est.status, Status::Snark);
        assert_relative_eq!(est.probability_pct, MIN_PCT);
    }

    #[test]
    fn record_pace_single_game_touchdowns_are_priced() {
        let e = engine();
        for prompt in [
            "Ja'Marr Chase catches 4 touchdowns in a game this season",
            "Josh Jacobs scores 5 touchdowns in a game this season",
            "Derrick Henry rushes for 5 touchdowns in a game this season",
        ] {
            let est = e.estimate(&request(prompt)).unwrap();
            assert_eq!(est.status, Status::Ok, "{prompt}");
            assert_eq!(est.trace.scope, Some(Scope::Game), "{prompt}");
            assert!(est.probability_pct < 10.0, "{prompt}: {}", est.probability_pct);
        }
        let joke = e
            .estimate(&request("Ja'Marr Chase catches 20 touchdowns in a game this season"))
            .unwrap();
        assert_eq!(joke.status, Status::Snark);
    }

    #[test]
    fn impossible_prompts_resolve_without_an_estimator() {
        let e = engine();
        for prompt in [
            "The late Kobe Bryant suits up for the Lakers this season",
            "Walter Payton plays in the NFL this season",
            "Sean Taylor signs with the Commanders",
        ] {
            let est = e.estimate(&request(prompt)).unwrap();
            assert_eq!(est.status, Status::Ok, "{prompt}");
            assert_eq!(est.odds, NO_CHANCE, "{prompt}");
            assert_eq!(est.source_type, SourceType::ConstraintModel, "{prompt}");
        }
    }

    #[test]
    fn listed_running_back_without_profile_is_not_a_passer() {
        let est = engine()
            .estimate(&request("Christian McCaffrey throws 30 touchdowns this season"))
            .unwrap();
        assert_relative_eq!(est.probability_pct, 0.1, epsilon = 1e-9);
        assert_eq!(est.trace.tail_family, Some(TailFamily::PositionMismatch));
    }

    #[test]
    fn unrecognised_prompt_yields_none() {
        assert!(engine().estimate(&request("It snows in Miami on Christmas")).is_none());
        // A stat claim with no player to attach it to.
        assert!(engine().estimate(&request("throws 30 touchdowns this season")).is_none());
        // Box-score claims only price NFL lines.
        assert!(engine().estimate(&request("LeBron James catches 10 passes in a game this NBA season")).is_none());
    }

    #[test]
    fn odds_and_implied_probability_agree() {
        let e = engine();
        for prompt in [
            "Super Bowl goes to overtime",
            "Justin Jefferson has 1,800 receiving yards this season",
            "Derrick Henry rushes for 150 yards in a game this season",
            "A team goes 12-5 this season",
        ] {
            let est = e.estimate(&request(prompt)).unwrap();
            let back = odds::from_american_odds(&est.odds).unwrap();
            assert!((back - est.probability_pct).abs() < 0.13, "{prompt}: {} vs {}", est.odds, est.probability_pct);
            assert_eq!(est.implied_probability, format_implied_probability(est.probability_pct));
        }
    }

    fn engine_with_passer() -> Engine {
        let seasons = vec![
            QbSeason { season: 2025, games: 17, attempts: 590, completions: 400, passing_yards: 4600.0, passing_tds: 36.0, interceptions: 10.0 },
            QbSeason { season: 2024, games: 17, attempts: 580, completions: 390, passing_yards: 4450.0, passing_tds: 34.0, interceptions: 12.0 },
            QbSeason { season: 2023, games: 17, attempts: 570, completions: 380, passing_yards: 4300.0, passing_tds: 32.0, interceptions: 11.0 },
        ];
        let players = HashMap::from([(
            "test passer".to_string(),
            PlayerSeasons { player_name: "Test Passer".into(), position: Some("QB".into()), seasons },
        )]);
        let qb = SeasonDataset { latest_season: 2025, players, ..Default::default() };
        Engine::new(Arc::new(DatasetCache::from_datasets(qb, Default::default())), Calibration::default())
    }

    #[test]
    fn dataset_player_gets_history_model_and_confidence() {
        let est = engine_with_passer()
            .estimate(&request("Test Passer throws 30 touchdowns this season"))
            .unwrap();
        assert_eq!(est.trace.model_type, Some(ModelType::PlayerHistoryBlended));
        assert_eq!(est.confidence, Confidence::High);
        assert!(est.probability_pct > 60.0, "p {}", est.probability_pct);
    }

    #[test]
    fn unknown_player_falls_back_with_low_confidence() {
        let est = engine()
            .estimate(&request("Zed Nobody throws 30 touchdowns this season"))
            .unwrap();
        assert_eq!(est.trace.model_type, Some(ModelType::TierFallback));
        assert_eq!(est.confidence, Confidence::Low);
    }

    #[test]
    fn career_framed_stat_claim_is_at_least_the_season_number() {
        let e = engine_with_passer();
        let season = e.estimate(&request("Test Passer throws 45 touchdowns this season")).unwrap();
        let ever = e.estimate(&request("Test Passer ever throws 45 touchdowns in a season")).unwrap();
        assert!(ever.probability_pct >= season.probability_pct);
    }

    #[test]
    fn stat_season_projection_conserves_mass() {
        let profile = PlayerProfile { name: "Test Passer".into(), position: "QB".into(), ..Default::default() };
        let d = engine_with_passer().stat_season_projection(&profile, Metric::PassingTds, 30.0, 6, NaiveDate::from_ymd_opt(2026, 3, 1));
        let total: f64 = d.distribution.iter().map(|b| b.probability_pct).sum();
        assert_relative_eq!(total, 100.0, epsilon = 1e-8);
        assert!(d.expected_count > 1.0);
    }

    #[test]
    fn stat_season_projection_infers_listed_position() {
        let profile = PlayerProfile { name: "Christian McCaffrey".into(), ..Default::default() };
        let d = engine().stat_season_projection(&profile, Metric::PassingTds, 20.0, 5, NaiveDate::from_ymd_opt(2026, 3, 1));
        assert!(d.expected_count < 0.01, "expected {}", d.expected_count);
    }

    #[test]
    fn milestone_counts_seasons_on_file() {
        let e = engine_with_passer();
        let profile = PlayerProfile { name: "Test Passer".into(), position: "QB".into(), age: Some(28), ..Default::default() };
        let as_of = NaiveDate::from_ymd_opt(2026, 3, 1);

        let near = e.milestone_outlook(&profile, Metric::PassingTds, 150.0, None, as_of);
        assert_relative_eq!(near.current, 102.0);
        assert!(near.per_season_rate > 25.0);
        let far = e.milestone_outlook(&profile, Metric::PassingTds, 400.0, None, as_of);
        assert!(far.probability_pct < near.probability_pct, "far {} near {}", far.probability_pct, near.probability_pct);

        let reached = e.milestone_outlook(&profile, Metric::PassingTds, 100.0, None, as_of);
        assert_relative_eq!(reached.probability_pct, 99.9);
        let supplied = e.milestone_outlook(&profile, Metric::PassingTds, 150.0, Some(149.0), as_of);
        assert_relative_eq!(supplied.current, 149.0);
        assert!(supplied.probability_pct >= near.probability_pct);
    }

    #[test]
    fn career_outlook_uses_upcoming_season() {
        let profile = PlayerProfile { name: "Test Passer".into(), position: "QB".into(), age: Some(28), ..Default::default() };
        let outlook = engine().career_outlook(&profile, None, NaiveDate::from_ymd_opt(2026, 10, 1));
        assert_eq!(outlook.first_season, 2026);
        assert_eq!(outlook.position, "QB");
    }

    #[test]
    fn request_deserializes_from_camel_case_json() {
        let req: EstimateRequest = serde_json::from_str(
            r#"{"prompt": "x", "profile": {"name": "A B", "position": "WR", "yearsExp": 2}, "asOfDate": "2026-03-01"}"#,
        )
        .unwrap();
        assert_eq!(req.profile.unwrap().years_exp, Some(2));
        assert_eq!(req.as_of_date, NaiveDate::from_ymd_opt(2026, 3, 1));
    }
}
