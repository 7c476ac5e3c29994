//! Historical rate model.
//!
//! Produces the expected per-season value ("lambda") of a metric for a
//! player. Passing metrics go down the quarterback track, everything else
//! down the skill-position track. Both tracks share the same shape:
//!
//! 1. Qualifying seasons (on or before the reference season, enough games)
//!    are paced to 17 games.
//! 2. A recency-weighted mean over the three most recent seasons is blended
//!    with the career mean.
//! 3. The history estimate is blended toward a tier or positional fallback
//!    by a reliability weight that grows with sample depth and volume and
//!    decays with staleness.
//!
//! Missing players and empty datasets fall straight through to the fallback.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::models::{PlayerProfile, PositionGroup, QbSeason, SkillSeason};
use crate::data::DatasetCache;

use super::calibration::{Calibration, QbCalibration, SkillCalibration};
use super::stat_claim::Metric;
use super::tiers::{is_listed, qb_tier_for, tier_multiplier};

pub const GAMES_PER_SEASON: f64 = 17.0;
const MIN_QUALIFYING_GAMES: u32 = 4;
const MIN_QUALIFYING_ATTEMPTS: u32 = 100;
const MIN_RELIABILITY: f64 = 0.05;
const MAX_RELIABILITY: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QbTier {
    Elite,
    Good,
    Average,
    Low,
}

impl QbTier {
    /// Tier implied by a paced passing-touchdown rate.
    fn from_td_pace(td_pace: f64) -> Self {
        if td_pace >= 32.0 {
            QbTier::Elite
        } else if td_pace >= 26.0 {
            QbTier::Good
        } else if td_pace >= 18.0 {
            QbTier::Average
        } else {
            QbTier::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    TierFallback,
    PlayerHistoryBlended,
    SkillHistoryBlended,
    SkillFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateModelResult {
    pub lambda: f64,
    pub model_type: ModelType,
    pub sample_seasons: u32,
    pub reliability: f64,
    pub stale_years: u32,
    pub is_quarterback: bool,
    pub tier: Option<QbTier>,
    pub starter_factor: f64,
    pub durability_factor: f64,
    pub trend_boost: f64,
    /// Raw (unpaced) season totals of the metric, most recent first.
    pub history: Vec<f64>,
    pub recent_games: Option<u32>,
}

impl RateModelResult {
    pub fn is_fallback(&self) -> bool {
        matches!(self.model_type, ModelType::TierFallback | ModelType::SkillFallback)
    }

    fn fallback(lambda: f64, model_type: ModelType, is_quarterback: bool) -> Self {
        RateModelResult {
            lambda,
            model_type,
            sample_seasons: 0,
            reliability: 0.0,
            stale_years: 0,
            is_quarterback,
            tier: None,
            starter_factor: 1.0,
            durability_factor: 1.0,
            trend_boost: 0.0,
            history: Vec::new(),
            recent_games: None,
        }
    }
}

/// Expected season value of `metric` for `profile` as of `as_of`.
pub fn rate(
    profile: &PlayerProfile,
    metric: Metric,
    cal: &Calibration,
    as_of: NaiveDate,
    datasets: &DatasetCache,
) -> RateModelResult {
    let result = if metric.is_passing() {
        qb_rate(profile, metric, &cal.qb, as_of, datasets)
    } else {
        skill_rate(profile, metric, &cal.skill, as_of, datasets)
    };
    debug!(
        "Rate model {} / {}: lambda={:.2} model={:?} seasons={} rel={:.2} stale={}",
        profile.name,
        metric.label(),
        result.lambda,
        result.model_type,
        result.sample_seasons,
        result.reliability,
        result.stale_years
    );
    result
}

/// Latest completed season usable at `as_of`, capped by what the dataset holds.
pub fn reference_season(latest_in_dataset: i32, as_of: NaiveDate) -> i32 {
    let last_completed = as_of.year() - 1;
    if latest_in_dataset > 0 {
        latest_in_dataset.min(last_completed)
    } else {
        last_completed
    }
}

/// Scale a season total to a full 17-game pace.
pub fn pace(total: f64, games: u32) -> f64 {
    if games == 0 {
        return 0.0;
    }
    total * GAMES_PER_SEASON / games as f64
}

pub fn clamp_lambda(metric: Metric, lambda: f64) -> f64 {
    let (lo, hi) = metric.sane_bounds();
    if lambda.is_finite() {
        lambda.clamp(lo, hi)
    } else {
        lo
    }
}

/// Recency-weighted mean of the (most-recent-first) values, blended with
/// their long-run mean.
fn recency_blend(values: &[f64], weights: [f64; 3], career_blend: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len().min(weights.len());
    let weight_sum: f64 = weights[..n].iter().sum();
    let recent = if weight_sum > 0.0 {
        values[..n]
            .iter()
            .zip(weights.iter())
            .map(|(v, w)| v * w)
            .sum::<f64>()
            / weight_sum
    } else {
        values[0]
    };
    let career = values.iter().sum::<f64>() / values.len() as f64;
    (1.0 - career_blend) * recent + career_blend * career
}

fn reliability(base: f64, per_season: f64, seasons: usize, volume_share: f64, decay: f64, stale: u32) -> f64 {
    let depth = (base + per_season * seasons.saturating_sub(1) as f64).min(1.0);
    let volume = volume_share.clamp(0.3, 1.0);
    (depth * volume * decay.powi(stale as i32)).clamp(MIN_RELIABILITY, MAX_RELIABILITY)
}

// ── Quarterback track ────────────────────────────────────────────────────────

fn qb_value(season: &QbSeason, metric: Metric) -> f64 {
    match metric {
        Metric::PassingTds => season.passing_tds,
        Metric::PassingYards => season.passing_yards,
        Metric::PassingInterceptions => season.interceptions,
        _ => 0.0,
    }
}

fn qb_fallback_lambda(metric: Metric, tier: QbTier, experience: f64, cal: &QbCalibration) -> f64 {
    match metric {
        Metric::PassingTds => cal.tier_td_mean(tier) * experience,
        Metric::PassingYards => cal.starter_attempts() * experience * cal.tier_yards_per_attempt(tier),
        Metric::PassingInterceptions => cal.tier_interception_mean(tier) * experience,
        other => positional_prior(PositionGroup::Quarterback, other),
    }
}

/// Availability and volume of the most recent season relative to a full-time starter.
fn qb_starter_factor(recent: &QbSeason, cal: &QbCalibration) -> f64 {
    let availability = (recent.games as f64 / GAMES_PER_SEASON).min(1.0);
    let volume = (pace(recent.attempts as f64, recent.games) / cal.starter_attempts()).min(1.05);
    (0.5 * availability + 0.5 * volume).clamp(0.5, 1.05)
}

fn qb_rate(
    profile: &PlayerProfile,
    metric: Metric,
    cal: &QbCalibration,
    as_of: NaiveDate,
    datasets: &DatasetCache,
) -> RateModelResult {
    let dataset = datasets.qb();
    let reference = reference_season(dataset.latest_season, as_of);
    let mut seasons: Vec<&QbSeason> = dataset
        .player(&profile.name)
        .map(|p| {
            p.seasons
                .iter()
                .filter(|s| {
                    s.season <= reference
                        && s.games >= MIN_QUALIFYING_GAMES
                        && s.attempts >= MIN_QUALIFYING_ATTEMPTS
                })
                .collect()
        })
        .unwrap_or_default();
    seasons.sort_by(|a, b| b.season.cmp(&a.season));

    let experience = cal.experience_starter_factor(profile.years_exp);
    let is_quarterback = profile.is_quarterback();

    let Some(recent) = seasons.first().copied() else {
        let tier = qb_tier_for(&profile.name);
        let lambda = qb_fallback_lambda(metric, tier, experience, cal);
        return RateModelResult {
            tier: Some(tier),
            starter_factor: experience,
            ..RateModelResult::fallback(clamp_lambda(metric, lambda), ModelType::TierFallback, is_quarterback)
        };
    };

    let weights = cal.recency_weights();
    let blend = cal.career_blend();
    let stale_years = (reference - recent.season).max(0) as u32;

    let td_pace: Vec<f64> = seasons.iter().map(|s| pace(s.passing_tds, s.games)).collect();
    let tier = if is_listed(&profile.name) {
        qb_tier_for(&profile.name)
    } else {
        QbTier::from_td_pace(recency_blend(&td_pace, weights, blend))
    };

    let starter_factor = qb_starter_factor(recent, cal);
    let rel = reliability(
        cal.reliability_base(),
        cal.reliability_per_season(),
        seasons.len(),
        recent.attempts as f64 / cal.reliability_volume_attempts(),
        cal.stale_decay(),
        stale_years,
    );

    let lambda = match metric {
        Metric::PassingYards => {
            // Attempts × yards-per-attempt, each blended toward its own prior.
            let attempt_pace: Vec<f64> = seasons.iter().map(|s| pace(s.attempts as f64, s.games)).collect();
            let player_attempts = recency_blend(&attempt_pace, weights, blend) * starter_factor;
            let ypa: Vec<f64> = seasons
                .iter()
                .map(|s| s.passing_yards / s.attempts.max(1) as f64)
                .collect();
            let player_ypa = recency_blend(&ypa, weights, blend);
            let attempts = rel * player_attempts + (1.0 - rel) * cal.starter_attempts() * experience;
            let ypa = rel * player_ypa + (1.0 - rel) * cal.tier_yards_per_attempt(tier);
            attempts * ypa
        }
        _ => {
            let paced: Vec<f64> = seasons.iter().map(|s| pace(qb_value(s, metric), s.games)).collect();
            let history = recency_blend(&paced, weights, blend) * starter_factor;
            let fallback = qb_fallback_lambda(metric, tier, experience, cal);
            rel * history + (1.0 - rel) * fallback
        }
    };

    RateModelResult {
        lambda: clamp_lambda(metric, lambda),
        model_type: ModelType::PlayerHistoryBlended,
        sample_seasons: seasons.len() as u32,
        reliability: rel,
        stale_years,
        is_quarterback,
        tier: Some(tier),
        starter_factor,
        durability_factor: 1.0,
        trend_boost: 0.0,
        history: seasons.iter().map(|s| qb_value(s, metric)).collect(),
        recent_games: Some(recent.games),
    }
}

// ── Skill-position track ─────────────────────────────────────────────────────

fn skill_value(season: &SkillSeason, metric: Metric) -> f64 {
    match metric {
        Metric::RushingTds => season.rushing_tds,
        Metric::RushingYards => season.rushing_yards,
        Metric::ReceivingTds => season.receiving_tds,
        Metric::ReceivingYards => season.receiving_yards,
        Metric::Receptions => season.receptions,
        Metric::ScrimmageYards => season.scrimmage_yards(),
        Metric::TotalTds => season.total_tds(),
        _ => 0.0,
    }
}

/// League-typical season for a starter at each position group.
pub fn positional_prior(group: PositionGroup, metric: Metric) -> f64 {
    // rush yds, rush td, rec yds, rec td, receptions
    let (ry, rt, cy, ct, rec) = match group {
        PositionGroup::RunningBack => (700.0, 5.0, 250.0, 1.2, 30.0),
        PositionGroup::WideReceiver => (15.0, 0.1, 750.0, 5.0, 60.0),
        PositionGroup::TightEnd => (2.0, 0.05, 500.0, 3.5, 45.0),
        PositionGroup::Quarterback => (250.0, 2.5, 0.0, 0.0, 0.0),
        PositionGroup::Kicker | PositionGroup::Other => (20.0, 0.2, 50.0, 0.3, 5.0),
    };
    match metric {
        Metric::RushingYards => ry,
        Metric::RushingTds => rt,
        Metric::ReceivingYards => cy,
        Metric::ReceivingTds => ct,
        Metric::Receptions => rec,
        Metric::ScrimmageYards => ry + cy,
        Metric::TotalTds => rt + ct,
        Metric::PassingTds | Metric::PassingYards | Metric::PassingInterceptions => 0.0,
    }
}

fn skill_rate(
    profile: &PlayerProfile,
    metric: Metric,
    cal: &SkillCalibration,
    as_of: NaiveDate,
    datasets: &DatasetCache,
) -> RateModelResult {
    let dataset = datasets.skill();
    let reference = reference_season(dataset.latest_season, as_of);
    let record = dataset.player(&profile.name);

    let group = if profile.position.trim().is_empty() {
        record
            .and_then(|r| r.position.as_deref())
            .map(PositionGroup::from_label)
            .unwrap_or(PositionGroup::Other)
    } else {
        profile.position_group()
    };

    let mut seasons: Vec<&SkillSeason> = record
        .map(|r| {
            r.seasons
                .iter()
                .filter(|s| s.season <= reference && s.games >= MIN_QUALIFYING_GAMES)
                .collect()
        })
        .unwrap_or_default();
    seasons.sort_by(|a, b| b.season.cmp(&a.season));

    let rookie = if profile.years_exp == Some(0) {
        cal.rookie_factor()
    } else {
        1.0
    };
    let tier_scale = (1.0 + 0.5 * (tier_multiplier(&profile.name) - 1.0)).clamp(0.8, 1.5);
    let prior = positional_prior(group, metric) * rookie * tier_scale;
    let is_quarterback = group == PositionGroup::Quarterback;

    let Some(recent) = seasons.first().copied() else {
        return RateModelResult::fallback(clamp_lambda(metric, prior), ModelType::SkillFallback, is_quarterback);
    };

    let stale_years = (reference - recent.season).max(0) as u32;
    let paced: Vec<f64> = seasons.iter().map(|s| pace(skill_value(s, metric), s.games)).collect();

    let recent_two = &seasons[..seasons.len().min(2)];
    let avg_games = recent_two.iter().map(|s| s.games as f64).sum::<f64>() / recent_two.len() as f64;
    let durability_factor = 0.7 + 0.3 * (avg_games / GAMES_PER_SEASON).min(1.0);

    let trend_boost = breakout_trend(&seasons, &paced, metric, cal);
    let history = recency_blend(&paced, cal.recency_weights(), cal.career_blend())
        * durability_factor
        * (1.0 + trend_boost);

    let recent_games: u32 = recent_two.iter().map(|s| s.games).sum();
    let rel = reliability(
        cal.reliability_base(),
        cal.reliability_per_season(),
        seasons.len(),
        recent_games as f64 / cal.reliability_volume_games(),
        cal.stale_decay(),
        stale_years,
    );

    RateModelResult {
        lambda: clamp_lambda(metric, rel * history + (1.0 - rel) * prior),
        model_type: ModelType::SkillHistoryBlended,
        sample_seasons: seasons.len() as u32,
        reliability: rel,
        stale_years,
        is_quarterback,
        tier: None,
        starter_factor: 1.0,
        durability_factor,
        trend_boost,
        history: seasons.iter().map(|s| skill_value(s, metric)).collect(),
        recent_games: Some(recent.games),
    }
}

/// Carry forward a breakout when the last two qualifying seasons both saw
/// adequate games and the most recent grew in output and usage.
fn breakout_trend(seasons: &[&SkillSeason], paced: &[f64], metric: Metric, cal: &SkillCalibration) -> f64 {
    let (Some(last), Some(prev)) = (seasons.first(), seasons.get(1)) else {
        return 0.0;
    };
    let min_games = cal.trend_min_games();
    if last.games < min_games || prev.games < min_games || paced[1] <= 0.0 {
        return 0.0;
    }
    let usage_grew = pace(last.touches(), last.games) >= pace(prev.touches(), prev.games);
    if paced[0] <= paced[1] || !usage_grew {
        return 0.0;
    }
    let growth = paced[0] / paced[1] - 1.0;
    debug!("Breakout trend on {}: +{:.1}% paced", metric.label(), growth * 100.0);
    (growth * cal.trend_boost_scale()).min(cal.trend_boost_cap())
}
