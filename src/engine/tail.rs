//! Tail probability engine: P(metric ≥ threshold) from a season rate.
//!
//! Distribution family per metric:
//!
//! | metric                     | family                                        |
//! |----------------------------|-----------------------------------------------|
//! | passing TDs (season)       | normal, tight sigma, tier caps, starter floors |
//! | TD counts, interceptions   | Poisson                                       |
//! | passing yards              | normal, sigma scaling with lambda             |
//! | other yardage, receptions  | negative binomial below the crossover, normal above |
//!
//! Single-game scope divides the season rate by 17 and reuses the family.

use serde::Serialize;

use super::calibration::TailCalibration;
use super::rate_model::{QbTier, RateModelResult, GAMES_PER_SEASON};
use super::stat_claim::{Metric, MetricFamily, Scope};
use super::stats::{clamp_pct, negative_binomial_tail, normal_tail_cc, poisson_tail, MAX_PCT};

const LOW_RELIABILITY: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TailFamily {
    Poisson,
    NegativeBinomial,
    Normal,
    PositionMismatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TailEstimate {
    pub probability_pct: f64,
    pub family: TailFamily,
    /// Mean of the distribution actually evaluated (per game for game scope).
    pub mean: f64,
    pub sigma: Option<f64>,
    pub dispersion: Option<f64>,
    pub empirical_weight: Option<f64>,
}

/// P(metric ≥ threshold) in percent.
pub fn tail_probability(
    lambda: f64,
    metric: Metric,
    threshold: f64,
    scope: Scope,
    meta: &RateModelResult,
    cal: &TailCalibration,
) -> f64 {
    tail_estimate(lambda, metric, threshold, scope, meta, cal).probability_pct
}

pub fn tail_estimate(
    lambda: f64,
    metric: Metric,
    threshold: f64,
    scope: Scope,
    meta: &RateModelResult,
    cal: &TailCalibration,
) -> TailEstimate {
    if metric.is_passing() && !meta.is_quarterback {
        return TailEstimate {
            probability_pct: cal.position_mismatch_pct(),
            family: TailFamily::PositionMismatch,
            mean: 0.0,
            sigma: None,
            dispersion: None,
            empirical_weight: None,
        };
    }

    let single_game = scope == Scope::Game;
    let mean = if single_game { lambda / GAMES_PER_SEASON } else { lambda };
    let k = threshold.max(0.0).ceil() as u32;

    let mut est = match (metric, scope) {
        (Metric::PassingTds, Scope::Season) => passing_td_season(lambda, threshold, meta),
        (Metric::PassingYards, _) => {
            let sigma = if single_game {
                (0.3 * mean + 15.0).max(35.0)
            } else {
                0.15 * mean + 120.0
            };
            TailEstimate {
                probability_pct: 100.0 * normal_tail_cc(mean, sigma, threshold),
                family: TailFamily::Normal,
                mean,
                sigma: Some(sigma),
                dispersion: None,
                empirical_weight: None,
            }
        }
        _ => match metric.family() {
            MetricFamily::Touchdowns | MetricFamily::Turnovers => TailEstimate {
                probability_pct: 100.0 * poisson_tail(mean, k),
                family: TailFamily::Poisson,
                mean,
                sigma: None,
                dispersion: None,
                empirical_weight: None,
            },
            MetricFamily::Yardage | MetricFamily::Receptions => {
                overdispersed(mean, threshold, metric, single_game, meta, cal)
            }
        },
    };

    if !single_game && !metric.is_passing() && meta.history.len() >= 2 {
        apply_empirical(&mut est, threshold, meta, cal);
    }

    est.probability_pct = clamp_pct(est.probability_pct);
    est
}

fn overdispersed(
    mean: f64,
    threshold: f64,
    metric: Metric,
    single_game: bool,
    meta: &RateModelResult,
    cal: &TailCalibration,
) -> TailEstimate {
    let mut r = if metric.family() == MetricFamily::Receptions {
        cal.reception_dispersion(single_game)
    } else {
        cal.yardage_dispersion(single_game)
    };
    // Smaller r means fatter tails.
    if meta.reliability < LOW_RELIABILITY {
        r *= 1.0 - cal.low_reliability_dispersion_bump().clamp(0.0, 0.9);
    }

    let crossover = cal.negative_binomial_crossover();
    if threshold < crossover || mean < crossover {
        let k = threshold.max(0.0).ceil() as u32;
        TailEstimate {
            probability_pct: 100.0 * negative_binomial_tail(mean, r, k),
            family: TailFamily::NegativeBinomial,
            mean,
            sigma: None,
            dispersion: Some(r),
            empirical_weight: None,
        }
    } else {
        let sigma = (mean + mean * mean / r).sqrt();
        TailEstimate {
            probability_pct: 100.0 * normal_tail_cc(mean, sigma, threshold),
            family: TailFamily::Normal,
            mean,
            sigma: Some(sigma),
            dispersion: Some(r),
            empirical_weight: None,
        }
    }
}

/// Season passing touchdowns: tighter sigma, tier caps on record-chasing
/// thresholds and floors for full-time starters at modest ones.
fn passing_td_season(lambda: f64, threshold: f64, meta: &RateModelResult) -> TailEstimate {
    let sigma = (4.6 + 0.14 * lambda).clamp(6.0, 10.2);
    let mut pct = 100.0 * normal_tail_cc(lambda, sigma, threshold);

    let tier = meta.tier.unwrap_or(QbTier::Average);
    let cap = if threshold >= 50.0 {
        Some(tier_cap(tier, [2.0, 1.0, 0.5, 0.2]))
    } else if threshold >= 45.0 {
        Some(tier_cap(tier, [6.0, 3.0, 1.5, 0.5]))
    } else if threshold >= 40.0 {
        Some(tier_cap(tier, [18.0, 9.0, 4.0, 1.5]))
    } else {
        None
    };
    if let Some(cap) = cap {
        pct = pct.min(cap);
    }

    let durable = meta.starter_factor >= 0.9;
    if threshold <= 10.0 && meta.starter_factor >= 0.7 {
        pct = MAX_PCT;
    } else if durable && threshold <= 15.0 {
        pct = pct.max(97.0);
    } else if durable && threshold <= 20.0 {
        pct = pct.max(88.0);
    }

    TailEstimate {
        probability_pct: pct,
        family: TailFamily::Normal,
        mean: lambda,
        sigma: Some(sigma),
        dispersion: None,
        empirical_weight: None,
    }
}

fn tier_cap(tier: QbTier, caps: [f64; 4]) -> f64 {
    match tier {
        QbTier::Elite => caps[0],
        QbTier::Good => caps[1],
        QbTier::Average => caps[2],
        QbTier::Low => caps[3],
    }
}

/// Blend with the player's own hit rate, then apply the near-miss and
/// breakout floors.
fn apply_empirical(est: &mut TailEstimate, threshold: f64, meta: &RateModelResult, cal: &TailCalibration) {
    let n = meta.history.len() as f64;
    let hits = meta.history.iter().filter(|v| **v >= threshold).count() as f64;
    let near = meta.history.iter().filter(|v| **v >= 0.9 * threshold).count() as f64;

    let weight = (n / (n + 3.0)).min(cal.empirical_weight_cap());
    let empirical = 100.0 * hits / n;
    let mut pct = (1.0 - weight) * est.probability_pct + weight * empirical;

    pct = pct.max(near / n * cal.near_miss_floor_scale());

    if let Some(&latest) = meta.history.first() {
        if threshold > 0.0 && latest / threshold >= 1.0 {
            let ratio = latest / threshold;
            let games = meta.recent_games.unwrap_or(0);
            let durability_bonus = if games >= 15 {
                10.0
            } else if games >= 12 {
                5.0
            } else {
                0.0
            };
            let floor = (72.0 + 40.0 * (ratio - 1.0).min(0.25) + durability_bonus).min(cal.breakout_floor_max());
            pct = pct.max(floor);
        }
    }

    est.probability_pct = pct;
    est.empirical_weight = Some(weight);
}
