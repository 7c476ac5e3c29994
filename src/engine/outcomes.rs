//! Multi-season outcome distributions.
//!
//! Count outcomes (MVPs, Pro Bowls, titles, 1,500-yard seasons) are the sum
//! of independent, non-identical season Bernoulli trials, i.e. a
//! Poisson-binomial. Longevity and cumulative milestones are a different
//! question (surviving long enough) and use an exponential survival curve.

use serde::{Serialize, Serializer};

use crate::data::models::{PlayerProfile, PositionGroup};

use super::calibration::CareerCalibration;
use super::stats::{clamp_pct, MIN_PCT};
use super::tiers::tier_multiplier;

pub const DEFAULT_AGE: u32 = 26;
const DEFAULT_YEARS_EXP: u32 = 4;
pub const MAX_MODELED_SEASONS: u32 = 20;
/// Nobody plays past this, whatever the survival curve says.
const MAX_PLAYING_AGE: f64 = 45.0;
const ROOKIE_CONTRACT_YEARS: u32 = 4;
const ROOKIE_PAY_SHARE: f64 = 0.25;

/// Bucket label: an exact count or the aggregated overflow "N+".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountLabel {
    Exact(u32),
    AtLeast(u32),
}

impl Serialize for CountLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CountLabel::Exact(n) => serializer.serialize_u32(*n),
            CountLabel::AtLeast(n) => serializer.serialize_str(&format!("{}+", n)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBucket {
    pub count: CountLabel,
    pub probability_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountDistribution {
    pub expected_count: f64,
    pub distribution: Vec<DistributionBucket>,
}

impl CountDistribution {
    /// P(count ≥ 1), in percent.
    pub fn at_least_one_pct(&self) -> f64 {
        let zero = self
            .distribution
            .first()
            .filter(|b| b.count == CountLabel::Exact(0))
            .map(|b| b.probability_pct)
            .unwrap_or(0.0);
        (100.0 - zero).max(0.0)
    }
}

/// Full pmf of the number of successes among independent trials.
///
/// `dp[j]` is P(j successes so far). Each trial updates right to left so
/// `dp[j - 1]` is still the pre-trial value when `dp[j]` reads it.
pub fn poisson_binomial_pmf(probabilities: &[f64]) -> Vec<f64> {
    let mut dp = vec![0.0; probabilities.len() + 1];
    dp[0] = 1.0;
    for (i, &p) in probabilities.iter().enumerate() {
        let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
        for j in (1..=i + 1).rev() {
            dp[j] = dp[j] * (1.0 - p) + dp[j - 1] * p;
        }
        dp[0] *= 1.0 - p;
    }
    dp
}

/// Count distribution truncated at `max_count`, with everything from
/// `max_count` upward folded into one "max_count+" bucket.
pub fn build_count_distribution(per_season: &[f64], max_count: u32) -> CountDistribution {
    let pmf = poisson_binomial_pmf(per_season);
    let expected_count = per_season
        .iter()
        .map(|p| if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 })
        .sum();

    let max_count = max_count.max(1) as usize;
    let mut distribution: Vec<DistributionBucket> = pmf
        .iter()
        .take(max_count)
        .enumerate()
        .map(|(k, p)| DistributionBucket {
            count: CountLabel::Exact(k as u32),
            probability_pct: 100.0 * p,
        })
        .collect();
    if pmf.len() > max_count {
        distribution.push(DistributionBucket {
            count: CountLabel::AtLeast(max_count as u32),
            probability_pct: 100.0 * pmf[max_count..].iter().sum::<f64>(),
        });
    }

    CountDistribution {
        expected_count,
        distribution,
    }
}

/// `base · decay^i` for each of `seasons` seasons.
pub fn decayed_season_probabilities(base: f64, decay: f64, seasons: u32) -> Vec<f64> {
    let base = base.clamp(0.0, 1.0);
    let decay = decay.clamp(0.0, 1.0);
    (0..seasons).map(|i| base * decay.powi(i as i32)).collect()
}

// ── Survival ─────────────────────────────────────────────────────────────────

/// Annual retirement hazard by position group.
pub fn position_hazard(group: PositionGroup) -> f64 {
    match group {
        PositionGroup::Quarterback => 0.09,
        PositionGroup::RunningBack => 0.25,
        PositionGroup::WideReceiver => 0.16,
        PositionGroup::TightEnd => 0.15,
        PositionGroup::Kicker => 0.07,
        PositionGroup::Other => 0.18,
    }
}

/// Chance (percent) of still playing at `target_age`: 100·e^(-λ·Δage).
pub fn survival_probability(current_age: f64, target_age: f64, hazard: f64) -> f64 {
    if target_age > MAX_PLAYING_AGE {
        return 0.0;
    }
    let delta = (target_age - current_age).max(0.0);
    100.0 * (-hazard.max(0.0) * delta).exp()
}

/// Expected further seasons: E[min(T, horizon)] for T ~ Exp(hazard).
pub fn expected_remaining_seasons(age: f64, hazard: f64) -> f64 {
    let horizon = (MAX_PLAYING_AGE - age).max(0.0);
    if hazard <= 0.0 {
        return horizon;
    }
    (1.0 - (-hazard * horizon).exp()) / hazard
}

/// Chance (percent) of reaching a cumulative career milestone, e.g. 10,000
/// rushing yards: the player must survive the seasons needed at the current
/// per-season rate.
pub fn milestone_probability(current: f64, target: f64, per_season_rate: f64, age: f64, hazard: f64) -> f64 {
    if current >= target {
        return clamp_pct(100.0);
    }
    if per_season_rate <= 0.0 || !per_season_rate.is_finite() {
        return MIN_PCT;
    }
    let seasons_needed = (target - current) / per_season_rate;
    clamp_pct(survival_probability(age, age + seasons_needed, hazard))
}

// ── Career outlook ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurvivalCheckpoint {
    pub age: u32,
    pub probability_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerOutlook {
    pub player: String,
    pub position: String,
    pub age: u32,
    pub first_season: i32,
    pub tier_multiplier: f64,
    pub expected_remaining_seasons: f64,
    pub seasons_modeled: u32,
    pub mvp: CountDistribution,
    pub all_pro: CountDistribution,
    pub pro_bowl: CountDistribution,
    pub championships: CountDistribution,
    pub longevity: Vec<SurvivalCheckpoint>,
    pub projected_earnings_musd: f64,
    pub assumptions: Vec<String>,
}

/// Per-season award rates for an average starter in his prime:
/// (MVP, All-Pro, Pro Bowl).
fn award_base_rates(group: PositionGroup) -> (f64, f64, f64) {
    match group {
        PositionGroup::Quarterback => (0.03, 0.06, 0.2),
        PositionGroup::RunningBack => (0.004, 0.07, 0.18),
        PositionGroup::WideReceiver => (0.001, 0.06, 0.17),
        PositionGroup::TightEnd => (0.0005, 0.08, 0.2),
        PositionGroup::Kicker => (0.0, 0.06, 0.15),
        PositionGroup::Other => (0.0005, 0.03, 0.1),
    }
}

fn peak_window(group: PositionGroup) -> (u32, u32) {
    match group {
        PositionGroup::Quarterback => (27, 33),
        PositionGroup::RunningBack => (23, 27),
        PositionGroup::WideReceiver => (24, 29),
        PositionGroup::TightEnd => (25, 30),
        PositionGroup::Kicker => (26, 38),
        PositionGroup::Other => (24, 29),
    }
}

pub fn age_curve(group: PositionGroup, age: u32) -> f64 {
    let (start, end) = peak_window(group);
    let factor = if age < start {
        1.0 - 0.08 * (start - age) as f64
    } else if age > end {
        1.0 - 0.15 * (age - end) as f64
    } else {
        1.0
    };
    factor.clamp(0.1, 1.0)
}

pub fn career_stage_multiplier(years_exp: u32) -> f64 {
    match years_exp {
        0 => 0.6,
        1 => 0.85,
        2..=9 => 1.0,
        _ => 0.85,
    }
}

/// Average annual pay, in millions, for an established starter.
fn salary_musd(group: PositionGroup) -> f64 {
    match group {
        PositionGroup::Quarterback => 35.0,
        PositionGroup::RunningBack => 8.0,
        PositionGroup::WideReceiver => 18.0,
        PositionGroup::TightEnd => 10.0,
        PositionGroup::Kicker => 4.0,
        PositionGroup::Other => 6.0,
    }
}

pub fn career_outlook(profile: &PlayerProfile, first_season: i32, cal: &CareerCalibration) -> CareerOutlook {
    let group = profile.position_group();
    let age = profile.age.unwrap_or(DEFAULT_AGE);
    let years_exp = profile.years_exp.unwrap_or(DEFAULT_YEARS_EXP);
    let tier = tier_multiplier(&profile.name);
    let hazard = position_hazard(group) * cal.retirement_hazard_scale();

    let expected_remaining = expected_remaining_seasons(age as f64, hazard);
    let seasons = (expected_remaining.round() as u32).clamp(1, MAX_MODELED_SEASONS);
    let max_count = cal.max_count();

    let shape = age_curve(group, age) * career_stage_multiplier(years_exp);
    let (mvp, all_pro, pro_bowl) = award_base_rates(group);
    let team_pull = if group == PositionGroup::Quarterback { 0.5 } else { 0.2 };
    let title_base = (1.0 + (tier - 1.0) * team_pull) / 32.0;

    let distribution = |base: f64, decay: f64| {
        build_count_distribution(&decayed_season_probabilities(base, decay, seasons), max_count)
    };

    let longevity = [1u32, 3, 5, 10]
        .iter()
        .map(|d| SurvivalCheckpoint {
            age: age + d,
            probability_pct: survival_probability(age as f64, (age + d) as f64, hazard),
        })
        .collect();

    let projected_earnings_musd = (0..seasons)
        .map(|i| {
            let alive = survival_probability(age as f64, (age + i) as f64, hazard) / 100.0;
            let pay_share = if years_exp + i < ROOKIE_CONTRACT_YEARS {
                ROOKIE_PAY_SHARE
            } else {
                1.0
            };
            alive * salary_musd(group) * pay_share * tier.clamp(0.5, 2.0)
        })
        .sum();

    CareerOutlook {
        player: profile.name.clone(),
        position: group.label().to_string(),
        age,
        first_season,
        tier_multiplier: tier,
        expected_remaining_seasons: expected_remaining,
        seasons_modeled: seasons,
        mvp: distribution(mvp * tier * shape, cal.mvp_decay()),
        all_pro: distribution(all_pro * tier * shape, cal.all_pro_decay()),
        pro_bowl: distribution(pro_bowl * tier * shape, cal.pro_bowl_decay()),
        championships: distribution(title_base, cal.championship_decay()),
        longevity,
        projected_earnings_musd,
        assumptions: vec![
            format!("Annual retirement hazard {:.2} for {}", hazard, group.label()),
            format!("Award rates scaled by tier {:.2} and age curve at {}", tier, age),
            "Season outcomes treated as independent trials".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn total_pct(d: &CountDistribution) -> f64 {
        d.distribution.iter().map(|b| b.probability_pct).sum()
    }

    #[test]
    fn single_trial_is_bernoulli() {
        let pmf = poisson_binomial_pmf(&[0.3]);
        assert_relative_eq!(pmf[0], 0.7, epsilon = 1e-12);
        assert_relative_eq!(pmf[1], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn identical_trials_match_binomial() {
        let pmf = poisson_binomial_pmf(&[0.5; 4]);
        let expected = [1.0, 4.0, 6.0, 4.0, 1.0].map(|c| c / 16.0);
        for (a, b) in pmf.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn mass_is_conserved_and_mean_matches() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let n = rng.gen_range(0..25);
            let probs: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..=1.0)).collect();
            let max_count = rng.gen_range(1..8);
            let d = build_count_distribution(&probs, max_count);
            assert_relative_eq!(total_pct(&d), 100.0, epsilon = 1e-8);
            assert_relative_eq!(d.expected_count, probs.iter().sum::<f64>(), epsilon = 1e-12);

            let pmf_mean: f64 = poisson_binomial_pmf(&probs)
                .iter()
                .enumerate()
                .map(|(k, p)| k as f64 * p)
                .sum();
            assert_relative_eq!(pmf_mean, d.expected_count, epsilon = 1e-8);
        }
    }

    #[test]
    fn overflow_bucket_only_when_support_exceeds_max() {
        let d = build_count_distribution(&[0.5, 0.5], 5);
        assert_eq!(d.distribution.len(), 3);
        assert!(d.distribution.iter().all(|b| matches!(b.count, CountLabel::Exact(_))));

        let d = build_count_distribution(&[0.9; 8], 3);
        assert_eq!(d.distribution.len(), 4);
        assert_eq!(d.distribution[3].count, CountLabel::AtLeast(3));
        assert_eq!(serde_json::to_value(d.distribution[3].count).unwrap(), "3+");
        assert_eq!(serde_json::to_value(d.distribution[0].count).unwrap(), 0);
    }

    #[test]
    fn decayed_probabilities_are_geometric() {
        let v = decayed_season_probabilities(0.2, 0.5, 3);
        assert_eq!(v, vec![0.2, 0.1, 0.05]);
    }

    #[test]
    fn survival_decays_exponentially() {
        assert_relative_eq!(survival_probability(30.0, 30.0, 0.1), 100.0);
        assert_relative_eq!(survival_probability(30.0, 35.0, 0.1), 100.0 * (-0.5f64).exp(), epsilon = 1e-12);
        assert_eq!(survival_probability(40.0, 46.0, 0.01), 0.0);
    }

    #[test]
    fn milestone_probability_edges() {
        assert_eq!(milestone_probability(10_500.0, 10_000.0, 1000.0, 28.0, 0.2), 99.9);
        assert_eq!(milestone_probability(0.0, 10_000.0, 0.0, 28.0, 0.2), MIN_PCT);
        let near = milestone_probability(8_000.0, 10_000.0, 1_000.0, 27.0, 0.25);
        let far = milestone_probability(2_000.0, 10_000.0, 1_000.0, 27.0, 0.25);
        assert!(near > far);
        assert_relative_eq!(near, 100.0 * (-0.5f64).exp(), epsilon = 1e-9);
    }

    #[test]
    fn quarterbacks_outlast_running_backs() {
        let cal = CareerCalibration::default();
        let qb = PlayerProfile { name: "Test Passer".into(), position: "QB".into(), age: Some(27), years_exp: Some(5), team_abbr: None };
        let rb = PlayerProfile { position: "RB".into(), ..qb.clone() };
        let qb_outlook = career_outlook(&qb, 2026, &cal);
        let rb_outlook = career_outlook(&rb, 2026, &cal);
        assert!(qb_outlook.expected_remaining_seasons > rb_outlook.expected_remaining_seasons);
        assert!(qb_outlook.mvp.expected_count > rb_outlook.mvp.expected_count);
        assert!(qb_outlook.projected_earnings_musd > rb_outlook.projected_earnings_musd);
        for d in [&qb_outlook.mvp, &qb_outlook.all_pro, &qb_outlook.pro_bowl, &qb_outlook.championships] {
            assert_relative_eq!(total_pct(d), 100.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn tier_multiplier_lifts_award_odds() {
        let cal = CareerCalibration::default();
        let star = PlayerProfile { name: "Patrick Mahomes".into(), position: "QB".into(), age: Some(30), years_exp: Some(9), team_abbr: None };
        let peer = PlayerProfile { name: "Average Starter".into(), ..star.clone() };
        let a = career_outlook(&star, 2026, &cal);
        let b = career_outlook(&peer, 2026, &cal);
        assert!(a.mvp.at_least_one_pct() > b.mvp.at_least_one_pct());
        assert!(a.championships.expected_count > b.championships.expected_count);
    }
}
