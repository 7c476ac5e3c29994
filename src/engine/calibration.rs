//! Calibration knobs for the estimation models.
//!
//! Every field is optional. The caller may send any subset (or nothing) and
//! each resolver falls back to the built-in constant, so partial calibration
//! can never make the engine fail. The built-in values are hand-tuned.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::rate_model::QbTier;

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("failed to read calibration file {0}: {1}")]
    Read(String, #[source] std::io::Error),
    #[error("failed to parse calibration file {0}: {1}")]
    Parse(String, #[source] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Calibration {
    pub qb: QbCalibration,
    pub skill: SkillCalibration,
    pub tail: TailCalibration,
    pub horizon: HorizonCalibration,
    pub career: CareerCalibration,
}

impl Calibration {
    pub fn load(path: &Path) -> Result<Self, CalibrationError> {
        let label = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|e| CalibrationError::Read(label.clone(), e))?;
        serde_json::from_str(&raw).map_err(|e| CalibrationError::Parse(label, e))
    }
}

/// Four-tier lookup with per-tier overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TierValues {
    pub elite: Option<f64>,
    pub good: Option<f64>,
    pub average: Option<f64>,
    pub low: Option<f64>,
}

impl TierValues {
    /// `defaults` is ordered elite, good, average, low.
    pub fn resolve(&self, tier: QbTier, defaults: [f64; 4]) -> f64 {
        match tier {
            QbTier::Elite => self.elite.unwrap_or(defaults[0]),
            QbTier::Good => self.good.unwrap_or(defaults[1]),
            QbTier::Average => self.average.unwrap_or(defaults[2]),
            QbTier::Low => self.low.unwrap_or(defaults[3]),
        }
    }
}

// ── Quarterback rate model ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QbCalibration {
    pub tier_td_means: TierValues,
    pub tier_yards_per_attempt: TierValues,
    pub tier_interception_means: TierValues,
    pub starter_attempts: Option<f64>,
    pub recency_weights: Option<[f64; 3]>,
    pub career_blend: Option<f64>,
    pub rookie_starter_factor: Option<f64>,
    pub sophomore_starter_factor: Option<f64>,
    pub reliability_base: Option<f64>,
    pub reliability_per_season: Option<f64>,
    pub reliability_volume_attempts: Option<f64>,
    pub stale_decay: Option<f64>,
}

impl QbCalibration {
    pub fn tier_td_mean(&self, tier: QbTier) -> f64 {
        self.tier_td_means.resolve(tier, [34.0, 28.0, 22.0, 15.0])
    }

    pub fn tier_yards_per_attempt(&self, tier: QbTier) -> f64 {
        self.tier_yards_per_attempt.resolve(tier, [7.9, 7.4, 7.0, 6.5])
    }

    pub fn tier_interception_mean(&self, tier: QbTier) -> f64 {
        self.tier_interception_means.resolve(tier, [10.0, 11.0, 12.5, 13.5])
    }

    pub fn starter_attempts(&self) -> f64 {
        self.starter_attempts.unwrap_or(560.0)
    }

    pub fn recency_weights(&self) -> [f64; 3] {
        self.recency_weights.unwrap_or([0.52, 0.30, 0.18])
    }

    pub fn career_blend(&self) -> f64 {
        self.career_blend.unwrap_or(0.25).clamp(0.0, 1.0)
    }

    /// Share of a full starter workload expected from a player in year
    /// `years_exp` (0 = rookie).
    pub fn experience_starter_factor(&self, years_exp: Option<u32>) -> f64 {
        match years_exp {
            Some(0) => self.rookie_starter_factor.unwrap_or(0.72),
            Some(1) => self.sophomore_starter_factor.unwrap_or(0.88),
            _ => 1.0,
        }
    }

    pub fn reliability_base(&self) -> f64 {
        self.reliability_base.unwrap_or(0.35)
    }

    pub fn reliability_per_season(&self) -> f64 {
        self.reliability_per_season.unwrap_or(0.22)
    }

    pub fn reliability_volume_attempts(&self) -> f64 {
        self.reliability_volume_attempts.unwrap_or(450.0)
    }

    pub fn stale_decay(&self) -> f64 {
        self.stale_decay.unwrap_or(0.8)
    }
}

// ── Skill-position rate model ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillCalibration {
    pub recency_weights: Option<[f64; 3]>,
    pub career_blend: Option<f64>,
    pub rookie_factor: Option<f64>,
    pub trend_boost_cap: Option<f64>,
    pub trend_boost_scale: Option<f64>,
    pub trend_min_games: Option<u32>,
    pub reliability_base: Option<f64>,
    pub reliability_per_season: Option<f64>,
    pub reliability_volume_games: Option<f64>,
    pub stale_decay: Option<f64>,
}

impl SkillCalibration {
    pub fn recency_weights(&self) -> [f64; 3] {
        self.recency_weights.unwrap_or([0.52, 0.30, 0.18])
    }

    pub fn career_blend(&self) -> f64 {
        self.career_blend.unwrap_or(0.25).clamp(0.0, 1.0)
    }

    pub fn rookie_factor(&self) -> f64 {
        self.rookie_factor.unwrap_or(0.8)
    }

    pub fn trend_boost_cap(&self) -> f64 {
        self.trend_boost_cap.unwrap_or(0.14)
    }

    pub fn trend_boost_scale(&self) -> f64 {
        self.trend_boost_scale.unwrap_or(0.5)
    }

    pub fn trend_min_games(&self) -> u32 {
        self.trend_min_games.unwrap_or(12)
    }

    pub fn reliability_base(&self) -> f64 {
        self.reliability_base.unwrap_or(0.3)
    }

    pub fn reliability_per_season(&self) -> f64 {
        self.reliability_per_season.unwrap_or(0.22)
    }

    pub fn reliability_volume_games(&self) -> f64 {
        self.reliability_volume_games.unwrap_or(28.0)
    }

    pub fn stale_decay(&self) -> f64 {
        self.stale_decay.unwrap_or(0.8)
    }
}

// ── Tail probabilities ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TailCalibration {
    pub position_mismatch_pct: Option<f64>,
    pub negative_binomial_crossover: Option<f64>,
    pub yardage_dispersion_season: Option<f64>,
    pub yardage_dispersion_game: Option<f64>,
    pub reception_dispersion_season: Option<f64>,
    pub reception_dispersion_game: Option<f64>,
    pub low_reliability_dispersion_bump: Option<f64>,
    pub empirical_weight_cap: Option<f64>,
    pub near_miss_floor_scale: Option<f64>,
    pub breakout_floor_max: Option<f64>,
}

impl TailCalibration {
    pub fn position_mismatch_pct(&self) -> f64 {
        self.position_mismatch_pct.unwrap_or(0.1)
    }

    pub fn negative_binomial_crossover(&self) -> f64 {
        self.negative_binomial_crossover.unwrap_or(120.0)
    }

    pub fn yardage_dispersion(&self, single_game: bool) -> f64 {
        if single_game {
            self.yardage_dispersion_game.unwrap_or(3.2)
        } else {
            self.yardage_dispersion_season.unwrap_or(9.0)
        }
    }

    pub fn reception_dispersion(&self, single_game: bool) -> f64 {
        if single_game {
            self.reception_dispersion_game.unwrap_or(20.0)
        } else {
            self.reception_dispersion_season.unwrap_or(30.0)
        }
    }

    /// Fractional dispersion loss applied at zero reliability.
    pub fn low_reliability_dispersion_bump(&self) -> f64 {
        self.low_reliability_dispersion_bump.unwrap_or(0.5)
    }

    pub fn empirical_weight_cap(&self) -> f64 {
        self.empirical_weight_cap.unwrap_or(0.6)
    }

    pub fn near_miss_floor_scale(&self) -> f64 {
        self.near_miss_floor_scale.unwrap_or(45.0)
    }

    pub fn breakout_floor_max(&self) -> f64 {
        self.breakout_floor_max.unwrap_or(92.0)
    }
}

// ── Horizon compounding ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HorizonCalibration {
    pub career_years: Option<u32>,
    pub ever_years: Option<u32>,
}

impl HorizonCalibration {
    pub fn career_years(&self) -> u32 {
        self.career_years.unwrap_or(10)
    }

    pub fn ever_years(&self) -> u32 {
        self.ever_years.unwrap_or(30)
    }
}

// ── Career outlook ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CareerCalibration {
    pub mvp_decay: Option<f64>,
    pub all_pro_decay: Option<f64>,
    pub pro_bowl_decay: Option<f64>,
    pub championship_decay: Option<f64>,
    pub stat_season_decay: Option<f64>,
    pub retirement_hazard_scale: Option<f64>,
    pub max_count: Option<u32>,
}

impl CareerCalibration {
    pub fn mvp_decay(&self) -> f64 {
        self.mvp_decay.unwrap_or(0.86)
    }

    pub fn all_pro_decay(&self) -> f64 {
        self.all_pro_decay.unwrap_or(0.88)
    }

    pub fn pro_bowl_decay(&self) -> f64 {
        self.pro_bowl_decay.unwrap_or(0.9)
    }

    pub fn championship_decay(&self) -> f64 {
        self.championship_decay.unwrap_or(0.93)
    }

    pub fn stat_season_decay(&self) -> f64 {
        self.stat_season_decay.unwrap_or(0.9)
    }

    pub fn retirement_hazard_scale(&self) -> f64 {
        self.retirement_hazard_scale.unwrap_or(1.0).max(0.0)
    }

    pub fn max_count(&self) -> u32 {
        self.max_count.unwrap_or(5).max(1)
    }
}
