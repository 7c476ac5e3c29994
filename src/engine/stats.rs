//! Numerical building blocks shared by the baseline library, the tail engine
//! and the outcome builder.
//!
//! Everything here is pure `f64` math. Discrete tails are summed directly from
//! their pmf recurrences, combinatorial terms go through a log-domain gamma
//! function so 17-game and 82-game records never overflow.

use std::f64::consts::PI;

/// Lower/upper bound on every engine probability, in percent.
pub const MIN_PCT: f64 = 0.01;
pub const MAX_PCT: f64 = 99.9;

pub fn clamp_pct(pct: f64) -> f64 {
    if pct.is_nan() {
        return MIN_PCT;
    }
    pct.clamp(MIN_PCT, MAX_PCT)
}

// ── Gamma / Beta ─────────────────────────────────────────────────────────────

/// ln Γ(x) for x > 0 via the Stirling series, shifted up to x ≥ 7 with the
/// recurrence Γ(x+1) = xΓ(x) so the asymptotic terms stay accurate.
pub fn ln_gamma(x: f64) -> f64 {
    if x <= 0.0 {
        return f64::INFINITY;
    }
    let mut z = x;
    let mut shift = 0.0;
    while z < 7.0 {
        shift += z.ln();
        z += 1.0;
    }
    let z2 = z * z;
    let series = 1.0 / (12.0 * z) - 1.0 / (360.0 * z * z2) + 1.0 / (1260.0 * z2 * z2 * z);
    (z - 0.5) * z.ln() - z + 0.5 * (2.0 * PI).ln() + series - shift
}

pub fn ln_beta(a: f64, b: f64) -> f64 {
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

pub fn ln_choose(n: u32, k: u32) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}

/// P(K = k) for K ~ BetaBinomial(n, α, β).
pub fn beta_binomial_pmf(k: u32, n: u32, alpha: f64, beta: f64) -> f64 {
    if k > n {
        return 0.0;
    }
    let ln_p = ln_choose(n, k) + ln_beta(k as f64 + alpha, (n - k) as f64 + beta)
        - ln_beta(alpha, beta);
    ln_p.exp()
}

/// P(K ≥ k) for K ~ BetaBinomial(n, α, β).
pub fn beta_binomial_tail(k: u32, n: u32, alpha: f64, beta: f64) -> f64 {
    (k..=n)
        .map(|w| beta_binomial_pmf(w, n, alpha, beta))
        .sum::<f64>()
        .min(1.0)
}

// ── Discrete tails ───────────────────────────────────────────────────────────

/// Poisson means above this go through the normal approximation; e^-μ would
/// otherwise underflow.
const POISSON_EXACT_MAX_MEAN: f64 = 600.0;

/// P(X ≥ k) for X ~ Poisson(mean).
pub fn poisson_tail(mean: f64, k: u32) -> f64 {
    if k == 0 {
        return 1.0;
    }
    if mean <= 0.0 {
        return 0.0;
    }
    if mean > POISSON_EXACT_MAX_MEAN {
        return normal_sf((k as f64 - 0.5 - mean) / mean.sqrt());
    }
    let mut pmf = (-mean).exp();
    let mut below = pmf;
    for i in 1..k {
        pmf *= mean / i as f64;
        below += pmf;
    }
    (1.0 - below).clamp(0.0, 1.0)
}

/// P(X ≥ k) for a negative binomial with the given mean and size (dispersion)
/// `r`. Variance is mean + mean²/r, so smaller `r` means heavier tails.
pub fn negative_binomial_tail(mean: f64, r: f64, k: u32) -> f64 {
    if k == 0 {
        return 1.0;
    }
    if mean <= 0.0 {
        return 0.0;
    }
    let r = r.max(1e-3);
    let p = r / (r + mean);
    let q = 1.0 - p;
    let mut pmf = (r * p.ln()).exp();
    let mut below = pmf;
    for i in 0..k.saturating_sub(1) {
        let i = i as f64;
        pmf *= (i + r) / (i + 1.0) * q;
        below += pmf;
    }
    (1.0 - below).clamp(0.0, 1.0)
}

// ── Normal ───────────────────────────────────────────────────────────────────

/// Complementary error function with fractional error below 1.2e-7
/// everywhere, which keeps far tails usable.
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

/// Standard normal survival function P(Z > z).
pub fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// P(X ≥ threshold) for X ~ N(mean, sigma) treating X as integer-valued,
/// i.e. with a half-unit continuity correction.
pub fn normal_tail_cc(mean: f64, sigma: f64, threshold: f64) -> f64 {
    if sigma <= 0.0 {
        return if mean >= threshold { 1.0 } else { 0.0 };
    }
    normal_sf((threshold - 0.5 - mean) / sigma)
}

// ── Combinators ──────────────────────────────────────────────────────────────

/// Probability that at least one of `n` independent entities hits an event
/// each hits with probability `p`: 1 - (1-p)^n.
pub fn union_probability(p: f64, n: u32) -> f64 {
    let p = p.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(n as i32)
}

/// Piecewise-linear lookup on an ascending `(x, y)` table, flat beyond the ends.
pub fn interp_table(table: &[(f64, f64)], x: f64) -> f64 {
    let Some(&(x0, y0)) = table.first() else {
        return 0.0;
    };
    if x <= x0 {
        return y0;
    }
    for pair in table.windows(2) {
        let (xa, ya) = pair[0];
        let (xb, yb) = pair[1];
        if x <= xb {
            let frac = if xb > xa { (x - xa) / (xb - xa) } else { 0.0 };
            return ya + (yb - ya) * frac;
        }
    }
    table[table.len() - 1].1
}

/// Like [`interp_table`] but interpolates in log space, for tail tables
/// that span several orders of magnitude.
pub fn interp_table_log(table: &[(f64, f64)], x: f64) -> f64 {
    let logged: Vec<(f64, f64)> = table
        .iter()
        .map(|&(tx, ty)| (tx, ty.max(1e-12).ln()))
        .collect();
    interp_table(&logged, x).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ln_gamma_matches_factorials() {
        assert_relative_eq!(ln_gamma(1.0), 0.0, epsilon = 1e-9);
        assert_relative_eq!(ln_gamma(5.0), 24f64.ln(), epsilon = 1e-9);
        assert_relative_eq!(ln_gamma(11.0), 3_628_800f64.ln(), epsilon = 1e-8);
        assert_relative_eq!(ln_gamma(0.5), PI.sqrt().ln(), epsilon = 1e-8);
    }

    #[test]
    fn beta_binomial_is_a_symmetric_distribution() {
        let total: f64 = (0..=17).map(|w| beta_binomial_pmf(w, 17, 30.0, 30.0)).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-8);
        assert_relative_eq!(
            beta_binomial_pmf(17, 17, 30.0, 30.0),
            beta_binomial_pmf(0, 17, 30.0, 30.0),
            epsilon = 1e-12
        );
        // Heavier tails than a fair-coin binomial.
        assert!(beta_binomial_pmf(17, 17, 30.0, 30.0) > 0.5f64.powi(17));
    }

    #[test]
    fn poisson_tail_known_values() {
        assert_relative_eq!(poisson_tail(2.0, 0), 1.0);
        assert_relative_eq!(poisson_tail(2.0, 1), 1.0 - (-2.0f64).exp(), epsilon = 1e-12);
        assert!(poisson_tail(30.0, 50) < 0.001);
        assert!(poisson_tail(30.0, 20) > 0.95);
    }

    #[test]
    fn negative_binomial_is_heavier_than_poisson() {
        let nb = negative_binomial_tail(60.0, 3.0, 120);
        let pois = poisson_tail(60.0, 120);
        assert!(nb > pois);
        // Large size converges to Poisson.
        let nb_big = negative_binomial_tail(5.0, 1e6, 8);
        assert_relative_eq!(nb_big, poisson_tail(5.0, 8), epsilon = 1e-4);
    }

    #[test]
    fn normal_tail_reference_points() {
        assert_relative_eq!(normal_sf(0.0), 0.5, epsilon = 1e-7);
        assert_relative_eq!(normal_sf(1.96), 0.025, epsilon = 1e-4);
        assert_relative_eq!(normal_sf(1.0), 0.158_655, epsilon = 1e-5);
        assert!(normal_sf(6.0) > 0.0);
    }

    #[test]
    fn union_probability_bounds() {
        assert_relative_eq!(union_probability(0.0, 32), 0.0);
        assert_relative_eq!(union_probability(1.0, 32), 1.0);
        assert_relative_eq!(union_probability(0.5, 1), 0.5);
    }

    #[test]
    fn interpolation_clamps_and_blends() {
        let table = [(0.0, 10.0), (10.0, 20.0)];
        assert_relative_eq!(interp_table(&table, -5.0), 10.0);
        assert_relative_eq!(interp_table(&table, 5.0), 15.0);
        assert_relative_eq!(interp_table(&table, 50.0), 20.0);
        let log_table = [(0.0, 1.0), (10.0, 0.01)];
        assert_relative_eq!(interp_table_log(&log_table, 5.0), 0.1, epsilon = 1e-9);
    }
}
