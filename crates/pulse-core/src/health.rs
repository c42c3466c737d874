//! Location health score, a 0–100 blend of four signals.
//!
//! | Component        | Weight | Input mapping                         |
//! |------------------|--------|---------------------------------------|
//! | Rating           | 40     | `rating / 5`                          |
//! | Rating trend     | 20     | `(trend + 1) / 2`, clamped to `[0,1]` |
//! | Response rate    | 20     | `rate` (already in `[0,1]`)           |
//! | Visibility trend | 20     | `(pct + 50) / 100`, clamped to `[0,1]`|
//!
//! Each component is clamped to `[0, weight]` before summing.

const RATING_WEIGHT: f64 = 40.0;
const RATING_TREND_WEIGHT: f64 = 20.0;
const RESPONSE_WEIGHT: f64 = 20.0;
const VISIBILITY_WEIGHT: f64 = 20.0;

/// Inputs to [`score`], named so call sites read clearly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthInputs {
  /// Average star rating, nominally `[1, 5]`.
  pub rating:        f64,
  /// Rating movement in `[-1, 1]`. No rating history is tracked yet, so
  /// every caller currently passes `0.0` (neutral midpoint).
  pub rating_trend:  f64,
  /// Fraction of reviews with a reply, `[0, 1]`.
  pub response_rate: f64,
  /// Period-over-period impressions change, in percent.
  pub kpi_trend:     f64,
}

/// Weighted health score in `0..=100`. Out-of-range inputs are clamped, never
/// rejected.
pub fn score(inputs: HealthInputs) -> u8 {
  let rating = component(inputs.rating / 5.0, RATING_WEIGHT);
  let rating_trend = component((inputs.rating_trend + 1.0) / 2.0, RATING_TREND_WEIGHT);
  let response = component(inputs.response_rate, RESPONSE_WEIGHT);
  let visibility = component((inputs.kpi_trend + 50.0) / 100.0, VISIBILITY_WEIGHT);

  // Sum of clamped components is within [0, 100].
  (rating + rating_trend + response + visibility).round() as u8
}

fn component(normalized: f64, weight: f64) -> f64 {
  if normalized.is_nan() {
    return 0.0;
  }
  normalized.clamp(0.0, 1.0) * weight
}
