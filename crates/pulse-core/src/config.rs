//! Engine tuning knobs, deserialised from the `[engine]` table of the server
//! configuration. Every field has a default, so an empty table is valid.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, alert::AlertThresholds, trend::DEFAULT_WINDOW};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Weekly points per trend window (recent vs. older).
  pub trend_window:         usize,
  pub alerts:               AlertThresholds,
  /// How many recent reviews a location insight includes.
  pub recent_reviews:       usize,
  /// How many feedback themes a location insight ranks.
  pub top_issues:           usize,
  /// Locations rated below this need attention.
  pub attention_rating:     f64,
  /// Locations whose health score is below this need attention.
  pub attention_health:     u8,
  /// Locations rated at or above this are top performers.
  pub top_performer_rating: f64,
  /// Trend changes within `±band` percent count as stable.
  pub trend_flat_band:      f64,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      trend_window:         DEFAULT_WINDOW,
      alerts:               AlertThresholds::default(),
      recent_reviews:       10,
      top_issues:           3,
      attention_rating:     3.5,
      attention_health:     50,
      top_performer_rating: 4.5,
      trend_flat_band:      5.0,
    }
  }
}

impl EngineConfig {
  /// Reject configurations that would make rules unreachable or trends
  /// undefined.
  pub fn validate(&self) -> Result<()> {
    if self.trend_window == 0 {
      return Err(Error::InvalidConfig("trend_window must be at least 1".into()));
    }
    let a = &self.alerts;
    if a.rating_high > a.rating_medium {
      return Err(Error::InvalidConfig(format!(
        "alerts.rating_high ({}) exceeds alerts.rating_medium ({})",
        a.rating_high, a.rating_medium
      )));
    }
    if a.trend_high > a.trend_medium {
      return Err(Error::InvalidConfig(format!(
        "alerts.trend_high ({}) exceeds alerts.trend_medium ({})",
        a.trend_high, a.trend_medium
      )));
    }
    if a.response_medium == 0 || a.response_medium > a.response_high {
      return Err(Error::InvalidConfig(format!(
        "alerts.response_medium ({}) must be in 1..=response_high ({})",
        a.response_medium, a.response_high
      )));
    }
    if a.response_window < a.response_high {
      return Err(Error::InvalidConfig(format!(
        "alerts.response_window ({}) is smaller than alerts.response_high ({})",
        a.response_window, a.response_high
      )));
    }
    if self.trend_flat_band < 0.0 {
      return Err(Error::InvalidConfig("trend_flat_band must not be negative".into()));
    }
    Ok(())
  }
}
