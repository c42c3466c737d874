//! City and category rollups.
//!
//! Locations are partitioned by a grouping key; KPI records join their group
//! through `location_id`. A KPI record whose location is not in the snapshot
//! belongs to no group and is dropped. Output is ordered by mean rating,
//! highest first, with ties left in encounter order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entity::{Kpi, Location};

// ─── Output types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityPerformance {
  pub city:              String,
  pub locations:         usize,
  /// Unweighted mean of `average_rating` over the city's locations.
  pub avg_rating:        f64,
  pub total_impressions: u64,
  pub total_calls:       u64,
  pub total_bookings:    u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPerformance {
  pub category:          String,
  pub locations:         usize,
  pub avg_rating:        f64,
  pub total_impressions: u64,
  /// Total impressions divided by the number of locations in the category.
  pub avg_impressions:   f64,
}

// ─── Grouping ────────────────────────────────────────────────────────────────

struct Group<'a> {
  key:       &'a str,
  locations: Vec<&'a Location>,
  kpis:      Vec<&'a Kpi>,
}

impl Group<'_> {
  fn avg_rating(&self) -> f64 {
    if self.locations.is_empty() {
      return 0.0;
    }
    let sum: f64 = self.locations.iter().map(|l| l.average_rating).sum();
    sum / self.locations.len() as f64
  }

  fn sum(&self, field: impl Fn(&Kpi) -> u64) -> u64 {
    self.kpis.iter().copied().map(field).fold(0, u64::saturating_add)
  }
}

/// Partition `locations` by `key` in first-seen order, then attach each KPI
/// record to the group of its location.
fn partition<'a, F>(locations: &'a [Location], kpis: &'a [Kpi], key: F) -> Vec<Group<'a>>
where
  F: Fn(&'a Location) -> &'a str,
{
  let mut groups: Vec<Group<'a>> = Vec::new();
  let mut by_key: HashMap<&'a str, usize> = HashMap::new();
  let mut by_location: HashMap<&'a str, usize> = HashMap::new();

  for location in locations {
    let k = key(location);
    let slot = *by_key.entry(k).or_insert_with(|| {
      groups.push(Group { key: k, locations: Vec::new(), kpis: Vec::new() });
      groups.len() - 1
    });
    groups[slot].locations.push(location);
    by_location.entry(location.location_id.as_str()).or_insert(slot);
  }

  for kpi in kpis {
    if let Some(&slot) = by_location.get(kpi.location_id.as_str()) {
      groups[slot].kpis.push(kpi);
    }
  }

  groups
}

// ─── Rollups ─────────────────────────────────────────────────────────────────

pub fn rollup_by_city(locations: &[Location], kpis: &[Kpi]) -> Vec<CityPerformance> {
  let mut result: Vec<CityPerformance> = partition(locations, kpis, |l| l.city.as_str())
    .into_iter()
    .map(|g| CityPerformance {
      city:              g.key.to_owned(),
      locations:         g.locations.len(),
      avg_rating:        g.avg_rating(),
      total_impressions: g.sum(Kpi::impressions),
      total_calls:       g.sum(|k| k.phone_calls),
      total_bookings:    g.sum(|k| k.bookings),
    })
    .collect();
  result.sort_by(|a, b| b.avg_rating.total_cmp(&a.avg_rating));
  result
}

pub fn rollup_by_category(
  locations: &[Location],
  kpis: &[Kpi],
) -> Vec<CategoryPerformance> {
  let mut result: Vec<CategoryPerformance> =
    partition(locations, kpis, |l| l.primary_category.as_str())
      .into_iter()
      .map(|g| {
        let total_impressions = g.sum(Kpi::impressions);
        CategoryPerformance {
          category: g.key.to_owned(),
          locations: g.locations.len(),
          avg_rating: g.avg_rating(),
          total_impressions,
          avg_impressions: total_impressions as f64 / g.locations.len() as f64,
        }
      })
      .collect();
  result.sort_by(|a, b| b.avg_rating.total_cmp(&a.avg_rating));
  result
}
