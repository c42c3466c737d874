//! Fixture builders shared by the unit tests in this crate.

use chrono::NaiveDate;

use crate::entity::{Kpi, Location, Review};

pub fn date(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("fixture date")
}

pub fn location(id: &str, city: &str, category: &str, rating: f64) -> Location {
  Location {
    location_id:      id.into(),
    store_code:       format!("ST-{id}"),
    name:             format!("Clinic {id}"),
    address:          "12 MG Road".into(),
    city:             city.into(),
    state:            "MH".into(),
    postal_code:      "411001".into(),
    latitude:         18.52,
    longitude:        73.85,
    primary_category: category.into(),
    phone:            "+91 20 5550 0000".into(),
    website:          "https://example.com".into(),
    average_rating:   rating,
    total_reviews:    42,
    is_verified:      true,
  }
}

pub fn review(
  id: &str,
  location_id: &str,
  rating: u8,
  day: &str,
  has_reply: bool,
) -> Review {
  Review {
    review_id:     id.into(),
    location_id:   location_id.into(),
    rating,
    review_text:   String::new(),
    reviewer_name: "Priya".into(),
    review_date:   date(day),
    language:      "en".into(),
    has_reply,
    reply_text:    has_reply.then(|| "Thank you".into()),
  }
}

pub fn review_text(
  id: &str,
  location_id: &str,
  rating: u8,
  day: &str,
  text: &str,
) -> Review {
  Review { review_text: text.into(), ..review(id, location_id, rating, day, false) }
}

/// A KPI record whose impressions all come from maps; other counters derive
/// from the impressions so sums stay easy to check.
pub fn kpi(location_id: &str, week: &str, impressions: u64) -> Kpi {
  Kpi {
    kpi_id:             format!("{location_id}-{week}"),
    location_id:        location_id.into(),
    week_start:         date(week),
    impressions_maps:   impressions,
    impressions_search: 0,
    phone_calls:        impressions / 10,
    direction_requests: impressions / 20,
    website_clicks:     impressions / 50,
    bookings:           impressions / 100,
  }
}

/// Four consecutive weekly records starting 2024-01-01.
pub fn four_weeks(location_id: &str, values: [u64; 4]) -> Vec<Kpi> {
  ["2024-01-01", "2024-01-08", "2024-01-15", "2024-01-22"]
    .into_iter()
    .zip(values)
    .map(|(week, v)| kpi(location_id, week, v))
    .collect()
}
