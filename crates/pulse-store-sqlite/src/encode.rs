//! Encoding and decoding helpers between domain entities and SQLite columns.
//!
//! Dates are stored as ISO 8601 `YYYY-MM-DD` strings so lexical order matches
//! chronological order. Counters are stored as SQLite integers (`i64`) and
//! range-checked on the way back out.

use chrono::NaiveDate;
use pulse_core::entity::{Kpi, Location, Review};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Integers ────────────────────────────────────────────────────────────────

/// Counters beyond `i64::MAX` are saturated; SQLite cannot hold them anyway.
pub fn encode_count(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

fn decode<T: TryFrom<i64>>(column: &'static str, value: i64) -> Result<T> {
  T::try_from(value).map_err(|_| Error::OutOfRange { column, value })
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// Intermediate row read from the `locations` table.
pub struct RawLocation {
  pub location_id:      String,
  pub store_code:       String,
  pub name:             String,
  pub address:          String,
  pub city:             String,
  pub state:            String,
  pub postal_code:      String,
  pub latitude:         f64,
  pub longitude:        f64,
  pub primary_category: String,
  pub phone:            String,
  pub website:          String,
  pub average_rating:   f64,
  pub total_reviews:    i64,
  pub is_verified:      bool,
}

impl RawLocation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      location_id:      row.get(0)?,
      store_code:       row.get(1)?,
      name:             row.get(2)?,
      address:          row.get(3)?,
      city:             row.get(4)?,
      state:            row.get(5)?,
      postal_code:      row.get(6)?,
      latitude:         row.get(7)?,
      longitude:        row.get(8)?,
      primary_category: row.get(9)?,
      phone:            row.get(10)?,
      website:          row.get(11)?,
      average_rating:   row.get(12)?,
      total_reviews:    row.get(13)?,
      is_verified:      row.get(14)?,
    })
  }

  pub fn into_location(self) -> Result<Location> {
    Ok(Location {
      location_id:      self.location_id,
      store_code:       self.store_code,
      name:             self.name,
      address:          self.address,
      city:             self.city,
      state:            self.state,
      postal_code:      self.postal_code,
      latitude:         self.latitude,
      longitude:        self.longitude,
      primary_category: self.primary_category,
      phone:            self.phone,
      website:          self.website,
      average_rating:   self.average_rating,
      total_reviews:    decode("total_reviews", self.total_reviews)?,
      is_verified:      self.is_verified,
    })
  }
}

/// Intermediate row read from the `reviews` table.
pub struct RawReview {
  pub review_id:     String,
  pub location_id:   String,
  pub rating:        i64,
  pub review_text:   String,
  pub reviewer_name: String,
  pub review_date:   String,
  pub language:      String,
  pub has_reply:     bool,
  pub reply_text:    Option<String>,
}

impl RawReview {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      review_id:     row.get(0)?,
      location_id:   row.get(1)?,
      rating:        row.get(2)?,
      review_text:   row.get(3)?,
      reviewer_name: row.get(4)?,
      review_date:   row.get(5)?,
      language:      row.get(6)?,
      has_reply:     row.get(7)?,
      reply_text:    row.get(8)?,
    })
  }

  pub fn into_review(self) -> Result<Review> {
    Ok(Review {
      review_id:     self.review_id,
      location_id:   self.location_id,
      rating:        decode("rating", self.rating)?,
      review_text:   self.review_text,
      reviewer_name: self.reviewer_name,
      review_date:   decode_date(&self.review_date)?,
      language:      self.language,
      has_reply:     self.has_reply,
      reply_text:    self.reply_text,
    })
  }
}

/// Intermediate row read from the `kpis` table.
pub struct RawKpi {
  pub kpi_id:             String,
  pub location_id:        String,
  pub week_start:         String,
  pub impressions_maps:   i64,
  pub impressions_search: i64,
  pub phone_calls:        i64,
  pub direction_requests: i64,
  pub website_clicks:     i64,
  pub bookings:           i64,
}

impl RawKpi {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      kpi_id:             row.get(0)?,
      location_id:        row.get(1)?,
      week_start:         row.get(2)?,
      impressions_maps:   row.get(3)?,
      impressions_search: row.get(4)?,
      phone_calls:        row.get(5)?,
      direction_requests: row.get(6)?,
      website_clicks:     row.get(7)?,
      bookings:           row.get(8)?,
    })
  }

  pub fn into_kpi(self) -> Result<Kpi> {
    Ok(Kpi {
      kpi_id:             self.kpi_id,
      location_id:        self.location_id,
      week_start:         decode_date(&self.week_start)?,
      impressions_maps:   decode("impressions_maps", self.impressions_maps)?,
      impressions_search: decode("impressions_search", self.impressions_search)?,
      phone_calls:        decode("phone_calls", self.phone_calls)?,
      direction_requests: decode("direction_requests", self.direction_requests)?,
      website_clicks:     decode("website_clicks", self.website_clicks)?,
      bookings:           decode("bookings", self.bookings)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dates_round_trip_as_iso() {
    let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    assert_eq!(encode_date(d), "2024-02-29");
    assert_eq!(decode_date("2024-02-29").unwrap(), d);
  }

  #[test]
  fn malformed_date_is_an_error() {
    assert!(matches!(decode_date("29/02/2024"), Err(Error::DateParse(_))));
  }

  #[test]
  fn negative_counter_is_out_of_range() {
    let err = decode::<u64>("bookings", -1).unwrap_err();
    assert!(matches!(err, Error::OutOfRange { column: "bookings", value: -1 }));
  }

  #[test]
  fn oversized_counter_saturates() {
    assert_eq!(encode_count(u64::MAX), i64::MAX);
    assert_eq!(encode_count(42), 42);
  }
}
