//! [`SqliteStore`]: the SQLite implementation of [`EntityStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tracing::{debug, info};

use pulse_core::{
  entity::{Kpi, Location, Review},
  store::{EntityStore, Snapshot},
};

use crate::{
  Result,
  encode::{RawKpi, RawLocation, RawReview, encode_count, encode_date},
  schema::{KPI_COLUMNS, LOCATION_COLUMNS, REVIEW_COLUMNS, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Pulse entity store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Row counts written by [`SqliteStore::import_snapshot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
  pub locations: usize,
  pub reviews:   usize,
  pub kpis:      usize,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Writes ────────────────────────────────────────────────────────────────
  //
  // Every write is an upsert keyed on the entity id, so re-importing the same
  // export refreshes rows in place.

  pub async fn insert_location(&self, location: &Location) -> Result<()> {
    let location = location.clone();
    self
      .conn
      .call(move |conn| {
        upsert_location(conn, &location)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_review(&self, review: &Review) -> Result<()> {
    let review = review.clone();
    self
      .conn
      .call(move |conn| {
        upsert_review(conn, &review)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_kpi(&self, kpi: &Kpi) -> Result<()> {
    let kpi = kpi.clone();
    self
      .conn
      .call(move |conn| {
        upsert_kpi(conn, &kpi)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Write a whole snapshot in one transaction. Either every row lands or
  /// none does.
  pub async fn import_snapshot(&self, snapshot: Snapshot) -> Result<ImportSummary> {
    let summary = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for location in &snapshot.locations {
          upsert_location(&tx, location)?;
        }
        for review in &snapshot.reviews {
          upsert_review(&tx, review)?;
        }
        for kpi in &snapshot.kpis {
          upsert_kpi(&tx, kpi)?;
        }
        tx.commit()?;
        Ok(ImportSummary {
          locations: snapshot.locations.len(),
          reviews:   snapshot.reviews.len(),
          kpis:      snapshot.kpis.len(),
        })
      })
      .await?;

    info!(
      locations = summary.locations,
      reviews = summary.reviews,
      kpis = summary.kpis,
      "imported snapshot"
    );
    Ok(summary)
  }
}

fn upsert_location(conn: &rusqlite::Connection, l: &Location) -> rusqlite::Result<()> {
  conn.execute(
    &format!(
      "INSERT OR REPLACE INTO locations ({LOCATION_COLUMNS})
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
    ),
    rusqlite::params![
      l.location_id,
      l.store_code,
      l.name,
      l.address,
      l.city,
      l.state,
      l.postal_code,
      l.latitude,
      l.longitude,
      l.primary_category,
      l.phone,
      l.website,
      l.average_rating,
      l.total_reviews,
      l.is_verified,
    ],
  )?;
  Ok(())
}

fn upsert_review(conn: &rusqlite::Connection, r: &Review) -> rusqlite::Result<()> {
  conn.execute(
    &format!(
      "INSERT OR REPLACE INTO reviews ({REVIEW_COLUMNS})
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
    ),
    rusqlite::params![
      r.review_id,
      r.location_id,
      r.rating,
      r.review_text,
      r.reviewer_name,
      encode_date(r.review_date),
      r.language,
      r.has_reply,
      r.reply_text,
    ],
  )?;
  Ok(())
}

fn upsert_kpi(conn: &rusqlite::Connection, k: &Kpi) -> rusqlite::Result<()> {
  conn.execute(
    &format!(
      "INSERT OR REPLACE INTO kpis ({KPI_COLUMNS})
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
    ),
    rusqlite::params![
      k.kpi_id,
      k.location_id,
      encode_date(k.week_start),
      encode_count(k.impressions_maps),
      encode_count(k.impressions_search),
      encode_count(k.phone_calls),
      encode_count(k.direction_requests),
      encode_count(k.website_clicks),
      encode_count(k.bookings),
    ],
  )?;
  Ok(())
}

// ─── EntityStore impl ────────────────────────────────────────────────────────

impl EntityStore for SqliteStore {
  type Error = crate::Error;

  async fn fetch_locations(&self) -> Result<Vec<Location>> {
    let raws: Vec<RawLocation> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {LOCATION_COLUMNS} FROM locations
           ORDER BY average_rating DESC, location_id ASC"
        ))?;
        let rows = stmt
          .query_map([], RawLocation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLocation::into_location).collect()
  }

  async fn fetch_location(&self, location_id: &str) -> Result<Option<Location>> {
    let id = location_id.to_owned();

    let raw: Option<RawLocation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE location_id = ?1"),
              rusqlite::params![id],
              RawLocation::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLocation::into_location).transpose()
  }

  async fn fetch_reviews(&self, location_id: Option<&str>) -> Result<Vec<Review>> {
    let id = location_id.map(str::to_owned);

    let raws: Vec<RawReview> = self
      .conn
      .call(move |conn| {
        // A NULL parameter matches every row.
        let mut stmt = conn.prepare(&format!(
          "SELECT {REVIEW_COLUMNS} FROM reviews
           WHERE ?1 IS NULL OR location_id = ?1
           ORDER BY review_date DESC, review_id ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id], RawReview::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    debug!(count = raws.len(), location_id, "fetched reviews");
    raws.into_iter().map(RawReview::into_review).collect()
  }

  async fn fetch_kpis(&self, location_id: Option<&str>) -> Result<Vec<Kpi>> {
    let id = location_id.map(str::to_owned);

    let raws: Vec<RawKpi> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {KPI_COLUMNS} FROM kpis
           WHERE ?1 IS NULL OR location_id = ?1
           ORDER BY week_start ASC, location_id ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id], RawKpi::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    debug!(count = raws.len(), location_id, "fetched kpis");
    raws.into_iter().map(RawKpi::into_kpi).collect()
  }
}
