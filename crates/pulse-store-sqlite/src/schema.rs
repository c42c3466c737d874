//! SQL schema for the Pulse SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS locations (
    location_id      TEXT PRIMARY KEY,
    store_code       TEXT NOT NULL,
    name             TEXT NOT NULL,
    address          TEXT NOT NULL,
    city             TEXT NOT NULL,
    state            TEXT NOT NULL,
    postal_code      TEXT NOT NULL,
    latitude         REAL NOT NULL,
    longitude        REAL NOT NULL,
    primary_category TEXT NOT NULL,
    phone            TEXT NOT NULL,
    website          TEXT NOT NULL,
    average_rating   REAL NOT NULL,
    total_reviews    INTEGER NOT NULL DEFAULT 0,
    is_verified      INTEGER NOT NULL DEFAULT 0
);

-- location_id is deliberately not a foreign key: reviews and KPI records for
-- unknown locations are accepted and skipped at derivation time.
CREATE TABLE IF NOT EXISTS reviews (
    review_id     TEXT PRIMARY KEY,
    location_id   TEXT NOT NULL,
    rating        INTEGER NOT NULL,
    review_text   TEXT NOT NULL DEFAULT '',
    reviewer_name TEXT NOT NULL DEFAULT '',
    review_date   TEXT NOT NULL,   -- ISO 8601 date
    language      TEXT NOT NULL DEFAULT 'en',
    has_reply     INTEGER NOT NULL DEFAULT 0,
    reply_text    TEXT
);

CREATE TABLE IF NOT EXISTS kpis (
    kpi_id             TEXT PRIMARY KEY,
    location_id        TEXT NOT NULL,
    week_start         TEXT NOT NULL,   -- ISO 8601 date
    impressions_maps   INTEGER NOT NULL DEFAULT 0,
    impressions_search INTEGER NOT NULL DEFAULT 0,
    phone_calls        INTEGER NOT NULL DEFAULT 0,
    direction_requests INTEGER NOT NULL DEFAULT 0,
    website_clicks     INTEGER NOT NULL DEFAULT 0,
    bookings           INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS reviews_location_idx ON reviews(location_id, review_date);
CREATE INDEX IF NOT EXISTS kpis_location_idx    ON kpis(location_id, week_start);
CREATE INDEX IF NOT EXISTS kpis_week_idx        ON kpis(week_start);

PRAGMA user_version = 1;
";

pub const LOCATION_COLUMNS: &str = "location_id, store_code, name, address, city, state,
  postal_code, latitude, longitude, primary_category, phone, website,
  average_rating, total_reviews, is_verified";

pub const REVIEW_COLUMNS: &str = "review_id, location_id, rating, review_text,
  reviewer_name, review_date, language, has_reply, reply_text";

pub const KPI_COLUMNS: &str = "kpi_id, location_id, week_start, impressions_maps,
  impressions_search, phone_calls, direction_requests, website_clicks, bookings";
