//! Pulse server wiring: configuration loading and the top-level router.
//!
//! The binary in `main.rs` is a thin shell over this library so the pieces can
//! be exercised without binding a socket.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use pulse_core::{Engine, EngineConfig, store::EntityStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Environment variable prefix; `PULSE__PORT=9000` overrides `port`,
/// `PULSE__ENGINE__TREND_WINDOW=3` overrides `engine.trend_window`.
pub const ENV_PREFIX: &str = "PULSE";

/// Runtime server configuration, deserialised from `pulse.toml` plus
/// environment overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database file; a leading `~/` is expanded.
  pub store_path: PathBuf,
  pub engine:     EngineConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".into(),
      port:       8080,
      store_path: PathBuf::from("pulse.db"),
      engine:     EngineConfig::default(),
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `PULSE__*` environment
  /// variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    Self::from_sources(
      config::File::from(path).required(false),
      config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__"),
    )
  }

  fn from_sources<F, E>(file: F, env: E) -> Result<Self, config::ConfigError>
  where
    F: config::Source + Send + Sync + 'static,
    E: config::Source + Send + Sync + 'static,
  {
    config::Config::builder()
      .add_source(file)
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// The API mounted under `/api`, with request tracing.
pub fn router<S>(store: Arc<S>, engine: Engine) -> Router
where
  S: EntityStore + 'static,
{
  Router::new()
    .nest("/api", pulse_api::api_router(store, engine))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use config::{Environment, File, FileFormat};

  use super::*;

  fn env(vars: &[(&str, &str)]) -> Environment {
    let source: HashMap<String, String> =
      vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Environment::with_prefix(ENV_PREFIX)
      .prefix_separator("__")
      .separator("__")
      .source(Some(source))
  }

  fn toml(s: &str) -> File<config::FileSourceString, FileFormat> {
    File::from_str(s, FileFormat::Toml)
  }

  #[test]
  fn empty_sources_give_defaults() {
    let cfg = ServerConfig::from_sources(toml(""), env(&[])).unwrap();
    assert_eq!(cfg, ServerConfig::default());
  }

  #[test]
  fn file_sets_nested_engine_fields() {
    let cfg = ServerConfig::from_sources(
      toml(
        r#"
        port = 9000

        [engine]
        trend_window = 3

        [engine.alerts]
        rating_high = 2.5
        "#,
      ),
      env(&[]),
    )
    .unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.engine.trend_window, 3);
    assert_eq!(cfg.engine.alerts.rating_high, 2.5);
    assert_eq!(cfg.engine.alerts.rating_medium, 3.5);
  }

  #[test]
  fn environment_overrides_file() {
    let cfg = ServerConfig::from_sources(
      toml("port = 9000"),
      env(&[("PULSE__PORT", "9100"), ("PULSE__HOST", "0.0.0.0")]),
    )
    .unwrap();
    assert_eq!(cfg.address(), "0.0.0.0:9100");
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/pulse.db")), Path::new(&home).join("pulse.db"));
    assert_eq!(expand_tilde(Path::new("/var/pulse.db")), Path::new("/var/pulse.db"));
  }
}
