//! Application configuration: TOML file plus environment-variable overrides
//! for secrets, mirroring how the teacher's `Config::load` layers the two.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

use super::logging::LoggingConfig;

/// One venue's enablement and connection details. Workers that need no
/// authentication (Polymarket, Kalshi, PredictIt, Limitless) are enabled
/// purely by the `enabled` flag; workers that call an authenticated API
/// (the sportsbook aggregator, Coinbase, Gemini) additionally need
/// `api_key`, which is read from an environment variable named
/// `ODDSAXIOM_{VENUE}_API_KEY` rather than stored in the TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VenueConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Populated from the environment at load time; never read from TOML.
    #[serde(skip)]
    pub api_key: Option<String>,
}

/// Per-venue enablement. Workers with no auth requirement default to
/// enabled so a fresh checkout polls something without any configuration;
/// the experimental/authenticated ones default to disabled.
#[derive(Debug, Clone, Deserialize)]
pub struct VenuesConfig {
    #[serde(default = "enabled_venue")]
    pub polymarket: VenueConfig,
    #[serde(default = "enabled_venue")]
    pub kalshi: VenueConfig,
    #[serde(default = "enabled_venue")]
    pub predictit: VenueConfig,
    #[serde(default = "enabled_venue")]
    pub limitless: VenueConfig,
    #[serde(default)]
    pub sportsbook_aggregator: VenueConfig,
    #[serde(default)]
    pub coinbase: VenueConfig,
    #[serde(default)]
    pub gemini: VenueConfig,
    #[serde(default)]
    pub robinhood: VenueConfig,
}

fn enabled_venue() -> VenueConfig {
    VenueConfig {
        enabled: true,
        api_key: None,
    }
}

impl Default for VenuesConfig {
    fn default() -> Self {
        Self {
            polymarket: enabled_venue(),
            kalshi: enabled_venue(),
            predictit: enabled_venue(),
            limitless: enabled_venue(),
            sportsbook_aggregator: VenueConfig::default(),
            coinbase: VenueConfig::default(),
            gemini: VenueConfig::default(),
            robinhood: VenueConfig::default(),
        }
    }
}

/// The arbitrage engine's tunables, deserialized from `[engine]`. Defaults
/// match the reference values in spec §6/§4.4.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub min_profit: f64,
    pub detection_interval_secs: u64,
    pub recluster_interval_cycles: u32,
    pub opportunity_ttl_secs: u64,
    pub matcher_cache_ttl_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            min_profit: 0.001,
            detection_interval_secs: 5,
            recluster_interval_cycles: 60,
            opportunity_ttl_secs: 5 * 60,
            matcher_cache_ttl_secs: 60,
        }
    }
}

impl EngineSettings {
    #[must_use]
    pub fn detection_interval(&self) -> Duration {
        Duration::from_secs(self.detection_interval_secs)
    }

    #[must_use]
    pub fn opportunity_ttl(&self) -> Duration {
        Duration::from_secs(self.opportunity_ttl_secs)
    }

    #[must_use]
    pub fn matcher_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.matcher_cache_ttl_secs)
    }
}

/// Live cache and ordered-log tunables, deserialized from `[store]`.
/// `live_cache_ttl_secs` must exceed the slowest worker's poll interval
/// (reference: 300s poll -> 660s TTL); `Config::validate` enforces this
/// against the sportsbook aggregator's fixed 300s interval, the slowest
/// poller in this fleet.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub redis_url: String,
    pub database_url: String,
    pub live_cache_ttl_secs: u64,
    pub stream_maxlen: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            database_url: "oddsaxiom.sqlite3".to_string(),
            live_cache_ttl_secs: 11 * 60,
            stream_maxlen: 50_000,
        }
    }
}

impl StoreSettings {
    #[must_use]
    pub fn live_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.live_cache_ttl_secs)
    }
}

/// Snapshotter/pruner retention tunables, deserialized from `[retention]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetentionSettings {
    pub snapshot_interval_secs: u64,
    pub snapshot_startup_grace_secs: u64,
    pub snapshot_batch_size: usize,
    pub pruner_interval_secs: u64,
    pub retention_days: i64,
    pub stale_days: i64,
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            snapshot_interval_secs: 5 * 60,
            snapshot_startup_grace_secs: 30,
            snapshot_batch_size: 500,
            pruner_interval_secs: 6 * 60 * 60,
            retention_days: 7,
            stale_days: 30,
        }
    }
}

impl RetentionSettings {
    #[must_use]
    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_secs(self.snapshot_interval_secs)
    }

    #[must_use]
    pub fn snapshot_startup_grace(&self) -> Duration {
        Duration::from_secs(self.snapshot_startup_grace_secs)
    }

    #[must_use]
    pub fn pruner_interval(&self) -> Duration {
        Duration::from_secs(self.pruner_interval_secs)
    }
}

/// The live-query assembler's result cache TTL, deserialized from `[query]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    pub result_cache_ttl_secs: u64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            result_cache_ttl_secs: 2 * 60,
        }
    }
}

impl QuerySettings {
    #[must_use]
    pub fn result_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.result_cache_ttl_secs)
    }
}

/// Top-level application configuration, deserialized from TOML with
/// environment overrides layered on afterward for anything secret.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub venues: VenuesConfig,
    pub engine: EngineSettings,
    pub store: StoreSettings,
    pub retention: RetentionSettings,
    pub query: QuerySettings,
}

/// The slowest configured poll interval across the fixed per-venue
/// constants (see each worker's `poll_interval`), used to validate that
/// `live_cache_ttl` leaves a safety margin per spec §3's TTL contract.
const SLOWEST_POLL_INTERVAL_SECS: u64 = 300;

impl Config {
    /// Load configuration from `path`, then layer environment-variable
    /// overrides for venue API keys on top, then validate.
    ///
    /// # Errors
    /// Returns an error if the file can't be read, the TOML can't be
    /// parsed, or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Read venue API keys and store connection strings from the
    /// environment, never from the TOML file, so secrets never land on
    /// disk alongside the rest of the configuration.
    fn apply_env_overrides(&mut self) {
        self.venues.sportsbook_aggregator.api_key = std::env::var("ODDSAXIOM_SPORTSBOOK_API_KEY").ok();
        self.venues.coinbase.api_key = std::env::var("ODDSAXIOM_COINBASE_API_KEY").ok();
        self.venues.gemini.api_key = std::env::var("ODDSAXIOM_GEMINI_API_KEY").ok();

        if let Ok(redis_url) = std::env::var("REDIS_URL") {
            self.store.redis_url = redis_url;
        }
        if let Ok(database_url) = std::env::var("DATABASE_URL") {
            self.store.database_url = database_url;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.store.live_cache_ttl_secs <= SLOWEST_POLL_INTERVAL_SECS {
            return Err(Error::Config(format!(
                "store.live_cache_ttl_secs ({}) must exceed the slowest poll interval ({}s)",
                self.store.live_cache_ttl_secs, SLOWEST_POLL_INTERVAL_SECS
            )));
        }
        if !(0.0..1.0).contains(&self.engine.min_profit) {
            return Err(Error::Config(format!(
                "engine.min_profit ({}) must be in [0, 1)",
                self.engine.min_profit
            )));
        }
        if self.engine.recluster_interval_cycles == 0 {
            return Err(Error::Config(
                "engine.recluster_interval_cycles must be greater than 0".to_string(),
            ));
        }
        if self.retention.retention_days <= 0 {
            return Err(Error::Config(
                "retention.retention_days must be greater than 0".to_string(),
            ));
        }
        if self.store.redis_url.trim().is_empty() {
            return Err(Error::Config("store.redis_url must not be empty".to_string()));
        }
        Ok(())
    }

    /// Every venue currently enabled, in a stable order.
    #[must_use]
    pub fn enabled_venues(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.venues.polymarket.enabled {
            out.push("polymarket");
        }
        if self.venues.kalshi.enabled {
            out.push("kalshi");
        }
        if self.venues.predictit.enabled {
            out.push("predictit");
        }
        if self.venues.limitless.enabled {
            out.push("limitless");
        }
        if self.venues.sportsbook_aggregator.enabled {
            out.push("sportsbook_aggregator");
        }
        if self.venues.coinbase.enabled {
            out.push("coinbase");
        }
        if self.venues.gemini.enabled {
            out.push("gemini");
        }
        if self.venues.robinhood.enabled {
            out.push("robinhood");
        }
        out
    }
}
