//! Core of the grabbit release decision engine.
//!
//! The pipeline is: raw release title -> [`parser`] -> [`quality`] tier ->
//! [`scoring`] verdict -> [`ranker`] selection -> hand-off via [`download`].
//! The [`scheduler`] drives it from background loops and interactive
//! callers alike; everything in between is pure and safe to call
//! concurrently.

pub mod config;
pub mod download;
pub mod metrics;
pub mod parser;
pub mod quality;
pub mod ranker;
pub mod scheduler;
pub mod scoring;
pub mod searcher;
pub mod store;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    DownloadConfig, ProwlarrConfig, QbittorrentConfig, SabnzbdConfig, SanitizedConfig,
    ServerConfig,
};
pub use download::{
    DownloadDispatcher, DownloadError, DownloadService, QbittorrentClient, SabnzbdClient,
};
pub use parser::{parse, Codec, HdrFormat, ParsedRelease, Resolution, Source};
pub use quality::{
    classify_tier, match_formats, Condition, CustomFormatDef, DelayProfile, FilterType,
    QualityProfile, QualityTier, ReleaseFilter,
};
pub use ranker::{rank, Candidate, RankContext, Selection};
pub use scheduler::{
    DecisionOutcome, DecisionReport, Scheduler, SchedulerConfig, SchedulerError, SchedulerStatus,
    StorageMonitor, TaskGuard,
};
pub use scoring::{score_release, FormatHit, ScoredRelease};
pub use searcher::{
    MediaKind, Protocol, ProwlarrSearcher, RawSearchResult, SearchError, SearchRequest, Searcher,
};
pub use store::{
    BlocklistEntry, CreateItemRequest, DecisionStore, GateChecks, IndexerExclusion,
    MediaExclusion, MonitoredItem, PendingGrab, Settings, SqliteStore, StoreError,
};
