//! The decision scheduler.
//!
//! Drives monitored items through search -> parse -> score -> rank -> grab,
//! both from periodic background loops (search sweep, RSS sync, pending-grab
//! promotion) and synchronously from interactive callers. Every failure is
//! per-item: one bad title or one unreachable indexer never halts a loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::download::DownloadDispatcher;
use crate::metrics;
use crate::parser::parse;
use crate::quality::{CustomFormatDef, DelayProfile, QualityProfile, ReleaseFilter};
use crate::ranker::{rank, Candidate, RankContext, Selection};
use crate::scoring::score_release;
use crate::searcher::{RawSearchResult, SearchRequest, Searcher};
use crate::store::{DecisionStore, GateChecks, MonitoredItem, PendingGrab, Settings};

use super::config::SchedulerConfig;
use super::guard::TaskGuard;
use super::types::{
    DecisionOutcome, DecisionReport, SchedulerError, SchedulerStatus, StorageMonitor,
    TASK_PENDING, TASK_RSS, TASK_SEARCH,
};

/// The decision scheduler. Components it drives are pure; the only state
/// here is the task guard and the running flag.
pub struct Scheduler {
    config: SchedulerConfig,
    store: Arc<dyn DecisionStore>,
    searcher: Arc<dyn Searcher>,
    downloads: Arc<DownloadDispatcher>,
    storage: Option<Arc<dyn StorageMonitor>>,
    download_category: String,

    guard: TaskGuard,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

/// Rule-set snapshot loaded once per decision pass.
struct DecisionRules {
    profile: Option<QualityProfile>,
    formats: Vec<CustomFormatDef>,
    filters: Vec<ReleaseFilter>,
    delay_profiles: Vec<DelayProfile>,
}

impl Scheduler {
    pub fn new(
        config: SchedulerConfig,
        store: Arc<dyn DecisionStore>,
        searcher: Arc<dyn Searcher>,
        downloads: Arc<DownloadDispatcher>,
        storage: Option<Arc<dyn StorageMonitor>>,
        download_category: impl Into<String>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            store,
            searcher,
            downloads,
            storage,
            download_category: download_category.into(),
            guard: TaskGuard::new(),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Start the background loops.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("scheduler already running");
            return;
        }
        info!("starting decision scheduler");
        self.spawn_loop(TASK_SEARCH, self.config.search_tick_secs);
        self.spawn_loop(TASK_RSS, self.config.rss_tick_secs);
        self.spawn_loop(TASK_PENDING, self.config.pending_tick_secs);
    }

    /// Stop the background loops. No new iterations are scheduled; whatever
    /// is in flight finishes before this returns.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("scheduler not running");
            return;
        }
        info!("stopping decision scheduler");
        let _ = self.shutdown_tx.send(());
        while !self.guard.is_idle() {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        info!("decision scheduler stopped");
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            running: self.running.load(Ordering::Relaxed),
            active_tasks: self.guard.active(),
            pending_grabs: self.store.list_pending().map(|p| p.len()).unwrap_or(0),
        }
    }

    fn spawn_loop(self: &Arc<Self>, task: &'static str, period_secs: u64) {
        let this = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            info!(task = task, "background loop started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = tokio::time::sleep(Duration::from_secs(period_secs)) => {
                        if !this.running.load(Ordering::Relaxed) {
                            break;
                        }
                        this.run_task(task).await;
                    }
                }
            }
            info!(task = task, "background loop stopped");
        });
    }

    async fn run_task(&self, task: &'static str) {
        match task {
            TASK_SEARCH => self.search_sweep_once().await,
            TASK_RSS => self.rss_sync_once().await,
            TASK_PENDING => self.promote_pending_once().await,
            _ => {}
        }
    }

    /// One pass of the monitored-item search sweep.
    pub async fn search_sweep_once(&self) {
        let Some(_permit) = self.guard.try_begin(TASK_SEARCH) else {
            debug!(task = TASK_SEARCH, "previous run still in flight, skipping");
            return;
        };

        let settings = match self.store.get_settings() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(task = TASK_SEARCH, error = %e, "failed to load settings");
                return;
            }
        };
        if !settings.auto_search {
            debug!(task = TASK_SEARCH, "auto search disabled");
            return;
        }
        if self.storage_pressure() {
            return;
        }

        let items = match self.store.list_items() {
            Ok(items) => items,
            Err(e) => {
                warn!(task = TASK_SEARCH, error = %e, "failed to list monitored items");
                return;
            }
        };

        let now = Utc::now();
        for item in items {
            if !item.monitored || !is_due(&item, now, self.config.search_interval_minutes) {
                continue;
            }
            if self.is_excluded(&item) {
                debug!(task = TASK_SEARCH, item = %item.title, "item excluded, skipping");
                continue;
            }

            match self.decide_for_item(&item, &settings).await {
                Ok(report) => {
                    info!(
                        task = TASK_SEARCH,
                        item = %item.title,
                        outcome = report.outcome.label(),
                        "decision pass finished"
                    );
                }
                Err(e) => {
                    warn!(task = TASK_SEARCH, item = %item.title, error = %e, "decision pass failed");
                }
            }

            // Deliberate pause between successive indexer calls
            tokio::time::sleep(Duration::from_millis(self.config.indexer_pause_ms)).await;
        }
    }

    /// One pass of the RSS sync: fetch recent releases once and run every
    /// matching monitored item through the same decision pipeline.
    pub async fn rss_sync_once(&self) {
        let Some(_permit) = self.guard.try_begin(TASK_RSS) else {
            debug!(task = TASK_RSS, "previous run still in flight, skipping");
            return;
        };

        let settings = match self.store.get_settings() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(task = TASK_RSS, error = %e, "failed to load settings");
                return;
            }
        };
        if !settings.auto_search {
            return;
        }
        if self.storage_pressure() {
            return;
        }

        let request = SearchRequest {
            limit: Some(self.config.search_limit),
            ..SearchRequest::text("")
        };
        let results = match self.timed_search(&request).await {
            Ok(results) => results,
            Err(e) => {
                warn!(task = TASK_RSS, error = %e, "feed fetch failed");
                return;
            }
        };

        let items = match self.store.list_items() {
            Ok(items) => items,
            Err(e) => {
                warn!(task = TASK_RSS, error = %e, "failed to list monitored items");
                return;
            }
        };

        for item in items.iter().filter(|i| i.monitored) {
            if self.is_excluded(item) {
                continue;
            }
            let matching: Vec<RawSearchResult> = results
                .iter()
                .filter(|r| title_matches(item, &r.title))
                .cloned()
                .collect();
            if matching.is_empty() {
                continue;
            }
            match self.decide_with_candidates(item, matching, &settings).await {
                Ok(report) => {
                    debug!(task = TASK_RSS, item = %item.title, outcome = report.outcome.label(), "feed match decided");
                }
                Err(e) => {
                    warn!(task = TASK_RSS, item = %item.title, error = %e, "feed decision failed");
                }
            }
        }
    }

    /// One pass of the pending-grab consumer: promote everything whose delay
    /// window has elapsed.
    pub async fn promote_pending_once(&self) {
        let Some(_permit) = self.guard.try_begin(TASK_PENDING) else {
            debug!(task = TASK_PENDING, "previous run still in flight, skipping");
            return;
        };

        let settings = match self.store.get_settings() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(task = TASK_PENDING, error = %e, "failed to load settings");
                return;
            }
        };
        if !settings.auto_grab {
            return;
        }

        let due = match self.store.due_pending(Utc::now()) {
            Ok(due) => due,
            Err(e) => {
                warn!(task = TASK_PENDING, error = %e, "failed to list due pending grabs");
                return;
            }
        };

        for grab in due {
            // The blocklist may have grown while the grab waited
            match self.store.is_blocklisted(&grab.release_title) {
                Ok(true) => {
                    info!(task = TASK_PENDING, title = %grab.release_title, "pending grab now blocklisted, dropping");
                    metrics::PENDING_PROMOTIONS.with_label_values(&["dropped"]).inc();
                    let _ = self.store.remove_pending(&grab.id);
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(task = TASK_PENDING, error = %e, "blocklist check failed");
                    continue;
                }
            }

            let candidate: Candidate = match serde_json::from_str(&grab.release_json) {
                Ok(candidate) => candidate,
                Err(e) => {
                    warn!(task = TASK_PENDING, id = %grab.id, error = %e, "unreadable pending grab, dropping");
                    metrics::PENDING_PROMOTIONS.with_label_values(&["dropped"]).inc();
                    let _ = self.store.remove_pending(&grab.id);
                    continue;
                }
            };

            match self.hand_off(&candidate).await {
                Ok(()) => {
                    info!(task = TASK_PENDING, title = %grab.release_title, "pending grab promoted");
                    metrics::PENDING_PROMOTIONS.with_label_values(&["ok"]).inc();
                    let _ = self.store.remove_pending(&grab.id);
                }
                Err(e) => {
                    // Kept for retry on the next cycle
                    warn!(task = TASK_PENDING, title = %grab.release_title, error = %e, "promotion hand-off failed");
                    metrics::PENDING_PROMOTIONS.with_label_values(&["error"]).inc();
                }
            }
        }
    }

    /// Search for one monitored item and decide. `last_searched_at` is
    /// updated whether or not the search succeeded.
    pub async fn decide_for_item(
        &self,
        item: &MonitoredItem,
        settings: &Settings,
    ) -> Result<DecisionReport, SchedulerError> {
        let request = build_search_request(item, self.config.search_limit);
        let search_result = self.timed_search(&request).await;

        if let Err(e) = self.store.set_last_searched(item.id, Utc::now()) {
            warn!(item = %item.title, error = %e, "failed to update last searched timestamp");
        }

        let results = search_result?;
        self.decide_with_candidates(item, results, settings).await
    }

    /// Score, rank and act on a batch of raw results for one item.
    pub async fn decide_with_candidates(
        &self,
        item: &MonitoredItem,
        results: Vec<RawSearchResult>,
        settings: &Settings,
    ) -> Result<DecisionReport, SchedulerError> {
        let rules = self.load_rules(item)?;

        let candidates: Vec<Candidate> = results
            .into_iter()
            .map(|raw| {
                let parsed = parse(&raw.title);
                let scored = score_release(
                    &parsed,
                    rules.profile.as_ref(),
                    &rules.formats,
                    item.owned_score,
                );
                metrics::RELEASES_SCORED.inc();
                if let Some(reason) = &scored.rejection_reason {
                    metrics::RELEASES_REJECTED
                        .with_label_values(&[reason.replace(' ', "_").as_str()])
                        .inc();
                }
                Candidate { raw, scored }
            })
            .collect();

        let eligible: Vec<Candidate> = candidates
            .iter()
            .filter(|c| c.scored.total_score >= settings.min_score)
            .cloned()
            .collect();

        let ctx = RankContext {
            library_id: Some(item.library_id),
            filters: rules.filters,
            delay_profiles: rules.delay_profiles,
            now: Utc::now(),
        };
        let gates: &dyn GateChecks = self.store.as_ref();
        let selection = rank(&eligible, &ctx, gates)?;

        let outcome = match selection {
            Selection::Selected(candidate) => {
                if settings.auto_grab {
                    match self.hand_off(&candidate).await {
                        Ok(()) => DecisionOutcome::Grabbed(candidate),
                        Err(e) => {
                            warn!(title = %candidate.raw.title, error = %e, "grab hand-off failed");
                            DecisionOutcome::GrabFailed {
                                candidate,
                                error: e.to_string(),
                            }
                        }
                    }
                } else {
                    DecisionOutcome::Reported(candidate)
                }
            }
            Selection::Deferred {
                candidate,
                available_at,
            } => {
                let grab = PendingGrab {
                    id: uuid::Uuid::new_v4().to_string(),
                    media_id: item.id,
                    release_title: candidate.raw.title.clone(),
                    release_json: serde_json::to_string(&candidate)
                        .map_err(|e| SchedulerError::Serialization(e.to_string()))?,
                    score: candidate.scored.total_score,
                    indexer_id: Some(candidate.raw.indexer_id),
                    available_at,
                    created_at: Utc::now(),
                };
                self.store.save_pending(&grab)?;
                DecisionOutcome::Deferred(grab)
            }
            Selection::NoneAcceptable => DecisionOutcome::NoneAcceptable,
        };

        metrics::DECISIONS.with_label_values(&[outcome.label()]).inc();
        Ok(DecisionReport {
            outcome,
            candidates,
        })
    }

    fn load_rules(&self, item: &MonitoredItem) -> Result<DecisionRules, SchedulerError> {
        let profile = match item.quality_profile_id {
            Some(id) => self.store.get_profile(id)?,
            None => None,
        };
        let filters = match &profile {
            Some(profile) => self.store.list_filters(profile.id)?,
            None => Vec::new(),
        };
        Ok(DecisionRules {
            profile,
            formats: self.store.list_formats()?,
            filters,
            delay_profiles: self.store.list_delay_profiles()?,
        })
    }

    async fn timed_search(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<RawSearchResult>, SchedulerError> {
        let timer = metrics::SEARCH_DURATION.with_label_values(&[]).start_timer();
        let result = self.searcher.search(request).await;
        timer.observe_duration();
        match &result {
            Ok(results) => {
                metrics::SEARCH_REQUESTS.with_label_values(&["ok"]).inc();
                debug!(query = %request.query, count = results.len(), "search finished");
            }
            Err(e) => {
                metrics::SEARCH_REQUESTS.with_label_values(&["error"]).inc();
                debug!(query = %request.query, error = %e, "search failed");
            }
        }
        Ok(result?)
    }

    /// Hand a winning candidate to the download client for its protocol.
    async fn hand_off(&self, candidate: &Candidate) -> Result<(), crate::download::DownloadError> {
        let url = candidate
            .raw
            .magnet_link
            .as_deref()
            .unwrap_or(&candidate.raw.link);
        let result = self
            .downloads
            .add(candidate.raw.protocol, url, &self.download_category)
            .await;
        let label = if result.is_ok() { "ok" } else { "error" };
        metrics::GRAB_HANDOFFS.with_label_values(&[label]).inc();
        result
    }

    fn is_excluded(&self, item: &MonitoredItem) -> bool {
        match item.tmdb_id {
            Some(tmdb_id) => self
                .store
                .is_media_excluded(tmdb_id, item.media_kind)
                .unwrap_or(false),
            None => false,
        }
    }

    fn storage_pressure(&self) -> bool {
        let threshold = self.config.min_free_disk_bytes;
        if threshold == 0 {
            return false;
        }
        let Some(monitor) = &self.storage else {
            return false;
        };
        match monitor.free_bytes() {
            Ok(free) if free < threshold => {
                warn!(
                    free_bytes = free,
                    threshold_bytes = threshold,
                    "free disk space below threshold, skipping grabs this cycle"
                );
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!(error = %e, "failed to read free disk space");
                false
            }
        }
    }
}

/// Whether the item's re-search interval has elapsed.
fn is_due(item: &MonitoredItem, now: chrono::DateTime<Utc>, interval_minutes: u64) -> bool {
    match item.last_searched_at {
        Some(last) => now - last >= chrono::Duration::minutes(interval_minutes as i64),
        None => true,
    }
}

/// Query for one monitored item: title plus year when known.
fn build_search_request(item: &MonitoredItem, limit: u32) -> SearchRequest {
    let query = match item.year {
        Some(year) => format!("{} {}", item.title, year),
        None => item.title.clone(),
    };
    SearchRequest {
        kind: Some(item.media_kind),
        tmdb_id: item.tmdb_id,
        limit: Some(limit),
        ..SearchRequest::text(query)
    }
}

/// Whether a feed release belongs to a monitored item: the normalized
/// release title starts with the normalized item title, and years agree
/// when both are known.
fn title_matches(item: &MonitoredItem, raw_title: &str) -> bool {
    let norm_release = normalize_for_match(raw_title);
    let norm_item = normalize_for_match(&item.title);
    if norm_item.is_empty() || !norm_release.starts_with(&norm_item) {
        return false;
    }
    match (item.year, parse(raw_title).year) {
        (Some(wanted), Some(found)) => wanted == found,
        _ => true,
    }
}

fn normalize_for_match(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    out.trim_end().to_string()
}
