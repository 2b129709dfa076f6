//! Top-level run orchestration.

use std::sync::Arc;

use gptk_model::{Filter, MediaItem, MediaKey, Source};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    actions::{self, Action},
    api::PhotosApi,
    batch::BatchExecutor,
    config::ToolkitConfig,
    error::Result,
    filters::{FilterChain, extended, validate},
    run_state::RunState,
    similarity::{SimilarityEngine, ThumbnailSource},
    sources,
};

/// What to run: candidates from `source`, narrowed by `filter`, then
/// `action` applied to whatever is left. Without an action the run only
/// reports its matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub source: Source,
    #[serde(default)]
    pub filter: Filter,
    #[serde(default)]
    pub action: Option<Action>,
}

impl RunRequest {
    pub fn preview(source: Source, filter: Filter) -> Self {
        Self {
            source,
            filter,
            action: None,
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "kebab-case")]
pub enum RunOutcome {
    Completed,
    Cancelled,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub source: Source,
    pub action: Option<Action>,
    /// Candidates read from the source.
    pub fetched: usize,
    /// Items left after filtering and grouping.
    pub matched: usize,
    /// Items the service acknowledged for the action.
    pub affected: usize,
    pub outcome: RunOutcome,
    pub matched_keys: Vec<MediaKey>,
}

impl RunReport {
    fn started(request: &RunRequest) -> Self {
        Self {
            source: request.source.clone(),
            action: request.action.clone(),
            fetched: 0,
            matched: 0,
            affected: 0,
            outcome: RunOutcome::Completed,
            matched_keys: Vec::new(),
        }
    }

    fn record_matches(&mut self, items: &[MediaItem]) {
        self.matched = items.len();
        self.matched_keys = items.iter().map(|item| item.media_key.clone()).collect();
    }
}

/// Entry point tying source selection, filtering, grouping and actions
/// together. One run at a time; [`Toolkit::cancel`] stops the active one.
#[derive(Clone)]
pub struct Toolkit {
    api: Arc<dyn PhotosApi>,
    similarity: SimilarityEngine,
    config: ToolkitConfig,
    run_state: RunState,
}

impl std::fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolkit")
            .field("config", &self.config)
            .field("run_state", &self.run_state)
            .finish_non_exhaustive()
    }
}

impl Toolkit {
    pub fn new(
        api: Arc<dyn PhotosApi>,
        thumbnails: Arc<dyn ThumbnailSource>,
        config: ToolkitConfig,
    ) -> Self {
        Self::with_run_state(api, thumbnails, config, RunState::new())
    }

    /// Builds a toolkit around an existing run state, so a stop control
    /// created elsewhere can reach its runs.
    pub fn with_run_state(
        api: Arc<dyn PhotosApi>,
        thumbnails: Arc<dyn ThumbnailSource>,
        config: ToolkitConfig,
        run_state: RunState,
    ) -> Self {
        let similarity = SimilarityEngine::new(thumbnails, config.similarity.clone());
        Self {
            api,
            similarity,
            config,
            run_state,
        }
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state.is_running()
    }

    /// Asks the active run to stop. Work already in flight finishes; nothing
    /// new is started.
    pub fn cancel(&self) -> bool {
        self.run_state.cancel()
    }

    /// Validates `request`, then runs it to completion or cancellation.
    ///
    /// Only a rejected configuration or an already active run yield `Err`.
    /// Failures during the run are logged and reported in
    /// [`RunReport::outcome`], and the run state is idle again on return.
    pub async fn run(&self, request: RunRequest) -> Result<RunReport> {
        validate(&request.source, &request.filter, request.action.as_ref())?;
        let guard = self.run_state.begin()?;
        info!(
            run_id = guard.id(),
            source = %request.source,
            action = request.action.as_ref().map(Action::name).unwrap_or("preview"),
            "Run started"
        );

        let mut report = RunReport::started(&request);
        match self.execute(&request, guard.token(), &mut report).await {
            Ok(()) if guard.is_cancelled() => report.outcome = RunOutcome::Cancelled,
            Ok(()) => report.outcome = RunOutcome::Completed,
            Err(err) => {
                error!(
                    run_id = guard.id(),
                    error = %error_chain(&err),
                    "Run failed"
                );
                report.outcome = RunOutcome::Failed(err.to_string());
            }
        }

        info!(
            run_id = guard.id(),
            fetched = report.fetched,
            matched = report.matched,
            affected = report.affected,
            outcome = ?report.outcome,
            "Run finished"
        );
        Ok(report)
    }

    async fn execute(
        &self,
        request: &RunRequest,
        cancel: &CancellationToken,
        report: &mut RunReport,
    ) -> Result<()> {
        let api = self.api.as_ref();
        let filter = &request.filter;
        let executor = BatchExecutor::new(self.config.concurrency_limits(), cancel.clone());

        let items = sources::fetch_source(api, cancel, &request.source, filter).await;
        report.fetched = items.len();
        if cancel.is_cancelled() {
            return Ok(());
        }

        let chain = FilterChain::new(api, &executor, self.config.info_size);
        let mut items = chain.apply(items, filter).await?;
        if cancel.is_cancelled() {
            report.record_matches(&items);
            return Ok(());
        }

        if let Some(threshold) = filter.similarity_threshold {
            if !items.is_empty() {
                items = self
                    .similarity
                    .filter_similar(items, threshold, filter.image_height, cancel)
                    .await;
            }
        } else if filter.sort_by_size {
            extended::sort_by_size(&mut items);
        }
        report.record_matches(&items);

        if cancel.is_cancelled() || items.is_empty() {
            return Ok(());
        }
        if let Some(action) = &request.action {
            if action.needs_enrichment() && !filter.needs_enrichment() {
                items = chain.enrich(items).await;
                if cancel.is_cancelled() {
                    return Ok(());
                }
            }
            report.affected =
                actions::dispatch(action, api, &executor, &self.config, &items).await?;
        }
        Ok(())
    }
}

/// `err` followed by each of its sources.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}
