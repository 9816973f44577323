//! Build lifecycle tracking
//!
//! A [`Build`] follows one execution through `unknown -> started ->
//! finished(outcome)`. Every query except the cached outcome goes back to the
//! server; the outcome is cached the first time a finished status document is
//! seen and is never fetched again, because a finished build's history does
//! not change.

use once_cell::sync::OnceCell;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use ciprobe_common::{ExecutorNode, Outcome, StatusDocument};

use crate::error::{E2eError, E2eResult};
use crate::fetcher::probe;
use crate::identity::ResourceId;
use crate::job::Job;
use crate::poller::wait_for;
use crate::session::Session;
use crate::view::{ArtifactListing, BuildView, ChangeLog, ViewKind};

/// Client-side handle for one build of a job.
///
/// Cloning copies the cached outcome; the clone then caches independently.
#[derive(Clone)]
pub struct Build {
    job: Job,
    id: ResourceId,
    outcome: OnceCell<Outcome>,
}

impl Build {
    pub(crate) fn from_identity(job: Job, id: ResourceId) -> Self {
        Self {
            job,
            id,
            outcome: OnceCell::new(),
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn location(&self) -> &Url {
        self.id.location()
    }

    fn session(&self) -> &Session {
        self.job.session()
    }

    /// Plain-text console log
    pub fn console_url(&self) -> E2eResult<Url> {
        self.id.url("consoleText")
    }

    /// Live console page
    pub fn console_page_url(&self) -> E2eResult<Url> {
        self.id.url("console")
    }

    /// Number-keyed status page; resolves permalinks with one fetch
    pub async fn status_url(&self) -> E2eResult<Url> {
        let number = self.number().await?;
        self.job.url(&format!("{}/", number))
    }

    pub async fn open_status_page(&self) -> E2eResult<()> {
        let url = self.status_url().await?;
        self.session().navigator().visit(&url).await
    }

    async fn fetch(&self) -> E2eResult<StatusDocument> {
        self.session()
            .status_source()
            .fetch_status(self.id.location())
            .await
    }

    /// Cache the outcome if `doc` shows a finished build. The first cached
    /// value always wins.
    fn remember(&self, doc: &StatusDocument) -> E2eResult<Option<Outcome>> {
        if let Some(outcome) = self.outcome.get() {
            return Ok(Some(*outcome));
        }
        match doc.outcome()? {
            Some(outcome) => {
                let outcome = *self.outcome.get_or_init(|| outcome);
                info!(build = %self, number = doc.number, %outcome, "build finished");
                Ok(Some(outcome))
            }
            None => Ok(None),
        }
    }

    /// Outcome seen so far, without any I/O
    pub fn cached_outcome(&self) -> Option<Outcome> {
        self.outcome.get().copied()
    }

    /// True once the server has a status document for this build.
    ///
    /// A 404 means "not started"; any other failure is returned as an error.
    pub async fn has_started(&self) -> E2eResult<bool> {
        if self.outcome.get().is_some() {
            return Ok(true);
        }
        let source = self.session().status_source();
        Ok(probe(source, self.id.location()).await?.is_some())
    }

    /// True while the build runs or has stopped without a result yet.
    ///
    /// A cached outcome answers `false` without touching the network; a
    /// build that has not started is not in progress either.
    pub async fn is_in_progress(&self) -> E2eResult<bool> {
        if self.outcome.get().is_some() {
            return Ok(false);
        }
        let source = self.session().status_source();
        match probe(source, self.id.location()).await? {
            None => Ok(false),
            Some(doc) if doc.in_progress() => Ok(true),
            Some(doc) => {
                self.remember(&doc)?;
                Ok(false)
            }
        }
    }

    async fn has_finished(&self) -> E2eResult<bool> {
        Ok(!self.is_in_progress().await?)
    }

    /// [`Self::wait_until_started_within`] with the session's start budget
    /// (zero by default: a single probe).
    pub async fn wait_until_started(&self) -> E2eResult<&Self> {
        let timeout = self.session().wait_config().start_timeout();
        self.wait_until_started_within(timeout).await
    }

    /// Open the job page, then poll until the build has started.
    pub async fn wait_until_started_within(&self, timeout: Duration) -> E2eResult<&Self> {
        self.job.visit().await?;

        let condition = format!("{} to start", self);
        let waited = wait_for(&condition, self.session().poll_settings(timeout), || {
            self.has_started()
        })
        .await?;
        debug!(build = %self, attempts = waited.attempts, elapsed = ?waited.elapsed, "build started");
        Ok(self)
    }

    /// [`Self::wait_until_finished_within`] with the session's finish budget
    /// (120s by default).
    pub async fn wait_until_finished(&self) -> E2eResult<&Self> {
        let timeout = self.session().wait_config().finish_timeout();
        self.wait_until_finished_within(timeout).await
    }

    /// Check the build has started (default start budget), open its live
    /// console, then poll until it is no longer in progress.
    pub async fn wait_until_finished_within(&self, timeout: Duration) -> E2eResult<&Self> {
        self.wait_until_started().await?;
        self.session()
            .navigator()
            .visit(&self.console_page_url()?)
            .await?;

        let condition = format!("{} to finish", self);
        let waited = wait_for(&condition, self.session().poll_settings(timeout), || {
            self.has_finished()
        })
        .await?;
        debug!(build = %self, attempts = waited.attempts, elapsed = ?waited.elapsed, "wait finished");
        Ok(self)
    }

    /// Terminal outcome of the build.
    ///
    /// **Blocks** (up to the session's finish budget) if the build has not
    /// finished yet. Use [`Self::try_outcome`] for a non-blocking read.
    pub async fn outcome(&self) -> E2eResult<Outcome> {
        if let Some(outcome) = self.cached_outcome() {
            return Ok(outcome);
        }

        self.wait_until_finished().await?;
        if let Some(outcome) = self.cached_outcome() {
            return Ok(outcome);
        }

        let doc = self.fetch().await?;
        self.remember(&doc)?
            .ok_or_else(|| E2eError::MalformedDocument {
                url: self.id.location().to_string(),
                reason: format!("build #{} stopped without a result", doc.number),
            })
    }

    /// Outcome if the build has finished, `None` otherwise. At most one fetch.
    pub async fn try_outcome(&self) -> E2eResult<Option<Outcome>> {
        if let Some(outcome) = self.cached_outcome() {
            return Ok(Some(outcome));
        }
        let source = self.session().status_source();
        match probe(source, self.id.location()).await? {
            Some(doc) => self.remember(&doc),
            None => Ok(None),
        }
    }

    /// Build number, read fresh every time
    pub async fn number(&self) -> E2eResult<u64> {
        Ok(self.fetch().await?.number)
    }

    /// Fresh status document
    pub async fn status(&self) -> E2eResult<StatusDocument> {
        self.fetch().await
    }

    /// Node the build ran on
    pub async fn node(&self) -> E2eResult<ExecutorNode> {
        Ok(self.fetch().await?.executor_node())
    }

    /// Full console log as plain text
    pub async fn console(&self) -> E2eResult<String> {
        let url = self.console_url()?;
        self.session().navigator().read_text(&url).await
    }

    pub async fn is_success(&self) -> E2eResult<bool> {
        Ok(self.outcome().await? == Outcome::Success)
    }

    pub async fn is_unstable(&self) -> E2eResult<bool> {
        Ok(self.outcome().await? == Outcome::Unstable)
    }

    /// `"<job> #<number>"`
    pub async fn describe(&self) -> E2eResult<String> {
        Ok(format!("{} #{}", self.job.name(), self.number().await?))
    }

    /// Same job and same build number. Fetches both numbers when the jobs match.
    pub async fn same_build(&self, other: &Build) -> E2eResult<bool> {
        if self.job != other.job {
            return Ok(false);
        }
        Ok(self.number().await? == other.number().await?)
    }

    /// Re-type this handle; see [`BuildView::resolve`]
    pub fn resolve(self, kind: ViewKind) -> BuildView {
        BuildView::from(self).resolve(kind)
    }

    /// Artifact listing over the same identity
    pub fn artifacts_view(&self) -> ArtifactListing {
        ArtifactListing::new(self.job.clone(), self.id.clone())
    }

    /// Change log over the same identity
    pub fn changes_view(&self) -> ChangeLog {
        ChangeLog::new(self.job.clone(), self.id.clone())
    }
}

impl std::fmt::Display for Build {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id.label() {
            Some(label) => write!(f, "{} {}", self.job.name(), label),
            None => write!(f, "{} {}", self.job.name(), self.id.location()),
        }
    }
}

impl std::fmt::Debug for Build {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Build")
            .field("job", &self.job.name())
            .field("location", &self.id.location().as_str())
            .field("outcome", &self.outcome.get())
            .finish()
    }
}
