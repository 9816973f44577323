//! Typed views over a build's identity
//!
//! A build can be looked at as the plain lifecycle handle, as its artifact
//! listing, or as its change log. Switching between them never touches the
//! network: the new handle reuses the job and the resource identity.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::trace;
use url::Url;

use ciprobe_common::{ArtifactEntry, ChangeEntry};

use crate::build::Build;
use crate::error::{E2eError, E2eResult};
use crate::identity::ResourceId;
use crate::job::Job;

/// Which capability set a handle exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Base,
    Artifacts,
    Changes,
}

impl ViewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Base => "base",
            ViewKind::Artifacts => "artifacts",
            ViewKind::Changes => "changes",
        }
    }
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = E2eError;

    fn from_str(s: &str) -> E2eResult<Self> {
        match s {
            "base" => Ok(ViewKind::Base),
            "artifacts" => Ok(ViewKind::Artifacts),
            "changes" => Ok(ViewKind::Changes),
            other => Err(E2eError::UnknownViewKind(other.to_string())),
        }
    }
}

/// A build handle tagged with the view it currently exposes.
///
/// Two views are equal when they have the same kind, job and identity.
#[derive(Debug, Clone)]
pub enum BuildView {
    Base(Build),
    Artifacts(ArtifactListing),
    Changes(ChangeLog),
}

impl BuildView {
    pub fn kind(&self) -> ViewKind {
        match self {
            BuildView::Base(_) => ViewKind::Base,
            BuildView::Artifacts(_) => ViewKind::Artifacts,
            BuildView::Changes(_) => ViewKind::Changes,
        }
    }

    pub fn identity(&self) -> &ResourceId {
        match self {
            BuildView::Base(build) => build.id(),
            BuildView::Artifacts(view) => &view.id,
            BuildView::Changes(view) => &view.id,
        }
    }

    pub fn job(&self) -> &Job {
        match self {
            BuildView::Base(build) => build.job(),
            BuildView::Artifacts(view) => &view.job,
            BuildView::Changes(view) => &view.job,
        }
    }

    /// Re-type this handle as `target`.
    ///
    /// Returns `self` untouched when it already is a `target` view (a base
    /// handle keeps its cached outcome). Otherwise a fresh handle is built
    /// over the same job and identity.
    pub fn resolve(self, target: ViewKind) -> BuildView {
        if self.kind() == target {
            return self;
        }
        trace!(from = %self.kind(), to = %target, location = %self.identity().location(), "resolve view");

        let (job, id) = self.into_parts();
        match target {
            ViewKind::Base => BuildView::Base(Build::from_identity(job, id)),
            ViewKind::Artifacts => BuildView::Artifacts(ArtifactListing::new(job, id)),
            ViewKind::Changes => BuildView::Changes(ChangeLog::new(job, id)),
        }
    }

    fn into_parts(self) -> (Job, ResourceId) {
        match self {
            BuildView::Base(build) => (build.job().clone(), build.id().clone()),
            BuildView::Artifacts(view) => (view.job, view.id),
            BuildView::Changes(view) => (view.job, view.id),
        }
    }

    pub fn as_build(&self) -> Option<&Build> {
        match self {
            BuildView::Base(build) => Some(build),
            _ => None,
        }
    }

    pub fn as_artifacts(&self) -> Option<&ArtifactListing> {
        match self {
            BuildView::Artifacts(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_changes(&self) -> Option<&ChangeLog> {
        match self {
            BuildView::Changes(view) => Some(view),
            _ => None,
        }
    }

    pub fn into_build(self) -> Option<Build> {
        match self {
            BuildView::Base(build) => Some(build),
            _ => None,
        }
    }
}

impl From<Build> for BuildView {
    fn from(build: Build) -> Self {
        BuildView::Base(build)
    }
}

impl PartialEq for BuildView {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
            && self.identity() == other.identity()
            && self.job() == other.job()
    }
}

impl Eq for BuildView {}

/// An archived file of a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub name: String,
    pub relative_path: String,
    pub url: Url,
}

/// Artifact listing of a build
#[derive(Debug, Clone)]
pub struct ArtifactListing {
    job: Job,
    id: ResourceId,
}

impl ArtifactListing {
    pub(crate) fn new(job: Job, id: ResourceId) -> Self {
        Self { job, id }
    }

    pub fn listing_url(&self) -> E2eResult<Url> {
        self.id.url("artifact/")
    }

    /// Address one artifact by its path relative to the archive root
    pub fn artifact(&self, relative_path: &str) -> E2eResult<Artifact> {
        let relative_path = relative_path.trim_start_matches('/');
        let name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(relative_path)
            .to_string();
        // Each segment is percent-encoded, so `#` and `?` stay in the path.
        let mut url = self.listing_url()?;
        url.path_segments_mut()
            .map_err(|_| {
                E2eError::InvalidLocation(format!("{} cannot hold artifacts", self.id.location()))
            })?
            .pop_if_empty()
            .extend(relative_path.split('/'));

        Ok(Artifact {
            name,
            relative_path: relative_path.to_string(),
            url,
        })
    }

    /// Open the listing page and return every archived artifact
    pub async fn artifacts(&self) -> E2eResult<Vec<Artifact>> {
        let session = self.job.session();
        session.navigator().visit(&self.listing_url()?).await?;

        let doc = session.status_source().fetch_status(self.id.location()).await?;
        doc.artifacts
            .iter()
            .map(|entry: &ArtifactEntry| -> E2eResult<Artifact> {
                let mut artifact = self.artifact(&entry.relative_path)?;
                artifact.name = entry.file_name.clone();
                Ok(artifact)
            })
            .collect()
    }

    /// Download an artifact as text
    pub async fn read_text(&self, relative_path: &str) -> E2eResult<String> {
        let artifact = self.artifact(relative_path)?;
        self.job.session().navigator().read_text(&artifact.url).await
    }
}

/// Source changes recorded against a build
#[derive(Debug, Clone)]
pub struct ChangeLog {
    job: Job,
    id: ResourceId,
}

impl ChangeLog {
    pub(crate) fn new(job: Job, id: ResourceId) -> Self {
        Self { job, id }
    }

    pub fn changes_url(&self) -> E2eResult<Url> {
        self.id.url("changes")
    }

    /// Open the changes page and return the recorded entries
    pub async fn entries(&self) -> E2eResult<Vec<ChangeEntry>> {
        let session = self.job.session();
        session.navigator().visit(&self.changes_url()?).await?;

        let doc = session.status_source().fetch_status(self.id.location()).await?;
        Ok(doc.change_entries())
    }

    pub async fn is_empty(&self) -> E2eResult<bool> {
        Ok(self.entries().await?.is_empty())
    }
}
