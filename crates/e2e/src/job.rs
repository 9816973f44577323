//! Job: the parent collection that builds belong to

use url::Url;

use crate::build::Build;
use crate::error::{E2eError, E2eResult};
use crate::identity::{BuildSelector, Permalink};
use crate::session::Session;

/// A job on the CI server. Two jobs are equal when their locations are.
#[derive(Clone)]
pub struct Job {
    session: Session,
    name: String,
    location: Url,
}

impl Job {
    pub(crate) fn new(session: Session, name: &str) -> E2eResult<Self> {
        let name = name.trim_matches('/');
        if name.is_empty() || name.split('/').any(str::is_empty) {
            return Err(E2eError::InvalidLocation(format!("invalid job name '{}'", name)));
        }

        let mut location = session.base_url().clone();
        {
            let mut segments = location.path_segments_mut().map_err(|_| {
                E2eError::InvalidLocation(format!("{} cannot hold jobs", session.base_url()))
            })?;
            segments.pop_if_empty();
            for part in name.split('/') {
                segments.push("job").push(part);
            }
            segments.push("");
        }

        Ok(Self {
            session,
            name: name.to_string(),
            location,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn url(&self, path: &str) -> E2eResult<Url> {
        Ok(self.location.join(path.trim_start_matches('/'))?)
    }

    /// Handle for one of this job's builds. No I/O happens here.
    pub fn build(&self, selector: impl Into<BuildSelector>) -> E2eResult<Build> {
        let id = selector.into().resolve(&self.location)?;
        Ok(Build::from_identity(self.clone(), id))
    }

    pub fn last_build(&self) -> E2eResult<Build> {
        self.build(Permalink::LastBuild)
    }

    /// Open the job's build listing page
    pub async fn visit(&self) -> E2eResult<()> {
        self.session.navigator().visit(&self.location).await
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

impl Eq for Job {}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("name", &self.name)
            .field("location", &self.location.as_str())
            .finish()
    }
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
