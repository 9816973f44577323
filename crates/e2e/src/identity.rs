//! Resource identity: the immutable address of a remote entity

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use url::Url;

use crate::error::{E2eError, E2eResult};

/// Absolute location of a remote resource plus an optional display label.
///
/// Equality and hashing consider the location only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceId {
    location: Url,
    label: Option<String>,
}

impl ResourceId {
    /// Use an absolute location as-is (a trailing slash is added if missing)
    pub fn from_location(location: Url) -> Self {
        Self {
            location: as_container(location),
            label: None,
        }
    }

    /// Resolve `relative` against a container location
    pub fn resolve(container: &Url, relative: &str) -> E2eResult<Self> {
        let relative = relative.trim_start_matches('/');
        if relative.is_empty() {
            return Err(E2eError::InvalidLocation(format!(
                "empty path under {}",
                container
            )));
        }
        let location = as_container(container.clone()).join(relative)?;
        Ok(Self::from_location(location))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Address of a sub-page, e.g. `api/json` or `consoleText`
    pub fn url(&self, path: &str) -> E2eResult<Url> {
        Ok(self.location.join(path.trim_start_matches('/'))?)
    }
}

impl PartialEq for ResourceId {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

impl Eq for ResourceId {}

impl Hash for ResourceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.hash(state);
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} ({})", label, self.location),
            None => write!(f, "{}", self.location),
        }
    }
}

/// Ensure the path ends in `/` so that joins land below it
pub(crate) fn as_container(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Symbolic build references understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permalink {
    LastBuild,
    LastCompletedBuild,
    LastSuccessfulBuild,
    LastStableBuild,
    LastUnstableBuild,
    LastFailedBuild,
}

impl Permalink {
    pub const ALL: [Permalink; 6] = [
        Permalink::LastBuild,
        Permalink::LastCompletedBuild,
        Permalink::LastSuccessfulBuild,
        Permalink::LastStableBuild,
        Permalink::LastUnstableBuild,
        Permalink::LastFailedBuild,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permalink::LastBuild => "lastBuild",
            Permalink::LastCompletedBuild => "lastCompletedBuild",
            Permalink::LastSuccessfulBuild => "lastSuccessfulBuild",
            Permalink::LastStableBuild => "lastStableBuild",
            Permalink::LastUnstableBuild => "lastUnstableBuild",
            Permalink::LastFailedBuild => "lastFailedBuild",
        }
    }
}

impl std::fmt::Display for Permalink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a build is picked out of its job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildSelector {
    Number(u64),
    Permalink(Permalink),
    Location(Url),
}

impl BuildSelector {
    /// Resolve against the owning job's location
    pub fn resolve(&self, job: &Url) -> E2eResult<ResourceId> {
        match self {
            BuildSelector::Number(n) => {
                Ok(ResourceId::resolve(job, &format!("{}/", n))?.with_label(format!("#{}", n)))
            }
            BuildSelector::Permalink(p) => {
                Ok(ResourceId::resolve(job, &format!("{}/", p))?.with_label(p.as_str()))
            }
            BuildSelector::Location(url) => Ok(ResourceId::from_location(url.clone())),
        }
    }
}

impl FromStr for BuildSelector {
    type Err = E2eError;

    /// Accepts a build number, a permalink name, or an absolute URL
    fn from_str(s: &str) -> E2eResult<Self> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u64>() {
            return Ok(BuildSelector::Number(n));
        }
        if let Some(p) = Permalink::ALL.into_iter().find(|p| p.as_str() == s) {
            return Ok(BuildSelector::Permalink(p));
        }
        match Url::parse(s) {
            Ok(url) => Ok(BuildSelector::Location(url)),
            Err(_) => Err(E2eError::InvalidLocation(format!(
                "'{}' is neither a build number, a permalink nor a URL",
                s
            ))),
        }
    }
}

impl From<u64> for BuildSelector {
    fn from(n: u64) -> Self {
        BuildSelector::Number(n)
    }
}

impl From<Permalink> for BuildSelector {
    fn from(p: Permalink) -> Self {
        BuildSelector::Permalink(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_url() -> Url {
        Url::parse("http://ci.test/job/app").unwrap()
    }

    #[test]
    fn test_resolve_number_and_permalink() {
        let by_number = BuildSelector::Number(12).resolve(&job_url()).unwrap();
        assert_eq!(by_number.location().as_str(), "http://ci.test/job/app/12/");
        assert_eq!(by_number.label(), Some("#12"));

        let latest = BuildSelector::Permalink(Permalink::LastBuild)
            .resolve(&job_url())
            .unwrap();
        assert_eq!(latest.location().as_str(), "http://ci.test/job/app/lastBuild/");
    }

    #[test]
    fn test_equality_ignores_label() {
        let a = ResourceId::resolve(&job_url(), "3/").unwrap().with_label("three");
        let b = ResourceId::from_location(Url::parse("http://ci.test/job/app/3").unwrap());
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_sub_page_urls() {
        let id = ResourceId::resolve(&job_url(), "3").unwrap();
        assert_eq!(id.url("api/json").unwrap().as_str(), "http://ci.test/job/app/3/api/json");
        assert_eq!(id.url("/consoleText").unwrap().as_str(), "http://ci.test/job/app/3/consoleText");
    }

    #[test]
    fn test_empty_relative_path_rejected() {
        assert!(ResourceId::resolve(&job_url(), "/").is_err());
    }

    #[test]
    fn test_selector_from_str() {
        assert_eq!("42".parse::<BuildSelector>().unwrap(), BuildSelector::Number(42));
        assert_eq!(
            "lastSuccessfulBuild".parse::<BuildSelector>().unwrap(),
            BuildSelector::Permalink(Permalink::LastSuccessfulBuild)
        );
        assert!(matches!(
            "http://ci.test/job/app/9/".parse::<BuildSelector>().unwrap(),
            BuildSelector::Location(_)
        ));
        assert!("latest-ish".parse::<BuildSelector>().is_err());
    }
}
