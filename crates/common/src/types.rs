//! Core types for ciprobe

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Terminal result of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Success,
    Unstable,
    Failure,
    Aborted,
    NotBuilt,
}

impl Outcome {
    pub const ALL: [Outcome; 5] = [
        Outcome::Success,
        Outcome::Unstable,
        Outcome::Failure,
        Outcome::Aborted,
        Outcome::NotBuilt,
    ];

    /// Wire name used by the status endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "SUCCESS",
            Outcome::Unstable => "UNSTABLE",
            Outcome::Failure => "FAILURE",
            Outcome::Aborted => "ABORTED",
            Outcome::NotBuilt => "NOT_BUILT",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Outcome::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| Error::UnknownOutcome(s.to_string()))
    }
}

/// Snapshot of a build's `api/json` document.
///
/// `result` is kept as the raw string so that an unrecognised value is only
/// rejected when somebody asks for the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDocument {
    pub number: u64,

    pub building: bool,

    #[serde(default)]
    pub result: Option<String>,

    #[serde(default)]
    pub built_on: Option<String>,

    /// Start time in epoch milliseconds
    #[serde(default)]
    pub timestamp: Option<i64>,

    /// Duration in milliseconds (0 while building)
    #[serde(default)]
    pub duration: Option<u64>,

    #[serde(default)]
    pub full_display_name: Option<String>,

    #[serde(default)]
    pub artifacts: Vec<ArtifactEntry>,

    /// Freestyle builds report a single change set
    #[serde(default)]
    pub change_set: Option<ChangeSet>,

    /// Pipeline builds report one change set per checkout
    #[serde(default)]
    pub change_sets: Vec<ChangeSet>,
}

impl StatusDocument {
    /// Parse a raw `api/json` body.
    ///
    /// A document may report a result while `building` is still set (a
    /// pipeline step marked the run unstable mid-way); it stays in progress.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// True until the document proves the build has finished
    pub fn in_progress(&self) -> bool {
        self.building || self.result.is_none()
    }

    /// Parsed terminal outcome, `None` while unfinished
    pub fn outcome(&self) -> Result<Option<Outcome>> {
        if self.in_progress() {
            return Ok(None);
        }
        self.result.as_deref().map(Outcome::from_str).transpose()
    }

    pub fn executor_node(&self) -> ExecutorNode {
        ExecutorNode::from_built_on(self.built_on.as_deref())
    }

    /// Start time as a UTC timestamp
    pub fn started_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.timestamp
            .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
    }

    /// All change entries across `changeSet` and `changeSets`
    pub fn change_entries(&self) -> Vec<ChangeEntry> {
        self.change_set
            .iter()
            .chain(self.change_sets.iter())
            .flat_map(|set| set.items.iter().cloned())
            .collect()
    }
}

/// Where a build executed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ExecutorNode {
    /// The controller itself (`builtOn` empty or missing)
    Controller,
    Agent(String),
}

impl ExecutorNode {
    pub fn from_built_on(built_on: Option<&str>) -> Self {
        match built_on.map(str::trim) {
            Some(name) if !name.is_empty() => ExecutorNode::Agent(name.to_string()),
            _ => ExecutorNode::Controller,
        }
    }
}

impl std::fmt::Display for ExecutorNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutorNode::Controller => write!(f, "(controller)"),
            ExecutorNode::Agent(name) => write!(f, "{}", name),
        }
    }
}

/// One archived artifact of a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactEntry {
    pub file_name: String,
    pub relative_path: String,
    #[serde(default)]
    pub display_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub items: Vec<ChangeEntry>,
}

/// One source change recorded against a build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEntry {
    #[serde(default)]
    pub commit_id: Option<String>,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub author: Option<ChangeAuthor>,
    #[serde(default)]
    pub affected_paths: Vec<String>,
}

impl ChangeEntry {
    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.full_name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAuthor {
    pub full_name: String,
}
