//! ciprobe build lifecycle tracking
//!
//! This crate follows remote CI builds from an acceptance test:
//! - Addresses jobs and builds by URL (number, permalink or absolute location)
//! - Polls the build's `api/json` status with a bounded, fixed-interval wait
//! - Caches the terminal outcome once it has been observed
//! - Re-types a build handle into artifact or change-log views without I/O
//! - Asserts on outcomes, attaching the console log to every failure
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Session (base URL, StatusSource, Navigator, WaitConfig)    │
//! │    └── Job (job/<name>/)                                    │
//! │          └── Build (ResourceId + cached Outcome)            │
//! │                ├── has_started / is_in_progress             │
//! │                ├── wait_until_started / wait_until_finished │
//! │                │     └── poller::wait_for(predicate)        │
//! │                ├── outcome / try_outcome                    │
//! │                └── resolve(ViewKind) -> BuildView           │
//! │                      ├── Base(Build)                        │
//! │                      ├── Artifacts(ArtifactListing)         │
//! │                      └── Changes(ChangeLog)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  StatusSource / Navigator <- HttpClient (reqwest)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod build;
pub mod client;
pub mod error;
pub mod fetcher;
pub mod identity;
pub mod job;
pub mod matchers;
pub mod poller;
pub mod session;
pub mod view;

pub use build::Build;
pub use client::HttpClient;
pub use error::{E2eError, E2eResult};
pub use fetcher::{Navigator, StatusSource};
pub use identity::{BuildSelector, Permalink, ResourceId};
pub use job::Job;
pub use matchers::{AllOf, BuildMatcher, ConsoleMatches, ResultIs};
pub use poller::{wait_for, PollSettings, Waited};
pub use session::Session;
pub use view::{Artifact, ArtifactListing, BuildView, ChangeLog, ViewKind};

pub use ciprobe_common::{Outcome, StatusDocument};
