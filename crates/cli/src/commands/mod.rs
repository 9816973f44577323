//! CLI Commands

pub mod artifacts;
pub mod changes;
pub mod console;
pub mod status;
pub mod wait;

use anyhow::Result;
use clap::Args;

use ciprobe_e2e::{Build, BuildSelector, Session};

/// Which build a command targets
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Job name; `/` separates folders
    pub job: String,

    /// Build number, permalink (lastBuild, lastSuccessfulBuild, ...) or absolute URL
    #[arg(default_value = "lastBuild")]
    pub build: String,
}

impl BuildArgs {
    pub fn open(&self, session: &Session) -> Result<Build> {
        let selector: BuildSelector = self.build.parse()?;
        Ok(session.job(&self.job)?.build(selector)?)
    }
}
