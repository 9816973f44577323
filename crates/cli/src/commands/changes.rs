//! Change Log Commands

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use ciprobe_common::ChangeEntry;
use ciprobe_e2e::Session;

use super::BuildArgs;
use crate::output::{print_list, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct ChangesArgs {
    #[command(flatten)]
    pub target: BuildArgs,
}

#[derive(Serialize)]
pub struct ChangeRow {
    pub commit: Option<String>,
    pub author: Option<String>,
    pub message: String,
    pub paths: Vec<String>,
}

impl From<ChangeEntry> for ChangeRow {
    fn from(entry: ChangeEntry) -> Self {
        Self {
            author: entry.author_name().map(str::to_string),
            commit: entry.commit_id,
            message: entry.msg.trim().to_string(),
            paths: entry.affected_paths,
        }
    }
}

impl TableDisplay for ChangeRow {
    fn headers() -> Vec<&'static str> {
        vec!["Commit", "Author", "Message", "Paths"]
    }

    fn row(&self) -> Vec<String> {
        let commit = self
            .commit
            .as_deref()
            .map(|c| c.chars().take(12).collect())
            .unwrap_or_else(|| "-".to_string());
        vec![
            commit,
            self.author.clone().unwrap_or_else(|| "-".into()),
            self.message.lines().next().unwrap_or_default().to_string(),
            self.paths.len().to_string(),
        ]
    }
}

pub async fn execute(args: ChangesArgs, session: &Session, format: OutputFormat) -> Result<()> {
    let log = args.target.open(session)?.changes_view();
    let rows: Vec<ChangeRow> = log.entries().await?.into_iter().map(ChangeRow::from).collect();
    print_list(&rows, format)
}
